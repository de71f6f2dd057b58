use std::fmt::{Display, Formatter};

use crate::error::Error;

/// A prefix bound to a namespace URI.
///
/// The empty prefix stands for the default namespace. The prefix is
/// normalized on construction: the literal prefix `xmlns` also means the
/// default namespace, as that is how a default namespace declaration
/// attribute names itself.
///
/// A non-default prefix can never be bound to the empty URI; only the
/// default namespace can be reset to "no namespace".
///
/// ```rust
/// use nsscope::PrefixedNamespace;
///
/// let ns = PrefixedNamespace::new("x", "http://example.com/x")?;
/// assert_eq!(ns.prefix(), "x");
/// assert_eq!(ns.to_string(), r#"xmlns:x="http://example.com/x""#);
///
/// let default = PrefixedNamespace::new("xmlns", "http://example.com")?;
/// assert_eq!(default.prefix(), "");
///
/// assert!(PrefixedNamespace::new("x", "").is_err());
/// # Ok::<(), nsscope::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "(String, String)", into = "(String, String)")
)]
pub struct PrefixedNamespace {
    prefix: String,
    uri: String,
}

impl PrefixedNamespace {
    /// Bind a prefix to a namespace URI.
    ///
    /// Fails with [`Error::InvalidBinding`] if a non-default prefix is
    /// bound to the empty URI.
    pub fn new(prefix: &str, uri: impl Into<String>) -> Result<Self, Error> {
        let prefix = normalize_prefix(prefix);
        let uri = uri.into();
        if uri.is_empty() && !prefix.is_empty() {
            return Err(Error::InvalidBinding(prefix.to_string()));
        }
        Ok(PrefixedNamespace {
            prefix: prefix.to_string(),
            uri,
        })
    }

    /// Bind the default namespace to a URI.
    ///
    /// This cannot fail: the default namespace may be bound to anything,
    /// including the empty URI.
    pub fn default_namespace(uri: impl Into<String>) -> Self {
        PrefixedNamespace {
            prefix: String::new(),
            uri: uri.into(),
        }
    }

    /// The prefix. Empty for the default namespace.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// The namespace URI.
    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// Whether this binds the default namespace.
    pub fn is_default(&self) -> bool {
        self.prefix.is_empty()
    }

    /// Split into `(prefix, uri)`.
    pub fn into_parts(self) -> (String, String) {
        (self.prefix, self.uri)
    }
}

/// Normalize a prefix as it appears on a declaration or a name.
///
/// `xmlns` is what a default namespace declaration uses as its name, so it
/// maps to the empty prefix.
pub fn normalize_prefix(prefix: &str) -> &str {
    if prefix == "xmlns" {
        ""
    } else {
        prefix
    }
}

impl Display for PrefixedNamespace {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.prefix.is_empty() {
            write!(f, "xmlns=\"{}\"", self.uri)
        } else {
            write!(f, "xmlns:{}=\"{}\"", self.prefix, self.uri)
        }
    }
}

impl From<&str> for PrefixedNamespace {
    fn from(uri: &str) -> Self {
        PrefixedNamespace::default_namespace(uri)
    }
}

impl From<String> for PrefixedNamespace {
    fn from(uri: String) -> Self {
        PrefixedNamespace::default_namespace(uri)
    }
}

impl TryFrom<(&str, &str)> for PrefixedNamespace {
    type Error = Error;

    fn try_from((prefix, uri): (&str, &str)) -> Result<Self, Self::Error> {
        PrefixedNamespace::new(prefix, uri)
    }
}

impl TryFrom<(String, String)> for PrefixedNamespace {
    type Error = Error;

    fn try_from((prefix, uri): (String, String)) -> Result<Self, Self::Error> {
        PrefixedNamespace::new(&prefix, uri)
    }
}

impl From<PrefixedNamespace> for (String, String) {
    fn from(prefixed_namespace: PrefixedNamespace) -> Self {
        prefixed_namespace.into_parts()
    }
}
