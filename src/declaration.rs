//! Recognizing namespace declaration attributes.

use crate::error::Error;
use crate::prefixed::{normalize_prefix, PrefixedNamespace};
use crate::treedata::{Node, Tree};
use crate::xmlvalue::{Attribute, Element, Value};

/// The namespace that namespace declaration attributes are in.
pub const XMLNS_NAMESPACE: &str = "http://www.w3.org/2000/xmlns/";

/// The namespace implicitly bound to the `xml` prefix.
pub const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

impl Attribute {
    /// Whether this attribute declares a namespace.
    ///
    /// The namespace URI is compared exactly; there is no normalization.
    pub fn is_namespace_declaration(&self) -> bool {
        self.namespace_uri == XMLNS_NAMESPACE
    }

    /// The prefix a declaration attribute declares.
    ///
    /// `xmlns="..."` has local name `xmlns` and declares the default
    /// namespace, so it gives the empty prefix. `xmlns:p="..."` gives `p`.
    /// Only meaningful for declarations.
    pub fn declared_prefix(&self) -> &str {
        normalize_prefix(&self.local_name)
    }

    /// The namespace binding this attribute stands for.
    ///
    /// For a declaration this is what it declares. For any other attribute
    /// it is the attribute's own prefix and namespace.
    pub fn prefixed_namespace(&self) -> Result<PrefixedNamespace, Error> {
        if self.is_namespace_declaration() {
            PrefixedNamespace::new(self.declared_prefix(), self.value.as_str())
        } else {
            PrefixedNamespace::new(&self.prefix, self.namespace_uri.as_str())
        }
    }
}

impl Element {
    /// The element's own prefix and namespace.
    pub fn prefixed_namespace(&self) -> Result<PrefixedNamespace, Error> {
        PrefixedNamespace::new(&self.prefix, self.namespace_uri.as_str())
    }
}

/// ## Namespace declarations
impl Tree {
    /// Whether an attribute node is a namespace declaration.
    ///
    /// ```rust
    /// let mut tree = nsscope::Tree::new();
    /// let root = tree.parse(r#"<doc xmlns:a="ns" b="B"/>"#)?;
    /// let doc = tree.document_element(root)?;
    /// let attributes = tree.attribute_nodes(doc).collect::<Vec<_>>();
    /// assert!(tree.is_namespace_declaration(attributes[0])?);
    /// assert!(!tree.is_namespace_declaration(attributes[1])?);
    /// # Ok::<(), nsscope::Error>(())
    /// ```
    pub fn is_namespace_declaration(&self, node: Node) -> Result<bool, Error> {
        let attribute = self.attribute(node).ok_or(Error::NotAttribute(node))?;
        Ok(attribute.is_namespace_declaration())
    }

    /// The namespace binding of an element or attribute node.
    ///
    /// For elements and ordinary attributes, this is the prefix and
    /// namespace of the node itself. For namespace declarations it is the
    /// declared binding.
    ///
    /// ```rust
    /// use nsscope::PrefixedNamespace;
    ///
    /// let mut tree = nsscope::Tree::new();
    /// let root = tree.parse(r#"<p:doc xmlns:p="ns"/>"#)?;
    /// let doc = tree.document_element(root)?;
    /// let declaration = tree.attribute_nodes(doc).next().unwrap();
    /// let expected = PrefixedNamespace::new("p", "ns")?;
    /// assert_eq!(tree.prefixed_namespace(doc)?, expected);
    /// assert_eq!(tree.prefixed_namespace(declaration)?, expected);
    /// # Ok::<(), nsscope::Error>(())
    /// ```
    pub fn prefixed_namespace(&self, node: Node) -> Result<PrefixedNamespace, Error> {
        match self.value(node) {
            Value::Element(element) => element.prefixed_namespace(),
            Value::Attribute(attribute) => attribute.prefixed_namespace(),
            _ => Err(Error::NotElement(node)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn declaration(local_name: &str, value: &str) -> Attribute {
        let prefix = if local_name == "xmlns" { "" } else { "xmlns" };
        Attribute::new(
            prefix.into(),
            local_name.into(),
            XMLNS_NAMESPACE.into(),
            value.into(),
        )
    }

    #[test]
    fn test_default_declaration() {
        let attribute = declaration("xmlns", "ns");
        assert!(attribute.is_namespace_declaration());
        assert_eq!(attribute.declared_prefix(), "");
        assert_eq!(
            attribute.prefixed_namespace().unwrap(),
            PrefixedNamespace::default_namespace("ns")
        );
    }

    #[test]
    fn test_empty_local_name_is_default() {
        let attribute = declaration("", "ns");
        assert_eq!(attribute.declared_prefix(), "");
    }

    #[test]
    fn test_default_reset_declaration() {
        let attribute = declaration("xmlns", "");
        assert_eq!(
            attribute.prefixed_namespace().unwrap(),
            PrefixedNamespace::default_namespace("")
        );
    }

    #[test]
    fn test_prefixed_declaration() {
        let attribute = declaration("test", "ns");
        assert_eq!(attribute.declared_prefix(), "test");
        assert_eq!(
            attribute.prefixed_namespace().unwrap(),
            PrefixedNamespace::new("test", "ns").unwrap()
        );
    }

    #[test]
    fn test_namespace_uri_matched_exactly() {
        let attribute = Attribute::new(
            "xmlns".into(),
            "a".into(),
            "HTTP://www.w3.org/2000/xmlns/".into(),
            "ns".into(),
        );
        assert!(!attribute.is_namespace_declaration());
    }

    #[test]
    fn test_ordinary_attribute_gives_own_namespace() {
        let attribute = Attribute::new("p".into(), "a".into(), "ns".into(), "value".into());
        assert!(!attribute.is_namespace_declaration());
        assert_eq!(
            attribute.prefixed_namespace().unwrap(),
            PrefixedNamespace::new("p", "ns").unwrap()
        );
    }
}
