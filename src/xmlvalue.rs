use crate::error::Error;

/// The type of the XML node.
///
/// Access it using [`Value::value_type`] or
/// [`Tree::value_type`](crate::Tree::value_type).
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum ValueType {
    /// Document root that holds everything.
    /// Note that this not the same as the document
    /// element.
    Root,
    /// Element; it has a name and attributes.
    Element,
    /// Attribute, including namespace declarations.
    Attribute,
    /// Text.
    Text,
    /// Processing instruction
    ProcessingInstruction,
    /// Comment.
    Comment,
}

/// An XML value.
///
/// Access it using [`Tree::value`](crate::Tree::value) or
/// mutably using [`Tree::value_mut`](crate::Tree::value_mut).
#[derive(Debug, Clone)]
pub enum Value {
    /// Document root that holds everything. Note that this not the same as the document
    /// element.
    Root,
    /// Element; it has a name and attributes.
    Element(Element),
    /// Attribute. Attribute nodes have their element as parent but are not
    /// among its children.
    Attribute(Attribute),
    /// Text. You can get and set the text value.
    Text(Text),
    /// Processing instruction.
    ProcessingInstruction(ProcessingInstruction),
    /// Comment.
    Comment(Comment),
}

impl Value {
    /// Returns the type of the XML value.
    pub fn value_type(&self) -> ValueType {
        match self {
            Value::Root => ValueType::Root,
            Value::Element(_) => ValueType::Element,
            Value::Attribute(_) => ValueType::Attribute,
            Value::Text(_) => ValueType::Text,
            Value::Comment(_) => ValueType::Comment,
            Value::ProcessingInstruction(_) => ValueType::ProcessingInstruction,
        }
    }

    pub(crate) fn is_attribute(&self) -> bool {
        matches!(self, Value::Attribute(_))
    }
}

fn qualified_name(prefix: &str, local_name: &str) -> String {
    if prefix.is_empty() {
        local_name.to_string()
    } else {
        format!("{}:{}", prefix, local_name)
    }
}

/// XML element value.
///
/// An element knows the prefix it was written with, its local name and the
/// namespace URI it is in. The prefix is never changed by namespace
/// operations; only the declarations around it are.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub(crate) prefix: String,
    pub(crate) local_name: String,
    pub(crate) namespace_uri: String,
}

impl Element {
    pub(crate) fn new(prefix: String, local_name: String, namespace_uri: String) -> Self {
        Element {
            prefix,
            local_name,
            namespace_uri,
        }
    }

    /// The prefix. Empty if the element is unprefixed.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// The local name.
    pub fn local_name(&self) -> &str {
        &self.local_name
    }

    /// The namespace URI. Empty if the element is in no namespace.
    pub fn namespace_uri(&self) -> &str {
        &self.namespace_uri
    }

    /// The name as written: `prefix:local` or `local`.
    pub fn qualified_name(&self) -> String {
        qualified_name(&self.prefix, &self.local_name)
    }

    pub(crate) fn set_namespace_uri(&mut self, namespace_uri: &str) {
        self.namespace_uri = namespace_uri.to_string();
    }
}

/// XML attribute value.
///
/// Namespace declarations are attributes too: they are in the
/// `http://www.w3.org/2000/xmlns/` namespace, and their value is the
/// declared namespace URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub(crate) prefix: String,
    pub(crate) local_name: String,
    pub(crate) namespace_uri: String,
    pub(crate) value: String,
}

impl Attribute {
    pub(crate) fn new(
        prefix: String,
        local_name: String,
        namespace_uri: String,
        value: String,
    ) -> Self {
        Attribute {
            prefix,
            local_name,
            namespace_uri,
            value,
        }
    }

    /// The prefix. Empty if the attribute is unprefixed.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// The local name.
    pub fn local_name(&self) -> &str {
        &self.local_name
    }

    /// The namespace URI the attribute itself is in.
    pub fn namespace_uri(&self) -> &str {
        &self.namespace_uri
    }

    /// The attribute value.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Set the attribute value.
    pub fn set_value<S: Into<String>>(&mut self, value: S) {
        self.value = value.into();
    }

    /// The name as written: `prefix:local` or `local`.
    pub fn qualified_name(&self) -> String {
        qualified_name(&self.prefix, &self.local_name)
    }
}

/// XML text value.
///
/// Example: `Bar` in `<foo>Bar</foo>`.
#[derive(Debug, Clone)]
pub struct Text {
    pub(crate) text: String,
}

impl Text {
    pub(crate) fn new(text: String) -> Self {
        Text { text }
    }

    /// Get the text value.
    pub fn get(&self) -> &str {
        &self.text
    }

    /// Set the text value.
    pub fn set<S: Into<String>>(&mut self, text: S) {
        self.text = text.into();
    }
}

/// XML comment.
///
/// Example: `<!-- foo -->`.
#[derive(Debug, Clone)]
pub struct Comment {
    pub(crate) text: String,
}

impl Comment {
    pub(crate) fn new(text: String) -> Self {
        Comment { text }
    }

    /// Get the comment text.
    pub fn get(&self) -> &str {
        &self.text
    }

    /// Set the comment text.
    ///
    /// Rejects comments that contain `--` as illegal.
    pub fn set<S: Into<String>>(&mut self, text: S) -> Result<(), Error> {
        let text = text.into();
        if text.contains("--") {
            return Err(Error::InvalidComment(text));
        }
        self.text = text;
        Ok(())
    }
}

/// XML processing instruction value.
///
/// Example: `<?foo?>` or `<?foo bar?>`.
#[derive(Debug, Clone)]
pub struct ProcessingInstruction {
    pub(crate) target: String,
    pub(crate) data: Option<String>,
}

impl ProcessingInstruction {
    pub(crate) fn new(target: String, data: Option<String>) -> Self {
        ProcessingInstruction { target, data }
    }

    /// Get processing instruction target.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Get processing instruction data.
    pub fn data(&self) -> Option<&str> {
        self.data.as_deref()
    }

    /// Set target.
    ///
    /// Rejects any target that is the string `"xml"` (or case variations) as
    /// it's reserved for XML.
    pub fn set_target<S: Into<String>>(&mut self, target: S) -> Result<(), Error> {
        let target = target.into();
        check_target(&target)?;
        self.target = target;
        Ok(())
    }

    /// Set data. Empty data is the same as no data.
    pub fn set_data<S: Into<String>>(&mut self, data: Option<S>) {
        self.data = data.map(Into::into).filter(|data| !data.is_empty());
    }
}

pub(crate) fn check_target(target: &str) -> Result<(), Error> {
    if target.is_empty() || target.eq_ignore_ascii_case("xml") {
        return Err(Error::InvalidTarget(target.to_string()));
    }
    Ok(())
}
