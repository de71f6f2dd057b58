use crate::declaration::XMLNS_NAMESPACE;
use crate::error::Error;
use crate::prefixed::PrefixedNamespace;
use crate::treedata::{Node, Tree};
use crate::xmlvalue::{
    check_target, Attribute, Comment, Element, ProcessingInstruction, Text, Value,
};

/// ## Creation
///
/// These create unattached nodes. Use the manipulation API to
/// place them in a document.
impl Tree {
    pub(crate) fn new_node(&mut self, value: Value) -> Node {
        Node::new(self.arena_mut().new_node(value))
    }

    /// Create a new, empty document root.
    pub fn new_document(&mut self) -> Node {
        self.new_node(Value::Root)
    }

    /// Create a new element in the given namespace, written with the given
    /// prefix.
    ///
    /// This does not declare the namespace; see
    /// [`Tree::ensure_namespace_declared`].
    ///
    /// ```rust
    /// use nsscope::{PrefixedNamespace, Tree};
    ///
    /// let mut tree = Tree::new();
    /// let root = tree.new_document();
    /// let ns = PrefixedNamespace::new("p", "ns")?;
    /// let doc = tree.new_element(&ns, "doc")?;
    /// tree.append(root, doc)?;
    /// tree.ensure_namespace_declared(doc, false, &ns)?;
    /// assert_eq!(tree.to_string(root)?, r#"<p:doc xmlns:p="ns"/>"#);
    /// # Ok::<(), nsscope::Error>(())
    /// ```
    pub fn new_element(
        &mut self,
        namespace: &PrefixedNamespace,
        local_name: &str,
    ) -> Result<Node, Error> {
        if local_name.is_empty() {
            return Err(Error::EmptyLocalName);
        }
        let element = Element::new(
            namespace.prefix().to_string(),
            local_name.to_string(),
            namespace.uri().to_string(),
        );
        Ok(self.new_node(Value::Element(element)))
    }

    /// Create a new text node.
    pub fn new_text(&mut self, text: &str) -> Node {
        self.new_node(Value::Text(Text::new(text.to_string())))
    }

    /// Create a new comment node.
    ///
    /// Fails with [`Error::InvalidComment`] if the text contains `--`.
    pub fn new_comment(&mut self, comment: &str) -> Result<Node, Error> {
        if comment.contains("--") {
            return Err(Error::InvalidComment(comment.to_string()));
        }
        Ok(self.new_node(Value::Comment(Comment::new(comment.to_string()))))
    }

    /// Create a new processing instruction node.
    pub fn new_processing_instruction(
        &mut self,
        target: &str,
        data: Option<&str>,
    ) -> Result<Node, Error> {
        check_target(target)?;
        let pi = ProcessingInstruction::new(
            target.to_string(),
            data.filter(|data| !data.is_empty()).map(|s| s.to_string()),
        );
        Ok(self.new_node(Value::ProcessingInstruction(pi)))
    }

    pub(crate) fn new_attribute_node(&mut self, attribute: Attribute) -> Node {
        self.new_node(Value::Attribute(attribute))
    }
}

/// The declaration attribute for a binding.
///
/// `xmlns="uri"` for the default namespace, `xmlns:p="uri"` otherwise.
pub(crate) fn declaration_attribute(binding: &PrefixedNamespace) -> Attribute {
    if binding.is_default() {
        Attribute::new(
            String::new(),
            "xmlns".to_string(),
            XMLNS_NAMESPACE.to_string(),
            binding.uri().to_string(),
        )
    } else {
        Attribute::new(
            "xmlns".to_string(),
            binding.prefix().to_string(),
            XMLNS_NAMESPACE.to_string(),
            binding.uri().to_string(),
        )
    }
}
