use crate::creation::declaration_attribute;
use crate::declaration::XMLNS_NAMESPACE;
use crate::error::Error;
use crate::prefixed::PrefixedNamespace;
use crate::treedata::{Node, Tree};
use crate::xmlvalue::{Attribute, Value, ValueType};

/// Manipulation of the tree structure.
///
/// This maintains an XML structure:
/// - There is only one document element under the root node.
/// - The only other nodes that can exist directly under the root node are
///   comments and processing instructions.
/// - You cannot add a node to a node that is not an element or the
///   root node.
/// - Attributes are only added through the attribute API; they always come
///   before the normal children of their element.
///
/// It also ensures that text nodes are consolidated:
/// two text nodes never appear consecutively.
impl Tree {
    /// Append a child to the end of the children of the given parent.
    ///
    /// The child must be unattached.
    pub fn append(&mut self, parent: Node, child: Node) -> Result<(), Error> {
        self.add_structure_check(parent, child)?;
        if let Some(last_child) = self.last_child(parent) {
            self.consolidate_text_nodes(last_child, child);
            if self.is_removed(child) {
                return Ok(());
            }
        }
        parent.get().checked_append(child.get(), self.arena_mut())?;
        Ok(())
    }

    /// Append a new element to a parent node, returning the new element.
    pub fn append_element(
        &mut self,
        parent: Node,
        namespace: &PrefixedNamespace,
        local_name: &str,
    ) -> Result<Node, Error> {
        let element = self.new_element(namespace, local_name)?;
        self.append(parent, element)?;
        Ok(element)
    }

    /// Append text to a parent node.
    pub fn append_text(&mut self, parent: Node, text: &str) -> Result<(), Error> {
        let text_node = self.new_text(text);
        self.append(parent, text_node)
    }

    /// Add an attribute to an element, returning the attribute node.
    ///
    /// If the element already has an attribute with the same namespace and
    /// local name, its value is replaced instead.
    ///
    /// This does not declare the attribute's namespace.
    ///
    /// ```rust
    /// use nsscope::{PrefixedNamespace, Tree};
    ///
    /// let mut tree = Tree::new();
    /// let root = tree.parse(r#"<doc xmlns:p="ns"/>"#)?;
    /// let doc = tree.document_element(root)?;
    /// tree.add_attribute(doc, &PrefixedNamespace::new("p", "ns")?, "a", "A")?;
    /// assert_eq!(tree.to_string(root)?, r#"<doc xmlns:p="ns" p:a="A"/>"#);
    /// # Ok::<(), nsscope::Error>(())
    /// ```
    pub fn add_attribute(
        &mut self,
        element: Node,
        namespace: &PrefixedNamespace,
        local_name: &str,
        value: &str,
    ) -> Result<Node, Error> {
        if !self.is_element(element) {
            return Err(Error::NotElement(element));
        }
        if local_name.is_empty() {
            return Err(Error::EmptyLocalName);
        }
        if namespace.uri() == XMLNS_NAMESPACE {
            return Err(Error::InvalidOperation(
                "namespace declarations are added with add_namespace_declaration".to_string(),
            ));
        }
        let existing = self.attribute_nodes(element).find(|node| {
            self.attribute(*node).is_some_and(|attribute| {
                attribute.namespace_uri() == namespace.uri() && attribute.local_name() == local_name
            })
        });
        if let Some(existing) = existing {
            if let Some(attribute) = self.attribute_mut(existing) {
                attribute.set_value(value);
            }
            return Ok(existing);
        }
        let attribute = Attribute::new(
            namespace.prefix().to_string(),
            local_name.to_string(),
            namespace.uri().to_string(),
            value.to_string(),
        );
        self.insert_attribute(element, attribute)
    }

    /// Add a namespace declaration attribute to an element, returning the
    /// attribute node.
    ///
    /// This always adds a new declaration, even if the element already
    /// declares the prefix. Use [`Tree::ensure_namespace_declared`] to
    /// declare a binding only when needed.
    pub fn add_namespace_declaration(
        &mut self,
        element: Node,
        binding: &PrefixedNamespace,
    ) -> Result<Node, Error> {
        if !self.is_element(element) {
            return Err(Error::NotElement(element));
        }
        self.insert_attribute(element, declaration_attribute(binding))
    }

    pub(crate) fn insert_attribute(&mut self, element: Node, attribute: Attribute) -> Result<Node, Error> {
        let last_attribute = self.attribute_nodes(element).last();
        let node = self.new_attribute_node(attribute);
        if let Some(last_attribute) = last_attribute {
            last_attribute
                .get()
                .checked_insert_after(node.get(), self.arena_mut())?;
        } else {
            element
                .get()
                .checked_prepend(node.get(), self.arena_mut())?;
        }
        Ok(node)
    }

    /// Remove an attribute node from its element.
    pub fn remove_attribute_node(&mut self, attribute: Node) -> Result<(), Error> {
        if !self.is_attribute(attribute) {
            return Err(Error::NotAttribute(attribute));
        }
        attribute.get().remove(self.arena_mut());
        Ok(())
    }

    /// Remove a node and its descendants from the tree.
    ///
    /// The document root cannot be removed this way. If the removal makes
    /// two text nodes adjacent, they are consolidated.
    pub fn remove(&mut self, node: Node) -> Result<(), Error> {
        if self.value_type(node) == ValueType::Root {
            return Err(Error::InvalidOperation(
                "cannot remove document root".to_string(),
            ));
        }
        let previous = self.arena()[node.get()].previous_sibling().map(Node::new);
        let next = self.arena()[node.get()].next_sibling().map(Node::new);
        node.get().remove_subtree(self.arena_mut());
        if let (Some(previous), Some(next)) = (previous, next) {
            self.consolidate_text_nodes(previous, next);
        }
        Ok(())
    }

    fn consolidate_text_nodes(&mut self, first: Node, second: Node) {
        let second_text = match (self.value(first), self.value(second)) {
            (Value::Text(_), Value::Text(second_text)) => second_text.get().to_string(),
            _ => return,
        };
        if let Value::Text(first_text) = self.value_mut(first) {
            first_text.text.push_str(&second_text);
        }
        second.get().remove(self.arena_mut());
    }

    fn add_structure_check(&self, parent: Node, child: Node) -> Result<(), Error> {
        if self.parent(child).is_some() {
            return Err(Error::InvalidOperation(
                "node is already attached to a tree".to_string(),
            ));
        }
        match self.value_type(child) {
            ValueType::Root => {
                return Err(Error::InvalidOperation(
                    "cannot add a document root to a node".to_string(),
                ))
            }
            ValueType::Attribute => {
                return Err(Error::InvalidOperation(
                    "attributes cannot be added as children".to_string(),
                ))
            }
            _ => {}
        }
        match self.value_type(parent) {
            ValueType::Element => Ok(()),
            ValueType::Root => match self.value_type(child) {
                ValueType::Element => {
                    if self.element_children(parent).next().is_some() {
                        Err(Error::InvalidOperation(
                            "document already has an element".to_string(),
                        ))
                    } else {
                        Ok(())
                    }
                }
                ValueType::Text => Err(Error::InvalidOperation(
                    "cannot add text to the document root".to_string(),
                )),
                _ => Ok(()),
            },
            _ => Err(Error::InvalidOperation(
                "can only add children to elements or the document root".to_string(),
            )),
        }
    }
}
