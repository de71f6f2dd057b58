use indextree::NodeEdge as IndexTreeNodeEdge;

use crate::error::Error;
use crate::treedata::{Node, Tree};
use crate::xmlvalue::{Attribute, Element, Text, Value, ValueType};

/// Node edges.
///
/// Used by [`Tree::traverse`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeEdge {
    /// The start edge of a node. In case of an element
    /// this is the start tag. In case of root
    /// the start of the document.
    Start(Node),
    /// The end edge of a node. In case of an element
    /// this is the end tag. In case of root the end
    /// of the document. For any other values, the
    /// end edge occurs immediately after the start
    /// edge.
    End(Node),
}

fn check_local_name(local_name: Option<&str>) -> Result<(), Error> {
    if local_name == Some("") {
        return Err(Error::EmptyLocalName);
    }
    Ok(())
}

/// ## Read-only access
impl Tree {
    /// Access to the XML value for this node.
    #[inline]
    pub fn value(&self, node: Node) -> &Value {
        self.arena()[node.get()].get()
    }

    /// Mutable access to the XML value for this node.
    #[inline]
    pub fn value_mut(&mut self, node: Node) -> &mut Value {
        self.arena_mut()[node.get()].get_mut()
    }

    /// Get the [`ValueType`] of a node.
    pub fn value_type(&self, node: Node) -> ValueType {
        self.value(node).value_type()
    }

    /// Is this node an element?
    pub fn is_element(&self, node: Node) -> bool {
        self.value_type(node) == ValueType::Element
    }

    /// Is this node an attribute?
    pub fn is_attribute(&self, node: Node) -> bool {
        self.value_type(node) == ValueType::Attribute
    }

    /// Get the element value, if this node is an element.
    pub fn element(&self, node: Node) -> Option<&Element> {
        match self.value(node) {
            Value::Element(element) => Some(element),
            _ => None,
        }
    }

    /// Get the mutable element value, if this node is an element.
    pub fn element_mut(&mut self, node: Node) -> Option<&mut Element> {
        match self.value_mut(node) {
            Value::Element(element) => Some(element),
            _ => None,
        }
    }

    /// Get the attribute value, if this node is an attribute.
    pub fn attribute(&self, node: Node) -> Option<&Attribute> {
        match self.value(node) {
            Value::Attribute(attribute) => Some(attribute),
            _ => None,
        }
    }

    /// Get the mutable attribute value, if this node is an attribute.
    pub fn attribute_mut(&mut self, node: Node) -> Option<&mut Attribute> {
        match self.value_mut(node) {
            Value::Attribute(attribute) => Some(attribute),
            _ => None,
        }
    }

    /// Get the text value, if this node is a text node.
    pub fn text(&self, node: Node) -> Option<&Text> {
        match self.value(node) {
            Value::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Check whether a node has been removed.
    pub fn is_removed(&self, node: Node) -> bool {
        self.arena()[node.get()].is_removed()
    }

    /// Obtain the document element from the document root.
    ///
    /// Returns [`Error::NotRoot`] if this is not the document root, and
    /// [`Error::NoDocumentElement`] if the document has no element.
    ///
    /// ```rust
    /// let mut tree = nsscope::Tree::new();
    /// let root = tree.parse("<p>Example</p>")?;
    /// let doc_el = tree.document_element(root)?;
    /// assert_eq!(tree.element(doc_el).unwrap().local_name(), "p");
    /// # Ok::<(), nsscope::Error>(())
    /// ```
    pub fn document_element(&self, node: Node) -> Result<Node, Error> {
        if self.value_type(node) != ValueType::Root {
            return Err(Error::NotRoot(node));
        }
        self.element_children(node)
            .next()
            .ok_or(Error::NoDocumentElement)
    }

    /// Get parent node.
    ///
    /// Returns [`None`] if this is the root node or if the node is unattached.
    ///
    /// Attribute nodes have their element as parent, even though they
    /// aren't among its children.
    pub fn parent(&self, node: Node) -> Option<Node> {
        self.arena()[node.get()].parent().map(Node::new)
    }

    /// Get the parent node if it is an element.
    ///
    /// The document element has no parent element.
    pub fn parent_element(&self, node: Node) -> Option<Node> {
        self.parent(node).filter(|parent| self.is_element(*parent))
    }

    pub(crate) fn all_children(&self, node: Node) -> impl Iterator<Item = Node> + '_ {
        node.get().children(self.arena()).map(Node::new)
    }

    /// Iterator over the attribute nodes of an element, in order.
    ///
    /// This includes namespace declarations. For any other node it is empty.
    pub fn attribute_nodes(&self, node: Node) -> impl Iterator<Item = Node> + '_ {
        self.all_children(node)
            .take_while(|child| self.value(*child).is_attribute())
    }

    /// Iterator over the child nodes of this node.
    ///
    /// Attribute nodes aren't considered child nodes even
    /// though they have the element as parent.
    ///
    /// ```rust
    /// let mut tree = nsscope::Tree::new();
    /// let root = tree.parse(r#"<p x="X"><a/><b/></p>"#)?;
    /// let p = tree.document_element(root)?;
    /// assert_eq!(tree.children(p).count(), 2);
    /// # Ok::<(), nsscope::Error>(())
    /// ```
    pub fn children(&self, node: Node) -> impl Iterator<Item = Node> + '_ {
        self.all_children(node)
            .skip_while(|child| self.value(*child).is_attribute())
    }

    /// Iterator over the child elements of this node.
    pub fn element_children(&self, node: Node) -> impl Iterator<Item = Node> + '_ {
        self.children(node).filter(|child| self.is_element(*child))
    }

    /// Get first child.
    ///
    /// Returns [`None`] if there are no children.
    pub fn first_child(&self, node: Node) -> Option<Node> {
        self.children(node).next()
    }

    /// Get last child.
    ///
    /// Returns [`None`] if there are no children.
    pub fn last_child(&self, node: Node) -> Option<Node> {
        let last_child = self.arena()[node.get()].last_child()?;
        if self.arena()[last_child].get().is_attribute() {
            None
        } else {
            Some(Node::new(last_child))
        }
    }

    /// Iterator over ancestor nodes, including this one.
    ///
    /// ```rust
    /// let mut tree = nsscope::Tree::new();
    /// let root = tree.parse("<a><b><c/></b></a>")?;
    /// let a = tree.document_element(root)?;
    /// let b = tree.first_child(a).unwrap();
    /// let c = tree.first_child(b).unwrap();
    /// assert_eq!(tree.ancestors(c).collect::<Vec<_>>(), vec![c, b, a, root]);
    /// # Ok::<(), nsscope::Error>(())
    /// ```
    pub fn ancestors(&self, node: Node) -> impl Iterator<Item = Node> + '_ {
        node.get().ancestors(self.arena()).map(Node::new)
    }

    /// Traverse over node edges, in document order.
    ///
    /// Attribute nodes are not visited.
    pub fn traverse(&self, node: Node) -> impl Iterator<Item = NodeEdge> + '_ {
        node.get()
            .traverse(self.arena())
            .map(|edge| match edge {
                IndexTreeNodeEdge::Start(node_id) => NodeEdge::Start(Node::new(node_id)),
                IndexTreeNodeEdge::End(node_id) => NodeEdge::End(Node::new(node_id)),
            })
            .filter(|edge| match edge {
                NodeEdge::Start(node) | NodeEdge::End(node) => !self.is_attribute(*node),
            })
    }

    /// Iterator over this node and its descendants, in document order.
    ///
    /// Attribute nodes are not included.
    pub fn descendants(&self, node: Node) -> impl Iterator<Item = Node> + '_ {
        self.traverse(node).filter_map(|edge| match edge {
            NodeEdge::Start(node) => Some(node),
            NodeEdge::End(_) => None,
        })
    }

    /// Select the attributes of an element, optionally filtered by namespace
    /// URI and local name.
    ///
    /// Namespace declarations are attributes in the xmlns namespace, so they
    /// can be selected with [`XMLNS_NAMESPACE`](crate::XMLNS_NAMESPACE).
    ///
    /// An empty local name filter fails with [`Error::EmptyLocalName`].
    pub fn select_attributes<'a>(
        &'a self,
        node: Node,
        namespace_uri: Option<&'a str>,
        local_name: Option<&'a str>,
    ) -> Result<impl Iterator<Item = Node> + 'a, Error> {
        if !self.is_element(node) {
            return Err(Error::NotElement(node));
        }
        check_local_name(local_name)?;
        Ok(self.attribute_nodes(node).filter(move |attribute_node| {
            self.attribute(*attribute_node).is_some_and(|attribute| {
                namespace_uri.map_or(true, |uri| attribute.namespace_uri() == uri)
                    && local_name.map_or(true, |name| attribute.local_name() == name)
            })
        }))
    }

    fn element_matches(&self, node: Node, namespace_uri: Option<&str>, local_name: Option<&str>) -> bool {
        self.element(node).is_some_and(|element| {
            namespace_uri.map_or(true, |uri| element.namespace_uri() == uri)
                && local_name.map_or(true, |name| element.local_name() == name)
        })
    }

    /// Select the child elements of a node, optionally filtered by namespace
    /// URI and local name.
    ///
    /// ```rust
    /// let mut tree = nsscope::Tree::new();
    /// let root = tree.parse(r#"<doc xmlns:x="ns"><x:a/><a/><x:b/></doc>"#)?;
    /// let doc = tree.document_element(root)?;
    /// assert_eq!(tree.select_children(doc, Some("ns"), None)?.count(), 2);
    /// assert_eq!(tree.select_children(doc, None, Some("a"))?.count(), 2);
    /// assert_eq!(tree.select_children(doc, Some("ns"), Some("a"))?.count(), 1);
    /// # Ok::<(), nsscope::Error>(())
    /// ```
    pub fn select_children<'a>(
        &'a self,
        node: Node,
        namespace_uri: Option<&'a str>,
        local_name: Option<&'a str>,
    ) -> Result<impl Iterator<Item = Node> + 'a, Error> {
        check_local_name(local_name)?;
        Ok(self
            .element_children(node)
            .filter(move |child| self.element_matches(*child, namespace_uri, local_name)))
    }

    /// Select the descendant elements of a node in document order,
    /// optionally filtered by namespace URI and local name.
    pub fn select_descendants<'a>(
        &'a self,
        node: Node,
        namespace_uri: Option<&'a str>,
        local_name: Option<&'a str>,
    ) -> Result<impl Iterator<Item = Node> + 'a, Error> {
        check_local_name(local_name)?;
        Ok(self
            .descendants(node)
            .skip(1)
            .filter(move |descendant| {
                self.element_matches(*descendant, namespace_uri, local_name)
            }))
    }

    /// Like [`Tree::select_descendants`], but the node itself comes first
    /// if it matches.
    pub fn select_descendants_and_self<'a>(
        &'a self,
        node: Node,
        namespace_uri: Option<&'a str>,
        local_name: Option<&'a str>,
    ) -> Result<impl Iterator<Item = Node> + 'a, Error> {
        check_local_name(local_name)?;
        Ok(self
            .descendants(node)
            .filter(move |descendant| {
                self.element_matches(*descendant, namespace_uri, local_name)
            }))
    }
}
