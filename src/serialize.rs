use std::io::Write;

use crate::access::NodeEdge;
use crate::entity::{serialize_attribute, serialize_text};
use crate::error::Error;
use crate::pretty::{EndTag, Pretty};
use crate::treedata::{Node, Tree};
use crate::xmlvalue::{Element, Value};

/// ## Serialization
///
/// The serializer writes exactly what the tree holds. It does not add
/// missing namespace declarations or drop redundant ones; use
/// [`Tree::ensure_namespace_declared`] and [`Tree::optimize_namespaces`]
/// for that.
impl Tree {
    /// Write a node as XML.
    ///
    /// The node can be a document root or any node inside a document.
    pub fn write(&self, node: Node, w: &mut impl Write) -> Result<(), Error> {
        for edge in self.traverse(node) {
            match edge {
                NodeEdge::Start(node) => self.write_start(node, w)?,
                NodeEdge::End(node) => self.write_end(node, w)?,
            }
        }
        Ok(())
    }

    /// Serialize a node to a string.
    ///
    /// ```rust
    /// let mut tree = nsscope::Tree::new();
    /// let root = tree.parse(r#"<doc xmlns:p="ns"><p:a x="&amp;"/>text</doc>"#)?;
    /// assert_eq!(
    ///     tree.to_string(root)?,
    ///     r#"<doc xmlns:p="ns"><p:a x="&amp;"/>text</doc>"#
    /// );
    /// # Ok::<(), nsscope::Error>(())
    /// ```
    pub fn to_string(&self, node: Node) -> Result<String, Error> {
        let mut buf = Vec::new();
        self.write(node, &mut buf)?;
        // we only ever write valid UTF-8
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }

    /// Write a node as indented XML.
    ///
    /// Element-only content is written one node per line, indented by two
    /// spaces per level, with the whitespace-only text between the elements
    /// left out. Elements with text content keep their content as is, and
    /// so does `xml:space="preserve"` content. There is no XML declaration
    /// and no trailing newline.
    pub fn write_indented(&self, node: Node, w: &mut impl Write) -> Result<(), Error> {
        let mut pretty = Pretty::new(self);
        for edge in self.traverse(node) {
            match edge {
                NodeEdge::Start(node) => match self.value(node) {
                    Value::Root | Value::Attribute(_) => {}
                    Value::Text(text) => {
                        if !pretty.is_layout(node) {
                            write!(w, "{}", serialize_text(text.get()))?;
                        }
                    }
                    Value::Element(element) => {
                        write_indentation(w, pretty.indentation())?;
                        let empty = pretty.enter(node);
                        self.write_start_tag(node, element, empty, w)?;
                    }
                    Value::Comment(_) | Value::ProcessingInstruction(_) => {
                        write_indentation(w, pretty.indentation())?;
                        self.write_start(node, w)?;
                    }
                },
                NodeEdge::End(node) => {
                    if let Value::Element(element) = self.value(node) {
                        match pretty.leave(node) {
                            EndTag::Omitted => {}
                            EndTag::Inline => write!(w, "</{}>", element.qualified_name())?,
                            EndTag::Indented(indentation) => {
                                write_indentation(w, Some(indentation))?;
                                write!(w, "</{}>", element.qualified_name())?;
                            }
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// Serialize a node to an indented string.
    ///
    /// ```rust
    /// let mut tree = nsscope::Tree::new();
    /// let root = tree.parse("<doc>\n<a><b/></a>\n<p>some <em>text</em></p></doc>")?;
    /// assert_eq!(
    ///     tree.to_string_indented(root)?,
    ///     "<doc>\n  <a>\n    <b/>\n  </a>\n  <p>some <em>text</em></p>\n</doc>"
    /// );
    /// # Ok::<(), nsscope::Error>(())
    /// ```
    pub fn to_string_indented(&self, node: Node) -> Result<String, Error> {
        let mut buf = Vec::new();
        self.write_indented(node, &mut buf)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }

    fn write_start(&self, node: Node, w: &mut impl Write) -> Result<(), Error> {
        match self.value(node) {
            Value::Root | Value::Attribute(_) => {}
            Value::Element(element) => {
                self.write_start_tag(node, element, self.first_child(node).is_none(), w)?
            }
            Value::Text(text) => {
                write!(w, "{}", serialize_text(text.get()))?;
            }
            Value::Comment(comment) => {
                write!(w, "<!--{}-->", comment.get())?;
            }
            Value::ProcessingInstruction(pi) => match pi.data() {
                Some(data) => write!(w, "<?{} {}?>", pi.target(), data)?,
                None => write!(w, "<?{}?>", pi.target())?,
            },
        }
        Ok(())
    }

    fn write_start_tag(
        &self,
        node: Node,
        element: &Element,
        empty: bool,
        w: &mut impl Write,
    ) -> Result<(), Error> {
        write!(w, "<{}", element.qualified_name())?;
        for attribute_node in self.attribute_nodes(node) {
            if let Some(attribute) = self.attribute(attribute_node) {
                write!(
                    w,
                    " {}=\"{}\"",
                    attribute.qualified_name(),
                    serialize_attribute(attribute.value())
                )?;
            }
        }
        if empty {
            write!(w, "/>")?;
        } else {
            write!(w, ">")?;
        }
        Ok(())
    }

    fn write_end(&self, node: Node, w: &mut impl Write) -> Result<(), Error> {
        if let Value::Element(element) = self.value(node) {
            if self.first_child(node).is_some() {
                write!(w, "</{}>", element.qualified_name())?;
            }
        }
        Ok(())
    }
}

fn write_indentation(w: &mut impl Write, indentation: Option<usize>) -> Result<(), Error> {
    if let Some(indentation) = indentation {
        write!(w, "\n{}", "  ".repeat(indentation))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip() {
        let mut tree = Tree::new();
        let xml = r#"<root><a>1</a><b>2</b></root>"#;
        let root = tree.parse(xml).unwrap();
        assert_eq!(tree.to_string(root).unwrap(), xml);
    }

    #[test]
    fn test_roundtrip_ns() {
        let mut tree = Tree::new();
        let xml =
            r#"<foo:root xmlns:foo="http://example.com"><foo:a>1</foo:a><foo:b>2</foo:b></foo:root>"#;
        let root = tree.parse(xml).unwrap();
        assert_eq!(tree.to_string(root).unwrap(), xml);
    }

    #[test]
    fn test_roundtrip_default_ns() {
        let mut tree = Tree::new();
        let xml = r#"<root xmlns="http://example.com"><a>1</a><b xmlns="">2</b></root>"#;
        let root = tree.parse(xml).unwrap();
        assert_eq!(tree.to_string(root).unwrap(), xml);
    }

    #[test]
    fn test_roundtrip_attribute_order() {
        let mut tree = Tree::new();
        let xml = r#"<root b="B" xmlns:p="ns" p:a="A" xmlns="d"/>"#;
        let root = tree.parse(xml).unwrap();
        assert_eq!(tree.to_string(root).unwrap(), xml);
    }

    #[test]
    fn test_roundtrip_comment_and_pi() {
        let mut tree = Tree::new();
        let xml = r#"<!--before--><root><?target data?><!--inside--></root><?after?>"#;
        let root = tree.parse(xml).unwrap();
        assert_eq!(tree.to_string(root).unwrap(), xml);
    }

    #[test]
    fn test_serialize_subtree() {
        let mut tree = Tree::new();
        let root = tree.parse(r#"<root xmlns:p="ns"><p:a/></root>"#).unwrap();
        let doc = tree.document_element(root).unwrap();
        let a = tree.first_child(doc).unwrap();
        // the declaration lives on the parent, so it is not written
        assert_eq!(tree.to_string(a).unwrap(), "<p:a/>");
    }

    #[test]
    fn test_escape() {
        let mut tree = Tree::new();
        let root = tree.parse(r#"<a b="&quot;&lt;">&lt;&amp;&gt;</a>"#).unwrap();
        assert_eq!(
            tree.to_string(root).unwrap(),
            r#"<a b="&quot;&lt;">&lt;&amp;&gt;</a>"#
        );
    }
}
