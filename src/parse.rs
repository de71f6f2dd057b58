use ahash::HashMap;
use xmlparser::{ElementEnd, Token, Tokenizer};

use crate::declaration::{XMLNS_NAMESPACE, XML_NAMESPACE};
use crate::entity::parse_entities;
use crate::error::Error;
use crate::treedata::{Node, Tree};
use crate::xmlvalue::{Attribute, Element, Value};

type Prefixes = HashMap<String, String>;

struct PendingAttribute<'a> {
    prefix: &'a str,
    local: &'a str,
    value: String,
}

struct PendingElement<'a> {
    prefix: &'a str,
    local: &'a str,
    attributes: Vec<PendingAttribute<'a>>,
}

impl<'a> PendingElement<'a> {
    fn qualified_name(&self) -> String {
        qualified_name(self.prefix, self.local)
    }
}

/// Builds a document from tokens.
///
/// Namespaces are resolved while building: every element and attribute gets
/// the namespace URI its prefix is bound to at that point.
struct DocumentBuilder<'a> {
    root: Node,
    current: Node,
    prefix_stack: Vec<Prefixes>,
    pending: Option<PendingElement<'a>>,
}

impl<'a> DocumentBuilder<'a> {
    fn new(root: Node) -> Self {
        DocumentBuilder {
            root,
            current: root,
            prefix_stack: vec![Prefixes::default()],
            pending: None,
        }
    }

    fn top_prefixes(&self) -> &Prefixes {
        // there is always at least one entry on the stack
        &self.prefix_stack[self.prefix_stack.len() - 1]
    }

    fn resolve_prefix(prefixes: &Prefixes, prefix: &str) -> Result<String, Error> {
        match prefix {
            "xml" => Ok(XML_NAMESPACE.to_string()),
            "" => Ok(prefixes.get("").cloned().unwrap_or_default()),
            _ => prefixes
                .get(prefix)
                .cloned()
                .ok_or_else(|| Error::UnknownPrefix(prefix.to_string())),
        }
    }

    fn element_start(&mut self, prefix: &'a str, local: &'a str) {
        self.pending = Some(PendingElement {
            prefix,
            local,
            attributes: Vec::new(),
        });
    }

    fn attribute(&mut self, prefix: &'a str, local: &'a str, value: &'a str) -> Result<(), Error> {
        let value = parse_entities(value)?.into_owned();
        if let Some(pending) = self.pending.as_mut() {
            pending.attributes.push(PendingAttribute {
                prefix,
                local,
                value,
            });
        }
        Ok(())
    }

    fn open_element(&mut self, tree: &mut Tree, is_empty: bool) -> Result<(), Error> {
        let pending = self
            .pending
            .take()
            .ok_or_else(|| Error::InvalidOperation("element end without start".to_string()))?;

        // add in the new declarations. This may shadow existing prefixes
        let mut prefixes = self.top_prefixes().clone();
        for attribute in &pending.attributes {
            if attribute.prefix == "xmlns" {
                if attribute.value.is_empty() {
                    return Err(Error::InvalidBinding(attribute.local.to_string()));
                }
                prefixes.insert(attribute.local.to_string(), attribute.value.clone());
            } else if attribute.prefix.is_empty() && attribute.local == "xmlns" {
                prefixes.insert(String::new(), attribute.value.clone());
            }
        }

        let namespace_uri = Self::resolve_prefix(&prefixes, pending.prefix)?;
        let element = Element::new(
            pending.prefix.to_string(),
            pending.local.to_string(),
            namespace_uri,
        );
        let element_node = tree.new_node(Value::Element(element));
        tree.append(self.current, element_node)?;

        let mut seen = Vec::with_capacity(pending.attributes.len());
        for attribute in pending.attributes {
            let is_declaration = attribute.prefix == "xmlns"
                || (attribute.prefix.is_empty() && attribute.local == "xmlns");
            let namespace_uri = if is_declaration {
                XMLNS_NAMESPACE.to_string()
            } else if attribute.prefix.is_empty() {
                // unprefixed attributes are in no namespace
                String::new()
            } else {
                Self::resolve_prefix(&prefixes, attribute.prefix)?
            };
            let name = (attribute.prefix, attribute.local);
            if seen.contains(&name) {
                return Err(Error::DuplicateAttribute(qualified_name(
                    attribute.prefix,
                    attribute.local,
                )));
            }
            seen.push(name);
            tree.insert_attribute(
                element_node,
                Attribute::new(
                    attribute.prefix.to_string(),
                    attribute.local.to_string(),
                    namespace_uri,
                    attribute.value,
                ),
            )?;
        }

        if !is_empty {
            self.prefix_stack.push(prefixes);
            self.current = element_node;
        }
        Ok(())
    }

    fn close_element(&mut self, tree: &Tree, prefix: &str, local: &str) -> Result<(), Error> {
        let element = tree
            .element(self.current)
            .ok_or_else(|| Error::InvalidCloseTag(String::new(), qualified_name(prefix, local)))?;
        if element.prefix() != prefix || element.local_name() != local {
            return Err(Error::InvalidCloseTag(
                element.qualified_name(),
                qualified_name(prefix, local),
            ));
        }
        self.prefix_stack.pop();
        self.current = tree.parent(self.current).unwrap_or(self.root);
        Ok(())
    }

    fn text(&mut self, tree: &mut Tree, text: &str) -> Result<(), Error> {
        if self.current == self.root {
            if text.trim().is_empty() {
                return Ok(());
            }
            return Err(Error::InvalidOperation(
                "text outside of the document element".to_string(),
            ));
        }
        tree.append_text(self.current, text)
    }

    fn finish(self, tree: &Tree) -> Result<Node, Error> {
        if let Some(pending) = &self.pending {
            return Err(Error::UnclosedElement(pending.qualified_name()));
        }
        if self.current != self.root {
            let name = tree
                .element(self.current)
                .map(|element| element.qualified_name())
                .unwrap_or_default();
            return Err(Error::UnclosedElement(name));
        }
        tree.document_element(self.root)?;
        Ok(self.root)
    }
}

fn qualified_name(prefix: &str, local: &str) -> String {
    if prefix.is_empty() {
        local.to_string()
    } else {
        format!("{}:{}", prefix, local)
    }
}

/// ## Parsing
impl Tree {
    /// Parse a string containing XML into a document.
    ///
    /// Returns the document root node. Namespace prefixes are resolved while
    /// parsing, so every element and attribute knows its namespace URI.
    ///
    /// ```rust
    /// let mut tree = nsscope::Tree::new();
    /// let root = tree.parse(r#"<p:doc xmlns:p="ns"><p:a/><b/></p:doc>"#)?;
    /// let doc = tree.document_element(root)?;
    /// let element = tree.element(doc).unwrap();
    /// assert_eq!(element.prefix(), "p");
    /// assert_eq!(element.namespace_uri(), "ns");
    /// # Ok::<(), nsscope::Error>(())
    /// ```
    pub fn parse(&mut self, xml: &str) -> Result<Node, Error> {
        let root = self.new_document();
        let mut builder = DocumentBuilder::new(root);

        for token in Tokenizer::from(xml) {
            match token? {
                Token::Declaration { .. } => {}
                Token::DtdStart { .. }
                | Token::EmptyDtd { .. }
                | Token::EntityDeclaration { .. }
                | Token::DtdEnd { .. } => {
                    return Err(Error::DtdUnsupported);
                }
                Token::ProcessingInstruction {
                    target, content, ..
                } => {
                    let pi = self.new_processing_instruction(
                        target.as_str(),
                        content.map(|content| content.as_str()),
                    )?;
                    self.append(builder.current, pi)?;
                }
                Token::Comment { text, .. } => {
                    let comment = self.new_comment(text.as_str())?;
                    self.append(builder.current, comment)?;
                }
                Token::ElementStart { prefix, local, .. } => {
                    builder.element_start(prefix.as_str(), local.as_str());
                }
                Token::Attribute {
                    prefix,
                    local,
                    value,
                    ..
                } => {
                    builder.attribute(prefix.as_str(), local.as_str(), value.as_str())?;
                }
                Token::ElementEnd { end, .. } => match end {
                    ElementEnd::Open => builder.open_element(self, false)?,
                    ElementEnd::Empty => builder.open_element(self, true)?,
                    ElementEnd::Close(prefix, local) => {
                        builder.close_element(self, prefix.as_str(), local.as_str())?
                    }
                },
                Token::Text { text } => {
                    let text = parse_entities(text.as_str())?;
                    builder.text(self, &text)?;
                }
                Token::Cdata { text, .. } => {
                    builder.text(self, text.as_str())?;
                }
            }
        }
        builder.finish(self)
    }
}
