use ahash::{HashSet, HashSetExt};
use log::debug;

use crate::creation::declaration_attribute;
use crate::declaration::XML_NAMESPACE;
use crate::error::Error;
use crate::prefixed::PrefixedNamespace;
use crate::treedata::{Node, Tree};

/// ## Namespace scope
///
/// Namespace declarations are ordinary attribute nodes, so the namespace a
/// prefix resolves to is always computed from the tree as it is now: there
/// is no cached scope to invalidate when declarations are added or removed.
impl Tree {
    /// The namespace URI a prefix resolves to at a node.
    ///
    /// The declarations of the node itself and then of its ancestors are
    /// consulted; the nearest declaring element wins. If one element
    /// declares the same prefix twice, the last declaration wins.
    ///
    /// The `xml` prefix always resolves to the XML namespace. The empty
    /// prefix resolves to the empty URI ("no namespace") when no default
    /// namespace is declared. Any other undeclared prefix gives [`None`].
    ///
    /// ```rust
    /// let mut tree = nsscope::Tree::new();
    /// let root = tree.parse(r#"<a xmlns:p="outer"><b xmlns:p="inner"/></a>"#)?;
    /// let a = tree.document_element(root)?;
    /// let b = tree.first_child(a).unwrap();
    /// assert_eq!(tree.namespace_for_prefix(a, "p"), Some("outer"));
    /// assert_eq!(tree.namespace_for_prefix(b, "p"), Some("inner"));
    /// assert_eq!(tree.namespace_for_prefix(b, ""), Some(""));
    /// assert_eq!(tree.namespace_for_prefix(b, "q"), None);
    /// # Ok::<(), nsscope::Error>(())
    /// ```
    pub fn namespace_for_prefix(&self, node: Node, prefix: &str) -> Option<&str> {
        if prefix == "xml" {
            return Some(XML_NAMESPACE);
        }
        for ancestor in self.ancestors(node) {
            if let Some(uri) = self.declared_namespace(ancestor, prefix) {
                return Some(uri);
            }
        }
        if prefix.is_empty() {
            Some("")
        } else {
            None
        }
    }

    /// The namespace an element itself declares for a prefix, if any.
    fn declared_namespace(&self, element: Node, prefix: &str) -> Option<&str> {
        self.attribute_nodes(element)
            .filter_map(|node| self.attribute(node))
            .filter(|attribute| {
                attribute.is_namespace_declaration() && attribute.declared_prefix() == prefix
            })
            .last()
            .map(|attribute| attribute.value())
    }

    /// Make sure an element has the given binding in scope.
    ///
    /// Declarations on the element for the same prefix are collapsed: the
    /// first one with the right URI is kept, duplicates and declarations
    /// with a different URI are removed.
    ///
    /// If the element has no declaration with the right URI, one is added,
    /// unless `declare_even_if_inherited` is false and the parent already
    /// resolves the prefix to the URI.
    ///
    /// If the element is written with the binding's prefix, its namespace
    /// URI is set to the binding's URI.
    ///
    /// Calling this twice with the same arguments changes nothing the
    /// second time. Returns the element.
    ///
    /// ```rust
    /// use nsscope::PrefixedNamespace;
    ///
    /// let mut tree = nsscope::Tree::new();
    /// let root = tree.parse(r#"<root><child xmlns:prefix="wrong"/></root>"#)?;
    /// let child = tree.first_child(tree.document_element(root)?).unwrap();
    /// let binding = PrefixedNamespace::new("prefix", "ns")?;
    /// tree.ensure_namespace_declared(child, false, &binding)?;
    /// assert_eq!(tree.to_string(child)?, r#"<child xmlns:prefix="ns"/>"#);
    /// # Ok::<(), nsscope::Error>(())
    /// ```
    pub fn ensure_namespace_declared(
        &mut self,
        element: Node,
        declare_even_if_inherited: bool,
        binding: &PrefixedNamespace,
    ) -> Result<Node, Error> {
        if !self.is_element(element) {
            return Err(Error::NotElement(element));
        }

        // snapshot, as we remove while going through them
        let declarations = self
            .attribute_nodes(element)
            .filter(|node| {
                self.attribute(*node).is_some_and(|attribute| {
                    attribute.is_namespace_declaration()
                        && attribute.declared_prefix() == binding.prefix()
                })
            })
            .collect::<Vec<_>>();

        let mut already_declared = false;
        for declaration in declarations {
            let matches = self
                .attribute(declaration)
                .is_some_and(|attribute| attribute.value() == binding.uri());
            if already_declared || !matches {
                debug!("removing conflicting declaration for {}", binding);
                self.remove_attribute_node(declaration)?;
            } else {
                already_declared = true;
            }
        }

        if !already_declared {
            let inherited = self
                .parent(element)
                .and_then(|parent| self.namespace_for_prefix(parent, binding.prefix()))
                == Some(binding.uri());
            if declare_even_if_inherited || !inherited {
                debug!("adding declaration {}", binding);
                self.insert_attribute(element, declaration_attribute(binding))?;
            }
        }

        if let Some(value) = self.element_mut(element) {
            if value.prefix() == binding.prefix() && value.namespace_uri() != binding.uri() {
                value.set_namespace_uri(binding.uri());
            }
        }
        Ok(element)
    }

    /// Find namespace references in a subtree that have no declaring
    /// prefix in scope.
    ///
    /// Only declarations inside the subtree count; those on ancestors of
    /// `element` are not considered. A reference counts as declared as soon
    /// as some declaration for its prefix is in scope, whatever URI it binds.
    /// References to no namespace at all (unprefixed names with the empty
    /// URI) are never reported.
    ///
    /// ```rust
    /// use nsscope::PrefixedNamespace;
    ///
    /// let mut tree = nsscope::Tree::new();
    /// let root = tree.parse(
    ///     r#"<root xmlns="ns1" xmlns:a="unused"><child xmlns:b="unused"/></root>"#,
    /// )?;
    /// let child = tree.first_child(tree.document_element(root)?).unwrap();
    /// let undeclared = tree.namespaces_not_declared_in_progeny(child)?;
    /// assert_eq!(undeclared.len(), 1);
    /// assert!(undeclared.contains(&PrefixedNamespace::default_namespace("ns1")));
    /// # Ok::<(), nsscope::Error>(())
    /// ```
    pub fn namespaces_not_declared_in_progeny(
        &self,
        element: Node,
    ) -> Result<HashSet<PrefixedNamespace>, Error> {
        if !self.is_element(element) {
            return Err(Error::NotElement(element));
        }
        let mut undeclared = HashSet::new();
        let mut stack: Vec<(Node, HashSet<&str>)> = vec![(element, HashSet::new())];
        while let Some((node, mut prefixes)) = stack.pop() {
            let attributes = self
                .attribute_nodes(node)
                .filter_map(|attribute_node| self.attribute(attribute_node))
                .collect::<Vec<_>>();
            for attribute in &attributes {
                if attribute.is_namespace_declaration() {
                    prefixes.insert(attribute.declared_prefix());
                }
            }
            for attribute in attributes {
                if attribute.is_namespace_declaration() {
                    continue;
                }
                if (!attribute.prefix().is_empty() || !attribute.namespace_uri().is_empty())
                    && !prefixes.contains(attribute.prefix())
                {
                    undeclared.insert(attribute.prefixed_namespace()?);
                }
            }
            if let Some(value) = self.element(node) {
                if (!value.prefix().is_empty() || !value.namespace_uri().is_empty())
                    && !prefixes.contains(value.prefix())
                {
                    undeclared.insert(value.prefixed_namespace()?);
                }
            }
            // reversed, so children come off the stack in document order
            let children = self.element_children(node).collect::<Vec<_>>();
            for child in children.into_iter().rev() {
                stack.push((child, prefixes.clone()));
            }
        }
        Ok(undeclared)
    }
}
