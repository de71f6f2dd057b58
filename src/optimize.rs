//! Removing redundant and unused namespace declarations.
//!
//! The optimizer walks a subtree once. On the way down it drops
//! declarations that restate what is already in scope, and tracks the rest.
//! Every element and attribute that resolves its prefix through a tracked
//! declaration counts as a reference to it. On the way back up, once an
//! element's whole subtree has been visited, its tracked declarations
//! without references are removed.
//!
//! Removing an unused declaration can expose an outer binding that makes a
//! declaration below it redundant after all. The walk is therefore repeated
//! until it removes nothing, which makes the result a fixed point.

use ahash::{HashMap, HashMapExt};
use log::{debug, trace};

use crate::error::Error;
use crate::treedata::{Node, Tree};
use crate::xmlvalue::ValueType;

/// A declaration in scope during a traversal.
struct Declaration {
    /// The element the declaration sits on.
    element: Node,
    attribute: Node,
    uri: String,
    references: usize,
}

/// Prefix to index into the declaration table.
///
/// Each element gets its own copy, so what a child declares is never
/// visible to its siblings or its parent.
type Scope = HashMap<String, usize>;

enum Frame {
    Enter(Node, Scope),
    /// Prune the unreferenced declarations among these, once the subtree
    /// of the element that tracked them is done.
    Exit(Vec<usize>),
}

struct Optimizer {
    declarations: Vec<Declaration>,
    removed: usize,
}

/// A declaration attribute as found on an element, before any removal.
struct Found {
    attribute: Node,
    prefix: String,
    uri: String,
}

impl Optimizer {
    fn new() -> Self {
        Optimizer {
            declarations: Vec::new(),
            removed: 0,
        }
    }

    fn declare(&mut self, scope: &mut Scope, element: Node, found: Found) -> usize {
        let index = self.declarations.len();
        self.declarations.push(Declaration {
            element,
            attribute: found.attribute,
            uri: found.uri,
            references: 0,
        });
        scope.insert(found.prefix, index);
        index
    }

    /// A declaration is redundant if it resets the default namespace where
    /// none is in effect, if the element already declared the prefix, or
    /// if it binds the prefix to the URI already in scope.
    fn is_redundant(&self, scope: &Scope, element: Node, found: &Found) -> bool {
        match scope.get(&found.prefix) {
            None => found.prefix.is_empty() && found.uri.is_empty(),
            Some(&index) => {
                let active = &self.declarations[index];
                active.element == element || active.uri == found.uri
            }
        }
    }

    fn reference(&mut self, scope: &Scope, prefix: &str) {
        if let Some(&index) = scope.get(prefix) {
            self.declarations[index].references += 1;
        }
    }

    fn run(&mut self, tree: &mut Tree, element: Node, scope: Scope) -> Result<(), Error> {
        let mut stack = vec![Frame::Enter(element, scope)];
        while let Some(frame) = stack.pop() {
            match frame {
                Frame::Enter(element, mut scope) => {
                    let tracked = self.enter(tree, element, &mut scope)?;
                    stack.push(Frame::Exit(tracked));
                    let children = tree.element_children(element).collect::<Vec<_>>();
                    // reversed, so children are entered in document order
                    for child in children.into_iter().rev() {
                        stack.push(Frame::Enter(child, scope.clone()));
                    }
                }
                Frame::Exit(tracked) => self.exit(tree, tracked)?,
            }
        }
        Ok(())
    }

    fn enter(&mut self, tree: &mut Tree, element: Node, scope: &mut Scope) -> Result<Vec<usize>, Error> {
        let mut tracked = Vec::new();
        for found in declarations_of(tree, element) {
            if self.is_redundant(scope, element, &found) {
                debug!(
                    "removing redundant declaration of prefix {:?} for {:?}",
                    found.prefix, found.uri
                );
                tree.remove_attribute_node(found.attribute)?;
                self.removed += 1;
            } else {
                tracked.push(self.declare(scope, element, found));
            }
        }

        if let Some(value) = tree.element(element) {
            self.reference(scope, value.prefix());
        }
        for attribute_node in tree.attribute_nodes(element) {
            if let Some(attribute) = tree.attribute(attribute_node) {
                if !attribute.is_namespace_declaration() {
                    self.reference(scope, attribute.prefix());
                }
            }
        }
        Ok(tracked)
    }

    fn exit(&mut self, tree: &mut Tree, tracked: Vec<usize>) -> Result<(), Error> {
        for index in tracked {
            let declaration = &self.declarations[index];
            if declaration.references == 0 {
                debug!("removing unused declaration of {:?}", declaration.uri);
                tree.remove_attribute_node(declaration.attribute)?;
                self.removed += 1;
            }
        }
        Ok(())
    }
}

fn declarations_of(tree: &Tree, element: Node) -> Vec<Found> {
    tree.attribute_nodes(element)
        .filter_map(|node| {
            let attribute = tree.attribute(node)?;
            attribute.is_namespace_declaration().then(|| Found {
                attribute: node,
                prefix: attribute.declared_prefix().to_string(),
                uri: attribute.value().to_string(),
            })
        })
        .collect()
}

/// ## Namespace optimization
impl Tree {
    /// Remove redundant and unused namespace declarations.
    ///
    /// `node` is either the document root, in which case the document
    /// element is optimized, or any element. A declaration is removed when
    /// it restates a binding already in scope, when its element declares
    /// the same prefix earlier on, or when nothing in its subtree uses its
    /// prefix. Declarations are never moved, and the prefixes of elements
    /// and attributes never change, so every name resolves as it did before.
    ///
    /// When `node` is below the document element, the declarations of its
    /// ancestors are in scope but are never removed.
    ///
    /// Optimizing an optimized tree changes nothing.
    ///
    /// Returns `node`.
    ///
    /// ```rust
    /// let mut tree = nsscope::Tree::new();
    /// let root = tree.parse(
    ///     r#"<a xmlns:p="ns" xmlns:unused="x"><p:b xmlns:p="ns"/></a>"#,
    /// )?;
    /// tree.optimize_namespaces(root)?;
    /// assert_eq!(tree.to_string(root)?, r#"<a xmlns:p="ns"><p:b/></a>"#);
    /// # Ok::<(), nsscope::Error>(())
    /// ```
    pub fn optimize_namespaces(&mut self, node: Node) -> Result<Node, Error> {
        let element = match self.value_type(node) {
            ValueType::Root => match self.document_element(node) {
                Ok(element) => element,
                Err(Error::NoDocumentElement) => return Ok(node),
                Err(e) => return Err(e),
            },
            ValueType::Element => node,
            _ => return Err(Error::NotElement(node)),
        };

        // pruning an unused declaration can make a declaration further down
        // redundant, so repeat until a pass removes nothing
        let mut pass = 0;
        loop {
            pass += 1;
            let mut optimizer = Optimizer::new();
            let scope = self.inherited_scope(&mut optimizer, element);
            optimizer.run(self, element, scope)?;
            trace!(
                "namespace optimization pass {} removed {} of {} declarations",
                pass,
                optimizer.removed,
                optimizer.declarations.len()
            );
            if optimizer.removed == 0 {
                break;
            }
        }
        Ok(node)
    }

    /// The scope in effect at an element from the declarations of its
    /// ancestors. These are tracked but never pruned.
    fn inherited_scope(&self, optimizer: &mut Optimizer, element: Node) -> Scope {
        let mut scope = Scope::new();
        let ancestors = self
            .ancestors(element)
            .skip(1)
            .filter(|ancestor| self.is_element(*ancestor))
            .collect::<Vec<_>>();
        for ancestor in ancestors.into_iter().rev() {
            // the last declaration of a prefix on one ancestor wins, as in
            // `namespace_for_prefix`; these are outside the pass, so the
            // pass's first-wins rule doesn't apply to them
            for found in declarations_of(self, ancestor) {
                optimizer.declare(&mut scope, ancestor, found);
            }
        }
        scope
    }
}
