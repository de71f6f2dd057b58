#![forbid(unsafe_code)]

//! XML namespace scoping on an in-memory tree.
//!
//! A [`Tree`] holds documents parsed from XML text or built up by hand.
//! Namespace declarations are kept as attributes of their element, in the
//! namespace [`XMLNS_NAMESPACE`], so they can be inspected and changed like
//! any other attribute. On top of that:
//!
//! - [`Tree::namespace_for_prefix`] resolves a prefix through the
//!   declarations in scope at a node.
//! - [`Tree::ensure_namespace_declared`] makes sure an element has a
//!   [`PrefixedNamespace`] binding in scope, adding or replacing a
//!   declaration only when needed.
//! - [`Tree::namespaces_not_declared_in_progeny`] reports the namespaces a
//!   subtree uses without declaring them.
//! - [`Tree::optimize_namespaces`] removes every declaration that is
//!   redundant or unused, without moving declarations or changing prefixes.
//!
//! ```rust
//! use nsscope::{PrefixedNamespace, Tree};
//!
//! let mut tree = Tree::new();
//! let root = tree.parse(r#"<doc xmlns:a="ns:a" xmlns:b="ns:b"><a:x xmlns:a="ns:a"/></doc>"#)?;
//! tree.optimize_namespaces(root)?;
//! assert_eq!(tree.to_string(root)?, r#"<doc xmlns:a="ns:a"><a:x/></doc>"#);
//!
//! let doc = tree.document_element(root)?;
//! let c = PrefixedNamespace::new("c", "ns:c")?;
//! let y = tree.append_element(doc, &c, "y")?;
//! assert_eq!(tree.namespaces_not_declared_in_progeny(doc)?.len(), 1);
//! tree.ensure_namespace_declared(y, false, &c)?;
//! assert!(tree.namespaces_not_declared_in_progeny(doc)?.is_empty());
//! # Ok::<(), nsscope::Error>(())
//! ```

mod access;
mod creation;
mod declaration;
mod entity;
mod error;
mod manipulation;
mod optimize;
mod parse;
mod prefixed;
mod pretty;
mod scope;
mod serialize;
mod treedata;
mod xmlvalue;

pub use access::NodeEdge;
pub use declaration::{XMLNS_NAMESPACE, XML_NAMESPACE};
pub use error::Error;
pub use prefixed::{normalize_prefix, PrefixedNamespace};
pub use treedata::{Node, Tree};
pub use xmlvalue::{
    Attribute, Comment, Element, ProcessingInstruction, Text, Value, ValueType,
};
