use indextree::{Arena, NodeId};

use crate::xmlvalue::Value;

pub(crate) type XmlArena = Arena<Value>;

/// A node in the XML tree.
/// This is a lightweight value and can be copied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Node(NodeId);

impl Node {
    #[inline]
    pub(crate) fn new(node_id: NodeId) -> Self {
        Node(node_id)
    }

    #[inline]
    pub(crate) fn get(&self) -> NodeId {
        self.0
    }
}

/// The `Tree` struct owns all XML nodes in your program. It lets you
/// parse, access and manipulate one or more documents, and it is where
/// the namespace operations live.
///
/// `Tree` is implemented in several sections focusing on different aspects:
/// access, creation, manipulation, parsing, serialization, namespace scope
/// lookup and namespace declaration optimization.
pub struct Tree {
    pub(crate) arena: XmlArena,
}

impl Tree {
    /// Create a new, empty `Tree`.
    pub fn new() -> Self {
        Tree {
            arena: XmlArena::new(),
        }
    }

    #[inline]
    pub(crate) fn arena(&self) -> &XmlArena {
        &self.arena
    }

    #[inline]
    pub(crate) fn arena_mut(&mut self) -> &mut XmlArena {
        &mut self.arena
    }
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}
