use crate::declaration::XML_NAMESPACE;
use crate::treedata::{Node, Tree};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Space {
    Empty,
    Default,
    Preserve,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StackEntry {
    Unmixed(Space),
    Mixed,
}

struct Level {
    entry: StackEntry,
    /// All content was layout whitespace, so the element is written as
    /// `<x/>`.
    empty: bool,
}

/// How to write the end tag of an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EndTag {
    /// The start tag was already written as `<x/>`.
    Omitted,
    Inline,
    /// On a new line, at this indentation.
    Indented(usize),
}

/// Decides where indented output gets line breaks.
///
/// Element-only content is indented, and whitespace-only text in it is
/// layout that gets dropped. Content with text in it is mixed, and is
/// written as is, including any elements nested in it. So is content under
/// `xml:space="preserve"`, until `xml:space="default"` switches it back.
pub(crate) struct Pretty<'a> {
    tree: &'a Tree,
    stack: Vec<Level>,
    started: bool,
}

impl<'a> Pretty<'a> {
    pub(crate) fn new(tree: &'a Tree) -> Pretty<'a> {
        Pretty {
            tree,
            stack: Vec::new(),
            started: false,
        }
    }

    fn in_mixed(&self) -> bool {
        self.stack.iter().any(|level| level.entry == StackEntry::Mixed)
    }

    fn in_space_preserve(&self) -> bool {
        for level in self.stack.iter().rev() {
            match level.entry {
                StackEntry::Unmixed(Space::Preserve) => return true,
                StackEntry::Unmixed(Space::Default) => return false,
                StackEntry::Unmixed(Space::Empty) => (),
                StackEntry::Mixed => return false,
            }
        }
        false
    }

    fn indenting(&self) -> bool {
        !self.in_mixed() && !self.in_space_preserve()
    }

    fn get_indentation(&self) -> usize {
        let mut count = 0;
        let mut in_preserve = false;
        for level in self.stack.iter() {
            match level.entry {
                StackEntry::Unmixed(Space::Default) => {
                    in_preserve = false;
                    count += 1
                }
                StackEntry::Unmixed(Space::Preserve) => in_preserve = true,
                StackEntry::Unmixed(Space::Empty) => {
                    if !in_preserve {
                        count += 1
                    }
                }
                StackEntry::Mixed => (),
            }
        }
        count
    }

    fn is_whitespace_text(&self, node: Node) -> bool {
        self.tree
            .text(node)
            .is_some_and(|text| text.get().trim().is_empty())
    }

    fn has_text_child(&self, node: Node) -> bool {
        self.tree
            .children(node)
            .any(|child| self.tree.text(child).is_some() && !self.is_whitespace_text(child))
    }

    fn element_space(&self, node: Node) -> Space {
        let space = self
            .tree
            .attribute_nodes(node)
            .filter_map(|attribute_node| self.tree.attribute(attribute_node))
            .find(|attribute| {
                attribute.namespace_uri() == XML_NAMESPACE && attribute.local_name() == "space"
            })
            .map(|attribute| attribute.value());
        match space {
            Some("preserve") => Space::Preserve,
            Some("default") => Space::Default,
            _ => Space::Empty,
        }
    }

    /// The indentation to put on a new line before a start tag, comment or
    /// processing instruction, if it goes on a new line at all.
    pub(crate) fn indentation(&mut self) -> Option<usize> {
        let newline = self.started && self.indenting();
        self.started = true;
        newline.then(|| self.get_indentation())
    }

    /// Whether a text node is layout to leave out.
    pub(crate) fn is_layout(&mut self, node: Node) -> bool {
        if self.indenting() && self.is_whitespace_text(node) {
            return true;
        }
        self.started = true;
        false
    }

    /// Enter an element, after its start tag is positioned. Returns whether
    /// it is to be written as an empty element.
    pub(crate) fn enter(&mut self, node: Node) -> bool {
        if self.tree.first_child(node).is_none() {
            return true;
        }
        let entry = if self.has_text_child(node) {
            StackEntry::Mixed
        } else {
            StackEntry::Unmixed(self.element_space(node))
        };
        self.stack.push(Level { entry, empty: false });
        let empty = self.indenting()
            && self
                .tree
                .children(node)
                .all(|child| self.is_whitespace_text(child));
        if let Some(level) = self.stack.last_mut() {
            level.empty = empty;
        }
        empty
    }

    /// Leave an element whose content has been written.
    pub(crate) fn leave(&mut self, node: Node) -> EndTag {
        if self.tree.first_child(node).is_none() {
            return EndTag::Omitted;
        }
        let indenting = self.indenting();
        match self.stack.pop() {
            None => EndTag::Inline,
            Some(level) if level.empty => EndTag::Omitted,
            Some(_) if indenting => EndTag::Indented(self.get_indentation()),
            Some(_) => EndTag::Inline,
        }
    }
}
