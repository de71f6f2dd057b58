use std::fmt::{Display, Formatter};

use crate::treedata::Node;

/// Errors produced by `nsscope`.
#[derive(Debug)]
pub enum Error {
    /// The node is not the document root.
    NotRoot(Node),
    /// The node is not an element.
    NotElement(Node),
    /// The node is not an attribute.
    NotAttribute(Node),
    /// A non-default prefix was bound to the empty namespace URI.
    ///
    /// Only the default namespace may be reset to no namespace, so
    /// `xmlns=""` is allowed but `xmlns:p=""` is not.
    InvalidBinding(String),
    /// Elements and attributes need a non-empty local name.
    EmptyLocalName,
    /// The operation would break the structure of the tree, for instance
    /// adding a second document element, or a child to a text node.
    InvalidOperation(String),
    /// Comment text may not contain `--`.
    InvalidComment(String),
    /// Processing instruction targets may not be empty or `xml`.
    InvalidTarget(String),
    /// The prefix is not declared in scope.
    UnknownPrefix(String),
    /// The close tag does not match the open tag.
    InvalidCloseTag(String, String),
    /// The element was never closed.
    UnclosedElement(String),
    /// The document has no document element.
    NoDocumentElement,
    /// The same attribute appears twice on one element.
    DuplicateAttribute(String),
    /// An entity reference was not closed with `;`.
    UnclosedEntity(String),
    /// The entity is not a predefined entity or valid character reference.
    InvalidEntity(String),
    /// Document type declarations are not supported.
    DtdUnsupported,
    /// The tokenizer rejected the input.
    Parser(xmlparser::Error),
    /// Tree operation failed.
    Node(indextree::NodeError),
    /// Writing output failed.
    Io(std::io::Error),
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::NotRoot(node) => write!(f, "node {:?} is not a document root", node),
            Error::NotElement(node) => write!(f, "node {:?} is not an element", node),
            Error::NotAttribute(node) => write!(f, "node {:?} is not an attribute", node),
            Error::InvalidBinding(prefix) => write!(
                f,
                "prefix {:?} cannot be bound to the empty namespace URI",
                prefix
            ),
            Error::EmptyLocalName => write!(f, "local name cannot be empty"),
            Error::InvalidOperation(msg) => write!(f, "invalid operation: {}", msg),
            Error::InvalidComment(text) => write!(f, "invalid comment: {:?}", text),
            Error::InvalidTarget(target) => {
                write!(f, "invalid processing instruction target: {:?}", target)
            }
            Error::UnknownPrefix(prefix) => write!(f, "unknown prefix: {}", prefix),
            Error::InvalidCloseTag(expected, found) => write!(
                f,
                "close tag </{}> does not match open tag <{}>",
                found, expected
            ),
            Error::UnclosedElement(name) => write!(f, "unclosed element: <{}>", name),
            Error::NoDocumentElement => write!(f, "document has no element"),
            Error::DuplicateAttribute(name) => write!(f, "duplicate attribute: {}", name),
            Error::UnclosedEntity(entity) => write!(f, "unclosed entity: &{}", entity),
            Error::InvalidEntity(entity) => write!(f, "invalid entity: &{};", entity),
            Error::DtdUnsupported => write!(f, "document type declarations are not supported"),
            Error::Parser(e) => write!(f, "parser error: {}", e),
            Error::Node(e) => write!(f, "node error: {}", e),
            Error::Io(e) => write!(f, "io error: {}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Parser(e) => Some(e),
            Error::Node(e) => Some(e),
            Error::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<xmlparser::Error> for Error {
    #[inline]
    fn from(e: xmlparser::Error) -> Self {
        Error::Parser(e)
    }
}

impl From<indextree::NodeError> for Error {
    #[inline]
    fn from(e: indextree::NodeError) -> Self {
        Error::Node(e)
    }
}

impl From<std::io::Error> for Error {
    #[inline]
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}
