use thiserror::Error;

pub type ParseResult<T> = Result<T, ParseError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("Malformed XML at {pos}: {message}")]
    Xml { pos: usize, message: String },

    #[error("Malformed tag at {pos}: {message}")]
    MalformedTag { pos: usize, message: String },

    #[error("Element <{name}> is never closed")]
    UnclosedElement { name: String },

    #[error("Document has no root element")]
    NoRootElement,
}

impl ParseError {
    pub fn xml(pos: usize, message: impl Into<String>) -> Self {
        Self::Xml {
            pos,
            message: message.into(),
        }
    }

    pub fn malformed_tag(pos: usize, message: impl Into<String>) -> Self {
        Self::MalformedTag {
            pos,
            message: message.into(),
        }
    }
}

/// Errors raised when addressing nodes of an already-built tree
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TreeError {
    #[error("Node {0} does not exist in this tree")]
    InvalidNode(usize),

    #[error("Node {0} is not an element")]
    NotAnElement(usize),
}
