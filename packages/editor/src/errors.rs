//! Error types for the editor

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EditorError {
    #[error("Parse error: {0}")]
    Parse(#[from] sigedit_xml::ParseError),

    #[error("Unrecognized document: expected a <SignaturesFile> root element, found <{found}>")]
    UnrecognizedDocument { found: String },

    #[error("Row {index} does not belong to the loaded document")]
    DetachedNode { index: usize },

    #[error("No document is loaded")]
    NoDocument,

    #[error("No rule with id '{0}'")]
    RowNotFound(String),

    #[error("Unknown rule attribute: {0}")]
    UnknownField(String),

    #[error("Unknown action: {0}")]
    UnknownAction(String),

    #[error("Invalid enabled state '{0}': expected ON or OFF")]
    InvalidEnabled(String),

    #[error("Invalid page size '{0}': expected a positive number or 'all'")]
    InvalidPageSize(String),
}

impl EditorError {
    /// True when the input text itself was rejected
    pub fn is_parse_error(&self) -> bool {
        matches!(
            self,
            EditorError::Parse(_) | EditorError::UnrecognizedDocument { .. }
        )
    }
}
