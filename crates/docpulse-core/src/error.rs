use thiserror::Error;

use crate::document::{DocumentId, Status};
use crate::lifecycle::Operation;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DocPulseError {
    #[error("Cannot {operation} document {document} in status {status}: {reason}")]
    InvalidTransition {
        document: DocumentId,
        operation: Operation,
        status: Status,
        reason: &'static str,
    },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid document: {0}")]
    Validation(String),

    #[error("Document not found: {0}")]
    NotFound(DocumentId),

    #[error("Document {existing} is already Current for {document_name} ({category}, {company})")]
    DuplicateCurrent {
        existing: DocumentId,
        document_name: String,
        category: String,
        company: String,
    },

    #[error("Document {document} was modified concurrently (expected version {expected}, found {found})")]
    Conflict {
        document: DocumentId,
        expected: u64,
        found: u64,
    },

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Failed to deliver renewal logs for {}", .companies.join(", "))]
    Delivery {
        companies: Vec<String>,
        errors: Vec<DocPulseError>,
    },
}

pub type Result<T> = std::result::Result<T, DocPulseError>;
