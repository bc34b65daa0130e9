//! Domain-level errors (no external dependencies)

use thiserror::Error;

use crate::domain::arena::NodeId;

/// Domain errors represent tree-rule violations.
/// These are independent of infrastructure concerns.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("cannot remove last instance of mandatory '{name}'")]
    MandatoryViolation { name: String },

    #[error("child index {index} out of range (node has {len} children)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("node not found: {0}")]
    NodeNotFound(NodeId),

    #[error("node is not a template: {0}")]
    NotATemplate(NodeId),

    #[error("invalid document: {reason}")]
    InvalidDocument { reason: String },

    #[error("invalid node path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    #[error("editing is disabled")]
    EditingDisabled,

    #[error("field is read-only: {field}")]
    ReadOnlyField { field: String },

    #[error("value rejected for field '{field}': {reason}")]
    RejectedValue { field: String, reason: String },
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
