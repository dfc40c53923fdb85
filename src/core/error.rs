//! Error types for XMP operations
//!
//! This module defines all error types used throughout the crate, together
//! with the classification accessors (`kind`, `offset`, `severity`) callers
//! use to decide whether a failure is recoverable.

use thiserror::Error;

/// Error types for XMP operations
#[derive(Debug, Error)]
pub enum XmpError {
    /// A structure already has a child with this name
    #[error("Duplicate name: {0}")]
    DuplicateName(String),

    /// An operation was applied to a node of the wrong kind
    #[error("Kind mismatch: expected {expected}, found {found}")]
    KindMismatch {
        /// The node kind the operation needs
        expected: &'static str,
        /// The node kind that was found
        found: &'static str,
    },

    /// An array index is outside the valid range
    #[error("Index {index} out of range for array of length {len}")]
    IndexOutOfRange {
        /// The requested 1-based index
        index: usize,
        /// The current array length
        len: usize,
    },

    /// A qualifier carries qualifiers which are qualified themselves
    #[error("Qualifier nesting too deep: {0}")]
    QualifierTooDeep(String),

    /// Malformed path expression
    #[error("Path syntax error at offset {offset}: {message}")]
    PathSyntax {
        /// Byte offset of the offending character
        offset: usize,
        /// Description of the problem
        message: String,
    },

    /// RDF/XML construct outside the supported profile, or malformed input
    #[error("RDF syntax error at offset {offset}: {detail}")]
    RdfSyntax {
        /// Byte offset in the parsed stream
        offset: usize,
        /// Description of the problem
        detail: String,
    },

    /// The same property appears twice in one structure during a strict parse
    #[error("Property '{name}' redefined at offset {offset}")]
    RedefinedProperty {
        /// The property name as written in the document
        name: String,
        /// Byte offset in the parsed stream
        offset: usize,
    },

    /// A value contains characters that cannot be written as XML
    #[error("Unrepresentable value: {0}")]
    UnrepresentableValue(String),

    /// Property, qualifier or item not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad parameter provided to a function
    #[error("Bad parameter: {0}")]
    BadParam(String),

    /// Bad schema URI or namespace prefix
    #[error("Bad schema: {0}")]
    BadSchema(String),

    /// Internal error (should not occur in normal operation)
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Broad classification of an [`XmpError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Node tree invariant violations
    Structural,
    /// Path expression syntax
    PathSyntax,
    /// RDF/XML parsing
    RdfSyntax,
    /// Serialization
    Serialization,
    /// Missing property on read
    NotFound,
    /// Bad arguments or unknown namespaces
    Parameter,
    /// Internal failures
    Internal,
}

/// Whether the current operation can be retried on the same object
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Only the failed operation is affected
    Recoverable,
    /// The object should be discarded
    Fatal,
}

impl XmpError {
    /// Classify the error
    pub fn kind(&self) -> ErrorKind {
        match self {
            XmpError::DuplicateName(_)
            | XmpError::KindMismatch { .. }
            | XmpError::IndexOutOfRange { .. }
            | XmpError::QualifierTooDeep(_) => ErrorKind::Structural,
            XmpError::PathSyntax { .. } => ErrorKind::PathSyntax,
            XmpError::RdfSyntax { .. } | XmpError::RedefinedProperty { .. } => {
                ErrorKind::RdfSyntax
            }
            XmpError::UnrepresentableValue(_) => ErrorKind::Serialization,
            XmpError::NotFound(_) => ErrorKind::NotFound,
            XmpError::BadParam(_) | XmpError::BadSchema(_) => ErrorKind::Parameter,
            XmpError::InternalError(_) => ErrorKind::Internal,
        }
    }

    /// Source offset, for errors that carry one
    pub fn offset(&self) -> Option<usize> {
        match self {
            XmpError::PathSyntax { offset, .. }
            | XmpError::RdfSyntax { offset, .. }
            | XmpError::RedefinedProperty { offset, .. } => Some(*offset),
            _ => None,
        }
    }

    /// Severity of the error
    pub fn severity(&self) -> Severity {
        match self.kind() {
            ErrorKind::Internal => Severity::Fatal,
            _ => Severity::Recoverable,
        }
    }

    /// Check if this is a `NotFound` error
    pub fn is_not_found(&self) -> bool {
        matches!(self, XmpError::NotFound(_))
    }
}

/// Result type alias for XMP operations
pub type XmpResult<T> = Result<T, XmpError>;
