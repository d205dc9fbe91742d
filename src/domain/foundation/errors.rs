//! Error types for the domain layer.

use std::collections::HashMap;
use std::error::Error;
use std::fmt;

/// Error codes organized by category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Validation errors
    ValidationFailed,

    // Inbound message errors
    InvalidEvent,
    MalformedIdentifier,

    // Resolution errors
    RepositoryQueryFailed,
    AmbiguousMatch,

    // Outbound errors
    PublishFailed,

    // Infrastructure errors
    InternalError,
}

impl ErrorCode {
    /// Severity at which a dropped message with this code is reported.
    ///
    /// Malformed input is the sender's problem and only warrants a warning;
    /// everything else points at our side or at repository data quality.
    pub fn severity(&self) -> Severity {
        match self {
            ErrorCode::InvalidEvent | ErrorCode::MalformedIdentifier => Severity::Warning,
            _ => Severity::Error,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::ValidationFailed => "VALIDATION_FAILED",
            ErrorCode::InvalidEvent => "INVALID_EVENT",
            ErrorCode::MalformedIdentifier => "MALFORMED_IDENTIFIER",
            ErrorCode::RepositoryQueryFailed => "REPOSITORY_QUERY_FAILED",
            ErrorCode::AmbiguousMatch => "AMBIGUOUS_MATCH",
            ErrorCode::PublishFailed => "PUBLISH_FAILED",
            ErrorCode::InternalError => "INTERNAL_ERROR",
        };
        write!(f, "{}", s)
    }
}

/// Log severity attached to an [`ErrorCode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Error,
}

/// Standard domain error with code, message, and optional details.
#[derive(Debug, Clone)]
pub struct DomainError {
    pub code: ErrorCode,
    pub message: String,
    pub details: HashMap<String, String>,
}

impl DomainError {
    /// Creates a new domain error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: HashMap::new(),
        }
    }

    /// Creates a validation error for a specific field.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ValidationFailed, message).with_detail("field", field.into())
    }

    /// More than one repository record matched a single identifier.
    pub fn ambiguous_match(count: usize) -> Self {
        Self::new(
            ErrorCode::AmbiguousMatch,
            format!("AQL query returned {} artifacts, expected at most one", count),
        )
        .with_detail("count", count.to_string())
    }

    /// Adds a detail to the error.
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }

    /// Shorthand for `self.code.severity()`.
    pub fn severity(&self) -> Severity {
        self.code.severity()
    }
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl Error for DomainError {}
