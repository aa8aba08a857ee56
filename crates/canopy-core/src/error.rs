//! Unified application error types for Canopy.
//!
//! All crates map their internal errors into [`AppError`] for consistent
//! propagation through the ? operator. Transport layers map [`ErrorKind`]
//! to status codes; nothing in this workspace does.

use std::fmt;
use thiserror::Error;

/// Top-level error kind categorization used across the entire application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    /// A folder, application, cluster, or path has no match, or a delete
    /// affected no rows.
    NotFound,
    /// A folder cannot be deleted while it still has subfolders.
    HasChildren,
    /// A reparent would place a folder under itself or a descendant.
    Cycle,
    /// Input validation failed (malformed input, sibling name/path collision).
    Validation,
    /// A stored ancestor chain could not be decoded. Data-integrity fault.
    MalformedTraversal,
    /// No caller identity was supplied where one is required.
    Unauthenticated,
    /// The backing store failed.
    Store,
    /// A configuration error occurred.
    Configuration,
    /// A serialization/deserialization error occurred.
    Serialization,
    /// The caller cancelled the request or its deadline passed.
    Cancelled,
    /// An internal error occurred.
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "NOT_FOUND"),
            Self::HasChildren => write!(f, "HAS_CHILDREN"),
            Self::Cycle => write!(f, "CYCLE"),
            Self::Validation => write!(f, "VALIDATION"),
            Self::MalformedTraversal => write!(f, "MALFORMED_TRAVERSAL"),
            Self::Unauthenticated => write!(f, "UNAUTHENTICATED"),
            Self::Store => write!(f, "STORE"),
            Self::Configuration => write!(f, "CONFIGURATION"),
            Self::Serialization => write!(f, "SERIALIZATION"),
            Self::Cancelled => write!(f, "CANCELLED"),
            Self::Internal => write!(f, "INTERNAL"),
        }
    }
}

/// The unified application error used throughout Canopy.
///
/// Store and collaborator errors are wrapped with the operation that was
/// being attempted (see [`AppError::with_operation`]) and re-raised.
#[derive(Debug, Error)]
#[error("{}", render(.operation, .kind, .message))]
pub struct AppError {
    /// The category of error.
    pub kind: ErrorKind,
    /// A human-readable error message.
    pub message: String,
    /// The operation that produced the error, e.g. `"folder service: delete"`.
    pub operation: Option<&'static str>,
    /// Optional underlying cause.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

fn render(operation: &Option<&'static str>, kind: &ErrorKind, message: &str) -> String {
    match operation {
        Some(op) => format!("{op}: {kind}: {message}"),
        None => format!("{kind}: {message}"),
    }
}

impl AppError {
    /// Create a new application error.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            operation: None,
            source: None,
        }
    }

    /// Create a new application error with an underlying cause.
    pub fn with_source(
        kind: ErrorKind,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            operation: None,
            source: Some(Box::new(source)),
        }
    }

    /// Tag the error with the operation being attempted.
    ///
    /// The innermost tag wins, so re-tagging at an outer layer is harmless.
    pub fn with_operation(mut self, op: &'static str) -> Self {
        if self.operation.is_none() {
            self.operation = Some(op);
        }
        self
    }

    /// Whether this error is of the given kind.
    pub fn is(&self, kind: ErrorKind) -> bool {
        self.kind == kind
    }

    /// Create a not-found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    /// Create a has-children error.
    pub fn has_children(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::HasChildren, message)
    }

    /// Create a cycle error.
    pub fn cycle(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Cycle, message)
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    /// Create a malformed-traversal error.
    pub fn malformed_traversal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::MalformedTraversal, message)
    }

    /// Create an unauthenticated error.
    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unauthenticated, message)
    }

    /// Create a store error.
    pub fn store(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Store, message)
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    /// Create a cancellation error.
    pub fn cancelled(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Cancelled, message)
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }
}

impl Clone for AppError {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            message: self.message.clone(),
            operation: self.operation,
            source: None,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(
            ErrorKind::Serialization,
            format!("JSON serialization error: {err}"),
            err,
        )
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::with_source(
            ErrorKind::Configuration,
            format!("Configuration error: {err}"),
            err,
        )
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::with_source(ErrorKind::Validation, format!("Invalid input: {err}"), err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_without_operation() {
        let err = AppError::not_found("no folder matching the id: 7");
        assert_eq!(err.to_string(), "NOT_FOUND: no folder matching the id: 7");
    }

    #[test]
    fn test_innermost_operation_wins() {
        let err = AppError::store("connection reset")
            .with_operation("folder store: find by id")
            .with_operation("folder service: get by id");
        assert_eq!(err.operation, Some("folder store: find by id"));
        assert_eq!(
            err.to_string(),
            "folder store: find by id: STORE: connection reset"
        );
    }

    #[test]
    fn test_clone_drops_source_keeps_kind() {
        let io = std::io::Error::other("boom");
        let err = AppError::with_source(ErrorKind::Store, "query failed", io);
        let cloned = err.clone();
        assert!(cloned.is(ErrorKind::Store));
        assert!(cloned.source.is_none());
    }
}
