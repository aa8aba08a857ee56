//! Convenience result type alias for Canopy.

use crate::error::AppError;

/// A specialized `Result` type for Canopy operations.
///
/// This is defined as a convenience so that every crate does not need to
/// write `Result<T, AppError>` explicitly.
pub type AppResult<T> = Result<T, AppError>;

/// Extension for tagging errors with the operation that produced them.
pub trait OperationExt<T> {
    /// Tag the error (if any) with `op`, keeping an existing tag.
    fn with_operation(self, op: &'static str) -> AppResult<T>;
}

impl<T> OperationExt<T> for AppResult<T> {
    fn with_operation(self, op: &'static str) -> AppResult<T> {
        self.map_err(|e| e.with_operation(op))
    }
}
