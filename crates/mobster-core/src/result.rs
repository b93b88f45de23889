//! Convenience result type alias for Mobster.

use crate::error::AppError;

/// A specialized `Result` type for Mobster operations.
pub type AppResult<T> = Result<T, AppError>;
