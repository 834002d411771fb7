//! Common result and internal-error types.

/// Result type for fallible internal operations.
///
/// `Err` means a bug in Halcyon, never a problem with the user's design.
/// Design problems are reported through the diagnostics sink and the pass
/// still returns `Ok` (or a typed pipeline error for the fatal categories).
pub type HalcyonResult<T> = Result<T, InternalError>;

/// An internal invariant violation: a bug in the optimizer itself.
#[derive(Debug, thiserror::Error)]
#[error("internal optimizer error: {message}")]
pub struct InternalError {
    /// What went wrong.
    pub message: String,
}

impl InternalError {
    /// Creates an internal error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<String> for InternalError {
    fn from(message: String) -> Self {
        Self { message }
    }
}
