//! LLM backend error types.

/// Failure reported by a chat-completion backend.
///
/// # Examples
///
/// ```
/// use toolbridge_error::{BackendError, RetryableError};
///
/// let err = BackendError::with_status(503, "overloaded");
/// assert_eq!(err.status_code, Some(503));
/// assert!(err.is_retryable());
///
/// let err = BackendError::new("No choices in response");
/// assert!(!err.is_retryable());
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Backend Error: {} at line {} in {}", message, line, file)]
pub struct BackendError {
    /// The underlying error message
    pub message: String,
    /// HTTP status returned by the provider, if the request got that far
    pub status_code: Option<u16>,
    /// Connection-level failure worth retrying
    pub transient: bool,
    /// Line number where the error occurred
    pub line: u32,
    /// File where the error occurred
    pub file: &'static str,
}

impl BackendError {
    /// Create a new BackendError with the given message at the current location.
    #[track_caller]
    pub fn new(message: impl Into<String>) -> Self {
        Self::build(message.into(), None, false)
    }

    /// Create a BackendError from a non-2xx provider response.
    #[track_caller]
    pub fn with_status(status_code: u16, message: impl Into<String>) -> Self {
        Self::build(message.into(), Some(status_code), false)
    }

    /// Create a BackendError for a network failure before any response.
    #[track_caller]
    pub fn network(message: impl Into<String>) -> Self {
        Self::build(message.into(), None, true)
    }

    #[track_caller]
    fn build(message: String, status_code: Option<u16>, transient: bool) -> Self {
        let location = std::panic::Location::caller();
        Self {
            message,
            status_code,
            transient,
            line: location.line(),
            file: location.file(),
        }
    }
}
