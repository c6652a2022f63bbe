//! Retry classification shared by every error that crosses a network.

use crate::{BackendError, ProtocolError, ProtocolErrorKind, TransportError, TransportErrorKind};

/// Trait for errors that support retry logic.
///
/// # Examples
///
/// ```
/// use toolbridge_error::{ProtocolError, ProtocolErrorKind, RetryableError};
///
/// let err = ProtocolError::new(ProtocolErrorKind::HttpStatus {
///     status_code: 429,
///     message: "slow down".to_string(),
/// });
/// assert!(err.is_retryable());
///
/// let err = ProtocolError::new(ProtocolErrorKind::HttpStatus {
///     status_code: 401,
///     message: "Unauthorized".to_string(),
/// });
/// assert!(!err.is_retryable());
/// ```
pub trait RetryableError {
    /// Returns true if this error should trigger a retry.
    ///
    /// Transient failures (timeouts, 429, 5xx) return true. Permanent ones
    /// (JSON-RPC errors, 401, malformed framing) return false.
    fn is_retryable(&self) -> bool;
}

fn status_is_retryable(status_code: u16) -> bool {
    matches!(status_code, 408 | 429 | 500 | 502 | 503 | 504)
}

impl RetryableError for TransportError {
    fn is_retryable(&self) -> bool {
        matches!(
            self.kind(),
            TransportErrorKind::Network(_) | TransportErrorKind::Timeout(_)
        )
    }
}

impl RetryableError for ProtocolError {
    fn is_retryable(&self) -> bool {
        match self.kind() {
            ProtocolErrorKind::HttpStatus { status_code, .. } => status_is_retryable(*status_code),
            _ => false,
        }
    }
}

impl RetryableError for BackendError {
    fn is_retryable(&self) -> bool {
        self.transient || self.status_code.is_some_and(status_is_retryable)
    }
}
