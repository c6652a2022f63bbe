//! Transport-layer failures: network, timeouts and framing.

/// Conditions raised while moving bytes to and from the tool server.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum TransportErrorKind {
    /// Connection, DNS or I/O failure.
    #[display("Network failure: {_0}")]
    Network(String),
    /// The request or a streamed read exceeded its deadline.
    #[display("Timed out: {_0}")]
    Timeout(String),
    /// The response carried a content type the transport cannot demultiplex.
    #[display("Unsupported content type: {_0}")]
    UnsupportedContentType(String),
    /// The body could not be read or decoded as JSON-RPC.
    #[display("Invalid response body: {_0}")]
    InvalidBody(String),
    /// An event stream closed before any `message` event arrived.
    #[display("Event stream ended before a message event arrived")]
    StreamEnded,
    /// The configured endpoint is not a usable URL.
    #[display("Invalid endpoint: {_0}")]
    InvalidEndpoint(String),
}

/// Transport error with location tracking.
///
/// # Examples
///
/// ```
/// use toolbridge_error::{TransportError, TransportErrorKind};
///
/// let err = TransportError::new(TransportErrorKind::StreamEnded);
/// assert!(err.to_string().contains("Event stream ended"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Transport Error: {} at line {} in {}", kind, line, file)]
pub struct TransportError {
    kind: TransportErrorKind,
    line: u32,
    file: &'static str,
}

impl TransportError {
    /// Create a new transport error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: TransportErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Get the error kind.
    pub fn kind(&self) -> &TransportErrorKind {
        &self.kind
    }
}

impl From<TransportErrorKind> for TransportError {
    #[track_caller]
    fn from(kind: TransportErrorKind) -> Self {
        Self::new(kind)
    }
}
