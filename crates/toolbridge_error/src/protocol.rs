//! JSON-RPC level failures reported by the tool server.

/// Conditions where the tool server answered, but not with a usable result.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum ProtocolErrorKind {
    /// The response carried a JSON-RPC `error` object.
    #[display("JSON-RPC error{}: {}", code.map(|c| format!(" {c}")).unwrap_or_default(), message)]
    Rpc {
        /// Server-supplied error code, when present
        code: Option<i64>,
        /// Server-supplied message, or the stringified error object
        message: String,
    },
    /// The server answered with a non-2xx HTTP status.
    #[display("HTTP {status_code}: {message}")]
    HttpStatus {
        /// HTTP status code
        status_code: u16,
        /// Response body or reason phrase
        message: String,
    },
    /// A response had neither `result` nor `error`.
    #[display("Response to {_0} carried no result")]
    MissingResult(String),
}

/// Protocol error with location tracking.
///
/// # Examples
///
/// ```
/// use toolbridge_error::{ProtocolError, ProtocolErrorKind};
///
/// let err = ProtocolError::new(ProtocolErrorKind::Rpc {
///     code: Some(-32601),
///     message: "Method not found".to_string(),
/// });
/// assert!(err.to_string().contains("-32601"));
/// assert!(err.to_string().contains("Method not found"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Protocol Error: {} at line {} in {}", kind, line, file)]
pub struct ProtocolError {
    kind: ProtocolErrorKind,
    line: u32,
    file: &'static str,
}

impl ProtocolError {
    /// Create a new protocol error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: ProtocolErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Get the error kind.
    pub fn kind(&self) -> &ProtocolErrorKind {
        &self.kind
    }

    /// The server-supplied message, without location decoration.
    pub fn message(&self) -> String {
        match &self.kind {
            ProtocolErrorKind::Rpc { message, .. } => message.clone(),
            ProtocolErrorKind::HttpStatus { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

impl From<ProtocolErrorKind> for ProtocolError {
    #[track_caller]
    fn from(kind: ProtocolErrorKind) -> Self {
        Self::new(kind)
    }
}
