//! Error types for MCP client operations.

use derive_more::{Display, From};
use toolbridge_error::{BackendError, ProtocolError, RetryableError, TransportError};

/// Specific error conditions for tool bridge operations.
#[derive(Debug, Clone, Display, From)]
pub enum McpClientErrorKind {
    /// Network or framing failure talking to the tool server.
    #[display("{}", _0)]
    #[from]
    Transport(TransportError),

    /// The tool server answered with a JSON-RPC error or a non-2xx status.
    #[display("{}", _0)]
    #[from]
    Protocol(ProtocolError),

    /// The chat-completion API failed.
    #[display("{}", _0)]
    #[from]
    Backend(BackendError),

    /// No caller identity was supplied.
    #[display("Not authenticated")]
    Unauthenticated,

    /// The tool list is empty and the orchestrator was told not to proceed.
    #[display("No tools available")]
    NoToolsAvailable,

    /// The model asked for a tool the registry does not know.
    #[display("Tool not found: {}", _0)]
    ToolNotFound(String),

    /// Invalid tool call from the model.
    #[display("Invalid tool call: {}", _0)]
    InvalidToolCall(String),
}

impl McpClientErrorKind {
    /// HTTP-equivalent status for callers that surface this error to users.
    pub fn status_code(&self) -> u16 {
        match self {
            McpClientErrorKind::Unauthenticated => 401,
            _ => 500,
        }
    }
}

/// MCP client error with location tracking.
#[derive(Debug, Clone, Display, derive_more::Error)]
#[display("MCP Client Error: {} at line {} in {}", kind, line, file)]
pub struct McpClientError {
    kind: McpClientErrorKind,
    line: u32,
    file: &'static str,
}

impl McpClientError {
    /// Creates a new error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: McpClientErrorKind) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            kind,
            line: loc.line(),
            file: loc.file(),
        }
    }

    /// Get the error kind.
    pub fn kind(&self) -> &McpClientErrorKind {
        &self.kind
    }

    /// Short human-readable cause, without location decoration.
    ///
    /// This is what a model sees when a tool call fails.
    pub fn detail(&self) -> String {
        match &self.kind {
            McpClientErrorKind::Transport(err) => err.kind().to_string(),
            McpClientErrorKind::Protocol(err) => err.message(),
            McpClientErrorKind::Backend(err) => err.message.clone(),
            other => other.to_string(),
        }
    }
}

impl<T> From<T> for McpClientError
where
    T: Into<McpClientErrorKind>,
{
    #[track_caller]
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

impl RetryableError for McpClientError {
    fn is_retryable(&self) -> bool {
        match &self.kind {
            McpClientErrorKind::Transport(err) => err.is_retryable(),
            McpClientErrorKind::Protocol(err) => err.is_retryable(),
            McpClientErrorKind::Backend(err) => err.is_retryable(),
            _ => false,
        }
    }
}

/// Result type for MCP client operations.
pub type McpClientResult<T> = Result<T, McpClientError>;
