//! Bridge between a chat-completion model and a tool-protocol server.
//!
//! The pieces, bottom-up:
//!
//! - [`SessionTransport`] posts JSON-RPC envelopes and demultiplexes JSON
//!   and event-stream responses.
//! - [`ToolSession`] runs the `initialize` handshake and exposes
//!   `tools/list` and `tools/call`.
//! - [`to_function_spec`] normalizes tool schemas into function parameters.
//! - [`ToolOutput`] flattens tool results into message text.
//! - [`ToolDefinitionCache`] keeps each caller's function specs.
//! - [`ChatOrchestrator`] runs the two-round chat turn.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod definitions;
mod error;
mod jsonrpc;
mod metrics;
mod orchestrator;
mod registry;
mod result;
mod retry;
mod schema;
mod server;
mod session;
mod transport;

pub use config::{DEFAULT_PROTOCOL_VERSION, InitializePolicy, McpClientConfig, McpClientConfigBuilder};
pub use definitions::{ToolCacheConfig, ToolDefinitionCache};
pub use error::{McpClientError, McpClientErrorKind, McpClientResult};
pub use jsonrpc::{JsonRpcRequest, JsonRpcResponse};
pub use orchestrator::{
    ChatOrchestrator, ChatOutcome, DEFAULT_SYSTEM_PROMPT, EmptyToolsPolicy, OrchestratorConfig,
    ToolExecution,
};
pub use registry::{RemoteTool, ToolHandler, ToolRegistry};
pub use result::{ContentPart, ToolOutput};
pub use retry::{RetryConfig, retry_with_backoff};
pub use schema::{SchemaNormalizer, normalize_schema, to_function_spec};
pub use server::{McpToolServer, ToolServer};
pub use session::{ServerInfo, SessionState, ToolInvoker, ToolSession};
pub use transport::{SESSION_ID_HEADER, SessionTransport};
