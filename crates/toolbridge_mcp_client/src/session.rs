//! Tool-protocol session: handshake, tool discovery and tool calls.

use crate::{InitializePolicy, McpClientConfig, McpClientResult, SessionTransport};
use async_trait::async_trait;
use derive_getters::Getters;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::sync::OnceLock;
use toolbridge_core::{CallerIdentity, ToolDefinition};
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

/// Upper bound on `tools/list` pages followed through `nextCursor`.
const MAX_TOOL_PAGES: usize = 64;

/// Lifecycle of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionState {
    /// No successful handshake yet. `attempted` records a failed try.
    Uninitialized {
        /// Whether a handshake has already failed
        attempted: bool,
    },
    /// A handshake is in flight.
    Initializing,
    /// Handshake complete.
    Ready,
}

/// What the server reported about itself during `initialize`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct ServerInfo {
    /// Server name
    #[serde(default)]
    name: String,
    /// Server version
    #[serde(default)]
    version: String,
    /// Protocol revision the server agreed to
    #[serde(default)]
    protocol_version: String,
}

/// Anything that can execute a named tool with JSON arguments.
#[async_trait]
pub trait ToolInvoker: Send + Sync {
    /// Invoke `name` and return the raw `result` object.
    async fn call_tool(&self, name: &str, arguments: Value) -> McpClientResult<Value>;
}

/// Session with the tool server for a single caller.
///
/// Initialization runs at most once at a time; concurrent callers wait for
/// the in-flight handshake instead of starting their own.
#[derive(Debug)]
pub struct ToolSession {
    transport: SessionTransport,
    protocol_version: String,
    client_name: String,
    client_version: String,
    policy: InitializePolicy,
    state: Mutex<SessionState>,
    server_info: OnceLock<ServerInfo>,
}

impl ToolSession {
    /// Create a session for `identity`. No I/O happens until first use.
    pub fn new(
        http: Client,
        config: &McpClientConfig,
        identity: CallerIdentity,
    ) -> McpClientResult<Self> {
        Ok(Self {
            transport: SessionTransport::new(http, config, identity)?,
            protocol_version: config.protocol_version().clone(),
            client_name: config.client_name().clone(),
            client_version: config.client_version().clone(),
            policy: *config.initialize_policy(),
            state: Mutex::new(SessionState::Uninitialized { attempted: false }),
            server_info: OnceLock::new(),
        })
    }

    /// The underlying transport.
    pub fn transport(&self) -> &SessionTransport {
        &self.transport
    }

    /// Current lifecycle state.
    pub async fn state(&self) -> SessionState {
        *self.state.lock().await
    }

    /// Server details, once the handshake has succeeded.
    pub fn server_info(&self) -> Option<&ServerInfo> {
        self.server_info.get()
    }

    /// Run the handshake unless the session is already ready.
    ///
    /// On failure the session returns to `Uninitialized` and the error is
    /// returned regardless of policy.
    pub async fn initialize(&self) -> McpClientResult<()> {
        let mut state = self.state.lock().await;
        if *state == SessionState::Ready {
            return Ok(());
        }
        self.handshake(&mut state).await
    }

    /// Apply the initialize policy before a tool-protocol call.
    async fn ensure_ready(&self) -> McpClientResult<()> {
        let mut state = self.state.lock().await;
        match (*state, self.policy) {
            (SessionState::Ready, _) => Ok(()),
            (SessionState::Uninitialized { attempted: true }, InitializePolicy::BestEffort) => {
                Ok(())
            }
            (_, InitializePolicy::BestEffort) => {
                if let Err(e) = self.handshake(&mut state).await {
                    warn!(error = %e, "Initialize failed, continuing without a handshake");
                }
                Ok(())
            }
            (_, InitializePolicy::Required) => self.handshake(&mut state).await,
        }
    }

    #[instrument(skip(self, state), fields(caller = %self.transport.identity().short()))]
    async fn handshake(&self, state: &mut SessionState) -> McpClientResult<()> {
        *state = SessionState::Initializing;

        let params = json!({
            "protocolVersion": self.protocol_version,
            "capabilities": {},
            "clientInfo": {
                "name": self.client_name,
                "version": self.client_version,
            },
        });

        let result = match self.transport.request("initialize", params).await {
            Ok(result) => result,
            Err(e) => {
                *state = SessionState::Uninitialized { attempted: true };
                return Err(e);
            }
        };

        let info = parse_server_info(&result);
        info!(
            server = %info.name(),
            version = %info.version(),
            session_id = ?self.transport.session_id(),
            "Tool session initialized"
        );
        let _ = self.server_info.set(info);

        if let Err(e) = self.transport.notify("notifications/initialized").await {
            warn!(error = %e, "Server rejected the initialized notification");
        }

        *state = SessionState::Ready;
        Ok(())
    }

    /// List the tools the server exposes.
    ///
    /// A result without a `tools` array yields an empty list. Entries that
    /// are not valid tool definitions are skipped.
    #[instrument(skip(self), fields(caller = %self.transport.identity().short()))]
    pub async fn list_tools(&self) -> McpClientResult<Vec<ToolDefinition>> {
        self.ensure_ready().await?;

        let mut tools = Vec::new();
        let mut params = json!({});

        for _ in 0..MAX_TOOL_PAGES {
            let result = self.transport.request("tools/list", params).await?;

            if let Some(entries) = result.get("tools").and_then(Value::as_array) {
                for entry in entries {
                    match serde_json::from_value::<ToolDefinition>(entry.clone()) {
                        Ok(tool) => tools.push(tool),
                        Err(e) => warn!(error = %e, "Skipping malformed tool definition"),
                    }
                }
            }

            match result.get("nextCursor").and_then(Value::as_str) {
                Some(cursor) if !cursor.is_empty() => params = json!({ "cursor": cursor }),
                _ => break,
            }
        }

        debug!(count = tools.len(), "Listed tools");
        Ok(tools)
    }

    /// Call a tool and return the raw `result` object.
    #[instrument(skip(self, arguments), fields(caller = %self.transport.identity().short()))]
    pub async fn call_tool(&self, name: &str, arguments: Value) -> McpClientResult<Value> {
        self.ensure_ready().await?;
        self.transport
            .request("tools/call", json!({ "name": name, "arguments": arguments }))
            .await
    }
}

#[async_trait]
impl ToolInvoker for ToolSession {
    async fn call_tool(&self, name: &str, arguments: Value) -> McpClientResult<Value> {
        ToolSession::call_tool(self, name, arguments).await
    }
}

fn parse_server_info(result: &Value) -> ServerInfo {
    let server = result.get("serverInfo");
    let field = |value: Option<&Value>| {
        value
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_default()
    };

    ServerInfo {
        name: field(server.and_then(|s| s.get("name"))),
        version: field(server.and_then(|s| s.get("version"))),
        protocol_version: field(result.get("protocolVersion")),
    }
}
