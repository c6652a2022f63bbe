//! Connection settings for the tool server.

use derive_getters::Getters;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use toolbridge_error::{TransportError, TransportErrorKind};

/// Tool protocol revision sent in `initialize`.
pub const DEFAULT_PROTOCOL_VERSION: &str = "2024-11-05";

/// What to do when `initialize` fails before a tool-protocol call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InitializePolicy {
    /// Attempt initialize once; on failure log and send calls uninitialized.
    #[default]
    BestEffort,
    /// Fail the call; the next call attempts initialize again.
    Required,
}

/// Configuration for talking to one tool server.
#[derive(Debug, Clone, PartialEq, Eq, Getters, derive_builder::Builder)]
#[builder(setter(into))]
pub struct McpClientConfig {
    /// Base URL of the tool server (e.g. "http://localhost:8000")
    server_url: String,
    /// Path of the single JSON-RPC endpoint
    #[builder(default = "\"/mcp\".to_string()")]
    endpoint_path: String,
    /// Deadline for sending a request and reading a JSON body
    #[builder(default = "Duration::from_secs(30)")]
    request_timeout: Duration,
    /// Deadline for each event of a streamed response
    #[builder(default = "Duration::from_secs(300)")]
    sse_read_timeout: Duration,
    /// Protocol revision sent in `initialize`
    #[builder(default = "DEFAULT_PROTOCOL_VERSION.to_string()")]
    protocol_version: String,
    /// Client name sent in `initialize`
    #[builder(default = "\"tool-bridge\".to_string()")]
    client_name: String,
    /// Client version sent in `initialize`
    #[builder(default = "env!(\"CARGO_PKG_VERSION\").to_string()")]
    client_version: String,
    /// Initialize-before-use policy
    #[builder(default)]
    initialize_policy: InitializePolicy,
}

impl McpClientConfig {
    /// Returns a builder for McpClientConfig.
    pub fn builder() -> McpClientConfigBuilder {
        McpClientConfigBuilder::default()
    }

    /// Config with every default except the server URL.
    pub fn new(server_url: impl Into<String>) -> Self {
        Self {
            server_url: server_url.into(),
            endpoint_path: "/mcp".to_string(),
            request_timeout: Duration::from_secs(30),
            sse_read_timeout: Duration::from_secs(300),
            protocol_version: DEFAULT_PROTOCOL_VERSION.to_string(),
            client_name: "tool-bridge".to_string(),
            client_version: env!("CARGO_PKG_VERSION").to_string(),
            initialize_policy: InitializePolicy::default(),
        }
    }

    /// Same config with a different initialize policy.
    pub fn with_initialize_policy(mut self, policy: InitializePolicy) -> Self {
        self.initialize_policy = policy;
        self
    }

    /// Full endpoint URL: server URL joined with the endpoint path.
    pub fn endpoint(&self) -> Result<Url, TransportError> {
        let joined = format!(
            "{}/{}",
            self.server_url.trim_end_matches('/'),
            self.endpoint_path.trim_start_matches('/')
        );
        Url::parse(&joined).map_err(|e| {
            TransportError::new(TransportErrorKind::InvalidEndpoint(format!("{joined}: {e}")))
        })
    }
}
