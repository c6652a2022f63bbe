//! The tool server as seen by the cache and the orchestrator.

use crate::{McpClientConfig, McpClientResult, ToolInvoker, ToolSession};
use async_trait::async_trait;
use std::sync::Arc;
use toolbridge_core::{CallerIdentity, ToolDefinition};
use toolbridge_error::{TransportError, TransportErrorKind};

/// Source of tool definitions and tool sessions for a caller.
#[async_trait]
pub trait ToolServer: Send + Sync {
    /// Discover the tools visible to `identity`.
    async fn list_tools(&self, identity: &CallerIdentity) -> McpClientResult<Vec<ToolDefinition>>;

    /// Open a session that executes tools as `identity`.
    fn open_session(&self, identity: &CallerIdentity) -> McpClientResult<Arc<dyn ToolInvoker>>;
}

/// [`ToolServer`] speaking the tool protocol over HTTP.
///
/// Holds one connection pool; every logical request gets its own
/// [`ToolSession`].
#[derive(Debug, Clone)]
pub struct McpToolServer {
    http: reqwest::Client,
    config: McpClientConfig,
}

impl McpToolServer {
    /// Create a server handle, validating the endpoint URL.
    pub fn new(config: McpClientConfig) -> McpClientResult<Self> {
        config.endpoint()?;
        let http = reqwest::Client::builder()
            .connect_timeout(*config.request_timeout())
            .build()
            .map_err(|e| TransportError::new(TransportErrorKind::Network(e.to_string())))?;
        Ok(Self { http, config })
    }

    /// Connection settings.
    pub fn config(&self) -> &McpClientConfig {
        &self.config
    }

    /// A fresh, uninitialized session for `identity`.
    pub fn session(&self, identity: &CallerIdentity) -> McpClientResult<ToolSession> {
        ToolSession::new(self.http.clone(), &self.config, identity.clone())
    }
}

#[async_trait]
impl ToolServer for McpToolServer {
    async fn list_tools(&self, identity: &CallerIdentity) -> McpClientResult<Vec<ToolDefinition>> {
        self.session(identity)?.list_tools().await
    }

    fn open_session(&self, identity: &CallerIdentity) -> McpClientResult<Arc<dyn ToolInvoker>> {
        Ok(Arc::new(self.session(identity)?))
    }
}
