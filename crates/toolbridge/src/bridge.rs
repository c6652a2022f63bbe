//! Wiring of the bridge components from settings.

use crate::Settings;
use std::sync::Arc;
use toolbridge_core::{CallerIdentity, ChatBackend, ConversationMessage, FunctionSpec};
use toolbridge_error::{BackendError, ConfigError};
use toolbridge_mcp_client::{
    ChatOrchestrator, ChatOutcome, McpClientError, McpClientErrorKind, McpClientResult,
    McpToolServer, OrchestratorConfig, ToolCacheConfig, ToolDefinitionCache, ToolSession,
};
use tracing::{debug, info, instrument};

/// The assembled bridge: tool server, definition cache and orchestrator.
///
/// One instance is shared by all callers; every per-caller state lives in
/// the definition cache, keyed by token fingerprint.
#[derive(Debug)]
pub struct ToolBridge {
    server: Arc<McpToolServer>,
    definitions: Arc<ToolDefinitionCache>,
    orchestrator: Option<ChatOrchestrator>,
    backend_error: Option<ConfigError>,
}

impl ToolBridge {
    /// Assemble a bridge from parts.
    ///
    /// Without a backend, discovery and tool calls work but [`chat`](Self::chat) fails.
    pub fn new(
        server: McpToolServer,
        cache: ToolCacheConfig,
        backend: Option<Arc<dyn ChatBackend>>,
        orchestrator: OrchestratorConfig,
    ) -> Self {
        let server = Arc::new(server);
        let definitions = Arc::new(ToolDefinitionCache::new(server.clone(), cache));
        let orchestrator = backend.map(|backend| {
            ChatOrchestrator::new(
                backend,
                server.clone(),
                Arc::clone(&definitions),
                orchestrator,
            )
        });
        Self {
            server,
            definitions,
            orchestrator,
            backend_error: None,
        }
    }

    /// Assemble a bridge from settings. The chat backend is only built
    /// when an API key is configured.
    #[instrument(skip_all, fields(server_url = %settings.mcp().server_url()))]
    pub fn from_settings(settings: &Settings) -> Result<Self, ConfigError> {
        let server = McpToolServer::new(settings.mcp_client_config()?)
            .map_err(|e| ConfigError::for_key("mcp", e.detail()))?;

        let (backend, backend_error) = match settings.llm_client() {
            Ok(client) => (Some(Arc::new(client) as Arc<dyn ChatBackend>), None),
            Err(e) => {
                debug!(error = %e, "Chat backend disabled");
                (None, Some(e))
            }
        };
        info!(chat_enabled = backend.is_some(), "Tool bridge configured");

        let mut bridge = Self::new(
            server,
            settings.cache().clone(),
            backend,
            settings.orchestrator_config(),
        );
        bridge.backend_error = backend_error;
        Ok(bridge)
    }

    /// The tool server handle.
    pub fn server(&self) -> &McpToolServer {
        &self.server
    }

    /// The tool definition cache.
    pub fn definitions(&self) -> &ToolDefinitionCache {
        &self.definitions
    }

    /// Function specs visible to `identity`.
    pub async fn tools(&self, identity: &CallerIdentity) -> Arc<Vec<FunctionSpec>> {
        self.definitions.get(identity).await
    }

    /// A fresh session for direct tool-protocol access.
    pub fn session(&self, identity: &CallerIdentity) -> McpClientResult<ToolSession> {
        self.server.session(identity)
    }

    /// Run one chat turn for the caller holding `token`.
    pub async fn chat(
        &self,
        token: Option<&str>,
        history: &[ConversationMessage],
        message: &str,
    ) -> McpClientResult<ChatOutcome> {
        let orchestrator = self.orchestrator.as_ref().ok_or_else(|| {
            let message = match &self.backend_error {
                Some(e) => format!(
                    "no chat backend configured ({}: {})",
                    e.key.as_deref().unwrap_or("llm"),
                    e.message
                ),
                None => "no chat backend configured".to_string(),
            };
            McpClientError::new(McpClientErrorKind::Backend(BackendError::new(message)))
        })?;
        let identity = CallerIdentity::from_optional(token);
        orchestrator.chat(identity.as_ref(), history, message).await
    }

    /// Forget the cached tools of `identity`.
    pub fn logout(&self, identity: &CallerIdentity) {
        self.definitions.invalidate(Some(identity));
    }

    /// Forget every cached tool list.
    pub fn logout_all(&self) {
        self.definitions.invalidate(None);
    }
}
