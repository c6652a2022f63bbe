//! Layered settings: defaults, TOML file, environment.

use config::{Config, Environment, File, FileFormat, Map};
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use toolbridge_error::ConfigError;
use toolbridge_mcp_client::{
    EmptyToolsPolicy, InitializePolicy, McpClientConfig, OrchestratorConfig, RetryConfig,
    ToolCacheConfig, DEFAULT_PROTOCOL_VERSION, DEFAULT_SYSTEM_PROMPT,
};
use toolbridge_models::openai_compat::OPENAI_CHAT_COMPLETIONS_URL;
use toolbridge_models::OpenAICompatibleClient;
use tracing::debug;

/// Settings file read when no path is given. Optional.
pub const DEFAULT_SETTINGS_FILE: &str = "toolbridge.toml";

/// Prefix of structured environment overrides, e.g. `TOOLBRIDGE__MCP__SERVER_URL`.
pub const ENV_PREFIX: &str = "TOOLBRIDGE";

/// Tool server connection settings.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
#[serde(default)]
pub struct McpSettings {
    /// Base URL of the tool server
    server_url: String,
    /// Path of the JSON-RPC endpoint
    endpoint_path: String,
    /// Request deadline in seconds
    request_timeout_secs: u64,
    /// Per-event deadline for streamed responses in seconds
    sse_read_timeout_secs: u64,
    /// Protocol revision sent in `initialize`
    protocol_version: String,
    /// Client name sent in `initialize`
    client_name: String,
    /// Initialize-before-use policy
    initialize_policy: InitializePolicy,
}

impl Default for McpSettings {
    fn default() -> Self {
        Self {
            server_url: "http://localhost:8000".to_string(),
            endpoint_path: "/mcp".to_string(),
            request_timeout_secs: 30,
            sse_read_timeout_secs: 300,
            protocol_version: DEFAULT_PROTOCOL_VERSION.to_string(),
            client_name: "tool-bridge".to_string(),
            initialize_policy: InitializePolicy::default(),
        }
    }
}

/// Chat-completion API settings.
#[derive(Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    /// API key; required only for chat
    api_key: Option<String>,
    /// Model identifier
    model: String,
    /// Chat completions endpoint
    base_url: String,
    /// Attempts per chat round, including the first
    max_attempts: usize,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "gpt-4o-mini".to_string(),
            base_url: OPENAI_CHAT_COMPLETIONS_URL.to_string(),
            max_attempts: 3,
        }
    }
}

impl std::fmt::Debug for LlmSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmSettings")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("max_attempts", &self.max_attempts)
            .finish()
    }
}

/// Chat orchestration settings.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatSettings {
    /// System prompt prepended to every conversation
    system_prompt: String,
    /// Behavior when a caller has no tools
    empty_tools_policy: EmptyToolsPolicy,
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            empty_tools_policy: EmptyToolsPolicy::default(),
        }
    }
}

/// All bridge settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Getters, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Tool server
    mcp: McpSettings,
    /// Chat-completion API
    llm: LlmSettings,
    /// Tool definition cache
    cache: ToolCacheConfig,
    /// Orchestration
    chat: ChatSettings,
}

impl Settings {
    /// Load settings from the process environment.
    ///
    /// Reads `.env` first. `path` names a required TOML file; without it an
    /// optional `toolbridge.toml` in the working directory is used.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Ok(env_file) = dotenvy::dotenv() {
            debug!(path = %env_file.display(), "Loaded .env");
        }
        Self::load_with_env(path, None)
    }

    /// Load settings with an explicit environment instead of the process one.
    ///
    /// Besides `TOOLBRIDGE__*` variables, `MCP_SERVER_URL` and
    /// `OPENAI_API_KEY` override the matching keys.
    pub fn load_with_env(
        path: Option<&Path>,
        env: Option<Map<String, String>>,
    ) -> Result<Self, ConfigError> {
        let file = match path {
            Some(path) => File::from(path).format(FileFormat::Toml).required(true),
            None => File::new(DEFAULT_SETTINGS_FILE, FileFormat::Toml).required(false),
        };

        let legacy = |name: &str| match &env {
            Some(vars) => vars.get(name).cloned(),
            None => std::env::var(name).ok(),
        }
        .filter(|value| !value.trim().is_empty());
        let server_url = legacy("MCP_SERVER_URL");
        let api_key = legacy("OPENAI_API_KEY");

        let environment = Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("__")
            .separator("__")
            .source(env);

        let settings: Settings = Config::builder()
            .add_source(file)
            .add_source(environment)
            .set_override_option("mcp.server_url", server_url)
            .and_then(|builder| builder.set_override_option("llm.api_key", api_key))
            .and_then(|builder| builder.build())
            .and_then(|config| config.try_deserialize())
            .map_err(|e| ConfigError::new(e.to_string()))?;

        settings.validate()?;
        Ok(settings)
    }

    /// Check values that deserialization cannot.
    pub fn validate(&self) -> Result<(), ConfigError> {
        McpClientConfig::new(&self.mcp.server_url)
            .endpoint()
            .map_err(|e| ConfigError::for_key("mcp.server_url", e.kind().to_string()))?;
        if self.mcp.request_timeout_secs == 0 {
            return Err(ConfigError::for_key(
                "mcp.request_timeout_secs",
                "must be greater than zero",
            ));
        }
        Ok(())
    }

    /// Tool server client configuration.
    pub fn mcp_client_config(&self) -> Result<McpClientConfig, ConfigError> {
        McpClientConfig::builder()
            .server_url(self.mcp.server_url.clone())
            .endpoint_path(self.mcp.endpoint_path.clone())
            .request_timeout(Duration::from_secs(self.mcp.request_timeout_secs))
            .sse_read_timeout(Duration::from_secs(self.mcp.sse_read_timeout_secs))
            .protocol_version(self.mcp.protocol_version.clone())
            .client_name(self.mcp.client_name.clone())
            .initialize_policy(self.mcp.initialize_policy)
            .build()
            .map_err(|e| ConfigError::for_key("mcp", e.to_string()))
    }

    /// Orchestrator configuration.
    pub fn orchestrator_config(&self) -> OrchestratorConfig {
        OrchestratorConfig::builder()
            .system_prompt(self.chat.system_prompt.clone())
            .empty_tools_policy(self.chat.empty_tools_policy)
            .llm_retry(RetryConfig::with_max_attempts(self.llm.max_attempts))
            .build()
    }

    /// Chat-completion client; fails when no API key is configured.
    pub fn llm_client(&self) -> Result<OpenAICompatibleClient, ConfigError> {
        let api_key = self
            .llm
            .api_key
            .clone()
            .ok_or_else(|| ConfigError::for_key("llm.api_key", "no API key configured"))?;

        let provider = if self.llm.base_url == OPENAI_CHAT_COMPLETIONS_URL {
            "openai"
        } else {
            "openai-compatible"
        };
        Ok(OpenAICompatibleClient::new(
            api_key,
            self.llm.model.clone(),
            self.llm.base_url.clone(),
            provider,
        ))
    }
}
