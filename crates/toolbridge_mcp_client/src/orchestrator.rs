//! Two-round chat orchestration with tool execution in between.

use crate::{
    McpClientError, McpClientErrorKind, McpClientResult, RetryConfig, ToolDefinitionCache,
    ToolOutput, ToolRegistry, ToolServer, metrics, retry_with_backoff,
};
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use toolbridge_core::{
    CallerIdentity, ChatBackend, ChatReply, ChatRequest, ConversationMessage, ToolCall,
};
use tracing::{debug, info, instrument, warn};
use typed_builder::TypedBuilder;

/// System prompt used when none is configured.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a math assistant.";

/// What to do when the caller has no tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyToolsPolicy {
    /// Run the first round without tools.
    #[default]
    ProceedWithoutTools,
    /// Fail with [`McpClientErrorKind::NoToolsAvailable`].
    Fail,
}

/// Orchestrator settings.
#[derive(Debug, Clone, Getters, TypedBuilder)]
pub struct OrchestratorConfig {
    /// Prepended to every conversation.
    #[builder(default = DEFAULT_SYSTEM_PROMPT.to_string(), setter(into))]
    system_prompt: String,

    /// Behavior when tool discovery yields nothing.
    #[builder(default)]
    empty_tools_policy: EmptyToolsPolicy,

    /// Retry policy around each chat-completion round.
    #[builder(default)]
    llm_retry: RetryConfig,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// One tool call the orchestrator executed.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize)]
pub struct ToolExecution {
    /// Id of the model's tool call
    call_id: String,
    /// Tool name
    name: String,
    /// Content of the tool-role message sent back to the model
    content: String,
    /// False when `content` is an error payload
    succeeded: bool,
}

/// Final answer of one orchestrated turn.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize)]
pub struct ChatOutcome {
    /// Assistant reply shown to the user
    reply: String,
    /// Tools executed between the two rounds, in request order
    executions: Vec<ToolExecution>,
}

/// Runs a chat turn: ask the model, execute requested tools, ask again.
pub struct ChatOrchestrator {
    backend: Arc<dyn ChatBackend>,
    server: Arc<dyn ToolServer>,
    definitions: Arc<ToolDefinitionCache>,
    config: OrchestratorConfig,
}

impl std::fmt::Debug for ChatOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatOrchestrator")
            .field("model", &self.backend.model_name())
            .field("config", &self.config)
            .finish()
    }
}

impl ChatOrchestrator {
    /// Wire an orchestrator.
    pub fn new(
        backend: Arc<dyn ChatBackend>,
        server: Arc<dyn ToolServer>,
        definitions: Arc<ToolDefinitionCache>,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            backend,
            server,
            definitions,
            config,
        }
    }

    /// Orchestrator settings.
    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Tool definition cache used for discovery.
    pub fn definitions(&self) -> &Arc<ToolDefinitionCache> {
        &self.definitions
    }

    /// Answer `user_message` given prior `history`.
    ///
    /// The system prompt, `history` and the user message form the first
    /// round, offered every tool the caller can see. If the model asks
    /// for tools they run sequentially; each failure becomes an
    /// `{"error": ...}` tool message instead of aborting the turn. The
    /// second round carries the results and no tools.
    #[instrument(
        skip(self, identity, history, user_message),
        fields(caller = identity.map(CallerIdentity::short), history_len = history.len())
    )]
    pub async fn chat(
        &self,
        identity: Option<&CallerIdentity>,
        history: &[ConversationMessage],
        user_message: &str,
    ) -> McpClientResult<ChatOutcome> {
        let identity =
            identity.ok_or_else(|| McpClientError::new(McpClientErrorKind::Unauthenticated))?;

        let specs = self.definitions.get(identity).await;
        if specs.is_empty() && self.config.empty_tools_policy == EmptyToolsPolicy::Fail {
            return Err(McpClientError::new(McpClientErrorKind::NoToolsAvailable));
        }

        let mut conversation = Vec::with_capacity(history.len() + 2);
        conversation.push(ConversationMessage::system(&self.config.system_prompt));
        conversation.extend_from_slice(history);
        conversation.push(ConversationMessage::user(user_message));

        let first = ChatRequest::with_tools(conversation.clone(), specs.to_vec());
        let reply = self.complete(&first, 1).await?;
        if !reply.has_tool_calls() {
            info!("Answered without tools");
            return Ok(ChatOutcome {
                reply: reply.into_parts().0.unwrap_or_default(),
                executions: Vec::new(),
            });
        }

        let (content, tool_calls) = reply.into_parts();
        info!(tool_calls = tool_calls.len(), "Model requested tools");

        let registry = ToolRegistry::from_specs(&specs, self.server.open_session(identity)?);
        let mut executions = Vec::with_capacity(tool_calls.len());
        for call in &tool_calls {
            executions.push(self.execute(&registry, call).await);
        }

        conversation.push(ConversationMessage::assistant_tool_calls(
            content,
            tool_calls,
        ));
        for execution in &executions {
            conversation.push(ConversationMessage::tool(
                &execution.call_id,
                &execution.name,
                &execution.content,
            ));
        }

        let second = ChatRequest::plain(conversation);
        let reply = self.complete(&second, 2).await?;
        Ok(ChatOutcome {
            reply: reply.into_parts().0.unwrap_or_default(),
            executions,
        })
    }

    async fn complete(&self, request: &ChatRequest, round: u8) -> McpClientResult<ChatReply> {
        metrics::record_llm_round(round);
        debug!(
            round,
            messages = request.messages().len(),
            tools = request.tools().len(),
            "Sending chat round"
        );
        retry_with_backoff(&self.config.llm_retry, || async move {
            Ok(self.backend.complete(request).await?)
        })
        .await
    }

    #[instrument(skip(self, registry, call), fields(tool = %call.name, call_id = %call.id))]
    async fn execute(&self, registry: &ToolRegistry, call: &ToolCall) -> ToolExecution {
        let outcome = match call.decode_arguments() {
            Ok(arguments) => registry.dispatch(&call.name, arguments).await,
            Err(e) => Err(McpClientError::new(McpClientErrorKind::InvalidToolCall(
                format!("{}: {}", call.name, e),
            ))),
        };

        let (content, succeeded) = match outcome {
            Ok(result) => (ToolOutput::from_result(&result).into_content(), true),
            Err(e) => {
                warn!(error = %e, "Tool call failed");
                (json!({ "error": e.detail() }).to_string(), false)
            }
        };
        metrics::record_tool_call(&call.name, succeeded);

        ToolExecution {
            call_id: call.id.clone(),
            name: call.name.clone(),
            content,
            succeeded,
        }
    }
}
