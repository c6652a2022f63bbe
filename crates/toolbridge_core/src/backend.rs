//! The chat-completion collaborator.

use crate::{ConversationMessage, FunctionSpec, ToolCall};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use toolbridge_error::BackendError;

/// How the model may use the offered tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolChoice {
    /// The model decides whether to call tools
    Auto,
}

/// One request to the chat-completion API.
#[derive(Debug, Clone, PartialEq, derive_getters::Getters)]
pub struct ChatRequest {
    /// Conversation so far, in order
    messages: Vec<ConversationMessage>,
    /// Functions the model may call; empty disables tools
    tools: Vec<FunctionSpec>,
    /// Tool selection mode, only meaningful with tools
    tool_choice: Option<ToolChoice>,
}

impl ChatRequest {
    /// A request offering `tools` with automatic selection.
    ///
    /// With no tools the request is identical to [`ChatRequest::plain`].
    pub fn with_tools(messages: Vec<ConversationMessage>, tools: Vec<FunctionSpec>) -> Self {
        let tool_choice = (!tools.is_empty()).then_some(ToolChoice::Auto);
        Self {
            messages,
            tools,
            tool_choice,
        }
    }

    /// A request with tools disabled.
    pub fn plain(messages: Vec<ConversationMessage>) -> Self {
        Self {
            messages,
            tools: Vec::new(),
            tool_choice: None,
        }
    }
}

/// The model's answer to one [`ChatRequest`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, derive_getters::Getters)]
pub struct ChatReply {
    /// Text content, if any
    content: Option<String>,
    /// Tool calls requested, in the order the model returned them
    tool_calls: Vec<ToolCall>,
}

impl ChatReply {
    /// Create a new reply.
    pub fn new(content: Option<String>, tool_calls: Vec<ToolCall>) -> Self {
        Self {
            content,
            tool_calls,
        }
    }

    /// A text-only reply.
    pub fn text(content: impl Into<String>) -> Self {
        Self::new(Some(content.into()), Vec::new())
    }

    /// True when the model asked for at least one tool call.
    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }

    /// Consume the reply, returning its parts.
    pub fn into_parts(self) -> (Option<String>, Vec<ToolCall>) {
        (self.content, self.tool_calls)
    }
}

/// Trait for chat-completion backends the orchestrator can drive.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Run one completion round.
    async fn complete(&self, request: &ChatRequest) -> Result<ChatReply, BackendError>;

    /// Model identifier, for logging.
    fn model_name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_with_tools_sets_auto_choice() {
        let spec = FunctionSpec::new("calculate", "Evaluate", json!({"type": "object"}));
        let request = ChatRequest::with_tools(vec![ConversationMessage::user("hi")], vec![spec]);
        assert_eq!(*request.tool_choice(), Some(ToolChoice::Auto));

        let request = ChatRequest::with_tools(vec![ConversationMessage::user("hi")], vec![]);
        assert_eq!(*request.tool_choice(), None);
        assert_eq!(request, ChatRequest::plain(vec![ConversationMessage::user("hi")]));
    }
}
