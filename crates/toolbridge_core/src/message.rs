//! Message types for conversation history.

use crate::{Role, ToolCall};
use serde::{Deserialize, Serialize};

/// One entry of a chat conversation.
///
/// Tool-role messages carry the `tool_call_id` and `name` of the call they
/// answer; assistant messages may carry the tool calls the model requested.
///
/// # Examples
///
/// ```
/// use toolbridge_core::{ConversationMessage, Role};
///
/// let message = ConversationMessage::user("what is 2+2");
/// assert_eq!(*message.role(), Role::User);
/// assert_eq!(message.content().as_deref(), Some("what is 2+2"));
///
/// let reply = ConversationMessage::tool("call_1", "calculate", "4");
/// assert_eq!(reply.tool_call_id().as_deref(), Some("call_1"));
/// ```
#[derive(
    Debug,
    Clone,
    PartialEq,
    Serialize,
    Deserialize,
    derive_getters::Getters,
    derive_builder::Builder,
)]
#[builder(setter(into))]
pub struct ConversationMessage {
    /// The role of the message sender
    role: Role,
    /// Text content; absent on assistant messages that only request tools
    #[builder(default)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    content: Option<String>,
    /// The tool call this message answers (tool role only)
    #[builder(default)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
    /// The tool name this message answers (tool role only)
    #[builder(default)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    /// Tool calls requested by the model (assistant role only)
    #[builder(default)]
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    tool_calls: Vec<ToolCall>,
}

impl ConversationMessage {
    /// Returns a builder for constructing a ConversationMessage.
    pub fn builder() -> ConversationMessageBuilder {
        ConversationMessageBuilder::default()
    }

    /// A system prompt.
    pub fn system(content: impl Into<String>) -> Self {
        Self::text(Role::System, content)
    }

    /// A caller message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::text(Role::User, content)
    }

    /// A plain assistant reply.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::text(Role::Assistant, content)
    }

    /// The assistant turn that requested `tool_calls`, echoed back verbatim.
    pub fn assistant_tool_calls(content: Option<String>, tool_calls: Vec<ToolCall>) -> Self {
        Self {
            role: Role::Assistant,
            content,
            tool_call_id: None,
            name: None,
            tool_calls,
        }
    }

    /// The result of one tool call.
    pub fn tool(
        tool_call_id: impl Into<String>,
        name: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            role: Role::Tool,
            content: Some(content.into()),
            tool_call_id: Some(tool_call_id.into()),
            name: Some(name.into()),
            tool_calls: Vec::new(),
        }
    }

    fn text(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: Some(content.into()),
            tool_call_id: None,
            name: None,
            tool_calls: Vec::new(),
        }
    }
}
