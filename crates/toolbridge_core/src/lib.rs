//! Core data types for the toolbridge workspace.
//!
//! These types sit between the tool server (tool definitions, calls) and
//! the chat-completion API (conversation messages, function specs).

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod backend;
mod identity;
mod message;
mod role;
mod tool;

pub use backend::{ChatBackend, ChatReply, ChatRequest, ToolChoice};
pub use identity::CallerIdentity;
pub use message::{ConversationMessage, ConversationMessageBuilder};
pub use role::Role;
pub use tool::{FunctionSpec, ToolCall, ToolDefinition};
