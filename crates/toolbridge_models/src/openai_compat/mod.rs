//! Generic OpenAI-compatible API client.
//!
//! This module provides a reusable client for any API that follows the OpenAI
//! chat completions format, including function calling.

mod client;
mod conversions;
mod dto;

pub use client::{OPENAI_CHAT_COMPLETIONS_URL, OpenAICompatibleClient};
pub use conversions::{from_chat_response, to_chat_request};
pub use dto::{
    ChatChoice, ChatFunction, ChatFunctionCall, ChatMessage, ChatRequest, ChatRequestBuilder,
    ChatResponse, ChatTool, ChatToolCall, ChatUsage, OpenAICompatError,
};
