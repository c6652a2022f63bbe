//! Type conversions between toolbridge and OpenAI formats.

use crate::openai_compat::dto::function_type;
use crate::openai_compat::{
    ChatFunction, ChatFunctionCall, ChatMessage, ChatRequest, ChatResponse, ChatTool,
    ChatToolCall, OpenAICompatError,
};
use toolbridge_core::{ChatReply, ConversationMessage, FunctionSpec, Role, ToolCall, ToolChoice};

fn to_chat_message(msg: &ConversationMessage) -> Result<ChatMessage, OpenAICompatError> {
    if *msg.role() == Role::Tool && (msg.tool_call_id().is_none() || msg.name().is_none()) {
        return Err(OpenAICompatError::InvalidRequest(
            "Tool messages require tool_call_id and name".to_string(),
        ));
    }

    let tool_calls = (!msg.tool_calls().is_empty()).then(|| {
        msg.tool_calls()
            .iter()
            .map(|call| ChatToolCall {
                id: call.id.clone(),
                call_type: function_type(),
                function: ChatFunctionCall {
                    name: call.name.clone(),
                    arguments: call.arguments.clone(),
                },
            })
            .collect()
    });

    Ok(ChatMessage {
        role: msg.role().to_string(),
        content: msg.content().clone(),
        tool_calls,
        tool_call_id: msg.tool_call_id().clone(),
        name: msg.name().clone(),
    })
}

fn to_chat_tool(spec: &FunctionSpec) -> ChatTool {
    ChatTool {
        tool_type: function_type(),
        function: ChatFunction {
            name: spec.name().clone(),
            description: spec.description().clone(),
            parameters: spec.parameters().clone(),
        },
    }
}

/// Converts a toolbridge ChatRequest to OpenAI chat format.
pub fn to_chat_request(
    req: &toolbridge_core::ChatRequest,
    model: &str,
) -> Result<ChatRequest, OpenAICompatError> {
    let messages = req
        .messages()
        .iter()
        .map(to_chat_message)
        .collect::<Result<Vec<_>, _>>()?;

    let mut builder = ChatRequest::builder();
    builder.model(model.to_string()).messages(messages);

    if !req.tools().is_empty() {
        builder.tools(Some(req.tools().iter().map(to_chat_tool).collect::<Vec<_>>()));
        if let Some(choice) = req.tool_choice() {
            let choice = match choice {
                ToolChoice::Auto => "auto",
            };
            builder.tool_choice(Some(choice.to_string()));
        }
    }

    builder
        .build()
        .map_err(|e| OpenAICompatError::Builder(format!("Failed to build request: {}", e)))
}

/// Converts an OpenAI chat response to a toolbridge ChatReply.
pub fn from_chat_response(response: &ChatResponse) -> Result<ChatReply, OpenAICompatError> {
    let message = response
        .choices
        .first()
        .map(|choice| &choice.message)
        .ok_or_else(|| OpenAICompatError::ResponseParsing("No choices in response".to_string()))?;

    let tool_calls = message
        .tool_calls
        .iter()
        .flatten()
        .map(|call| ToolCall::new(&call.id, &call.function.name, &call.function.arguments))
        .collect();

    Ok(ChatReply::new(message.content.clone(), tool_calls))
}
