//! Tool descriptions on both sides of the bridge.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A tool as advertised by the tool server in `tools/list`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, derive_getters::Getters)]
pub struct ToolDefinition {
    /// Tool name, unique per server
    name: String,
    /// Human-readable description
    #[serde(default)]
    description: String,
    /// JSON-Schema-like description of the arguments
    #[serde(rename = "inputSchema", default = "empty_object")]
    input_schema: Value,
}

fn empty_object() -> Value {
    Value::Object(Default::default())
}

impl ToolDefinition {
    /// Create a new tool definition.
    pub fn new(name: impl Into<String>, description: impl Into<String>, input_schema: Value) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema,
        }
    }
}

/// A tool as the chat-completion API expects it.
///
/// `parameters` is always a normalized `object` schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, derive_getters::Getters)]
pub struct FunctionSpec {
    /// Function name, identical to the tool name
    name: String,
    /// Function description
    description: String,
    /// Normalized parameter schema
    parameters: Value,
}

impl FunctionSpec {
    /// Create a new function spec.
    pub fn new(name: impl Into<String>, description: impl Into<String>, parameters: Value) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters,
        }
    }
}

/// A tool/function call requested by the model.
///
/// `arguments` is the raw JSON-encoded string the model produced.
///
/// # Examples
///
/// ```
/// use toolbridge_core::ToolCall;
/// use serde_json::json;
///
/// let call = ToolCall::new("call_1", "calculate", r#"{"expression":"2+2"}"#);
/// assert_eq!(call.decode_arguments().unwrap(), json!({"expression": "2+2"}));
///
/// let empty = ToolCall::new("call_2", "list", "");
/// assert_eq!(empty.decode_arguments().unwrap(), json!({}));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Unique identifier the tool result must echo
    pub id: String,
    /// Name of the tool/function to call
    pub name: String,
    /// JSON-encoded arguments
    pub arguments: String,
}

impl ToolCall {
    /// Create a new tool call.
    pub fn new(id: impl Into<String>, name: impl Into<String>, arguments: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments: arguments.into(),
        }
    }

    /// Decode the argument string; blank arguments decode to `{}`.
    pub fn decode_arguments(&self) -> Result<Value, serde_json::Error> {
        if self.arguments.trim().is_empty() {
            return Ok(empty_object());
        }
        serde_json::from_str(&self.arguments)
    }
}
