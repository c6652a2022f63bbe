//! JSON-RPC 2.0 envelopes.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use toolbridge_error::{ProtocolError, ProtocolErrorKind};

/// Outgoing request or notification. Notifications carry no `id`.
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcRequest<'a> {
    jsonrpc: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<u64>,
    method: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    params: Option<Value>,
}

impl<'a> JsonRpcRequest<'a> {
    /// A request expecting a response correlated by `id`.
    pub fn call(id: u64, method: &'a str, params: Value) -> Self {
        Self {
            jsonrpc: "2.0",
            id: Some(id),
            method,
            params: Some(params),
        }
    }

    /// A fire-and-forget notification.
    pub fn notification(method: &'a str) -> Self {
        Self {
            jsonrpc: "2.0",
            id: None,
            method,
            params: None,
        }
    }

    /// The method name.
    pub fn method(&self) -> &str {
        self.method
    }
}

/// Incoming response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JsonRpcResponse {
    /// Echoed request id
    #[serde(default)]
    pub id: Option<Value>,
    /// Success payload
    #[serde(default)]
    pub result: Option<Value>,
    /// Error object
    #[serde(default)]
    pub error: Option<Value>,
}

impl JsonRpcResponse {
    /// Unwrap the result, converting a JSON-RPC error into [`ProtocolError`].
    ///
    /// The server's `message` is used when present; otherwise the whole
    /// error object is stringified.
    pub fn into_result(self, method: &str) -> Result<Value, ProtocolError> {
        if let Some(error) = self.error {
            let code = error.get("code").and_then(Value::as_i64);
            let message = match error.get("message").and_then(Value::as_str) {
                Some(message) => message.to_string(),
                None => error.to_string(),
            };
            return Err(ProtocolError::new(ProtocolErrorKind::Rpc { code, message }));
        }

        self.result
            .ok_or_else(|| ProtocolError::new(ProtocolErrorKind::MissingResult(method.to_string())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_notification_has_no_id() {
        let wire = serde_json::to_value(JsonRpcRequest::notification("notifications/initialized"))
            .unwrap();
        assert_eq!(wire, json!({"jsonrpc": "2.0", "method": "notifications/initialized"}));
    }

    #[test]
    fn test_error_without_message_is_stringified() {
        let response: JsonRpcResponse =
            serde_json::from_value(json!({"jsonrpc": "2.0", "id": 1, "error": {"code": 42}}))
                .unwrap();
        let err = response.into_result("tools/list").unwrap_err();

        match err.kind() {
            ProtocolErrorKind::Rpc { code, message } => {
                assert_eq!(*code, Some(42));
                assert_eq!(message, r#"{"code":42}"#);
            }
            other => panic!("unexpected kind: {other:?}"),
        }
    }

    #[test]
    fn test_missing_result_is_reported() {
        let response: JsonRpcResponse =
            serde_json::from_value(json!({"jsonrpc": "2.0", "id": 1})).unwrap();
        assert!(matches!(
            response.into_result("tools/call").unwrap_err().kind(),
            ProtocolErrorKind::MissingResult(_)
        ));
    }
}
