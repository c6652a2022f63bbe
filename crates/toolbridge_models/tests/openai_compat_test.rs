//! Tests for the OpenAI-compatible client against an in-process fake API.

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};
use toolbridge_core::{ChatBackend, ChatRequest, ConversationMessage, FunctionSpec};
use toolbridge_error::RetryableError;
use toolbridge_models::OpenAICompatibleClient;

#[derive(Clone, Default)]
struct Recorded {
    bodies: Arc<Mutex<Vec<Value>>>,
    auth: Arc<Mutex<Vec<String>>>,
}

async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}/v1/chat/completions")
}

async fn tool_calling_completion(
    State(recorded): State<Recorded>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Json<Value> {
    if let Some(auth) = headers.get("authorization").and_then(|v| v.to_str().ok()) {
        recorded.auth.lock().unwrap().push(auth.to_string());
    }
    recorded.bodies.lock().unwrap().push(body);

    Json(json!({
        "choices": [{
            "message": {
                "role": "assistant",
                "content": null,
                "tool_calls": [{
                    "id": "call_1",
                    "type": "function",
                    "function": {"name": "calculate", "arguments": "{\"expression\":\"2+2\"}"}
                }]
            },
            "finish_reason": "tool_calls"
        }],
        "usage": {"prompt_tokens": 20, "completion_tokens": 5, "total_tokens": 25}
    }))
}

async fn overloaded() -> Response {
    (StatusCode::SERVICE_UNAVAILABLE, "overloaded").into_response()
}

#[tokio::test]
async fn test_client_sends_tools_and_parses_tool_calls() -> Result<(), Box<dyn std::error::Error>> {
    let recorded = Recorded::default();
    let app = Router::new()
        .route("/v1/chat/completions", post(tool_calling_completion))
        .with_state(recorded.clone());
    let url = serve(app).await;

    let client = OpenAICompatibleClient::new("sk-test".into(), "gpt-4o-mini".into(), url, "fake");
    let request = ChatRequest::with_tools(
        vec![ConversationMessage::user("what is 2+2")],
        vec![FunctionSpec::new(
            "calculate",
            "Evaluate a mathematical expression",
            json!({"type": "object", "properties": {"expression": {"type": "string"}}}),
        )],
    );

    let reply = client.complete(&request).await?;

    assert!(reply.has_tool_calls());
    assert_eq!(reply.tool_calls()[0].name, "calculate");
    assert_eq!(reply.tool_calls()[0].arguments, r#"{"expression":"2+2"}"#);

    let bodies = recorded.bodies.lock().unwrap();
    assert_eq!(bodies[0]["model"], "gpt-4o-mini");
    assert_eq!(bodies[0]["tool_choice"], "auto");
    assert_eq!(bodies[0]["tools"][0]["function"]["name"], "calculate");
    assert_eq!(recorded.auth.lock().unwrap()[0], "Bearer sk-test");
    assert_eq!(client.model_name(), "gpt-4o-mini");
    Ok(())
}

#[tokio::test]
async fn test_plain_request_sends_only_model_and_messages() {
    let recorded = Recorded::default();
    let app = Router::new()
        .route("/v1/chat/completions", post(tool_calling_completion))
        .with_state(recorded.clone());
    let url = serve(app).await;

    let client = OpenAICompatibleClient::new("sk-test".into(), "gpt-4o-mini".into(), url, "fake");
    let request = ChatRequest::plain(vec![ConversationMessage::user("hi")]);
    client.complete(&request).await.unwrap();

    let bodies = recorded.bodies.lock().unwrap();
    let mut keys: Vec<&str> = bodies[0]
        .as_object()
        .unwrap()
        .keys()
        .map(String::as_str)
        .collect();
    keys.sort();
    assert_eq!(keys, vec!["messages", "model"]);
}

#[tokio::test]
async fn test_client_maps_server_errors_to_retryable_backend_errors() {
    let app = Router::new().route("/v1/chat/completions", post(overloaded));
    let url = serve(app).await;

    let client = OpenAICompatibleClient::new("sk-test".into(), "m".into(), url, "fake");
    let request = ChatRequest::plain(vec![ConversationMessage::user("hi")]);

    let err = client.complete(&request).await.unwrap_err();

    assert_eq!(err.status_code, Some(503));
    assert!(err.message.contains("overloaded"));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_unreachable_endpoint_is_transient() {
    let client = OpenAICompatibleClient::new(
        "sk-test".into(),
        "m".into(),
        "http://127.0.0.1:9/v1/chat/completions".into(),
        "fake",
    );
    let request = ChatRequest::plain(vec![ConversationMessage::user("hi")]);

    let err = client.complete(&request).await.unwrap_err();

    assert!(err.transient);
    assert_eq!(err.status_code, None);
}
