//! Shared fixtures: an in-process fake tool server and scripted collaborators.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::Router;
use serde_json::{Value, json};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use toolbridge_core::{
    CallerIdentity, ChatBackend, ChatReply, ChatRequest, ToolDefinition,
};
use toolbridge_error::{BackendError, TransportError, TransportErrorKind};
use toolbridge_mcp_client::{McpClientError, McpClientResult, ToolInvoker, ToolServer};

// ---------------------------------------------------------------------------
// Fake tool server
// ---------------------------------------------------------------------------

/// How the fake server answers one request.
pub enum Reply {
    /// `application/json` body
    Json(Value),
    /// `text/event-stream` body built from `(event, data)` pairs
    Sse(Vec<(&'static str, String)>),
    /// Arbitrary status with a plain body
    Status(u16, String),
    /// 200 with a custom content type
    Raw(&'static str, String),
    /// 202 with no body
    Accepted,
    /// Sleep, then answer
    Delayed(Duration, Box<Reply>),
}

/// A request the fake server received.
#[derive(Debug, Clone)]
pub struct Received {
    pub body: Value,
    pub authorization: Option<String>,
    pub session_id: Option<String>,
    pub accept: Option<String>,
}

type Responder = dyn Fn(&Value) -> Reply + Send + Sync;

struct FakeState {
    respond: Box<Responder>,
    session_id: Option<String>,
    received: Arc<Mutex<Vec<Received>>>,
}

/// Handle to a running fake server.
pub struct FakeServer {
    pub base_url: String,
    received: Arc<Mutex<Vec<Received>>>,
}

impl FakeServer {
    /// Every request received so far.
    pub fn received(&self) -> Vec<Received> {
        self.received.lock().unwrap().clone()
    }

    /// Methods of the requests received so far, in order.
    pub fn methods(&self) -> Vec<String> {
        self.received()
            .iter()
            .map(|r| r.body["method"].as_str().unwrap_or_default().to_string())
            .collect()
    }

    /// How many requests named `method`.
    pub fn count(&self, method: &str) -> usize {
        self.methods().iter().filter(|m| *m == method).count()
    }
}

fn header_string(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

async fn render(reply: Reply) -> Response {
    match reply {
        Reply::Json(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "application/json")],
            body.to_string(),
        )
            .into_response(),
        Reply::Sse(events) => {
            let mut body = String::new();
            for (event, data) in events {
                body.push_str(&format!("event: {event}\ndata: {data}\n\n"));
            }
            (
                StatusCode::OK,
                [(header::CONTENT_TYPE, "text/event-stream")],
                body,
            )
                .into_response()
        }
        Reply::Status(code, body) => {
            (StatusCode::from_u16(code).unwrap(), body).into_response()
        }
        Reply::Raw(content_type, body) => {
            (StatusCode::OK, [(header::CONTENT_TYPE, content_type)], body).into_response()
        }
        Reply::Accepted => StatusCode::ACCEPTED.into_response(),
        Reply::Delayed(delay, inner) => {
            tokio::time::sleep(delay).await;
            Box::pin(render(*inner)).await
        }
    }
}

async fn handle(State(state): State<Arc<FakeState>>, headers: HeaderMap, body: Bytes) -> Response {
    let body: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    state.received.lock().unwrap().push(Received {
        body: body.clone(),
        authorization: header_string(&headers, "authorization"),
        session_id: header_string(&headers, "mcp-session-id"),
        accept: header_string(&headers, "accept"),
    });

    let mut response = render((state.respond)(&body)).await;
    if let Some(session_id) = &state.session_id {
        response
            .headers_mut()
            .insert("mcp-session-id", HeaderValue::from_str(session_id).unwrap());
    }
    response
}

/// Start a fake server at `/mcp` answering with `respond`.
pub async fn spawn_server<F>(session_id: Option<&str>, respond: F) -> FakeServer
where
    F: Fn(&Value) -> Reply + Send + Sync + 'static,
{
    let received = Arc::new(Mutex::new(Vec::new()));
    let state = Arc::new(FakeState {
        respond: Box::new(respond),
        session_id: session_id.map(str::to_string),
        received: Arc::clone(&received),
    });
    let app = Router::new().route("/mcp", post(handle)).with_state(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    FakeServer {
        base_url: format!("http://{addr}"),
        received,
    }
}

/// JSON-RPC success envelope answering `request`.
pub fn rpc_result(request: &Value, result: Value) -> Value {
    json!({"jsonrpc": "2.0", "id": request["id"], "result": result})
}

/// JSON-RPC error envelope answering `request`.
pub fn rpc_error(request: &Value, code: i64, message: &str) -> Value {
    json!({"jsonrpc": "2.0", "id": request["id"], "error": {"code": code, "message": message}})
}

/// Tools advertised by [`math_server`].
pub fn math_tools() -> Value {
    json!([
        {
            "name": "calculate",
            "description": "Evaluate an arithmetic expression",
            "inputSchema": {
                "type": "object",
                "properties": {"expression": {"type": "string"}},
                "required": ["expression"]
            }
        },
        {
            "name": "mean",
            "description": "Average of a list of numbers",
            "inputSchema": {
                "type": "object",
                "properties": {"values": {"type": "array"}}
            }
        }
    ])
}

/// Answer for every method of a small arithmetic tool server.
pub fn math_reply(request: &Value) -> Value {
    match request["method"].as_str().unwrap_or_default() {
        "initialize" => rpc_result(
            request,
            json!({
                "protocolVersion": "2024-11-05",
                "capabilities": {"tools": {}},
                "serverInfo": {"name": "math", "version": "1.0.0"}
            }),
        ),
        "tools/list" => rpc_result(request, json!({ "tools": math_tools() })),
        "tools/call" => {
            let params = &request["params"];
            match params["name"].as_str().unwrap_or_default() {
                "calculate" => {
                    let text = match params["arguments"]["expression"].as_str() {
                        Some("2+2") => "4",
                        _ => "unsupported expression",
                    };
                    rpc_result(request, json!({"content": [{"type": "text", "text": text}]}))
                }
                "explode" => rpc_error(request, -32000, "boom"),
                other => rpc_error(request, -32602, &format!("Unknown tool: {other}")),
            }
        }
        _ => rpc_error(request, -32601, "Method not found"),
    }
}

/// Responder for [`math_reply`] with JSON framing.
pub fn math_server(request: &Value) -> Reply {
    if request.get("id").is_none() {
        return Reply::Accepted;
    }
    Reply::Json(math_reply(request))
}

// ---------------------------------------------------------------------------
// Scripted chat backend
// ---------------------------------------------------------------------------

/// Chat backend replaying canned replies and recording every request.
pub struct ScriptedBackend {
    replies: Mutex<VecDeque<Result<ChatReply, BackendError>>>,
    requests: Mutex<Vec<ChatRequest>>,
}

impl ScriptedBackend {
    pub fn new(replies: Vec<Result<ChatReply, BackendError>>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatBackend for ScriptedBackend {
    async fn complete(&self, request: &ChatRequest) -> Result<ChatReply, BackendError> {
        self.requests.lock().unwrap().push(request.clone());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(BackendError::new("script exhausted")))
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}

// ---------------------------------------------------------------------------
// Mock tool server
// ---------------------------------------------------------------------------

/// Outcome of a mocked tool call.
pub type CallOutcome = Result<Value, McpClientError>;

/// In-memory [`ToolServer`] with scripted discovery and tool results.
pub struct MockToolServer {
    tools: Mutex<Result<Vec<ToolDefinition>, McpClientError>>,
    failures_before_success: AtomicUsize,
    delay: Duration,
    list_calls: AtomicUsize,
    listed_for: Mutex<Vec<String>>,
    results: HashMap<String, CallOutcome>,
    invocations: Arc<Mutex<Vec<(String, Value)>>>,
}

impl MockToolServer {
    pub fn new(tools: Vec<ToolDefinition>) -> Self {
        Self {
            tools: Mutex::new(Ok(tools)),
            failures_before_success: AtomicUsize::new(0),
            delay: Duration::ZERO,
            list_calls: AtomicUsize::new(0),
            listed_for: Mutex::new(Vec::new()),
            results: HashMap::new(),
            invocations: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Discovery always fails with a network error.
    pub fn unreachable() -> Self {
        let server = Self::new(Vec::new());
        *server.tools.lock().unwrap() = Err(network_error());
        server
    }

    /// Discovery fails `count` times before answering.
    pub fn failing_first(mut self, count: usize) -> Self {
        self.failures_before_success = AtomicUsize::new(count);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_result(mut self, tool: &str, outcome: CallOutcome) -> Self {
        self.results.insert(tool.to_string(), outcome);
        self
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn listed_for(&self) -> Vec<String> {
        self.listed_for.lock().unwrap().clone()
    }

    pub fn invocations(&self) -> Vec<(String, Value)> {
        self.invocations.lock().unwrap().clone()
    }
}

pub fn network_error() -> McpClientError {
    TransportError::new(TransportErrorKind::Network("connection refused".into())).into()
}

struct MockInvoker {
    results: HashMap<String, CallOutcome>,
    invocations: Arc<Mutex<Vec<(String, Value)>>>,
}

#[async_trait]
impl ToolInvoker for MockInvoker {
    async fn call_tool(&self, name: &str, arguments: Value) -> McpClientResult<Value> {
        self.invocations
            .lock()
            .unwrap()
            .push((name.to_string(), arguments));
        self.results
            .get(name)
            .cloned()
            .unwrap_or_else(|| Ok(json!({"content": [{"type": "text", "text": "ok"}]})))
    }
}

#[async_trait]
impl ToolServer for MockToolServer {
    async fn list_tools(&self, identity: &CallerIdentity) -> McpClientResult<Vec<ToolDefinition>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.listed_for
            .lock()
            .unwrap()
            .push(identity.fingerprint().to_string());
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let remaining = self.failures_before_success.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failures_before_success
                .store(remaining - 1, Ordering::SeqCst);
            return Err(network_error());
        }

        self.tools.lock().unwrap().clone()
    }

    fn open_session(&self, _identity: &CallerIdentity) -> McpClientResult<Arc<dyn ToolInvoker>> {
        Ok(Arc::new(MockInvoker {
            results: self.results.clone(),
            invocations: Arc::clone(&self.invocations),
        }))
    }
}

/// A simple tool definition with one string argument.
pub fn tool(name: &str) -> ToolDefinition {
    ToolDefinition::new(
        name,
        format!("The {name} tool"),
        json!({"type": "object", "properties": {"input": {"type": "string"}}}),
    )
}
