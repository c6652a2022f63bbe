//! HTTP transport for one tool-protocol session.
//!
//! Every request is a JSON-RPC envelope POSTed to a single endpoint. The
//! server may answer with a plain JSON body or with a `text/event-stream`
//! carrying the response as its first `message` event. A session id
//! handed out by the server is latched on first sight and echoed on every
//! later request.

use crate::jsonrpc::{JsonRpcRequest, JsonRpcResponse};
use crate::{McpClientConfig, McpClientResult};
use eventsource_stream::Eventsource;
use futures_util::StreamExt;
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap};
use reqwest::{Client, Response, Url};
use serde_json::Value;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use toolbridge_core::CallerIdentity;
use toolbridge_error::{ProtocolError, ProtocolErrorKind, TransportError, TransportErrorKind};
use tracing::{debug, instrument, trace};

/// Header the session id is sent back in.
pub const SESSION_ID_HEADER: &str = "mcp-session-id";

/// Response headers a session id is accepted from, in order of preference.
const SESSION_ID_RESPONSE_HEADERS: [&str; 2] = [SESSION_ID_HEADER, "x-mcp-session-id"];

const ACCEPT_BOTH: &str = "application/json, text/event-stream";

/// Transport bound to one caller and one server session.
///
/// Never shared between identities: the bearer token and the latched
/// session id both belong to a single caller.
pub struct SessionTransport {
    http: Client,
    endpoint: Url,
    identity: CallerIdentity,
    session_id: OnceLock<String>,
    next_id: AtomicU64,
    request_timeout: Duration,
    sse_read_timeout: Duration,
}

impl std::fmt::Debug for SessionTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionTransport")
            .field("endpoint", &self.endpoint.as_str())
            .field("identity", &self.identity)
            .field("session_id", &self.session_id.get())
            .finish()
    }
}

impl SessionTransport {
    /// Create a transport for `identity` using a shared HTTP client.
    pub fn new(
        http: Client,
        config: &McpClientConfig,
        identity: CallerIdentity,
    ) -> Result<Self, TransportError> {
        Ok(Self {
            http,
            endpoint: config.endpoint()?,
            identity,
            session_id: OnceLock::new(),
            next_id: AtomicU64::new(0),
            request_timeout: *config.request_timeout(),
            sse_read_timeout: *config.sse_read_timeout(),
        })
    }

    /// The endpoint requests are posted to.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Caller this transport authenticates as.
    pub fn identity(&self) -> &CallerIdentity {
        &self.identity
    }

    /// Session id assigned by the server, once one has been seen.
    pub fn session_id(&self) -> Option<&str> {
        self.session_id.get().map(String::as_str)
    }

    /// Send a request and return its `result`.
    #[instrument(
        skip(self, params),
        fields(caller = %self.identity.short(), id = tracing::field::Empty)
    )]
    pub async fn request(&self, method: &str, params: Value) -> McpClientResult<Value> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        tracing::Span::current().record("id", id);

        let envelope = JsonRpcRequest::call(id, method, params);
        let response = self.post(&envelope).await?;
        let response = self.check_status(response).await?;

        let rpc = match content_type(response.headers()).as_str() {
            "" | "application/json" => self.read_json(response).await?,
            "text/event-stream" => self.read_event_stream(response).await?,
            other => {
                return Err(TransportError::new(TransportErrorKind::UnsupportedContentType(
                    other.to_string(),
                ))
                .into());
            }
        };

        debug!(method, "Received response");
        Ok(rpc.into_result(method)?)
    }

    /// Send a notification. Any 2xx answer counts as delivered; the body is ignored.
    #[instrument(skip(self), fields(caller = %self.identity.short()))]
    pub async fn notify(&self, method: &str) -> McpClientResult<()> {
        let envelope = JsonRpcRequest::notification(method);
        let response = self.post(&envelope).await?;
        self.check_status(response).await?;
        Ok(())
    }

    async fn post(&self, envelope: &JsonRpcRequest<'_>) -> Result<Response, TransportError> {
        let mut request = self
            .http
            .post(self.endpoint.clone())
            .bearer_auth(self.identity.bearer())
            .header(ACCEPT, ACCEPT_BOTH)
            .json(envelope);

        if let Some(session_id) = self.session_id.get() {
            request = request.header(SESSION_ID_HEADER, session_id);
        }

        let response = tokio::time::timeout(self.request_timeout, request.send())
            .await
            .map_err(|_| {
                TransportError::new(TransportErrorKind::Timeout(format!(
                    "{} after {:?}",
                    envelope.method(),
                    self.request_timeout
                )))
            })?
            .map_err(send_error)?;

        self.latch_session_id(response.headers());
        Ok(response)
    }

    fn latch_session_id(&self, headers: &HeaderMap) {
        if self.session_id.get().is_some() {
            return;
        }

        let found = SESSION_ID_RESPONSE_HEADERS.iter().find_map(|name| {
            headers
                .get(*name)
                .and_then(|value| value.to_str().ok())
                .map(str::trim)
                .filter(|value| !value.is_empty())
        });

        if let Some(session_id) = found {
            if self.session_id.set(session_id.to_string()).is_ok() {
                debug!(session_id, "Latched session id");
            }
        }
    }

    async fn check_status(&self, response: Response) -> McpClientResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = tokio::time::timeout(self.request_timeout, response.text())
            .await
            .ok()
            .and_then(Result::ok)
            .unwrap_or_default();
        let message = if body.trim().is_empty() {
            status.canonical_reason().unwrap_or("Unknown").to_string()
        } else {
            body
        };

        Err(ProtocolError::new(ProtocolErrorKind::HttpStatus {
            status_code: status.as_u16(),
            message,
        })
        .into())
    }

    async fn read_json(&self, response: Response) -> Result<JsonRpcResponse, TransportError> {
        let bytes = tokio::time::timeout(self.request_timeout, response.bytes())
            .await
            .map_err(|_| {
                TransportError::new(TransportErrorKind::Timeout("reading response body".into()))
            })?
            .map_err(send_error)?;

        serde_json::from_slice(&bytes)
            .map_err(|e| TransportError::new(TransportErrorKind::InvalidBody(e.to_string())))
    }

    async fn read_event_stream(
        &self,
        response: Response,
    ) -> Result<JsonRpcResponse, TransportError> {
        let mut events = std::pin::pin!(response.bytes_stream().eventsource());

        loop {
            let next = tokio::time::timeout(self.sse_read_timeout, events.next())
                .await
                .map_err(|_| {
                    TransportError::new(TransportErrorKind::Timeout(format!(
                        "no event within {:?}",
                        self.sse_read_timeout
                    )))
                })?;

            let event = match next {
                Some(Ok(event)) => event,
                Some(Err(e)) => {
                    return Err(TransportError::new(TransportErrorKind::InvalidBody(
                        e.to_string(),
                    )));
                }
                None => return Err(TransportError::new(TransportErrorKind::StreamEnded)),
            };

            if !event.event.is_empty() && event.event != "message" {
                trace!(event = %event.event, "Skipping non-message event");
                continue;
            }
            if event.data.trim().is_empty() {
                continue;
            }

            return serde_json::from_str(&event.data)
                .map_err(|e| TransportError::new(TransportErrorKind::InvalidBody(e.to_string())));
        }
    }
}

fn send_error(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::new(TransportErrorKind::Timeout(err.to_string()))
    } else {
        TransportError::new(TransportErrorKind::Network(err.to_string()))
    }
}

/// Media type of a response, lowercased and without parameters.
fn content_type(headers: &HeaderMap) -> String {
    headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .map(|value| value.trim().to_ascii_lowercase())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    #[test]
    fn test_content_type_ignores_parameters() {
        let mut headers = HeaderMap::new();
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("Text/Event-Stream; charset=utf-8"),
        );
        assert_eq!(content_type(&headers), "text/event-stream");

        assert_eq!(content_type(&HeaderMap::new()), "");
    }

    #[test]
    fn test_session_id_latches_once() {
        let transport = SessionTransport::new(
            Client::new(),
            &McpClientConfig::new("http://localhost:8000"),
            CallerIdentity::new("tok1"),
        )
        .unwrap();
        assert_eq!(transport.session_id(), None);

        let mut first = HeaderMap::new();
        first.insert("x-mcp-session-id", HeaderValue::from_static("abc"));
        transport.latch_session_id(&first);

        let mut second = HeaderMap::new();
        second.insert(SESSION_ID_HEADER, HeaderValue::from_static("other"));
        transport.latch_session_id(&second);

        assert_eq!(transport.session_id(), Some("abc"));
    }
}
