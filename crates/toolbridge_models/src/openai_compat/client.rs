//! Generic client for OpenAI-compatible APIs.

use crate::openai_compat::{ChatResponse, OpenAICompatError, conversions};
use async_trait::async_trait;
use reqwest::Client;
use toolbridge_core::{ChatBackend, ChatReply, ChatRequest};
use toolbridge_error::BackendError;
use tracing::{debug, error, instrument};

/// OpenAI's own chat completions endpoint.
pub const OPENAI_CHAT_COMPLETIONS_URL: &str = "https://api.openai.com/v1/chat/completions";

/// Generic client for any OpenAI-compatible API.
#[derive(Debug, Clone)]
pub struct OpenAICompatibleClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
    provider_name: &'static str,
}

impl OpenAICompatibleClient {
    /// Creates a new OpenAI-compatible client.
    ///
    /// # Arguments
    ///
    /// * `api_key` - API key for authentication
    /// * `model` - Model identifier
    /// * `base_url` - Full URL of the chat completions endpoint
    /// * `provider_name` - Name of the provider (for logging/tracing)
    #[instrument(skip(api_key), fields(provider = provider_name, model = %model))]
    pub fn new(
        api_key: String,
        model: String,
        base_url: String,
        provider_name: &'static str,
    ) -> Self {
        debug!(
            provider = provider_name,
            model = %model,
            url = %base_url,
            "Created OpenAI-compatible client"
        );

        Self {
            client: Client::new(),
            api_key,
            model,
            base_url,
            provider_name,
        }
    }

    /// Creates a client for OpenAI's hosted API.
    pub fn openai(api_key: String, model: String) -> Self {
        Self::new(
            api_key,
            model,
            OPENAI_CHAT_COMPLETIONS_URL.to_string(),
            "openai",
        )
    }

    /// Runs one chat completion round.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be parsed.
    #[instrument(skip(self, req), fields(provider = self.provider_name, model = %self.model))]
    pub async fn chat(&self, req: &ChatRequest) -> Result<ChatReply, OpenAICompatError> {
        let chat_request = conversions::to_chat_request(req, &self.model)?;

        debug!(
            provider = self.provider_name,
            message_count = chat_request.messages().len(),
            tool_count = chat_request.tools().as_ref().map_or(0, Vec::len),
            "Sending request"
        );

        let response = self
            .client
            .post(&self.base_url)
            .bearer_auth(&self.api_key)
            .json(&chat_request)
            .send()
            .await
            .map_err(|e| {
                error!(provider = self.provider_name, error = ?e, "HTTP request failed");
                OpenAICompatError::Http(format!("Request failed: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!(
                provider = self.provider_name,
                status = %status,
                error = %error_text,
                "API error"
            );

            return Err(OpenAICompatError::Api {
                status: status.as_u16(),
                message: error_text,
            });
        }

        let chat_response: ChatResponse = response.json().await.map_err(|e| {
            error!(provider = self.provider_name, error = ?e, "Failed to parse response");
            OpenAICompatError::ResponseParsing(format!("Failed to parse JSON: {}", e))
        })?;

        debug!(
            provider = self.provider_name,
            choices = chat_response.choices.len(),
            total_tokens = ?chat_response.usage.as_ref().and_then(|u| u.total_tokens),
            "Received response"
        );

        conversions::from_chat_response(&chat_response)
    }

    /// Returns the provider name.
    pub fn provider_name(&self) -> &'static str {
        self.provider_name
    }
}

#[async_trait]
impl ChatBackend for OpenAICompatibleClient {
    async fn complete(&self, request: &ChatRequest) -> Result<ChatReply, BackendError> {
        self.chat(request).await.map_err(BackendError::from)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
