//! OpenAI-compatible chat completions client.

use crate::error::ModelError;
use crate::types::*;
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Chat completions client bound to one model.
///
/// The API key is stored using `SecretString` to prevent accidental
/// exposure in logs or debug output.
pub struct ModelClient {
    client: Client,
    base_url: String,
    api_key: SecretString,
    model: String,
}

impl ModelClient {
    /// Create a new model client.
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ModelError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()?;
        let base_url: String = base_url.into();

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: SecretString::new(api_key.into()),
            model: model.into(),
        })
    }

    /// Get the configured model name.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Send a chat completion request, offering `tools` when given.
    ///
    /// A single request: no retry, no backoff.
    #[instrument(skip(self, messages, tools), fields(message_count = messages.len(), tool_count = tools.map_or(0, |t| t.len())))]
    pub async fn chat_with_tools(
        &self,
        messages: Vec<Message>,
        temperature: Option<f32>,
        max_tokens: Option<u32>,
        tools: Option<&[ToolDefinition]>,
    ) -> Result<ChatResponseWithTools, ModelError> {
        let tools = tools.filter(|t| !t.is_empty()).map(|t| t.to_vec());
        let request = ChatRequest {
            model: self.model.clone(),
            messages,
            temperature,
            max_tokens,
            tool_choice: tools.as_ref().map(|_| "auto".to_string()),
            tools,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key.expose_secret()))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        let chat_response = self.handle_response::<ChatResponse>(response).await?;

        let choice = chat_response
            .choices
            .into_iter()
            .next()
            .ok_or(ModelError::EmptyResponse)?;

        let content = choice.message.content.filter(|c| !c.is_empty());
        let tool_calls = choice.message.tool_calls.filter(|calls| !calls.is_empty());
        if content.is_none() && tool_calls.is_none() {
            return Err(ModelError::EmptyResponse);
        }

        Ok(ChatResponseWithTools {
            content,
            tool_calls,
            finish_reason: choice.finish_reason.unwrap_or_else(|| "stop".into()),
            usage: chat_response.usage,
        })
    }

    /// Handle HTTP response, converting errors appropriately.
    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, ModelError> {
        let status = response.status();

        if status.is_success() {
            let body = response.text().await?;
            debug!("Response body: {}", body.chars().take(200).collect::<String>());
            serde_json::from_str(&body).map_err(ModelError::from)
        } else {
            Err(self.extract_error(response).await)
        }
    }

    /// Extract error information from failed response.
    async fn extract_error(&self, response: reqwest::Response) -> ModelError {
        let status = response.status();

        match status {
            StatusCode::TOO_MANY_REQUESTS => {
                warn!("Rate limit exceeded");
                ModelError::RateLimit
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                warn!("Authentication failed");
                ModelError::Unauthorized
            }
            _ => {
                let message = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Unknown error".into());
                ModelError::Api {
                    status: status.as_u16(),
                    message,
                }
            }
        }
    }
}
