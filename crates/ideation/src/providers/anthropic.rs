use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use super::types::{AnthropicRequest, AnthropicResponse, AnthropicTool, ChatMessage};
use super::{error_from_response, GenerationRequest, TextGenerator};
use crate::error::{IdeationError, IdeationResult};

const API_VERSION: &str = "2023-06-01";

/// Client for the Anthropic Messages API
#[derive(Clone)]
pub struct AnthropicClient {
    client: Client,
    base_url: String,
}

impl AnthropicClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl TextGenerator for AnthropicClient {
    async fn generate(&self, api_key: &str, request: &GenerationRequest) -> IdeationResult<String> {
        debug!(
            model = %request.model,
            web_search = ?request.web_search,
            "Creating Anthropic message"
        );

        let body = AnthropicRequest {
            model: request.model.clone(),
            max_tokens: request.max_tokens,
            system: request.system.clone(),
            messages: vec![ChatMessage::user(request.prompt.clone())],
            temperature: Some(request.temperature),
            tools: request
                .web_search
                .map(AnthropicTool::web_search)
                .into_iter()
                .collect(),
        };

        let response = self
            .client
            .post(format!("{}/messages", self.base_url))
            .header("x-api-key", api_key)
            .header("anthropic-version", API_VERSION)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response(self.provider_name(), response).await);
        }

        let message: AnthropicResponse = response.json().await?;
        let text = message.text();

        if text.trim().is_empty() {
            return Err(IdeationError::Provider {
                message: format!(
                    "No text content returned (stop_reason: {})",
                    message.stop_reason.as_deref().unwrap_or("unknown")
                ),
                status_code: None,
            });
        }

        if let Some(usage) = &message.usage {
            debug!(
                input_tokens = usage.input_tokens,
                output_tokens = usage.output_tokens,
                "Anthropic usage"
            );
        }

        Ok(text)
    }

    fn provider_name(&self) -> &str {
        "anthropic"
    }
}
