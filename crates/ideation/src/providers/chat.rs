use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use super::types::{ChatCompletionRequest, ChatCompletionResponse, ChatMessage, GatewayPlugin};
use super::{error_from_response, GenerationRequest, TextGenerator};
use crate::error::{IdeationError, IdeationResult};

/// Client for OpenAI-compatible chat completion APIs.
///
/// Covers the model gateway as well as Perplexity and OpenAI when called
/// directly. Web search is requested through the gateway `web` plugin;
/// Perplexity sonar models search without it.
#[derive(Clone)]
pub struct ChatCompletionsClient {
    client: Client,
    base_url: String,
}

impl ChatCompletionsClient {
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
impl TextGenerator for ChatCompletionsClient {
    async fn generate(&self, api_key: &str, request: &GenerationRequest) -> IdeationResult<String> {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = &request.system {
            messages.push(ChatMessage::system(system.clone()));
        }
        messages.push(ChatMessage::user(request.prompt.clone()));

        debug!(
            "Creating chat completion with {} messages, model {}",
            messages.len(),
            request.model
        );

        let body = ChatCompletionRequest {
            model: request.model.clone(),
            messages,
            temperature: Some(request.temperature),
            max_tokens: Some(request.max_tokens),
            stream: Some(false),
            plugins: request
                .web_search
                .map(GatewayPlugin::web_search)
                .into_iter()
                .collect(),
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response(self.provider_name(), response).await);
        }

        let chat_response: ChatCompletionResponse = response.json().await?;

        if let Some(usage) = &chat_response.usage {
            debug!(
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "Chat completion usage"
            );
        }

        chat_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| IdeationError::Provider {
                message: "No completion returned".to_string(),
                status_code: None,
            })
    }

    fn provider_name(&self) -> &str {
        "chat-completions"
    }
}
