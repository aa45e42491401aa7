//! Hosted text-generation providers behind one async trait

pub mod anthropic;
pub mod chat;
pub mod types;

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use tracing::{error, warn};

use crate::config::{ModelEndpoint, ProviderKind};
use crate::error::IdeationError;

pub use anthropic::AnthropicClient;
pub use chat::ChatCompletionsClient;
pub use types::ProviderErrorBody;

/// A single text generation call
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub model: String,
    pub system: Option<String>,
    pub prompt: String,
    pub temperature: f32,
    pub max_tokens: u32,
    /// Attach web search, bounded to this many uses
    pub web_search: Option<u32>,
}

#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Returns the raw completion text; the caller owns extraction.
    async fn generate(
        &self,
        api_key: &str,
        request: &GenerationRequest,
    ) -> crate::IdeationResult<String>;

    fn provider_name(&self) -> &str;
}

/// Build the client for an endpoint, sharing the pooled HTTP client.
pub fn generator_for(endpoint: &ModelEndpoint, client: Client) -> Arc<dyn TextGenerator> {
    match endpoint.provider {
        ProviderKind::Anthropic => {
            Arc::new(AnthropicClient::with_client(client, endpoint.base_url.clone()))
        }
        ProviderKind::ChatCompletions => {
            Arc::new(ChatCompletionsClient::with_client(client, endpoint.base_url.clone()))
        }
    }
}

/// Map a non-success provider response onto the error taxonomy.
pub(crate) async fn error_from_response(provider: &str, response: Response) -> IdeationError {
    let status = response.status();
    let retry_after = response
        .headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok());
    let error_text = response.text().await.unwrap_or_default();

    let message = serde_json::from_str::<ProviderErrorBody>(&error_text)
        .map(|body| {
            error!(
                provider,
                status = status.as_u16(),
                error_type = ?body.error.error_type,
                "{} API error: {}", provider, body.error.message
            );
            body.error.message
        })
        .unwrap_or(error_text);

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            warn!(provider, status = status.as_u16(), "Provider rejected API key");
            IdeationError::Unauthorized { message }
        }
        StatusCode::TOO_MANY_REQUESTS => {
            warn!(provider, ?retry_after, "Rate limited by provider");
            IdeationError::RateLimited { retry_after }
        }
        _ => IdeationError::Provider {
            message,
            status_code: Some(status.as_u16()),
        },
    }
}
