use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{IdeationError, IdeationResult};
use crate::retry::RetryPolicy;

pub const ANTHROPIC_API_BASE: &str = "https://api.anthropic.com/v1";
pub const GATEWAY_API_BASE: &str = "https://openrouter.ai/api/v1";
pub const DEFAULT_ANTHROPIC_MODEL: &str = "claude-sonnet-4-20250514";

/// Wire protocol spoken by a model endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    /// Anthropic Messages API
    Anthropic,
    /// OpenAI-compatible `/chat/completions` (gateway, Perplexity, OpenAI)
    ChatCompletions,
}

/// A model reachable through a provider API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelEndpoint {
    pub provider: ProviderKind,
    pub base_url: String,
    /// Model id, e.g. "claude-sonnet-4-20250514" or "perplexity/sonar-reasoning"
    pub model: String,
}

impl ModelEndpoint {
    pub fn anthropic(model: impl Into<String>) -> Self {
        Self {
            provider: ProviderKind::Anthropic,
            base_url: ANTHROPIC_API_BASE.to_string(),
            model: model.into(),
        }
    }

    pub fn gateway(model: impl Into<String>) -> Self {
        Self {
            provider: ProviderKind::ChatCompletions,
            base_url: GATEWAY_API_BASE.to_string(),
            model: model.into(),
        }
    }

    /// Model id with the name swapped, keeping any `vendor/` gateway prefix.
    pub fn model_with_name(&self, name: &str) -> String {
        match self.model.rsplit_once('/') {
            Some((vendor, _)) => format!("{}/{}", vendor, name),
            None => name.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Topology {
    /// One generation call that must return the ideas JSON
    SingleCall,
    /// Reasoning call for research, then a separate extraction call for JSON
    TwoStage,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WebSearchConfig {
    pub enabled: bool,
    /// Upper bound on searches per call
    pub max_uses: u32,
}

impl Default for WebSearchConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_uses: 5,
        }
    }
}

/// Configuration for the idea generation pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub topology: Topology,

    /// Single-call model, or the reasoning model in two-stage mode
    pub primary: ModelEndpoint,

    /// Reformatting model, only used in two-stage mode
    pub extraction: ModelEndpoint,

    /// Model for the format-strict fallback attempt
    pub fallback: ModelEndpoint,

    pub web_search: WebSearchConfig,

    pub temperature: f32,
    pub extraction_temperature: f32,
    pub fallback_temperature: f32,
    pub max_tokens: u32,

    /// Wall-clock budget for a whole request, retries and fallback included
    pub request_timeout_secs: u64,

    /// Per provider call timeout on the HTTP client
    pub http_timeout_secs: u64,

    pub retry: RetryPolicy,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            topology: Topology::SingleCall,
            primary: ModelEndpoint::anthropic(DEFAULT_ANTHROPIC_MODEL),
            extraction: ModelEndpoint::anthropic(DEFAULT_ANTHROPIC_MODEL),
            fallback: ModelEndpoint::anthropic(DEFAULT_ANTHROPIC_MODEL),
            web_search: WebSearchConfig::default(),
            temperature: 0.8,
            extraction_temperature: 0.1,
            fallback_temperature: 0.3,
            max_tokens: 4000,
            request_timeout_secs: 60,
            http_timeout_secs: 45,
            retry: RetryPolicy::default(),
        }
    }
}

impl PipelineConfig {
    /// Perplexity reasoning plus GPT extraction, both routed through the gateway
    /// with a single key.
    pub fn gateway_two_stage() -> Self {
        Self {
            topology: Topology::TwoStage,
            primary: ModelEndpoint::gateway("perplexity/sonar-reasoning"),
            extraction: ModelEndpoint::gateway("openai/gpt-4o-mini"),
            fallback: ModelEndpoint::gateway("openai/gpt-4o-mini"),
            // Sonar models search on their own
            web_search: WebSearchConfig {
                enabled: false,
                ..WebSearchConfig::default()
            },
            ..Self::default()
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    pub fn validate(&self) -> IdeationResult<()> {
        for (stage, endpoint) in [
            ("primary", &self.primary),
            ("extraction", &self.extraction),
            ("fallback", &self.fallback),
        ] {
            if endpoint.model.trim().is_empty() {
                return Err(IdeationError::InvalidConfig(format!(
                    "{} model must not be empty",
                    stage
                )));
            }
            if !endpoint.base_url.starts_with("http") {
                return Err(IdeationError::InvalidConfig(format!(
                    "{} base_url must be an http(s) URL, got '{}'",
                    stage, endpoint.base_url
                )));
            }
        }

        if self.request_timeout_secs == 0 {
            return Err(IdeationError::InvalidConfig(
                "request_timeout_secs must be greater than zero".to_string(),
            ));
        }

        if self.http_timeout_secs == 0 {
            return Err(IdeationError::InvalidConfig(
                "http_timeout_secs must be greater than zero".to_string(),
            ));
        }

        if self.web_search.enabled && self.web_search.max_uses == 0 {
            return Err(IdeationError::InvalidConfig(
                "web_search.max_uses must be at least 1 when search is enabled".to_string(),
            ));
        }

        Ok(())
    }
}
