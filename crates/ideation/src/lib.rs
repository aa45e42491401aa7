//! Ideation crate for BuildRoulette
//!
//! Turns a roulette combination into three validated product ideas by
//! prompting a hosted language model.
//!
//! # Architecture
//!
//! - **Prompts**: Deterministic prompt text for each combination
//! - **Providers**: Anthropic Messages and OpenAI-compatible chat completions
//! - **Retry**: Exponential backoff with jitter, rate limits only
//! - **Extractor**: Isolates the JSON object and validates the idea list
//! - **Pipeline**: Single-call or two-stage generation with a strict fallback
//! - **Notify**: Optional Discord webhook for outcomes

pub mod config;
pub mod error;
pub mod extractor;
pub mod notify;
pub mod pipeline;
pub mod prompts;
pub mod providers;
pub mod retry;

pub use config::{ModelEndpoint, PipelineConfig, ProviderKind, Topology, WebSearchConfig};
pub use error::{ErrorKind, IdeationError, IdeationResult};
pub use extractor::{extract_ideas, isolate_json};
pub use notify::{DiscordNotifier, DEFAULT_WEBHOOK_TIMEOUT};
pub use pipeline::{IdeaPipeline, PipelineStage};
pub use providers::{
    generator_for, AnthropicClient, ChatCompletionsClient, GenerationRequest, TextGenerator,
};
pub use retry::{with_retry, RetryPolicy};
