//! Idea generation pipeline: prompt, provider call(s), extraction, fallback.

use std::sync::Arc;
use std::time::Instant;

use reqwest::Client;
use roulette_core::{GeneratedIdea, IdeaGenerationRequest, IdeaGenerationResponse};
use tracing::{debug, error, info, warn};

use crate::config::{PipelineConfig, Topology};
use crate::error::{ErrorKind, IdeationError, IdeationResult};
use crate::extractor::extract_ideas;
use crate::prompts::{
    build_extraction_prompt, build_fallback_prompt, build_prompt, build_research_prompt,
    EXTRACTION_SYSTEM_PROMPT, SYSTEM_PROMPT,
};
use crate::providers::{generator_for, GenerationRequest, TextGenerator};
use crate::retry::with_retry;

/// Stages a request moves through, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Validating,
    Prompting,
    Invoking,
    Extracting,
    FallbackInvoking,
    FallbackExtracting,
}

impl PipelineStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Validating => "validating",
            Self::Prompting => "prompting",
            Self::Invoking => "invoking",
            Self::Extracting => "extracting",
            Self::FallbackInvoking => "fallback_invoking",
            Self::FallbackExtracting => "fallback_extracting",
        }
    }
}

fn enter(stage: PipelineStage) {
    debug!(stage = stage.as_str(), "Entering pipeline stage");
}

/// Turns a combination into three validated ideas.
///
/// Holds no per-request state; one instance is shared by all requests.
pub struct IdeaPipeline {
    config: PipelineConfig,
    primary: Arc<dyn TextGenerator>,
    extraction: Arc<dyn TextGenerator>,
    fallback: Arc<dyn TextGenerator>,
}

impl IdeaPipeline {
    /// Create a pipeline whose stages share one pooled HTTP client.
    pub fn new(config: PipelineConfig) -> IdeationResult<Self> {
        config.validate()?;

        let client = Client::builder().timeout(config.http_timeout()).build()?;
        let primary = generator_for(&config.primary, client.clone());
        let extraction = generator_for(&config.extraction, client.clone());
        let fallback = generator_for(&config.fallback, client);

        Ok(Self::with_generators(config, primary, extraction, fallback))
    }

    pub fn with_generators(
        config: PipelineConfig,
        primary: Arc<dyn TextGenerator>,
        extraction: Arc<dyn TextGenerator>,
        fallback: Arc<dyn TextGenerator>,
    ) -> Self {
        Self {
            config,
            primary,
            extraction,
            fallback,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub async fn generate(
        &self,
        request: &IdeaGenerationRequest,
    ) -> IdeationResult<IdeaGenerationResponse> {
        enter(PipelineStage::Validating);
        validate_request(request)?;

        let started = Instant::now();
        let budget = self.config.request_timeout();

        let result = match tokio::time::timeout(budget, self.run(request)).await {
            Ok(result) => result,
            Err(_) => {
                warn!(
                    timeout_secs = budget.as_secs(),
                    combination = %request.combination,
                    "Idea generation exceeded request budget"
                );
                Err(IdeationError::Timeout {
                    secs: budget.as_secs(),
                })
            }
        };

        match &result {
            Ok(_) => info!(
                combination = %request.combination,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Generated ideas"
            ),
            Err(e) => error!(
                combination = %request.combination,
                elapsed_ms = started.elapsed().as_millis() as u64,
                error = %e,
                "Idea generation failed"
            ),
        }

        result
    }

    async fn run(&self, request: &IdeaGenerationRequest) -> IdeationResult<IdeaGenerationResponse> {
        let ideas = match self.primary_attempt(request).await {
            Ok(ideas) => ideas,
            Err(e) if e.is_parse_error() => {
                warn!(error = %e, "Primary response failed validation, trying fallback");
                self.fallback_attempt(request).await?
            }
            Err(e) => return Err(e),
        };

        Ok(IdeaGenerationResponse {
            ideas,
            combination: request.combination,
        })
    }

    async fn primary_attempt(
        &self,
        request: &IdeaGenerationRequest,
    ) -> IdeationResult<Vec<GeneratedIdea>> {
        let raw = match self.config.topology {
            Topology::SingleCall => self.researched_call(request).await?,
            Topology::TwoStage => {
                let analysis = self.researched_call(request).await?;
                debug!(
                    analysis_len = analysis.len(),
                    "Reasoning stage complete, starting extraction"
                );

                let extraction = GenerationRequest {
                    model: self.config.extraction.model.clone(),
                    system: Some(EXTRACTION_SYSTEM_PROMPT.to_string()),
                    prompt: build_extraction_prompt(&request.combination, &analysis),
                    temperature: self.config.extraction_temperature,
                    max_tokens: self.config.max_tokens,
                    web_search: None,
                };
                self.call(self.extraction.as_ref(), &request.api_key, &extraction, "extract")
                    .await?
            }
        };

        enter(PipelineStage::Extracting);
        extract_ideas(&raw)
    }

    /// Single call or reasoning stage, with web search when enabled.
    ///
    /// A failed search-enabled call degrades to the plain prompt unless the
    /// failure would also sink the plain call.
    async fn researched_call(&self, request: &IdeaGenerationRequest) -> IdeationResult<String> {
        enter(PipelineStage::Prompting);
        let plain = GenerationRequest {
            model: self.primary_model(request),
            system: Some(SYSTEM_PROMPT.to_string()),
            prompt: build_prompt(&request.combination),
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
            web_search: None,
        };

        enter(PipelineStage::Invoking);
        if !self.config.web_search.enabled {
            return self
                .call(self.primary.as_ref(), &request.api_key, &plain, "generate")
                .await;
        }

        let searched = GenerationRequest {
            prompt: build_research_prompt(&request.combination),
            web_search: Some(self.config.web_search.max_uses),
            ..plain.clone()
        };

        match self
            .call(
                self.primary.as_ref(),
                &request.api_key,
                &searched,
                "generate_with_search",
            )
            .await
        {
            Ok(text) => Ok(text),
            Err(e) if can_degrade(&e) => {
                warn!(error = %e, "Web search call failed, continuing without search");
                self.call(self.primary.as_ref(), &request.api_key, &plain, "generate")
                    .await
            }
            Err(e) => Err(e),
        }
    }

    async fn fallback_attempt(
        &self,
        request: &IdeaGenerationRequest,
    ) -> IdeationResult<Vec<GeneratedIdea>> {
        enter(PipelineStage::FallbackInvoking);
        let fallback = GenerationRequest {
            model: self.config.fallback.model.clone(),
            system: Some(EXTRACTION_SYSTEM_PROMPT.to_string()),
            prompt: build_fallback_prompt(&request.combination),
            temperature: self.config.fallback_temperature,
            max_tokens: self.config.max_tokens,
            web_search: None,
        };
        let raw = self
            .call(self.fallback.as_ref(), &request.api_key, &fallback, "fallback")
            .await?;

        enter(PipelineStage::FallbackExtracting);
        extract_ideas(&raw).map_err(|e| {
            error!(error = %e, "Fallback response failed validation");
            IdeationError::ServiceUnavailable(
                "AI response could not be parsed after fallback. Please try again.".to_string(),
            )
        })
    }

    async fn call(
        &self,
        generator: &dyn TextGenerator,
        api_key: &str,
        request: &GenerationRequest,
        operation: &str,
    ) -> IdeationResult<String> {
        debug!(
            operation,
            provider = generator.provider_name(),
            model = %request.model,
            "Invoking provider"
        );
        with_retry(&self.config.retry, operation, || {
            generator.generate(api_key, request)
        })
        .await
    }

    fn primary_model(&self, request: &IdeaGenerationRequest) -> String {
        match (request.model, self.config.topology) {
            (Some(model), Topology::TwoStage) => {
                self.config.primary.model_with_name(model.as_str())
            }
            (Some(model), Topology::SingleCall) => {
                debug!(
                    requested = model.as_str(),
                    "Reasoning model override ignored in single-call topology"
                );
                self.config.primary.model.clone()
            }
            (None, _) => self.config.primary.model.clone(),
        }
    }
}

fn validate_request(request: &IdeaGenerationRequest) -> IdeationResult<()> {
    if request.api_key.trim().is_empty() {
        return Err(IdeationError::InvalidRequest(
            "API key is required".to_string(),
        ));
    }
    Ok(())
}

fn can_degrade(error: &IdeationError) -> bool {
    !matches!(
        error.kind(),
        ErrorKind::Unauthorized | ErrorKind::BadRequest | ErrorKind::Timeout
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ModelEndpoint;
    use crate::retry::RetryPolicy;
    use async_trait::async_trait;
    use roulette_core::{
        Combination, Market, ProblemType, ProjectScope, ReasoningModel, TechStack, UserType,
    };
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Replays scripted results and records every request it receives.
    struct ScriptedGenerator {
        replies: Mutex<VecDeque<IdeationResult<String>>>,
        requests: Mutex<Vec<(tokio::time::Instant, GenerationRequest)>>,
    }

    impl ScriptedGenerator {
        fn new(replies: Vec<IdeationResult<String>>) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.into()),
                requests: Mutex::new(Vec::new()),
            })
        }

        fn requests(&self) -> Vec<GenerationRequest> {
            self.requests
                .lock()
                .unwrap()
                .iter()
                .map(|(_, r)| r.clone())
                .collect()
        }

        fn call_times(&self) -> Vec<tokio::time::Instant> {
            self.requests.lock().unwrap().iter().map(|(t, _)| *t).collect()
        }
    }

    #[async_trait]
    impl TextGenerator for ScriptedGenerator {
        async fn generate(
            &self,
            _api_key: &str,
            request: &GenerationRequest,
        ) -> IdeationResult<String> {
            self.requests
                .lock()
                .unwrap()
                .push((tokio::time::Instant::now(), request.clone()));
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(IdeationError::InvalidConfig("script exhausted".into())))
        }

        fn provider_name(&self) -> &str {
            "scripted"
        }
    }

    struct StalledGenerator;

    #[async_trait]
    impl TextGenerator for StalledGenerator {
        async fn generate(&self, _: &str, _: &GenerationRequest) -> IdeationResult<String> {
            tokio::time::sleep(Duration::from_secs(600)).await;
            Ok(String::new())
        }

        fn provider_name(&self) -> &str {
            "stalled"
        }
    }

    fn combination() -> Combination {
        Combination::new(
            Market::Saas,
            UserType::Freelancers,
            ProblemType::Automation,
            TechStack::WebApp,
            ProjectScope::Weekend,
        )
    }

    fn ideas_json(prefix: &str) -> String {
        let idea = |n: u32| {
            json!({
                "name": format!("{} {}", prefix, n),
                "description": "Does one thing well.",
                "coreFeatures": ["a", "b", "c"],
                "suggestedTechStack": ["Web App", "Postgres", "Stripe"],
                "leadGenerationIdeas": ["x", "y", "z"]
            })
        };
        json!({ "ideas": [idea(1), idea(2), idea(3)] }).to_string()
    }

    fn rate_limited() -> IdeationResult<String> {
        Err(IdeationError::RateLimited { retry_after: None })
    }

    fn config(search: bool) -> PipelineConfig {
        let mut config = PipelineConfig::default();
        config.web_search.enabled = search;
        config.retry = RetryPolicy::default().without_jitter();
        config
    }

    fn pipeline(
        config: PipelineConfig,
        primary: Arc<ScriptedGenerator>,
        fallback: Arc<ScriptedGenerator>,
    ) -> IdeaPipeline {
        IdeaPipeline::with_generators(config, primary.clone(), primary, fallback)
    }

    fn request() -> IdeaGenerationRequest {
        IdeaGenerationRequest::new(combination(), "sk-test")
    }

    #[tokio::test]
    async fn test_single_call_success_echoes_combination() {
        let primary = ScriptedGenerator::new(vec![Ok(format!(
            "Here are your ideas:\n```json\n{}\n```",
            ideas_json("Idea")
        ))]);
        let fallback = ScriptedGenerator::new(vec![]);
        let pipeline = pipeline(config(false), primary.clone(), fallback.clone());

        let response = pipeline.generate(&request()).await.unwrap();

        assert_eq!(response.ideas.len(), 3);
        assert_eq!(response.ideas[0].name, "Idea 1");
        assert_eq!(response.combination, combination());
        assert_eq!(primary.requests().len(), 1);
        assert!(fallback.requests().is_empty());
    }

    #[tokio::test]
    async fn test_empty_api_key_is_rejected_before_any_call() {
        let primary = ScriptedGenerator::new(vec![]);
        let pipeline = pipeline(config(true), primary.clone(), ScriptedGenerator::new(vec![]));

        let err = pipeline
            .generate(&IdeaGenerationRequest::new(combination(), "   "))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::BadRequest);
        assert!(primary.requests().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_unauthorized_is_not_retried_or_degraded() {
        let primary = ScriptedGenerator::new(vec![
            Err(IdeationError::Unauthorized {
                message: "invalid x-api-key".to_string(),
            }),
            Err(IdeationError::Unauthorized {
                message: "invalid x-api-key".to_string(),
            }),
        ]);
        let pipeline = pipeline(config(true), primary.clone(), ScriptedGenerator::new(vec![]));

        let err = pipeline.generate(&request()).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Unauthorized);
        assert_eq!(primary.requests().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limits_are_retried_with_growing_delays() {
        let primary = ScriptedGenerator::new(vec![
            rate_limited(),
            rate_limited(),
            Ok(ideas_json("Retry")),
        ]);
        let pipeline = pipeline(config(false), primary.clone(), ScriptedGenerator::new(vec![]));

        let response = pipeline.generate(&request()).await.unwrap();
        assert_eq!(response.ideas[1].name, "Retry 2");

        let times = primary.call_times();
        assert_eq!(times.len(), 3);
        let first_gap = times[1] - times[0];
        let second_gap = times[2] - times[1];
        assert!(second_gap > first_gap);
    }

    #[tokio::test]
    async fn test_parse_failure_uses_fallback() {
        let primary = ScriptedGenerator::new(vec![Ok("I cannot produce JSON today.".to_string())]);
        let fallback = ScriptedGenerator::new(vec![Ok(ideas_json("Fallback"))]);
        let pipeline = pipeline(config(false), primary, fallback.clone());

        let response = pipeline.generate(&request()).await.unwrap();
        assert_eq!(response.ideas[0].name, "Fallback 1");

        let sent = fallback.requests();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].temperature, 0.3);
        assert!(sent[0].web_search.is_none());
        assert!(sent[0].prompt.contains("Fill in this template"));
    }

    #[tokio::test]
    async fn test_fallback_parse_failure_is_service_unavailable() {
        let no_ideas = json!({ "ideas": [] }).to_string();
        let primary = ScriptedGenerator::new(vec![Ok(no_ideas.clone())]);
        let fallback = ScriptedGenerator::new(vec![Ok(no_ideas)]);
        let pipeline = pipeline(config(false), primary, fallback.clone());

        let err = pipeline.generate(&request()).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::ServiceUnavailable);
        assert_eq!(fallback.requests().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_search_rate_limit_degrades_to_plain_prompt() {
        let primary = ScriptedGenerator::new(vec![
            rate_limited(),
            rate_limited(),
            rate_limited(),
            Ok(ideas_json("Plain")),
        ]);
        let pipeline = pipeline(config(true), primary.clone(), ScriptedGenerator::new(vec![]));

        let response = pipeline.generate(&request()).await.unwrap();
        assert_eq!(response.ideas[0].name, "Plain 1");

        let sent = primary.requests();
        assert_eq!(sent.len(), 4);
        assert!(sent[..3].iter().all(|r| r.web_search == Some(5)));
        assert!(sent[0].prompt.contains("web search"));
        assert!(sent[3].web_search.is_none());
        assert_eq!(sent[3].prompt, build_prompt(&combination()));
    }

    #[tokio::test]
    async fn test_two_stage_feeds_analysis_to_extraction() {
        let mut config = PipelineConfig::gateway_two_stage();
        config.retry = RetryPolicy::default().without_jitter();

        let reasoning = ScriptedGenerator::new(vec![Ok(
            "<think>hmm</think> Research shows freelancers hate invoicing.".to_string(),
        )]);
        let extraction = ScriptedGenerator::new(vec![Ok(ideas_json("Extracted"))]);
        let pipeline = IdeaPipeline::with_generators(
            config,
            reasoning.clone(),
            extraction.clone(),
            ScriptedGenerator::new(vec![]),
        );

        let request = request().with_model(ReasoningModel::SonarReasoningPro);
        let response = pipeline.generate(&request).await.unwrap();
        assert_eq!(response.ideas[2].name, "Extracted 3");

        let reasoning_sent = reasoning.requests();
        assert_eq!(reasoning_sent.len(), 1);
        assert_eq!(reasoning_sent[0].model, "perplexity/sonar-reasoning-pro");

        let extraction_sent = extraction.requests();
        assert_eq!(extraction_sent.len(), 1);
        assert_eq!(extraction_sent[0].model, "openai/gpt-4o-mini");
        assert!(extraction_sent[0]
            .prompt
            .contains("Research shows freelancers hate invoicing."));
        assert!(reasoning.call_times()[0] <= extraction.call_times()[0]);
    }

    #[tokio::test]
    async fn test_two_stage_unparseable_extraction_uses_fallback() {
        let mut config = PipelineConfig::gateway_two_stage();
        config.retry = RetryPolicy::default().without_jitter();

        let reasoning =
            ScriptedGenerator::new(vec![Ok("Freelancers want fewer tabs.".to_string())]);
        let extraction =
            ScriptedGenerator::new(vec![Ok("Sorry, here is a summary instead.".to_string())]);
        let fallback = ScriptedGenerator::new(vec![Ok(ideas_json("Fallback"))]);
        let pipeline = IdeaPipeline::with_generators(
            config,
            reasoning.clone(),
            extraction.clone(),
            fallback.clone(),
        );

        let response = pipeline.generate(&request()).await.unwrap();
        assert_eq!(response.ideas[0].name, "Fallback 1");

        assert_eq!(reasoning.requests().len(), 1);
        assert_eq!(extraction.requests().len(), 1);
        let fallback_sent = fallback.requests();
        assert_eq!(fallback_sent.len(), 1);
        assert_eq!(fallback_sent[0].model, "openai/gpt-4o-mini");
        assert!(!fallback_sent[0].prompt.contains("Freelancers want fewer tabs."));
    }

    #[tokio::test]
    async fn test_http_client_timeout_maps_to_timeout_kind() {
        use wiremock::matchers::{method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let provider = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/messages"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({
                        "content": [{"type": "text", "text": ideas_json("Late")}],
                        "stop_reason": "end_turn"
                    }))
                    .set_delay(Duration::from_secs(30)),
            )
            .mount(&provider)
            .await;

        let mut endpoint = ModelEndpoint::anthropic("claude-sonnet-4-20250514");
        endpoint.base_url = provider.uri();
        let mut config = config(false);
        config.primary = endpoint.clone();
        config.extraction = endpoint.clone();
        config.fallback = endpoint;
        config.http_timeout_secs = 1;

        let pipeline = IdeaPipeline::new(config).unwrap();
        let err = pipeline.generate(&request()).await.unwrap_err();

        assert!(matches!(err, IdeationError::Http(_)));
        assert_eq!(err.kind(), ErrorKind::Timeout);
    }

    #[tokio::test]
    async fn test_single_call_ignores_model_override() {
        let primary = ScriptedGenerator::new(vec![Ok(ideas_json("Idea"))]);
        let pipeline = pipeline(config(false), primary.clone(), ScriptedGenerator::new(vec![]));

        let request = request().with_model(ReasoningModel::SonarReasoning);
        pipeline.generate(&request).await.unwrap();

        assert_eq!(primary.requests()[0].model, "claude-sonnet-4-20250514");
    }

    #[tokio::test(start_paused = true)]
    async fn test_request_budget_yields_timeout() {
        let mut config = config(false);
        config.request_timeout_secs = 60;
        let stalled: Arc<dyn TextGenerator> = Arc::new(StalledGenerator);
        let pipeline =
            IdeaPipeline::with_generators(config, stalled.clone(), stalled.clone(), stalled);

        let err = pipeline.generate(&request()).await.unwrap_err();
        assert!(matches!(err, IdeationError::Timeout { secs: 60 }));
    }

    #[test]
    fn test_pipeline_new_validates_config() {
        let mut config = PipelineConfig::default();
        config.fallback = ModelEndpoint::anthropic("");
        assert!(matches!(
            IdeaPipeline::new(config),
            Err(IdeationError::InvalidConfig(_))
        ));
    }
}
