use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::combination::Combination;

/// Every successful generation yields exactly this many ideas.
pub const IDEAS_PER_REQUEST: usize = 3;
pub const CORE_FEATURES_RANGE: RangeInclusive<usize> = 3..=5;
pub const TECH_STACK_RANGE: RangeInclusive<usize> = 3..=5;
pub const LEAD_GENERATION_RANGE: RangeInclusive<usize> = 3..=4;

/// A single product concept produced by the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "typescript", derive(ts_rs::TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "camelCase")]
pub struct GeneratedIdea {
    /// Catchy, memorable product name
    pub name: String,
    /// One or two sentence pitch
    pub description: String,
    /// 3-5 concise core features
    pub core_features: Vec<String>,
    /// 3-5 technologies for implementation
    pub suggested_tech_stack: Vec<String>,
    /// 3-4 marketing / lead generation strategies
    pub lead_generation_ideas: Vec<String>,
}

/// Reasoning model tiers the UI lets users pick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "typescript", derive(ts_rs::TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "kebab-case")]
pub enum ReasoningModel {
    SonarReasoning,
    SonarReasoningPro,
}

impl ReasoningModel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SonarReasoning => "sonar-reasoning",
            Self::SonarReasoningPro => "sonar-reasoning-pro",
        }
    }
}

#[derive(Clone, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "typescript", derive(ts_rs::TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "camelCase")]
pub struct IdeaGenerationRequest {
    pub combination: Combination,
    /// Provider API key, supplied per request and never stored
    pub api_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[cfg_attr(feature = "typescript", ts(optional))]
    pub model: Option<ReasoningModel>,
}

// Hand-written so the API key never reaches logs.
impl std::fmt::Debug for IdeaGenerationRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdeaGenerationRequest")
            .field("combination", &self.combination)
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .finish()
    }
}

impl IdeaGenerationRequest {
    pub fn new(combination: Combination, api_key: impl Into<String>) -> Self {
        Self {
            combination,
            api_key: api_key.into(),
            model: None,
        }
    }

    pub fn with_model(mut self, model: ReasoningModel) -> Self {
        self.model = Some(model);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "typescript", derive(ts_rs::TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct IdeaGenerationResponse {
    pub ideas: Vec<GeneratedIdea>,
    pub combination: Combination,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::combination::{Market, ProblemType, ProjectScope, TechStack, UserType};
    use serde_json::json;

    #[test]
    fn test_request_deserialization_with_model() {
        let body = json!({
            "combination": {
                "market": "SaaS",
                "userType": "Freelancers",
                "problemType": "Automation",
                "techStack": "Web App",
                "projectScope": "Weekend Project"
            },
            "apiKey": "sk-test",
            "model": "sonar-reasoning-pro"
        });

        let request: IdeaGenerationRequest = serde_json::from_value(body).unwrap();
        assert_eq!(request.api_key, "sk-test");
        assert_eq!(request.model, Some(ReasoningModel::SonarReasoningPro));
        assert_eq!(request.combination.market, Market::Saas);
    }

    #[test]
    fn test_request_model_is_optional() {
        let body = json!({
            "combination": {
                "market": "Gaming",
                "userType": "Students",
                "problemType": "Learning",
                "techStack": "Mobile App",
                "projectScope": "6 Month Journey"
            },
            "apiKey": "sk-test"
        });

        let request: IdeaGenerationRequest = serde_json::from_value(body).unwrap();
        assert!(request.model.is_none());
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let combination = Combination::new(
            Market::Saas,
            UserType::Freelancers,
            ProblemType::Automation,
            TechStack::WebApp,
            ProjectScope::Weekend,
        );
        let request = IdeaGenerationRequest::new(combination, "sk-secret");
        let debug = format!("{:?}", request);
        assert!(!debug.contains("sk-secret"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn test_idea_uses_camel_case_fields() {
        let idea = GeneratedIdea {
            name: "InvoiceBot".to_string(),
            description: "Automates invoices.".to_string(),
            core_features: vec!["a".into(), "b".into(), "c".into()],
            suggested_tech_stack: vec!["Next.js".into(), "Postgres".into(), "Stripe".into()],
            lead_generation_ideas: vec!["x".into(), "y".into(), "z".into()],
        };
        let value = serde_json::to_value(&idea).unwrap();
        assert!(value.get("coreFeatures").is_some());
        assert!(value.get("suggestedTechStack").is_some());
        assert!(value.get("leadGenerationIdeas").is_some());
    }
}
