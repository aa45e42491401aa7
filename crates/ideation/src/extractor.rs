//! Recovers the ideas JSON from model output and validates it strictly.

use std::ops::RangeInclusive;
use std::sync::OnceLock;

use regex::Regex;
use roulette_core::{
    GeneratedIdea, CORE_FEATURES_RANGE, IDEAS_PER_REQUEST, LEAD_GENERATION_RANGE,
    TECH_STACK_RANGE,
};
use serde::Deserialize;
use tracing::{debug, error};

use crate::error::{IdeationError, IdeationResult};

static CODE_FENCE: OnceLock<Regex> = OnceLock::new();

fn code_fence() -> &'static Regex {
    CODE_FENCE.get_or_init(|| {
        Regex::new(r"(?s)```(?:json|JSON)?[ \t]*\r?\n?(.*?)```").expect("valid code fence regex")
    })
}

#[derive(Debug, Deserialize)]
struct RawIdeaList {
    ideas: Vec<RawIdea>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawIdea {
    name: String,
    description: String,
    core_features: Vec<String>,
    suggested_tech_stack: Vec<String>,
    lead_generation_ideas: Vec<String>,
}

/// Narrow raw model output down to the JSON object it most likely contains.
///
/// The first fenced block holding a `{`..`}` span wins; fences without one
/// (e.g. a trailing code sample) are skipped in favour of the whole text.
pub fn isolate_json(raw: &str) -> Option<&str> {
    let text = raw.trim();

    code_fence()
        .captures_iter(text)
        .filter_map(|c| c.get(1))
        .find_map(|inner| brace_span(inner.as_str()))
        .or_else(|| brace_span(text))
}

fn brace_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if start < end {
        Some(&text[start..=end])
    } else {
        None
    }
}

/// Parse and validate exactly three ideas; any violation rejects the whole response.
pub fn extract_ideas(raw: &str) -> IdeationResult<Vec<GeneratedIdea>> {
    let json = isolate_json(raw)
        .ok_or_else(|| IdeationError::parse("no JSON object found in response", raw))?;

    let parsed: RawIdeaList = serde_json::from_str(json).map_err(|e| {
        error!(error = %e, response_len = raw.len(), "Failed to parse ideas JSON");
        IdeationError::parse(format!("invalid JSON: {}", e), raw)
    })?;

    let ideas = validate(parsed).map_err(|reason| IdeationError::parse(reason, raw))?;
    debug!(count = ideas.len(), "Extracted ideas from model response");
    Ok(ideas)
}

fn validate(list: RawIdeaList) -> Result<Vec<GeneratedIdea>, String> {
    if list.ideas.len() != IDEAS_PER_REQUEST {
        return Err(format!(
            "expected exactly {} ideas, got {}",
            IDEAS_PER_REQUEST,
            list.ideas.len()
        ));
    }

    list.ideas
        .into_iter()
        .enumerate()
        .map(|(index, idea)| validate_idea(index, idea))
        .collect()
}

fn validate_idea(index: usize, idea: RawIdea) -> Result<GeneratedIdea, String> {
    require_text(index, "name", &idea.name)?;
    require_text(index, "description", &idea.description)?;
    require_list(index, "coreFeatures", &idea.core_features, CORE_FEATURES_RANGE)?;
    require_list(
        index,
        "suggestedTechStack",
        &idea.suggested_tech_stack,
        TECH_STACK_RANGE,
    )?;
    require_list(
        index,
        "leadGenerationIdeas",
        &idea.lead_generation_ideas,
        LEAD_GENERATION_RANGE,
    )?;

    Ok(GeneratedIdea {
        name: idea.name,
        description: idea.description,
        core_features: idea.core_features,
        suggested_tech_stack: idea.suggested_tech_stack,
        lead_generation_ideas: idea.lead_generation_ideas,
    })
}

fn require_text(index: usize, field: &str, value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("idea {}: {} is empty", index, field));
    }
    Ok(())
}

fn require_list(
    index: usize,
    field: &str,
    values: &[String],
    bounds: RangeInclusive<usize>,
) -> Result<(), String> {
    if !bounds.contains(&values.len()) {
        return Err(format!(
            "idea {}: {} must have {}-{} entries, got {}",
            index,
            field,
            bounds.start(),
            bounds.end(),
            values.len()
        ));
    }
    if let Some(pos) = values.iter().position(|v| v.trim().is_empty()) {
        return Err(format!("idea {}: {}[{}] is empty", index, field, pos));
    }
    Ok(())
}
