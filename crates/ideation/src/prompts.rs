//! Prompts for product idea generation

use roulette_core::{Combination, ProjectScope};

pub const SYSTEM_PROMPT: &str = r#"You are a product ideation expert helping indie hackers and solo entrepreneurs.
You turn a market, a target user, a problem and a delivery format into concrete, buildable product ideas.
Every idea must be feasible for a solo developer or small team and have clear monetization potential."#;

pub const EXTRACTION_SYSTEM_PROMPT: &str = r#"You are a JSON generator for product idea lists.
You MUST output ONLY valid JSON. No markdown, no explanations, no code fences.
Your response must start with { and end with }."#;

const JSON_SHAPE: &str = r#"{
  "ideas": [
    {
      "name": "Product Name",
      "description": "Clear description in 1-2 sentences.",
      "coreFeatures": ["Feature 1", "Feature 2", "Feature 3"],
      "suggestedTechStack": ["Tech 1", "Tech 2", "Tech 3"],
      "leadGenerationIdeas": ["Strategy 1", "Strategy 2", "Strategy 3"]
    }
  ]
}"#;

const FIELD_RULES: &str = r#"- "ideas" has EXACTLY 3 entries
- "name": a catchy, memorable product name
- "description": 1-2 sentences
- "coreFeatures": 3 to 5 specific, concise features
- "suggestedTechStack": 3 to 5 technologies
- "leadGenerationIdeas": 3 to 4 marketing / lead generation strategies
- every value is a non-empty string"#;

fn scope_table(current: ProjectScope) -> String {
    ProjectScope::ALL
        .iter()
        .map(|scope| {
            let marker = if *scope == current { " <- SELECTED" } else { "" };
            format!("- {}: {}{}", scope, scope.complexity(), marker)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Main generation prompt. Deterministic for a given combination.
pub fn build_prompt(combination: &Combination) -> String {
    let scope_table = scope_table(combination.project_scope);

    format!(
        r#"Generate exactly 3 unique, actionable product ideas based on this combination:

Market: {market}
User Type: {user_type}
Problem Type: {problem_type}
Tech Stack: {tech_stack}
Project Scope: {project_scope}

## Project scope guide
Match the number and complexity of features to the selected scope:
{scope_table}

## For each idea provide
1. A catchy, memorable name
2. A clear 1-2 sentence description
3. 3-5 core features sized for the "{project_scope}" scope
4. 3-5 suggested technologies (include {tech_stack}-appropriate choices)
5. 3-4 lead generation / marketing strategies

Make sure each idea:
- Is feasible for a solo developer or small team within the project scope
- Directly addresses {problem_type} for {user_type} in the {market} market
- Is delivered as a {tech_stack}
- Has clear monetization potential
- Is clearly differentiated from the other two ideas

## JSON Output
Format your response as valid JSON with this exact structure:
{shape}

RULES:
{rules}

Respond only with valid JSON, no additional text."#,
        market = combination.market,
        user_type = combination.user_type,
        problem_type = combination.problem_type,
        tech_stack = combination.tech_stack,
        project_scope = combination.project_scope,
        scope_table = scope_table,
        shape = JSON_SHAPE,
        rules = FIELD_RULES,
    )
}

/// Prompt used when a web search tool is attached to the call.
pub fn build_research_prompt(combination: &Combination) -> String {
    format!(
        r#"Before answering, use web search to research current trends, existing competitors and unmet needs for {user_type} in the {market} market around {problem_type}. Prefer ideas that fill a real gap you found.

{base}"#,
        user_type = combination.user_type,
        market = combination.market,
        problem_type = combination.problem_type,
        base = build_prompt(combination),
    )
}

/// Second call of the two-stage topology: reformat free-form research into JSON.
pub fn build_extraction_prompt(combination: &Combination, analysis: &str) -> String {
    format!(
        r#"Below is a product research analysis for this combination:
Market: {market} | User Type: {user_type} | Problem Type: {problem_type} | Tech Stack: {tech_stack} | Project Scope: {project_scope}

## Analysis
{analysis}

## Task
Extract exactly 3 product ideas from the analysis and output them as JSON. If the analysis has more than 3, keep the 3 strongest. If a list is too long, keep the most important entries; if too short, complete it from the analysis.

## JSON Output (NO markdown, NO code blocks, ONLY valid JSON):
{shape}

RULES:
{rules}"#,
        market = combination.market,
        user_type = combination.user_type,
        problem_type = combination.problem_type,
        tech_stack = combination.tech_stack,
        project_scope = combination.project_scope,
        analysis = analysis.trim(),
        shape = JSON_SHAPE,
        rules = FIELD_RULES,
    )
}

/// Simplified prompt for the fallback attempt: favours format compliance over creativity.
pub fn build_fallback_prompt(combination: &Combination) -> String {
    format!(
        r#"Create 3 product ideas for {user_type} in {market}, solving {problem_type}, built as a {tech_stack} within a "{project_scope}" scope.

Fill in this template. Output ONLY the JSON object, nothing else:
{{"ideas":[{{"name":"...","description":"...","coreFeatures":["...","...","..."],"suggestedTechStack":["...","...","..."],"leadGenerationIdeas":["...","...","..."]}},{{"name":"...","description":"...","coreFeatures":["...","...","..."],"suggestedTechStack":["...","...","..."],"leadGenerationIdeas":["...","...","..."]}},{{"name":"...","description":"...","coreFeatures":["...","...","..."],"suggestedTechStack":["...","...","..."],"leadGenerationIdeas":["...","...","..."]}}]}}

RULES:
{rules}
- Start with {{ and end with }}"#,
        user_type = combination.user_type,
        market = combination.market,
        problem_type = combination.problem_type,
        tech_stack = combination.tech_stack,
        project_scope = combination.project_scope,
        rules = FIELD_RULES,
    )
}
