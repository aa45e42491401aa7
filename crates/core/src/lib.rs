//! Domain types shared by the BuildRoulette crates.
//!
//! The five roulette dimensions are closed enums whose wire form is the
//! human-readable label shown on the reels ("Food & Beverage", "API/MCP").

pub mod domain;
pub mod error;

pub use domain::combination::{Combination, Market, ProblemType, ProjectScope, TechStack, UserType};
pub use domain::idea::{
    GeneratedIdea, IdeaGenerationRequest, IdeaGenerationResponse, ReasoningModel,
    CORE_FEATURES_RANGE, IDEAS_PER_REQUEST, LEAD_GENERATION_RANGE, TECH_STACK_RANGE,
};
pub use error::{CoreError, CoreResult};
