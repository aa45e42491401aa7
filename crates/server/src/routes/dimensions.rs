use axum::Json;
use roulette_core::{Combination, Market, ProblemType, ProjectScope, TechStack, UserType};
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
#[cfg_attr(feature = "typescript", derive(ts_rs::TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "camelCase")]
pub struct ScopeOption {
    pub scope: ProjectScope,
    pub complexity: String,
}

/// Every value each roulette reel can land on
#[derive(Debug, Serialize, ToSchema)]
#[cfg_attr(feature = "typescript", derive(ts_rs::TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "camelCase")]
pub struct DimensionsResponse {
    pub markets: Vec<Market>,
    pub user_types: Vec<UserType>,
    pub problem_types: Vec<ProblemType>,
    pub tech_stacks: Vec<TechStack>,
    /// Ordered from smallest to largest
    pub project_scopes: Vec<ScopeOption>,
}

#[utoipa::path(
    get,
    path = "/api/dimensions",
    responses(
        (status = 200, description = "Roulette dimensions", body = DimensionsResponse)
    ),
    tag = "ideas"
)]
pub async fn list_dimensions() -> Json<DimensionsResponse> {
    Json(DimensionsResponse {
        markets: Market::ALL.to_vec(),
        user_types: UserType::ALL.to_vec(),
        problem_types: ProblemType::ALL.to_vec(),
        tech_stacks: TechStack::ALL.to_vec(),
        project_scopes: ProjectScope::ALL
            .iter()
            .map(|scope| ScopeOption {
                scope: *scope,
                complexity: scope.complexity().to_string(),
            })
            .collect(),
    })
}

#[utoipa::path(
    get,
    path = "/api/combinations/random",
    responses(
        (status = 200, description = "A random spin", body = Combination)
    ),
    tag = "ideas"
)]
pub async fn random_combination() -> Json<Combination> {
    Json(Combination::random())
}
