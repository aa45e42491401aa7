use axum::extract::State;
use axum::Json;
use serde::Serialize;
use utoipa::ToSchema;

use crate::state::AppState;

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    status: String,
    version: String,
    /// "single_call" or "two_stage"
    topology: String,
    /// Whether outcomes are posted to a webhook
    notifications: bool,
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is up", body = HealthResponse)
    ),
    tag = "health"
)]
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let topology = match state.pipeline.config().topology {
        ideation::Topology::SingleCall => "single_call",
        ideation::Topology::TwoStage => "two_stage",
    };

    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        topology: topology.to_string(),
        notifications: state.notifier.is_enabled(),
    })
}
