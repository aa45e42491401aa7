use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use roulette_core::{IdeaGenerationRequest, IdeaGenerationResponse};
use serde_json::json;
use tracing::Instrument;
use uuid::Uuid;

use crate::error::{AppError, ErrorResponse};
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/api/generate-ideas",
    request_body = IdeaGenerationRequest,
    responses(
        (status = 200, description = "Three generated ideas", body = IdeaGenerationResponse),
        (status = 400, description = "Invalid request body", body = ErrorResponse),
        (status = 401, description = "Provider rejected the API key", body = ErrorResponse),
        (status = 429, description = "Rate limit exceeded", body = ErrorResponse),
        (status = 500, description = "Provider or unexpected error", body = ErrorResponse),
        (status = 503, description = "Response could not be parsed", body = ErrorResponse),
        (status = 504, description = "Generation timed out", body = ErrorResponse)
    ),
    tag = "ideas"
)]
pub async fn generate_ideas(
    State(state): State<AppState>,
    payload: Result<Json<IdeaGenerationRequest>, JsonRejection>,
) -> Result<Json<IdeaGenerationResponse>, AppError> {
    let Json(request) = payload?;

    if request.api_key.trim().is_empty() {
        return Err(AppError::bad_request(
            "Invalid request body",
            json!({ "field": "apiKey", "reason": "must not be empty" }),
        ));
    }

    let span = tracing::info_span!(
        "generate_ideas",
        request_id = %Uuid::new_v4(),
        combination = %request.combination,
    );

    async move {
        match state.pipeline.generate(&request).await {
            Ok(response) => {
                state.notifier.spawn_success(response.combination);
                Ok(Json(response))
            }
            Err(e) => {
                state
                    .notifier
                    .spawn_failure(e.to_string(), Some(request.combination));
                Err(AppError::from(e))
            }
        }
    }
    .instrument(span)
    .await
}
