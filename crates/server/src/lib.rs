pub mod config;
pub mod error;
pub mod routes;
pub mod state;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use state::AppState;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "BuildRoulette API",
        version = "0.1.0",
        description = "Spin a combination of market, user, problem, stack and scope; get three product ideas"
    ),
    paths(
        routes::health_check,
        routes::generate_ideas,
        routes::list_dimensions,
        routes::random_combination,
    ),
    components(schemas(
        routes::HealthResponse,
        routes::DimensionsResponse,
        routes::ScopeOption,
        error::ErrorResponse,
        roulette_core::Combination,
        roulette_core::Market,
        roulette_core::UserType,
        roulette_core::ProblemType,
        roulette_core::TechStack,
        roulette_core::ProjectScope,
        roulette_core::ReasoningModel,
        roulette_core::GeneratedIdea,
        roulette_core::IdeaGenerationRequest,
        roulette_core::IdeaGenerationResponse,
    )),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "ideas", description = "Idea generation and roulette dimensions"),
    )
)]
pub struct ApiDoc;

pub fn create_router(state: AppState) -> Router {
    let cors = state.cors;

    let router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api/openapi.json", ApiDoc::openapi()))
        .route("/health", get(routes::health_check))
        .route("/api/generate-ideas", post(routes::generate_ideas))
        .route("/api/dimensions", get(routes::list_dimensions))
        .route("/api/combinations/random", get(routes::random_combination))
        .layer(TraceLayer::new_for_http());

    let router = if cors {
        router.layer(CorsLayer::permissive())
    } else {
        router
    };

    router.with_state(state)
}
