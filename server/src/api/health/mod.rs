pub mod check;

use crate::AppState;
use axum::routing::get;
use axum::Router;
use utoipa::OpenApi;

/// Returns the router for health endpoints (mounted at /api/v1/health)
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(check::health))
        .route("/ready", get(check::ready))
}

#[derive(OpenApi)]
#[openapi(
    paths(check::health, check::ready),
    components(schemas(check::HealthResponse, check::ReadyResponse))
)]
pub struct ApiDoc;
