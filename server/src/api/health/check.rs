use crate::api::{error_response, ErrorResponse};
use crate::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ReadyResponse {
    pub status: String,
    pub message: String,
    pub version: String,
}

#[utoipa::path(
    get,
    path = "/api/v1/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is up", body = HealthResponse)
    )
)]
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy".to_string(),
        message: "Myllah recipe API is running".to_string(),
    })
}

#[utoipa::path(
    get,
    path = "/api/v1/health/ready",
    tag = "health",
    responses(
        (status = 200, description = "Service can reach its row store", body = ReadyResponse),
        (status = 503, description = "Row store unreachable", body = ErrorResponse)
    )
)]
pub async fn ready(State(service): State<AppState>) -> impl IntoResponse {
    if let Err(e) = service.ping().await {
        tracing::error!(error = %e, backend = service.backend_name(), "Readiness check failed");
        return error_response(StatusCode::SERVICE_UNAVAILABLE, "Recipe storage unavailable");
    }

    (
        StatusCode::OK,
        Json(ReadyResponse {
            status: "ready".to_string(),
            message: format!("Connected to {} row store", service.backend_name()),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }),
    )
        .into_response()
}
