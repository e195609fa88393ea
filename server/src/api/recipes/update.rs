use crate::api::{recipe_error_response, recipe_not_found, ErrorResponse};
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use myllah_core::{Recipe, RecipeUpdate};

/// Partial update. Fields left out of the body keep their current value;
/// `total_time_minutes` is recomputed whenever a time changes.
#[utoipa::path(
    patch,
    path = "/api/v1/recipes/{id}",
    tag = "recipes",
    params(
        ("id" = String, Path, description = "Recipe ID")
    ),
    request_body = RecipeUpdate,
    responses(
        (status = 200, description = "Recipe updated successfully", body = Recipe),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Recipe not found", body = ErrorResponse),
        (status = 500, description = "Row store unavailable", body = ErrorResponse)
    )
)]
pub async fn update_recipe(
    State(service): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<RecipeUpdate>,
) -> impl IntoResponse {
    match service.update(&id, request).await {
        Ok(Some(recipe)) => (StatusCode::OK, Json(recipe)).into_response(),
        Ok(None) => recipe_not_found(),
        Err(e) => recipe_error_response(e),
    }
}
