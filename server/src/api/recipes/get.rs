use crate::api::{recipe_error_response, recipe_not_found, ErrorResponse};
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use myllah_core::Recipe;

#[utoipa::path(
    get,
    path = "/api/v1/recipes/{id}",
    tag = "recipes",
    params(
        ("id" = String, Path, description = "Recipe ID")
    ),
    responses(
        (status = 200, description = "Recipe details", body = Recipe),
        (status = 404, description = "Recipe not found", body = ErrorResponse),
        (status = 500, description = "Row store unavailable", body = ErrorResponse)
    )
)]
pub async fn get_recipe(
    State(service): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    match service.get(&id).await {
        Ok(Some(recipe)) => (StatusCode::OK, Json(recipe)).into_response(),
        Ok(None) => recipe_not_found(),
        Err(e) => recipe_error_response(e),
    }
}
