use crate::api::{recipe_error_response, ErrorResponse};
use crate::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use myllah_core::{Recipe, RecipeCreate};

#[utoipa::path(
    post,
    path = "/api/v1/recipes",
    tag = "recipes",
    request_body = RecipeCreate,
    responses(
        (status = 201, description = "Recipe created successfully", body = Recipe),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 500, description = "Row store unavailable", body = ErrorResponse)
    )
)]
pub async fn create_recipe(
    State(service): State<AppState>,
    Json(request): Json<RecipeCreate>,
) -> impl IntoResponse {
    match service.create(request).await {
        Ok(recipe) => (StatusCode::CREATED, Json(recipe)).into_response(),
        Err(e) => recipe_error_response(e),
    }
}
