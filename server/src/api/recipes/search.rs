use crate::api::{recipe_error_response, ErrorResponse};
use crate::AppState;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use myllah_core::Recipe;
use serde::Deserialize;
use utoipa::IntoParams;

#[derive(Debug, Deserialize, IntoParams)]
pub struct SearchParams {
    /// Text to look for in ingredient names (case-insensitive substring)
    pub ingredient: String,
}

#[utoipa::path(
    get,
    path = "/api/v1/recipes/search",
    tag = "recipes",
    params(SearchParams),
    responses(
        (status = 200, description = "Recipes using a matching ingredient", body = Vec<Recipe>),
        (status = 400, description = "Missing or blank search text", body = ErrorResponse),
        (status = 500, description = "Row store unavailable", body = ErrorResponse)
    )
)]
pub async fn search_recipes(
    State(service): State<AppState>,
    Query(params): Query<SearchParams>,
) -> impl IntoResponse {
    match service.search_by_ingredient(&params.ingredient).await {
        Ok(recipes) => (StatusCode::OK, Json(recipes)).into_response(),
        Err(e) => recipe_error_response(e),
    }
}
