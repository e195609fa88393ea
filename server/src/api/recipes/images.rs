use crate::api::{recipe_error_response, recipe_not_found, ErrorResponse};
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use myllah_core::request::check_image_url;
use myllah_core::{ImageKind, RecipeImage};
use serde::Deserialize;
use utoipa::ToSchema;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct AddImageRequest {
    pub url: String,
    /// `main` replaces the main image, `additional` appends to the gallery
    #[serde(default = "default_image_kind")]
    pub image_type: ImageKind,
}

fn default_image_kind() -> ImageKind {
    ImageKind::Main
}

#[utoipa::path(
    post,
    path = "/api/v1/recipes/{id}/images",
    tag = "recipes",
    params(
        ("id" = String, Path, description = "Recipe ID")
    ),
    request_body = AddImageRequest,
    responses(
        (status = 201, description = "Image attached", body = RecipeImage),
        (status = 400, description = "Invalid image URL", body = ErrorResponse),
        (status = 404, description = "Recipe not found", body = ErrorResponse),
        (status = 500, description = "Row store unavailable", body = ErrorResponse)
    )
)]
pub async fn add_image(
    State(service): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<AddImageRequest>,
) -> Response {
    let kind = request.image_type;
    let url = match check_image_url(request.url) {
        Ok(url) => url,
        Err(e) => return recipe_error_response(e),
    };

    match service.add_image_url(&id, url.clone(), kind).await {
        Ok(Some(_)) => (
            StatusCode::CREATED,
            Json(RecipeImage {
                url,
                image_type: kind,
            }),
        )
            .into_response(),
        Ok(None) => recipe_not_found(),
        Err(e) => recipe_error_response(e),
    }
}

/// Main image first, then the gallery in order.
#[utoipa::path(
    get,
    path = "/api/v1/recipes/{id}/images",
    tag = "recipes",
    params(
        ("id" = String, Path, description = "Recipe ID")
    ),
    responses(
        (status = 200, description = "Images attached to the recipe", body = Vec<RecipeImage>),
        (status = 404, description = "Recipe not found", body = ErrorResponse),
        (status = 500, description = "Row store unavailable", body = ErrorResponse)
    )
)]
pub async fn list_images(
    State(service): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    match service.list_images(&id).await {
        Ok(Some(images)) => (StatusCode::OK, Json(images)).into_response(),
        Ok(None) => recipe_not_found(),
        Err(e) => recipe_error_response(e),
    }
}

#[utoipa::path(
    delete,
    path = "/api/v1/recipes/{id}/images",
    tag = "recipes",
    params(
        ("id" = String, Path, description = "Recipe ID")
    ),
    responses(
        (status = 204, description = "All images detached"),
        (status = 404, description = "Recipe not found", body = ErrorResponse),
        (status = 500, description = "Row store unavailable", body = ErrorResponse)
    )
)]
pub async fn clear_images(
    State(service): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    match service.clear_image_urls(&id).await {
        Ok(Some(_)) => StatusCode::NO_CONTENT.into_response(),
        Ok(None) => recipe_not_found(),
        Err(e) => recipe_error_response(e),
    }
}
