pub mod health;
pub mod recipes;

use axum::{http::StatusCode, response::IntoResponse, response::Response, Json, Router};
use myllah_core::{
    Difficulty, ImageKind, Ingredient, MealType, Recipe, RecipeError, RecipeImage, StepInput,
    Unit,
};
use serde::Serialize;
use utoipa::{OpenApi, ToSchema};

use crate::AppState;

/// Shared error response used by all endpoints
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

pub fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
        .into_response()
}

pub fn recipe_not_found() -> Response {
    error_response(StatusCode::NOT_FOUND, "Recipe not found")
}

/// Map a service error onto an HTTP response. Store failures are logged here
/// and reported to the client without details.
pub fn recipe_error_response(err: RecipeError) -> Response {
    match err {
        RecipeError::InvalidInput(message) => error_response(StatusCode::BAD_REQUEST, message),
        RecipeError::NotFound(_) => recipe_not_found(),
        RecipeError::StoreUnavailable(_) | RecipeError::CorruptRow(_) => {
            tracing::error!(error = %err, "Recipe operation failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Recipe storage unavailable")
        }
    }
}

/// Every endpoint, mounted under `/api/v1`.
pub fn router(state: AppState) -> Router {
    let v1 = Router::new()
        .nest("/health", health::router())
        .nest("/recipes", recipes::router());

    Router::new().nest("/api/v1", v1).with_state(state)
}

/// Generate the complete OpenAPI spec by merging all module specs
pub fn openapi() -> utoipa::openapi::OpenApi {
    // Base spec with shared components
    #[derive(OpenApi)]
    #[openapi(
        info(title = "Myllah recipe API"),
        components(schemas(
            ErrorResponse,
            Recipe,
            Ingredient,
            Unit,
            Difficulty,
            MealType,
            ImageKind,
            RecipeImage,
            StepInput,
        ))
    )]
    struct BaseApi;

    let mut spec = BaseApi::openapi();

    // Merge in each module's spec
    let modules: Vec<utoipa::openapi::OpenApi> =
        vec![health::ApiDoc::openapi(), recipes::ApiDoc::openapi()];

    for module_spec in modules {
        // Merge paths
        spec.paths.paths.extend(module_spec.paths.paths);

        // Merge components (schemas)
        if let Some(module_components) = module_spec.components {
            if let Some(spec_components) = spec.components.as_mut() {
                spec_components.schemas.extend(module_components.schemas);
            }
        }
    }

    spec
}
