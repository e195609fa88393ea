pub mod create;
pub mod delete;
pub mod get;
pub mod images;
pub mod list;
pub mod search;
pub mod update;

use crate::AppState;
use axum::routing::get;
use axum::Router;
use utoipa::OpenApi;

/// Returns the router for /api/v1/recipes endpoints (mounted at /api/v1/recipes)
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list::list_recipes).post(create::create_recipe))
        .route("/search", get(search::search_recipes))
        .route(
            "/{id}",
            get(get::get_recipe)
                .patch(update::update_recipe)
                .delete(delete::delete_recipe),
        )
        .route(
            "/{id}/images",
            get(images::list_images)
                .post(images::add_image)
                .delete(images::clear_images),
        )
}

#[derive(OpenApi)]
#[openapi(
    paths(
        create::create_recipe,
        list::list_recipes,
        search::search_recipes,
        get::get_recipe,
        update::update_recipe,
        delete::delete_recipe,
        images::add_image,
        images::list_images,
        images::clear_images,
    ),
    components(schemas(
        myllah_core::RecipeCreate,
        myllah_core::RecipeUpdate,
        list::ListRecipesResponse,
        images::AddImageRequest,
    ))
)]
pub struct ApiDoc;
