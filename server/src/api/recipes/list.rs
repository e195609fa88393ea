use crate::api::{recipe_error_response, ErrorResponse};
use crate::AppState;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use myllah_core::{Difficulty, MealType, Recipe, RecipeSearchFilters};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

pub const DEFAULT_LIMIT: usize = 10;
pub const MAX_LIMIT: usize = 100;

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ListRecipesParams {
    /// Number of matching recipes to skip (default: 0)
    pub skip: Option<usize>,
    /// Number of items to return (default: 10, max: 100)
    pub limit: Option<usize>,
    pub difficulty: Option<Difficulty>,
    /// Only recipes suitable for this meal type
    pub meal_type: Option<MealType>,
    /// Maximum preparation time in minutes
    pub max_prep_time: Option<u32>,
    /// Maximum total time in minutes
    pub max_total_time: Option<u32>,
    /// Comma-separated tags; a recipe matches if it has any of them
    pub tags: Option<String>,
    /// Text to look for in ingredient names
    pub ingredient: Option<String>,
}

impl ListRecipesParams {
    fn filters(&self) -> Option<RecipeSearchFilters> {
        let tags = self.tags.as_deref().map(|raw| {
            raw.split(',')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string)
                .collect::<Vec<_>>()
        });

        let filters = RecipeSearchFilters {
            difficulty: self.difficulty,
            meal_type: self.meal_type,
            max_prep_time: self.max_prep_time,
            max_total_time: self.max_total_time,
            tags: tags.filter(|t| !t.is_empty()),
            ingredient: self.ingredient.clone().filter(|i| !i.trim().is_empty()),
        };

        if filters == RecipeSearchFilters::default() {
            None
        } else {
            Some(filters)
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ListRecipesResponse {
    pub recipes: Vec<Recipe>,
    /// Number of recipes matching the filters
    pub total: usize,
    pub skip: usize,
    pub limit: usize,
}

#[utoipa::path(
    get,
    path = "/api/v1/recipes",
    tag = "recipes",
    params(ListRecipesParams),
    responses(
        (status = 200, description = "Page of matching recipes", body = ListRecipesResponse),
        (status = 400, description = "Invalid parameters", body = ErrorResponse),
        (status = 500, description = "Row store unavailable", body = ErrorResponse)
    )
)]
pub async fn list_recipes(
    State(service): State<AppState>,
    Query(params): Query<ListRecipesParams>,
) -> impl IntoResponse {
    // Validate and set defaults for pagination
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
    let skip = params.skip.unwrap_or(0);
    let filters = params.filters();

    match service.list(skip, limit, filters.as_ref()).await {
        Ok(page) => (
            StatusCode::OK,
            Json(ListRecipesResponse {
                recipes: page.recipes,
                total: page.total,
                skip,
                limit,
            }),
        )
            .into_response(),
        Err(e) => recipe_error_response(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_params_means_no_filters() {
        assert_eq!(ListRecipesParams::default().filters(), None);

        let blank = ListRecipesParams {
            tags: Some(" , ".to_string()),
            ingredient: Some("  ".to_string()),
            ..Default::default()
        };
        assert_eq!(blank.filters(), None);
    }

    #[test]
    fn test_tags_split_on_commas() {
        let params = ListRecipesParams {
            tags: Some("rapide, végétarien,,".to_string()),
            max_prep_time: Some(15),
            ..Default::default()
        };
        let filters = params.filters().unwrap();
        assert_eq!(
            filters.tags,
            Some(vec!["rapide".to_string(), "végétarien".to_string()])
        );
        assert_eq!(filters.max_prep_time, Some(15));
    }
}
