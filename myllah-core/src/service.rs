//! Recipe CRUD on top of a [`RowStore`].
//!
//! Every store call runs inside a `store.call` span so callers can count and
//! time them per request.
//!
//! Updates are read-modify-write without any concurrency token: two
//! concurrent updates of the same recipe race and the last `put` wins.

use chrono::Utc;
use std::sync::Arc;
use tracing::Instrument;
use uuid::Uuid;

use crate::error::{RecipeError, StoreError};
use crate::mapper::{self, RECIPE_PARTITION_KEY};
use crate::request::{
    check_image_url, has_ingredient_matching, RecipeCreate, RecipeSearchFilters, RecipeUpdate,
};
use crate::store::{Row, RowStore};
use crate::types::{ImageKind, Recipe, RecipeImage, RecipePage};

#[derive(Debug, Clone)]
pub struct RecipeService {
    store: Arc<dyn RowStore>,
}

impl RecipeService {
    pub fn new(store: Arc<dyn RowStore>) -> Self {
        Self { store }
    }

    pub fn backend_name(&self) -> &'static str {
        self.store.backend_name()
    }

    fn span(&self, op: &'static str) -> tracing::Span {
        tracing::info_span!("store.call", op, backend = self.store.backend_name())
    }

    async fn fetch(&self, id: &str) -> Result<Option<Recipe>, RecipeError> {
        let result = self
            .store
            .get(RECIPE_PARTITION_KEY, id)
            .instrument(self.span("get"))
            .await;

        match result {
            Ok(row) => mapper::from_row(&row).map(Some),
            Err(StoreError::NotFound { .. }) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, recipe: &Recipe) -> Result<(), RecipeError> {
        self.store
            .put(mapper::to_row(recipe))
            .instrument(self.span("put"))
            .await?;
        Ok(())
    }

    /// Every recipe row. Filters are applied after decoding, since decoding
    /// can repair the very columns a store-side filter would compare.
    async fn all_rows(&self) -> Result<Vec<Row>, RecipeError> {
        let rows = self
            .store
            .query(RECIPE_PARTITION_KEY, None)
            .instrument(self.span("query"))
            .await?;
        Ok(rows)
    }

    /// Decode rows, skipping the ones that can't be decoded at all.
    fn decode_all(rows: Vec<Row>) -> impl Iterator<Item = Recipe> {
        rows.into_iter().filter_map(|row| match mapper::from_row(&row) {
            Ok(recipe) => Some(recipe),
            Err(e) => {
                tracing::warn!(error = %e, "Skipping undecodable recipe row");
                None
            }
        })
    }

    pub async fn create(&self, request: RecipeCreate) -> Result<Recipe, RecipeError> {
        let recipe = request.into_recipe(Uuid::new_v4().to_string(), Utc::now())?;
        self.save(&recipe).await?;
        tracing::info!(recipe_id = %recipe.id, "Created recipe");
        Ok(recipe)
    }

    pub async fn get(&self, id: &str) -> Result<Option<Recipe>, RecipeError> {
        self.fetch(id).await
    }

    /// Recipes matching `filters`, in row-key order, paginated after
    /// filtering. `total` counts every match.
    pub async fn list(
        &self,
        skip: usize,
        limit: usize,
        filters: Option<&RecipeSearchFilters>,
    ) -> Result<RecipePage, RecipeError> {
        let rows = self.all_rows().await?;

        let matching: Vec<Recipe> = Self::decode_all(rows)
            .filter(|recipe| filters.map_or(true, |f| f.matches(recipe)))
            .collect();

        let total = matching.len();
        let recipes = matching.into_iter().skip(skip).take(limit).collect();
        Ok(RecipePage { recipes, total })
    }

    pub async fn update(
        &self,
        id: &str,
        update: RecipeUpdate,
    ) -> Result<Option<Recipe>, RecipeError> {
        let patch = update.validate()?;

        let Some(existing) = self.fetch(id).await? else {
            return Ok(None);
        };

        let merged = mapper::merge(&existing, patch, Utc::now());
        self.save(&merged).await?;
        tracing::info!(recipe_id = %merged.id, "Updated recipe");
        Ok(Some(merged))
    }

    /// Returns `false` if there was nothing to delete.
    pub async fn delete(&self, id: &str) -> Result<bool, RecipeError> {
        let result = self
            .store
            .delete(RECIPE_PARTITION_KEY, id)
            .instrument(self.span("delete"))
            .await;

        match result {
            Ok(()) => {
                tracing::info!(recipe_id = %id, "Deleted recipe");
                Ok(true)
            }
            Err(StoreError::NotFound { .. }) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Recipes with at least one ingredient whose name contains `text`,
    /// ignoring case.
    pub async fn search_by_ingredient(&self, text: &str) -> Result<Vec<Recipe>, RecipeError> {
        if text.trim().is_empty() {
            return Err(RecipeError::InvalidInput(
                "Ingredient search text cannot be empty".to_string(),
            ));
        }

        let rows = self.all_rows().await?;
        Ok(Self::decode_all(rows)
            .filter(|recipe| has_ingredient_matching(recipe, text))
            .collect())
    }

    /// Attach an image URL: `Main` replaces the main image, `Additional`
    /// appends to the gallery.
    pub async fn add_image_url(
        &self,
        id: &str,
        url: String,
        kind: ImageKind,
    ) -> Result<Option<Recipe>, RecipeError> {
        let url = check_image_url(url)?;

        let Some(mut recipe) = self.fetch(id).await? else {
            return Ok(None);
        };

        match kind {
            ImageKind::Main => recipe.main_image_url = Some(url),
            ImageKind::Additional => recipe.additional_images.push(url),
        }
        recipe.updated_at = Utc::now();

        self.save(&recipe).await?;
        Ok(Some(recipe))
    }

    pub async fn clear_image_urls(&self, id: &str) -> Result<Option<Recipe>, RecipeError> {
        let Some(mut recipe) = self.fetch(id).await? else {
            return Ok(None);
        };

        recipe.main_image_url = None;
        recipe.additional_images.clear();
        recipe.updated_at = Utc::now();

        self.save(&recipe).await?;
        Ok(Some(recipe))
    }

    /// Main image first, then the gallery in order.
    pub async fn list_images(&self, id: &str) -> Result<Option<Vec<RecipeImage>>, RecipeError> {
        let Some(recipe) = self.fetch(id).await? else {
            return Ok(None);
        };

        let main = recipe.main_image_url.into_iter().map(|url| RecipeImage {
            url,
            image_type: ImageKind::Main,
        });
        let additional = recipe.additional_images.into_iter().map(|url| RecipeImage {
            url,
            image_type: ImageKind::Additional,
        });
        Ok(Some(main.chain(additional).collect()))
    }

    pub async fn ping(&self) -> Result<(), RecipeError> {
        self.store.ping().instrument(self.span("ping")).await?;
        Ok(())
    }
}
