pub mod error;
pub mod mapper;
pub mod request;
pub mod service;
pub mod store;
pub mod types;

pub use error::{MalformedStoredField, RecipeError, StoreError};
pub use mapper::{decode_row, from_row, merge, to_row, DecodedRecipe, RECIPE_PARTITION_KEY};
pub use request::{RecipeCreate, RecipePatch, RecipeSearchFilters, RecipeUpdate, StepInput};
pub use service::RecipeService;
pub use store::{Filter, MemoryRowStore, Property, Row, RowStore};
pub use types::{
    compute_total_time, Difficulty, ImageKind, Ingredient, MealType, Recipe, RecipeImage,
    RecipePage, Unit,
};
