use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::RecipeError;

/// Measurement units accepted for ingredients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum Unit {
    #[serde(rename = "g")]
    Gram,
    #[serde(rename = "kg")]
    Kilogram,
    #[serde(rename = "l")]
    Liter,
    #[serde(rename = "ml")]
    Milliliter,
    #[serde(rename = "c. à café")]
    Teaspoon,
    #[serde(rename = "c. à soupe")]
    Tablespoon,
    #[serde(rename = "tasse")]
    Cup,
    #[serde(rename = "pièce")]
    Piece,
    #[serde(rename = "pincée")]
    Pinch,
}

/// Recipe difficulty. Labels are the ones persisted by earlier versions of the
/// service and must not change.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema,
)]
pub enum Difficulty {
    #[serde(rename = "Facile")]
    Easy,
    #[default]
    #[serde(rename = "Moyen")]
    Medium,
    #[serde(rename = "Difficile")]
    Hard,
}

impl Difficulty {
    pub const ALL: &'static [Difficulty] =
        &[Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Facile",
            Difficulty::Medium => "Moyen",
            Difficulty::Hard => "Difficile",
        }
    }

    /// Exact label match.
    pub fn from_label(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|d| d.as_str() == s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum MealType {
    #[serde(rename = "Entrée")]
    Starter,
    #[serde(rename = "Plat principal")]
    MainCourse,
    #[serde(rename = "Dessert")]
    Dessert,
    #[serde(rename = "Accompagnement")]
    SideDish,
    #[serde(rename = "En-cas")]
    Snack,
    #[serde(rename = "Boisson")]
    Drink,
}

impl MealType {
    pub const ALL: &'static [MealType] = &[
        MealType::Starter,
        MealType::MainCourse,
        MealType::Dessert,
        MealType::SideDish,
        MealType::Snack,
        MealType::Drink,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MealType::Starter => "Entrée",
            MealType::MainCourse => "Plat principal",
            MealType::Dessert => "Dessert",
            MealType::SideDish => "Accompagnement",
            MealType::Snack => "En-cas",
            MealType::Drink => "Boisson",
        }
    }

    /// Exact label match.
    pub fn from_label(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|m| m.as_str() == s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Ingredient {
    pub name: String,
    pub quantity: f64,
    pub unit: Unit,
}

impl Ingredient {
    pub const NAME_MIN_CHARS: usize = 2;
    pub const NAME_MAX_CHARS: usize = 100;

    /// Checks the per-ingredient invariants. Used both for caller input and
    /// for ingredients decoded from storage.
    pub fn check(&self) -> Result<(), RecipeError> {
        let name_len = self.name.trim().chars().count();
        if !(Self::NAME_MIN_CHARS..=Self::NAME_MAX_CHARS).contains(&name_len) {
            return Err(RecipeError::InvalidInput(format!(
                "Ingredient name must be {}-{} characters, got {:?}",
                Self::NAME_MIN_CHARS,
                Self::NAME_MAX_CHARS,
                self.name
            )));
        }
        if !self.quantity.is_finite() || self.quantity <= 0.0 {
            return Err(RecipeError::InvalidInput(format!(
                "Ingredient quantity must be greater than 0 for {:?}",
                self.name
            )));
        }
        Ok(())
    }
}

/// A recipe as seen by callers of the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Recipe {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub difficulty: Difficulty,
    pub meal_type: Vec<MealType>,
    pub tags: Vec<String>,
    pub prep_time_minutes: Option<u32>,
    pub cook_time_minutes: Option<u32>,
    /// Always `prep_time_minutes + cook_time_minutes`, missing values counting as 0.
    pub total_time_minutes: u32,
    pub servings: Option<u32>,
    pub ingredients: Vec<Ingredient>,
    pub steps: Vec<String>,
    pub main_image_url: Option<String>,
    pub additional_images: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The only way `total_time_minutes` is ever produced.
pub fn compute_total_time(prep_time_minutes: Option<u32>, cook_time_minutes: Option<u32>) -> u32 {
    prep_time_minutes
        .unwrap_or(0)
        .saturating_add(cook_time_minutes.unwrap_or(0))
}

/// Where an image URL is attached on a recipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ImageKind {
    Main,
    Additional,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RecipeImage {
    pub url: String,
    pub image_type: ImageKind,
}

/// One page of a recipe listing.
#[derive(Debug, Clone, PartialEq)]
pub struct RecipePage {
    pub recipes: Vec<Recipe>,
    /// Number of recipes matching the filters, before pagination.
    pub total: usize,
}
