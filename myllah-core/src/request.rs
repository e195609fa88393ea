//! Caller-facing inputs: recipe creation, partial updates and list filters.
//!
//! Everything here is validated before the row store is touched. Validation
//! turns a request into a value the mapper can apply without failing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::RecipeError;
use crate::types::{compute_total_time, Difficulty, Ingredient, MealType, Recipe};

pub const TITLE_MIN_CHARS: usize = 3;
pub const TITLE_MAX_CHARS: usize = 150;
pub const DESCRIPTION_MAX_CHARS: usize = 1000;
pub const MAX_TAGS: usize = 10;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RecipeCreate {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub difficulty: Difficulty,
    pub meal_type: Vec<MealType>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub prep_time_minutes: Option<u32>,
    #[serde(default)]
    pub cook_time_minutes: Option<u32>,
    #[serde(default)]
    pub servings: Option<u32>,
    pub ingredients: Vec<Ingredient>,
    pub steps: Vec<String>,
    #[serde(default)]
    pub main_image_url: Option<String>,
    #[serde(default)]
    pub additional_images: Vec<String>,
}

impl RecipeCreate {
    /// Validates the request and builds the recipe it describes.
    pub fn into_recipe(self, id: String, now: DateTime<Utc>) -> Result<Recipe, RecipeError> {
        check_title(&self.title)?;
        if let Some(ref description) = self.description {
            check_description(description)?;
        }
        check_meal_types(&self.meal_type)?;
        if let Some(servings) = self.servings {
            check_servings(servings)?;
        }
        check_ingredients(&self.ingredients)?;
        let steps = plain_steps(self.steps)?;
        let main_image_url = match self.main_image_url {
            Some(url) => non_blank_url(url)?,
            None => None,
        };
        let additional_images = check_urls(self.additional_images)?;

        Ok(Recipe {
            id,
            title: self.title.trim().to_string(),
            description: self.description.and_then(normalize_description),
            difficulty: self.difficulty,
            meal_type: self.meal_type,
            tags: normalize_tags(self.tags.unwrap_or_default()),
            prep_time_minutes: self.prep_time_minutes,
            cook_time_minutes: self.cook_time_minutes,
            total_time_minutes: compute_total_time(self.prep_time_minutes, self.cook_time_minutes),
            servings: self.servings,
            ingredients: self.ingredients,
            steps,
            main_image_url,
            additional_images,
            created_at: now,
            updated_at: now,
        })
    }
}

/// A step as sent in an update: either plain text, whose position gives its
/// order, or an explicitly numbered step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum StepInput {
    Ordered { order: u32, description: String },
    Plain(String),
}

/// Partial update. Absent fields are left untouched.
///
/// `total_time_minutes`, `id` and `created_at` are deliberately not part of
/// this type. An empty `description` or `main_image_url` clears the field.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct RecipeUpdate {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub difficulty: Option<Difficulty>,
    #[serde(default)]
    pub meal_type: Option<Vec<MealType>>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub prep_time_minutes: Option<u32>,
    #[serde(default)]
    pub cook_time_minutes: Option<u32>,
    #[serde(default)]
    pub servings: Option<u32>,
    #[serde(default)]
    pub ingredients: Option<Vec<Ingredient>>,
    #[serde(default)]
    pub steps: Option<Vec<StepInput>>,
    #[serde(default)]
    pub main_image_url: Option<String>,
    #[serde(default)]
    pub additional_images: Option<Vec<String>>,
}

/// A validated update, ready to be merged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecipePatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub difficulty: Option<Difficulty>,
    pub meal_type: Option<Vec<MealType>>,
    pub tags: Option<Vec<String>>,
    pub prep_time_minutes: Option<u32>,
    pub cook_time_minutes: Option<u32>,
    pub servings: Option<u32>,
    pub ingredients: Option<Vec<Ingredient>>,
    pub steps: Option<Vec<String>>,
    pub main_image_url: Option<String>,
    pub additional_images: Option<Vec<String>>,
}

impl RecipeUpdate {
    pub fn validate(self) -> Result<RecipePatch, RecipeError> {
        if let Some(ref title) = self.title {
            check_title(title)?;
        }
        if let Some(ref description) = self.description {
            check_description(description)?;
        }
        if let Some(ref meal_type) = self.meal_type {
            check_meal_types(meal_type)?;
        }
        if let Some(servings) = self.servings {
            check_servings(servings)?;
        }
        if let Some(ref ingredients) = self.ingredients {
            check_ingredients(ingredients)?;
        }
        let steps = self.steps.map(ordered_steps).transpose()?;
        let main_image_url = self
            .main_image_url
            .map(|url| non_blank_url(url).map(Option::unwrap_or_default))
            .transpose()?;
        let additional_images = self.additional_images.map(check_urls).transpose()?;

        Ok(RecipePatch {
            title: self.title.map(|t| t.trim().to_string()),
            description: self.description,
            difficulty: self.difficulty,
            meal_type: self.meal_type,
            tags: self.tags.map(normalize_tags),
            prep_time_minutes: self.prep_time_minutes,
            cook_time_minutes: self.cook_time_minutes,
            servings: self.servings,
            ingredients: self.ingredients,
            steps,
            main_image_url,
            additional_images,
        })
    }
}

/// Listing filters. All of them are evaluated against the decoded recipe, so a
/// stored value that decoding repairs (a lowercase or missing difficulty, a
/// stale total) is filtered on its repaired value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RecipeSearchFilters {
    #[serde(default)]
    pub difficulty: Option<Difficulty>,
    #[serde(default)]
    pub meal_type: Option<MealType>,
    #[serde(default)]
    pub max_prep_time: Option<u32>,
    #[serde(default)]
    pub max_total_time: Option<u32>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub ingredient: Option<String>,
}

impl RecipeSearchFilters {
    /// Whether `recipe` passes every filter that is set.
    ///
    /// `max_prep_time` never matches a recipe without a prep time.
    pub fn matches(&self, recipe: &Recipe) -> bool {
        if let Some(difficulty) = self.difficulty {
            if recipe.difficulty != difficulty {
                return false;
            }
        }

        if let Some(max_prep) = self.max_prep_time {
            if recipe.prep_time_minutes.map_or(true, |prep| prep > max_prep) {
                return false;
            }
        }

        if let Some(max_total) = self.max_total_time {
            if recipe.total_time_minutes > max_total {
                return false;
            }
        }

        if let Some(meal_type) = self.meal_type {
            if !recipe.meal_type.contains(&meal_type) {
                return false;
            }
        }

        if let Some(ref tags) = self.tags {
            let wanted = normalize_tags(tags.iter());
            if !wanted.is_empty() && !wanted.iter().any(|t| recipe.tags.contains(t)) {
                return false;
            }
        }

        if let Some(ref ingredient) = self.ingredient {
            if !ingredient.trim().is_empty() && !has_ingredient_matching(recipe, ingredient) {
                return false;
            }
        }

        true
    }
}

/// Case-insensitive substring match against ingredient names.
pub fn has_ingredient_matching(recipe: &Recipe, text: &str) -> bool {
    let needle = text.trim().to_lowercase();
    recipe
        .ingredients
        .iter()
        .any(|i| i.name.to_lowercase().contains(&needle))
}

/// Lowercases and trims tags, drops blanks and duplicates (first occurrence
/// wins) and keeps at most [`MAX_TAGS`].
pub fn normalize_tags<I, S>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut normalized: Vec<String> = Vec::new();
    for tag in tags {
        let tag = tag.as_ref().trim().to_lowercase();
        if tag.is_empty() || normalized.contains(&tag) {
            continue;
        }
        normalized.push(tag);
        if normalized.len() == MAX_TAGS {
            break;
        }
    }
    normalized
}

/// Blank descriptions are stored as absent.
pub fn normalize_description(description: String) -> Option<String> {
    if description.trim().is_empty() {
        None
    } else {
        Some(description)
    }
}

/// Projects update steps onto plain text in their declared order.
///
/// Plain steps take their 1-based position as order. The resulting orders
/// must be exactly `1..=n`.
pub fn ordered_steps(steps: Vec<StepInput>) -> Result<Vec<String>, RecipeError> {
    let mut numbered: Vec<(u32, String)> = steps
        .into_iter()
        .enumerate()
        .map(|(index, step)| match step {
            StepInput::Ordered { order, description } => (order, description),
            StepInput::Plain(text) => (index as u32 + 1, text),
        })
        .collect();

    numbered.sort_by_key(|(order, _)| *order);
    for (expected, (order, _)) in (1u32..).zip(numbered.iter()) {
        if *order != expected {
            return Err(RecipeError::InvalidInput(
                "Steps must be numbered from 1 to n without gaps".to_string(),
            ));
        }
    }

    plain_steps(numbered.into_iter().map(|(_, text)| text).collect())
}

fn plain_steps(steps: Vec<String>) -> Result<Vec<String>, RecipeError> {
    if steps.is_empty() {
        return Err(RecipeError::InvalidInput(
            "A recipe needs at least one step".to_string(),
        ));
    }
    if steps.iter().any(|s| s.trim().is_empty()) {
        return Err(RecipeError::InvalidInput(
            "Steps cannot be empty".to_string(),
        ));
    }
    Ok(steps)
}

fn check_title(title: &str) -> Result<(), RecipeError> {
    let len = title.trim().chars().count();
    if !(TITLE_MIN_CHARS..=TITLE_MAX_CHARS).contains(&len) {
        return Err(RecipeError::InvalidInput(format!(
            "Title must be {}-{} characters",
            TITLE_MIN_CHARS, TITLE_MAX_CHARS
        )));
    }
    Ok(())
}

fn check_description(description: &str) -> Result<(), RecipeError> {
    if description.chars().count() > DESCRIPTION_MAX_CHARS {
        return Err(RecipeError::InvalidInput(format!(
            "Description cannot exceed {} characters",
            DESCRIPTION_MAX_CHARS
        )));
    }
    Ok(())
}

fn check_meal_types(meal_type: &[MealType]) -> Result<(), RecipeError> {
    if meal_type.is_empty() {
        return Err(RecipeError::InvalidInput(
            "A recipe needs at least one meal type".to_string(),
        ));
    }
    Ok(())
}

fn check_servings(servings: u32) -> Result<(), RecipeError> {
    if servings == 0 {
        return Err(RecipeError::InvalidInput(
            "Servings must be at least 1".to_string(),
        ));
    }
    Ok(())
}

fn check_ingredients(ingredients: &[Ingredient]) -> Result<(), RecipeError> {
    if ingredients.is_empty() {
        return Err(RecipeError::InvalidInput(
            "A recipe needs at least one ingredient".to_string(),
        ));
    }
    ingredients.iter().try_for_each(Ingredient::check)
}

fn non_blank_url(url: String) -> Result<Option<String>, RecipeError> {
    let url = url.trim();
    if url.is_empty() {
        Ok(None)
    } else if url.chars().any(char::is_whitespace) {
        Err(RecipeError::InvalidInput(format!("Invalid image URL: {:?}", url)))
    } else {
        Ok(Some(url.to_string()))
    }
}

/// Validates a single image URL for attachment; blank is an error here.
pub fn check_image_url(url: String) -> Result<String, RecipeError> {
    non_blank_url(url)?
        .ok_or_else(|| RecipeError::InvalidInput("Image URL cannot be empty".to_string()))
}

fn check_urls(urls: Vec<String>) -> Result<Vec<String>, RecipeError> {
    urls.into_iter().map(check_image_url).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Unit;

    fn create_request() -> RecipeCreate {
        RecipeCreate {
            title: "Tarte".to_string(),
            description: None,
            difficulty: Difficulty::default(),
            meal_type: vec![MealType::Dessert],
            tags: None,
            prep_time_minutes: Some(20),
            cook_time_minutes: Some(40),
            servings: None,
            ingredients: vec![Ingredient {
                name: "Pomme".to_string(),
                quantity: 3.0,
                unit: Unit::Piece,
            }],
            steps: vec!["Éplucher".to_string(), "Cuire".to_string()],
            main_image_url: None,
            additional_images: Vec::new(),
        }
    }

    #[test]
    fn test_normalize_tags_trims_lowercases_and_dedups() {
        let tags = normalize_tags(["  Dessert ", "DESSERT", "sucré"]);
        assert_eq!(tags, vec!["dessert", "sucré"]);
    }

    #[test]
    fn test_normalize_tags_drops_blank_and_caps() {
        let input: Vec<String> = (0..15).map(|i| format!("tag{}", i)).collect();
        let mut with_blank = vec!["   ".to_string()];
        with_blank.extend(input);
        let tags = normalize_tags(&with_blank);
        assert_eq!(tags.len(), MAX_TAGS);
        assert_eq!(tags[0], "tag0");
    }

    #[test]
    fn test_into_recipe_computes_total_time() {
        let now = Utc::now();
        let recipe = create_request().into_recipe("abc".to_string(), now).unwrap();
        assert_eq!(recipe.total_time_minutes, 60);
        assert_eq!(recipe.created_at, now);
        assert_eq!(recipe.updated_at, now);
        assert_eq!(recipe.difficulty, Difficulty::Medium);
    }

    #[test]
    fn test_into_recipe_normalizes_tags_and_description() {
        let mut request = create_request();
        request.tags = Some(vec![
            "  Dessert ".to_string(),
            "DESSERT".to_string(),
            "sucré".to_string(),
        ]);
        request.description = Some("   ".to_string());
        let recipe = request.into_recipe("abc".to_string(), Utc::now()).unwrap();
        assert_eq!(recipe.tags, vec!["dessert", "sucré"]);
        assert_eq!(recipe.description, None);
    }

    #[test]
    fn test_into_recipe_rejects_invalid_input() {
        let mut short_title = create_request();
        short_title.title = "ab".to_string();
        assert!(matches!(
            short_title.into_recipe("x".to_string(), Utc::now()),
            Err(RecipeError::InvalidInput(_))
        ));

        let mut no_ingredients = create_request();
        no_ingredients.ingredients.clear();
        assert!(no_ingredients.into_recipe("x".to_string(), Utc::now()).is_err());

        let mut no_steps = create_request();
        no_steps.steps.clear();
        assert!(no_steps.into_recipe("x".to_string(), Utc::now()).is_err());

        let mut no_meal_type = create_request();
        no_meal_type.meal_type.clear();
        assert!(no_meal_type.into_recipe("x".to_string(), Utc::now()).is_err());

        let mut zero_servings = create_request();
        zero_servings.servings = Some(0);
        assert!(zero_servings.into_recipe("x".to_string(), Utc::now()).is_err());

        let mut long_description = create_request();
        long_description.description = Some("a".repeat(DESCRIPTION_MAX_CHARS + 1));
        assert!(long_description
            .into_recipe("x".to_string(), Utc::now())
            .is_err());
    }

    #[test]
    fn test_ordered_steps_sorts_by_order() {
        let steps = ordered_steps(vec![
            StepInput::Ordered {
                order: 2,
                description: "Cuire".to_string(),
            },
            StepInput::Ordered {
                order: 1,
                description: "Éplucher".to_string(),
            },
        ])
        .unwrap();
        assert_eq!(steps, vec!["Éplucher", "Cuire"]);
    }

    #[test]
    fn test_ordered_steps_rejects_gaps_and_duplicates() {
        let gap = ordered_steps(vec![
            StepInput::Ordered {
                order: 1,
                description: "Éplucher".to_string(),
            },
            StepInput::Ordered {
                order: 3,
                description: "Cuire".to_string(),
            },
        ]);
        assert!(matches!(gap, Err(RecipeError::InvalidInput(_))));

        let duplicate = ordered_steps(vec![
            StepInput::Ordered {
                order: 1,
                description: "Éplucher".to_string(),
            },
            StepInput::Ordered {
                order: 1,
                description: "Cuire".to_string(),
            },
        ]);
        assert!(duplicate.is_err());

        assert!(ordered_steps(Vec::new()).is_err());
    }

    #[test]
    fn test_step_input_accepts_both_shapes() {
        let steps: Vec<StepInput> =
            serde_json::from_str(r#"["Éplucher", {"order": 2, "description": "Cuire"}]"#).unwrap();
        assert_eq!(ordered_steps(steps).unwrap(), vec!["Éplucher", "Cuire"]);
    }

    #[test]
    fn test_update_validate_normalizes_tags() {
        let update = RecipeUpdate {
            tags: Some(vec!["  Rapide".to_string(), "rapide".to_string()]),
            ..Default::default()
        };
        let patch = update.validate().unwrap();
        assert_eq!(patch.tags, Some(vec!["rapide".to_string()]));
        assert_eq!(patch.title, None);
    }

    #[test]
    fn test_update_validate_rejects_empty_collections() {
        let update = RecipeUpdate {
            meal_type: Some(Vec::new()),
            ..Default::default()
        };
        assert!(update.validate().is_err());

        let update = RecipeUpdate {
            ingredients: Some(Vec::new()),
            ..Default::default()
        };
        assert!(update.validate().is_err());
    }

    #[test]
    fn test_filters_match_collection_fields() {
        let mut recipe = create_request()
            .into_recipe("abc".to_string(), Utc::now())
            .unwrap();
        recipe.tags = vec!["sucré".to_string()];

        let by_meal = RecipeSearchFilters {
            meal_type: Some(MealType::Dessert),
            ..Default::default()
        };
        assert!(by_meal.matches(&recipe));

        let wrong_meal = RecipeSearchFilters {
            meal_type: Some(MealType::Drink),
            ..Default::default()
        };
        assert!(!wrong_meal.matches(&recipe));

        let by_tag = RecipeSearchFilters {
            tags: Some(vec!["SUCRÉ".to_string(), "salé".to_string()]),
            ..Default::default()
        };
        assert!(by_tag.matches(&recipe));

        let by_ingredient = RecipeSearchFilters {
            ingredient: Some("pom".to_string()),
            ..Default::default()
        };
        assert!(by_ingredient.matches(&recipe));

        let missing_ingredient = RecipeSearchFilters {
            ingredient: Some("poire".to_string()),
            ..Default::default()
        };
        assert!(!missing_ingredient.matches(&recipe));
    }

    #[test]
    fn test_filters_match_scalar_fields() {
        let recipe = create_request()
            .into_recipe("abc".to_string(), Utc::now())
            .unwrap();

        let medium = RecipeSearchFilters {
            difficulty: Some(Difficulty::Medium),
            ..Default::default()
        };
        assert!(medium.matches(&recipe));

        let hard = RecipeSearchFilters {
            difficulty: Some(Difficulty::Hard),
            ..Default::default()
        };
        assert!(!hard.matches(&recipe));

        let within = RecipeSearchFilters {
            max_prep_time: Some(20),
            max_total_time: Some(60),
            ..Default::default()
        };
        assert!(within.matches(&recipe));

        let too_long = RecipeSearchFilters {
            max_total_time: Some(59),
            ..Default::default()
        };
        assert!(!too_long.matches(&recipe));

        let mut no_prep = recipe.clone();
        no_prep.prep_time_minutes = None;
        let by_prep = RecipeSearchFilters {
            max_prep_time: Some(30),
            ..Default::default()
        };
        assert!(by_prep.matches(&recipe));
        assert!(!by_prep.matches(&no_prep));
    }
}
