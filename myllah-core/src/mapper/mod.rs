//! Translation between [`Recipe`] and flat row-store rows.
//!
//! One row per recipe, all in the [`RECIPE_PARTITION_KEY`] partition, keyed
//! by recipe id. Scalar fields are stored as scalar columns. Collections are
//! stored as JSON text in [`ENCODED_COLUMNS`], since the store only holds flat
//! scalars.
//!
//! Writing is lossless except for one legacy convention: an absent
//! `cook_time_minutes` is written as `0` and `0` is read back as absent, so a
//! cook time of exactly 0 minutes does not survive a round trip.
//!
//! Reading never fails because of a bad column. Each column has a fallback
//! (see [`codec`]); the problems encountered are reported in
//! [`DecodedRecipe::issues`]. Only a missing row key is fatal.

pub mod codec;
mod merge;

pub use merge::merge;

use chrono::{DateTime, Utc};

use crate::error::{MalformedStoredField, RecipeError};
use crate::store::{Property, Row};
use crate::types::{compute_total_time, Recipe};
use codec::{
    decode_cook_time, decode_count, decode_difficulty, decode_ingredients, decode_meal_types,
    decode_optional_text, decode_steps, decode_strings, decode_timestamp, encode_json,
    FALLBACK_TITLE,
};

/// Every recipe row lives in this partition.
pub const RECIPE_PARTITION_KEY: &str = "recipe";

pub mod columns {
    pub const TITLE: &str = "title";
    pub const DESCRIPTION: &str = "description";
    pub const DIFFICULTY: &str = "difficulty";
    pub const MEAL_TYPE: &str = "meal_type";
    pub const TAGS: &str = "tags";
    pub const PREP_TIME_MINUTES: &str = "prep_time_minutes";
    pub const COOK_TIME_MINUTES: &str = "cook_time_minutes";
    pub const TOTAL_TIME_MINUTES: &str = "total_time_minutes";
    pub const SERVINGS: &str = "servings";
    pub const INGREDIENTS: &str = "ingredients";
    pub const STEPS: &str = "steps";
    pub const MAIN_IMAGE_URL: &str = "main_image_url";
    pub const ADDITIONAL_IMAGES: &str = "additional_images";
    pub const CREATED_AT: &str = "created_at";
    pub const UPDATED_AT: &str = "updated_at";
}

/// Columns holding JSON-encoded collections. Store-side filters must never
/// target these.
pub const ENCODED_COLUMNS: &[&str] = &[
    columns::MEAL_TYPE,
    columns::TAGS,
    columns::INGREDIENTS,
    columns::STEPS,
    columns::ADDITIONAL_IMAGES,
];

fn count(n: u32) -> Property {
    Property::Int(i64::from(n))
}

/// Serialize a recipe into its row.
pub fn to_row(recipe: &Recipe) -> Row {
    let mut row = Row::new(RECIPE_PARTITION_KEY, recipe.id.clone())
        .with(columns::TITLE, Property::Text(recipe.title.clone()))
        .with(
            columns::DIFFICULTY,
            Property::Text(recipe.difficulty.as_str().to_string()),
        )
        .with(
            columns::COOK_TIME_MINUTES,
            count(recipe.cook_time_minutes.unwrap_or(0)),
        )
        .with(columns::TOTAL_TIME_MINUTES, count(recipe.total_time_minutes))
        .with(columns::MEAL_TYPE, Property::Text(encode_json(&recipe.meal_type)))
        .with(columns::TAGS, Property::Text(encode_json(&recipe.tags)))
        .with(
            columns::INGREDIENTS,
            Property::Text(encode_json(&recipe.ingredients)),
        )
        .with(columns::STEPS, Property::Text(encode_json(&recipe.steps)))
        .with(
            columns::ADDITIONAL_IMAGES,
            Property::Text(encode_json(&recipe.additional_images)),
        )
        .with(columns::CREATED_AT, Property::DateTime(recipe.created_at))
        .with(columns::UPDATED_AT, Property::DateTime(recipe.updated_at));

    if let Some(ref description) = recipe.description {
        row.set(columns::DESCRIPTION, Property::Text(description.clone()));
    }
    if let Some(prep) = recipe.prep_time_minutes {
        row.set(columns::PREP_TIME_MINUTES, count(prep));
    }
    if let Some(servings) = recipe.servings {
        row.set(columns::SERVINGS, count(servings));
    }
    if let Some(ref url) = recipe.main_image_url {
        row.set(columns::MAIN_IMAGE_URL, Property::Text(url.clone()));
    }

    row
}

/// A recipe read back from storage, with whatever had to be patched up.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedRecipe {
    pub recipe: Recipe,
    pub issues: Vec<MalformedStoredField>,
}

/// Deserialize a row, collecting per-column problems instead of failing.
pub fn decode_row(row: &Row) -> Result<DecodedRecipe, RecipeError> {
    if row.row_key.trim().is_empty() {
        return Err(RecipeError::CorruptRow(format!(
            "row in partition {:?} has no row key",
            row.partition_key
        )));
    }

    let mut issues = Vec::new();

    let title = match row.get(columns::TITLE) {
        Some(Property::Text(title)) if !title.trim().is_empty() => title.clone(),
        _ => {
            issues.push(MalformedStoredField::new(
                columns::TITLE,
                "missing or blank, using placeholder",
            ));
            FALLBACK_TITLE.to_string()
        }
    };

    let description = decode_optional_text(columns::DESCRIPTION, row.get(columns::DESCRIPTION))
        .collect_into(&mut issues);
    let difficulty = decode_difficulty(columns::DIFFICULTY, row.get(columns::DIFFICULTY))
        .collect_into(&mut issues);
    let meal_type = decode_meal_types(columns::MEAL_TYPE, row.get(columns::MEAL_TYPE))
        .collect_into(&mut issues);
    let tags = decode_strings(columns::TAGS, row.get(columns::TAGS)).collect_into(&mut issues);
    let prep_time_minutes = decode_count(
        columns::PREP_TIME_MINUTES,
        row.get(columns::PREP_TIME_MINUTES),
    )
    .collect_into(&mut issues);
    let cook_time_minutes = decode_cook_time(
        columns::COOK_TIME_MINUTES,
        row.get(columns::COOK_TIME_MINUTES),
    )
    .collect_into(&mut issues);
    let stored_total = decode_count(
        columns::TOTAL_TIME_MINUTES,
        row.get(columns::TOTAL_TIME_MINUTES),
    )
    .collect_into(&mut issues);
    let mut servings =
        decode_count(columns::SERVINGS, row.get(columns::SERVINGS)).collect_into(&mut issues);
    let ingredients = decode_ingredients(columns::INGREDIENTS, row.get(columns::INGREDIENTS))
        .collect_into(&mut issues);
    let steps = decode_steps(columns::STEPS, row.get(columns::STEPS)).collect_into(&mut issues);
    let main_image_url =
        decode_optional_text(columns::MAIN_IMAGE_URL, row.get(columns::MAIN_IMAGE_URL))
            .collect_into(&mut issues);
    let additional_images =
        decode_strings(columns::ADDITIONAL_IMAGES, row.get(columns::ADDITIONAL_IMAGES))
            .collect_into(&mut issues);
    let created_at = decode_timestamp(columns::CREATED_AT, row.get(columns::CREATED_AT))
        .collect_into(&mut issues);
    let updated_at = decode_timestamp(columns::UPDATED_AT, row.get(columns::UPDATED_AT))
        .collect_into(&mut issues);

    if servings == Some(0) {
        issues.push(MalformedStoredField::new(columns::SERVINGS, "zero servings"));
        servings = None;
    }

    let total_time_minutes = compute_total_time(prep_time_minutes, cook_time_minutes);
    if stored_total != Some(total_time_minutes) {
        issues.push(MalformedStoredField::new(
            columns::TOTAL_TIME_MINUTES,
            format!(
                "stored {:?} does not match inputs, recomputed {}",
                stored_total, total_time_minutes
            ),
        ));
    }

    let created_at = created_at.unwrap_or(DateTime::<Utc>::UNIX_EPOCH);
    let updated_at = updated_at.unwrap_or(created_at);

    Ok(DecodedRecipe {
        recipe: Recipe {
            id: row.row_key.clone(),
            title,
            description,
            difficulty,
            meal_type,
            tags,
            prep_time_minutes,
            cook_time_minutes,
            total_time_minutes,
            servings,
            ingredients,
            steps,
            main_image_url,
            additional_images,
            created_at,
            updated_at,
        },
        issues,
    })
}

/// Deserialize a row, logging any column that needed a fallback.
pub fn from_row(row: &Row) -> Result<Recipe, RecipeError> {
    let decoded = decode_row(row)?;
    for issue in &decoded.issues {
        tracing::warn!(
            recipe_id = %decoded.recipe.id,
            column = issue.column,
            "{}",
            issue.reason
        );
    }
    Ok(decoded.recipe)
}
