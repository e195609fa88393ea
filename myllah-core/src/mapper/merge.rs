use chrono::{DateTime, Utc};

use crate::request::{normalize_description, RecipePatch};
use crate::types::{compute_total_time, Recipe};

/// Apply a validated partial update to a copy of `existing`.
///
/// Only fields present in `patch` change. `total_time_minutes` is recomputed
/// when either time input is present, `updated_at` is always set to `now`, and
/// `id`/`created_at` are never touched. An empty `description` or
/// `main_image_url` clears the field.
pub fn merge(existing: &Recipe, patch: RecipePatch, now: DateTime<Utc>) -> Recipe {
    let RecipePatch {
        title,
        description,
        difficulty,
        meal_type,
        tags,
        prep_time_minutes,
        cook_time_minutes,
        servings,
        ingredients,
        steps,
        main_image_url,
        additional_images,
    } = patch;

    let touches_time = prep_time_minutes.is_some() || cook_time_minutes.is_some();
    let mut merged = existing.clone();

    if let Some(title) = title {
        merged.title = title;
    }
    if let Some(description) = description {
        merged.description = normalize_description(description);
    }
    if let Some(difficulty) = difficulty {
        merged.difficulty = difficulty;
    }
    if let Some(meal_type) = meal_type {
        merged.meal_type = meal_type;
    }
    if let Some(tags) = tags {
        merged.tags = tags;
    }
    if prep_time_minutes.is_some() {
        merged.prep_time_minutes = prep_time_minutes;
    }
    if cook_time_minutes.is_some() {
        merged.cook_time_minutes = cook_time_minutes;
    }
    if servings.is_some() {
        merged.servings = servings;
    }
    if let Some(ingredients) = ingredients {
        merged.ingredients = ingredients;
    }
    if let Some(steps) = steps {
        merged.steps = steps;
    }
    if let Some(url) = main_image_url {
        merged.main_image_url = if url.is_empty() { None } else { Some(url) };
    }
    if let Some(additional_images) = additional_images {
        merged.additional_images = additional_images;
    }

    if touches_time {
        merged.total_time_minutes =
            compute_total_time(merged.prep_time_minutes, merged.cook_time_minutes);
    }
    merged.updated_at = now;
    merged
}
