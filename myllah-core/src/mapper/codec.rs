//! Per-column decoders.
//!
//! Every decoder returns a [`Decoded`] value: the column's value, or its
//! documented fallback plus the problems that forced it. Nothing in here
//! fails.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::MalformedStoredField;
use crate::store::Property;
use crate::types::{Difficulty, Ingredient, MealType};

/// Substituted when a stored recipe has no usable step.
pub const PLACEHOLDER_STEP: &str = "Aucune étape disponible";

/// Substituted when a stored recipe has no usable meal type.
pub const FALLBACK_MEAL_TYPE: MealType = MealType::MainCourse;

/// Substituted when a stored recipe has no usable title.
pub const FALLBACK_TITLE: &str = "Recette sans titre";

#[derive(Debug, Clone, PartialEq)]
pub struct Decoded<T> {
    pub value: T,
    pub issues: Vec<MalformedStoredField>,
}

impl<T> Decoded<T> {
    pub fn clean(value: T) -> Self {
        Self {
            value,
            issues: Vec::new(),
        }
    }

    pub fn fallback(value: T, issue: MalformedStoredField) -> Self {
        Self {
            value,
            issues: vec![issue],
        }
    }

    /// Move the issues into `sink` and return the value.
    pub fn collect_into(self, sink: &mut Vec<MalformedStoredField>) -> T {
        sink.extend(self.issues);
        self.value
    }
}

/// The two shapes steps have been stored in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StoredStep {
    Plain(String),
    /// Older rows stored the update payload as-is. `order` is ignored on read:
    /// array position is the order.
    Ordered {
        #[serde(default)]
        order: Option<Value>,
        description: String,
    },
}

impl StoredStep {
    pub fn into_text(self) -> String {
        match self {
            StoredStep::Plain(text) => text,
            StoredStep::Ordered { description, .. } => description,
        }
    }
}

/// Python-style capitalization: first character upper case, the rest lower.
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// Encode a collection column. Only used on plain data types, which always
/// serialize.
pub fn encode_json<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "[]".to_string())
}

/// Decode a JSON-array column into its raw elements.
///
/// A missing or blank column is an empty array. Anything that isn't a JSON
/// array falls back to an empty array.
pub fn decode_array(column: &'static str, raw: Option<&Property>) -> Decoded<Vec<Value>> {
    let text = match raw {
        None => return Decoded::clean(Vec::new()),
        Some(Property::Text(text)) => text,
        Some(other) => {
            return Decoded::fallback(
                Vec::new(),
                MalformedStoredField::new(
                    column,
                    format!("expected JSON text, found {}", other.type_name()),
                ),
            )
        }
    };

    if text.trim().is_empty() {
        return Decoded::clean(Vec::new());
    }

    match serde_json::from_str::<Value>(text) {
        Ok(Value::Array(items)) => Decoded::clean(items),
        Ok(_) => Decoded::fallback(
            Vec::new(),
            MalformedStoredField::new(column, "expected a JSON array"),
        ),
        Err(e) => Decoded::fallback(
            Vec::new(),
            MalformedStoredField::new(column, format!("invalid JSON: {}", e)),
        ),
    }
}

/// Decode each element of an array column independently, dropping the ones
/// that don't fit.
fn decode_elements<T, F>(
    column: &'static str,
    raw: Option<&Property>,
    mut parse: F,
) -> Decoded<Vec<T>>
where
    F: FnMut(Value) -> Result<T, String>,
{
    let mut issues = Vec::new();
    let items = decode_array(column, raw).collect_into(&mut issues);

    let mut values = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        match parse(item) {
            Ok(value) => values.push(value),
            Err(reason) => issues.push(MalformedStoredField::new(
                column,
                format!("element {} dropped: {}", index, reason),
            )),
        }
    }

    Decoded {
        value: values,
        issues,
    }
}

fn from_element<T: DeserializeOwned>(item: Value) -> Result<T, String> {
    serde_json::from_value(item).map_err(|e| e.to_string())
}

pub fn decode_strings(column: &'static str, raw: Option<&Property>) -> Decoded<Vec<String>> {
    decode_elements(column, raw, from_element::<String>)
}

/// Steps in array order. Never empty: falls back to [`PLACEHOLDER_STEP`].
pub fn decode_steps(column: &'static str, raw: Option<&Property>) -> Decoded<Vec<String>> {
    let mut decoded = decode_elements(column, raw, |item| {
        let text = from_element::<StoredStep>(item)?.into_text();
        if text.trim().is_empty() {
            Err("blank step".to_string())
        } else {
            Ok(text)
        }
    });

    if decoded.value.is_empty() {
        decoded.value.push(PLACEHOLDER_STEP.to_string());
        decoded.issues.push(MalformedStoredField::new(
            column,
            "no usable step, using placeholder",
        ));
    }
    decoded
}

/// Meal types, matched after capitalization. Never empty: falls back to
/// [`FALLBACK_MEAL_TYPE`].
pub fn decode_meal_types(column: &'static str, raw: Option<&Property>) -> Decoded<Vec<MealType>> {
    let mut decoded = decode_elements(column, raw, |item| {
        let label = from_element::<String>(item)?;
        MealType::from_label(&capitalize(label.trim()))
            .ok_or_else(|| format!("unknown meal type {:?}", label))
    });

    if decoded.value.is_empty() {
        decoded.value.push(FALLBACK_MEAL_TYPE);
        decoded.issues.push(MalformedStoredField::new(
            column,
            format!("no usable meal type, using {:?}", FALLBACK_MEAL_TYPE),
        ));
    }
    decoded
}

/// Ingredients, each one decoded and checked on its own.
pub fn decode_ingredients(
    column: &'static str,
    raw: Option<&Property>,
) -> Decoded<Vec<Ingredient>> {
    decode_elements(column, raw, |item| {
        let ingredient = from_element::<Ingredient>(item)?;
        ingredient.check().map_err(|e| e.to_string())?;
        Ok(ingredient)
    })
}

/// Difficulty, matched after capitalization. Unknown values fall back to the
/// default difficulty.
pub fn decode_difficulty(column: &'static str, raw: Option<&Property>) -> Decoded<Difficulty> {
    let label = match raw {
        Some(Property::Text(label)) => label,
        Some(other) => {
            return Decoded::fallback(
                Difficulty::default(),
                MalformedStoredField::new(
                    column,
                    format!("expected text, found {}", other.type_name()),
                ),
            )
        }
        None => {
            return Decoded::fallback(
                Difficulty::default(),
                MalformedStoredField::new(column, "missing"),
            )
        }
    };

    match Difficulty::from_label(&capitalize(label.trim())) {
        Some(difficulty) => Decoded::clean(difficulty),
        None => Decoded::fallback(
            Difficulty::default(),
            MalformedStoredField::new(column, format!("unknown difficulty {:?}", label)),
        ),
    }
}

/// Optional text. Blank counts as absent.
pub fn decode_optional_text(
    column: &'static str,
    raw: Option<&Property>,
) -> Decoded<Option<String>> {
    match raw {
        None => Decoded::clean(None),
        Some(Property::Text(text)) if text.trim().is_empty() => Decoded::clean(None),
        Some(Property::Text(text)) => Decoded::clean(Some(text.clone())),
        Some(other) => Decoded::fallback(
            None,
            MalformedStoredField::new(
                column,
                format!("expected text, found {}", other.type_name()),
            ),
        ),
    }
}

/// Optional non-negative count of minutes or servings.
///
/// Integers are expected; whole floats and numeric text from hand-edited rows
/// are accepted too. Anything else reads as absent.
pub fn decode_count(column: &'static str, raw: Option<&Property>) -> Decoded<Option<u32>> {
    let parsed: Result<i64, String> = match raw {
        None => return Decoded::clean(None),
        Some(Property::Int(n)) => Ok(*n),
        Some(Property::Float(f)) if f.fract() == 0.0 && f.is_finite() => Ok(*f as i64),
        Some(Property::Text(text)) => text
            .trim()
            .parse::<i64>()
            .map_err(|_| format!("not a number: {:?}", text)),
        Some(other) => Err(format!("expected an integer, found {}", other.type_name())),
    };

    match parsed.and_then(|n| u32::try_from(n).map_err(|_| format!("out of range: {}", n))) {
        Ok(n) => Decoded::clean(Some(n)),
        Err(reason) => Decoded::fallback(None, MalformedStoredField::new(column, reason)),
    }
}

/// Cook time is written as `0` when absent, so `0` reads back as absent.
pub fn decode_cook_time(column: &'static str, raw: Option<&Property>) -> Decoded<Option<u32>> {
    let mut decoded = decode_count(column, raw);
    if decoded.value == Some(0) {
        decoded.value = None;
    }
    decoded
}

pub fn decode_timestamp(
    column: &'static str,
    raw: Option<&Property>,
) -> Decoded<Option<DateTime<Utc>>> {
    match raw {
        None => Decoded::fallback(None, MalformedStoredField::new(column, "missing")),
        Some(Property::DateTime(ts)) => Decoded::clean(Some(*ts)),
        Some(Property::Text(text)) => match DateTime::parse_from_rfc3339(text.trim()) {
            Ok(ts) => Decoded::clean(Some(ts.with_timezone(&Utc))),
            Err(e) => Decoded::fallback(
                None,
                MalformedStoredField::new(column, format!("invalid timestamp {:?}: {}", text, e)),
            ),
        },
        Some(other) => Decoded::fallback(
            None,
            MalformedStoredField::new(
                column,
                format!("expected a timestamp, found {}", other.type_name()),
            ),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Unit;

    fn text(s: &str) -> Property {
        Property::Text(s.to_string())
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("plat principal"), "Plat principal");
        assert_eq!(capitalize("ENTRÉE"), "Entrée");
        assert_eq!(capitalize("EN-CAS"), "En-cas");
        assert_eq!(capitalize("moyen"), "Moyen");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn test_decode_array_fallbacks() {
        assert_eq!(decode_array("steps", None), Decoded::clean(Vec::new()));
        assert_eq!(decode_array("steps", Some(&text("  "))), Decoded::clean(Vec::new()));

        let bad = decode_array("steps", Some(&text("not json")));
        assert!(bad.value.is_empty());
        assert_eq!(bad.issues.len(), 1);
        assert_eq!(bad.issues[0].column, "steps");

        let object = decode_array("steps", Some(&text(r#"{"a": 1}"#)));
        assert!(object.value.is_empty());
        assert_eq!(object.issues.len(), 1);

        let wrong_type = decode_array("steps", Some(&Property::Int(3)));
        assert!(wrong_type.value.is_empty());
        assert_eq!(wrong_type.issues.len(), 1);
    }

    #[test]
    fn test_decode_steps_plain_and_ordered() {
        let raw = text(r#"["Éplucher", {"order": 2, "description": "Cuire"}]"#);
        let decoded = decode_steps("steps", Some(&raw));
        assert_eq!(decoded.value, vec!["Éplucher", "Cuire"]);
        assert!(decoded.issues.is_empty());
    }

    #[test]
    fn test_decode_steps_ignores_stored_order() {
        let raw = text(
            r#"[{"order": 2, "description": "Cuire"}, {"order": 1, "description": "Éplucher"}]"#,
        );
        let decoded = decode_steps("steps", Some(&raw));
        assert_eq!(decoded.value, vec!["Cuire", "Éplucher"]);
    }

    #[test]
    fn test_decode_steps_placeholder() {
        let decoded = decode_steps("steps", Some(&text("not json")));
        assert_eq!(decoded.value, vec![PLACEHOLDER_STEP]);
        assert_eq!(decoded.issues.len(), 2);

        let empty = decode_steps("steps", Some(&text("[]")));
        assert_eq!(empty.value, vec![PLACEHOLDER_STEP]);
    }

    #[test]
    fn test_decode_steps_drops_bad_elements() {
        let decoded = decode_steps("steps", Some(&text(r#"["Cuire", 42, {"order": 1}]"#)));
        assert_eq!(decoded.value, vec!["Cuire"]);
        assert_eq!(decoded.issues.len(), 2);
    }

    #[test]
    fn test_decode_meal_types() {
        let decoded = decode_meal_types(
            "meal_type",
            Some(&text(r#"["dessert", "PLAT PRINCIPAL", "brunch"]"#)),
        );
        assert_eq!(decoded.value, vec![MealType::Dessert, MealType::MainCourse]);
        assert_eq!(decoded.issues.len(), 1);
    }

    #[test]
    fn test_decode_meal_types_empty_falls_back() {
        let decoded = decode_meal_types("meal_type", Some(&text("[]")));
        assert_eq!(decoded.value, vec![MealType::MainCourse]);
    }

    #[test]
    fn test_decode_ingredients_drops_invalid_elements() {
        let raw = text(
            r#"[
                {"name": "Pomme", "quantity": 3, "unit": "pièce"},
                {"name": "Sucre", "unit": "g"},
                {"name": "X", "quantity": 1, "unit": "g"},
                {"name": "Beurre", "quantity": 50, "unit": "pound"}
            ]"#,
        );
        let decoded = decode_ingredients("ingredients", Some(&raw));
        assert_eq!(
            decoded.value,
            vec![Ingredient {
                name: "Pomme".to_string(),
                quantity: 3.0,
                unit: Unit::Piece,
            }]
        );
        assert_eq!(decoded.issues.len(), 3);
    }

    #[test]
    fn test_decode_difficulty() {
        assert_eq!(
            decode_difficulty("difficulty", Some(&text("difficile"))).value,
            Difficulty::Hard
        );
        let unknown = decode_difficulty("difficulty", Some(&text("extreme")));
        assert_eq!(unknown.value, Difficulty::Medium);
        assert_eq!(unknown.issues.len(), 1);
        assert_eq!(decode_difficulty("difficulty", None).value, Difficulty::Medium);
    }

    #[test]
    fn test_decode_count() {
        assert_eq!(decode_count("servings", None).value, None);
        assert_eq!(decode_count("servings", Some(&Property::Int(4))).value, Some(4));
        assert_eq!(decode_count("servings", Some(&Property::Float(4.0))).value, Some(4));
        assert_eq!(decode_count("servings", Some(&text(" 6 "))).value, Some(6));

        let negative = decode_count("servings", Some(&Property::Int(-1)));
        assert_eq!(negative.value, None);
        assert_eq!(negative.issues.len(), 1);

        let garbage = decode_count("servings", Some(&text("four")));
        assert_eq!(garbage.value, None);
        assert_eq!(garbage.issues.len(), 1);
    }

    #[test]
    fn test_decode_cook_time_zero_is_absent() {
        let decoded = decode_cook_time("cook_time_minutes", Some(&Property::Int(0)));
        assert_eq!(decoded.value, None);
        assert!(decoded.issues.is_empty());
        assert_eq!(
            decode_cook_time("cook_time_minutes", Some(&Property::Int(40))).value,
            Some(40)
        );
    }

    #[test]
    fn test_decode_optional_text() {
        assert_eq!(decode_optional_text("description", Some(&text(""))).value, None);
        assert_eq!(
            decode_optional_text("description", Some(&text("Miam"))).value,
            Some("Miam".to_string())
        );
    }

    #[test]
    fn test_decode_timestamp_accepts_rfc3339_text() {
        let decoded = decode_timestamp("created_at", Some(&text("2024-03-15T10:00:00+01:00")));
        let ts = decoded.value.unwrap();
        assert_eq!(ts.to_rfc3339(), "2024-03-15T09:00:00+00:00");

        let missing = decode_timestamp("created_at", None);
        assert_eq!(missing.value, None);
        assert_eq!(missing.issues.len(), 1);
    }
}
