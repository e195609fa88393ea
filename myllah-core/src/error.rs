use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Row not found: {partition_key}/{row_key}")]
    NotFound {
        partition_key: String,
        row_key: String,
    },

    #[error("Row store unavailable: {0}")]
    Unavailable(String),
}

#[derive(Error, Debug)]
pub enum RecipeError {
    #[error("Recipe not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Stored row is corrupt: {0}")]
    CorruptRow(String),

    #[error("Row store unavailable: {0}")]
    StoreUnavailable(String),
}

impl From<StoreError> for RecipeError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { row_key, .. } => RecipeError::NotFound(row_key),
            StoreError::Unavailable(message) => RecipeError::StoreUnavailable(message),
        }
    }
}

/// A stored column that could not be decoded.
///
/// Never returned as a failure: the mapper substitutes the column's fallback
/// value and reports the problem alongside the decoded recipe.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("malformed stored field `{column}`: {reason}")]
pub struct MalformedStoredField {
    pub column: &'static str,
    pub reason: String,
}

impl MalformedStoredField {
    pub fn new(column: &'static str, reason: impl Into<String>) -> Self {
        Self {
            column,
            reason: reason.into(),
        }
    }
}
