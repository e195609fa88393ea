//! Row store abstraction.
//!
//! A row store is a schemaless table addressed by a (partition key, row key)
//! pair. Rows are flat bags of scalar properties; anything structured has to be
//! encoded into a text property by the caller. Server-side filtering is limited
//! to equality and less-or-equal comparisons on scalar properties.

mod memory;

pub use memory::MemoryRowStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use crate::error::StoreError;

/// A single scalar column value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Property {
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    DateTime(DateTime<Utc>),
}

impl Property {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Property::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Property::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Short type name, used in log messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Property::Text(_) => "text",
            Property::Int(_) => "int",
            Property::Float(_) => "float",
            Property::Bool(_) => "bool",
            Property::DateTime(_) => "datetime",
        }
    }

    /// Ordering between two values of compatible types. Ints and floats
    /// compare numerically; any other mix is incomparable.
    pub fn compare(&self, other: &Property) -> Option<Ordering> {
        match (self, other) {
            (Property::Text(a), Property::Text(b)) => Some(a.cmp(b)),
            (Property::Int(a), Property::Int(b)) => Some(a.cmp(b)),
            (Property::Float(a), Property::Float(b)) => a.partial_cmp(b),
            (Property::Int(a), Property::Float(b)) => (*a as f64).partial_cmp(b),
            (Property::Float(a), Property::Int(b)) => a.partial_cmp(&(*b as f64)),
            (Property::Bool(a), Property::Bool(b)) => Some(a.cmp(b)),
            (Property::DateTime(a), Property::DateTime(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Row {
    pub partition_key: String,
    pub row_key: String,
    pub properties: BTreeMap<String, Property>,
}

impl Row {
    pub fn new(partition_key: impl Into<String>, row_key: impl Into<String>) -> Self {
        Self {
            partition_key: partition_key.into(),
            row_key: row_key.into(),
            properties: BTreeMap::new(),
        }
    }

    pub fn set(&mut self, column: &str, value: Property) {
        self.properties.insert(column.to_string(), value);
    }

    /// Builder-style [`Row::set`].
    pub fn with(mut self, column: &str, value: Property) -> Self {
        self.set(column, value);
        self
    }

    pub fn get(&self, column: &str) -> Option<&Property> {
        self.properties.get(column)
    }
}

/// Server-side filter over scalar columns.
///
/// A comparison against a column the row doesn't have never matches.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Eq(String, Property),
    Le(String, Property),
    /// All must match. An empty list matches every row.
    And(Vec<Filter>),
}

impl Filter {
    pub fn eq(column: &str, value: Property) -> Self {
        Filter::Eq(column.to_string(), value)
    }

    pub fn le(column: &str, value: Property) -> Self {
        Filter::Le(column.to_string(), value)
    }

    pub fn matches(&self, row: &Row) -> bool {
        match self {
            Filter::Eq(column, value) => row
                .get(column)
                .and_then(|v| v.compare(value))
                .is_some_and(|o| o == Ordering::Equal),
            Filter::Le(column, value) => row
                .get(column)
                .and_then(|v| v.compare(value))
                .is_some_and(|o| o != Ordering::Greater),
            Filter::And(filters) => filters.iter().all(|f| f.matches(row)),
        }
    }
}

/// Storage backend for flat rows.
///
/// Implementations must be safe to share between request handlers. No
/// operation spans more than one call, so there are no transactions here.
#[async_trait]
pub trait RowStore: Send + Sync + fmt::Debug {
    /// Insert or replace the row at `(row.partition_key, row.row_key)`.
    async fn put(&self, row: Row) -> Result<(), StoreError>;

    /// Fetch a row, failing with [`StoreError::NotFound`] if it doesn't exist.
    async fn get(&self, partition_key: &str, row_key: &str) -> Result<Row, StoreError>;

    /// Delete a row, failing with [`StoreError::NotFound`] if it doesn't exist.
    async fn delete(&self, partition_key: &str, row_key: &str) -> Result<(), StoreError>;

    /// All rows of a partition matching `filter`, ordered by row key.
    async fn query(
        &self,
        partition_key: &str,
        filter: Option<&Filter>,
    ) -> Result<Vec<Row>, StoreError>;

    /// Cheap connectivity check.
    async fn ping(&self) -> Result<(), StoreError>;

    /// Backend name (e.g., "memory", "postgres"), for logs.
    fn backend_name(&self) -> &'static str;
}
