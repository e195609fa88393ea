//! Raw SQL fragments that can't be expressed in Diesel's type-safe DSL.
//!
//! Row properties live in a single JSONB column, one entry per property, each
//! shaped `{"type": "<kind>", "value": <value>}`. Comparing a property means
//! reaching into that document, which Diesel has no DSL for.
//!
//! # Safety
//!
//! - Property names and values are ALWAYS passed via `.bind()` parameters
//! - The only interpolated text is the comparison operator, which comes from
//!   [`Comparison::operator`] and never from a caller
//!
//! A property of a different kind than the compared value never matches, and
//! neither does a missing property. This mirrors the in-memory store.

use diesel::dsl::sql;
use diesel::pg::Pg;
use diesel::sql_types::{Bool, Text, Timestamptz};
use diesel::BoxableExpression;
use myllah_core::Property;

use crate::schema::table_rows;

pub type PropertyPredicate = Box<dyn BoxableExpression<table_rows::table, Pg, SqlType = Bool>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Eq,
    Le,
}

impl Comparison {
    pub fn operator(self) -> &'static str {
        match self {
            Comparison::Eq => "=",
            Comparison::Le => "<=",
        }
    }
}

/// `properties -> column` compared against `value`.
///
/// Text compares byte-wise (`COLLATE "C"`). Ints and floats compare as
/// `numeric`, so an int property can be compared against a float value.
pub fn property_matches(
    column: &str,
    comparison: Comparison,
    value: &Property,
) -> PropertyPredicate {
    let op = comparison.operator();
    match value {
        Property::Text(text) => Box::new(
            sql::<Bool>("(CASE WHEN properties -> ")
                .bind::<Text, _>(column.to_string())
                .sql(" ->> 'type' = 'text' THEN (properties -> ")
                .bind::<Text, _>(column.to_string())
                .sql(&format!(" ->> 'value') COLLATE \"C\" {} ", op))
                .bind::<Text, _>(text.clone())
                .sql(" ELSE false END)"),
        ),
        Property::Int(n) => numeric_matches(column, op, n.to_string()),
        Property::Float(f) => numeric_matches(column, op, f.to_string()),
        Property::Bool(b) => Box::new(
            sql::<Bool>("(CASE WHEN properties -> ")
                .bind::<Text, _>(column.to_string())
                .sql(" ->> 'type' = 'bool' THEN (properties -> ")
                .bind::<Text, _>(column.to_string())
                .sql(&format!(" ->> 'value')::boolean {} ", op))
                .bind::<Bool, _>(*b)
                .sql(" ELSE false END)"),
        ),
        Property::DateTime(at) => Box::new(
            sql::<Bool>("(CASE WHEN properties -> ")
                .bind::<Text, _>(column.to_string())
                .sql(" ->> 'type' = 'date_time' THEN (properties -> ")
                .bind::<Text, _>(column.to_string())
                .sql(&format!(" ->> 'value')::timestamptz {} ", op))
                .bind::<Timestamptz, _>(*at)
                .sql(" ELSE false END)"),
        ),
    }
}

fn numeric_matches(column: &str, op: &str, value: String) -> PropertyPredicate {
    Box::new(
        sql::<Bool>("(CASE WHEN properties -> ")
            .bind::<Text, _>(column.to_string())
            .sql(" ->> 'type' IN ('int', 'float') THEN (properties -> ")
            .bind::<Text, _>(column.to_string())
            .sql(&format!(" ->> 'value')::numeric {} ", op))
            .bind::<Text, _>(value)
            .sql("::numeric ELSE false END)"),
    )
}

/// Connectivity probe used by readiness checks.
///
/// # Safety
/// Static SQL string with no user input.
pub const PING_QUERY: &str = "SELECT 1";
