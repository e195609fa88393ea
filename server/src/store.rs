//! Postgres-backed row store.
//!
//! Emulates a partitioned table service on top of a single `table_rows`
//! table. Several logical tables can share it; each store instance only ever
//! sees rows of its own `table_name`.

use crate::db::DbPool;
use crate::models::{NewTableRow, TableRow};
use crate::raw_sql::{property_matches, Comparison, PING_QUERY};
use crate::schema::table_rows;
use async_trait::async_trait;
use chrono::Utc;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel::upsert::excluded;
use myllah_core::{Filter, Property, Row, RowStore, StoreError};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Clone)]
pub struct PgRowStore {
    pool: DbPool,
    table_name: String,
}

impl fmt::Debug for PgRowStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PgRowStore")
            .field("table_name", &self.table_name)
            .finish_non_exhaustive()
    }
}

type BoxedRowQuery<'a> = table_rows::BoxedQuery<'a, Pg>;

fn unavailable(e: impl fmt::Display) -> StoreError {
    StoreError::Unavailable(e.to_string())
}

impl PgRowStore {
    pub fn new(pool: DbPool, table_name: impl Into<String>) -> Self {
        Self {
            pool,
            table_name: table_name.into(),
        }
    }

    /// Run a blocking Diesel closure on the blocking thread pool.
    async fn with_conn<T, F>(&self, f: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&mut PgConnection, &str) -> Result<T, StoreError> + Send + 'static,
    {
        let pool = self.pool.clone();
        let table_name = self.table_name.clone();
        tokio::task::spawn_blocking(move || {
            let mut conn = pool.get().map_err(unavailable)?;
            f(&mut *conn, &table_name)
        })
        .await
        .map_err(unavailable)?
    }
}

fn apply_filter<'a>(query: BoxedRowQuery<'a>, filter: &Filter) -> BoxedRowQuery<'a> {
    match filter {
        Filter::Eq(column, value) => {
            query.filter(property_matches(column, Comparison::Eq, value))
        }
        Filter::Le(column, value) => {
            query.filter(property_matches(column, Comparison::Le, value))
        }
        Filter::And(filters) => filters.iter().fold(query, apply_filter),
    }
}

fn encode_properties(row: &Row) -> Result<serde_json::Value, StoreError> {
    serde_json::to_value(&row.properties).map_err(unavailable)
}

/// Properties that don't parse are dropped so the rest of the row stays
/// readable.
fn decode_row(stored: TableRow) -> Row {
    let mut properties = BTreeMap::new();

    if let serde_json::Value::Object(map) = stored.properties {
        for (column, raw) in map {
            match serde_json::from_value::<Property>(raw) {
                Ok(value) => {
                    properties.insert(column, value);
                }
                Err(e) => {
                    tracing::warn!(
                        row_key = %stored.row_key,
                        column = %column,
                        error = %e,
                        "Dropping unreadable stored property"
                    );
                }
            }
        }
    } else {
        tracing::warn!(row_key = %stored.row_key, "Stored properties are not an object");
    }

    Row {
        partition_key: stored.partition_key,
        row_key: stored.row_key,
        properties,
    }
}

#[async_trait]
impl RowStore for PgRowStore {
    async fn put(&self, row: Row) -> Result<(), StoreError> {
        let properties = encode_properties(&row)?;
        self.with_conn(move |conn, table_name| {
            let new_row = NewTableRow {
                table_name,
                partition_key: &row.partition_key,
                row_key: &row.row_key,
                properties,
                updated_at: Utc::now(),
            };

            diesel::insert_into(table_rows::table)
                .values(&new_row)
                .on_conflict((
                    table_rows::table_name,
                    table_rows::partition_key,
                    table_rows::row_key,
                ))
                .do_update()
                .set((
                    table_rows::properties.eq(excluded(table_rows::properties)),
                    table_rows::updated_at.eq(excluded(table_rows::updated_at)),
                ))
                .execute(conn)
                .map_err(|e| {
                    tracing::error!(error = %e, "Failed to write row");
                    unavailable(e)
                })?;
            Ok(())
        })
        .await
    }

    async fn get(&self, partition_key: &str, row_key: &str) -> Result<Row, StoreError> {
        let partition_key = partition_key.to_string();
        let row_key = row_key.to_string();
        self.with_conn(move |conn, table_name| {
            let stored: Option<TableRow> = table_rows::table
                .filter(table_rows::table_name.eq(table_name))
                .filter(table_rows::partition_key.eq(&partition_key))
                .filter(table_rows::row_key.eq(&row_key))
                .select(TableRow::as_select())
                .first(conn)
                .optional()
                .map_err(|e| {
                    tracing::error!(error = %e, "Failed to fetch row");
                    unavailable(e)
                })?;

            stored.map(decode_row).ok_or(StoreError::NotFound {
                partition_key,
                row_key,
            })
        })
        .await
    }

    async fn delete(&self, partition_key: &str, row_key: &str) -> Result<(), StoreError> {
        let partition_key = partition_key.to_string();
        let row_key = row_key.to_string();
        self.with_conn(move |conn, table_name| {
            let deleted = diesel::delete(
                table_rows::table
                    .filter(table_rows::table_name.eq(table_name))
                    .filter(table_rows::partition_key.eq(&partition_key))
                    .filter(table_rows::row_key.eq(&row_key)),
            )
            .execute(conn)
            .map_err(|e| {
                tracing::error!(error = %e, "Failed to delete row");
                unavailable(e)
            })?;

            if deleted == 0 {
                return Err(StoreError::NotFound {
                    partition_key,
                    row_key,
                });
            }
            Ok(())
        })
        .await
    }

    async fn query(
        &self,
        partition_key: &str,
        filter: Option<&Filter>,
    ) -> Result<Vec<Row>, StoreError> {
        let partition_key = partition_key.to_string();
        let filter = filter.cloned();
        self.with_conn(move |conn, table_name| {
            let mut query = table_rows::table
                .filter(table_rows::table_name.eq(table_name.to_string()))
                .filter(table_rows::partition_key.eq(partition_key))
                .into_boxed();

            if let Some(ref filter) = filter {
                query = apply_filter(query, filter);
            }

            let rows: Vec<TableRow> = query
                .order(table_rows::row_key.asc())
                .select(TableRow::as_select())
                .load(conn)
                .map_err(|e| {
                    tracing::error!(error = %e, "Failed to query rows");
                    unavailable(e)
                })?;

            Ok(rows.into_iter().map(decode_row).collect())
        })
        .await
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.with_conn(|conn, _| {
            diesel::sql_query(PING_QUERY)
                .execute(conn)
                .map(|_| ())
                .map_err(unavailable)
        })
        .await
    }

    fn backend_name(&self) -> &'static str {
        "postgres"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use diesel::debug_query;
    use serde_json::json;

    #[test]
    fn test_decode_row_drops_unreadable_properties() {
        let stored = TableRow {
            partition_key: "recipe".to_string(),
            row_key: "r1".to_string(),
            properties: json!({
                "title": {"type": "text", "value": "Tarte"},
                "servings": {"type": "int", "value": 4},
                "broken": {"type": "mystery", "value": 1},
                "bare": "not tagged",
            }),
        };

        let row = decode_row(stored);
        assert_eq!(row.row_key, "r1");
        assert_eq!(row.get("title"), Some(&Property::Text("Tarte".to_string())));
        assert_eq!(row.get("servings"), Some(&Property::Int(4)));
        assert_eq!(row.properties.len(), 2);
    }

    #[test]
    fn test_decode_row_non_object_properties() {
        let stored = TableRow {
            partition_key: "recipe".to_string(),
            row_key: "r1".to_string(),
            properties: json!([1, 2, 3]),
        };
        assert!(decode_row(stored).properties.is_empty());
    }

    #[test]
    fn test_encode_properties_shape() {
        let row = Row::new("recipe", "r1")
            .with("title", Property::Text("Tarte".to_string()))
            .with("cook_time_minutes", Property::Int(0));
        assert_eq!(
            encode_properties(&row).unwrap(),
            json!({
                "cook_time_minutes": {"type": "int", "value": 0},
                "title": {"type": "text", "value": "Tarte"},
            })
        );
    }

    #[test]
    fn test_conjunction_becomes_successive_where_clauses() {
        let filter = Filter::And(vec![
            Filter::eq("difficulty", Property::Text("Facile".to_string())),
            Filter::le("total_time_minutes", Property::Int(45)),
        ]);
        let query = apply_filter(
            table_rows::table
                .filter(table_rows::table_name.eq("recipes"))
                .into_boxed(),
            &filter,
        );
        let sql = debug_query::<Pg, _>(&query).to_string();
        assert!(sql.contains("COLLATE \"C\" ="), "{}", sql);
        assert!(sql.contains("::numeric <="), "{}", sql);
        assert_eq!(sql.matches(" AND ").count(), 2, "{}", sql);
    }
}
