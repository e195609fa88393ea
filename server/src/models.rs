use chrono::{DateTime, Utc};
use diesel::prelude::*;

#[derive(Queryable, Selectable, Debug)]
#[diesel(table_name = crate::schema::table_rows)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TableRow {
    pub partition_key: String,
    pub row_key: String,
    pub properties: serde_json::Value,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::table_rows)]
pub struct NewTableRow<'a> {
    pub table_name: &'a str,
    pub partition_key: &'a str,
    pub row_key: &'a str,
    pub properties: serde_json::Value,
    pub updated_at: DateTime<Utc>,
}
