//! Table bootstrap from a resolved resource.

use crate::config::{FieldType, ResolvedResource};
use crate::error::AppError;
use sqlx::SqlitePool;

fn quote(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

/// CREATE TABLE IF NOT EXISTS with one column per field. An integer primary key
/// becomes the rowid alias so inserts may omit it.
pub fn create_table_sql(resource: &ResolvedResource) -> String {
    let mut col_defs: Vec<String> = Vec::new();
    for f in &resource.fields {
        let mut def = format!("{} {}", quote(&f.name), f.type_.sql_type());
        if resource.is_primary_key(&f.name) {
            def.push_str(" PRIMARY KEY");
            if f.type_ != FieldType::Integer {
                def.push_str(" NOT NULL");
            }
        } else if !f.nullable {
            def.push_str(" NOT NULL");
        }
        col_defs.push(def);
    }
    format!(
        "CREATE TABLE IF NOT EXISTS {} (\n  {}\n)",
        quote(&resource.table),
        col_defs.join(",\n  ")
    )
}

pub async fn ensure_table(pool: &SqlitePool, resource: &ResolvedResource) -> Result<(), AppError> {
    let sql = create_table_sql(resource);
    tracing::debug!(sql = %sql, "ensure table");
    sqlx::query(&sql).execute(pool).await?;
    Ok(())
}
