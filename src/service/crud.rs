//! Generic CRUD execution against SQLite.

use crate::config::{FieldType, ResolvedResource};
use crate::error::AppError;
use crate::query::ListQuery;
use crate::sql::{delete, insert, select_by_id, select_list, update, BindValue, QueryBuf};
use serde_json::{Map, Value};
use sqlx::query::Query;
use sqlx::sqlite::{Sqlite, SqliteArguments, SqliteRow};
use sqlx::SqlitePool;

/// One row as a JSON object keyed by field name.
pub type JsonRow = Map<String, Value>;

pub struct CrudService;

impl CrudService {
    /// Rows matching the plan: filter, sort, then window.
    pub async fn list(
        pool: &SqlitePool,
        resource: &ResolvedResource,
        query: &ListQuery,
    ) -> Result<Vec<JsonRow>, AppError> {
        let q = select_list(resource, query);
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let rows = prepare(&q).fetch_all(pool).await?;
        rows.iter().map(|r| row_to_json(r, resource)).collect()
    }

    /// Fetch one row by primary key.
    pub async fn read(
        pool: &SqlitePool,
        resource: &ResolvedResource,
        id: &BindValue,
    ) -> Result<Option<JsonRow>, AppError> {
        let q = select_by_id(resource, id);
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let row = prepare(&q).fetch_optional(pool).await?;
        row.map(|r| row_to_json(&r, resource)).transpose()
    }

    /// Insert one row and return it as stored.
    pub async fn create(
        pool: &SqlitePool,
        resource: &ResolvedResource,
        body: &JsonRow,
    ) -> Result<JsonRow, AppError> {
        let q = insert(resource, body);
        tracing::debug!(sql = %q.sql, params = ?q.params, "query (tx)");
        let mut tx = pool.begin().await?;
        let row = prepare(&q).fetch_one(&mut *tx).await?;
        let created = row_to_json(&row, resource)?;
        tx.commit().await?;
        Ok(created)
    }

    /// Apply the fields present in body to the row with this id. `None` when no such row.
    pub async fn update(
        pool: &SqlitePool,
        resource: &ResolvedResource,
        id: &BindValue,
        body: &JsonRow,
    ) -> Result<Option<JsonRow>, AppError> {
        let mut tx = pool.begin().await?;
        let existing = select_by_id(resource, id);
        tracing::debug!(sql = %existing.sql, params = ?existing.params, "query (tx)");
        let Some(row) = prepare(&existing).fetch_optional(&mut *tx).await? else {
            return Ok(None);
        };
        let Some(q) = update(resource, id, body) else {
            tx.commit().await?;
            return row_to_json(&row, resource).map(Some);
        };
        tracing::debug!(sql = %q.sql, params = ?q.params, "query (tx)");
        let updated = prepare(&q).fetch_one(&mut *tx).await?;
        let updated = row_to_json(&updated, resource)?;
        tx.commit().await?;
        Ok(Some(updated))
    }

    /// Delete the row with this id. `false` when no such row.
    pub async fn delete(
        pool: &SqlitePool,
        resource: &ResolvedResource,
        id: &BindValue,
    ) -> Result<bool, AppError> {
        let mut tx = pool.begin().await?;
        let existing = select_by_id(resource, id);
        tracing::debug!(sql = %existing.sql, params = ?existing.params, "query (tx)");
        if prepare(&existing).fetch_optional(&mut *tx).await?.is_none() {
            return Ok(false);
        }
        let q = delete(resource, id);
        tracing::debug!(sql = %q.sql, params = ?q.params, "query (tx)");
        prepare(&q).execute(&mut *tx).await?;
        tx.commit().await?;
        Ok(true)
    }
}

fn prepare(q: &QueryBuf) -> Query<'_, Sqlite, SqliteArguments<'_>> {
    let mut query = sqlx::query(&q.sql);
    for p in &q.params {
        query = query.bind(p.clone());
    }
    query
}

/// Decode a row by the declared type of each field.
fn row_to_json(row: &SqliteRow, resource: &ResolvedResource) -> Result<JsonRow, AppError> {
    use sqlx::Row;
    let mut map = Map::new();
    for f in &resource.fields {
        let name = f.name.as_str();
        let v = match f.type_ {
            FieldType::Integer => row.try_get::<Option<i64>, _>(name)?.map(Value::from),
            FieldType::Float => row
                .try_get::<Option<f64>, _>(name)?
                .and_then(serde_json::Number::from_f64)
                .map(Value::Number),
            FieldType::Text => row.try_get::<Option<String>, _>(name)?.map(Value::String),
            FieldType::Boolean => row.try_get::<Option<bool>, _>(name)?.map(Value::Bool),
        };
        map.insert(f.name.clone(), v.unwrap_or(Value::Null));
    }
    Ok(map)
}
