//! Builds parameterized SELECT, INSERT, UPDATE, DELETE from a resolved resource.

use crate::config::ResolvedResource;
use crate::query::ListQuery;
use crate::sql::BindValue;
use serde_json::{Map, Value};

/// Quote identifier for SQLite (safe: only from config).
fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

#[derive(Debug)]
pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<BindValue>,
}

impl QueryBuf {
    fn new() -> Self {
        QueryBuf {
            sql: String::new(),
            params: Vec::new(),
        }
    }

    fn push_param(&mut self, v: BindValue) {
        self.params.push(v);
    }
}

fn select_column_list(resource: &ResolvedResource) -> String {
    resource
        .fields
        .iter()
        .map(|f| quoted(&f.name))
        .collect::<Vec<_>>()
        .join(", ")
}

/// SELECT list: WHERE from the plan's conditions (ANDed), optional ORDER BY, then LIMIT/OFFSET.
/// Conditions on fields the resource does not have are skipped.
pub fn select_list(resource: &ResolvedResource, query: &ListQuery) -> QueryBuf {
    let mut q = QueryBuf::new();
    let table = quoted(&resource.table);

    let mut where_parts = Vec::new();
    for cond in &query.conditions {
        if resource.registry.contains(&cond.field) {
            q.push_param(BindValue::from(&cond.value));
            where_parts.push(format!("{} = ?", quoted(&cond.field)));
        }
    }
    let where_clause = if where_parts.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", where_parts.join(" AND "))
    };
    let order_clause = query
        .sort
        .as_ref()
        .filter(|s| resource.registry.contains(&s.field))
        .map(|s| format!(" ORDER BY {} {}", quoted(&s.field), s.direction.as_sql()))
        .unwrap_or_default();
    let limit = i64::try_from(query.window.limit).unwrap_or(i64::MAX);
    let offset = i64::try_from(query.window.offset).unwrap_or(i64::MAX);

    q.sql = format!(
        "SELECT {} FROM {}{}{} LIMIT {} OFFSET {}",
        select_column_list(resource),
        table,
        where_clause,
        order_clause,
        limit,
        offset
    );
    q
}

/// SELECT by primary key.
pub fn select_by_id(resource: &ResolvedResource, id: &BindValue) -> QueryBuf {
    let mut q = QueryBuf::new();
    q.push_param(id.clone());
    q.sql = format!(
        "SELECT {} FROM {} WHERE {} = ?",
        select_column_list(resource),
        quoted(&resource.table),
        quoted(&resource.primary_key)
    );
    q
}

/// INSERT: known fields from body. Omits fields with a DB default (or the primary key)
/// when the body does not provide them, so the database fills them in.
pub fn insert(resource: &ResolvedResource, body: &Map<String, Value>) -> QueryBuf {
    let mut q = QueryBuf::new();
    let table = quoted(&resource.table);
    let mut cols = Vec::new();
    for f in &resource.fields {
        let val = body.get(&f.name);
        if val.is_none() && (f.has_default || resource.is_primary_key(&f.name)) {
            continue;
        }
        q.push_param(val.map(BindValue::from_json).unwrap_or(BindValue::Null));
        cols.push(quoted(&f.name));
    }
    let returning = select_column_list(resource);
    q.sql = if cols.is_empty() {
        format!("INSERT INTO {} DEFAULT VALUES RETURNING {}", table, returning)
    } else {
        format!(
            "INSERT INTO {} ({}) VALUES ({}) RETURNING {}",
            table,
            cols.join(", "),
            vec!["?"; cols.len()].join(", "),
            returning
        )
    };
    q
}

/// UPDATE by id: SET only known, non-key fields present in body.
/// Returns `None` when there is nothing to set.
pub fn update(resource: &ResolvedResource, id: &BindValue, body: &Map<String, Value>) -> Option<QueryBuf> {
    let mut q = QueryBuf::new();
    let mut sets = Vec::new();
    for f in &resource.fields {
        if resource.is_primary_key(&f.name) {
            continue;
        }
        let Some(v) = body.get(&f.name) else { continue };
        q.push_param(BindValue::from_json(v));
        sets.push(format!("{} = ?", quoted(&f.name)));
    }
    if sets.is_empty() {
        return None;
    }
    q.push_param(id.clone());
    q.sql = format!(
        "UPDATE {} SET {} WHERE {} = ? RETURNING {}",
        quoted(&resource.table),
        sets.join(", "),
        quoted(&resource.primary_key),
        select_column_list(resource)
    );
    Some(q)
}

/// DELETE by id.
pub fn delete(resource: &ResolvedResource, id: &BindValue) -> QueryBuf {
    let mut q = QueryBuf::new();
    q.push_param(id.clone());
    q.sql = format!(
        "DELETE FROM {} WHERE {} = ?",
        quoted(&resource.table),
        quoted(&resource.primary_key)
    );
    q
}
