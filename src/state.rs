//! Shared state for the routes of one registered resource.

use crate::config::ResolvedResource;
use sqlx::SqlitePool;
use std::sync::Arc;

#[derive(Clone)]
pub struct CrudState {
    pub pool: SqlitePool,
    pub resource: Arc<ResolvedResource>,
}
