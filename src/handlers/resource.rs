//! Resource CRUD handlers: list, get, create, update, delete.

use crate::error::AppError;
use crate::extractors::JsonObject;
use crate::query::{ListParams, ListQuery};
use crate::response::{success_created, success_many, success_one};
use crate::service::{CrudService, RequestValidator};
use crate::sql::BindValue;
use crate::state::CrudState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};

pub async fn list(
    State(state): State<CrudState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<impl IntoResponse, AppError> {
    let resource = &state.resource;
    let params = ListParams::from_pairs(pairs);
    let query = ListQuery::plan(&resource.registry, &params, &resource.filter_allow, &resource.sort_allow)
        .capped(resource.max_limit);
    let rows = CrudService::list(&state.pool, resource, &query).await?;
    Ok(success_many(rows.into_iter().map(|r| resource.redact(r)).collect()))
}

pub async fn read(
    State(state): State<CrudState>,
    Path(id_str): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let resource = &state.resource;
    let id = BindValue::parse_key(&id_str, resource.pk_type)?;
    let row = CrudService::read(&state.pool, resource, &id)
        .await?
        .ok_or_else(|| AppError::NotFound(id_str))?;
    Ok(success_one(resource.redact(row)))
}

pub async fn create(
    State(state): State<CrudState>,
    JsonObject(body): JsonObject,
) -> Result<impl IntoResponse, AppError> {
    let resource = &state.resource;
    RequestValidator::validate(&body, resource)?;
    let row = CrudService::create(&state.pool, resource, &body).await?;
    Ok(success_created(resource.redact(row)))
}

pub async fn update(
    State(state): State<CrudState>,
    Path(id_str): Path<String>,
    JsonObject(body): JsonObject,
) -> Result<impl IntoResponse, AppError> {
    let resource = &state.resource;
    let id = BindValue::parse_key(&id_str, resource.pk_type)?;
    RequestValidator::validate_partial(&body, resource)?;
    let row = CrudService::update(&state.pool, resource, &id, &body)
        .await?
        .ok_or_else(|| AppError::NotFound(id_str))?;
    Ok(success_one(resource.redact(row)))
}

pub async fn delete(
    State(state): State<CrudState>,
    Path(id_str): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let resource = &state.resource;
    let id = BindValue::parse_key(&id_str, resource.pk_type)?;
    if !CrudService::delete(&state.pool, resource, &id).await? {
        return Err(AppError::NotFound(id_str));
    }
    Ok(StatusCode::NO_CONTENT)
}
