//! Response helpers: rows are returned bare, shaped by the resource's read fields.

use axum::{http::StatusCode, Json};
use serde_json::{Map, Value};

pub fn success_one(data: Map<String, Value>) -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(Value::Object(data)))
}

pub fn success_created(data: Map<String, Value>) -> (StatusCode, Json<Value>) {
    (StatusCode::CREATED, Json(Value::Object(data)))
}

pub fn success_many(data: Vec<Map<String, Value>>) -> (StatusCode, Json<Value>) {
    (
        StatusCode::OK,
        Json(Value::Array(data.into_iter().map(Value::Object).collect())),
    )
}
