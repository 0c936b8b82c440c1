//! Convert filter values and JSON into values sqlx can bind for SQLite.

use crate::config::FieldType;
use crate::error::AppError;
use crate::query::FilterValue;
use serde_json::Value;
use sqlx::encode::{Encode, IsNull};
use sqlx::sqlite::{Sqlite, SqliteTypeInfo};
use sqlx::{Database, Type};

/// A value that can be bound to a SQLite query.
#[derive(Clone, Debug, PartialEq)]
pub enum BindValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl BindValue {
    pub fn from_json(v: &Value) -> Self {
        match v {
            Value::Null => BindValue::Null,
            Value::Bool(b) => BindValue::Bool(*b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => BindValue::Int(i),
                None => n.as_f64().map(BindValue::Float).unwrap_or(BindValue::Null),
            },
            Value::String(s) => BindValue::Text(s.clone()),
            Value::Array(_) | Value::Object(_) => BindValue::Text(v.to_string()),
        }
    }

    /// Parse a path segment as a primary key of the given type.
    pub fn parse_key(raw: &str, type_: FieldType) -> Result<Self, AppError> {
        let invalid = || AppError::BadRequest(format!("invalid id: {}", raw));
        Ok(match type_ {
            FieldType::Integer => BindValue::Int(raw.parse().map_err(|_| invalid())?),
            FieldType::Float => BindValue::Float(raw.parse().map_err(|_| invalid())?),
            FieldType::Text => BindValue::Text(raw.to_string()),
            FieldType::Boolean => BindValue::Bool(raw.parse().map_err(|_| invalid())?),
        })
    }
}

impl From<&FilterValue> for BindValue {
    fn from(v: &FilterValue) -> Self {
        match v {
            FilterValue::Int(i) => BindValue::Int(*i),
            FilterValue::Float(f) => BindValue::Float(*f),
            FilterValue::Text(s) => BindValue::Text(s.clone()),
        }
    }
}

impl<'q> Encode<'q, Sqlite> for BindValue {
    fn encode_by_ref(
        &self,
        buf: &mut <Sqlite as Database>::ArgumentBuffer<'q>,
    ) -> Result<IsNull, Box<dyn std::error::Error + Send + Sync>> {
        match self {
            BindValue::Null => <Option<i64> as Encode<Sqlite>>::encode_by_ref(&None, buf),
            BindValue::Bool(b) => <bool as Encode<Sqlite>>::encode_by_ref(b, buf),
            BindValue::Int(n) => <i64 as Encode<Sqlite>>::encode_by_ref(n, buf),
            BindValue::Float(n) => <f64 as Encode<Sqlite>>::encode_by_ref(n, buf),
            BindValue::Text(s) => <String as Encode<Sqlite>>::encode_by_ref(s, buf),
        }
    }
}

impl Type<Sqlite> for BindValue {
    fn type_info() -> SqliteTypeInfo {
        <String as Type<Sqlite>>::type_info()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parse_key_by_type() {
        assert_eq!(BindValue::parse_key("12", FieldType::Integer).unwrap(), BindValue::Int(12));
        assert_eq!(BindValue::parse_key("ab", FieldType::Text).unwrap(), BindValue::Text("ab".into()));
        assert!(matches!(
            BindValue::parse_key("abc", FieldType::Integer),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn from_json_keeps_number_kind() {
        assert_eq!(BindValue::from_json(&json!(3)), BindValue::Int(3));
        assert_eq!(BindValue::from_json(&json!(3.5)), BindValue::Float(3.5));
        assert_eq!(BindValue::from_json(&json!(null)), BindValue::Null);
    }
}
