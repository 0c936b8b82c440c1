//! Request body validation from the resource's field types and rules.

use crate::config::{FieldInfo, FieldType, ResolvedResource, ValidationRule};
use crate::error::AppError;
use regex::Regex;
use serde_json::{Map, Value};

pub struct RequestValidator;

impl RequestValidator {
    /// Validate a create body. Non-nullable fields without a default are required;
    /// the primary key may be omitted. Unknown keys are ignored.
    pub fn validate(body: &Map<String, Value>, resource: &ResolvedResource) -> Result<(), AppError> {
        for field in &resource.fields {
            let val = body.get(&field.name).filter(|v| !v.is_null());
            let rule_required = field
                .validation
                .as_ref()
                .and_then(|r| r.required)
                .unwrap_or(false);
            let implicit = !field.nullable && !field.has_default && !resource.is_primary_key(&field.name);
            match val {
                None if rule_required || implicit => {
                    return Err(AppError::Validation(format!("{} is required", field.name)));
                }
                None => {
                    if body.get(&field.name).is_some() && !field.nullable {
                        return Err(AppError::Validation(format!("{} must not be null", field.name)));
                    }
                }
                Some(v) => validate_field(field, v)?,
            }
        }
        Ok(())
    }

    /// Validate only the fields present in body (for update). Required is not enforced for missing fields.
    pub fn validate_partial(body: &Map<String, Value>, resource: &ResolvedResource) -> Result<(), AppError> {
        for (key, v) in body {
            let Some(field) = resource.field(key) else { continue };
            if v.is_null() {
                if !field.nullable {
                    return Err(AppError::Validation(format!("{} must not be null", key)));
                }
                continue;
            }
            validate_field(field, v)?;
        }
        Ok(())
    }
}

fn validate_field(field: &FieldInfo, v: &Value) -> Result<(), AppError> {
    check_type(&field.name, field.type_, v)?;
    match &field.validation {
        Some(rule) => validate_rule(&field.name, v, rule),
        None => Ok(()),
    }
}

fn check_type(col: &str, type_: FieldType, v: &Value) -> Result<(), AppError> {
    let (ok, expected) = match type_ {
        FieldType::Integer => (v.as_i64().is_some(), "an integer"),
        FieldType::Float => (v.is_number(), "a number"),
        FieldType::Text => (v.is_string(), "a string"),
        FieldType::Boolean => (v.is_boolean(), "a boolean"),
    };
    if ok {
        Ok(())
    } else {
        Err(AppError::Validation(format!("{} must be {}", col, expected)))
    }
}

fn validate_rule(col: &str, v: &Value, rule: &ValidationRule) -> Result<(), AppError> {
    if let Some(max) = rule.max_length {
        if let Some(s) = v.as_str() {
            if s.chars().count() > max as usize {
                return Err(AppError::Validation(format!(
                    "{} must be at most {} characters",
                    col, max
                )));
            }
        }
    }
    if let Some(min) = rule.min_length {
        if let Some(s) = v.as_str() {
            if s.chars().count() < min as usize {
                return Err(AppError::Validation(format!(
                    "{} must be at least {} characters",
                    col, min
                )));
            }
        }
    }
    if let Some(ref pattern) = rule.pattern {
        let re = Regex::new(pattern).map_err(|_| AppError::Validation(format!("invalid pattern for {}", col)))?;
        if let Some(s) = v.as_str() {
            if !re.is_match(s) {
                return Err(AppError::Validation(format!("{} does not match required pattern", col)));
            }
        }
    }
    if let Some(ref allowed) = rule.allowed {
        if !allowed.iter().any(|a| value_eq(v, a)) {
            return Err(AppError::Validation(format!(
                "{} must be one of: {:?}",
                col,
                allowed.iter().take(5).collect::<Vec<_>>()
            )));
        }
    }
    if let Some(min) = rule.minimum {
        if let Some(n) = v.as_f64() {
            if n < min {
                return Err(AppError::Validation(format!("{} must be at least {}", col, min)));
            }
        }
    }
    if let Some(max) = rule.maximum {
        if let Some(n) = v.as_f64() {
            if n > max {
                return Err(AppError::Validation(format!("{} must be at most {}", col, max)));
            }
        }
    }
    Ok(())
}

fn value_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(n), Value::Number(m)) => n.as_f64() == m.as_f64(),
        _ => a == b,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{resolve, FieldConfig, ResourceConfig};
    use serde_json::json;

    fn resource() -> ResolvedResource {
        let code_rule = ValidationRule {
            max_length: Some(4),
            pattern: Some("^[A-Z]+$".into()),
            ..Default::default()
        };
        let score_rule = ValidationRule {
            minimum: Some(0.0),
            maximum: Some(10.0),
            ..Default::default()
        };
        resolve(
            ResourceConfig::new("items")
                .field(FieldConfig::new("id", FieldType::Integer).not_null())
                .field(FieldConfig::new("name", FieldType::Text).not_null())
                .field(FieldConfig::new("value", FieldType::Integer))
                .field(FieldConfig::new("code", FieldType::Text).with_validation(code_rule))
                .field(FieldConfig::new("score", FieldType::Float).with_validation(score_rule))
                .field(FieldConfig::new("active", FieldType::Boolean).not_null().with_default()),
        )
        .unwrap()
    }

    fn obj(v: Value) -> Map<String, Value> {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn create_requires_non_nullable_fields() {
        let r = resource();
        assert!(RequestValidator::validate(&obj(json!({"name": "a"})), &r).is_ok());
        let err = RequestValidator::validate(&obj(json!({"value": 1})), &r).unwrap_err();
        assert_eq!(err.to_string(), "validation: name is required");
        assert!(RequestValidator::validate(&obj(json!({"name": "a", "active": null})), &r).is_err());
    }

    #[test]
    fn type_mismatch_is_rejected() {
        let r = resource();
        assert!(RequestValidator::validate(&obj(json!({"name": 5})), &r).is_err());
        assert!(RequestValidator::validate(&obj(json!({"name": "a", "value": 1.5})), &r).is_err());
        assert!(RequestValidator::validate(&obj(json!({"name": "a", "score": 3})), &r).is_ok());
        assert!(RequestValidator::validate(&obj(json!({"name": "a", "active": "yes"})), &r).is_err());
    }

    #[test]
    fn rules_apply_to_present_values() {
        let r = resource();
        assert!(RequestValidator::validate(&obj(json!({"name": "a", "code": "ABCDE"})), &r).is_err());
        assert!(RequestValidator::validate(&obj(json!({"name": "a", "code": "ab"})), &r).is_err());
        assert!(RequestValidator::validate(&obj(json!({"name": "a", "code": "AB"})), &r).is_ok());
        assert!(RequestValidator::validate(&obj(json!({"name": "a", "score": 11.0})), &r).is_err());
    }

    #[test]
    fn partial_skips_missing_and_unknown() {
        let r = resource();
        assert!(RequestValidator::validate_partial(&obj(json!({"value": 20, "other": 1})), &r).is_ok());
        assert!(RequestValidator::validate_partial(&obj(json!({"name": null})), &r).is_err());
        assert!(RequestValidator::validate_partial(&obj(json!({"value": null})), &r).is_ok());
    }
}
