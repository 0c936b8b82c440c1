//! Config validation: field set integrity and primary key.

use crate::config::ResourceConfig;
use crate::error::ConfigError;
use regex::Regex;
use std::collections::HashSet;

pub fn validate(config: &ResourceConfig) -> Result<(), ConfigError> {
    if config.table.trim().is_empty() {
        return Err(ConfigError::Validation("table name must not be empty".into()));
    }
    if let Some(prefix) = &config.prefix {
        if prefix.trim_matches('/').is_empty() {
            return Err(ConfigError::Validation(format!(
                "prefix for table {} must not be empty",
                config.table
            )));
        }
    }

    let mut names = HashSet::new();
    for f in &config.fields {
        if f.name.is_empty() {
            return Err(ConfigError::Validation(format!(
                "table {} has a field without a name",
                config.table
            )));
        }
        if !names.insert(f.name.as_str()) {
            return Err(ConfigError::DuplicateField(f.name.clone()));
        }
        if let Some(pattern) = f.validation.as_ref().and_then(|r| r.pattern.as_deref()) {
            Regex::new(pattern).map_err(|e| {
                ConfigError::Validation(format!("invalid pattern for {}: {}", f.name, e))
            })?;
        }
    }

    if !names.contains(config.primary_key.as_str()) {
        return Err(ConfigError::InvalidPrimaryKey {
            table: config.table.clone(),
            field: config.primary_key.clone(),
        });
    }

    let mut ops = HashSet::new();
    for op in &config.operations {
        if !ops.insert(*op) {
            return Err(ConfigError::Validation(format!("operation listed twice: {}", op)));
        }
    }

    for name in &config.sensitive_fields {
        if !names.contains(name.as_str()) {
            return Err(ConfigError::MissingReference {
                kind: "sensitive field",
                name: name.clone(),
            });
        }
    }

    Ok(())
}
