//! Load resource configs from JSON and process settings from the environment.

use crate::config::resolved::{FieldInfo, ResolvedResource};
use crate::config::types::*;
use crate::config::validate;
use crate::error::ConfigError;
use crate::query::{AllowList, FieldRegistry};
use std::path::{Path, PathBuf};

/// Build the runtime resource from its config (validates first).
pub fn resolve(config: ResourceConfig) -> Result<ResolvedResource, ConfigError> {
    validate(&config)?;

    let prefix = config
        .prefix
        .as_deref()
        .unwrap_or(&config.table)
        .trim_matches('/')
        .to_string();
    let pk_type = config
        .fields
        .iter()
        .find(|f| f.name == config.primary_key)
        .map(|f| f.type_)
        .ok_or_else(|| ConfigError::InvalidPrimaryKey {
            table: config.table.clone(),
            field: config.primary_key.clone(),
        })?;
    let registry: FieldRegistry = config.fields.iter().map(|f| (f.name.clone(), f.type_)).collect();
    let tags = config.tags.unwrap_or_else(|| vec![prefix.clone()]);

    let fields = config
        .fields
        .into_iter()
        .map(|f| FieldInfo {
            name: f.name,
            type_: f.type_,
            nullable: f.nullable,
            has_default: f.has_default,
            validation: f.validation,
        })
        .collect();

    Ok(ResolvedResource {
        table: config.table,
        prefix,
        primary_key: config.primary_key,
        pk_type,
        fields,
        registry,
        operations: config.operations.into_iter().collect(),
        tags,
        filter_allow: AllowList::from(config.filter_fields),
        sort_allow: AllowList::from(config.sort_fields),
        sensitive_fields: config.sensitive_fields.into_iter().collect(),
        max_limit: config.max_limit,
    })
}

/// Read a JSON array of resource configs.
pub async fn load_resources(path: impl AsRef<Path>) -> Result<Vec<ResourceConfig>, ConfigError> {
    let path = path.as_ref();
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| ConfigError::Load(format!("{}: {}", path.display(), e)))?;
    serde_json::from_str(&raw).map_err(|e| ConfigError::Load(format!("{}: {}", path.display(), e)))
}

pub const DEFAULT_BODY_LIMIT: usize = 1024 * 1024;

/// Process settings for a server built on this crate.
#[derive(Clone, Debug)]
pub struct ServerSettings {
    pub database_url: String,
    pub bind_addr: String,
    /// JSON file with resource configs; `None` means resources are defined in code.
    pub config_path: Option<PathBuf>,
    pub body_limit: usize,
}

impl ServerSettings {
    /// From `DATABASE_URL`, `BIND_ADDR`, `CONFIG_PATH` and `BODY_LIMIT_BYTES`,
    /// after loading a `.env` file if one exists. Variables already set win.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        let body_limit = match std::env::var("BODY_LIMIT_BYTES") {
            Ok(v) => v
                .parse()
                .map_err(|_| ConfigError::Load(format!("BODY_LIMIT_BYTES is not a number: {}", v)))?,
            Err(_) => DEFAULT_BODY_LIMIT,
        };
        Ok(ServerSettings {
            database_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://example.db?mode=rwc".into()),
            bind_addr: std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:8000".into()),
            config_path: std::env::var("CONFIG_PATH").ok().filter(|s| !s.is_empty()).map(PathBuf::from),
            body_limit,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items() -> ResourceConfig {
        ResourceConfig::new("items")
            .field(FieldConfig::new("id", FieldType::Integer).not_null())
            .field(FieldConfig::new("name", FieldType::Text))
            .field(FieldConfig::new("value", FieldType::Integer))
    }

    #[test]
    fn resolve_fills_defaults() {
        let r = resolve(items()).unwrap();
        assert_eq!(r.prefix, "items");
        assert_eq!(r.tags, vec!["items".to_string()]);
        assert_eq!(r.pk_type, FieldType::Integer);
        assert_eq!(r.registry.len(), 3);
        assert!(Operation::ALL.iter().all(|op| r.allows(*op)));
        assert!(!r.filter_allow.is_restricted());
        assert_eq!(r.member_path(), "/items/:id");
    }

    #[test]
    fn resolve_trims_prefix_and_keeps_subset() {
        let r = resolve(
            items()
                .prefix("/things/")
                .operations([Operation::List, Operation::Get])
                .filter_fields(["name"]),
        )
        .unwrap();
        assert_eq!(r.collection_path(), "/things");
        assert!(r.allows(Operation::Get));
        assert!(!r.allows(Operation::Delete));
        assert!(r.filter_allow.permits("name"));
        assert!(!r.filter_allow.permits("value"));
        assert!(r.sort_allow.permits("value"));
    }

    #[test]
    fn server_settings_read_env() {
        std::env::set_var("BODY_LIMIT_BYTES", "2048");
        std::env::set_var("BIND_ADDR", "0.0.0.0:9000");
        let settings = ServerSettings::from_env().unwrap();
        assert_eq!(settings.body_limit, 2048);
        assert_eq!(settings.bind_addr, "0.0.0.0:9000");

        std::env::set_var("BODY_LIMIT_BYTES", "lots");
        assert!(matches!(ServerSettings::from_env(), Err(ConfigError::Load(_))));

        std::env::remove_var("BODY_LIMIT_BYTES");
        std::env::remove_var("BIND_ADDR");
        assert_eq!(ServerSettings::from_env().unwrap().body_limit, DEFAULT_BODY_LIMIT);
    }

    #[tokio::test]
    async fn load_resources_reports_missing_file() {
        let err = load_resources("/nonexistent/resources.json").await.unwrap_err();
        assert!(matches!(err, ConfigError::Load(_)));
    }
}
