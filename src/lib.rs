//! crud-router: list/get/create/update/delete routes for a single SQL table,
//! generated from a declarative resource config.

pub mod config;
pub mod error;
pub mod extractors;
pub mod guard;
pub mod handlers;
pub mod migration;
pub mod openapi;
pub mod query;
pub mod response;
pub mod routes;
pub mod service;
pub mod sql;
pub mod state;

pub use config::{
    load_resources, resolve, FieldConfig, FieldType, Operation, ResolvedResource, ResourceConfig,
    ServerSettings, ValidationRule,
};
pub use error::{AppError, ConfigError};
pub use guard::{BearerToken, Guard};
pub use migration::ensure_table;
pub use query::{build, AllowList, FieldRegistry, FieldValue, ListParams, ListQuery, Record, Window};
pub use routes::{common_routes, common_routes_with_ready, CrudRoutes};
pub use service::CrudService;
pub use state::CrudState;
