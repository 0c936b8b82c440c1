//! Resolved resource: config validated and flattened for runtime use.

use crate::config::{FieldType, Operation, ValidationRule};
use crate::query::{AllowList, FieldRegistry};
use serde_json::{Map, Value};
use std::collections::{BTreeSet, HashSet};

#[derive(Clone, Debug)]
pub struct FieldInfo {
    pub name: String,
    pub type_: FieldType,
    pub nullable: bool,
    pub has_default: bool,
    pub validation: Option<ValidationRule>,
}

#[derive(Clone, Debug)]
pub struct ResolvedResource {
    pub table: String,
    /// URL prefix without slashes, e.g. `items`.
    pub prefix: String,
    pub primary_key: String,
    pub pk_type: FieldType,
    pub fields: Vec<FieldInfo>,
    pub registry: FieldRegistry,
    pub operations: BTreeSet<Operation>,
    pub tags: Vec<String>,
    pub filter_allow: AllowList,
    pub sort_allow: AllowList,
    /// Field names to strip from all API responses.
    pub sensitive_fields: HashSet<String>,
    pub max_limit: Option<u64>,
}

impl ResolvedResource {
    pub fn allows(&self, op: Operation) -> bool {
        self.operations.contains(&op)
    }

    pub fn field(&self, name: &str) -> Option<&FieldInfo> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn is_primary_key(&self, name: &str) -> bool {
        self.primary_key == name
    }

    pub fn collection_path(&self) -> String {
        format!("/{}", self.prefix)
    }

    pub fn member_path(&self) -> String {
        format!("/{}/:id", self.prefix)
    }

    /// Drop sensitive fields from a row before it leaves the API.
    pub fn redact(&self, mut row: Map<String, Value>) -> Map<String, Value> {
        for name in &self.sensitive_fields {
            row.remove(name);
        }
        row
    }
}
