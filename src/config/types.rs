//! Raw resource config types, deserialized from JSON or built in code.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Primitive field type. Drives the SQL column type, body checks and row decoding.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    #[serde(alias = "int", alias = "bigint")]
    Integer,
    #[serde(alias = "real", alias = "double")]
    Float,
    #[serde(alias = "string")]
    Text,
    #[serde(alias = "bool")]
    Boolean,
}

impl FieldType {
    /// SQLite column type used for table bootstrap.
    pub fn sql_type(self) -> &'static str {
        match self {
            FieldType::Integer => "INTEGER",
            FieldType::Float => "REAL",
            FieldType::Text => "TEXT",
            FieldType::Boolean => "BOOLEAN",
        }
    }
}

/// One of the five generated operations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    List,
    Get,
    Create,
    Update,
    Delete,
}

impl Operation {
    pub const ALL: [Operation; 5] = [
        Operation::List,
        Operation::Get,
        Operation::Create,
        Operation::Update,
        Operation::Delete,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Operation::List => "list",
            Operation::Get => "get",
            Operation::Create => "create",
            Operation::Update => "update",
            Operation::Delete => "delete",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ValidationRule {
    #[serde(default)]
    pub required: Option<bool>,
    #[serde(default)]
    pub max_length: Option<u32>,
    #[serde(default)]
    pub min_length: Option<u32>,
    #[serde(default)]
    pub pattern: Option<String>,
    #[serde(default)]
    pub allowed: Option<Vec<serde_json::Value>>,
    #[serde(default)]
    pub minimum: Option<f64>,
    #[serde(default)]
    pub maximum: Option<f64>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FieldConfig {
    pub name: String,
    #[serde(rename = "type")]
    pub type_: FieldType,
    #[serde(default = "default_true")]
    pub nullable: bool,
    /// Whether the column has a DB default, so create may omit it.
    #[serde(default)]
    pub has_default: bool,
    #[serde(default)]
    pub validation: Option<ValidationRule>,
}

impl FieldConfig {
    pub fn new(name: impl Into<String>, type_: FieldType) -> Self {
        FieldConfig {
            name: name.into(),
            type_,
            nullable: true,
            has_default: false,
            validation: None,
        }
    }

    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    pub fn with_default(mut self) -> Self {
        self.has_default = true;
        self
    }

    pub fn with_validation(mut self, rule: ValidationRule) -> Self {
        self.validation = Some(rule);
        self
    }
}

fn default_true() -> bool {
    true
}

fn default_primary_key() -> String {
    "id".to_string()
}

fn default_operations() -> Vec<Operation> {
    Operation::ALL.to_vec()
}

/// Registration-time description of one table exposed as CRUD routes.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ResourceConfig {
    pub table: String,
    /// URL prefix; defaults to the table name.
    #[serde(default)]
    pub prefix: Option<String>,
    #[serde(default = "default_primary_key")]
    pub primary_key: String,
    pub fields: Vec<FieldConfig>,
    #[serde(default = "default_operations")]
    pub operations: Vec<Operation>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    /// When set, only these fields may be filtered on.
    #[serde(default)]
    pub filter_fields: Option<Vec<String>>,
    /// When set, only these fields may be sorted on.
    #[serde(default)]
    pub sort_fields: Option<Vec<String>>,
    /// Field names that must never be exposed in API responses.
    #[serde(default)]
    pub sensitive_fields: Vec<String>,
    #[serde(default)]
    pub max_limit: Option<u64>,
}

impl ResourceConfig {
    pub fn new(table: impl Into<String>) -> Self {
        ResourceConfig {
            table: table.into(),
            prefix: None,
            primary_key: default_primary_key(),
            fields: Vec::new(),
            operations: default_operations(),
            tags: None,
            filter_fields: None,
            sort_fields: None,
            sensitive_fields: Vec::new(),
            max_limit: None,
        }
    }

    pub fn field(mut self, field: FieldConfig) -> Self {
        self.fields.push(field);
        self
    }

    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    pub fn primary_key(mut self, name: impl Into<String>) -> Self {
        self.primary_key = name.into();
        self
    }

    pub fn operations(mut self, ops: impl IntoIterator<Item = Operation>) -> Self {
        self.operations = ops.into_iter().collect();
        self
    }

    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = Some(tags.into_iter().map(Into::into).collect());
        self
    }

    pub fn filter_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.filter_fields = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    pub fn sort_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sort_fields = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    pub fn sensitive_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sensitive_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn max_limit(mut self, limit: u64) -> Self {
        self.max_limit = Some(limit);
        self
    }
}
