//! Field access by name over a closed set of known fields.

use crate::config::FieldType;
use crate::query::FieldValue;
use serde_json::{Map, Value};
use std::collections::HashMap;

/// A record whose fields can be read by name.
///
/// Typed structs implement this with a `match` over their field names; JSON
/// rows returned by the datastore get it for free.
pub trait Record {
    fn field(&self, name: &str) -> Option<FieldValue>;
}

impl Record for Map<String, Value> {
    fn field(&self, name: &str) -> Option<FieldValue> {
        self.get(name).map(FieldValue::from_json)
    }
}

impl Record for Value {
    fn field(&self, name: &str) -> Option<FieldValue> {
        match self {
            Value::Object(map) => map.field(name),
            _ => None,
        }
    }
}

impl<R: Record + ?Sized> Record for &R {
    fn field(&self, name: &str) -> Option<FieldValue> {
        (**self).field(name)
    }
}

/// Closed registry of an entity's field names and their declared types, in declaration order.
#[derive(Clone, Debug, Default)]
pub struct FieldRegistry {
    fields: Vec<(String, FieldType)>,
    index: HashMap<String, usize>,
}

impl FieldRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, type_: FieldType) -> Self {
        self.insert(name, type_);
        self
    }

    /// Registers a field; re-registering a name replaces its type.
    pub fn insert(&mut self, name: impl Into<String>, type_: FieldType) {
        let name = name.into();
        match self.index.get(&name) {
            Some(&i) => self.fields[i].1 = type_,
            None => {
                self.index.insert(name.clone(), self.fields.len());
                self.fields.push((name, type_));
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<FieldType> {
        self.index.get(name).map(|&i| self.fields[i].1)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, FieldType)> {
        self.fields.iter().map(|(n, t)| (n.as_str(), *t))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, FieldType)> for FieldRegistry {
    fn from_iter<I: IntoIterator<Item = (S, FieldType)>>(iter: I) -> Self {
        let mut registry = FieldRegistry::new();
        for (name, type_) in iter {
            registry.insert(name, type_);
        }
        registry
    }
}
