//! Logical rows and named-field access

use std::collections::HashMap;

use indexmap::IndexMap;

use super::value::Value;

/// Read access to a value by field name.
///
/// The table renderer only needs this, so any entity shape can be printed:
/// a materialized [`Record`], a plain map, or a fixed-field struct.
pub trait FieldAccess {
    /// Value of the named field, or `None` if the entity has no such field
    fn field(&self, name: &str) -> Option<Value>;
}

impl<T: FieldAccess + ?Sized> FieldAccess for &T {
    fn field(&self, name: &str) -> Option<Value> {
        (**self).field(name)
    }
}

impl FieldAccess for IndexMap<String, Value> {
    fn field(&self, name: &str) -> Option<Value> {
        self.get(name).cloned()
    }
}

impl FieldAccess for HashMap<String, Value> {
    fn field(&self, name: &str) -> Option<Value> {
        self.get(name).cloned()
    }
}

/// One logical row: column name to value, in schema order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: IndexMap<String, Value>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn into_inner(self) -> IndexMap<String, Value> {
        self.fields
    }
}

impl FieldAccess for Record {
    fn field(&self, name: &str) -> Option<Value> {
        self.fields.get(name).cloned()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl From<IndexMap<String, Value>> for Record {
    fn from(fields: IndexMap<String, Value>) -> Self {
        Self { fields }
    }
}
