//! Identity-keyed mapping from schema instances to declared SDL type names.

use std::collections::HashMap;

use crate::ast::{Schema, SchemaId};

#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    names: HashMap<SchemaId, String>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `schema` under `name`. An existing entry for the same
    /// instance is replaced and returned.
    pub fn insert(&mut self, schema: &Schema, name: impl Into<String>) -> Option<String> {
        self.names.insert(schema.id(), name.into())
    }

    pub fn get(&self, schema: &Schema) -> Option<&str> {
        self.names.get(&schema.id()).map(String::as_str)
    }

    pub fn contains(&self, schema: &Schema) -> bool {
        self.names.contains_key(&schema.id())
    }

    /// Merge `other` into `self`; entries in `other` win.
    pub fn merge(&mut self, other: &TypeRegistry) {
        self.names
            .extend(other.names.iter().map(|(id, name)| (*id, name.clone())));
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl<S: Into<String>> Extend<(Schema, S)> for TypeRegistry {
    fn extend<I: IntoIterator<Item = (Schema, S)>>(&mut self, iter: I) {
        for (schema, name) in iter {
            self.insert(&schema, name);
        }
    }
}

impl<S: Into<String>> FromIterator<(Schema, S)> for TypeRegistry {
    fn from_iter<I: IntoIterator<Item = (Schema, S)>>(iter: I) -> Self {
        let mut registry = TypeRegistry::new();
        registry.extend(iter);
        registry
    }
}
