//! Compile configuration: scalar naming, the registry seed, strict mode,
//! and enum casing.

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::ast::ScalarType;
use crate::registry::TypeRegistry;

/// Keys of the scalar naming table. `Json` names the fallback used for
/// object references that are not registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScalarKey {
    String,
    Uuid,
    Datetime,
    Date,
    Int,
    Float,
    Boolean,
    Json,
}

impl ScalarKey {
    pub fn parse(s: &str) -> Option<ScalarKey> {
        match s {
            "string" => Some(ScalarKey::String),
            "uuid" => Some(ScalarKey::Uuid),
            "datetime" => Some(ScalarKey::Datetime),
            "date" => Some(ScalarKey::Date),
            "int" => Some(ScalarKey::Int),
            "float" => Some(ScalarKey::Float),
            "boolean" => Some(ScalarKey::Boolean),
            "json" => Some(ScalarKey::Json),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ScalarKey::String => "string",
            ScalarKey::Uuid => "uuid",
            ScalarKey::Datetime => "datetime",
            ScalarKey::Date => "date",
            ScalarKey::Int => "int",
            ScalarKey::Float => "float",
            ScalarKey::Boolean => "boolean",
            ScalarKey::Json => "json",
        }
    }

    /// Built-in SDL name for this key.
    pub fn default_name(&self) -> &'static str {
        match self {
            ScalarKey::String => "String",
            ScalarKey::Uuid => "UUID",
            ScalarKey::Datetime => "Datetime",
            ScalarKey::Date => "Date",
            ScalarKey::Int => "Int",
            ScalarKey::Float => "Float",
            ScalarKey::Boolean => "Boolean",
            ScalarKey::Json => "JSON",
        }
    }
}

impl From<ScalarType> for ScalarKey {
    fn from(ty: ScalarType) -> Self {
        match ty {
            ScalarType::String => ScalarKey::String,
            ScalarType::Uuid => ScalarKey::Uuid,
            ScalarType::Datetime => ScalarKey::Datetime,
            ScalarType::Date => ScalarKey::Date,
            ScalarType::Int => ScalarKey::Int,
            ScalarType::Float => ScalarKey::Float,
            ScalarType::Boolean => ScalarKey::Boolean,
        }
    }
}

/// Per-call overrides layered over the immutable default table.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct ScalarNames {
    overrides: BTreeMap<ScalarKey, String>,
}

impl ScalarNames {
    pub fn name(&self, key: ScalarKey) -> &str {
        self.overrides
            .get(&key)
            .map(String::as_str)
            .unwrap_or_else(|| key.default_name())
    }

    pub fn set(&mut self, key: ScalarKey, name: impl Into<String>) -> Option<String> {
        self.overrides.insert(key, name.into())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompileOptions {
    pub scalars: ScalarNames,
    /// Registry seed. Identities cannot be written in a config file.
    #[serde(skip)]
    pub types: TypeRegistry,
    /// Batch only: unregistered object references in declared object
    /// fields become errors instead of the JSON fallback.
    pub strict: bool,
    pub preserve_enum_case: bool,
}

impl CompileOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_scalar(mut self, key: ScalarKey, name: impl Into<String>) -> Self {
        self.scalars.set(key, name);
        self
    }

    pub fn with_types(mut self, types: TypeRegistry) -> Self {
        self.types = types;
        self
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn with_preserve_enum_case(mut self, preserve: bool) -> Self {
        self.preserve_enum_case = preserve;
        self
    }

    pub fn scalar_name(&self, key: ScalarKey) -> &str {
        self.scalars.name(key)
    }
}
