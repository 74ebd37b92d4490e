//! Schema document loader: reads a JSON document of named schemas into
//! shared `Schema` instances.
//!
//! ```json
//! {
//!   "schemas": { "User": {"object": {"id": {"type": "string", "checks": ["uuid"]}}} },
//!   "definitions": { "Money": {"object": {"amount": {"type": "number"}}} }
//! }
//! ```
//!
//! `{"ref": "Name"}` resolves to the very instance built for `Name`, so a
//! referenced schema is recognized by the registry as the same type.

use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::ast::{Check, Literal, ScalarBase, Schema, WrapperKind};
use crate::registry::TypeRegistry;

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("document must be a JSON object")]
    DocumentNotObject,
    #[error("'{0}' must be a JSON object of named schemas")]
    SectionNotObject(&'static str),
    #[error("schema '{0}' is defined more than once")]
    DuplicateName(String),
    #[error("schema must be a JSON object")]
    NotAnObject,
    #[error("schema has no recognized form")]
    MissingForm,
    #[error("schema has multiple forms: {0:?}")]
    MultipleForms(Vec<String>),
    #[error("type must be a string")]
    TypeNotString,
    #[error("unknown scalar type: '{0}'")]
    UnknownType(String),
    #[error("checks must be an array")]
    ChecksNotArray,
    #[error("unknown check: {0}")]
    UnknownCheck(String),
    #[error("checks are only allowed on the type form")]
    ChecksWithoutType,
    #[error("object form must map field names to schemas")]
    InvalidObject,
    #[error("list form must hold a single element schema")]
    InvalidList,
    #[error("enum must be a non-empty array of strings")]
    InvalidEnum,
    #[error("enum contains duplicate values")]
    EnumDuplicates,
    #[error("literal must be a string, number, or boolean")]
    InvalidLiteral,
    #[error("union must be an array of schemas")]
    InvalidUnion,
    #[error("ref must be a string")]
    RefNotString,
    #[error("ref '{0}' not found in schemas or definitions")]
    RefNotFound(String),
    #[error("ref cycle through '{0}'")]
    CyclicRef(String),
    #[error("schema '{name}' is a bare ref to declared schema '{target}'")]
    AliasedSchema { name: String, target: String },
    #[error("in '{name}': {cause}")]
    InSchema { name: String, cause: Box<ParseError> },
}

/// A parsed document. `schemas` are declared, in document order;
/// `definitions` can only be referenced.
#[derive(Debug, Clone, Default)]
pub struct Document {
    pub schemas: IndexMap<String, Schema>,
    pub definitions: IndexMap<String, Schema>,
}

impl Document {
    /// Registry naming every declared schema.
    pub fn registry(&self) -> TypeRegistry {
        self.schemas
            .iter()
            .map(|(name, schema)| (schema.clone(), name.clone()))
            .collect()
    }
}

const FORMS: [&str; 10] = [
    "type", "optional", "nullable", "default", "list", "object", "enum", "literal", "union", "ref",
];

/// Parse a schema document from a JSON value.
pub fn parse_document(doc: &Value) -> Result<Document, ParseError> {
    let obj = doc.as_object().ok_or(ParseError::DocumentNotObject)?;
    let schemas = section(obj, "schemas")?;
    let definitions = section(obj, "definitions")?;

    let mut sources: HashMap<&str, &Value> = HashMap::new();
    let entries = schemas
        .into_iter()
        .flatten()
        .chain(definitions.into_iter().flatten());
    for (name, json) in entries {
        if sources.insert(name.as_str(), json).is_some() {
            return Err(ParseError::DuplicateName(name.clone()));
        }
    }

    let mut builder = Builder {
        sources,
        built: HashMap::new(),
        in_progress: HashSet::new(),
    };

    let mut document = Document::default();
    for name in schemas.into_iter().flat_map(Map::keys) {
        let schema = builder.named(name)?;
        if let Some((target, _)) = document
            .schemas
            .iter()
            .find(|(_, declared)| declared.same_instance(&schema))
        {
            return Err(ParseError::AliasedSchema {
                name: name.clone(),
                target: target.clone(),
            });
        }
        document.schemas.insert(name.clone(), schema);
    }
    for name in definitions.into_iter().flat_map(Map::keys) {
        let schema = builder.named(name)?;
        document.definitions.insert(name.clone(), schema);
    }
    Ok(document)
}

fn section<'a>(
    obj: &'a Map<String, Value>,
    key: &'static str,
) -> Result<Option<&'a Map<String, Value>>, ParseError> {
    match obj.get(key) {
        None => Ok(None),
        Some(v) => v
            .as_object()
            .map(Some)
            .ok_or(ParseError::SectionNotObject(key)),
    }
}

struct Builder<'a> {
    sources: HashMap<&'a str, &'a Value>,
    built: HashMap<&'a str, Schema>,
    in_progress: HashSet<&'a str>,
}

impl<'a> Builder<'a> {
    /// Build (or reuse) the schema for a named entry.
    fn named(&mut self, name: &'a str) -> Result<Schema, ParseError> {
        if let Some(schema) = self.built.get(name) {
            return Ok(schema.clone());
        }
        if !self.in_progress.insert(name) {
            return Err(ParseError::CyclicRef(name.to_string()));
        }
        let json = *self
            .sources
            .get(name)
            .ok_or_else(|| ParseError::RefNotFound(name.to_string()))?;
        let schema = self.node(json).map_err(|e| match e {
            e @ (ParseError::CyclicRef(_) | ParseError::InSchema { .. }) => e,
            e => ParseError::InSchema {
                name: name.to_string(),
                cause: Box::new(e),
            },
        })?;
        self.in_progress.remove(name);
        self.built.insert(name, schema.clone());
        Ok(schema)
    }

    fn node(&mut self, json: &'a Value) -> Result<Schema, ParseError> {
        let obj = json.as_object().ok_or(ParseError::NotAnObject)?;

        let forms: Vec<&str> = FORMS
            .iter()
            .copied()
            .filter(|f| obj.contains_key(*f))
            .collect();
        if forms.len() > 1 {
            return Err(ParseError::MultipleForms(
                forms.iter().map(|s| s.to_string()).collect(),
            ));
        }
        let form = forms.first().copied().ok_or(ParseError::MissingForm)?;
        if form != "type" && obj.contains_key("checks") {
            return Err(ParseError::ChecksWithoutType);
        }
        let value = &obj[form];

        match form {
            "type" => scalar(obj),
            "optional" => Ok(self.node(value)?.wrap(WrapperKind::Optional)),
            "nullable" => Ok(self.node(value)?.wrap(WrapperKind::Nullable)),
            "default" => Ok(self.node(value)?.wrap(WrapperKind::Default)),
            "list" => {
                if !value.is_object() {
                    return Err(ParseError::InvalidList);
                }
                Ok(Schema::list(self.node(value)?))
            }
            "object" => {
                let fields = value.as_object().ok_or(ParseError::InvalidObject)?;
                let mut built = Vec::with_capacity(fields.len());
                for (key, field) in fields {
                    built.push((key.clone(), self.node(field)?));
                }
                Ok(Schema::object(built))
            }
            "enum" => enumeration(value),
            "literal" => literal(value),
            "union" => {
                let members = value.as_array().ok_or(ParseError::InvalidUnion)?;
                let mut built = Vec::with_capacity(members.len());
                for member in members {
                    built.push(self.node(member)?);
                }
                Ok(Schema::union(built))
            }
            "ref" => {
                let name = value.as_str().ok_or(ParseError::RefNotString)?;
                self.named(name)
            }
            _ => unreachable!(),
        }
    }
}

fn scalar(obj: &Map<String, Value>) -> Result<Schema, ParseError> {
    let type_str = obj
        .get("type")
        .and_then(|v| v.as_str())
        .ok_or(ParseError::TypeNotString)?;
    let base =
        ScalarBase::parse(type_str).ok_or_else(|| ParseError::UnknownType(type_str.into()))?;

    let mut checks = Vec::new();
    if let Some(raw) = obj.get("checks") {
        let arr = raw.as_array().ok_or(ParseError::ChecksNotArray)?;
        for c in arr {
            checks.push(check(c)?);
        }
    }
    Ok(Schema::scalar(base, checks))
}

/// A check is either a bare name (`"uuid"`) or a single-key object
/// carrying its argument (`{"minLength": 3}`).
fn check(json: &Value) -> Result<Check, ParseError> {
    let unknown = || ParseError::UnknownCheck(json.to_string());
    if let Some(name) = json.as_str() {
        return Check::parse(name).ok_or_else(unknown);
    }
    let obj = json.as_object().ok_or_else(unknown)?;
    if obj.len() != 1 {
        return Err(unknown());
    }
    let (key, arg) = obj.iter().next().ok_or_else(unknown)?;
    match key.as_str() {
        "minLength" => arg.as_u64().map(Check::MinLength).ok_or_else(unknown),
        "maxLength" => arg.as_u64().map(Check::MaxLength).ok_or_else(unknown),
        "min" => arg.as_f64().map(Check::Min).ok_or_else(unknown),
        "max" => arg.as_f64().map(Check::Max).ok_or_else(unknown),
        _ => Err(unknown()),
    }
}

fn enumeration(json: &Value) -> Result<Schema, ParseError> {
    let arr = json.as_array().ok_or(ParseError::InvalidEnum)?;
    if arr.is_empty() {
        return Err(ParseError::InvalidEnum);
    }
    let mut values = Vec::new();
    let mut seen = HashSet::new();
    for v in arr {
        let s = v.as_str().ok_or(ParseError::InvalidEnum)?;
        if !seen.insert(s) {
            return Err(ParseError::EnumDuplicates);
        }
        values.push(s.to_string());
    }
    Ok(Schema::enumeration(values))
}

fn literal(json: &Value) -> Result<Schema, ParseError> {
    let lit = match json {
        Value::String(s) => Literal::String(s.clone()),
        Value::Bool(b) => Literal::Boolean(*b),
        Value::Number(n) => match n.as_i64() {
            Some(i) => Literal::Int(i),
            None => Literal::Float(n.as_f64().ok_or(ParseError::InvalidLiteral)?),
        },
        _ => return Err(ParseError::InvalidLiteral),
    };
    Ok(Schema::literal(lit))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Node, ScalarType};
    use serde_json::json;

    #[test]
    fn test_parse_empty_document() {
        let doc = parse_document(&json!({})).unwrap();
        assert!(doc.schemas.is_empty());
        assert!(doc.definitions.is_empty());
    }

    #[test]
    fn test_parse_scalar_with_checks() {
        let doc = parse_document(&json!({
            "schemas": {"Id": {"type": "string", "checks": ["uuid", {"minLength": 36}]}}
        }))
        .unwrap();
        match doc.schemas["Id"].node() {
            Node::Scalar(s) => {
                assert_eq!(s.subtype(), ScalarType::Uuid);
                assert_eq!(s.checks, vec![Check::Uuid, Check::MinLength(36)]);
            }
            other => panic!("expected scalar, got {other:?}"),
        }
    }

    #[test]
    fn test_document_order_is_preserved() {
        let doc = parse_document(&json!({
            "schemas": {
                "Zed": {"enum": ["a"]},
                "Alpha": {"object": {"b": {"type": "boolean"}, "a": {"type": "number"}}}
            }
        }))
        .unwrap();
        let names: Vec<&str> = doc.schemas.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["Zed", "Alpha"]);
        match doc.schemas["Alpha"].node() {
            Node::Object { fields } => {
                let keys: Vec<&str> = fields.keys().map(String::as_str).collect();
                assert_eq!(keys, vec!["b", "a"]);
            }
            other => panic!("expected object, got {other:?}"),
        }
    }

    #[test]
    fn test_ref_shares_instance() {
        let doc = parse_document(&json!({
            "schemas": {
                "User": {"object": {"address": {"ref": "Address"}}},
                "Address": {"object": {"city": {"type": "string"}}}
            }
        }))
        .unwrap();
        let address = &doc.schemas["Address"];
        match doc.schemas["User"].node() {
            Node::Object { fields } => assert!(fields["address"].same_instance(address)),
            other => panic!("expected object, got {other:?}"),
        }
        assert_eq!(doc.registry().get(address), Some("Address"));
    }

    #[test]
    fn test_ref_to_definition() {
        let doc = parse_document(&json!({
            "schemas": {"Order": {"object": {"total": {"ref": "Money"}}}},
            "definitions": {"Money": {"object": {"amount": {"type": "number"}}}}
        }))
        .unwrap();
        assert_eq!(doc.definitions.len(), 1);
        assert!(doc.registry().get(&doc.definitions["Money"]).is_none());
    }

    #[test]
    fn test_wrappers_and_literals() {
        let doc = parse_document(&json!({
            "schemas": {"T": {"object": {
                "a": {"optional": {"nullable": {"default": {"literal": 2.5}}}},
                "b": {"list": {"literal": 7}}
            }}}
        }))
        .unwrap();
        let Node::Object { fields } = doc.schemas["T"].node() else {
            panic!("expected object");
        };
        let (inner, nullable) = fields["a"].unwrap_wrappers();
        assert!(nullable);
        assert!(matches!(inner.node(), Node::Literal(Literal::Float(f)) if *f == 2.5));
        let Node::List { element } = fields["b"].node() else {
            panic!("expected list");
        };
        assert!(matches!(element.node(), Node::Literal(Literal::Int(7))));
    }

    #[test]
    fn test_reject_cyclic_ref() {
        let err = parse_document(&json!({
            "schemas": {
                "A": {"object": {"b": {"ref": "B"}}},
                "B": {"object": {"a": {"ref": "A"}}}
            }
        }))
        .unwrap_err();
        assert!(matches!(err, ParseError::CyclicRef(_)));
    }

    #[test]
    fn test_reject_self_ref() {
        let err = parse_document(&json!({
            "schemas": {"Node": {"object": {"next": {"optional": {"ref": "Node"}}}}}
        }))
        .unwrap_err();
        assert!(matches!(err, ParseError::CyclicRef(name) if name == "Node"));
    }

    #[test]
    fn test_reject_unknown_ref() {
        let err = parse_document(&json!({
            "schemas": {"A": {"object": {"b": {"ref": "Missing"}}}}
        }))
        .unwrap_err();
        assert!(err.to_string().contains("'Missing'"));
        assert!(err.to_string().starts_with("in 'A'"));
    }

    #[test]
    fn test_reject_multiple_forms() {
        let err = parse_document(&json!({
            "schemas": {"A": {"type": "string", "enum": ["a"]}}
        }))
        .unwrap_err();
        assert!(matches!(
            err,
            ParseError::InSchema { ref cause, .. } if matches!(**cause, ParseError::MultipleForms(_))
        ));
    }

    #[test]
    fn test_reject_bad_inputs() {
        for bad in [
            json!({"schemas": {"A": {}}}),
            json!({"schemas": {"A": {"type": "bigint"}}}),
            json!({"schemas": {"A": {"type": "string", "checks": ["cuid"]}}}),
            json!({"schemas": {"A": {"enum": []}}}),
            json!({"schemas": {"A": {"enum": ["a", "a"]}}}),
            json!({"schemas": {"A": {"literal": null}}}),
            json!({"schemas": {"A": {"union": {}}}}),
            json!({"schemas": {"A": {"list": [{"type": "string"}]}}}),
            json!({"schemas": {"A": {"enum": ["a"], "checks": ["uuid"]}}}),
            json!({"schemas": []}),
            json!([]),
        ] {
            assert!(parse_document(&bad).is_err(), "expected error for {bad}");
        }
    }

    #[test]
    fn test_reject_duplicate_names() {
        let err = parse_document(&json!({
            "schemas": {"A": {"enum": ["x"]}},
            "definitions": {"A": {"enum": ["y"]}}
        }))
        .unwrap_err();
        assert!(matches!(err, ParseError::DuplicateName(name) if name == "A"));
    }

    #[test]
    fn test_reject_aliased_schema() {
        for doc in [
            json!({"schemas": {
                "Post": {"object": {"author": {"ref": "User"}}},
                "User": {"object": {"name": {"type": "string"}}},
                "Admin": {"ref": "User"}
            }}),
            json!({"schemas": {
                "Admin": {"ref": "User"},
                "User": {"object": {"name": {"type": "string"}}}
            }}),
        ] {
            let err = parse_document(&doc).unwrap_err();
            match err {
                ParseError::AliasedSchema { name, target } => {
                    let mut pair = [name, target];
                    pair.sort();
                    assert_eq!(pair, ["Admin".to_string(), "User".to_string()]);
                }
                other => panic!("expected aliased schema error, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_top_level_ref_to_definition() {
        let doc = parse_document(&json!({
            "schemas": {"Money": {"ref": "Amount"}},
            "definitions": {"Amount": {"object": {"value": {"type": "number"}}}}
        }))
        .unwrap();
        assert!(doc.schemas["Money"].same_instance(&doc.definitions["Amount"]));
        assert_eq!(doc.registry().get(&doc.definitions["Amount"]), Some("Money"));
    }
}
