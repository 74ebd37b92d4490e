//! Batch compiler: compiles a named set of schemas into one SDL document
//! with cross-references resolved through an identity registry.

use indexmap::IndexMap;
use tracing::debug;

use crate::ast::{Node, Schema};
use crate::emit::emit_declaration;
use crate::error::{CompileError, Result};
use crate::options::CompileOptions;
use crate::registry::TypeRegistry;
use crate::resolve::MAX_DEPTH;

/// Compile `schemas` in input order into declarations joined by a blank line.
pub fn compile_batch(
    schemas: &IndexMap<String, Schema>,
    options: &CompileOptions,
) -> Result<String> {
    Ok(compile_declarations(schemas, options)?.join("\n\n"))
}

/// Compile `schemas` into one declaration block per entry, in input order.
///
/// The registry is assembled in full before anything is emitted, so a
/// schema may reference one declared later in the input.
pub fn compile_declarations(
    schemas: &IndexMap<String, Schema>,
    options: &CompileOptions,
) -> Result<Vec<String>> {
    debug!(
        schemas = schemas.len(),
        strict = options.strict,
        "compiling SDL batch"
    );
    let registry = build_registry(schemas, options);
    if options.strict {
        validate_references(schemas, &registry)?;
    }
    schemas
        .iter()
        .map(|(name, schema)| emit_declaration(name, schema, &registry, options))
        .collect()
}

/// Compile one schema against the registry in `options.types`.
/// No auto-registration and no strict pass.
pub fn compile_single(name: &str, schema: &Schema, options: &CompileOptions) -> Result<String> {
    emit_declaration(name, schema, &options.types, options)
}

/// Seed from `options.types`, then register every named schema. A batch
/// entry replaces a seeded name for the same instance.
pub fn build_registry(
    schemas: &IndexMap<String, Schema>,
    options: &CompileOptions,
) -> TypeRegistry {
    let mut registry = options.types.clone();
    for (name, schema) in schemas {
        registry.insert(schema, name.clone());
    }
    registry
}

/// Strict-mode check: every field of every declared object (including list
/// elements) that is an object must be registered. Only the declared
/// objects' own fields are checked, not the fields of nested objects.
pub fn validate_references(
    schemas: &IndexMap<String, Schema>,
    registry: &TypeRegistry,
) -> Result<()> {
    for (type_name, schema) in schemas {
        let Node::Object { fields } = schema.node() else {
            continue;
        };
        for (field, field_schema) in fields {
            if references_unregistered(field_schema, registry, 0)
                .map_err(|e| e.in_field(type_name, field))?
            {
                return Err(CompileError::UnresolvedReference {
                    type_name: type_name.clone(),
                    field: field.clone(),
                });
            }
        }
    }
    Ok(())
}

fn references_unregistered(
    schema: &Schema,
    registry: &TypeRegistry,
    depth: usize,
) -> Result<bool> {
    if depth > MAX_DEPTH {
        return Err(CompileError::DepthExceeded { limit: MAX_DEPTH });
    }
    let (base, _) = schema.unwrap_wrappers();
    match base.node() {
        Node::Object { .. } => Ok(!registry.contains(base)),
        Node::List { element } if !registry.contains(base) => {
            references_unregistered(element, registry, depth + 1)
        }
        _ => Ok(false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use pretty_assertions::assert_eq;

    fn batch<const N: usize>(entries: [(&str, Schema); N]) -> IndexMap<String, Schema> {
        entries
            .into_iter()
            .map(|(name, schema)| (name.to_string(), schema))
            .collect()
    }

    #[test]
    fn test_forward_reference_resolves() {
        let address = Schema::object([("city", Schema::string())]);
        let user = Schema::object([
            ("name", Schema::string()),
            ("address", address.clone().optional()),
        ]);
        let schemas = batch([("User", user), ("Address", address)]);
        let sdl = compile_batch(&schemas, &CompileOptions::default()).unwrap();
        assert_eq!(
            sdl,
            "type User {\n  name: String!\n  address: Address\n}\n\ntype Address {\n  city: String!\n}"
        );
    }

    #[test]
    fn test_strict_mode_rejects_unregistered_reference() {
        let geo = Schema::object([("lat", Schema::number())]);
        let place = Schema::object([("name", Schema::string()), ("geo", geo)]);
        let schemas = batch([("Place", place)]);

        let err = compile_batch(&schemas, &CompileOptions::new().with_strict(true)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Reference);
        assert_eq!(
            err,
            CompileError::UnresolvedReference {
                type_name: "Place".into(),
                field: "geo".into(),
            }
        );

        let sdl = compile_batch(&schemas, &CompileOptions::default()).unwrap();
        assert_eq!(sdl, "type Place {\n  name: String!\n  geo: JSON!\n}");
    }

    #[test]
    fn test_strict_mode_checks_list_elements() {
        let item = Schema::object([("sku", Schema::string())]);
        let order = Schema::object([("items", Schema::list(item.optional()).nullable())]);
        let schemas = batch([("Order", order)]);
        let err = compile_batch(&schemas, &CompileOptions::new().with_strict(true)).unwrap_err();
        assert!(matches!(
            err,
            CompileError::UnresolvedReference { ref field, .. } if field == "items"
        ));
    }

    #[test]
    fn test_strict_mode_accepts_seeded_types() {
        let item = Schema::object([("sku", Schema::string())]);
        let order = Schema::object([("items", Schema::list(item.clone()))]);
        let seed: TypeRegistry = [(item, "Item")].into_iter().collect();
        let opts = CompileOptions::new().with_strict(true).with_types(seed);
        let sdl = compile_batch(&batch([("Order", order)]), &opts).unwrap();
        assert_eq!(sdl, "type Order {\n  items: [Item!]!\n}");
    }

    #[test]
    fn test_strict_mode_is_one_level_deep() {
        let inner = Schema::object([("x", Schema::int())]);
        let wrapper = Schema::object([("inner", inner)]);
        let outer = Schema::object([("wrapper", wrapper.clone())]);
        let schemas = batch([("Outer", outer), ("Wrapper", wrapper)]);
        let err = compile_batch(&schemas, &CompileOptions::new().with_strict(true)).unwrap_err();
        assert_eq!(
            err,
            CompileError::UnresolvedReference {
                type_name: "Wrapper".into(),
                field: "inner".into(),
            }
        );
    }

    #[test]
    fn test_batch_registration_overrides_seed() {
        let address = Schema::object([("city", Schema::string())]);
        let user = Schema::object([("home", address.clone())]);
        let seed: TypeRegistry = [(address.clone(), "Location")].into_iter().collect();
        let opts = CompileOptions::new().with_types(seed);
        let sdl = compile_batch(&batch([("User", user), ("Address", address)]), &opts).unwrap();
        assert!(sdl.contains("home: Address!"));
    }

    #[test]
    fn test_union_declared_and_referenced() {
        let card = Schema::object([("last4", Schema::string())]);
        let bank = Schema::object([("iban", Schema::string())]);
        let payment = Schema::union([card.clone(), bank.clone()]);
        let order = Schema::object([("payment", payment.clone())]);
        let schemas = batch([
            ("Card", card),
            ("Bank", bank),
            ("Payment", payment),
            ("Order", order),
        ]);
        let sdl = compile_batch(&schemas, &CompileOptions::default()).unwrap();
        let expected = "\
type Card {
  last4: String!
}

type Bank {
  iban: String!
}

union Payment = Card | Bank

type Order {
  payment: Payment!
}";
        assert_eq!(sdl, expected);
    }

    #[test]
    fn test_compile_single_uses_seed_only() {
        let address = Schema::object([("city", Schema::string())]);
        let user = Schema::object([("address", address.clone())]);

        let plain = compile_single("User", &user, &CompileOptions::default()).unwrap();
        assert_eq!(plain, "type User {\n  address: JSON!\n}");

        let seed: TypeRegistry = [(address, "Address")].into_iter().collect();
        let seeded = compile_single("User", &user, &CompileOptions::new().with_types(seed)).unwrap();
        assert_eq!(seeded, "type User {\n  address: Address!\n}");
    }

    #[test]
    fn test_compile_single_ignores_strict() {
        let user = Schema::object([("meta", Schema::object([("k", Schema::string())]))]);
        let got = compile_single("User", &user, &CompileOptions::new().with_strict(true)).unwrap();
        assert_eq!(got, "type User {\n  meta: JSON!\n}");
    }

    #[test]
    fn test_empty_batch() {
        let sdl = compile_batch(&IndexMap::new(), &CompileOptions::default()).unwrap();
        assert_eq!(sdl, "");
    }

    #[test]
    fn test_error_aborts_whole_batch() {
        let good = Schema::object([("a", Schema::int())]);
        let schemas = batch([("Good", good), ("Bad", Schema::string())]);
        let err = compile_batch(&schemas, &CompileOptions::default()).unwrap_err();
        assert!(matches!(
            err,
            CompileError::IllegalTopLevel { ref name, kind: "scalar" } if name == "Bad"
        ));
    }
}
