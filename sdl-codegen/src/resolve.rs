//! Field type resolution: schema node -> SDL type reference string.

use tracing::{debug, warn};

use crate::ast::{Node, Schema};
use crate::error::{CompileError, Result};
use crate::options::{CompileOptions, ScalarKey};
use crate::registry::TypeRegistry;
use crate::union;

/// Maximum list nesting followed before giving up.
pub const MAX_DEPTH: usize = 64;

/// Resolve a field or list element to its SDL type reference, with a `!`
/// suffix unless an Optional/Nullable wrapper was crossed.
pub fn resolve_field_type(
    schema: &Schema,
    registry: &TypeRegistry,
    options: &CompileOptions,
) -> Result<String> {
    field_type_at(schema, registry, options, 0)
}

/// Resolve an unwrapped node to its base type name. Registered schemas
/// resolve to their declared name before any structural dispatch.
pub fn resolve_base_type(
    schema: &Schema,
    registry: &TypeRegistry,
    options: &CompileOptions,
) -> Result<String> {
    base_type_at(schema, registry, options, 0)
}

fn field_type_at(
    schema: &Schema,
    registry: &TypeRegistry,
    options: &CompileOptions,
    depth: usize,
) -> Result<String> {
    if depth > MAX_DEPTH {
        return Err(CompileError::DepthExceeded { limit: MAX_DEPTH });
    }
    let (base, nullable) = schema.unwrap_wrappers();
    let ty = base_type_at(base, registry, options, depth)?;
    if nullable {
        Ok(ty)
    } else {
        Ok(format!("{ty}!"))
    }
}

fn base_type_at(
    schema: &Schema,
    registry: &TypeRegistry,
    options: &CompileOptions,
    depth: usize,
) -> Result<String> {
    if let Some(name) = registry.get(schema) {
        return Ok(name.to_string());
    }

    let ty = match schema.node() {
        Node::Scalar(scalar) => options.scalar_name(scalar.subtype().into()).to_string(),
        Node::List { element } => {
            format!("[{}]", field_type_at(element, registry, options, depth + 1)?)
        }
        Node::Object { .. } => {
            debug!(schema = ?schema.id(), "unregistered object reference, using JSON fallback");
            options.scalar_name(ScalarKey::Json).to_string()
        }
        // Enums are inlined as strings at field level.
        Node::Enum { .. } => options.scalar_name(ScalarKey::String).to_string(),
        Node::Literal(lit) => options.scalar_name(lit.scalar_type().into()).to_string(),
        Node::Union { members } => union::resolve_union(schema, members, registry, options)?,
        Node::Wrapper { kind, .. } => {
            warn!(?kind, "wrapper reached base type resolution, falling back to String");
            options.scalar_name(ScalarKey::String).to_string()
        }
    };
    Ok(ty)
}
