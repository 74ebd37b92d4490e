//! Union classification for unions used in field position.
//!
//! A union collapses to a scalar when its members are homogeneous
//! (strings, numbers, booleans). A union of objects has to be registered
//! and declared at top level; anything else is rejected.

use crate::ast::{Literal, Node, ScalarType, Schema};
use crate::error::{CompileError, Result};
use crate::options::{CompileOptions, ScalarKey};
use crate::registry::TypeRegistry;

/// Homogeneous shape of a union's members.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnionShape {
    Strings,
    Integers,
    Floats,
    Booleans,
    Objects,
    Mixed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MemberClass {
    Str,
    Num { integer: bool },
    Bool,
    Object,
    Other,
}

fn member_class(schema: &Schema) -> MemberClass {
    match schema.node() {
        Node::Scalar(scalar) => {
            let ty = scalar.subtype();
            if ty.is_string_like() {
                MemberClass::Str
            } else {
                match ty {
                    ScalarType::Int => MemberClass::Num { integer: true },
                    ScalarType::Float => MemberClass::Num { integer: false },
                    _ => MemberClass::Bool,
                }
            }
        }
        Node::Enum { .. } => MemberClass::Str,
        Node::Literal(lit) if lit.is_number() => MemberClass::Num {
            integer: lit.is_integer(),
        },
        Node::Literal(Literal::String(_)) => MemberClass::Str,
        Node::Literal(_) => MemberClass::Bool,
        Node::Object { .. } => MemberClass::Object,
        Node::Wrapper { .. } | Node::List { .. } | Node::Union { .. } => MemberClass::Other,
    }
}

/// Short description of a member for error messages.
fn describe(schema: &Schema) -> String {
    match schema.node() {
        Node::Scalar(scalar) => scalar.subtype().as_str().to_string(),
        Node::Literal(lit) => format!("{} literal", lit.scalar_type().as_str()),
        other => other.kind_name().to_string(),
    }
}

/// Classify union members. Categories are checked in a fixed order:
/// strings, numbers, booleans, objects.
pub fn classify_union(members: &[Schema]) -> Result<UnionShape> {
    if members.is_empty() {
        return Err(CompileError::EmptyUnion);
    }
    let classes: Vec<MemberClass> = members.iter().map(member_class).collect();

    if classes.iter().all(|c| *c == MemberClass::Str) {
        return Ok(UnionShape::Strings);
    }
    if classes
        .iter()
        .all(|c| matches!(c, MemberClass::Num { .. }))
    {
        let all_int = classes
            .iter()
            .all(|c| matches!(c, MemberClass::Num { integer: true }));
        return Ok(if all_int {
            UnionShape::Integers
        } else {
            UnionShape::Floats
        });
    }
    if classes.iter().all(|c| *c == MemberClass::Bool) {
        return Ok(UnionShape::Booleans);
    }
    if classes.iter().all(|c| *c == MemberClass::Object) {
        return Ok(UnionShape::Objects);
    }
    Ok(UnionShape::Mixed)
}

/// Resolve a union occurring as a field type to its SDL type name.
pub fn resolve_union(
    schema: &Schema,
    members: &[Schema],
    registry: &TypeRegistry,
    options: &CompileOptions,
) -> Result<String> {
    if let Some(name) = registry.get(schema) {
        return Ok(name.to_string());
    }
    let key = match classify_union(members)? {
        UnionShape::Strings => ScalarKey::String,
        UnionShape::Integers => ScalarKey::Int,
        UnionShape::Floats => ScalarKey::Float,
        UnionShape::Booleans => ScalarKey::Boolean,
        UnionShape::Objects => return Err(CompileError::UnregisteredObjectUnion),
        UnionShape::Mixed => {
            let described: Vec<String> = members.iter().map(describe).collect();
            return Err(CompileError::MixedUnion {
                members: described.join(", "),
            });
        }
    };
    Ok(options.scalar_name(key).to_string())
}
