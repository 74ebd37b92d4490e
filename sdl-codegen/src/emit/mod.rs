//! Declaration emitter: renders one named top-level schema as an SDL
//! `type`, `enum`, or `union` block.

mod writer;

pub use writer::SdlWriter;

use tracing::debug;

use crate::ast::{Node, Schema};
use crate::error::{CompileError, Result};
use crate::options::CompileOptions;
use crate::registry::TypeRegistry;
use crate::resolve::resolve_field_type;

/// Emit the declaration for `schema` under `name`.
pub fn emit_declaration(
    name: &str,
    schema: &Schema,
    registry: &TypeRegistry,
    options: &CompileOptions,
) -> Result<String> {
    debug!(name, kind = schema.node().kind_name(), "emitting declaration");
    let mut w = SdlWriter::new();

    match schema.node() {
        Node::Object { fields } => {
            w.open(&format!("type {name}"));
            for (field, field_schema) in fields {
                let ty = resolve_field_type(field_schema, registry, options)
                    .map_err(|e| e.in_field(name, field))?;
                w.line(&format!("{field}: {ty}"));
            }
            w.close();
        }

        Node::Enum { values } => {
            w.open(&format!("enum {name}"));
            for value in values {
                if options.preserve_enum_case {
                    w.line(value);
                } else {
                    w.line(&value.to_uppercase());
                }
            }
            w.close();
        }

        Node::Union { members } => {
            if members.is_empty() {
                return Err(CompileError::EmptyUnion);
            }
            let mut names = Vec::with_capacity(members.len());
            for (index, member) in members.iter().enumerate() {
                match (member.node(), registry.get(member)) {
                    (Node::Object { .. }, Some(member_name)) => names.push(member_name),
                    (node, _) => {
                        return Err(CompileError::InvalidUnionMember {
                            union_name: name.to_string(),
                            index,
                            kind: node.kind_name(),
                        })
                    }
                }
            }
            w.line(&format!("union {name} = {}", names.join(" | ")));
        }

        node @ (Node::Scalar(_) | Node::Wrapper { .. } | Node::List { .. } | Node::Literal(_)) => {
            return Err(CompileError::IllegalTopLevel {
                name: name.to_string(),
                kind: node.kind_name(),
            });
        }
    }

    Ok(w.finish())
}
