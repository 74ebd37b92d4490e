//! Compile errors. Every error aborts the current compile call.

/// Broad category of a compile error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The schema shape cannot be expressed in SDL.
    Structural,
    /// Strict mode: a declared field references an unregistered object.
    Reference,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CompileError {
    #[error(
        "schema '{name}' is a {kind}; only object, enum, and union schemas can be declared at top level"
    )]
    IllegalTopLevel { name: String, kind: &'static str },
    #[error(
        "union contains mixed types ({members}); a union must be all strings, all numbers, all booleans, or objects registered with type names"
    )]
    MixedUnion { members: String },
    #[error("a union of objects used as a field type must be registered with a type name")]
    UnregisteredObjectUnion,
    #[error(
        "union '{union_name}' member {index} ({kind}) must be an object schema registered with a type name"
    )]
    InvalidUnionMember {
        union_name: String,
        index: usize,
        kind: &'static str,
    },
    #[error("union has no members")]
    EmptyUnion,
    #[error("schema nesting exceeds {limit} levels")]
    DepthExceeded { limit: usize },
    #[error(
        "field '{field}' on type '{type_name}' references an object schema that is not registered; register it with a type name or disable strict mode"
    )]
    UnresolvedReference { type_name: String, field: String },
    #[error("{type_name}.{field}: {cause}")]
    InField {
        type_name: String,
        field: String,
        cause: Box<CompileError>,
    },
}

impl CompileError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CompileError::UnresolvedReference { .. } => ErrorKind::Reference,
            CompileError::InField { cause, .. } => cause.kind(),
            _ => ErrorKind::Structural,
        }
    }

    /// Attach the declaring type and field to an error raised while
    /// resolving that field.
    pub fn in_field(self, type_name: &str, field: &str) -> Self {
        CompileError::InField {
            type_name: type_name.to_string(),
            field: field.to_string(),
            cause: Box::new(self),
        }
    }

    /// The error beneath any field context.
    pub fn root_cause(&self) -> &CompileError {
        match self {
            CompileError::InField { cause, .. } => cause.root_cause(),
            other => other,
        }
    }
}

pub type Result<T> = std::result::Result<T, CompileError>;
