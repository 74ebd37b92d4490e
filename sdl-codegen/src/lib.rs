//! Compiles trees of structural data-shape schemas (scalars, wrappers,
//! lists, objects, enums, literals, unions) into GraphQL-style SDL type
//! definitions.
//!
//! ```
//! use indexmap::IndexMap;
//! use sdl_codegen::{compile_batch, CompileOptions, Schema};
//!
//! let address = Schema::object([("city", Schema::string())]);
//! let user = Schema::object([
//!     ("id", Schema::uuid()),
//!     ("address", address.clone().optional()),
//! ]);
//!
//! let mut schemas = IndexMap::new();
//! schemas.insert("User".to_string(), user);
//! schemas.insert("Address".to_string(), address);
//!
//! let sdl = compile_batch(&schemas, &CompileOptions::default()).unwrap();
//! assert_eq!(
//!     sdl,
//!     "type User {\n  id: UUID!\n  address: Address\n}\n\ntype Address {\n  city: String!\n}"
//! );
//! ```
pub mod ast;
pub mod compiler;
pub mod document;
pub mod emit;
pub mod error;
pub mod options;
pub mod registry;
pub mod resolve;
pub mod union;

pub use ast::{
    Check, CheckKind, Literal, Node, ScalarBase, ScalarType, Schema, SchemaId, WrapperKind,
};
pub use compiler::{compile_batch, compile_declarations, compile_single};
pub use document::{parse_document, Document, ParseError};
pub use emit::emit_declaration;
pub use error::{CompileError, ErrorKind};
pub use options::{CompileOptions, ScalarKey, ScalarNames};
pub use registry::TypeRegistry;
pub use resolve::{resolve_base_type, resolve_field_type};
pub use union::{classify_union, UnionShape};
