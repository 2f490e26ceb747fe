//! Schema model loading and relationship graph construction
//!
//! This crate handles:
//! - Parsing schema documents (tables, typed fields, relationship fields)
//! - Rejecting structurally malformed schemas at load time
//! - Building the directed relationship graph the analyses run over

pub mod schema;
pub mod graph;

pub use schema::{Field, FieldKind, Relationship, Schema, SchemaError, Table};
pub use graph::{Edge, RelationshipGraph};
