//! Generate builders, type guards and assertions for a family of tagged-variant
//! node types from a declarative schema.
//!
//! Pipeline: [`schema`] → [`validate`] → [`lower`] (builder plans, [`ir`]) +
//! [`groups`] → [`codegen`], sequenced by [`driver`]. The same plans back the
//! JSON [`runtime`].

pub mod cli;
pub mod codegen;
pub mod driver;
pub mod error;
pub mod groups;
pub mod ir;
pub mod literal;
pub mod logging;
pub mod lower;
pub mod naming;
pub mod path_de;
pub mod runtime;
pub mod schema;
pub mod validate;

pub use error::{GenerateError, RuntimeError, SchemaError};
pub use naming::{NamingScheme, SnakeCase};
pub use schema::{FieldMeta, Schema, TypeDef, ValueKind};
