//! Error types for schema loading, generation and the JSON runtime.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading or validating a schema.
///
/// Validation always runs before emission, so any of these means nothing was
/// written to the output sink.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("invalid schema: failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed document. `message` carries the JSON path of the offending node.
    #[error("invalid schema: failed to parse {origin}: {message}")]
    Parse { origin: String, message: String },

    #[error("invalid schema: JSON pointer {pointer} selects nothing in {origin}")]
    Pointer { origin: String, pointer: String },

    #[error("invalid schema: no type definitions")]
    Empty,

    #[error("invalid schema: type {0} is defined more than once")]
    DuplicateType(String),

    #[error("invalid schema: {what} {name:?} is not a usable identifier")]
    InvalidName { what: &'static str, name: String },

    #[error("invalid schema: {type_name}.{field} collides with the `type` discriminant")]
    ReservedField { type_name: String, field: String },

    #[error("invalid schema: {type_name}.{field} cannot be both constant and optional")]
    ConstantOptional { type_name: String, field: String },

    #[error("invalid schema: {type_name}.{field} is constant but has no value")]
    ConstantWithoutValue { type_name: String, field: String },

    #[error("invalid schema: {type_name}.{field} has a value but is not constant")]
    ValueWithoutConstant { type_name: String, field: String },

    #[error("invalid schema: {type_name}.{field}: {message}")]
    InvalidLiteral {
        type_name: String,
        field: String,
        message: String,
    },

    #[error("invalid schema: group {0} has the same name as a type")]
    GroupShadowsType(String),

    #[error("invalid schema: generated name {name} is derived from both {first} and {second}")]
    NameCollision {
        name: String,
        first: String,
        second: String,
    },
}

/// Errors from a full generation pass.
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("failed to write generated output: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors signalled by the JSON runtime when checking values at the trust boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuntimeError {
    #[error("unknown node type: {0}")]
    UnknownType(String),

    #[error("{type_name} has no field named {argument}")]
    UnknownArgument { type_name: String, argument: String },

    /// A constructor argument had the wrong primitive or sequence kind.
    #[error("invalid argument {type_name}.{field}: expected {expected}, got {actual}")]
    ArgumentMismatch {
        type_name: String,
        field: String,
        expected: &'static str,
        actual: &'static str,
    },

    /// A value's discriminant did not match the asserted variant.
    #[error("type mismatch: expected {expected}, got {actual}")]
    TypeMismatch { expected: String, actual: String },
}
