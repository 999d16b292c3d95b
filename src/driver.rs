//! One full generation pass: validate, aggregate groups, render, write once.

use std::io::Write;

use crate::codegen::Codegen;
use crate::error::{GenerateError, SchemaError};
use crate::groups::GroupIndex;
use crate::naming::NamingScheme;
use crate::schema::Schema;

/// Render the whole artifact in memory. Nothing is produced for an invalid schema.
pub fn generate_to_string(schema: &Schema, naming: &dyn NamingScheme) -> Result<String, SchemaError> {
    crate::validate::validate(schema, naming)?;
    let groups = GroupIndex::from_schema(schema);
    tracing::info!(types = schema.len(), groups = groups.len(), "generating node utilities");

    let mut cg = Codegen::new(naming);
    cg.emit(schema, &groups)?;
    Ok(cg.into_string())
}

/// Generate and hand the result to `sink` in a single write.
pub fn generate<W: Write + ?Sized>(
    schema: &Schema,
    naming: &dyn NamingScheme,
    sink: &mut W,
) -> Result<(), GenerateError> {
    let src = generate_to_string(schema, naming)?;
    sink.write_all(src.as_bytes())?;
    sink.flush()?;
    tracing::debug!(bytes = src.len(), "generated output written");
    Ok(())
}

/// The reflection map alone, as JSON.
pub fn reflect(schema: &Schema, naming: &dyn NamingScheme) -> Result<serde_json::Value, SchemaError> {
    crate::validate::validate(schema, naming)?;
    Ok(GroupIndex::from_schema(schema).to_json())
}
