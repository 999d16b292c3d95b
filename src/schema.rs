//! Schema model: an ordered set of tagged-variant type definitions.
//!
//! A schema document is a JSON object keyed by type name:
//!
//! ```json
//! {
//!   "NumberLiteral": {
//!     "unionType": ["Expression"],
//!     "fields": {
//!       "value": { "type": "number" },
//!       "raw": { "type": "string", "optional": true }
//!     }
//!   }
//! }
//! ```
//!
//! Declaration order is significant everywhere (types, fields, group tags), so
//! every map here is an `IndexMap`.

use std::collections::HashSet;
use std::path::Path;

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;

use crate::error::SchemaError;

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// Semantic kind of a field's value (of each element, for array fields).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum ValueKind {
    #[serde(rename = "string")]
    String,
    #[serde(rename = "number")]
    Number,
    #[serde(rename = "boolean")]
    Boolean,
    /// Structured string-keyed mapping.
    #[serde(rename = "object", alias = "Object")]
    Object,
    /// Another variant, or a union of variants.
    #[serde(rename = "node", alias = "node-reference")]
    Node,
    /// Unspecified; carried through untouched.
    #[default]
    #[serde(rename = "any", alias = "opaque")]
    Any,
}

/// Declared properties of one field.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldMeta {
    /// Taken from the key in the owning `fields` map.
    #[serde(skip)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: ValueKind,
    #[serde(default)]
    pub array: bool,
    #[serde(default)]
    pub optional: bool,
    #[serde(default, alias = "maybe")]
    pub nullable: bool,
    #[serde(default)]
    pub constant: bool,
    /// The fixed value of a constant field.
    #[serde(default)]
    pub value: Option<Value>,
    /// Literal used when the caller omits the argument. `null` means no default.
    #[serde(default)]
    pub default: Option<Value>,
}

/// One tagged-variant shape.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct TypeDef {
    /// Taken from the key in the schema document.
    #[serde(skip)]
    pub name: String,
    #[serde(default, alias = "flowTypeName")]
    pub display_type_name: Option<String>,
    #[serde(default)]
    pub fields: IndexMap<String, FieldMeta>,
    #[serde(default, rename = "unionType", alias = "groupTags")]
    pub group_tags: Vec<String>,
}

/// The complete, ordered collection of type definitions for one generation pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schema {
    definitions: Vec<TypeDef>,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl ValueKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Object => "object",
            Self::Node => "node",
            Self::Any => "any",
        }
    }

    /// Kinds whose runtime representation can be checked without looking inside.
    pub fn is_primitive(&self) -> bool {
        matches!(self, Self::String | Self::Number | Self::Boolean)
    }
}

impl std::fmt::Display for ValueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FieldMeta {
    pub fn new(name: impl Into<String>, kind: ValueKind) -> Self {
        Self { name: name.into(), kind, ..Self::default() }
    }
    pub fn array(mut self) -> Self {
        self.array = true;
        self
    }
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }
    pub fn constant(mut self, value: Value) -> Self {
        self.constant = true;
        self.value = Some(value);
        self
    }
    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }

    /// Neither optional nor constant: always supplied by the caller.
    pub fn is_required(&self) -> bool {
        !self.optional && !self.constant
    }

    /// Whether the caller may pass null/absent without triggering validation.
    pub fn may_be_absent(&self) -> bool {
        self.optional || self.nullable
    }
}

impl TypeDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), ..Self::default() }
    }
    pub fn field(mut self, field: FieldMeta) -> Self {
        self.fields.insert(field.name.clone(), field);
        self
    }
    pub fn group(mut self, tag: impl Into<String>) -> Self {
        self.group_tags.push(tag.into());
        self
    }
    pub fn display_as(mut self, display_type_name: impl Into<String>) -> Self {
        self.display_type_name = Some(display_type_name.into());
        self
    }

    /// Label used for the variant's payload in generated signatures.
    pub fn display_name(&self) -> &str {
        self.display_type_name.as_deref().unwrap_or(&self.name)
    }

    /// Fields that become constructor parameters, in declaration order.
    pub fn non_constant_fields(&self) -> impl Iterator<Item = &FieldMeta> {
        self.fields.values().filter(|field| !field.constant)
    }
}

impl Schema {
    pub fn new(definitions: Vec<TypeDef>) -> Result<Self, SchemaError> {
        let mut seen = HashSet::new();
        for def in &definitions {
            if !seen.insert(def.name.as_str()) {
                return Err(SchemaError::DuplicateType(def.name.clone()));
            }
        }
        Ok(Self { definitions })
    }

    /// Concatenate several documents in order. A type may only be defined once.
    pub fn merge(parts: impl IntoIterator<Item = Schema>) -> Result<Self, SchemaError> {
        let definitions = parts.into_iter().flat_map(|part| part.definitions).collect();
        Self::new(definitions)
    }

    pub fn from_json_str(src: &str, origin: &str) -> Result<Self, SchemaError> {
        let value = crate::path_de::from_str_with_path::<Value>(src)
            .map_err(|message| SchemaError::Parse { origin: origin.to_owned(), message })?;
        Self::from_value(value, origin)
    }

    pub fn from_value(value: Value, origin: &str) -> Result<Self, SchemaError> {
        let document = crate::path_de::from_value_with_path::<IndexMap<String, TypeDef>>(value)
            .map_err(|message| SchemaError::Parse { origin: origin.to_owned(), message })?;
        Self::new(attach_names(document))
    }

    /// Read one schema document, optionally narrowed to the subtree at `json_pointer`.
    pub fn load_file(path: &Path, json_pointer: Option<&str>) -> Result<Self, SchemaError> {
        let origin = path.to_string_lossy().to_string();
        let source = std::fs::read_to_string(path)
            .map_err(|source| SchemaError::Io { path: path.to_path_buf(), source })?;
        let mut value = crate::path_de::from_str_with_path::<Value>(&source)
            .map_err(|message| SchemaError::Parse { origin: origin.clone(), message })?;
        if let Some(pointer) = json_pointer {
            value = value
                .pointer_mut(pointer)
                .map(Value::take)
                .ok_or_else(|| SchemaError::Pointer {
                    origin: origin.clone(),
                    pointer: pointer.to_owned(),
                })?;
        }
        tracing::debug!(%origin, "loaded schema document");
        Self::from_value(value, &origin)
    }

    pub fn definitions(&self) -> &[TypeDef] {
        &self.definitions
    }

    pub fn get(&self, name: &str) -> Option<&TypeDef> {
        self.definitions.iter().find(|def| def.name == name)
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn attach_names(document: IndexMap<String, TypeDef>) -> Vec<TypeDef> {
    document
        .into_iter()
        .map(|(name, mut def)| {
            def.name = name;
            for (field_name, field) in def.fields.iter_mut() {
                field.name = field_name.clone();
            }
            def
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn names_come_from_keys_and_order_is_kept() {
        let doc = json!({
            "StringLiteral": { "unionType": ["Expression"], "fields": { "value": { "type": "string" } } },
            "NumberLiteral": {
                "unionType": ["Expression"],
                "fields": {
                    "value": { "type": "number" },
                    "raw": { "type": "string", "optional": true }
                }
            }
        });
        let schema = Schema::from_value(doc, "inline").unwrap();
        let names: Vec<_> = schema.definitions().iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, ["StringLiteral", "NumberLiteral"]);

        let number = schema.get("NumberLiteral").unwrap();
        let fields: Vec<_> = number.fields.values().map(|f| f.name.as_str()).collect();
        assert_eq!(fields, ["value", "raw"]);
        assert_eq!(number.fields["value"].kind, ValueKind::Number);
        assert!(number.fields["raw"].optional);
        assert_eq!(number.group_tags, ["Expression"]);
    }

    #[test]
    fn accepts_legacy_aliases() {
        let doc = json!({
            "Func": {
                "flowTypeName": "FuncNode",
                "fields": {
                    "name": { "type": "node-reference", "maybe": true },
                    "metadata": { "type": "Object", "optional": true },
                    "signature": {}
                }
            }
        });
        let schema = Schema::from_value(doc, "inline").unwrap();
        let func = schema.get("Func").unwrap();
        assert_eq!(func.display_name(), "FuncNode");
        assert_eq!(func.fields["name"].kind, ValueKind::Node);
        assert!(func.fields["name"].nullable);
        assert_eq!(func.fields["metadata"].kind, ValueKind::Object);
        assert_eq!(func.fields["signature"].kind, ValueKind::Any);
    }

    #[test]
    fn null_default_means_no_default() {
        let doc = json!({ "Block": { "fields": { "label": { "type": "string", "default": null } } } });
        let schema = Schema::from_value(doc, "inline").unwrap();
        assert_eq!(schema.get("Block").unwrap().fields["label"].default, None);
    }

    #[test]
    fn unknown_keys_are_rejected_with_path() {
        let doc = json!({ "Block": { "fields": { "label": { "type": "string", "optinal": true } } } });
        let err = Schema::from_value(doc, "inline").unwrap_err();
        let message = err.to_string();
        assert!(message.contains("Block.fields.label"), "{message}");
    }

    #[test]
    fn merge_rejects_duplicate_types() {
        let a = Schema::new(vec![TypeDef::new("Identifier")]).unwrap();
        let b = Schema::new(vec![TypeDef::new("Program"), TypeDef::new("Identifier")]).unwrap();
        let err = Schema::merge([a, b]).unwrap_err();
        assert!(matches!(err, SchemaError::DuplicateType(name) if name == "Identifier"));
    }

    #[test]
    fn load_file_applies_json_pointer() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("defs.json");
        std::fs::write(
            &path,
            r#"{ "version": 1, "definitions": { "Identifier": { "fields": { "value": { "type": "string" } } } } }"#,
        )
        .unwrap();

        let schema = Schema::load_file(&path, Some("/definitions")).unwrap();
        assert_eq!(schema.len(), 1);

        let err = Schema::load_file(&path, Some("/nodes")).unwrap_err();
        assert!(matches!(err, SchemaError::Pointer { .. }));
    }
}
