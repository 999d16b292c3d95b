//! Upfront schema checks. Everything emission relies on is verified here, so a
//! generation pass either writes a complete file or nothing at all.

use std::collections::HashSet;

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::SchemaError;
use crate::naming::{self, NamingScheme};
use crate::schema::{Schema, TypeDef};

static IDENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("identifier pattern"));

/// Names the generated module defines or refers to unqualified.
pub const RESERVED_TYPE_NAMES: &[&str] = &[
    "Node", "TypeMismatch", "String", "Option", "Some", "None", "Vec", "Box", "Result", "Ok",
    "Err", "bool", "f64", "str",
];

/// Name of the discriminant field in constructed values.
pub const DISCRIMINANT: &str = "type";

pub fn validate(schema: &Schema, naming: &dyn NamingScheme) -> Result<(), SchemaError> {
    if schema.is_empty() {
        return Err(SchemaError::Empty);
    }

    let mut type_idents: IndexMap<String, String> = RESERVED_TYPE_NAMES
        .iter()
        .map(|name| (name.to_string(), "the generated module".to_owned()))
        .collect();
    let mut fn_idents: IndexMap<String, String> = IndexMap::new();

    for def in schema.definitions() {
        check_type_ident("type name", &def.name)?;
        if let Some(display) = def.display_type_name.as_deref() {
            check_type_ident("display type name", display)?;
        }
        claim(&mut type_idents, def.display_name(), &def.name)?;
        if def.display_name() != def.name {
            // the enum variant is named after the type itself
            claim(&mut type_idents, &def.name, &def.name)?;
        }

        claim(&mut fn_idents, &naming.builder(&def.name), &def.name)?;
        claim(&mut fn_idents, &naming.guard(&def.name), &def.name)?;
        claim(&mut fn_idents, &naming.assertion(&def.name), &def.name)?;

        check_fields(def, naming)?;
    }

    let type_names: HashSet<&str> = schema.definitions().iter().map(|d| d.name.as_str()).collect();
    let mut seen_tags = HashSet::new();
    for tag in schema.definitions().iter().flat_map(|d| d.group_tags.iter()) {
        if !seen_tags.insert(tag.as_str()) {
            continue;
        }
        if !IDENT.is_match(tag) {
            return Err(SchemaError::InvalidName { what: "group tag", name: tag.clone() });
        }
        if type_names.contains(tag.as_str()) {
            return Err(SchemaError::GroupShadowsType(tag.clone()));
        }
        claim(&mut fn_idents, &naming.union_guard(tag), &format!("group {tag}"))?;
    }

    for name in fn_idents.keys() {
        check_fn_ident(name)?;
    }

    tracing::debug!(
        types = schema.len(),
        functions = fn_idents.len(),
        "schema validated"
    );
    Ok(())
}

fn check_fields(def: &TypeDef, naming: &dyn NamingScheme) -> Result<(), SchemaError> {
    let mut field_idents: IndexMap<String, String> = IndexMap::new();
    let invalid_literal = |field: &str, message: String| SchemaError::InvalidLiteral {
        type_name: def.name.clone(),
        field: field.to_owned(),
        message,
    };

    for field in def.fields.values() {
        if field.name == DISCRIMINANT {
            return Err(SchemaError::ReservedField {
                type_name: def.name.clone(),
                field: field.name.clone(),
            });
        }
        let ident = naming.field(&field.name);
        if !IDENT.is_match(&field.name) || !naming::is_usable_ident(&ident) {
            return Err(SchemaError::InvalidName {
                what: "field name",
                name: format!("{}.{}", def.name, field.name),
            });
        }
        claim(&mut field_idents, &ident, &format!("{}.{}", def.name, field.name))?;

        if field.constant && field.optional {
            return Err(SchemaError::ConstantOptional {
                type_name: def.name.clone(),
                field: field.name.clone(),
            });
        }
        match (field.constant, field.value.as_ref()) {
            (true, None) => {
                return Err(SchemaError::ConstantWithoutValue {
                    type_name: def.name.clone(),
                    field: field.name.clone(),
                });
            }
            (false, Some(_)) => {
                return Err(SchemaError::ValueWithoutConstant {
                    type_name: def.name.clone(),
                    field: field.name.clone(),
                });
            }
            (true, Some(value)) => {
                crate::literal::render(field, value)
                    .map_err(|message| invalid_literal(&field.name, format!("constant value: {message}")))?;
            }
            (false, None) => {}
        }
        if let (false, Some(default)) = (field.constant, field.default.as_ref()) {
            crate::literal::render(field, default)
                .map_err(|message| invalid_literal(&field.name, format!("default: {message}")))?;
        }
    }
    Ok(())
}

fn check_type_ident(what: &'static str, name: &str) -> Result<(), SchemaError> {
    if IDENT.is_match(name) && !naming::is_keyword(name) && name != "_" {
        Ok(())
    } else {
        Err(SchemaError::InvalidName { what, name: name.to_owned() })
    }
}

fn check_fn_ident(name: &str) -> Result<(), SchemaError> {
    let bare = naming::unraw(name);
    if IDENT.is_match(bare) && naming::is_usable_ident(bare) {
        Ok(())
    } else {
        Err(SchemaError::InvalidName { what: "generated function name", name: name.to_owned() })
    }
}

fn claim(taken: &mut IndexMap<String, String>, name: &str, owner: &str) -> Result<(), SchemaError> {
    if let Some(first) = taken.get(name) {
        return Err(SchemaError::NameCollision {
            name: name.to_owned(),
            first: first.clone(),
            second: owner.to_owned(),
        });
    }
    taken.insert(name.to_owned(), owner.to_owned());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::naming::SnakeCase;
    use crate::schema::{FieldMeta, ValueKind};
    use serde_json::json;

    fn check(defs: Vec<TypeDef>) -> Result<(), SchemaError> {
        validate(&Schema::new(defs).unwrap(), &SnakeCase::default())
    }

    fn literal() -> TypeDef {
        TypeDef::new("NumberLiteral")
            .group("Expression")
            .field(FieldMeta::new("value", ValueKind::Number))
    }

    #[test]
    fn accepts_a_well_formed_schema() {
        let func = TypeDef::new("Func")
            .display_as("FuncNode")
            .field(FieldMeta::new("kind", ValueKind::String).constant(json!("func")))
            .field(FieldMeta::new("static", ValueKind::Boolean).optional())
            .field(FieldMeta::new("body", ValueKind::Node).array().with_default(json!([])));
        assert!(check(vec![literal(), func]).is_ok());
    }

    #[test]
    fn rejects_empty_schema() {
        assert!(matches!(check(vec![]), Err(SchemaError::Empty)));
    }

    #[test]
    fn rejects_constant_optional() {
        let def = TypeDef::new("Func")
            .field(FieldMeta::new("kind", ValueKind::String).constant(json!("func")).optional());
        let err = check(vec![def]).unwrap_err();
        assert!(matches!(err, SchemaError::ConstantOptional { ref field, .. } if field == "kind"));
        assert_eq!(err.to_string(), "invalid schema: Func.kind cannot be both constant and optional");
    }

    #[test]
    fn rejects_constant_without_value_and_stray_value() {
        let mut missing = FieldMeta::new("kind", ValueKind::String);
        missing.constant = true;
        let err = check(vec![TypeDef::new("Func").field(missing)]).unwrap_err();
        assert!(matches!(err, SchemaError::ConstantWithoutValue { .. }));

        let mut stray = FieldMeta::new("kind", ValueKind::String);
        stray.value = Some(json!("func"));
        let err = check(vec![TypeDef::new("Func").field(stray)]).unwrap_err();
        assert!(matches!(err, SchemaError::ValueWithoutConstant { .. }));
    }

    #[test]
    fn rejects_literal_of_wrong_kind() {
        let def = TypeDef::new("Func")
            .field(FieldMeta::new("index", ValueKind::Number).with_default(json!("zero")));
        let err = check(vec![def]).unwrap_err();
        assert!(matches!(err, SchemaError::InvalidLiteral { ref field, .. } if field == "index"));
    }

    #[test]
    fn rejects_discriminant_field() {
        let def = TypeDef::new("Func").field(FieldMeta::new("type", ValueKind::String));
        assert!(matches!(check(vec![def]), Err(SchemaError::ReservedField { .. })));
    }

    #[test]
    fn rejects_bad_identifiers() {
        let err = check(vec![TypeDef::new("Number Literal")]).unwrap_err();
        assert!(matches!(err, SchemaError::InvalidName { what: "type name", .. }));

        let err = check(vec![TypeDef::new("Node")]).unwrap_err();
        assert!(matches!(err, SchemaError::NameCollision { .. }));

        let def = TypeDef::new("Func").field(FieldMeta::new("self", ValueKind::Any));
        assert!(matches!(check(vec![def]), Err(SchemaError::InvalidName { what: "field name", .. })));
    }

    #[test]
    fn rejects_group_named_like_a_type() {
        let def = TypeDef::new("Identifier").group("NumberLiteral");
        let err = check(vec![literal(), def]).unwrap_err();
        assert!(matches!(err, SchemaError::GroupShadowsType(tag) if tag == "NumberLiteral"));
    }

    #[test]
    fn rejects_derived_name_collisions() {
        // builder of `IsFoo` and guard of `Foo` are both `is_foo`
        let err = check(vec![TypeDef::new("Foo"), TypeDef::new("IsFoo")]).unwrap_err();
        assert!(matches!(err, SchemaError::NameCollision { ref name, .. } if name == "is_foo"));

        let def = TypeDef::new("Func")
            .field(FieldMeta::new("exportName", ValueKind::String))
            .field(FieldMeta::new("export_name", ValueKind::String));
        assert!(matches!(check(vec![def]), Err(SchemaError::NameCollision { .. })));
    }

    #[test]
    fn rejects_names_the_generated_module_relies_on() {
        for name in ["Option", "String", "Vec", "Box", "Result", "Some", "bool", "f64", "str"] {
            let err = check(vec![TypeDef::new(name)]).unwrap_err();
            assert!(
                matches!(err, SchemaError::NameCollision { name: ref taken, .. } if taken == name),
                "{name}: {err}"
            );
        }
        let err = check(vec![TypeDef::new("Func").display_as("Option")]).unwrap_err();
        assert!(matches!(err, SchemaError::NameCollision { .. }));
    }
}
