use crate::ir::{BuilderPlan, Check, Construction, Elision, FieldInit, Param, ParamCheck};
use crate::schema::{FieldMeta, TypeDef, ValueKind};
use serde_json::Value;

static NULL: Value = Value::Null;

/// Parameter list: every non-constant field, in declaration order.
pub fn params(def: &TypeDef) -> Vec<Param<'_>> {
    def.non_constant_fields()
        .map(|field| Param { field, default: field.default.as_ref() })
        .collect()
}

/// Validation clauses for the parameters. Fields with nothing to check are skipped.
pub fn checks(def: &TypeDef) -> Vec<ParamCheck<'_>> {
    def.non_constant_fields()
        .filter_map(|field| {
            let check = check_for(field)?;
            Some(ParamCheck { field, check, skip_if_absent: field.may_be_absent() })
        })
        .collect()
}

fn check_for(field: &FieldMeta) -> Option<Check> {
    // arrays first: an array of strings is checked as a sequence, not a string
    if field.array {
        Some(Check::Sequence)
    } else if field.kind.is_primitive() {
        Some(Check::Primitive(field.kind))
    } else {
        // object, node and any are trusted structurally
        None
    }
}

pub fn construction(def: &TypeDef) -> Construction<'_> {
    let mut inits = Vec::with_capacity(def.fields.len());

    // 1) constants, unconditionally; a missing value is caught by validation
    for field in def.fields.values().filter(|f| f.constant) {
        let value = field.value.as_ref().unwrap_or(&NULL);
        inits.push(FieldInit::Constant { field, value });
    }

    // 2) required fields, straight from their parameter
    for field in def.fields.values().filter(|f| f.is_required()) {
        inits.push(FieldInit::Required { field });
    }

    // 3) optional fields, each under its own elision rule
    for field in def.fields.values().filter(|f| f.optional && !f.constant) {
        inits.push(FieldInit::Optional { field, elision: elision_for(field) });
    }

    Construction { discriminant: &def.name, inits }
}

pub fn elision_for(field: &FieldMeta) -> Elision {
    if field.array {
        Elision::NonEmptySequence
    } else {
        match field.kind {
            ValueKind::Object => Elision::NonEmptyMapping,
            // false is treated like absent
            ValueKind::Boolean => Elision::TrueOnly,
            _ => Elision::Defined,
        }
    }
}

pub fn plan(def: &TypeDef) -> BuilderPlan<'_> {
    BuilderPlan {
        type_name: &def.name,
        display_name: def.display_name(),
        params: params(def),
        checks: checks(def),
        construction: construction(def),
    }
}
