//! Builders, guards and assertions executed directly on `serde_json::Value`.
//!
//! This is the trust boundary for nodes arriving as JSON: the generated Rust
//! code relies on its types, while values here are checked against the same
//! builder plans at run time.

use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::error::{RuntimeError, SchemaError};
use crate::groups::GroupIndex;
use crate::ir::{BuilderPlan, Check, Elision, FieldInit};
use crate::naming::SnakeCase;
use crate::schema::{Schema, ValueKind};
use crate::validate::DISCRIMINANT;

pub struct Runtime<'s> {
    plans: IndexMap<&'s str, BuilderPlan<'s>>,
    groups: GroupIndex,
}

impl<'s> Runtime<'s> {
    /// Validates `schema` the same way a generation pass does.
    pub fn new(schema: &'s Schema) -> Result<Self, SchemaError> {
        crate::validate::validate(schema, &SnakeCase::default())?;
        let plans = schema
            .definitions()
            .iter()
            .map(|def| (def.name.as_str(), crate::lower::plan(def)))
            .collect();
        Ok(Self { plans, groups: GroupIndex::from_schema(schema) })
    }

    /// Construct a node of `type_name` from named arguments.
    pub fn build(&self, type_name: &str, args: &Map<String, Value>) -> Result<Value, RuntimeError> {
        let plan = self
            .plans
            .get(type_name)
            .ok_or_else(|| RuntimeError::UnknownType(type_name.to_owned()))?;

        if let Some(unknown) = args
            .keys()
            .find(|key| !plan.params.iter().any(|p| &p.field.name == *key))
        {
            return Err(RuntimeError::UnknownArgument {
                type_name: type_name.to_owned(),
                argument: unknown.clone(),
            });
        }

        // absent arguments fall back to their default; explicit null does not
        let resolved: IndexMap<&str, Option<&Value>> = plan
            .params
            .iter()
            .map(|p| (p.field.name.as_str(), args.get(&p.field.name).or(p.default)))
            .collect();
        let arg = |name: &str| resolved.get(name).copied().flatten();

        for check in &plan.checks {
            let value = arg(check.field.name.as_str());
            if check.skip_if_absent && value.is_none_or(Value::is_null) {
                continue;
            }
            let (ok, expected) = match check.check {
                Check::Sequence => (matches!(value, Some(Value::Array(_))), "array"),
                Check::Primitive(kind) => (value.is_some_and(|v| is_kind(v, kind)), kind.as_str()),
            };
            if !ok {
                return Err(RuntimeError::ArgumentMismatch {
                    type_name: type_name.to_owned(),
                    field: check.field.name.clone(),
                    expected,
                    actual: kind_name(value),
                });
            }
        }

        let mut node = Map::new();
        node.insert(DISCRIMINANT.to_owned(), Value::from(plan.construction.discriminant));
        for init in &plan.construction.inits {
            match init {
                FieldInit::Constant { field, value } => {
                    node.insert(field.name.clone(), (*value).clone());
                }
                FieldInit::Required { field } => {
                    let value = arg(field.name.as_str()).cloned().unwrap_or(Value::Null);
                    node.insert(field.name.clone(), value);
                }
                FieldInit::Optional { field, elision } => {
                    if let Some(value) = arg(field.name.as_str()).filter(|v| keeps(*elision, v)) {
                        node.insert(field.name.clone(), value.clone());
                    }
                }
            }
        }
        Ok(Value::Object(node))
    }

    /// True iff `type_name` is defined and `value` carries it as its discriminant. Never fails.
    pub fn is_type(&self, type_name: &str, value: &Value) -> bool {
        self.plans.contains_key(type_name) && discriminant(value) == Some(type_name)
    }

    /// True iff `value` is of any type declaring `tag`. Unknown tags match nothing.
    pub fn is_group(&self, tag: &str, value: &Value) -> bool {
        self.groups.members(tag).iter().any(|member| self.is_type(member, value))
    }

    pub fn assert_type(&self, type_name: &str, value: &Value) -> Result<(), RuntimeError> {
        if !self.plans.contains_key(type_name) {
            return Err(RuntimeError::UnknownType(type_name.to_owned()));
        }
        if self.is_type(type_name, value) {
            Ok(())
        } else {
            Err(RuntimeError::TypeMismatch {
                expected: type_name.to_owned(),
                actual: discriminant(value).unwrap_or("none").to_owned(),
            })
        }
    }
}

fn discriminant(value: &Value) -> Option<&str> {
    value.get(DISCRIMINANT).and_then(Value::as_str)
}

fn keeps(elision: Elision, value: &Value) -> bool {
    match elision {
        Elision::NonEmptySequence => value.as_array().is_some_and(|items| !items.is_empty()),
        // non-mapping values are trusted as-is; null and `{}` are dropped
        Elision::NonEmptyMapping => match value {
            Value::Object(map) => !map.is_empty(),
            Value::Null => false,
            _ => true,
        },
        Elision::TrueOnly => value == &Value::Bool(true),
        Elision::Defined => true,
    }
}

fn is_kind(value: &Value, kind: ValueKind) -> bool {
    match kind {
        ValueKind::String => value.is_string(),
        ValueKind::Number => value.is_number(),
        ValueKind::Boolean => value.is_boolean(),
        ValueKind::Object => value.is_object(),
        ValueKind::Node | ValueKind::Any => true,
    }
}

fn kind_name(value: Option<&Value>) -> &'static str {
    match value {
        None => "undefined",
        Some(Value::Null) => "null",
        Some(Value::Bool(_)) => "boolean",
        Some(Value::Number(_)) => "number",
        Some(Value::String(_)) => "string",
        Some(Value::Array(_)) => "array",
        Some(Value::Object(_)) => "object",
    }
}
