// Builder plans: what each generated constructor takes, checks and assembles.
// Target-independent; `codegen` renders them as Rust, `runtime` executes them on JSON.

use serde_json::Value;

use crate::schema::{FieldMeta, ValueKind};

#[derive(Debug, Clone)]
pub struct BuilderPlan<'s> {
    pub type_name: &'s str,
    pub display_name: &'s str,
    pub params: Vec<Param<'s>>,
    pub checks: Vec<ParamCheck<'s>>,
    pub construction: Construction<'s>,
}

/// One constructor parameter, in field declaration order.
#[derive(Debug, Clone)]
pub struct Param<'s> {
    pub field: &'s FieldMeta,
    pub default: Option<&'s Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Check {
    /// Argument's runtime kind must equal this primitive.
    Primitive(ValueKind),
    /// Argument must be an ordered sequence. Elements are not inspected.
    Sequence,
}

#[derive(Debug, Clone)]
pub struct ParamCheck<'s> {
    pub field: &'s FieldMeta,
    pub check: Check,
    pub skip_if_absent: bool, // optional or nullable: null/absent bypasses the check
}

#[derive(Debug, Clone)]
pub struct Construction<'s> {
    pub discriminant: &'s str,
    pub inits: Vec<FieldInit<'s>>, // constants, then required, then optional
}

#[derive(Debug, Clone)]
pub enum FieldInit<'s> {
    Constant { field: &'s FieldMeta, value: &'s Value },
    Required { field: &'s FieldMeta },
    Optional { field: &'s FieldMeta, elision: Elision },
}

/// When an optional field is left out of the constructed value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Elision {
    /// Kept only when the sequence has at least one element.
    NonEmptySequence,
    /// Kept only when the mapping has at least one entry.
    NonEmptyMapping,
    /// Kept only when exactly `true`; `false` and absent are both dropped.
    TrueOnly,
    /// Kept whenever supplied, explicit null included.
    Defined,
}

impl FieldInit<'_> {
    pub fn field(&self) -> &FieldMeta {
        match self {
            FieldInit::Constant { field, .. }
            | FieldInit::Required { field }
            | FieldInit::Optional { field, .. } => field,
        }
    }
}
