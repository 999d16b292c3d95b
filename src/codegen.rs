//! Rust source emission.
//!
//! Output layout, in order: prelude, the `Node` sum type, one payload struct
//! per type, builders, guards, union predicates, `UNION_TYPES_MAP`,
//! assertions. Every section follows schema order.

use crate::error::SchemaError;
use crate::groups::GroupIndex;
use crate::ir::{BuilderPlan, Elision, FieldInit, Param};
use crate::naming::{self, NamingScheme};
use crate::schema::{FieldMeta, Schema, TypeDef, ValueKind};

const INDENT: &str = "    ";

/// Builders with more parameters than this get clippy's lint silenced.
const MAX_QUIET_PARAMS: usize = 7;

pub struct Codegen<'n> {
    naming: &'n dyn NamingScheme,
    out: String,
}

impl<'n> Codegen<'n> {
    pub fn new(naming: &'n dyn NamingScheme) -> Self {
        Self { naming, out: String::new() }
    }

    pub fn emit(&mut self, schema: &Schema, groups: &GroupIndex) -> Result<(), SchemaError> {
        self.emit_prelude();
        self.emit_node_enum(schema);
        for def in schema.definitions() {
            self.emit_struct(def);
        }
        for def in schema.definitions() {
            let plan = crate::lower::plan(def);
            self.emit_builder(&plan)?;
        }
        for def in schema.definitions() {
            self.emit_guard(def);
        }
        for (tag, members) in groups.iter() {
            self.emit_union_guard(tag, members);
        }
        self.emit_union_map(groups);
        for def in schema.definitions() {
            self.emit_assertion(def);
        }
        Ok(())
    }

    pub fn into_string(self) -> String {
        self.out
    }

    // ————————————————————————————————————————————————————————————————————————
    // SECTIONS
    // ————————————————————————————————————————————————————————————————————————

    fn emit_prelude(&mut self) {
        self.line(0, "// THIS FILE IS AUTOGENERATED");
        self.line(0, "// see `nodegen rust --help`");
        self.blank();
        self.line(0, "/// Returned by the `assert_*` functions when a node is not of the expected type.");
        self.line(0, "#[derive(Debug, Clone, Copy, PartialEq, Eq)]");
        self.line(0, "pub struct TypeMismatch {");
        self.line(1, "pub expected: &'static str,");
        self.line(1, "pub actual: &'static str,");
        self.line(0, "}");
        self.blank();
        self.line(0, "impl ::std::fmt::Display for TypeMismatch {");
        self.line(1, "fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {");
        self.line(2, r#"write!(f, "type mismatch: expected {}, got {}", self.expected, self.actual)"#);
        self.line(1, "}");
        self.line(0, "}");
        self.blank();
        self.line(0, "impl ::std::error::Error for TypeMismatch {}");
        self.blank();
    }

    fn emit_node_enum(&mut self, schema: &Schema) {
        self.line(0, "#[derive(Debug, Clone, PartialEq, ::serde::Serialize, ::serde::Deserialize)]");
        self.line(0, r#"#[serde(tag = "type")]"#);
        self.line(0, "pub enum Node {");
        for def in schema.definitions() {
            self.line(1, format!("{}({}),", def.name, def.display_name()));
        }
        self.line(0, "}");
        self.blank();

        self.line(0, "impl Node {");
        self.line(1, "/// The discriminant carried in the `type` field.");
        self.line(1, "pub fn type_name(&self) -> &'static str {");
        self.line(2, "match *self {");
        for def in schema.definitions() {
            self.line(3, format!("Node::{}(_) => {:?},", def.name, def.name));
        }
        self.line(2, "}");
        self.line(1, "}");
        self.line(0, "}");
        self.blank();
    }

    fn emit_struct(&mut self, def: &TypeDef) {
        self.line(0, format!("/// Payload of a `{}` node.", def.name));
        self.line(0, "#[derive(Debug, Clone, PartialEq, ::serde::Serialize, ::serde::Deserialize)]");
        if def.fields.is_empty() {
            self.line(0, format!("pub struct {} {{}}", def.display_name()));
            self.blank();
            return;
        }
        self.line(0, format!("pub struct {} {{", def.display_name()));
        for field in def.fields.values() {
            let ident = self.naming.field(&field.name);
            let mut serde_args = Vec::new();
            if naming::unraw(&ident) != field.name {
                serde_args.push(format!("rename = {:?}", field.name));
            }
            if field.optional && !field.constant {
                serde_args.push(r#"default, skip_serializing_if = "Option::is_none""#.to_owned());
            }
            if !serde_args.is_empty() {
                self.line(1, format!("#[serde({})]", serde_args.join(", ")));
            }
            self.line(1, format!("pub {ident}: {},", field_ty(field)));
        }
        self.line(0, "}");
        self.blank();
    }

    fn emit_builder(&mut self, plan: &BuilderPlan<'_>) -> Result<(), SchemaError> {
        let name = self.naming.builder(plan.type_name);
        self.line(0, format!("/// Builds a `{}` node.", plan.type_name));
        if plan.params.len() > MAX_QUIET_PARAMS {
            self.line(0, "#[allow(clippy::too_many_arguments)]");
        }
        if plan.params.is_empty() {
            self.line(0, format!("pub fn {name}() -> Node {{"));
        } else {
            self.line(0, format!("pub fn {name}("));
            for param in &plan.params {
                let ident = self.naming.field(&param.field.name);
                self.line(1, format!("{ident}: {},", param_ty(param)));
            }
            self.line(0, ") -> Node {");
        }

        // defaults
        for param in &plan.params {
            let Some(default) = param.default else { continue };
            let ident = self.naming.field(&param.field.name);
            let literal = render_literal(plan.type_name, param.field, default)?;
            if param.field.may_be_absent() {
                self.line(1, format!("let {ident} = {ident}.or_else(|| Some({literal}));"));
            } else {
                self.line(1, format!("let {ident} = {ident}.unwrap_or_else(|| {literal});"));
            }
        }

        // construction
        let construction = &plan.construction;
        self.line(1, format!("Node::{}({} {{", construction.discriminant, plan.display_name));
        for init in &construction.inits {
            let ident = self.naming.field(&init.field().name);
            let expr = match init {
                FieldInit::Constant { field, value } => render_literal(plan.type_name, field, value)?,
                FieldInit::Required { field } => pass_through(&ident, field),
                FieldInit::Optional { field, elision } => match elision {
                    Elision::NonEmptySequence | Elision::NonEmptyMapping => {
                        format!("{ident}.filter(|v| !v.is_empty())")
                    }
                    Elision::TrueOnly => format!("{ident}.filter(|v| *v)"),
                    Elision::Defined => pass_through(&ident, field),
                },
            };
            if expr == ident {
                self.line(2, format!("{ident},"));
            } else {
                self.line(2, format!("{ident}: {expr},"));
            }
        }
        self.line(1, "})");
        self.line(0, "}");
        self.blank();
        Ok(())
    }

    fn emit_guard(&mut self, def: &TypeDef) {
        self.line(0, format!("pub fn {}(node: &Node) -> bool {{", self.naming.guard(&def.name)));
        self.line(1, format!("matches!(node, Node::{}(_))", def.name));
        self.line(0, "}");
        self.blank();
    }

    fn emit_union_guard(&mut self, tag: &str, members: &[String]) {
        let name = self.naming.union_guard(tag);
        if members.is_empty() {
            self.line(0, format!("pub fn {name}(_node: &Node) -> bool {{"));
            self.line(1, "false");
        } else {
            let listed = members.iter().map(|m| format!("`{m}`")).collect::<Vec<_>>();
            self.line(0, format!("/// Members: {}.", listed.join(", ")));
            self.line(0, format!("pub fn {name}(node: &Node) -> bool {{"));
            let calls = members
                .iter()
                .map(|m| format!("{}(node)", self.naming.guard(m)))
                .collect::<Vec<_>>();
            self.line(1, calls.join(" || "));
        }
        self.line(0, "}");
        self.blank();
    }

    fn emit_union_map(&mut self, groups: &GroupIndex) {
        self.line(0, "/// Group tag → member type names, in schema order.");
        self.line(0, "pub static UNION_TYPES_MAP: &[(&str, &[&str])] = &[");
        for (tag, members) in groups.iter() {
            let members = members.iter().map(|m| format!("{m:?}")).collect::<Vec<_>>();
            self.line(1, format!("({tag:?}, &[{}]),", members.join(", ")));
        }
        self.line(0, "];");
        self.blank();
    }

    fn emit_assertion(&mut self, def: &TypeDef) {
        self.line(0, format!("/// Fails unless `node` is a `{}`.", def.name));
        self.line(0, "#[allow(unreachable_patterns)]");
        self.line(
            0,
            format!(
                "pub fn {}(node: &Node) -> Result<&{}, TypeMismatch> {{",
                self.naming.assertion(&def.name),
                def.display_name()
            ),
        );
        self.line(1, "match node {");
        self.line(2, format!("Node::{}(inner) => Ok(inner),", def.name));
        self.line(2, "other => Err(TypeMismatch {");
        self.line(3, format!("expected: {:?},", def.name));
        self.line(3, "actual: other.type_name(),");
        self.line(2, "}),");
        self.line(1, "}");
        self.line(0, "}");
        self.blank();
    }

    // ————————————————————————————————————————————————————————————————————————
    // INTERNAL HELPERS
    // ————————————————————————————————————————————————————————————————————————

    fn line(&mut self, depth: usize, text: impl AsRef<str>) {
        for _ in 0..depth {
            self.out.push_str(INDENT);
        }
        self.out.push_str(text.as_ref());
        self.out.push('\n');
    }

    fn blank(&mut self) {
        self.out.push('\n');
    }
}

fn value_ty(kind: ValueKind) -> &'static str {
    match kind {
        ValueKind::String => "String",
        ValueKind::Number => "f64",
        ValueKind::Boolean => "bool",
        ValueKind::Object => "::serde_json::Map<String, ::serde_json::Value>",
        ValueKind::Node => "Node",
        ValueKind::Any => "::serde_json::Value",
    }
}

/// Type of the struct field. Single node references are boxed.
fn field_ty(field: &FieldMeta) -> String {
    let base = value_ty(field.kind);
    let ty = if field.array {
        format!("Vec<{base}>")
    } else if field.kind == ValueKind::Node {
        format!("Box<{base}>")
    } else {
        base.to_owned()
    };
    if !field.constant && field.may_be_absent() { format!("Option<{ty}>") } else { ty }
}

/// Type of the builder parameter. A default makes any parameter omittable.
fn param_ty(param: &Param<'_>) -> String {
    let base = value_ty(param.field.kind);
    let ty = if param.field.array { format!("Vec<{base}>") } else { base.to_owned() };
    if param.field.may_be_absent() || param.default.is_some() {
        format!("Option<{ty}>")
    } else {
        ty
    }
}

/// Parameter → field value, boxing single node references.
fn pass_through(ident: &str, field: &FieldMeta) -> String {
    if field.kind != ValueKind::Node || field.array {
        ident.to_owned()
    } else if field.may_be_absent() {
        format!("{ident}.map(Box::new)")
    } else {
        format!("Box::new({ident})")
    }
}

fn render_literal(type_name: &str, field: &FieldMeta, value: &serde_json::Value) -> Result<String, SchemaError> {
    crate::literal::render(field, value).map_err(|message| SchemaError::InvalidLiteral {
        type_name: type_name.to_owned(),
        field: field.name.clone(),
        message,
    })
}
