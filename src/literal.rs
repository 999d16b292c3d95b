//! Schema literals (constant values, defaults) rendered as Rust expressions.
//!
//! The expression has the field's *value* type: `Vec<_>` for arrays, never
//! wrapped in `Option` or `Box`. Callers add those layers.

use serde_json::Value;

use crate::schema::{FieldMeta, ValueKind};

pub fn render(field: &FieldMeta, value: &Value) -> Result<String, String> {
    if !field.array {
        return render_scalar(field.kind, value);
    }
    match value {
        Value::Array(items) if items.is_empty() => Ok("Vec::new()".to_owned()),
        Value::Array(items) => {
            let items = items
                .iter()
                .map(|item| render_scalar(field.kind, item))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(format!("vec![{}]", items.join(", ")))
        }
        other => Err(format!("expected an array literal, got {other}")),
    }
}

fn render_scalar(kind: ValueKind, value: &Value) -> Result<String, String> {
    match (kind, value) {
        (ValueKind::String, Value::String(s)) => Ok(format!("String::from({s:?})")),
        (ValueKind::Number, Value::Number(n)) => match n.as_f64() {
            Some(f) => Ok(format!("{f:?}")),
            None => Err(format!("number {n} does not fit in f64")),
        },
        (ValueKind::Boolean, Value::Bool(b)) => Ok(b.to_string()),
        (ValueKind::Object, Value::Object(map)) if map.is_empty() => {
            Ok("::serde_json::Map::new()".to_owned())
        }
        (ValueKind::Object, Value::Object(map)) => {
            let entries = map
                .iter()
                .map(|(k, v)| format!("(String::from({k:?}), ::serde_json::json!({}))", json_tokens(v)))
                .collect::<Vec<_>>();
            Ok(format!("::serde_json::Map::from_iter([{}])", entries.join(", ")))
        }
        (ValueKind::Node, _) => Err("node references cannot have literal values".to_owned()),
        (ValueKind::Any, v) => Ok(format!("::serde_json::json!({})", json_tokens(v))),
        (kind, other) => Err(format!("expected a {kind} literal, got {other}")),
    }
}

/// Tokens accepted by `serde_json::json!`. Strings go through Rust's own
/// escaping, since JSON `\u00XX` escapes are not valid Rust.
fn json_tokens(value: &Value) -> String {
    match value {
        Value::Null => "null".to_owned(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => format!("{s:?}"),
        Value::Array(items) => {
            let items: Vec<_> = items.iter().map(json_tokens).collect();
            format!("[{}]", items.join(", "))
        }
        Value::Object(map) => {
            let entries: Vec<_> = map.iter().map(|(k, v)| format!("{k:?}: {}", json_tokens(v))).collect();
            format!("{{{}}}", entries.join(", "))
        }
    }
}
