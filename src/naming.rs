//! Derived identifiers for generated items.

/// Maps schema names onto the identifiers used in generated code.
///
/// Implementations must be pure: the same input always yields the same name.
pub trait NamingScheme {
    /// Constructor for a type definition.
    fn builder(&self, type_name: &str) -> String;
    /// Type guard for a type definition.
    fn guard(&self, type_name: &str) -> String;
    /// Failing assertion for a type definition.
    fn assertion(&self, type_name: &str) -> String;
    /// Membership predicate for a group tag.
    fn union_guard(&self, group: &str) -> String;
    /// Struct field and builder parameter for a schema field.
    fn field(&self, field_name: &str) -> String;
}

/// `NumberLiteral` → `number_literal`, `is_number_literal`, `assert_number_literal`.
#[derive(Debug, Clone, Default)]
pub struct SnakeCase {
    pub builder_prefix: String,
}

impl SnakeCase {
    pub fn with_builder_prefix(prefix: impl Into<String>) -> Self {
        Self { builder_prefix: prefix.into() }
    }
}

impl NamingScheme for SnakeCase {
    fn builder(&self, type_name: &str) -> String {
        escape_keyword(format!("{}{}", self.builder_prefix, to_snake_case(type_name)))
    }
    fn guard(&self, type_name: &str) -> String {
        format!("is_{}", to_snake_case(type_name))
    }
    fn assertion(&self, type_name: &str) -> String {
        format!("assert_{}", to_snake_case(type_name))
    }
    fn union_guard(&self, group: &str) -> String {
        format!("is_{}", to_snake_case(group))
    }
    fn field(&self, field_name: &str) -> String {
        escape_keyword(to_snake_case(field_name))
    }
}

pub fn to_snake_case(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        if !c.is_ascii_uppercase() {
            out.push(c);
            continue;
        }
        let prev = if i == 0 { None } else { Some(chars[i - 1]) };
        let next = chars.get(i + 1).copied();
        let boundary = match prev {
            Some(p) if p.is_ascii_lowercase() || p.is_ascii_digit() => true,
            // end of an acronym: `HTTPRequest` → `http_request`
            Some(p) if p.is_ascii_uppercase() => next.is_some_and(|n| n.is_ascii_lowercase()),
            _ => false,
        };
        if boundary {
            out.push('_');
        }
        out.push(c.to_ascii_lowercase());
    }
    out
}

/// Strict and reserved keywords of the 2024 edition.
const KEYWORDS: &[&str] = &[
    "abstract", "as", "async", "await", "become", "box", "break", "const", "continue", "crate",
    "do", "dyn", "else", "enum", "extern", "false", "final", "fn", "for", "gen", "if", "impl",
    "in", "let", "loop", "macro", "match", "mod", "move", "mut", "override", "priv", "pub", "ref",
    "return", "self", "Self", "static", "struct", "super", "trait", "true", "try", "type",
    "typeof", "unsafe", "unsized", "use", "virtual", "where", "while", "yield",
];

/// Keywords that cannot be used even as raw identifiers.
const NOT_RAW: &[&str] = &["crate", "self", "Self", "super"];

pub fn is_keyword(ident: &str) -> bool {
    KEYWORDS.contains(&ident)
}

/// Whether `ident` can appear in generated code, possibly after raw-escaping.
pub fn is_usable_ident(ident: &str) -> bool {
    ident != "_" && !NOT_RAW.contains(&ident)
}

fn escape_keyword(ident: String) -> String {
    if is_keyword(&ident) && is_usable_ident(&ident) {
        format!("r#{ident}")
    } else {
        ident
    }
}

/// The name serde sees for a (possibly raw) identifier.
pub fn unraw(ident: &str) -> &str {
    ident.strip_prefix("r#").unwrap_or(ident)
}
