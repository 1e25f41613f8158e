//! A small Kotlin source model and writer.
//!
//! Declarations are built as data ([`FunSpec`], [`TypeSpec`]) holding
//! [`Code`] fragments that reference types structurally. [`KotlinFile::render`]
//! computes imports over everything a file references and prints it.

mod code;
mod file;
mod spec;

pub use code::{ClassName, Code, CodeBlock, KotlinType, Segment, Variance};
pub use file::{Imports, KotlinFile, Member};
pub use spec::{AnnotationSpec, FunSpec, Modifier, ParamSpec, TypeSpec, TypeVariable};

/// Hard keywords that need backticks when used as identifiers.
const HARD_KEYWORDS: &[&str] = &[
    "as", "break", "class", "continue", "do", "else", "false", "for", "fun", "if", "in",
    "interface", "is", "null", "object", "package", "return", "super", "this", "throw", "true",
    "try", "typealias", "typeof", "val", "var", "when", "while",
];

/// `name`, wrapped in backticks if it is a Kotlin hard keyword.
pub fn escape_identifier(name: &str) -> String {
    if HARD_KEYWORDS.contains(&name) {
        format!("`{name}`")
    } else {
        name.to_string()
    }
}

/// A double-quoted Kotlin string literal for `value`.
pub fn string_literal(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '$' => out.push_str("\\$"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{8}' => out.push_str("\\b"),
            other => out.push(other),
        }
    }
    out.push('"');
    out
}
