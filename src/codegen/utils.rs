//! Identifier normalization and target type mapping used by every generator.

use convert_case::{Boundary, Case, Casing};

use crate::codegen::types::DataType;

/// Word separators recognised in user-supplied identifiers
const SEPARATORS: [Boundary; 3] = [Boundary::Underscore, Boundary::Hyphen, Boundary::Space];

/// Convert a string to PascalCase
///
/// Splits only on `_`, `-` and spaces; every segment keeps its first
/// character upper-cased and the remainder lower-cased, so `ProductId`
/// becomes `Productid`.
pub fn to_pascal_case(s: &str) -> String {
    s.with_boundaries(&SEPARATORS).to_case(Case::Pascal)
}

/// Convert a string to camelCase
pub fn to_camel_case(s: &str) -> String {
    let pascal = to_pascal_case(s);
    let mut chars = pascal.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Heuristic English plural
///
/// No irregular nouns: `Person` becomes `Persons`.
pub fn pluralize(name: &str) -> String {
    if name.is_empty() {
        return String::new();
    }

    let lower = name.to_lowercase();
    if ["s", "x", "z", "ch", "sh"].iter().any(|suffix| lower.ends_with(suffix)) {
        return format!("{}es", name);
    }

    if lower.ends_with('y') {
        let before_y = lower.chars().rev().nth(1);
        if matches!(before_y, Some(c) if !"aeiou".contains(c)) {
            return format!("{}ies", &name[..name.len() - 1]);
        }
    }

    format!("{}s", name)
}

/// Collection name for a PascalCase entity name
///
/// Names that already read plural (`Orders`, `Products`) are kept as-is so
/// table names declared in plural form do not become `Orderses`.
pub fn collection_name(pascal: &str) -> String {
    let lower = pascal.to_lowercase();
    let already_plural = lower.ends_with('s')
        && !["ss", "us", "is"].iter().any(|suffix| lower.ends_with(suffix));

    if already_plural {
        pascal.to_string()
    } else {
        pluralize(pascal)
    }
}

/// Escape a string for use in C# regular string literals
pub fn escape_csharp_string(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
        .replace('\r', "\\r")
        .replace('\t', "\\t")
}

/// C# type for a logical data type
pub fn csharp_type(data_type: DataType, nullable: bool) -> String {
    let base = match data_type {
        DataType::Integer32 => "int",
        DataType::Integer64 => "long",
        DataType::Text => "string",
        DataType::Boolean => "bool",
        DataType::DateTime => "DateTime",
        DataType::Decimal => "decimal",
        DataType::Double => "double",
        DataType::Float32 => "float",
        DataType::Guid => "Guid",
        DataType::Bytes => "byte[]",
    };

    if nullable && !data_type.is_reference_type() {
        format!("{}?", base)
    } else {
        base.to_string()
    }
}

/// Format a numeric literal the way C# expects it
pub fn csharp_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}
