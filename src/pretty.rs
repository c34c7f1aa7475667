//! Debug dump of a populated struct, one `name:value` line per field.

use std::fmt::Write;

use serde::Serialize;
use serde_json::Value;

const NESTED_INDENT: &str = "    ";

/// Render `value` field by field, each line starting with `prefix`.
///
/// Nested structs get a `name:` header and are indented four more spaces,
/// sequences are comma-joined and missing values print as `nil`.
pub fn pretty_struct<T: Serialize + ?Sized>(
    value: &T,
    prefix: &str,
) -> Result<String, serde_json::Error> {
    let value = serde_json::to_value(value)?;
    let mut out = String::new();
    match &value {
        Value::Object(fields) => write_fields(&mut out, fields, prefix),
        other => {
            writeln!(&mut out, "{prefix}{}", scalar(other)).ok();
        }
    }
    Ok(out)
}

fn write_fields(out: &mut String, fields: &serde_json::Map<String, Value>, prefix: &str) {
    for (name, value) in fields {
        match value {
            Value::Object(nested) => {
                writeln!(out, "{prefix}{name}:").ok();
                write_fields(out, nested, &format!("{prefix}{NESTED_INDENT}"));
            }
            other => {
                writeln!(out, "{prefix}{name}:{}", scalar(other)).ok();
            }
        }
    }
}

fn scalar(value: &Value) -> String {
    match value {
        Value::Null => "nil".to_string(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(scalar).collect::<Vec<_>>().join(","),
        Value::Object(_) => value.to_string(),
        other => other.to_string(),
    }
}
