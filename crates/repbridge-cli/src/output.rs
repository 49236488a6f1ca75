// crates/repbridge-cli/src/output.rs
//
// Output formatting for the RepBridge CLI: tables for people, JSON for
// scripts.

use serde::Serialize;
use tabled::{Table, Tabled};

/// Output format for CLI commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Pretty-printed table output (default).
    Table,
    /// JSON output for machine consumption.
    Json,
}

/// Print an RPC result in the chosen format.
pub fn print_value(format: OutputFormat, value: &serde_json::Value) {
    match format {
        OutputFormat::Json => println!("{}", format_json(value)),
        OutputFormat::Table => println!("{}", format_table(&object_rows(value))),
    }
}

/// A labelled value, one table row.
#[derive(Debug, Clone, Tabled)]
pub struct Field {
    #[tabled(rename = "Field")]
    pub name: String,
    #[tabled(rename = "Value")]
    pub value: String,
}

impl Field {
    pub fn new(name: &str, value: impl ToString) -> Self {
        Self {
            name: name.to_string(),
            value: value.to_string(),
        }
    }
}

/// Format a slice of Tabled items as a table string.
pub fn format_table<T: Tabled>(data: &[T]) -> String {
    Table::new(data).to_string()
}

/// Format a serializable value as a pretty-printed JSON string.
pub fn format_json<T: Serialize>(data: &T) -> String {
    serde_json::to_string_pretty(data).unwrap_or_else(|e| format!("JSON serialization error: {}", e))
}

/// Render a JSON object as a two-column table, flattening one level of
/// nesting as `outer.inner`.
pub fn object_rows(value: &serde_json::Value) -> Vec<Field> {
    let mut rows = Vec::new();
    if let Some(map) = value.as_object() {
        for (key, v) in map {
            match v {
                serde_json::Value::Object(inner) => {
                    for (inner_key, inner_v) in inner {
                        rows.push(Field::new(&format!("{}.{}", key, inner_key), plain(inner_v)));
                    }
                }
                other => rows.push(Field::new(key, plain(other))),
            }
        }
    }
    rows
}

fn plain(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Null => "-".to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_rows_flatten_one_level() {
        let value = serde_json::json!({
            "address": "ab",
            "record": { "score": 850, "nonce": 1 },
            "details": null,
        });
        let rows = object_rows(&value);
        let names: Vec<&str> = rows.iter().map(|r| r.name.as_str()).collect();
        assert!(names.contains(&"address"));
        assert!(names.contains(&"record.score"));
        assert!(names.contains(&"record.nonce"));
        let details = rows.iter().find(|r| r.name == "details").unwrap();
        assert_eq!(details.value, "-");
    }

    #[test]
    fn test_format_table_has_headers() {
        let table = format_table(&[Field::new("score", 850)]);
        assert!(table.contains("Field"));
        assert!(table.contains("850"));
    }
}
