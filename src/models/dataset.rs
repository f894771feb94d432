use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Two-way column typing used throughout the session engine.
///
/// Decided once, at ingestion or result materialization, and propagated
/// everywhere instead of re-inspecting cell values ad hoc.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Numeric,
    Text,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnSchema {
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: ColumnType,
}

impl ColumnSchema {
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
        }
    }
}

/// A named, ordered table registered in the catalog.
///
/// Column order mirrors the uploaded source and is stable for the
/// lifetime of the session.
#[derive(Debug, Clone, Serialize)]
pub struct Dataset {
    pub display_name: String,
    pub table_id: String,
    pub columns: Vec<ColumnSchema>,
    pub rows: Vec<Vec<JsonValue>>,
}

/// Upload payload handed over by the parsing front end: a display name
/// plus an already-typed, ordered table.
#[derive(Debug, Deserialize)]
pub struct RegisterDatasetRequest {
    pub name: String,
    pub columns: Vec<ColumnSchema>,
    pub rows: Vec<Vec<JsonValue>>,
}

/// Normalize a raw cell into a numeric value.
///
/// Text cells have thousands separators stripped before parsing. Anything
/// unparseable becomes `None` (a SQL NULL), never an error. Applying this
/// to an already-normalized number is a no-op.
pub fn numeric_cell(value: &JsonValue) -> Option<f64> {
    match value {
        JsonValue::Number(n) => n.as_f64(),
        JsonValue::String(s) => s.trim().replace(',', "").parse::<f64>().ok(),
        _ => None,
    }
}

/// Normalize a raw cell into a text value, with `null` kept as missing.
pub fn text_cell(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::Null => None,
        JsonValue::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
