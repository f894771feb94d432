use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use super::dataset::ColumnSchema;

/// Materialized output of one query execution.
///
/// Superseded wholesale by the next successful execution; a failed
/// execution leaves the previous result untouched.
#[derive(Debug, Clone, Serialize)]
pub struct QueryResult {
    pub columns: Vec<ColumnSchema>,
    pub rows: Vec<Vec<JsonValue>>,
    pub row_count: usize,
    pub query_text: String,
}

#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    pub sql: String,
}

#[derive(Debug, Deserialize)]
pub struct QuestionRequest {
    pub question: String,
}
