use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use super::dataset::ColumnSchema;

/// Chart-family decision with the minimal field bindings each family
/// needs. Computed fresh for every view, never stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "family", rename_all = "lowercase")]
pub enum ChartDecision {
    Bar { category: String, value: String },
    Scatter { x: String, y: String },
    Radar { category: String, metrics: Vec<String> },
    Heatmap { metrics: Vec<String> },
    Map { lat: String, lon: String },
    Table,
}

/// Chart family a client may explicitly request instead of relying on
/// automatic classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartFamily {
    Bar,
    Scatter,
    Radar,
    Heatmap,
    Map,
    Table,
}

#[derive(Debug, Deserialize)]
pub struct ChartRequest {
    /// Visualize the cached query result rather than the selected base
    /// dataset. The cached result wins by default once one exists.
    #[serde(default = "default_use_latest_query")]
    pub use_latest_query: bool,
    /// Explicit family override; omitted means automatic classification.
    pub family: Option<ChartFamily>,
    /// Category value selecting the single row a radar chart plots.
    pub category_value: Option<String>,
}

fn default_use_latest_query() -> bool {
    true
}

/// Declarative chart request handed to the rendering collaborator:
/// the decision plus the data bound to it.
#[derive(Debug, Serialize)]
pub struct ChartSpec {
    #[serde(flatten)]
    pub decision: ChartDecision,
    pub columns: Vec<ColumnSchema>,
    pub rows: Vec<Vec<JsonValue>>,
}

#[derive(Debug, Serialize)]
pub struct ChartResponse {
    pub chart: Option<ChartSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}
