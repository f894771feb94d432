use serde_json::Value as JsonValue;

use crate::api::middleware::AppError;
use crate::models::{numeric_cell, text_cell, ColumnSchema, ColumnType, Dataset};

/// Derive a queryable identifier from a display name: lowercase, collapse
/// every run of non-alphanumeric characters into a single underscore,
/// then strip trailing `_csv`/`_xlsx` suffixes.
///
/// `"Route Details.csv"` becomes `route_details`. Idempotent.
pub fn sanitize_table_id(display_name: &str) -> String {
    let mut id = String::with_capacity(display_name.len());
    let mut in_separator = false;

    for ch in display_name.chars() {
        if ch.is_alphanumeric() {
            id.extend(ch.to_lowercase());
            in_separator = false;
        } else if !in_separator {
            id.push('_');
            in_separator = true;
        }
    }

    // Strip until no suffix remains, so re-sanitizing the output is a
    // no-op even for names like "data.csv.csv"
    loop {
        let mut stripped = false;
        for suffix in ["_csv", "_xlsx"] {
            if id.ends_with(suffix) {
                let stripped_len = id.len() - suffix.len();
                id.truncate(stripped_len);
                stripped = true;
            }
        }
        if !stripped {
            break;
        }
    }

    id
}

/// Registry of uploaded datasets, keyed by sanitized identifier.
///
/// Registration order is preserved so the schema summary injected into
/// translation prompts is deterministic. The catalog never shrinks
/// within a session.
#[derive(Debug, Default)]
pub struct DatasetCatalog {
    datasets: Vec<Dataset>,
}

impl DatasetCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an uploaded table under its sanitized identifier.
    ///
    /// A colliding identifier is rejected rather than overwritten:
    /// overwriting would corrupt queries already referencing the table.
    pub fn register(
        &mut self,
        display_name: &str,
        columns: Vec<ColumnSchema>,
        rows: Vec<Vec<JsonValue>>,
    ) -> Result<&Dataset, AppError> {
        let table_id = sanitize_table_id(display_name);

        if self.datasets.iter().any(|d| d.table_id == table_id) {
            return Err(AppError::DuplicateIdentifier(format!(
                "dataset '{}' sanitizes to '{}', which is already registered",
                display_name, table_id
            )));
        }

        // Normalize cells once here so every consumer, the base-dataset
        // chart view included, sees final values
        let rows = normalize_rows(&columns, rows);

        self.datasets.push(Dataset {
            display_name: display_name.to_string(),
            table_id,
            columns,
            rows,
        });

        match self.datasets.last() {
            Some(dataset) => Ok(dataset),
            None => Err(AppError::Internal(
                "catalog insertion failed".to_string(),
            )),
        }
    }

    /// Roll back a registration whose engine-side setup failed, so the
    /// identifier stays free for a retry.
    pub(crate) fn remove(&mut self, table_id: &str) {
        self.datasets.retain(|d| d.table_id != table_id);
    }

    pub fn get(&self, table_id: &str) -> Option<&Dataset> {
        self.datasets.iter().find(|d| d.table_id == table_id)
    }

    pub fn datasets(&self) -> &[Dataset] {
        &self.datasets
    }

    pub fn is_empty(&self) -> bool {
        self.datasets.is_empty()
    }

    /// One line per dataset, in registration order:
    /// `Table <tableId>: <col1>, <col2>, ...`
    ///
    /// This is the exact text injected into translation prompts, so it
    /// covers every dataset and every column, untruncated.
    pub fn schema_summary(&self) -> String {
        let mut summary = String::new();
        for dataset in &self.datasets {
            let columns: Vec<&str> = dataset.columns.iter().map(|c| c.name.as_str()).collect();
            summary.push_str(&format!(
                "Table {}: {}\n",
                dataset.table_id,
                columns.join(", ")
            ));
        }
        summary
    }
}

/// Apply the idempotent cell normalization to a whole upload: numeric
/// cells parsed (thousands separators stripped, failures to null), text
/// cells stringified, missing cells filled with null.
fn normalize_rows(
    columns: &[ColumnSchema],
    rows: Vec<Vec<JsonValue>>,
) -> Vec<Vec<JsonValue>> {
    rows.into_iter()
        .map(|row| {
            columns
                .iter()
                .enumerate()
                .map(|(idx, col)| {
                    let cell = row.get(idx).unwrap_or(&JsonValue::Null);
                    match col.column_type {
                        ColumnType::Numeric => numeric_cell(cell)
                            .map(JsonValue::from)
                            .unwrap_or(JsonValue::Null),
                        ColumnType::Text => text_cell(cell)
                            .map(JsonValue::String)
                            .unwrap_or(JsonValue::Null),
                    }
                })
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ColumnType;

    fn columns(names: &[&str]) -> Vec<ColumnSchema> {
        names
            .iter()
            .map(|n| ColumnSchema::new(*n, ColumnType::Text))
            .collect()
    }

    #[test]
    fn test_sanitize_basic() {
        assert_eq!(sanitize_table_id("Route Details.csv"), "route_details");
        assert_eq!(sanitize_table_id("Sales Q1 2024.xlsx"), "sales_q1_2024");
        assert_eq!(sanitize_table_id("orders"), "orders");
    }

    #[test]
    fn test_sanitize_collapses_separator_runs() {
        assert_eq!(sanitize_table_id("a -- b...csv"), "a_b");
        assert_eq!(sanitize_table_id("Weird   name!!"), "weird_name_");
    }

    #[test]
    fn test_sanitize_is_idempotent() {
        for name in [
            "Route Details.csv",
            "a -- b...csv",
            "  x  ",
            "data.xlsx",
            "data.csv.csv",
            "data.csv.xlsx",
            "report.xlsx.xlsx.csv",
        ] {
            let once = sanitize_table_id(name);
            assert_eq!(sanitize_table_id(&once), once, "not idempotent for {name:?}");
        }
    }

    #[test]
    fn test_sanitize_strips_chained_suffixes() {
        assert_eq!(sanitize_table_id("data.csv"), "data");
        assert_eq!(sanitize_table_id("data.xlsx"), "data");
        assert_eq!(sanitize_table_id("data.csv.csv"), "data");
        assert_eq!(sanitize_table_id("data.csv.xlsx"), "data");
        // Suffix in the middle of the name is not touched
        assert_eq!(sanitize_table_id("csv_totals.csv"), "csv_totals");
    }

    #[test]
    fn test_register_and_lookup() {
        let mut catalog = DatasetCatalog::new();
        let id = catalog
            .register("Route Details.csv", columns(&["stop", "time"]), vec![])
            .unwrap()
            .table_id
            .clone();
        assert_eq!(id, "route_details");
        assert!(catalog.get("route_details").is_some());
        assert!(catalog.get("missing").is_none());
    }

    #[test]
    fn test_duplicate_identifier_rejected_catalog_unchanged() {
        let mut catalog = DatasetCatalog::new();
        catalog.register("a.csv", columns(&["x"]), vec![]).unwrap();

        // Different upload, same sanitized identifier
        let err = catalog.register("a.xlsx", columns(&["y"]), vec![]);
        assert!(matches!(err, Err(AppError::DuplicateIdentifier(_))));

        assert_eq!(catalog.datasets().len(), 1);
        let kept = catalog.get("a").unwrap();
        assert_eq!(kept.display_name, "a.csv");
        assert_eq!(kept.columns[0].name, "x");
    }

    #[test]
    fn test_rows_normalized_at_registration() {
        use serde_json::json;

        let mut catalog = DatasetCatalog::new();
        let dataset = catalog
            .register(
                "Cities.csv",
                vec![
                    ColumnSchema::new("city", ColumnType::Text),
                    ColumnSchema::new("population", ColumnType::Numeric),
                ],
                vec![
                    vec![json!("Bergen"), json!("291,000")],
                    vec![json!("Tromsø"), json!("n/a")],
                    vec![json!(42), json!(709_000)],
                ],
            )
            .unwrap();

        // Numeric cells are parsed with separators stripped, failures
        // become null, and non-string text cells are stringified; the
        // stored rows are what every consumer sees
        assert_eq!(dataset.rows[0], vec![json!("Bergen"), json!(291_000.0)]);
        assert_eq!(dataset.rows[1][1], JsonValue::Null);
        assert_eq!(dataset.rows[2], vec![json!("42"), json!(709_000.0)]);
    }

    #[test]
    fn test_remove_frees_identifier_for_retry() {
        let mut catalog = DatasetCatalog::new();
        catalog.register("a.csv", columns(&["x"]), vec![]).unwrap();

        catalog.remove("a");
        assert!(catalog.get("a").is_none());
        assert!(catalog.register("a.csv", columns(&["x"]), vec![]).is_ok());
    }

    #[test]
    fn test_schema_summary_registration_order() {
        let mut catalog = DatasetCatalog::new();
        catalog
            .register("Routes.csv", columns(&["stop", "lat", "lon"]), vec![])
            .unwrap();
        catalog
            .register("Fares.csv", columns(&["zone", "price"]), vec![])
            .unwrap();

        assert_eq!(
            catalog.schema_summary(),
            "Table routes: stop, lat, lon\nTable fares: zone, price\n"
        );
    }
}
