// Chart classifier
//
// Pure decision table from a result's column-type signature to a chart
// family. No rendering dependency; the renderer receives the decision
// plus bound data and draws it on its own.

use serde_json::Value as JsonValue;

use crate::api::middleware::AppError;
use crate::models::{ChartDecision, ChartFamily, ChartSpec, ColumnSchema, ColumnType};

fn numeric_columns(columns: &[ColumnSchema]) -> Vec<&ColumnSchema> {
    columns
        .iter()
        .filter(|c| c.column_type == ColumnType::Numeric)
        .collect()
}

fn text_columns(columns: &[ColumnSchema]) -> Vec<&ColumnSchema> {
    columns
        .iter()
        .filter(|c| c.column_type == ColumnType::Text)
        .collect()
}

fn find_coordinates(columns: &[ColumnSchema]) -> Option<(&ColumnSchema, &ColumnSchema)> {
    let lat = columns.iter().find(|c| c.name == "lat")?;
    let lon = columns.iter().find(|c| c.name == "lon")?;
    Some((lat, lon))
}

/// Pick a chart family for a column-type signature.
///
/// An ordered decision table; the first matching rule wins and the
/// ordering is a contract. In particular, a shape with more than two
/// numeric columns and exactly one text column is a radar, not a
/// heatmap.
pub fn classify(columns: &[ColumnSchema]) -> ChartDecision {
    let numeric = numeric_columns(columns);
    let text = text_columns(columns);

    // 1. Geographic pair, matched by exact name
    if let Some((lat, lon)) = find_coordinates(columns) {
        return ChartDecision::Map {
            lat: lat.name.clone(),
            lon: lon.name.clone(),
        };
    }

    // 2. One measure against a categorical axis
    if numeric.len() == 1 && !text.is_empty() {
        return ChartDecision::Bar {
            category: text[0].name.clone(),
            value: numeric[0].name.clone(),
        };
    }

    // 3. Exactly two measures, nothing categorical
    if numeric.len() == 2 && text.is_empty() {
        return ChartDecision::Scatter {
            x: numeric[0].name.clone(),
            y: numeric[1].name.clone(),
        };
    }

    // 4. Many measures per single category: radar candidate
    if numeric.len() > 2 && text.len() == 1 {
        return ChartDecision::Radar {
            category: text[0].name.clone(),
            metrics: numeric.iter().map(|c| c.name.clone()).collect(),
        };
    }

    // 5. Many measures otherwise: correlation heatmap
    if numeric.len() > 2 {
        return ChartDecision::Heatmap {
            metrics: numeric.iter().map(|c| c.name.clone()).collect(),
        };
    }

    // 6. Always renderable
    ChartDecision::Table
}

/// Build the decision for an explicitly requested family, checking its
/// structural precondition against the column signature.
pub fn classify_as(
    family: ChartFamily,
    columns: &[ColumnSchema],
) -> Result<ChartDecision, AppError> {
    let numeric = numeric_columns(columns);
    let text = text_columns(columns);

    match family {
        ChartFamily::Map => find_coordinates(columns)
            .map(|(lat, lon)| ChartDecision::Map {
                lat: lat.name.clone(),
                lon: lon.name.clone(),
            })
            .ok_or_else(|| {
                AppError::InsufficientColumns(
                    "a map needs 'lat' and 'lon' columns".to_string(),
                )
            }),
        ChartFamily::Bar => {
            if !numeric.is_empty() && !text.is_empty() {
                Ok(ChartDecision::Bar {
                    category: text[0].name.clone(),
                    value: numeric[0].name.clone(),
                })
            } else {
                Err(AppError::InsufficientColumns(
                    "a bar chart needs a categorical column and a numeric column".to_string(),
                ))
            }
        }
        ChartFamily::Scatter => {
            if numeric.len() >= 2 {
                Ok(ChartDecision::Scatter {
                    x: numeric[0].name.clone(),
                    y: numeric[1].name.clone(),
                })
            } else {
                Err(AppError::InsufficientColumns(
                    "a scatter plot needs at least two numeric columns".to_string(),
                ))
            }
        }
        ChartFamily::Radar => {
            if !text.is_empty() && !numeric.is_empty() {
                Ok(ChartDecision::Radar {
                    category: text[0].name.clone(),
                    metrics: numeric.iter().map(|c| c.name.clone()).collect(),
                })
            } else {
                Err(AppError::InsufficientColumns(
                    "a radar chart needs a category column and at least one numeric metric"
                        .to_string(),
                ))
            }
        }
        ChartFamily::Heatmap => {
            if numeric.len() >= 2 {
                Ok(ChartDecision::Heatmap {
                    metrics: numeric.iter().map(|c| c.name.clone()).collect(),
                })
            } else {
                Err(AppError::InsufficientColumns(
                    "a heatmap needs at least two numeric columns".to_string(),
                ))
            }
        }
        ChartFamily::Table => Ok(ChartDecision::Table),
    }
}

/// Attach data to a decision for the rendering collaborator.
///
/// A radar decision needs a user-chosen category value to select the
/// one row it plots; without one it degrades to a table.
pub fn bind(
    decision: ChartDecision,
    columns: Vec<ColumnSchema>,
    rows: Vec<Vec<JsonValue>>,
    category_value: Option<&str>,
) -> Result<ChartSpec, AppError> {
    match decision {
        ChartDecision::Radar { category, metrics } => {
            let Some(value) = category_value else {
                return Ok(ChartSpec {
                    decision: ChartDecision::Table,
                    columns,
                    rows,
                });
            };

            let category_idx = columns
                .iter()
                .position(|c| c.name == category)
                .ok_or_else(|| {
                    AppError::Internal(format!(
                        "category column '{}' missing from bound data",
                        category
                    ))
                })?;

            let row = rows
                .into_iter()
                .find(|row| row.get(category_idx).and_then(|v| v.as_str()) == Some(value))
                .ok_or_else(|| {
                    AppError::Validation(format!("no row with {} = '{}'", category, value))
                })?;

            Ok(ChartSpec {
                decision: ChartDecision::Radar { category, metrics },
                columns,
                rows: vec![row],
            })
        }
        other => Ok(ChartSpec {
            decision: other,
            columns,
            rows,
        }),
    }
}
