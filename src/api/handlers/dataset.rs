use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::api::handlers::AppState;
use crate::api::middleware::AppError;
use crate::models::RegisterDatasetRequest;

/// Register an uploaded table and make it queryable
pub async fn register_dataset(
    State(state): State<AppState>,
    Json(payload): Json<RegisterDatasetRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>), AppError> {
    let name = payload.name.trim();
    if name.is_empty() {
        return Err(AppError::Validation("Dataset name cannot be empty".to_string()));
    }
    if payload.columns.is_empty() {
        return Err(AppError::Validation(
            "Dataset must have at least one column".to_string(),
        ));
    }
    for (idx, row) in payload.rows.iter().enumerate() {
        if row.len() != payload.columns.len() {
            return Err(AppError::Validation(format!(
                "Row {} has {} cells, expected {}",
                idx,
                row.len(),
                payload.columns.len()
            )));
        }
    }

    tracing::info!(name = %name, rows = payload.rows.len(), "registering dataset");

    let mut session = state.session.write().await;
    let table_id = session.register_dataset(name, payload.columns, payload.rows)?;

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({ "table_id": table_id })),
    ))
}

/// List registered datasets and the schema summary fed to the translator
pub async fn list_datasets(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, AppError> {
    let session = state.session.read().await;

    let datasets: Vec<serde_json::Value> = session
        .catalog
        .datasets()
        .iter()
        .map(|d| {
            serde_json::json!({
                "display_name": d.display_name,
                "table_id": d.table_id,
                "columns": d.columns,
                "row_count": d.rows.len(),
            })
        })
        .collect();

    Ok(Json(serde_json::json!({
        "datasets": datasets,
        "schema_summary": session.catalog.schema_summary(),
    })))
}

/// Select the base dataset in view for visualization
pub async fn select_dataset(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let mut session = state.session.write().await;

    if session.catalog.get(&id).is_none() {
        return Err(AppError::NotFound(format!("Dataset '{}' not found", id)));
    }
    session.state.select_dataset(&id);

    Ok(Json(serde_json::json!({ "selected": id })))
}
