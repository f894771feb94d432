use axum::{extract::State, Json};

use crate::api::handlers::AppState;
use crate::api::middleware::AppError;
use crate::models::{ChartRequest, ChartResponse};
use crate::services::classifier::{bind, classify, classify_as};
use crate::services::session::ActiveView;

/// Classify the active view and emit a chart request for the renderer
pub async fn build_chart(
    State(state): State<AppState>,
    Json(payload): Json<ChartRequest>,
) -> Result<Json<ChartResponse>, AppError> {
    let session = state.session.read().await;

    let view = session
        .state
        .active_view(payload.use_latest_query)
        .ok_or_else(|| {
            AppError::NotFound("Nothing to visualize: no query result or dataset in view".to_string())
        })?;

    let (columns, rows) = match view {
        ActiveView::Query(result) => (result.columns.clone(), result.rows.clone()),
        ActiveView::Dataset(table_id) => {
            let dataset = session.catalog.get(table_id).ok_or_else(|| {
                AppError::NotFound(format!("Dataset '{}' not found", table_id))
            })?;
            (dataset.columns.clone(), dataset.rows.clone())
        }
    };

    let decision = match payload.family {
        Some(family) => match classify_as(family, &columns) {
            Ok(decision) => decision,
            // An unmet structural precondition is a warning, not a failure
            Err(AppError::InsufficientColumns(msg)) => {
                tracing::warn!(%msg, "requested chart family rejected");
                return Ok(Json(ChartResponse {
                    chart: None,
                    warning: Some(msg),
                }));
            }
            Err(err) => return Err(err),
        },
        None => classify(&columns),
    };

    let spec = bind(decision, columns, rows, payload.category_value.as_deref())?;

    Ok(Json(ChartResponse {
        chart: Some(spec),
        warning: None,
    }))
}
