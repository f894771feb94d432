use axum::{extract::State, Json};

use crate::api::handlers::AppState;
use crate::api::middleware::AppError;

/// Read the chat transcript in order
pub async fn get_transcript(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, AppError> {
    let session = state.session.read().await;

    Ok(Json(serde_json::json!({
        "messages": session.state.transcript(),
    })))
}
