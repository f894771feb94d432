use axum::{extract::State, Json};

use crate::api::handlers::AppState;
use crate::api::middleware::AppError;
use crate::models::{QueryRequest, QueryResult, QuestionRequest, Speaker};
use crate::services::{QueryTranslator, Session};

/// Execute a user-written SQL query
pub async fn execute_query(
    State(state): State<AppState>,
    Json(payload): Json<QueryRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    let sql = payload.sql.trim();
    if sql.is_empty() {
        return Err(AppError::Validation("SQL query cannot be empty".to_string()));
    }

    tracing::info!("Executing SQL query");

    let mut session = state.session.write().await;
    // On failure the prior cached result stays in place
    let result = session.engine.execute(sql).await?;
    session.state.record_query(result.clone());

    Ok(Json(serde_json::json!({ "result": result })))
}

/// Answer a natural-language question: translate to SQL, then execute
///
/// The transcript grows by exactly two entries per interaction: the
/// question, then the generated SQL or a placeholder for the failure.
pub async fn ask_question(
    State(state): State<AppState>,
    Json(payload): Json<QuestionRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    let question = payload.question.trim().to_string();
    if question.is_empty() {
        return Err(AppError::Validation("Question cannot be empty".to_string()));
    }

    let mut session = state.session.write().await;
    if session.catalog.is_empty() {
        return Err(AppError::Validation(
            "No datasets registered yet. Upload a dataset first.".to_string(),
        ));
    }

    let schema_summary = session.catalog.schema_summary();
    session.state.append_chat(Speaker::User, question.clone());

    match run_question(&state.translator, &mut session, &question, &schema_summary).await {
        Ok((sql, result)) => {
            session.state.append_chat(Speaker::Assistant, sql.clone());
            Ok(Json(serde_json::json!({
                "generated_sql": sql,
                "result": result,
            })))
        }
        Err(err) => {
            session
                .state
                .append_chat(Speaker::Assistant, format!("(failed: {})", err));
            Err(err)
        }
    }
}

async fn run_question(
    translator: &QueryTranslator,
    session: &mut Session,
    question: &str,
    schema_summary: &str,
) -> Result<(String, QueryResult), AppError> {
    // Translation failure means no execution is attempted
    let sql = translator.translate(question, schema_summary).await?;
    tracing::info!(%sql, "generated SQL from question");

    let result = session.engine.execute(&sql).await?;
    session.state.record_query(result.clone());

    Ok((sql, result))
}
