use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::api::handlers::{chart, chat, dataset, query, AppState};
use crate::config::Config;

/// Create the application router with a fresh analytical session
pub fn create_router(config: &Config) -> Router {
    let state = AppState::new(config);

    Router::new()
        .route("/health", get(health_check))
        .route(
            "/api/datasets",
            get(dataset::list_datasets).post(dataset::register_dataset),
        )
        .route("/api/datasets/{id}/select", post(dataset::select_dataset))
        .route("/api/query", post(query::execute_query))
        .route("/api/ask", post(query::ask_question))
        .route("/api/chart", post(chart::build_chart))
        .route("/api/chat", get(chat::get_transcript))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
