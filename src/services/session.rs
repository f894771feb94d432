// Session state
//
// Holds everything one analytical session owns: the catalog of uploaded
// datasets, the query engine they are registered with, and the mutable
// view/chat state. One session per server process; no hidden globals.

use serde_json::Value as JsonValue;

use crate::api::middleware::AppError;
use crate::models::{ChatMessage, ColumnSchema, QueryResult, Speaker};
use crate::services::catalog::DatasetCatalog;
use crate::services::engine::QueryEngine;

/// The data currently in view for visualization: either the cached
/// query result or a base dataset from the catalog.
#[derive(Debug)]
pub enum ActiveView<'a> {
    Query(&'a QueryResult),
    Dataset(&'a str),
}

/// Read-mostly per-session state, decoupled from the catalog.
#[derive(Debug, Default)]
pub struct SessionState {
    current_result: Option<QueryResult>,
    selected_dataset: Option<String>,
    transcript: Vec<ChatMessage>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the cached query result. The originating datasets are
    /// never touched; a failed execution must not call this.
    pub fn record_query(&mut self, result: QueryResult) {
        self.current_result = Some(result);
    }

    pub fn latest_result(&self) -> Option<&QueryResult> {
        self.current_result.as_ref()
    }

    pub fn select_dataset(&mut self, table_id: impl Into<String>) {
        self.selected_dataset = Some(table_id.into());
    }

    pub fn selected_dataset(&self) -> Option<&str> {
        self.selected_dataset.as_deref()
    }

    /// The only switch between raw-data and query-derived visualization.
    /// The cached result wins once one exists, unless the caller opts
    /// out with `use_latest_query = false`.
    pub fn active_view(&self, use_latest_query: bool) -> Option<ActiveView<'_>> {
        if use_latest_query {
            if let Some(result) = &self.current_result {
                return Some(ActiveView::Query(result));
            }
        }
        self.selected_dataset.as_deref().map(ActiveView::Dataset)
    }

    /// Append-only; the transcript is never trimmed within a session.
    pub fn append_chat(&mut self, speaker: Speaker, message: impl Into<String>) {
        self.transcript.push(ChatMessage::new(speaker, message));
    }

    pub fn transcript(&self) -> &[ChatMessage] {
        &self.transcript
    }
}

/// One analytical session: catalog, engine, and mutable state, owned
/// together and handed to one interaction at a time.
pub struct Session {
    pub catalog: DatasetCatalog,
    pub engine: QueryEngine,
    pub state: SessionState,
}

impl Session {
    pub fn new() -> Self {
        Self {
            catalog: DatasetCatalog::new(),
            engine: QueryEngine::new(),
            state: SessionState::new(),
        }
    }

    /// Register an uploaded table with the catalog and make it
    /// queryable. The first registered dataset becomes the selected
    /// base view.
    pub fn register_dataset(
        &mut self,
        display_name: &str,
        columns: Vec<ColumnSchema>,
        rows: Vec<Vec<JsonValue>>,
    ) -> Result<String, AppError> {
        let dataset = self.catalog.register(display_name, columns, rows)?;
        let table_id = dataset.table_id.clone();

        // Keep catalog and engine in step: a dataset the engine cannot
        // serve must not occupy its identifier
        if let Err(err) = self.engine.register_table(dataset) {
            self.catalog.remove(&table_id);
            return Err(err);
        }

        if self.state.selected_dataset().is_none() {
            self.state.select_dataset(&table_id);
        }

        Ok(table_id)
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ColumnType;
    use serde_json::json;

    fn result_named(query_text: &str) -> QueryResult {
        QueryResult {
            columns: vec![ColumnSchema::new("n", ColumnType::Numeric)],
            rows: vec![vec![json!(1)]],
            row_count: 1,
            query_text: query_text.to_string(),
        }
    }

    #[test]
    fn test_record_query_supersedes_previous() {
        let mut state = SessionState::new();
        state.record_query(result_named("first"));
        state.record_query(result_named("second"));

        assert_eq!(state.latest_result().unwrap().query_text, "second");
    }

    #[test]
    fn test_active_view_prefers_cached_result() {
        let mut state = SessionState::new();
        state.select_dataset("routes");
        state.record_query(result_named("q"));

        match state.active_view(true) {
            Some(ActiveView::Query(result)) => assert_eq!(result.query_text, "q"),
            other => panic!("expected query view, got {:?}", other),
        }
    }

    #[test]
    fn test_active_view_toggle_back_to_dataset() {
        let mut state = SessionState::new();
        state.select_dataset("routes");
        state.record_query(result_named("q"));

        match state.active_view(false) {
            Some(ActiveView::Dataset(id)) => assert_eq!(id, "routes"),
            other => panic!("expected dataset view, got {:?}", other),
        }
    }

    #[test]
    fn test_active_view_empty_session() {
        let state = SessionState::new();
        assert!(state.active_view(true).is_none());
        assert!(state.active_view(false).is_none());
    }

    #[test]
    fn test_failed_query_leaves_view_unchanged() {
        // A failed execution never reaches record_query, so the cached
        // result survives.
        let mut state = SessionState::new();
        state.record_query(result_named("good"));

        match state.active_view(true) {
            Some(ActiveView::Query(result)) => assert_eq!(result.query_text, "good"),
            other => panic!("expected query view, got {:?}", other),
        }
    }

    #[test]
    fn test_append_chat_grows_by_one_in_order() {
        let mut state = SessionState::new();
        for i in 0..5 {
            state.append_chat(Speaker::User, format!("m{}", i));
            assert_eq!(state.transcript().len(), i + 1);
        }

        let messages: Vec<&str> = state
            .transcript()
            .iter()
            .map(|m| m.message.as_str())
            .collect();
        assert_eq!(messages, vec!["m0", "m1", "m2", "m3", "m4"]);
    }

    #[tokio::test]
    async fn test_failed_execution_preserves_cached_result() {
        let mut session = Session::new();
        session
            .register_dataset(
                "Fares.csv",
                vec![
                    ColumnSchema::new("zone", ColumnType::Text),
                    ColumnSchema::new("price", ColumnType::Numeric),
                ],
                vec![vec![json!("A"), json!(4)], vec![json!("B"), json!(6)]],
            )
            .unwrap();

        let good = session
            .engine
            .execute("SELECT zone, price FROM fares")
            .await
            .unwrap();
        session.state.record_query(good);

        // Invalid query errors out before record_query is ever reached
        let err = session.engine.execute("SELECT nope FROM nowhere").await;
        assert!(err.is_err());

        match session.state.active_view(true) {
            Some(ActiveView::Query(result)) => {
                assert_eq!(result.query_text, "SELECT zone, price FROM fares");
                assert_eq!(result.row_count, 2);
            }
            other => panic!("expected query view, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_first_registration_selects_dataset() {
        let mut session = Session::new();
        session
            .register_dataset(
                "Routes.csv",
                vec![ColumnSchema::new("stop", ColumnType::Text)],
                vec![vec![json!("central")]],
            )
            .unwrap();
        session
            .register_dataset(
                "Fares.csv",
                vec![ColumnSchema::new("price", ColumnType::Numeric)],
                vec![vec![json!(4)]],
            )
            .unwrap();

        assert_eq!(session.state.selected_dataset(), Some("routes"));
    }
}
