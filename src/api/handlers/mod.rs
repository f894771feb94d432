use std::sync::Arc;
use tokio::sync::RwLock;

use crate::config::Config;
use crate::services::{QueryTranslator, Session};

pub mod chart;
pub mod chat;
pub mod dataset;
pub mod query;

/// Application state
///
/// One analytical session per server process. Handlers take the session
/// lock for the whole interaction, so registrations, executions,
/// translations and classifications never overlap.
#[derive(Clone)]
pub struct AppState {
    pub translator: Arc<QueryTranslator>,
    pub session: Arc<RwLock<Session>>,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        Self {
            translator: Arc::new(QueryTranslator::new(config)),
            session: Arc::new(RwLock::new(Session::new())),
        }
    }
}
