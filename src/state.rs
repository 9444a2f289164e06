//! Shared application state injected into every Axum handler.

use std::sync::Arc;

use crate::config::Config;
use crate::db::HistoryStore;
use crate::llm::CompletionClient;

/// State shared across all HTTP handlers.
///
/// Both handles are constructed once at startup and passed explicitly —
/// never reached for as globals — so the endpoint can be driven by stub
/// store / client implementations in tests.
#[derive(Clone)]
pub struct AppState {
    /// Server configuration (env-derived).
    pub config: Arc<Config>,
    /// Conversation log.  `None` when no database is configured or the
    /// startup connectivity check failed; the server then answers without
    /// history and persists nothing (degraded mode, logged at startup).
    pub history: Option<Arc<dyn HistoryStore>>,
    /// Client for the hosted completion service.
    pub llm: Arc<dyn CompletionClient>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .field("history", &self.history.is_some())
            .finish_non_exhaustive()
    }
}
