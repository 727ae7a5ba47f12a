use std::sync::Arc;

use sqlx::PgPool;

use crate::config::Config;
use crate::llm_client::CompletionProvider;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    /// Text-completion backend for food parsing. `None` when no credentials are configured.
    pub completion: Option<Arc<dyn CompletionProvider>>,
    pub config: Config,
}

impl AppState {
    pub fn ai_available(&self) -> bool {
        self.completion.is_some()
    }
}
