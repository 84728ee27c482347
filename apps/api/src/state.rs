use std::sync::Arc;

use crate::config::Config;
use crate::llm_client::Inference;
use crate::storage::GenerationStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Generation log and usage counter. Postgres in production, in-memory otherwise.
    pub store: Arc<dyn GenerationStore>,
    /// Provider client. Swapped for a scripted fake in tests.
    pub inference: Arc<dyn Inference>,
    pub config: Config,
}
