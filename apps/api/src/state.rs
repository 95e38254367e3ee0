use std::sync::Arc;
use std::time::Duration;

use crate::llm_client::TextGenerator;
use crate::storage::Storage;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Storage>,
    pub llm: Arc<dyn TextGenerator>,
    /// Delay between document analysis attempts (2s in production).
    pub parse_retry_delay: Duration,
}
