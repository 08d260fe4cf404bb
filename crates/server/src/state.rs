//! Application State
//!
//! Shared state across all handlers.

use std::sync::Arc;

use voice_tts_config::Settings;
use voice_tts_pipeline::{CleanupService, SpeechService};

/// Application state
#[derive(Clone)]
pub struct AppState {
    /// Configuration
    pub config: Arc<Settings>,
    /// Request pipeline, including the precomputed voice styles
    pub service: Arc<SpeechService>,
    /// Output file cleanup
    pub cleanup: Arc<CleanupService>,
}

impl AppState {
    pub fn new(config: Settings, service: SpeechService) -> Self {
        let service = Arc::new(service);
        let cleanup = Arc::new(CleanupService::new(service.output().clone()));
        Self {
            config: Arc::new(config),
            service,
            cleanup,
        }
    }
}
