//! Application State
//!
//! Shared, read-only state across all handlers.

use std::sync::Arc;

use metrics_exporter_prometheus::PrometheusHandle;
use sonocare_agent::ChatService;
use sonocare_config::Settings;

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Settings>,
    pub chat: Arc<ChatService>,
    /// Set when the Prometheus recorder is installed
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    pub fn new(config: Settings, chat: ChatService) -> Self {
        Self {
            config: Arc::new(config),
            chat: Arc::new(chat),
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}
