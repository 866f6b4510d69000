//! Prometheus metrics
//!
//! The recorder is process-global, so `init_metrics` is called once from
//! `main`. Without it the `record_*` helpers are no-ops.

use std::time::Duration;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use metrics_exporter_prometheus::{BuildError, Matcher, PrometheusBuilder, PrometheusHandle};

use crate::state::AppState;

const LATENCY_BUCKETS: &[f64] = &[0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0];

/// Install the Prometheus recorder
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Suffix("latency_seconds".to_string()),
            LATENCY_BUCKETS,
        )?
        .install_recorder()
}

/// `GET /metrics`
pub async fn metrics_handler(State(state): State<AppState>) -> impl IntoResponse {
    match &state.metrics {
        Some(handle) => (StatusCode::OK, handle.render()),
        None => (StatusCode::NOT_FOUND, "metrics disabled".to_string()),
    }
}

pub fn record_chat_request(voice: bool) {
    metrics::counter!("sonocare_chat_requests_total", "voice" => voice.to_string()).increment(1);
}

pub fn record_error(kind: &'static str) {
    metrics::counter!("sonocare_http_errors_total", "kind" => kind).increment(1);
}

pub fn record_turn_latency(elapsed: Duration) {
    metrics::histogram!("sonocare_turn_latency_seconds").record(elapsed.as_secs_f64());
}
