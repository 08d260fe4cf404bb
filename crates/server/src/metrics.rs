//! Observability Metrics
//!
//! Prometheus metrics endpoint for monitoring.

use axum::{
    http::{header, StatusCode},
    response::IntoResponse,
};
use metrics::{counter, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;

/// Global Prometheus handle
static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Initialize metrics recorder
///
/// Must be called once at startup before recording any metrics.
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    let handle = PrometheusBuilder::new().install_recorder()?;

    register_default_metrics();

    METRICS_HANDLE.get_or_init(|| handle.clone());
    Ok(handle)
}

/// Get the global metrics handle
pub fn get_metrics_handle() -> Option<&'static PrometheusHandle> {
    METRICS_HANDLE.get()
}

fn register_default_metrics() {
    counter!("voice_tts_requests_total", "outcome" => "ok").absolute(0);
    counter!("voice_tts_requests_total", "outcome" => "client_error").absolute(0);
    counter!("voice_tts_requests_total", "outcome" => "server_error").absolute(0);

    counter!("voice_tts_outputs_purged_total").absolute(0);
}

/// Record a finished synthesis request
pub fn record_request(outcome: &'static str) {
    counter!("voice_tts_requests_total", "outcome" => outcome).increment(1);
}

/// Record end-to-end synthesis latency
pub fn record_synthesis_latency(duration_secs: f64) {
    histogram!("voice_tts_synthesis_duration_seconds").record(duration_secs);
}

/// Record the length of generated audio
pub fn record_audio_duration(duration_secs: f64) {
    histogram!("voice_tts_audio_duration_seconds").record(duration_secs);
}

/// Record a failed request by error kind
pub fn record_error(kind: &'static str) {
    counter!("voice_tts_errors_total", "kind" => kind).increment(1);
}

/// Record deleted output files
pub fn record_purged(count: usize) {
    counter!("voice_tts_outputs_purged_total").increment(count as u64);
}

/// Metrics endpoint handler
///
/// Returns Prometheus-formatted metrics.
pub async fn metrics_handler() -> impl IntoResponse {
    match get_metrics_handle() {
        Some(handle) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4; charset=utf-8")],
            handle.render(),
        ),
        None => (
            StatusCode::SERVICE_UNAVAILABLE,
            [(header::CONTENT_TYPE, "text/plain")],
            "Metrics not initialized".to_string(),
        ),
    }
}
