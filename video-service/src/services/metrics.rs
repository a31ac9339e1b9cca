//! Metrics collection and Prometheus export.

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;
use std::time::Duration;

/// Global handle to the Prometheus recorder.
pub static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Install the Prometheus recorder.
///
/// Call once at startup before any metrics are recorded. Without it the
/// `metrics` macros are no-ops, which is what tests rely on.
pub fn init_metrics() {
    let builder = PrometheusBuilder::new();
    let handle = builder
        .install_recorder()
        .expect("failed to install Prometheus recorder");

    if METRICS_HANDLE.set(handle).is_err() {
        panic!("failed to set metrics handle: already initialized");
    }
}

/// Current metrics in Prometheus text format.
pub fn get_metrics() -> String {
    METRICS_HANDLE
        .get()
        .map(|handle| handle.render())
        .unwrap_or_else(|| "# Metrics recorder not initialized".to_string())
}

/// Record one generation attempt. `outcome` is `completed`, `failed` or `error`.
pub fn record_generation(orchestrator: &'static str, outcome: &'static str, elapsed: Duration) {
    counter!(
        "video_generations_total",
        "orchestrator" => orchestrator,
        "outcome" => outcome
    )
    .increment(1);
    histogram!(
        "video_generation_duration_seconds",
        "orchestrator" => orchestrator
    )
    .record(elapsed.as_secs_f64());
}

/// Record a retrieval. `found` distinguishes served files from 404s.
pub fn record_retrieval(found: bool) {
    counter!(
        "video_retrievals_total",
        "result" => if found { "served" } else { "not_found" }
    )
    .increment(1);
}
