//! Prometheus metrics recording.

use metrics::{counter, gauge, histogram};
use std::time::Duration;

/// Records HTTP request metrics.
pub fn record_request(method: &str, path: &str, status: u16, duration: Duration) {
    let labels = [
        ("method", method.to_string()),
        ("path", path.to_string()),
        ("status", status.to_string()),
    ];
    counter!("http_requests_total", &labels).increment(1);
    histogram!("http_request_duration_seconds", &labels).record(duration.as_secs_f64());
}

/// Records the outcome of one answered (or failed) question.
pub fn record_ask(outcome: &'static str, duration: Duration) {
    counter!("ragserve_ask_total", "outcome" => outcome).increment(1);
    histogram!("ragserve_ask_duration_seconds", "outcome" => outcome)
        .record(duration.as_secs_f64());
}

/// Updates the corpus-level Prometheus gauges after a (re)index.
pub fn update_corpus_metrics(documents: usize, ready: bool) {
    gauge!("ragserve_documents_total").set(documents as f64);
    gauge!("ragserve_index_ready").set(if ready { 1.0 } else { 0.0 });
}
