//! Prometheus metrics handler
//!
//! Renders the global `metrics-exporter-prometheus` recorder as
//! Prometheus text.

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use metrics_exporter_prometheus::PrometheusHandle;

/// Shared state for the metrics endpoint. `None` when no recorder was
/// installed (tests, embedded use).
#[derive(Clone)]
pub struct MetricsState {
    pub handle: Option<PrometheusHandle>,
}

/// `GET /metrics`, Prometheus scrape endpoint (no auth)
pub async fn prometheus_metrics(State(state): State<MetricsState>) -> impl IntoResponse {
    match state.handle {
        Some(handle) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
            handle.render(),
        ),
        None => (
            StatusCode::SERVICE_UNAVAILABLE,
            [("content-type", "text/plain; charset=utf-8")],
            "metrics recorder not installed".to_string(),
        ),
    }
}
