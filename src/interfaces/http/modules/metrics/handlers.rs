//! Prometheus scrape endpoint

use std::sync::OnceLock;

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tracing::warn;

#[derive(Clone)]
pub struct MetricsState {
    pub handle: PrometheusHandle,
}

static PROMETHEUS: OnceLock<PrometheusHandle> = OnceLock::new();

/// Install the process-wide Prometheus recorder once and return its handle.
///
/// When another recorder is already installed the handle still renders,
/// but only what this recorder sees.
pub fn prometheus_handle() -> PrometheusHandle {
    PROMETHEUS
        .get_or_init(|| {
            let recorder = PrometheusBuilder::new().build_recorder();
            let handle = recorder.handle();
            if let Err(e) = metrics::set_global_recorder(recorder) {
                warn!(error = %e, "Metrics recorder already installed");
            }
            handle
        })
        .clone()
}

/// `GET /metrics`, no auth
pub async fn prometheus_metrics(State(state): State<MetricsState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
        state.handle.render(),
    )
}
