//! # Metrics Collection
//!
//! Prometheus metrics for both services, rendered at `/metrics`.

use std::time::Instant;

use axum::{
    extract::{MatchedPath, Request, State},
    http::header,
    middleware::Next,
    response::{IntoResponse, Response},
};
use metrics::{counter, describe_counter, describe_histogram, histogram, Unit};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;
use tracing::info;

use crate::errors::{AuthErrorType, Result, TodoplaneError};

const PROMETHEUS_CONTENT_TYPE: &str = "text/plain; version=0.0.4";

/// Process-wide exporter handle; the `metrics` facade allows one recorder per process
static PROMETHEUS: OnceCell<PrometheusHandle> = OnceCell::new();

/// Metrics recorder that tracks request and authentication activity
#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsRecorder;

impl MetricsRecorder {
    pub fn new() -> Self {
        Self
    }

    /// Record a completed HTTP request
    pub fn record_http_request(&self, method: &str, path: &str, status: u16, duration: f64) {
        let request_labels = [
            ("method", method.to_string()),
            ("path", path.to_string()),
            ("status", status.to_string()),
        ];
        counter!("http_requests_total", &request_labels).increment(1);

        let duration_labels = [("method", method.to_string()), ("path", path.to_string())];
        histogram!("http_request_duration_seconds", &duration_labels).record(duration);
    }

    /// Record the outcome of a bearer token check
    pub fn record_authentication(&self, outcome: &str) {
        counter!("auth_authentications_total", "outcome" => outcome.to_string()).increment(1);
    }

    /// Describe the metrics and zero the auth counters so they export before any traffic.
    pub fn register_metrics(&self) {
        describe_counter!("http_requests_total", Unit::Count, "HTTP requests by route and status");
        describe_histogram!(
            "http_request_duration_seconds",
            Unit::Seconds,
            "HTTP request latency by route"
        );
        describe_counter!(
            "auth_authentications_total",
            Unit::Count,
            "Bearer token checks grouped by outcome"
        );

        counter!("auth_authentications_total", "outcome" => "success").absolute(0);
        for error_type in [
            AuthErrorType::MissingToken,
            AuthErrorType::InvalidToken,
            AuthErrorType::ExpiredToken,
        ] {
            counter!("auth_authentications_total", "outcome" => error_type.to_string())
                .absolute(0);
        }
    }
}

/// Install the Prometheus recorder on first use and return its handle.
pub fn prometheus_handle() -> Result<PrometheusHandle> {
    PROMETHEUS
        .get_or_try_init(|| {
            let handle = PrometheusBuilder::new().install_recorder().map_err(|e| {
                TodoplaneError::config(format!("Failed to initialize metrics exporter: {}", e))
            })?;
            MetricsRecorder::new().register_metrics();
            info!("Metrics collection initialized");
            Ok(handle)
        })
        .cloned()
}

/// `GET /metrics` in the Prometheus text format
pub async fn metrics_handler(State(handle): State<PrometheusHandle>) -> impl IntoResponse {
    ([(header::CONTENT_TYPE, PROMETHEUS_CONTENT_TYPE)], handle.render())
}

/// Route-level middleware recording one counter sample and one latency sample per request.
///
/// The route template (`/todos/{id}`) is the path label, keeping cardinality bounded.
pub async fn track_http_metrics(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let path = request
        .extensions()
        .get::<MatchedPath>()
        .map(|matched| matched.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());

    let response = next.run(request).await;

    MetricsRecorder::new().record_http_request(
        &method,
        &path,
        response.status().as_u16(),
        start.elapsed().as_secs_f64(),
    );
    response
}
