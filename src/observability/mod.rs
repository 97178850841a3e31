//! # Observability
//!
//! Structured logging and Prometheus metrics for both services.

pub mod logging;
pub mod metrics;

pub use logging::{init_logging, log_config_info};
pub use metrics::{metrics_handler, prometheus_handle, track_http_metrics, MetricsRecorder};
