//! # Structured Logging
//!
//! Subscriber setup built on the `tracing` ecosystem.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{AppConfig, ObservabilityConfig};
use crate::errors::{Result, TodoplaneError};

/// Install the global subscriber. `RUST_LOG` overrides the configured level.
pub fn init_logging(config: &ObservabilityConfig) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .map_err(|e| {
            TodoplaneError::config(format!("Invalid log level '{}': {}", config.log_level, e))
        })?;

    let registry = tracing_subscriber::registry().with(env_filter);

    let result = if config.json_logging {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_current_span(true))
            .try_init()
    } else {
        registry.with(tracing_subscriber::fmt::layer().with_target(false)).try_init()
    };

    result.map_err(|e| TodoplaneError::internal(format!("Failed to install subscriber: {}", e)))
}

/// Log configuration at startup
pub fn log_config_info(config: &AppConfig) {
    tracing::info!(
        service = %config.observability.service_name,
        server_address = %config.server.bind_address(),
        database_url = %crate::storage::pool::sanitize_url(&config.database.url),
        token_expiry_seconds = config.auth.token_expiry_seconds,
        admin_routes_require_auth = config.auth.admin_routes_require_auth,
        admin_password_configured = config.admin.password.is_some(),
        cors_enabled = config.server.enable_cors,
        metrics_enabled = config.observability.enable_metrics,
        "todoplane service configuration"
    );

    for warning in config.security_warnings() {
        tracing::warn!(%warning, "configuration warning");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServiceKind;

    #[test]
    fn test_invalid_log_level_rejected() {
        // only meaningful when RUST_LOG is not set for the test process
        if std::env::var("RUST_LOG").is_ok() {
            return;
        }
        let config = ObservabilityConfig {
            log_level: "todoplane=notalevel".to_string(),
            ..Default::default()
        };
        assert!(init_logging(&config).is_err());
    }

    #[test]
    fn test_log_config_info() {
        let config = AppConfig::for_service(ServiceKind::Users);
        log_config_info(&config);
    }
}
