//! # Configuration Management
//!
//! Layered configuration: per-service defaults, an optional file named by
//! `TODOPLANE_CONFIG_FILE`, `TODOPLANE__SECTION__KEY` environment variables and
//! finally the legacy variables of the original deployment.

pub mod settings;

pub use settings::{
    AdminConfig, AppConfig, AuthConfig, DatabaseConfig, ObservabilityConfig, ServerConfig,
    ServiceKind,
};

use crate::errors::Result;

/// Environment variable naming an optional configuration file
pub const ENV_CONFIG_FILE: &str = "TODOPLANE_CONFIG_FILE";

const ENV_PREFIX: &str = "TODOPLANE";

impl AppConfig {
    /// Load and validate configuration for `kind` from the process environment.
    pub fn load(kind: ServiceKind) -> Result<Self> {
        let defaults = Self::for_service(kind);

        let mut builder =
            config::Config::builder().add_source(config::Config::try_from(&defaults)?);

        if let Ok(path) = std::env::var(ENV_CONFIG_FILE) {
            builder = builder.add_source(config::File::with_name(&path).required(true));
        }

        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("server.cors_origins"),
        );

        let mut config: AppConfig = builder.build()?.try_deserialize()?;
        config.apply_legacy_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;

        Ok(config)
    }
}
