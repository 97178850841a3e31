//! # Configuration Settings
//!
//! Defines the configuration tree shared by the user and todo services.

use crate::errors::{Result, TodoplaneError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use validator::Validate;

/// Recommended minimum length for the token signing secret
pub const RECOMMENDED_SECRET_LEN: usize = 32;

/// Which of the two services a configuration is for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceKind {
    Users,
    Todos,
}

impl ServiceKind {
    pub fn name(&self) -> &'static str {
        match self {
            ServiceKind::Users => "user-service",
            ServiceKind::Todos => "todo-service",
        }
    }

    pub fn default_port(&self) -> u16 {
        match self {
            ServiceKind::Users => 8001,
            ServiceKind::Todos => 8002,
        }
    }

    pub fn default_database_url(&self) -> String {
        match self {
            ServiceKind::Users => "sqlite://./data/users.db".to_string(),
            ServiceKind::Todos => "sqlite://./data/todos.db".to_string(),
        }
    }
}

impl fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AppConfig {
    #[validate(nested)]
    pub server: ServerConfig,

    #[validate(nested)]
    pub database: DatabaseConfig,

    #[validate(nested)]
    pub auth: AuthConfig,

    #[validate(nested)]
    pub admin: AdminConfig,

    #[validate(nested)]
    pub observability: ObservabilityConfig,
}

impl AppConfig {
    /// Built-in defaults for the given service
    pub fn for_service(kind: ServiceKind) -> Self {
        Self {
            server: ServerConfig { port: kind.default_port(), ..Default::default() },
            database: DatabaseConfig { url: kind.default_database_url(), ..Default::default() },
            auth: AuthConfig::default(),
            admin: AdminConfig::default(),
            observability: ObservabilityConfig {
                service_name: kind.name().to_string(),
                ..Default::default()
            },
        }
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<()> {
        Validate::validate(self).map_err(TodoplaneError::from)?;
        self.validate_custom()?;
        Ok(())
    }

    fn validate_custom(&self) -> Result<()> {
        if !self.database.is_sqlite() {
            return Err(TodoplaneError::validation_field(
                "Database URL must start with 'sqlite:'",
                "database.url",
            ));
        }

        if self.database.min_connections > self.database.max_connections {
            return Err(TodoplaneError::validation(
                "min_connections cannot be greater than max_connections",
            ));
        }

        if self.auth.jwt_secret.trim().is_empty() {
            return Err(TodoplaneError::validation_field(
                "JWT secret cannot be blank",
                "auth.jwt_secret",
            ));
        }

        Ok(())
    }

    /// Non-fatal findings that operators should see at startup.
    pub fn security_warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if self.auth.jwt_secret.len() < RECOMMENDED_SECRET_LEN {
            warnings.push(format!(
                "JWT secret is shorter than {} bytes; tokens are easier to brute force",
                RECOMMENDED_SECRET_LEN
            ));
        }
        if self.auth.jwt_secret == AuthConfig::DEVELOPMENT_SECRET {
            warnings.push("JWT secret is the built-in development value".to_string());
        }
        if !self.auth.admin_routes_require_auth {
            warnings.push("admin routes are served without authentication".to_string());
        }
        warnings
    }

    /// Apply the environment variables understood by the original deployment
    /// (`DATABASE_URL`, `SECRET_KEY`, `ADMIN_DEFAULT_PASSWORD`, `PORT`).
    pub fn apply_legacy_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("DATABASE_URL") {
            self.database.url = url;
        }
        if let Some(secret) = lookup("SECRET_KEY") {
            self.auth.jwt_secret = secret;
        }
        if let Some(password) = lookup("ADMIN_DEFAULT_PASSWORD") {
            self.admin.password = Some(password);
        }
        if let Some(port) = lookup("PORT") {
            self.server.port = port
                .trim()
                .parse()
                .map_err(|e| TodoplaneError::config(format!("Invalid PORT '{}': {}", port, e)))?;
        }
        Ok(())
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ServerConfig {
    #[validate(length(min = 1, message = "Host cannot be empty"))]
    pub host: String,

    #[validate(range(min = 1, max = 65535, message = "Port must be between 1 and 65535"))]
    pub port: u16,

    pub enable_cors: bool,

    /// CORS allowed origins (empty = allow all)
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "0.0.0.0".to_string(), port: 8001, enable_cors: true, cors_origins: vec![] }
    }
}

impl ServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct DatabaseConfig {
    #[validate(length(min = 1, message = "Database URL cannot be empty"))]
    pub url: String,

    #[validate(range(min = 1, max = 100, message = "Max connections must be between 1 and 100"))]
    pub max_connections: u32,

    #[validate(range(max = 50, message = "Min connections must be between 0 and 50"))]
    pub min_connections: u32,

    #[validate(range(
        min = 1,
        max = 60,
        message = "Connect timeout must be between 1 and 60 seconds"
    ))]
    pub connect_timeout_seconds: u64,

    /// Idle timeout in seconds (0 = no timeout)
    pub idle_timeout_seconds: u64,

    pub auto_migrate: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://./data/todoplane.db".to_string(),
            max_connections: 10,
            min_connections: 0,
            connect_timeout_seconds: 10,
            idle_timeout_seconds: 600,
            auto_migrate: true,
        }
    }
}

impl DatabaseConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_seconds)
    }

    /// Get idle timeout as Duration (None if 0)
    pub fn idle_timeout(&self) -> Option<Duration> {
        if self.idle_timeout_seconds == 0 {
            None
        } else {
            Some(Duration::from_secs(self.idle_timeout_seconds))
        }
    }

    pub fn is_sqlite(&self) -> bool {
        self.url.starts_with("sqlite:")
    }

    /// In-memory databases vanish with their last connection.
    pub fn is_in_memory(&self) -> bool {
        self.url.contains(":memory:") || self.url.contains("mode=memory")
    }
}

/// Token signing and credential hashing configuration
#[derive(Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct AuthConfig {
    /// Shared HS256 secret; both services must use the same value
    #[validate(length(min = 1, message = "JWT secret cannot be empty"))]
    pub jwt_secret: String,

    #[validate(range(
        min = 60,
        max = 86400,
        message = "Token expiry must be between 1 minute and 24 hours"
    ))]
    pub token_expiry_seconds: u64,

    #[validate(range(min = 4, max = 31, message = "bcrypt cost must be between 4 and 31"))]
    pub bcrypt_cost: u32,

    /// Require a valid bearer token on `/admin/*` routes
    pub admin_routes_require_auth: bool,
}

impl AuthConfig {
    pub const DEVELOPMENT_SECRET: &'static str = "your-secret-key-change-in-production";

    pub fn token_expiry(&self) -> Duration {
        Duration::from_secs(self.token_expiry_seconds)
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: Self::DEVELOPMENT_SECRET.to_string(),
            token_expiry_seconds: 30 * 60,
            bcrypt_cost: bcrypt::DEFAULT_COST,
            admin_routes_require_auth: true,
        }
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"<redacted>")
            .field("token_expiry_seconds", &self.token_expiry_seconds)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .field("admin_routes_require_auth", &self.admin_routes_require_auth)
            .finish()
    }
}

/// Bootstrap administrator account
#[derive(Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct AdminConfig {
    #[validate(length(min = 1, max = 255))]
    pub username: String,

    #[validate(email)]
    pub email: String,

    /// Operator supplied; there is no built-in default
    pub password: Option<String>,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            username: "admin".to_string(),
            email: "admin@todoplane.local".to_string(),
            password: None,
        }
    }
}

impl fmt::Debug for AdminConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminConfig")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Logging and metrics configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ObservabilityConfig {
    #[validate(length(min = 1, message = "Service name cannot be empty"))]
    pub service_name: String,

    /// Log level (trace, debug, info, warn, error); `RUST_LOG` takes precedence
    #[validate(length(min = 1, message = "Log level cannot be empty"))]
    pub log_level: String,

    /// Enable JSON structured logging
    pub json_logging: bool,

    /// Serve Prometheus metrics at `/metrics`
    pub enable_metrics: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            service_name: "todoplane".to_string(),
            log_level: "info".to_string(),
            json_logging: false,
            enable_metrics: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config_validation() {
        assert!(AppConfig::for_service(ServiceKind::Users).validate().is_ok());
        assert!(AppConfig::for_service(ServiceKind::Todos).validate().is_ok());
    }

    #[test]
    fn test_service_defaults() {
        let users = AppConfig::for_service(ServiceKind::Users);
        assert_eq!(users.server.port, 8001);
        assert_eq!(users.observability.service_name, "user-service");

        let todos = AppConfig::for_service(ServiceKind::Todos);
        assert_eq!(todos.server.port, 8002);
        assert_eq!(todos.database.url, "sqlite://./data/todos.db");
        assert_eq!(todos.auth.token_expiry(), Duration::from_secs(1800));
        assert!(todos.auth.admin_routes_require_auth);
    }

    #[test]
    fn test_database_config_timeouts() {
        let config = DatabaseConfig {
            connect_timeout_seconds: 15,
            idle_timeout_seconds: 300,
            ..Default::default()
        };
        assert_eq!(config.connect_timeout(), Duration::from_secs(15));
        assert_eq!(config.idle_timeout(), Some(Duration::from_secs(300)));

        let config_no_idle = DatabaseConfig { idle_timeout_seconds: 0, ..Default::default() };
        assert_eq!(config_no_idle.idle_timeout(), None);
    }

    #[test]
    fn test_in_memory_detection() {
        let config = DatabaseConfig { url: "sqlite::memory:".to_string(), ..Default::default() };
        assert!(config.is_sqlite());
        assert!(config.is_in_memory());
        assert!(!DatabaseConfig::default().is_in_memory());
    }

    #[test]
    fn test_config_validation_errors() {
        let mut config = AppConfig::for_service(ServiceKind::Users);
        config.database.url = "postgresql://localhost/users".to_string();
        assert!(config.validate().is_err());

        let mut config = AppConfig::for_service(ServiceKind::Users);
        config.auth.jwt_secret = "   ".to_string();
        assert!(config.validate().is_err());

        let mut config = AppConfig::for_service(ServiceKind::Users);
        config.database.max_connections = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::for_service(ServiceKind::Users);
        config.auth.token_expiry_seconds = 5;
        assert!(config.validate().is_err());

        let mut config = AppConfig::for_service(ServiceKind::Users);
        config.admin.email = "not-an-email".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_security_warnings() {
        let config = AppConfig::for_service(ServiceKind::Users);
        let warnings = config.security_warnings();
        assert!(warnings.iter().any(|w| w.contains("development value")));

        let mut config = AppConfig::for_service(ServiceKind::Users);
        config.auth.jwt_secret = "x".repeat(48);
        assert!(config.security_warnings().is_empty());
    }

    #[test]
    fn test_legacy_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("DATABASE_URL", "sqlite::memory:"),
            ("SECRET_KEY", "legacy-secret"),
            ("ADMIN_DEFAULT_PASSWORD", "operator-choice"),
            ("PORT", "9001"),
        ]);

        let mut config = AppConfig::for_service(ServiceKind::Users);
        config.apply_legacy_overrides(|key| env.get(key).map(|v| v.to_string())).unwrap();

        assert_eq!(config.database.url, "sqlite::memory:");
        assert_eq!(config.auth.jwt_secret, "legacy-secret");
        assert_eq!(config.admin.password.as_deref(), Some("operator-choice"));
        assert_eq!(config.server.port, 9001);
    }

    #[test]
    fn test_legacy_port_must_parse() {
        let mut config = AppConfig::for_service(ServiceKind::Todos);
        let result = config
            .apply_legacy_overrides(|key| (key == "PORT").then(|| "eighty".to_string()));
        assert!(result.is_err());
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let mut config = AppConfig::for_service(ServiceKind::Users);
        config.admin.password = Some("hunter2hunter2".to_string());
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("hunter2hunter2"));
        assert!(!rendered.contains(AuthConfig::DEVELOPMENT_SECRET));
    }
}
