//! # Error Types
//!
//! Error types shared by the account and todo services, built on `thiserror`.

use std::fmt;

/// Custom result type for todoplane operations
pub type Result<T> = std::result::Result<T, TodoplaneError>;

/// Main error type for both services
#[derive(thiserror::Error, Debug)]
pub enum TodoplaneError {
    /// Configuration errors
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Database and storage errors
    #[error("Database error: {context}")]
    Database {
        #[source]
        source: sqlx::Error,
        context: String,
    },

    /// I/O errors with additional context
    #[error("I/O error: {context}")]
    Io {
        #[source]
        source: std::io::Error,
        context: String,
    },

    /// Validation errors
    #[error("Validation error: {message}")]
    Validation { message: String, field: Option<String> },

    /// Authentication errors
    #[error("Authentication error: {message}")]
    Auth { message: String, error_type: AuthErrorType },

    /// Resource not found errors
    #[error("Resource not found: {resource_type} with ID '{id}'")]
    NotFound { resource_type: String, id: String },

    /// Resource conflict errors (e.g., already exists)
    #[error("Resource conflict: {message}")]
    Conflict { message: String, resource_type: String },

    /// Internal server errors
    #[error("Internal server error: {message}")]
    Internal {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

/// Authentication error subtypes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthErrorType {
    InvalidToken,
    ExpiredToken,
    MissingToken,
    InvalidCredentials,
}

impl fmt::Display for AuthErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthErrorType::InvalidToken => write!(f, "invalid_token"),
            AuthErrorType::ExpiredToken => write!(f, "expired_token"),
            AuthErrorType::MissingToken => write!(f, "missing_token"),
            AuthErrorType::InvalidCredentials => write!(f, "invalid_credentials"),
        }
    }
}

impl TodoplaneError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config { message: message.into(), source: None }
    }

    /// Create a configuration error with source
    pub fn config_with_source<S: Into<String>>(
        message: S,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        Self::Config { message: message.into(), source: Some(source) }
    }

    /// Wrap a sqlx error with a human readable context
    pub fn database<S: Into<String>>(source: sqlx::Error, context: S) -> Self {
        Self::Database { source, context: context.into() }
    }

    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation { message: message.into(), field: None }
    }

    pub fn validation_field<S: Into<String>, F: Into<String>>(message: S, field: F) -> Self {
        Self::Validation { message: message.into(), field: Some(field.into()) }
    }

    pub fn auth<S: Into<String>>(message: S, error_type: AuthErrorType) -> Self {
        Self::Auth { message: message.into(), error_type }
    }

    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal { message: message.into(), source: None }
    }

    pub fn not_found<R: Into<String>, I: Into<String>>(resource_type: R, id: I) -> Self {
        Self::NotFound { resource_type: resource_type.into(), id: id.into() }
    }

    pub fn conflict<M: Into<String>, R: Into<String>>(message: M, resource_type: R) -> Self {
        Self::Conflict { message: message.into(), resource_type: resource_type.into() }
    }

    /// True when the underlying database error is a UNIQUE / constraint violation.
    pub fn is_unique_violation(&self) -> bool {
        match self {
            TodoplaneError::Database { source, .. } => source
                .as_database_error()
                .map(|db_err| db_err.is_unique_violation())
                .unwrap_or(false),
            _ => false,
        }
    }

    /// Get the HTTP status code that should be returned for this error
    pub fn status_code(&self) -> u16 {
        match self {
            TodoplaneError::Config { .. } => 500,
            TodoplaneError::Database { .. } => 500,
            TodoplaneError::Io { .. } => 500,
            TodoplaneError::Validation { .. } => 400,
            TodoplaneError::Auth { .. } => 401,
            TodoplaneError::NotFound { .. } => 404,
            TodoplaneError::Conflict { .. } => 400,
            TodoplaneError::Internal { .. } => 500,
        }
    }
}

impl From<sqlx::Error> for TodoplaneError {
    fn from(error: sqlx::Error) -> Self {
        Self::Database { source: error, context: "Database operation failed".to_string() }
    }
}

impl From<std::io::Error> for TodoplaneError {
    fn from(error: std::io::Error) -> Self {
        Self::Io { source: error, context: "I/O operation failed".to_string() }
    }
}

impl From<config::ConfigError> for TodoplaneError {
    fn from(error: config::ConfigError) -> Self {
        Self::config_with_source("Configuration loading failed", Box::new(error))
    }
}

impl From<validator::ValidationErrors> for TodoplaneError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
        fields.sort_by(|a, b| a.0.cmp(&b.0));

        let message = fields
            .iter()
            .map(|(field, field_errors)| {
                let error_messages: Vec<String> = field_errors
                    .iter()
                    .map(|e| {
                        e.message.as_ref().map_or("Invalid value".to_string(), |m| m.to_string())
                    })
                    .collect();
                format!("{}: {}", field, error_messages.join(", "))
            })
            .collect::<Vec<_>>()
            .join("; ");

        Self::validation(format!("Validation failed: {}", message))
    }
}
