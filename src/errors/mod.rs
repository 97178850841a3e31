//! # Error Handling
//!
//! Crate-wide error type. Library code returns [`Result`]; the HTTP layer
//! converts [`TodoplaneError`] into `ApiError` responses.

pub mod types;

pub use types::{AuthErrorType, Result, TodoplaneError};

/// Short alias used throughout the crate
pub type Error = TodoplaneError;
