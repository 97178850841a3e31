//! # Todoplane
//!
//! Two small HTTP services that share one bearer-token scheme:
//!
//! - **user-service**: account directory. Registration, login (issues session
//!   tokens), account lookup and admin bootstrap.
//! - **todo-service**: todo items scoped to the account named in the caller's
//!   token.
//!
//! ```text
//! client ──login──▶ user-service ──issues──▶ HS256 token
//!    │                                          │
//!    └──Bearer <token>──▶ todo-service ──verifies (shared secret)
//! ```
//!
//! Each service owns its own SQLite database; they never talk to each other.
//! The only coupling is the token format and the shared secret.

pub mod api;
pub mod auth;
pub mod config;
pub mod domain;
pub mod errors;
pub mod observability;
pub mod storage;
pub mod todos;

pub use config::{AppConfig, ServiceKind};
pub use errors::{Error, Result};

/// Application version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name from Cargo.toml
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
