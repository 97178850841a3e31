//! # REST API
//!
//! Routers, handlers and error shaping for the account directory and todo
//! services.

pub mod error;
pub mod extract;
pub mod handlers;
pub mod routes;
pub mod server;

pub use error::ApiError;
pub use extract::{ApiJson, ApiPath};
pub use routes::{build_todo_router, build_user_router, RouterSettings, TodoApiState, UserApiState};
pub use server::serve;
