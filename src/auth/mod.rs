//! Authentication for both services.
//!
//! The user service issues tokens at login; both services verify them with
//! the same [`jwt::TokenCodec`] behind the [`middleware::authenticate`] gate.

pub mod hashing;
pub mod jwt;
pub mod login_service;
pub mod middleware;
pub mod models;
pub mod user_service;

pub use hashing::CredentialHasher;
pub use jwt::{Claims, TokenCodec, TokenError, VerifiedClaims};
pub use login_service::LoginService;
pub use models::{AuthContext, AuthError, TokenResponse};
pub use user_service::{AdminBootstrap, UserService};
