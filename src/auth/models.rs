//! Data models shared by the authentication gate and the login flow.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::auth::jwt::{TokenError, VerifiedClaims};
use crate::domain::AccountId;
use crate::errors::AuthErrorType;

const BEARER_PREFIX: &str = "Bearer ";

/// Token type reported alongside every issued token.
pub const TOKEN_TYPE: &str = "bearer";

/// Request-scoped authentication context derived from a valid token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    pub user_id: AccountId,
    pub username: Option<String>,
}

impl From<VerifiedClaims> for AuthContext {
    fn from(claims: VerifiedClaims) -> Self {
        Self { user_id: claims.user_id, username: claims.username }
    }
}

/// Successful login payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

impl TokenResponse {
    pub fn bearer(access_token: String) -> Self {
        Self { access_token, token_type: TOKEN_TYPE.to_string() }
    }
}

/// Why the gate refused a request. Logged, never returned to the caller.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    #[error("bearer token missing")]
    MissingBearer,
    #[error("malformed bearer header")]
    MalformedBearer,
    #[error("invalid token: {0}")]
    InvalidToken(#[from] TokenError),
}

impl AuthError {
    /// Coarse category used in logs and metric labels.
    pub fn error_type(&self) -> AuthErrorType {
        match self {
            AuthError::MissingBearer => AuthErrorType::MissingToken,
            AuthError::InvalidToken(TokenError::Expired) => AuthErrorType::ExpiredToken,
            AuthError::MalformedBearer | AuthError::InvalidToken(_) => AuthErrorType::InvalidToken,
        }
    }
}

/// Extract the token from an `Authorization` header value.
pub fn bearer_token(header: Option<&str>) -> Result<&str, AuthError> {
    let header = header.map(str::trim).filter(|value| !value.is_empty());
    let header = header.ok_or(AuthError::MissingBearer)?;

    match header.strip_prefix(BEARER_PREFIX).map(str::trim) {
        Some(token) if !token.is_empty() => Ok(token),
        _ => Err(AuthError::MalformedBearer),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_bearer_token() {
        assert_eq!(bearer_token(Some("Bearer abc.def.ghi")), Ok("abc.def.ghi"));
        assert_eq!(bearer_token(Some("  Bearer   abc  ")), Ok("abc"));
    }

    #[test]
    fn rejects_missing_or_malformed_header() {
        assert_eq!(bearer_token(None), Err(AuthError::MissingBearer));
        assert_eq!(bearer_token(Some("   ")), Err(AuthError::MissingBearer));
        assert_eq!(bearer_token(Some("Basic dXNlcjpwdw==")), Err(AuthError::MalformedBearer));
        assert_eq!(bearer_token(Some("abc.def.ghi")), Err(AuthError::MalformedBearer));
        assert_eq!(bearer_token(Some("Bearer ")), Err(AuthError::MalformedBearer));
    }

    #[test]
    fn categorises_failures() {
        assert_eq!(AuthError::MissingBearer.error_type(), AuthErrorType::MissingToken);
        assert_eq!(AuthError::MalformedBearer.error_type(), AuthErrorType::InvalidToken);
        assert_eq!(
            AuthError::from(TokenError::Expired).error_type(),
            AuthErrorType::ExpiredToken
        );
        assert_eq!(
            AuthError::from(TokenError::BadSignature).error_type(),
            AuthErrorType::InvalidToken
        );
    }

    #[test]
    fn token_response_is_bearer() {
        let response = TokenResponse::bearer("t".into());
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            serde_json::json!({ "access_token": "t", "token_type": "bearer" })
        );
    }
}
