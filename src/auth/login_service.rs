//! Login service for username/password authentication.

use std::sync::Arc;

use tracing::{info, instrument, warn};

use crate::auth::hashing::CredentialHasher;
use crate::auth::jwt::TokenCodec;
use crate::auth::models::TokenResponse;
use crate::errors::{AuthErrorType, Error, Result};
use crate::storage::repositories::{AccountRepository, SqlxAccountRepository};
use crate::storage::DbPool;

const INVALID_CREDENTIALS: &str = "Invalid credentials";

/// Checks credentials and issues session tokens.
#[derive(Clone)]
pub struct LoginService {
    accounts: Arc<dyn AccountRepository>,
    hasher: CredentialHasher,
    codec: Arc<TokenCodec>,
    /// Verified against when the username is unknown, so response time does
    /// not reveal whether an account exists.
    dummy_hash: String,
}

impl LoginService {
    pub fn new(
        accounts: Arc<dyn AccountRepository>,
        hasher: CredentialHasher,
        codec: Arc<TokenCodec>,
    ) -> Result<Self> {
        let dummy_hash = hasher.hash(&uuid::Uuid::new_v4().to_string())?;
        Ok(Self { accounts, hasher, codec, dummy_hash })
    }

    pub fn with_sqlx(
        pool: DbPool,
        hasher: CredentialHasher,
        codec: Arc<TokenCodec>,
    ) -> Result<Self> {
        Self::new(Arc::new(SqlxAccountRepository::new(pool)), hasher, codec)
    }

    /// Authenticate and issue a token bound to the account id.
    ///
    /// Unknown username and wrong password produce the same error.
    #[instrument(skip(self, password), fields(username = %username))]
    pub async fn login(&self, username: &str, password: &str) -> Result<TokenResponse> {
        let Some(credentials) = self.accounts.find_credentials(username).await? else {
            self.hasher.verify_blocking(password.to_string(), self.dummy_hash.clone()).await;
            warn!(username = %username, "login attempt for unknown username");
            return Err(invalid_credentials());
        };

        let matches = self
            .hasher
            .verify_blocking(password.to_string(), credentials.hashed_password)
            .await;
        if !matches {
            warn!(account_id = %credentials.account.id, "login attempt with incorrect password");
            return Err(invalid_credentials());
        }

        let account = credentials.account;
        let token = self.codec.issue(account.id, Some(&account.username)).map_err(|e| {
            Error::Internal {
                message: "Failed to sign session token".to_string(),
                source: Some(Box::new(e)),
            }
        })?;

        info!(account_id = %account.id, "user logged in");
        Ok(TokenResponse::bearer(token))
    }
}

fn invalid_credentials() -> Error {
    Error::auth(INVALID_CREDENTIALS, AuthErrorType::InvalidCredentials)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::user_service::UserService;
    use crate::config::AdminConfig;
    use crate::domain::AccountId;
    use crate::storage::migrations::USER_MIGRATIONS;
    use crate::storage::test_helpers::memory_pool;
    use std::time::Duration;

    async fn setup() -> (UserService, LoginService, Arc<TokenCodec>) {
        let pool = memory_pool(&USER_MIGRATIONS).await;
        let hasher = CredentialHasher::new(4 /* bcrypt minimum cost */);
        let secret = b"login-test-secret-login-test-secret";
        let codec = Arc::new(TokenCodec::new(secret, Duration::from_secs(1800)));
        let users = UserService::with_sqlx(pool.clone(), hasher, AdminConfig::default());
        let login = LoginService::with_sqlx(pool, hasher, codec.clone()).unwrap();
        (users, login, codec)
    }

    #[tokio::test]
    async fn login_issues_token_for_account() {
        let (users, login, codec) = setup().await;
        users.register("alice", "a@x.com", "pw1").await.unwrap();

        let response = login.login("alice", "pw1").await.unwrap();
        assert_eq!(response.token_type, "bearer");

        let claims = codec.verify(&response.access_token).unwrap();
        assert_eq!(claims.user_id, AccountId::new(1));
        assert_eq!(claims.username.as_deref(), Some("alice"));
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_user_are_indistinguishable() {
        let (users, login, _) = setup().await;
        users.register("alice", "a@x.com", "pw1").await.unwrap();

        let wrong = login.login("alice", "wrong").await.unwrap_err();
        let unknown = login.login("mallory", "pw1").await.unwrap_err();

        assert_eq!(wrong.to_string(), unknown.to_string());
        assert_eq!(wrong.status_code(), 401);
        assert!(matches!(
            unknown,
            Error::Auth { error_type: AuthErrorType::InvalidCredentials, .. }
        ));
    }
}
