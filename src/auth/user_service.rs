//! Account registration, lookup and admin bootstrap.

use std::sync::Arc;

use tracing::{info, instrument, warn};

use crate::auth::hashing::CredentialHasher;
use crate::config::AdminConfig;
use crate::domain::{Account, AccountId, NewAccount};
use crate::errors::{Error, Result};
use crate::storage::repositories::{AccountRepository, SqlxAccountRepository};
use crate::storage::DbPool;

const DUPLICATE_MESSAGE: &str = "User already exists";

/// Outcome of [`UserService::create_admin`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminBootstrap {
    Created(Account),
    AlreadyExists { username: String },
    /// No operator-supplied password; nothing was written.
    NotConfigured,
}

/// Service for the account directory.
#[derive(Clone)]
pub struct UserService {
    accounts: Arc<dyn AccountRepository>,
    hasher: CredentialHasher,
    admin: AdminConfig,
}

impl UserService {
    pub fn new(
        accounts: Arc<dyn AccountRepository>,
        hasher: CredentialHasher,
        admin: AdminConfig,
    ) -> Self {
        Self { accounts, hasher, admin }
    }

    pub fn with_sqlx(pool: DbPool, hasher: CredentialHasher, admin: AdminConfig) -> Self {
        Self::new(Arc::new(SqlxAccountRepository::new(pool)), hasher, admin)
    }

    /// Register a new account.
    ///
    /// Rejects a taken username or email before hashing; a concurrent
    /// registration that slips past the check is caught by the UNIQUE
    /// constraints and reported the same way.
    #[instrument(skip(self, email, password), fields(username = %username))]
    pub async fn register(&self, username: &str, email: &str, password: &str) -> Result<Account> {
        if self.accounts.username_or_email_taken(username, email).await? {
            warn!(username = %username, "registration rejected: username or email taken");
            return Err(Error::conflict(DUPLICATE_MESSAGE, "user"));
        }

        let hashed_password = self.hasher.hash_blocking(password.to_string()).await?;
        let account = self
            .accounts
            .create(NewAccount {
                username: username.to_string(),
                email: email.to_string(),
                hashed_password,
            })
            .await?;

        info!(account_id = %account.id, username = %account.username, "account registered");
        Ok(account)
    }

    #[instrument(skip(self), fields(account_id = %id))]
    pub async fn get_user(&self, id: AccountId) -> Result<Account> {
        self.accounts.get(id).await?.ok_or_else(|| Error::not_found("User", id.to_string()))
    }

    pub async fn list_users(&self) -> Result<Vec<Account>> {
        self.accounts.list_all().await
    }

    /// Create the bootstrap admin account from operator configuration.
    #[instrument(skip(self), fields(username = %self.admin.username))]
    pub async fn create_admin(&self) -> Result<AdminBootstrap> {
        let username = self.admin.username.clone();

        if self.accounts.find_by_username(&username).await?.is_some() {
            return Ok(AdminBootstrap::AlreadyExists { username });
        }

        let Some(password) = self.admin.password.as_deref().filter(|p| !p.is_empty()) else {
            warn!("admin bootstrap requested but no admin password is configured");
            return Ok(AdminBootstrap::NotConfigured);
        };

        match self.register(&username, &self.admin.email, password).await {
            Ok(account) => {
                info!(account_id = %account.id, "admin account created");
                Ok(AdminBootstrap::Created(account))
            }
            // Either a concurrent bootstrap won, or the admin email belongs to someone else.
            Err(err @ Error::Conflict { .. }) => {
                if self.accounts.find_by_username(&username).await?.is_some() {
                    Ok(AdminBootstrap::AlreadyExists { username })
                } else {
                    Err(err)
                }
            }
            Err(err) => Err(err),
        }
    }
}
