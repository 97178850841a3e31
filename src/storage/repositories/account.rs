//! Account repository for the user service
//!
//! Accounts are created and read, never updated or deleted.

use crate::domain::{Account, AccountCredentials, AccountId, NewAccount};
use crate::errors::{Result, TodoplaneError};
use crate::storage::DbPool;
use async_trait::async_trait;
use tracing::instrument;

const ACCOUNT_COLUMNS: &str = "id, username, email";

#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// True when either the username or the email already belongs to an account
    async fn username_or_email_taken(&self, username: &str, email: &str) -> Result<bool>;

    /// Insert a new account. A UNIQUE violation surfaces as a conflict.
    async fn create(&self, account: NewAccount) -> Result<Account>;

    async fn get(&self, id: AccountId) -> Result<Option<Account>>;

    async fn find_by_username(&self, username: &str) -> Result<Option<Account>>;

    /// Account plus stored credential hash, for login only
    async fn find_credentials(&self, username: &str) -> Result<Option<AccountCredentials>>;

    /// Every account, ordered by id
    async fn list_all(&self) -> Result<Vec<Account>>;
}

#[derive(Debug, Clone)]
pub struct SqlxAccountRepository {
    pool: DbPool,
}

impl SqlxAccountRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccountRepository for SqlxAccountRepository {
    #[instrument(skip(self, email), fields(username = %username), name = "db_account_taken")]
    async fn username_or_email_taken(&self, username: &str, email: &str) -> Result<bool> {
        let taken: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM users WHERE username = $1 OR email = $2)",
        )
        .bind(username)
        .bind(email)
        .fetch_one(&self.pool)
        .await
        .map_err(|err| TodoplaneError::database(err, "Failed to check for existing account"))?;

        Ok(taken)
    }

    #[instrument(
        skip(self, account),
        fields(username = %account.username),
        name = "db_create_account"
    )]
    async fn create(&self, account: NewAccount) -> Result<Account> {
        let created = sqlx::query_as::<_, Account>(&format!(
            "INSERT INTO users (username, email, hashed_password) VALUES ($1, $2, $3) \
             RETURNING {ACCOUNT_COLUMNS}"
        ))
        .bind(&account.username)
        .bind(&account.email)
        .bind(&account.hashed_password)
        .fetch_one(&self.pool)
        .await
        .map_err(|err| {
            let err = TodoplaneError::database(err, "Failed to create account");
            if err.is_unique_violation() {
                TodoplaneError::conflict("User already exists", "user")
            } else {
                err
            }
        })?;

        Ok(created)
    }

    #[instrument(skip(self), fields(account_id = %id), name = "db_get_account")]
    async fn get(&self, id: AccountId) -> Result<Option<Account>> {
        sqlx::query_as::<_, Account>(&format!("SELECT {ACCOUNT_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|err| TodoplaneError::database(err, "Failed to fetch account"))
    }

    #[instrument(skip(self), name = "db_find_account_by_username")]
    async fn find_by_username(&self, username: &str) -> Result<Option<Account>> {
        sqlx::query_as::<_, Account>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM users WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| TodoplaneError::database(err, "Failed to fetch account by username"))
    }

    #[instrument(skip(self), name = "db_find_account_credentials")]
    async fn find_credentials(&self, username: &str) -> Result<Option<AccountCredentials>> {
        sqlx::query_as::<_, AccountCredentials>(
            "SELECT id, username, email, hashed_password FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| TodoplaneError::database(err, "Failed to fetch account credentials"))
    }

    #[instrument(skip(self), name = "db_list_accounts")]
    async fn list_all(&self) -> Result<Vec<Account>> {
        sqlx::query_as::<_, Account>(&format!("SELECT {ACCOUNT_COLUMNS} FROM users ORDER BY id"))
            .fetch_all(&self.pool)
            .await
            .map_err(|err| TodoplaneError::database(err, "Failed to list accounts"))
    }
}
