//! Account records owned by the user service.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::AccountId;

/// Public view of an account. The credential hash never leaves the storage layer
/// except through [`crate::storage::repositories::AccountRepository::find_credentials`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Account {
    pub id: AccountId,
    pub username: String,
    pub email: String,
}

/// Insert payload; the password is already hashed.
#[derive(Clone)]
pub struct NewAccount {
    pub username: String,
    pub email: String,
    pub hashed_password: String,
}

impl std::fmt::Debug for NewAccount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewAccount")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("hashed_password", &"<redacted>")
            .finish()
    }
}

/// Account row joined with its stored credential, used only by login.
#[derive(Clone, FromRow)]
pub struct AccountCredentials {
    #[sqlx(flatten)]
    pub account: Account,
    pub hashed_password: String,
}
