//! Password hashing with bcrypt.

use crate::errors::{Result, TodoplaneError};

/// Salted, deliberately slow password hashing. Every call to [`hash`](Self::hash)
/// draws a fresh salt, so hashing the same password twice yields different strings.
#[derive(Debug, Clone, Copy)]
pub struct CredentialHasher {
    cost: u32,
}

impl Default for CredentialHasher {
    fn default() -> Self {
        Self { cost: bcrypt::DEFAULT_COST }
    }
}

impl CredentialHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }

    pub fn hash(&self, password: &str) -> Result<String> {
        bcrypt::hash(password, self.cost).map_err(|e| TodoplaneError::Internal {
            message: "Failed to hash password".to_string(),
            source: Some(Box::new(e)),
        })
    }

    /// Returns `false` for a wrong password and for a stored hash that does not parse.
    pub fn verify(&self, password: &str, stored_hash: &str) -> bool {
        match bcrypt::verify(password, stored_hash) {
            Ok(matches) => matches,
            Err(e) => {
                tracing::warn!(error = %e, "Stored credential hash could not be parsed");
                false
            }
        }
    }

    /// Hashing on the async runtime would stall other requests; run it on the blocking pool.
    pub async fn hash_blocking(&self, password: String) -> Result<String> {
        let hasher = *self;
        tokio::task::spawn_blocking(move || hasher.hash(&password)).await.map_err(|e| {
            TodoplaneError::Internal {
                message: "Password hashing task failed".to_string(),
                source: Some(Box::new(e)),
            }
        })?
    }

    pub async fn verify_blocking(&self, password: String, stored_hash: String) -> bool {
        let hasher = *self;
        tokio::task::spawn_blocking(move || hasher.verify(&password, &stored_hash))
            .await
            .unwrap_or(false)
    }
}
