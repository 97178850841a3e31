//! # Storage and Persistence
//!
//! SQLite connectivity, embedded migrations and the repositories for
//! accounts and todo items.

pub mod migrations;
pub mod pool;
pub mod repositories;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use crate::config::DatabaseConfig;

pub use migrations::{
    list_applied_migrations, run_migrations, validate_migrations, MigrationInfo, MigrationSet,
    TODO_MIGRATIONS, USER_MIGRATIONS,
};
pub use pool::{create_pool, get_pool_stats, DbPool, PoolStats};
pub use repositories::{
    AccountRepository, SqlxAccountRepository, SqlxTodoRepository, TodoRepository,
};

use crate::errors::{Result, TodoplaneError};

/// Check database connectivity
pub async fn check_connection(pool: &DbPool) -> Result<()> {
    sqlx::query("SELECT 1")
        .fetch_one(pool)
        .await
        .map_err(|e| TodoplaneError::database(e, "Database connectivity check failed"))?;

    Ok(())
}
