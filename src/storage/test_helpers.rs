//! Test database utilities for in-library tests.
//!
//! Every pool is a private in-memory SQLite database with one service's
//! migrations applied, so tests never share state.

use crate::config::DatabaseConfig;
use crate::storage::migrations::MigrationSet;
use crate::storage::{create_pool, DbPool};

pub fn memory_config() -> DatabaseConfig {
    DatabaseConfig { url: "sqlite::memory:".to_string(), auto_migrate: true, ..Default::default() }
}

pub async fn memory_pool(migrations: &MigrationSet) -> DbPool {
    create_pool(&memory_config(), migrations).await.expect("in-memory test pool")
}
