//! # Database Migration Management
//!
//! Each service owns one schema. The SQL lives under `migrations/<service>/`
//! and is embedded into the binary; pending migrations are applied on startup
//! when `database.auto_migrate` is enabled.

use crate::errors::{Result, TodoplaneError};
use crate::storage::DbPool;
use serde::{Deserialize, Serialize};
use sqlx::Row;
use tracing::{error, info, warn};

/// A single embedded migration; `file` must start with a numeric version.
#[derive(Debug, Clone, Copy)]
pub struct Migration {
    pub file: &'static str,
    pub sql: &'static str,
}

/// Ordered migrations for one service's database
#[derive(Debug)]
pub struct MigrationSet {
    pub name: &'static str,
    pub migrations: &'static [Migration],
}

pub static USER_MIGRATIONS: MigrationSet = MigrationSet {
    name: "users",
    migrations: &[Migration {
        file: "20240101000001_create_users",
        sql: include_str!("../../migrations/users/20240101000001_create_users.sql"),
    }],
};

pub static TODO_MIGRATIONS: MigrationSet = MigrationSet {
    name: "todos",
    migrations: &[Migration {
        file: "20240101000001_create_todos",
        sql: include_str!("../../migrations/todos/20240101000001_create_todos.sql"),
    }],
};

/// Migration information structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrationInfo {
    pub version: i64,
    pub description: String,
    pub installed_on: chrono::DateTime<chrono::Utc>,
    pub execution_time: i64,
    pub checksum: Vec<u8>,
}

/// Run all pending database migrations
pub async fn run_migrations(pool: &DbPool, set: &MigrationSet) -> Result<()> {
    info!(set = set.name, "Starting database migration process");

    create_migration_table(pool).await?;
    let applied = get_applied_migration_versions(pool).await?;

    let mut migrations_run = 0;
    for migration in set.migrations {
        let version = extract_version_from_filename(migration.file)?;

        if applied.contains(&version) {
            info!(version = version, "Migration already applied: {}", migration.file);
            continue;
        }

        info!(version = version, "Running migration: {}", migration.file);
        let start_time = std::time::Instant::now();

        let mut tx = pool
            .begin()
            .await
            .map_err(|e| TodoplaneError::database(e, "Failed to start migration transaction"))?;

        sqlx::raw_sql(migration.sql).execute(&mut *tx).await.map_err(|e| {
            error!(error = %e, migration = migration.file, "Migration failed");
            TodoplaneError::database(e, format!("Migration failed: {}", migration.file))
        })?;

        let execution_time = start_time.elapsed().as_millis() as i64;
        sqlx::query(
            "INSERT INTO _todoplane_migrations \
             (version, description, checksum, execution_time, installed_on) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(version)
        .bind(migration.file)
        .bind(calculate_checksum(migration.sql))
        .bind(execution_time)
        .bind(chrono::Utc::now())
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            error!(error = %e, migration = migration.file, "Failed to record migration");
            TodoplaneError::database(e, format!("Failed to record migration: {}", migration.file))
        })?;

        tx.commit()
            .await
            .map_err(|e| TodoplaneError::database(e, "Failed to commit migration transaction"))?;

        migrations_run += 1;
        info!(
            version = version,
            execution_time_ms = execution_time,
            "Migration completed: {}",
            migration.file
        );
    }

    if migrations_run > 0 {
        info!(count = migrations_run, set = set.name, "Database migrations completed");
    } else {
        info!(set = set.name, "No pending migrations");
    }

    Ok(())
}

async fn create_migration_table(pool: &DbPool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS _todoplane_migrations (
            version INTEGER PRIMARY KEY,
            description TEXT NOT NULL,
            checksum BLOB NOT NULL,
            execution_time INTEGER NOT NULL,
            installed_on TEXT NOT NULL
        )
    "#,
    )
    .execute(pool)
    .await
    .map_err(|e| TodoplaneError::database(e, "Failed to create migration tracking table"))?;

    Ok(())
}

async fn get_applied_migration_versions(pool: &DbPool) -> Result<Vec<i64>> {
    let rows = sqlx::query("SELECT version FROM _todoplane_migrations ORDER BY version")
        .fetch_all(pool)
        .await
        .map_err(|e| TodoplaneError::database(e, "Failed to get applied migrations"))?;

    Ok(rows.into_iter().map(|row| row.get::<i64, _>("version")).collect())
}

fn extract_version_from_filename(filename: &str) -> Result<i64> {
    let version_str = filename.split('_').next().unwrap_or_default();

    version_str.parse::<i64>().map_err(|_| {
        TodoplaneError::validation(format!("Invalid version in migration name: {}", filename))
    })
}

fn calculate_checksum(content: &str) -> Vec<u8> {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    let mut hasher = DefaultHasher::new();
    content.hash(&mut hasher);
    hasher.finish().to_le_bytes().to_vec()
}

/// True when exactly the migrations of `set` have been applied.
pub async fn validate_migrations(pool: &DbPool, set: &MigrationSet) -> Result<bool> {
    create_migration_table(pool).await?;
    let applied_versions = get_applied_migration_versions(pool).await?;
    let expected_versions = set
        .migrations
        .iter()
        .map(|m| extract_version_from_filename(m.file))
        .collect::<Result<Vec<_>>>()?;

    for expected in &expected_versions {
        if !applied_versions.contains(expected) {
            warn!(version = expected, set = set.name, "Missing migration");
            return Ok(false);
        }
    }

    for applied in &applied_versions {
        if !expected_versions.contains(applied) {
            warn!(version = applied, set = set.name, "Unexpected migration found");
            return Ok(false);
        }
    }

    Ok(true)
}

/// List all applied migrations
pub async fn list_applied_migrations(pool: &DbPool) -> Result<Vec<MigrationInfo>> {
    create_migration_table(pool).await?;
    let rows = sqlx::query(
        "SELECT version, description, checksum, execution_time, installed_on \
         FROM _todoplane_migrations ORDER BY version",
    )
    .fetch_all(pool)
    .await
    .map_err(|e| TodoplaneError::database(e, "Failed to list applied migrations"))?;

    Ok(rows
        .into_iter()
        .map(|row| MigrationInfo {
            version: row.get("version"),
            description: row.get("description"),
            installed_on: row.get("installed_on"),
            execution_time: row.get("execution_time"),
            checksum: row.get("checksum"),
        })
        .collect())
}
