//! Database connection management

use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use tracing::{error, info};

use crate::config::CoreConfig;
use crate::error::{KnowledgeError, Result};

/// Connection pool over the single embedded database file.
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open (creating if missing) the database named by the config.
    pub async fn new(config: &CoreConfig) -> Result<Self> {
        info!("Opening database: {}", config.database_url);

        let options = SqliteConnectOptions::from_str(&config.database_url)
            .map_err(|e| {
                error!("Invalid database url {}: {}", config.database_url, e);
                KnowledgeError::Store(e)
            })?
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.db_max_connections)
            .acquire_timeout(Duration::from_secs(config.db_acquire_timeout_secs))
            .connect_with(options)
            .await
            .map_err(|e| {
                error!("Failed to open database {}: {}", config.database_url, e);
                KnowledgeError::Store(e)
            })?;

        info!("Database connection established");
        Ok(Self { pool })
    }

    /// A private in-memory database, for tests. A single connection keeps
    /// every query on the same memory instance.
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;
        let db = Self { pool };
        db.migrate().await?;
        Ok(db)
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Run database migrations, in order. Each file is additive only.
    pub async fn migrate(&self) -> Result<()> {
        info!("Running database migrations");

        let migration_0001 = include_str!("../../migrations/0001_init.sql");
        let migration_0002 = include_str!("../../migrations/0002_indexes.sql");

        for (name, sql) in [
            ("0001_init.sql", migration_0001),
            ("0002_indexes.sql", migration_0002),
        ] {
            info!("Running migration {}", name);
            sqlx::raw_sql(sql).execute(&self.pool).await.map_err(|e| {
                error!("Migration {} failed: {}", name, e);
                KnowledgeError::Migration(format!("Failed to run {}: {}", name, e))
            })?;
        }

        info!("Database migrations completed");
        Ok(())
    }

    /// Check database health
    pub async fn health_check(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(KnowledgeError::Store)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_migrates_and_is_healthy() {
        let db = Database::in_memory().await.unwrap();
        db.health_check().await.unwrap();
    }

    #[tokio::test]
    async fn test_migrations_are_idempotent() {
        let db = Database::in_memory().await.unwrap();
        db.migrate().await.unwrap();
        db.migrate().await.unwrap();
    }
}
