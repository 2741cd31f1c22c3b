//! SQLite storage backend for Lifeline.
//!
//! Implements the `lifeline-core` repository traits over a [`SqlitePool`].
//! Timestamps are stored as unix seconds; roles and statuses as their
//! canonical text form. `migrate()` bootstraps the schema idempotently.

pub mod repositories;

use async_trait::async_trait;
use sqlx::SqlitePool;

use lifeline_core::{
    Error,
    error::StorageError,
    repositories::{
        LoginAttemptStoreProvider, PasswordRepositoryProvider, RepositoryProvider,
        RequestRepositoryProvider, UserRepositoryProvider,
    },
};

pub use repositories::{
    SqliteLoginAttemptStore, SqlitePasswordRepository, SqliteRequestRepository,
    SqliteUserRepository,
};

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        email TEXT NOT NULL UNIQUE,
        phone TEXT,
        role TEXT NOT NULL DEFAULT 'volunteer',
        status TEXT NOT NULL DEFAULT 'active',
        created_at INTEGER NOT NULL,
        updated_at INTEGER NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS passwords (
        user_id TEXT PRIMARY KEY,
        hash TEXT NOT NULL,
        updated_at INTEGER NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS requests (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        email TEXT,
        phone TEXT NOT NULL,
        address TEXT NOT NULL,
        notes TEXT,
        user_id TEXT,
        assigned_to TEXT,
        status TEXT NOT NULL DEFAULT 'pending',
        created_at INTEGER NOT NULL,
        updated_at INTEGER NOT NULL,
        completed_at INTEGER
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_requests_status ON requests(status)",
    "CREATE INDEX IF NOT EXISTS idx_requests_user_id ON requests(user_id)",
    r#"
    CREATE TABLE IF NOT EXISTS login_attempts (
        key TEXT PRIMARY KEY,
        failure_count INTEGER NOT NULL,
        locked_until INTEGER,
        created_at INTEGER NOT NULL,
        last_failed_at INTEGER NOT NULL
    )
    "#,
];

/// SQLite implementation of the full [`RepositoryProvider`].
pub struct SqliteRepositoryProvider {
    pool: SqlitePool,
    users: SqliteUserRepository,
    passwords: SqlitePasswordRepository,
    requests: SqliteRequestRepository,
    login_attempts: SqliteLoginAttemptStore,
}

impl SqliteRepositoryProvider {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            users: SqliteUserRepository::new(pool.clone()),
            passwords: SqlitePasswordRepository::new(pool.clone()),
            requests: SqliteRequestRepository::new(pool.clone()),
            login_attempts: SqliteLoginAttemptStore::new(pool.clone()),
            pool,
        }
    }
}

impl UserRepositoryProvider for SqliteRepositoryProvider {
    type UserRepo = SqliteUserRepository;

    fn user(&self) -> &Self::UserRepo {
        &self.users
    }
}

impl PasswordRepositoryProvider for SqliteRepositoryProvider {
    type PasswordRepo = SqlitePasswordRepository;

    fn password(&self) -> &Self::PasswordRepo {
        &self.passwords
    }
}

impl RequestRepositoryProvider for SqliteRepositoryProvider {
    type RequestRepo = SqliteRequestRepository;

    fn request(&self) -> &Self::RequestRepo {
        &self.requests
    }
}

impl LoginAttemptStoreProvider for SqliteRepositoryProvider {
    type AttemptStore = SqliteLoginAttemptStore;

    fn login_attempts(&self) -> &Self::AttemptStore {
        &self.login_attempts
    }
}

#[async_trait]
impl RepositoryProvider for SqliteRepositoryProvider {
    async fn migrate(&self) -> Result<(), Error> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await.map_err(|e| {
                tracing::error!(error = %e, "Failed to run schema statement");
                Error::Storage(StorageError::Database(e.to_string()))
            })?;
        }
        Ok(())
    }

    async fn health_check(&self) -> Result<(), Error> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Health check failed");
                Error::Storage(StorageError::Connection(e.to_string()))
            })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_migrate_is_idempotent() {
        let pool = SqlitePool::connect("sqlite::memory:")
            .await
            .expect("Failed to create pool");
        let provider = SqliteRepositoryProvider::new(pool);

        provider.migrate().await.expect("first migrate");
        provider.migrate().await.expect("second migrate");
        provider.health_check().await.expect("health check");
    }
}
