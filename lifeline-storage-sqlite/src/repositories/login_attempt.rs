//! SQLite implementation of the login-attempt store.
//!
//! An alternative to the default in-memory table for deployments that want
//! lockout state to survive restarts. One row per normalized account key.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use lifeline_core::{
    Error,
    error::StorageError,
    repositories::{LoginAttemptRecord, LoginAttemptStore},
};

pub struct SqliteLoginAttemptStore {
    pool: SqlitePool,
}

impl SqliteLoginAttemptStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct SqliteLoginAttempt {
    key: String,
    failure_count: i64,
    locked_until: Option<i64>,
    created_at: i64,
    last_failed_at: i64,
}

impl From<SqliteLoginAttempt> for LoginAttemptRecord {
    fn from(row: SqliteLoginAttempt) -> Self {
        LoginAttemptRecord {
            key: row.key,
            failure_count: row.failure_count as u32,
            locked_until: row.locked_until.and_then(|ts| DateTime::from_timestamp(ts, 0)),
            created_at: DateTime::from_timestamp(row.created_at, 0).unwrap_or_default(),
            last_failed_at: DateTime::from_timestamp(row.last_failed_at, 0).unwrap_or_default(),
        }
    }
}

#[async_trait]
impl LoginAttemptStore for SqliteLoginAttemptStore {
    async fn find(&self, key: &str) -> Result<Option<LoginAttemptRecord>, Error> {
        let row = sqlx::query_as::<_, SqliteLoginAttempt>(
            "SELECT key, failure_count, locked_until, created_at, last_failed_at \
             FROM login_attempts WHERE key = ?",
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to find login attempt record");
            StorageError::Database("Failed to find login attempt record".to_string())
        })?;

        Ok(row.map(Into::into))
    }

    async fn save(&self, record: &LoginAttemptRecord) -> Result<(), Error> {
        sqlx::query(
            r#"
            INSERT INTO login_attempts (key, failure_count, locked_until, created_at, last_failed_at)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT (key) DO UPDATE SET
                failure_count = excluded.failure_count,
                locked_until = excluded.locked_until,
                last_failed_at = excluded.last_failed_at
            "#,
        )
        .bind(&record.key)
        .bind(record.failure_count as i64)
        .bind(record.locked_until.map(|t| t.timestamp()))
        .bind(record.created_at.timestamp())
        .bind(record.last_failed_at.timestamp())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to save login attempt record");
            StorageError::Database("Failed to save login attempt record".to_string())
        })?;

        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool, Error> {
        let result = sqlx::query("DELETE FROM login_attempts WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Failed to delete login attempt record");
                StorageError::Database("Failed to delete login attempt record".to_string())
            })?;

        Ok(result.rows_affected() > 0)
    }

    async fn purge_expired(
        &self,
        now: DateTime<Utc>,
        stale_before: DateTime<Utc>,
    ) -> Result<u64, Error> {
        let result = sqlx::query(
            "DELETE FROM login_attempts \
             WHERE (locked_until IS NOT NULL AND locked_until <= ?) OR last_failed_at <= ?",
        )
        .bind(now.timestamp())
        .bind(stale_before.timestamp())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to purge login attempt records");
            StorageError::Database("Failed to purge login attempt records".to_string())
        })?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SqliteRepositoryProvider;
    use chrono::Duration;
    use lifeline_core::repositories::RepositoryProvider;

    async fn setup() -> SqlitePool {
        let pool = SqlitePool::connect("sqlite::memory:")
            .await
            .expect("Failed to create pool");
        SqliteRepositoryProvider::new(pool.clone())
            .migrate()
            .await
            .expect("Failed to migrate");
        pool
    }

    fn record(key: &str, locked_until: Option<DateTime<Utc>>) -> LoginAttemptRecord {
        let now = Utc::now();
        LoginAttemptRecord {
            key: key.to_string(),
            failure_count: 1,
            locked_until,
            created_at: now,
            last_failed_at: now,
        }
    }

    #[tokio::test]
    async fn test_save_find_delete() {
        let store = SqliteLoginAttemptStore::new(setup().await);

        assert!(store.find("a@example.com").await.unwrap().is_none());

        store.save(&record("a@example.com", None)).await.unwrap();
        let found = store.find("a@example.com").await.unwrap().unwrap();
        assert_eq!(found.failure_count, 1);
        assert!(found.locked_until.is_none());

        assert!(store.delete("a@example.com").await.unwrap());
        assert!(!store.delete("a@example.com").await.unwrap());
    }

    #[tokio::test]
    async fn test_save_replaces_existing_record() {
        let store = SqliteLoginAttemptStore::new(setup().await);

        let mut rec = record("a@example.com", None);
        store.save(&rec).await.unwrap();

        rec.failure_count = 5;
        rec.locked_until = Some(Utc::now() + Duration::minutes(15));
        store.save(&rec).await.unwrap();

        let found = store.find("a@example.com").await.unwrap().unwrap();
        assert_eq!(found.failure_count, 5);
        assert!(found.locked_until.is_some());
    }

    #[tokio::test]
    async fn test_purge_removes_expired_and_stale() {
        let store = SqliteLoginAttemptStore::new(setup().await);
        let now = Utc::now();

        store
            .save(&record("fresh@example.com", Some(now + Duration::minutes(10))))
            .await
            .unwrap();
        store
            .save(&record("expired@example.com", Some(now - Duration::minutes(1))))
            .await
            .unwrap();

        let mut stale = record("stale@example.com", None);
        stale.last_failed_at = now - Duration::hours(2);
        store.save(&stale).await.unwrap();

        let purged = store
            .purge_expired(now, now - Duration::minutes(60))
            .await
            .unwrap();
        assert_eq!(purged, 2);
        assert!(store.find("fresh@example.com").await.unwrap().is_some());
        assert!(store.find("expired@example.com").await.unwrap().is_none());
        assert!(store.find("stale@example.com").await.unwrap().is_none());
    }
}
