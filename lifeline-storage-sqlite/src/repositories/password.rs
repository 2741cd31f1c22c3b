//! SQLite implementation of the password repository.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;

use lifeline_core::{
    Error, error::StorageError, repositories::PasswordRepository, user::UserId,
};

pub struct SqlitePasswordRepository {
    pool: SqlitePool,
}

impl SqlitePasswordRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PasswordRepository for SqlitePasswordRepository {
    async fn set_password_hash(&self, user_id: &UserId, hash: &str) -> Result<(), Error> {
        sqlx::query(
            r#"
            INSERT INTO passwords (user_id, hash, updated_at)
            VALUES (?, ?, ?)
            ON CONFLICT (user_id) DO UPDATE SET hash = excluded.hash, updated_at = excluded.updated_at
            "#,
        )
        .bind(user_id.as_str())
        .bind(hash)
        .bind(Utc::now().timestamp())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to set password hash");
            StorageError::Database("Failed to set password hash".to_string())
        })?;

        Ok(())
    }

    async fn get_password_hash(&self, user_id: &UserId) -> Result<Option<String>, Error> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT hash FROM passwords WHERE user_id = ?")
                .bind(user_id.as_str())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| {
                    tracing::error!(error = %e, "Failed to get password hash");
                    StorageError::Database("Failed to get password hash".to_string())
                })?;

        Ok(row.map(|(hash,)| hash))
    }

    async fn remove_password_hash(&self, user_id: &UserId) -> Result<(), Error> {
        sqlx::query("DELETE FROM passwords WHERE user_id = ?")
            .bind(user_id.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Failed to remove password hash");
                StorageError::Database("Failed to remove password hash".to_string())
            })?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SqliteRepositoryProvider;
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

    #[tokio::test]
    async fn test_set_get_replace_remove() {
        let repo = SqlitePasswordRepository::new(setup().await);
        let user_id = UserId::new_random();

        assert!(repo.get_password_hash(&user_id).await.unwrap().is_none());

        repo.set_password_hash(&user_id, "hash-one").await.unwrap();
        assert_eq!(
            repo.get_password_hash(&user_id).await.unwrap().as_deref(),
            Some("hash-one")
        );

        repo.set_password_hash(&user_id, "hash-two").await.unwrap();
        assert_eq!(
            repo.get_password_hash(&user_id).await.unwrap().as_deref(),
            Some("hash-two")
        );

        repo.remove_password_hash(&user_id).await.unwrap();
        assert!(repo.get_password_hash(&user_id).await.unwrap().is_none());
    }
}
