//! SQLite implementation of the user repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use lifeline_core::{
    Error,
    error::StorageError,
    repositories::UserRepository,
    user::{NewUser, User, UserId, UserRole, UserStatus},
};

pub struct SqliteUserRepository {
    pool: SqlitePool,
}

impl SqliteUserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct SqliteUser {
    id: String,
    name: String,
    email: String,
    phone: Option<String>,
    role: String,
    status: String,
    created_at: i64,
    updated_at: i64,
}

impl TryFrom<SqliteUser> for User {
    type Error = Error;

    fn try_from(row: SqliteUser) -> Result<Self, Error> {
        Ok(User {
            id: UserId::new(&row.id),
            name: row.name,
            email: row.email,
            phone: row.phone,
            role: row
                .role
                .parse::<UserRole>()
                .map_err(|e| StorageError::Database(e.to_string()))?,
            status: row
                .status
                .parse::<UserStatus>()
                .map_err(|e| StorageError::Database(e.to_string()))?,
            created_at: DateTime::from_timestamp(row.created_at, 0).unwrap_or_default(),
            updated_at: DateTime::from_timestamp(row.updated_at, 0).unwrap_or_default(),
        })
    }
}

const USER_COLUMNS: &str = "id, name, email, phone, role, status, created_at, updated_at";

#[async_trait]
impl UserRepository for SqliteUserRepository {
    async fn create(&self, user: NewUser) -> Result<User, Error> {
        let now = Utc::now().timestamp();

        let row = sqlx::query_as::<_, SqliteUser>(
            r#"
            INSERT INTO users (id, name, email, phone, role, status, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING id, name, email, phone, role, status, created_at, updated_at
            "#,
        )
        .bind(user.id.as_str())
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.phone)
        .bind(user.role.as_str())
        .bind(user.status.as_str())
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                Error::Storage(StorageError::Constraint("email already in use".to_string()))
            }
            _ => {
                tracing::error!(error = %e, "Failed to create user");
                Error::Storage(StorageError::Database("Failed to create user".to_string()))
            }
        })?;

        row.try_into()
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, Error> {
        let row = sqlx::query_as::<_, SqliteUser>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = ?"
        ))
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to find user by id");
            StorageError::Database("Failed to find user by id".to_string())
        })?;

        row.map(User::try_from).transpose()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, Error> {
        let row = sqlx::query_as::<_, SqliteUser>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = ?"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to find user by email");
            StorageError::Database("Failed to find user by email".to_string())
        })?;

        row.map(User::try_from).transpose()
    }

    async fn update(&self, user: &User) -> Result<User, Error> {
        let now = Utc::now().timestamp();

        let row = sqlx::query_as::<_, SqliteUser>(
            r#"
            UPDATE users
            SET name = ?, email = ?, phone = ?, role = ?, status = ?, updated_at = ?
            WHERE id = ?
            RETURNING id, name, email, phone, role, status, created_at, updated_at
            "#,
        )
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.phone)
        .bind(user.role.as_str())
        .bind(user.status.as_str())
        .bind(now)
        .bind(user.id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to update user");
            StorageError::Database("Failed to update user".to_string())
        })?;

        row.ok_or(Error::Storage(StorageError::NotFound))?.try_into()
    }

    async fn delete(&self, id: &UserId) -> Result<(), Error> {
        sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Failed to delete user");
                StorageError::Database("Failed to delete user".to_string())
            })?;
        Ok(())
    }

    async fn list(&self) -> Result<Vec<User>, Error> {
        let rows = sqlx::query_as::<_, SqliteUser>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY created_at DESC, id"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to list users");
            StorageError::Database("Failed to list users".to_string())
        })?;

        rows.into_iter().map(User::try_from).collect()
    }

    async fn list_by_role(&self, role: UserRole) -> Result<Vec<User>, Error> {
        let rows = sqlx::query_as::<_, SqliteUser>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE role = ? ORDER BY created_at DESC, id"
        ))
        .bind(role.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to list users by role");
            StorageError::Database("Failed to list users by role".to_string())
        })?;

        rows.into_iter().map(User::try_from).collect()
    }

    async fn count(&self) -> Result<u64, Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Failed to count users");
                StorageError::Database("Failed to count users".to_string())
            })?;

        Ok(count as u64)
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

    fn new_user(email: &str) -> NewUser {
        NewUser::builder()
            .name("Test User")
            .email(email)
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_create_and_find() {
        let repo = SqliteUserRepository::new(setup().await);

        let created = repo.create(new_user("a@example.com")).await.unwrap();
        assert_eq!(created.role, UserRole::Volunteer);
        assert_eq!(created.status, UserStatus::Active);

        let by_id = repo.find_by_id(&created.id).await.unwrap().unwrap();
        assert_eq!(by_id.email, "a@example.com");

        let by_email = repo.find_by_email("a@example.com").await.unwrap().unwrap();
        assert_eq!(by_email.id, created.id);

        assert!(repo.find_by_email("b@example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_email_is_constraint_error() {
        let repo = SqliteUserRepository::new(setup().await);

        repo.create(new_user("a@example.com")).await.unwrap();
        let err = repo.create(new_user("a@example.com")).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Storage(StorageError::Constraint(_))
        ));
    }

    #[tokio::test]
    async fn test_update_role_and_status() {
        let repo = SqliteUserRepository::new(setup().await);

        let mut user = repo.create(new_user("a@example.com")).await.unwrap();
        user.role = UserRole::Admin;
        user.status = UserStatus::Inactive;

        let updated = repo.update(&user).await.unwrap();
        assert_eq!(updated.role, UserRole::Admin);
        assert_eq!(updated.status, UserStatus::Inactive);
    }

    #[tokio::test]
    async fn test_update_missing_user_is_not_found() {
        let repo = SqliteUserRepository::new(setup().await);
        let user = repo.create(new_user("a@example.com")).await.unwrap();
        repo.delete(&user.id).await.unwrap();

        let err = repo.update(&user).await.unwrap_err();
        assert!(matches!(err, Error::Storage(StorageError::NotFound)));
    }

    #[tokio::test]
    async fn test_list_and_count() {
        let repo = SqliteUserRepository::new(setup().await);

        let mut admin = repo.create(new_user("admin@example.com")).await.unwrap();
        admin.role = UserRole::Admin;
        repo.update(&admin).await.unwrap();
        repo.create(new_user("v1@example.com")).await.unwrap();
        repo.create(new_user("v2@example.com")).await.unwrap();

        assert_eq!(repo.count().await.unwrap(), 3);
        assert_eq!(repo.list().await.unwrap().len(), 3);
        assert_eq!(
            repo.list_by_role(UserRole::Volunteer).await.unwrap().len(),
            2
        );
    }
}
