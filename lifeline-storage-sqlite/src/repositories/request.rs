//! SQLite implementation of the help-request repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use lifeline_core::{
    Error,
    error::StorageError,
    repositories::RequestRepository,
    request::{HelpRequest, NewHelpRequest, RequestId, RequestStatus},
    user::UserId,
};

pub struct SqliteRequestRepository {
    pool: SqlitePool,
}

impl SqliteRequestRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct SqliteHelpRequest {
    id: String,
    name: String,
    email: Option<String>,
    phone: String,
    address: String,
    notes: Option<String>,
    user_id: Option<String>,
    assigned_to: Option<String>,
    status: String,
    created_at: i64,
    updated_at: i64,
    completed_at: Option<i64>,
}

impl TryFrom<SqliteHelpRequest> for HelpRequest {
    type Error = Error;

    fn try_from(row: SqliteHelpRequest) -> Result<Self, Error> {
        Ok(HelpRequest {
            id: RequestId::new(&row.id),
            name: row.name,
            email: row.email,
            phone: row.phone,
            address: row.address,
            notes: row.notes,
            user_id: row.user_id.map(|id| UserId::new(&id)),
            assigned_to: row.assigned_to.map(|id| UserId::new(&id)),
            status: row
                .status
                .parse::<RequestStatus>()
                .map_err(|e| StorageError::Database(e.to_string()))?,
            created_at: DateTime::from_timestamp(row.created_at, 0).unwrap_or_default(),
            updated_at: DateTime::from_timestamp(row.updated_at, 0).unwrap_or_default(),
            completed_at: row.completed_at.and_then(|ts| DateTime::from_timestamp(ts, 0)),
        })
    }
}

const REQUEST_COLUMNS: &str = "id, name, email, phone, address, notes, user_id, assigned_to, \
                               status, created_at, updated_at, completed_at";

#[async_trait]
impl RequestRepository for SqliteRequestRepository {
    async fn create(&self, request: NewHelpRequest) -> Result<HelpRequest, Error> {
        let now = Utc::now().timestamp();

        let row = sqlx::query_as::<_, SqliteHelpRequest>(&format!(
            r#"
            INSERT INTO requests (id, name, email, phone, address, notes, user_id, status, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, 'pending', ?, ?)
            RETURNING {REQUEST_COLUMNS}
            "#
        ))
        .bind(request.id.as_str())
        .bind(&request.name)
        .bind(&request.email)
        .bind(&request.phone)
        .bind(&request.address)
        .bind(&request.notes)
        .bind(request.user_id.as_ref().map(|id| id.as_str().to_string()))
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to create request");
            StorageError::Database("Failed to create request".to_string())
        })?;

        row.try_into()
    }

    async fn find_by_id(&self, id: &RequestId) -> Result<Option<HelpRequest>, Error> {
        let row = sqlx::query_as::<_, SqliteHelpRequest>(&format!(
            "SELECT {REQUEST_COLUMNS} FROM requests WHERE id = ?"
        ))
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to find request");
            StorageError::Database("Failed to find request".to_string())
        })?;

        row.map(HelpRequest::try_from).transpose()
    }

    async fn update(&self, request: &HelpRequest) -> Result<HelpRequest, Error> {
        let row = sqlx::query_as::<_, SqliteHelpRequest>(&format!(
            r#"
            UPDATE requests
            SET name = ?, email = ?, phone = ?, address = ?, notes = ?, user_id = ?,
                assigned_to = ?, status = ?, updated_at = ?, completed_at = ?
            WHERE id = ?
            RETURNING {REQUEST_COLUMNS}
            "#
        ))
        .bind(&request.name)
        .bind(&request.email)
        .bind(&request.phone)
        .bind(&request.address)
        .bind(&request.notes)
        .bind(request.user_id.as_ref().map(|id| id.as_str().to_string()))
        .bind(
            request
                .assigned_to
                .as_ref()
                .map(|id| id.as_str().to_string()),
        )
        .bind(request.status.as_str())
        .bind(request.updated_at.timestamp())
        .bind(request.completed_at.map(|t| t.timestamp()))
        .bind(request.id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to update request");
            StorageError::Database("Failed to update request".to_string())
        })?;

        row.ok_or(Error::Storage(StorageError::NotFound))?.try_into()
    }

    async fn delete(&self, id: &RequestId) -> Result<(), Error> {
        sqlx::query("DELETE FROM requests WHERE id = ?")
            .bind(id.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Failed to delete request");
                StorageError::Database("Failed to delete request".to_string())
            })?;
        Ok(())
    }

    async fn list(&self) -> Result<Vec<HelpRequest>, Error> {
        let rows = sqlx::query_as::<_, SqliteHelpRequest>(&format!(
            "SELECT {REQUEST_COLUMNS} FROM requests ORDER BY created_at DESC, id"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to list requests");
            StorageError::Database("Failed to list requests".to_string())
        })?;

        rows.into_iter().map(HelpRequest::try_from).collect()
    }

    async fn list_by_user(&self, user_id: &UserId) -> Result<Vec<HelpRequest>, Error> {
        let rows = sqlx::query_as::<_, SqliteHelpRequest>(&format!(
            "SELECT {REQUEST_COLUMNS} FROM requests WHERE user_id = ? ORDER BY created_at DESC, id"
        ))
        .bind(user_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to list requests by user");
            StorageError::Database("Failed to list requests by user".to_string())
        })?;

        rows.into_iter().map(HelpRequest::try_from).collect()
    }

    async fn count(&self) -> Result<u64, Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM requests")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Failed to count requests");
                StorageError::Database("Failed to count requests".to_string())
            })?;

        Ok(count as u64)
    }

    async fn count_by_status(&self, status: RequestStatus) -> Result<u64, Error> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM requests WHERE status = ?")
                .bind(status.as_str())
                .fetch_one(&self.pool)
                .await
                .map_err(|e| {
                    tracing::error!(error = %e, "Failed to count requests by status");
                    StorageError::Database("Failed to count requests by status".to_string())
                })?;

        Ok(count as u64)
    }
}
