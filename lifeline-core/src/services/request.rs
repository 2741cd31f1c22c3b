use std::sync::Arc;

use serde::Serialize;

use crate::{
    Error,
    clock::Clock,
    error::RequestError,
    repositories::RequestRepository,
    request::{HelpRequest, NewHelpRequest, RequestId, RequestStatus},
    services::lifecycle::RequestLifecycle,
    user::UserId,
    validation::{validate_email, validate_name, validate_phone},
};

/// Editable fields of a help request. Absent fields are left unchanged.
#[derive(Debug, Default, Clone)]
pub struct RequestUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub notes: Option<String>,
    /// Raw status string; validated through the lifecycle.
    pub status: Option<String>,
    pub assigned_to: Option<UserId>,
}

/// Per-status request counts for the admin dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct RequestCounts {
    pub total: u64,
    pub pending: u64,
    pub completed: u64,
}

/// Service for help-request management.
///
/// All status changes, from whichever endpoint, run through the
/// [`RequestLifecycle`] so the completion timestamp rules hold everywhere.
pub struct RequestService<R: RequestRepository> {
    repository: Arc<R>,
    lifecycle: RequestLifecycle,
    clock: Arc<dyn Clock>,
}

impl<R: RequestRepository> RequestService<R> {
    pub fn new(repository: Arc<R>, clock: Arc<dyn Clock>) -> Self {
        Self {
            repository,
            lifecycle: RequestLifecycle::new(clock.clone()),
            clock,
        }
    }

    /// Create a new help request with status `pending`.
    pub async fn create_request(&self, new_request: NewHelpRequest) -> Result<HelpRequest, Error> {
        validate_name(&new_request.name)?;
        validate_phone(&new_request.phone)?;
        if let Some(email) = &new_request.email {
            validate_email(email)?;
        }

        self.repository.create(new_request).await
    }

    pub async fn get_request(&self, id: &RequestId) -> Result<Option<HelpRequest>, Error> {
        self.repository.find_by_id(id).await
    }

    /// List all requests, newest first.
    pub async fn list_requests(&self) -> Result<Vec<HelpRequest>, Error> {
        self.repository.list().await
    }

    /// List the requests submitted by an account, newest first.
    pub async fn list_requests_by_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<HelpRequest>, Error> {
        self.repository.list_by_user(user_id).await
    }

    /// Update any of a request's editable fields.
    pub async fn update_request(
        &self,
        id: &RequestId,
        update: RequestUpdate,
    ) -> Result<HelpRequest, Error> {
        let mut request = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or(RequestError::NotFound)?;

        if let Some(name) = update.name {
            validate_name(&name)?;
            request.name = name;
        }
        if let Some(email) = update.email {
            validate_email(&email)?;
            request.email = Some(email);
        }
        if let Some(phone) = update.phone {
            validate_phone(&phone)?;
            request.phone = phone;
        }
        if let Some(address) = update.address {
            request.address = address;
        }
        if let Some(notes) = update.notes {
            request.notes = Some(notes);
        }
        if let Some(assigned_to) = update.assigned_to {
            request.assigned_to = Some(assigned_to);
        }
        if let Some(status) = update.status {
            let change = self.lifecycle.apply_status(&request, &status)?;
            request.status = change.status;
            request.completed_at = change.completed_at;
        }

        request.updated_at = self.clock.now();
        self.repository.update(&request).await
    }

    /// Update only a request's status. The simplified volunteer flow.
    pub async fn update_status(
        &self,
        id: &RequestId,
        status: &str,
    ) -> Result<HelpRequest, Error> {
        let mut request = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or(RequestError::NotFound)?;

        let change = self.lifecycle.apply_status(&request, status)?;
        request.status = change.status;
        request.completed_at = change.completed_at;
        request.updated_at = self.clock.now();

        tracing::info!(request = %request.id, status = %request.status, "request status updated");

        self.repository.update(&request).await
    }

    pub async fn delete_request(&self, id: &RequestId) -> Result<(), Error> {
        if self.repository.find_by_id(id).await?.is_none() {
            return Err(RequestError::NotFound.into());
        }
        self.repository.delete(id).await
    }

    /// Request counts for the admin dashboard.
    pub async fn counts(&self) -> Result<RequestCounts, Error> {
        let (total, pending, completed) = tokio::try_join!(
            self.repository.count(),
            self.repository.count_by_status(RequestStatus::Pending),
            self.repository.count_by_status(RequestStatus::Completed),
        )?;

        Ok(RequestCounts {
            total,
            pending,
            completed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::repositories::MemoryRequestRepository;
    use chrono::{Duration, Utc};

    fn service() -> (RequestService<MemoryRequestRepository>, Arc<FixedClock>) {
        let clock = Arc::new(FixedClock::new(Utc::now()));
        (
            RequestService::new(Arc::new(MemoryRequestRepository::default()), clock.clone()),
            clock,
        )
    }

    fn new_request(name: &str) -> NewHelpRequest {
        NewHelpRequest::builder()
            .name(name)
            .phone("555-0100")
            .address("12 Elm St")
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_create_starts_pending() {
        let (service, _clock) = service();
        let request = service.create_request(new_request("Ana")).await.unwrap();
        assert_eq!(request.status, RequestStatus::Pending);
        assert!(request.completed_at.is_none());
    }

    #[tokio::test]
    async fn test_create_validates_contact_details() {
        let (service, _clock) = service();
        let mut bad_phone = new_request("Ana");
        bad_phone.phone = "call me".to_string();
        assert!(service.create_request(bad_phone).await.is_err());

        let mut bad_email = new_request("Ana");
        bad_email.email = Some("nope".to_string());
        assert!(service.create_request(bad_email).await.is_err());
    }

    #[tokio::test]
    async fn test_update_status_stamps_completion_once() {
        let (service, clock) = service();
        let request = service.create_request(new_request("Ana")).await.unwrap();

        let t1 = clock.now();
        let completed = service
            .update_status(&request.id, "completed")
            .await
            .unwrap();
        assert_eq!(completed.completed_at, Some(t1));

        clock.advance(Duration::minutes(30));
        let again = service
            .update_status(&request.id, "completed")
            .await
            .unwrap();
        assert_eq!(again.completed_at, Some(t1));
    }

    #[tokio::test]
    async fn test_update_status_rejects_unknown_value() {
        let (service, _clock) = service();
        let request = service.create_request(new_request("Ana")).await.unwrap();

        let err = service.update_status(&request.id, "done").await.unwrap_err();
        assert!(err.is_validation_error());

        // The stored record is untouched.
        let stored = service.get_request(&request.id).await.unwrap().unwrap();
        assert_eq!(stored.status, RequestStatus::Pending);
    }

    #[tokio::test]
    async fn test_update_request_routes_status_through_lifecycle() {
        let (service, clock) = service();
        let request = service.create_request(new_request("Ana")).await.unwrap();

        let t1 = clock.now();
        let updated = service
            .update_request(
                &request.id,
                RequestUpdate {
                    notes: Some("bring a ladder".to_string()),
                    status: Some("completed".to_string()),
                    ..RequestUpdate::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.notes.as_deref(), Some("bring a ladder"));
        assert_eq!(updated.status, RequestStatus::Completed);
        assert_eq!(updated.completed_at, Some(t1));
    }

    #[tokio::test]
    async fn test_update_missing_request_is_not_found() {
        let (service, _clock) = service();
        let err = service
            .update_status(&RequestId::new_random(), "completed")
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_counts() {
        let (service, _clock) = service();
        for name in ["Ana", "Bo", "Cam"] {
            service.create_request(new_request(name)).await.unwrap();
        }
        let first = &service.list_requests().await.unwrap()[0];
        service.update_status(&first.id, "completed").await.unwrap();

        let counts = service.counts().await.unwrap();
        assert_eq!(counts.total, 3);
        assert_eq!(counts.pending, 2);
        assert_eq!(counts.completed, 1);
    }
}
