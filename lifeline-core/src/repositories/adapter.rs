//! Adapters that wrap a [`RepositoryProvider`] and implement the individual
//! repository traits, so services can stay generic over a single repository
//! type while the application wires everything from one provider.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::{
    Error,
    repositories::{
        LoginAttemptRecord, LoginAttemptStore, PasswordRepository, RepositoryProvider,
        RequestRepository, UserRepository,
    },
    request::{HelpRequest, NewHelpRequest, RequestId, RequestStatus},
    user::{NewUser, User, UserId, UserRole},
};

pub struct UserRepositoryAdapter<R: RepositoryProvider> {
    provider: Arc<R>,
}

impl<R: RepositoryProvider> UserRepositoryAdapter<R> {
    pub fn new(provider: Arc<R>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl<R: RepositoryProvider> UserRepository for UserRepositoryAdapter<R> {
    async fn create(&self, user: NewUser) -> Result<User, Error> {
        self.provider.user().create(user).await
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, Error> {
        self.provider.user().find_by_id(id).await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, Error> {
        self.provider.user().find_by_email(email).await
    }

    async fn update(&self, user: &User) -> Result<User, Error> {
        self.provider.user().update(user).await
    }

    async fn delete(&self, id: &UserId) -> Result<(), Error> {
        self.provider.user().delete(id).await
    }

    async fn list(&self) -> Result<Vec<User>, Error> {
        self.provider.user().list().await
    }

    async fn list_by_role(&self, role: UserRole) -> Result<Vec<User>, Error> {
        self.provider.user().list_by_role(role).await
    }

    async fn count(&self) -> Result<u64, Error> {
        self.provider.user().count().await
    }
}

pub struct PasswordRepositoryAdapter<R: RepositoryProvider> {
    provider: Arc<R>,
}

impl<R: RepositoryProvider> PasswordRepositoryAdapter<R> {
    pub fn new(provider: Arc<R>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl<R: RepositoryProvider> PasswordRepository for PasswordRepositoryAdapter<R> {
    async fn set_password_hash(&self, user_id: &UserId, hash: &str) -> Result<(), Error> {
        self.provider.password().set_password_hash(user_id, hash).await
    }

    async fn get_password_hash(&self, user_id: &UserId) -> Result<Option<String>, Error> {
        self.provider.password().get_password_hash(user_id).await
    }

    async fn remove_password_hash(&self, user_id: &UserId) -> Result<(), Error> {
        self.provider.password().remove_password_hash(user_id).await
    }
}

pub struct RequestRepositoryAdapter<R: RepositoryProvider> {
    provider: Arc<R>,
}

impl<R: RepositoryProvider> RequestRepositoryAdapter<R> {
    pub fn new(provider: Arc<R>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl<R: RepositoryProvider> RequestRepository for RequestRepositoryAdapter<R> {
    async fn create(&self, request: NewHelpRequest) -> Result<HelpRequest, Error> {
        self.provider.request().create(request).await
    }

    async fn find_by_id(&self, id: &RequestId) -> Result<Option<HelpRequest>, Error> {
        self.provider.request().find_by_id(id).await
    }

    async fn update(&self, request: &HelpRequest) -> Result<HelpRequest, Error> {
        self.provider.request().update(request).await
    }

    async fn delete(&self, id: &RequestId) -> Result<(), Error> {
        self.provider.request().delete(id).await
    }

    async fn list(&self) -> Result<Vec<HelpRequest>, Error> {
        self.provider.request().list().await
    }

    async fn list_by_user(&self, user_id: &UserId) -> Result<Vec<HelpRequest>, Error> {
        self.provider.request().list_by_user(user_id).await
    }

    async fn count(&self) -> Result<u64, Error> {
        self.provider.request().count().await
    }

    async fn count_by_status(&self, status: RequestStatus) -> Result<u64, Error> {
        self.provider.request().count_by_status(status).await
    }
}

pub struct LoginAttemptStoreAdapter<R: RepositoryProvider> {
    provider: Arc<R>,
}

impl<R: RepositoryProvider> LoginAttemptStoreAdapter<R> {
    pub fn new(provider: Arc<R>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl<R: RepositoryProvider> LoginAttemptStore for LoginAttemptStoreAdapter<R> {
    async fn find(&self, key: &str) -> Result<Option<LoginAttemptRecord>, Error> {
        self.provider.login_attempts().find(key).await
    }

    async fn save(&self, record: &LoginAttemptRecord) -> Result<(), Error> {
        self.provider.login_attempts().save(record).await
    }

    async fn delete(&self, key: &str) -> Result<bool, Error> {
        self.provider.login_attempts().delete(key).await
    }

    async fn purge_expired(
        &self,
        now: DateTime<Utc>,
        stale_before: DateTime<Utc>,
    ) -> Result<u64, Error> {
        self.provider
            .login_attempts()
            .purge_expired(now, stale_before)
            .await
    }
}
