//! In-memory repository implementations backed by [`DashMap`].
//!
//! These are the default backend for tests and for single-process deployments
//! that do not need persistence. The login-attempt store in particular is
//! designed to be process-local state (one counter table per instance).

use chrono::{DateTime, Utc};
use dashmap::DashMap;

use async_trait::async_trait;

use crate::{
    Error,
    error::StorageError,
    repositories::{
        LoginAttemptRecord, LoginAttemptStore, LoginAttemptStoreProvider, PasswordRepository,
        PasswordRepositoryProvider, RepositoryProvider, RequestRepository,
        RequestRepositoryProvider, UserRepository, UserRepositoryProvider,
    },
    request::{HelpRequest, NewHelpRequest, RequestId, RequestStatus},
    user::{NewUser, User, UserId, UserRole},
};

#[derive(Default)]
pub struct MemoryUserRepository {
    users: DashMap<UserId, User>,
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn create(&self, user: NewUser) -> Result<User, Error> {
        if self.users.iter().any(|u| u.email == user.email) {
            return Err(StorageError::Constraint(format!(
                "email already in use: {}",
                user.email
            ))
            .into());
        }

        let now = Utc::now();
        let user = User {
            id: user.id,
            name: user.name,
            email: user.email,
            phone: user.phone,
            role: user.role,
            status: user.status,
            created_at: now,
            updated_at: now,
        };
        self.users.insert(user.id.clone(), user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, Error> {
        Ok(self.users.get(id).map(|u| u.clone()))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, Error> {
        Ok(self
            .users
            .iter()
            .find(|u| u.email == email)
            .map(|u| u.clone()))
    }

    async fn update(&self, user: &User) -> Result<User, Error> {
        if !self.users.contains_key(&user.id) {
            return Err(StorageError::NotFound.into());
        }
        self.users.insert(user.id.clone(), user.clone());
        Ok(user.clone())
    }

    async fn delete(&self, id: &UserId) -> Result<(), Error> {
        self.users.remove(id);
        Ok(())
    }

    async fn list(&self) -> Result<Vec<User>, Error> {
        let mut users: Vec<User> = self.users.iter().map(|u| u.clone()).collect();
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(users)
    }

    async fn list_by_role(&self, role: UserRole) -> Result<Vec<User>, Error> {
        let mut users: Vec<User> = self
            .users
            .iter()
            .filter(|u| u.role == role)
            .map(|u| u.clone())
            .collect();
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(users)
    }

    async fn count(&self) -> Result<u64, Error> {
        Ok(self.users.len() as u64)
    }
}

#[derive(Default)]
pub struct MemoryPasswordRepository {
    hashes: DashMap<UserId, String>,
}

#[async_trait]
impl PasswordRepository for MemoryPasswordRepository {
    async fn set_password_hash(&self, user_id: &UserId, hash: &str) -> Result<(), Error> {
        self.hashes.insert(user_id.clone(), hash.to_string());
        Ok(())
    }

    async fn get_password_hash(&self, user_id: &UserId) -> Result<Option<String>, Error> {
        Ok(self.hashes.get(user_id).map(|h| h.clone()))
    }

    async fn remove_password_hash(&self, user_id: &UserId) -> Result<(), Error> {
        self.hashes.remove(user_id);
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryRequestRepository {
    requests: DashMap<RequestId, HelpRequest>,
}

#[async_trait]
impl RequestRepository for MemoryRequestRepository {
    async fn create(&self, request: NewHelpRequest) -> Result<HelpRequest, Error> {
        let now = Utc::now();
        let request = HelpRequest {
            id: request.id,
            name: request.name,
            email: request.email,
            phone: request.phone,
            address: request.address,
            notes: request.notes,
            user_id: request.user_id,
            assigned_to: None,
            status: RequestStatus::Pending,
            created_at: now,
            updated_at: now,
            completed_at: None,
        };
        self.requests.insert(request.id.clone(), request.clone());
        Ok(request)
    }

    async fn find_by_id(&self, id: &RequestId) -> Result<Option<HelpRequest>, Error> {
        Ok(self.requests.get(id).map(|r| r.clone()))
    }

    async fn update(&self, request: &HelpRequest) -> Result<HelpRequest, Error> {
        if !self.requests.contains_key(&request.id) {
            return Err(StorageError::NotFound.into());
        }
        self.requests.insert(request.id.clone(), request.clone());
        Ok(request.clone())
    }

    async fn delete(&self, id: &RequestId) -> Result<(), Error> {
        self.requests.remove(id);
        Ok(())
    }

    async fn list(&self) -> Result<Vec<HelpRequest>, Error> {
        let mut requests: Vec<HelpRequest> = self.requests.iter().map(|r| r.clone()).collect();
        requests.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(requests)
    }

    async fn list_by_user(&self, user_id: &UserId) -> Result<Vec<HelpRequest>, Error> {
        let mut requests: Vec<HelpRequest> = self
            .requests
            .iter()
            .filter(|r| r.user_id.as_ref() == Some(user_id))
            .map(|r| r.clone())
            .collect();
        requests.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(requests)
    }

    async fn count(&self) -> Result<u64, Error> {
        Ok(self.requests.len() as u64)
    }

    async fn count_by_status(&self, status: RequestStatus) -> Result<u64, Error> {
        Ok(self
            .requests
            .iter()
            .filter(|r| r.status == status)
            .count() as u64)
    }
}

/// Process-local login-attempt table.
#[derive(Default)]
pub struct MemoryLoginAttemptStore {
    records: DashMap<String, LoginAttemptRecord>,
}

#[async_trait]
impl LoginAttemptStore for MemoryLoginAttemptStore {
    async fn find(&self, key: &str) -> Result<Option<LoginAttemptRecord>, Error> {
        Ok(self.records.get(key).map(|r| r.clone()))
    }

    async fn save(&self, record: &LoginAttemptRecord) -> Result<(), Error> {
        self.records.insert(record.key.clone(), record.clone());
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool, Error> {
        Ok(self.records.remove(key).is_some())
    }

    async fn purge_expired(
        &self,
        now: DateTime<Utc>,
        stale_before: DateTime<Utc>,
    ) -> Result<u64, Error> {
        let before = self.records.len();
        self.records.retain(|_, record| {
            let lock_expired = record.locked_until.is_some_and(|until| until <= now);
            let stale = record.last_failed_at <= stale_before;
            !(lock_expired || stale)
        });
        Ok((before - self.records.len()) as u64)
    }
}

/// In-memory implementation of the full [`RepositoryProvider`].
#[derive(Default)]
pub struct MemoryRepositoryProvider {
    users: MemoryUserRepository,
    passwords: MemoryPasswordRepository,
    requests: MemoryRequestRepository,
    login_attempts: MemoryLoginAttemptStore,
}

impl MemoryRepositoryProvider {
    pub fn new() -> Self {
        Self::default()
    }
}

impl UserRepositoryProvider for MemoryRepositoryProvider {
    type UserRepo = MemoryUserRepository;

    fn user(&self) -> &Self::UserRepo {
        &self.users
    }
}

impl PasswordRepositoryProvider for MemoryRepositoryProvider {
    type PasswordRepo = MemoryPasswordRepository;

    fn password(&self) -> &Self::PasswordRepo {
        &self.passwords
    }
}

impl RequestRepositoryProvider for MemoryRepositoryProvider {
    type RequestRepo = MemoryRequestRepository;

    fn request(&self) -> &Self::RequestRepo {
        &self.requests
    }
}

impl LoginAttemptStoreProvider for MemoryRepositoryProvider {
    type AttemptStore = MemoryLoginAttemptStore;

    fn login_attempts(&self) -> &Self::AttemptStore {
        &self.login_attempts
    }
}

#[async_trait]
impl RepositoryProvider for MemoryRepositoryProvider {
    async fn migrate(&self) -> Result<(), Error> {
        Ok(())
    }

    async fn health_check(&self) -> Result<(), Error> {
        Ok(())
    }
}
