//! # Lifeline
//!
//! Lifeline is a small community-aid coordination backend: people submit help
//! requests (name, contact, location), volunteers and admins triage them
//! through a status lifecycle, and an admin dashboard aggregates counts.
//!
//! This crate is the facade. It wires the `lifeline-core` services together
//! over a pluggable [`RepositoryProvider`] and exposes the operations the
//! HTTP layer (and the tests) call:
//!
//! - registration and login, with per-account lockout enforced **before**
//!   credential verification;
//! - profile and user administration;
//! - help-request CRUD with lifecycle-governed status changes;
//! - the admin dashboard summary.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use lifeline::Lifeline;
//! use lifeline_core::{JwtConfig, repositories::MemoryRepositoryProvider};
//!
//! # async fn run() -> Result<(), lifeline_core::Error> {
//! let repositories = Arc::new(MemoryRepositoryProvider::new());
//! let lifeline = Lifeline::new(repositories, JwtConfig::new(b"secret".to_vec()))?;
//!
//! let registered = lifeline
//!     .register("Ana", "ana@example.com", "a-strong-password", None)
//!     .await?;
//! let session = lifeline.login("ana@example.com", "a-strong-password").await?;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use serde::Serialize;

use lifeline_core::{
    SessionService,
    clock::{Clock, SystemClock},
    error::AuthError,
    repositories::{
        LoginAttemptStoreAdapter, PasswordRepositoryAdapter, RepositoryProvider,
        RequestRepositoryAdapter, UserRepositoryAdapter,
    },
    services::{
        LockState, LockoutConfig, LoginGuardService, PasswordService, ProfileUpdate,
        RequestCounts, RequestService, RequestUpdate, UserService, UserUpdate,
    },
};

/// Re-export core types from lifeline_core.
///
/// These types are commonly used when working with the Lifeline API.
pub use lifeline_core::{
    Claims, Error, HelpRequest, JwtConfig, NewHelpRequest, NewUser, RequestId, RequestStatus,
    User, UserId, UserRole, UserStatus,
};

#[cfg(feature = "sqlite")]
pub use lifeline_storage_sqlite::SqliteRepositoryProvider;

/// A successful registration or login: the user plus a bearer token.
#[derive(Debug, Clone, Serialize)]
pub struct LoginSuccess {
    pub user: User,
    pub token: String,
}

/// Aggregated counts for the admin dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSummary {
    pub users: u64,
    pub requests: RequestCounts,
}

/// The central coordinator for the Lifeline backend.
///
/// Generic over a [`RepositoryProvider`] so the same logic runs against the
/// in-memory backend (tests, single-process deployments) or SQLite.
pub struct Lifeline<R: RepositoryProvider> {
    repositories: Arc<R>,
    users: Arc<UserService<UserRepositoryAdapter<R>>>,
    passwords: Arc<PasswordService<UserRepositoryAdapter<R>, PasswordRepositoryAdapter<R>>>,
    requests: Arc<RequestService<RequestRepositoryAdapter<R>>>,
    login_guard: Arc<LoginGuardService<LoginAttemptStoreAdapter<R>>>,
    sessions: SessionService,
}

impl<R: RepositoryProvider> Lifeline<R> {
    /// Create a Lifeline instance with default lockout settings and the
    /// system clock.
    pub fn new(repositories: Arc<R>, jwt_config: JwtConfig) -> Result<Self, Error> {
        Self::with_options(
            repositories,
            jwt_config,
            LockoutConfig::default(),
            Arc::new(SystemClock),
        )
    }

    /// Create a Lifeline instance with explicit lockout settings and clock.
    ///
    /// Fails if the lockout configuration is invalid (for instance a
    /// `failure_retention` shorter than `lockout_duration`).
    pub fn with_options(
        repositories: Arc<R>,
        jwt_config: JwtConfig,
        lockout: LockoutConfig,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, Error> {
        let user_repo = Arc::new(UserRepositoryAdapter::new(repositories.clone()));
        let password_repo = Arc::new(PasswordRepositoryAdapter::new(repositories.clone()));
        let request_repo = Arc::new(RequestRepositoryAdapter::new(repositories.clone()));
        let attempt_store = Arc::new(LoginAttemptStoreAdapter::new(repositories.clone()));

        let users = Arc::new(UserService::new(user_repo));
        let passwords = Arc::new(PasswordService::new(users.clone(), password_repo));
        let requests = Arc::new(RequestService::new(request_repo, clock.clone()));
        let login_guard = Arc::new(LoginGuardService::new(attempt_store, lockout, clock)?);

        Ok(Self {
            repositories,
            users,
            passwords,
            requests,
            login_guard,
            sessions: SessionService::new(jwt_config),
        })
    }

    /// Prepare the backing store.
    pub async fn migrate(&self) -> Result<(), Error> {
        self.repositories.migrate().await
    }

    /// Check that the backing store is reachable.
    pub async fn health_check(&self) -> Result<(), Error> {
        self.repositories.health_check().await
    }

    // ------------------------------------------------------------------
    // Authentication
    // ------------------------------------------------------------------

    /// Register a new volunteer account and log it in.
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
        phone: Option<String>,
    ) -> Result<LoginSuccess, Error> {
        let new_user = NewUser::builder()
            .name(name)
            .email(email)
            .phone(phone)
            .build()?;

        let user = self.passwords.register(new_user, password).await?;
        let token = self.sessions.issue(&user)?;

        tracing::info!(user = %user.id, "user registered");

        Ok(LoginSuccess { user, token })
    }

    /// Authenticate an email/password pair and issue a session token.
    ///
    /// The lockout guard is consulted first: a locked account is rejected
    /// with [`AuthError::AccountLocked`] before any credential verification
    /// happens. After verification, exactly one of `record_failure` or
    /// `record_success` is invoked with the same raw key.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginSuccess, Error> {
        let lock = self.login_guard.check_lock(email).await?;
        if let LockState {
            locked: true,
            retry_after: Some(retry_after),
        } = lock
        {
            return Err(AuthError::AccountLocked { retry_after }.into());
        }

        match self.passwords.authenticate(email, password).await {
            Ok(user) => {
                self.login_guard.record_success(email).await?;

                if !user.is_active() {
                    return Err(AuthError::AccountInactive.into());
                }

                let token = self.sessions.issue(&user)?;
                Ok(LoginSuccess { user, token })
            }
            Err(Error::Auth(AuthError::InvalidCredentials)) => {
                let state = self.login_guard.record_failure(email).await?;
                // If this very failure armed the lock, answer with the
                // lockout instead of a plain credential error.
                if let Some(retry_after) = state.retry_after {
                    return Err(AuthError::AccountLocked { retry_after }.into());
                }
                Err(AuthError::InvalidCredentials.into())
            }
            Err(e) => Err(e),
        }
    }

    /// Verify a session token and return its claims.
    pub fn verify_token(&self, token: &str) -> Result<Claims, Error> {
        self.sessions.verify(token)
    }

    /// Resolve a session token to the current user record.
    pub async fn current_user(&self, token: &str) -> Result<User, Error> {
        let claims = self.sessions.verify(token)?;
        self.users
            .get_user(&UserId::new(&claims.sub))
            .await?
            .ok_or(AuthError::UserNotFound.into())
    }

    // ------------------------------------------------------------------
    // Users
    // ------------------------------------------------------------------

    pub async fn get_user(&self, user_id: &UserId) -> Result<Option<User>, Error> {
        self.users.get_user(user_id).await
    }

    pub async fn update_profile(
        &self,
        user_id: &UserId,
        update: ProfileUpdate,
    ) -> Result<User, Error> {
        self.users.update_profile(user_id, update).await
    }

    pub async fn change_password(
        &self,
        user_id: &UserId,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), Error> {
        self.passwords
            .change_password(user_id, current_password, new_password)
            .await
    }

    /// List all users, newest first. Admin operation.
    pub async fn list_users(&self) -> Result<Vec<User>, Error> {
        self.users.list_users().await
    }

    /// List all volunteers, newest first. Admin operation.
    pub async fn list_volunteers(&self) -> Result<Vec<User>, Error> {
        self.users.list_volunteers().await
    }

    /// Update any account, including role and status. Admin operation.
    pub async fn update_user(&self, user_id: &UserId, update: UserUpdate) -> Result<User, Error> {
        self.users.update_user(user_id, update).await
    }

    /// Delete an account. Admin operation.
    pub async fn delete_user(&self, user_id: &UserId) -> Result<(), Error> {
        self.passwords.remove_password(user_id).await?;
        self.users.delete_user(user_id).await
    }

    /// Create or update the admin account used to bootstrap a deployment.
    pub async fn ensure_admin(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<User, Error> {
        let user = match self.users.get_user_by_email(email).await? {
            Some(existing) => {
                self.users
                    .update_user(
                        &existing.id,
                        UserUpdate {
                            name: Some(name.to_string()),
                            role: Some(UserRole::Admin),
                            status: Some(UserStatus::Active),
                            ..UserUpdate::default()
                        },
                    )
                    .await?
            }
            None => {
                let new_user = NewUser::builder()
                    .name(name)
                    .email(email)
                    .role(UserRole::Admin)
                    .build()?;
                self.users.create_user(new_user).await?
            }
        };

        self.passwords.set_password(&user.id, password).await?;

        tracing::info!(user = %user.id, "admin account ready");

        Ok(user)
    }

    // ------------------------------------------------------------------
    // Help requests
    // ------------------------------------------------------------------

    pub async fn create_request(&self, new_request: NewHelpRequest) -> Result<HelpRequest, Error> {
        self.requests.create_request(new_request).await
    }

    pub async fn get_request(&self, id: &RequestId) -> Result<Option<HelpRequest>, Error> {
        self.requests.get_request(id).await
    }

    /// List all requests, newest first. Admin operation.
    pub async fn list_requests(&self) -> Result<Vec<HelpRequest>, Error> {
        self.requests.list_requests().await
    }

    pub async fn list_requests_by_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<HelpRequest>, Error> {
        self.requests.list_requests_by_user(user_id).await
    }

    /// Update a request's editable fields. Admin operation.
    pub async fn update_request(
        &self,
        id: &RequestId,
        update: RequestUpdate,
    ) -> Result<HelpRequest, Error> {
        self.requests.update_request(id, update).await
    }

    /// Update only a request's status. The simplified volunteer flow.
    pub async fn update_request_status(
        &self,
        id: &RequestId,
        status: &str,
    ) -> Result<HelpRequest, Error> {
        self.requests.update_status(id, status).await
    }

    /// Delete a request. Admin operation.
    pub async fn delete_request(&self, id: &RequestId) -> Result<(), Error> {
        self.requests.delete_request(id).await
    }

    // ------------------------------------------------------------------
    // Dashboard
    // ------------------------------------------------------------------

    /// Aggregate the counts shown on the admin dashboard.
    pub async fn dashboard(&self) -> Result<DashboardSummary, Error> {
        let (users, requests) =
            tokio::try_join!(self.users.count_users(), self.requests.counts())?;

        Ok(DashboardSummary { users, requests })
    }
}
