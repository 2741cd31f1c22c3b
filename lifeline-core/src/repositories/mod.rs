//! Repository traits for the data access layer.
//!
//! Services talk to storage exclusively through these traits:
//!
//! - Individual `*Repository` traits define the operations for each data
//!   domain, plus the [`LoginAttemptStore`] key-value contract the lockout
//!   guard uses.
//! - Individual `*RepositoryProvider` traits expose each repository type.
//! - [`RepositoryProvider`] is a supertrait combining all providers plus
//!   lifecycle methods (`migrate`, `health_check`).
//!
//! A storage backend implements the repository traits and the combined
//! provider; everything above it is backend-agnostic.

pub mod adapter;
pub mod login_attempt;
pub mod memory;
pub mod password;
pub mod request;
pub mod user;

pub use adapter::{
    LoginAttemptStoreAdapter, PasswordRepositoryAdapter, RequestRepositoryAdapter,
    UserRepositoryAdapter,
};
pub use login_attempt::{LoginAttemptRecord, LoginAttemptStore};
pub use memory::{
    MemoryLoginAttemptStore, MemoryPasswordRepository, MemoryRepositoryProvider,
    MemoryRequestRepository, MemoryUserRepository,
};
pub use password::PasswordRepository;
pub use request::RequestRepository;
pub use user::UserRepository;

use async_trait::async_trait;

use crate::Error;

/// Provider trait for user repository access.
pub trait UserRepositoryProvider: Send + Sync + 'static {
    type UserRepo: UserRepository;

    fn user(&self) -> &Self::UserRepo;
}

/// Provider trait for password repository access.
pub trait PasswordRepositoryProvider: Send + Sync + 'static {
    type PasswordRepo: PasswordRepository;

    fn password(&self) -> &Self::PasswordRepo;
}

/// Provider trait for help-request repository access.
pub trait RequestRepositoryProvider: Send + Sync + 'static {
    type RequestRepo: RequestRepository;

    fn request(&self) -> &Self::RequestRepo;
}

/// Provider trait for the login-attempt store.
pub trait LoginAttemptStoreProvider: Send + Sync + 'static {
    type AttemptStore: LoginAttemptStore;

    fn login_attempts(&self) -> &Self::AttemptStore;
}

/// Provider trait that storage backends implement to supply all repositories.
///
/// To add a backend: implement each `*Repository` trait, each `*Provider`
/// trait, and this supertrait with `migrate()` and `health_check()`.
#[async_trait]
pub trait RepositoryProvider:
    UserRepositoryProvider
    + PasswordRepositoryProvider
    + RequestRepositoryProvider
    + LoginAttemptStoreProvider
{
    /// Prepare the backing store (create schema, etc.).
    async fn migrate(&self) -> Result<(), Error>;

    /// Check that the backing store is reachable.
    async fn health_check(&self) -> Result<(), Error>;
}
