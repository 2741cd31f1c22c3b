use async_trait::async_trait;

use crate::{
    Error,
    user::{NewUser, User, UserId, UserRole},
};

/// Repository for user account data.
///
/// Emails passed to `find_by_email` are expected to be already normalized
/// (trimmed, lowercased) by the service layer; repositories compare exactly.
#[async_trait]
pub trait UserRepository: Send + Sync + 'static {
    /// Create a new user. Fails with a constraint error if the email is taken.
    async fn create(&self, user: NewUser) -> Result<User, Error>;

    /// Find a user by id.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, Error>;

    /// Find a user by normalized email.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, Error>;

    /// Update an existing user.
    async fn update(&self, user: &User) -> Result<User, Error>;

    /// Delete a user by id.
    async fn delete(&self, id: &UserId) -> Result<(), Error>;

    /// List all users, newest first.
    async fn list(&self) -> Result<Vec<User>, Error>;

    /// List users with the given role, newest first.
    async fn list_by_role(&self, role: UserRole) -> Result<Vec<User>, Error>;

    /// Count all users.
    async fn count(&self) -> Result<u64, Error>;
}
