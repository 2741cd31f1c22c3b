use std::sync::Arc;

use crate::{
    Error,
    error::AuthError,
    repositories::{PasswordRepository, UserRepository},
    services::UserService,
    user::{NewUser, User, UserId},
    validation::validate_password,
};

/// Service for password registration and verification.
///
/// Owns the hashing scheme; callers never see a hash.
pub struct PasswordService<U: UserRepository, P: PasswordRepository> {
    user_service: Arc<UserService<U>>,
    password_repository: Arc<P>,
}

impl<U: UserRepository, P: PasswordRepository> PasswordService<U, P> {
    pub fn new(user_service: Arc<UserService<U>>, password_repository: Arc<P>) -> Self {
        Self {
            user_service,
            password_repository,
        }
    }

    /// Register a new user with a password.
    ///
    /// Password strength is validated before anything is created. A duplicate
    /// email fails with [`AuthError::UserAlreadyExists`].
    pub async fn register(&self, new_user: NewUser, password: &str) -> Result<User, Error> {
        validate_password(password)?;

        let password_hash = Self::hash_password(password);
        let user = self.user_service.create_user(new_user).await?;

        self.password_repository
            .set_password_hash(&user.id, &password_hash)
            .await?;

        Ok(user)
    }

    /// Verify an email/password pair and return the user.
    ///
    /// Any miss — unknown email, no stored hash, or a wrong password — is the
    /// same [`AuthError::InvalidCredentials`], so a caller cannot tell which
    /// accounts exist. Account status is not checked here; that is the login
    /// flow's concern after verification.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<User, Error> {
        let user = self
            .user_service
            .get_user_by_email(email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        let password_hash = self
            .password_repository
            .get_password_hash(&user.id)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !Self::verify_password(password, &password_hash) {
            return Err(AuthError::InvalidCredentials.into());
        }

        Ok(user)
    }

    /// Change a user's password after verifying the current one.
    pub async fn change_password(
        &self,
        user_id: &UserId,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), Error> {
        validate_password(new_password)?;

        let current_hash = self
            .password_repository
            .get_password_hash(user_id)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !Self::verify_password(current_password, &current_hash) {
            return Err(AuthError::InvalidCredentials.into());
        }

        let new_hash = Self::hash_password(new_password);
        self.password_repository
            .set_password_hash(user_id, &new_hash)
            .await
    }

    /// Set a user's password without checking the old one. Admin operation.
    pub async fn set_password(&self, user_id: &UserId, password: &str) -> Result<(), Error> {
        validate_password(password)?;

        let hash = Self::hash_password(password);
        self.password_repository
            .set_password_hash(user_id, &hash)
            .await
    }

    /// Remove a user's password hash.
    pub async fn remove_password(&self, user_id: &UserId) -> Result<(), Error> {
        self.password_repository.remove_password_hash(user_id).await
    }

    /// Hash a password using argon2.
    fn hash_password(password: &str) -> String {
        use password_auth::generate_hash;
        generate_hash(password)
    }

    /// Verify a password against a hash.
    fn verify_password(password: &str, hash: &str) -> bool {
        use password_auth::verify_password;
        verify_password(password, hash).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;
    use crate::repositories::{MemoryPasswordRepository, MemoryUserRepository};

    type TestPasswordService = PasswordService<MemoryUserRepository, MemoryPasswordRepository>;

    fn service() -> TestPasswordService {
        let user_service = Arc::new(UserService::new(Arc::new(MemoryUserRepository::default())));
        PasswordService::new(user_service, Arc::new(MemoryPasswordRepository::default()))
    }

    fn new_user(email: &str) -> NewUser {
        NewUser::builder()
            .name("Test User")
            .email(email)
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_register_rejects_weak_password() {
        let service = service();
        let err = service
            .register(new_user("test@example.com"), "weak")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Validation(ValidationError::InvalidPassword(_))
        ));
    }

    #[tokio::test]
    async fn test_register_and_authenticate() {
        let service = service();
        let user = service
            .register(new_user("test@example.com"), "validpass123")
            .await
            .unwrap();
        assert_eq!(user.email, "test@example.com");

        let authed = service
            .authenticate("test@example.com", "validpass123")
            .await
            .unwrap();
        assert_eq!(authed.id, user.id);
    }

    #[tokio::test]
    async fn test_authenticate_normalizes_email() {
        let service = service();
        service
            .register(new_user("test@example.com"), "validpass123")
            .await
            .unwrap();

        assert!(
            service
                .authenticate(" TEST@Example.com ", "validpass123")
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn test_authenticate_rejects_wrong_password_and_unknown_user() {
        let service = service();
        service
            .register(new_user("test@example.com"), "validpass123")
            .await
            .unwrap();

        let wrong = service
            .authenticate("test@example.com", "wrongpass123")
            .await
            .unwrap_err();
        let unknown = service
            .authenticate("nobody@example.com", "validpass123")
            .await
            .unwrap_err();

        // Same error either way; no account enumeration.
        assert!(matches!(wrong, Error::Auth(AuthError::InvalidCredentials)));
        assert!(matches!(unknown, Error::Auth(AuthError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_change_password_requires_current() {
        let service = service();
        let user = service
            .register(new_user("test@example.com"), "original123")
            .await
            .unwrap();

        let err = service
            .change_password(&user.id, "wrong-current", "replacement123")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Auth(AuthError::InvalidCredentials)));

        service
            .change_password(&user.id, "original123", "replacement123")
            .await
            .unwrap();

        assert!(
            service
                .authenticate("test@example.com", "replacement123")
                .await
                .is_ok()
        );
        assert!(
            service
                .authenticate("test@example.com", "original123")
                .await
                .is_err()
        );
    }
}
