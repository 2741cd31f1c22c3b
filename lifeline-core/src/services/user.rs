use std::sync::Arc;

use crate::{
    Error,
    error::AuthError,
    repositories::UserRepository,
    user::{NewUser, User, UserId, UserRole, UserStatus},
    validation::{validate_email, validate_name, validate_phone},
};

/// Changes an account holder may make to their own profile.
#[derive(Debug, Default, Clone)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

/// Changes an admin may make to any account.
#[derive(Debug, Default, Clone)]
pub struct UserUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub role: Option<UserRole>,
    pub status: Option<UserStatus>,
}

/// Service for user account management.
pub struct UserService<R: UserRepository> {
    repository: Arc<R>,
}

impl<R: UserRepository> UserService<R> {
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Create a new user. The email is validated and stored normalized;
    /// a duplicate email fails with [`AuthError::UserAlreadyExists`].
    pub async fn create_user(&self, new_user: NewUser) -> Result<User, Error> {
        validate_name(&new_user.name)?;
        let email = normalize_email(&new_user.email);
        validate_email(&email)?;
        if let Some(phone) = &new_user.phone {
            validate_phone(phone)?;
        }

        if self.repository.find_by_email(&email).await?.is_some() {
            return Err(AuthError::UserAlreadyExists.into());
        }

        self.repository
            .create(NewUser { email, ..new_user })
            .await
    }

    pub async fn get_user(&self, user_id: &UserId) -> Result<Option<User>, Error> {
        self.repository.find_by_id(user_id).await
    }

    /// Look a user up by raw email; normalization happens here.
    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, Error> {
        self.repository
            .find_by_email(&normalize_email(email))
            .await
    }

    /// Update the caller's own profile fields.
    pub async fn update_profile(
        &self,
        user_id: &UserId,
        update: ProfileUpdate,
    ) -> Result<User, Error> {
        let user = self
            .repository
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        let user = self
            .apply_update(
                user,
                UserUpdate {
                    name: update.name,
                    email: update.email,
                    phone: update.phone,
                    role: None,
                    status: None,
                },
            )
            .await?;

        self.repository.update(&user).await
    }

    /// Update any account, including role and status. Admin operation.
    pub async fn update_user(&self, user_id: &UserId, update: UserUpdate) -> Result<User, Error> {
        let user = self
            .repository
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        let user = self.apply_update(user, update).await?;
        self.repository.update(&user).await
    }

    pub async fn delete_user(&self, user_id: &UserId) -> Result<(), Error> {
        if self.repository.find_by_id(user_id).await?.is_none() {
            return Err(AuthError::UserNotFound.into());
        }
        self.repository.delete(user_id).await
    }

    /// List all users, newest first.
    pub async fn list_users(&self) -> Result<Vec<User>, Error> {
        self.repository.list().await
    }

    /// List all volunteer accounts, newest first.
    pub async fn list_volunteers(&self) -> Result<Vec<User>, Error> {
        self.repository.list_by_role(UserRole::Volunteer).await
    }

    pub async fn count_users(&self) -> Result<u64, Error> {
        self.repository.count().await
    }

    async fn apply_update(&self, mut user: User, update: UserUpdate) -> Result<User, Error> {
        if let Some(name) = update.name {
            validate_name(&name)?;
            user.name = name;
        }

        if let Some(email) = update.email {
            let email = normalize_email(&email);
            validate_email(&email)?;
            if email != user.email {
                // Reject a change onto an address another account owns.
                if let Some(existing) = self.repository.find_by_email(&email).await? {
                    if existing.id != user.id {
                        return Err(AuthError::UserAlreadyExists.into());
                    }
                }
                user.email = email;
            }
        }

        if let Some(phone) = update.phone {
            validate_phone(&phone)?;
            user.phone = Some(phone);
        }

        if let Some(role) = update.role {
            user.role = role;
        }

        if let Some(status) = update.status {
            user.status = status;
        }

        Ok(user)
    }
}

/// Canonical form of an email for storage and lookup: trimmed, lowercased.
pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::MemoryUserRepository;

    fn service() -> UserService<MemoryUserRepository> {
        UserService::new(Arc::new(MemoryUserRepository::default()))
    }

    fn new_user(email: &str) -> NewUser {
        NewUser::builder()
            .name("Test User")
            .email(email)
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_create_user_normalizes_email() {
        let service = service();
        let user = service.create_user(new_user(" Jamie@Example.COM ")).await.unwrap();
        assert_eq!(user.email, "jamie@example.com");

        let found = service
            .get_user_by_email("JAMIE@example.com")
            .await
            .unwrap();
        assert!(found.is_some());
    }

    #[tokio::test]
    async fn test_create_user_rejects_duplicate_email() {
        let service = service();
        service.create_user(new_user("jamie@example.com")).await.unwrap();

        let err = service
            .create_user(new_user("Jamie@Example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Auth(AuthError::UserAlreadyExists)));
    }

    #[tokio::test]
    async fn test_create_user_rejects_bad_email() {
        let service = service();
        let err = service.create_user(new_user("not-an-email")).await.unwrap_err();
        assert!(err.is_validation_error());
    }

    #[tokio::test]
    async fn test_update_profile_checks_email_uniqueness() {
        let service = service();
        let a = service.create_user(new_user("a@example.com")).await.unwrap();
        service.create_user(new_user("b@example.com")).await.unwrap();

        let err = service
            .update_profile(
                &a.id,
                ProfileUpdate {
                    email: Some("b@example.com".to_string()),
                    ..ProfileUpdate::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Auth(AuthError::UserAlreadyExists)));

        // Re-submitting your own address is fine.
        let user = service
            .update_profile(
                &a.id,
                ProfileUpdate {
                    email: Some("A@example.com".to_string()),
                    name: Some("Renamed".to_string()),
                    ..ProfileUpdate::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(user.email, "a@example.com");
        assert_eq!(user.name, "Renamed");
    }

    #[tokio::test]
    async fn test_admin_update_changes_role_and_status() {
        let service = service();
        let user = service.create_user(new_user("v@example.com")).await.unwrap();
        assert_eq!(user.role, UserRole::Volunteer);

        let user = service
            .update_user(
                &user.id,
                UserUpdate {
                    role: Some(UserRole::Admin),
                    status: Some(UserStatus::Inactive),
                    ..UserUpdate::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(user.role, UserRole::Admin);
        assert_eq!(user.status, UserStatus::Inactive);
    }

    #[tokio::test]
    async fn test_delete_missing_user_is_not_found() {
        let service = service();
        let err = service.delete_user(&UserId::new_random()).await.unwrap_err();
        assert!(matches!(err, Error::Auth(AuthError::UserNotFound)));
    }

    #[tokio::test]
    async fn test_list_volunteers_excludes_admins() {
        let service = service();
        let v = service.create_user(new_user("v@example.com")).await.unwrap();
        let a = service.create_user(new_user("a@example.com")).await.unwrap();
        service
            .update_user(
                &a.id,
                UserUpdate {
                    role: Some(UserRole::Admin),
                    ..UserUpdate::default()
                },
            )
            .await
            .unwrap();

        let volunteers = service.list_volunteers().await.unwrap();
        assert_eq!(volunteers.len(), 1);
        assert_eq!(volunteers[0].id, v.id);
        assert_eq!(service.count_users().await.unwrap(), 2);
    }
}
