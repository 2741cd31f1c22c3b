use chrono::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Request error: {0}")]
    Request(#[from] RequestError),
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Account is not active")]
    AccountInactive,

    #[error("Account is temporarily locked")]
    AccountLocked { retry_after: Duration },

    #[error("User not found")]
    UserNotFound,

    #[error("User already exists")]
    UserAlreadyExists,

    #[error("Admin privileges required")]
    PermissionDenied,
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Token expired")]
    Expired,

    #[error("Invalid token: {0}")]
    InvalidToken(String),
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Record not found")]
    NotFound,

    #[error("Constraint violation: {0}")]
    Constraint(String),
}

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Invalid email format: {0}")]
    InvalidEmail(String),

    #[error("Invalid password: {0}")]
    InvalidPassword(String),

    #[error("Invalid name: {0}")]
    InvalidName(String),

    #[error("Invalid phone number: {0}")]
    InvalidPhone(String),

    #[error("Invalid status value: {0}")]
    InvalidStatus(String),

    #[error("Invalid field: {0}")]
    InvalidField(String),

    #[error("Missing required field: {0}")]
    MissingField(String),
}

#[derive(Debug, Error)]
pub enum RequestError {
    #[error("Request not found")]
    NotFound,
}

impl Error {
    pub fn is_auth_error(&self) -> bool {
        matches!(self, Error::Auth(_))
    }

    pub fn is_validation_error(&self) -> bool {
        matches!(self, Error::Validation(_))
    }

    pub fn is_storage_error(&self) -> bool {
        matches!(self, Error::Storage(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Error::Request(RequestError::NotFound)
                | Error::Auth(AuthError::UserNotFound)
                | Error::Storage(StorageError::NotFound)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let auth_error = Error::Auth(AuthError::InvalidCredentials);
        assert_eq!(
            auth_error.to_string(),
            "Authentication error: Invalid credentials"
        );

        let validation_error =
            Error::Validation(ValidationError::InvalidStatus("done".to_string()));
        assert_eq!(
            validation_error.to_string(),
            "Validation error: Invalid status value: done"
        );

        let request_error = Error::Request(RequestError::NotFound);
        assert_eq!(request_error.to_string(), "Request error: Request not found");
    }

    #[test]
    fn test_is_not_found() {
        assert!(Error::Request(RequestError::NotFound).is_not_found());
        assert!(Error::Auth(AuthError::UserNotFound).is_not_found());
        assert!(!Error::Auth(AuthError::InvalidCredentials).is_not_found());
    }

    #[test]
    fn test_error_from_conversions() {
        let error: Error = AuthError::AccountInactive.into();
        assert!(matches!(error, Error::Auth(AuthError::AccountInactive)));

        let error: Error = ValidationError::MissingField("name".to_string()).into();
        assert!(error.is_validation_error());
    }
}
