use axum::{
    Json,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use lifeline_core::error::{AuthError, Error, RequestError, SessionError, StorageError};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Access denied: {0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Too many failed login attempts")]
    Locked { retry_after_minutes: i64 },

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        match err {
            Error::Auth(AuthError::AccountLocked { retry_after }) => {
                let seconds = retry_after.num_seconds().max(0);
                ApiError::Locked {
                    retry_after_minutes: ((seconds + 59) / 60).max(1),
                }
            }
            Error::Auth(AuthError::InvalidCredentials) => ApiError::Unauthorized,
            Error::Auth(AuthError::AccountInactive) => ApiError::Forbidden(
                "Account is not active. Please contact an administrator.".to_string(),
            ),
            Error::Auth(AuthError::PermissionDenied) => {
                ApiError::Forbidden("Admin privileges required".to_string())
            }
            Error::Auth(AuthError::UserNotFound) => {
                ApiError::NotFound("User not found".to_string())
            }
            Error::Auth(AuthError::UserAlreadyExists) => {
                ApiError::Conflict("User already exists with this email".to_string())
            }
            Error::Request(RequestError::NotFound) => {
                ApiError::NotFound("Request not found".to_string())
            }
            Error::Session(SessionError::Expired) => ApiError::Unauthorized,
            Error::Session(SessionError::InvalidToken(_)) => ApiError::Unauthorized,
            Error::Validation(e) => ApiError::BadRequest(e.to_string()),
            Error::Storage(StorageError::NotFound) => {
                ApiError::NotFound("Record not found".to_string())
            }
            Error::Storage(StorageError::Constraint(_)) => {
                ApiError::Conflict("User already exists with this email".to_string())
            }
            Error::Storage(e) => {
                // Log the detail, return a generic body.
                tracing::error!(error = %e, "storage failure");
                ApiError::Internal("Something went wrong".to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            ApiError::Locked {
                retry_after_minutes,
            } => {
                let body = Json(json!({
                    "error": format!(
                        "Too many failed login attempts. Try again in {retry_after_minutes} minute(s)."
                    ),
                    "code": StatusCode::TOO_MANY_REQUESTS.as_u16(),
                }));
                return (
                    StatusCode::TOO_MANY_REQUESTS,
                    [(header::RETRY_AFTER, (retry_after_minutes * 60).to_string())],
                    body,
                )
                    .into_response();
            }
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(json!({
            "error": error_message,
            "code": status.as_u16()
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_account_locked_maps_to_429_with_minutes() {
        let err: ApiError =
            Error::Auth(AuthError::AccountLocked {
                retry_after: Duration::seconds(601),
            })
            .into();

        match err {
            ApiError::Locked {
                retry_after_minutes,
            } => assert_eq!(retry_after_minutes, 11),
            other => panic!("expected Locked, got {other:?}"),
        }
    }

    #[test]
    fn test_locked_minutes_round_up_to_at_least_one() {
        let err: ApiError = Error::Auth(AuthError::AccountLocked {
            retry_after: Duration::seconds(5),
        })
        .into();

        match err {
            ApiError::Locked {
                retry_after_minutes,
            } => assert_eq!(retry_after_minutes, 1),
            other => panic!("expected Locked, got {other:?}"),
        }
    }

    #[test]
    fn test_invalid_status_maps_to_bad_request() {
        use lifeline_core::error::ValidationError;
        let err: ApiError =
            Error::Validation(ValidationError::InvalidStatus("done".to_string())).into();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }
}
