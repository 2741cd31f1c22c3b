//! Help requests.
//!
//! A help request is the central record of the system: someone asks for aid,
//! giving a name, contact details, and a location; volunteers and admins move
//! it through a status lifecycle until it is completed or cancelled.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    error::ValidationError,
    id::{generate_prefixed_id, validate_prefixed_id},
    user::UserId,
};

/// A unique, stable identifier for a help request (`req_…`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct RequestId(String);

impl RequestId {
    pub fn new(id: &str) -> Self {
        RequestId(id.to_string())
    }

    pub fn new_random() -> Self {
        RequestId(generate_prefixed_id("req"))
    }

    pub fn into_inner(self) -> String {
        self.0
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_valid(&self) -> bool {
        validate_prefixed_id(&self.0, "req")
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new_random()
    }
}

impl From<String> for RequestId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for RequestId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle status of a help request.
///
/// Serialized in kebab-case (`in-progress`) to match the public API. Parsing
/// an unrecognized value is a caller error, surfaced as
/// [`ValidationError::InvalidStatus`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RequestStatus {
    Pending,
    InProgress,
    Completed,
    Cancelled,
}

impl RequestStatus {
    /// All recognized statuses, in lifecycle order.
    pub const ALL: [RequestStatus; 4] = [
        RequestStatus::Pending,
        RequestStatus::InProgress,
        RequestStatus::Completed,
        RequestStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::InProgress => "in-progress",
            RequestStatus::Completed => "completed",
            RequestStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RequestStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(RequestStatus::Pending),
            "in-progress" => Ok(RequestStatus::InProgress),
            "completed" => Ok(RequestStatus::Completed),
            "cancelled" => Ok(RequestStatus::Cancelled),
            other => Err(ValidationError::InvalidStatus(other.to_string())),
        }
    }
}

/// A request for aid.
///
/// `completed_at` records the first instant the request reached `completed`.
/// It is stamped once on the transition into `completed` and is deliberately
/// preserved if the request later moves back to an earlier status, so the
/// record keeps evidence that work was finished at some point.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HelpRequest {
    pub id: RequestId,
    pub name: String,
    pub email: Option<String>,
    pub phone: String,
    pub address: String,
    pub notes: Option<String>,
    pub user_id: Option<UserId>,
    pub assigned_to: Option<UserId>,
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// Fields for creating a help request.
///
/// Name, phone, and address are required: without a way to reach the person
/// and a place to go, a request cannot be acted on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewHelpRequest {
    pub id: RequestId,
    pub name: String,
    pub email: Option<String>,
    pub phone: String,
    pub address: String,
    pub notes: Option<String>,
    pub user_id: Option<UserId>,
}

impl NewHelpRequest {
    pub fn builder() -> NewHelpRequestBuilder {
        NewHelpRequestBuilder::default()
    }
}

#[derive(Default)]
pub struct NewHelpRequestBuilder {
    id: Option<RequestId>,
    name: Option<String>,
    email: Option<String>,
    phone: Option<String>,
    address: Option<String>,
    notes: Option<String>,
    user_id: Option<UserId>,
}

impl NewHelpRequestBuilder {
    pub fn id(mut self, id: RequestId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn email(mut self, email: Option<String>) -> Self {
        self.email = email;
        self
    }

    pub fn phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    pub fn address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    pub fn notes(mut self, notes: Option<String>) -> Self {
        self.notes = notes;
        self
    }

    pub fn user_id(mut self, user_id: Option<UserId>) -> Self {
        self.user_id = user_id;
        self
    }

    pub fn build(self) -> Result<NewHelpRequest, Error> {
        Ok(NewHelpRequest {
            id: self.id.unwrap_or_default(),
            name: self
                .name
                .ok_or(ValidationError::MissingField("Name is required".to_string()))?,
            email: self.email,
            phone: self.phone.ok_or(ValidationError::MissingField(
                "Phone number is required".to_string(),
            ))?,
            address: self.address.ok_or(ValidationError::MissingField(
                "Address is required".to_string(),
            ))?,
            notes: self.notes,
            user_id: self.user_id,
        })
    }
}
