//! Service layer for business logic.
//!
//! Services encapsulate the rules; repositories only move data. The two
//! stateful cores are [`LoginGuardService`] (account lockout) and
//! [`RequestLifecycle`] (status transitions).

pub mod lifecycle;
pub mod login_guard;
pub mod password;
pub mod request;
pub mod user;

pub use lifecycle::{RequestLifecycle, StatusChange};
pub use login_guard::{AttemptState, LockState, LockoutConfig, LoginGuardService};
pub use password::PasswordService;
pub use request::{RequestCounts, RequestService, RequestUpdate};
pub use user::{ProfileUpdate, UserService, UserUpdate, normalize_email};
