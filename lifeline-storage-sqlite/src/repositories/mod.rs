//! SQLite implementations of the `lifeline-core` repository traits.

pub mod login_attempt;
pub mod password;
pub mod request;
pub mod user;

pub use login_attempt::SqliteLoginAttemptStore;
pub use password::SqlitePasswordRepository;
pub use request::SqliteRequestRepository;
pub use user::SqliteUserRepository;
