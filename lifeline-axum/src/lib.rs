//! Ready-to-use Axum routes and middleware for Lifeline.
//!
//! [`create_router`] produces the full `/api` surface of the backend:
//! registration and login (with account lockout), profiles, user
//! administration, help-request CRUD and status updates, and the admin
//! dashboard. Authentication is a `Bearer` JWT; the middleware resolves it to
//! the current user, and the [`extractors`] enforce 401/403 per route.

pub mod error;
pub mod extractors;
pub mod middleware;
pub mod routes;
pub mod types;

pub use error::{ApiError, Result};
pub use extractors::{AdminUser, AuthUser, OptionalAuthUser};
pub use middleware::AppState;
pub use routes::create_router;
