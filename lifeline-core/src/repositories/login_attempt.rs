//! Store contract for login-attempt tracking.
//!
//! The lockout guard keeps one record per normalized account key. The store
//! is a narrow key-value contract so the default in-memory map can be swapped
//! for a shared external counter store without touching the guard's logic.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::Error;

/// Failure bookkeeping for one account key.
///
/// A record exists only while there are failures to remember: it is created
/// on the first recorded failure, mutated on each subsequent one, and deleted
/// on success or purge. `locked_until` is present only when the failure count
/// crossed the configured threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginAttemptRecord {
    /// Normalized account key (trimmed, lowercased email).
    pub key: String,
    /// Failures since the record was created.
    pub failure_count: u32,
    /// When present and in the future, the account is locked.
    pub locked_until: Option<DateTime<Utc>>,
    /// Instant the record was first created.
    pub created_at: DateTime<Utc>,
    /// Instant of the most recent failure.
    pub last_failed_at: DateTime<Utc>,
}

impl LoginAttemptRecord {
    /// Whether the lock is active at `now`.
    pub fn is_locked_at(&self, now: DateTime<Utc>) -> bool {
        self.locked_until.is_some_and(|until| until > now)
    }

    /// Whether the record should be purged at `now`: its lock has expired, or
    /// its last failure is older than the retention window.
    pub fn is_purgeable_at(&self, now: DateTime<Utc>, retention: Duration) -> bool {
        let lock_expired = self.locked_until.is_some_and(|until| until <= now);
        let stale = self.last_failed_at + retention <= now;
        lock_expired || stale
    }
}

/// Key-value store for [`LoginAttemptRecord`]s.
///
/// Implementations must make each individual operation atomic; the guard
/// serializes whole read-modify-write sequences itself.
#[async_trait]
pub trait LoginAttemptStore: Send + Sync + 'static {
    /// Look up the record for a normalized key.
    async fn find(&self, key: &str) -> Result<Option<LoginAttemptRecord>, Error>;

    /// Insert or replace the record for its key.
    async fn save(&self, record: &LoginAttemptRecord) -> Result<(), Error>;

    /// Delete the record for a key. Returns whether a record existed.
    async fn delete(&self, key: &str) -> Result<bool, Error>;

    /// Remove every record whose lock has expired at `now` or whose last
    /// failure is before `stale_before`. Returns the number removed.
    async fn purge_expired(
        &self,
        now: DateTime<Utc>,
        stale_before: DateTime<Utc>,
    ) -> Result<u64, Error>;
}
