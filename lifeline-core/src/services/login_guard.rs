//! Account-based login lockout.
//!
//! Tracks failed authentication attempts per normalized account key (trimmed,
//! lowercased email) and decides whether a login attempt must be rejected
//! before credential verification happens at all.
//!
//! # Caller contract
//!
//! 1. Call [`LoginGuardService::check_lock`] before verifying credentials; a
//!    locked result means the attempt must be rejected immediately.
//! 2. After the verification outcome is known, call exactly one of
//!    [`LoginGuardService::record_failure`] or
//!    [`LoginGuardService::record_success`], with the same raw key.
//!
//! Expired and stale records are purged opportunistically on every operation,
//! so no background sweep task is needed for correctness. Locking is
//! per-account, not per-IP: the threat model is credential stuffing against a
//! known email, not generic brute force.
//!
//! # Example
//!
//! ```rust,ignore
//! use lifeline_core::services::{LoginGuardService, LockoutConfig};
//!
//! let guard = LoginGuardService::new(store, LockoutConfig::default(), clock)?;
//!
//! let state = guard.check_lock("User@Example.com ").await?;
//! if state.locked {
//!     // Reject with a retry estimate before touching the password.
//! }
//! ```

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::Mutex;

use crate::{
    Error,
    clock::Clock,
    error::ValidationError,
    repositories::{LoginAttemptRecord, LoginAttemptStore},
};

/// Configuration for the lockout guard.
#[derive(Debug, Clone)]
pub struct LockoutConfig {
    /// Failures that trigger a lockout. Default 5.
    pub max_failed_attempts: u32,
    /// How long an account stays locked. Default 15 minutes.
    pub lockout_duration: Duration,
    /// How long an unlocked failure record is kept. Default 60 minutes.
    ///
    /// Must be at least `lockout_duration`: a shorter retention would let the
    /// purge remove a still-locked record and silently unlock the account.
    pub failure_retention: Duration,
}

impl Default for LockoutConfig {
    fn default() -> Self {
        Self {
            max_failed_attempts: 5,
            lockout_duration: Duration::minutes(15),
            failure_retention: Duration::minutes(60),
        }
    }
}

impl LockoutConfig {
    /// Check the configuration invariants.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.max_failed_attempts == 0 {
            return Err(ValidationError::InvalidField(
                "max_failed_attempts must be positive".to_string(),
            ));
        }
        if self.lockout_duration <= Duration::zero() {
            return Err(ValidationError::InvalidField(
                "lockout_duration must be positive".to_string(),
            ));
        }
        if self.failure_retention < self.lockout_duration {
            return Err(ValidationError::InvalidField(
                "failure_retention must be at least lockout_duration".to_string(),
            ));
        }
        Ok(())
    }
}

/// Result of a lock check.
#[derive(Debug, Clone, PartialEq)]
pub struct LockState {
    pub locked: bool,
    /// Time until the lock expires, present only when locked.
    pub retry_after: Option<Duration>,
}

impl LockState {
    pub fn unlocked() -> Self {
        Self {
            locked: false,
            retry_after: None,
        }
    }

    /// Retry estimate rounded up to whole minutes, for user-facing messages.
    pub fn retry_after_minutes(&self) -> Option<i64> {
        self.retry_after.map(minutes_rounded_up)
    }
}

/// Result of recording a failed attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct AttemptState {
    /// Failures recorded for this key, including the one just recorded.
    pub failure_count: u32,
    /// Present when the account is locked.
    pub locked_until: Option<DateTime<Utc>>,
    /// Time until the lock expires, present only when locked.
    pub retry_after: Option<Duration>,
}

impl AttemptState {
    pub fn is_locked(&self) -> bool {
        self.retry_after.is_some()
    }

    /// Retry estimate rounded up to whole minutes, for user-facing messages.
    pub fn retry_after_minutes(&self) -> Option<i64> {
        self.retry_after.map(minutes_rounded_up)
    }
}

fn minutes_rounded_up(duration: Duration) -> i64 {
    let seconds = duration.num_seconds().max(0);
    ((seconds + 59) / 60).max(1)
}

/// Per-account failed-login tracking and lockout decisions.
///
/// State lives in an injected [`LoginAttemptStore`]; time comes from an
/// injected [`Clock`]. A single internal mutex serializes read-modify-write
/// sequences — contention is low and every operation is O(1) against the
/// store, so one coarse lock is enough.
pub struct LoginGuardService<S: LoginAttemptStore> {
    store: Arc<S>,
    config: LockoutConfig,
    clock: Arc<dyn Clock>,
    mutation: Mutex<()>,
}

impl<S: LoginAttemptStore> LoginGuardService<S> {
    /// Create a guard, validating the configuration.
    pub fn new(store: Arc<S>, config: LockoutConfig, clock: Arc<dyn Clock>) -> Result<Self, Error> {
        config.validate()?;
        Ok(Self {
            store,
            config,
            clock,
            mutation: Mutex::new(()),
        })
    }

    pub fn config(&self) -> &LockoutConfig {
        &self.config
    }

    /// Normalize a raw account key: trim whitespace, lowercase.
    pub fn normalize_key(raw: &str) -> String {
        raw.trim().to_lowercase()
    }

    /// Whether a login attempt for this account must be rejected right now.
    ///
    /// Purges expired and stale records as a side effect, then looks the key
    /// up. Never fails for domain reasons; a locked outcome is an ordinary
    /// result value.
    pub async fn check_lock(&self, account_key: &str) -> Result<LockState, Error> {
        let key = Self::normalize_key(account_key);
        let _guard = self.mutation.lock().await;
        let now = self.clock.now();
        self.purge(now).await?;

        let Some(record) = self.store.find(&key).await? else {
            return Ok(LockState::unlocked());
        };

        match record.locked_until {
            Some(until) if until > now => Ok(LockState {
                locked: true,
                retry_after: Some(until - now),
            }),
            _ => Ok(LockState::unlocked()),
        }
    }

    /// Record a failed authentication attempt for this account.
    ///
    /// Creates the record on the first failure, increments it afterwards, and
    /// arms the lock when the count reaches the threshold. A lock that
    /// already expired is not reinstated unless the threshold is crossed
    /// again, and an active lock is never extended by further failures.
    ///
    /// Returns the resulting state so the caller can answer with a
    /// 429-style response and a human-readable retry estimate when this very
    /// failure triggered the lock.
    pub async fn record_failure(&self, account_key: &str) -> Result<AttemptState, Error> {
        let key = Self::normalize_key(account_key);
        let _guard = self.mutation.lock().await;
        let now = self.clock.now();
        self.purge(now).await?;

        let mut record = match self.store.find(&key).await? {
            Some(mut existing) => {
                existing.failure_count += 1;
                existing
            }
            None => LoginAttemptRecord {
                key: key.clone(),
                failure_count: 1,
                locked_until: None,
                created_at: now,
                last_failed_at: now,
            },
        };
        record.last_failed_at = now;

        if !record.is_locked_at(now) {
            record.locked_until = if record.failure_count >= self.config.max_failed_attempts {
                Some(now + self.config.lockout_duration)
            } else {
                None
            };

            if record.locked_until.is_some() {
                tracing::warn!(
                    account = %record.key,
                    failures = record.failure_count,
                    "account locked after repeated failed logins"
                );
            }
        }

        self.store.save(&record).await?;

        let retry_after = record
            .locked_until
            .filter(|until| *until > now)
            .map(|until| until - now);

        Ok(AttemptState {
            failure_count: record.failure_count,
            locked_until: record.locked_until,
            retry_after,
        })
    }

    /// Clear all failure state for this account after a successful login.
    ///
    /// No-op if there is nothing to clear.
    pub async fn record_success(&self, account_key: &str) -> Result<(), Error> {
        let key = Self::normalize_key(account_key);
        let _guard = self.mutation.lock().await;
        self.store.delete(&key).await?;
        Ok(())
    }

    async fn purge(&self, now: DateTime<Utc>) -> Result<(), Error> {
        let stale_before = now - self.config.failure_retention;
        let purged = self.store.purge_expired(now, stale_before).await?;
        if purged > 0 {
            tracing::debug!(count = purged, "purged expired login attempt records");
        }
        Ok(())
    }
}
