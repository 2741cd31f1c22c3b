//! Help-request status lifecycle.
//!
//! Computes the next persisted `(status, completed_at)` pair for a requested
//! status change. The one contract that matters: `completed_at` is stamped
//! exactly once, on the transition into `completed` from any other status.
//! Re-applying `completed` is idempotent and leaves the original timestamp
//! alone, and moving away from `completed` does not clear it.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::{Error, clock::Clock, request::{HelpRequest, RequestStatus}};

/// The fields to persist after a status change.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusChange {
    pub status: RequestStatus,
    pub completed_at: Option<DateTime<Utc>>,
}

/// Validates requested status transitions and computes completion timestamps.
///
/// A pure, synchronous function over its inputs apart from the injected
/// clock; the persistence layer owns atomic read-modify-write of the stored
/// record.
pub struct RequestLifecycle {
    clock: Arc<dyn Clock>,
}

impl RequestLifecycle {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    /// Apply a raw status string to a request.
    ///
    /// Fails with [`crate::error::ValidationError::InvalidStatus`] if the
    /// string is not one of the four recognized values.
    pub fn apply_status(
        &self,
        current: &HelpRequest,
        requested: &str,
    ) -> Result<StatusChange, Error> {
        let requested: RequestStatus = requested.parse()?;
        Ok(self.apply(current.status, current.completed_at, requested))
    }

    /// Apply an already-parsed status.
    pub fn apply(
        &self,
        current_status: RequestStatus,
        current_completed_at: Option<DateTime<Utc>>,
        requested: RequestStatus,
    ) -> StatusChange {
        let completed_at = if requested == RequestStatus::Completed
            && current_status != RequestStatus::Completed
        {
            Some(self.clock.now())
        } else {
            current_completed_at
        };

        StatusChange {
            status: requested,
            completed_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::request::{NewHelpRequest, RequestId};
    use chrono::Duration;

    fn request_with(status: RequestStatus, completed_at: Option<DateTime<Utc>>) -> HelpRequest {
        let new = NewHelpRequest::builder()
            .id(RequestId::new_random())
            .name("Ana")
            .phone("555-0100")
            .address("12 Elm St")
            .build()
            .unwrap();
        let now = Utc::now();
        HelpRequest {
            id: new.id,
            name: new.name,
            email: new.email,
            phone: new.phone,
            address: new.address,
            notes: new.notes,
            user_id: new.user_id,
            assigned_to: None,
            status,
            created_at: now,
            updated_at: now,
            completed_at,
        }
    }

    fn lifecycle() -> (RequestLifecycle, Arc<FixedClock>) {
        let clock = Arc::new(FixedClock::new(Utc::now()));
        (RequestLifecycle::new(clock.clone()), clock)
    }

    #[test]
    fn test_completing_stamps_now_from_every_other_status() {
        let (lifecycle, clock) = lifecycle();
        let t1 = clock.now();

        for from in [
            RequestStatus::Pending,
            RequestStatus::InProgress,
            RequestStatus::Cancelled,
        ] {
            let request = request_with(from, None);
            let change = lifecycle.apply_status(&request, "completed").unwrap();
            assert_eq!(change.status, RequestStatus::Completed);
            assert_eq!(change.completed_at, Some(t1), "from {from}");
        }
    }

    #[test]
    fn test_reapplying_completed_is_idempotent() {
        let (lifecycle, clock) = lifecycle();

        let request = request_with(RequestStatus::Pending, None);
        let first = lifecycle.apply_status(&request, "completed").unwrap();
        let t1 = first.completed_at.unwrap();

        clock.advance(Duration::minutes(10));

        let request = request_with(first.status, first.completed_at);
        let second = lifecycle.apply_status(&request, "completed").unwrap();

        assert_eq!(second.status, RequestStatus::Completed);
        assert_eq!(second.completed_at, Some(t1));
    }

    #[test]
    fn test_leaving_completed_keeps_timestamp() {
        let (lifecycle, clock) = lifecycle();
        let t1 = clock.now();

        let request = request_with(RequestStatus::Completed, Some(t1));
        clock.advance(Duration::minutes(10));

        let change = lifecycle.apply_status(&request, "in-progress").unwrap();
        assert_eq!(change.status, RequestStatus::InProgress);
        assert_eq!(change.completed_at, Some(t1));
    }

    #[test]
    fn test_recompleting_after_reopen_stamps_fresh() {
        let (lifecycle, clock) = lifecycle();
        let t1 = clock.now();

        // completed at t1, reopened, completed again later: fresh stamp.
        let request = request_with(RequestStatus::InProgress, Some(t1));
        clock.advance(Duration::minutes(10));
        let t2 = clock.now();

        let change = lifecycle.apply_status(&request, "completed").unwrap();
        assert_eq!(change.completed_at, Some(t2));
    }

    #[test]
    fn test_non_completed_transitions_leave_timestamp_untouched() {
        let (lifecycle, _clock) = lifecycle();

        let request = request_with(RequestStatus::Pending, None);
        let change = lifecycle.apply_status(&request, "in-progress").unwrap();
        assert_eq!(change.status, RequestStatus::InProgress);
        assert_eq!(change.completed_at, None);

        let change = lifecycle.apply_status(&request, "cancelled").unwrap();
        assert_eq!(change.status, RequestStatus::Cancelled);
        assert_eq!(change.completed_at, None);
    }

    #[test]
    fn test_invalid_status_is_rejected() {
        let (lifecycle, _clock) = lifecycle();
        let request = request_with(RequestStatus::Pending, None);

        for bad in ["done", "Completed", "in_progress", ""] {
            let err = lifecycle.apply_status(&request, bad).unwrap_err();
            assert!(err.is_validation_error(), "{bad}");
        }
    }
}
