//! # Assignment Record
//!
//! Links one license to one device. An assignment is created active
//! and can be revoked exactly once — revocation is terminal, and a
//! second attempt is rejected with `ALREADY_REVOKED`.
//!
//! Revoked rows are never deleted; they are the historical record the
//! audit trail and duration reporting depend on.

use serde::{Deserialize, Serialize};

use crate::error::{TrackerError, ValidationCode};
use crate::identity::{AssignmentId, DeviceId, LicenseId};
use crate::temporal::Timestamp;

/// A license-to-device assignment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assignment {
    /// Unique identifier.
    pub id: AssignmentId,
    /// The license being consumed.
    pub license_id: LicenseId,
    /// The device holding the seat.
    pub device_id: DeviceId,
    /// When the assignment was made.
    pub assigned_on: Timestamp,
    /// Who made the assignment.
    pub assigned_by: String,
    /// Whether the assignment currently consumes a seat.
    pub active: bool,
    /// When the assignment was revoked.
    pub revoked_on: Option<Timestamp>,
    /// Who revoked it.
    pub revoked_by: Option<String>,
    /// Why it was revoked.
    pub revocation_reason: Option<String>,
}

impl Assignment {
    /// Create a new active assignment.
    pub fn new(
        license_id: LicenseId,
        device_id: DeviceId,
        assigned_by: impl Into<String>,
        assigned_on: Timestamp,
    ) -> Self {
        Self {
            id: AssignmentId::new(),
            license_id,
            device_id,
            assigned_on,
            assigned_by: assigned_by.into(),
            active: true,
            revoked_on: None,
            revoked_by: None,
            revocation_reason: None,
        }
    }

    /// Revoke the assignment (ACTIVE → revoked, terminal).
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationCode::AlreadyRevoked`] validation error if
    /// the assignment is already inactive.
    pub fn revoke(
        &mut self,
        revoked_by: impl Into<String>,
        reason: impl Into<String>,
        at: Timestamp,
    ) -> Result<(), TrackerError> {
        if !self.active {
            return Err(TrackerError::validation(
                ValidationCode::AlreadyRevoked,
                format!("Assignment is already revoked: {}", self.id),
            ));
        }
        self.active = false;
        self.revoked_on = Some(at);
        self.revoked_by = Some(revoked_by.into());
        self.revocation_reason = Some(reason.into());
        Ok(())
    }

    /// Whole calendar days the assignment has been (or was) held.
    ///
    /// For revoked assignments this is fixed at revocation time; for
    /// active ones it runs up to `now`.
    pub fn duration_days(&self, now: Timestamp) -> i64 {
        let end = self.revoked_on.unwrap_or(now);
        end.days_since(self.assigned_on)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(s: &str) -> Timestamp {
        Timestamp::parse(s).unwrap()
    }

    fn make_assignment() -> Assignment {
        Assignment::new(
            LicenseId::new(),
            DeviceId::new(),
            "admin",
            ts("2026-01-01T09:00:00Z"),
        )
    }

    #[test]
    fn new_assignment_is_active() {
        let a = make_assignment();
        assert!(a.active);
        assert!(a.revoked_on.is_none());
        assert!(a.revoked_by.is_none());
        assert!(a.revocation_reason.is_none());
    }

    #[test]
    fn revoke_records_who_when_why() {
        let mut a = make_assignment();
        a.revoke("admin", "Device reassigned", ts("2026-01-15T10:00:00Z"))
            .unwrap();
        assert!(!a.active);
        assert_eq!(a.revoked_by.as_deref(), Some("admin"));
        assert_eq!(a.revocation_reason.as_deref(), Some("Device reassigned"));
        assert_eq!(a.revoked_on, Some(ts("2026-01-15T10:00:00Z")));
    }

    #[test]
    fn revoke_is_terminal() {
        let mut a = make_assignment();
        a.revoke("admin", "first", ts("2026-01-15T10:00:00Z")).unwrap();
        let err = a
            .revoke("admin", "second", ts("2026-01-16T10:00:00Z"))
            .unwrap_err();
        assert_eq!(err.validation_code(), Some(ValidationCode::AlreadyRevoked));
        // First revocation details are untouched.
        assert_eq!(a.revocation_reason.as_deref(), Some("first"));
    }

    #[test]
    fn duration_of_active_assignment_runs_to_now() {
        let a = make_assignment();
        assert_eq!(a.duration_days(ts("2026-01-31T09:00:00Z")), 30);
    }

    #[test]
    fn duration_of_revoked_assignment_is_fixed() {
        let mut a = make_assignment();
        a.revoke("admin", "done", ts("2026-01-15T10:00:00Z")).unwrap();
        assert_eq!(a.duration_days(ts("2026-06-01T00:00:00Z")), 14);
    }
}
