//! # ltk-store — Entity Store Ports
//!
//! Repository traits the engines depend on, one per entity, plus the
//! [`EntityStore`] supertrait that bundles them. Backends implement
//! these traits; the crate ships [`InMemoryStore`] as the reference
//! backend and the fixture used throughout the test suites.
//!
//! ## Atomic Commits
//!
//! Assignment creation and revocation mutate two records together (the
//! assignment row and the license's denormalized usage counter) and
//! must re-check their invariants at write time — the engine's
//! read-then-validate sequence alone would race with concurrent
//! commits. [`AssignmentRepository::commit_assignment`] and
//! [`AssignmentRepository::commit_revocation`] therefore perform the
//! final validation and the counter update under one lock, recomputing
//! usage from the live count of active assignments rather than
//! trusting the stored counter.

use chrono::NaiveDate;
use thiserror::Error;

use ltk_core::{
    Alert, AlertId, AlertType, Assignment, AssignmentId, Device, DeviceId, License, LicenseId,
    SoftwareVersion, Timestamp, TrackerError, ValidationCode, VersionStatus,
};

mod memory;

pub use memory::InMemoryStore;

// ─── Errors ──────────────────────────────────────────────────────────

/// Errors surfaced by entity store backends.
#[derive(Error, Debug)]
pub enum StoreError {
    /// No license with the given id.
    #[error("license not found: {0}")]
    MissingLicense(String),

    /// No device with the given id.
    #[error("device not found: {0}")]
    MissingDevice(String),

    /// No assignment with the given id.
    #[error("assignment not found: {0}")]
    MissingAssignment(String),

    /// No alert with the given id.
    #[error("alert not found: {0}")]
    MissingAlert(String),

    /// Commit-time capacity check failed.
    #[error("license at capacity: {current}/{max}")]
    CapacityExceeded {
        /// Active assignments at commit time.
        current: u32,
        /// Seats the license grants.
        max: u32,
    },

    /// An active assignment already exists for the (device, license) pair.
    #[error("license is already assigned to this device")]
    AssignmentExists,

    /// The assignment was already revoked.
    #[error("assignment is already revoked: {0}")]
    AlreadyRevoked(String),

    /// Backend infrastructure failure.
    #[error("backend failure: {0}")]
    Backend(String),
}

impl From<StoreError> for TrackerError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::MissingLicense(id) => {
                TrackerError::not_found(ltk_core::EntityType::License, id)
            }
            StoreError::MissingDevice(id) => {
                TrackerError::not_found(ltk_core::EntityType::Device, id)
            }
            StoreError::MissingAssignment(id) => {
                TrackerError::not_found(ltk_core::EntityType::Assignment, id)
            }
            StoreError::MissingAlert(id) => {
                TrackerError::not_found(ltk_core::EntityType::Alert, id)
            }
            StoreError::CapacityExceeded { current, max } => TrackerError::validation(
                ValidationCode::CapacityExceeded,
                capacity_exceeded_message(current, max),
            ),
            StoreError::AssignmentExists => TrackerError::validation(
                ValidationCode::AlreadyAssigned,
                "License is already assigned to this device",
            ),
            StoreError::AlreadyRevoked(id) => TrackerError::validation(
                ValidationCode::AlreadyRevoked,
                format!("Assignment is already revoked: {id}"),
            ),
            StoreError::Backend(msg) => TrackerError::Store(msg),
        }
    }
}

/// The operator-facing message for a capacity rejection.
pub fn capacity_exceeded_message(current: u32, max: u32) -> String {
    format!(
        "License usage limit reached. Current usage: {current}, Max allowed: {max}. \
         Please revoke an existing assignment or contact procurement to increase license capacity."
    )
}

// ─── Commit Outcomes ─────────────────────────────────────────────────

/// Result of a successful [`AssignmentRepository::commit_assignment`].
#[derive(Debug, Clone)]
pub struct CommittedAssignment {
    /// The stored assignment.
    pub assignment: Assignment,
    /// Active-assignment count before the commit.
    pub usage_before: u32,
    /// Active-assignment count after the commit.
    pub usage_after: u32,
}

/// Result of a successful [`AssignmentRepository::commit_revocation`].
#[derive(Debug, Clone)]
pub struct RevocationOutcome {
    /// The assignment in its revoked state.
    pub assignment: Assignment,
    /// Active-assignment count on the license after the revocation.
    pub usage_after: u32,
}

// ─── Repository Ports ────────────────────────────────────────────────

/// License persistence port.
pub trait LicenseRepository {
    /// Look up a license by id.
    fn license(&self, id: &LicenseId) -> Result<Option<License>, StoreError>;

    /// Insert or replace a license.
    fn save_license(&self, license: &License) -> Result<(), StoreError>;

    /// All licenses.
    fn licenses(&self) -> Result<Vec<License>, StoreError>;

    /// Active licenses whose `valid_to` falls in `[from, to]`.
    fn active_licenses_expiring_between(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<License>, StoreError>;

    /// Active licenses whose `valid_to` is strictly before `date`.
    fn active_licenses_expired_before(&self, date: NaiveDate) -> Result<Vec<License>, StoreError>;
}

/// Device persistence port.
pub trait DeviceRepository {
    /// Look up a device by id.
    fn device(&self, id: &DeviceId) -> Result<Option<Device>, StoreError>;

    /// Insert or replace a device.
    fn save_device(&self, device: &Device) -> Result<(), StoreError>;

    /// Delete a device record. Assignments are untouched; the caller
    /// must cascade-revoke them first.
    fn remove_device(&self, id: &DeviceId) -> Result<(), StoreError>;
}

/// Assignment persistence port.
///
/// The two `commit_*` operations are the only writes; everything else
/// is read-only. See the crate docs for why commits revalidate.
pub trait AssignmentRepository {
    /// Look up an assignment by id.
    fn assignment(&self, id: &AssignmentId) -> Result<Option<Assignment>, StoreError>;

    /// All assignments (active and revoked) for a device.
    fn assignments_for_device(&self, id: &DeviceId) -> Result<Vec<Assignment>, StoreError>;

    /// Active assignments for a device.
    fn active_assignments_for_device(&self, id: &DeviceId) -> Result<Vec<Assignment>, StoreError>;

    /// Active assignments for a license.
    fn active_assignments_for_license(
        &self,
        id: &LicenseId,
    ) -> Result<Vec<Assignment>, StoreError>;

    /// Count of active assignments for a license.
    fn count_active_for_license(&self, id: &LicenseId) -> Result<u32, StoreError>;

    /// Whether an active assignment exists for the (device, license) pair.
    fn has_active_assignment(
        &self,
        device: &DeviceId,
        license: &LicenseId,
    ) -> Result<bool, StoreError>;

    /// Atomically validate and store a new assignment.
    ///
    /// Re-checks pair uniqueness and capacity against the live count of
    /// active assignments, stores the row, and sets the license's
    /// `current_usage` to that count plus one.
    ///
    /// # Errors
    ///
    /// [`StoreError::MissingLicense`], [`StoreError::MissingDevice`],
    /// [`StoreError::AssignmentExists`], or
    /// [`StoreError::CapacityExceeded`].
    fn commit_assignment(&self, assignment: Assignment)
        -> Result<CommittedAssignment, StoreError>;

    /// Atomically revoke an assignment and refresh the license's usage
    /// counter from the live count.
    ///
    /// # Errors
    ///
    /// [`StoreError::MissingAssignment`] or [`StoreError::AlreadyRevoked`].
    fn commit_revocation(
        &self,
        id: &AssignmentId,
        revoked_by: &str,
        reason: &str,
        at: Timestamp,
    ) -> Result<RevocationOutcome, StoreError>;
}

/// Alert persistence port.
pub trait AlertRepository {
    /// Look up an alert by id.
    fn alert(&self, id: &AlertId) -> Result<Option<Alert>, StoreError>;

    /// Insert or replace an alert.
    fn save_alert(&self, alert: &Alert) -> Result<(), StoreError>;

    /// All alerts.
    fn alerts(&self) -> Result<Vec<Alert>, StoreError>;

    /// Alerts of one type whose message contains `keyword`.
    ///
    /// This substring match is the deduplication probe: alert messages
    /// embed the license key or device code, so matching on it finds
    /// prior alerts for the same subject.
    fn alerts_matching(
        &self,
        alert_type: AlertType,
        keyword: &str,
    ) -> Result<Vec<Alert>, StoreError>;

    /// Unacknowledged alerts generated at or after `cutoff`.
    fn unacknowledged_since(&self, cutoff: Timestamp) -> Result<Vec<Alert>, StoreError>;
}

/// Software version persistence port.
pub trait SoftwareVersionRepository {
    /// Insert or replace a version record.
    fn save_version(&self, record: &SoftwareVersion) -> Result<(), StoreError>;

    /// All version records with the given status.
    fn versions_with_status(
        &self,
        status: VersionStatus,
    ) -> Result<Vec<SoftwareVersion>, StoreError>;
}

/// The full entity store the engines run against.
pub trait EntityStore:
    LicenseRepository
    + DeviceRepository
    + AssignmentRepository
    + AlertRepository
    + SoftwareVersionRepository
    + Send
    + Sync
{
}

impl<T> EntityStore for T where
    T: LicenseRepository
        + DeviceRepository
        + AssignmentRepository
        + AlertRepository
        + SoftwareVersionRepository
        + Send
        + Sync
{
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capacity_error_maps_to_validation_with_full_message() {
        let err: TrackerError = StoreError::CapacityExceeded { current: 2, max: 2 }.into();
        assert_eq!(
            err.validation_code(),
            Some(ValidationCode::CapacityExceeded)
        );
        assert_eq!(
            err.to_string(),
            "License usage limit reached. Current usage: 2, Max allowed: 2. \
             Please revoke an existing assignment or contact procurement to increase license capacity."
        );
    }

    #[test]
    fn missing_license_maps_to_not_found() {
        let err: TrackerError = StoreError::MissingLicense("license:abc".to_string()).into();
        assert!(matches!(err, TrackerError::NotFound { .. }));
        assert_eq!(err.to_string(), "LICENSE not found with id: license:abc");
    }

    #[test]
    fn duplicate_pair_maps_to_already_assigned() {
        let err: TrackerError = StoreError::AssignmentExists.into();
        assert_eq!(err.validation_code(), Some(ValidationCode::AlreadyAssigned));
        assert_eq!(err.to_string(), "License is already assigned to this device");
    }

    #[test]
    fn backend_failure_maps_to_store() {
        let err: TrackerError = StoreError::Backend("disk full".to_string()).into();
        assert!(matches!(err, TrackerError::Store(_)));
    }
}
