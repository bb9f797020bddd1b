//! # Assignment Lifecycle Engine
//!
//! Validates and performs license-to-device assignment and revocation,
//! enforces capacity, and cascades auto-revocation when a device
//! leaves service.
//!
//! ## Validation Order
//!
//! `assign` checks preconditions in a fixed order, each a distinct
//! failure kind:
//!
//! 1. Device and license must exist (`NotFound`).
//! 2. License must be active (`INACTIVE_LICENSE`).
//! 3. Today must fall inside the validity window (`NOT_YET_VALID` /
//!    `EXPIRED_LICENSE`).
//! 4. No active assignment for the same pair (`ALREADY_ASSIGNED`).
//! 5. Active count below `max_usage` (`CAPACITY_EXCEEDED`).
//!
//! Every validation failure is audited with `status: FAILURE` before
//! it is returned — failed attempts are first-class audit material.
//! `NotFound` lookups are not audited; there is no record to attach
//! the event to.
//!
//! ## Usage Counter
//!
//! The engine never increments or decrements `current_usage` itself.
//! The store's commit operations recompute it from the live count of
//! active assignments, which self-heals after any inconsistency and
//! stays correct under concurrent revocations.

use std::sync::Arc;

use chrono::Utc;
use serde_json::json;

use ltk_audit::{AuditEvent, AuditRecorder};
use ltk_core::{
    Actor, Assignment, AssignmentId, Device, DeviceId, DeviceLifecycle, EntityType, License,
    LicenseId, LicenseValidity, Timestamp, TrackerError, ValidationCode,
};
use ltk_store::{EntityStore, StoreError};

/// Reason recorded when a revocation request omits one.
const DEFAULT_REVOCATION_REASON: &str = "No reason provided";

// ─── Requests ────────────────────────────────────────────────────────

/// Parameters for [`AssignmentEngine::assign`].
#[derive(Debug, Clone)]
pub struct AssignmentRequest {
    /// Device to receive the seat.
    pub device_id: DeviceId,
    /// License granting the seat.
    pub license_id: LicenseId,
    /// Recorded as `assigned_by`; defaults to the actor's name.
    pub assigned_by: Option<String>,
}

/// Parameters for [`AssignmentEngine::revoke`].
#[derive(Debug, Clone, Default)]
pub struct RevokeRequest {
    /// Recorded as `revoked_by`; defaults to the actor's name.
    pub revoked_by: Option<String>,
    /// Recorded reason; defaults to "No reason provided".
    pub reason: Option<String>,
}

/// Counts from one [`AssignmentEngine::run_expiry_maintenance`] pass.
#[derive(Debug, Clone, Default)]
pub struct ExpirySummary {
    /// Active licenses found past their `valid_to`.
    pub examined: usize,
    /// Licenses deactivated this pass.
    pub deactivated: usize,
    /// Assignments auto-revoked this pass.
    pub assignments_revoked: usize,
    /// Licenses skipped because processing them failed.
    pub failures: usize,
}

// ─── Engine ──────────────────────────────────────────────────────────

/// The assignment lifecycle engine.
///
/// Holds the entity store and the audit sink; all operations take the
/// acting identity explicitly.
pub struct AssignmentEngine<S> {
    store: Arc<S>,
    audit: Arc<dyn AuditRecorder>,
}

impl<S: EntityStore> AssignmentEngine<S> {
    /// Create an engine over the given store and audit sink.
    pub fn new(store: Arc<S>, audit: Arc<dyn AuditRecorder>) -> Self {
        Self { store, audit }
    }

    /// Assign a license to a device.
    ///
    /// # Errors
    ///
    /// [`TrackerError::NotFound`] if the device or license is absent;
    /// [`TrackerError::Validation`] per the module-level validation
    /// order; [`TrackerError::Store`] on infrastructure failure, which
    /// is audited as `UNEXPECTED_ERROR` before being re-raised.
    pub fn assign(
        &self,
        request: &AssignmentRequest,
        actor: &Actor,
    ) -> Result<Assignment, TrackerError> {
        match self.try_assign(request, actor) {
            Err(err @ TrackerError::Store(_)) => {
                tracing::error!(license = %request.license_id, device = %request.device_id, error = %err, "assignment failed unexpectedly");
                self.audit.record(AuditEvent::new(
                    actor,
                    EntityType::License,
                    request.license_id.to_string(),
                    ltk_core::AuditAction::Assign,
                    json!({
                        "status": "UNEXPECTED_ERROR",
                        "device_id": request.device_id.to_string(),
                        "error": err.to_string(),
                    }),
                ));
                Err(err)
            }
            other => other,
        }
    }

    fn try_assign(
        &self,
        request: &AssignmentRequest,
        actor: &Actor,
    ) -> Result<Assignment, TrackerError> {
        let device = self
            .store
            .device(&request.device_id)
            .map_err(TrackerError::from)?
            .ok_or_else(|| TrackerError::not_found(EntityType::Device, request.device_id))?;
        let license = self
            .store
            .license(&request.license_id)
            .map_err(TrackerError::from)?
            .ok_or_else(|| TrackerError::not_found(EntityType::License, request.license_id))?;

        let today = Utc::now().date_naive();

        if !license.active {
            return Err(self.reject_assign(
                actor,
                &license,
                &device,
                ValidationCode::InactiveLicense,
                format!("License is not active: {}", license.label()),
            ));
        }
        match license.validity(today) {
            LicenseValidity::Expired => {
                return Err(self.reject_assign(
                    actor,
                    &license,
                    &device,
                    ValidationCode::ExpiredLicense,
                    format!(
                        "License expired on {}: {}",
                        license.valid_to,
                        license.label()
                    ),
                ));
            }
            LicenseValidity::NotYetValid => {
                return Err(self.reject_assign(
                    actor,
                    &license,
                    &device,
                    ValidationCode::NotYetValid,
                    format!(
                        "License is not valid until {}: {}",
                        license.valid_from,
                        license.label()
                    ),
                ));
            }
            LicenseValidity::Valid => {}
        }
        if self
            .store
            .has_active_assignment(&device.id, &license.id)
            .map_err(TrackerError::from)?
        {
            return Err(self.reject_assign(
                actor,
                &license,
                &device,
                ValidationCode::AlreadyAssigned,
                "License is already assigned to this device".to_string(),
            ));
        }
        let current = self
            .store
            .count_active_for_license(&license.id)
            .map_err(TrackerError::from)?;
        if current >= license.max_usage {
            return Err(self.reject_assign(
                actor,
                &license,
                &device,
                ValidationCode::CapacityExceeded,
                ltk_store::capacity_exceeded_message(current, license.max_usage),
            ));
        }

        let assigned_by = request
            .assigned_by
            .clone()
            .unwrap_or_else(|| actor.name.clone());
        let assignment = Assignment::new(license.id, device.id, assigned_by, Timestamp::now());

        // The commit re-validates under the store lock; a concurrent
        // assign may have taken the last seat since the checks above.
        let committed = match self.store.commit_assignment(assignment) {
            Ok(committed) => committed,
            Err(err) => {
                let err = TrackerError::from(err);
                if let Some(code) = err.validation_code() {
                    self.audit_assign_failure(actor, &license, &device, code, err.to_string());
                }
                return Err(err);
            }
        };

        let utilization = if license.max_usage == 0 {
            0.0
        } else {
            f64::from(committed.usage_after) / f64::from(license.max_usage) * 100.0
        };
        self.audit.record(AuditEvent::new(
            actor,
            EntityType::Assignment,
            committed.assignment.id.to_string(),
            ltk_core::AuditAction::Assign,
            json!({
                "status": "SUCCESS",
                "device_code": device.device_code,
                "license_key": license.key,
                "usage_before": committed.usage_before,
                "usage_after": committed.usage_after,
                "max_usage": license.max_usage,
                "utilization_percent": utilization,
            }),
        ));
        tracing::info!(
            assignment = %committed.assignment.id,
            device = %device.device_code,
            license = %license.key,
            usage = committed.usage_after,
            max = license.max_usage,
            "license assigned"
        );
        Ok(committed.assignment)
    }

    /// Revoke an assignment.
    ///
    /// Revocation is terminal; the released seat is reflected in the
    /// license's usage counter immediately.
    ///
    /// # Errors
    ///
    /// [`TrackerError::NotFound`] if the assignment is absent;
    /// `ALREADY_REVOKED` validation (audited) if it is already
    /// inactive; [`TrackerError::Store`] on infrastructure failure,
    /// which is audited as `UNEXPECTED_ERROR` before being re-raised.
    pub fn revoke(
        &self,
        id: &AssignmentId,
        request: &RevokeRequest,
        actor: &Actor,
    ) -> Result<Assignment, TrackerError> {
        match self.try_revoke(id, request, actor) {
            Err(err @ TrackerError::Store(_)) => {
                self.audit_unexpected_unassign(actor, id, &err);
                Err(err)
            }
            other => other,
        }
    }

    fn try_revoke(
        &self,
        id: &AssignmentId,
        request: &RevokeRequest,
        actor: &Actor,
    ) -> Result<Assignment, TrackerError> {
        self.store
            .assignment(id)
            .map_err(TrackerError::from)?
            .ok_or_else(|| TrackerError::not_found(EntityType::Assignment, id))?;

        let revoked_by = request
            .revoked_by
            .clone()
            .unwrap_or_else(|| actor.name.clone());
        let reason = request
            .reason
            .clone()
            .unwrap_or_else(|| DEFAULT_REVOCATION_REASON.to_string());
        let now = Timestamp::now();

        let outcome = match self.store.commit_revocation(id, &revoked_by, &reason, now) {
            Ok(outcome) => outcome,
            Err(err @ StoreError::AlreadyRevoked(_)) => {
                let err = TrackerError::from(err);
                self.audit.record(AuditEvent::new(
                    actor,
                    EntityType::Assignment,
                    id.to_string(),
                    ltk_core::AuditAction::Unassign,
                    json!({
                        "status": "FAILURE",
                        "reason_code": ValidationCode::AlreadyRevoked.as_str(),
                        "message": err.to_string(),
                    }),
                ));
                return Err(err);
            }
            Err(err) => return Err(err.into()),
        };

        self.audit_unassign(actor, &outcome.assignment, outcome.usage_after, now);
        tracing::info!(
            assignment = %outcome.assignment.id,
            revoked_by = %revoked_by,
            usage = outcome.usage_after,
            "assignment revoked"
        );
        Ok(outcome.assignment)
    }

    /// Revoke every active assignment of a device.
    ///
    /// Invoked by device update flows when the lifecycle enters an
    /// end-of-life state, and unconditionally before device deletion.
    /// Each individual revocation is audited exactly as in the manual
    /// path. Returns the revoked assignments.
    pub fn cascade_revoke(
        &self,
        device: &Device,
        actor: &Actor,
    ) -> Result<Vec<Assignment>, TrackerError> {
        let active = self
            .store
            .active_assignments_for_device(&device.id)
            .map_err(TrackerError::from)?;
        let reason = format!(
            "Auto-revoked: Device lifecycle changed to {}",
            device.lifecycle
        );

        let mut revoked = Vec::with_capacity(active.len());
        for assignment in active {
            let now = Timestamp::now();
            match self
                .store
                .commit_revocation(&assignment.id, &actor.name, &reason, now)
            {
                Ok(outcome) => {
                    self.audit_unassign(actor, &outcome.assignment, outcome.usage_after, now);
                    revoked.push(outcome.assignment);
                }
                // Lost a race with a manual revoke; the seat is
                // already released.
                Err(StoreError::AlreadyRevoked(_)) => continue,
                Err(err) => {
                    let err = TrackerError::from(err);
                    self.audit_unexpected_unassign(actor, &assignment.id, &err);
                    return Err(err);
                }
            }
        }
        if !revoked.is_empty() {
            tracing::info!(
                device = %device.device_code,
                lifecycle = %device.lifecycle,
                count = revoked.len(),
                "cascade revocation"
            );
        }
        Ok(revoked)
    }

    /// React to a device lifecycle transition.
    ///
    /// Cascades revocation only when the new state is end-of-life and
    /// differs from the previous one; all other transitions are
    /// no-ops. Returns the revoked assignments.
    pub fn handle_lifecycle_change(
        &self,
        device: &Device,
        previous: DeviceLifecycle,
        actor: &Actor,
    ) -> Result<Vec<Assignment>, TrackerError> {
        if device.lifecycle.is_end_of_life() && previous != device.lifecycle {
            self.cascade_revoke(device, actor)
        } else {
            Ok(Vec::new())
        }
    }

    /// Delete a device, cascade-revoking its active assignments first.
    ///
    /// Returns the revoked assignments.
    pub fn remove_device(
        &self,
        id: &DeviceId,
        actor: &Actor,
    ) -> Result<Vec<Assignment>, TrackerError> {
        let device = self
            .store
            .device(id)
            .map_err(TrackerError::from)?
            .ok_or_else(|| TrackerError::not_found(EntityType::Device, id))?;

        let revoked = self.cascade_revoke(&device, actor)?;
        self.store.remove_device(id).map_err(TrackerError::from)?;
        self.audit.record(AuditEvent::new(
            actor,
            EntityType::Device,
            id.to_string(),
            ltk_core::AuditAction::Delete,
            json!({
                "device_code": device.device_code,
                "assignments_revoked": revoked.len(),
            }),
        ));
        Ok(revoked)
    }

    /// Deactivate licenses whose validity window has closed and
    /// auto-revoke their assignments.
    ///
    /// One bad license never fails the pass; its error is logged and
    /// the pass continues. A single summary audit event is written
    /// even when nothing was found.
    pub fn run_expiry_maintenance(&self, actor: &Actor) -> Result<ExpirySummary, TrackerError> {
        let today = Utc::now().date_naive();
        let expired = self
            .store
            .active_licenses_expired_before(today)
            .map_err(TrackerError::from)?;

        let mut summary = ExpirySummary {
            examined: expired.len(),
            ..ExpirySummary::default()
        };
        for license in expired {
            match self.expire_license(&license, actor) {
                Ok(revoked) => {
                    summary.deactivated += 1;
                    summary.assignments_revoked += revoked;
                }
                Err(err) => {
                    tracing::warn!(license = %license.key, error = %err, "expiry maintenance skipped license");
                    summary.failures += 1;
                }
            }
        }

        self.audit.record(AuditEvent::new(
            actor,
            EntityType::License,
            "expiry-maintenance",
            ltk_core::AuditAction::Update,
            json!({
                "examined": summary.examined,
                "deactivated": summary.deactivated,
                "assignments_revoked": summary.assignments_revoked,
                "failures": summary.failures,
            }),
        ));
        tracing::info!(
            examined = summary.examined,
            deactivated = summary.deactivated,
            revoked = summary.assignments_revoked,
            "expiry maintenance complete"
        );
        Ok(summary)
    }

    fn expire_license(&self, license: &License, actor: &Actor) -> Result<usize, TrackerError> {
        let mut deactivated = license.clone();
        deactivated.active = false;
        self.store
            .save_license(&deactivated)
            .map_err(TrackerError::from)?;
        self.audit.record(AuditEvent::new(
            actor,
            EntityType::License,
            license.id.to_string(),
            ltk_core::AuditAction::Deactivate,
            json!({
                "license_key": license.key,
                "valid_to": license.valid_to.to_string(),
                "reason": format!("License expired on {}", license.valid_to),
            }),
        ));

        let reason = format!("Auto-revoked: License expired on {}", license.valid_to);
        let active = self
            .store
            .active_assignments_for_license(&license.id)
            .map_err(TrackerError::from)?;
        let mut revoked = 0;
        for assignment in active {
            let now = Timestamp::now();
            match self
                .store
                .commit_revocation(&assignment.id, &actor.name, &reason, now)
            {
                Ok(outcome) => {
                    self.audit_unassign(actor, &outcome.assignment, outcome.usage_after, now);
                    revoked += 1;
                }
                Err(StoreError::AlreadyRevoked(_)) => continue,
                Err(err) => {
                    let err = TrackerError::from(err);
                    self.audit_unexpected_unassign(actor, &assignment.id, &err);
                    return Err(err);
                }
            }
        }
        Ok(revoked)
    }

    fn reject_assign(
        &self,
        actor: &Actor,
        license: &License,
        device: &Device,
        code: ValidationCode,
        message: String,
    ) -> TrackerError {
        self.audit_assign_failure(actor, license, device, code, message.clone());
        tracing::warn!(
            license = %license.key,
            device = %device.device_code,
            code = %code,
            "assignment rejected"
        );
        TrackerError::validation(code, message)
    }

    fn audit_assign_failure(
        &self,
        actor: &Actor,
        license: &License,
        device: &Device,
        code: ValidationCode,
        message: String,
    ) {
        self.audit.record(AuditEvent::new(
            actor,
            EntityType::License,
            license.id.to_string(),
            ltk_core::AuditAction::Assign,
            json!({
                "status": "FAILURE",
                "reason_code": code.as_str(),
                "message": message,
                "device_code": device.device_code,
                "license_key": license.key,
            }),
        ));
    }

    fn audit_unexpected_unassign(&self, actor: &Actor, id: &AssignmentId, err: &TrackerError) {
        tracing::error!(assignment = %id, error = %err, "revocation failed unexpectedly");
        self.audit.record(AuditEvent::new(
            actor,
            EntityType::Assignment,
            id.to_string(),
            ltk_core::AuditAction::Unassign,
            json!({
                "status": "UNEXPECTED_ERROR",
                "error": err.to_string(),
            }),
        ));
    }

    fn audit_unassign(
        &self,
        actor: &Actor,
        assignment: &Assignment,
        usage_after: u32,
        now: Timestamp,
    ) {
        self.audit.record(AuditEvent::new(
            actor,
            EntityType::Assignment,
            assignment.id.to_string(),
            ltk_core::AuditAction::Unassign,
            json!({
                "status": "SUCCESS",
                "revoked_by": assignment.revoked_by,
                "reason": assignment.revocation_reason,
                "duration_days": assignment.duration_days(now),
                "usage_after": usage_after,
            }),
        ));
    }
}

// ─── Tests ───────────────────────────────────────────────────────────
