//! In-memory entity store backed by `parking_lot::RwLock` tables.
//!
//! The reference backend. All tables live behind a single lock so the
//! atomic commits can validate and write across tables without a
//! second lock order to get wrong. Cheaply cloneable; clones share the
//! same data.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDate;
use parking_lot::RwLock;

use ltk_core::{
    Alert, AlertId, AlertType, Assignment, AssignmentId, Device, DeviceId, License, LicenseId,
    SoftwareVersion, Timestamp, VersionRecordId, VersionStatus,
};

use crate::{
    AlertRepository, AssignmentRepository, CommittedAssignment, DeviceRepository,
    LicenseRepository, RevocationOutcome, SoftwareVersionRepository, StoreError,
};

#[derive(Default)]
struct Tables {
    licenses: HashMap<LicenseId, License>,
    devices: HashMap<DeviceId, Device>,
    assignments: HashMap<AssignmentId, Assignment>,
    alerts: HashMap<AlertId, Alert>,
    versions: HashMap<VersionRecordId, SoftwareVersion>,
}

impl Tables {
    fn count_active_for_license(&self, id: &LicenseId) -> u32 {
        self.assignments
            .values()
            .filter(|a| a.active && a.license_id == *id)
            .count() as u32
    }
}

/// In-memory [`EntityStore`](crate::EntityStore) implementation.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    inner: Arc<RwLock<Tables>>,
}

impl InMemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl LicenseRepository for InMemoryStore {
    fn license(&self, id: &LicenseId) -> Result<Option<License>, StoreError> {
        Ok(self.inner.read().licenses.get(id).cloned())
    }

    fn save_license(&self, license: &License) -> Result<(), StoreError> {
        self.inner
            .write()
            .licenses
            .insert(license.id, license.clone());
        Ok(())
    }

    fn licenses(&self) -> Result<Vec<License>, StoreError> {
        Ok(self.inner.read().licenses.values().cloned().collect())
    }

    fn active_licenses_expiring_between(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<License>, StoreError> {
        Ok(self
            .inner
            .read()
            .licenses
            .values()
            .filter(|l| l.active && l.valid_to >= from && l.valid_to <= to)
            .cloned()
            .collect())
    }

    fn active_licenses_expired_before(&self, date: NaiveDate) -> Result<Vec<License>, StoreError> {
        Ok(self
            .inner
            .read()
            .licenses
            .values()
            .filter(|l| l.active && l.valid_to < date)
            .cloned()
            .collect())
    }
}

impl DeviceRepository for InMemoryStore {
    fn device(&self, id: &DeviceId) -> Result<Option<Device>, StoreError> {
        Ok(self.inner.read().devices.get(id).cloned())
    }

    fn save_device(&self, device: &Device) -> Result<(), StoreError> {
        self.inner.write().devices.insert(device.id, device.clone());
        Ok(())
    }

    fn remove_device(&self, id: &DeviceId) -> Result<(), StoreError> {
        self.inner
            .write()
            .devices
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| StoreError::MissingDevice(id.to_string()))
    }
}

impl AssignmentRepository for InMemoryStore {
    fn assignment(&self, id: &AssignmentId) -> Result<Option<Assignment>, StoreError> {
        Ok(self.inner.read().assignments.get(id).cloned())
    }

    fn assignments_for_device(&self, id: &DeviceId) -> Result<Vec<Assignment>, StoreError> {
        Ok(self
            .inner
            .read()
            .assignments
            .values()
            .filter(|a| a.device_id == *id)
            .cloned()
            .collect())
    }

    fn active_assignments_for_device(&self, id: &DeviceId) -> Result<Vec<Assignment>, StoreError> {
        Ok(self
            .inner
            .read()
            .assignments
            .values()
            .filter(|a| a.active && a.device_id == *id)
            .cloned()
            .collect())
    }

    fn active_assignments_for_license(
        &self,
        id: &LicenseId,
    ) -> Result<Vec<Assignment>, StoreError> {
        Ok(self
            .inner
            .read()
            .assignments
            .values()
            .filter(|a| a.active && a.license_id == *id)
            .cloned()
            .collect())
    }

    fn count_active_for_license(&self, id: &LicenseId) -> Result<u32, StoreError> {
        Ok(self.inner.read().count_active_for_license(id))
    }

    fn has_active_assignment(
        &self,
        device: &DeviceId,
        license: &LicenseId,
    ) -> Result<bool, StoreError> {
        Ok(self
            .inner
            .read()
            .assignments
            .values()
            .any(|a| a.active && a.device_id == *device && a.license_id == *license))
    }

    fn commit_assignment(
        &self,
        assignment: Assignment,
    ) -> Result<CommittedAssignment, StoreError> {
        let mut tables = self.inner.write();

        if !tables.devices.contains_key(&assignment.device_id) {
            return Err(StoreError::MissingDevice(assignment.device_id.to_string()));
        }
        let max = tables
            .licenses
            .get(&assignment.license_id)
            .map(|l| l.max_usage)
            .ok_or_else(|| StoreError::MissingLicense(assignment.license_id.to_string()))?;

        let duplicate = tables.assignments.values().any(|a| {
            a.active && a.device_id == assignment.device_id && a.license_id == assignment.license_id
        });
        if duplicate {
            return Err(StoreError::AssignmentExists);
        }

        let usage_before = tables.count_active_for_license(&assignment.license_id);
        if usage_before >= max {
            return Err(StoreError::CapacityExceeded {
                current: usage_before,
                max,
            });
        }

        let usage_after = usage_before + 1;
        tables.assignments.insert(assignment.id, assignment.clone());
        if let Some(license) = tables.licenses.get_mut(&assignment.license_id) {
            license.current_usage = usage_after;
        }

        Ok(CommittedAssignment {
            assignment,
            usage_before,
            usage_after,
        })
    }

    fn commit_revocation(
        &self,
        id: &AssignmentId,
        revoked_by: &str,
        reason: &str,
        at: Timestamp,
    ) -> Result<RevocationOutcome, StoreError> {
        let mut tables = self.inner.write();

        let assignment = {
            let record = tables
                .assignments
                .get_mut(id)
                .ok_or_else(|| StoreError::MissingAssignment(id.to_string()))?;
            record
                .revoke(revoked_by, reason, at)
                .map_err(|_| StoreError::AlreadyRevoked(id.to_string()))?;
            record.clone()
        };

        let usage_after = tables.count_active_for_license(&assignment.license_id);
        if let Some(license) = tables.licenses.get_mut(&assignment.license_id) {
            license.current_usage = usage_after;
        }

        Ok(RevocationOutcome {
            assignment,
            usage_after,
        })
    }
}

impl AlertRepository for InMemoryStore {
    fn alert(&self, id: &AlertId) -> Result<Option<Alert>, StoreError> {
        Ok(self.inner.read().alerts.get(id).cloned())
    }

    fn save_alert(&self, alert: &Alert) -> Result<(), StoreError> {
        self.inner.write().alerts.insert(alert.id, alert.clone());
        Ok(())
    }

    fn alerts(&self) -> Result<Vec<Alert>, StoreError> {
        Ok(self.inner.read().alerts.values().cloned().collect())
    }

    fn alerts_matching(
        &self,
        alert_type: AlertType,
        keyword: &str,
    ) -> Result<Vec<Alert>, StoreError> {
        Ok(self
            .inner
            .read()
            .alerts
            .values()
            .filter(|a| a.alert_type == alert_type && a.message.contains(keyword))
            .cloned()
            .collect())
    }

    fn unacknowledged_since(&self, cutoff: Timestamp) -> Result<Vec<Alert>, StoreError> {
        Ok(self
            .inner
            .read()
            .alerts
            .values()
            .filter(|a| !a.acknowledged && a.generated_since(cutoff))
            .cloned()
            .collect())
    }
}

impl SoftwareVersionRepository for InMemoryStore {
    fn save_version(&self, record: &SoftwareVersion) -> Result<(), StoreError> {
        self.inner.write().versions.insert(record.id, record.clone());
        Ok(())
    }

    fn versions_with_status(
        &self,
        status: VersionStatus,
    ) -> Result<Vec<SoftwareVersion>, StoreError> {
        Ok(self
            .inner
            .read()
            .versions
            .values()
            .filter(|v| v.status == status)
            .cloned()
            .collect())
    }
}

// ─── Tests ───────────────────────────────────────────────────────────
