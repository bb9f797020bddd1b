//! # Alert Record
//!
//! A graded notification produced by the alert engine. Alerts carry a
//! preformatted human-readable message plus the structured fields
//! (type, severity, subject ids) deduplication and reporting key on.

use serde::{Deserialize, Serialize};

use crate::domain::{AlertType, Region, Severity};
use crate::identity::{AlertId, DeviceId, LicenseId};
use crate::temporal::Timestamp;

/// A generated alert.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    /// Unique identifier.
    pub id: AlertId,
    /// What kind of condition the alert reports.
    pub alert_type: AlertType,
    /// How urgent it is.
    pub severity: Severity,
    /// Preformatted message shown to operators.
    pub message: String,
    /// Subject license, when the alert concerns one.
    pub license_id: Option<LicenseId>,
    /// Subject device, when the alert concerns one.
    pub device_id: Option<DeviceId>,
    /// Region of the subject license or device.
    pub region: Option<Region>,
    /// When the alert was generated.
    pub generated_at: Timestamp,
    /// Whether an operator has acknowledged it.
    pub acknowledged: bool,
    /// Who acknowledged it.
    pub acknowledged_by: Option<String>,
    /// When it was acknowledged.
    pub acknowledged_at: Option<Timestamp>,
}

impl Alert {
    /// Create a new unacknowledged alert.
    pub fn new(
        alert_type: AlertType,
        severity: Severity,
        message: impl Into<String>,
        generated_at: Timestamp,
    ) -> Self {
        Self {
            id: AlertId::new(),
            alert_type,
            severity,
            message: message.into(),
            license_id: None,
            device_id: None,
            region: None,
            generated_at,
            acknowledged: false,
            acknowledged_by: None,
            acknowledged_at: None,
        }
    }

    /// Attach the subject license.
    pub fn for_license(mut self, id: LicenseId) -> Self {
        self.license_id = Some(id);
        self
    }

    /// Attach the subject device.
    pub fn for_device(mut self, id: DeviceId) -> Self {
        self.device_id = Some(id);
        self
    }

    /// Attach the subject's region.
    pub fn in_region(mut self, region: Region) -> Self {
        self.region = Some(region);
        self
    }

    /// Mark the alert acknowledged, returning the previous flag.
    ///
    /// Re-acknowledging overwrites who and when; the returned flag
    /// tells the caller whether that happened.
    pub fn acknowledge(&mut self, by: impl Into<String>, at: Timestamp) -> bool {
        let was_acknowledged = self.acknowledged;
        self.acknowledged = true;
        self.acknowledged_by = Some(by.into());
        self.acknowledged_at = Some(at);
        was_acknowledged
    }

    /// Whether the alert was generated at or after `cutoff`.
    pub fn generated_since(&self, cutoff: Timestamp) -> bool {
        self.generated_at >= cutoff
    }
}
