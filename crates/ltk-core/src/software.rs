//! Software version tracking per device.
//!
//! One record per (device, software) pair, refreshed by whatever feeds
//! version data in. The alert engine sweeps records whose status is
//! [`VersionStatus::Critical`].

use serde::{Deserialize, Serialize};

use crate::domain::VersionStatus;
use crate::identity::{DeviceId, VersionRecordId};
use crate::temporal::Timestamp;

/// The installed version of one piece of software on one device.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SoftwareVersion {
    /// Unique identifier.
    pub id: VersionRecordId,
    /// The device the software runs on.
    pub device_id: DeviceId,
    /// Name of the software.
    pub software_name: String,
    /// Version currently installed.
    pub current_version: String,
    /// Latest version known to exist, if any.
    pub latest_version: Option<String>,
    /// Freshness classification.
    pub status: VersionStatus,
    /// When the record was last refreshed.
    pub last_checked: Timestamp,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serde_roundtrip_keeps_status() {
        let record = SoftwareVersion {
            id: VersionRecordId::new(),
            device_id: DeviceId::new(),
            software_name: "OpenSSL".to_string(),
            current_version: "1.1.1".to_string(),
            latest_version: Some("3.0.13".to_string()),
            status: VersionStatus::Critical,
            last_checked: Timestamp::parse("2026-01-01T00:00:00Z").unwrap(),
        };
        let json = serde_json::to_string(&record).unwrap();
        let parsed: SoftwareVersion = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.status, VersionStatus::Critical);
        assert_eq!(parsed.device_id, record.device_id);
    }
}
