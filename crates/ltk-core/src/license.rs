//! # License Record
//!
//! A software license entitlement: how many seats it grants
//! (`max_usage`), how many are taken (`current_usage`), and the
//! calendar window it is valid in.
//!
//! ## Validity Window
//!
//! The window is half-open: a license is usable on dates `d` with
//! `valid_from <= d < valid_to`. On `valid_to` itself the license is
//! already expired — `days_until_expiry` of zero means "expires today,
//! unusable".
//!
//! ## Usage Counter
//!
//! `current_usage` is a denormalized counter maintained by the entity
//! store; the authoritative value is always the count of active
//! assignments. Engines treat it as read-only.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::Region;
use crate::identity::LicenseId;
use crate::money::Money;

// ─── Validity ────────────────────────────────────────────────────────

/// Where a date falls relative to a license's validity window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LicenseValidity {
    /// Inside the window.
    Valid,
    /// Before `valid_from`.
    NotYetValid,
    /// At or past `valid_to`.
    Expired,
}

// ─── License ─────────────────────────────────────────────────────────

/// A software license entitlement record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct License {
    /// Unique identifier.
    pub id: LicenseId,
    /// Externally visible license key (unique).
    pub key: String,
    /// Name of the licensed software.
    pub software_name: String,
    /// Vendor name, if known.
    pub vendor: Option<String>,
    /// Maximum concurrent assignments the license permits.
    pub max_usage: u32,
    /// Denormalized count of active assignments. Maintained by the
    /// entity store, never written by engines.
    pub current_usage: u32,
    /// First date (inclusive) the license may be used.
    pub valid_from: NaiveDate,
    /// First date (exclusive) the license may no longer be used.
    pub valid_to: NaiveDate,
    /// Administrative flag. An inactive license rejects new
    /// assignments regardless of dates.
    pub active: bool,
    /// Deployment region the license is scoped to.
    pub region: Region,
    /// Purchase cost, for reporting.
    pub cost: Option<Money>,
}

impl License {
    /// Where `today` falls relative to the validity window.
    pub fn validity(&self, today: NaiveDate) -> LicenseValidity {
        if today < self.valid_from {
            LicenseValidity::NotYetValid
        } else if today >= self.valid_to {
            LicenseValidity::Expired
        } else {
            LicenseValidity::Valid
        }
    }

    /// Calendar days from `today` until `valid_to`.
    ///
    /// Zero or negative means the license is expired.
    pub fn days_until_expiry(&self, today: NaiveDate) -> i64 {
        (self.valid_to - today).num_days()
    }

    /// Utilization as a percentage of `max_usage`.
    ///
    /// Returns 0.0 when `max_usage` is zero; such licenses are skipped
    /// by capacity checks entirely.
    pub fn utilization_percent(&self) -> f64 {
        if self.max_usage == 0 {
            return 0.0;
        }
        f64::from(self.current_usage) / f64::from(self.max_usage) * 100.0
    }

    /// Short label used in alert and log messages: software name with
    /// the license key in parentheses.
    pub fn label(&self) -> String {
        format!("{} ({})", self.software_name, self.key)
    }
}

// ─── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn license(valid_from: NaiveDate, valid_to: NaiveDate) -> License {
        License {
            id: LicenseId::new(),
            key: "ADB-2026-001".to_string(),
            software_name: "Acrobat Pro".to_string(),
            vendor: Some("Adobe".to_string()),
            max_usage: 10,
            current_usage: 4,
            valid_from,
            valid_to,
            active: true,
            region: Region::Chennai,
            cost: None,
        }
    }

    #[test]
    fn validity_window_is_half_open() {
        let lic = license(date(2026, 1, 1), date(2026, 12, 31));
        assert_eq!(lic.validity(date(2025, 12, 31)), LicenseValidity::NotYetValid);
        assert_eq!(lic.validity(date(2026, 1, 1)), LicenseValidity::Valid);
        assert_eq!(lic.validity(date(2026, 12, 30)), LicenseValidity::Valid);
        assert_eq!(lic.validity(date(2026, 12, 31)), LicenseValidity::Expired);
        assert_eq!(lic.validity(date(2027, 6, 1)), LicenseValidity::Expired);
    }

    #[test]
    fn days_until_expiry_counts_from_today() {
        let lic = license(date(2026, 1, 1), date(2026, 12, 31));
        assert_eq!(lic.days_until_expiry(date(2026, 12, 1)), 30);
        assert_eq!(lic.days_until_expiry(date(2026, 12, 30)), 1);
        assert_eq!(lic.days_until_expiry(date(2026, 12, 31)), 0);
        assert_eq!(lic.days_until_expiry(date(2027, 1, 5)), -5);
    }

    #[test]
    fn utilization_percent() {
        let mut lic = license(date(2026, 1, 1), date(2026, 12, 31));
        assert_eq!(lic.utilization_percent(), 40.0);
        lic.current_usage = 9;
        assert_eq!(lic.utilization_percent(), 90.0);
        lic.max_usage = 0;
        assert_eq!(lic.utilization_percent(), 0.0);
    }

    #[test]
    fn label_format() {
        let lic = license(date(2026, 1, 1), date(2026, 12, 31));
        assert_eq!(lic.label(), "Acrobat Pro (ADB-2026-001)");
    }

    #[test]
    fn serde_roundtrip() {
        let lic = license(date(2026, 1, 1), date(2026, 12, 31));
        let json = serde_json::to_string(&lic).unwrap();
        let parsed: License = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.key, lic.key);
        assert_eq!(parsed.valid_to, lic.valid_to);
    }
}
