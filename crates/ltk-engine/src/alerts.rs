//! # Alert Generation Engine
//!
//! Evaluates licenses and software versions against time and usage
//! thresholds, grades severity, and suppresses duplicates.
//!
//! ## Deduplication
//!
//! Before creating an alert of a given type for a given subject, the
//! engine searches existing alerts of that exact type whose message
//! contains the subject's keyword (license key, or device code for
//! software-version alerts). A match that is unacknowledged and
//! generated within the dedup window suppresses creation; an
//! acknowledged or aged-out match does not, so a persisting issue
//! re-surfaces. The window is 7 days for scheduled sweeps and 1 day
//! for the on-demand expiring-licenses query.
//!
//! Every sweep writes exactly one summary audit event, counts checked
//! and generated, even when it produced nothing — scheduled runs must
//! leave a verifiable trace. A failure on one record is logged and the
//! sweep moves on; a single bad row never aborts the pass or loses the
//! summary event.

use std::sync::Arc;

use chrono::{Duration, Utc};
use serde_json::json;

use ltk_audit::{AuditEvent, AuditRecorder};
use ltk_core::{
    Actor, Alert, AlertId, AlertType, EntityType, License, Severity, SoftwareVersion, Timestamp,
    TrackerError, VersionStatus,
};
use ltk_store::EntityStore;

/// Horizon for the scheduled expiry sweep, in days.
const EXPIRY_HORIZON_DAYS: i64 = 90;
/// Dedup window for scheduled sweeps, in days.
const SWEEP_DEDUP_WINDOW_DAYS: i64 = 7;
/// Dedup window for the on-demand expiring-licenses query, in days.
const ON_DEMAND_DEDUP_WINDOW_DAYS: i64 = 1;
/// How far back `acknowledge_all` reaches, in days.
const ACKNOWLEDGE_ALL_WINDOW_DAYS: i64 = 90;
/// Utilization threshold for a capacity-critical alert.
const CAPACITY_CRITICAL_PERCENT: f64 = 90.0;
/// Utilization threshold for a capacity-warning alert.
const CAPACITY_WARNING_PERCENT: f64 = 80.0;

/// Grade an expiry by days remaining until `valid_to`.
///
/// Zero or negative means already expired.
pub fn classify_expiry_severity(days: i64) -> Severity {
    if days <= 15 {
        Severity::Critical
    } else if days <= 30 {
        Severity::High
    } else if days <= 60 {
        Severity::Medium
    } else {
        Severity::Low
    }
}

/// Counts from one sweep pass.
#[derive(Debug, Clone, Default)]
pub struct SweepSummary {
    /// Records evaluated against the threshold.
    pub checked: usize,
    /// New alerts created (duplicates suppressed are not counted).
    pub generated: usize,
    /// Identifiers of the created alerts.
    pub alert_ids: Vec<AlertId>,
}

/// Aggregate counts over all stored alerts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlertStatistics {
    /// All alerts ever generated.
    pub total: usize,
    /// Acknowledged alerts.
    pub acknowledged: usize,
    /// Unacknowledged alerts.
    pub unacknowledged: usize,
    /// Unacknowledged alerts at CRITICAL severity.
    pub critical: usize,
    /// Unacknowledged alerts at HIGH severity.
    pub high: usize,
    /// Unacknowledged alerts at MEDIUM severity.
    pub medium: usize,
    /// Unacknowledged alerts at LOW severity.
    pub low: usize,
}

// ─── Engine ──────────────────────────────────────────────────────────

/// The alert generation engine.
///
/// Owns alert creation; never mutates licenses, devices, or
/// assignments.
pub struct AlertEngine<S> {
    store: Arc<S>,
    audit: Arc<dyn AuditRecorder>,
}

impl<S: EntityStore> AlertEngine<S> {
    /// Create an engine over the given store and audit sink.
    pub fn new(store: Arc<S>, audit: Arc<dyn AuditRecorder>) -> Self {
        Self { store, audit }
    }

    /// Scheduled expiry sweep over active licenses with `valid_to`
    /// within the next 90 days.
    pub fn run_expiry_sweep(&self, actor: &Actor) -> Result<SweepSummary, TrackerError> {
        let today = Utc::now().date_naive();
        let candidates = self
            .store
            .active_licenses_expiring_between(today, today + Duration::days(EXPIRY_HORIZON_DAYS))
            .map_err(TrackerError::from)?;

        let mut summary = SweepSummary {
            checked: candidates.len(),
            ..SweepSummary::default()
        };
        for license in &candidates {
            match self.expiry_alert_if_new(license, SWEEP_DEDUP_WINDOW_DAYS) {
                Ok(Some(alert)) => {
                    summary.generated += 1;
                    summary.alert_ids.push(alert.id);
                }
                Ok(None) => {}
                Err(err) => {
                    tracing::warn!(license = %license.key, error = %err, "expiry sweep skipped license");
                }
            }
        }
        self.audit_sweep(actor, "expiry-sweep", &summary);
        Ok(summary)
    }

    /// Scheduled capacity sweep over all licenses.
    ///
    /// Utilization at or above 90% raises `LICENSE_CAPACITY_CRITICAL`;
    /// 80–89% raises `LICENSE_CAPACITY_WARNING`; below 80% (and any
    /// zero-seat license) raises nothing. `checked` counts every
    /// license examined, alerting or not.
    pub fn run_capacity_sweep(&self, actor: &Actor) -> Result<SweepSummary, TrackerError> {
        let licenses = self.store.licenses().map_err(TrackerError::from)?;
        let mut summary = SweepSummary {
            checked: licenses.len(),
            ..SweepSummary::default()
        };
        for license in &licenses {
            match self.capacity_alert_if_new(license) {
                Ok(Some(alert)) => {
                    summary.generated += 1;
                    summary.alert_ids.push(alert.id);
                }
                Ok(None) => {}
                Err(err) => {
                    tracing::warn!(license = %license.key, error = %err, "capacity sweep skipped license");
                }
            }
        }
        self.audit_sweep(actor, "capacity-sweep", &summary);
        Ok(summary)
    }

    fn capacity_alert_if_new(&self, license: &License) -> Result<Option<Alert>, TrackerError> {
        if license.max_usage == 0 {
            return Ok(None);
        }
        let utilization = license.utilization_percent();
        let (alert_type, severity, suffix) = if utilization >= CAPACITY_CRITICAL_PERCENT {
            (
                AlertType::LicenseCapacityCritical,
                Severity::Critical,
                " Immediate action required!",
            )
        } else if utilization >= CAPACITY_WARNING_PERCENT {
            (
                AlertType::LicenseCapacityWarning,
                Severity::High,
                " Consider purchasing additional licenses.",
            )
        } else {
            return Ok(None);
        };

        if self.has_recent_unacknowledged(alert_type, &license.key, SWEEP_DEDUP_WINDOW_DAYS)? {
            return Ok(None);
        }
        let message = format!(
            "License {} ({}) capacity at {utilization:.0}% ({}/{}).{suffix}",
            license.key, license.software_name, license.current_usage, license.max_usage
        );
        let alert = Alert::new(alert_type, severity, message, Timestamp::now())
            .for_license(license.id)
            .in_region(license.region);
        self.store.save_alert(&alert).map_err(TrackerError::from)?;
        Ok(Some(alert))
    }

    /// Scheduled sweep over software versions flagged CRITICAL.
    pub fn run_software_version_sweep(&self, actor: &Actor) -> Result<SweepSummary, TrackerError> {
        let records = self
            .store
            .versions_with_status(VersionStatus::Critical)
            .map_err(TrackerError::from)?;

        let mut summary = SweepSummary {
            checked: records.len(),
            ..SweepSummary::default()
        };
        for record in &records {
            match self.version_alert_if_new(record) {
                Ok(Some(alert)) => {
                    summary.generated += 1;
                    summary.alert_ids.push(alert.id);
                }
                Ok(None) => {}
                Err(err) => {
                    tracing::warn!(device = %record.device_id, software = %record.software_name, error = %err, "software version sweep skipped record");
                }
            }
        }
        self.audit_sweep(actor, "software-version-sweep", &summary);
        Ok(summary)
    }

    fn version_alert_if_new(&self, record: &SoftwareVersion) -> Result<Option<Alert>, TrackerError> {
        let Some(device) = self
            .store
            .device(&record.device_id)
            .map_err(TrackerError::from)?
        else {
            tracing::warn!(device = %record.device_id, software = %record.software_name, "version record for unknown device");
            return Ok(None);
        };
        if self.has_recent_unacknowledged(
            AlertType::SoftwareVersionCritical,
            &device.device_code,
            SWEEP_DEDUP_WINDOW_DAYS,
        )? {
            return Ok(None);
        }
        let message = format!(
            "CRITICAL: Device {} running {} version {} is critically outdated. Latest version: {}",
            device.device_code,
            record.software_name,
            record.current_version,
            record.latest_version.as_deref().unwrap_or("unknown"),
        );
        let alert = Alert::new(
            AlertType::SoftwareVersionCritical,
            Severity::Critical,
            message,
            Timestamp::now(),
        )
        .for_device(device.id)
        .in_region(device.region);
        self.store.save_alert(&alert).map_err(TrackerError::from)?;
        Ok(Some(alert))
    }

    /// On-demand query: alerts for active licenses expiring within
    /// `horizon_days`.
    ///
    /// Uses the 1-day dedup window and returns both the alerts it
    /// created and the still-valid existing ones, so the caller sees
    /// the complete current picture. Audited only when it created
    /// something; a pure read leaves no trail.
    pub fn alerts_for_licenses_expiring_within(
        &self,
        horizon_days: i64,
        actor: &Actor,
    ) -> Result<Vec<Alert>, TrackerError> {
        let today = Utc::now().date_naive();
        let candidates = self
            .store
            .active_licenses_expiring_between(today, today + Duration::days(horizon_days))
            .map_err(TrackerError::from)?;

        let mut alerts = Vec::new();
        let mut created = Vec::new();
        for license in &candidates {
            let days = license.days_until_expiry(today);
            let alert_type = expiry_alert_type(days);
            let cutoff = Timestamp::now().minus_days(ON_DEMAND_DEDUP_WINDOW_DAYS);
            let existing: Vec<Alert> = self
                .store
                .alerts_matching(alert_type, &license.key)
                .map_err(TrackerError::from)?
                .into_iter()
                .filter(|a| !a.acknowledged && a.generated_since(cutoff))
                .collect();
            if existing.is_empty() {
                let alert = self.build_expiry_alert(license, days);
                self.store.save_alert(&alert).map_err(TrackerError::from)?;
                created.push(alert.id);
                alerts.push(alert);
            } else {
                alerts.extend(existing);
            }
        }

        if !created.is_empty() {
            self.audit.record(AuditEvent::new(
                actor,
                EntityType::Alert,
                "expiring-licenses-query",
                ltk_core::AuditAction::Create,
                json!({
                    "horizon_days": horizon_days,
                    "checked": candidates.len(),
                    "generated": created.len(),
                    "alert_ids": created.iter().map(ToString::to_string).collect::<Vec<_>>(),
                }),
            ));
        }
        Ok(alerts)
    }

    /// Acknowledge one alert.
    ///
    /// Not idempotent by design: re-acknowledging overwrites who and
    /// when, and the prior flag is captured in the audit payload.
    pub fn acknowledge(
        &self,
        id: &AlertId,
        acknowledged_by: &str,
        actor: &Actor,
    ) -> Result<Alert, TrackerError> {
        let mut alert = self
            .store
            .alert(id)
            .map_err(TrackerError::from)?
            .ok_or_else(|| TrackerError::not_found(EntityType::Alert, id))?;

        let previously_acknowledged = alert.acknowledge(acknowledged_by, Timestamp::now());
        self.store.save_alert(&alert).map_err(TrackerError::from)?;

        self.audit.record(AuditEvent::new(
            actor,
            EntityType::Alert,
            alert.id.to_string(),
            ltk_core::AuditAction::Acknowledge,
            json!({
                "acknowledged_by": acknowledged_by,
                "previously_acknowledged": previously_acknowledged,
                "alert_type": alert.alert_type.as_str(),
                "severity": alert.severity.as_str(),
            }),
        ));
        Ok(alert)
    }

    /// Acknowledge every unacknowledged alert generated within the
    /// last 90 days. Returns the number acknowledged.
    pub fn acknowledge_all(
        &self,
        acknowledged_by: &str,
        actor: &Actor,
    ) -> Result<usize, TrackerError> {
        let now = Timestamp::now();
        let cutoff = now.minus_days(ACKNOWLEDGE_ALL_WINDOW_DAYS);
        let pending = self
            .store
            .unacknowledged_since(cutoff)
            .map_err(TrackerError::from)?;

        let mut by_severity = [0usize; 4]; // critical, high, medium, low
        for mut alert in pending.iter().cloned() {
            alert.acknowledge(acknowledged_by, now);
            self.store.save_alert(&alert).map_err(TrackerError::from)?;
            match alert.severity {
                Severity::Critical => by_severity[0] += 1,
                Severity::High => by_severity[1] += 1,
                Severity::Medium => by_severity[2] += 1,
                Severity::Low => by_severity[3] += 1,
            }
        }

        self.audit.record(AuditEvent::new(
            actor,
            EntityType::Alert,
            "acknowledge-all",
            ltk_core::AuditAction::Acknowledge,
            json!({
                "acknowledged_by": acknowledged_by,
                "count": pending.len(),
                "critical": by_severity[0],
                "high": by_severity[1],
                "medium": by_severity[2],
                "low": by_severity[3],
            }),
        ));
        tracing::info!(count = pending.len(), "bulk acknowledge");
        Ok(pending.len())
    }

    /// Aggregate counts over all stored alerts.
    pub fn statistics(&self) -> Result<AlertStatistics, TrackerError> {
        let alerts = self.store.alerts().map_err(TrackerError::from)?;
        let mut stats = AlertStatistics {
            total: alerts.len(),
            ..AlertStatistics::default()
        };
        for alert in &alerts {
            if alert.acknowledged {
                stats.acknowledged += 1;
                continue;
            }
            stats.unacknowledged += 1;
            match alert.severity {
                Severity::Critical => stats.critical += 1,
                Severity::High => stats.high += 1,
                Severity::Medium => stats.medium += 1,
                Severity::Low => stats.low += 1,
            }
        }
        Ok(stats)
    }

    fn expiry_alert_if_new(
        &self,
        license: &License,
        window_days: i64,
    ) -> Result<Option<Alert>, TrackerError> {
        let today = Utc::now().date_naive();
        let days = license.days_until_expiry(today);
        let alert_type = expiry_alert_type(days);
        if self.has_recent_unacknowledged(alert_type, &license.key, window_days)? {
            return Ok(None);
        }
        let alert = self.build_expiry_alert(license, days);
        self.store.save_alert(&alert).map_err(TrackerError::from)?;
        Ok(Some(alert))
    }

    fn build_expiry_alert(&self, license: &License, days: i64) -> Alert {
        Alert::new(
            expiry_alert_type(days),
            classify_expiry_severity(days),
            expiry_message(license, days),
            Timestamp::now(),
        )
        .for_license(license.id)
        .in_region(license.region)
    }

    fn has_recent_unacknowledged(
        &self,
        alert_type: AlertType,
        keyword: &str,
        window_days: i64,
    ) -> Result<bool, TrackerError> {
        let cutoff = Timestamp::now().minus_days(window_days);
        let matches = self
            .store
            .alerts_matching(alert_type, keyword)
            .map_err(TrackerError::from)?;
        Ok(matches
            .iter()
            .any(|a| !a.acknowledged && a.generated_since(cutoff)))
    }

    fn audit_sweep(&self, actor: &Actor, sweep: &str, summary: &SweepSummary) {
        self.audit.record(AuditEvent::new(
            actor,
            EntityType::Alert,
            sweep,
            ltk_core::AuditAction::Create,
            json!({
                "checked": summary.checked,
                "generated": summary.generated,
                "alert_ids": summary
                    .alert_ids
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>(),
            }),
        ));
        tracing::info!(
            sweep,
            checked = summary.checked,
            generated = summary.generated,
            "alert sweep complete"
        );
    }
}

fn expiry_alert_type(days: i64) -> AlertType {
    if days <= 0 {
        AlertType::LicenseExpired
    } else {
        AlertType::LicenseExpiring
    }
}

fn expiry_message(license: &License, days: i64) -> String {
    if days <= 0 {
        format!(
            "EXPIRED: License {} ({}) expired {} days ago. Renewal required immediately!",
            license.software_name,
            license.key,
            -days
        )
    } else if days == 1 {
        format!(
            "URGENT: License {} ({}) expires TOMORROW!",
            license.software_name, license.key
        )
    } else {
        format!(
            "License {} ({}) expires in {} days. Valid until: {}",
            license.software_name, license.key, days, license.valid_to
        )
    }
}

// ─── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use ltk_audit::MemoryAuditTrail;
    use ltk_core::{
        AuditAction, Device, DeviceId, DeviceLifecycle, LicenseId, Region, SoftwareVersion,
        VersionRecordId,
    };
    use ltk_store::{
        AlertRepository, DeviceRepository, InMemoryStore, LicenseRepository,
        SoftwareVersionRepository,
    };

    fn license_expiring_in(days: i64) -> License {
        let today = Utc::now().date_naive();
        License {
            id: LicenseId::new(),
            key: "ADB-2026-001".to_string(),
            software_name: "Acrobat Pro".to_string(),
            vendor: None,
            max_usage: 10,
            current_usage: 0,
            valid_from: today - Duration::days(300),
            valid_to: today + Duration::days(days),
            active: true,
            region: Region::Chennai,
            cost: None,
        }
    }

    fn engine() -> (AlertEngine<InMemoryStore>, Arc<InMemoryStore>, MemoryAuditTrail) {
        let store = Arc::new(InMemoryStore::new());
        let trail = MemoryAuditTrail::new();
        let engine = AlertEngine::new(store.clone(), Arc::new(trail.clone()));
        (engine, store, trail)
    }

    fn scheduler() -> Actor {
        Actor::scheduler()
    }

    #[test]
    fn severity_boundaries() {
        assert_eq!(classify_expiry_severity(-10), Severity::Critical);
        assert_eq!(classify_expiry_severity(0), Severity::Critical);
        assert_eq!(classify_expiry_severity(1), Severity::Critical);
        assert_eq!(classify_expiry_severity(15), Severity::Critical);
        assert_eq!(classify_expiry_severity(16), Severity::High);
        assert_eq!(classify_expiry_severity(30), Severity::High);
        assert_eq!(classify_expiry_severity(31), Severity::Medium);
        assert_eq!(classify_expiry_severity(60), Severity::Medium);
        assert_eq!(classify_expiry_severity(61), Severity::Low);
    }

    #[test]
    fn expiry_messages() {
        let mut lic = license_expiring_in(20);
        lic.valid_to = NaiveDate::from_ymd_opt(2026, 12, 31).unwrap();
        assert_eq!(
            expiry_message(&lic, 20),
            "License Acrobat Pro (ADB-2026-001) expires in 20 days. Valid until: 2026-12-31"
        );
        assert_eq!(
            expiry_message(&lic, 1),
            "URGENT: License Acrobat Pro (ADB-2026-001) expires TOMORROW!"
        );
        assert_eq!(
            expiry_message(&lic, -3),
            "EXPIRED: License Acrobat Pro (ADB-2026-001) expired 3 days ago. Renewal required immediately!"
        );
        assert_eq!(
            expiry_message(&lic, 0),
            "EXPIRED: License Acrobat Pro (ADB-2026-001) expired 0 days ago. Renewal required immediately!"
        );
    }

    #[test]
    fn expiry_sweep_creates_graded_alert_once() {
        let (engine, store, trail) = engine();
        let lic = license_expiring_in(20);
        store.save_license(&lic).unwrap();

        let summary = engine.run_expiry_sweep(&scheduler()).unwrap();
        assert_eq!(summary.checked, 1);
        assert_eq!(summary.generated, 1);

        let alerts = store.alerts().unwrap();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].alert_type, AlertType::LicenseExpiring);
        assert_eq!(alerts[0].severity, Severity::High);
        assert_eq!(alerts[0].license_id, Some(lic.id));
        assert_eq!(alerts[0].region, Some(Region::Chennai));
        assert!(alerts[0].message.contains("ADB-2026-001"));

        // Second run within the dedup window is a no-op for alerts
        // but still leaves a summary trace.
        let summary = engine.run_expiry_sweep(&scheduler()).unwrap();
        assert_eq!(summary.generated, 0);
        assert_eq!(store.alerts().unwrap().len(), 1);
        assert_eq!(trail.events_by_action(AuditAction::Create).len(), 2);
    }

    #[test]
    fn expiry_sweep_uses_expired_type_on_the_boundary_day() {
        let (engine, store, _) = engine();
        let lic = license_expiring_in(0);
        store.save_license(&lic).unwrap();

        engine.run_expiry_sweep(&scheduler()).unwrap();
        let alerts = store.alerts().unwrap();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].alert_type, AlertType::LicenseExpired);
        assert_eq!(alerts[0].severity, Severity::Critical);
        assert!(alerts[0].message.starts_with("EXPIRED:"));
    }

    #[test]
    fn expiry_sweep_ignores_licenses_beyond_horizon_and_inactive() {
        let (engine, store, _) = engine();
        let far = license_expiring_in(91);
        store.save_license(&far).unwrap();
        let mut inactive = license_expiring_in(10);
        inactive.key = "ADB-2026-002".to_string();
        inactive.active = false;
        store.save_license(&inactive).unwrap();

        let summary = engine.run_expiry_sweep(&scheduler()).unwrap();
        assert_eq!(summary.checked, 0);
        assert_eq!(summary.generated, 0);
    }

    #[test]
    fn acknowledged_duplicate_does_not_suppress_a_new_alert() {
        let (engine, store, _) = engine();
        let lic = license_expiring_in(20);
        store.save_license(&lic).unwrap();

        engine.run_expiry_sweep(&scheduler()).unwrap();
        let alert = store.alerts().unwrap().remove(0);
        engine
            .acknowledge(&alert.id, "ops", &Actor::named("ops"))
            .unwrap();

        let summary = engine.run_expiry_sweep(&scheduler()).unwrap();
        assert_eq!(summary.generated, 1);
        assert_eq!(store.alerts().unwrap().len(), 2);
    }

    #[test]
    fn capacity_sweep_thresholds() {
        let (engine, store, _) = engine();
        let cases = [
            ("KEY-79", 79, None),
            ("KEY-80", 80, Some((AlertType::LicenseCapacityWarning, Severity::High))),
            ("KEY-89", 89, Some((AlertType::LicenseCapacityWarning, Severity::High))),
            ("KEY-90", 90, Some((AlertType::LicenseCapacityCritical, Severity::Critical))),
        ];
        for (key, usage, _) in &cases {
            let mut lic = license_expiring_in(300);
            lic.id = LicenseId::new();
            lic.key = (*key).to_string();
            lic.max_usage = 100;
            lic.current_usage = *usage;
            store.save_license(&lic).unwrap();
        }

        let summary = engine.run_capacity_sweep(&scheduler()).unwrap();
        assert_eq!(summary.checked, 4);
        assert_eq!(summary.generated, 3);

        for (key, _, expected) in &cases {
            let warning = store
                .alerts_matching(AlertType::LicenseCapacityWarning, key)
                .unwrap();
            let critical = store
                .alerts_matching(AlertType::LicenseCapacityCritical, key)
                .unwrap();
            match expected {
                None => {
                    assert!(warning.is_empty() && critical.is_empty(), "{key}");
                }
                Some((AlertType::LicenseCapacityWarning, severity)) => {
                    assert_eq!(warning.len(), 1, "{key}");
                    assert_eq!(warning[0].severity, *severity);
                    assert!(warning[0]
                        .message
                        .ends_with("Consider purchasing additional licenses."));
                }
                Some(_) => {
                    assert_eq!(critical.len(), 1, "{key}");
                    assert_eq!(critical[0].severity, Severity::Critical);
                    assert!(critical[0].message.ends_with("Immediate action required!"));
                }
            }
        }
    }

    #[test]
    fn capacity_sweep_counts_zero_seat_licenses_without_alerting_and_dedups() {
        let (engine, store, _) = engine();
        let mut zero = license_expiring_in(300);
        zero.max_usage = 0;
        store.save_license(&zero).unwrap();
        let mut full = license_expiring_in(300);
        full.id = LicenseId::new();
        full.key = "KEY-FULL".to_string();
        full.max_usage = 2;
        full.current_usage = 2;
        store.save_license(&full).unwrap();

        let summary = engine.run_capacity_sweep(&scheduler()).unwrap();
        assert_eq!(summary.checked, 2);
        assert_eq!(summary.generated, 1);
        let alerts = store.alerts().unwrap();
        // License key leads, software name in parentheses.
        assert_eq!(
            alerts[0].message,
            "License KEY-FULL (Acrobat Pro) capacity at 100% (2/2). Immediate action required!"
        );

        let summary = engine.run_capacity_sweep(&scheduler()).unwrap();
        assert_eq!(summary.generated, 0);
    }

    #[test]
    fn software_version_sweep_names_versions_and_dedups_by_device() {
        let (engine, store, _) = engine();
        let dev = Device {
            id: DeviceId::new(),
            device_code: "CHN-LT-0042".to_string(),
            model: "ThinkPad T14".to_string(),
            lifecycle: DeviceLifecycle::Active,
            region: Region::Mumbai,
            assigned_user: None,
        };
        store.save_device(&dev).unwrap();
        let record = SoftwareVersion {
            id: VersionRecordId::new(),
            device_id: dev.id,
            software_name: "OpenSSL".to_string(),
            current_version: "1.1.1".to_string(),
            latest_version: Some("3.0.13".to_string()),
            status: VersionStatus::Critical,
            last_checked: Timestamp::now(),
        };
        store.save_version(&record).unwrap();

        let summary = engine.run_software_version_sweep(&scheduler()).unwrap();
        assert_eq!(summary.generated, 1);
        let alerts = store.alerts().unwrap();
        assert_eq!(
            alerts[0].message,
            "CRITICAL: Device CHN-LT-0042 running OpenSSL version 1.1.1 is critically outdated. Latest version: 3.0.13"
        );
        assert_eq!(alerts[0].device_id, Some(dev.id));
        assert_eq!(alerts[0].region, Some(Region::Mumbai));

        let summary = engine.run_software_version_sweep(&scheduler()).unwrap();
        assert_eq!(summary.generated, 0);
    }

    #[test]
    fn software_version_sweep_skips_orphaned_records() {
        let (engine, store, _) = engine();
        let record = SoftwareVersion {
            id: VersionRecordId::new(),
            device_id: DeviceId::new(),
            software_name: "OpenSSL".to_string(),
            current_version: "1.1.1".to_string(),
            latest_version: None,
            status: VersionStatus::Critical,
            last_checked: Timestamp::now(),
        };
        store.save_version(&record).unwrap();

        let summary = engine.run_software_version_sweep(&scheduler()).unwrap();
        assert_eq!(summary.checked, 1);
        assert_eq!(summary.generated, 0);
    }

    #[test]
    fn on_demand_query_creates_then_reuses_within_a_day() {
        let (engine, store, trail) = engine();
        let lic = license_expiring_in(10);
        store.save_license(&lic).unwrap();

        let actor = Actor::named("admin");
        let first = engine
            .alerts_for_licenses_expiring_within(30, &actor)
            .unwrap();
        assert_eq!(first.len(), 1);
        assert_eq!(store.alerts().unwrap().len(), 1);
        assert_eq!(trail.events_by_action(AuditAction::Create).len(), 1);

        // Immediately repeated: the existing alert is returned, none
        // created, nothing audited.
        let second = engine
            .alerts_for_licenses_expiring_within(30, &actor)
            .unwrap();
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].id, first[0].id);
        assert_eq!(store.alerts().unwrap().len(), 1);
        assert_eq!(trail.events_by_action(AuditAction::Create).len(), 1);
    }

    #[test]
    fn acknowledge_captures_prior_state_in_audit() {
        let (engine, store, trail) = engine();
        let lic = license_expiring_in(10);
        store.save_license(&lic).unwrap();
        engine.run_expiry_sweep(&scheduler()).unwrap();
        let alert = store.alerts().unwrap().remove(0);

        let actor = Actor::named("ops");
        let first = engine.acknowledge(&alert.id, "ops", &actor).unwrap();
        assert!(first.acknowledged);

        let second = engine.acknowledge(&alert.id, "lead", &actor).unwrap();
        assert_eq!(second.acknowledged_by.as_deref(), Some("lead"));

        let events = trail.events_by_action(AuditAction::Acknowledge);
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].details["previously_acknowledged"], false);
        assert_eq!(events[1].details["previously_acknowledged"], true);
    }

    #[test]
    fn acknowledge_unknown_alert_is_not_found() {
        let (engine, _, _) = engine();
        let err = engine
            .acknowledge(&AlertId::new(), "ops", &Actor::named("ops"))
            .unwrap_err();
        assert!(matches!(err, TrackerError::NotFound { .. }));
    }

    #[test]
    fn acknowledge_all_honors_the_90_day_window() {
        let (engine, store, trail) = engine();
        let recent = Alert::new(
            AlertType::LicenseExpiring,
            Severity::High,
            "recent",
            Timestamp::now().minus_days(5),
        );
        let ancient = Alert::new(
            AlertType::LicenseExpiring,
            Severity::Low,
            "ancient",
            Timestamp::now().minus_days(120),
        );
        store.save_alert(&recent).unwrap();
        store.save_alert(&ancient).unwrap();

        let count = engine.acknowledge_all("ops", &Actor::named("ops")).unwrap();
        assert_eq!(count, 1);
        assert!(store.alert(&recent.id).unwrap().unwrap().acknowledged);
        assert!(!store.alert(&ancient.id).unwrap().unwrap().acknowledged);

        let events = trail.events_by_action(AuditAction::Acknowledge);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].details["count"], 1);
        assert_eq!(events[0].details["high"], 1);
        assert_eq!(events[0].details["low"], 0);
    }

    #[test]
    fn statistics_tallies_severity_over_unacknowledged_only() {
        let (engine, store, _) = engine();
        let mut acked = Alert::new(
            AlertType::LicenseExpired,
            Severity::Critical,
            "a",
            Timestamp::now(),
        );
        acked.acknowledge("ops", Timestamp::now());
        let open = Alert::new(
            AlertType::LicenseExpiring,
            Severity::Medium,
            "b",
            Timestamp::now(),
        );
        store.save_alert(&acked).unwrap();
        store.save_alert(&open).unwrap();

        let stats = engine.statistics().unwrap();
        assert_eq!(stats.total, 2);
        assert_eq!(stats.acknowledged, 1);
        assert_eq!(stats.unacknowledged, 1);
        // The acknowledged CRITICAL alert no longer counts.
        assert_eq!(stats.critical, 0);
        assert_eq!(stats.medium, 1);
        assert_eq!(stats.high, 0);
        assert_eq!(stats.low, 0);
    }
}
