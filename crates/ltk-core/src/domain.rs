//! # Domain Enums
//!
//! The closed vocabularies of the tracker: alert severity and type,
//! device lifecycle, software-version status, region, audit actions,
//! and entity kinds. Each carries the SCREAMING_SNAKE wire form via
//! `as_str()`, which is what audit payloads and log lines record.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ─── Severity ────────────────────────────────────────────────────────

/// Alert severity grades, most to least urgent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    /// Expired or expiring within 15 days; capacity at 90% or above.
    Critical,
    /// Expiring in 16–30 days; capacity at 80–89%.
    High,
    /// Expiring in 31–60 days.
    Medium,
    /// Expiring in more than 60 days.
    Low,
}

impl Severity {
    /// All severities, most urgent first.
    pub fn all() -> &'static [Severity] {
        &[Self::Critical, Self::High, Self::Medium, Self::Low]
    }

    /// The canonical wire identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Critical => "CRITICAL",
            Self::High => "HIGH",
            Self::Medium => "MEDIUM",
            Self::Low => "LOW",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─── Alert Type ──────────────────────────────────────────────────────

/// The kinds of alert the alert engine can raise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AlertType {
    /// A license's `valid_to` date is approaching.
    LicenseExpiring,
    /// A license's `valid_to` date has passed.
    LicenseExpired,
    /// License utilization reached the 80% warning threshold.
    LicenseCapacityWarning,
    /// License utilization reached the 90% critical threshold.
    LicenseCapacityCritical,
    /// A device runs a software version flagged critically outdated.
    SoftwareVersionCritical,
}

impl AlertType {
    /// The canonical wire identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LicenseExpiring => "LICENSE_EXPIRING",
            Self::LicenseExpired => "LICENSE_EXPIRED",
            Self::LicenseCapacityWarning => "LICENSE_CAPACITY_WARNING",
            Self::LicenseCapacityCritical => "LICENSE_CAPACITY_CRITICAL",
            Self::SoftwareVersionCritical => "SOFTWARE_VERSION_CRITICAL",
        }
    }
}

impl std::fmt::Display for AlertType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─── Device Lifecycle ────────────────────────────────────────────────

/// Operational lifecycle of a device.
///
/// Entering [`Decommissioned`](DeviceLifecycle::Decommissioned) or
/// [`Obsolete`](DeviceLifecycle::Obsolete) triggers cascade revocation
/// of the device's active assignments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeviceLifecycle {
    /// Deployed and in service.
    Active,
    /// Purchased, not yet deployed.
    InStock,
    /// Temporarily out of service for repair.
    Maintenance,
    /// Permanently removed from service.
    Decommissioned,
    /// Past end-of-support; scheduled for disposal.
    Obsolete,
}

impl DeviceLifecycle {
    /// Whether this state ends the device's service life.
    ///
    /// End-of-life devices cannot hold license assignments.
    pub fn is_end_of_life(&self) -> bool {
        matches!(self, Self::Decommissioned | Self::Obsolete)
    }

    /// The canonical wire identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "ACTIVE",
            Self::InStock => "IN_STOCK",
            Self::Maintenance => "MAINTENANCE",
            Self::Decommissioned => "DECOMMISSIONED",
            Self::Obsolete => "OBSOLETE",
        }
    }
}

impl std::fmt::Display for DeviceLifecycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─── Software Version Status ─────────────────────────────────────────

/// Freshness classification of a device's installed software.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VersionStatus {
    /// Running the latest known version.
    UpToDate,
    /// Behind the latest version, no known exposure.
    Outdated,
    /// Critically behind; the alert engine raises on these.
    Critical,
    /// Not yet checked.
    Unknown,
}

impl VersionStatus {
    /// The canonical wire identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UpToDate => "UP_TO_DATE",
            Self::Outdated => "OUTDATED",
            Self::Critical => "CRITICAL",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl std::fmt::Display for VersionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─── Region ──────────────────────────────────────────────────────────

/// Deployment regions licenses and devices are scoped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Region {
    Chennai,
    Bangalore,
    Hyderabad,
    Mumbai,
    Delhi,
    Kolkata,
}

impl Region {
    /// The canonical wire identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Chennai => "CHENNAI",
            Self::Bangalore => "BANGALORE",
            Self::Hyderabad => "HYDERABAD",
            Self::Mumbai => "MUMBAI",
            Self::Delhi => "DELHI",
            Self::Kolkata => "KOLKATA",
        }
    }
}

impl std::fmt::Display for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─── Audit Vocabulary ────────────────────────────────────────────────

/// The actions recorded in the audit trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuditAction {
    Create,
    Update,
    Delete,
    Assign,
    Unassign,
    Activate,
    Deactivate,
    Acknowledge,
}

impl AuditAction {
    /// The canonical wire identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "CREATE",
            Self::Update => "UPDATE",
            Self::Delete => "DELETE",
            Self::Assign => "ASSIGN",
            Self::Unassign => "UNASSIGN",
            Self::Activate => "ACTIVATE",
            Self::Deactivate => "DEACTIVATE",
            Self::Acknowledge => "ACKNOWLEDGE",
        }
    }
}

impl std::fmt::Display for AuditAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The kinds of record audit events attach to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityType {
    License,
    Device,
    Assignment,
    Alert,
    SoftwareVersion,
}

impl EntityType {
    /// The canonical wire identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::License => "LICENSE",
            Self::Device => "DEVICE",
            Self::Assignment => "ASSIGNMENT",
            Self::Alert => "ALERT",
            Self::SoftwareVersion => "SOFTWARE_VERSION",
        }
    }
}

impl std::fmt::Display for EntityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─── Actor ───────────────────────────────────────────────────────────

/// The identity performing an engine operation.
///
/// Passed explicitly into every engine call — there is no ambient
/// security context. Scheduled runs use [`Actor::scheduler()`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// User id, if the actor is a known user.
    pub id: Option<Uuid>,
    /// Display name recorded in audit events.
    pub name: String,
}

impl Actor {
    /// An actor for a named user.
    pub fn user(id: Uuid, name: impl Into<String>) -> Self {
        Self {
            id: Some(id),
            name: name.into(),
        }
    }

    /// A named actor without a user id (e.g., an API client).
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
        }
    }

    /// The periodic scheduler actor.
    pub fn scheduler() -> Self {
        Self::named("SYSTEM_SCHEDULER")
    }
}
