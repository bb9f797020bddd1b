//! # ltk-core — License Tracker Core Types
//!
//! Foundational types shared by every crate in the workspace:
//!
//! - [`error`] — the [`TrackerError`] taxonomy and [`ValidationCode`]s.
//! - [`temporal`] — the UTC-only, seconds-truncated [`Timestamp`].
//! - [`identity`] — UUID newtype identifiers per entity.
//! - [`domain`] — closed enums (severity, alert type, lifecycle,
//!   regions, audit vocabulary) and the [`Actor`] performing operations.
//! - [`money`] — validated decimal amounts for license costs.
//! - [`license`], [`device`], [`assignment`], [`alert`], [`software`] —
//!   the entity records themselves.
//!
//! This crate holds data and per-record rules only. Multi-record
//! workflows (assignment validation, cascade revocation, alert sweeps)
//! live in `ltk-engine`; persistence ports live in `ltk-store`.

pub mod alert;
pub mod assignment;
pub mod device;
pub mod domain;
pub mod error;
pub mod identity;
pub mod license;
pub mod money;
pub mod software;
pub mod temporal;

pub use alert::Alert;
pub use assignment::Assignment;
pub use device::Device;
pub use domain::{
    Actor, AlertType, AuditAction, DeviceLifecycle, EntityType, Region, Severity, VersionStatus,
};
pub use error::{TrackerError, ValidationCode};
pub use identity::{AlertId, AssignmentId, DeviceId, LicenseId, VersionRecordId};
pub use license::{License, LicenseValidity};
pub use money::{Money, MoneyError};
pub use software::SoftwareVersion;
pub use temporal::Timestamp;
