//! # Error Types — Structured Error Hierarchy
//!
//! Defines the error taxonomy used throughout the license tracker. All
//! errors use `thiserror` for derive-based `Display` and `Error`
//! implementations.
//!
//! ## Taxonomy
//!
//! - [`TrackerError::NotFound`] — a referenced record is absent. Maps to
//!   a 404-equivalent at the boundary.
//! - [`TrackerError::Validation`] — a business rule rejected the
//!   operation. Always carries a machine-readable [`ValidationCode`]
//!   plus a human-readable message.
//! - [`TrackerError::Store`] — an infrastructure failure surfaced by the
//!   entity store. Logged, audited as `UNEXPECTED_ERROR`, and re-raised
//!   unchanged so the boundary layer can map it generically.
//!
//! NotFound and Validation failures are deterministic and non-retryable;
//! callers receive the precise reason. Audit-logging failures never
//! appear here — they are strictly local to the audit sink.

use thiserror::Error;

use crate::domain::EntityType;

/// Machine-readable reason codes for business-rule rejections.
///
/// These are the stable identifiers recorded in audit payloads and
/// matched on by callers; the human message may change freely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidationCode {
    /// The license is flagged inactive.
    InactiveLicense,
    /// Today is at or past the license's `valid_to` date.
    ExpiredLicense,
    /// Today is before the license's `valid_from` date.
    NotYetValid,
    /// An active assignment already exists for this (device, license) pair.
    AlreadyAssigned,
    /// The license has no remaining capacity.
    CapacityExceeded,
    /// The assignment was already revoked. Revocation is terminal.
    AlreadyRevoked,
}

impl ValidationCode {
    /// The canonical wire/audit identifier for this code.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InactiveLicense => "INACTIVE_LICENSE",
            Self::ExpiredLicense => "EXPIRED_LICENSE",
            Self::NotYetValid => "NOT_YET_VALID",
            Self::AlreadyAssigned => "ALREADY_ASSIGNED",
            Self::CapacityExceeded => "CAPACITY_EXCEEDED",
            Self::AlreadyRevoked => "ALREADY_REVOKED",
        }
    }
}

impl std::fmt::Display for ValidationCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Top-level error type for the license tracker engines.
#[derive(Error, Debug)]
pub enum TrackerError {
    /// A referenced record does not exist.
    #[error("{entity} not found with id: {id}")]
    NotFound {
        /// The kind of record that was looked up.
        entity: EntityType,
        /// The identifier that missed.
        id: String,
    },

    /// A business rule rejected the operation.
    #[error("{message}")]
    Validation {
        /// Stable reason code.
        code: ValidationCode,
        /// Human-readable explanation.
        message: String,
    },

    /// The entity store failed in an unexpected way.
    #[error("storage error: {0}")]
    Store(String),
}

impl TrackerError {
    /// Convenience constructor for [`TrackerError::NotFound`].
    pub fn not_found(entity: EntityType, id: impl std::fmt::Display) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Convenience constructor for [`TrackerError::Validation`].
    pub fn validation(code: ValidationCode, message: impl Into<String>) -> Self {
        Self::Validation {
            code,
            message: message.into(),
        }
    }

    /// The validation code, if this is a validation failure.
    pub fn validation_code(&self) -> Option<ValidationCode> {
        match self {
            Self::Validation { code, .. } => Some(*code),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_code_as_str_all_variants() {
        assert_eq!(ValidationCode::InactiveLicense.as_str(), "INACTIVE_LICENSE");
        assert_eq!(ValidationCode::ExpiredLicense.as_str(), "EXPIRED_LICENSE");
        assert_eq!(ValidationCode::NotYetValid.as_str(), "NOT_YET_VALID");
        assert_eq!(ValidationCode::AlreadyAssigned.as_str(), "ALREADY_ASSIGNED");
        assert_eq!(
            ValidationCode::CapacityExceeded.as_str(),
            "CAPACITY_EXCEEDED"
        );
        assert_eq!(ValidationCode::AlreadyRevoked.as_str(), "ALREADY_REVOKED");
    }

    #[test]
    fn not_found_display() {
        let err = TrackerError::not_found(EntityType::Device, "device:123");
        assert_eq!(err.to_string(), "DEVICE not found with id: device:123");
    }

    #[test]
    fn validation_carries_code() {
        let err = TrackerError::validation(
            ValidationCode::CapacityExceeded,
            "License usage limit reached",
        );
        assert_eq!(
            err.validation_code(),
            Some(ValidationCode::CapacityExceeded)
        );
        assert_eq!(err.to_string(), "License usage limit reached");
    }

    #[test]
    fn store_error_has_no_validation_code() {
        let err = TrackerError::Store("connection reset".to_string());
        assert_eq!(err.validation_code(), None);
    }
}
