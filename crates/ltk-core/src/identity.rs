//! # Identifiers — UUID Newtypes
//!
//! One newtype per entity so a `DeviceId` can never be passed where a
//! `LicenseId` is expected. Display output is prefixed with the entity
//! kind, which is what audit payloads and log lines show.
//!
//! The `Device` record additionally carries an externally visible
//! `device_code` string (asset tag); that is plain data on the record,
//! not an identifier type.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! entity_id {
    ($(#[$doc:meta])* $name:ident, $prefix:literal) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(Uuid);

        impl $name {
            /// Create a new random identifier.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Create an identifier from an existing UUID.
            pub fn from_uuid(id: Uuid) -> Self {
                Self(id)
            }

            /// Access the underlying UUID.
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, concat!($prefix, ":{}"), self.0)
            }
        }
    };
}

entity_id!(
    /// Unique identifier for a [`crate::License`].
    LicenseId,
    "license"
);

entity_id!(
    /// Unique identifier for a [`crate::Device`].
    DeviceId,
    "device"
);

entity_id!(
    /// Unique identifier for an [`crate::Assignment`].
    AssignmentId,
    "assignment"
);

entity_id!(
    /// Unique identifier for an [`crate::Alert`].
    AlertId,
    "alert"
);

entity_id!(
    /// Unique identifier for a [`crate::SoftwareVersion`] record.
    VersionRecordId,
    "swversion"
);
