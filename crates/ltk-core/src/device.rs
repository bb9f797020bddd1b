//! Device records and lifecycle transitions.
//!
//! The lifecycle enum itself lives in [`crate::domain`]; this module
//! carries the record plus the transition helper the assignment engine
//! hooks into for cascade revocation.

use serde::{Deserialize, Serialize};

use crate::domain::{DeviceLifecycle, Region};
use crate::identity::DeviceId;

/// A managed device that can hold license assignments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Device {
    /// Unique identifier.
    pub id: DeviceId,
    /// Externally visible asset tag (unique), e.g. `CHN-LT-0042`.
    pub device_code: String,
    /// Device model or description.
    pub model: String,
    /// Current lifecycle state.
    pub lifecycle: DeviceLifecycle,
    /// Region the device is deployed in.
    pub region: Region,
    /// Person or team the device is issued to, if any.
    pub assigned_user: Option<String>,
}

impl Device {
    /// Move the device to a new lifecycle state, returning the
    /// previous one.
    ///
    /// All transitions are permitted; the caller decides whether the
    /// change warrants cascade revocation (it does when the new state
    /// is end-of-life and differs from the previous one).
    pub fn transition(&mut self, next: DeviceLifecycle) -> DeviceLifecycle {
        std::mem::replace(&mut self.lifecycle, next)
    }
}
