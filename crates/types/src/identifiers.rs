//! Domain-specific identifier types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Device identifier.
///
/// Stable for the lifetime of the network and unique per device. Issuing
/// these is the embedder's job; this crate only relies on their total order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct DeviceId(pub u64);

impl DeviceId {
    /// Get the raw value.
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl From<u64> for DeviceId {
    fn from(value: u64) -> Self {
        DeviceId(value)
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Device({})", self.0)
    }
}
