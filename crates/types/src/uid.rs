//! Symmetry-breaking unique identifiers.

use crate::DeviceId;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use thiserror::Error;

/// Errors constructing a [`Uid`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum UidError {
    /// The random fraction was outside `[0, 1)` or NaN.
    #[error("UID fraction must lie in [0, 1), got {0}")]
    FractionOutOfRange(f64),
}

/// A `(random fraction, device id)` pair.
///
/// The fraction breaks symmetry between devices; the device id keeps the
/// order strict when two fractions collide. Ordering is lexicographic:
/// fraction first, then device id.
///
/// Deserialization goes through [`Uid::new`], so an out-of-range fraction is
/// rejected there too.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(try_from = "RawUid")]
pub struct Uid {
    fraction: f64,
    device: DeviceId,
}

impl Uid {
    /// Create a UID, rejecting fractions outside `[0, 1)`.
    pub fn new(fraction: f64, device: DeviceId) -> Result<Self, UidError> {
        if !(0.0..1.0).contains(&fraction) {
            return Err(UidError::FractionOutOfRange(fraction));
        }
        // -0.0 would sort below 0.0 under the total order.
        let fraction = if fraction == 0.0 { 0.0 } else { fraction };
        Ok(Self { fraction, device })
    }

    /// Build a UID from 64 random bits.
    ///
    /// The top 53 bits become a fraction uniformly spread over `[0, 1)`, so
    /// this never fails.
    pub fn from_random_bits(bits: u64, device: DeviceId) -> Self {
        let fraction = (bits >> 11) as f64 * (1.0 / (1u64 << 53) as f64);
        Self { fraction, device }
    }

    /// The random component.
    pub fn fraction(&self) -> f64 {
        self.fraction
    }

    /// The device this UID belongs to.
    pub fn device(&self) -> DeviceId {
        self.device
    }
}

/// Unchecked wire shape of a [`Uid`].
#[derive(Deserialize)]
struct RawUid {
    fraction: f64,
    device: DeviceId,
}

impl TryFrom<RawUid> for Uid {
    type Error = UidError;

    fn try_from(raw: RawUid) -> Result<Self, Self::Error> {
        Uid::new(raw.fraction, raw.device)
    }
}

impl PartialEq for Uid {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Uid {}

impl PartialOrd for Uid {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Uid {
    fn cmp(&self, other: &Self) -> Ordering {
        self.fraction
            .total_cmp(&other.fraction)
            .then(self.device.cmp(&other.device))
    }
}

impl fmt::Display for Uid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Uid({:.6}, {})", self.fraction, self.device)
    }
}
