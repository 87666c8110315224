//! The leader a device currently believes in.

use crate::{DeviceId, Uid};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Round-persistent leader belief of a device.
///
/// `Unknown` means no electable leader is known. It still carries the id of
/// the device that produced it so that it sorts deterministically against
/// other `Unknown` values when neighbors compete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Lead {
    /// A concrete leader.
    Known(Uid),
    /// No electable leader; carries the producing device's id.
    Unknown(DeviceId),
}

impl Lead {
    /// The elected leader's device id, if any.
    pub fn leader(&self) -> Option<DeviceId> {
        match self {
            Lead::Known(uid) => Some(uid.device()),
            Lead::Unknown(_) => None,
        }
    }

    /// Whether this lead names exactly `uid`.
    pub fn is(&self, uid: &Uid) -> bool {
        matches!(self, Lead::Known(known) if known == uid)
    }

    /// Total order used when neighbors compete for leadership.
    ///
    /// `Unknown(d)` ranks as `(+inf, d)`, so it loses to every known UID and
    /// ties between unknowns resolve by device id.
    pub fn cmp_priority(&self, other: &Self) -> Ordering {
        let (fa, da) = self.rank();
        let (fb, db) = other.rank();
        fa.total_cmp(&fb).then(da.cmp(&db))
    }

    fn rank(&self) -> (f64, DeviceId) {
        match self {
            Lead::Known(uid) => (uid.fraction(), uid.device()),
            Lead::Unknown(device) => (f64::INFINITY, *device),
        }
    }
}

impl fmt::Display for Lead {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lead::Known(uid) => write!(f, "Known({})", uid),
            Lead::Unknown(device) => write!(f, "Unknown({})", device),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn known(fraction: f64, device: u64) -> Lead {
        Lead::Known(Uid::new(fraction, DeviceId(device)).unwrap())
    }

    #[test]
    fn test_known_beats_unknown() {
        let a = known(0.999, 5);
        let b = Lead::Unknown(DeviceId(0));
        assert_eq!(a.cmp_priority(&b), Ordering::Less);
        assert_eq!(b.cmp_priority(&a), Ordering::Greater);
    }

    #[test]
    fn test_unknowns_order_by_device() {
        let a = Lead::Unknown(DeviceId(1));
        let b = Lead::Unknown(DeviceId(2));
        assert_eq!(a.cmp_priority(&b), Ordering::Less);
        assert_eq!(a.cmp_priority(&a), Ordering::Equal);
    }

    #[test]
    fn test_priority_matches_uid_order() {
        let a = known(0.3, 9);
        let b = known(0.3, 4);
        assert_eq!(a.cmp_priority(&b), Ordering::Greater);
    }

    #[test]
    fn test_leader_and_is() {
        let uid = Uid::new(0.25, DeviceId(3)).unwrap();
        assert_eq!(Lead::Known(uid).leader(), Some(DeviceId(3)));
        assert_eq!(Lead::Unknown(DeviceId(3)).leader(), None);
        assert!(Lead::Known(uid).is(&uid));
        assert!(!Lead::Unknown(DeviceId(3)).is(&uid));
    }
}
