//! Neighbor-indexed fields.

use fieldmesh_types::DeviceId;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::ops::Add;

/// A per-round snapshot mapping each reachable device (self included) to a
/// value.
///
/// Fields are immutable once built. Binary operations work on the devices
/// present in both operands.
#[derive(Debug, Clone, PartialEq)]
pub struct Field<T> {
    local: DeviceId,
    values: BTreeMap<DeviceId, T>,
}

impl<T> Field<T> {
    /// Create a field owned by `local`.
    pub fn new(local: DeviceId, values: BTreeMap<DeviceId, T>) -> Self {
        Self { local, values }
    }

    /// A field holding only the local value.
    pub fn from_local(local: DeviceId, value: T) -> Self {
        let mut values = BTreeMap::new();
        values.insert(local, value);
        Self { local, values }
    }

    /// The device this field was evaluated on.
    pub fn local_id(&self) -> DeviceId {
        self.local
    }

    /// The local device's own entry.
    pub fn local(&self) -> Option<&T> {
        self.values.get(&self.local)
    }

    /// Value for a device.
    pub fn get(&self, device: &DeviceId) -> Option<&T> {
        self.values.get(device)
    }

    /// Whether the device has an entry.
    pub fn contains(&self, device: &DeviceId) -> bool {
        self.values.contains_key(device)
    }

    /// Number of entries, self included.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the field has no entries.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Entries in device-id order.
    pub fn iter(&self) -> impl Iterator<Item = (&DeviceId, &T)> {
        self.values.iter()
    }

    /// Devices in the field.
    pub fn devices(&self) -> impl Iterator<Item = &DeviceId> {
        self.values.keys()
    }

    /// Apply `f` to every entry.
    pub fn map<U>(&self, f: impl Fn(&T) -> U) -> Field<U> {
        Field {
            local: self.local,
            values: self.values.iter().map(|(id, v)| (*id, f(v))).collect(),
        }
    }

    /// Combine co-indexed entries of two fields.
    pub fn zip_with<U, V>(&self, other: &Field<U>, f: impl Fn(&T, &U) -> V) -> Field<V> {
        let values = self
            .values
            .iter()
            .filter_map(|(id, a)| other.values.get(id).map(|b| (*id, f(a, b))))
            .collect();
        Field {
            local: self.local,
            values,
        }
    }
}

impl<T: Clone> Field<T> {
    /// Keep the entries whose co-indexed predicate is true.
    ///
    /// Devices missing from `predicate` are dropped.
    pub fn select(&self, predicate: &Field<bool>) -> Field<T> {
        let values = self
            .values
            .iter()
            .filter(|(id, _)| predicate.values.get(id).copied().unwrap_or(false))
            .map(|(id, v)| (*id, v.clone()))
            .collect();
        Field {
            local: self.local,
            values,
        }
    }

    /// The field without the local device's entry.
    pub fn without_self(&self) -> Field<T> {
        let values = self
            .values
            .iter()
            .filter(|(id, _)| **id != self.local)
            .map(|(id, v)| (*id, v.clone()))
            .collect();
        Field {
            local: self.local,
            values,
        }
    }

    /// Minimum under `cmp`, or `default` when the field is empty.
    ///
    /// Ties resolve to the entry with the lowest device id.
    pub fn min_by_or(&self, default: T, cmp: impl Fn(&T, &T) -> Ordering) -> T {
        self.values
            .values()
            .min_by(|a, b| cmp(a, b))
            .cloned()
            .unwrap_or(default)
    }
}

impl Add for &Field<f64> {
    type Output = Field<f64>;

    fn add(self, other: &Field<f64>) -> Field<f64> {
        self.zip_with(other, |a, b| a + b)
    }
}

/// Minimum of `field` under `cmp`, or `default` when it is empty.
pub fn min_with_default<T: Clone>(
    field: &Field<T>,
    default: T,
    cmp: impl Fn(&T, &T) -> Ordering,
) -> T {
    field.min_by_or(default, cmp)
}
