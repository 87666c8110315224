//! Values a device shares with its neighbors.

use crate::CallPath;
use fieldmesh_types::DeviceId;
use std::any::Any;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

/// Everything one device exported during one round, keyed by call path.
#[derive(Clone, Default)]
pub struct Exports {
    values: HashMap<CallPath, Arc<dyn Any + Send + Sync>>,
}

impl Exports {
    /// Create an empty export set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of exported values.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether nothing was exported.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Typed read. `None` when missing or of another type.
    pub fn get<T: 'static>(&self, path: &CallPath) -> Option<&T> {
        self.values.get(path).and_then(|value| value.downcast_ref())
    }

    /// Whether a value was exported at `path`.
    pub fn contains(&self, path: &CallPath) -> bool {
        self.values.contains_key(path)
    }

    pub(crate) fn value(&self, path: &CallPath) -> Option<&(dyn Any + Send + Sync)> {
        self.values.get(path).map(|value| value.as_ref())
    }

    pub(crate) fn insert<T: Send + Sync + 'static>(&mut self, path: CallPath, value: T) {
        self.values.insert(path, Arc::new(value));
    }
}

impl fmt::Debug for Exports {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut paths: Vec<_> = self.values.keys().collect();
        paths.sort();
        f.debug_struct("Exports").field("paths", &paths).finish()
    }
}

/// A reachable neighbor as seen by the local device this round.
#[derive(Debug, Clone)]
pub struct Neighbor {
    /// Edge weight to the neighbor.
    pub distance: f64,
    /// The neighbor's latest completed-round exports, if it has run yet.
    pub exports: Option<Arc<Exports>>,
}

/// What the runtime delivers to a device before a round: its currently
/// reachable neighbors with their edge weights and latest exports.
#[derive(Debug, Clone, Default)]
pub struct Inbox {
    neighbors: BTreeMap<DeviceId, Neighbor>,
}

impl Inbox {
    /// Create an empty inbox (an isolated device).
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a neighbor.
    pub fn insert(&mut self, device: DeviceId, distance: f64, exports: Option<Arc<Exports>>) {
        self.neighbors.insert(device, Neighbor { distance, exports });
    }

    /// Builder form of [`Inbox::insert`].
    pub fn with_neighbor(
        mut self,
        device: DeviceId,
        distance: f64,
        exports: Option<Arc<Exports>>,
    ) -> Self {
        self.insert(device, distance, exports);
        self
    }

    /// Reachable neighbors in device-id order.
    pub fn neighbors(&self) -> impl Iterator<Item = (&DeviceId, &Neighbor)> {
        self.neighbors.iter()
    }

    /// Look up a neighbor.
    pub fn get(&self, device: &DeviceId) -> Option<&Neighbor> {
        self.neighbors.get(device)
    }

    /// Number of reachable neighbors.
    pub fn len(&self) -> usize {
        self.neighbors.len()
    }

    /// Whether the device is isolated.
    pub fn is_empty(&self) -> bool {
        self.neighbors.is_empty()
    }
}
