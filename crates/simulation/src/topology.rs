//! Weighted neighbor graph for simulated networks.

use crate::TopologyError;
use fieldmesh_types::DeviceId;
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, BinaryHeap};

/// Devices and the symmetric, non-negatively weighted links between them.
#[derive(Debug, Clone, Default)]
pub struct Topology {
    /// device -> (neighbor -> edge weight). Every edge is stored both ways.
    edges: BTreeMap<DeviceId, BTreeMap<DeviceId, f64>>,
}

impl Topology {
    /// Create an empty topology.
    pub fn new() -> Self {
        Self::default()
    }

    /// Devices `0..count` connected in a line, `spacing` apart.
    pub fn line(count: u64, spacing: f64) -> Result<Self, TopologyError> {
        let mut topology = Self::new();
        for id in 0..count {
            topology.add_device(DeviceId(id));
        }
        for id in 1..count {
            topology.connect(DeviceId(id - 1), DeviceId(id), spacing)?;
        }
        Ok(topology)
    }

    /// A `width × height` grid with 4-neighbor links, `spacing` apart.
    ///
    /// Device ids are assigned row by row: `id = row * width + column`.
    pub fn grid(width: u64, height: u64, spacing: f64) -> Result<Self, TopologyError> {
        let mut topology = Self::new();
        for id in 0..width * height {
            topology.add_device(DeviceId(id));
        }
        for row in 0..height {
            for column in 0..width {
                let id = row * width + column;
                if column + 1 < width {
                    topology.connect(DeviceId(id), DeviceId(id + 1), spacing)?;
                }
                if row + 1 < height {
                    topology.connect(DeviceId(id), DeviceId(id + width), spacing)?;
                }
            }
        }
        Ok(topology)
    }

    /// Add an isolated device. Returns false if it already existed.
    pub fn add_device(&mut self, device: DeviceId) -> bool {
        if self.edges.contains_key(&device) {
            return false;
        }
        self.edges.insert(device, BTreeMap::new());
        true
    }

    /// Remove a device and all of its links. Returns false if unknown.
    pub fn remove_device(&mut self, device: DeviceId) -> bool {
        let Some(links) = self.edges.remove(&device) else {
            return false;
        };
        for neighbor in links.keys() {
            if let Some(back) = self.edges.get_mut(neighbor) {
                back.remove(&device);
            }
        }
        true
    }

    /// Link two devices with a symmetric edge, replacing any existing weight.
    pub fn connect(&mut self, a: DeviceId, b: DeviceId, weight: f64) -> Result<(), TopologyError> {
        if a == b {
            return Err(TopologyError::SelfLoop(a));
        }
        if weight.is_nan() || weight < 0.0 {
            return Err(TopologyError::InvalidWeight { a, b, weight });
        }
        for device in [a, b] {
            if !self.edges.contains_key(&device) {
                return Err(TopologyError::UnknownDevice(device));
            }
        }
        if let Some(links) = self.edges.get_mut(&a) {
            links.insert(b, weight);
        }
        if let Some(links) = self.edges.get_mut(&b) {
            links.insert(a, weight);
        }
        Ok(())
    }

    /// Remove the link between two devices. Returns false if there was none.
    pub fn disconnect(&mut self, a: DeviceId, b: DeviceId) -> bool {
        let removed = self
            .edges
            .get_mut(&a)
            .and_then(|links| links.remove(&b))
            .is_some();
        if let Some(links) = self.edges.get_mut(&b) {
            links.remove(&a);
        }
        removed
    }

    /// Whether the device is part of the topology.
    pub fn contains(&self, device: &DeviceId) -> bool {
        self.edges.contains_key(device)
    }

    /// Number of devices.
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    /// Whether there are no devices.
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// All devices in id order.
    pub fn devices(&self) -> impl Iterator<Item = DeviceId> + '_ {
        self.edges.keys().copied()
    }

    /// Neighbors of a device with their edge weights.
    pub fn neighbors(&self, device: &DeviceId) -> impl Iterator<Item = (DeviceId, f64)> + '_ {
        self.edges
            .get(device)
            .into_iter()
            .flat_map(|links| links.iter().map(|(id, weight)| (*id, *weight)))
    }

    /// Edge weight between two devices, if linked.
    pub fn weight(&self, a: &DeviceId, b: &DeviceId) -> Option<f64> {
        self.edges.get(a).and_then(|links| links.get(b)).copied()
    }

    /// Connected components, each as a set of devices.
    pub fn components(&self) -> Vec<BTreeSet<DeviceId>> {
        let mut seen = BTreeSet::new();
        let mut components = Vec::new();
        for start in self.devices() {
            if seen.contains(&start) {
                continue;
            }
            let mut component = BTreeSet::new();
            let mut stack = vec![start];
            while let Some(device) = stack.pop() {
                if !seen.insert(device) {
                    continue;
                }
                component.insert(device);
                stack.extend(self.neighbors(&device).map(|(id, _)| id));
            }
            components.push(component);
        }
        components
    }

    /// Exact shortest-path distance from every device to its nearest
    /// source (Dijkstra). Unreachable devices map to `f64::INFINITY`.
    pub fn shortest_distances(&self, sources: &[DeviceId]) -> BTreeMap<DeviceId, f64> {
        let mut best: BTreeMap<DeviceId, f64> =
            self.devices().map(|id| (id, f64::INFINITY)).collect();
        let mut queue = BinaryHeap::new();

        for source in sources {
            if let Some(distance) = best.get_mut(source) {
                *distance = 0.0;
                queue.push(Frontier {
                    distance: 0.0,
                    device: *source,
                });
            }
        }

        while let Some(Frontier { distance, device }) = queue.pop() {
            if distance > best.get(&device).copied().unwrap_or(f64::INFINITY) {
                continue;
            }
            for (neighbor, weight) in self.neighbors(&device) {
                let through = distance + weight;
                if let Some(current) = best.get_mut(&neighbor) {
                    if through < *current {
                        *current = through;
                        queue.push(Frontier {
                            distance: through,
                            device: neighbor,
                        });
                    }
                }
            }
        }

        best
    }
}

/// Min-heap entry for Dijkstra.
#[derive(Debug, Clone, Copy)]
struct Frontier {
    distance: f64,
    device: DeviceId,
}

impl PartialEq for Frontier {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Frontier {}

impl PartialOrd for Frontier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Frontier {
    // Reversed so BinaryHeap pops the smallest distance first.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .distance
            .total_cmp(&self.distance)
            .then(other.device.cmp(&self.device))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_distances() {
        let topology = Topology::line(4, 2.0).unwrap();
        let distances = topology.shortest_distances(&[DeviceId(0)]);
        assert_eq!(distances[&DeviceId(0)], 0.0);
        assert_eq!(distances[&DeviceId(3)], 6.0);
    }

    #[test]
    fn test_grid_links() {
        let topology = Topology::grid(3, 2, 1.0).unwrap();
        assert_eq!(topology.len(), 6);
        assert_eq!(topology.weight(&DeviceId(0), &DeviceId(1)), Some(1.0));
        assert_eq!(topology.weight(&DeviceId(0), &DeviceId(3)), Some(1.0));
        assert_eq!(topology.weight(&DeviceId(2), &DeviceId(3)), None);
        let distances = topology.shortest_distances(&[DeviceId(0)]);
        assert_eq!(distances[&DeviceId(5)], 3.0);
    }

    #[test]
    fn test_shortest_path_prefers_cheaper_detour() {
        let mut topology = Topology::line(3, 1.0).unwrap();
        topology.connect(DeviceId(0), DeviceId(2), 5.0).unwrap();
        let distances = topology.shortest_distances(&[DeviceId(0)]);
        assert_eq!(distances[&DeviceId(2)], 2.0);
    }

    #[test]
    fn test_unreachable_is_infinite() {
        let mut topology = Topology::line(2, 1.0).unwrap();
        topology.add_device(DeviceId(9));
        let distances = topology.shortest_distances(&[DeviceId(0)]);
        assert_eq!(distances[&DeviceId(9)], f64::INFINITY);
        assert_eq!(topology.components().len(), 2);
    }

    #[test]
    fn test_connect_rejects_bad_edges() {
        let mut topology = Topology::line(2, 1.0).unwrap();
        assert_eq!(
            topology.connect(DeviceId(0), DeviceId(0), 1.0),
            Err(TopologyError::SelfLoop(DeviceId(0)))
        );
        assert!(matches!(
            topology.connect(DeviceId(0), DeviceId(1), -1.0),
            Err(TopologyError::InvalidWeight { .. })
        ));
        assert_eq!(
            topology.connect(DeviceId(0), DeviceId(7), 1.0),
            Err(TopologyError::UnknownDevice(DeviceId(7)))
        );
    }

    #[test]
    fn test_remove_device_drops_links() {
        let mut topology = Topology::line(3, 1.0).unwrap();
        assert!(topology.remove_device(DeviceId(1)));
        assert_eq!(topology.neighbors(&DeviceId(0)).count(), 0);
        assert!(!topology.disconnect(DeviceId(0), DeviceId(2)));
        assert_eq!(topology.components().len(), 2);
    }
}
