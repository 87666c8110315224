//! Round-by-round simulation runner.

use crate::{SimulationConfig, SimulationError, Topology};
use fieldmesh_core::{AggregateProgram, Device, Inbox};
use fieldmesh_types::DeviceId;
use indexmap::IndexMap;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// Outputs of every device for one round.
#[derive(Debug, Clone, PartialEq)]
pub struct RoundReport<O> {
    /// One-based round number.
    pub round: u64,
    /// Output per device.
    pub outputs: BTreeMap<DeviceId, O>,
}

/// Result of a run that reached stable outputs.
#[derive(Debug, Clone, PartialEq)]
pub struct StabilityReport<O> {
    /// Round at which stability was declared.
    pub round: u64,
    /// The stable output per device.
    pub outputs: BTreeMap<DeviceId, O>,
}

/// Deterministic round harness.
///
/// Each round every device runs once, in a seeded shuffled order. A device
/// reads the latest exports of its current neighbors, which may come from
/// this round or the previous one depending on who ran first. Given the same
/// seed and the same edits, every run is identical.
pub struct SimulationRunner {
    config: SimulationConfig,
    topology: Topology,
    devices: IndexMap<DeviceId, Device>,
    rng: ChaCha8Rng,
    round: u64,
}

impl SimulationRunner {
    /// Create a runner with one fresh device per topology device.
    pub fn new(config: SimulationConfig, topology: Topology) -> Self {
        let rng = ChaCha8Rng::seed_from_u64(config.seed);
        let mut runner = Self {
            config,
            topology: Topology::new(),
            devices: IndexMap::new(),
            rng,
            round: 0,
        };
        for id in topology.devices() {
            runner.spawn(id);
        }
        runner.topology = topology;
        runner
    }

    fn spawn(&mut self, id: DeviceId) {
        let seed = self.rng.gen::<u64>();
        self.devices.insert(id, Device::new(id, seed));
    }

    /// The current topology.
    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    /// Number of completed rounds.
    pub fn round(&self) -> u64 {
        self.round
    }

    /// Look up a device.
    pub fn device(&self, id: &DeviceId) -> Option<&Device> {
        self.devices.get(id)
    }

    /// Device ids in insertion order.
    pub fn device_ids(&self) -> impl Iterator<Item = DeviceId> + '_ {
        self.devices.keys().copied()
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Churn
    // ═══════════════════════════════════════════════════════════════════════

    /// Add a fresh, unlinked device. Returns false if it already existed.
    pub fn add_device(&mut self, id: DeviceId) -> bool {
        if !self.topology.add_device(id) {
            return false;
        }
        self.spawn(id);
        debug!(device = %id, round = self.round, "Device joined");
        true
    }

    /// Remove a device and its links. Its state is discarded.
    pub fn remove_device(&mut self, id: DeviceId) -> bool {
        if !self.topology.remove_device(id) {
            return false;
        }
        self.devices.shift_remove(&id);
        debug!(device = %id, round = self.round, "Device left");
        true
    }

    /// Link two devices.
    pub fn connect(&mut self, a: DeviceId, b: DeviceId, weight: f64) -> Result<(), SimulationError> {
        self.topology.connect(a, b, weight)?;
        Ok(())
    }

    /// Unlink two devices.
    pub fn disconnect(&mut self, a: DeviceId, b: DeviceId) -> bool {
        self.topology.disconnect(a, b)
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Execution
    // ═══════════════════════════════════════════════════════════════════════

    fn inbox_for(&self, id: &DeviceId) -> Inbox {
        let mut inbox = Inbox::new();
        for (neighbor, weight) in self.topology.neighbors(id) {
            let exports = self
                .devices
                .get(&neighbor)
                .filter(|device| device.has_run())
                .map(Device::exports);
            inbox.insert(neighbor, weight, exports);
        }
        inbox
    }

    /// Run one round on every device.
    pub fn step<P>(&mut self, program: &P) -> Result<RoundReport<P::Output>, SimulationError>
    where
        P: AggregateProgram + ?Sized,
    {
        let mut order: Vec<DeviceId> = self.devices.keys().copied().collect();
        if self.config.shuffle_order {
            order.shuffle(&mut self.rng);
        }

        let mut outputs = BTreeMap::new();
        for id in order {
            let inbox = self.inbox_for(&id);
            let Some(device) = self.devices.get_mut(&id) else {
                continue;
            };
            let output = device
                .run_round(program, &inbox)
                .map_err(|source| SimulationError::Round { device: id, source })?;
            outputs.insert(id, output);
        }

        self.round += 1;
        Ok(RoundReport {
            round: self.round,
            outputs,
        })
    }

    /// Run `rounds` rounds, returning every report.
    pub fn run_rounds<P>(
        &mut self,
        program: &P,
        rounds: u64,
    ) -> Result<Vec<RoundReport<P::Output>>, SimulationError>
    where
        P: AggregateProgram + ?Sized,
    {
        (0..rounds).map(|_| self.step(program)).collect()
    }

    /// Run until every device's output stays unchanged for
    /// `quiet_rounds` consecutive rounds.
    pub fn run_until_stable<P>(
        &mut self,
        program: &P,
    ) -> Result<StabilityReport<P::Output>, SimulationError>
    where
        P: AggregateProgram + ?Sized,
        P::Output: PartialEq,
    {
        let mut previous: Option<BTreeMap<DeviceId, P::Output>> = None;
        let mut quiet = 0;

        for _ in 0..self.config.max_rounds {
            let report = self.step(program)?;
            if previous.as_ref() == Some(&report.outputs) {
                quiet += 1;
            } else {
                quiet = 0;
            }
            previous = Some(report.outputs);

            if quiet >= self.config.quiet_rounds {
                info!(
                    round = self.round,
                    devices = self.devices.len(),
                    "Outputs stabilized"
                );
                return Ok(StabilityReport {
                    round: self.round,
                    outputs: previous.unwrap_or_default(),
                });
            }
        }

        warn!(
            max_rounds = self.config.max_rounds,
            "Outputs did not stabilize"
        );
        Err(SimulationError::NotStable {
            rounds: self.config.max_rounds,
        })
    }
}
