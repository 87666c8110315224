//! Leader election packaged as a runnable program.

use crate::{elect_leader, ElectionConfig};
use fieldmesh_core::{AggregateProgram, RoundContext};
use fieldmesh_types::DeviceId;

/// Runs [`elect_leader`] every round using the inbox's edge weights as the
/// distance metric.
#[derive(Debug, Clone, Copy)]
pub struct LeaderElection {
    config: ElectionConfig,
}

impl LeaderElection {
    /// Create the program.
    pub fn new(config: ElectionConfig) -> Self {
        Self { config }
    }

    /// The election parameters.
    pub fn config(&self) -> &ElectionConfig {
        &self.config
    }
}

impl AggregateProgram for LeaderElection {
    type Output = Option<DeviceId>;

    fn run(&self, ctx: &mut RoundContext<'_>) -> Self::Output {
        let distances = ctx.neighbor_distances();
        elect_leader(ctx, self.config.area(), &distances)
    }
}
