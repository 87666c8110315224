//! Error types for the simulation harness.

use fieldmesh_core::RoundError;
use fieldmesh_types::DeviceId;
use thiserror::Error;

/// Invalid topology edits.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TopologyError {
    /// The device is not part of the topology.
    #[error("Unknown device: {0}")]
    UnknownDevice(DeviceId),

    /// A device cannot link to itself.
    #[error("Self loop on {0}")]
    SelfLoop(DeviceId),

    /// Edge weights must be non-negative numbers.
    #[error("Invalid weight {weight} between {a} and {b}")]
    InvalidWeight {
        a: DeviceId,
        b: DeviceId,
        weight: f64,
    },
}

/// Errors while running a simulation.
#[derive(Debug, Error)]
pub enum SimulationError {
    /// A device's round was aborted.
    #[error("Round failed on {device}: {source}")]
    Round {
        device: DeviceId,
        #[source]
        source: RoundError,
    },

    /// Invalid topology edit.
    #[error("Topology error: {0}")]
    Topology(#[from] TopologyError),

    /// Outputs kept changing until the round limit.
    #[error("Outputs did not stabilize within {rounds} rounds")]
    NotStable { rounds: u64 },
}
