//! Deterministic round harness.
//!
//! This crate runs an [`AggregateProgram`](fieldmesh_core::AggregateProgram)
//! on every device of a simulated network, round after round, so the
//! behavior of field programs can be checked in tests. Given the same seed,
//! it produces identical results every run.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                  SimulationRunner                       │
//! │                                                         │
//! │  ┌────────────────────────────────────────────────────┐ │
//! │  │     Topology (symmetric weighted links)            │ │
//! │  └────────────────────────┬───────────────────────────┘ │
//! │                           │ Inbox per device            │
//! │                           ▼                             │
//! │  ┌────────────────────────────────────────────────────┐ │
//! │  │     devices: IndexMap<DeviceId, Device>            │ │
//! │  │     Run once per round, seeded shuffled order      │ │
//! │  └────────────────────────┬───────────────────────────┘ │
//! │                           │                             │
//! │                           ▼                             │
//! │  ┌────────────────────────────────────────────────────┐ │
//! │  │     RoundReport: output per device                 │ │
//! │  └────────────────────────────────────────────────────┘ │
//! └─────────────────────────────────────────────────────────┘
//! ```

mod config;
mod error;
mod runner;
mod topology;

pub use config::SimulationConfig;
pub use error::{SimulationError, TopologyError};
pub use runner::{RoundReport, SimulationRunner, StabilityReport};
pub use topology::Topology;
