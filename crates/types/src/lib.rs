//! Core types for field-based leader election.
//!
//! Devices are named by [`DeviceId`]. Each device draws a [`Uid`] once and
//! keeps a round-persistent [`Lead`]: the leader it currently believes in,
//! or `Unknown` when none is electable.

mod identifiers;
mod lead;
mod uid;

pub use identifiers::DeviceId;
pub use lead::Lead;
pub use uid::{Uid, UidError};
