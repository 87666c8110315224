//! Spreading blocks.
//!
//! Spreading computations propagate information outward from source devices
//! round by round. They are self-stabilizing: from any memory contents they
//! converge to the correct values once the topology and the set of sources
//! stop changing.

mod distance;

pub use distance::{distance_to, distance_to_within};
