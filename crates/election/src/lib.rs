//! Self-stabilizing leader election.
//!
//! Every device draws a random UID once and remembers it. Devices then
//! compete by distance: a device follows the smallest UID among neighbors
//! that are well inside some leader's region, declares itself when it is
//! farther than `area` from every leader, and claims no leader in the
//! buffer band between the two. The network settles into regions of radius
//! at most `area`, each with exactly one leader, and recovers on its own
//! after any change to the topology or to device state.
//!
//! # Architecture
//!
//! ```text
//! elect_leader
//!   ├─ random_uid ............ remembered (fraction, device)
//!   └─ break_symmetry
//!        ├─ remember lead .... starts as Known(own uid)
//!        ├─ distance_to_within  potential: distance to self-leaders
//!        └─ distance_competition
//!             ├─ neighbors lead
//!             ├─ neighbors potential
//!             └─ band: Compete / Buffer / Recover
//! ```
//!
//! Each box runs in its own aligned scope, so devices exchange values only
//! with neighbors evaluating the same step.

mod competition;
mod config;
mod program;
mod symmetry;
mod uid;

pub use competition::{distance_competition, CompetitionBand};
pub use config::{ConfigError, ElectionConfig};
pub use program::LeaderElection;
pub use symmetry::break_symmetry;
pub use uid::random_uid;

use fieldmesh_core::{Field, RoundContext};
use fieldmesh_types::DeviceId;

/// The leader this device currently follows, or `None` while it sits in the
/// buffer band between regions.
///
/// `area` is used as given. An `area` of 0 is accepted; an isolated device
/// then alternates between `None` and itself from round to round.
pub fn elect_leader(
    ctx: &mut RoundContext<'_>,
    area: f64,
    distances: &Field<f64>,
) -> Option<DeviceId> {
    ctx.aligned("elect_leader", |ctx| {
        let uid = random_uid(ctx);
        break_symmetry(ctx, uid, area, distances).leader()
    })
}
