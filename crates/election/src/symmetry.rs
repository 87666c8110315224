//! Symmetry breaking: turn unique ids into a stable set of region leaders.

use crate::competition::distance_competition;
use fieldmesh_core::{Field, RoundContext};
use fieldmesh_spreading::distance_to_within;
use fieldmesh_types::{Lead, Uid};
use tracing::debug;

/// One round of leader election for a device with identity `uid`.
///
/// The device remembers its lead across rounds, starting from itself. It
/// measures its potential as the distance to the nearest device that
/// currently leads itself, then runs the competition on that potential.
/// Potentials beyond `area` read as infinite; they fall in the recover band
/// either way.
pub fn break_symmetry(
    ctx: &mut RoundContext<'_>,
    uid: Uid,
    area: f64,
    distances: &Field<f64>,
) -> Lead {
    ctx.aligned("break_symmetry", |ctx| {
        let lead = ctx.remember("lead", || Lead::Known(uid));
        let current = lead.value();
        let potential = distance_to_within(ctx, current.is(&uid), distances, area);
        let next = distance_competition(ctx, potential, area, uid, current, distances);

        if next != current {
            debug!(
                device = %ctx.device_id(),
                from = %current,
                to = %next,
                potential,
                "Lead changed"
            );
        }

        ctx.update(lead, next)
    })
}
