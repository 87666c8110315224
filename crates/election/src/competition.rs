//! Distance competition: the per-round leader transition rule.
//!
//! Each round a device places its potential (distance to the nearest
//! self-declared leader) into one of three bands derived from the area:
//!
//! ```text
//!   0 ─────────── area/2 ─────────── area ─────────── ∞
//!   │   Compete    │      Buffer       │    Recover
//!   │ [0, area/2)  │  [area/2, area]   │  (area, ∞]
//! ```
//!
//! - **Compete**: adopt the best lead among neighbors that are themselves
//!   comfortably inside a region.
//! - **Buffer**: claim no leader. The band keeps neighboring regions from
//!   pulling boundary devices back and forth.
//! - **Recover**: too far from any leader; declare itself.

use fieldmesh_core::{min_with_default, Field, RoundContext};
use fieldmesh_types::{Lead, Uid};

/// Which transition applies for a given potential.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompetitionBand {
    /// `potential < area / 2`.
    Compete,
    /// `area / 2 <= potential <= area`.
    Buffer,
    /// `potential > area`.
    Recover,
}

impl CompetitionBand {
    /// Classify a potential. Checked in order Recover, Buffer, Compete; both
    /// edges of the buffer band are inclusive.
    pub fn classify(potential: f64, area: f64) -> Self {
        if potential > area {
            CompetitionBand::Recover
        } else if potential >= 0.5 * area {
            CompetitionBand::Buffer
        } else {
            CompetitionBand::Compete
        }
    }
}

/// Compute this round's lead.
///
/// Leads and potentials are exchanged with neighbors every round, whatever
/// band the device is in, so neighbors always find them at the same call
/// path.
pub fn distance_competition(
    ctx: &mut RoundContext<'_>,
    potential: f64,
    area: f64,
    uid: Uid,
    lead: Lead,
    distances: &Field<f64>,
) -> Lead {
    ctx.aligned("distance_competition", |ctx| {
        let unknown = Lead::Unknown(uid.device());
        let neighbor_leads = ctx.neighbors("lead", lead);
        let neighbor_potentials = ctx.neighbors("potential", potential);

        let half_area = 0.5 * area;
        let inside = (&neighbor_potentials + distances).map(|through| *through < half_area);
        let best = min_with_default(&neighbor_leads.select(&inside), unknown, Lead::cmp_priority);

        match CompetitionBand::classify(potential, area) {
            CompetitionBand::Recover => Lead::Known(uid),
            CompetitionBand::Buffer => unknown,
            CompetitionBand::Compete => best,
        }
    })
}
