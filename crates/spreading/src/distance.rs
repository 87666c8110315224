//! Shortest distance to the nearest source.

use fieldmesh_core::{Field, RoundContext};
use tracing::trace;

/// Estimate of the shortest-path distance from the local device to the
/// nearest device for which `is_source` currently holds.
///
/// Each round a source reports 0 and every other device reports the minimum,
/// over its neighbors, of the neighbor's previous estimate plus the edge
/// weight from `distances`. The local entry of `distances` is ignored.
///
/// A device returns `f64::INFINITY` only until it first hears a finite
/// estimate. When a group of devices later loses its last source, they keep
/// feeding each other's estimates back: the values stay finite and grow by
/// roughly one edge weight per round, without ever reaching infinity. Use
/// [`distance_to_within`] when a lost source must read as infinity.
///
/// The result is never negative as long as the weights are not.
pub fn distance_to(ctx: &mut RoundContext<'_>, is_source: bool, distances: &Field<f64>) -> f64 {
    distance_to_within(ctx, is_source, distances, f64::INFINITY)
}

/// [`distance_to`] with sources farther than `horizon` treated as
/// unreachable.
///
/// Any estimate above `horizon` is stored and exported as `f64::INFINITY`.
/// Estimates of devices that lost their last source rise past the horizon
/// in finite time, so they settle on infinity instead of growing forever.
/// Estimates at or below `horizon` are exactly those of [`distance_to`].
pub fn distance_to_within(
    ctx: &mut RoundContext<'_>,
    is_source: bool,
    distances: &Field<f64>,
    horizon: f64,
) -> f64 {
    ctx.aligned("distance_to", |ctx| {
        let estimate = ctx.remember("estimate", || f64::INFINITY);
        let previous = estimate.value();
        let reported = ctx.neighbors("estimate", previous).without_self();

        let nearest = if is_source {
            0.0
        } else {
            (&reported + distances)
                .iter()
                .map(|(_, through)| *through)
                .fold(f64::INFINITY, f64::min)
        };
        let next = if nearest > horizon {
            f64::INFINITY
        } else {
            nearest
        };

        if next != previous {
            trace!(
                device = %ctx.device_id(),
                previous,
                next,
                is_source,
                "Distance estimate changed"
            );
        }

        ctx.update(estimate, next)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use fieldmesh_core::{program_fn, Device, Inbox};
    use fieldmesh_types::DeviceId;
    use tracing_test::traced_test;

    #[traced_test]
    #[test]
    fn test_source_is_zero() {
        let mut device = Device::new(DeviceId(0), 1);
        let program = program_fn(|ctx| {
            let distances = ctx.neighbor_distances();
            distance_to(ctx, true, &distances)
        });
        assert_eq!(device.run_round(&program, &Inbox::new()).unwrap(), 0.0);
        assert!(logs_contain("Distance estimate changed"));
    }

    #[test]
    fn test_isolated_non_source_is_infinite() {
        let mut device = Device::new(DeviceId(0), 1);
        let program = program_fn(|ctx| {
            let distances = ctx.neighbor_distances();
            distance_to(ctx, false, &distances)
        });
        let inbox = Inbox::new();
        for _ in 0..3 {
            assert_eq!(device.run_round(&program, &inbox).unwrap(), f64::INFINITY);
        }
    }

    #[test]
    fn test_adds_edge_weight_to_neighbor_estimate() {
        let sourcing = program_fn(|ctx| {
            let distances = ctx.neighbor_distances();
            let is_source = ctx.device_id() == DeviceId(0);
            distance_to(ctx, is_source, &distances)
        });

        let mut source = Device::new(DeviceId(0), 1);
        let mut follower = Device::new(DeviceId(1), 2);

        // Neighbors see the estimate a device started its round with, so the
        // source's 0 becomes visible after its second round.
        source.run_round(&sourcing, &Inbox::new()).unwrap();
        source.run_round(&sourcing, &Inbox::new()).unwrap();

        let inbox = Inbox::new().with_neighbor(DeviceId(0), 2.5, Some(source.exports()));
        assert_eq!(follower.run_round(&sourcing, &inbox).unwrap(), 2.5);
    }

    #[test]
    fn test_source_beyond_horizon_is_infinite() {
        let bounded = program_fn(|ctx| {
            let distances = ctx.neighbor_distances();
            let is_source = ctx.device_id() == DeviceId(0);
            distance_to_within(ctx, is_source, &distances, 3.0)
        });

        let mut source = Device::new(DeviceId(0), 1);
        source.run_round(&bounded, &Inbox::new()).unwrap();
        assert_eq!(source.run_round(&bounded, &Inbox::new()).unwrap(), 0.0);

        let near = Inbox::new().with_neighbor(DeviceId(0), 3.0, Some(source.exports()));
        let far = Inbox::new().with_neighbor(DeviceId(0), 3.5, Some(source.exports()));
        let mut follower = Device::new(DeviceId(1), 2);
        assert_eq!(follower.run_round(&bounded, &near).unwrap(), 3.0);
        assert_eq!(follower.run_round(&bounded, &far).unwrap(), f64::INFINITY);
    }

    #[test]
    fn test_ignores_neighbors_without_exports() {
        let mut device = Device::new(DeviceId(1), 1);
        let program = program_fn(|ctx| {
            let distances = ctx.neighbor_distances();
            distance_to(ctx, false, &distances)
        });
        let silent = Device::new(DeviceId(0), 2);
        let inbox = Inbox::new()
            .with_neighbor(DeviceId(0), 1.0, None)
            .with_neighbor(DeviceId(2), 1.0, Some(silent.exports()));
        assert_eq!(device.run_round(&program, &inbox).unwrap(), f64::INFINITY);
    }
}
