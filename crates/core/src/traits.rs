//! Core trait for aggregate programs.

use crate::RoundContext;

/// A program every device evaluates once per round.
///
/// This is the core abstraction of the execution model. Programs are:
///
/// - **Synchronous**: No async, no `.await`
/// - **Local**: Read only the device's own memory and its neighbors' exports
/// - **Re-entrant**: The same program value is shared by every device
///
/// # Example
///
/// ```ignore
/// impl AggregateProgram for LeaderElection {
///     type Output = Option<DeviceId>;
///
///     fn run(&self, ctx: &mut RoundContext<'_>) -> Self::Output {
///         let distances = ctx.neighbor_distances();
///         elect_leader(ctx, self.config.area(), &distances)
///     }
/// }
/// ```
pub trait AggregateProgram {
    /// What one round produces for the embedding application.
    type Output;

    /// Evaluate one round on the device behind `ctx`.
    ///
    /// # Guarantees
    ///
    /// - **Synchronous**: This method never blocks or awaits
    /// - **Deterministic**: Same memory, inbox and RNG state give the same output
    /// - **No I/O**: Values reach neighbors only through the context's exports
    fn run(&self, ctx: &mut RoundContext<'_>) -> Self::Output;
}

impl<F, O> AggregateProgram for F
where
    F: Fn(&mut RoundContext<'_>) -> O,
{
    type Output = O;

    fn run(&self, ctx: &mut RoundContext<'_>) -> O {
        self(ctx)
    }
}

/// Pin a closure's signature so it is usable as an [`AggregateProgram`].
pub fn program_fn<F, O>(f: F) -> F
where
    F: Fn(&mut RoundContext<'_>) -> O,
{
    f
}
