//! A device and its round-to-round lifecycle.

use crate::{AggregateProgram, Exports, Inbox, Memory, RoundContext, RoundError};
use fieldmesh_types::DeviceId;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::sync::Arc;
use tracing::trace;

/// One participant in the aggregate network.
///
/// Owns everything that survives between rounds: the remembered memory, the
/// device RNG, and the exports of its latest completed round. State lives
/// only as long as the device value; nothing is written to disk.
#[derive(Debug)]
pub struct Device {
    id: DeviceId,
    memory: Memory,
    rng: ChaCha8Rng,
    exports: Arc<Exports>,
    rounds: u64,
}

impl Device {
    /// Create a device whose random draws are seeded by `seed`.
    pub fn new(id: DeviceId, seed: u64) -> Self {
        Self {
            id,
            memory: Memory::new(),
            rng: ChaCha8Rng::seed_from_u64(seed),
            exports: Arc::new(Exports::new()),
            rounds: 0,
        }
    }

    /// The device id.
    pub fn id(&self) -> DeviceId {
        self.id
    }

    /// Number of completed rounds.
    pub fn rounds(&self) -> u64 {
        self.rounds
    }

    /// Memory carried into the next round.
    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    /// Exports of the latest completed round, shared with neighbors.
    pub fn exports(&self) -> Arc<Exports> {
        Arc::clone(&self.exports)
    }

    /// Whether the device has completed at least one round.
    pub fn has_run(&self) -> bool {
        self.rounds > 0
    }

    /// Evaluate one round of `program` against `inbox`.
    ///
    /// Memory, exports and the RNG state advance only when the round
    /// succeeds. A failed round leaves the device exactly as it was.
    pub fn run_round<P>(&mut self, program: &P, inbox: &Inbox) -> Result<P::Output, RoundError>
    where
        P: AggregateProgram + ?Sized,
    {
        let mut rng = self.rng.clone();
        let mut ctx = RoundContext::new(self.id, self.rounds, &self.memory, &mut rng, inbox);
        let output = program.run(&mut ctx);
        let (memory, exports) = ctx.finish()?;

        self.rng = rng;
        self.memory = memory;
        self.exports = Arc::new(exports);
        self.rounds += 1;

        trace!(
            device = %self.id,
            round = self.rounds,
            slots = self.memory.len(),
            exports = self.exports.len(),
            neighbors = inbox.len(),
            "Round committed"
        );

        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::program_fn;

    #[test]
    fn test_round_commits_memory_and_exports() {
        let mut device = Device::new(DeviceId(1), 42);
        let program = program_fn(|ctx| {
            let count = ctx.remember("count", || 0u32);
            let next = count.value() + 1;
            ctx.neighbors("count", next);
            ctx.update(count, next)
        });

        let inbox = Inbox::new();
        assert_eq!(device.run_round(&program, &inbox).unwrap(), 1);
        assert_eq!(device.run_round(&program, &inbox).unwrap(), 2);
        assert_eq!(device.rounds(), 2);
        assert!(device.has_run());
        assert_eq!(device.exports().len(), 1);
    }

    #[test]
    fn test_failed_round_commits_nothing() {
        let mut device = Device::new(DeviceId(1), 42);
        let counting = program_fn(|ctx| {
            let count = ctx.remember("count", || 0u32);
            let next = count.value() + 1;
            ctx.update(count, next)
        });
        let broken = program_fn(|ctx| {
            ctx.enter("never_closed");
            ctx.remember("count", || 100u32).value()
        });

        let inbox = Inbox::new();
        device.run_round(&counting, &inbox).unwrap();
        assert!(device.run_round(&broken, &inbox).is_err());
        assert_eq!(device.rounds(), 1);
        assert_eq!(device.run_round(&counting, &inbox).unwrap(), 2);
    }

    #[test]
    fn test_failed_round_keeps_rng_state() {
        use rand::Rng;

        let draw = program_fn(|ctx| ctx.remember_with("draw", |rng| rng.gen::<u64>()).value());
        let broken = program_fn(|ctx| {
            ctx.enter("never_closed");
            ctx.rng().gen::<u64>()
        });

        let inbox = Inbox::new();
        let mut clean = Device::new(DeviceId(1), 5);
        let mut interrupted = Device::new(DeviceId(1), 5);
        assert!(interrupted.run_round(&broken, &inbox).is_err());
        assert_eq!(
            interrupted.run_round(&draw, &inbox).unwrap(),
            clean.run_round(&draw, &inbox).unwrap()
        );
    }

    #[test]
    fn test_same_seed_same_draws() {
        use rand::Rng;

        let draw = program_fn(|ctx| ctx.remember_with("draw", |rng| rng.gen::<f64>()).value());
        let mut a = Device::new(DeviceId(1), 9);
        let mut b = Device::new(DeviceId(2), 9);
        let inbox = Inbox::new();
        assert_eq!(
            a.run_round(&draw, &inbox).unwrap(),
            b.run_round(&draw, &inbox).unwrap()
        );
    }
}
