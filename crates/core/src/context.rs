//! Per-device, per-round execution context.

use crate::{AlignmentError, CallPath, Exports, Field, Inbox, Memory, RoundError, StateCell};
use fieldmesh_types::DeviceId;
use rand_chacha::ChaCha8Rng;
use std::collections::{BTreeMap, HashMap};
use tracing::warn;

/// Everything one device needs to evaluate one round.
///
/// The context carries an explicit call path. `remember` and `neighbors`
/// key their state and exports by that path, so alignment between devices
/// is a plain equality check on paths rather than hidden interception.
///
/// # Guarantees
///
/// - **Isolated**: reads only the device's own previous memory and the
///   exports in its [`Inbox`]
/// - **Deterministic**: same memory, inbox and RNG state give the same result
/// - **Transactional**: [`finish`](Self::finish) yields the next memory and
///   exports only if every opened scope was closed
pub struct RoundContext<'a> {
    device: DeviceId,
    round: u64,
    previous: &'a Memory,
    next: Memory,
    rng: &'a mut ChaCha8Rng,
    inbox: &'a Inbox,
    exports: Exports,
    path: CallPath,
    occurrences: HashMap<(CallPath, &'static str), u32>,
    misaligned: Option<CallPath>,
}

impl<'a> RoundContext<'a> {
    /// Start a round for `device`.
    pub fn new(
        device: DeviceId,
        round: u64,
        previous: &'a Memory,
        rng: &'a mut ChaCha8Rng,
        inbox: &'a Inbox,
    ) -> Self {
        Self {
            device,
            round,
            previous,
            next: Memory::new(),
            rng,
            inbox,
            exports: Exports::new(),
            path: CallPath::root(),
            occurrences: HashMap::new(),
            misaligned: None,
        }
    }

    /// The evaluating device.
    pub fn device_id(&self) -> DeviceId {
        self.device
    }

    /// Zero-based index of this round on this device.
    pub fn round(&self) -> u64 {
        self.round
    }

    /// Current call path.
    pub fn path(&self) -> &CallPath {
        &self.path
    }

    /// Neighbors delivered for this round.
    pub fn inbox(&self) -> &Inbox {
        self.inbox
    }

    /// The device's own seeded random source.
    pub fn rng(&mut self) -> &mut ChaCha8Rng {
        &mut *self.rng
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Alignment
    // ═══════════════════════════════════════════════════════════════════════

    fn next_path(&mut self, name: &'static str) -> CallPath {
        let counter = self
            .occurrences
            .entry((self.path.clone(), name))
            .or_insert(0);
        let occurrence = *counter;
        *counter += 1;
        self.path.child(name, occurrence)
    }

    /// Open a named scope below the current path.
    pub fn enter(&mut self, name: &'static str) {
        self.path = self.next_path(name);
    }

    /// Close the innermost scope.
    pub fn exit(&mut self) -> Result<(), AlignmentError> {
        match self.path.pop() {
            Some(_) => Ok(()),
            None => {
                self.misaligned.get_or_insert_with(CallPath::root);
                Err(AlignmentError::ExitAtRoot)
            }
        }
    }

    /// Run `f` inside a named scope.
    pub fn aligned<R>(&mut self, name: &'static str, f: impl FnOnce(&mut Self) -> R) -> R {
        let depth = self.path.depth();
        self.enter(name);
        let output = f(self);
        if self.path.depth() != depth + 1 && self.misaligned.is_none() {
            self.misaligned = Some(self.path.clone());
        }
        self.path.truncate(depth);
        output
    }

    /// Run one of two branches, each in its own scope.
    ///
    /// Devices that took `then` never exchange values with devices that took
    /// `otherwise`, and state of the branch not taken is dropped.
    pub fn branch<R>(
        &mut self,
        name: &'static str,
        condition: bool,
        then: impl FnOnce(&mut Self) -> R,
        otherwise: impl FnOnce(&mut Self) -> R,
    ) -> R {
        self.aligned(name, |ctx| {
            if condition {
                ctx.aligned("then", then)
            } else {
                ctx.aligned("else", otherwise)
            }
        })
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Round-persistent state
    // ═══════════════════════════════════════════════════════════════════════

    /// Read the value stored at this call site, seeding it from the device
    /// RNG the first time the site is reached.
    pub fn remember_with<T: Clone + Send + 'static>(
        &mut self,
        name: &'static str,
        seed: impl FnOnce(&mut ChaCha8Rng) -> T,
    ) -> StateCell<T> {
        let path = self.next_path(name);
        let stored = match self.previous.slot(&path) {
            Some(slot) => match slot.downcast_ref::<T>() {
                Some(value) => Some(value.clone()),
                None => {
                    warn!(
                        device = %self.device,
                        path = %path,
                        "Remembered slot holds another type, reseeding"
                    );
                    None
                }
            },
            None => None,
        };
        let value = match stored {
            Some(value) => value,
            None => seed(&mut *self.rng),
        };
        self.next.insert(path.clone(), value.clone());
        StateCell::new(path, value)
    }

    /// Read the value stored at this call site, or `seed()` the first time.
    pub fn remember<T: Clone + Send + 'static>(
        &mut self,
        name: &'static str,
        seed: impl FnOnce() -> T,
    ) -> StateCell<T> {
        self.remember_with(name, |_| seed())
    }

    /// Overwrite a remembered value from the next round on. Returns `value`.
    pub fn update<T: Clone + Send + 'static>(&mut self, cell: StateCell<T>, value: T) -> T {
        self.next.insert(cell.into_path(), value.clone());
        value
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Neighbor exchange
    // ═══════════════════════════════════════════════════════════════════════

    /// Export `local` at this call site and collect what each reachable
    /// neighbor exported at the same site in its latest completed round.
    ///
    /// The local device maps to `local`. Neighbors that never reached this
    /// site are absent.
    pub fn neighbors<T: Clone + Send + Sync + 'static>(
        &mut self,
        name: &'static str,
        local: T,
    ) -> Field<T> {
        let path = self.next_path(name);
        self.exports.insert(path.clone(), local.clone());

        let mut values = BTreeMap::new();
        for (id, neighbor) in self.inbox.neighbors() {
            if *id == self.device {
                continue;
            }
            let Some(exports) = &neighbor.exports else {
                continue;
            };
            if let Some(value) = exports.value(&path) {
                match value.downcast_ref::<T>() {
                    Some(value) => {
                        values.insert(*id, value.clone());
                    }
                    None => warn!(
                        device = %self.device,
                        neighbor = %id,
                        path = %path,
                        "Neighbor export holds another type, skipping"
                    ),
                }
            }
        }
        values.insert(self.device, local);
        Field::new(self.device, values)
    }

    /// Edge weights to reachable neighbors, with the local device at 0.
    pub fn neighbor_distances(&self) -> Field<f64> {
        let mut values: BTreeMap<DeviceId, f64> = self
            .inbox
            .neighbors()
            .filter(|(id, _)| **id != self.device)
            .map(|(id, neighbor)| (*id, neighbor.distance))
            .collect();
        values.insert(self.device, 0.0);
        Field::new(self.device, values)
    }

    /// Close the round, yielding the memory and exports to commit.
    pub fn finish(self) -> Result<(Memory, Exports), RoundError> {
        if let Some(path) = self.misaligned {
            return Err(RoundError::UnbalancedScopes { path });
        }
        if !self.path.is_root() {
            return Err(RoundError::UnbalancedScopes { path: self.path });
        }
        Ok((self.next, self.exports))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};
    use std::sync::Arc;
    use tracing_test::traced_test;

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(7)
    }

    #[test]
    fn test_remember_seeds_once() {
        let mut rng = rng();
        let inbox = Inbox::new();
        let memory = Memory::new();

        let mut ctx = RoundContext::new(DeviceId(1), 0, &memory, &mut rng, &inbox);
        let cell = ctx.remember("counter", || 10u32);
        assert_eq!(cell.value(), 10);
        ctx.update(cell, 11);
        let (memory, _) = ctx.finish().unwrap();

        let mut ctx = RoundContext::new(DeviceId(1), 1, &memory, &mut rng, &inbox);
        let cell = ctx.remember("counter", || 10u32);
        assert_eq!(cell.value(), 11);
    }

    #[test]
    fn test_remember_without_update_carries_value() {
        let mut rng = rng();
        let inbox = Inbox::new();
        let memory = Memory::new();

        let mut ctx = RoundContext::new(DeviceId(1), 0, &memory, &mut rng, &inbox);
        let drawn = ctx.remember_with("fraction", |rng| rng.gen::<f64>()).value();
        let (memory, _) = ctx.finish().unwrap();

        let mut ctx = RoundContext::new(DeviceId(1), 1, &memory, &mut rng, &inbox);
        let again = ctx.remember_with("fraction", |rng| rng.gen::<f64>()).value();
        assert_eq!(drawn, again);
    }

    #[test]
    fn test_repeated_call_sites_get_distinct_slots() {
        let mut rng = rng();
        let inbox = Inbox::new();
        let memory = Memory::new();

        let mut ctx = RoundContext::new(DeviceId(1), 0, &memory, &mut rng, &inbox);
        let a = ctx.remember("slot", || 1u8);
        let b = ctx.remember("slot", || 2u8);
        assert_ne!(a.path(), b.path());
        let (memory, _) = ctx.finish().unwrap();
        assert_eq!(memory.len(), 2);
    }

    #[test]
    fn test_branch_not_taken_drops_state() {
        let mut rng = rng();
        let inbox = Inbox::new();
        let memory = Memory::new();

        let mut ctx = RoundContext::new(DeviceId(1), 0, &memory, &mut rng, &inbox);
        ctx.branch(
            "choice",
            true,
            |ctx| ctx.remember("x", || 1u8).value(),
            |ctx| ctx.remember("y", || 2u8).value(),
        );
        let (memory, _) = ctx.finish().unwrap();
        assert_eq!(memory.len(), 1);

        let mut ctx = RoundContext::new(DeviceId(1), 1, &memory, &mut rng, &inbox);
        ctx.branch(
            "choice",
            false,
            |ctx| ctx.remember("x", || 1u8).value(),
            |ctx| ctx.remember("y", || 2u8).value(),
        );
        let (memory, _) = ctx.finish().unwrap();
        let then_path = CallPath::root()
            .child("choice", 0)
            .child("then", 0)
            .child("x", 0);
        assert!(!memory.contains(&then_path));
        assert_eq!(memory.len(), 1);
    }

    #[test]
    fn test_neighbors_only_sees_aligned_exports() {
        let mut rng = rng();
        let empty = Inbox::new();
        let memory = Memory::new();

        // Device 2 exports under the "then" branch only.
        let mut ctx = RoundContext::new(DeviceId(2), 0, &memory, &mut rng, &empty);
        ctx.branch(
            "choice",
            true,
            |ctx| ctx.neighbors("value", 5u32),
            |ctx| ctx.neighbors("value", 6u32),
        );
        let (_, exports) = ctx.finish().unwrap();
        let inbox = Inbox::new().with_neighbor(DeviceId(2), 1.0, Some(Arc::new(exports)));

        let mut ctx = RoundContext::new(DeviceId(1), 0, &memory, &mut rng, &inbox);
        let same = ctx.branch(
            "choice",
            true,
            |ctx| ctx.neighbors("value", 1u32),
            |ctx| ctx.neighbors("value", 1u32),
        );
        assert_eq!(same.get(&DeviceId(2)), Some(&5));
        assert_eq!(same.local(), Some(&1));

        let mut ctx = RoundContext::new(DeviceId(1), 0, &memory, &mut rng, &inbox);
        let other = ctx.branch(
            "choice",
            false,
            |ctx| ctx.neighbors("value", 1u32),
            |ctx| ctx.neighbors("value", 1u32),
        );
        assert_eq!(other.len(), 1);
        assert!(!other.contains(&DeviceId(2)));
    }

    #[test]
    fn test_neighbor_distances_include_self() {
        let mut rng = rng();
        let memory = Memory::new();
        let inbox = Inbox::new()
            .with_neighbor(DeviceId(2), 1.5, None)
            .with_neighbor(DeviceId(3), 2.5, None);

        let ctx = RoundContext::new(DeviceId(1), 0, &memory, &mut rng, &inbox);
        let distances = ctx.neighbor_distances();
        assert_eq!(distances.local(), Some(&0.0));
        assert_eq!(distances.get(&DeviceId(3)), Some(&2.5));
        assert_eq!(distances.len(), 3);
    }

    #[test]
    fn test_exit_at_root_fails_round() {
        let mut rng = rng();
        let inbox = Inbox::new();
        let memory = Memory::new();

        let mut ctx = RoundContext::new(DeviceId(1), 0, &memory, &mut rng, &inbox);
        assert_eq!(ctx.exit(), Err(AlignmentError::ExitAtRoot));
        assert!(ctx.finish().is_err());
    }

    #[test]
    fn test_unclosed_scope_fails_round() {
        let mut rng = rng();
        let inbox = Inbox::new();
        let memory = Memory::new();

        let mut ctx = RoundContext::new(DeviceId(1), 0, &memory, &mut rng, &inbox);
        ctx.enter("open");
        ctx.enter("nested");
        ctx.exit().unwrap();
        let err = ctx.finish().unwrap_err();
        assert!(matches!(err, RoundError::UnbalancedScopes { .. }));
    }

    #[traced_test]
    #[test]
    fn test_type_mismatch_reseeds() {
        let mut rng = rng();
        let inbox = Inbox::new();
        let memory = Memory::new();

        let mut ctx = RoundContext::new(DeviceId(1), 0, &memory, &mut rng, &inbox);
        ctx.remember("slot", || 3u8);
        let (memory, _) = ctx.finish().unwrap();

        let mut ctx = RoundContext::new(DeviceId(1), 1, &memory, &mut rng, &inbox);
        let cell = ctx.remember("slot", || String::from("fresh"));
        assert_eq!(cell.get(), "fresh");
        assert!(logs_contain("Remembered slot holds another type"));
    }
}
