//! Round-persistent per-device state.

use crate::CallPath;
use std::any::Any;
use std::collections::HashMap;
use std::fmt;

/// Values a device carries from one round to the next, keyed by the call
/// path of the `remember` that produced them.
///
/// A fresh `Memory` is built every round from the slots that round actually
/// reached, so state belonging to a branch the device no longer executes is
/// dropped.
#[derive(Default)]
pub struct Memory {
    slots: HashMap<CallPath, Box<dyn Any + Send>>,
}

impl Memory {
    /// Create an empty memory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored slots.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Whether a slot exists at `path`.
    pub fn contains(&self, path: &CallPath) -> bool {
        self.slots.contains_key(path)
    }

    /// Typed read of a slot. `None` when missing or of another type.
    pub fn get<T: 'static>(&self, path: &CallPath) -> Option<&T> {
        self.slots.get(path).and_then(|slot| slot.downcast_ref())
    }

    pub(crate) fn slot(&self, path: &CallPath) -> Option<&(dyn Any + Send)> {
        self.slots.get(path).map(|slot| slot.as_ref())
    }

    pub(crate) fn insert<T: Send + 'static>(&mut self, path: CallPath, value: T) {
        self.slots.insert(path, Box::new(value));
    }
}

impl fmt::Debug for Memory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut paths: Vec<_> = self.slots.keys().collect();
        paths.sort();
        f.debug_struct("Memory").field("slots", &paths).finish()
    }
}

/// Handle to a remembered value for the current round.
///
/// Reading through the cell is pure; writing goes through
/// [`RoundContext::update`](crate::RoundContext::update) and takes effect
/// from the next round.
#[derive(Debug, Clone)]
pub struct StateCell<T> {
    path: CallPath,
    value: T,
}

impl<T> StateCell<T> {
    pub(crate) fn new(path: CallPath, value: T) -> Self {
        Self { path, value }
    }

    /// The value this round started with.
    pub fn get(&self) -> &T {
        &self.value
    }

    /// Where the value is stored.
    pub fn path(&self) -> &CallPath {
        &self.path
    }

    pub(crate) fn into_path(self) -> CallPath {
        self.path
    }
}

impl<T: Copy> StateCell<T> {
    /// Copy of the value this round started with.
    pub fn value(&self) -> T {
        self.value
    }
}
