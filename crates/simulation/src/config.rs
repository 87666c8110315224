//! Configuration for simulation runs.

/// Configuration for a simulation run.
#[derive(Clone, Debug)]
pub struct SimulationConfig {
    /// Random seed for deterministic simulation.
    ///
    /// Drives both the evaluation order within a round and the per-device
    /// RNG seeds.
    pub seed: u64,

    /// Whether devices run in a freshly shuffled order every round.
    ///
    /// When disabled, devices run in insertion order.
    pub shuffle_order: bool,

    /// Upper bound on rounds for [`run_until_stable`].
    ///
    /// [`run_until_stable`]: crate::SimulationRunner::run_until_stable
    pub max_rounds: u64,

    /// Consecutive rounds with unchanged outputs required to call a run
    /// stable.
    pub quiet_rounds: u64,
}

impl SimulationConfig {
    /// Create a configuration with the given seed.
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            shuffle_order: true,
            max_rounds: 1_000,
            quiet_rounds: 10,
        }
    }

    /// Set the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Enable or disable per-round order shuffling.
    pub fn with_shuffle_order(mut self, shuffle_order: bool) -> Self {
        self.shuffle_order = shuffle_order;
        self
    }

    /// Set the round limit for stability runs.
    pub fn with_max_rounds(mut self, max_rounds: u64) -> Self {
        self.max_rounds = max_rounds;
        self
    }

    /// Set how many unchanged rounds count as stable.
    pub fn with_quiet_rounds(mut self, quiet_rounds: u64) -> Self {
        self.quiet_rounds = quiet_rounds;
        self
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self::new(12345)
    }
}
