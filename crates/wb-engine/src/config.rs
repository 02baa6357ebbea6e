/// Configuration for an engine instance.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// RNG seed for deterministic teleport target choice.
    pub seed: u64,
    /// Maximum recursion depth for push resolution.
    ///
    /// A safety valve against pathological self-referential board chains,
    /// not a normal termination path: exceeding it refuses the push. The
    /// default of 127 bounds the deepest supported board nesting.
    pub max_push_depth: u32,
    /// Maximum event log size (oldest events dropped when exceeded).
    /// 0 = unlimited.
    pub max_events: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            max_push_depth: 127,
            max_events: 0,
        }
    }
}

impl EngineConfig {
    /// Set the RNG seed for deterministic rounds.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the push resolution depth bound.
    pub fn with_max_push_depth(mut self, depth: u32) -> Self {
        self.max_push_depth = depth;
        self
    }

    /// Set the maximum event log size (0 = unlimited).
    pub fn with_max_events(mut self, max: usize) -> Self {
        self.max_events = max;
        self
    }
}
