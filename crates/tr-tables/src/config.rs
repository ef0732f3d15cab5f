//! Configuration for table resolution.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Default bound on nested table-reference expansion.
pub const DEFAULT_MAX_DEPTH: u32 = 8;

/// Highest recursion bound a resolver accepts. Larger values are clamped.
pub const MAX_DEPTH_LIMIT: u32 = 64;

/// Most rolls a single table reference may make.
pub const MAX_REFERENCE_ROLLS: u32 = 1_000;

/// Configuration for a resolver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverConfig {
    /// How many levels of table references may be expanded.
    pub max_depth: u32,
    /// RNG seed for reproducible rolls. `None` picks a fresh seed.
    pub seed: Option<u64>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            seed: None,
        }
    }
}

impl ResolverConfig {
    /// Set the recursion bound, clamped to [`MAX_DEPTH_LIMIT`].
    pub fn with_max_depth(mut self, max_depth: u32) -> Self {
        self.max_depth = max_depth.min(MAX_DEPTH_LIMIT);
        self
    }

    /// Set the RNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Build the RNG, returning it with the seed it was created from.
    pub fn make_rng(&self) -> (StdRng, u64) {
        let seed = self.seed.unwrap_or_else(|| rand::rng().random());
        (StdRng::seed_from_u64(seed), seed)
    }
}
