//! Seeded RNG for tick scheduling.
//!
//! Behavior trees themselves are deterministic; the only randomness the
//! runtime owns is the *order* in which a sequential population tick visits
//! agents.  Shuffling that order with a seeded generator lets tests and
//! soak runs exercise arbitrary interleavings while staying reproducible.

use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Deterministic RNG used to permute agent tick order.
///
/// Owned by the runtime; only sequential population ticks use it.
pub struct TickRng(SmallRng);

impl TickRng {
    pub fn new(seed: u64) -> Self {
        TickRng(SmallRng::seed_from_u64(seed))
    }

    /// Shuffle a mutable slice in place (Fisher-Yates).
    #[inline]
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        slice.shuffle(&mut self.0);
    }
}
