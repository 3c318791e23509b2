//! Deterministic seeded RNG wrapper.
//!
//! Randomness only enters the system from the outside: the scenario driver
//! shuffles the order targets are introduced and picks which agents to crash,
//! and the in-memory bus can drop messages to imitate a lossy link.  Seeding
//! all of it from one `SimRng` makes every suite run reproducible.

use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

/// Seeded RNG for scenario-level decisions.
///
/// Not shared between tasks; wrap it in a mutex where several publishers
/// draw from one stream.
pub struct SimRng(SmallRng);

impl SimRng {
    pub fn new(seed: u64) -> Self {
        SimRng(SmallRng::seed_from_u64(seed))
    }

    /// `true` with probability `p` (clamped to [0, 1]).  Used as the
    /// per-datagram drop roll.
    #[inline]
    pub fn chance(&mut self, p: f64) -> bool {
        self.0.gen_bool(p.clamp(0.0, 1.0))
    }

    #[inline]
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        slice.shuffle(&mut self.0);
    }

    /// `None` if the slice is empty.
    #[inline]
    pub fn choose<'a, T>(&mut self, slice: &'a [T]) -> Option<&'a T> {
        slice.choose(&mut self.0)
    }

    /// `k` distinct elements of `pool` (all of them if `k` exceeds its
    /// length), returned in ascending order.
    pub fn sample<T: Copy + Ord>(&mut self, pool: &[T], k: usize) -> Vec<T> {
        let mut picked: Vec<T> = pool.choose_multiple(&mut self.0, k).copied().collect();
        picked.sort_unstable();
        picked
    }
}
