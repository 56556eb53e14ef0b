//! Unique-winner sampling
//!
//! Every k-subset (and every ordering of it) is equally likely: the pool is
//! copied, fully shuffled with Fisher-Yates, and truncated.

use rand::Rng;
use rand::rngs::ThreadRng;
use rand_pcg::Pcg32;

use super::pool::Entry;

/// Source of uniform indices
///
/// Abstracted so tests can drive the sampler with a scripted sequence.
pub trait RandomSource {
    /// Uniform index in `0..bound`. Callers never pass `bound == 0`.
    fn index_below(&mut self, bound: usize) -> usize;
}

impl RandomSource for Pcg32 {
    fn index_below(&mut self, bound: usize) -> usize {
        self.random_range(0..bound)
    }
}

impl RandomSource for ThreadRng {
    fn index_below(&mut self, bound: usize) -> usize {
        self.random_range(0..bound)
    }
}

/// Select up to `requested` unique entries uniformly at random
///
/// Returns an empty vec when `requested` is 0 or the pool is empty.
pub fn sample<R: RandomSource + ?Sized>(pool: &[Entry], requested: usize, rng: &mut R) -> Vec<Entry> {
    let count = requested.min(pool.len());
    if count == 0 {
        return Vec::new();
    }

    let mut shuffled = pool.to_vec();
    for i in (1..shuffled.len()).rev() {
        let j = rng.index_below(i + 1);
        shuffled.swap(i, j);
    }
    shuffled.truncate(count);
    shuffled
}

/// Pick a single entry uniformly (used for the decorative flicker)
pub fn pick_one<'a, R: RandomSource + ?Sized>(pool: &'a [Entry], rng: &mut R) -> Option<&'a Entry> {
    if pool.is_empty() {
        return None;
    }
    pool.get(rng.index_below(pool.len()))
}
