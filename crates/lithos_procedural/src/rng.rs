//! Seeded random stream for placement decisions.
//!
//! Every generation stage gets its own stream, keyed by world seed, chunk
//! coordinate and a stage salt, so stages never perturb each other.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::chunk::ChunkCoord;
use crate::noise::WorldSeed;

/// Deterministic RNG (`ChaCha8`, identical output on every platform).
pub struct DeterministicRng {
    inner: ChaCha8Rng,
}

impl DeterministicRng {
    /// Creates a stream from a raw 64-bit seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Creates the stream for one chunk and one purpose.
    #[must_use]
    pub fn for_chunk(seed: WorldSeed, coord: ChunkCoord, salt: u64) -> Self {
        Self::new(seed.chunk_seed(coord, salt))
    }

    /// Uniform value in [0, 1).
    #[inline]
    pub fn next_f64(&mut self) -> f64 {
        self.inner.gen::<f64>()
    }

    /// Returns true with probability `p`.
    #[inline]
    pub fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    /// Uniform integer in `[low, high)`. Returns `low` for an empty range.
    #[inline]
    pub fn range(&mut self, low: i32, high: i32) -> i32 {
        if high <= low {
            low
        } else {
            self.inner.gen_range(low..high)
        }
    }

    /// Uniform integer in `[low, high]`.
    #[inline]
    pub fn range_inclusive(&mut self, low: u32, high: u32) -> u32 {
        if high <= low {
            low
        } else {
            self.inner.gen_range(low..=high)
        }
    }

    /// Uniform float in `[low, high)`.
    #[inline]
    pub fn range_f64(&mut self, low: f64, high: f64) -> f64 {
        low + (high - low) * self.next_f64()
    }

    /// One of -1, 0, 1.
    #[inline]
    pub fn step(&mut self) -> i32 {
        self.inner.gen_range(-1..=1)
    }
}
