//! # Gradient Noise
//!
//! Deterministic 2D simplex noise plus a fractal (multi-octave) wrapper.
//!
//! ## Determinism Guarantee
//!
//! Given the same `WorldSeed`, this implementation will produce
//! **exactly** the same values on any platform, any time. The permutation
//! table is the only seeded state and it is built once, up front.

use serde::{Deserialize, Serialize};

use crate::chunk::ChunkCoord;

/// World seed for deterministic generation.
///
/// All procedural generation derives from this seed. Sub-streams are
/// produced by bit-mixing, never by advancing shared state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorldSeed(u32);

impl WorldSeed {
    /// Creates a new world seed.
    #[inline]
    #[must_use]
    pub const fn new(seed: u32) -> Self {
        Self(seed)
    }

    /// Returns the raw seed value.
    #[inline]
    #[must_use]
    pub const fn value(self) -> u32 {
        self.0
    }

    /// Derives a sub-seed for a specific purpose (e.g., the humidity field).
    #[inline]
    #[must_use]
    pub const fn derive(self, purpose: u32) -> Self {
        let mut hash = (self.0 as u64) ^ (purpose as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15);
        hash = hash.wrapping_mul(0x517c_c1b7_2722_0a95);
        hash ^= hash >> 32;
        Self(hash as u32)
    }

    /// Mixes the seed with a chunk coordinate and a stage salt into a
    /// 64-bit RNG seed.
    #[inline]
    #[must_use]
    pub const fn chunk_seed(self, coord: ChunkCoord, salt: u64) -> u64 {
        let mut hash = (self.0 as u64) ^ salt.wrapping_mul(0x9E37_79B9_7F4A_7C15);
        hash ^= (coord.x as i64 as u64).wrapping_mul(0x6C8E_9CF5_7093_2BD5);
        hash = hash.rotate_left(23);
        hash ^= (coord.z as i64 as u64).wrapping_mul(0xB492_B66F_BE98_F273);
        hash = hash.wrapping_mul(0x517c_c1b7_2722_0a95);
        hash ^ (hash >> 29)
    }
}

/// Pre-computed permutation table for noise.
///
/// This is computed once from the seed and reused.
struct PermutationTable {
    /// 512-entry permutation table (256 entries, doubled for overflow handling).
    perm: [u8; 512],
    /// Gradient table (12 gradients for 2D simplex).
    grad: [[i8; 2]; 12],
}

impl PermutationTable {
    /// Creates a new permutation table from a seed.
    fn new(seed: WorldSeed) -> Self {
        let mut perm = [0u8; 512];

        for (i, slot) in perm.iter_mut().take(256).enumerate() {
            *slot = i as u8;
        }

        // Fisher-Yates shuffle driven by a 32-bit LCG (Numerical Recipes constants)
        let mut state = seed.value();
        for i in (1..256usize).rev() {
            state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
            let j = (state >> 8) as usize % (i + 1);
            perm.swap(i, j);
        }

        for i in 0..256 {
            perm[256 + i] = perm[i];
        }

        let grad = [
            [1, 0], [1, 1], [0, 1], [-1, 1],
            [-1, 0], [-1, -1], [0, -1], [1, -1],
            [1, 0], [0, 1], [-1, 0], [0, -1],
        ];

        Self { perm, grad }
    }

    #[inline]
    fn get(&self, index: usize) -> u8 {
        self.perm[index & 511]
    }

    #[inline]
    fn gradient(&self, hash: u8) -> [i8; 2] {
        self.grad[(hash % 12) as usize]
    }
}

/// 2D simplex noise generator.
///
/// `sample` produces smooth values in [-1, 1]; `sample01` rescales them
/// to [0, 1], which is what the terrain stages consume.
pub struct SimplexNoise {
    perm_table: PermutationTable,
}

impl SimplexNoise {
    /// Skewing factor for 2D simplex grid.
    const F2: f64 = 0.366_025_403_784_439; // (sqrt(3) - 1) / 2
    /// Unskewing factor for 2D simplex grid.
    const G2: f64 = 0.211_324_865_405_187; // (3 - sqrt(3)) / 6

    /// Creates a new simplex noise generator from a seed.
    #[must_use]
    pub fn new(seed: WorldSeed) -> Self {
        Self {
            perm_table: PermutationTable::new(seed),
        }
    }

    /// Samples 2D simplex noise at the given coordinates.
    ///
    /// # Returns
    ///
    /// A value in the range [-1, 1].
    #[must_use]
    pub fn sample(&self, x: f64, y: f64) -> f64 {
        let skew = (x + y) * Self::F2;
        let i = fast_floor(x + skew);
        let j = fast_floor(y + skew);

        let unskew = f64::from(i + j) * Self::G2;
        let x0 = x - (f64::from(i) - unskew);
        let y0 = y - (f64::from(j) - unskew);

        let (i1, j1) = if x0 > y0 { (1, 0) } else { (0, 1) };

        let x1 = x0 - f64::from(i1 as u8) + Self::G2;
        let y1 = y0 - f64::from(j1 as u8) + Self::G2;
        let x2 = x0 - 1.0 + 2.0 * Self::G2;
        let y2 = y0 - 1.0 + 2.0 * Self::G2;

        let ii = (i & 255) as usize;
        let jj = (j & 255) as usize;

        let gi0 = self.perm_table.get(ii + self.perm_table.get(jj) as usize);
        let gi1 = self.perm_table.get(ii + i1 + self.perm_table.get(jj + j1) as usize);
        let gi2 = self.perm_table.get(ii + 1 + self.perm_table.get(jj + 1) as usize);

        let n0 = self.contribution(x0, y0, gi0);
        let n1 = self.contribution(x1, y1, gi1);
        let n2 = self.contribution(x2, y2, gi2);

        // 70.0 normalizes the corner sum into [-1, 1]
        (70.0 * (n0 + n1 + n2)).clamp(-1.0, 1.0)
    }

    /// Samples noise rescaled to [0, 1].
    #[inline]
    #[must_use]
    pub fn sample01(&self, x: f64, y: f64) -> f64 {
        (self.sample(x, y) + 1.0) * 0.5
    }

    #[inline]
    fn contribution(&self, x: f64, y: f64, gradient_index: u8) -> f64 {
        let t = 0.5 - x * x - y * y;
        if t < 0.0 {
            0.0
        } else {
            let grad = self.perm_table.gradient(gradient_index);
            let t2 = t * t;
            t2 * t2 * (x * f64::from(grad[0]) + y * f64::from(grad[1]))
        }
    }
}

/// Fractal noise parameters (the `noise` section of a world config).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseParams {
    /// Number of octaves summed.
    pub octaves: u32,
    /// Amplitude multiplier per octave.
    pub persistence: f64,
    /// Frequency multiplier per octave.
    pub lacunarity: f64,
    /// Base frequency applied to world coordinates.
    pub scale: f64,
}

impl Default for NoiseParams {
    fn default() -> Self {
        Self {
            octaves: 4,
            persistence: 0.5,
            lacunarity: 2.0,
            scale: 0.01,
        }
    }
}

impl NoiseParams {
    /// Returns a copy with a different base frequency.
    #[must_use]
    pub const fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }
}

/// Multi-octave (fBm) wrapper around [`SimplexNoise`].
///
/// Octave `i` is sampled at `scale * lacunarity^i` and weighted by
/// `persistence^i`; the weighted sum is divided by the total weight so the
/// output stays in [0, 1].
pub struct FractalNoise {
    base: SimplexNoise,
    params: NoiseParams,
}

impl FractalNoise {
    /// Creates a fractal field from a seed and parameters.
    #[must_use]
    pub fn new(seed: WorldSeed, params: NoiseParams) -> Self {
        Self {
            base: SimplexNoise::new(seed),
            params,
        }
    }

    /// Returns the parameters this field was built with.
    #[must_use]
    pub const fn params(&self) -> NoiseParams {
        self.params
    }

    /// Samples the field at world coordinates. Result in [0, 1].
    #[must_use]
    pub fn sample(&self, x: f64, y: f64) -> f64 {
        let mut total = 0.0;
        let mut amplitude = 1.0;
        let mut frequency = self.params.scale;
        let mut max_amplitude = 0.0;

        for _ in 0..self.params.octaves.max(1) {
            total += self.base.sample01(x * frequency, y * frequency) * amplitude;
            max_amplitude += amplitude;
            amplitude *= self.params.persistence;
            frequency *= self.params.lacunarity;
        }

        if max_amplitude > 0.0 {
            (total / max_amplitude).clamp(0.0, 1.0)
        } else {
            0.5
        }
    }

    /// Samples the field mapped to [-1, 1].
    #[inline]
    #[must_use]
    pub fn sample_signed(&self, x: f64, y: f64) -> f64 {
        self.sample(x, y) * 2.0 - 1.0
    }
}

/// Fast floor function.
#[inline]
fn fast_floor(x: f64) -> i32 {
    let xi = x as i32;
    if x < f64::from(xi) { xi - 1 } else { xi }
}
