//! # Worm Caves
//!
//! Each worm is a cursor that walks through the chunk carving spheres.
//! Start point and length come from the chunk RNG; radius and heading come
//! from three noise streams sampled along the worm's own time axis, so
//! every worm bends smoothly instead of jittering.

use std::f64::consts::{FRAC_PI_2, TAU};

use crate::block::Block;
use crate::chunk::VoxelGrid;
use crate::config::CaveConfig;
use crate::noise::{SimplexNoise, WorldSeed};
use crate::rng::DeterministicRng;

/// Noise time advanced per worm step.
const STEP_TIME: f64 = 0.045;

/// Vertical motion damping.
const PITCH_DAMPING: f64 = 0.3;

/// Range of the per-worm time offset.
const WORM_OFFSET_RANGE: f64 = 4096.0;

/// Worm cave carver.
pub struct CaveCarver {
    radius_noise: SimplexNoise,
    yaw_noise: SimplexNoise,
    pitch_noise: SimplexNoise,
    config: CaveConfig,
}

impl CaveCarver {
    /// Creates a carver with its three noise streams.
    #[must_use]
    pub fn new(seed: WorldSeed, config: CaveConfig) -> Self {
        Self {
            radius_noise: SimplexNoise::new(seed.derive(10)),
            yaw_noise: SimplexNoise::new(seed.derive(11)),
            pitch_noise: SimplexNoise::new(seed.derive(12)),
            config,
        }
    }

    /// Carves every worm of this chunk. Returns the number of cleared cells.
    pub fn carve(&self, grid: &mut VoxelGrid, rng: &mut DeterministicRng) -> usize {
        let dims = grid.dims();
        let mut cleared = 0;

        for _ in 0..self.config.count {
            let start = [
                rng.range_f64(0.0, f64::from(dims.width)),
                f64::from(rng.range(self.config.min_y, self.config.max_y)),
                rng.range_f64(0.0, f64::from(dims.depth)),
            ];
            let length = rng.range_inclusive(self.config.min_length, self.config.max_length);
            let offset = rng.range_f64(0.0, WORM_OFFSET_RANGE);

            cleared += self.carve_worm(grid, start, length, offset);
        }

        cleared
    }

    fn carve_worm(&self, grid: &mut VoxelGrid, start: [f64; 3], length: u32, offset: f64) -> usize {
        let config = &self.config;
        let [mut x, mut y, mut z] = start;
        let mut cleared = 0;

        for step in 0..length {
            let t = f64::from(step) * STEP_TIME + offset;

            let radius = config.min_radius
                + self.radius_noise.sample01(t, offset) * (config.max_radius - config.min_radius);
            cleared += carve_sphere(grid, [x, y, z], radius);

            let yaw = self.yaw_noise.sample01(t, offset) * TAU * 2.0;
            let pitch = self.pitch_noise.sample(t, offset) * FRAC_PI_2;

            x += yaw.cos() * pitch.cos();
            z += yaw.sin() * pitch.cos();
            y += pitch.sin() * PITCH_DAMPING;
            y = y.clamp(f64::from(config.min_y), f64::from(config.max_y));
        }

        cleared
    }
}

/// Clears every carvable cell within `radius` of `center`.
fn carve_sphere(grid: &mut VoxelGrid, center: [f64; 3], radius: f64) -> usize {
    let dims = grid.dims();
    let lo = |c: f64, max: u32| ((c - radius).floor() as i32).clamp(0, max as i32 - 1);
    let hi = |c: f64, max: u32| ((c + radius).ceil() as i32).clamp(0, max as i32 - 1);
    let radius_sq = radius * radius;
    let mut cleared = 0;

    for y in lo(center[1], dims.height)..=hi(center[1], dims.height) {
        for z in lo(center[2], dims.depth)..=hi(center[2], dims.depth) {
            for x in lo(center[0], dims.width)..=hi(center[0], dims.width) {
                let dx = f64::from(x) + 0.5 - center[0];
                let dy = f64::from(y) + 0.5 - center[1];
                let dz = f64::from(z) + 0.5 - center[2];
                if dx * dx + dy * dy + dz * dz > radius_sq {
                    continue;
                }

                let block = grid.get(x, y, z);
                if block.is_air() || block == Block::Bedrock || block.is_water() {
                    continue;
                }
                grid.set(x, y, z, Block::Air);
                cleared += 1;
            }
        }
    }

    cleared
}
