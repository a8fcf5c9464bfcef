//! # Height Field
//!
//! Continentalness drives a fixed piecewise-linear spline (flat around the
//! coast, steep toward the mountains). A separate detail field adds a
//! bounded offset, then the column is filled bottom to top.

use crate::biome::{Biome, BiomeClassifier};
use crate::block::Block;
use crate::chunk::VoxelGrid;
use crate::config::HeightConfig;
use crate::noise::{FractalNoise, NoiseParams, WorldSeed};

/// Spline knots: (continentalness, height offset from sea level).
const HEIGHT_SPLINE: [(f64, f64); 6] = [
    (-1.0, -28.0),
    (-0.45, -14.0),
    (-0.15, -3.0),
    (0.05, 3.0),
    (0.4, 14.0),
    (1.0, 56.0),
];

/// Mountain columns higher than this above sea level are bare stone.
pub const MOUNTAIN_STONE_LINE: i32 = 20;

/// Per-column height and block layering.
pub struct HeightFieldGenerator {
    variation: FractalNoise,
    config: HeightConfig,
}

impl HeightFieldGenerator {
    /// Creates a generator. The detail field uses `noise` as-is.
    #[must_use]
    pub fn new(seed: WorldSeed, noise: NoiseParams, config: HeightConfig) -> Self {
        Self {
            variation: FractalNoise::new(seed.derive(4), noise),
            config,
        }
    }

    /// Spline height (before variation) for a continentalness value.
    #[must_use]
    pub fn base_height(&self, continentalness: f64) -> f64 {
        f64::from(self.config.sea_level) + spline_offset(continentalness)
    }

    /// Final surface height of a world column.
    #[must_use]
    pub fn height(&self, x: f64, z: f64, continentalness: f64) -> i32 {
        let offset = self.variation.sample_signed(x, z) * self.config.variation;
        let height = (self.base_height(continentalness) + offset).floor() as i32;
        height.clamp(self.config.min_height, self.config.max_height)
    }

    /// Fills one local column of `grid`.
    pub fn fill_column(&self, grid: &mut VoxelGrid, x: i32, z: i32, height: i32, biome: Biome) {
        let sea_level = self.config.sea_level;
        let subsurface_top = height - self.config.subsurface_depth;
        let bare_rock = biome == Biome::Mountains && height > sea_level + MOUNTAIN_STONE_LINE;

        for y in 0..grid.dims().height as i32 {
            let block = if y == 0 {
                Block::Bedrock
            } else if y < subsurface_top {
                Block::Stone
            } else if y < height {
                if bare_rock { Block::Stone } else { biome.subsurface_block() }
            } else if y == height {
                if bare_rock { Block::Stone } else { biome.surface_block() }
            } else if y <= sea_level {
                Block::Water
            } else {
                break;
            };
            grid.set(x, y, z, block);
        }

        grid.set_biome(x, z, biome);
        grid.set_surface_height(x, z, height);
    }

    /// Terrain stage: classify, compute height and fill every column.
    pub fn apply(&self, grid: &mut VoxelGrid, classifier: &BiomeClassifier) {
        let [origin_x, _, origin_z] = grid.world_offset();
        let dims = grid.dims();

        for z in 0..dims.depth as i32 {
            for x in 0..dims.width as i32 {
                let wx = f64::from(origin_x + x);
                let wz = f64::from(origin_z + z);
                let climate = classifier.climate(wx, wz);
                let biome = classifier.classify_climate(climate);
                let height = self.height(wx, wz, climate.continentalness);
                self.fill_column(grid, x, z, height, biome);
            }
        }
    }
}

fn spline_offset(continentalness: f64) -> f64 {
    let c = continentalness.clamp(-1.0, 1.0);
    for pair in HEIGHT_SPLINE.windows(2) {
        let (c0, h0) = pair[0];
        let (c1, h1) = pair[1];
        if c <= c1 {
            let t = (c - c0) / (c1 - c0);
            return h0 + (h1 - h0) * t;
        }
    }
    HEIGHT_SPLINE[HEIGHT_SPLINE.len() - 1].1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::{ChunkCoord, GridDims};

    fn generator() -> HeightFieldGenerator {
        HeightFieldGenerator::new(WorldSeed::new(42), NoiseParams::default(), HeightConfig::default())
    }

    #[test]
    fn test_spline_is_monotonic() {
        let mut previous = f64::NEG_INFINITY;
        for i in 0..=200 {
            let c = f64::from(i) / 100.0 - 1.0;
            let h = spline_offset(c);
            assert!(h >= previous, "spline must not decrease at c={c}");
            previous = h;
        }
        assert_eq!(spline_offset(-5.0), -28.0);
        assert_eq!(spline_offset(5.0), 56.0);
    }

    #[test]
    fn test_coast_flatter_than_mountains() {
        let coast = spline_offset(0.0) - spline_offset(-0.1);
        let peaks = spline_offset(0.9) - spline_offset(0.8);
        assert!(peaks > coast * 2.0);
    }

    #[test]
    fn test_height_clamped() {
        let generator = generator();
        let config = HeightConfig::default();
        for i in 0..500 {
            let c = f64::from(i) / 250.0 - 1.0;
            let h = generator.height(f64::from(i) * 13.0, f64::from(i) * -7.0, c);
            assert!((config.min_height..=config.max_height).contains(&h));
        }
    }

    #[test]
    fn test_column_layers() {
        let generator = generator();
        let mut grid = VoxelGrid::new(ChunkCoord::new(0, 0), GridDims::default());
        generator.fill_column(&mut grid, 2, 3, 70, Biome::Plains);

        assert_eq!(grid.get(2, 0, 3), Block::Bedrock);
        assert_eq!(grid.get(2, 40, 3), Block::Stone);
        assert_eq!(grid.get(2, 67, 3), Block::Dirt);
        assert_eq!(grid.get(2, 69, 3), Block::Dirt);
        assert_eq!(grid.get(2, 70, 3), Block::Grass);
        assert_eq!(grid.get(2, 71, 3), Block::Air);
        assert_eq!(grid.surface_height(2, 3), 70);
        assert_eq!(grid.biome(2, 3), Biome::Plains);
    }

    #[test]
    fn test_underwater_column_gets_water() {
        let generator = generator();
        let mut grid = VoxelGrid::new(ChunkCoord::new(0, 0), GridDims::default());
        generator.fill_column(&mut grid, 0, 0, 50, Biome::Ocean);

        assert_eq!(grid.get(0, 50, 0), Block::Sand);
        assert_eq!(grid.get(0, 51, 0), Block::Water);
        assert_eq!(grid.get(0, 62, 0), Block::Water);
        assert_eq!(grid.get(0, 63, 0), Block::Air);
    }

    #[test]
    fn test_high_mountains_are_stone() {
        let generator = generator();
        let mut grid = VoxelGrid::new(ChunkCoord::new(0, 0), GridDims::default());
        generator.fill_column(&mut grid, 0, 0, 100, Biome::Mountains);
        generator.fill_column(&mut grid, 1, 0, 70, Biome::Mountains);

        assert_eq!(grid.get(0, 100, 0), Block::Stone);
        assert_eq!(grid.get(1, 70, 0), Block::Grass);
    }
}
