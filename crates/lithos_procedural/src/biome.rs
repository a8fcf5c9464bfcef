//! # Biome Classification
//!
//! Determines terrain type from three climate fields:
//! - Temperature
//! - Humidity
//! - Continentalness (how far inland a column is)
//!
//! Every biome owns a fixed point in this 3D climate space; a column gets
//! the biome whose point is nearest. Continentalness below the ocean
//! threshold is ocean regardless of the other two fields.

use crate::block::Block;
use crate::config::BiomeConfig;
use crate::noise::{FractalNoise, NoiseParams, WorldSeed};

/// Biome types in the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Biome {
    /// Open water.
    Ocean = 0,
    /// Coastline.
    Beach = 1,
    /// Grassland.
    Plains = 2,
    /// Temperate forest.
    Forest = 3,
    /// Arid desert.
    Desert = 4,
    /// Dry grassland.
    Savanna = 5,
    /// Wetland.
    Swamp = 6,
    /// Cold forest.
    Taiga = 7,
    /// Frozen flats.
    Tundra = 8,
    /// High ground.
    Mountains = 9,
}

impl Biome {
    /// Every biome.
    pub const ALL: [Self; 10] = [
        Self::Ocean,
        Self::Beach,
        Self::Plains,
        Self::Forest,
        Self::Desert,
        Self::Savanna,
        Self::Swamp,
        Self::Taiga,
        Self::Tundra,
        Self::Mountains,
    ];

    /// Fixed (temperature, humidity, continentalness) point.
    #[must_use]
    pub const fn climate_point(self) -> [f64; 3] {
        match self {
            Self::Ocean => [0.0, 0.0, -0.8],
            Self::Beach => [0.2, 0.0, -0.25],
            Self::Plains => [0.1, -0.1, 0.1],
            Self::Forest => [0.0, 0.35, 0.15],
            Self::Desert => [0.6, -0.5, 0.1],
            Self::Savanna => [0.45, -0.2, 0.05],
            Self::Swamp => [0.2, 0.6, -0.1],
            Self::Taiga => [-0.35, 0.3, 0.2],
            Self::Tundra => [-0.6, -0.2, 0.1],
            Self::Mountains => [-0.1, 0.0, 0.6],
        }
    }

    /// Block placed at the surface height.
    #[must_use]
    pub const fn surface_block(self) -> Block {
        match self {
            Self::Ocean | Self::Beach | Self::Desert => Block::Sand,
            Self::Tundra => Block::Snow,
            _ => Block::Grass,
        }
    }

    /// Block placed in the layers just below the surface.
    #[must_use]
    pub const fn subsurface_block(self) -> Block {
        match self {
            Self::Ocean | Self::Beach | Self::Desert => Block::Sand,
            _ => Block::Dirt,
        }
    }

    /// Probability that a tree attempt on a valid column is accepted.
    #[must_use]
    pub const fn tree_acceptance(self) -> f64 {
        match self {
            Self::Ocean | Self::Beach | Self::Desert => 0.0,
            Self::Tundra | Self::Mountains => 0.5,
            _ => 1.0,
        }
    }

    /// Multiplier applied to the per-chunk tree attempt count.
    #[must_use]
    pub const fn tree_density(self) -> f64 {
        match self {
            Self::Forest => 2.0,
            Self::Taiga => 1.5,
            Self::Swamp => 1.0,
            Self::Plains => 0.3,
            Self::Savanna => 0.4,
            Self::Tundra | Self::Mountains => 0.5,
            Self::Ocean | Self::Beach | Self::Desert => 0.0,
        }
    }

    /// Whether grass columns in this biome receive ground cover.
    #[must_use]
    pub const fn has_ground_cover(self) -> bool {
        matches!(
            self,
            Self::Plains | Self::Forest | Self::Savanna | Self::Swamp | Self::Taiga
        )
    }
}

/// One column's climate sample, each component in [-1, 1].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Climate {
    /// Temperature.
    pub temperature: f64,
    /// Humidity.
    pub humidity: f64,
    /// Continentalness.
    pub continentalness: f64,
}

/// Biome classifier using three independent fractal fields.
pub struct BiomeClassifier {
    temperature: FractalNoise,
    humidity: FractalNoise,
    continentalness: FractalNoise,
    ocean_threshold: f64,
}

impl BiomeClassifier {
    /// Creates a new classifier.
    ///
    /// Each field reuses the octave settings of `noise` with its own scale
    /// from `config` and its own derived seed.
    #[must_use]
    pub fn new(seed: WorldSeed, noise: NoiseParams, config: &BiomeConfig) -> Self {
        Self {
            temperature: FractalNoise::new(seed.derive(1), noise.with_scale(config.temperature_scale)),
            humidity: FractalNoise::new(seed.derive(2), noise.with_scale(config.humidity_scale)),
            continentalness: FractalNoise::new(
                seed.derive(3),
                noise.with_scale(config.continentalness_scale),
            ),
            ocean_threshold: config.ocean_threshold,
        }
    }

    /// Samples all three climate fields at a world column.
    #[must_use]
    pub fn climate(&self, x: f64, z: f64) -> Climate {
        Climate {
            temperature: self.temperature.sample_signed(x, z),
            humidity: self.humidity.sample_signed(x, z),
            continentalness: self.continentalness.sample_signed(x, z),
        }
    }

    /// Classifies a world column.
    #[must_use]
    pub fn classify(&self, x: f64, z: f64) -> Biome {
        self.classify_climate(self.climate(x, z))
    }

    /// Classifies an already sampled climate.
    #[must_use]
    pub fn classify_climate(&self, climate: Climate) -> Biome {
        if climate.continentalness < self.ocean_threshold {
            return Biome::Ocean;
        }
        nearest_biome(climate)
    }
}

/// Biome whose climate point has the smallest squared distance to `climate`.
/// Ties go to the earlier biome in [`Biome::ALL`].
#[must_use]
pub fn nearest_biome(climate: Climate) -> Biome {
    let sample = [climate.temperature, climate.humidity, climate.continentalness];
    let mut best = Biome::ALL[0];
    let mut best_distance = f64::INFINITY;

    for biome in Biome::ALL {
        let point = biome.climate_point();
        let distance: f64 = point
            .iter()
            .zip(sample)
            .map(|(p, s)| (p - s) * (p - s))
            .sum();
        if distance < best_distance {
            best = biome;
            best_distance = distance;
        }
    }

    best
}
