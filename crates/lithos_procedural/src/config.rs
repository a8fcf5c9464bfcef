//! # World Configuration
//!
//! A read-only snapshot of every tunable. Terrain sections are read once per
//! chunk at generation time; the `render` section is read live each tick.
//!
//! Every section uses `#[serde(default)]`, so a TOML file only needs the
//! keys it wants to change:
//!
//! ```toml
//! [height]
//! sea_level = 48
//!
//! [render]
//! render_distance = 6
//! ```

use serde::{Deserialize, Serialize};

use crate::chunk::GridDims;
use crate::error::{ConfigError, ConfigResult};
use crate::noise::NoiseParams;

/// Terrain height parameters.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeightConfig {
    /// Water surface level.
    pub sea_level: i32,
    /// Lowest surface height.
    pub min_height: i32,
    /// Highest surface height.
    pub max_height: i32,
    /// Subsurface layers (dirt/sand) below the surface block.
    pub subsurface_depth: i32,
    /// Half range of the variation offset added to the spline height.
    pub variation: f64,
}

impl Default for HeightConfig {
    fn default() -> Self {
        Self {
            sea_level: 62,
            min_height: 20,
            max_height: 120,
            subsurface_depth: 3,
            variation: 6.0,
        }
    }
}

/// Climate field scales for biome classification.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BiomeConfig {
    /// Temperature field frequency.
    pub temperature_scale: f64,
    /// Humidity field frequency.
    pub humidity_scale: f64,
    /// Continentalness field frequency.
    pub continentalness_scale: f64,
    /// Continentalness below this is always ocean.
    pub ocean_threshold: f64,
}

impl Default for BiomeConfig {
    fn default() -> Self {
        Self {
            temperature_scale: 0.002,
            humidity_scale: 0.0025,
            continentalness_scale: 0.0015,
            ocean_threshold: -0.3,
        }
    }
}

/// Worm cave parameters.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaveConfig {
    /// Worms per chunk.
    pub count: u32,
    /// Shortest worm, in steps.
    pub min_length: u32,
    /// Longest worm, in steps.
    pub max_length: u32,
    /// Smallest carving radius.
    pub min_radius: f64,
    /// Largest carving radius.
    pub max_radius: f64,
    /// Lowest worm altitude.
    pub min_y: i32,
    /// Highest worm altitude.
    pub max_y: i32,
}

impl Default for CaveConfig {
    fn default() -> Self {
        Self {
            count: 8,
            min_length: 40,
            max_length: 120,
            min_radius: 1.5,
            max_radius: 3.5,
            min_y: 8,
            max_y: 60,
        }
    }
}

/// One ore tier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OreTierConfig {
    /// Lowest Y (inclusive).
    pub min_y: i32,
    /// Highest Y (exclusive).
    pub max_y: i32,
    /// Vein start attempts per chunk.
    pub attempts: u32,
    /// Random-walk steps per vein.
    pub vein_size: u32,
}

impl OreTierConfig {
    /// Creates a tier.
    #[must_use]
    pub const fn new(min_y: i32, max_y: i32, attempts: u32, vein_size: u32) -> Self {
        Self {
            min_y,
            max_y,
            attempts,
            vein_size,
        }
    }
}

/// Ore tiers, deposited in declaration order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OreConfig {
    /// Coal.
    pub coal: OreTierConfig,
    /// Iron.
    pub iron: OreTierConfig,
    /// Gold.
    pub gold: OreTierConfig,
    /// Diamond.
    pub diamond: OreTierConfig,
}

impl Default for OreConfig {
    fn default() -> Self {
        Self {
            coal: OreTierConfig::new(5, 100, 20, 12),
            iron: OreTierConfig::new(5, 64, 12, 8),
            gold: OreTierConfig::new(5, 32, 4, 6),
            diamond: OreTierConfig::new(1, 16, 2, 4),
        }
    }
}

/// Tree parameters.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeConfig {
    /// Base placement attempts per chunk (scaled by biome density).
    pub per_chunk: u32,
    /// Shortest trunk.
    pub min_trunk_height: u32,
    /// Tallest trunk.
    pub max_trunk_height: u32,
    /// Probability of dropping each leaf-ring corner.
    pub leaf_decay_chance: f64,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            per_chunk: 4,
            min_trunk_height: 4,
            max_trunk_height: 7,
            leaf_decay_chance: 0.3,
        }
    }
}

/// Ground cover parameters.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VegetationConfig {
    /// Fraction of eligible grass columns that get a plant.
    pub density: f64,
}

impl Default for VegetationConfig {
    fn default() -> Self {
        Self { density: 0.3 }
    }
}

/// Live streaming parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Load radius in chunks.
    pub render_distance: u32,
    /// Chunks generated and meshed per tick.
    pub chunks_per_tick: u32,
    /// Extra chunks beyond the load radius before eviction.
    pub unload_margin: u32,
    /// Point lights handed to the renderer.
    pub max_lights: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            render_distance: 8,
            chunks_per_tick: 2,
            unload_margin: 2,
            max_lights: 32,
        }
    }
}

/// Complete world configuration snapshot.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Chunk dimensions.
    pub grid: GridDims,
    /// Detail noise (height variation field).
    pub noise: NoiseParams,
    /// Heights.
    pub height: HeightConfig,
    /// Biome climate fields.
    pub biome: BiomeConfig,
    /// Caves.
    pub caves: CaveConfig,
    /// Ores.
    pub ores: OreConfig,
    /// Trees.
    pub trees: TreeConfig,
    /// Ground cover.
    pub vegetation: VegetationConfig,
    /// Streaming.
    pub render: RenderConfig,
}

impl WorldConfig {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid TOML or a value is out of range.
    pub fn from_toml_str(text: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Serializes to TOML.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_toml_string(&self) -> ConfigResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Returns true if every generation-affecting field matches.
    #[must_use]
    pub fn same_terrain(&self, other: &Self) -> bool {
        self.grid == other.grid
            && self.noise == other.noise
            && self.height == other.height
            && self.biome == other.biome
            && self.caves == other.caves
            && self.ores == other.ores
            && self.trees == other.trees
            && self.vegetation == other.vegetation
    }

    /// Checks ranges and cross-field constraints.
    ///
    /// # Errors
    ///
    /// Returns the first violated constraint.
    pub fn validate(&self) -> ConfigResult<()> {
        let grid = self.grid;
        if grid.width == 0 || grid.height < 2 || grid.depth == 0 {
            return Err(ConfigError::invalid(
                "grid",
                format!("dimensions {}x{}x{} are too small", grid.width, grid.height, grid.depth),
            ));
        }
        let top = grid.height as i32 - 1;

        let noise = self.noise;
        if noise.octaves == 0 {
            return Err(ConfigError::invalid("noise.octaves", "must be at least 1"));
        }
        if noise.persistence <= 0.0 || noise.persistence > 1.0 {
            return Err(ConfigError::invalid("noise.persistence", "must be in (0, 1]"));
        }
        if noise.lacunarity < 1.0 {
            return Err(ConfigError::invalid("noise.lacunarity", "must be at least 1"));
        }
        if noise.scale <= 0.0 {
            return Err(ConfigError::invalid("noise.scale", "must be positive"));
        }

        let height = self.height;
        if height.min_height < 1 || height.min_height > height.max_height {
            return Err(ConfigError::invalid(
                "height.min_height",
                format!("must be in [1, max_height={}]", height.max_height),
            ));
        }
        if height.max_height > top {
            return Err(ConfigError::invalid(
                "height.max_height",
                format!("must be below grid height {}", grid.height),
            ));
        }
        if height.sea_level < 1 || height.sea_level > top {
            return Err(ConfigError::invalid(
                "height.sea_level",
                format!("must be in [1, {top}]"),
            ));
        }
        if height.subsurface_depth < 0 {
            return Err(ConfigError::invalid("height.subsurface_depth", "must not be negative"));
        }
        if height.variation < 0.0 {
            return Err(ConfigError::invalid("height.variation", "must not be negative"));
        }

        let biome = self.biome;
        if biome.temperature_scale <= 0.0
            || biome.humidity_scale <= 0.0
            || biome.continentalness_scale <= 0.0
        {
            return Err(ConfigError::invalid("biome", "field scales must be positive"));
        }
        if !(-1.0..=1.0).contains(&biome.ocean_threshold) {
            return Err(ConfigError::invalid("biome.ocean_threshold", "must be in [-1, 1]"));
        }

        let caves = self.caves;
        if caves.min_length > caves.max_length {
            return Err(ConfigError::invalid("caves.min_length", "must not exceed max_length"));
        }
        if caves.min_radius <= 0.0 || caves.min_radius > caves.max_radius {
            return Err(ConfigError::invalid(
                "caves.min_radius",
                "must be positive and not exceed max_radius",
            ));
        }
        if caves.min_y < 1 || caves.min_y > caves.max_y || caves.max_y > top {
            return Err(ConfigError::invalid(
                "caves.min_y",
                format!("need 1 <= min_y <= max_y <= {top}"),
            ));
        }

        for (field, tier) in [
            ("ores.coal", self.ores.coal),
            ("ores.iron", self.ores.iron),
            ("ores.gold", self.ores.gold),
            ("ores.diamond", self.ores.diamond),
        ] {
            if tier.min_y < 1 || tier.min_y >= tier.max_y || tier.max_y > grid.height as i32 {
                return Err(ConfigError::invalid(
                    field,
                    format!("need 1 <= min_y < max_y <= {}", grid.height),
                ));
            }
        }

        let trees = self.trees;
        if trees.min_trunk_height == 0 || trees.min_trunk_height > trees.max_trunk_height {
            return Err(ConfigError::invalid(
                "trees.min_trunk_height",
                "must be positive and not exceed max_trunk_height",
            ));
        }
        if !(0.0..=1.0).contains(&trees.leaf_decay_chance) {
            return Err(ConfigError::invalid("trees.leaf_decay_chance", "must be in [0, 1]"));
        }
        if !(0.0..=1.0).contains(&self.vegetation.density) {
            return Err(ConfigError::invalid("vegetation.density", "must be in [0, 1]"));
        }

        if self.render.chunks_per_tick == 0 {
            return Err(ConfigError::invalid("render.chunks_per_tick", "must be at least 1"));
        }

        Ok(())
    }
}
