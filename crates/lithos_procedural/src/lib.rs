//! # LITHOS Procedural Generation
//!
//! Deterministic voxel world generation for infinite, reproducible worlds.
//!
//! ## Design Principles
//!
//! 1. **Deterministic**: Same seed always produces the same world
//! 2. **Chunked**: World is generated in fixed-size chunks
//! 3. **Streamable**: Chunks can be generated/discarded independently
//! 4. **Local**: A chunk's stages only ever write to that chunk
//!
//! ## Core Components
//!
//! - `SimplexNoise` / `FractalNoise`: seeded gradient noise
//! - `VoxelGrid`: dense block storage for one chunk
//! - `BiomeClassifier`: nearest-point lookup in climate space
//! - `ChunkGenerator`: the six-stage pipeline
//! - `WorldConfig`: TOML-backed configuration snapshot
//!
//! ## Example
//!
//! ```rust
//! use lithos_procedural::{ChunkCoord, ChunkGenerator, WorldConfig, WorldSeed};
//!
//! let generator = ChunkGenerator::new(WorldSeed::new(12345), &WorldConfig::default());
//! let grid = generator.generate(ChunkCoord::new(0, 0));
//!
//! // The world always has a floor.
//! assert!(grid.is_solid(0, 0, 0));
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod biome;
pub mod block;
pub mod caves;
pub mod chunk;
pub mod config;
pub mod error;
pub mod generator;
pub mod hydrology;
pub mod noise;
pub mod ores;
pub mod rng;
pub mod terrain;
pub mod vegetation;

pub use biome::{Biome, BiomeClassifier, Climate};
pub use block::{Block, BlockProperties, BLOCK_COUNT};
pub use caves::CaveCarver;
pub use chunk::{ChunkCoord, GridDims, VoxelGrid};
pub use config::{
    BiomeConfig, CaveConfig, HeightConfig, OreConfig, OreTierConfig, RenderConfig, TreeConfig,
    VegetationConfig, WorldConfig,
};
pub use error::{ConfigError, ConfigResult};
pub use generator::{ChunkGenerator, ChunkPipeline, GenerationStage};
pub use hydrology::{HydrologyFiller, HydrologyReport, CASCADE_LIMIT};
pub use noise::{FractalNoise, NoiseParams, SimplexNoise, WorldSeed};
pub use ores::{OreDepositor, OreTier};
pub use rng::DeterministicRng;
pub use terrain::HeightFieldGenerator;
pub use vegetation::{TreeMask, VegetationPlacer};
