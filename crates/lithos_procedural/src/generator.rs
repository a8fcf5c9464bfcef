//! # Chunk Generation Pipeline
//!
//! Six stages in fixed order:
//!
//! ```text
//! Terrain -> Ores -> Caves -> Trees -> Vegetation -> Hydrology
//! ```
//!
//! Each stage draws from its own RNG stream (seed, chunk coordinate and a
//! stage salt), so changing one stage never shifts the output of another.
//! Running a stage out of order is a programmer error and panics.

use tracing::trace;

use crate::biome::{Biome, BiomeClassifier};
use crate::caves::CaveCarver;
use crate::chunk::{ChunkCoord, VoxelGrid};
use crate::config::WorldConfig;
use crate::hydrology::HydrologyFiller;
use crate::noise::WorldSeed;
use crate::ores::OreDepositor;
use crate::rng::DeterministicRng;
use crate::terrain::HeightFieldGenerator;
use crate::vegetation::{TreeMask, VegetationPlacer};

/// Pipeline stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum GenerationStage {
    /// Height field and column layers.
    Terrain,
    /// Ore veins.
    Ores,
    /// Worm caves.
    Caves,
    /// Trees.
    Trees,
    /// Ground cover.
    Vegetation,
    /// Water rebuild.
    Hydrology,
}

impl GenerationStage {
    /// All stages in execution order.
    pub const ORDER: [Self; 6] = [
        Self::Terrain,
        Self::Ores,
        Self::Caves,
        Self::Trees,
        Self::Vegetation,
        Self::Hydrology,
    ];

    /// The stage that must follow this one.
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::Terrain => Some(Self::Ores),
            Self::Ores => Some(Self::Caves),
            Self::Caves => Some(Self::Trees),
            Self::Trees => Some(Self::Vegetation),
            Self::Vegetation => Some(Self::Hydrology),
            Self::Hydrology => None,
        }
    }

    const fn salt(self) -> u64 {
        match self {
            Self::Terrain => 0x7465_7272,
            Self::Ores => 0x6f72_6573,
            Self::Caves => 0x6361_7665,
            Self::Trees => 0x7472_6565,
            Self::Vegetation => 0x7665_6765,
            Self::Hydrology => 0x6879_6472,
        }
    }
}

/// Everything needed to generate chunks for one seed and config snapshot.
pub struct ChunkGenerator {
    seed: WorldSeed,
    config: WorldConfig,
    classifier: BiomeClassifier,
    terrain: HeightFieldGenerator,
    ores: OreDepositor,
    caves: CaveCarver,
    vegetation: VegetationPlacer,
    hydrology: HydrologyFiller,
}

impl ChunkGenerator {
    /// Builds every stage from the config.
    #[must_use]
    pub fn new(seed: WorldSeed, config: &WorldConfig) -> Self {
        Self {
            seed,
            config: config.clone(),
            classifier: BiomeClassifier::new(seed, config.noise, &config.biome),
            terrain: HeightFieldGenerator::new(seed, config.noise, config.height),
            ores: OreDepositor::new(&config.ores),
            caves: CaveCarver::new(seed, config.caves),
            vegetation: VegetationPlacer::new(config.trees, config.vegetation),
            hydrology: HydrologyFiller::new(config.height.sea_level),
        }
    }

    /// World seed.
    #[must_use]
    pub const fn seed(&self) -> WorldSeed {
        self.seed
    }

    /// Config snapshot this generator was built from.
    #[must_use]
    pub const fn config(&self) -> &WorldConfig {
        &self.config
    }

    /// Runs the full pipeline for one chunk.
    #[must_use]
    pub fn generate(&self, coord: ChunkCoord) -> VoxelGrid {
        let mut pipeline = ChunkPipeline::new(self, coord);
        for stage in GenerationStage::ORDER {
            pipeline.run(stage);
        }
        pipeline.finish()
    }

    /// Biome of a world column.
    #[must_use]
    pub fn biome_at(&self, x: i32, z: i32) -> Biome {
        self.classifier.classify(f64::from(x), f64::from(z))
    }

    /// Terrain surface height of a world column (before caves and trees).
    #[must_use]
    pub fn surface_height_at(&self, x: i32, z: i32) -> i32 {
        let (wx, wz) = (f64::from(x), f64::from(z));
        let climate = self.classifier.climate(wx, wz);
        self.terrain.height(wx, wz, climate.continentalness)
    }

    fn rng(&self, coord: ChunkCoord, stage: GenerationStage) -> DeterministicRng {
        DeterministicRng::for_chunk(self.seed, coord, stage.salt())
    }
}

/// One chunk moving through the pipeline stage by stage.
pub struct ChunkPipeline<'a> {
    generator: &'a ChunkGenerator,
    grid: VoxelGrid,
    completed: Option<GenerationStage>,
    trees: Option<TreeMask>,
}

impl<'a> ChunkPipeline<'a> {
    /// Starts a pipeline with an empty grid.
    #[must_use]
    pub fn new(generator: &'a ChunkGenerator, coord: ChunkCoord) -> Self {
        Self {
            generator,
            grid: VoxelGrid::new(coord, generator.config.grid),
            completed: None,
            trees: None,
        }
    }

    /// Last stage that ran.
    #[must_use]
    pub const fn completed(&self) -> Option<GenerationStage> {
        self.completed
    }

    /// Grid in its current state.
    #[must_use]
    pub const fn grid(&self) -> &VoxelGrid {
        &self.grid
    }

    /// Runs one stage.
    ///
    /// # Panics
    ///
    /// Panics if `stage` is not the stage that follows the last one run.
    pub fn run(&mut self, stage: GenerationStage) {
        let expected = match self.completed {
            None => Some(GenerationStage::Terrain),
            Some(done) => done.next(),
        };
        assert_eq!(
            Some(stage),
            expected,
            "generation stage {stage:?} run out of order (last completed: {:?})",
            self.completed
        );

        let generator = self.generator;
        let coord = self.grid.coord();
        let mut rng = generator.rng(coord, stage);

        match stage {
            GenerationStage::Terrain => generator.terrain.apply(&mut self.grid, &generator.classifier),
            GenerationStage::Ores => {
                let placed = generator.ores.deposit(&mut self.grid, &mut rng);
                trace!(x = coord.x, z = coord.z, placed, "ores deposited");
            }
            GenerationStage::Caves => {
                let cleared = generator.caves.carve(&mut self.grid, &mut rng);
                trace!(x = coord.x, z = coord.z, cleared, "caves carved");
            }
            GenerationStage::Trees => {
                let mask = generator.vegetation.place_trees(&mut self.grid, &mut rng);
                trace!(x = coord.x, z = coord.z, trees = mask.count(), "trees placed");
                self.trees = Some(mask);
            }
            GenerationStage::Vegetation => {
                let dims = self.grid.dims();
                let mask = self
                    .trees
                    .take()
                    .unwrap_or_else(|| TreeMask::new(dims.width, dims.depth));
                let plants = generator
                    .vegetation
                    .place_ground_cover(&mut self.grid, &mut rng, &mask);
                trace!(x = coord.x, z = coord.z, plants, "ground cover placed");
            }
            GenerationStage::Hydrology => {
                let report = generator.hydrology.fill(&mut self.grid);
                trace!(x = coord.x, z = coord.z, ?report, "water rebuilt");
            }
        }

        self.completed = Some(stage);
    }

    /// Returns the finished grid.
    ///
    /// # Panics
    ///
    /// Panics unless every stage has run.
    #[must_use]
    pub fn finish(self) -> VoxelGrid {
        assert_eq!(
            self.completed,
            Some(GenerationStage::Hydrology),
            "chunk pipeline finished before all stages ran"
        );
        self.grid
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::Block;

    fn generator() -> ChunkGenerator {
        ChunkGenerator::new(WorldSeed::new(2024), &WorldConfig::default())
    }

    #[test]
    fn test_stage_order_table() {
        let mut stage = GenerationStage::Terrain;
        for expected in &GenerationStage::ORDER[1..] {
            stage = stage.next().unwrap();
            assert_eq!(stage, *expected);
        }
        assert_eq!(GenerationStage::Hydrology.next(), None);
    }

    #[test]
    #[should_panic(expected = "out of order")]
    fn test_out_of_order_stage_panics() {
        let generator = generator();
        let mut pipeline = ChunkPipeline::new(&generator, ChunkCoord::new(0, 0));
        pipeline.run(GenerationStage::Terrain);
        pipeline.run(GenerationStage::Caves);
    }

    #[test]
    #[should_panic(expected = "before all stages")]
    fn test_unfinished_pipeline_panics() {
        let generator = generator();
        let mut pipeline = ChunkPipeline::new(&generator, ChunkCoord::new(0, 0));
        pipeline.run(GenerationStage::Terrain);
        let _ = pipeline.finish();
    }

    #[test]
    fn test_generated_chunk_has_floor() {
        let grid = generator().generate(ChunkCoord::new(1, -1));
        let dims = grid.dims();
        for z in 0..dims.depth as i32 {
            for x in 0..dims.width as i32 {
                assert_eq!(grid.get(x, 0, z), Block::Bedrock);
            }
        }
    }

    #[test]
    fn test_introspection_matches_grid() {
        let generator = generator();
        let coord = ChunkCoord::new(-3, 2);
        let grid = generator.generate(coord);
        let [ox, _, oz] = grid.world_offset();
        for (x, z) in [(0, 0), (5, 9), (15, 15)] {
            assert_eq!(generator.biome_at(ox + x, oz + z), grid.biome(x, z));
            assert_eq!(generator.surface_height_at(ox + x, oz + z), grid.surface_height(x, z));
        }
    }
}
