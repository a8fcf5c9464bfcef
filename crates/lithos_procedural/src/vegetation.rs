//! # Trees and Ground Cover
//!
//! Trees run as their own pipeline stage and record which columns they
//! used; ground cover runs afterwards and skips those columns.

use crate::block::Block;
use crate::chunk::VoxelGrid;
use crate::config::{TreeConfig, VegetationConfig};
use crate::rng::DeterministicRng;

/// Leaf rings relative to the trunk top: (y offset, radius).
const LEAF_RINGS: [(i32, i32); 3] = [(-2, 3), (-1, 2), (0, 1)];

/// Air needed above the surface beyond the tallest trunk.
const CANOPY_CLEARANCE: i32 = 2;

/// Ground cover split: tall grass, then flower, remainder fern.
const TALL_GRASS_SHARE: f64 = 0.70;
const FLOWER_SHARE: f64 = 0.15;

/// Columns already claimed by a tree trunk.
#[derive(Clone, Debug)]
pub struct TreeMask {
    width: usize,
    used: Vec<bool>,
}

impl TreeMask {
    /// Creates an empty mask for a `width x depth` chunk.
    #[must_use]
    pub fn new(width: u32, depth: u32) -> Self {
        Self {
            width: width as usize,
            used: vec![false; width as usize * depth as usize],
        }
    }

    fn slot(&self, x: i32, z: i32) -> usize {
        z as usize * self.width + x as usize
    }

    /// Marks a column.
    pub fn mark(&mut self, x: i32, z: i32) {
        let slot = self.slot(x, z);
        self.used[slot] = true;
    }

    /// Returns true if a tree used this column.
    #[must_use]
    pub fn is_used(&self, x: i32, z: i32) -> bool {
        self.used[self.slot(x, z)]
    }

    /// Number of marked columns.
    #[must_use]
    pub fn count(&self) -> usize {
        self.used.iter().filter(|&&u| u).count()
    }
}

/// Tree and plant placement.
pub struct VegetationPlacer {
    trees: TreeConfig,
    density: f64,
}

impl VegetationPlacer {
    /// Creates a placer.
    #[must_use]
    pub fn new(trees: TreeConfig, vegetation: VegetationConfig) -> Self {
        Self {
            trees,
            density: vegetation.density,
        }
    }

    /// Tree stage. Returns the columns used by trunks.
    pub fn place_trees(&self, grid: &mut VoxelGrid, rng: &mut DeterministicRng) -> TreeMask {
        let dims = grid.dims();
        let mut mask = TreeMask::new(dims.width, dims.depth);

        let attempts = (f64::from(self.trees.per_chunk) * mean_tree_density(grid)).round() as u32;
        let clearance = self.trees.max_trunk_height as i32 + CANOPY_CLEARANCE;

        for _ in 0..attempts {
            let x = rng.range(0, dims.width as i32);
            let z = rng.range(0, dims.depth as i32);

            let Some((ground, block)) = grid.top_block(x, z) else {
                continue;
            };
            if !matches!(block, Block::Grass | Block::Dirt | Block::Snow) {
                continue;
            }
            if ground + clearance >= dims.height as i32 {
                continue;
            }
            if !(1..=clearance).all(|dy| grid.get(x, ground + dy, z).is_air()) {
                continue;
            }
            if !rng.chance(grid.biome(x, z).tree_acceptance()) {
                continue;
            }

            let trunk = rng.range_inclusive(self.trees.min_trunk_height, self.trees.max_trunk_height);
            self.grow_tree(grid, rng, [x, ground, z], trunk as i32);
            mask.mark(x, z);
        }

        mask
    }

    fn grow_tree(&self, grid: &mut VoxelGrid, rng: &mut DeterministicRng, base: [i32; 3], trunk: i32) {
        let [x, ground, z] = base;

        grid.set(x, ground, z, Block::Dirt);
        for dy in 1..=trunk {
            grid.set(x, ground + dy, z, Block::Log);
        }

        let top = ground + trunk;
        for (dy, radius) in LEAF_RINGS {
            let y = top + dy;
            for dz in -radius..=radius {
                for dx in -radius..=radius {
                    let corner = dx.abs() == radius && dz.abs() == radius;
                    if corner && rng.chance(self.trees.leaf_decay_chance) {
                        continue;
                    }
                    place_leaf(grid, x + dx, y, z + dz);
                }
            }
        }

        // Top cross.
        for (dx, dz) in [(0, 0), (1, 0), (-1, 0), (0, 1), (0, -1)] {
            place_leaf(grid, x + dx, top + 1, z + dz);
        }
    }

    /// Vegetation stage. Returns the number of plants placed.
    pub fn place_ground_cover(
        &self,
        grid: &mut VoxelGrid,
        rng: &mut DeterministicRng,
        trees: &TreeMask,
    ) -> usize {
        let dims = grid.dims();
        let mut placed = 0;

        for z in 0..dims.depth as i32 {
            for x in 0..dims.width as i32 {
                if trees.is_used(x, z) || !grid.biome(x, z).has_ground_cover() {
                    continue;
                }
                let Some((ground, Block::Grass)) = ground_below_canopy(grid, x, z) else {
                    continue;
                };
                if ground + 1 >= dims.height as i32
                    || !grid.get(x, ground + 1, z).is_air()
                    || !rng.chance(self.density)
                {
                    continue;
                }

                let roll = rng.next_f64();
                let plant = if roll < TALL_GRASS_SHARE {
                    Block::TallGrass
                } else if roll < TALL_GRASS_SHARE + FLOWER_SHARE {
                    Block::Flower
                } else {
                    Block::Fern
                };
                grid.set(x, ground + 1, z, plant);
                placed += 1;
            }
        }

        placed
    }
}

/// Tree density averaged over every column of the chunk.
fn mean_tree_density(grid: &VoxelGrid) -> f64 {
    let dims = grid.dims();
    let columns = f64::from(dims.width * dims.depth);
    let total: f64 = (0..dims.depth as i32)
        .flat_map(|z| (0..dims.width as i32).map(move |x| (x, z)))
        .map(|(x, z)| grid.biome(x, z).tree_density())
        .sum();
    total / columns
}

/// Topmost block of a column that is neither air nor leaves.
fn ground_below_canopy(grid: &VoxelGrid, x: i32, z: i32) -> Option<(i32, Block)> {
    (0..grid.dims().height as i32)
        .rev()
        .map(|y| (y, grid.get(x, y, z)))
        .find(|&(_, block)| !block.is_air() && block != Block::Leaves)
}

fn place_leaf(grid: &mut VoxelGrid, x: i32, y: i32, z: i32) {
    if grid.get(x, y, z).is_air() {
        grid.set(x, y, z, Block::Leaves);
    }
}
