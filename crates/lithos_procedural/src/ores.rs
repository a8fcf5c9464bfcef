//! Ore veins.
//!
//! Runs after terrain and before caves, so veins only ever replace stone
//! that the terrain stage laid down.

use crate::block::Block;
use crate::chunk::VoxelGrid;
use crate::config::{OreConfig, OreTierConfig};
use crate::rng::DeterministicRng;

/// One ore tier with its block.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OreTier {
    /// Block written into the vein.
    pub block: Block,
    /// Placement parameters.
    pub config: OreTierConfig,
}

/// Random-walk vein placer.
pub struct OreDepositor {
    tiers: Vec<OreTier>,
}

impl OreDepositor {
    /// Creates the default coal/iron/gold/diamond tiers.
    #[must_use]
    pub fn new(config: &OreConfig) -> Self {
        Self::with_tiers(vec![
            OreTier { block: Block::CoalOre, config: config.coal },
            OreTier { block: Block::IronOre, config: config.iron },
            OreTier { block: Block::GoldOre, config: config.gold },
            OreTier { block: Block::DiamondOre, config: config.diamond },
        ])
    }

    /// Creates a depositor with an explicit tier list.
    #[must_use]
    pub fn with_tiers(tiers: Vec<OreTier>) -> Self {
        Self { tiers }
    }

    /// Deposits every tier. Returns the number of ore blocks written.
    pub fn deposit(&self, grid: &mut VoxelGrid, rng: &mut DeterministicRng) -> usize {
        self.tiers
            .iter()
            .map(|tier| deposit_tier(grid, rng, tier))
            .sum()
    }
}

fn deposit_tier(grid: &mut VoxelGrid, rng: &mut DeterministicRng, tier: &OreTier) -> usize {
    let dims = grid.dims();
    let min_y = tier.config.min_y.max(0);
    let max_y = tier.config.max_y.min(dims.height as i32);
    if min_y >= max_y {
        return 0;
    }

    let max_x = dims.width as i32 - 1;
    let max_z = dims.depth as i32 - 1;
    let mut placed = 0;

    for _ in 0..tier.config.attempts {
        let mut x = rng.range(0, dims.width as i32);
        let mut y = rng.range(min_y, max_y);
        let mut z = rng.range(0, dims.depth as i32);

        if grid.get(x, y, z) != Block::Stone {
            continue;
        }

        for _ in 0..tier.config.vein_size {
            x = (x + rng.step()).clamp(0, max_x);
            y = (y + rng.step()).clamp(min_y, max_y - 1);
            z = (z + rng.step()).clamp(0, max_z);

            if grid.get(x, y, z) == Block::Stone {
                grid.set(x, y, z, tier.block);
                placed += 1;
            }
        }
    }

    placed
}
