//! # Hydrology
//!
//! Last pipeline stage. Water placed by the terrain stage is provisional:
//! caves may have opened holes under it and trees may have displaced it.
//! This stage rebuilds all water in four phases:
//!
//! 1. Clear every water cell.
//! 2. Fill basins: columns whose top solid is below sea level get still
//!    water up to sea level.
//! 3. Flood: still water spreads through adjacent air (4 horizontal
//!    neighbors and down) while `1 <= y <= sea_level`.
//! 4. Cascade: sea-level water next to air spills as flowing water,
//!    falling freely and spreading at most [`CASCADE_LIMIT`] cells sideways.

use std::collections::{HashMap, VecDeque};

use crate::block::Block;
use crate::chunk::VoxelGrid;

/// Horizontal spread limit of flowing water.
pub const CASCADE_LIMIT: u8 = 7;

/// Horizontal directions in fixed enumeration order: +X, -X, +Z, -Z.
const HORIZONTAL: [(i32, i32); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

/// Cell counts per phase.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HydrologyReport {
    /// Cells cleared in phase 1.
    pub cleared: usize,
    /// Still water placed by the basin fill.
    pub basins: usize,
    /// Still water placed by the flood fill.
    pub flooded: usize,
    /// Flowing water placed by the cascade.
    pub flowing: usize,
}

/// Water placement.
pub struct HydrologyFiller {
    sea_level: i32,
}

impl HydrologyFiller {
    /// Creates a filler for the given sea level.
    #[must_use]
    pub const fn new(sea_level: i32) -> Self {
        Self { sea_level }
    }

    /// Runs all four phases.
    pub fn fill(&self, grid: &mut VoxelGrid) -> HydrologyReport {
        HydrologyReport {
            cleared: self.clear_water(grid),
            basins: self.fill_basins(grid),
            flooded: self.flood(grid),
            flowing: self.cascade(grid),
        }
    }

    /// Phase 1.
    pub fn clear_water(&self, grid: &mut VoxelGrid) -> usize {
        let water: Vec<[i32; 3]> = grid
            .iter()
            .filter(|(_, block)| block.is_water())
            .map(|(pos, _)| pos)
            .collect();
        for &[x, y, z] in &water {
            grid.set(x, y, z, Block::Air);
        }
        water.len()
    }

    /// Phase 2.
    pub fn fill_basins(&self, grid: &mut VoxelGrid) -> usize {
        let dims = grid.dims();
        let ceiling = self.sea_level.min(dims.height as i32 - 1);
        let mut placed = 0;

        for z in 0..dims.depth as i32 {
            for x in 0..dims.width as i32 {
                let floor = grid.top_solid(x, z).unwrap_or(-1);
                if floor >= self.sea_level {
                    continue;
                }
                for y in floor + 1..=ceiling {
                    if grid.get(x, y, z).is_air() {
                        grid.set(x, y, z, Block::Water);
                        placed += 1;
                    }
                }
            }
        }

        placed
    }

    /// Phase 3.
    pub fn flood(&self, grid: &mut VoxelGrid) -> usize {
        let dims = grid.dims();
        let mut visited = vec![false; dims.volume()];
        let mut queue = VecDeque::new();

        for ([x, y, z], block) in grid.iter() {
            if block == Block::Water && self.open_neighbors(grid, x, y, z).next().is_some() {
                visited[grid.index(x as u32, y as u32, z as u32)] = true;
                queue.push_back([x, y, z]);
            }
        }

        let mut placed = 0;
        while let Some([x, y, z]) = queue.pop_front() {
            let open: Vec<[i32; 3]> = self.open_neighbors(grid, x, y, z).collect();
            for [nx, ny, nz] in open {
                if ny < 1 || ny > self.sea_level {
                    continue;
                }
                let slot = grid.index(nx as u32, ny as u32, nz as u32);
                if visited[slot] {
                    continue;
                }
                visited[slot] = true;
                grid.set(nx, ny, nz, Block::Water);
                placed += 1;
                queue.push_back([nx, ny, nz]);
            }
        }

        placed
    }

    /// Phase 4.
    pub fn cascade(&self, grid: &mut VoxelGrid) -> usize {
        let dims = grid.dims();
        if self.sea_level < 1 || self.sea_level >= dims.height as i32 {
            return 0;
        }

        let mut best: HashMap<usize, u8> = HashMap::new();
        let mut queue = FlowQueue::new();

        let y = self.sea_level;
        for z in 0..dims.depth as i32 {
            for x in 0..dims.width as i32 {
                if grid.get(x, y, z) != Block::Water {
                    continue;
                }
                let open: Vec<[i32; 3]> = self.open_neighbors(grid, x, y, z).collect();
                for [nx, ny, nz] in open {
                    let distance = u8::from(ny == y);
                    push_flow(grid, &mut best, &mut queue, [nx, ny, nz], distance);
                }
            }
        }

        let mut placed = 0;
        while let Some(([x, y, z], distance)) = queue.pop_front() {
            let slot = grid.index(x as u32, y as u32, z as u32);
            if best.get(&slot).is_some_and(|&known| known < distance) {
                continue;
            }
            match grid.get(x, y, z) {
                Block::Air => {
                    grid.set(x, y, z, Block::FlowingWater);
                    placed += 1;
                }
                // Reached again with a shorter distance: spread from here anew.
                Block::FlowingWater => {}
                _ => continue,
            }

            if y > 1 && carries_flow(grid.get(x, y - 1, z)) {
                push_flow(grid, &mut best, &mut queue, [x, y - 1, z], 0);
                continue;
            }
            let next = distance + 1;
            if next > CASCADE_LIMIT {
                continue;
            }
            for (dx, dz) in HORIZONTAL {
                let (nx, nz) = (x + dx, z + dz);
                if grid.dims().contains(nx, y, nz) && carries_flow(grid.get(nx, y, nz)) {
                    push_flow(grid, &mut best, &mut queue, [nx, y, nz], next);
                }
            }
        }

        placed
    }

    /// In-chunk air cells reachable from (x, y, z): +X, -X, +Z, -Z, then down.
    fn open_neighbors<'a>(
        &self,
        grid: &'a VoxelGrid,
        x: i32,
        y: i32,
        z: i32,
    ) -> impl Iterator<Item = [i32; 3]> + 'a {
        HORIZONTAL
            .iter()
            .map(move |&(dx, dz)| [x + dx, y, z + dz])
            .chain(std::iter::once([x, y - 1, z]))
            .filter(move |&[nx, ny, nz]| grid.dims().contains(nx, ny, nz) && grid.get(nx, ny, nz).is_air())
    }
}

/// Cells flowing water may enter or re-enter.
const fn carries_flow(block: Block) -> bool {
    matches!(block, Block::Air | Block::FlowingWater)
}

/// Queues `distance` for a cell unless it is already known at that distance or less.
fn push_flow(
    grid: &VoxelGrid,
    best: &mut HashMap<usize, u8>,
    queue: &mut FlowQueue,
    [x, y, z]: [i32; 3],
    distance: u8,
) {
    let slot = grid.index(x as u32, y as u32, z as u32);
    if best.get(&slot).is_some_and(|&known| known <= distance) {
        return;
    }
    best.insert(slot, distance);
    queue.push_back(([x, y, z], distance));
}

type FlowQueue = VecDeque<([i32; 3], u8)>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::{ChunkCoord, GridDims};

    fn floor_grid(floor: i32) -> VoxelGrid {
        let dims = GridDims::new(8, 64, 8);
        let mut grid = VoxelGrid::new(ChunkCoord::new(0, 0), dims);
        for z in 0..8 {
            for x in 0..8 {
                for y in 0..=floor {
                    grid.set(x, y, z, Block::Stone);
                }
            }
        }
        grid
    }

    #[test]
    fn test_clear_removes_all_water() {
        let mut grid = floor_grid(5);
        grid.set(1, 6, 1, Block::Water);
        grid.set(2, 6, 1, Block::FlowingWater);
        let filler = HydrologyFiller::new(50);
        assert_eq!(filler.clear_water(&mut grid), 2);
        assert_eq!(grid.count(Block::Water) + grid.count(Block::FlowingWater), 0);
    }

    #[test]
    fn test_basin_fill_reaches_sea_level() {
        let mut grid = floor_grid(20);
        let filler = HydrologyFiller::new(50);
        let placed = filler.fill_basins(&mut grid);

        assert_eq!(placed, 8 * 8 * 30);
        assert_eq!(grid.get(3, 21, 3), Block::Water);
        assert_eq!(grid.get(3, 50, 3), Block::Water);
        assert_eq!(grid.get(3, 51, 3), Block::Air);
    }

    #[test]
    fn test_flood_fills_cave_under_basin() {
        let mut grid = floor_grid(20);
        // Shaft down to a tunnel that runs under a dry shelf.
        for z in 0..8 {
            for x in 4..8 {
                for y in 21..=55 {
                    grid.set(x, y, z, Block::Stone);
                }
            }
        }
        for x in 4..7 {
            grid.set(x, 10, 3, Block::Air);
        }
        grid.set(3, 20, 3, Block::Air);
        for y in 10..20 {
            grid.set(3, y, 3, Block::Air);
        }

        let filler = HydrologyFiller::new(50);
        filler.fill_basins(&mut grid);
        let flooded = filler.flood(&mut grid);

        assert_eq!(flooded, 3);
        assert_eq!(grid.get(3, 10, 3), Block::Water);
        assert_eq!(grid.get(6, 10, 3), Block::Water);
        assert_eq!(grid.get(5, 30, 3), Block::Stone);
    }

    #[test]
    fn test_cascade_spills_over_ledge() {
        // Sea-level pool on the -X half, a dry terrace one block below sea
        // level with a drop beyond it.
        let dims = GridDims::new(16, 32, 4);
        let mut grid = VoxelGrid::new(ChunkCoord::new(0, 0), dims);
        for z in 0..4 {
            for x in 0..16 {
                let top = if x < 4 { 5 } else if x < 12 { 9 } else { 2 };
                for y in 0..=top {
                    grid.set(x, y, z, Block::Stone);
                }
            }
            for x in 0..4 {
                for y in 6..=10 {
                    grid.set(x, y, z, Block::Water);
                }
            }
        }

        let filler = HydrologyFiller::new(10);
        let flowing = filler.cascade(&mut grid);

        assert!(flowing > 0);
        assert_eq!(grid.get(4, 10, 0), Block::FlowingWater);
        // Seven cells of horizontal spread from the pool edge.
        assert_eq!(grid.get(10, 10, 0), Block::FlowingWater);
        assert_eq!(grid.get(11, 10, 0), Block::Air);
    }

    #[test]
    fn test_cascade_resets_distance_when_falling_onto_flow() {
        // Pool at x = 0 feeding an upper walk (z = 1) and, through roof
        // holes at x = 1 and x = 6, a lower corridor (z = 0).
        let dims = GridDims::new(16, 8, 3);
        let mut grid = VoxelGrid::new(ChunkCoord::new(0, 0), dims);
        for z in 0..3 {
            for x in 0..16 {
                for y in 0..8 {
                    grid.set(x, y, z, Block::Stone);
                }
            }
        }
        grid.set(0, 5, 0, Block::Water);
        grid.set(0, 5, 1, Block::Water);
        for x in 1..16 {
            grid.set(x, 5, 1, Block::Air);
            grid.set(x, 4, 0, Block::Air);
        }
        grid.set(1, 5, 0, Block::Air);
        grid.set(6, 5, 0, Block::Air);

        let filler = HydrologyFiller::new(5);
        filler.cascade(&mut grid);

        assert_eq!(grid.get(6, 5, 0), Block::FlowingWater);
        // The fall through the second hole restarts the spread from x = 6.
        assert_eq!(grid.get(9, 4, 0), Block::FlowingWater);
        assert_eq!(grid.get(13, 4, 0), Block::FlowingWater);
        assert_eq!(grid.get(14, 4, 0), Block::Air);
        // The upper walk is not reset and stops seven cells from the pool.
        assert_eq!(grid.get(7, 5, 1), Block::FlowingWater);
        assert_eq!(grid.get(8, 5, 1), Block::Air);
    }

    #[test]
    fn test_fill_is_idempotent() {
        let mut grid = floor_grid(20);
        let filler = HydrologyFiller::new(50);
        let first = filler.fill(&mut grid);
        let snapshot = grid.as_bytes().to_vec();
        let second = filler.fill(&mut grid);

        assert_eq!(grid.as_bytes(), snapshot.as_slice());
        assert_eq!(first.basins, second.basins);
        assert_eq!(second.cleared, first.basins + first.flooded + first.flowing);
    }
}
