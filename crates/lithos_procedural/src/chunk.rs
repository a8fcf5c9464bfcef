//! # Chunk System
//!
//! World data is organized into fixed-size chunks so only the area around
//! the viewer is resident and chunks can be generated and discarded quickly.
//!
//! ## Grid Format
//!
//! A chunk is `width x height x depth` blocks (default 16x128x16), stored
//! as one dense byte array of block ids. Index order is X fastest, then Y,
//! then Z.
//!
//! ## Vertical Sentinels
//!
//! Solidity queries below y = 0 report solid (the world has a floor) and
//! queries at or above `height` report empty (open sky).

use std::fmt;

use ndshape::{RuntimeShape, Shape};
use serde::{Deserialize, Serialize};

use crate::biome::Biome;
use crate::block::Block;

/// Chunk coordinate (identifies a chunk in the world grid).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkCoord {
    /// X coordinate (in chunks, not blocks).
    pub x: i32,
    /// Z coordinate (in chunks, not blocks).
    pub z: i32,
}

impl ChunkCoord {
    /// Creates a new chunk coordinate.
    #[inline]
    #[must_use]
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Converts world block coordinates to the chunk containing them.
    #[inline]
    #[must_use]
    pub const fn containing(block_x: i32, block_z: i32, dims: GridDims) -> Self {
        Self {
            x: block_x.div_euclid(dims.width as i32),
            z: block_z.div_euclid(dims.depth as i32),
        }
    }

    /// Returns the world X coordinate of the chunk's origin (corner).
    #[inline]
    #[must_use]
    pub const fn world_x(self, dims: GridDims) -> i32 {
        self.x * dims.width as i32
    }

    /// Returns the world Z coordinate of the chunk's origin.
    #[inline]
    #[must_use]
    pub const fn world_z(self, dims: GridDims) -> i32 {
        self.z * dims.depth as i32
    }

    /// Returns the coordinate shifted by a chunk delta.
    #[inline]
    #[must_use]
    pub const fn offset(self, dx: i32, dz: i32) -> Self {
        Self {
            x: self.x + dx,
            z: self.z + dz,
        }
    }

    /// Squared chunk distance to another coordinate.
    #[inline]
    #[must_use]
    pub const fn distance_squared(self, other: Self) -> i64 {
        let dx = (self.x - other.x) as i64;
        let dz = (self.z - other.z) as i64;
        dx * dx + dz * dz
    }

    /// The four face-sharing neighbors, ordered +X, -X, +Z, -Z.
    #[inline]
    #[must_use]
    pub const fn neighbors(self) -> [Self; 4] {
        [
            self.offset(1, 0),
            self.offset(-1, 0),
            self.offset(0, 1),
            self.offset(0, -1),
        ]
    }
}

impl fmt::Display for ChunkCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.z)
    }
}

/// Chunk dimensions in blocks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct GridDims {
    /// Blocks along X.
    pub width: u32,
    /// Blocks along Y.
    pub height: u32,
    /// Blocks along Z.
    pub depth: u32,
}

impl Default for GridDims {
    fn default() -> Self {
        Self {
            width: 16,
            height: 128,
            depth: 16,
        }
    }
}

impl GridDims {
    /// Creates dimensions.
    #[must_use]
    pub const fn new(width: u32, height: u32, depth: u32) -> Self {
        Self {
            width,
            height,
            depth,
        }
    }

    /// Total cells.
    #[inline]
    #[must_use]
    pub const fn volume(self) -> usize {
        self.width as usize * self.height as usize * self.depth as usize
    }

    /// Number of columns (width x depth).
    #[inline]
    #[must_use]
    pub const fn columns(self) -> usize {
        self.width as usize * self.depth as usize
    }

    /// Returns true if the local coordinate lies inside the grid.
    #[inline]
    #[must_use]
    pub const fn contains(self, x: i32, y: i32, z: i32) -> bool {
        x >= 0
            && y >= 0
            && z >= 0
            && x < self.width as i32
            && y < self.height as i32
            && z < self.depth as i32
    }
}

/// Dense block grid for one chunk, plus per-column biome and surface
/// height recorded by the terrain stage.
pub struct VoxelGrid {
    coord: ChunkCoord,
    dims: GridDims,
    shape: RuntimeShape<u32, 3>,
    blocks: Box<[u8]>,
    biomes: Box<[Biome]>,
    heights: Box<[i32]>,
}

impl VoxelGrid {
    /// Creates an all-air grid.
    #[must_use]
    pub fn new(coord: ChunkCoord, dims: GridDims) -> Self {
        Self::filled(coord, dims, Block::Air)
    }

    /// Creates a grid where every cell holds `block`.
    #[must_use]
    pub fn filled(coord: ChunkCoord, dims: GridDims, block: Block) -> Self {
        Self::from_ids(coord, dims, vec![block.id(); dims.volume()])
    }

    /// Wraps an existing id array.
    ///
    /// # Panics
    ///
    /// Panics if the array length is not exactly `width * height * depth`.
    #[must_use]
    pub fn from_ids(coord: ChunkCoord, dims: GridDims, ids: Vec<u8>) -> Self {
        assert_eq!(
            ids.len(),
            dims.volume(),
            "block array length must equal width * height * depth"
        );
        Self {
            coord,
            dims,
            shape: RuntimeShape::<u32, 3>::new([dims.width, dims.height, dims.depth]),
            blocks: ids.into_boxed_slice(),
            biomes: vec![Biome::Plains; dims.columns()].into_boxed_slice(),
            heights: vec![0; dims.columns()].into_boxed_slice(),
        }
    }

    /// Chunk coordinate.
    #[inline]
    #[must_use]
    pub const fn coord(&self) -> ChunkCoord {
        self.coord
    }

    /// Grid dimensions.
    #[inline]
    #[must_use]
    pub const fn dims(&self) -> GridDims {
        self.dims
    }

    /// World-space position of local (0, 0, 0).
    #[inline]
    #[must_use]
    pub const fn world_offset(&self) -> [i32; 3] {
        [self.coord.world_x(self.dims), 0, self.coord.world_z(self.dims)]
    }

    /// Linear index of an in-bounds local coordinate.
    #[inline]
    #[must_use]
    pub fn index(&self, x: u32, y: u32, z: u32) -> usize {
        self.shape.linearize([x, y, z]) as usize
    }

    /// Local coordinate of a linear index.
    #[inline]
    #[must_use]
    pub fn position(&self, index: usize) -> [u32; 3] {
        self.shape.delinearize(index as u32)
    }

    #[inline]
    fn checked_index(&self, x: i32, y: i32, z: i32) -> Option<usize> {
        self.dims
            .contains(x, y, z)
            .then(|| self.index(x as u32, y as u32, z as u32))
    }

    /// Gets the block at a local coordinate.
    ///
    /// Below the grid reads as bedrock; above it and outside the horizontal
    /// bounds reads as air.
    #[inline]
    #[must_use]
    pub fn get(&self, x: i32, y: i32, z: i32) -> Block {
        if y < 0 {
            return Block::Bedrock;
        }
        self.checked_index(x, y, z)
            .and_then(|i| Block::from_id(self.blocks[i]))
            .unwrap_or(Block::Air)
    }

    /// Sets the block at a local coordinate. Returns false if out of bounds.
    #[inline]
    pub fn set(&mut self, x: i32, y: i32, z: i32, block: Block) -> bool {
        match self.checked_index(x, y, z) {
            Some(i) => {
                self.blocks[i] = block.id();
                true
            }
            None => false,
        }
    }

    /// Solidity query with vertical sentinels.
    #[inline]
    #[must_use]
    pub fn is_solid(&self, x: i32, y: i32, z: i32) -> bool {
        if y < 0 {
            return true;
        }
        if y >= self.dims.height as i32 {
            return false;
        }
        self.get(x, y, z).is_solid()
    }

    #[inline]
    fn column_index(&self, x: i32, z: i32) -> Option<usize> {
        (x >= 0 && z >= 0 && x < self.dims.width as i32 && z < self.dims.depth as i32)
            .then(|| z as usize * self.dims.width as usize + x as usize)
    }

    /// Biome recorded for a column.
    #[must_use]
    pub fn biome(&self, x: i32, z: i32) -> Biome {
        self.column_index(x, z)
            .map_or(Biome::Plains, |i| self.biomes[i])
    }

    /// Records the biome of a column.
    pub fn set_biome(&mut self, x: i32, z: i32, biome: Biome) {
        if let Some(i) = self.column_index(x, z) {
            self.biomes[i] = biome;
        }
    }

    /// Terrain surface height recorded for a column.
    #[must_use]
    pub fn surface_height(&self, x: i32, z: i32) -> i32 {
        self.column_index(x, z).map_or(0, |i| self.heights[i])
    }

    /// Records the terrain surface height of a column.
    pub fn set_surface_height(&mut self, x: i32, z: i32, height: i32) {
        if let Some(i) = self.column_index(x, z) {
            self.heights[i] = height;
        }
    }

    /// Scans a column top-down for the first non-air block.
    #[must_use]
    pub fn top_block(&self, x: i32, z: i32) -> Option<(i32, Block)> {
        (0..self.dims.height as i32)
            .rev()
            .map(|y| (y, self.get(x, y, z)))
            .find(|(_, block)| !block.is_air())
    }

    /// Scans a column top-down for the first solid block.
    #[must_use]
    pub fn top_solid(&self, x: i32, z: i32) -> Option<i32> {
        (0..self.dims.height as i32)
            .rev()
            .find(|&y| self.get(x, y, z).is_solid())
    }

    /// Raw id array.
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.blocks
    }

    /// Counts cells holding `block`.
    #[must_use]
    pub fn count(&self, block: Block) -> usize {
        let id = block.id();
        self.blocks.iter().filter(|&&b| b == id).count()
    }

    /// Iterates every cell as (local position, block).
    pub fn iter(&self) -> impl Iterator<Item = ([i32; 3], Block)> + '_ {
        self.blocks.iter().enumerate().map(|(i, &id)| {
            let [x, y, z] = self.position(i);
            (
                [x as i32, y as i32, z as i32],
                Block::from_id(id).unwrap_or(Block::Air),
            )
        })
    }
}

impl Clone for VoxelGrid {
    fn clone(&self) -> Self {
        let mut copy = Self::from_ids(self.coord, self.dims, self.blocks.to_vec());
        copy.biomes.clone_from(&self.biomes);
        copy.heights.clone_from(&self.heights);
        copy
    }
}

impl fmt::Debug for VoxelGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VoxelGrid")
            .field("coord", &self.coord)
            .field("dims", &self.dims)
            .finish_non_exhaustive()
    }
}
