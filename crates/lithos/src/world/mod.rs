//! # Chunk Lifecycle
//!
//! [`ChunkLifecycleManager`] owns every tracked chunk and advances the
//! world one tick at a time:
//!
//! 1. Every chunk with `dx² + dz² <= render_distance²` around the viewer's
//!    chunk is tracked; new ones enter as `Queued`.
//! 2. Queued chunks that left the circle are dropped.
//! 3. The nearest `chunks_per_tick` queued chunks run the whole generation
//!    pipeline, then are meshed against whatever neighbors are resident.
//! 4. Resident face neighbors of this tick's chunks, and edited chunks,
//!    are remeshed.
//! 5. Chunks beyond `(render_distance + unload_margin)²` are evicted and
//!    their buffers released.
//!
//! Neighbors are looked up by coordinate in the single owning map, so a
//! chunk never holds a reference to another chunk.

mod state;

use std::collections::hash_map::Entry;
use std::collections::{BTreeSet, HashMap};

use lithos_procedural::{Block, ChunkCoord, ChunkGenerator, GridDims, VoxelGrid, WorldConfig, WorldSeed};
use lithos_rendering::{
    collect_emissive, nearest_lights, FrustumCuller, MeshKind, MeshNeighbors, PointLight,
    SurfaceMesher,
};

use crate::error::{WorldError, WorldResult};
use crate::upload::{DrawCall, MeshUploader};

use state::ChunkEntry;
pub use state::ChunkState;

/// What a single tick did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Chunk containing the viewer.
    pub viewer_chunk: ChunkCoord,
    /// Chunks newly queued.
    pub enqueued: usize,
    /// Queued chunks dropped because they left the render circle.
    pub dropped: usize,
    /// Chunks generated and meshed.
    pub generated: usize,
    /// Ready chunks meshed again.
    pub remeshed: usize,
    /// Chunks evicted.
    pub evicted: usize,
    /// Ready chunks inside the frustum.
    pub visible: usize,
    /// Ready chunks outside the frustum.
    pub culled: usize,
}

/// Diagnostic counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WorldStats {
    /// Chunks holding a generated grid.
    pub resident: usize,
    /// Chunks ready to draw.
    pub ready: usize,
    /// Chunks waiting for generation.
    pub pending: usize,
    /// Chunks generated since the world was created or regenerated.
    pub generated_total: u64,
    /// Chunks evicted since the world was created or regenerated.
    pub evicted_total: u64,
    /// Remeshes of ready chunks since the world was created or regenerated.
    pub remeshed_total: u64,
    /// Visible ready chunks at the end of the last tick.
    pub visible_last_tick: usize,
    /// Culled ready chunks at the end of the last tick.
    pub culled_last_tick: usize,
}

/// Streams chunks around a viewer.
pub struct ChunkLifecycleManager {
    config: WorldConfig,
    generator: ChunkGenerator,
    mesher: SurfaceMesher,
    culler: FrustumCuller,
    chunks: HashMap<ChunkCoord, ChunkEntry>,
    pending: Vec<ChunkCoord>,
    viewer: [f32; 3],
    viewer_chunk: ChunkCoord,
    stats: WorldStats,
}

impl ChunkLifecycleManager {
    /// Creates an empty world.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::InvalidConfig`] if the config fails validation.
    pub fn new(seed: WorldSeed, config: WorldConfig) -> WorldResult<Self> {
        config.validate()?;
        let generator = ChunkGenerator::new(seed, &config);
        tracing::info!(seed = seed.value(), "world created");

        Ok(Self {
            config,
            generator,
            mesher: SurfaceMesher::new(),
            culler: FrustumCuller::new(),
            chunks: HashMap::new(),
            pending: Vec::new(),
            viewer: [0.0; 3],
            viewer_chunk: ChunkCoord::default(),
            stats: WorldStats::default(),
        })
    }

    /// World seed.
    #[must_use]
    pub const fn seed(&self) -> WorldSeed {
        self.generator.seed()
    }

    /// Current config snapshot.
    #[must_use]
    pub const fn config(&self) -> &WorldConfig {
        &self.config
    }

    const fn dims(&self) -> GridDims {
        self.config.grid
    }

    /// Advances the world by one frame slice.
    ///
    /// `view_projection` is column-major. Buffers for new and rebuilt
    /// meshes are created through `uploader`, and buffers of replaced or
    /// evicted meshes are released through it.
    pub fn tick(
        &mut self,
        viewer: [f32; 3],
        view_projection: &[[f32; 4]; 4],
        uploader: &mut dyn MeshUploader,
    ) -> TickReport {
        let dims = self.dims();
        let render = self.config.render;
        let center = ChunkCoord::containing(viewer[0].floor() as i32, viewer[2].floor() as i32, dims);
        self.viewer = viewer;
        self.viewer_chunk = center;
        self.culler.update(view_projection);

        let mut report = TickReport {
            viewer_chunk: center,
            ..TickReport::default()
        };

        let radius_sq = i64::from(render.render_distance).pow(2);
        report.enqueued = self.enqueue_circle(center, render.render_distance);
        report.dropped = self.prune_pending(center, radius_sq);

        self.pending
            .sort_unstable_by_key(|coord| (coord.distance_squared(center), *coord));
        let budget = (render.chunks_per_tick as usize).min(self.pending.len());
        let batch: Vec<ChunkCoord> = self.pending.drain(..budget).collect();

        // Generate the whole batch first so its chunks mesh against each other.
        for &coord in &batch {
            self.generate(coord);
        }
        for &coord in &batch {
            self.mesh(coord, uploader);
        }
        report.generated = batch.len();

        let mut rebuild: BTreeSet<ChunkCoord> = batch
            .iter()
            .flat_map(|coord| coord.neighbors())
            .filter(|coord| !batch.contains(coord))
            .collect();
        rebuild.extend(
            self.chunks
                .iter()
                .filter(|(_, entry)| entry.dirty)
                .map(|(coord, _)| *coord),
        );
        for coord in rebuild {
            let ready = self
                .chunks
                .get(&coord)
                .is_some_and(|entry| entry.state() == ChunkState::Ready);
            if ready {
                self.mesh(coord, uploader);
                report.remeshed += 1;
            }
        }

        let keep_sq = i64::from(render.render_distance + render.unload_margin).pow(2);
        report.evicted = self.evict(center, keep_sq, uploader);

        let (visible, culled) = self.visibility();
        report.visible = visible;
        report.culled = culled;

        self.stats.generated_total += report.generated as u64;
        self.stats.remeshed_total += report.remeshed as u64;
        self.stats.evicted_total += report.evicted as u64;
        self.stats.visible_last_tick = visible;
        self.stats.culled_last_tick = culled;

        tracing::debug!(
            x = center.x,
            z = center.z,
            enqueued = report.enqueued,
            dropped = report.dropped,
            generated = report.generated,
            remeshed = report.remeshed,
            evicted = report.evicted,
            pending = self.pending.len(),
            visible,
            culled,
            "world tick"
        );

        report
    }

    fn enqueue_circle(&mut self, center: ChunkCoord, radius: u32) -> usize {
        let r = radius as i32;
        let radius_sq = i64::from(radius).pow(2);
        let mut enqueued = 0;

        for dz in -r..=r {
            for dx in -r..=r {
                let coord = center.offset(dx, dz);
                if coord.distance_squared(center) > radius_sq {
                    continue;
                }
                if let Entry::Vacant(slot) = self.chunks.entry(coord) {
                    slot.insert(ChunkEntry::queued());
                    self.pending.push(coord);
                    enqueued += 1;
                }
            }
        }

        enqueued
    }

    fn prune_pending(&mut self, center: ChunkCoord, radius_sq: i64) -> usize {
        let before = self.pending.len();
        let chunks = &mut self.chunks;
        self.pending.retain(|coord| {
            let keep = coord.distance_squared(center) <= radius_sq;
            if !keep {
                chunks.remove(coord);
            }
            keep
        });
        before - self.pending.len()
    }

    fn generate(&mut self, coord: ChunkCoord) {
        let Some(entry) = self.chunks.get_mut(&coord) else {
            return;
        };
        entry.transition(ChunkState::Generating);
        entry.grid = Some(self.generator.generate(coord));
        tracing::debug!(x = coord.x, z = coord.z, "chunk generated");
    }

    /// Meshes a generated chunk and swaps in its new buffers.
    fn mesh(&mut self, coord: ChunkCoord, uploader: &mut dyn MeshUploader) {
        match self.chunks.get_mut(&coord) {
            Some(entry) if entry.grid.is_some() => entry.transition(ChunkState::Meshing),
            _ => return,
        }

        let (meshes, lights) = {
            let Some(center) = resident_grid(&self.chunks, coord) else {
                return;
            };
            let [pos_x, neg_x, pos_z, neg_z] =
                coord.neighbors().map(|neighbor| resident_grid(&self.chunks, neighbor));
            let neighbors = MeshNeighbors {
                center,
                pos_x,
                neg_x,
                pos_z,
                neg_z,
            };
            (self.mesher.mesh(&neighbors), collect_emissive(center))
        };

        let Some(entry) = self.chunks.get_mut(&coord) else {
            return;
        };
        entry.release_buffers(uploader);
        for kind in MeshKind::ALL {
            let (vertices, stride, indices) = meshes.stream(kind);
            if !indices.is_empty() {
                entry.buffers[kind.index()] =
                    Some(uploader.upload(coord, kind, vertices, stride, indices));
            }
        }
        entry.lights = lights;
        entry.dirty = false;
        entry.transition(ChunkState::Ready);
    }

    fn evict(&mut self, center: ChunkCoord, keep_sq: i64, uploader: &mut dyn MeshUploader) -> usize {
        let doomed: Vec<ChunkCoord> = self
            .chunks
            .iter()
            .filter(|(coord, entry)| {
                entry.grid.is_some() && coord.distance_squared(center) > keep_sq
            })
            .map(|(coord, _)| *coord)
            .collect();

        for coord in &doomed {
            if let Some(mut entry) = self.chunks.remove(coord) {
                entry.release_buffers(uploader);
                tracing::debug!(x = coord.x, z = coord.z, "chunk evicted");
            }
        }

        doomed.len()
    }

    fn visibility(&self) -> (usize, usize) {
        let dims = self.dims();
        let mut visible = 0;
        let mut culled = 0;
        for (coord, _) in self.ready_chunks() {
            if self.culler.test_chunk(coord, dims) {
                visible += 1;
            } else {
                culled += 1;
            }
        }
        (visible, culled)
    }

    fn ready_chunks(&self) -> impl Iterator<Item = (ChunkCoord, &ChunkEntry)> + '_ {
        self.chunks
            .iter()
            .filter(|(_, entry)| entry.state() == ChunkState::Ready)
            .map(|(coord, entry)| (*coord, entry))
    }

    /// Draw calls for every ready chunk inside the last tick's frustum,
    /// nearest chunk first. Empty streams produce no call.
    #[must_use]
    pub fn draw_calls(&self) -> Vec<DrawCall> {
        let dims = self.dims();
        let mut visible: Vec<(ChunkCoord, &ChunkEntry)> = self
            .ready_chunks()
            .filter(|(coord, _)| self.culler.test_chunk(*coord, dims))
            .collect();
        visible.sort_unstable_by_key(|(coord, _)| (coord.distance_squared(self.viewer_chunk), *coord));

        let mut calls = Vec::with_capacity(visible.len() * MeshKind::ALL.len());
        for (coord, entry) in visible {
            let world_offset = [coord.world_x(dims), 0, coord.world_z(dims)];
            for kind in MeshKind::ALL {
                if let Some(buffers) = entry.buffers(kind) {
                    calls.push(DrawCall {
                        coord,
                        kind,
                        vertex_buffer: buffers.vertex_buffer,
                        index_buffer: buffers.index_buffer,
                        index_count: buffers.index_count,
                        world_offset,
                    });
                }
            }
        }
        calls
    }

    /// Lights of all ready chunks, nearest to the viewer first, capped at
    /// `render.max_lights`.
    #[must_use]
    pub fn point_lights(&self) -> Vec<PointLight> {
        let mut ready: Vec<(ChunkCoord, &ChunkEntry)> = self.ready_chunks().collect();
        ready.sort_unstable_by_key(|(coord, _)| *coord);

        let mut lights: Vec<PointLight> = ready
            .iter()
            .flat_map(|(_, entry)| entry.lights.iter().copied())
            .collect();
        nearest_lights(&mut lights, self.viewer, self.config.render.max_lights);
        lights
    }

    fn locate(&self, x: i32, z: i32) -> (ChunkCoord, i32, i32) {
        let dims = self.dims();
        let coord = ChunkCoord::containing(x, z, dims);
        (coord, x - coord.world_x(dims), z - coord.world_z(dims))
    }

    /// Block at a world position.
    ///
    /// Below the world reads as bedrock and above it as air.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::ChunkNotResident`] if the chunk is not generated.
    pub fn block_at(&self, x: i32, y: i32, z: i32) -> WorldResult<Block> {
        let (coord, lx, lz) = self.locate(x, z);
        let grid = resident_grid(&self.chunks, coord).ok_or(WorldError::ChunkNotResident(coord))?;
        Ok(grid.get(lx, y, lz))
    }

    /// Terrain surface height of a world column, as recorded at generation.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::ChunkNotResident`] if the chunk is not generated.
    pub fn surface_height(&self, x: i32, z: i32) -> WorldResult<i32> {
        let (coord, lx, lz) = self.locate(x, z);
        let grid = resident_grid(&self.chunks, coord).ok_or(WorldError::ChunkNotResident(coord))?;
        Ok(grid.surface_height(lx, lz))
    }

    /// Replaces a block. The chunk, and the face neighbor when the block is
    /// on a chunk border, are remeshed on the next tick.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::OutOfBounds`] outside the world height and
    /// [`WorldError::ChunkNotResident`] if the chunk is not generated.
    pub fn set_block(&mut self, x: i32, y: i32, z: i32, block: Block) -> WorldResult<()> {
        let dims = self.dims();
        if y < 0 || y >= dims.height as i32 {
            return Err(WorldError::OutOfBounds { x, y, z });
        }

        let (coord, lx, lz) = self.locate(x, z);
        let edited = self
            .chunks
            .get_mut(&coord)
            .is_some_and(|entry| entry.set_block(lx, y, lz, block));
        if !edited {
            return Err(WorldError::ChunkNotResident(coord));
        }

        let borders = [
            (lx == dims.width as i32 - 1, coord.offset(1, 0)),
            (lx == 0, coord.offset(-1, 0)),
            (lz == dims.depth as i32 - 1, coord.offset(0, 1)),
            (lz == 0, coord.offset(0, -1)),
        ];
        for (on_border, neighbor) in borders {
            if on_border {
                if let Some(entry) = self.chunks.get_mut(&neighbor) {
                    entry.mark_dirty();
                }
            }
        }

        tracing::debug!(x, y, z, block = block.properties().name, "block set");
        Ok(())
    }

    /// Applies a new config snapshot.
    ///
    /// Render fields take effect on the next tick. Terrain fields only
    /// affect chunks generated from now on; call [`Self::regenerate`] to
    /// rebuild the resident ones.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::InvalidConfig`] if validation fails and
    /// [`WorldError::GridChangeRequiresRegenerate`] if the chunk dimensions
    /// differ. The current config stays in effect on error.
    pub fn apply_config(&mut self, config: WorldConfig) -> WorldResult<()> {
        if let Err(err) = config.validate() {
            tracing::warn!(error = %err, "world config rejected");
            return Err(err.into());
        }
        if config.grid != self.config.grid {
            tracing::warn!("world config rejected: chunk dimensions changed");
            return Err(WorldError::GridChangeRequiresRegenerate {
                from: self.config.grid,
                to: config.grid,
            });
        }

        let terrain_changed = !config.same_terrain(&self.config);
        if terrain_changed {
            self.generator = ChunkGenerator::new(self.generator.seed(), &config);
        }
        tracing::info!(
            terrain_changed,
            render_distance = config.render.render_distance,
            chunks_per_tick = config.render.chunks_per_tick,
            "world config applied"
        );
        self.config = config;
        Ok(())
    }

    /// Discards every chunk and restarts from `seed` and `config`.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::InvalidConfig`] if validation fails; the world
    /// is left untouched in that case.
    pub fn regenerate(
        &mut self,
        seed: WorldSeed,
        config: WorldConfig,
        uploader: &mut dyn MeshUploader,
    ) -> WorldResult<()> {
        if let Err(err) = config.validate() {
            tracing::warn!(error = %err, "world config rejected");
            return Err(err.into());
        }

        let discarded = self.chunks.len();
        for entry in self.chunks.values_mut() {
            entry.release_buffers(uploader);
        }
        self.chunks.clear();
        self.pending.clear();
        self.generator = ChunkGenerator::new(seed, &config);
        self.config = config;
        self.stats = WorldStats::default();

        tracing::info!(seed = seed.value(), discarded, "world regenerated");
        Ok(())
    }

    /// Current state of a tracked chunk.
    #[must_use]
    pub fn state(&self, coord: ChunkCoord) -> Option<ChunkState> {
        self.chunks.get(&coord).map(ChunkEntry::state)
    }

    /// Every state a tracked chunk has been in, oldest first.
    #[must_use]
    pub fn state_history(&self, coord: ChunkCoord) -> Option<&[ChunkState]> {
        self.chunks.get(&coord).map(ChunkEntry::history)
    }

    /// Coordinates of all generated chunks, sorted.
    #[must_use]
    pub fn resident_coords(&self) -> Vec<ChunkCoord> {
        let mut coords: Vec<ChunkCoord> = self
            .chunks
            .iter()
            .filter(|(_, entry)| entry.grid.is_some())
            .map(|(coord, _)| *coord)
            .collect();
        coords.sort_unstable();
        coords
    }

    /// Diagnostic counters.
    #[must_use]
    pub fn stats(&self) -> WorldStats {
        WorldStats {
            resident: self.chunks.values().filter(|e| e.grid.is_some()).count(),
            ready: self.ready_chunks().count(),
            pending: self.pending.len(),
            ..self.stats
        }
    }
}

fn resident_grid(chunks: &HashMap<ChunkCoord, ChunkEntry>, coord: ChunkCoord) -> Option<&VoxelGrid> {
    chunks.get(&coord).and_then(|entry| entry.grid.as_ref())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upload::NullUploader;

    const SEE_ALL: [[f32; 4]; 4] = [
        [1e-4, 0.0, 0.0, 0.0],
        [0.0, 1e-4, 0.0, 0.0],
        [0.0, 0.0, 1e-4, 0.0],
        [0.0, 0.0, 0.0, 1.0],
    ];

    fn world(render_distance: u32, chunks_per_tick: u32) -> ChunkLifecycleManager {
        let mut config = WorldConfig::default();
        config.render.render_distance = render_distance;
        config.render.chunks_per_tick = chunks_per_tick;
        ChunkLifecycleManager::new(WorldSeed::new(99), config).unwrap()
    }

    #[test]
    fn test_pending_sorted_nearest_first() {
        let mut world = world(2, 1);
        let mut uploader = NullUploader::default();

        world.tick([8.0, 80.0, 8.0], &SEE_ALL, &mut uploader);
        assert_eq!(world.resident_coords(), vec![ChunkCoord::new(0, 0)]);

        // Distance ties break on the coordinate order.
        world.tick([8.0, 80.0, 8.0], &SEE_ALL, &mut uploader);
        assert_eq!(
            world.resident_coords(),
            vec![ChunkCoord::new(-1, 0), ChunkCoord::new(0, 0)]
        );
    }

    #[test]
    fn test_queued_chunks_outside_circle_are_dropped() {
        let mut world = world(2, 1);
        let mut uploader = NullUploader::default();

        world.tick([8.0, 80.0, 8.0], &SEE_ALL, &mut uploader);
        assert_eq!(world.state(ChunkCoord::new(0, -2)), Some(ChunkState::Queued));

        // Ten chunks east: the whole old circle is out of range.
        let report = world.tick([168.0, 80.0, 8.0], &SEE_ALL, &mut uploader);
        assert_eq!(report.dropped, 12);
        assert_eq!(world.state(ChunkCoord::new(0, -2)), None);
        assert_eq!(report.evicted, 1);
        assert_eq!(world.state(ChunkCoord::new(0, 0)), None);
    }

    #[test]
    fn test_entry_set_block_requires_grid() {
        let mut entry = ChunkEntry::queued();
        assert!(!entry.set_block(0, 0, 0, Block::Stone));
        entry.mark_dirty();
        assert!(!entry.dirty);
    }
}
