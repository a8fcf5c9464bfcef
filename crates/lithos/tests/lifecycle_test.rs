//! # Chunk Lifecycle Tests
//!
//! Loading, eviction, state ordering, edits, config changes and lights,
//! observed through a recording uploader.

use std::collections::HashMap;

use lithos::{
    BufferId, ChunkLifecycleManager, ChunkState, MeshBuffers, MeshUploader, WorldError,
};
use lithos_procedural::{Block, ChunkCoord, GridDims, WorldConfig, WorldSeed};
use lithos_rendering::MeshKind;

/// Accepts everything within 10 000 blocks.
const SEE_ALL: [[f32; 4]; 4] = [
    [1e-4, 0.0, 0.0, 0.0],
    [0.0, 1e-4, 0.0, 0.0],
    [0.0, 0.0, 1e-4, 0.0],
    [0.0, 0.0, 0.0, 1.0],
];

/// Keeps every live buffer pair and the chunk it belongs to.
#[derive(Default)]
struct RecordingUploader {
    next_id: u64,
    live: HashMap<BufferId, (ChunkCoord, MeshKind)>,
    uploads: usize,
    releases: usize,
}

impl RecordingUploader {
    fn live_for(&self, coord: ChunkCoord) -> usize {
        self.live.values().filter(|(c, _)| *c == coord).count()
    }
}

impl MeshUploader for RecordingUploader {
    fn upload(
        &mut self,
        coord: ChunkCoord,
        kind: MeshKind,
        vertices: &[u8],
        stride: u32,
        indices: &[u32],
    ) -> MeshBuffers {
        assert!(!indices.is_empty(), "empty stream uploaded");
        assert_eq!(vertices.len() % stride as usize, 0);
        let vertex_count = (vertices.len() / stride as usize) as u32;
        assert!(indices.iter().all(|&i| i < vertex_count));

        let vertex_buffer = BufferId(self.next_id);
        let index_buffer = BufferId(self.next_id + 1);
        self.next_id += 2;
        self.live.insert(vertex_buffer, (coord, kind));
        self.uploads += 1;
        MeshBuffers {
            vertex_buffer,
            index_buffer,
            index_count: indices.len() as u32,
        }
    }

    fn release(&mut self, buffers: MeshBuffers) {
        assert!(
            self.live.remove(&buffers.vertex_buffer).is_some(),
            "buffer released twice"
        );
        self.releases += 1;
    }
}

fn config(render_distance: u32, chunks_per_tick: u32) -> WorldConfig {
    let mut config = WorldConfig::default();
    config.render.render_distance = render_distance;
    config.render.chunks_per_tick = chunks_per_tick;
    config
}

/// Center of chunk `(cx, cz)` at a height above any terrain.
fn viewer_over(cx: i32, cz: i32) -> [f32; 3] {
    [cx as f32 * 16.0 + 8.0, 100.0, cz as f32 * 16.0 + 8.0]
}

fn is_valid_history(history: &[ChunkState]) -> bool {
    use ChunkState::{Generating, Meshing, Queued, Ready};
    let prefix = [Queued, Generating, Meshing, Ready];
    let head = history.len().min(4);
    if history[..head] != prefix[..head] {
        return false;
    }
    history.get(4..).map_or(true, |tail| {
        tail.chunks(2)
            .all(|pair| pair[0] == Meshing && pair.get(1).map_or(true, |s| *s == Ready))
    })
}

#[test]
fn test_enqueued_set_is_the_render_circle() {
    let mut world = ChunkLifecycleManager::new(WorldSeed::new(1), config(2, 1)).unwrap();
    let mut uploader = RecordingUploader::default();

    let report = world.tick(viewer_over(0, 0), &SEE_ALL, &mut uploader);
    assert_eq!(report.viewer_chunk, ChunkCoord::new(0, 0));
    assert_eq!(report.enqueued, 13);

    for cz in -4..=4 {
        for cx in -4..=4 {
            let tracked = world.state(ChunkCoord::new(cx, cz)).is_some();
            assert_eq!(tracked, cx * cx + cz * cz <= 4, "chunk ({cx}, {cz})");
        }
    }
    assert_eq!(world.stats().pending, 12);
}

#[test]
fn test_per_tick_budget() {
    let mut world = ChunkLifecycleManager::new(WorldSeed::new(2), config(2, 2)).unwrap();
    let mut uploader = RecordingUploader::default();

    for tick in 1..=6 {
        let report = world.tick(viewer_over(0, 0), &SEE_ALL, &mut uploader);
        assert_eq!(report.generated, 2);
        assert_eq!(world.stats().resident, tick * 2);
    }
    let report = world.tick(viewer_over(0, 0), &SEE_ALL, &mut uploader);
    assert_eq!(report.generated, 1);
    assert_eq!(world.stats().resident, 13);
    assert_eq!(world.stats().pending, 0);

    let report = world.tick(viewer_over(0, 0), &SEE_ALL, &mut uploader);
    assert_eq!(report.generated, 0);
    assert_eq!(report.remeshed, 0);
}

#[test]
fn test_neighbors_of_new_chunks_are_remeshed() {
    let mut world = ChunkLifecycleManager::new(WorldSeed::new(3), config(2, 2)).unwrap();
    let mut uploader = RecordingUploader::default();

    // Tick 1: (0,0) and (-1,0). Tick 2: (0,-1) and (0,1), both touching (0,0).
    world.tick(viewer_over(0, 0), &SEE_ALL, &mut uploader);
    let report = world.tick(viewer_over(0, 0), &SEE_ALL, &mut uploader);
    assert_eq!(report.remeshed, 1);

    use ChunkState::{Generating, Meshing, Queued, Ready};
    assert_eq!(
        world.state_history(ChunkCoord::new(0, 0)).unwrap(),
        &[Queued, Generating, Meshing, Ready, Meshing, Ready]
    );
    assert_eq!(
        world.state_history(ChunkCoord::new(0, 1)).unwrap(),
        &[Queued, Generating, Meshing, Ready]
    );
}

#[test]
fn test_histories_follow_lifecycle_order() {
    let mut world = ChunkLifecycleManager::new(WorldSeed::new(4), config(3, 3)).unwrap();
    let mut uploader = RecordingUploader::default();

    for step in 0..12 {
        world.tick(viewer_over(step / 4, 0), &SEE_ALL, &mut uploader);
    }

    for coord in world.resident_coords() {
        let history = world.state_history(coord).unwrap();
        assert!(is_valid_history(history), "{coord}: {history:?}");
        assert_eq!(world.state(coord), Some(ChunkState::Ready));
    }
}

#[test]
fn test_moving_viewer_evicts_beyond_margin() {
    let mut world = ChunkLifecycleManager::new(WorldSeed::new(5), config(2, 13)).unwrap();
    let mut uploader = RecordingUploader::default();

    world.tick(viewer_over(0, 0), &SEE_ALL, &mut uploader);
    assert_eq!(world.stats().resident, 13);
    assert!(uploader.live_for(ChunkCoord::new(-2, 0)) > 0);

    let report = world.tick(viewer_over(3, 0), &SEE_ALL, &mut uploader);
    assert_eq!(report.viewer_chunk, ChunkCoord::new(3, 0));

    // (0,0) is at distance² 9 <= (2 + 2)², (-2,0) at 25 is not.
    assert_eq!(world.state(ChunkCoord::new(0, 0)), Some(ChunkState::Ready));
    assert_eq!(world.state(ChunkCoord::new(-1, 0)), Some(ChunkState::Ready));
    assert_eq!(world.state(ChunkCoord::new(-2, 0)), None);
    assert_eq!(uploader.live_for(ChunkCoord::new(-2, 0)), 0);

    for coord in world.resident_coords() {
        assert!(coord.distance_squared(ChunkCoord::new(3, 0)) <= 16);
    }
    assert!(report.evicted > 0);
    assert_eq!(world.stats().evicted_total, report.evicted as u64);
}

#[test]
fn test_draw_calls_front_to_back() {
    let mut world = ChunkLifecycleManager::new(WorldSeed::new(6), config(2, 13)).unwrap();
    let mut uploader = RecordingUploader::default();
    world.tick(viewer_over(0, 0), &SEE_ALL, &mut uploader);

    let calls = world.draw_calls();
    assert!(!calls.is_empty());
    assert_eq!(calls.len(), uploader.live.len());

    let origin = ChunkCoord::new(0, 0);
    for pair in calls.windows(2) {
        assert!(pair[0].coord.distance_squared(origin) <= pair[1].coord.distance_squared(origin));
    }
    for call in &calls {
        assert!(call.index_count > 0);
        assert_eq!(call.index_count % 6, 0);
        assert_eq!(call.world_offset, [call.coord.x * 16, 0, call.coord.z * 16]);
    }
    assert!(calls.iter().any(|c| c.kind == MeshKind::Solid && c.coord == origin));
}

#[test]
fn test_frustum_culls_draw_calls() {
    // Orthographic box over x, z in [-16, 16].
    let narrow = [
        [1.0 / 16.0, 0.0, 0.0, 0.0],
        [0.0, 2.0 / 128.0, 0.0, 0.0],
        [0.0, 0.0, 1.0 / 16.0, 0.0],
        [0.0, -1.0, 0.0, 1.0],
    ];
    let mut world = ChunkLifecycleManager::new(WorldSeed::new(7), config(2, 13)).unwrap();
    let mut uploader = RecordingUploader::default();

    let report = world.tick(viewer_over(0, 0), &narrow, &mut uploader);
    assert_eq!(report.visible + report.culled, 13);
    assert!(report.culled > 0);
    assert!(world.draw_calls().iter().all(|c| c.coord != ChunkCoord::new(2, 0)));
    assert!(world.draw_calls().iter().any(|c| c.coord == ChunkCoord::new(0, 0)));

    let stats = world.stats();
    assert_eq!(stats.visible_last_tick, report.visible);
    assert_eq!(stats.culled_last_tick, report.culled);
}

#[test]
fn test_set_block_remeshes_chunk_and_border_neighbor() {
    let mut world = ChunkLifecycleManager::new(WorldSeed::new(8), config(2, 13)).unwrap();
    let mut uploader = RecordingUploader::default();
    world.tick(viewer_over(0, 0), &SEE_ALL, &mut uploader);

    world.set_block(5, 126, 5, Block::Stone).unwrap();
    assert_eq!(world.block_at(5, 126, 5).unwrap(), Block::Stone);
    let report = world.tick(viewer_over(0, 0), &SEE_ALL, &mut uploader);
    assert_eq!(report.remeshed, 1);

    // x = 0 is the -X border of chunk (0,0); (-1,0) shares that face.
    world.set_block(0, 126, 5, Block::Stone).unwrap();
    let report = world.tick(viewer_over(0, 0), &SEE_ALL, &mut uploader);
    assert_eq!(report.remeshed, 2);

    use ChunkState::{Meshing, Ready};
    let history = world.state_history(ChunkCoord::new(0, 0)).unwrap();
    assert_eq!(history.len(), 8);
    assert!(history[4..] == [Meshing, Ready, Meshing, Ready]);
    assert_eq!(world.state_history(ChunkCoord::new(-1, 0)).unwrap().len(), 6);
    assert_eq!(world.state_history(ChunkCoord::new(1, 0)).unwrap().len(), 4);
    assert_eq!(world.stats().remeshed_total, 3);
}

#[test]
fn test_queries_and_edit_errors() {
    let mut world = ChunkLifecycleManager::new(WorldSeed::new(9), config(1, 5)).unwrap();
    let mut uploader = RecordingUploader::default();
    world.tick(viewer_over(0, 0), &SEE_ALL, &mut uploader);

    assert_eq!(world.block_at(3, -1, 3).unwrap(), Block::Bedrock);
    assert_eq!(world.block_at(3, 0, 3).unwrap(), Block::Bedrock);
    assert_eq!(world.block_at(3, 500, 3).unwrap(), Block::Air);

    let height = world.surface_height(-5, 7).unwrap();
    let defaults = WorldConfig::default().height;
    assert!((defaults.min_height..=defaults.max_height).contains(&height));

    assert!(matches!(
        world.block_at(100, 10, 100),
        Err(WorldError::ChunkNotResident(coord)) if coord == ChunkCoord::new(6, 6)
    ));
    assert!(matches!(
        world.set_block(1, -1, 1, Block::Stone),
        Err(WorldError::OutOfBounds { y: -1, .. })
    ));
    assert!(matches!(
        world.set_block(1, 128, 1, Block::Stone),
        Err(WorldError::OutOfBounds { .. })
    ));
    assert!(matches!(
        world.set_block(-40, 10, 0, Block::Stone),
        Err(WorldError::ChunkNotResident(_))
    ));
}

#[test]
fn test_apply_config() {
    let mut world = ChunkLifecycleManager::new(WorldSeed::new(10), config(1, 5)).unwrap();
    let mut uploader = RecordingUploader::default();
    world.tick(viewer_over(0, 0), &SEE_ALL, &mut uploader);

    let mut bad = world.config().clone();
    bad.render.chunks_per_tick = 0;
    assert!(matches!(world.apply_config(bad), Err(WorldError::InvalidConfig(_))));

    let mut reshaped = world.config().clone();
    reshaped.grid = GridDims::new(32, 128, 32);
    assert!(matches!(
        world.apply_config(reshaped),
        Err(WorldError::GridChangeRequiresRegenerate { .. })
    ));
    assert_eq!(world.config().render.chunks_per_tick, 5);

    // A larger radius takes effect on the next tick.
    let mut wider = world.config().clone();
    wider.render.render_distance = 2;
    world.apply_config(wider).unwrap();
    let report = world.tick(viewer_over(0, 0), &SEE_ALL, &mut uploader);
    assert_eq!(report.enqueued, 8);
}

#[test]
fn test_regenerate_discards_everything() {
    let seed = WorldSeed::new(11);
    let mut world = ChunkLifecycleManager::new(seed, config(1, 5)).unwrap();
    let mut uploader = RecordingUploader::default();
    world.tick(viewer_over(0, 0), &SEE_ALL, &mut uploader);
    let column: Vec<Block> = (0..128).map(|y| world.block_at(4, y, 4).unwrap()).collect();
    world.set_block(4, 10, 4, Block::Glowstone).unwrap();

    world.regenerate(seed, config(1, 5), &mut uploader).unwrap();
    assert!(uploader.live.is_empty());
    assert_eq!(uploader.uploads, uploader.releases);
    assert!(world.resident_coords().is_empty());
    assert_eq!(world.stats().pending, 0);
    assert_eq!(world.stats().generated_total, 0);
    assert!(world.draw_calls().is_empty());

    // Same seed, same terrain; the edit is gone.
    world.tick(viewer_over(0, 0), &SEE_ALL, &mut uploader);
    let again: Vec<Block> = (0..128).map(|y| world.block_at(4, y, 4).unwrap()).collect();
    assert_eq!(column, again);

    let mut bad = config(1, 5);
    bad.height.min_height = 0;
    assert!(world.regenerate(WorldSeed::new(12), bad, &mut uploader).is_err());
    assert_eq!(world.seed(), seed);
    assert_eq!(world.stats().resident, 5);
}

#[test]
fn test_point_lights_sorted_and_capped() {
    let mut cfg = config(1, 5);
    cfg.render.max_lights = 4;
    let mut world = ChunkLifecycleManager::new(WorldSeed::new(13), cfg).unwrap();
    let mut uploader = RecordingUploader::default();
    world.tick(viewer_over(0, 0), &SEE_ALL, &mut uploader);

    for x in 0..10 {
        world.set_block(x, 126, 2, Block::Glowstone).unwrap();
    }
    world.tick([0.5, 126.5, 2.5], &SEE_ALL, &mut uploader);

    let lights = world.point_lights();
    assert_eq!(lights.len(), 4);
    let viewer = [0.5, 126.5, 2.5];
    for pair in lights.windows(2) {
        assert!(pair[0].distance_squared(viewer) <= pair[1].distance_squared(viewer));
    }
    assert_eq!(lights[0].position, viewer);
    assert_eq!(lights[0].intensity, 1.0);
}
