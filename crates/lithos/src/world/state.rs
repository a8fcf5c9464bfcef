//! Per-chunk lifecycle state.

use lithos_procedural::{Block, VoxelGrid};
use lithos_rendering::{MeshKind, PointLight};

use crate::upload::{MeshBuffers, MeshUploader};

/// Lifecycle of one chunk.
///
/// `Queued -> Generating -> Meshing -> Ready`, after which a chunk only
/// cycles `Ready -> Meshing -> Ready` when it is invalidated.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ChunkState {
    /// Waiting for a generation slot.
    Queued,
    /// Running the generation pipeline.
    Generating,
    /// Building mesh streams.
    Meshing,
    /// Meshed and drawable.
    Ready,
}

impl ChunkState {
    /// Whether `self -> next` is a legal transition.
    #[must_use]
    pub const fn can_become(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Queued, Self::Generating)
                | (Self::Generating, Self::Meshing)
                | (Self::Meshing, Self::Ready)
                | (Self::Ready, Self::Meshing)
        )
    }
}

/// One tracked chunk, queued or resident.
#[derive(Debug)]
pub(crate) struct ChunkEntry {
    state: ChunkState,
    history: Vec<ChunkState>,
    pub(crate) grid: Option<VoxelGrid>,
    pub(crate) buffers: [Option<MeshBuffers>; 3],
    pub(crate) lights: Vec<PointLight>,
    pub(crate) dirty: bool,
}

impl ChunkEntry {
    pub(crate) fn queued() -> Self {
        Self {
            state: ChunkState::Queued,
            history: vec![ChunkState::Queued],
            grid: None,
            buffers: [None; 3],
            lights: Vec::new(),
            dirty: false,
        }
    }

    pub(crate) const fn state(&self) -> ChunkState {
        self.state
    }

    pub(crate) fn history(&self) -> &[ChunkState] {
        &self.history
    }

    /// Moves to `next`.
    ///
    /// # Panics
    ///
    /// Panics on an illegal transition.
    pub(crate) fn transition(&mut self, next: ChunkState) {
        assert!(
            self.state.can_become(next),
            "illegal chunk transition {:?} -> {next:?}",
            self.state
        );
        self.state = next;
        self.history.push(next);
    }

    /// Edits the grid and flags the chunk for remeshing. False if the chunk
    /// has no grid yet.
    pub(crate) fn set_block(&mut self, x: i32, y: i32, z: i32, block: Block) -> bool {
        let Some(grid) = self.grid.as_mut() else {
            return false;
        };
        grid.set(x, y, z, block);
        self.dirty = true;
        true
    }

    /// Flags a generated chunk for remeshing.
    pub(crate) fn mark_dirty(&mut self) {
        if self.grid.is_some() {
            self.dirty = true;
        }
    }

    pub(crate) fn buffers(&self, kind: MeshKind) -> Option<MeshBuffers> {
        self.buffers[kind.index()]
    }

    /// Hands every buffer back to the uploader.
    pub(crate) fn release_buffers(&mut self, uploader: &mut dyn MeshUploader) {
        for slot in &mut self.buffers {
            if let Some(buffers) = slot.take() {
                uploader.release(buffers);
            }
        }
    }
}
