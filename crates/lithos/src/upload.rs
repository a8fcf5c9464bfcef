//! Mesh upload seam and draw-call descriptors.
//!
//! The manager hands finished vertex/index bytes to a [`MeshUploader`] and
//! keeps only the opaque ids it gets back. Whatever owns the GPU device
//! implements the trait.

use lithos_procedural::ChunkCoord;
use lithos_rendering::MeshKind;

/// Opaque handle to a GPU buffer owned by the uploader.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BufferId(pub u64);

/// Buffers backing one mesh stream of one chunk.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MeshBuffers {
    /// Vertex buffer.
    pub vertex_buffer: BufferId,
    /// Index buffer (`u32` indices).
    pub index_buffer: BufferId,
    /// Number of indices to draw.
    pub index_count: u32,
}

/// Creates and destroys GPU buffers on behalf of the world.
pub trait MeshUploader {
    /// Uploads one non-empty stream. `vertices` is tightly packed with
    /// `stride` bytes per vertex.
    fn upload(
        &mut self,
        coord: ChunkCoord,
        kind: MeshKind,
        vertices: &[u8],
        stride: u32,
        indices: &[u32],
    ) -> MeshBuffers;

    /// Releases buffers previously returned by `upload`.
    fn release(&mut self, buffers: MeshBuffers);
}

/// Uploader that allocates ids without touching a GPU.
///
/// Used for headless runs and benchmarks.
#[derive(Clone, Debug, Default)]
pub struct NullUploader {
    next_id: u64,
    live: usize,
}

impl NullUploader {
    /// Number of buffer pairs uploaded and not yet released.
    #[must_use]
    pub const fn live(&self) -> usize {
        self.live
    }
}

impl MeshUploader for NullUploader {
    fn upload(
        &mut self,
        _coord: ChunkCoord,
        _kind: MeshKind,
        _vertices: &[u8],
        _stride: u32,
        indices: &[u32],
    ) -> MeshBuffers {
        let vertex_buffer = BufferId(self.next_id);
        let index_buffer = BufferId(self.next_id + 1);
        self.next_id += 2;
        self.live += 1;
        MeshBuffers {
            vertex_buffer,
            index_buffer,
            index_count: indices.len() as u32,
        }
    }

    fn release(&mut self, _buffers: MeshBuffers) {
        self.live = self.live.saturating_sub(1);
    }
}

/// Everything the renderer needs to draw one stream of one chunk.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DrawCall {
    /// Chunk being drawn.
    pub coord: ChunkCoord,
    /// Which stream (and therefore which pipeline) to use.
    pub kind: MeshKind,
    /// Vertex buffer.
    pub vertex_buffer: BufferId,
    /// Index buffer.
    pub index_buffer: BufferId,
    /// Number of indices to draw.
    pub index_count: u32,
    /// World-space origin of the chunk; vertices are chunk-local.
    pub world_offset: [i32; 3],
}
