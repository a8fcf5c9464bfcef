//! Vertex formats and mesh containers.
//!
//! Each stream has its own `#[repr(C)]` Pod vertex so the byte view handed
//! to the uploader matches the `wgpu` layout exactly.

use bytemuck::{Pod, Zeroable};

// =============================================================================
// VERTEX FORMATS
// =============================================================================

/// Vertex for opaque and cutout cube faces.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct SolidVertex {
    /// Chunk-local position.
    pub position: [f32; 3],
    /// Face normal.
    pub normal: [f32; 3],
    /// Block albedo.
    pub color: [f32; 3],
    /// Ambient occlusion, 0 (fully occluded) to 1 (open).
    pub ao: f32,
    /// Roughness, metallic, emissive.
    pub material: [f32; 3],
}

impl SolidVertex {
    /// Vertex attributes.
    pub const ATTRIBS: [wgpu::VertexAttribute; 5] = wgpu::vertex_attr_array![
        0 => Float32x3,  // position
        1 => Float32x3,  // normal
        2 => Float32x3,  // color
        3 => Float32,    // ao
        4 => Float32x3,  // material
    ];

    /// Vertex buffer layout descriptor.
    #[must_use]
    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Self>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBS,
        }
    }
}

/// Vertex for water surfaces.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct WaterVertex {
    /// Chunk-local position.
    pub position: [f32; 3],
    /// Surface UV.
    pub uv: [f32; 2],
}

impl WaterVertex {
    /// Vertex attributes.
    pub const ATTRIBS: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![
        0 => Float32x3,  // position
        1 => Float32x2,  // uv
    ];

    /// Vertex buffer layout descriptor.
    #[must_use]
    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Self>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBS,
        }
    }
}

/// Vertex for cross-mesh plants.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct FoliageVertex {
    /// Chunk-local position.
    pub position: [f32; 3],
    /// Quad UV.
    pub uv: [f32; 2],
    /// Plant tint.
    pub color: [f32; 3],
}

impl FoliageVertex {
    /// Vertex attributes.
    pub const ATTRIBS: [wgpu::VertexAttribute; 3] = wgpu::vertex_attr_array![
        0 => Float32x3,  // position
        1 => Float32x2,  // uv
        2 => Float32x3,  // color
    ];

    /// Vertex buffer layout descriptor.
    #[must_use]
    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Self>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBS,
        }
    }
}

// =============================================================================
// MESH OUTPUT
// =============================================================================

/// Which of the three streams a mesh belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MeshKind {
    /// Opaque and cutout cubes.
    Solid,
    /// Water surfaces.
    Water,
    /// Cross-mesh plants.
    Foliage,
}

impl MeshKind {
    /// All kinds, in draw order.
    pub const ALL: [Self; 3] = [Self::Solid, Self::Water, Self::Foliage];

    /// Slot index (0..3).
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Vertex and index data for one stream.
#[derive(Clone, Debug)]
pub struct MeshData<V> {
    /// Vertex buffer data.
    pub vertices: Vec<V>,
    /// Index buffer data.
    pub indices: Vec<u32>,
}

impl<V> Default for MeshData<V> {
    fn default() -> Self {
        Self {
            vertices: Vec::new(),
            indices: Vec::new(),
        }
    }
}

impl<V: Pod> MeshData<V> {
    /// True if there is nothing to draw.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Number of quads.
    #[must_use]
    pub fn quad_count(&self) -> usize {
        self.indices.len() / 6
    }

    /// Raw vertex bytes for upload.
    #[must_use]
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Appends a quad from four vertices with the given triangle split.
    pub(crate) fn push_quad(&mut self, corners: [V; 4], flip: bool) {
        let base = self.vertices.len() as u32;
        self.vertices.extend_from_slice(&corners);
        let order: [u32; 6] = if flip {
            [1, 2, 3, 1, 3, 0]
        } else {
            [0, 1, 2, 0, 2, 3]
        };
        self.indices.extend(order.iter().map(|i| base + i));
    }
}

/// All three streams for one chunk.
#[derive(Clone, Debug, Default)]
pub struct ChunkMeshes {
    /// Cube faces.
    pub solid: MeshData<SolidVertex>,
    /// Water surfaces.
    pub water: MeshData<WaterVertex>,
    /// Plants.
    pub foliage: MeshData<FoliageVertex>,
}

impl ChunkMeshes {
    /// True if all three streams are empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.solid.is_empty() && self.water.is_empty() && self.foliage.is_empty()
    }

    /// Byte view, vertex stride and indices of one stream.
    #[must_use]
    pub fn stream(&self, kind: MeshKind) -> (&[u8], u32, &[u32]) {
        match kind {
            MeshKind::Solid => (
                self.solid.vertex_bytes(),
                std::mem::size_of::<SolidVertex>() as u32,
                &self.solid.indices,
            ),
            MeshKind::Water => (
                self.water.vertex_bytes(),
                std::mem::size_of::<WaterVertex>() as u32,
                &self.water.indices,
            ),
            MeshKind::Foliage => (
                self.foliage.vertex_bytes(),
                std::mem::size_of::<FoliageVertex>() as u32,
                &self.foliage.indices,
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_sizes() {
        assert_eq!(std::mem::size_of::<SolidVertex>(), 13 * 4);
        assert_eq!(std::mem::size_of::<WaterVertex>(), 5 * 4);
        assert_eq!(std::mem::size_of::<FoliageVertex>(), 8 * 4);
        assert_eq!(SolidVertex::desc().array_stride, 52);
    }

    #[test]
    fn test_quad_split() {
        let v = WaterVertex {
            position: [0.0; 3],
            uv: [0.0; 2],
        };
        let mut mesh = MeshData::default();
        mesh.push_quad([v; 4], false);
        mesh.push_quad([v; 4], true);
        assert_eq!(&mesh.indices[..6], &[0, 1, 2, 0, 2, 3]);
        assert_eq!(&mesh.indices[6..], &[5, 6, 7, 5, 7, 4]);
        assert_eq!(mesh.quad_count(), 2);
    }
}
