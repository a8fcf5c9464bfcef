//! # LITHOS Rendering
//!
//! CPU side of chunk rendering: everything between a finished voxel grid
//! and a GPU upload.
//!
//! ## Architecture
//!
//! ```text
//! VoxelGrid (+ 4 neighbors) -> SurfaceMesher -> ChunkMeshes
//!                                                 |- solid   (SolidVertex)
//!                                                 |- water   (WaterVertex)
//!                                                 '- foliage (FoliageVertex)
//! VoxelGrid -> collect_emissive -> PointLight list
//! view-projection -> FrustumCuller -> visible chunks
//! ```
//!
//! Vertices are chunk-local. The world offset is carried by the draw call
//! so a chunk's buffers never depend on where it sits in the world.

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod frustum;
pub mod lights;
pub mod mesher;
pub mod vertex;

pub use frustum::{Aabb, Frustum, FrustumCuller, Plane};
pub use lights::{collect_emissive, nearest_lights, PointLight};
pub use mesher::{face_visible, vertex_ao, MeshNeighbors, SurfaceMesher};
pub use vertex::{ChunkMeshes, FoliageVertex, MeshData, MeshKind, SolidVertex, WaterVertex};
