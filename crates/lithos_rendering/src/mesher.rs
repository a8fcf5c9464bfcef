//! # Surface Mesher
//!
//! Converts a finished voxel grid (plus up to four face neighbors) into
//! three vertex/index streams:
//!
//! - **Solid**: one quad per visible cube face, with per-vertex ambient
//!   occlusion and the triangle split chosen from the AO values.
//! - **Water**: top faces only, position + UV.
//! - **Foliage**: two diagonal quads per cross-mesh plant.
//!
//! ## Face Visibility
//!
//! A face is emitted unless the neighbor cell is solid and not cutout.
//! Between two cutout blocks (leaves touching leaves) only the face on the
//! positive side of the pair is kept, so shared faces are drawn once.
//!
//! Cells outside the chunk are looked up in the neighbor grids; a missing
//! neighbor, a diagonal cell, or anything above or below the grid reads as
//! air.

use lithos_procedural::{Block, VoxelGrid};

use crate::vertex::{ChunkMeshes, FoliageVertex, MeshData, SolidVertex, WaterVertex};

/// Vertical inset of plant quads from the cell boundaries.
pub const FOLIAGE_INSET: f32 = 0.01;

/// How far a water surface sits below the top of its cell.
pub const WATER_SURFACE_DROP: f32 = 0.1;

/// One cube face direction.
#[derive(Clone, Copy, Debug)]
struct FaceDir {
    normal: [i32; 3],
    /// In-plane axes with `u x v == normal`, so (0,0) (1,0) (1,1) (0,1)
    /// winds counter-clockwise seen from outside.
    u: [i32; 3],
    v: [i32; 3],
}

/// Faces in pair order: +X, -X, +Y, -Y, +Z, -Z. Even indices are the
/// positive side of each axis.
const FACES: [FaceDir; 6] = [
    FaceDir { normal: [1, 0, 0], u: [0, 1, 0], v: [0, 0, 1] },
    FaceDir { normal: [-1, 0, 0], u: [0, 0, 1], v: [0, 1, 0] },
    FaceDir { normal: [0, 1, 0], u: [0, 0, 1], v: [1, 0, 0] },
    FaceDir { normal: [0, -1, 0], u: [1, 0, 0], v: [0, 0, 1] },
    FaceDir { normal: [0, 0, 1], u: [1, 0, 0], v: [0, 1, 0] },
    FaceDir { normal: [0, 0, -1], u: [0, 1, 0], v: [1, 0, 0] },
];

/// Quad corners in (u, v).
const CORNERS: [(i32, i32); 4] = [(0, 0), (1, 0), (1, 1), (0, 1)];

/// A grid and the face neighbors it reads across its borders.
#[derive(Clone, Copy, Debug)]
pub struct MeshNeighbors<'a> {
    /// Chunk being meshed.
    pub center: &'a VoxelGrid,
    /// Neighbor at +X.
    pub pos_x: Option<&'a VoxelGrid>,
    /// Neighbor at -X.
    pub neg_x: Option<&'a VoxelGrid>,
    /// Neighbor at +Z.
    pub pos_z: Option<&'a VoxelGrid>,
    /// Neighbor at -Z.
    pub neg_z: Option<&'a VoxelGrid>,
}

impl<'a> MeshNeighbors<'a> {
    /// A grid with no resident neighbors.
    #[must_use]
    pub const fn isolated(center: &'a VoxelGrid) -> Self {
        Self {
            center,
            pos_x: None,
            neg_x: None,
            pos_z: None,
            neg_z: None,
        }
    }

    /// Block at a center-local coordinate, reading across chunk borders.
    #[must_use]
    pub fn block(&self, x: i32, y: i32, z: i32) -> Block {
        let dims = self.center.dims();
        let (w, h, d) = (dims.width as i32, dims.height as i32, dims.depth as i32);
        if y < 0 || y >= h {
            return Block::Air;
        }

        let x_in = (0..w).contains(&x);
        let z_in = (0..d).contains(&z);
        let (grid, lx, lz) = match (x_in, z_in) {
            (true, true) => (Some(self.center), x, z),
            (false, true) if x < 0 => (self.neg_x, x + w, z),
            (false, true) => (self.pos_x, x - w, z),
            (true, false) if z < 0 => (self.neg_z, x, z + d),
            (true, false) => (self.pos_z, x, z - d),
            (false, false) => (None, x, z),
        };

        grid.map_or(Block::Air, |g| g.get(lx, y, lz))
    }

    fn occludes(&self, x: i32, y: i32, z: i32) -> bool {
        self.block(x, y, z).is_solid()
    }
}

/// Per-vertex ambient occlusion from two side cells and the corner cell.
///
/// Both sides solid gives 0 regardless of the corner; otherwise
/// `(3 - occluded) / 3`.
#[must_use]
pub fn vertex_ao(side1: bool, side2: bool, corner: bool) -> f32 {
    if side1 && side2 {
        return 0.0;
    }
    let occluded = u8::from(side1) + u8::from(side2) + u8::from(corner);
    f32::from(3 - occluded) / 3.0
}

/// Whether `block`'s face toward `neighbor` is drawn. `face` is the index
/// in +X, -X, +Y, -Y, +Z, -Z order.
#[must_use]
pub fn face_visible(block: Block, neighbor: Block, face: usize) -> bool {
    if neighbor.is_solid() && !neighbor.is_cutout() {
        return false;
    }
    if block.is_cutout() && neighbor.is_cutout() {
        return face % 2 == 0;
    }
    true
}

/// Whether a quad should be split along the 1-3 diagonal instead of 0-2.
#[must_use]
pub fn flip_diagonal(ao: [f32; 4]) -> bool {
    ao[1] + ao[3] > ao[0] + ao[2]
}

/// Stateless chunk mesher.
#[derive(Clone, Copy, Debug, Default)]
pub struct SurfaceMesher;

impl SurfaceMesher {
    /// Creates a mesher.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Meshes one chunk.
    #[must_use]
    pub fn mesh(&self, neighbors: &MeshNeighbors<'_>) -> ChunkMeshes {
        let mut meshes = ChunkMeshes::default();

        for ([x, y, z], block) in neighbors.center.iter() {
            if block.is_air() {
                continue;
            }
            if block.is_water() {
                mesh_water(neighbors, &mut meshes.water, [x, y, z]);
            } else if block.is_cross() {
                mesh_cross(&mut meshes.foliage, [x, y, z], block);
            } else {
                mesh_cube(neighbors, &mut meshes.solid, [x, y, z], block);
            }
        }

        tracing::trace!(
            x = neighbors.center.coord().x,
            z = neighbors.center.coord().z,
            solid_quads = meshes.solid.quad_count(),
            water_quads = meshes.water.quad_count(),
            foliage_quads = meshes.foliage.quad_count(),
            "chunk meshed"
        );

        meshes
    }
}

fn add(a: [i32; 3], b: [i32; 3]) -> [i32; 3] {
    [a[0] + b[0], a[1] + b[1], a[2] + b[2]]
}

fn scale(a: [i32; 3], s: i32) -> [i32; 3] {
    [a[0] * s, a[1] * s, a[2] * s]
}

fn to_f32(a: [i32; 3]) -> [f32; 3] {
    [a[0] as f32, a[1] as f32, a[2] as f32]
}

fn mesh_cube(
    neighbors: &MeshNeighbors<'_>,
    mesh: &mut MeshData<SolidVertex>,
    pos: [i32; 3],
    block: Block,
) {
    let props = block.properties();
    let material = [props.roughness, props.metallic, props.emissive];

    for (index, face) in FACES.iter().enumerate() {
        let [nx, ny, nz] = add(pos, face.normal);
        if !face_visible(block, neighbors.block(nx, ny, nz), index) {
            continue;
        }

        // Faces on the positive side of an axis sit one unit out.
        let plane = add(pos, face.normal.map(|n| n.max(0)));
        let front = add(pos, face.normal);

        let mut ao = [0.0; 4];
        let mut positions = [[0.0; 3]; 4];
        for (i, &(du, dv)) in CORNERS.iter().enumerate() {
            let su = scale(face.u, if du == 0 { -1 } else { 1 });
            let sv = scale(face.v, if dv == 0 { -1 } else { 1 });
            let [ax, ay, az] = add(front, su);
            let [bx, by, bz] = add(front, sv);
            let [cx, cy, cz] = add(add(front, su), sv);
            ao[i] = vertex_ao(
                neighbors.occludes(ax, ay, az),
                neighbors.occludes(bx, by, bz),
                neighbors.occludes(cx, cy, cz),
            );
            positions[i] = to_f32(add(add(plane, scale(face.u, du)), scale(face.v, dv)));
        }

        let normal = to_f32(face.normal);
        let corners = [0, 1, 2, 3].map(|i| SolidVertex {
            position: positions[i],
            normal,
            color: props.color,
            ao: ao[i],
            material,
        });
        mesh.push_quad(corners, flip_diagonal(ao));
    }
}

fn mesh_water(neighbors: &MeshNeighbors<'_>, mesh: &mut MeshData<WaterVertex>, pos: [i32; 3]) {
    let [x, y, z] = pos;
    let above = neighbors.block(x, y + 1, z);
    if above.is_water() || above.is_opaque() {
        return;
    }

    let top = (y + 1) as f32 - WATER_SURFACE_DROP;
    let (x, z) = (x as f32, z as f32);
    let corners = CORNERS.map(|(du, dv)| WaterVertex {
        // +Y winding: u runs along Z, v along X.
        position: [x + dv as f32, top, z + du as f32],
        uv: [du as f32, dv as f32],
    });
    mesh.push_quad(corners, false);
}

fn mesh_cross(mesh: &mut MeshData<FoliageVertex>, pos: [i32; 3], block: Block) {
    let color = block.properties().color;
    let [x, y, z] = to_f32(pos);
    let bottom = y + FOLIAGE_INSET;
    let top = y + 1.0 - FOLIAGE_INSET;

    let diagonals = [
        ([x, z], [x + 1.0, z + 1.0]),
        ([x + 1.0, z], [x, z + 1.0]),
    ];
    for ([x0, z0], [x1, z1]) in diagonals {
        let corners = [
            FoliageVertex { position: [x0, bottom, z0], uv: [0.0, 1.0], color },
            FoliageVertex { position: [x1, bottom, z1], uv: [1.0, 1.0], color },
            FoliageVertex { position: [x1, top, z1], uv: [1.0, 0.0], color },
            FoliageVertex { position: [x0, top, z0], uv: [0.0, 0.0], color },
        ];
        mesh.push_quad(corners, false);
    }
}
