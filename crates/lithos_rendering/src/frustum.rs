//! Chunk visibility against the camera frustum.
//!
//! Planes come from the rows of the column-major view-projection matrix
//! (Gribb/Hartmann). A chunk column is kept if its box is not entirely
//! behind any plane.

use bytemuck::{Pod, Zeroable};
use lithos_procedural::{ChunkCoord, GridDims};

/// Plane `a*x + b*y + c*z + d = 0`; positive side is inside.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct Plane {
    /// Normal X component.
    pub a: f32,
    /// Normal Y component.
    pub b: f32,
    /// Normal Z component.
    pub c: f32,
    /// Distance from origin.
    pub d: f32,
}

impl Plane {
    /// Creates a new plane.
    #[must_use]
    pub const fn new(a: f32, b: f32, c: f32, d: f32) -> Self {
        Self { a, b, c, d }
    }

    /// Normalizes the plane.
    #[must_use]
    pub fn normalized(self) -> Self {
        let len = (self.a * self.a + self.b * self.b + self.c * self.c).sqrt();
        if len > 0.0 {
            Self {
                a: self.a / len,
                b: self.b / len,
                c: self.c / len,
                d: self.d / len,
            }
        } else {
            self
        }
    }

    /// Signed distance of `p` (exact once normalized).
    #[inline]
    #[must_use]
    pub fn distance_to_point(&self, p: [f32; 3]) -> f32 {
        self.a * p[0] + self.b * p[1] + self.c * p[2] + self.d
    }
}

/// Six inward-facing planes.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Frustum {
    /// Left, right, bottom, top, near, far.
    pub planes: [Plane; 6],
}

impl Frustum {
    /// Builds the planes from a view-projection matrix.
    ///
    /// The matrix is column-major (`m[column][row]`).
    #[must_use]
    pub fn from_view_projection(m: &[[f32; 4]; 4]) -> Self {
        let row = |r: usize| [m[0][r], m[1][r], m[2][r], m[3][r]];
        let combine = |a: [f32; 4], b: [f32; 4], sign: f32| {
            Plane::new(
                a[0] + sign * b[0],
                a[1] + sign * b[1],
                a[2] + sign * b[2],
                a[3] + sign * b[3],
            )
            .normalized()
        };
        let w = row(3);

        Self {
            planes: [
                combine(w, row(0), 1.0),  // left
                combine(w, row(0), -1.0), // right
                combine(w, row(1), 1.0),  // bottom
                combine(w, row(1), -1.0), // top
                combine(w, row(2), 1.0),  // near
                combine(w, row(2), -1.0), // far
            ],
        }
    }
}

/// World-space axis-aligned box.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Aabb {
    /// Minimum corner.
    pub min: [f32; 3],
    /// Maximum corner.
    pub max: [f32; 3],
}

impl Aabb {
    /// Creates a new AABB.
    #[must_use]
    pub const fn new(min: [f32; 3], max: [f32; 3]) -> Self {
        Self { min, max }
    }

    /// Full-height box of a chunk column.
    #[must_use]
    pub fn for_chunk(coord: ChunkCoord, dims: GridDims) -> Self {
        let min_x = coord.world_x(dims) as f32;
        let min_z = coord.world_z(dims) as f32;
        Self {
            min: [min_x, 0.0, min_z],
            max: [
                min_x + dims.width as f32,
                dims.height as f32,
                min_z + dims.depth as f32,
            ],
        }
    }

    /// Midpoint.
    #[must_use]
    pub fn center(&self) -> [f32; 3] {
        std::array::from_fn(|axis| 0.5 * (self.min[axis] + self.max[axis]))
    }

    /// Half the size along each axis.
    #[must_use]
    pub fn half_extents(&self) -> [f32; 3] {
        std::array::from_fn(|axis| 0.5 * (self.max[axis] - self.min[axis]))
    }
}

/// Holds the frustum of the last tick.
#[derive(Debug, Clone, Default)]
pub struct FrustumCuller {
    frustum: Frustum,
}

impl FrustumCuller {
    /// Creates a culler that accepts everything until the first update.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the frustum.
    pub fn update(&mut self, view_projection: &[[f32; 4]; 4]) {
        self.frustum = Frustum::from_view_projection(view_projection);
    }

    /// Current frustum.
    #[must_use]
    pub const fn frustum(&self) -> &Frustum {
        &self.frustum
    }

    /// Tests if an AABB intersects the frustum.
    #[must_use]
    pub fn test_aabb(&self, aabb: &Aabb) -> bool {
        let mid = aabb.center();
        let [hx, hy, hz] = aabb.half_extents();

        self.frustum.planes.iter().all(|plane| {
            // Box extent along the plane normal.
            let reach = hx * plane.a.abs() + hy * plane.b.abs() + hz * plane.c.abs();
            plane.distance_to_point(mid) + reach >= 0.0
        })
    }

    /// Tests if a chunk column is visible.
    #[must_use]
    pub fn test_chunk(&self, coord: ChunkCoord, dims: GridDims) -> bool {
        self.test_aabb(&Aabb::for_chunk(coord, dims))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Orthographic box x in [-16, 16], y in [0, 128], z in [-16, 16].
    fn ortho_box() -> [[f32; 4]; 4] {
        let sx = 1.0 / 16.0;
        let sy = 2.0 / 128.0;
        let sz = 1.0 / 16.0;
        [
            [sx, 0.0, 0.0, 0.0],
            [0.0, sy, 0.0, 0.0],
            [0.0, 0.0, sz, 0.0],
            [0.0, -1.0, 0.0, 1.0],
        ]
    }

    #[test]
    fn test_normalized_plane_measures_distance() {
        let plane = Plane::new(0.0, 0.0, 2.0, -8.0).normalized();
        assert_eq!(plane, Plane::new(0.0, 0.0, 1.0, -4.0));
        assert!((plane.distance_to_point([5.0, -3.0, 10.0]) - 6.0).abs() < 1e-6);
        assert_eq!(Plane::default().normalized(), Plane::default());
    }

    #[test]
    fn test_aabb_for_chunk() {
        let dims = GridDims::default();
        let aabb = Aabb::for_chunk(ChunkCoord::new(-1, 2), dims);
        assert_eq!(aabb.min, [-16.0, 0.0, 32.0]);
        assert_eq!(aabb.max, [0.0, 128.0, 48.0]);
        assert_eq!(aabb.center(), [-8.0, 64.0, 40.0]);
    }

    #[test]
    fn test_chunk_culling() {
        let dims = GridDims::default();
        let mut culler = FrustumCuller::new();
        culler.update(&ortho_box());

        assert!(culler.test_chunk(ChunkCoord::new(0, 0), dims));
        assert!(culler.test_chunk(ChunkCoord::new(-1, -1), dims));
        assert!(!culler.test_chunk(ChunkCoord::new(3, 0), dims));
        assert!(!culler.test_chunk(ChunkCoord::new(0, -4), dims));
    }

    #[test]
    fn test_default_culler_accepts_everything() {
        let culler = FrustumCuller::new();
        assert!(culler.test_chunk(ChunkCoord::new(1000, -1000), GridDims::default()));
    }
}
