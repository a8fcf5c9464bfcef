//! Point lights from emissive blocks.
//!
//! Lights are collected per chunk at mesh time; the world merges them,
//! keeps the ones nearest the viewer and hands that list to the renderer.

use bytemuck::{Pod, Zeroable};
use lithos_procedural::VoxelGrid;

/// Light radius at full emission strength, in blocks.
pub const LIGHT_RADIUS: f32 = 12.0;

/// A point light in world space.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct PointLight {
    /// World-space center of the emitting block.
    pub position: [f32; 3],
    /// Falloff radius.
    pub radius: f32,
    /// Light color.
    pub color: [f32; 3],
    /// Emission strength.
    pub intensity: f32,
}

impl PointLight {
    /// Squared distance from the light to a point.
    #[must_use]
    pub fn distance_squared(&self, point: [f32; 3]) -> f32 {
        let dx = self.position[0] - point[0];
        let dy = self.position[1] - point[1];
        let dz = self.position[2] - point[2];
        dx * dx + dy * dy + dz * dz
    }
}

/// Every emissive block of a grid as a world-space light.
#[must_use]
pub fn collect_emissive(grid: &VoxelGrid) -> Vec<PointLight> {
    let [ox, oy, oz] = grid.world_offset();
    grid.iter()
        .filter(|(_, block)| block.is_emissive())
        .map(|([x, y, z], block)| {
            let props = block.properties();
            PointLight {
                position: [
                    (ox + x) as f32 + 0.5,
                    (oy + y) as f32 + 0.5,
                    (oz + z) as f32 + 0.5,
                ],
                radius: LIGHT_RADIUS * props.emissive,
                color: props.color,
                intensity: props.emissive,
            }
        })
        .collect()
}

/// Sorts lights by distance to `viewer` and keeps at most `max`.
pub fn nearest_lights(lights: &mut Vec<PointLight>, viewer: [f32; 3], max: usize) {
    lights.sort_by(|a, b| {
        a.distance_squared(viewer)
            .total_cmp(&b.distance_squared(viewer))
    });
    lights.truncate(max);
}
