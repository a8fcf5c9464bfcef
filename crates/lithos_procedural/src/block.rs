//! # Block Table
//!
//! Block ids are the only per-voxel data. Everything else (solidity,
//! render flags, material) lives in one static table indexed by the id.

/// Rendering and physical properties of a block type.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BlockProperties {
    /// Display name.
    pub name: &'static str,
    /// Occupies its cell (occludes, supports, counts for AO).
    pub solid: bool,
    /// Solid but see-through (leaves); never hides a neighbor's face.
    pub cutout: bool,
    /// Rendered as two diagonal quads instead of a cube.
    pub cross: bool,
    /// Liquid (still or flowing water).
    pub liquid: bool,
    /// Base albedo.
    pub color: [f32; 3],
    /// PBR roughness.
    pub roughness: f32,
    /// PBR metallic.
    pub metallic: f32,
    /// Emission strength in [0, 1]. Non-zero blocks become point lights.
    pub emissive: f32,
}

impl BlockProperties {
    const fn opaque(name: &'static str, color: [f32; 3], roughness: f32) -> Self {
        Self {
            name,
            solid: true,
            cutout: false,
            cross: false,
            liquid: false,
            color,
            roughness,
            metallic: 0.0,
            emissive: 0.0,
        }
    }

    const fn ore(name: &'static str, color: [f32; 3], metallic: f32, emissive: f32) -> Self {
        Self {
            metallic,
            emissive,
            ..Self::opaque(name, color, 0.6)
        }
    }

    const fn plant(name: &'static str, color: [f32; 3]) -> Self {
        Self {
            name,
            solid: false,
            cutout: true,
            cross: true,
            liquid: false,
            color,
            roughness: 0.9,
            metallic: 0.0,
            emissive: 0.0,
        }
    }

    const fn water(name: &'static str) -> Self {
        Self {
            name,
            solid: false,
            cutout: false,
            cross: false,
            liquid: true,
            color: [0.15, 0.35, 0.65],
            roughness: 0.05,
            metallic: 0.0,
            emissive: 0.0,
        }
    }
}

/// Block type.
///
/// The discriminant is the id stored in the voxel grid.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum Block {
    /// Empty space.
    #[default]
    Air = 0,
    /// Indestructible floor at y = 0.
    Bedrock = 1,
    /// Generic stone; the only block ores replace.
    Stone = 2,
    /// Dirt.
    Dirt = 3,
    /// Grass-topped dirt.
    Grass = 4,
    /// Sand (beaches, deserts, sea floor).
    Sand = 5,
    /// Snow cover.
    Snow = 6,
    /// Still water.
    Water = 7,
    /// Flowing water produced by the cascade phase.
    FlowingWater = 8,
    /// Coal ore.
    CoalOre = 9,
    /// Iron ore.
    IronOre = 10,
    /// Gold ore.
    GoldOre = 11,
    /// Diamond ore (faint glow).
    DiamondOre = 12,
    /// Tree trunk.
    Log = 13,
    /// Tree leaves (cutout).
    Leaves = 14,
    /// Tall grass (cross mesh).
    TallGrass = 15,
    /// Flower (cross mesh).
    Flower = 16,
    /// Fern (cross mesh).
    Fern = 17,
    /// Light-emitting block.
    Glowstone = 18,
}

/// Number of block types.
pub const BLOCK_COUNT: usize = 19;

static PROPERTIES: [BlockProperties; BLOCK_COUNT] = [
    BlockProperties {
        name: "air",
        solid: false,
        cutout: false,
        cross: false,
        liquid: false,
        color: [0.0, 0.0, 0.0],
        roughness: 1.0,
        metallic: 0.0,
        emissive: 0.0,
    },
    BlockProperties::opaque("bedrock", [0.2, 0.2, 0.22], 0.95),
    BlockProperties::opaque("stone", [0.5, 0.5, 0.52], 0.85),
    BlockProperties::opaque("dirt", [0.45, 0.32, 0.2], 0.95),
    BlockProperties::opaque("grass", [0.33, 0.62, 0.24], 0.9),
    BlockProperties::opaque("sand", [0.86, 0.8, 0.58], 0.9),
    BlockProperties::opaque("snow", [0.95, 0.96, 0.98], 0.7),
    BlockProperties::water("water"),
    BlockProperties::water("flowing_water"),
    BlockProperties::ore("coal_ore", [0.22, 0.22, 0.22], 0.0, 0.0),
    BlockProperties::ore("iron_ore", [0.72, 0.56, 0.45], 0.6, 0.0),
    BlockProperties::ore("gold_ore", [0.95, 0.8, 0.25], 0.9, 0.0),
    BlockProperties::ore("diamond_ore", [0.45, 0.9, 0.92], 0.3, 0.15),
    BlockProperties::opaque("log", [0.4, 0.28, 0.16], 0.9),
    BlockProperties {
        name: "leaves",
        solid: true,
        cutout: true,
        cross: false,
        liquid: false,
        color: [0.22, 0.5, 0.18],
        roughness: 0.85,
        metallic: 0.0,
        emissive: 0.0,
    },
    BlockProperties::plant("tall_grass", [0.36, 0.66, 0.26]),
    BlockProperties::plant("flower", [0.9, 0.3, 0.35]),
    BlockProperties::plant("fern", [0.25, 0.55, 0.22]),
    BlockProperties {
        name: "glowstone",
        solid: true,
        cutout: false,
        cross: false,
        liquid: false,
        color: [1.0, 0.85, 0.5],
        roughness: 0.5,
        metallic: 0.0,
        emissive: 1.0,
    },
];

impl Block {
    /// Every block type, in id order.
    pub const ALL: [Self; BLOCK_COUNT] = [
        Self::Air,
        Self::Bedrock,
        Self::Stone,
        Self::Dirt,
        Self::Grass,
        Self::Sand,
        Self::Snow,
        Self::Water,
        Self::FlowingWater,
        Self::CoalOre,
        Self::IronOre,
        Self::GoldOre,
        Self::DiamondOre,
        Self::Log,
        Self::Leaves,
        Self::TallGrass,
        Self::Flower,
        Self::Fern,
        Self::Glowstone,
    ];

    /// Returns the storage id.
    #[inline]
    #[must_use]
    pub const fn id(self) -> u8 {
        self as u8
    }

    /// Looks up a block by storage id.
    #[inline]
    #[must_use]
    pub const fn from_id(id: u8) -> Option<Self> {
        if (id as usize) < BLOCK_COUNT {
            Some(Self::ALL[id as usize])
        } else {
            None
        }
    }

    /// Returns the static property record.
    #[inline]
    #[must_use]
    pub fn properties(self) -> &'static BlockProperties {
        &PROPERTIES[self as usize]
    }

    /// Returns true for air.
    #[inline]
    #[must_use]
    pub const fn is_air(self) -> bool {
        matches!(self, Self::Air)
    }

    /// Returns true if the block occupies its cell.
    #[inline]
    #[must_use]
    pub fn is_solid(self) -> bool {
        self.properties().solid
    }

    /// Returns true for see-through solids.
    #[inline]
    #[must_use]
    pub fn is_cutout(self) -> bool {
        self.properties().cutout
    }

    /// Returns true if the block hides faces behind it.
    #[inline]
    #[must_use]
    pub fn is_opaque(self) -> bool {
        let props = self.properties();
        props.solid && !props.cutout
    }

    /// Returns true for cross-mesh plants.
    #[inline]
    #[must_use]
    pub fn is_cross(self) -> bool {
        self.properties().cross
    }

    /// Returns true for still or flowing water.
    #[inline]
    #[must_use]
    pub const fn is_water(self) -> bool {
        matches!(self, Self::Water | Self::FlowingWater)
    }

    /// Returns true if the block emits light.
    #[inline]
    #[must_use]
    pub fn is_emissive(self) -> bool {
        self.properties().emissive > 0.0
    }
}
