//! # World Error Types
//!
//! Errors returned by queries, edits and config changes on the live world.
//! Generation itself never fails.

use lithos_procedural::{ChunkCoord, ConfigError, GridDims};
use thiserror::Error;

/// Errors that can occur while operating on the live world.
#[derive(Error, Debug)]
pub enum WorldError {
    /// The chunk holding the block has not been generated or was evicted.
    #[error("chunk {0} is not resident")]
    ChunkNotResident(ChunkCoord),

    /// The block lies above or below the world.
    #[error("block ({x}, {y}, {z}) is outside the world height")]
    OutOfBounds {
        /// World X.
        x: i32,
        /// World Y.
        y: i32,
        /// World Z.
        z: i32,
    },

    /// The new config failed validation.
    #[error("invalid world config: {0}")]
    InvalidConfig(#[from] ConfigError),

    /// Resident grids cannot change shape in place.
    #[error("chunk dimensions changed from {from:?} to {to:?}; regenerate the world instead")]
    GridChangeRequiresRegenerate {
        /// Dimensions of the resident chunks.
        from: GridDims,
        /// Dimensions requested by the new config.
        to: GridDims,
    },
}

/// Result type for world operations.
pub type WorldResult<T> = Result<T, WorldError>;
