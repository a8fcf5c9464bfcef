//! # LITHOS
//!
//! Streams an infinite, deterministic voxel world around a moving viewer.
//!
//! ## Architecture
//!
//! ```text
//! viewer + view-projection
//!         |
//!         v
//! ChunkLifecycleManager::tick
//!   |- enqueue every chunk inside the render circle   (QUEUED)
//!   |- generate up to `chunks_per_tick` nearest ones  (GENERATING)
//!   |- mesh them, then remesh invalidated neighbors   (MESHING -> READY)
//!   '- evict chunks beyond the hysteresis radius
//!         |
//!         v
//! draw_calls() / point_lights()  ->  renderer
//! ```
//!
//! The manager never touches the GPU. Buffers are created and destroyed
//! through the [`MeshUploader`] the caller passes to each tick.
//!
//! ## Example
//!
//! ```rust
//! use lithos::{ChunkLifecycleManager, NullUploader};
//! use lithos_procedural::{WorldConfig, WorldSeed};
//!
//! let mut config = WorldConfig::default();
//! config.render.render_distance = 1;
//! config.render.chunks_per_tick = 5;
//!
//! let mut world = ChunkLifecycleManager::new(WorldSeed::new(7), config).unwrap();
//! let mut uploader = NullUploader::default();
//! let identity = [
//!     [1.0, 0.0, 0.0, 0.0],
//!     [0.0, 1.0, 0.0, 0.0],
//!     [0.0, 0.0, 1.0, 0.0],
//!     [0.0, 0.0, 0.0, 1.0],
//! ];
//!
//! let report = world.tick([8.0, 80.0, 8.0], &identity, &mut uploader);
//! assert_eq!(report.generated, 5);
//! assert_eq!(world.stats().ready, 5);
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod error;
pub mod upload;
pub mod world;

pub use error::{WorldError, WorldResult};
pub use upload::{BufferId, DrawCall, MeshBuffers, MeshUploader, NullUploader};
pub use world::{ChunkLifecycleManager, ChunkState, TickReport, WorldStats};
