//! Per-point state store and derived caches for editing 3D Gaussian splats.
//!
//! A [`PointCloud`] owns one [`PointState`] byte per point (selected, locked, deleted), the
//! per-point palette transform index, and the caches derived from them: the class
//! [`PointCounts`], the lazily recomputed selection, local and world [`Aabb`]s, and the
//! [`CompactionIndex`] that excludes deleted points from sorting.
//!
//! A [`SplatModel`] pairs the cloud with its primary and snapshot [`RenderInstance`]s and keeps
//! both consistent with every commit.

mod bound;
mod buffer;
mod compaction;
mod error;
mod external;
mod model;
mod point_cloud;
mod render_instance;
mod state;

pub use bound::*;
pub use buffer::*;
pub use compaction::*;
pub use error::*;
pub use external::*;
pub use model::*;
pub use point_cloud::*;
pub use render_instance::*;
pub use state::*;

pub use bitflags;
pub use glam;
pub use wgpu;
