use std::sync::Arc;

use glam::*;

use crate::Error;

/// The logical GPU mirror buffers of a point cloud.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MirrorBuffer {
    /// One byte of [`PointState`](crate::PointState) per point.
    State,
    /// One `u16` palette slot index per point.
    TransformIndex,
}

/// Uploads the bytes of a point cloud buffer to its GPU mirror.
///
/// Uploads are fire-and-forget, completion is owned by the graphics layer.
pub trait BufferUpload {
    /// Upload the bytes of `buffer`.
    fn upload_bytes(&mut self, buffer: MirrorBuffer, bytes: &[u8]);
}

/// A palette of rigid transforms referenced by points through their transform index.
///
/// Slot 0 is the identity.
pub trait TransformPalette {
    /// Allocate a new slot.
    fn allocate_slot(&mut self) -> Result<u16, Error>;

    /// Set the transform of a slot.
    fn set_slot(&mut self, index: u16, pos: Vec3, rot: Quat, scale: Vec3);
}

/// Sorts the retained points into render order for one render instance.
pub trait SpatialSorter {
    /// Set the compaction mapping.
    ///
    /// Only the indices in the mapping are sorted, or every point if [`None`].
    fn set_compaction_mapping(&mut self, mapping: Option<Arc<[u32]>>);

    /// Set the sort centers of all points.
    fn set_centers(&mut self, centers: &[Vec3]);
}
