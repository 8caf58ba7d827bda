use glam::*;

/// An axis-aligned bounding box.
///
/// A box with zero half extent is degenerate and has no visible extent, this is what an empty
/// set of points produces.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub center: Vec3,
    pub half_extent: Vec3,
}

impl Aabb {
    /// The degenerate box at the origin.
    pub const EMPTY: Self = Self {
        center: Vec3::ZERO,
        half_extent: Vec3::ZERO,
    };

    /// Create a new box from the min and max corners.
    pub fn from_min_max(min: Vec3, max: Vec3) -> Self {
        Self {
            center: (min + max) * 0.5,
            half_extent: (max - min) * 0.5,
        }
    }

    /// Create a new box enclosing the points.
    ///
    /// Returns [`Aabb::EMPTY`] if there are no points.
    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Self {
        let mut points = points.into_iter();
        let Some(first) = points.next() else {
            return Self::EMPTY;
        };

        let (min, max) = points.fold((first, first), |(min, max), p| (min.min(p), max.max(p)));
        Self::from_min_max(min, max)
    }

    /// Get the min corner.
    pub fn min(&self) -> Vec3 {
        self.center - self.half_extent
    }

    /// Get the max corner.
    pub fn max(&self) -> Vec3 {
        self.center + self.half_extent
    }

    /// Check if the box has no visible extent.
    pub fn is_degenerate(&self) -> bool {
        self.half_extent == Vec3::ZERO
    }

    /// Transform the box, returning the box enclosing the transformed box.
    pub fn transformed(&self, transform: &Mat4) -> Self {
        let linear = Mat3::from_mat4(*transform);
        let abs = Mat3::from_cols(linear.x_axis.abs(), linear.y_axis.abs(), linear.z_axis.abs());

        Self {
            center: transform.transform_point3(self.center),
            half_extent: abs * self.half_extent,
        }
    }
}

impl Default for Aabb {
    fn default() -> Self {
        Self::EMPTY
    }
}

/// A lazily recomputed [`Aabb`].
#[derive(Debug, Clone)]
pub struct LazyBound {
    value: Aabb,
    dirty: bool,
    recompute_count: u64,
}

impl LazyBound {
    /// Create a new bound that is computed on first read.
    pub fn new() -> Self {
        Self {
            value: Aabb::EMPTY,
            dirty: true,
            recompute_count: 0,
        }
    }

    /// Get the bound, recomputing it with `compute` only if dirty.
    pub fn get_or_recompute(&mut self, compute: impl FnOnce() -> Aabb) -> Aabb {
        if self.dirty {
            self.value = compute();
            self.dirty = false;
            self.recompute_count += 1;
        }

        self.value
    }

    /// Mark the bound dirty.
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Check if the bound is dirty.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Get the number of times the bound has been recomputed.
    pub fn recompute_count(&self) -> u64 {
        self.recompute_count
    }
}

impl Default for LazyBound {
    fn default() -> Self {
        Self::new()
    }
}

/// The bound kinds of [`BoundCache`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoundKind {
    Selection,
    Local,
    World,
}

/// The chain of bounds derived from a point cloud.
///
/// Dirtying cascades selection → local → world.
#[derive(Debug, Clone, Default)]
pub struct BoundCache {
    pub selection: LazyBound,
    pub local: LazyBound,
    pub world: LazyBound,
}

impl BoundCache {
    /// Mark the selection bound dirty, also the local and world bound.
    pub fn mark_selection_dirty(&mut self) {
        self.selection.mark_dirty();
        self.mark_local_dirty();
    }

    /// Mark the local bound dirty, also the world bound.
    pub fn mark_local_dirty(&mut self) {
        self.local.mark_dirty();
        self.mark_world_dirty();
    }

    /// Mark the world bound dirty.
    pub fn mark_world_dirty(&mut self) {
        self.world.mark_dirty();
    }

    /// Get the bound of `kind`.
    pub fn get(&self, kind: BoundKind) -> &LazyBound {
        match kind {
            BoundKind::Selection => &self.selection,
            BoundKind::Local => &self.local,
            BoundKind::World => &self.world,
        }
    }
}
