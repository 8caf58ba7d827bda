use std::sync::Arc;

use glam::*;

use crate::{
    Aabb, BoundCache, BoundKind, BufferUpload, CompactionIndex, Error, MirrorBuffer, PointClass,
    PointCounts, PointState,
};

bitflags::bitflags! {
    /// Events raised by point cloud mutations for the owning scene.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct SplatEvents: u8 {
        /// A re-render is required.
        const RENDER = 1 << 0;
        /// The world bound changed, so the scene aggregate bound is stale.
        const SCENE_BOUND_DIRTY = 1 << 1;
    }
}

/// The per-point state of a loaded point cloud and the caches derived from it.
///
/// All mutation of the state goes through a commit, which recounts the classes, dirties the
/// bounds, uploads the GPU mirror, and rebuilds the compaction index when deletion changed.
#[derive(Debug, Clone)]
pub struct PointCloud {
    states: Vec<PointState>,
    transform_indices: Vec<u16>,
    positions: Vec<Vec3>,
    counts: PointCounts,
    bounds: BoundCache,
    compaction: CompactionIndex,
    world_transform: Mat4,
    state_generation: u64,
    transform_index_generation: u64,
    events: SplatEvents,
}

impl PointCloud {
    /// Create a new point cloud with all states and transform indices zeroed.
    pub fn new(positions: Vec<Vec3>) -> Self {
        let count = positions.len();
        Self::from_parts(positions, vec![PointState::empty(); count], vec![0; count])
    }

    /// Create a new point cloud from already encoded states and transform indices.
    ///
    /// Unknown state bits are retained.
    pub fn with_state(
        positions: Vec<Vec3>,
        states: Vec<u8>,
        transform_indices: Vec<u16>,
    ) -> Result<Self, Error> {
        if states.len() != positions.len() {
            return Err(Error::StateCountMismatch {
                expected: positions.len(),
                actual: states.len(),
            });
        }

        if transform_indices.len() != positions.len() {
            return Err(Error::TransformIndexCountMismatch {
                expected: positions.len(),
                actual: transform_indices.len(),
            });
        }

        let states = states.into_iter().map(PointState::from_bits_retain).collect();

        Ok(Self::from_parts(positions, states, transform_indices))
    }

    fn from_parts(
        positions: Vec<Vec3>,
        states: Vec<PointState>,
        transform_indices: Vec<u16>,
    ) -> Self {
        let counts = PointCounts::from_states(&states);
        let compaction = CompactionIndex::new(&states);

        log::debug!(
            "Point cloud created with {} points, {} deleted",
            positions.len(),
            counts.deleted
        );

        Self {
            states,
            transform_indices,
            positions,
            counts,
            bounds: BoundCache::default(),
            compaction,
            world_transform: Mat4::IDENTITY,
            state_generation: 0,
            transform_index_generation: 0,
            events: SplatEvents::empty(),
        }
    }

    /// Get the number of points.
    pub fn point_count(&self) -> u32 {
        self.states.len() as u32
    }

    /// Get the states.
    pub fn states(&self) -> &[PointState] {
        &self.states
    }

    /// Get the states for editing.
    ///
    /// Call [`PointCloud::commit_state`] after editing.
    pub fn states_mut(&mut self) -> &mut [PointState] {
        &mut self.states
    }

    /// Replace all states.
    ///
    /// Call [`PointCloud::commit_state`] after replacing.
    ///
    /// # Panics
    ///
    /// Panics if the length of `states` is not the point count.
    pub fn replace_states(&mut self, states: &[PointState]) {
        assert_eq!(
            states.len(),
            self.states.len(),
            "state length must match the point count"
        );
        self.states.copy_from_slice(states);
    }

    /// Get the class of the point at `index`.
    pub fn class_at(&self, index: usize) -> Option<PointClass> {
        self.states.get(index).map(|s| s.class())
    }

    /// Get the indices of the points counted as selected.
    pub fn selected_indices(&self) -> Vec<u32> {
        self.states
            .iter()
            .enumerate()
            .filter(|(_, s)| s.class() == PointClass::Selected)
            .map(|(i, _)| i as u32)
            .collect()
    }

    /// Get the class counts as of the last commit.
    pub fn counts(&self) -> PointCounts {
        self.counts
    }

    /// Commit the edited states.
    ///
    /// `changed` is the flags that may have changed. The compaction index is rebuilt if it
    /// contains [`PointState::DELETED`], or otherwise if the deleted points no longer match the
    /// mapping, so an inaccurate mask never leaves the mapping stale.
    ///
    /// Returns whether the compaction mapping changed.
    pub fn commit_state(&mut self, changed: PointState, upload: &mut impl BufferUpload) -> bool {
        let previous = self.counts;
        self.counts = PointCounts::from_states(&self.states);

        self.mark_selection_dirty();

        let rebuild = if changed.contains(PointState::DELETED) {
            true
        } else if previous.deleted != self.counts.deleted || self.compaction.is_stale(&self.states)
        {
            log::debug!("Deleted points changed outside the changed mask");
            true
        } else {
            false
        };

        let compacted = rebuild && self.rebuild_compaction();

        upload.upload_bytes(MirrorBuffer::State, bytemuck::cast_slice(&self.states));
        self.state_generation += 1;
        self.events.insert(SplatEvents::RENDER);

        log::trace!(
            "State committed: live {}, deleted {}, locked {}, selected {}",
            self.counts.live,
            self.counts.deleted,
            self.counts.locked,
            self.counts.selected,
        );

        compacted
    }

    /// Rebuild the compaction index from the states.
    ///
    /// Returns whether the mapping changed.
    pub fn rebuild_compaction(&mut self) -> bool {
        self.compaction.rebuild(&self.states)
    }

    /// Get the compaction mapping.
    ///
    /// This is [`None`] when no point is deleted.
    pub fn compaction_mapping(&self) -> Option<&Arc<[u32]>> {
        self.compaction.mapping()
    }

    /// Get the change counter of the compaction mapping.
    pub fn change_counter(&self) -> u64 {
        self.compaction.change_counter()
    }

    /// Get the number of state commits.
    pub fn state_generation(&self) -> u64 {
        self.state_generation
    }

    /// Get the transform indices.
    pub fn transform_indices(&self) -> &[u16] {
        &self.transform_indices
    }

    /// Get the transform indices for editing.
    ///
    /// Call [`PointCloud::commit_transform_index`] after editing.
    pub fn transform_indices_mut(&mut self) -> &mut [u16] {
        &mut self.transform_indices
    }

    /// Commit the edited transform indices.
    pub fn commit_transform_index(&mut self, upload: &mut impl BufferUpload) {
        upload.upload_bytes(
            MirrorBuffer::TransformIndex,
            bytemuck::cast_slice(&self.transform_indices),
        );
        self.transform_index_generation += 1;

        self.mark_selection_dirty();
        self.events.insert(SplatEvents::RENDER);
    }

    /// Get the number of transform index commits.
    pub fn transform_index_generation(&self) -> u64 {
        self.transform_index_generation
    }

    /// Get the local positions.
    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    /// Edit the local positions.
    pub fn edit_positions<R>(&mut self, edit: impl FnOnce(&mut [Vec3]) -> R) -> R {
        let result = edit(&mut self.positions);
        self.mark_selection_dirty();
        self.events.insert(SplatEvents::RENDER);
        result
    }

    /// Replace all local positions, e.g. after reloading the point attributes.
    ///
    /// There must be exactly one position per point.
    pub fn replace_positions(&mut self, positions: Vec<Vec3>) -> Result<(), Error> {
        if positions.len() != self.positions.len() {
            log::error!(
                "Position count mismatch, cloud has {}, but {} were provided",
                self.positions.len(),
                positions.len()
            );
            return Err(Error::PositionCountMismatch {
                expected: self.positions.len(),
                actual: positions.len(),
            });
        }

        self.edit_positions(|current| current.copy_from_slice(&positions));

        Ok(())
    }

    /// Get the node to world transform.
    pub fn world_transform(&self) -> Mat4 {
        self.world_transform
    }

    /// Set the node to world transform.
    pub fn set_world_transform(&mut self, transform: Mat4) {
        self.world_transform = transform;
        self.mark_world_dirty();
        self.events.insert(SplatEvents::RENDER);
    }

    /// Get the bound of the selected points in local space.
    pub fn selection_bound(&mut self) -> Aabb {
        let (states, positions) = (&self.states, &self.positions);
        self.bounds.selection.get_or_recompute(|| {
            Aabb::from_points(
                states
                    .iter()
                    .zip(positions)
                    .filter(|(s, _)| s.class() == PointClass::Selected)
                    .map(|(_, p)| *p),
            )
        })
    }

    /// Get the bound of the live points in local space.
    pub fn local_bound(&mut self) -> Aabb {
        let (states, positions) = (&self.states, &self.positions);
        self.bounds.local.get_or_recompute(|| {
            Aabb::from_points(
                states
                    .iter()
                    .zip(positions)
                    .filter(|(s, _)| s.is_live())
                    .map(|(_, p)| *p),
            )
        })
    }

    /// Get the bound of the live points in world space.
    pub fn world_bound(&mut self) -> Aabb {
        let local = self.local_bound();
        let transform = self.world_transform;
        self.bounds
            .world
            .get_or_recompute(|| local.transformed(&transform))
    }

    /// Check if the bound of `kind` is dirty.
    pub fn is_bound_dirty(&self, kind: BoundKind) -> bool {
        self.bounds.get(kind).is_dirty()
    }

    /// Get the number of times the bound of `kind` has been recomputed.
    pub fn bound_recompute_count(&self, kind: BoundKind) -> u64 {
        self.bounds.get(kind).recompute_count()
    }

    /// Take the pending events, leaving none.
    pub fn take_events(&mut self) -> SplatEvents {
        std::mem::replace(&mut self.events, SplatEvents::empty())
    }

    /// Raise events.
    pub(crate) fn raise(&mut self, events: SplatEvents) {
        self.events.insert(events);
    }

    fn mark_selection_dirty(&mut self) {
        self.bounds.mark_selection_dirty();
        self.events.insert(SplatEvents::SCENE_BOUND_DIRTY);
    }

    fn mark_world_dirty(&mut self) {
        self.bounds.mark_world_dirty();
        self.events.insert(SplatEvents::SCENE_BOUND_DIRTY);
    }
}
