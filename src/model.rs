use glam::*;

use crate::{
    BufferUpload, Error, InstanceKind, PointCloud, PointState, RenderInstance, SpatialSorter,
    SplatAppearance, SplatEvents, TransformPalette,
};

/// A loaded point cloud with its primary and snapshot render instances.
#[derive(Debug)]
pub struct SplatModel<S: SpatialSorter> {
    cloud: PointCloud,
    primary: RenderInstance<S>,
    snapshot: RenderInstance<S>,
}

impl<S: SpatialSorter> SplatModel<S> {
    /// Create a new model.
    pub fn new(
        cloud: PointCloud,
        primary_sorter: S,
        primary_viewport: UVec2,
        snapshot_sorter: S,
        snapshot_viewport: UVec2,
    ) -> Self {
        let primary = RenderInstance::new(InstanceKind::Primary, primary_sorter, primary_viewport);
        let snapshot =
            RenderInstance::new(InstanceKind::Snapshot, snapshot_sorter, snapshot_viewport);

        log::info!("Splat model created with {} points", cloud.point_count());

        Self {
            cloud,
            primary,
            snapshot,
        }
    }

    /// Get the point cloud.
    pub fn cloud(&self) -> &PointCloud {
        &self.cloud
    }

    /// Get the point cloud mutably.
    pub fn cloud_mut(&mut self) -> &mut PointCloud {
        &mut self.cloud
    }

    /// Get a render instance.
    pub fn instance(&self, kind: InstanceKind) -> &RenderInstance<S> {
        match kind {
            InstanceKind::Primary => &self.primary,
            InstanceKind::Snapshot => &self.snapshot,
        }
    }

    /// Get a render instance mutably.
    pub fn instance_mut(&mut self, kind: InstanceKind) -> &mut RenderInstance<S> {
        match kind {
            InstanceKind::Primary => &mut self.primary,
            InstanceKind::Snapshot => &mut self.snapshot,
        }
    }

    /// Edit the states then commit.
    ///
    /// `changed` is the flags `edit` may change. Returns whether the compaction mapping changed.
    pub fn edit_state(
        &mut self,
        changed: PointState,
        upload: &mut impl BufferUpload,
        edit: impl FnOnce(&mut [PointState]),
    ) -> bool {
        edit(self.cloud.states_mut());
        self.cloud.commit_state(changed, upload)
    }

    /// Select the selectable points at `indices`.
    pub fn select(&mut self, indices: &[u32], upload: &mut impl BufferUpload) {
        self.edit_state(PointState::SELECTED, upload, |states| {
            for &index in indices {
                match states.get_mut(index as usize) {
                    Some(state) if state.is_selectable() => state.insert(PointState::SELECTED),
                    Some(_) => {}
                    None => log::warn!("Select index {index} out of range"),
                }
            }
        });
    }

    /// Deselect the points at `indices`.
    pub fn deselect(&mut self, indices: &[u32], upload: &mut impl BufferUpload) {
        self.edit_state(PointState::SELECTED, upload, |states| {
            for &index in indices {
                match states.get_mut(index as usize) {
                    Some(state) => state.remove(PointState::SELECTED),
                    None => log::warn!("Deselect index {index} out of range"),
                }
            }
        });
    }

    /// Select all selectable points.
    pub fn select_all(&mut self, upload: &mut impl BufferUpload) {
        self.edit_state(PointState::SELECTED, upload, |states| {
            states
                .iter_mut()
                .filter(|s| s.is_selectable())
                .for_each(|s| s.insert(PointState::SELECTED));
        });
    }

    /// Deselect all points.
    pub fn deselect_all(&mut self, upload: &mut impl BufferUpload) {
        self.edit_state(PointState::SELECTED, upload, |states| {
            states
                .iter_mut()
                .for_each(|s| s.remove(PointState::SELECTED));
        });
    }

    /// Invert the selection of all selectable points.
    pub fn invert_selection(&mut self, upload: &mut impl BufferUpload) {
        self.edit_state(PointState::SELECTED, upload, |states| {
            states
                .iter_mut()
                .filter(|s| s.is_selectable())
                .for_each(|s| s.toggle(PointState::SELECTED));
        });
    }

    /// Lock the selected points.
    pub fn lock_selected(&mut self, upload: &mut impl BufferUpload) {
        self.edit_state(PointState::LOCKED, upload, |states| {
            states
                .iter_mut()
                .filter(|s| s.is_selectable() && s.contains(PointState::SELECTED))
                .for_each(|s| s.insert(PointState::LOCKED));
        });
    }

    /// Unlock all points.
    pub fn unlock_all(&mut self, upload: &mut impl BufferUpload) {
        self.edit_state(PointState::LOCKED, upload, |states| {
            states.iter_mut().for_each(|s| s.remove(PointState::LOCKED));
        });
    }

    /// Delete the selected points.
    ///
    /// Returns whether the compaction mapping changed.
    pub fn delete_selected(&mut self, upload: &mut impl BufferUpload) -> bool {
        self.edit_state(PointState::DELETED, upload, |states| {
            states
                .iter_mut()
                .filter(|s| s.is_selectable() && s.contains(PointState::SELECTED))
                .for_each(|s| s.insert(PointState::DELETED));
        })
    }

    /// Restore all deleted points.
    ///
    /// Returns whether the compaction mapping changed.
    pub fn undelete_all(&mut self, upload: &mut impl BufferUpload) -> bool {
        self.edit_state(PointState::DELETED, upload, |states| {
            states.iter_mut().for_each(|s| s.remove(PointState::DELETED));
        })
    }

    /// Allocate a palette slot and point every selected point at it.
    ///
    /// Returns the slot.
    pub fn bind_selection_to_slot(
        &mut self,
        palette: &mut impl TransformPalette,
        upload: &mut impl BufferUpload,
    ) -> Result<u16, Error> {
        let slot = palette.allocate_slot()?;
        let selected = self.cloud.selected_indices();

        let transform_indices = self.cloud.transform_indices_mut();
        for &index in &selected {
            transform_indices[index as usize] = slot;
        }
        self.cloud.commit_transform_index(upload);

        log::debug!("Bound {} selected points to palette slot {slot}", selected.len());

        Ok(slot)
    }

    /// Set the transform of a palette slot.
    ///
    /// The bounds are over local positions and do not follow palette transforms, so they are
    /// left clean. Bake a move into the bounds with [`PointCloud::edit_positions`] or
    /// [`PointCloud::replace_positions`].
    pub fn move_slot(
        &mut self,
        palette: &mut impl TransformPalette,
        slot: u16,
        pos: Vec3,
        rot: Quat,
        scale: Vec3,
    ) {
        palette.set_slot(slot, pos, rot, scale);
        self.cloud.raise(SplatEvents::RENDER);
    }

    /// Apply the world space centers computed for the points.
    ///
    /// `centers` is a flat xyz buffer, forwarded to both sorters.
    pub fn apply_processed_centers(&mut self, centers: &[f32]) -> Result<(), Error> {
        let centers: &[Vec3] = bytemuck::try_cast_slice(centers).map_err(|_| {
            log::error!("Center buffer of {} floats is misaligned", centers.len());
            Error::CenterBufferMisaligned { len: centers.len() }
        })?;

        if centers.len() != self.cloud.point_count() as usize {
            log::error!(
                "Center count mismatch, cloud has {}, but {} were provided",
                self.cloud.point_count(),
                centers.len()
            );
            return Err(Error::CenterCountMismatch {
                expected: self.cloud.point_count() as usize,
                actual: centers.len(),
            });
        }

        self.primary.sorter_mut().set_centers(centers);
        self.snapshot.sorter_mut().set_centers(centers);
        self.cloud.raise(SplatEvents::RENDER);

        Ok(())
    }

    /// Sync a render instance for this render pass.
    ///
    /// Returns whether its sorter was given a new compaction mapping.
    pub fn sync_instance(&mut self, kind: InstanceKind, appearance: &SplatAppearance) -> bool {
        let instance = match kind {
            InstanceKind::Primary => &mut self.primary,
            InstanceKind::Snapshot => &mut self.snapshot,
        };

        instance.sync(&self.cloud, appearance)
    }

    /// Sync both render instances for this render pass.
    pub fn sync_instances(&mut self, appearance: &SplatAppearance) {
        self.sync_instance(InstanceKind::Primary, appearance);
        self.sync_instance(InstanceKind::Snapshot, appearance);
    }

    /// Notify that the sorter of a render instance finished resorting.
    pub fn sort_complete(&mut self, kind: InstanceKind) {
        if self.instance(kind).is_attached() {
            self.cloud.raise(SplatEvents::RENDER);
        }
    }

    /// Take the pending events for the owning scene.
    pub fn take_events(&mut self) -> SplatEvents {
        self.cloud.take_events()
    }

    /// Remove the model, detaching both render instances first.
    ///
    /// Returns the point cloud and the sorters.
    pub fn remove(mut self) -> (PointCloud, S, S) {
        self.primary.detach();
        self.snapshot.detach();

        log::info!("Splat model removed");

        (self.cloud, self.primary.into_sorter(), self.snapshot.into_sorter())
    }
}
