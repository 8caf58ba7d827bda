bitflags::bitflags! {
    /// The per-point state flags.
    ///
    /// The flags are independent and may combine freely, e.g. a point may be both
    /// [`PointState::DELETED`] and [`PointState::SELECTED`]. Use [`PointState::class`] to get
    /// the single class a point is counted as.
    #[repr(transparent)]
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, bytemuck::Pod, bytemuck::Zeroable)]
    pub struct PointState: u8 {
        const SELECTED = 1 << 0;
        const LOCKED = 1 << 1;
        const DELETED = 1 << 2;
    }
}

impl PointState {
    /// Get the class of the point.
    ///
    /// The priority is [`PointState::DELETED`] > [`PointState::LOCKED`] >
    /// [`PointState::SELECTED`]. The bits themselves are left untouched.
    pub const fn class(self) -> PointClass {
        if self.contains(Self::DELETED) {
            PointClass::Deleted
        } else if self.contains(Self::LOCKED) {
            PointClass::Locked
        } else if self.contains(Self::SELECTED) {
            PointClass::Selected
        } else {
            PointClass::Normal
        }
    }

    /// Check if the point is live, i.e. not deleted.
    pub const fn is_live(self) -> bool {
        !self.contains(Self::DELETED)
    }

    /// Check if the point is selectable, i.e. neither locked nor deleted.
    pub const fn is_selectable(self) -> bool {
        !self.intersects(Self::LOCKED.union(Self::DELETED))
    }
}

/// The exclusive class of a point used for counting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointClass {
    Normal,
    Selected,
    Locked,
    Deleted,
}

/// The counts of each [`PointClass`] in a point cloud.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PointCounts {
    /// Points not deleted.
    pub live: u32,
    pub deleted: u32,
    pub locked: u32,
    pub selected: u32,
}

impl PointCounts {
    /// Count the points by class.
    pub fn from_states(states: &[PointState]) -> Self {
        let mut counts = Self::default();

        for state in states {
            match state.class() {
                PointClass::Deleted => counts.deleted += 1,
                PointClass::Locked => counts.locked += 1,
                PointClass::Selected => counts.selected += 1,
                PointClass::Normal => {}
            }
        }

        counts.live = states.len() as u32 - counts.deleted;
        counts
    }

    /// Get the total number of points.
    pub fn total(&self) -> u32 {
        self.live + self.deleted
    }
}
