use std::sync::Arc;

use crate::PointState;

/// The compaction index mapping compacted indices back to original indices.
///
/// The mapping holds the original indices of the live points in ascending order, so the relative
/// order of live points is the loaded order. It is [`None`] when no point is deleted, in which
/// case sorters iterate all points directly.
#[derive(Debug, Clone, Default)]
pub struct CompactionIndex {
    mapping: Option<Arc<[u32]>>,
    change_counter: u64,
}

impl CompactionIndex {
    /// Create a new compaction index from the states.
    pub fn new(states: &[PointState]) -> Self {
        Self {
            mapping: Self::compute(states),
            change_counter: 0,
        }
    }

    /// Compute the mapping of the states.
    pub fn compute(states: &[PointState]) -> Option<Arc<[u32]>> {
        if states.iter().all(|s| s.is_live()) {
            return None;
        }

        Some(
            states
                .iter()
                .enumerate()
                .filter(|(_, s)| s.is_live())
                .map(|(i, _)| i as u32)
                .collect(),
        )
    }

    /// Check if the mapping no longer matches the deleted points of the states.
    pub fn is_stale(&self, states: &[PointState]) -> bool {
        let live = states
            .iter()
            .enumerate()
            .filter(|(_, s)| s.is_live())
            .map(|(i, _)| i as u32);

        match &self.mapping {
            None => states.iter().any(|s| !s.is_live()),
            Some(mapping) => mapping.len() == states.len() || !live.eq(mapping.iter().copied()),
        }
    }

    /// Rebuild the mapping from the states.
    ///
    /// The change counter is only incremented if the mapping differs from the previous one.
    /// Returns whether the mapping changed.
    pub fn rebuild(&mut self, states: &[PointState]) -> bool {
        let mapping = Self::compute(states);

        if mapping == self.mapping {
            return false;
        }

        self.mapping = mapping;
        self.change_counter += 1;

        log::trace!(
            "Compaction index rebuilt with {} points, change counter {}",
            self.len(states.len()),
            self.change_counter
        );

        true
    }

    /// Get the mapping.
    pub fn mapping(&self) -> Option<&Arc<[u32]>> {
        self.mapping.as_ref()
    }

    /// Get the change counter.
    pub fn change_counter(&self) -> u64 {
        self.change_counter
    }

    /// Get the number of retained points given the total number of points.
    pub fn len(&self, point_count: usize) -> usize {
        self.mapping.as_ref().map_or(point_count, |m| m.len())
    }
}
