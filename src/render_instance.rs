use glam::*;

use crate::{PointCloud, SpatialSorter};

/// The kinds of render instances of a [`SplatModel`](crate::SplatModel).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InstanceKind {
    /// Follows the active camera's render target.
    Primary,
    /// Follows an independent offscreen target.
    Snapshot,
}

/// The appearance settings of the splats, shared by all render instances.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SplatAppearance {
    /// The highlight color of selected points.
    ///
    /// The alpha value is the highlight intensity.
    pub selected_color: Vec4,
    /// The highlight color of unselected points.
    pub unselected_color: Vec4,
    /// The highlight color of locked points.
    pub locked_color: Vec4,
    /// The tint multiplied with every point color.
    pub tint: Vec4,
    /// The alpha multiplier.
    pub transparency: f32,
    /// Whether the model is the currently selected model of the scene.
    pub model_selected: bool,
}

impl Default for SplatAppearance {
    fn default() -> Self {
        Self {
            selected_color: vec4(1.0, 1.0, 0.0, 1.0),
            unselected_color: vec4(0.0, 0.0, 1.0, 0.5),
            locked_color: vec4(0.0, 0.0, 0.0, 0.05),
            tint: Vec4::ONE,
            transparency: 1.0,
            model_selected: false,
        }
    }
}

/// The POD representation of the material parameters of a render instance.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SplatMaterialPod {
    pub selected_color: Vec4,
    pub unselected_color: Vec4,
    pub locked_color: Vec4,
    pub tint: Vec4,
    pub viewport: Vec2,
    pub transparency: f32,
    pub model_selected: u32,
}

impl SplatMaterialPod {
    /// Create a new material.
    pub fn new(appearance: &SplatAppearance, viewport: UVec2) -> Self {
        Self {
            selected_color: appearance.selected_color,
            unselected_color: appearance.unselected_color,
            locked_color: appearance.locked_color,
            tint: appearance.tint,
            viewport: viewport.as_vec2(),
            transparency: appearance.transparency,
            model_selected: appearance.model_selected as u32,
        }
    }
}

/// One independently rendered view of a [`PointCloud`].
///
/// The instance owns its sorter and material, the point data is only read at sync.
#[derive(Debug)]
pub struct RenderInstance<S: SpatialSorter> {
    kind: InstanceKind,
    sorter: S,
    material: SplatMaterialPod,
    viewport: UVec2,
    attached: bool,
    synced_change_counter: Option<u64>,
    state_generation: Option<u64>,
    transform_index_generation: Option<u64>,
}

impl<S: SpatialSorter> RenderInstance<S> {
    /// Create a new attached render instance.
    pub fn new(kind: InstanceKind, sorter: S, viewport: UVec2) -> Self {
        log::debug!("Creating {kind:?} render instance");

        Self {
            kind,
            sorter,
            material: SplatMaterialPod::new(&SplatAppearance::default(), viewport),
            viewport,
            attached: true,
            synced_change_counter: None,
            state_generation: None,
            transform_index_generation: None,
        }
    }

    /// Get the kind.
    pub fn kind(&self) -> InstanceKind {
        self.kind
    }

    /// Get the sorter.
    pub fn sorter(&self) -> &S {
        &self.sorter
    }

    /// Get the sorter mutably.
    pub fn sorter_mut(&mut self) -> &mut S {
        &mut self.sorter
    }

    /// Take the sorter, consuming the instance.
    pub fn into_sorter(self) -> S {
        self.sorter
    }

    /// Get the material as of the last sync.
    pub fn material(&self) -> &SplatMaterialPod {
        &self.material
    }

    /// Get the viewport size.
    pub fn viewport(&self) -> UVec2 {
        self.viewport
    }

    /// Set the viewport size, applied at the next sync.
    pub fn set_viewport(&mut self, viewport: UVec2) {
        self.viewport = viewport;
    }

    /// Check if the instance is attached.
    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Attach the instance, it catches up at the next sync.
    pub fn attach(&mut self) {
        self.attached = true;
    }

    /// Detach the instance, e.g. when its camera is disabled.
    pub fn detach(&mut self) {
        self.attached = false;
    }

    /// Get the change counter of the compaction mapping the sorter was last given.
    pub fn synced_change_counter(&self) -> Option<u64> {
        self.synced_change_counter
    }

    /// Get the state commit generation the material was last bound to.
    pub fn state_generation(&self) -> Option<u64> {
        self.state_generation
    }

    /// Get the transform index commit generation the material was last bound to.
    pub fn transform_index_generation(&self) -> Option<u64> {
        self.transform_index_generation
    }

    /// Check if the sorter is behind the compaction mapping of `cloud`.
    pub fn is_stale(&self, cloud: &PointCloud) -> bool {
        self.synced_change_counter != Some(cloud.change_counter())
    }

    /// Sync the instance with `cloud`.
    ///
    /// Does nothing if detached. Returns whether the sorter was given a new compaction mapping.
    pub fn sync(&mut self, cloud: &PointCloud, appearance: &SplatAppearance) -> bool {
        if !self.attached {
            log::trace!("Skipping sync of detached {:?} render instance", self.kind);
            return false;
        }

        let resort = self.is_stale(cloud);
        if resort {
            self.sorter
                .set_compaction_mapping(cloud.compaction_mapping().cloned());
            self.synced_change_counter = Some(cloud.change_counter());

            log::trace!(
                "{:?} render instance resorting at change counter {}",
                self.kind,
                cloud.change_counter()
            );
        }

        self.state_generation = Some(cloud.state_generation());
        self.transform_index_generation = Some(cloud.transform_index_generation());
        self.material = SplatMaterialPod::new(appearance, self.viewport);

        resort
    }
}
