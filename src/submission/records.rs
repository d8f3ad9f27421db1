use crate::submission::registry::RendererHandle;

/// One (drawable, subset) pair submitted to the shadow or main path this frame.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct SubsetRecord {
    pub queue: i32,
    pub can_batch: bool,
    /// Squared distance from the camera.
    pub distance: f32,
    pub mesh_hash: u32,
    pub material_hash: u32,
    pub subset_index: u32,
    pub uses_copy_target: bool,
    /// Frustum test result. Only meaningful on the main path.
    pub do_render: bool,
    pub owner: Option<RendererHandle>,
}

impl SubsetRecord {
    /// Records with equal keys can share one instanced draw.
    pub fn batch_key(&self) -> (u32, u32, u32) {
        (self.material_hash, self.mesh_hash, self.subset_index)
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct UiRecord {
    pub depth: f32,
    pub material_hash: u32,
    pub texture_hash: u32,
    pub uses_copy_target: bool,
    pub owner: Option<RendererHandle>,
}

/// One draw call: a run of instance slots plus the routing fields of the record
/// that represents it.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DrawDescriptor {
    pub start_instance: u32,
    pub instance_count: u32,
    pub queue: i32,
    pub subset_index: u32,
    pub uses_copy_target: bool,
    pub owner: Option<RendererHandle>,
}

impl DrawDescriptor {
    pub fn instances(&self) -> std::ops::Range<usize> {
        self.start_instance as usize..(self.start_instance + self.instance_count) as usize
    }
}

/// The parts of a record the path buffer and instance writer care about, regardless
/// of path.
pub trait PathRecord: Default + Copy {
    fn owner(&self) -> Option<RendererHandle>;

    fn clear_owner(&mut self);
}

impl PathRecord for SubsetRecord {
    fn owner(&self) -> Option<RendererHandle> {
        self.owner
    }

    fn clear_owner(&mut self) {
        self.owner = None;
    }
}

impl PathRecord for UiRecord {
    fn owner(&self) -> Option<RendererHandle> {
        self.owner
    }

    fn clear_owner(&mut self) {
        self.owner = None;
    }
}
