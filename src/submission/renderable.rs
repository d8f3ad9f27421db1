use glam::Vec3;

use crate::{
    backend::GraphicsBackend,
    math::bounds::Aabb,
    submission::{camera::Camera, instance_writer::InstanceCursor},
};

/// Render queue buckets. Lower queues are drawn first; anything at or above
/// `TRANSPARENT` is sorted back to front and never instanced.
pub mod render_queue {
    pub const BACKGROUND: i32 = 1000;
    pub const GEOMETRY: i32 = 2000;
    pub const ALPHA_TEST: i32 = 2450;
    pub const TRANSPARENT: i32 = 3000;
    pub const OVERLAY: i32 = 4000;
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShadowCastMode {
    /// Rendered normally, casts no shadow.
    Off,
    #[default]
    On,
    /// Only rendered into the shadow path.
    ShadowsOnly,
}

/// Everything a drawable needs to record one (possibly instanced) draw.
pub struct DrawCall<'a, B: GraphicsBackend> {
    pub subset_index: u32,
    pub first_instance: u32,
    pub instance_count: u32,
    pub instance_buffer: &'a B::InstanceBuffer,
    pub camera: &'a dyn Camera<B>,
    pub depth_only: bool,
}

impl<B: GraphicsBackend> DrawCall<'_, B> {
    pub fn instances(&self) -> std::ops::Range<u32> {
        self.first_instance..self.first_instance + self.instance_count
    }
}

/// A drawable object as seen by the submission engine.
///
/// Methods take `&self`: drawables are shared with the thread that registered them,
/// so per-frame state such as visibility or cached transforms needs interior
/// mutability.
pub trait Renderable<B: GraphicsBackend>: Send + Sync {
    fn is_active_and_enabled(&self) -> bool;

    /// Bit index tested against the camera's culling mask.
    fn layer(&self) -> u32;

    fn subset_count(&self) -> usize;

    /// Called once per frame per camera before the drawable's records are built.
    fn calculate_render_parameter(&self, camera: &dyn Camera<B>);

    fn world_position(&self) -> Vec3;

    fn shadow_cast_mode(&self) -> ShadowCastMode {
        ShadowCastMode::On
    }

    fn can_batch(&self) -> bool;

    /// Negative means the subset is not drawn at all.
    fn render_queue(&self, subset: usize) -> i32;

    fn mesh_hash(&self) -> u32;

    fn material_hash(&self, subset: usize) -> u32;

    /// UI drawables only. Zero means "nothing to draw".
    fn texture_hash(&self) -> u32 {
        0
    }

    fn uses_copy_target(&self, _subset: usize) -> bool {
        false
    }

    /// UI drawables only.
    fn depth(&self) -> f32 {
        0.0
    }

    fn set_visible(&self, visible: bool);

    fn renderer_bounds(&self) -> Aabb;

    /// Drawables that must never be frustum culled, e.g. particle systems whose
    /// bounds aren't known on the CPU.
    fn is_through_frustum_culling(&self) -> bool {
        false
    }

    /// Particles are skipped by the depth prepass.
    fn is_particle(&self) -> bool {
        false
    }

    /// Writes this drawable's per-instance payload at the cursor.
    fn write_instance(&self, cursor: &mut InstanceCursor<'_>);

    fn render(&self, context: &mut B::Context, draw: &DrawCall<'_, B>);
}
