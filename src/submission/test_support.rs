//! Drawables and a camera for exercising the pipeline against the headless backend.

use std::{
    f32::consts::FRAC_PI_2,
    sync::atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering},
};

use glam::{Mat4, Vec3};

use crate::{
    backend::headless::{HeadlessBackend, HeadlessPass, RecordedCommand, RecordedDraw},
    math::{bounds::Aabb, frustum::Frustum},
    submission::{
        camera::Camera,
        instance_writer::InstanceCursor,
        renderable::{render_queue, DrawCall, Renderable, ShadowCastMode},
    },
};

static NEXT_ID: AtomicU32 = AtomicU32::new(1);

#[derive(Debug, Clone, Copy)]
pub struct TestSubset {
    pub queue: i32,
    pub material_hash: u32,
    pub uses_copy_target: bool,
}

pub struct TestDrawable {
    pub name: &'static str,
    pub id: u32,
    active: AtomicBool,
    layer: u32,
    subsets: Vec<TestSubset>,
    mesh_hash: u32,
    can_batch: bool,
    position: Vec3,
    bounds: Aabb,
    shadow_cast_mode: ShadowCastMode,
    particle: bool,
    unculled: bool,
    texture_hash: u32,
    depth: f32,
    visible: AtomicBool,
    parameter_updates: AtomicUsize,
}

impl TestDrawable {
    /// A one-subset batchable cube in front of [`TestCamera::new`].
    pub fn opaque(name: &'static str) -> Self {
        let position = Vec3::new(0.0, 0.0, 10.0);

        Self {
            name,
            id: NEXT_ID.fetch_add(1, Ordering::Relaxed),
            active: AtomicBool::new(true),
            layer: 0,
            subsets: vec![TestSubset {
                queue: render_queue::GEOMETRY,
                material_hash: 1,
                uses_copy_target: false,
            }],
            mesh_hash: 1,
            can_batch: true,
            position,
            bounds: Aabb::from_center_half_extents(position, Vec3::splat(0.5)),
            shadow_cast_mode: ShadowCastMode::On,
            particle: false,
            unculled: false,
            texture_hash: 0,
            depth: 0.0,
            visible: AtomicBool::new(false),
            parameter_updates: AtomicUsize::new(0),
        }
    }

    pub fn transparent(name: &'static str) -> Self {
        Self::opaque(name).with_queue(render_queue::TRANSPARENT)
    }

    pub fn ui(name: &'static str, depth: f32, material_hash: u32, texture_hash: u32) -> Self {
        Self {
            texture_hash,
            depth,
            ..Self::opaque(name).with_material(material_hash)
        }
    }

    pub fn with_queue(mut self, queue: i32) -> Self {
        for subset in &mut self.subsets {
            subset.queue = queue;
        }
        self
    }

    pub fn with_material(mut self, material_hash: u32) -> Self {
        for subset in &mut self.subsets {
            subset.material_hash = material_hash;
        }
        self
    }

    pub fn with_subsets(mut self, subsets: Vec<TestSubset>) -> Self {
        self.subsets = subsets;
        self
    }

    pub fn with_mesh(mut self, mesh_hash: u32) -> Self {
        self.mesh_hash = mesh_hash;
        self
    }

    pub fn with_layer(mut self, layer: u32) -> Self {
        self.layer = layer;
        self
    }

    /// Moves the drawable and its bounds.
    pub fn at(mut self, position: Vec3) -> Self {
        self.position = position;
        self.bounds = Aabb::from_center_half_extents(position, Vec3::splat(0.5));
        self
    }

    pub fn with_shadow_cast_mode(mut self, mode: ShadowCastMode) -> Self {
        self.shadow_cast_mode = mode;
        self
    }

    pub fn with_copy_target(mut self) -> Self {
        for subset in &mut self.subsets {
            subset.uses_copy_target = true;
        }
        self
    }

    pub fn unbatched(mut self) -> Self {
        self.can_batch = false;
        self
    }

    pub fn particle(mut self) -> Self {
        self.particle = true;
        self.unculled = true;
        self
    }

    pub fn unculled(mut self) -> Self {
        self.unculled = true;
        self
    }

    pub fn set_active(&self, active: bool) {
        self.active.store(active, Ordering::Relaxed);
    }

    pub fn is_visible(&self) -> bool {
        self.visible.load(Ordering::Relaxed)
    }

    pub fn parameter_updates(&self) -> usize {
        self.parameter_updates.load(Ordering::Relaxed)
    }
}

impl Renderable<HeadlessBackend> for TestDrawable {
    fn is_active_and_enabled(&self) -> bool {
        self.active.load(Ordering::Relaxed)
    }

    fn layer(&self) -> u32 {
        self.layer
    }

    fn subset_count(&self) -> usize {
        self.subsets.len()
    }

    fn calculate_render_parameter(&self, _camera: &dyn Camera<HeadlessBackend>) {
        self.parameter_updates.fetch_add(1, Ordering::Relaxed);
    }

    fn world_position(&self) -> Vec3 {
        self.position
    }

    fn shadow_cast_mode(&self) -> ShadowCastMode {
        self.shadow_cast_mode
    }

    fn can_batch(&self) -> bool {
        self.can_batch
    }

    fn render_queue(&self, subset: usize) -> i32 {
        self.subsets[subset].queue
    }

    fn mesh_hash(&self) -> u32 {
        self.mesh_hash
    }

    fn material_hash(&self, subset: usize) -> u32 {
        self.subsets[subset].material_hash
    }

    fn texture_hash(&self) -> u32 {
        self.texture_hash
    }

    fn uses_copy_target(&self, subset: usize) -> bool {
        self.subsets[subset].uses_copy_target
    }

    fn depth(&self) -> f32 {
        self.depth
    }

    fn set_visible(&self, visible: bool) {
        self.visible.store(visible, Ordering::Relaxed);
    }

    fn renderer_bounds(&self) -> Aabb {
        self.bounds
    }

    fn is_through_frustum_culling(&self) -> bool {
        self.unculled
    }

    fn is_particle(&self) -> bool {
        self.particle
    }

    fn write_instance(&self, cursor: &mut InstanceCursor<'_>) {
        cursor.write(&self.id);
    }

    fn render(&self, context: &mut HeadlessPass, draw: &DrawCall<'_, HeadlessBackend>) {
        context.commands.push(RecordedCommand::Draw(RecordedDraw {
            label: self.name.to_string(),
            subset_index: draw.subset_index,
            first_instance: draw.first_instance,
            instance_count: draw.instance_count,
            depth_only: draw.depth_only,
            payload: draw
                .instance_buffer
                .instance_bytes(draw.first_instance, draw.instance_count)
                .to_vec(),
        }));
    }
}

/// Reads back the drawable ids written into each instance slot of a draw.
pub fn payload_ids(draw: &RecordedDraw, stride: usize) -> Vec<u32> {
    draw.payload
        .chunks(stride)
        .map(|slot| bytemuck::pod_read_unaligned(&slot[..4]))
        .collect()
}

/// Looks down +Z from `position` with a 90 degree field of view.
pub struct TestCamera {
    pub position: Vec3,
    pub culling_mask: u32,
}

impl TestCamera {
    pub fn new() -> Self {
        Self {
            position: Vec3::ZERO,
            culling_mask: 0,
        }
    }

    pub fn view_projection(&self) -> Mat4 {
        let view = Mat4::look_at_lh(self.position, self.position + Vec3::Z, Vec3::Y);
        let projection = Mat4::perspective_lh(FRAC_PI_2, 1.0, 0.1, 100.0);
        projection * view
    }
}

impl Camera<HeadlessBackend> for TestCamera {
    fn culling_mask(&self) -> u32 {
        self.culling_mask
    }

    fn world_position(&self) -> Vec3 {
        self.position
    }

    fn frustum(&self) -> Frustum {
        Frustum::from_view_projection(self.view_projection())
    }

    fn bind_view(&self, context: &mut HeadlessPass) {
        context.commands.push(RecordedCommand::BindView);
    }

    fn bind_targets(&self, context: &mut HeadlessPass) {
        context.commands.push(RecordedCommand::BindTargets);
    }

    fn copy_and_bind_targets(&self, context: &mut HeadlessPass) {
        context.commands.push(RecordedCommand::CopyTargets);
    }
}
