use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use glam::{Mat4, Quat, Vec3};
use parking_lot::Mutex;

use batchforge::{
    backend::wgpu_backend::{WgpuBackend, INSTANCE_GROUP},
    math::bounds::Aabb,
    submission::{Camera, DrawCall, InstanceCursor, Renderable},
};

use crate::demo::{
    material::{DemoMaterial, DemoPipelines, MATERIAL_GROUP},
    mesh::GpuMesh,
};

/// This should match the same structure defined in WGSL
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct InstanceData {
    pub model_matrix: Mat4,
}

#[derive(Debug, Clone, Copy)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: f32,
}

impl Transform {
    fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(
            Vec3::splat(self.scale),
            self.rotation,
            self.translation,
        )
    }
}

pub struct CubeRenderer {
    mesh: Arc<GpuMesh>,
    material: Arc<DemoMaterial>,
    pipelines: Arc<DemoPipelines>,
    transform: Mutex<Transform>,
    /// World matrix of the current frame, refreshed by `calculate_render_parameter`.
    model_matrix: Mutex<Mat4>,
    visible: AtomicBool,
}

impl CubeRenderer {
    pub fn new(
        mesh: Arc<GpuMesh>,
        material: Arc<DemoMaterial>,
        pipelines: Arc<DemoPipelines>,
        transform: Transform,
    ) -> Self {
        Self {
            mesh,
            material,
            pipelines,
            model_matrix: Mutex::new(transform.matrix()),
            transform: Mutex::new(transform),
            visible: AtomicBool::new(false),
        }
    }

    pub fn set_rotation(&self, rotation: Quat) {
        self.transform.lock().rotation = rotation;
    }

    pub fn is_visible(&self) -> bool {
        self.visible.load(Ordering::Relaxed)
    }
}

impl Renderable<WgpuBackend> for CubeRenderer {
    fn is_active_and_enabled(&self) -> bool {
        true
    }

    fn layer(&self) -> u32 {
        0
    }

    fn subset_count(&self) -> usize {
        1
    }

    fn calculate_render_parameter(&self, _camera: &dyn Camera<WgpuBackend>) {
        *self.model_matrix.lock() = self.transform.lock().matrix();
    }

    fn world_position(&self) -> Vec3 {
        self.transform.lock().translation
    }

    fn can_batch(&self) -> bool {
        true
    }

    fn render_queue(&self, _subset: usize) -> i32 {
        self.material.render_queue()
    }

    fn mesh_hash(&self) -> u32 {
        self.mesh.id
    }

    fn material_hash(&self, _subset: usize) -> u32 {
        self.material.id
    }

    fn set_visible(&self, visible: bool) {
        self.visible.store(visible, Ordering::Relaxed);
    }

    fn renderer_bounds(&self) -> Aabb {
        self.mesh.bounds.transformed(&self.model_matrix.lock())
    }

    fn write_instance(&self, cursor: &mut InstanceCursor<'_>) {
        cursor.write(&InstanceData {
            model_matrix: *self.model_matrix.lock(),
        });
    }

    fn render(&self, context: &mut wgpu::RenderPass<'static>, draw: &DrawCall<'_, WgpuBackend>) {
        let pipeline = if draw.depth_only {
            &self.pipelines.depth_only
        } else {
            self.pipelines.color(self.material.blend)
        };

        context.set_pipeline(pipeline);
        context.set_bind_group(INSTANCE_GROUP, draw.instance_buffer.bind_group(), &[]);
        context.set_bind_group(MATERIAL_GROUP, &self.material.bind_group, &[]);
        context.set_vertex_buffer(0, self.mesh.vertex_buffer.slice(..));
        context.set_index_buffer(self.mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint16);
        context.draw_indexed(0..self.mesh.num_indices, 0, draw.instances());
    }
}
