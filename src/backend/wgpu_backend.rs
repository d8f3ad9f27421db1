//! wgpu implementation of the backend traits.
//!
//! Instance buffers are read-only storage buffers bound at [`INSTANCE_GROUP`]. Mapping
//! hands out a CPU staging area which is uploaded with `Queue::write_buffer` on unmap,
//! so the buffer never has to be mappable itself.

use glam::{Mat4, Vec3, Vec4};
use wgpu::{util::DeviceExt, BindingType, BufferBindingType, BufferUsages, ShaderStages};

use crate::{
    backend::{
        BufferError, GraphicsBackend, InstanceBuffer, InstanceBufferDescriptor,
        InstanceLayout,
    },
    math::frustum::Frustum,
    submission::camera::Camera,
};

pub const CAMERA_GROUP: u32 = 0;
pub const INSTANCE_GROUP: u32 = 1;
pub const SCENE_COPY_GROUP: u32 = 3;

pub struct WgpuBackend {
    device: wgpu::Device,
    queue: wgpu::Queue,
    instance_bind_group_layout: wgpu::BindGroupLayout,
    camera_bind_group_layout: wgpu::BindGroupLayout,
}

impl WgpuBackend {
    pub fn new(device: wgpu::Device, queue: wgpu::Queue) -> Self {
        let instance_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Instance storage bind group layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: ShaderStages::VERTEX | ShaderStages::FRAGMENT,
                    ty: BindingType::Buffer {
                        ty: BufferBindingType::Storage { read_only: true },
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
            });

        let camera_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Camera bind group layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: ShaderStages::VERTEX | ShaderStages::FRAGMENT,
                    ty: BindingType::Buffer {
                        ty: BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
            });

        Self {
            device,
            queue,
            instance_bind_group_layout,
            camera_bind_group_layout,
        }
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    pub fn instance_bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.instance_bind_group_layout
    }

    pub fn camera_bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.camera_bind_group_layout
    }
}

impl GraphicsBackend for WgpuBackend {
    type Context = wgpu::RenderPass<'static>;
    type InstanceBuffer = WgpuInstanceBuffer;

    fn create_instance_buffer(
        &self,
        descriptor: &InstanceBufferDescriptor,
    ) -> Result<WgpuInstanceBuffer, BufferError> {
        WgpuInstanceBuffer::new(self, descriptor)
    }
}

/// Storage buffer of per-instance data plus the bind group exposing it.
pub struct WgpuInstanceBuffer {
    device: wgpu::Device,
    queue: wgpu::Queue,
    label: &'static str,
    layout: InstanceLayout,
    buffer: wgpu::Buffer,
    bind_group_layout: wgpu::BindGroupLayout,
    bind_group: wgpu::BindGroup,
    element_size: u64,
    capacity: u64,
    staging: Vec<u8>,
    mapped: bool,
}

impl WgpuInstanceBuffer {
    fn new(
        backend: &WgpuBackend,
        descriptor: &InstanceBufferDescriptor,
    ) -> Result<Self, BufferError> {
        let device = backend.device.clone();
        let bind_group_layout = backend.instance_bind_group_layout.clone();

        let buffer = Self::create_buffer(
            &device,
            descriptor.label,
            descriptor.element_size,
            descriptor.element_count,
        )?;
        let bind_group = Self::create_bind_group(&device, &bind_group_layout, &buffer);

        Ok(Self {
            device,
            queue: backend.queue.clone(),
            label: descriptor.label,
            layout: descriptor.layout,
            buffer,
            bind_group_layout,
            bind_group,
            element_size: descriptor.element_size,
            capacity: descriptor.element_count,
            staging: Vec::new(),
            mapped: false,
        })
    }

    fn create_buffer(
        device: &wgpu::Device,
        label: &str,
        element_size: u64,
        element_count: u64,
    ) -> Result<wgpu::Buffer, BufferError> {
        let limits = device.limits();
        let limit_bytes = limits
            .max_buffer_size
            .min(limits.max_storage_buffer_binding_size as u64);

        // Zero-sized storage bindings are invalid, so keep room for one element.
        let requested_bytes = element_size * element_count.max(1);

        if requested_bytes > limit_bytes {
            return Err(BufferError::TooLarge {
                requested_bytes,
                limit_bytes,
            });
        }

        Ok(device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size: requested_bytes,
            usage: BufferUsages::STORAGE | BufferUsages::COPY_DST,
            mapped_at_creation: false,
        }))
    }

    fn create_bind_group(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        buffer: &wgpu::Buffer,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Instance storage bind group"),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
        })
    }

    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }

    pub fn buffer(&self) -> &wgpu::Buffer {
        &self.buffer
    }

    pub fn layout(&self) -> InstanceLayout {
        self.layout
    }
}

impl InstanceBuffer for WgpuInstanceBuffer {
    fn element_size(&self) -> u64 {
        self.element_size
    }

    fn capacity(&self) -> u64 {
        self.capacity
    }

    fn resize(&mut self, element_count: u64) -> Result<(), BufferError> {
        let buffer =
            Self::create_buffer(&self.device, self.label, self.element_size, element_count)?;

        self.bind_group = Self::create_bind_group(&self.device, &self.bind_group_layout, &buffer);
        self.buffer = buffer;
        self.capacity = element_count;

        Ok(())
    }

    fn map(&mut self, element_count: u64) -> Result<&mut [u8], BufferError> {
        if self.mapped {
            return Err(BufferError::AlreadyMapped);
        }

        if element_count > self.capacity {
            return Err(BufferError::MapOutOfRange {
                requested: element_count,
                capacity: self.capacity,
            });
        }

        self.mapped = true;

        self.staging.clear();
        self.staging
            .resize((element_count * self.element_size) as usize, 0);

        Ok(&mut self.staging)
    }

    fn unmap(&mut self) {
        if !self.mapped {
            return;
        }

        self.mapped = false;

        if !self.staging.is_empty() {
            self.queue.write_buffer(&self.buffer, 0, &self.staging);
        }
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable, Default)]
pub struct CameraUniform {
    view_proj: Mat4,
    position: Vec4,
}

/// A perspective look-at camera rendering into a fixed-size target.
pub struct SceneCamera {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub fov_y: f32,
    pub near: f32,
    pub far: f32,
    /// Layers whose bit is set are not drawn.
    pub culling_mask: u32,
    width: u32,
    height: u32,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    scene_copy: Option<wgpu::BindGroup>,
}

impl SceneCamera {
    pub fn new(backend: &WgpuBackend, eye: Vec3, target: Vec3, width: u32, height: u32) -> Self {
        let uniform_buffer = backend
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Camera Uniform Buffer"),
                contents: bytemuck::bytes_of(&CameraUniform::default()),
                usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
            });

        let bind_group = backend
            .device
            .create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("Camera bind group"),
                layout: &backend.camera_bind_group_layout,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform_buffer.as_entire_binding(),
                }],
            });

        Self {
            eye,
            target,
            up: Vec3::Y,
            fov_y: 60f32.to_radians(),
            near: 0.1,
            far: 200.0,
            culling_mask: 0,
            width,
            height,
            uniform_buffer,
            bind_group,
            scene_copy: None,
        }
    }

    pub fn view_projection(&self) -> Mat4 {
        let view = Mat4::look_at_lh(self.eye, self.target, self.up);
        let aspect = self.width as f32 / self.height.max(1) as f32;
        let projection = Mat4::perspective_lh(self.fov_y, aspect, self.near, self.far);
        projection * view
    }

    /// Uploads the current view. Call once per frame before submitting.
    pub fn update(&self, queue: &wgpu::Queue) {
        let uniform = CameraUniform {
            view_proj: self.view_projection(),
            position: self.eye.extend(1.0),
        };

        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniform));
    }

    /// A pass can't sample its own colour target, so the caller copies the scene
    /// between passes and hands the resulting bind group in here.
    pub fn set_scene_copy(&mut self, bind_group: Option<wgpu::BindGroup>) {
        self.scene_copy = bind_group;
    }
}

impl Camera<WgpuBackend> for SceneCamera {
    fn culling_mask(&self) -> u32 {
        self.culling_mask
    }

    fn world_position(&self) -> Vec3 {
        self.eye
    }

    fn frustum(&self) -> Frustum {
        Frustum::from_view_projection(self.view_projection())
    }

    fn bind_view(&self, context: &mut wgpu::RenderPass<'static>) {
        context.set_viewport(0.0, 0.0, self.width as f32, self.height as f32, 0.0, 1.0);
        context.set_bind_group(CAMERA_GROUP, &self.bind_group, &[]);
    }

    fn copy_and_bind_targets(&self, context: &mut wgpu::RenderPass<'static>) {
        match &self.scene_copy {
            Some(scene_copy) => context.set_bind_group(SCENE_COPY_GROUP, scene_copy, &[]),
            None => log::trace!("No scene copy bound for a copy-target draw"),
        }
    }
}

pub struct DepthTexture {
    _texture: wgpu::Texture,
    view: wgpu::TextureView,
}

impl DepthTexture {
    pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

    pub fn new(device: &wgpu::Device, width: u32, height: u32, label: &str) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        Self {
            _texture: texture,
            view,
        }
    }

    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }
}
