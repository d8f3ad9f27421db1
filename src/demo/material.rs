use glam::Vec4;
use wgpu::{
    util::DeviceExt, DepthBiasState, MultisampleState, PipelineCompilationOptions, ShaderSource,
    StencilState,
};

use batchforge::{
    backend::wgpu_backend::{DepthTexture, WgpuBackend},
    submission::render_queue,
};

use crate::demo::mesh::{PRIMITIVE_STATE, VERTEX_LAYOUT};

pub const MATERIAL_GROUP: u32 = 2;

const SHADER_SOURCE: &str = include_str!("instanced_mesh.wgsl");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Blend {
    Opaque,
    Transparent,
}

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct MaterialUniform {
    base_color: Vec4,
}

pub struct DemoMaterial {
    /// Identifies the material for batching.
    pub id: u32,
    pub blend: Blend,
    pub bind_group: wgpu::BindGroup,
}

impl DemoMaterial {
    pub fn render_queue(&self) -> i32 {
        match self.blend {
            Blend::Opaque => render_queue::GEOMETRY,
            Blend::Transparent => render_queue::TRANSPARENT,
        }
    }
}

/// The three pipelines every demo mesh can be drawn with, sharing one layout.
pub struct DemoPipelines {
    material_bind_group_layout: wgpu::BindGroupLayout,
    pub opaque: wgpu::RenderPipeline,
    pub transparent: wgpu::RenderPipeline,
    /// Used by the shadow pass and the depth prepass.
    pub depth_only: wgpu::RenderPipeline,
}

impl DemoPipelines {
    pub fn new(backend: &WgpuBackend, color_format: wgpu::TextureFormat) -> Self {
        let device = backend.device();

        let material_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Material bind group layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
            });

        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Instanced mesh pipeline layout"),
            bind_group_layouts: &[
                backend.camera_bind_group_layout(),
                backend.instance_bind_group_layout(),
                &material_bind_group_layout,
            ],
            push_constant_ranges: &[],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Instanced mesh shader"),
            source: ShaderSource::Wgsl(SHADER_SOURCE.into()),
        });

        let create = |label: &str,
                      color: Option<wgpu::BlendState>,
                      depth_write_enabled: bool,
                      depth_compare: wgpu::CompareFunction| {
            let targets = [color.map(|blend| wgpu::ColorTargetState {
                format: color_format,
                blend: Some(blend),
                write_mask: wgpu::ColorWrites::ALL,
            })];

            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(label),
                layout: Some(&layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: Some("vs_main"),
                    buffers: &[VERTEX_LAYOUT],
                    compilation_options: PipelineCompilationOptions::default(),
                },
                fragment: color.map(|_| wgpu::FragmentState {
                    module: &shader,
                    entry_point: Some("fs_main"),
                    targets: &targets,
                    compilation_options: PipelineCompilationOptions::default(),
                }),
                primitive: PRIMITIVE_STATE,
                depth_stencil: Some(wgpu::DepthStencilState {
                    format: DepthTexture::DEPTH_FORMAT,
                    depth_write_enabled,
                    depth_compare,
                    stencil: StencilState::default(),
                    bias: DepthBiasState::default(),
                }),
                multisample: MultisampleState::default(),
                multiview: None,
                cache: None,
            })
        };

        let opaque = create(
            "Opaque mesh pipeline",
            Some(wgpu::BlendState::REPLACE),
            true,
            wgpu::CompareFunction::LessEqual,
        );
        let transparent = create(
            "Transparent mesh pipeline",
            Some(wgpu::BlendState::ALPHA_BLENDING),
            false,
            wgpu::CompareFunction::LessEqual,
        );
        let depth_only = create(
            "Depth-only mesh pipeline",
            None,
            true,
            wgpu::CompareFunction::Less,
        );

        Self {
            material_bind_group_layout,
            opaque,
            transparent,
            depth_only,
        }
    }

    pub fn color(&self, blend: Blend) -> &wgpu::RenderPipeline {
        match blend {
            Blend::Opaque => &self.opaque,
            Blend::Transparent => &self.transparent,
        }
    }

    pub fn create_material(
        &self,
        device: &wgpu::Device,
        id: u32,
        base_color: Vec4,
        blend: Blend,
    ) -> DemoMaterial {
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Material uniform buffer"),
            contents: bytemuck::bytes_of(&MaterialUniform { base_color }),
            usage: wgpu::BufferUsages::UNIFORM,
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Material bind group"),
            layout: &self.material_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        DemoMaterial {
            id,
            blend,
            bind_group,
        }
    }
}
