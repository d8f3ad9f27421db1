use std::mem::offset_of;

use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use itertools::izip;
use wgpu::util::DeviceExt;

use batchforge::math::bounds::Aabb;

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct Vertex {
    position: Vec3,
    normal: Vec3,
}

pub const VERTEX_LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
    array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
    step_mode: wgpu::VertexStepMode::Vertex,
    attributes: &[
        wgpu::VertexAttribute {
            offset: offset_of!(Vertex, position) as wgpu::BufferAddress,
            shader_location: 0,
            format: wgpu::VertexFormat::Float32x3,
        },
        wgpu::VertexAttribute {
            offset: offset_of!(Vertex, normal) as wgpu::BufferAddress,
            shader_location: 1,
            format: wgpu::VertexFormat::Float32x3,
        },
    ],
};

pub const PRIMITIVE_STATE: wgpu::PrimitiveState = wgpu::PrimitiveState {
    topology: wgpu::PrimitiveTopology::TriangleList,
    strip_index_format: None,
    front_face: wgpu::FrontFace::Ccw,
    cull_mode: None,
    unclipped_depth: false,
    polygon_mode: wgpu::PolygonMode::Fill,
    conservative: false,
};

pub struct GpuMesh {
    /// Identifies the mesh for batching.
    pub id: u32,
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub num_indices: u32,
    pub bounds: Aabb,
}

impl GpuMesh {
    /// Unit cube centered on the origin, with per-face normals.
    pub fn cube(device: &wgpu::Device, id: u32) -> Self {
        let faces = [Vec3::X, -Vec3::X, Vec3::Y, -Vec3::Y, Vec3::Z, -Vec3::Z];

        let mut positions = Vec::with_capacity(24);
        let mut normals = Vec::with_capacity(24);
        let mut indices: Vec<u16> = Vec::with_capacity(36);

        for normal in faces {
            let u = normal.any_orthonormal_vector();
            let v = normal.cross(u);
            let base = positions.len() as u16;

            for (su, sv) in [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
                positions.push((normal + u * su + v * sv) * 0.5);
                normals.push(normal);
            }

            indices.extend([base, base + 1, base + 2, base, base + 2, base + 3]);
        }

        let vertices: Vec<Vertex> = izip!(positions, normals)
            .map(|(position, normal)| Vertex { position, normal })
            .collect();

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Vertex buffer (cube)"),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Index buffer (cube)"),
            contents: bytemuck::cast_slice(&indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        Self {
            id,
            vertex_buffer,
            index_buffer,
            num_indices: indices.len() as u32,
            bounds: Aabb::from_center_half_extents(Vec3::ZERO, Vec3::splat(0.5)),
        }
    }
}
