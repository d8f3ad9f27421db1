use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3, Vec4};

use crate::math::plane::Plane;

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct Frustum {
    // Planes are in the order: left, right, bottom, top, near, far
    // Normals point into the frustum.
    pub planes: [Plane; 6],
}

impl Frustum {
    /// Extracts the planes from a view-projection matrix with a [0, 1] depth range,
    /// which is what wgpu and glam's `*_lh` / `*_rh` projections produce.
    pub fn from_view_projection(view_projection: Mat4) -> Frustum {
        let row0 = view_projection.row(0);
        let row1 = view_projection.row(1);
        let row2 = view_projection.row(2);
        let row3 = view_projection.row(3);

        let planes = [
            // Left
            Self::normalized_plane(row3 + row0),
            // Right
            Self::normalized_plane(row3 - row0),
            // Bottom
            Self::normalized_plane(row3 + row1),
            // Top
            Self::normalized_plane(row3 - row1),
            // Near
            Self::normalized_plane(row2),
            // Far
            Self::normalized_plane(row3 - row2),
        ];

        Frustum { planes }
    }

    fn normalized_plane(coefficients: Vec4) -> Plane {
        let normal = coefficients.truncate();
        let length = normal.length();

        if length <= f32::EPSILON {
            return Plane::new(Vec3::ZERO, coefficients.w);
        }

        Plane::new(normal / length, coefficients.w / length)
    }
}
