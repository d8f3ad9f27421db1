use glam::{Mat4, Vec3};

use crate::math::frustum::Frustum;

/// Axis-aligned bounding box in world space.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn new(point1: Vec3, point2: Vec3) -> Aabb {
        let min = point1.min(point2);
        let max = point1.max(point2);
        Aabb { min, max }
    }

    pub fn from_center_half_extents(center: Vec3, half_extents: Vec3) -> Aabb {
        Aabb::new(center - half_extents, center + half_extents)
    }

    pub fn corners(&self) -> [Vec3; 8] {
        [
            Vec3::new(self.min.x, self.min.y, self.min.z),
            Vec3::new(self.max.x, self.min.y, self.min.z),
            Vec3::new(self.min.x, self.max.y, self.min.z),
            Vec3::new(self.max.x, self.max.y, self.min.z),
            Vec3::new(self.min.x, self.min.y, self.max.z),
            Vec3::new(self.max.x, self.min.y, self.max.z),
            Vec3::new(self.min.x, self.max.y, self.max.z),
            Vec3::new(self.max.x, self.max.y, self.max.z),
        ]
    }

    /// Bounds of this box after transforming all eight corners.
    pub fn transformed(&self, transform: &Mat4) -> Aabb {
        let corners = self
            .corners()
            .map(|corner| transform.transform_point3(corner));

        let (min, max) = corners[1..].iter().fold(
            (corners[0], corners[0]),
            |(min, max), corner| (min.min(*corner), max.max(*corner)),
        );

        Aabb { min, max }
    }

    /// Conservative test: the box is rejected only when all of its corners are behind
    /// a single plane.
    pub fn intersects_frustum(&self, frustum: &Frustum) -> bool {
        let corners = self.corners();

        for plane in &frustum.planes {
            let outside = corners
                .iter()
                .all(|corner| plane.signed_distance_to_point(*corner) < 0.0);

            if outside {
                return false;
            }
        }

        true
    }
}
