//! Capsule: a segment swept by a sphere

use super::{Aabb, Sphere};
use crate::collision::{Line, Triangle};
use crate::foundation::math::Vec3;

/// Capsule around the segment `axis` with the given radius
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Capsule {
    /// Core segment
    pub axis: Line,
    /// Distance from the core segment to the surface
    pub radius: f32,
}

impl Capsule {
    /// Create a capsule from its segment endpoints and radius
    pub const fn new(a: Vec3, b: Vec3, radius: f32) -> Self {
        Self {
            axis: Line::new(a, b),
            radius,
        }
    }

    /// Length of the core segment
    pub fn length(&self) -> f32 {
        self.axis.length()
    }

    /// Axis-aligned bounds of both end caps
    pub fn aabb(&self) -> Aabb {
        let mut aabb = Aabb::from_point(self.axis.a);
        aabb.extend_point(&self.axis.b);
        aabb.inflate(self.radius)
    }

    /// Closed containment
    pub fn contains_point(&self, point: &Vec3) -> bool {
        self.axis.distance_sq(point) <= self.radius * self.radius
    }

    /// Capsule against sphere
    pub fn intersects_sphere(&self, sphere: &Sphere) -> bool {
        let reach = self.radius + sphere.radius;
        self.axis.distance_sq(&sphere.center) <= reach * reach
    }

    /// Capsule against capsule
    pub fn intersects_capsule(&self, other: &Self) -> bool {
        let reach = self.radius + other.radius;
        self.axis.distance_sq_to_line(&other.axis) <= reach * reach
    }

    /// Capsule against triangle
    pub fn intersects_triangle(&self, triangle: &Triangle) -> bool {
        triangle.distance_sq_to_segment(&self.axis) <= self.radius * self.radius
    }
}
