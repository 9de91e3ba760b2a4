//! Bounding sphere

use super::{Aabb, Capsule};
use crate::collision::{Line, Ray};
use crate::foundation::math::{Vec3, EPSILON};

/// A bounding sphere for collision detection
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sphere {
    /// The center position of the sphere in world space
    pub center: Vec3,
    /// The radius of the sphere
    pub radius: f32,
}

/// Points where a segment crosses a sphere surface
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointHits {
    /// No crossing on the segment
    None,
    /// Tangent contact or a single crossing
    One(Vec3),
    /// Entry and exit, ordered along the segment
    Two(Vec3, Vec3),
}

impl PointHits {
    /// Number of crossing points
    pub const fn count(&self) -> usize {
        match self {
            Self::None => 0,
            Self::One(_) => 1,
            Self::Two(_, _) => 2,
        }
    }
}

impl Sphere {
    /// Creates a new bounding sphere with the given center and radius
    pub const fn new(center: Vec3, radius: f32) -> Self {
        Self { center, radius }
    }

    /// Circumscribed sphere of a box
    pub fn from_aabb(aabb: &Aabb) -> Self {
        Self {
            center: aabb.center(),
            radius: aabb.extents().norm(),
        }
    }

    /// Axis-aligned bounds
    pub fn aabb(&self) -> Aabb {
        Aabb::from_center_extents(self.center, Vec3::repeat(self.radius))
    }

    /// Strict interior test
    pub fn contains_point(&self, point: &Vec3) -> bool {
        (point - self.center).norm_squared() < self.radius * self.radius
    }

    /// Check if this sphere intersects with another
    pub fn intersects(&self, other: &Self) -> bool {
        let distance_squared = (self.center - other.center).norm_squared();
        let radius_sum = self.radius + other.radius;
        distance_squared <= radius_sum * radius_sum
    }

    /// Sphere against box, touching counts
    pub fn intersects_aabb(&self, aabb: &Aabb) -> bool {
        aabb.distance_sq_to_point(&self.center) <= self.radius * self.radius
    }

    /// Sphere against capsule
    pub fn intersects_capsule(&self, capsule: &Capsule) -> bool {
        capsule.intersects_sphere(self)
    }

    /// Get the penetration depth if intersecting (0.0 if not intersecting)
    pub fn penetration_depth(&self, other: &Self) -> f32 {
        let distance = (self.center - other.center).norm();
        let radius_sum = self.radius + other.radius;
        if distance < radius_sum {
            radius_sum - distance
        } else {
            0.0
        }
    }

    /// Test ray intersection with this sphere
    ///
    /// Returns `(t, hit_point, normal)` for the nearest crossing at `t >= 0`.
    pub fn intersect_ray(&self, ray: &Ray) -> Option<(f32, Vec3, Vec3)> {
        let (t1, t2) = self.solve(&ray.origin, &ray.direction)?;

        let t = if t1 >= 0.0 {
            t1
        } else if t2 >= 0.0 {
            t2
        } else {
            return None;
        };

        let hit_point = ray.point_at(t);
        let normal = (hit_point - self.center).normalize();
        Some((t, hit_point, normal))
    }

    /// Check whether the ray (`t >= 0`) touches the sphere
    pub fn intersects_ray(&self, ray: &Ray) -> bool {
        self.intersect_ray(ray).is_some()
    }

    /// Surface crossings of a segment
    pub fn intersect_line(&self, line: &Line) -> PointHits {
        let direction = line.direction();
        let Some((t1, t2)) = self.solve(&line.a, &direction) else {
            return PointHits::None;
        };

        let first = (0.0..=1.0).contains(&t1).then(|| line.a + direction * t1);
        let second = ((t2 - t1).abs() > EPSILON && (0.0..=1.0).contains(&t2))
            .then(|| line.a + direction * t2);

        match (first, second) {
            (Some(p), Some(q)) => PointHits::Two(p, q),
            (Some(p), None) | (None, Some(p)) => PointHits::One(p),
            (None, None) => PointHits::None,
        }
    }

    /// Segment touches the solid sphere
    pub fn intersects_line(&self, line: &Line) -> bool {
        line.distance_sq(&self.center) <= self.radius * self.radius
    }

    // Roots of |origin + t*direction - center|^2 = r^2, ascending
    fn solve(&self, origin: &Vec3, direction: &Vec3) -> Option<(f32, f32)> {
        let oc = origin - self.center;

        let a = direction.dot(direction);
        if a < EPSILON * EPSILON {
            return None;
        }
        let b = 2.0 * oc.dot(direction);
        let c = oc.dot(&oc) - self.radius * self.radius;

        let discriminant = b * b - 4.0 * a * c;
        if discriminant < 0.0 {
            return None;
        }

        let sqrt_discriminant = discriminant.sqrt();
        Some((
            (-b - sqrt_discriminant) / (2.0 * a),
            (-b + sqrt_discriminant) / (2.0 * a),
        ))
    }
}
