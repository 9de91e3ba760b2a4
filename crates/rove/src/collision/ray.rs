//! Parametric ray `origin + t * direction`

use crate::foundation::math::{Vec3, EPSILON};

/// A ray for ray casting and picking
///
/// The direction is kept as given, so `t` is measured in multiples of
/// `direction`. Use [`Ray::normalized`] when `t` should be a distance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    /// The origin point of the ray in world space
    pub origin: Vec3,
    /// The direction of the ray (not necessarily unit length)
    pub direction: Vec3,
}

impl Ray {
    /// Creates a new ray with the given origin and direction
    pub const fn new(origin: Vec3, direction: Vec3) -> Self {
        Self { origin, direction }
    }

    /// Ray through two points, `t = 1` at `to`
    pub fn through(from: Vec3, to: Vec3) -> Self {
        Self::new(from, to - from)
    }

    /// Same ray with a unit direction
    pub fn normalized(&self) -> Self {
        Self::new(self.origin, self.direction.normalize())
    }

    /// Get the point at parameter t
    pub fn point_at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Parameter of the point on the carrier line closest to `point`
    pub fn closest_parameter(&self, point: &Vec3) -> f32 {
        let length_sq = self.direction.norm_squared();
        if length_sq < EPSILON * EPSILON {
            return 0.0;
        }
        (point - self.origin).dot(&self.direction) / length_sq
    }

    /// Squared distance from `point` to the carrier line
    pub fn distance_sq(&self, point: &Vec3) -> f32 {
        let offset = point - self.origin;
        let length_sq = self.direction.norm_squared();
        if length_sq < EPSILON * EPSILON {
            return offset.norm_squared();
        }
        offset.cross(&self.direction).norm_squared() / length_sq
    }

    /// Distance from `point` to the carrier line
    pub fn distance(&self, point: &Vec3) -> f32 {
        self.distance_sq(point).sqrt()
    }

    /// `point` lies on the carrier line within `tolerance`
    pub fn contains(&self, point: &Vec3, tolerance: f32) -> bool {
        self.distance_sq(point) <= tolerance * tolerance
    }

    fn is_parallel_to(&self, normal: &Vec3, other: &Self) -> bool {
        normal.norm_squared()
            <= EPSILON * self.direction.norm_squared() * other.direction.norm_squared()
    }

    /// Closest approach between the two carrier lines
    pub fn distance_to_ray(&self, other: &Self) -> f32 {
        let normal = self.direction.cross(&other.direction);
        if self.is_parallel_to(&normal, other) {
            return self.distance(&other.origin);
        }
        (other.origin - self.origin).dot(&normal).abs() / normal.norm()
    }

    /// Parameter on `self` where the two carrier lines meet
    ///
    /// `None` for parallel lines and for skew lines further apart than a
    /// small tolerance.
    pub fn intersect_ray(&self, other: &Self) -> Option<f32> {
        let normal = self.direction.cross(&other.direction);
        if self.is_parallel_to(&normal, other) {
            return None;
        }

        let offset = other.origin - self.origin;
        let normal_sq = normal.norm_squared();
        let gap = offset.dot(&normal).abs() / normal_sq.sqrt();
        let scale = 1.0 + offset.norm();
        if gap > 1e-4 * scale {
            return None;
        }

        Some(offset.cross(&other.direction).dot(&normal) / normal_sq)
    }

    /// The carrier lines meet
    pub fn intersects_ray(&self, other: &Self) -> bool {
        self.intersect_ray(other).is_some()
    }
}
