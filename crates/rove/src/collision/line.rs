//! Line segment between two points

use super::Ray;
use crate::volumes::Aabb;
use crate::foundation::math::{Vec3, EPSILON};

/// Line segment from `a` to `b`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Line {
    /// Start point
    pub a: Vec3,
    /// End point
    pub b: Vec3,
}

impl Line {
    /// Create a segment
    pub const fn new(a: Vec3, b: Vec3) -> Self {
        Self { a, b }
    }

    /// `b - a`
    pub fn direction(&self) -> Vec3 {
        self.b - self.a
    }

    /// Ray starting at `a` that reaches `b` at `t = 1`
    pub fn ray(&self) -> Ray {
        Ray::new(self.a, self.direction())
    }

    /// Axis-aligned bounds
    pub fn aabb(&self) -> Aabb {
        Aabb::new(self.a, self.b).normalize()
    }

    /// Squared length
    pub fn length_sq(&self) -> f32 {
        self.direction().norm_squared()
    }

    /// Length
    pub fn length(&self) -> f32 {
        self.direction().norm()
    }

    /// Midpoint
    pub fn midpoint(&self) -> Vec3 {
        (self.a + self.b) * 0.5
    }

    /// `point` lies strictly between the endpoints on the segment
    pub fn contains(&self, point: &Vec3) -> bool {
        let direction = self.direction();
        let offset = point - self.a;
        let length_sq = direction.norm_squared();

        let collinear = offset.cross(&direction).norm_squared() <= EPSILON * length_sq;
        collinear && offset.dot(&direction) > 0.0 && offset.norm_squared() < length_sq
    }

    /// Segment parameter in `[0, 1]` of the point closest to `point`
    pub fn closest_parameter(&self, point: &Vec3) -> f32 {
        let direction = self.direction();
        let length_sq = direction.norm_squared();
        if length_sq < EPSILON * EPSILON {
            return 0.0;
        }
        ((point - self.a).dot(&direction) / length_sq).clamp(0.0, 1.0)
    }

    /// Point of the segment closest to `point`
    pub fn closest_point(&self, point: &Vec3) -> Vec3 {
        self.a + self.direction() * self.closest_parameter(point)
    }

    /// Squared distance from `point` to the segment
    pub fn distance_sq(&self, point: &Vec3) -> f32 {
        (self.closest_point(point) - point).norm_squared()
    }

    /// Closest points between two segments, `(on self, on other)`
    pub fn closest_points(&self, other: &Self) -> (Vec3, Vec3) {
        let d1 = self.direction();
        let d2 = other.direction();
        let r = self.a - other.a;
        let a = d1.norm_squared();
        let e = d2.norm_squared();
        let f = d2.dot(&r);

        if a <= EPSILON && e <= EPSILON {
            return (self.a, other.a);
        }
        if a <= EPSILON {
            return (self.a, other.a + d2 * (f / e).clamp(0.0, 1.0));
        }

        let c = d1.dot(&r);
        if e <= EPSILON {
            return (self.a + d1 * (-c / a).clamp(0.0, 1.0), other.a);
        }

        let b = d1.dot(&d2);
        let denom = a * e - b * b;

        let mut s = if denom > EPSILON {
            ((b * f - c * e) / denom).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let mut t = (b * s + f) / e;

        if t < 0.0 {
            t = 0.0;
            s = (-c / a).clamp(0.0, 1.0);
        } else if t > 1.0 {
            t = 1.0;
            s = ((b - c) / a).clamp(0.0, 1.0);
        }

        (self.a + d1 * s, other.a + d2 * t)
    }

    /// Squared distance between two segments
    pub fn distance_sq_to_line(&self, other: &Self) -> f32 {
        let (p, q) = self.closest_points(other);
        (p - q).norm_squared()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_contains_excludes_endpoints() {
        let line = Line::new(Vec3::zeros(), Vec3::new(4.0, 2.0, 0.0));
        assert!(line.contains(&Vec3::new(2.0, 1.0, 0.0)));
        assert!(!line.contains(&Vec3::zeros()));
        assert!(!line.contains(&Vec3::new(4.0, 2.0, 0.0)));
        assert!(!line.contains(&Vec3::new(6.0, 3.0, 0.0)));
        assert!(!line.contains(&Vec3::new(-2.0, -1.0, 0.0)));
        assert!(!line.contains(&Vec3::new(2.0, 1.5, 0.0)));
    }

    #[test]
    fn test_point_distance() {
        let line = Line::new(Vec3::zeros(), Vec3::new(4.0, 0.0, 0.0));
        assert_relative_eq!(line.distance_sq(&Vec3::new(2.0, 3.0, 0.0)), 9.0);
        assert_relative_eq!(line.distance_sq(&Vec3::new(-1.0, 0.0, 0.0)), 1.0);
        assert_relative_eq!(line.distance_sq(&Vec3::new(6.0, 0.0, 1.0)), 5.0);
    }

    #[test]
    fn test_ray_and_bounds() {
        let line = Line::new(Vec3::new(3.0, -1.0, 2.0), Vec3::new(1.0, 1.0, 2.0));
        assert_eq!(line.ray().point_at(1.0), line.b);
        let aabb = line.aabb();
        assert_eq!(aabb.lo, Vec3::new(1.0, -1.0, 2.0));
        assert_eq!(aabb.hi, Vec3::new(3.0, 1.0, 2.0));
        assert_relative_eq!(line.length_sq(), 8.0);
    }

    #[test]
    fn test_segment_segment_distance() {
        let a = Line::new(Vec3::new(-1.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0));
        let crossing = Line::new(Vec3::new(0.0, -1.0, 2.0), Vec3::new(0.0, 1.0, 2.0));
        assert_relative_eq!(a.distance_sq_to_line(&crossing), 4.0);

        let beyond = Line::new(Vec3::new(3.0, -1.0, 0.0), Vec3::new(3.0, 1.0, 0.0));
        assert_relative_eq!(a.distance_sq_to_line(&beyond), 4.0);

        let parallel = Line::new(Vec3::new(0.5, 1.0, 0.0), Vec3::new(5.0, 1.0, 0.0));
        assert_relative_eq!(a.distance_sq_to_line(&parallel), 1.0);

        let point = Line::new(Vec3::new(0.0, 0.0, 3.0), Vec3::new(0.0, 0.0, 3.0));
        assert_relative_eq!(a.distance_sq_to_line(&point), 9.0);
    }
}
