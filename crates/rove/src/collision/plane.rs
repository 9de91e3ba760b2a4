//! Plane `normal . p + d = 0`

use super::Ray;
use crate::foundation::math::{Vec3, EPSILON};
use crate::volumes::{Aabb, Obb, Sphere};

/// Tolerance for on-plane tests, looser than [`EPSILON`] since plane
/// distances accumulate rounding from the normalization.
const PLANE_EPSILON: f32 = 1e-5;

/// Which side of a plane a shape lies on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaneSide {
    /// Entirely on the side the normal points to
    Positive,
    /// Entirely on the opposite side
    Negative,
    /// Touches or crosses the plane
    Intersects,
}

/// A plane with a unit normal, or a zero normal when degenerate
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    /// The plane's normal vector (normalized)
    pub normal: Vec3,
    /// Signed offset, `normal . p + d = 0` on the plane
    pub d: f32,
}

impl Plane {
    /// Create a plane from a normal and offset, normalizing both
    ///
    /// A zero normal is kept as is; see [`Plane::is_valid`].
    pub fn new(normal: Vec3, d: f32) -> Self {
        let length = normal.norm();
        if length > EPSILON {
            Self {
                normal: normal / length,
                d: d / length,
            }
        } else {
            Self { normal, d }
        }
    }

    /// Plane through `point` facing `normal`
    pub fn from_point_normal(point: &Vec3, normal: &Vec3) -> Self {
        Self::new(*normal, -normal.dot(point))
    }

    /// Plane `a*x + b*y + c*z + d = 0`
    pub fn from_coefficients(a: f32, b: f32, c: f32, d: f32) -> Self {
        Self::new(Vec3::new(a, b, c), d)
    }

    /// Plane through three points, counter-clockwise winding faces the normal
    pub fn from_points(a: &Vec3, b: &Vec3, c: &Vec3) -> Self {
        Self::from_point_normal(a, &(b - a).cross(&(c - a)))
    }

    /// Normal is usable
    pub fn is_valid(&self) -> bool {
        self.normal.norm_squared() > EPSILON
    }

    /// Point of the plane closest to the world origin
    pub fn origin(&self) -> Vec3 {
        self.normal * -self.d
    }

    /// Signed distance, positive on the normal's side
    pub fn distance_to_point(&self, point: &Vec3) -> f32 {
        self.normal.dot(point) + self.d
    }

    fn side(distance: f32, radius: f32) -> PlaneSide {
        if distance - radius > PLANE_EPSILON {
            PlaneSide::Positive
        } else if distance + radius < -PLANE_EPSILON {
            PlaneSide::Negative
        } else {
            PlaneSide::Intersects
        }
    }

    /// Side of a point
    pub fn classify_point(&self, point: &Vec3) -> PlaneSide {
        Self::side(self.distance_to_point(point), 0.0)
    }

    /// Side of an axis-aligned box
    pub fn classify_aabb(&self, aabb: &Aabb) -> PlaneSide {
        let radius = aabb.extents().dot(&self.normal.abs());
        Self::side(self.distance_to_point(&aabb.center()), radius)
    }

    /// Side of an oriented box
    pub fn classify_obb(&self, obb: &Obb) -> PlaneSide {
        let radius = 0.5
            * (obb.tangent.dot(&self.normal).abs()
                + obb.normal.dot(&self.normal).abs()
                + obb.binormal.dot(&self.normal).abs());
        Self::side(self.distance_to_point(&obb.center()), radius)
    }

    /// Side of a sphere
    pub fn classify_sphere(&self, sphere: &Sphere) -> PlaneSide {
        Self::side(self.distance_to_point(&sphere.center), sphere.radius)
    }

    /// `point` lies on the plane
    pub fn contains_point(&self, point: &Vec3) -> bool {
        self.distance_to_point(point).abs() <= PLANE_EPSILON
    }

    /// The ray's direction is parallel to the plane
    pub fn is_parallel(&self, ray: &Ray) -> bool {
        self.normal.dot(&ray.direction).abs() <= EPSILON * ray.direction.norm()
    }

    /// The whole carrier line of `ray` lies on the plane
    pub fn contains_ray(&self, ray: &Ray) -> bool {
        self.is_parallel(ray) && self.contains_point(&ray.origin)
    }

    /// The ray (`t >= 0`) reaches the plane
    pub fn intersects_ray(&self, ray: &Ray) -> bool {
        self.contains_ray(ray) || self.trace(ray, 0.0, f32::INFINITY).is_some()
    }

    /// Parameter and point where `ray` crosses the plane, within `[t_min, t_max]`
    pub fn trace(&self, ray: &Ray, t_min: f32, t_max: f32) -> Option<(f32, Vec3)> {
        if self.is_parallel(ray) {
            return None;
        }
        let t = -self.distance_to_point(&ray.origin) / self.normal.dot(&ray.direction);
        (t_min..=t_max).contains(&t).then(|| (t, ray.point_at(t)))
    }

    /// Line shared by two planes, `None` when they are parallel
    pub fn intersect_plane(&self, other: &Self) -> Option<Ray> {
        let direction = self.normal.cross(&other.normal);
        let direction_sq = direction.norm_squared();
        if direction_sq <= EPSILON {
            return None;
        }
        let point = (other.normal.cross(&direction) * -self.d
            + direction.cross(&self.normal) * -other.d)
            / direction_sq;
        Some(Ray::new(point, direction))
    }
}
