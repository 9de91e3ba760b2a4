//! Axis-aligned bounding box

use crate::collision::Ray;
use crate::error::{GeometryError, Result};
use crate::foundation::math::{utils, Mat4, Mat4Ext, Vec3, EPSILON};

/// Axis-aligned bounding box defined by its `lo` and `hi` corners
///
/// All predicates are closed: touching boxes intersect and points on the
/// surface are contained.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Minimum corner
    pub lo: Vec3,
    /// Maximum corner
    pub hi: Vec3,
}

impl Default for Aabb {
    fn default() -> Self {
        Self::empty()
    }
}

impl Aabb {
    /// Create an AABB from its corners without validating them
    pub const fn new(lo: Vec3, hi: Vec3) -> Self {
        Self { lo, hi }
    }

    /// Create an AABB, rejecting `lo > hi` on any axis
    pub fn try_new(lo: Vec3, hi: Vec3) -> Result<Self> {
        let aabb = Self { lo, hi };
        if aabb.is_valid() {
            Ok(aabb)
        } else {
            Err(GeometryError::InvalidBounds {
                lo: lo.into(),
                hi: hi.into(),
            })
        }
    }

    /// Inverted box that any `extend` call replaces
    pub fn empty() -> Self {
        Self {
            lo: Vec3::repeat(f32::INFINITY),
            hi: Vec3::repeat(f32::NEG_INFINITY),
        }
    }

    /// Zero-volume box at a point
    pub const fn from_point(point: Vec3) -> Self {
        Self { lo: point, hi: point }
    }

    /// Create an AABB centered at a point with given half extents
    pub fn from_center_extents(center: Vec3, extents: Vec3) -> Self {
        Self {
            lo: center - extents,
            hi: center + extents,
        }
    }

    /// Cube of side `size` centered at a point
    pub fn from_center_size(center: Vec3, size: f32) -> Self {
        Self::from_center_extents(center, Vec3::repeat(size * 0.5))
    }

    /// Smallest box enclosing all points, `None` for an empty slice
    pub fn from_points(points: &[Vec3]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        let mut aabb = Self::from_point(*first);
        for point in rest {
            aabb.extend_point(point);
        }
        Some(aabb)
    }

    /// `lo <= hi` on every axis
    pub fn is_valid(&self) -> bool {
        utils::all_le(&self.lo, &self.hi)
    }

    /// Swap corners per axis so that `lo <= hi`
    pub fn normalize(&self) -> Self {
        Self {
            lo: utils::min_vec(&self.lo, &self.hi),
            hi: utils::max_vec(&self.lo, &self.hi),
        }
    }

    /// Vector from `lo` to `hi`
    pub fn diagonal(&self) -> Vec3 {
        self.hi - self.lo
    }

    /// Get the center of the AABB
    pub fn center(&self) -> Vec3 {
        (self.lo + self.hi) * 0.5
    }

    /// Get the extents (half-size) of the AABB
    pub fn extents(&self) -> Vec3 {
        self.diagonal() * 0.5
    }

    /// Volume, zero for invalid boxes
    pub fn volume(&self) -> f32 {
        if self.is_valid() {
            let d = self.diagonal();
            d.x * d.y * d.z
        } else {
            0.0
        }
    }

    /// Corner `index` in `0..8`; bit 0 selects `hi.x`, bit 1 `hi.y`, bit 2 `hi.z`
    pub fn vertex(&self, index: usize) -> Result<Vec3> {
        if index >= 8 {
            return Err(GeometryError::index_out_of_range(index, 8));
        }
        Ok(self.corner(index))
    }

    /// All eight corners in [`Aabb::vertex`] order
    pub fn vertices(&self) -> [Vec3; 8] {
        std::array::from_fn(|index| self.corner(index))
    }

    fn corner(&self, index: usize) -> Vec3 {
        Vec3::new(
            if index & 1 == 0 { self.lo.x } else { self.hi.x },
            if index & 2 == 0 { self.lo.y } else { self.hi.y },
            if index & 4 == 0 { self.lo.z } else { self.hi.z },
        )
    }

    /// Grow to include a point
    pub fn extend_point(&mut self, point: &Vec3) {
        self.lo = utils::min_vec(&self.lo, point);
        self.hi = utils::max_vec(&self.hi, point);
    }

    /// Grow to include another box
    pub fn extend(&mut self, other: &Self) {
        self.lo = utils::min_vec(&self.lo, &other.lo);
        self.hi = utils::max_vec(&self.hi, &other.hi);
    }

    /// Box enclosing both
    pub fn union(&self, other: &Self) -> Self {
        let mut result = *self;
        result.extend(other);
        result
    }

    /// Grow by `amount` on every side
    pub fn inflate(&self, amount: f32) -> Self {
        let delta = Vec3::repeat(amount);
        Self {
            lo: self.lo - delta,
            hi: self.hi + delta,
        }
    }

    /// Check if this AABB contains a point
    pub fn contains_point(&self, point: &Vec3) -> bool {
        utils::all_le(&self.lo, point) && utils::all_le(point, &self.hi)
    }

    /// Check if `other` lies entirely inside this box
    pub fn contains_aabb(&self, other: &Self) -> bool {
        utils::all_le(&self.lo, &other.lo) && utils::all_le(&other.hi, &self.hi)
    }

    /// Check if this AABB intersects another AABB
    pub fn intersects(&self, other: &Self) -> bool {
        self.lo.x <= other.hi.x && self.hi.x >= other.lo.x &&
        self.lo.y <= other.hi.y && self.hi.y >= other.lo.y &&
        self.lo.z <= other.hi.z && self.hi.z >= other.lo.z
    }

    /// Closest point of the box to `point`
    pub fn closest_point(&self, point: &Vec3) -> Vec3 {
        utils::min_vec(&utils::max_vec(point, &self.lo), &self.hi)
    }

    /// Squared distance from `point` to the box, zero inside
    pub fn distance_sq_to_point(&self, point: &Vec3) -> f32 {
        (self.closest_point(point) - point).norm_squared()
    }

    /// Map a point into unit-box coordinates (`lo` -> 0, `hi` -> 1)
    pub fn world_to_local_point(&self, point: &Vec3) -> Vec3 {
        (point - self.lo).component_div(&self.diagonal())
    }

    /// Map a direction into unit-box coordinates
    pub fn world_to_local_vector(&self, vector: &Vec3) -> Vec3 {
        vector.component_div(&self.diagonal())
    }

    /// Slab test against `ray`, clipped to `[t_min, t_max]`
    ///
    /// Returns the entry and exit parameters along the ray's direction.
    pub fn trace(&self, ray: &Ray, t_min: f32, t_max: f32) -> Option<(f32, f32)> {
        let mut enter = t_min;
        let mut exit = t_max;

        for axis in 0..3 {
            let origin = ray.origin[axis];
            let direction = ray.direction[axis];

            if direction.abs() < EPSILON {
                if origin < self.lo[axis] || origin > self.hi[axis] {
                    return None;
                }
                continue;
            }

            let inv = 1.0 / direction;
            let mut t0 = (self.lo[axis] - origin) * inv;
            let mut t1 = (self.hi[axis] - origin) * inv;
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
            }

            enter = enter.max(t0);
            exit = exit.min(t1);
            if enter > exit {
                return None;
            }
        }

        Some((enter, exit))
    }

    /// Check whether the ray (`t >= 0`) hits the box
    pub fn intersects_ray(&self, ray: &Ray) -> bool {
        self.trace(ray, 0.0, f32::INFINITY).is_some()
    }

    /// Axis-aligned box enclosing this box after `matrix`
    pub fn transformed(&self, matrix: &Mat4) -> Self {
        let mut result = Self::empty();
        for vertex in self.vertices() {
            result.extend_point(&matrix.apply_point(&vertex));
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn unit() -> Aabb {
        Aabb::new(Vec3::new(-1.0, -1.0, -1.0), Vec3::new(1.0, 1.0, 1.0))
    }

    #[test]
    fn test_try_new_rejects_inverted_bounds() {
        let result = Aabb::try_new(Vec3::new(0.0, 1.0, 0.0), Vec3::new(1.0, 0.0, 1.0));
        assert!(matches!(result, Err(GeometryError::InvalidBounds { .. })));
        assert!(Aabb::try_new(Vec3::zeros(), Vec3::zeros()).is_ok());
    }

    #[test]
    fn test_contains_is_closed() {
        let aabb = unit();
        assert!(aabb.contains_point(&Vec3::new(1.0, 1.0, 1.0)));
        assert!(aabb.contains_point(&Vec3::new(-1.0, 0.0, 0.5)));
        assert!(!aabb.contains_point(&Vec3::new(1.0001, 0.0, 0.0)));
    }

    #[test]
    fn test_touching_boxes_intersect() {
        let a = unit();
        let b = Aabb::new(Vec3::new(1.0, -1.0, -1.0), Vec3::new(3.0, 1.0, 1.0));
        let c = Aabb::new(Vec3::new(1.5, -1.0, -1.0), Vec3::new(3.0, 1.0, 1.0));
        assert!(a.intersects(&b));
        assert!(b.intersects(&a));
        assert!(!a.intersects(&c));
    }

    #[test]
    fn test_empty_extends_to_points() {
        let mut aabb = Aabb::empty();
        assert!(!aabb.is_valid());
        assert_eq!(aabb.volume(), 0.0);

        aabb.extend_point(&Vec3::new(1.0, 5.0, -2.0));
        aabb.extend_point(&Vec3::new(-3.0, 2.0, 4.0));
        assert_eq!(aabb.lo, Vec3::new(-3.0, 2.0, -2.0));
        assert_eq!(aabb.hi, Vec3::new(1.0, 5.0, 4.0));
        assert_eq!(Aabb::from_points(&[]), None);
    }

    #[test]
    fn test_vertex_bits() {
        let aabb = Aabb::new(Vec3::new(0.0, 0.0, 0.0), Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(aabb.vertex(0).unwrap(), Vec3::new(0.0, 0.0, 0.0));
        assert_eq!(aabb.vertex(1).unwrap(), Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(aabb.vertex(6).unwrap(), Vec3::new(0.0, 2.0, 3.0));
        assert_eq!(aabb.vertex(7).unwrap(), aabb.hi);
        assert_eq!(aabb.vertex(8), Err(GeometryError::index_out_of_range(8, 8)));
    }

    #[test]
    fn test_normalize_swaps_axes() {
        let aabb = Aabb::new(Vec3::new(2.0, 0.0, 5.0), Vec3::new(1.0, 3.0, 4.0)).normalize();
        assert_eq!(aabb.lo, Vec3::new(1.0, 0.0, 4.0));
        assert_eq!(aabb.hi, Vec3::new(2.0, 3.0, 5.0));
    }

    #[test]
    fn test_distance_to_point() {
        let aabb = unit();
        assert_eq!(aabb.distance_sq_to_point(&Vec3::new(0.5, 0.0, 0.0)), 0.0);
        assert_relative_eq!(aabb.distance_sq_to_point(&Vec3::new(3.0, 1.0, 2.0)), 5.0);
    }

    #[test]
    fn test_world_to_local() {
        let aabb = Aabb::new(Vec3::new(0.0, 0.0, 0.0), Vec3::new(2.0, 4.0, 8.0));
        let local = aabb.world_to_local_point(&Vec3::new(1.0, 1.0, 8.0));
        assert_relative_eq!(local, Vec3::new(0.5, 0.25, 1.0));
    }

    #[test]
    fn test_trace_enter_and_exit() {
        let aabb = unit();
        let ray = Ray::new(Vec3::new(-5.0, 0.0, 0.0), Vec3::new(2.0, 0.0, 0.0));

        let (enter, exit) = aabb.trace(&ray, 0.0, f32::INFINITY).unwrap();
        assert_relative_eq!(enter, 2.0);
        assert_relative_eq!(exit, 3.0);

        assert!(aabb.trace(&ray, 0.0, 1.0).is_none());
        let miss = Ray::new(Vec3::new(-5.0, 2.0, 0.0), Vec3::new(1.0, 0.0, 0.0));
        assert!(!aabb.intersects_ray(&miss));
    }

    #[test]
    fn test_trace_from_inside_starts_at_t_min() {
        let ray = Ray::new(Vec3::zeros(), Vec3::new(0.0, 0.0, 1.0));
        let (enter, exit) = unit().trace(&ray, 0.0, f32::INFINITY).unwrap();
        assert_eq!(enter, 0.0);
        assert_relative_eq!(exit, 1.0);
    }

    #[test]
    fn test_transformed_by_rotation() {
        let matrix = Mat4::rotation_z(crate::foundation::math::constants::PI * 0.25);
        let rotated = unit().transformed(&matrix);
        let half_diag = 2.0_f32.sqrt();
        assert_relative_eq!(rotated.hi.x, half_diag, epsilon = 1e-5);
        assert_relative_eq!(rotated.lo.y, -half_diag, epsilon = 1e-5);
        assert_relative_eq!(rotated.hi.z, 1.0, epsilon = 1e-5);
    }
}
