//! Oriented bounding box
//!
//! The box is `origin + u*tangent + v*normal + w*binormal` for
//! `u, v, w` in `[0, 1]`. The three edge vectors carry both orientation and
//! full edge length; they are expected to be linearly independent.

use super::Aabb;
use crate::collision::{Interval, Line, Ray, Triangle};
use crate::error::{GeometryError, Result};
use crate::foundation::math::{Mat3, Mat4, Mat4Ext, Vec3, EPSILON};

/// Oriented box spanned by three edge vectors from a corner
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Obb {
    /// Corner the edge vectors start from
    pub origin: Vec3,
    /// First edge
    pub tangent: Vec3,
    /// Second edge
    pub normal: Vec3,
    /// Third edge
    pub binormal: Vec3,
}

impl Obb {
    /// Create an OBB from a corner and three edge vectors
    pub const fn new(origin: Vec3, tangent: Vec3, normal: Vec3, binormal: Vec3) -> Self {
        Self {
            origin,
            tangent,
            normal,
            binormal,
        }
    }

    /// Same volume as an axis-aligned box
    pub fn from_aabb(aabb: &Aabb) -> Self {
        let d = aabb.diagonal();
        Self {
            origin: aabb.lo,
            tangent: Vec3::new(d.x, 0.0, 0.0),
            normal: Vec3::new(0.0, d.y, 0.0),
            binormal: Vec3::new(0.0, 0.0, d.z),
        }
    }

    /// Edge vectors in `tangent, normal, binormal` order
    pub const fn edges(&self) -> [Vec3; 3] {
        [self.tangent, self.normal, self.binormal]
    }

    /// Centre point
    pub fn center(&self) -> Vec3 {
        self.origin + (self.tangent + self.normal + self.binormal) * 0.5
    }

    /// Half of the main diagonal
    pub fn radius(&self) -> f32 {
        (self.tangent + self.normal + self.binormal).norm() * 0.5
    }

    /// Product of the edge lengths (the volume for orthogonal edges)
    pub fn volume(&self) -> f32 {
        self.tangent.norm() * self.normal.norm() * self.binormal.norm()
    }

    /// Corner `index` in `0..8`; bit 0 adds `tangent`, bit 1 `normal`, bit 2 `binormal`
    pub fn vertex(&self, index: usize) -> Result<Vec3> {
        if index >= 8 {
            return Err(GeometryError::index_out_of_range(index, 8));
        }
        Ok(self.corner(index))
    }

    /// All eight corners in [`Obb::vertex`] order
    pub fn vertices(&self) -> [Vec3; 8] {
        std::array::from_fn(|index| self.corner(index))
    }

    fn corner(&self, index: usize) -> Vec3 {
        let mut corner = self.origin;
        if index & 1 != 0 {
            corner += self.tangent;
        }
        if index & 2 != 0 {
            corner += self.normal;
        }
        if index & 4 != 0 {
            corner += self.binormal;
        }
        corner
    }

    /// One of the eight half-size boxes, indexed like [`Obb::vertex`]
    pub fn segment(&self, index: usize) -> Result<Self> {
        if index >= 8 {
            return Err(GeometryError::index_out_of_range(index, 8));
        }
        let tangent = self.tangent * 0.5;
        let normal = self.normal * 0.5;
        let binormal = self.binormal * 0.5;

        let mut origin = self.origin;
        if index & 1 != 0 {
            origin += tangent;
        }
        if index & 2 != 0 {
            origin += normal;
        }
        if index & 4 != 0 {
            origin += binormal;
        }
        Ok(Self::new(origin, tangent, normal, binormal))
    }

    /// Axis-aligned bounds
    pub fn aabb(&self) -> Aabb {
        let mut aabb = Aabb::empty();
        for vertex in self.vertices() {
            aabb.extend_point(&vertex);
        }
        aabb
    }

    /// Box after an affine transform
    pub fn transform(&self, matrix: &Mat4) -> Self {
        let origin = matrix.apply_point(&self.origin);
        let edge = |e: &Vec3| matrix.apply_point(&(self.origin + e)) - origin;
        Self {
            origin,
            tangent: edge(&self.tangent),
            normal: edge(&self.normal),
            binormal: edge(&self.binormal),
        }
    }

    fn basis(&self) -> Mat3 {
        Mat3::from_columns(&self.edges())
    }

    /// Edge vectors are not coplanar
    pub fn is_basis_linearly_independent(&self) -> bool {
        self.basis().determinant().abs() > EPSILON
    }

    /// Express a world direction in edge-vector coordinates
    pub fn world_to_local_vector(&self, vector: &Vec3) -> Result<Vec3> {
        let inverse = self
            .basis()
            .try_inverse()
            .ok_or(GeometryError::Degenerate("obb edge vectors are coplanar"))?;
        Ok(inverse * vector)
    }

    /// Express a world point in unit-box coordinates (`origin` -> 0)
    pub fn world_to_local_point(&self, point: &Vec3) -> Result<Vec3> {
        self.world_to_local_vector(&(point - self.origin))
    }

    /// Inverse of [`Obb::world_to_local_vector`]
    pub fn local_to_world_vector(&self, vector: &Vec3) -> Vec3 {
        self.basis() * vector
    }

    /// Inverse of [`Obb::world_to_local_point`]
    pub fn local_to_world_point(&self, point: &Vec3) -> Vec3 {
        self.origin + self.local_to_world_vector(point)
    }

    /// Closed containment; degenerate boxes contain nothing
    pub fn contains_point(&self, point: &Vec3) -> bool {
        self.world_to_local_point(point).is_ok_and(|local| {
            local.iter().all(|&c| (-EPSILON..=1.0 + EPSILON).contains(&c))
        })
    }

    /// All three vertices inside
    pub fn contains_triangle(&self, triangle: &Triangle) -> bool {
        triangle.vertices().iter().all(|v| self.contains_point(v))
    }

    /// All eight corners of `other` inside
    pub fn contains_obb(&self, other: &Self) -> bool {
        other.vertices().iter().all(|v| self.contains_point(v))
    }

    fn project(&self, axis: &Vec3) -> Interval {
        let center = self.center().dot(axis);
        let radius = 0.5
            * (self.tangent.dot(axis).abs()
                + self.normal.dot(axis).abs()
                + self.binormal.dot(axis).abs());
        Interval::around(center, radius)
    }

    /// Separating-axis test against another box
    pub fn intersects_obb(&self, other: &Self) -> bool {
        if !self.aabb().intersects(&other.aabb()) {
            return false;
        }
        separating_axes(&self.edges(), &other.edges(), &[])
            .all(|axis| self.project(&axis).overlaps(&other.project(&axis)))
    }

    /// Separating-axis test against an axis-aligned box
    pub fn intersects_aabb(&self, aabb: &Aabb) -> bool {
        self.intersects_obb(&Self::from_aabb(aabb))
    }

    /// Separating-axis test against a triangle
    pub fn intersects_triangle(&self, triangle: &Triangle) -> bool {
        if !self.aabb().intersects(&triangle.aabb()) {
            return false;
        }
        let vertices = triangle.vertices();
        separating_axes(&self.edges(), &triangle.edges(), &[triangle.area_normal()]).all(|axis| {
            self.project(&axis)
                .overlaps(&Interval::from_projection(&vertices, &axis))
        })
    }

    /// Earliest time in `[t_min, t_max]` at which `other`, moving with
    /// `velocity` relative to this box, touches it
    pub fn collision_time_obb(
        &self,
        other: &Self,
        velocity: &Vec3,
        t_min: f32,
        t_max: f32,
    ) -> Option<f32> {
        separating_axes(&self.edges(), &other.edges(), &[])
            .try_fold(Interval::new(t_min, t_max), |window, axis| {
                let sweep = sweep_window(
                    &self.project(&axis),
                    &other.project(&axis),
                    velocity.dot(&axis),
                )?;
                window.intersection(&sweep)
            })
            .map(|window| window.low)
    }

    /// Earliest time in `[t_min, t_max]` at which `triangle`, moving with
    /// `velocity` relative to this box, touches it
    pub fn collision_time_triangle(
        &self,
        triangle: &Triangle,
        velocity: &Vec3,
        t_min: f32,
        t_max: f32,
    ) -> Option<f32> {
        let vertices = triangle.vertices();
        separating_axes(&self.edges(), &triangle.edges(), &[triangle.area_normal()])
            .try_fold(Interval::new(t_min, t_max), |window, axis| {
                let sweep = sweep_window(
                    &self.project(&axis),
                    &Interval::from_projection(&vertices, &axis),
                    velocity.dot(&axis),
                )?;
                window.intersection(&sweep)
            })
            .map(|window| window.low)
    }

    /// `other` moving with `velocity` touches this box within `[t_min, t_max]`
    pub fn test_collision_obb(&self, other: &Self, velocity: &Vec3, t_min: f32, t_max: f32) -> bool {
        self.collision_time_obb(other, velocity, t_min, t_max).is_some()
    }

    /// `triangle` moving with `velocity` touches this box within `[t_min, t_max]`
    pub fn test_collision_triangle(
        &self,
        triangle: &Triangle,
        velocity: &Vec3,
        t_min: f32,
        t_max: f32,
    ) -> bool {
        self.collision_time_triangle(triangle, velocity, t_min, t_max)
            .is_some()
    }

    /// The twelve edges as segments, four per edge vector
    pub fn edge_lines(&self) -> [Line; 12] {
        let edges = self.edges();
        std::array::from_fn(|index| {
            let axis = index / 4;
            let start = (0..8)
                .filter(|corner| corner & (1 << axis) == 0)
                .nth(index % 4)
                .unwrap_or(0);
            let corner = self.corner(start);
            Line::new(corner, corner + edges[axis])
        })
    }

    /// The six faces as `(corner, first edge, second edge, outward unit normal)`
    pub fn faces(&self) -> [(Vec3, Vec3, Vec3, Vec3); 6] {
        let center = self.center();
        let edges = self.edges();
        std::array::from_fn(|index| {
            let fixed = index / 2;
            let first = edges[(fixed + 1) % 3];
            let second = edges[(fixed + 2) % 3];
            let corner = if index % 2 == 0 {
                self.origin
            } else {
                self.origin + edges[fixed]
            };
            let mut normal = first.cross(&second).try_normalize(0.0).unwrap_or_else(Vec3::zeros);
            if normal.dot(&(corner + (first + second) * 0.5 - center)) < 0.0 {
                normal = -normal;
            }
            (corner, first, second, normal)
        })
    }

    /// Point of the box closest to `point`; `point` itself when inside
    pub fn closest_point(&self, point: &Vec3) -> Vec3 {
        if self.contains_point(point) {
            return *point;
        }
        self.closest_surface_point(point)
    }

    /// Point of the boundary closest to `point`, also for points inside
    pub fn closest_surface_point(&self, point: &Vec3) -> Vec3 {
        self.faces()
            .iter()
            .flat_map(|&(corner, first, second, _)| {
                [
                    Triangle::new(corner, corner + first, corner + first + second),
                    Triangle::new(corner, corner + first + second, corner + second),
                ]
            })
            .map(|triangle| triangle.closest_point(*point))
            .min_by(|a, b| {
                (a - point)
                    .norm_squared()
                    .total_cmp(&(b - point).norm_squared())
            })
            .unwrap_or(self.origin)
    }

    /// Entry and exit parameters of `ray` clipped to `[t_min, t_max]`
    pub fn trace(&self, ray: &Ray, t_min: f32, t_max: f32) -> Option<(f32, f32)> {
        let origin = self.world_to_local_point(&ray.origin).ok()?;
        let direction = self.world_to_local_vector(&ray.direction).ok()?;
        let unit = Aabb::new(Vec3::zeros(), Vec3::repeat(1.0));
        unit.trace(&Ray::new(origin, direction), t_min, t_max)
    }
}

/// Candidate separating axes: `faces`, the edges in `ours`, the edges in
/// `theirs` and their pairwise cross products
///
/// Zero face axes are skipped. A cross axis is skipped only when its edges
/// are parallel relative to their own lengths, so tiny shapes keep every axis.
fn separating_axes<'a>(
    ours: &'a [Vec3; 3],
    theirs: &'a [Vec3; 3],
    faces: &'a [Vec3],
) -> impl Iterator<Item = Vec3> + 'a {
    let face_axes = ours
        .iter()
        .chain(theirs.iter())
        .chain(faces.iter())
        .copied()
        .filter(|axis| axis.norm_squared() > 0.0);
    let cross_axes = ours.iter().flat_map(move |a| {
        theirs.iter().filter_map(move |b| {
            let axis = a.cross(b);
            let cutoff = EPSILON * EPSILON * a.norm_squared() * b.norm_squared();
            (axis.norm_squared() > cutoff).then_some(axis)
        })
    });
    face_axes.chain(cross_axes)
}

/// Times at which `moving`, advancing at `speed` along the axis, overlaps `fixed`
fn sweep_window(fixed: &Interval, moving: &Interval, speed: f32) -> Option<Interval> {
    if speed.abs() < f32::MIN_POSITIVE {
        return fixed
            .overlaps(moving)
            .then_some(Interval::new(f32::NEG_INFINITY, f32::INFINITY));
    }
    let enter = (fixed.low - moving.high) / speed;
    let exit = (fixed.high - moving.low) / speed;
    Some(Interval::new(enter, exit))
}
