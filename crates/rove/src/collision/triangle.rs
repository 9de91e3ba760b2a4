//! Triangle primitive and its intersection tests

use super::{Interval, Line, Plane, Ray};
use crate::foundation::math::{utils, Vec3, EPSILON};
use crate::volumes::{Aabb, Sphere};

/// A triangle for collision detection
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    /// Triangle vertices in world space
    pub v0: Vec3,
    /// Second vertex
    pub v1: Vec3,
    /// Third vertex
    pub v2: Vec3,
}

impl Triangle {
    /// Creates a new triangle
    pub const fn new(v0: Vec3, v1: Vec3, v2: Vec3) -> Self {
        Self { v0, v1, v2 }
    }

    /// Vertices in winding order
    pub const fn vertices(&self) -> [Vec3; 3] {
        [self.v0, self.v1, self.v2]
    }

    /// Edge vectors `v1 - v0`, `v2 - v1`, `v0 - v2`
    pub fn edges(&self) -> [Vec3; 3] {
        [self.v1 - self.v0, self.v2 - self.v1, self.v0 - self.v2]
    }

    /// Edges as segments
    pub const fn sides(&self) -> [Line; 3] {
        [
            Line::new(self.v0, self.v1),
            Line::new(self.v1, self.v2),
            Line::new(self.v2, self.v0),
        ]
    }

    /// Unnormalized normal, twice the area in length
    pub fn area_normal(&self) -> Vec3 {
        (self.v1 - self.v0).cross(&(self.v2 - self.v0))
    }

    /// Calculates the normal of the triangle (right-hand rule)
    pub fn normal(&self) -> Vec3 {
        self.area_normal().normalize()
    }

    /// Surface area
    pub fn area(&self) -> f32 {
        self.area_normal().norm() * 0.5
    }

    /// Collinear or coincident vertices
    pub fn is_degenerate(&self) -> bool {
        self.area_normal().norm_squared() <= EPSILON * EPSILON
    }

    /// Calculates the centroid (center point) of the triangle
    pub fn centroid(&self) -> Vec3 {
        (self.v0 + self.v1 + self.v2) / 3.0
    }

    /// Supporting plane
    pub fn plane(&self) -> Plane {
        Plane::from_point_normal(&self.v0, &self.area_normal())
    }

    /// Axis-aligned bounds
    pub fn aabb(&self) -> Aabb {
        let mut aabb = Aabb::from_point(self.v0);
        aabb.extend_point(&self.v1);
        aabb.extend_point(&self.v2);
        aabb
    }

    /// `point` lies on the triangle, edges included
    pub fn contains_point(&self, point: &Vec3) -> bool {
        if self.is_degenerate() {
            return false;
        }
        let scale = 1.0 + (self.v1 - self.v0).norm().max((self.v2 - self.v0).norm());
        (self.closest_point(*point) - point).norm_squared() <= (1e-5 * scale).powi(2)
    }

    /// Möller-Trumbore ray-triangle intersection algorithm
    /// Returns (t, u, v) barycentric coordinates if hit, None otherwise
    ///
    /// See: "Fast, Minimum Storage Ray/Triangle Intersection" by Möller & Trumbore
    pub fn intersect_ray(&self, ray: &Ray) -> Option<(f32, f32, f32)> {
        let (t, u, v) = self.moller_trumbore(&ray.origin, &ray.direction)?;

        // Accept any non-negative distance
        (t >= 0.0).then_some((t, u, v))
    }

    fn moller_trumbore(&self, origin: &Vec3, direction: &Vec3) -> Option<(f32, f32, f32)> {
        let edge1 = self.v1 - self.v0;
        let edge2 = self.v2 - self.v0;

        let h = direction.cross(&edge2);
        let a = edge1.dot(&h);

        // Parallel to the triangle plane
        if a.abs() < EPSILON * direction.norm().max(EPSILON) * edge1.norm() * edge2.norm() {
            return None;
        }

        let f = 1.0 / a;
        let s = origin - self.v0;
        let u = f * s.dot(&h);
        if !(0.0..=1.0).contains(&u) {
            return None;
        }

        let q = s.cross(&edge1);
        let v = f * direction.dot(&q);
        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        Some((f * edge2.dot(&q), u, v))
    }

    /// Parameter and point where `ray` hits the triangle, within `[t_min, t_max]`
    pub fn trace(&self, ray: &Ray, t_min: f32, t_max: f32) -> Option<(f32, Vec3)> {
        let (t, _, _) = self.moller_trumbore(&ray.origin, &ray.direction)?;
        (t_min..=t_max).contains(&t).then(|| (t, ray.point_at(t)))
    }

    /// Get the closest point on the triangle to a given point
    pub fn closest_point(&self, point: Vec3) -> Vec3 {
        let edge1 = self.v1 - self.v0;
        let edge2 = self.v2 - self.v0;
        let v0_to_point = point - self.v0;

        let d1 = edge1.dot(&v0_to_point);
        let d2 = edge2.dot(&v0_to_point);

        // Vertex region outside v0
        if d1 <= 0.0 && d2 <= 0.0 {
            return self.v0;
        }

        // Vertex region outside v1
        let v1_to_point = point - self.v1;
        let d3 = edge1.dot(&v1_to_point);
        let d4 = edge2.dot(&v1_to_point);
        if d3 >= 0.0 && d4 <= d3 {
            return self.v1;
        }

        // Vertex region outside v2
        let v2_to_point = point - self.v2;
        let d5 = edge1.dot(&v2_to_point);
        let d6 = edge2.dot(&v2_to_point);
        if d6 >= 0.0 && d5 <= d6 {
            return self.v2;
        }

        // Edge regions
        let vc = d1 * d4 - d3 * d2;
        if vc <= 0.0 && d1 >= 0.0 && d3 <= 0.0 {
            let v = d1 / (d1 - d3);
            return self.v0 + edge1 * v;
        }

        let vb = d5 * d2 - d1 * d6;
        if vb <= 0.0 && d2 >= 0.0 && d6 <= 0.0 {
            let w = d2 / (d2 - d6);
            return self.v0 + edge2 * w;
        }

        let va = d3 * d6 - d5 * d4;
        if va <= 0.0 && (d4 - d3) >= 0.0 && (d5 - d6) >= 0.0 {
            let w = (d4 - d3) / ((d4 - d3) + (d5 - d6));
            return self.v1 + (self.v2 - self.v1) * w;
        }

        // Face region
        let sum = va + vb + vc;
        if sum.abs() < f32::MIN_POSITIVE {
            return self.v0;
        }
        let denom = 1.0 / sum;
        self.v0 + edge1 * (vb * denom) + edge2 * (vc * denom)
    }

    /// Distance from a point to the triangle plane (signed)
    pub fn distance_to_point(&self, point: Vec3) -> f32 {
        self.normal().dot(&(point - self.v0))
    }

    /// Triangle touches the solid sphere
    pub fn intersects_sphere(&self, sphere: &Sphere) -> bool {
        (self.closest_point(sphere.center) - sphere.center).norm_squared()
            <= sphere.radius * sphere.radius
    }

    /// Segment touches the triangle
    pub fn intersects_segment(&self, segment: &Line) -> bool {
        let direction = segment.direction();
        if let Some((t, _, _)) = self.moller_trumbore(&segment.a, &direction) {
            return (0.0..=1.0).contains(&t);
        }

        // Parallel: only a segment lying in the triangle plane can touch it
        let plane = self.plane();
        if self.is_degenerate()
            || !plane.contains_point(&segment.a)
            || !plane.contains_point(&segment.b)
        {
            return false;
        }
        let axis = utils::dominant_axis(&self.area_normal());
        let flat = Flat::new(self, axis);
        flat.segment_touches(&segment.a, &segment.b)
    }

    /// Squared distance between the triangle and a segment
    pub fn distance_sq_to_segment(&self, segment: &Line) -> f32 {
        if self.intersects_segment(segment) {
            return 0.0;
        }

        let to_endpoint = |p: &Vec3| (self.closest_point(*p) - p).norm_squared();
        self.sides()
            .iter()
            .map(|side| side.distance_sq_to_line(segment))
            .fold(
                to_endpoint(&segment.a).min(to_endpoint(&segment.b)),
                f32::min,
            )
    }

    /// Separating-axis test against an axis-aligned box (Akenine-Möller)
    pub fn intersects_aabb(&self, aabb: &Aabb) -> bool {
        let center = aabb.center();
        let half = aabb.extents();
        let vertices = [self.v0 - center, self.v1 - center, self.v2 - center];

        let box_interval = |axis: &Vec3| {
            let radius = half.x * axis.x.abs() + half.y * axis.y.abs() + half.z * axis.z.abs();
            Interval::around(0.0, radius)
        };
        let separates = |axis: &Vec3| {
            axis.norm_squared() > EPSILON * EPSILON
                && !Interval::from_projection(&vertices, axis).overlaps(&box_interval(axis))
        };

        // Box face normals
        if !self.aabb().intersects(aabb) {
            return false;
        }

        // Triangle face normal
        if separates(&self.area_normal()) {
            return false;
        }

        // Edge cross products
        let box_axes = [Vec3::x(), Vec3::y(), Vec3::z()];
        !self
            .edges()
            .iter()
            .any(|edge| box_axes.iter().any(|axis| separates(&axis.cross(edge))))
    }

    /// Test if this triangle intersects another triangle
    ///
    /// Non-coplanar pairs intersect exactly when some edge of one touches
    /// the other. Coplanar pairs are resolved in the projection that drops
    /// the dominant normal axis. Degenerate triangles fall back to their
    /// bounding boxes.
    pub fn intersects_triangle(&self, other: &Self) -> bool {
        if !self.aabb().intersects(&other.aabb()) {
            return false;
        }
        if self.is_degenerate() || other.is_degenerate() {
            return true;
        }

        let normal = self.area_normal();
        let parallel = normal.cross(&other.area_normal()).norm_squared()
            <= EPSILON * normal.norm_squared() * other.area_normal().norm_squared();
        let plane = self.plane();
        let coplanar = parallel && other.vertices().iter().all(|v| plane.contains_point(v));

        if coplanar {
            let axis = utils::dominant_axis(&normal);
            let ours = Flat::new(self, axis);
            return other
                .sides()
                .iter()
                .any(|side| ours.segment_touches(&side.a, &side.b))
                || Flat::new(other, axis).contains(&self.v0);
        }
        if parallel {
            return false;
        }

        other.sides().iter().any(|side| self.intersects_segment(side))
            || self.sides().iter().any(|side| other.intersects_segment(side))
    }
}

/// Triangle projected onto the coordinate plane orthogonal to `drop`
struct Flat {
    points: [(f32, f32); 3],
    drop: usize,
}

impl Flat {
    fn new(triangle: &Triangle, drop: usize) -> Self {
        let project = |v: &Vec3| Self::project_with(v, drop);
        Self {
            points: [project(&triangle.v0), project(&triangle.v1), project(&triangle.v2)],
            drop,
        }
    }

    fn project_with(v: &Vec3, drop: usize) -> (f32, f32) {
        match drop {
            0 => (v.y, v.z),
            1 => (v.z, v.x),
            _ => (v.x, v.y),
        }
    }

    fn project(&self, v: &Vec3) -> (f32, f32) {
        Self::project_with(v, self.drop)
    }

    fn contains(&self, point: &Vec3) -> bool {
        let p = self.project(point);
        let [a, b, c] = self.points;
        let d1 = cross_2d(a, b, p);
        let d2 = cross_2d(b, c, p);
        let d3 = cross_2d(c, a, p);
        let has_negative = d1 < 0.0 || d2 < 0.0 || d3 < 0.0;
        let has_positive = d1 > 0.0 || d2 > 0.0 || d3 > 0.0;
        !(has_negative && has_positive)
    }

    fn segment_touches(&self, a: &Vec3, b: &Vec3) -> bool {
        if self.contains(a) || self.contains(b) {
            return true;
        }
        let (p, q) = (self.project(a), self.project(b));
        let [x, y, z] = self.points;
        [(x, y), (y, z), (z, x)]
            .iter()
            .any(|&(r, s)| segments_touch_2d(p, q, r, s))
    }
}

fn cross_2d(o: (f32, f32), a: (f32, f32), b: (f32, f32)) -> f32 {
    (a.0 - o.0) * (b.1 - o.1) - (a.1 - o.1) * (b.0 - o.0)
}

fn on_segment_2d(p: (f32, f32), q: (f32, f32), r: (f32, f32)) -> bool {
    r.0 >= p.0.min(q.0) && r.0 <= p.0.max(q.0) && r.1 >= p.1.min(q.1) && r.1 <= p.1.max(q.1)
}

fn segments_touch_2d(p1: (f32, f32), p2: (f32, f32), p3: (f32, f32), p4: (f32, f32)) -> bool {
    let d1 = cross_2d(p3, p4, p1);
    let d2 = cross_2d(p3, p4, p2);
    let d3 = cross_2d(p1, p2, p3);
    let d4 = cross_2d(p1, p2, p4);

    if ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
        && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
    {
        return true;
    }

    (d1 == 0.0 && on_segment_2d(p3, p4, p1))
        || (d2 == 0.0 && on_segment_2d(p3, p4, p2))
        || (d3 == 0.0 && on_segment_2d(p1, p2, p3))
        || (d4 == 0.0 && on_segment_2d(p1, p2, p4))
}
