//! Swept contacts between moving shapes

use super::{Line, Plane};
use crate::foundation::math::{Vec3, EPSILON};
use crate::volumes::{Obb, Sphere};

/// Outcome of a swept collision test
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactInfo {
    /// A contact occurs at some `time >= 0`
    pub happened: bool,
    /// The shapes already overlap at `time = 0`
    pub penetrated: bool,
    /// Contact position: the moving centre for sphere/sphere and
    /// sphere/plane, the touched point of the fixed shape for segments and boxes
    pub position: Vec3,
    /// Unit contact normal, pointing from the static shape to the moving one
    pub normal: Vec3,
    /// Time of first contact, in units of the velocity
    pub time: f32,
    /// Overlap depth when `penetrated`
    pub penetration_depth: f32,
}

impl Default for ContactInfo {
    fn default() -> Self {
        Self::none()
    }
}

impl ContactInfo {
    /// No contact
    pub fn none() -> Self {
        Self {
            happened: false,
            penetrated: false,
            position: Vec3::zeros(),
            normal: Vec3::zeros(),
            time: f32::INFINITY,
            penetration_depth: 0.0,
        }
    }

    fn touching(position: Vec3, normal: Vec3, time: f32) -> Self {
        Self {
            happened: true,
            penetrated: false,
            position,
            normal,
            time,
            penetration_depth: 0.0,
        }
    }

    fn overlapping(position: Vec3, normal: Vec3, depth: f32) -> Self {
        Self {
            happened: true,
            penetrated: true,
            position,
            normal,
            time: 0.0,
            penetration_depth: depth,
        }
    }

    /// `other` should replace `self` when keeping the most relevant contact
    ///
    /// Any contact beats none and an overlap beats a future contact. Between
    /// two overlaps the shallower one wins; between two future contacts the
    /// earlier one wins.
    pub fn worse_than(&self, other: &Self) -> bool {
        if !other.happened {
            return false;
        }
        if !self.happened {
            return true;
        }
        match (self.penetrated, other.penetrated) {
            (false, true) => true,
            (true, false) => false,
            (true, true) => self.penetration_depth > other.penetration_depth,
            (false, false) => self.time > other.time,
        }
    }
}

fn direction_or(vector: &Vec3, fallback: Vec3) -> Vec3 {
    vector.try_normalize(EPSILON).unwrap_or(fallback)
}

/// Smallest root of `a t^2 + b t + c` when it is not negative
fn first_root(a: f32, b: f32, c: f32) -> Option<f32> {
    if a < EPSILON * EPSILON {
        return None;
    }
    let discriminant = b * b - 4.0 * a * c;
    if discriminant < 0.0 {
        return None;
    }
    let time = (-b - discriminant.sqrt()) / (2.0 * a);
    (time >= 0.0).then_some(time)
}

/// First time `origin + velocity * t` comes within `radius` of `center`
fn sweep_point_sphere(origin: &Vec3, velocity: &Vec3, center: &Vec3, radius: f32) -> Option<f32> {
    let offset = origin - center;
    first_root(
        velocity.norm_squared(),
        2.0 * offset.dot(velocity),
        offset.norm_squared() - radius * radius,
    )
}

/// First time `origin + velocity * t` comes within `radius` of `segment`
fn sweep_point_segment(origin: &Vec3, velocity: &Vec3, segment: &Line, radius: f32) -> Option<f32> {
    let axis = segment.direction();
    let length_sq = axis.norm_squared();

    let side = if length_sq > EPSILON * EPSILON {
        let across = |v: Vec3| v - axis * (v.dot(&axis) / length_sq);
        let offset = across(origin - segment.a);
        let speed = across(*velocity);
        first_root(
            speed.norm_squared(),
            2.0 * offset.dot(&speed),
            offset.norm_squared() - radius * radius,
        )
        .filter(|&time| {
            let along = (origin + velocity * time - segment.a).dot(&axis) / length_sq;
            (0.0..=1.0).contains(&along)
        })
    } else {
        None
    };

    [segment.a, segment.b]
        .iter()
        .filter_map(|end| sweep_point_sphere(origin, velocity, end, radius))
        .chain(side)
        .min_by(f32::total_cmp)
}

/// `offset = u * first + v * second` with `u, v` in `[0, 1]`
fn on_parallelogram(offset: &Vec3, first: &Vec3, second: &Vec3) -> bool {
    let g00 = first.norm_squared();
    let g01 = first.dot(second);
    let g11 = second.norm_squared();
    let det = g00 * g11 - g01 * g01;
    if det.abs() < f32::MIN_POSITIVE {
        return false;
    }
    let r0 = offset.dot(first);
    let r1 = offset.dot(second);
    let u = (g11 * r0 - g01 * r1) / det;
    let v = (g00 * r1 - g01 * r0) / det;
    let range = -EPSILON..=1.0 + EPSILON;
    range.contains(&u) && range.contains(&v)
}

/// Sweep `moving` along `velocity` against the stationary sphere `fixed`
pub fn collide_spheres(fixed: &Sphere, moving: &Sphere, velocity: &Vec3) -> ContactInfo {
    let offset = moving.center - fixed.center;
    let reach = fixed.radius + moving.radius;
    let distance = offset.norm();

    if distance < reach {
        let normal = direction_or(&offset, Vec3::y());
        return ContactInfo::overlapping(moving.center, normal, reach - distance);
    }

    let Some(time) = sweep_point_sphere(&moving.center, velocity, &fixed.center, reach) else {
        return ContactInfo::none();
    };
    let position = moving.center + velocity * time;
    let normal = direction_or(&(position - fixed.center), Vec3::y());
    ContactInfo::touching(position, normal, time)
}

/// Sweep `sphere` along `velocity` against a stationary segment
pub fn collide_sphere_line(line: &Line, sphere: &Sphere, velocity: &Vec3) -> ContactInfo {
    let closest = line.closest_point(&sphere.center);
    let offset = sphere.center - closest;
    let distance = offset.norm();

    if distance < sphere.radius {
        let normal = direction_or(&offset, Vec3::y());
        return ContactInfo::overlapping(closest, normal, sphere.radius - distance);
    }

    let Some(time) = sweep_point_segment(&sphere.center, velocity, line, sphere.radius) else {
        return ContactInfo::none();
    };
    let center = sphere.center + velocity * time;
    let position = line.closest_point(&center);
    ContactInfo::touching(position, direction_or(&(center - position), Vec3::y()), time)
}

/// Sweep `sphere` along `velocity` against a stationary oriented box
///
/// The swept centre is tested against the box grown by the radius: the six
/// faces pushed out along their normals and a cylinder around each edge.
pub fn collide_sphere_obb(obb: &Obb, sphere: &Sphere, velocity: &Vec3) -> ContactInfo {
    if obb.contains_point(&sphere.center) {
        let surface = obb.closest_surface_point(&sphere.center);
        let offset = surface - sphere.center;
        let normal = direction_or(&offset, Vec3::y());
        return ContactInfo::overlapping(surface, normal, sphere.radius + offset.norm());
    }

    let closest = obb.closest_point(&sphere.center);
    let offset = sphere.center - closest;
    let distance = offset.norm();
    if distance < sphere.radius {
        let normal = direction_or(&offset, Vec3::y());
        return ContactInfo::overlapping(closest, normal, sphere.radius - distance);
    }

    let faces = obb.faces();
    let edges = obb.edge_lines();
    let face_times = faces.iter().filter_map(|(corner, first, second, normal)| {
        let height = (sphere.center - corner).dot(normal);
        let approach = velocity.dot(normal);
        if height < sphere.radius || approach > -EPSILON {
            return None;
        }
        let time = (sphere.radius - height) / approach;
        let foot = sphere.center + velocity * time - normal * sphere.radius;
        on_parallelogram(&(foot - corner), first, second).then_some(time)
    });
    let edge_times = edges
        .iter()
        .filter_map(|edge| sweep_point_segment(&sphere.center, velocity, edge, sphere.radius));

    let Some(time) = face_times.chain(edge_times).min_by(f32::total_cmp) else {
        return ContactInfo::none();
    };
    let center = sphere.center + velocity * time;
    let position = obb.closest_point(&center);
    ContactInfo::touching(position, direction_or(&(center - position), Vec3::y()), time)
}

/// Sweep `sphere` along `velocity` against a plane
pub fn collide_sphere_plane(plane: &Plane, sphere: &Sphere, velocity: &Vec3) -> ContactInfo {
    let distance = plane.distance_to_point(&sphere.center);
    let side = if distance >= 0.0 { 1.0 } else { -1.0 };
    let normal = plane.normal * side;

    if distance.abs() < sphere.radius {
        return ContactInfo::overlapping(sphere.center, normal, sphere.radius - distance.abs());
    }

    let approach = plane.normal.dot(velocity) * side;
    if approach > -EPSILON {
        return ContactInfo::none();
    }

    let time = (sphere.radius - distance.abs()) / approach;
    ContactInfo::touching(sphere.center + velocity * time, normal, time)
}
