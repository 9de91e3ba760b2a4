//! Compile-time policy supplying bounds and intersection tests to the octree
//!
//! An [`Octree`](super::Octree) never inspects its primitives directly. It
//! asks a policy type for the bounding box of each stored primitive (to
//! route it during build) and for an exact `intersects` answer per
//! primitive/query pairing (to filter during traversal). The policy is a
//! zero-sized type; dispatch is resolved statically.
//!
//! [`DefaultOctreeTraits`] covers the shapes shipped with this crate.
//! Custom primitives get their own policy type:
//!
//! ```rust
//! use rove::prelude::*;
//!
//! struct Point(Vec3);
//! struct PointTraits;
//!
//! impl OctreeTraits<Point> for PointTraits {
//!     fn bounds(point: &Point) -> Aabb {
//!         Aabb::from_point(point.0)
//!     }
//! }
//!
//! impl OctreeTraits<Sphere> for PointTraits {
//!     fn bounds(sphere: &Sphere) -> Aabb {
//!         sphere.aabb()
//!     }
//! }
//!
//! impl OctreeQueryTraits<Point, Sphere> for PointTraits {
//!     fn intersects(point: &Point, sphere: &Sphere) -> bool {
//!         (point.0 - sphere.center).norm() <= sphere.radius
//!     }
//! }
//!
//! let bounds = Aabb::new(Vec3::repeat(-1.0), Vec3::repeat(1.0));
//! let mut tree: Octree<Point, &str, PointTraits> = Octree::new(bounds).unwrap();
//! tree.insert(Point(Vec3::new(0.5, 0.5, 0.5)), "a");
//! tree.build();
//! assert_eq!(tree.query_intersection(&Sphere::new(Vec3::zeros(), 1.0)), vec!["a"]);
//! ```

use crate::collision::Triangle;
use crate::volumes::{Aabb, Capsule, Obb, Sphere};

/// Bounding box of a primitive
///
/// The returned box must enclose every point for which the paired
/// [`OctreeQueryTraits::intersects`] can return `true`; the octree prunes
/// with it.
pub trait OctreeTraits<P> {
    /// Axis-aligned bounds of `primitive`
    fn bounds(primitive: &P) -> Aabb;
}

/// Exact intersection test between a stored primitive and a query primitive
pub trait OctreeQueryTraits<P, Q>: OctreeTraits<P> + OctreeTraits<Q> {
    /// `true` when `primitive` and `query` intersect
    fn intersects(primitive: &P, query: &Q) -> bool;
}

/// Policy for the crate's own shapes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DefaultOctreeTraits;

impl OctreeTraits<Aabb> for DefaultOctreeTraits {
    fn bounds(aabb: &Aabb) -> Aabb {
        *aabb
    }
}

impl OctreeTraits<Sphere> for DefaultOctreeTraits {
    fn bounds(sphere: &Sphere) -> Aabb {
        sphere.aabb()
    }
}

impl OctreeTraits<Triangle> for DefaultOctreeTraits {
    fn bounds(triangle: &Triangle) -> Aabb {
        triangle.aabb()
    }
}

impl OctreeTraits<Capsule> for DefaultOctreeTraits {
    fn bounds(capsule: &Capsule) -> Aabb {
        capsule.aabb()
    }
}

impl OctreeTraits<Obb> for DefaultOctreeTraits {
    fn bounds(obb: &Obb) -> Aabb {
        obb.aabb()
    }
}

impl OctreeQueryTraits<Aabb, Aabb> for DefaultOctreeTraits {
    fn intersects(a: &Aabb, b: &Aabb) -> bool {
        a.intersects(b)
    }
}

impl OctreeQueryTraits<Aabb, Sphere> for DefaultOctreeTraits {
    fn intersects(aabb: &Aabb, sphere: &Sphere) -> bool {
        sphere.intersects_aabb(aabb)
    }
}

impl OctreeQueryTraits<Sphere, Aabb> for DefaultOctreeTraits {
    fn intersects(sphere: &Sphere, aabb: &Aabb) -> bool {
        sphere.intersects_aabb(aabb)
    }
}

impl OctreeQueryTraits<Sphere, Sphere> for DefaultOctreeTraits {
    fn intersects(a: &Sphere, b: &Sphere) -> bool {
        a.intersects(b)
    }
}

impl OctreeQueryTraits<Triangle, Triangle> for DefaultOctreeTraits {
    fn intersects(a: &Triangle, b: &Triangle) -> bool {
        a.intersects_triangle(b)
    }
}

impl OctreeQueryTraits<Triangle, Aabb> for DefaultOctreeTraits {
    fn intersects(triangle: &Triangle, aabb: &Aabb) -> bool {
        triangle.intersects_aabb(aabb)
    }
}

impl OctreeQueryTraits<Aabb, Triangle> for DefaultOctreeTraits {
    fn intersects(aabb: &Aabb, triangle: &Triangle) -> bool {
        triangle.intersects_aabb(aabb)
    }
}

impl OctreeQueryTraits<Triangle, Sphere> for DefaultOctreeTraits {
    fn intersects(triangle: &Triangle, sphere: &Sphere) -> bool {
        triangle.intersects_sphere(sphere)
    }
}

impl OctreeQueryTraits<Sphere, Triangle> for DefaultOctreeTraits {
    fn intersects(sphere: &Sphere, triangle: &Triangle) -> bool {
        triangle.intersects_sphere(sphere)
    }
}

impl OctreeQueryTraits<Triangle, Capsule> for DefaultOctreeTraits {
    fn intersects(triangle: &Triangle, capsule: &Capsule) -> bool {
        capsule.intersects_triangle(triangle)
    }
}

impl OctreeQueryTraits<Capsule, Triangle> for DefaultOctreeTraits {
    fn intersects(capsule: &Capsule, triangle: &Triangle) -> bool {
        capsule.intersects_triangle(triangle)
    }
}

impl OctreeQueryTraits<Capsule, Capsule> for DefaultOctreeTraits {
    fn intersects(a: &Capsule, b: &Capsule) -> bool {
        a.intersects_capsule(b)
    }
}

impl OctreeQueryTraits<Capsule, Sphere> for DefaultOctreeTraits {
    fn intersects(capsule: &Capsule, sphere: &Sphere) -> bool {
        capsule.intersects_sphere(sphere)
    }
}

impl OctreeQueryTraits<Sphere, Capsule> for DefaultOctreeTraits {
    fn intersects(sphere: &Sphere, capsule: &Capsule) -> bool {
        capsule.intersects_sphere(sphere)
    }
}

impl OctreeQueryTraits<Obb, Obb> for DefaultOctreeTraits {
    fn intersects(a: &Obb, b: &Obb) -> bool {
        a.intersects_obb(b)
    }
}

impl OctreeQueryTraits<Obb, Aabb> for DefaultOctreeTraits {
    fn intersects(obb: &Obb, aabb: &Aabb) -> bool {
        obb.intersects_aabb(aabb)
    }
}

impl OctreeQueryTraits<Aabb, Obb> for DefaultOctreeTraits {
    fn intersects(aabb: &Aabb, obb: &Obb) -> bool {
        obb.intersects_aabb(aabb)
    }
}

impl OctreeQueryTraits<Obb, Triangle> for DefaultOctreeTraits {
    fn intersects(obb: &Obb, triangle: &Triangle) -> bool {
        obb.intersects_triangle(triangle)
    }
}
