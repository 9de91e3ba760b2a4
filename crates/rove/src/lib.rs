//! # Rove
//!
//! Geometry primitives and a static octree for broad-phase spatial queries.
//!
//! ## Features
//!
//! - **Math kernel**: nalgebra-backed vector, matrix and quaternion aliases
//! - **Bounding volumes**: AABB, OBB, sphere and capsule
//! - **Primitives**: rays, segments, planes, triangles and frustums with
//!   intersection, containment and distance queries
//! - **Static octree**: build once, query many, generic over primitive and
//!   query types through a traits policy
//!
//! ## Quick Start
//!
//! ```rust
//! use rove::prelude::*;
//!
//! fn main() -> Result<(), GeometryError> {
//!     let bounds = Aabb::new(Vec3::new(-10.0, -10.0, -10.0), Vec3::new(10.0, 10.0, 10.0));
//!     let mut tree: Octree<Sphere, u32> = Octree::new(bounds)?;
//!
//!     tree.insert(Sphere::new(Vec3::new(1.0, 1.0, 1.0), 0.5), 1);
//!     tree.insert(Sphere::new(Vec3::new(-5.0, 2.0, 3.0), 1.0), 2);
//!     tree.build();
//!
//!     let query = Aabb::new(Vec3::new(0.0, 0.0, 0.0), Vec3::new(2.0, 2.0, 2.0));
//!     assert_eq!(tree.query_intersection(&query), vec![1]);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod foundation;
pub mod config;
pub mod error;
pub mod volumes;
pub mod collision;
pub mod spatial;

pub use error::{GeometryError, Result};

/// Commonly used types and traits
pub mod prelude {
    pub use crate::foundation::math::{Vec3, Mat3, Mat4, Quat, Point3, Mat4Ext, Transform, EPSILON};
    pub use crate::volumes::{Aabb, Obb, Sphere, Capsule};
    pub use crate::collision::{
        ContactInfo, Frustum, Interval, Line, Plane, PlaneSide, Ray, Triangle,
    };
    pub use crate::spatial::{
        DefaultOctreeTraits, Octree, OctreeNode, OctreeQueryTraits, OctreeTraits, OctantMask,
    };
    pub use crate::config::{Config, ConfigError, OctreeConfig};
    pub use crate::error::GeometryError;
}
