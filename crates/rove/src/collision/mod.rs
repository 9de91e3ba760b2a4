//! Geometric primitives and intersection tests
//!
//! Rays, segments, planes, triangles and frustums, plus the swept contact
//! queries used for moving spheres. Bounding volumes live in
//! [`crate::volumes`]; their pairwise tests are methods on the types.

mod interval;
mod ray;
mod line;
mod plane;
mod triangle;
mod frustum;
mod contact;

pub use interval::Interval;
pub use ray::Ray;
pub use line::Line;
pub use plane::{Plane, PlaneSide};
pub use triangle::Triangle;
pub use frustum::Frustum;
pub use contact::{
    collide_sphere_line, collide_sphere_obb, collide_sphere_plane, collide_spheres, ContactInfo,
};
