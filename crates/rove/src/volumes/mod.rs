//! Bounding volumes
//!
//! Every volume can report an enclosing [`Aabb`], which is what the octree
//! classifies against.

mod aabb;
mod obb;
mod sphere;
mod capsule;

pub use aabb::Aabb;
pub use obb::Obb;
pub use sphere::{PointHits, Sphere};
pub use capsule::Capsule;
