//! Static octree and the octant indexing it is built on
//!
//! The octree is generic over the stored primitive, the payload returned by
//! queries and a traits policy providing bounds and intersection tests.
//! Octant indices are 3-bit masks: bit 0 selects the upper half on x, bit 1
//! on y and bit 2 on z.

pub mod subcluster;
mod traits;
mod octree;

pub use subcluster::{
    subcluster_bounds, subcluster_by_point, subclusters_by_aabb, subclusters_mask_by_aabb,
    OctantMask, Subclusters, SUBCLUSTERS_COUNT, X_MASK, Y_MASK, Z_MASK,
};
pub use traits::{DefaultOctreeTraits, OctreeQueryTraits, OctreeTraits};
pub use octree::{Octree, OctreeItem, OctreeNode};
