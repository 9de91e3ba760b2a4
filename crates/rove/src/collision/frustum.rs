//! View frustum for visibility culling

use super::{Plane, PlaneSide};
use crate::foundation::math::{Mat4, Vec3, Vec4};
use crate::volumes::{Aabb, Obb, Sphere};

/// Frustum bounded by six inward-facing planes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frustum {
    /// Six planes defining the frustum (left, right, top, bottom, near, far)
    pub planes: [Plane; 6],
}

impl Frustum {
    /// Index of the left plane
    pub const LEFT: usize = 0;
    /// Index of the right plane
    pub const RIGHT: usize = 1;
    /// Index of the top plane
    pub const TOP: usize = 2;
    /// Index of the bottom plane
    pub const BOTTOM: usize = 3;
    /// Index of the near plane
    pub const NEAR: usize = 4;
    /// Index of the far plane
    pub const FAR: usize = 5;

    /// Create a frustum from six planes
    pub const fn new(planes: [Plane; 6]) -> Self {
        Self { planes }
    }

    /// Extract frustum planes from a view-projection matrix
    ///
    /// Gribb-Hartmann extraction for column-vector matrices whose clip
    /// volume is `-w <= x, y <= w` and `0 <= z <= w`, which is what
    /// [`crate::foundation::math::Mat4Ext`] builds.
    pub fn from_matrix(matrix: &Mat4) -> Self {
        let row = |i: usize| Vec4::new(matrix[(i, 0)], matrix[(i, 1)], matrix[(i, 2)], matrix[(i, 3)]);
        let plane = |v: Vec4| Plane::new(Vec3::new(v.x, v.y, v.z), v.w);

        let (x, y, z, w) = (row(0), row(1), row(2), row(3));
        Self {
            planes: [
                plane(w + x),
                plane(w - x),
                plane(w - y),
                plane(w + y),
                plane(z),
                plane(w - z),
            ],
        }
    }

    /// Point on the inside of every plane
    pub fn contains_point(&self, point: &Vec3) -> bool {
        self.planes
            .iter()
            .all(|plane| plane.classify_point(point) != PlaneSide::Negative)
    }

    /// Check if an AABB is inside or intersects the frustum
    ///
    /// Conservative: boxes near a frustum corner may be reported as
    /// intersecting while lying just outside.
    pub fn intersects_aabb(&self, aabb: &Aabb) -> bool {
        self.planes
            .iter()
            .all(|plane| plane.classify_aabb(aabb) != PlaneSide::Negative)
    }

    /// Same test for an oriented box
    pub fn intersects_obb(&self, obb: &Obb) -> bool {
        self.planes
            .iter()
            .all(|plane| plane.classify_obb(obb) != PlaneSide::Negative)
    }

    /// Same test for a sphere
    pub fn intersects_sphere(&self, sphere: &Sphere) -> bool {
        self.planes
            .iter()
            .all(|plane| plane.classify_sphere(sphere) != PlaneSide::Negative)
    }
}
