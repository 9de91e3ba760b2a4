//! Octant ("subcluster") indexing
//!
//! An octant index is a 3-bit mask: bit 0 selects the upper half along x,
//! bit 1 along y, bit 2 along z. Classification is relative to a node
//! centre; points lying exactly on a splitting plane go to the upper half.

use bitflags::bitflags;

use crate::foundation::math::Vec3;
use crate::volumes::Aabb;

/// Number of octants per node
pub const SUBCLUSTERS_COUNT: usize = 8;

/// Octant bit for the upper half along x
pub const X_MASK: usize = 1;

/// Octant bit for the upper half along y
pub const Y_MASK: usize = 2;

/// Octant bit for the upper half along z
pub const Z_MASK: usize = 4;

const AXIS_MASKS: [usize; 3] = [X_MASK, Y_MASK, Z_MASK];

bitflags! {
    /// Set of octants, bit `i` standing for octant `i`
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct OctantMask: u8 {
        /// Octant 0 (-x, -y, -z)
        const OCTANT_0 = 1 << 0;
        /// Octant 1 (+x, -y, -z)
        const OCTANT_1 = 1 << 1;
        /// Octant 2 (-x, +y, -z)
        const OCTANT_2 = 1 << 2;
        /// Octant 3 (+x, +y, -z)
        const OCTANT_3 = 1 << 3;
        /// Octant 4 (-x, -y, +z)
        const OCTANT_4 = 1 << 4;
        /// Octant 5 (+x, -y, +z)
        const OCTANT_5 = 1 << 5;
        /// Octant 6 (-x, +y, +z)
        const OCTANT_6 = 1 << 6;
        /// Octant 7 (+x, +y, +z)
        const OCTANT_7 = 1 << 7;
    }
}

impl OctantMask {
    /// Mask holding a single octant; indices past 7 give an empty mask
    pub fn from_index(index: usize) -> Self {
        u32::try_from(index)
            .ok()
            .and_then(|shift| 1_u8.checked_shl(shift))
            .map_or_else(Self::empty, Self::from_bits_truncate)
    }

    /// Octant indices in ascending order
    pub fn indices(self) -> impl Iterator<Item = usize> {
        (0..SUBCLUSTERS_COUNT).filter(move |&index| self.contains(Self::from_index(index)))
    }
}

/// Octants touched by a box, as returned by [`subclusters_by_aabb`]
///
/// Holds 1, 2, 4 or 8 distinct indices when the box is valid (`lo <= hi`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Subclusters {
    indices: [usize; SUBCLUSTERS_COUNT],
    len: usize,
}

impl Subclusters {
    fn one(code: usize) -> Self {
        let mut indices = [0; SUBCLUSTERS_COUNT];
        indices[0] = code;
        Self { indices, len: 1 }
    }

    fn all() -> Self {
        Self {
            indices: [0, 1, 2, 3, 4, 5, 6, 7],
            len: SUBCLUSTERS_COUNT,
        }
    }

    fn from_slice(codes: &[usize]) -> Self {
        let mut indices = [0; SUBCLUSTERS_COUNT];
        indices[..codes.len()].copy_from_slice(codes);
        Self {
            indices,
            len: codes.len(),
        }
    }

    /// Octant indices
    pub fn as_slice(&self) -> &[usize] {
        &self.indices[..self.len]
    }

    /// Number of octants
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Never true for a classification result
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Iterate over the octant indices
    pub fn iter(&self) -> std::slice::Iter<'_, usize> {
        self.as_slice().iter()
    }

    /// Union as a bit mask
    pub fn mask(&self) -> OctantMask {
        self.iter()
            .fold(OctantMask::empty(), |mask, &index| mask | OctantMask::from_index(index))
    }
}

impl<'a> IntoIterator for &'a Subclusters {
    type Item = &'a usize;
    type IntoIter = std::slice::Iter<'a, usize>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Bounds of octant `index` of `bounds`
///
/// Only the low three bits of `index` are used.
pub fn subcluster_bounds(bounds: &Aabb, index: usize) -> Aabb {
    let extents = bounds.diagonal() * 0.5;
    let mut origin = bounds.lo;
    for (axis, mask) in AXIS_MASKS.iter().enumerate() {
        if index & mask != 0 {
            origin[axis] += extents[axis];
        }
    }
    Aabb::new(origin, origin + extents)
}

/// Octant of `point` relative to `center`
pub fn subcluster_by_point(center: &Vec3, point: &Vec3) -> usize {
    AXIS_MASKS
        .iter()
        .enumerate()
        .filter(|&(axis, _)| point[axis] >= center[axis])
        .fold(0, |code, (_, mask)| code | mask)
}

/// Octants overlapped by `bounds` relative to `center`
///
/// Classifies the two corners and enumerates the block of octants between
/// them: one when they agree, two when they differ on one axis, four on two
/// axes and all eight on three.
///
/// `bounds` must satisfy `lo <= hi`; an inverted box can repeat indices.
pub fn subclusters_by_aabb(center: &Vec3, bounds: &Aabb) -> Subclusters {
    let c1 = subcluster_by_point(center, &bounds.lo);
    let c2 = subcluster_by_point(center, &bounds.hi);

    if c1 == c2 {
        return Subclusters::one(c1);
    }
    if c1 == 0 && c2 == SUBCLUSTERS_COUNT - 1 {
        return Subclusters::all();
    }

    let diff = c1 ^ c2;
    let hi_bit = diff & (diff - 1);
    let lo_bit = diff & !hi_bit;

    if hi_bit != 0 {
        Subclusters::from_slice(&[c1, c1 | lo_bit, c1 | hi_bit, c2])
    } else {
        Subclusters::from_slice(&[c1, c2])
    }
}

/// Bit mask form of [`subclusters_by_aabb`]
pub fn subclusters_mask_by_aabb(center: &Vec3, bounds: &Aabb) -> OctantMask {
    subclusters_by_aabb(center, bounds).mask()
}
