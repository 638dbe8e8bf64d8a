//! Coordinate to octant-path addressing
//!
//! A depth `D` octree addresses `[-2^D, 2^D - 1]` on every axis. Coordinates
//! are shifted into `[0, 2^(D+1))` and Morton-interleaved, giving `D + 1`
//! octant digits: `D` branch digits followed by one leaf-slot digit. Within a
//! digit, bit 0 is x, bit 1 is y and bit 2 is z.

use glam::IVec3;

use crate::math::morton::{decode_morton_3d_wide, encode_morton_3d_wide};

/// Depth used by `Octree::new`
pub const DEFAULT_DEPTH: u32 = 16;
/// Shallowest octree: a root branch directly above its leaves
pub const MIN_DEPTH: u32 = 1;
/// Deepest octree: covers every `i32` coordinate
pub const MAX_DEPTH: u32 = 31;

/// Smallest addressable coordinate on each axis
pub fn min_incl(depth: u32) -> i32 {
    debug_assert!(depth <= MAX_DEPTH);
    (-(1i64 << depth)) as i32
}

/// Largest addressable coordinate on each axis
pub fn max_incl(depth: u32) -> i32 {
    debug_assert!(depth <= MAX_DEPTH);
    ((1i64 << depth) - 1) as i32
}

/// Magnitude with negatives mirrored about the boundary, so that
/// `[-2^D, 2^D - 1]` maps onto `[0, 2^D)`.
pub fn mirrored_magnitude(x: i32) -> u32 {
    if x < 0 { !x as u32 } else { x as u32 }
}

/// Returns 0 if `pos` is addressable at `depth`, otherwise the largest
/// mirrored magnitude across the three axes.
pub fn bounds_test(pos: IVec3, depth: u32) -> u32 {
    let max = mirrored_magnitude(pos.x)
        .max(mirrored_magnitude(pos.y))
        .max(mirrored_magnitude(pos.z));
    if (max as u64) >= (1u64 << depth) { max } else { 0 }
}

/// Smallest valid depth whose range holds a mirrored magnitude
pub fn required_depth(magnitude: u32) -> u32 {
    (u32::BITS - magnitude.leading_zeros()).max(MIN_DEPTH)
}

/// Octant path of one voxel: `depth` branch digits plus the leaf slot digit
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct OctantPath {
    bits: u128,
    depth: u32,
}

impl OctantPath {
    /// Raw Morton bits, `3 * (depth + 1)` wide
    pub fn bits(&self) -> u128 {
        self.bits
    }

    /// Number of branch levels this path crosses
    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Digit at `level`; level 0 selects a child of the root,
    /// level `depth` selects the leaf slot.
    pub fn digit(&self, level: u32) -> u8 {
        debug_assert!(level <= self.depth);
        let shift = 3 * (self.depth - level);
        ((self.bits >> shift) & 0b111) as u8
    }

    /// Branch digits from the root down
    pub fn branch_digits(&self) -> impl Iterator<Item = u8> + '_ {
        (0..self.depth).map(|level| self.digit(level))
    }

    /// Slot within the leaf
    pub fn leaf_slot(&self) -> u8 {
        (self.bits & 0b111) as u8
    }

    /// Rebuild a path from its branch digits and leaf slot
    pub fn from_digits(branch_digits: &[u8], leaf_slot: u8) -> Self {
        let bits = branch_digits
            .iter()
            .chain(std::iter::once(&leaf_slot))
            .fold(0u128, |acc, &d| (acc << 3) | (d & 0b111) as u128);
        Self { bits, depth: branch_digits.len() as u32 }
    }
}

/// Path for `pos` at `depth`. `pos` must satisfy `bounds_test(pos, depth) == 0`.
pub fn index_of(pos: IVec3, depth: u32) -> OctantPath {
    debug_assert_eq!(bounds_test(pos, depth), 0);
    let offset = 1i64 << depth;
    let shift = |c: i32| (c as i64 + offset) as u32;
    OctantPath {
        bits: encode_morton_3d_wide(shift(pos.x), shift(pos.y), shift(pos.z)),
        depth,
    }
}

/// Inverse of `index_of`
pub fn position_of(path: OctantPath) -> IVec3 {
    let (x, y, z) = decode_morton_3d_wide(path.bits);
    let offset = 1i64 << path.depth;
    let unshift = |u: u32| (u as i64 - offset) as i32;
    IVec3::new(unshift(x), unshift(y), unshift(z))
}
