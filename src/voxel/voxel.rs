//! Voxel color record

use bytemuck::{Pod, Zeroable};
use rkyv::{Archive, Deserialize, Serialize};

/// Number of 32-bit words a voxel occupies in a flattened buffer
pub const VOXEL_WORDS: usize = 4;

/// Single voxel color - 4 bytes, one byte per channel
///
/// The all-zero value marks an unset leaf slot.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Pod, Zeroable, Archive, Deserialize, Serialize)]
pub struct Voxel {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Voxel {
    /// Unset voxel
    pub const EMPTY: Voxel = Voxel { r: 0, g: 0, b: 0, a: 0 };

    /// Create voxel from RGBA channels
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Create an opaque voxel from RGB channels
    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    /// Check if voxel is unset
    pub fn is_empty(&self) -> bool {
        *self == Self::EMPTY
    }

    /// Channels widened to one word each, in r, g, b, a order
    pub fn to_words(self) -> [u32; VOXEL_WORDS] {
        [self.r as u32, self.g as u32, self.b as u32, self.a as u32]
    }

    /// Rebuild a voxel from its four channel words.
    /// Returns None if any word is wider than a byte.
    pub fn from_words(words: [u32; VOXEL_WORDS]) -> Option<Self> {
        let [r, g, b, a] = words;
        Some(Self::new(
            u8::try_from(r).ok()?,
            u8::try_from(g).ok()?,
            u8::try_from(b).ok()?,
            u8::try_from(a).ok()?,
        ))
    }
}

impl From<[u8; 4]> for Voxel {
    fn from([r, g, b, a]: [u8; 4]) -> Self {
        Self::new(r, g, b, a)
    }
}
