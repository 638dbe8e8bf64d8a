//! Morton encoding (Z-order curve) for octant addressing

/// Spread bits of a 21-bit integer into every third bit of a 64-bit integer
fn spread_bits(x: u32) -> u64 {
    let mut x = x as u64 & 0x1fffff; // 21 bits max
    x = (x | (x << 32)) & 0x1f00000000ffff;
    x = (x | (x << 16)) & 0x1f0000ff0000ff;
    x = (x | (x << 8)) & 0x100f00f00f00f00f;
    x = (x | (x << 4)) & 0x10c30c30c30c30c3;
    x = (x | (x << 2)) & 0x1249249249249249;
    x
}

/// Compact every third bit of a 64-bit integer into a 21-bit integer
fn compact_bits(x: u64) -> u32 {
    let mut x = x & 0x1249249249249249;
    x = (x | (x >> 2)) & 0x10c30c30c30c30c3;
    x = (x | (x >> 4)) & 0x100f00f00f00f00f;
    x = (x | (x >> 8)) & 0x1f0000ff0000ff;
    x = (x | (x >> 16)) & 0x1f00000000ffff;
    x = (x | (x >> 32)) & 0x1fffff;
    x as u32
}

/// Encode 3D coordinates into Morton code (Z-order curve)
/// Each coordinate can be up to 21 bits (0..2097151)
pub fn encode_morton_3d(x: u32, y: u32, z: u32) -> u64 {
    spread_bits(x) | (spread_bits(y) << 1) | (spread_bits(z) << 2)
}

/// Decode Morton code back to 3D coordinates
pub fn decode_morton_3d(code: u64) -> (u32, u32, u32) {
    (
        compact_bits(code),
        compact_bits(code >> 1),
        compact_bits(code >> 2),
    )
}

/// Encode full 32-bit coordinates into a 96-bit Morton code.
///
/// The low and high 16-bit halves are interleaved separately; the high half
/// lands 48 bits up, which is exactly where its digits belong.
pub fn encode_morton_3d_wide(x: u32, y: u32, z: u32) -> u128 {
    let lo = encode_morton_3d(x & 0xffff, y & 0xffff, z & 0xffff);
    let hi = encode_morton_3d(x >> 16, y >> 16, z >> 16);
    (lo as u128) | ((hi as u128) << 48)
}

/// Decode a 96-bit Morton code back to 32-bit coordinates
pub fn decode_morton_3d_wide(code: u128) -> (u32, u32, u32) {
    let (lx, ly, lz) = decode_morton_3d((code & 0xffff_ffff_ffff) as u64);
    let (hx, hy, hz) = decode_morton_3d((code >> 48) as u64);
    (lx | (hx << 16), ly | (hy << 16), lz | (hz << 16))
}
