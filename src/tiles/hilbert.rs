//! Hilbert curve over a 2^L x 2^L grid
//!
//! Branch-free conversion using bit interleaving and parallel prefix scans
//! over 16-bit lanes, so every level up to 16 fits in `u32` arithmetic.

use crate::error::{GeometryError, Result};

/// Deepest supported level (grid of 65536 x 65536)
pub const MAX_LEVEL: u32 = 16;

/// Spread the low 16 bits of `x` to the even bit positions
#[inline]
fn interleave(mut x: u32) -> u32 {
    x = (x | (x << 8)) & 0x00FF_00FF;
    x = (x | (x << 4)) & 0x0F0F_0F0F;
    x = (x | (x << 2)) & 0x3333_3333;
    x = (x | (x << 1)) & 0x5555_5555;
    x
}

/// Gather the even bit positions of `x` into the low 16 bits
#[inline]
fn deinterleave(mut x: u32) -> u32 {
    x &= 0x5555_5555;
    x = (x | (x >> 1)) & 0x3333_3333;
    x = (x | (x >> 2)) & 0x0F0F_0F0F;
    x = (x | (x >> 4)) & 0x00FF_00FF;
    x = (x | (x >> 8)) & 0x0000_FFFF;
    x
}

/// Prefix XOR from the high bit down
#[inline]
fn prefix_scan(mut x: u32) -> u32 {
    x ^= x >> 8;
    x ^= x >> 4;
    x ^= x >> 2;
    x ^= x >> 1;
    x
}

fn check_level(level: u32, value: u64) -> Result<()> {
    if level > MAX_LEVEL {
        return Err(GeometryError::InvalidLevel { level, value });
    }
    Ok(())
}

/// Position of cell (`x`, `y`) along the level-`level` curve
pub fn xy_to_index(level: u32, x: u32, y: u32) -> Result<u64> {
    check_level(level, u64::from(x.max(y)))?;
    let side = 1u64 << level;
    if u64::from(x) >= side || u64::from(y) >= side {
        return Err(GeometryError::InvalidLevel {
            level,
            value: u64::from(x.max(y)),
        });
    }
    Ok(xy_to_index_unchecked(level, x, y))
}

/// `xy_to_index` for a level and cell already known to be in range
pub(crate) fn xy_to_index_unchecked(level: u32, x: u32, y: u32) -> u64 {
    if level == 0 {
        return 0;
    }

    let x = x << (16 - level);
    let y = y << (16 - level);

    let (mut a_, mut b_, mut c_, mut d_) = {
        let a = x ^ y;
        let b = 0xFFFF ^ a;
        let c = 0xFFFF ^ (x | y);
        let d = x & (y ^ 0xFFFF);
        (
            a | (b >> 1),
            (a >> 1) ^ a,
            ((c >> 1) ^ (b & (d >> 1))) ^ c,
            ((a & (c >> 1)) ^ (d >> 1)) ^ d,
        )
    };
    for shift in [2, 4] {
        let (a, b, c, d) = (a_, b_, c_, d_);
        a_ = (a & (a >> shift)) ^ (b & (b >> shift));
        b_ = (a & (b >> shift)) ^ (b & ((a ^ b) >> shift));
        c_ ^= (a & (c >> shift)) ^ (b & (d >> shift));
        d_ ^= (b & (c >> shift)) ^ ((a ^ b) & (d >> shift));
    }
    {
        let (a, b, c, d) = (a_, b_, c_, d_);
        c_ ^= (a & (c >> 8)) ^ (b & (d >> 8));
        d_ ^= (b & (c >> 8)) ^ ((a ^ b) & (d >> 8));
    }

    let a = c_ ^ (c_ >> 1);
    let b = d_ ^ (d_ >> 1);
    let i0 = x ^ y;
    let i1 = b | (0xFFFF ^ (i0 | a));
    let index = ((interleave(i1) << 1) | interleave(i0)) >> (32 - 2 * level);
    u64::from(index)
}

/// Cell at position `index` along the level-`level` curve
pub fn index_to_xy(level: u32, index: u64) -> Result<(u32, u32)> {
    check_level(level, index)?;
    if index >= 1u64 << (2 * level) {
        return Err(GeometryError::InvalidLevel { level, value: index });
    }
    if level == 0 {
        return Ok((0, 0));
    }

    // fits: index < 4^level <= 2^32
    let i = (index as u32) << (32 - 2 * level);
    let i0 = deinterleave(i);
    let i1 = deinterleave(i >> 1);

    let t0 = (i0 | i1) ^ 0xFFFF;
    let t1 = i0 & i1;
    let p0 = prefix_scan(t0);
    let p1 = prefix_scan(t1);
    let a = ((i0 ^ 0xFFFF) & p1) | (i0 & p0);

    let x = ((a ^ i1) & 0xFFFF) >> (16 - level);
    let y = ((a ^ i0 ^ i1) & 0xFFFF) >> (16 - level);
    Ok((x, y))
}
