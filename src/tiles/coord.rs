//! Tile coordinates and their packed integer forms
//!
//! A tile packs into one `i32`: a zoom nibble in the top four bits, then x,
//! then the flipped y. The nibble is rotated by 8 so that comparing packed
//! values as signed integers orders tiles by zoom, then x, then descending y.
//! A second form numbers tiles along a Hilbert curve per zoom level, with all
//! tiles of lower zooms counted first.

use std::cmp::Ordering;
use std::fmt;
use std::io::{Read, Write};
use std::str::FromStr;

use anyhow::Context;
use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use serde::{Deserialize, Serialize};

use crate::error::{GeometryError, Result};

use super::hilbert;

/// Deepest zoom that fits the packed layout (14 bits per axis)
pub const MAX_ZOOM: u32 = 14;

const AXIS_BITS: u32 = 14;
const AXIS_MASK: u32 = (1 << AXIS_BITS) - 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawTile")]
pub struct TileCoord {
    x: u32,
    y: u32,
    z: u32,
}

/// Unchecked serialized form, validated through [`TileCoord::of_xyz`]
#[derive(Deserialize)]
struct RawTile {
    x: u32,
    y: u32,
    z: u32,
}

impl TryFrom<RawTile> for TileCoord {
    type Error = GeometryError;

    fn try_from(raw: RawTile) -> Result<Self> {
        Self::of_xyz(raw.x, raw.y, raw.z)
    }
}

/// Number of tiles on every zoom level below `z`
#[inline]
fn tiles_below(z: u32) -> u64 {
    ((1u64 << (2 * z)) - 1) / 3
}

impl TileCoord {
    pub fn of_xyz(x: u32, y: u32, z: u32) -> Result<Self> {
        if z > MAX_ZOOM || x >= 1 << z || y >= 1 << z {
            return Err(GeometryError::InvalidTile { x, y, z });
        }
        Ok(Self { x, y, z })
    }

    #[inline]
    pub fn x(&self) -> u32 {
        self.x
    }

    #[inline]
    pub fn y(&self) -> u32 {
        self.y
    }

    #[inline]
    pub fn z(&self) -> u32 {
        self.z
    }

    /// Packed form; signed ordering is (z asc, x asc, y desc)
    pub fn encoded(&self) -> i32 {
        let nibble = if self.z < 8 { self.z + 8 } else { self.z - 8 };
        let flipped_y = (1 << self.z) - 1 - self.y;
        ((nibble << 28) | (self.x << AXIS_BITS) | flipped_y) as i32
    }

    /// Inverse of [`TileCoord::encoded`]
    pub fn decode(encoded: i32) -> Result<Self> {
        let bits = encoded as u32;
        let nibble = bits >> 28;
        let z = if nibble >= 8 { nibble - 8 } else { nibble + 8 };
        let x = (bits >> AXIS_BITS) & AXIS_MASK;
        let flipped_y = bits & AXIS_MASK;
        if z > MAX_ZOOM || flipped_y >= 1 << z {
            return Err(GeometryError::InvalidTile { x, y: flipped_y, z });
        }
        Self::of_xyz(x, (1 << z) - 1 - flipped_y, z)
    }

    /// Position along the per-zoom Hilbert curve, after all lower zooms
    pub fn hilbert_encoded(&self) -> u64 {
        tiles_below(self.z) + hilbert::xy_to_index_unchecked(self.z, self.x, self.y)
    }

    /// Inverse of [`TileCoord::hilbert_encoded`]
    pub fn decode_hilbert(encoded: u64) -> Result<Self> {
        for z in 0..=MAX_ZOOM {
            if encoded < tiles_below(z + 1) {
                let (x, y) = hilbert::index_to_xy(z, encoded - tiles_below(z))?;
                return Self::of_xyz(x, y, z);
            }
        }
        Err(GeometryError::InvalidLevel {
            level: MAX_ZOOM + 1,
            value: encoded,
        })
    }

    pub fn parent(&self) -> Option<Self> {
        if self.z == 0 {
            return None;
        }
        Some(Self {
            x: self.x / 2,
            y: self.y / 2,
            z: self.z - 1,
        })
    }

    /// The four tiles covering this one at the next zoom
    pub fn children(&self) -> Option<[Self; 4]> {
        if self.z >= MAX_ZOOM {
            return None;
        }
        let (x, y, z) = (self.x * 2, self.y * 2, self.z + 1);
        Some([
            Self { x, y, z },
            Self { x: x + 1, y, z },
            Self { x, y: y + 1, z },
            Self { x: x + 1, y: y + 1, z },
        ])
    }

    /// Write the packed form as a big-endian `i32`
    pub fn write_to<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        writer.write_i32::<BigEndian>(self.encoded())
    }

    pub fn read_from<R: Read>(reader: &mut R) -> anyhow::Result<Self> {
        let encoded = reader
            .read_i32::<BigEndian>()
            .context("Failed to read packed tile coordinate")?;
        Ok(Self::decode(encoded)?)
    }
}

impl Ord for TileCoord {
    fn cmp(&self, other: &Self) -> Ordering {
        self.encoded().cmp(&other.encoded())
    }
}

impl PartialOrd for TileCoord {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for TileCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.z, self.x, self.y)
    }
}

impl FromStr for TileCoord {
    type Err = GeometryError;

    /// Parse `z/x/y`
    fn from_str(s: &str) -> Result<Self> {
        let invalid = |reason: &str| GeometryError::InvalidParameter {
            name: "tile",
            value: s.to_string(),
            reason: reason.to_string(),
        };
        let parts: Vec<&str> = s.trim().split('/').collect();
        if parts.len() != 3 {
            return Err(invalid("expected z/x/y"));
        }
        let mut values = [0u32; 3];
        for (value, part) in values.iter_mut().zip(&parts) {
            *value = part.parse().map_err(|_| invalid("not an unsigned integer"))?;
        }
        let [z, x, y] = values;
        Self::of_xyz(x, y, z)
    }
}
