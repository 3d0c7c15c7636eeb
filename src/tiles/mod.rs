//! Tile addressing
//!
//! # Submodules
//! - `hilbert` - Hilbert curve index <-> cell conversion
//! - `coord` - Tile coordinate with packed and Hilbert encodings

mod coord;
pub mod hilbert;

pub use coord::{TileCoord, MAX_ZOOM};
pub use hilbert::{index_to_xy, xy_to_index, MAX_LEVEL};
