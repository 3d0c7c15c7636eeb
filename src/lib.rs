//! Geometry processing for map tile generation
//!
//! Simplifies and smooths lines and polygon rings, extracts sub-lines by
//! length fraction, cleans up line networks, and addresses tiles with packed
//! and Hilbert-ordered integer keys.
//!
//! # Modules
//! - `geometry` - Points, coordinate buffers, the geometry enum and measurements
//! - `simplify` - Douglas-Peucker and Visvalingam-Whyatt
//! - `smooth` - Corner cutting and edge interpolation smoothing
//! - `lines` - Cached sub-line extraction
//! - `network` - Network merge, loop and stub removal
//! - `tiles` - Tile coordinates and the Hilbert curve
//! - `config` - Serde-backed processing configuration
//! - `pipeline` - Parallel batch drivers
//! - `error` - Error type and classification

pub mod config;
pub mod error;
pub mod geometry;
pub mod lines;
pub mod network;
pub mod pipeline;
pub mod simplify;
pub mod smooth;
pub mod tiles;

pub use config::TileGeometryConfig;
pub use error::{ErrorKind, GeometryError, Result};
pub use geometry::{CoordinateBuffer, Geometry, Point, Polygon, Topology};
pub use lines::LineRangeExtractor;
pub use network::NetworkLoopMerger;
pub use simplify::{douglas_peucker, visvalingam_whyatt, VisvalingamSimplifier};
pub use smooth::{CornerSmoother, EdgeInterpolationSmoother};
pub use tiles::TileCoord;
