//! Geometry module for tile generation
//!
//! This module provides the coordinate primitives every algorithm works on.
//!
//! # Submodules
//! - `types` - Point, Topology tag, Geometry enum
//! - `buffer` - Reusable interleaved coordinate buffer
//! - `measure` - Distance, area and angle helpers

mod buffer;
mod measure;
mod types;

pub use types::{Geometry, Point, Polygon, Topology};

pub use buffer::CoordinateBuffer;

pub use measure::{
    corner_cos,
    line_length,
    points_length,
    segment_distance_sq,
    signed_ring_area,
    triangle_area,
};
