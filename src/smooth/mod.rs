//! Smoothing module
//!
//! # Submodules
//! - `corner` - Corner cutting with per-corner area and offset caps
//! - `midpoint` - Fixed points-per-edge interpolation

mod corner;
mod midpoint;

pub use corner::CornerSmoother;
pub use midpoint::EdgeInterpolationSmoother;
