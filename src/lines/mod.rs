//! Line utilities
//!
//! # Submodules
//! - `range` - Cached sub-line extraction by length fraction

mod range;

pub use range::LineRangeExtractor;
