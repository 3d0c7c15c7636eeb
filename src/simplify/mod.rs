//! Simplification module
//!
//! Point-reduction algorithms that keep the visual shape of lines and rings.
//!
//! # Submodules
//! - `heap` - Indexed decrease-key min-heap used by Visvalingam-Whyatt
//! - `douglas_peucker` - Max-deviation point removal
//! - `visvalingam` - Min-effective-area point removal

mod douglas_peucker;
mod heap;
mod visvalingam;

pub use heap::IndexedMinHeap;

pub use douglas_peucker::{
    douglas_peucker,
    simplify_dp,
};

pub use visvalingam::{
    simplify_vw,
    visvalingam_whyatt,
    VisvalingamSimplifier,
};
