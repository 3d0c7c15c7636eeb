//! Line network module
//!
//! # Submodules
//! - `graph` - Arena graph over grid-snapped nodes
//! - `merger` - Network build, degree-2 merge and cleanup phases

mod graph;
mod merger;

pub use graph::{Edge, EdgeId, Graph, GridKey, Node, NodeId};
pub use merger::NetworkLoopMerger;
