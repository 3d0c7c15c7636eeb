//! Error types for tile geometry processing
//!
//! Every failure a caller can observe is a variant here. `kind()` separates
//! bad caller input from internal invariant violations so a batch driver can
//! count and skip features without aborting the whole run.

use thiserror::Error;

/// Broad classification used by batch drivers for error accounting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The caller passed something malformed
    InvalidInput,
    /// An algorithm reached a state that should be impossible
    Internal,
}

/// Main error type for geometry operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    #[error("expected a line string, got {0}")]
    NotALine(&'static str),

    #[error("invalid range: {start} to {end}")]
    InvalidRange { start: f64, end: f64 },

    #[error("invalid tile coordinate: {z}/{x}/{y}")]
    InvalidTile { x: u32, y: u32, z: u32 },

    #[error("invalid hilbert level {level} for value {value}")]
    InvalidLevel { level: u32, value: u64 },

    #[error("invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("cannot join edges {first} and {second} at node {node}: no shared endpoint")]
    DisconnectedEdges {
        node: usize,
        first: usize,
        second: usize,
    },
}

impl GeometryError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GeometryError::DisconnectedEdges { .. } => ErrorKind::Internal,
            _ => ErrorKind::InvalidInput,
        }
    }
}

/// Result type alias for geometry operations
pub type Result<T> = std::result::Result<T, GeometryError>;
