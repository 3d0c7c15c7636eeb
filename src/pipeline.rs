//! Batch processing over many features
//!
//! Features are independent, so each batch fans out over rayon's thread pool.
//! Network merges can fail per group; failures are logged, counted by kind in
//! a [`BatchReport`] and skipped so one bad group never aborts a tile.

use std::collections::HashMap;
use std::time::Instant;

use log::{info, warn};
use rayon::prelude::*;

use crate::config::{MergeConfig, SimplifyMethod, TileGeometryConfig};
use crate::error::{ErrorKind, Result};
use crate::geometry::{CoordinateBuffer, Geometry};
use crate::simplify::{simplify_dp, simplify_vw};

/// Outcome counts for a batch
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchReport {
    pub succeeded: usize,
    pub failed: usize,
    pub errors_by_kind: HashMap<ErrorKind, usize>,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.succeeded + self.failed
    }

    pub fn errors_of(&self, kind: ErrorKind) -> usize {
        self.errors_by_kind.get(&kind).copied().unwrap_or(0)
    }
}

/// Simplify, then optionally smooth, a single geometry
pub fn process_geometry(geom: &Geometry, config: &TileGeometryConfig) -> Result<Geometry> {
    let simplified = match config.simplify.method {
        SimplifyMethod::DouglasPeucker => simplify_dp(geom, config.simplify.tolerance),
        SimplifyMethod::Visvalingam => simplify_vw(geom, &config.simplify.visvalingam()),
        SimplifyMethod::Off => geom.clone(),
    };
    if !config.smooth.enabled {
        return Ok(simplified);
    }
    let smoother = config.smooth.smoother()?;
    Ok(simplified.map_sequences(|coords, topology| smoother.smooth(coords, topology)))
}

/// Process every feature in parallel; output order matches input order
pub fn process_features(features: &[Geometry], config: &TileGeometryConfig) -> Result<Vec<Geometry>> {
    config.validate()?;
    let start = Instant::now();

    let processed = features
        .par_iter()
        .map(|geom| process_geometry(geom, config))
        .collect::<Result<Vec<_>>>()?;

    info!(
        "[pipeline] processed {} features in {:?}",
        processed.len(),
        start.elapsed()
    );
    Ok(processed)
}

/// Merge each group of lines into a cleaned network, in parallel
///
/// A failed group yields an empty line list at its position.
pub fn merge_networks(groups: &[Vec<Geometry>], config: &MergeConfig) -> (Vec<Vec<CoordinateBuffer>>, BatchReport) {
    let start = Instant::now();

    let results: Vec<Result<Vec<CoordinateBuffer>>> = groups
        .par_iter()
        .map(|group| {
            let mut merger = config.merger();
            for geom in group {
                merger.add(geom);
            }
            merger.merge()
        })
        .collect();

    let mut report = BatchReport::default();
    let mut networks = Vec::with_capacity(results.len());
    for (index, result) in results.into_iter().enumerate() {
        match result {
            Ok(lines) => {
                report.succeeded += 1;
                networks.push(lines);
            }
            Err(e) => {
                warn!("[pipeline] network group {} skipped: {}", index, e);
                report.failed += 1;
                *report.errors_by_kind.entry(e.kind()).or_insert(0) += 1;
                networks.push(Vec::new());
            }
        }
    }

    info!(
        "[pipeline] merged {} network groups ({} failed) in {:?}",
        report.total(),
        report.failed,
        start.elapsed()
    );
    (networks, report)
}
