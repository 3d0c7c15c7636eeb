//! Processing configuration
//!
//! Every field has a default so a config file only needs to name what it
//! changes. Distances are in the units of the geometry being processed,
//! usually tile pixels.

use std::fs;
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::error::{GeometryError, Result};
use crate::network::NetworkLoopMerger;
use crate::simplify::VisvalingamSimplifier;
use crate::smooth::CornerSmoother;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimplifyMethod {
    #[default]
    DouglasPeucker,
    Visvalingam,
    /// Leave geometry untouched
    Off,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimplifyConfig {
    pub method: SimplifyMethod,
    /// Distance for Douglas-Peucker, area for Visvalingam-Whyatt
    pub tolerance: f64,
    /// Visvalingam-Whyatt angle weight `k` in `area * (1 - k * cos)`
    pub angle_weight: f64,
}

impl Default for SimplifyConfig {
    fn default() -> Self {
        Self {
            method: SimplifyMethod::DouglasPeucker,
            tolerance: 0.25, // quarter pixel
            angle_weight: 0.0,
        }
    }
}

impl SimplifyConfig {
    pub fn visvalingam(&self) -> VisvalingamSimplifier {
        VisvalingamSimplifier::new(self.tolerance).with_weight(self.angle_weight)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmoothConfig {
    pub enabled: bool,
    pub a: f64,
    pub b: f64,
    pub iterations: usize,
    pub min_vertex_area: f64,
    pub min_vertex_offset: f64,
    pub max_area: Option<f64>,
    pub max_offset: Option<f64>,
}

impl Default for SmoothConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            a: 0.25,
            b: 0.75,
            iterations: 1,
            min_vertex_area: 0.0,
            min_vertex_offset: 0.0,
            max_area: None,
            max_offset: None,
        }
    }
}

impl SmoothConfig {
    pub fn smoother(&self) -> Result<CornerSmoother> {
        let mut smoother = CornerSmoother::new(self.a, self.b)?
            .with_iterations(self.iterations)
            .with_min_vertex_area(self.min_vertex_area)
            .with_min_vertex_offset(self.min_vertex_offset);
        if let Some(area) = self.max_area {
            smoother = smoother.with_max_area(area);
        }
        if let Some(offset) = self.max_offset {
            smoother = smoother.with_max_offset(offset);
        }
        Ok(smoother)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeConfig {
    /// Grid cells per unit for endpoint snapping
    pub precision: f64,
    pub min_length: f64,
    pub loop_min_length: f64,
    pub stub_min_length: f64,
    pub tolerance: f64,
    pub merge_strokes: bool,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            precision: 16.0,
            min_length: 0.0,
            loop_min_length: 0.0,
            stub_min_length: 0.0,
            tolerance: 0.0,
            merge_strokes: false,
        }
    }
}

impl MergeConfig {
    /// Empty merger carrying these settings
    pub fn merger(&self) -> NetworkLoopMerger {
        NetworkLoopMerger::new()
            .with_precision(self.precision)
            .with_min_length(self.min_length)
            .with_loop_min_length(self.loop_min_length)
            .with_stub_min_length(self.stub_min_length)
            .with_tolerance(self.tolerance)
            .with_merge_strokes(self.merge_strokes)
    }
}

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TileGeometryConfig {
    pub simplify: SimplifyConfig,
    pub smooth: SmoothConfig,
    pub merge: MergeConfig,
}

impl TileGeometryConfig {
    /// Parse and validate a JSON config
    pub fn from_json_str(json: &str) -> anyhow::Result<Self> {
        let config: Self = serde_json::from_str(json).context("Failed to parse config JSON")?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        Self::from_json_str(&json).with_context(|| format!("Invalid config {}", path.display()))
    }

    pub fn to_json_string(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        if self.simplify.tolerance.is_nan() {
            return Err(invalid("simplify.tolerance", self.simplify.tolerance, "must be a number"));
        }
        if !(self.merge.precision > 0.0 && self.merge.precision.is_finite()) {
            return Err(invalid("merge.precision", self.merge.precision, "must be a positive finite number"));
        }
        for (name, value) in [
            ("merge.min_length", self.merge.min_length),
            ("merge.loop_min_length", self.merge.loop_min_length),
            ("merge.stub_min_length", self.merge.stub_min_length),
            ("merge.tolerance", self.merge.tolerance),
        ] {
            if value.is_nan() || value < 0.0 {
                return Err(invalid(name, value, "must not be negative"));
            }
        }
        self.smooth.smoother()?;
        Ok(())
    }
}

fn invalid(name: &'static str, value: f64, reason: &str) -> GeometryError {
    GeometryError::InvalidParameter {
        name,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}
