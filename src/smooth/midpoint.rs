//! Fixed-arity edge interpolation smoother
//!
//! Replaces every edge with `N` points at ratios `(2k + 1) / (2N)`. One point
//! per edge gives midpoint smoothing, two gives Chaikin.

use crate::geometry::{CoordinateBuffer, Topology};

#[derive(Debug, Clone, PartialEq)]
pub struct EdgeInterpolationSmoother {
    ratios: Vec<f64>,
    iterations: usize,
    keep_endpoints: bool,
}

impl EdgeInterpolationSmoother {
    /// `points_per_edge` of zero is treated as one
    pub fn new(points_per_edge: usize) -> Self {
        let n = points_per_edge.max(1);
        let ratios = (0..n).map(|k| (2 * k + 1) as f64 / (2 * n) as f64).collect();
        Self {
            ratios,
            iterations: 1,
            keep_endpoints: true,
        }
    }

    pub fn midpoint() -> Self {
        Self::new(1)
    }

    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    /// Whether open lines keep their original first and last point
    pub fn with_line_endpoints(mut self, keep: bool) -> Self {
        self.keep_endpoints = keep;
        self
    }

    pub fn ratios(&self) -> &[f64] {
        &self.ratios
    }

    pub fn smooth(&self, coords: &CoordinateBuffer, topology: Topology) -> CoordinateBuffer {
        let min = match topology {
            Topology::Open => 2,
            Topology::Ring => 4,
        };
        let mut current = coords.clone();
        for _ in 0..self.iterations {
            if current.len() < min {
                break;
            }
            current = self.smooth_once(&current, topology);
        }
        current
    }

    fn smooth_once(&self, coords: &CoordinateBuffer, topology: Topology) -> CoordinateBuffer {
        let n = coords.len();
        let keep_endpoints = self.keep_endpoints && topology == Topology::Open;
        let mut out = CoordinateBuffer::with_capacity(n * self.ratios.len() + 2);

        if keep_endpoints {
            out.push(coords.point(0));
        }
        for i in 1..n {
            let a = coords.point(i - 1);
            let b = coords.point(i);
            for &ratio in &self.ratios {
                out.push(a.lerp(b, ratio));
            }
        }
        if keep_endpoints {
            out.push(coords.point(n - 1));
        }
        if topology == Topology::Ring {
            out.close_ring();
        }
        out
    }
}
