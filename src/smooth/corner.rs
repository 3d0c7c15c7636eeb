//! Corner-cutting smoother
//!
//! Every interior vertex `v` with neighbours `p` and `n` is replaced by two
//! points, `lerp(p, v, b)` and `lerp(v, n, a)`. With `a = 0.25, b = 0.75`
//! this is Chaikin's algorithm. Corners can be skipped when they are already
//! flat enough, and the amount cut from a single corner can be capped by area
//! or by distance from the original vertex.

use crate::error::{GeometryError, Result};
use crate::geometry::{segment_distance_sq, triangle_area, CoordinateBuffer, Point, Topology};

/// Replacement for one vertex in a smoothing pass
enum Corner {
    /// Vertex is copied through unchanged
    Keep(Point),
    /// Vertex is cut into two points
    Cut(Point, Point),
}

/// Iterated corner-cutting smoother
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CornerSmoother {
    a: f64,
    b: f64,
    iterations: usize,
    min_vertex_area: f64,
    min_vertex_offset: f64,
    max_area: Option<f64>,
    max_offset: Option<f64>,
}

impl Default for CornerSmoother {
    fn default() -> Self {
        Self::chaikin(1)
    }
}

impl CornerSmoother {
    /// Smoother with cut ratios `a <= b`, both within [0, 1]
    pub fn new(a: f64, b: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&a) {
            return Err(GeometryError::InvalidParameter {
                name: "a",
                value: a.to_string(),
                reason: "must be within [0, 1]".to_string(),
            });
        }
        if !(0.0..=1.0).contains(&b) || b < a {
            return Err(GeometryError::InvalidParameter {
                name: "b",
                value: b.to_string(),
                reason: format!("must be within [{}, 1]", a),
            });
        }
        Ok(Self {
            a,
            b,
            iterations: 1,
            min_vertex_area: 0.0,
            min_vertex_offset: 0.0,
            max_area: None,
            max_offset: None,
        })
    }

    /// Classic Chaikin smoothing (`a = 0.25`, `b = 0.75`)
    pub fn chaikin(iterations: usize) -> Self {
        Self {
            a: 0.25,
            b: 0.75,
            iterations,
            min_vertex_area: 0.0,
            min_vertex_offset: 0.0,
            max_area: None,
            max_offset: None,
        }
    }

    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    /// Leave corners whose triangle area is below `area` untouched
    pub fn with_min_vertex_area(mut self, area: f64) -> Self {
        self.min_vertex_area = area;
        self
    }

    /// Leave corners closer than `offset` to the chord of their neighbours untouched
    pub fn with_min_vertex_offset(mut self, offset: f64) -> Self {
        self.min_vertex_offset = offset;
        self
    }

    /// Cap the area removed from a single corner
    pub fn with_max_area(mut self, area: f64) -> Self {
        self.max_area = Some(area.max(0.0));
        self
    }

    /// Cap the distance between a vertex and the chord that replaces it
    pub fn with_max_offset(mut self, offset: f64) -> Self {
        self.max_offset = Some(offset.max(0.0));
        self
    }

    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Smooth a line or ring
    ///
    /// Open lines keep their first and last point. Rings wrap around the
    /// closing point and are closed again after every pass.
    pub fn smooth(&self, coords: &CoordinateBuffer, topology: Topology) -> CoordinateBuffer {
        let mut current = coords.clone();
        let mut next = CoordinateBuffer::with_capacity(coords.len() * 2);
        for _ in 0..self.iterations {
            next.clear();
            let changed = match topology {
                Topology::Open => self.smooth_line(&current, &mut next),
                Topology::Ring => self.smooth_ring(&current, &mut next),
            };
            if !changed {
                // nothing was cut, further passes would repeat the same input
                break;
            }
            std::mem::swap(&mut current, &mut next);
        }
        current
    }

    fn smooth_line(&self, coords: &CoordinateBuffer, out: &mut CoordinateBuffer) -> bool {
        let n = coords.len();
        if n < 3 {
            return false;
        }
        let mut changed = false;
        out.push(coords.point(0));
        for i in 1..n - 1 {
            changed |= self.emit(coords.point(i - 1), coords.point(i), coords.point(i + 1), out);
        }
        out.push(coords.point(n - 1));
        changed
    }

    fn smooth_ring(&self, coords: &CoordinateBuffer, out: &mut CoordinateBuffer) -> bool {
        let unique = if coords.is_closed() { coords.len() - 1 } else { coords.len() };
        if unique < 3 {
            return false;
        }
        let mut changed = false;
        for i in 0..unique {
            let prev = coords.point((i + unique - 1) % unique);
            let next = coords.point((i + 1) % unique);
            changed |= self.emit(prev, coords.point(i), next, out);
        }
        out.close_ring();
        changed
    }

    fn emit(&self, prev: Point, vertex: Point, next: Point, out: &mut CoordinateBuffer) -> bool {
        match self.corner(prev, vertex, next) {
            Corner::Keep(p) => {
                out.push(p);
                false
            }
            Corner::Cut(q, r) => {
                out.push(q);
                out.push(r);
                true
            }
        }
    }

    fn corner(&self, prev: Point, vertex: Point, next: Point) -> Corner {
        let area = triangle_area(prev, vertex, next);
        if self.min_vertex_area > 0.0 && area < self.min_vertex_area {
            return Corner::Keep(vertex);
        }
        if self.min_vertex_offset > 0.0
            && segment_distance_sq(vertex, prev, next) < self.min_vertex_offset * self.min_vertex_offset
        {
            return Corner::Keep(vertex);
        }

        // fractions measured from the vertex toward each neighbour
        let mut to_prev = 1.0 - self.b;
        let mut to_next = self.a;

        let mut scale: f64 = 1.0;
        if let Some(max_area) = self.max_area {
            let cut_area = to_prev * to_next * area;
            if cut_area > max_area {
                // area scales with the square of the fractions
                scale = scale.min((max_area / cut_area).sqrt());
            }
        }
        if let Some(max_offset) = self.max_offset {
            let q = vertex.lerp(prev, to_prev);
            let r = vertex.lerp(next, to_next);
            let offset = segment_distance_sq(vertex, q, r).sqrt();
            if offset > max_offset {
                scale = scale.min(max_offset / offset);
            }
        }
        to_prev *= scale;
        to_next *= scale;

        if to_prev == 0.0 && to_next == 0.0 {
            return Corner::Keep(vertex);
        }
        Corner::Cut(vertex.lerp(prev, to_prev), vertex.lerp(next, to_next))
    }
}
