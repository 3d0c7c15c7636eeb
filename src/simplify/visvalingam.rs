//! Visvalingam-Whyatt simplification
//!
//! Repeatedly drops the vertex with the smallest effective area (the
//! triangle it forms with its current neighbours) until every remaining
//! vertex is above the area tolerance or the minimum vertex count is
//! reached. Vertices live in an arena linked by index; priorities live in an
//! [`IndexedMinHeap`] so neighbour areas can be updated in place after each
//! removal.

use crate::geometry::{corner_cos, triangle_area, CoordinateBuffer, Geometry, Point, Topology};

use super::heap::IndexedMinHeap;

/// Vertex in the arena-backed doubly linked list
#[derive(Debug, Clone, Copy)]
struct Vertex {
    point: Point,
    area: f64,
    prev: Option<usize>,
    next: Option<usize>,
}

/// Visvalingam-Whyatt simplifier with optional angle weighting
#[derive(Debug, Clone, Copy, Default)]
pub struct VisvalingamSimplifier {
    tolerance: f64,
    weight: f64,
}

impl VisvalingamSimplifier {
    pub fn new(tolerance: f64) -> Self {
        Self {
            tolerance,
            weight: 0.0,
        }
    }

    /// Scale effective areas by `1 - k * cos(angle)`
    ///
    /// With `k > 0` near-straight vertices gain weight and sharp spikes lose
    /// it; `k < 0` does the opposite and keeps spikes alive.
    pub fn with_weight(mut self, k: f64) -> Self {
        self.weight = k;
        self
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    pub fn simplify(&self, coords: &CoordinateBuffer, topology: Topology) -> CoordinateBuffer {
        let n = coords.len();
        let min_points = topology.min_points();
        if n <= min_points {
            return coords.clone();
        }

        let mut vertices: Vec<Vertex> = (0..n)
            .map(|i| Vertex {
                point: coords.point(i),
                area: f64::INFINITY,
                prev: if i > 0 { Some(i - 1) } else { None },
                next: if i + 1 < n { Some(i + 1) } else { None },
            })
            .collect();

        let mut heap = IndexedMinHeap::with_capacity(n);
        for i in 0..n {
            let area = self.effective_area(&vertices, i);
            vertices[i].area = area;
            heap.push(i, area);
        }

        let mut remaining = n;
        while let Some(idx) = heap.poll() {
            let v = vertices[idx];
            // endpoints carry infinite area and are never removed
            if v.area > self.tolerance || remaining <= min_points || v.prev.is_none() || v.next.is_none() {
                break;
            }

            // unlink
            let Vertex { prev, next, .. } = v;
            if let Some(p) = prev {
                vertices[p].next = next;
            }
            if let Some(nx) = next {
                vertices[nx].prev = prev;
            }
            remaining -= 1;

            for neighbour in [prev, next].into_iter().flatten() {
                let area = self.effective_area(&vertices, neighbour);
                vertices[neighbour].area = area;
                heap.update(neighbour, area);
            }
        }

        let mut result = CoordinateBuffer::with_capacity(remaining);
        let mut cursor = Some(0);
        while let Some(i) = cursor {
            result.force_add_point(vertices[i].point.x, vertices[i].point.y);
            cursor = vertices[i].next;
        }
        result
    }

    fn effective_area(&self, vertices: &[Vertex], idx: usize) -> f64 {
        let v = &vertices[idx];
        let (prev, next) = match (v.prev, v.next) {
            (Some(p), Some(n)) => (vertices[p].point, vertices[n].point),
            _ => return f64::INFINITY,
        };
        let area = triangle_area(prev, v.point, next);
        if self.weight == 0.0 {
            return area;
        }
        let cos = corner_cos(prev, v.point, next);
        area * (1.0 - self.weight * cos).max(0.0)
    }
}

/// Visvalingam-Whyatt simplification of a single sequence
pub fn visvalingam_whyatt(coords: &CoordinateBuffer, tolerance: f64, topology: Topology) -> CoordinateBuffer {
    VisvalingamSimplifier::new(tolerance).simplify(coords, topology)
}

/// Visvalingam-Whyatt over every line and ring of a geometry
pub fn simplify_vw(geom: &Geometry, simplifier: &VisvalingamSimplifier) -> Geometry {
    geom.map_sequences(|coords, topology| simplifier.simplify(coords, topology))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square_ring() -> CoordinateBuffer {
        CoordinateBuffer::from(vec![(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0), (0.0, 0.0)])
    }

    #[test]
    fn test_removes_smallest_area_first() {
        let line = CoordinateBuffer::from(vec![
            (0.0, 0.0),
            (1.0, 0.1),  // area 0.1
            (2.0, 0.0),
            (3.0, 2.0),  // large spike
            (4.0, 0.0),
        ]);
        let simplified = visvalingam_whyatt(&line, 2.0, Topology::Open);
        assert_eq!(simplified.to_points(), vec![
            Point::new(0.0, 0.0),
            Point::new(3.0, 2.0),
            Point::new(4.0, 0.0),
        ]);
    }

    #[test]
    fn test_square_ring_stops_at_four_points() {
        let ring = square_ring();
        let simplified = visvalingam_whyatt(&ring, 51.0, Topology::Ring);
        assert_eq!(simplified.len(), 4);
        assert_eq!(simplified.first(), simplified.last());

        let untouched = visvalingam_whyatt(&ring, 49.0, Topology::Ring);
        assert_eq!(untouched, ring);
    }

    #[test]
    fn test_open_line_keeps_endpoints() {
        let line = CoordinateBuffer::from(vec![(0.0, 0.0), (1.0, 1.0), (2.0, 0.0), (3.0, 1.0)]);
        let simplified = visvalingam_whyatt(&line, f64::MAX, Topology::Open);
        assert_eq!(simplified.to_points(), vec![Point::new(0.0, 0.0), Point::new(3.0, 1.0)]);
    }

    #[test]
    fn test_short_input_unchanged() {
        let line = CoordinateBuffer::from(vec![(0.0, 0.0), (1.0, 1.0)]);
        assert_eq!(visvalingam_whyatt(&line, 100.0, Topology::Open), line);
    }

    #[test]
    fn test_angle_weight_changes_priority() {
        // a narrow spike and a shallow bump with the same raw area
        let line = CoordinateBuffer::from(vec![
            (0.0, 0.0),
            (1.0, 4.0),  // spike, area 4
            (2.0, 0.0),
            (6.0, 1.0),  // shallow bump, area 4
            (10.0, 0.0),
        ]);
        let plain = visvalingam_whyatt(&line, 4.0, Topology::Open);
        assert_eq!(plain.len(), 3);

        // negative weight shrinks near-straight corners and grows spikes
        let keep_spikes = VisvalingamSimplifier::new(4.0).with_weight(-0.5).simplify(&line, Topology::Open);
        assert!(keep_spikes.iter().any(|p| p == Point::new(1.0, 4.0)));
        assert!(!keep_spikes.iter().any(|p| p == Point::new(6.0, 1.0)));
    }

    #[test]
    fn test_monotonic_in_tolerance() {
        let line: CoordinateBuffer = (0..50)
            .map(|i| {
                let x = i as f64;
                Point::new(x, (x * 0.7).sin() * (1.0 + (i % 7) as f64))
            })
            .collect();
        let mut last_len = usize::MAX;
        for tolerance in [0.0, 0.1, 0.5, 1.0, 2.0, 5.0, 10.0, 100.0] {
            let len = visvalingam_whyatt(&line, tolerance, Topology::Open).len();
            assert!(len <= last_len, "tolerance {} produced {} > {}", tolerance, len, last_len);
            assert!(len >= 2);
            last_len = len;
        }
    }
}
