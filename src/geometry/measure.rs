//! Distance, area and angle calculations shared by the algorithms
//!
//! Degenerate input (zero-length segments, coincident neighbours) never
//! produces NaN: the helpers fall back to point distances or zero.

use super::buffer::CoordinateBuffer;
use super::types::Point;

/// Segments shorter than this (squared) are treated as points
const DEGENERATE_LEN_SQ: f64 = 0.0;

/// Squared distance from `p` to the segment `a`-`b`
pub fn segment_distance_sq(p: Point, a: Point, b: Point) -> f64 {
    let ab = [b.x - a.x, b.y - a.y];
    let ab_len2 = ab[0] * ab[0] + ab[1] * ab[1];

    if ab_len2 <= DEGENERATE_LEN_SQ {
        // Degenerate segment
        return p.distance_sq(a);
    }

    let t = (((p.x - a.x) * ab[0] + (p.y - a.y) * ab[1]) / ab_len2).clamp(0.0, 1.0);
    let closest = Point::new(a.x + t * ab[0], a.y + t * ab[1]);
    p.distance_sq(closest)
}

/// Unsigned area of the triangle `a`, `b`, `c`
#[inline]
pub fn triangle_area(a: Point, b: Point, c: Point) -> f64 {
    ((b.x - a.x) * (c.y - a.y) - (c.x - a.x) * (b.y - a.y)).abs() * 0.5
}

/// Cosine of the interior angle at `vertex` between its two neighbours
///
/// Returns 0 when either neighbour coincides with the vertex.
pub fn corner_cos(prev: Point, vertex: Point, next: Point) -> f64 {
    let ax = prev.x - vertex.x;
    let ay = prev.y - vertex.y;
    let bx = next.x - vertex.x;
    let by = next.y - vertex.y;
    let denom = ((ax * ax + ay * ay) * (bx * bx + by * by)).sqrt();
    if denom == 0.0 {
        return 0.0;
    }
    ((ax * bx + ay * by) / denom).clamp(-1.0, 1.0)
}

/// Total length of a coordinate sequence
pub fn line_length(coords: &CoordinateBuffer) -> f64 {
    let mut length = 0.0;
    for i in 1..coords.len() {
        length += coords.point(i - 1).distance(coords.point(i));
    }
    length
}

/// Length of a slice of points
pub fn points_length(points: &[Point]) -> f64 {
    points.windows(2).map(|w| w[0].distance(w[1])).sum()
}

/// Signed shoelace area of a ring (positive when counter-clockwise)
pub fn signed_ring_area(ring: &CoordinateBuffer) -> f64 {
    let n = ring.len();
    if n < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for i in 0..n {
        let a = ring.point(i);
        let b = ring.point((i + 1) % n);
        sum += a.x * b.y - b.x * a.y;
    }
    sum * 0.5
}
