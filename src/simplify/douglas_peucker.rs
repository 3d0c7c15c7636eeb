//! Douglas-Peucker simplification
//!
//! Removes points whose squared distance to the chord between the retained
//! neighbours stays within the tolerance. Rings force the first two split
//! levels so they keep at least two interior points and never collapse to a
//! line.

use crate::geometry::{segment_distance_sq, CoordinateBuffer, Geometry, Topology};

/// Split levels forced for rings regardless of tolerance
const RING_FORCED_SPLITS: u32 = 2;

/// Douglas-Peucker simplification of a single coordinate sequence
///
/// `tolerance` is a distance; it is compared against squared distances as
/// `tolerance * |tolerance|`. Empty input and negative or NaN tolerances
/// return an unmodified copy; an infinite tolerance keeps only what the
/// endpoints and ring minimum require. First and last points are always kept.
pub fn douglas_peucker(coords: &CoordinateBuffer, tolerance: f64, topology: Topology) -> CoordinateBuffer {
    let n = coords.len();
    if n < 3 || tolerance < 0.0 || tolerance.is_nan() {
        return coords.clone();
    }

    let sq_tolerance = tolerance * tolerance.abs();
    let forced = match topology {
        Topology::Ring => RING_FORCED_SPLITS,
        Topology::Open => 0,
    };

    let mut kept = vec![false; n];
    kept[0] = true;
    kept[n - 1] = true;

    // (first, last, forced splits remaining)
    let mut stack = vec![(0usize, n - 1, forced)];
    while let Some((first, last, forced)) = stack.pop() {
        let force = forced > 0;
        let mut max_sq_dist = if force { -1.0 } else { sq_tolerance };
        let mut index = None;

        let a = coords.point(first);
        let b = coords.point(last);
        for i in (first + 1)..last {
            let d = segment_distance_sq(coords.point(i), a, b);
            if d > max_sq_dist {
                max_sq_dist = d;
                index = Some(i);
            }
        }

        // index is only set when the max exceeds tolerance or the split is forced
        if let Some(index) = index {
            kept[index] = true;
            let forced = forced.saturating_sub(1);
            if last - index > 1 {
                stack.push((index, last, forced));
            }
            if index - first > 1 {
                stack.push((first, index, forced));
            }
        }
    }

    let mut result = CoordinateBuffer::with_capacity(kept.iter().filter(|&&k| k).count());
    for (i, _) in kept.iter().enumerate().filter(|(_, &k)| k) {
        result.force_add_point(coords.x(i), coords.y(i));
    }
    result
}

/// Douglas-Peucker over every line and ring of a geometry
pub fn simplify_dp(geom: &Geometry, tolerance: f64) -> Geometry {
    geom.map_sequences(|coords, topology| douglas_peucker(coords, tolerance, topology))
}
