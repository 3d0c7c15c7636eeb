//! Sub-line extraction by arc-length fraction
//!
//! Labels and dash patterns ask for the same portions of a line many times,
//! so the extractor builds the cumulative length table once and caches every
//! range it has produced.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{GeometryError, Result};
use crate::geometry::{CoordinateBuffer, Geometry, Point};

/// Cache key: exact bit patterns of (start, end)
type RangeKey = (u64, u64);

pub struct LineRangeExtractor {
    line: Arc<CoordinateBuffer>,
    /// cumulative[i] is the length from the first point to point i
    cumulative: Option<Vec<f64>>,
    cache: HashMap<RangeKey, Arc<CoordinateBuffer>>,
}

impl LineRangeExtractor {
    /// Extractor over a line string; any other geometry is rejected
    pub fn new(geom: &Geometry) -> Result<Self> {
        match geom {
            Geometry::LineString(line) => Ok(Self::from_line(Arc::new(line.clone()))),
            other => Err(GeometryError::NotALine(other.kind())),
        }
    }

    pub fn from_line(line: Arc<CoordinateBuffer>) -> Self {
        Self {
            line,
            cumulative: None,
            cache: HashMap::new(),
        }
    }

    pub fn line(&self) -> &Arc<CoordinateBuffer> {
        &self.line
    }

    pub fn length(&mut self) -> f64 {
        self.cumulative().last().copied().unwrap_or(0.0)
    }

    /// Number of cached ranges
    pub fn cached(&self) -> usize {
        self.cache.len()
    }

    /// Portion of the line between fractions `start` and `end` of its length
    ///
    /// Both fractions must lie in [0, 1] with `start <= end`. The full range
    /// returns the original line; every other range is computed once and the
    /// same `Arc` is handed out for later requests.
    pub fn get(&mut self, start: f64, end: f64) -> Result<Arc<CoordinateBuffer>> {
        if !(0.0..=1.0).contains(&start) || !(0.0..=1.0).contains(&end) || end < start {
            return Err(GeometryError::InvalidRange { start, end });
        }
        if start == 0.0 && end == 1.0 {
            return Ok(Arc::clone(&self.line));
        }

        let key = (start.to_bits(), end.to_bits());
        if let Some(hit) = self.cache.get(&key) {
            return Ok(Arc::clone(hit));
        }

        let range = Arc::new(self.extract(start, end));
        self.cache.insert(key, Arc::clone(&range));
        Ok(range)
    }

    fn cumulative(&mut self) -> &[f64] {
        let line = &self.line;
        self.cumulative.get_or_insert_with(|| cumulative_lengths(line))
    }

    fn extract(&mut self, start: f64, end: f64) -> CoordinateBuffer {
        let line = &self.line;
        if line.len() < 2 {
            return (**line).clone();
        }
        let cumulative = self.cumulative.get_or_insert_with(|| cumulative_lengths(line));

        let total = cumulative[line.len() - 1];
        let start_dist = start * total;
        let end_dist = end * total;

        let mut result = CoordinateBuffer::new();
        result.push(locate(line, cumulative, start_dist));
        for (i, &dist) in cumulative.iter().enumerate() {
            if dist > start_dist && dist < end_dist {
                result.push(line.point(i));
            }
        }
        result.push(locate(line, cumulative, end_dist));
        result
    }
}

/// Arc length from the first vertex to every vertex
fn cumulative_lengths(line: &CoordinateBuffer) -> Vec<f64> {
    let mut table = Vec::with_capacity(line.len());
    let mut total = 0.0;
    for i in 0..line.len() {
        if i > 0 {
            total += line.point(i - 1).distance(line.point(i));
        }
        table.push(total);
    }
    table
}

/// Point at arc-length `dist` along `line`
fn locate(line: &CoordinateBuffer, cumulative: &[f64], dist: f64) -> Point {
    let n = line.len();
    let seg = cumulative
        .partition_point(|&c| c <= dist)
        .saturating_sub(1)
        .min(n - 2);
    let seg_len = cumulative[seg + 1] - cumulative[seg];
    if seg_len <= 0.0 {
        return line.point(seg);
    }
    let t = (dist - cumulative[seg]) / seg_len;
    if t <= 0.0 {
        line.point(seg)
    } else if t >= 1.0 {
        line.point(seg + 1)
    } else {
        line.point(seg).lerp(line.point(seg + 1), t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn l_shape() -> Geometry {
        // length 20: 10 along x, then 10 along y
        Geometry::LineString(CoordinateBuffer::from(vec![(0.0, 0.0), (10.0, 0.0), (10.0, 10.0)]))
    }

    #[test]
    fn test_rejects_non_lines() {
        let point = Geometry::Point(Point::new(1.0, 2.0));
        assert_eq!(
            LineRangeExtractor::new(&point).err(),
            Some(GeometryError::NotALine("Point"))
        );
    }

    #[test]
    fn test_rejects_bad_ranges() {
        let mut extractor = LineRangeExtractor::new(&l_shape()).unwrap();
        assert!(matches!(extractor.get(0.6, 0.4), Err(GeometryError::InvalidRange { .. })));
        assert!(extractor.get(-0.1, 0.5).is_err());
        assert!(extractor.get(0.5, 1.1).is_err());
        assert!(extractor.get(f64::NAN, 0.5).is_err());
    }

    #[test]
    fn test_full_range_is_original() {
        let mut extractor = LineRangeExtractor::new(&l_shape()).unwrap();
        let full = extractor.get(0.0, 1.0).unwrap();
        assert!(Arc::ptr_eq(&full, extractor.line()));
        assert_eq!(extractor.cached(), 0);
    }

    #[test]
    fn test_interpolates_boundaries_and_copies_vertices() {
        let mut extractor = LineRangeExtractor::new(&l_shape()).unwrap();
        let range = extractor.get(0.25, 0.75).unwrap();
        assert_eq!(range.to_points(), vec![
            Point::new(5.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 5.0),
        ]);
        assert_eq!(extractor.length(), 20.0);
    }

    #[test]
    fn test_repeated_request_is_cached() {
        let mut extractor = LineRangeExtractor::new(&l_shape()).unwrap();
        let first = extractor.get(0.1, 0.3).unwrap();
        let second = extractor.get(0.1, 0.3).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(extractor.cached(), 1);
    }

    #[test]
    fn test_length_table_built_once() {
        let mut extractor = LineRangeExtractor::new(&l_shape()).unwrap();
        extractor.get(0.1, 0.3).unwrap();
        let table = extractor.cumulative.as_ref().map(|t| t.as_ptr());
        assert!(table.is_some());
        extractor.get(0.2, 0.9).unwrap();
        extractor.length();
        assert_eq!(extractor.cumulative.as_ref().map(|t| t.as_ptr()), table);
    }

    #[test]
    fn test_zero_length_segment() {
        let line = Geometry::LineString(CoordinateBuffer::from(vec![
            (0.0, 0.0),
            (0.0, 0.0),
            (4.0, 0.0),
        ]));
        let mut extractor = LineRangeExtractor::new(&line).unwrap();
        let range = extractor.get(0.0, 0.5).unwrap();
        assert_eq!(range.to_points(), vec![Point::new(0.0, 0.0), Point::new(2.0, 0.0)]);
    }
}
