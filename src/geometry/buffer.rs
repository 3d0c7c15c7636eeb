//! Growable coordinate buffer
//!
//! Points are stored interleaved (`x0, y0, x1, y1, ...`) in a single
//! `Vec<f64>` so algorithms can reuse one allocation per feature instead of
//! allocating per point.

use super::types::Point;

/// Affine scaling applied to every point on insertion
#[derive(Debug, Clone, Copy, PartialEq)]
struct Scaling {
    offset_x: f64,
    offset_y: f64,
    scale: f64,
}

/// Growable, randomly indexable (x, y) sequence
#[derive(Debug, Clone, Default)]
pub struct CoordinateBuffer {
    coords: Vec<f64>,
    scaling: Option<Scaling>,
}

impl PartialEq for CoordinateBuffer {
    fn eq(&self, other: &Self) -> bool {
        self.coords == other.coords
    }
}

impl CoordinateBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(points: usize) -> Self {
        Self {
            coords: Vec::with_capacity(points * 2),
            scaling: None,
        }
    }

    /// Buffer that maps every added point to `((x - offset_x) * scale, (y - offset_y) * scale)`
    ///
    /// Used to move world coordinates into tile pixel space while copying.
    pub fn scaling(offset_x: f64, offset_y: f64, scale: f64) -> Self {
        Self {
            coords: Vec::new(),
            scaling: Some(Scaling {
                offset_x,
                offset_y,
                scale,
            }),
        }
    }

    pub fn from_points(points: &[Point]) -> Self {
        let mut buffer = Self::with_capacity(points.len());
        for p in points {
            buffer.force_add_point(p.x, p.y);
        }
        buffer
    }

    /// Build from raw interleaved coordinates; a trailing odd value is ignored
    pub fn from_interleaved(coords: Vec<f64>) -> Self {
        let mut coords = coords;
        if coords.len() % 2 == 1 {
            coords.pop();
        }
        Self {
            coords,
            scaling: None,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.coords.len() / 2
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }

    #[inline]
    pub fn x(&self, index: usize) -> f64 {
        self.coords[index * 2]
    }

    #[inline]
    pub fn y(&self, index: usize) -> f64 {
        self.coords[index * 2 + 1]
    }

    #[inline]
    pub fn point(&self, index: usize) -> Point {
        Point {
            x: self.x(index),
            y: self.y(index),
        }
    }

    pub fn first(&self) -> Option<Point> {
        if self.is_empty() {
            None
        } else {
            Some(self.point(0))
        }
    }

    pub fn last(&self) -> Option<Point> {
        if self.is_empty() {
            None
        } else {
            Some(self.point(self.len() - 1))
        }
    }

    /// Append a point unless it equals the last one
    pub fn add_point(&mut self, x: f64, y: f64) -> bool {
        let (x, y) = self.transform(x, y);
        let n = self.coords.len();
        if n >= 2 && self.coords[n - 2] == x && self.coords[n - 1] == y {
            return false;
        }
        self.coords.push(x);
        self.coords.push(y);
        true
    }

    /// Append a point even if it repeats the last one
    pub fn force_add_point(&mut self, x: f64, y: f64) {
        let (x, y) = self.transform(x, y);
        self.coords.push(x);
        self.coords.push(y);
    }

    #[inline]
    pub fn push(&mut self, p: Point) -> bool {
        self.add_point(p.x, p.y)
    }

    /// Append the first point if the sequence is not already closed
    ///
    /// A single point is left alone; it cannot form a ring.
    pub fn close_ring(&mut self) {
        if self.len() < 2 {
            return;
        }
        if let Some(first) = self.first() {
            if !self.is_closed() {
                // first point is already transformed, bypass the scaling
                self.coords.push(first.x);
                self.coords.push(first.y);
            }
        }
    }

    pub fn is_closed(&self) -> bool {
        match (self.first(), self.last()) {
            (Some(first), Some(last)) => self.len() > 1 && first == last,
            _ => false,
        }
    }

    /// Reset length to zero, keeping the allocation
    pub fn clear(&mut self) {
        self.coords.clear();
    }

    pub fn reverse(&mut self) {
        let n = self.len();
        for i in 0..n / 2 {
            let j = n - 1 - i;
            self.coords.swap(i * 2, j * 2);
            self.coords.swap(i * 2 + 1, j * 2 + 1);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = Point> + '_ {
        self.coords
            .chunks_exact(2)
            .map(|c| Point { x: c[0], y: c[1] })
    }

    pub fn to_points(&self) -> Vec<Point> {
        self.iter().collect()
    }

    /// Raw interleaved coordinate slice
    pub fn as_slice(&self) -> &[f64] {
        &self.coords
    }

    #[inline]
    fn transform(&self, x: f64, y: f64) -> (f64, f64) {
        match self.scaling {
            Some(s) => ((x - s.offset_x) * s.scale, (y - s.offset_y) * s.scale),
            None => (x, y),
        }
    }
}

impl FromIterator<Point> for CoordinateBuffer {
    fn from_iter<I: IntoIterator<Item = Point>>(iter: I) -> Self {
        let mut buffer = CoordinateBuffer::new();
        for p in iter {
            buffer.force_add_point(p.x, p.y);
        }
        buffer
    }
}

impl From<Vec<(f64, f64)>> for CoordinateBuffer {
    fn from(points: Vec<(f64, f64)>) -> Self {
        points.into_iter().map(Point::from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_point_skips_duplicates() {
        let mut buffer = CoordinateBuffer::new();
        assert!(buffer.add_point(1.0, 2.0));
        assert!(!buffer.add_point(1.0, 2.0));
        buffer.force_add_point(1.0, 2.0);
        assert_eq!(buffer.len(), 2);
    }

    #[test]
    fn test_close_ring() {
        let mut buffer = CoordinateBuffer::from(vec![(0.0, 0.0), (1.0, 0.0), (1.0, 1.0)]);
        assert!(!buffer.is_closed());
        buffer.close_ring();
        assert!(buffer.is_closed());
        assert_eq!(buffer.len(), 4);
        buffer.close_ring();
        assert_eq!(buffer.len(), 4);
    }

    #[test]
    fn test_scaling_applies_on_insert() {
        let mut buffer = CoordinateBuffer::scaling(10.0, 20.0, 256.0);
        buffer.add_point(10.5, 20.25);
        assert_eq!(buffer.point(0), Point::new(128.0, 64.0));
        buffer.close_ring();
        assert_eq!(buffer.len(), 1);
        assert!(!buffer.is_closed());
    }

    #[test]
    fn test_close_ring_needs_two_points() {
        let mut buffer = CoordinateBuffer::new();
        buffer.close_ring();
        assert!(buffer.is_empty());

        buffer.add_point(3.0, 4.0);
        buffer.close_ring();
        assert_eq!(buffer.to_points(), vec![Point::new(3.0, 4.0)]);

        buffer.add_point(5.0, 4.0);
        buffer.close_ring();
        assert_eq!(buffer.len(), 3);
        assert!(buffer.is_closed());
    }

    #[test]
    fn test_reverse() {
        let mut buffer = CoordinateBuffer::from(vec![(0.0, 0.0), (1.0, 0.0), (2.0, 5.0)]);
        buffer.reverse();
        assert_eq!(buffer.to_points(), vec![
            Point::new(2.0, 5.0),
            Point::new(1.0, 0.0),
            Point::new(0.0, 0.0),
        ]);
    }

    #[test]
    fn test_clear_keeps_capacity() {
        let mut buffer = CoordinateBuffer::with_capacity(16);
        buffer.add_point(1.0, 1.0);
        buffer.clear();
        assert!(buffer.is_empty());
        assert!(buffer.as_slice().is_empty());
    }
}
