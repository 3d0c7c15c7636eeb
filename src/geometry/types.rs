//! Core geometry types for tile generation
//!
//! This module contains the primitives the algorithms operate on: points,
//! the ring/open topology tag, and a minimal geometry enum that lets
//! collaborators hand whole features to the core.

use serde::{Deserialize, Serialize};

use super::buffer::CoordinateBuffer;

/// A 2D point in planar units (world or tile pixel space)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Linear interpolation from `self` toward `other`
    #[inline]
    pub fn lerp(self, other: Point, ratio: f64) -> Point {
        Point {
            x: self.x + (other.x - self.x) * ratio,
            y: self.y + (other.y - self.y) * ratio,
        }
    }

    #[inline]
    pub fn distance_sq(self, other: Point) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        dx * dx + dy * dy
    }

    #[inline]
    pub fn distance(self, other: Point) -> f64 {
        self.distance_sq(other).sqrt()
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Point { x, y }
    }
}

/// Whether a coordinate sequence is an open line or a closed ring
///
/// Passed explicitly through every algorithm instead of inspecting the
/// enclosing geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Topology {
    #[default]
    Open,
    Ring,
}

impl Topology {
    /// Fewest points a simplified sequence may keep
    pub fn min_points(self) -> usize {
        match self {
            Topology::Open => 2,
            Topology::Ring => 4,
        }
    }
}

/// Polygon with an exterior ring and optional holes
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    pub exterior: CoordinateBuffer,
    pub interiors: Vec<CoordinateBuffer>,
}

/// Feature geometry as handed over by the parsing collaborators
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Point(Point),
    LineString(CoordinateBuffer),
    Polygon(Polygon),
    MultiLineString(Vec<CoordinateBuffer>),
    MultiPolygon(Vec<Polygon>),
}

impl Geometry {
    /// Geometry type name, used in error messages
    pub fn kind(&self) -> &'static str {
        match self {
            Geometry::Point(_) => "Point",
            Geometry::LineString(_) => "LineString",
            Geometry::Polygon(_) => "Polygon",
            Geometry::MultiLineString(_) => "MultiLineString",
            Geometry::MultiPolygon(_) => "MultiPolygon",
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Geometry::Point(_) => false,
            Geometry::LineString(line) => line.is_empty(),
            Geometry::Polygon(polygon) => polygon.exterior.is_empty(),
            Geometry::MultiLineString(lines) => lines.iter().all(|l| l.is_empty()),
            Geometry::MultiPolygon(polygons) => polygons.iter().all(|p| p.exterior.is_empty()),
        }
    }

    /// Visit every coordinate sequence with its topology tag
    pub fn for_each_sequence<F>(&self, mut f: F)
    where
        F: FnMut(&CoordinateBuffer, Topology),
    {
        match self {
            Geometry::Point(_) => {}
            Geometry::LineString(line) => f(line, Topology::Open),
            Geometry::Polygon(polygon) => visit_polygon(polygon, &mut f),
            Geometry::MultiLineString(lines) => {
                for line in lines {
                    f(line, Topology::Open);
                }
            }
            Geometry::MultiPolygon(polygons) => {
                for polygon in polygons {
                    visit_polygon(polygon, &mut f);
                }
            }
        }
    }

    /// Transform every coordinate sequence, tagging rings and open lines
    ///
    /// Rings that end up with fewer than 4 points are dropped; a polygon whose
    /// exterior collapses becomes empty and is dropped from multipolygons.
    pub fn map_sequences<F>(&self, mut f: F) -> Geometry
    where
        F: FnMut(&CoordinateBuffer, Topology) -> CoordinateBuffer,
    {
        match self {
            Geometry::Point(p) => Geometry::Point(*p),
            Geometry::LineString(line) => Geometry::LineString(f(line, Topology::Open)),
            Geometry::Polygon(polygon) => Geometry::Polygon(
                map_polygon(polygon, &mut f).unwrap_or_else(|| Polygon {
                    exterior: CoordinateBuffer::new(),
                    interiors: Vec::new(),
                }),
            ),
            Geometry::MultiLineString(lines) => Geometry::MultiLineString(
                lines.iter().map(|line| f(line, Topology::Open)).collect(),
            ),
            Geometry::MultiPolygon(polygons) => Geometry::MultiPolygon(
                polygons
                    .iter()
                    .filter_map(|polygon| map_polygon(polygon, &mut f))
                    .collect(),
            ),
        }
    }
}

fn visit_polygon<F>(polygon: &Polygon, f: &mut F)
where
    F: FnMut(&CoordinateBuffer, Topology),
{
    f(&polygon.exterior, Topology::Ring);
    for hole in &polygon.interiors {
        f(hole, Topology::Ring);
    }
}

fn map_polygon<F>(polygon: &Polygon, f: &mut F) -> Option<Polygon>
where
    F: FnMut(&CoordinateBuffer, Topology) -> CoordinateBuffer,
{
    let exterior = f(&polygon.exterior, Topology::Ring);
    if exterior.len() < Topology::Ring.min_points() {
        return None;
    }
    let interiors = polygon
        .interiors
        .iter()
        .map(|ring| f(ring, Topology::Ring))
        .filter(|ring| ring.len() >= Topology::Ring.min_points()) // Must remain valid ring
        .collect();
    Some(Polygon { exterior, interiors })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(size: f64) -> CoordinateBuffer {
        CoordinateBuffer::from_points(&[
            Point::new(0.0, 0.0),
            Point::new(size, 0.0),
            Point::new(size, size),
            Point::new(0.0, size),
            Point::new(0.0, 0.0),
        ])
    }

    #[test]
    fn test_for_each_sequence_tags_rings() {
        let geom = Geometry::Polygon(Polygon {
            exterior: square(10.0),
            interiors: vec![square(1.0)],
        });
        let mut tags = Vec::new();
        geom.for_each_sequence(|_, topology| tags.push(topology));
        assert_eq!(tags, vec![Topology::Ring, Topology::Ring]);
    }

    #[test]
    fn test_map_sequences_drops_collapsed_holes() {
        let geom = Geometry::Polygon(Polygon {
            exterior: square(10.0),
            interiors: vec![square(1.0)],
        });
        let mapped = geom.map_sequences(|seq, _| {
            if seq.len() == 5 && seq.x(1) < 5.0 {
                // collapse the hole to a degenerate line
                CoordinateBuffer::from_points(&[Point::new(0.0, 0.0), Point::new(0.0, 0.0)])
            } else {
                seq.clone()
            }
        });
        match mapped {
            Geometry::Polygon(p) => {
                assert_eq!(p.exterior.len(), 5);
                assert!(p.interiors.is_empty());
            }
            other => panic!("unexpected geometry {}", other.kind()),
        }
    }

    #[test]
    fn test_lerp() {
        let p = Point::new(0.0, 0.0).lerp(Point::new(10.0, 4.0), 0.25);
        assert_eq!(p, Point::new(2.5, 1.0));
    }
}
