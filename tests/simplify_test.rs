// Simplification properties over the public API
use tile_geometry::geometry::{signed_ring_area, CoordinateBuffer, Geometry, Point, Polygon, Topology};
use tile_geometry::simplify::{douglas_peucker, simplify_dp, simplify_vw, visvalingam_whyatt, VisvalingamSimplifier};

#[cfg(test)]
mod tests {
    use super::*;

    fn wave(n: usize) -> CoordinateBuffer {
        (0..n)
            .map(|i| {
                let x = i as f64 * 0.5;
                Point::new(x, (x * 1.3).sin() * 3.0 + (x * 0.2).cos())
            })
            .collect()
    }

    fn square_ring() -> CoordinateBuffer {
        CoordinateBuffer::from(vec![(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0), (0.0, 0.0)])
    }

    fn circle_ring(n: usize, radius: f64) -> CoordinateBuffer {
        let mut ring: CoordinateBuffer = (0..n)
            .map(|i| {
                let t = i as f64 / n as f64 * std::f64::consts::TAU;
                Point::new(radius * t.cos(), radius * t.sin())
            })
            .collect();
        ring.close_ring();
        ring
    }

    #[test]
    fn test_dp_keeps_endpoints_and_shrinks() {
        let line = wave(200);
        for tolerance in [0.0, 0.05, 0.5, 2.0, 50.0] {
            let simplified = douglas_peucker(&line, tolerance, Topology::Open);
            assert!(simplified.len() <= line.len(), "tolerance {} grew the line", tolerance);
            assert!(simplified.len() >= 2);
            assert_eq!(simplified.first(), line.first());
            assert_eq!(simplified.last(), line.last());
        }
    }

    #[test]
    fn test_dp_negative_tolerance_is_copy() {
        let line = wave(50);
        assert_eq!(douglas_peucker(&line, -0.5, Topology::Open), line);
    }

    #[test]
    fn test_dp_is_idempotent() {
        let line = wave(200);
        for tolerance in [0.1, 0.7, 3.0] {
            let once = douglas_peucker(&line, tolerance, Topology::Open);
            let twice = douglas_peucker(&once, tolerance, Topology::Open);
            assert_eq!(once, twice, "tolerance {} is not idempotent", tolerance);
        }
    }

    #[test]
    fn test_dp_rings_keep_four_points() {
        let ring = circle_ring(64, 5.0);
        for tolerance in [0.1, 1.0, 10.0, 1000.0] {
            let simplified = douglas_peucker(&ring, tolerance, Topology::Ring);
            assert!(simplified.len() >= 4, "tolerance {} left {} points", tolerance, simplified.len());
            assert!(simplified.is_closed());
        }
    }

    #[test]
    fn test_square_ring_fixtures() {
        let ring = square_ring();
        assert_eq!(douglas_peucker(&ring, 1.0, Topology::Ring).len(), 5);

        // every corner has area 50; above that only the ring minimum is left
        let simplified = visvalingam_whyatt(&ring, 50.5, Topology::Ring);
        assert_eq!(simplified.len(), 4);
    }

    #[test]
    fn test_vw_monotonic_and_bounded() {
        let line = wave(300);
        let ring = circle_ring(100, 20.0);
        let mut last_line = usize::MAX;
        let mut last_ring = usize::MAX;
        for tolerance in [0.0, 0.01, 0.1, 1.0, 5.0, 25.0, 1e6] {
            let l = visvalingam_whyatt(&line, tolerance, Topology::Open).len();
            let r = visvalingam_whyatt(&ring, tolerance, Topology::Ring).len();
            assert!(l <= last_line && r <= last_ring, "tolerance {} grew the output", tolerance);
            assert!(l >= 2 && r >= 4);
            last_line = l;
            last_ring = r;
        }
    }

    #[test]
    fn test_vw_weighted_stays_bounded() {
        let line = wave(120);
        for weight in [-1.0, -0.3, 0.5, 2.0] {
            let simplifier = VisvalingamSimplifier::new(0.5).with_weight(weight);
            let simplified = simplifier.simplify(&line, Topology::Open);
            assert!(simplified.len() >= 2 && simplified.len() <= line.len());
            assert_eq!(simplified.first(), line.first());
            assert_eq!(simplified.last(), line.last());
        }
    }

    #[test]
    fn test_geometry_dispatch_drops_collapsed_holes() {
        let polygon = Geometry::Polygon(Polygon {
            exterior: circle_ring(32, 100.0),
            interiors: vec![circle_ring(16, 0.5)],
        });
        let Geometry::Polygon(simplified) = simplify_vw(&polygon, &VisvalingamSimplifier::new(10.0)) else {
            panic!("polygon stayed a polygon");
        };
        // the hole keeps its four-point minimum
        assert_eq!(simplified.interiors.len(), 1);
        assert_eq!(simplified.interiors[0].len(), 4);

        let Geometry::Polygon(dp) = simplify_dp(&polygon, 1.0) else {
            panic!("polygon stayed a polygon");
        };
        let before = signed_ring_area(&circle_ring(32, 100.0));
        let after = signed_ring_area(&dp.exterior);
        assert!(after > 0.0 && after <= before);
    }
}
