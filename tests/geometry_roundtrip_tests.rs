//! Geometry fidelity: decode → WKT → parse → encode must reproduce every
//! coordinate within 0.001 linear units, elevation included.

use cadlink::types::Point3;
use cadlink::{
    decode, encode, parse_wkt, to_ewkt, to_wkt, EntityKind, GeometryKind, NativeShape,
};
use proptest::prelude::*;

const TOLERANCE: f64 = 1e-3;

fn assert_points_close(a: &[Point3], b: &[Point3]) {
    assert_eq!(a.len(), b.len(), "vertex counts differ");
    for (p, q) in a.iter().zip(b) {
        assert!(
            p.approx_eq(q, TOLERANCE),
            "{} vs {} beyond tolerance",
            p,
            q
        );
    }
}

#[test]
fn flat_polyline_round_trips_as_3d() {
    // Scenario: a flat 4-vertex polyline at constant Z=0.0 must come back
    // as a 3D polyline with all Z values 0.0, never a 2D polyline.
    let shape = NativeShape::Polyline {
        vertices: vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(50.0, 0.0, 0.0),
            Point3::new(50.0, 30.0, 0.0),
            Point3::new(80.0, 30.0, 0.0),
        ],
        is_closed: false,
    };

    let geometry = decode(&shape).unwrap();
    let wkt = to_wkt(&geometry);
    assert!(wkt.starts_with("LINESTRING Z"), "wkt was {:?}", wkt);

    let parsed = parse_wkt(&wkt).unwrap();
    let back = encode(&parsed, EntityKind::Polyline).unwrap();

    match back {
        NativeShape::Polyline { vertices, is_closed } => {
            assert!(!is_closed);
            assert_eq!(vertices.len(), 4);
            for v in &vertices {
                assert!(v.z.abs() <= 1e-4, "Z drifted to {}", v.z);
            }
        }
        other => panic!("expected 3D polyline, got {:?}", other),
    }
}

#[test]
fn survey_grade_elevations_survive() {
    let shape = NativeShape::Line {
        start: Point3::new(6_431_205.2501, 1_902_334.8125, 101.5324),
        end: Point3::new(6_431_305.7499, 1_902_434.0001, 101.5316),
    };
    let geometry = decode(&shape).unwrap();
    let parsed = parse_wkt(&to_wkt(&geometry)).unwrap();
    // shortest round-trip formatting reproduces the exact doubles
    assert_eq!(parsed.points, geometry.points);
}

#[test]
fn closed_ring_round_trips_as_polygon() {
    let shape = NativeShape::Polyline {
        vertices: vec![
            Point3::new(0.0, 0.0, 12.5),
            Point3::new(100.0, 0.0, 12.5),
            Point3::new(100.0, 100.0, 12.5),
            Point3::new(0.0, 100.0, 12.5),
        ],
        is_closed: true,
    };
    let geometry = decode(&shape).unwrap();
    assert_eq!(geometry.kind, GeometryKind::Polygon);

    let parsed = parse_wkt(&to_wkt(&geometry)).unwrap();
    assert_eq!(parsed.kind, GeometryKind::Polygon);
    assert_points_close(&parsed.points, &geometry.points);

    match encode(&parsed, EntityKind::Polyline).unwrap() {
        NativeShape::Polyline { is_closed, .. } => assert!(is_closed),
        other => panic!("expected polyline, got {:?}", other),
    }
}

#[test]
fn arc_chords_stay_within_tolerance_of_wkt_roundtrip() {
    let shape = NativeShape::Arc {
        center: Point3::new(500.0, 500.0, 23.75),
        radius: 40.0,
        start_angle: 0.3,
        end_angle: 2.4,
    };
    let geometry = decode(&shape).unwrap();
    let parsed = parse_wkt(&to_wkt(&geometry)).unwrap();
    assert_points_close(&parsed.points, &geometry.points);
}

#[test]
fn ewkt_always_carries_srid() {
    let geometry = decode(&NativeShape::Point {
        location: Point3::new(1.0, 2.0, 0.0),
    })
    .unwrap();
    let ewkt = to_ewkt(&geometry, cadlink::types::Srid(2230));
    assert!(ewkt.starts_with("SRID=2230;"), "ewkt was {:?}", ewkt);
}

proptest! {
    #[test]
    fn open_chains_round_trip_within_tolerance(
        points in prop::collection::vec(
            (
                -1.0e7f64..1.0e7,
                -1.0e7f64..1.0e7,
                -1.0e4f64..1.0e4,
            ),
            2..40,
        )
    ) {
        let vertices: Vec<Point3> = points
            .iter()
            .map(|(x, y, z)| Point3::new(*x, *y, *z))
            .collect();
        let shape = NativeShape::Polyline {
            vertices: vertices.clone(),
            is_closed: false,
        };

        let geometry = decode(&shape).unwrap();
        let parsed = parse_wkt(&to_wkt(&geometry)).unwrap();

        prop_assert_eq!(parsed.kind, geometry.kind);
        prop_assert_eq!(parsed.points.len(), geometry.points.len());
        for (p, q) in parsed.points.iter().zip(&geometry.points) {
            prop_assert!(p.approx_eq(q, TOLERANCE));
        }
    }

    #[test]
    fn all_zero_elevations_round_trip(
        points in prop::collection::vec(
            (-1.0e6f64..1.0e6, -1.0e6f64..1.0e6),
            2..20,
        )
    ) {
        let vertices: Vec<Point3> = points
            .iter()
            .map(|(x, y)| Point3::new(*x, *y, 0.0))
            .collect();
        let shape = NativeShape::Polyline {
            vertices,
            is_closed: false,
        };

        let geometry = decode(&shape).unwrap();
        let parsed = parse_wkt(&to_wkt(&geometry)).unwrap();
        for p in &parsed.points {
            prop_assert_eq!(p.z, 0.0);
        }
    }
}
