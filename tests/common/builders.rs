//! Synthetic drawing builders — consolidated fixtures for the integration
//! tests.
//!
//! `sample_drawing()` produces the canonical mixed drawing used by the
//! reconciliation tests: two storm mains, a manhole block, a tree, a
//! parcel ring and one unclassifiable annotation. Entity handles are
//! stable across calls so repeated "decodes" simulate re-importing the
//! same drawing revision.

#![allow(dead_code)]

use cadlink::types::{DrawingId, Point3, ProjectId, Srid, StableHandle};
use cadlink::{DecodedCadEntity, ImportScope, NativeShape};

/// Scope every test run uses unless it needs its own
pub fn scope() -> ImportScope {
    ImportScope::new(ProjectId(1), Some(DrawingId(1)), Srid(2230))
}

/// A storm main between two stations, falling at 1 percent
pub fn storm_main(handle: u64, x0: f64, x1: f64) -> DecodedCadEntity {
    DecodedCadEntity::new(
        StableHandle::new(handle),
        "12IN-STORM",
        NativeShape::Line {
            start: Point3::new(x0, 0.0, 100.0 - x0 * 0.01),
            end: Point3::new(x1, 0.0, 100.0 - x1 * 0.01),
        },
    )
}

/// A storm manhole block insert with a rim elevation
pub fn manhole(handle: u64, x: f64, y: f64, rim: f64) -> DecodedCadEntity {
    DecodedCadEntity::new(
        StableHandle::new(handle),
        "MH-STORM",
        NativeShape::BlockInsert {
            insertion: Point3::new(x, y, rim),
        },
    )
    .with_block("MH48")
}

/// An existing tree at ground zero elevation
pub fn tree(handle: u64, x: f64, y: f64) -> DecodedCadEntity {
    DecodedCadEntity::new(
        StableHandle::new(handle),
        "EX-TREES",
        NativeShape::Point {
            location: Point3::new(x, y, 0.0),
        },
    )
}

/// A closed parcel boundary at Z=0
pub fn parcel_ring(handle: u64) -> DecodedCadEntity {
    DecodedCadEntity::new(
        StableHandle::new(handle),
        "PROPERTY-LINE",
        NativeShape::Polyline {
            vertices: vec![
                Point3::new(-10.0, -10.0, 0.0),
                Point3::new(200.0, -10.0, 0.0),
                Point3::new(200.0, 60.0, 0.0),
                Point3::new(-10.0, 60.0, 0.0),
            ],
            is_closed: true,
        },
    )
}

/// An annotation no classifier tier recognizes
pub fn stray_note(handle: u64) -> DecodedCadEntity {
    DecodedCadEntity::new(
        StableHandle::new(handle),
        "SOME-RANDOM-LAYER",
        NativeShape::Text {
            insertion: Point3::new(5.0, 5.0, 0.0),
            content: "NOTE 1".to_string(),
        },
    )
}

/// The canonical mixed drawing (6 entities, handles 0x10–0x15)
pub fn sample_drawing() -> Vec<DecodedCadEntity> {
    vec![
        storm_main(0x10, 0.0, 75.0),
        storm_main(0x11, 75.0, 150.0),
        manhole(0x12, 75.0, 0.0, 101.4),
        tree(0x13, 30.0, 12.0),
        parcel_ring(0x14),
        stray_note(0x15),
    ]
}
