//! Geometry codec: decoded CAD shapes ⇄ ordered 3D point sequences
//!
//! Both directions are pure functions. Every coordinate keeps its explicit
//! Z component through the whole pipeline — a source Z of exactly 0.0 is
//! still a Z, and the geometry stays 3D. Curved primitives with no direct
//! target-format equivalent are discretized to [`ARC_SEGMENTS`] chords;
//! that count is part of the round-trip tolerance contract, not an
//! implementation detail.

pub mod hash;
pub mod wkt;

pub use hash::geometry_hash;
pub use wkt::{parse_wkt, to_ewkt, to_wkt};

use std::f64::consts::TAU;

use crate::entities::{EntityKind, NativeShape};
use crate::error::{BridgeError, Result};
use crate::types::{GeometryKind, Point3};

/// Chord count used when discretizing arcs and circles.
///
/// Fixed at 32 so the discretization error stays inside the documented
/// 0.001 round-trip tolerance for survey-scale radii.
pub const ARC_SEGMENTS: usize = 32;

/// Default linear tolerance for ring-closure detection
pub const DEFAULT_TOLERANCE: f64 = 1e-3;

/// A shape normalized to an ordered 3D point sequence
///
/// Polygons store their ring without the duplicated closing vertex; the
/// WKT writer re-closes the ring on output.
#[derive(Debug, Clone, PartialEq)]
pub struct Geometry {
    pub kind: GeometryKind,
    pub points: Vec<Point3>,
}

impl Geometry {
    pub fn new(kind: GeometryKind, points: Vec<Point3>) -> Self {
        Geometry { kind, points }
    }

    /// A single-point geometry
    pub fn point(p: Point3) -> Self {
        Geometry::new(GeometryKind::Point, vec![p])
    }

    pub fn vertex_count(&self) -> usize {
        self.points.len()
    }
}

/// Convert a decoded CAD shape into its normalized point sequence
///
/// Uses [`DEFAULT_TOLERANCE`] for ring-closure detection.
pub fn decode(shape: &NativeShape) -> Result<Geometry> {
    decode_with_tolerance(shape, DEFAULT_TOLERANCE)
}

/// [`decode`] with an explicit ring-closure tolerance
///
/// Malformed input (too few vertices for the shape kind) yields a typed
/// error, never a partial coordinate list.
pub fn decode_with_tolerance(shape: &NativeShape, tolerance: f64) -> Result<Geometry> {
    match shape {
        NativeShape::Point { location } => Ok(Geometry::point(*location)),
        NativeShape::BlockInsert { insertion } => Ok(Geometry::point(*insertion)),
        NativeShape::Text { insertion, .. } => Ok(Geometry::point(*insertion)),
        NativeShape::Line { start, end } => Ok(Geometry::new(
            GeometryKind::Line,
            vec![*start, *end],
        )),
        NativeShape::Polyline {
            vertices,
            is_closed,
        } => decode_polyline(vertices, *is_closed, tolerance),
        NativeShape::Arc {
            center,
            radius,
            start_angle,
            end_angle,
        } => decode_arc(*center, *radius, *start_angle, *end_angle),
        NativeShape::Circle { center, radius } => decode_circle(*center, *radius),
    }
}

fn decode_polyline(vertices: &[Point3], is_closed: bool, tolerance: f64) -> Result<Geometry> {
    if vertices.len() < 2 {
        return Err(BridgeError::MalformedGeometry {
            kind: EntityKind::Polyline,
            expected: 2,
            actual: vertices.len(),
        });
    }

    if is_closed {
        if vertices.len() < 3 {
            return Err(BridgeError::MalformedGeometry {
                kind: EntityKind::Polyline,
                expected: 3,
                actual: vertices.len(),
            });
        }
        return Ok(Geometry::new(GeometryKind::Polygon, vertices.to_vec()));
    }

    // A chain whose first and last vertices coincide within tolerance is a
    // ring; the duplicate closing vertex is dropped. Open chains are never
    // force-closed.
    let first = vertices[0];
    let last = vertices[vertices.len() - 1];
    if vertices.len() >= 4 && first.approx_eq(&last, tolerance) {
        let mut ring = vertices.to_vec();
        ring.pop();
        return Ok(Geometry::new(GeometryKind::Polygon, ring));
    }

    Ok(Geometry::new(GeometryKind::Line, vertices.to_vec()))
}

fn decode_arc(center: Point3, radius: f64, start_angle: f64, end_angle: f64) -> Result<Geometry> {
    if radius <= 0.0 {
        return Err(BridgeError::MalformedGeometry {
            kind: EntityKind::Arc,
            expected: 1,
            actual: 0,
        });
    }

    let mut sweep = end_angle - start_angle;
    if sweep <= 0.0 {
        sweep += TAU;
    }

    let step = sweep / ARC_SEGMENTS as f64;
    let points = (0..=ARC_SEGMENTS)
        .map(|i| {
            let a = start_angle + step * i as f64;
            Point3::new(
                center.x + radius * a.cos(),
                center.y + radius * a.sin(),
                center.z,
            )
        })
        .collect();

    Ok(Geometry::new(GeometryKind::Line, points))
}

fn decode_circle(center: Point3, radius: f64) -> Result<Geometry> {
    if radius <= 0.0 {
        return Err(BridgeError::MalformedGeometry {
            kind: EntityKind::Circle,
            expected: 1,
            actual: 0,
        });
    }

    let step = TAU / ARC_SEGMENTS as f64;
    // Ring without the duplicated closing vertex.
    let points = (0..ARC_SEGMENTS)
        .map(|i| {
            let a = step * i as f64;
            Point3::new(
                center.x + radius * a.cos(),
                center.y + radius * a.sin(),
                center.z,
            )
        })
        .collect();

    Ok(Geometry::new(GeometryKind::Polygon, points))
}

/// Convert a normalized point sequence back into a CAD shape
///
/// `target` names the shape the CAD-encode collaborator should receive.
/// Curved kinds (`Arc`, `Circle`) have no exact inverse once discretized
/// and come back as polylines; `Text` anchors come back as points. Flat
/// (constant-Z) geometry still leaves through the 3D primitives.
pub fn encode(geometry: &Geometry, target: EntityKind) -> Result<NativeShape> {
    let points = &geometry.points;
    if points.is_empty() {
        return Err(BridgeError::UnencodableShape {
            kind: target,
            points: 0,
        });
    }
    match (target, geometry.kind) {
        (EntityKind::Point | EntityKind::Text, GeometryKind::Point) => Ok(NativeShape::Point {
            location: points[0],
        }),
        (EntityKind::BlockInsert, GeometryKind::Point) => Ok(NativeShape::BlockInsert {
            insertion: points[0],
        }),
        (EntityKind::Line, GeometryKind::Line) if points.len() == 2 => Ok(NativeShape::Line {
            start: points[0],
            end: points[1],
        }),
        (
            EntityKind::Line | EntityKind::Polyline | EntityKind::Arc,
            GeometryKind::Line,
        ) => {
            if points.len() < 2 {
                return Err(BridgeError::UnencodableShape {
                    kind: target,
                    points: points.len(),
                });
            }
            Ok(NativeShape::Polyline {
                vertices: points.clone(),
                is_closed: false,
            })
        }
        (
            EntityKind::Polyline | EntityKind::Circle | EntityKind::Arc,
            GeometryKind::Polygon,
        ) => {
            if points.len() < 3 {
                return Err(BridgeError::UnencodableShape {
                    kind: target,
                    points: points.len(),
                });
            }
            Ok(NativeShape::Polyline {
                vertices: points.clone(),
                is_closed: true,
            })
        }
        _ => Err(BridgeError::UnencodableShape {
            kind: target,
            points: points.len(),
        }),
    }
}
