//! WKT reader/writer with explicit Z
//!
//! The bridge exchanges geometry with the spatial datastore as WKT text.
//! Every coordinate is written with all three components — `POINT Z`,
//! `LINESTRING Z`, `POLYGON Z` — so a constant elevation of exactly 0.0
//! survives the trip. `f64` values are formatted with Rust's shortest
//! round-trip representation, which preserves sub-millimeter elevations
//! without inventing digits.
//!
//! Writes toward the datastore always go through [`to_ewkt`], which carries
//! an explicit SRID; the database default CRS is never relied on.

use std::fmt::Write as _;

use nom::{
    branch::alt,
    bytes::complete::tag_no_case,
    character::complete::{char, digit1, multispace0, multispace1},
    combinator::{all_consuming, map, map_res, opt},
    multi::separated_list1,
    number::complete::double,
    sequence::{delimited, preceded, terminated, tuple},
    IResult,
};

use super::Geometry;
use crate::error::{BridgeError, Result};
use crate::types::{GeometryKind, Point3, Srid};

/// Closure comparison for parsed polygon rings. Textual ring closure is a
/// repeated vertex, so the epsilon only has to absorb float formatting.
const RING_EPSILON: f64 = 1e-9;

/// Serialize a geometry as WKT with explicit Z on every coordinate
pub fn to_wkt(geometry: &Geometry) -> String {
    let mut out = String::new();
    match geometry.kind {
        GeometryKind::Point => {
            out.push_str("POINT Z (");
            write_coord(&mut out, &geometry.points[0]);
            out.push(')');
        }
        GeometryKind::Line => {
            out.push_str("LINESTRING Z (");
            write_coords(&mut out, &geometry.points);
            out.push(')');
        }
        GeometryKind::Polygon => {
            out.push_str("POLYGON Z ((");
            write_coords(&mut out, &geometry.points);
            // re-close the ring
            out.push_str(", ");
            write_coord(&mut out, &geometry.points[0]);
            out.push_str("))");
        }
    }
    out
}

/// Serialize a geometry as EWKT with an explicit SRID prefix
pub fn to_ewkt(geometry: &Geometry, srid: Srid) -> String {
    format!("SRID={};{}", srid, to_wkt(geometry))
}

fn write_coord(out: &mut String, p: &Point3) {
    // `{}` is the shortest representation that round-trips the exact f64.
    let _ = write!(out, "{} {} {}", p.x, p.y, p.z);
}

fn write_coords(out: &mut String, points: &[Point3]) {
    for (i, p) in points.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        write_coord(out, p);
    }
}

/// Parse a WKT geometry (with or without an `SRID=` prefix)
pub fn parse_wkt(input: &str) -> Result<Geometry> {
    let (_, geometry) = parse_ewkt(input)?;
    Ok(geometry)
}

/// Parse an EWKT geometry, returning the SRID when one is present
pub fn parse_ewkt(input: &str) -> Result<(Option<Srid>, Geometry)> {
    match all_consuming(ewkt)(input.trim()) {
        Ok((_, parsed)) => Ok(parsed),
        Err(e) => Err(BridgeError::WktParse(format!("{}: {:?}", input, e))),
    }
}

fn ewkt(input: &str) -> IResult<&str, (Option<Srid>, Geometry)> {
    tuple((opt(srid_prefix), geometry))(input)
}

fn srid_prefix(input: &str) -> IResult<&str, Srid> {
    map(
        delimited(
            tag_no_case("SRID="),
            map_res(digit1, |s: &str| s.parse::<u32>()),
            char(';'),
        ),
        Srid,
    )(input)
}

fn geometry(input: &str) -> IResult<&str, Geometry> {
    alt((point, linestring, polygon))(input)
}

fn keyword<'a>(word: &'static str) -> impl FnMut(&'a str) -> IResult<&'a str, ()> {
    map(
        tuple((
            multispace0,
            tag_no_case(word),
            multispace0,
            opt(terminated(tag_no_case("Z"), multispace0)),
        )),
        |_| (),
    )
}

fn point(input: &str) -> IResult<&str, Geometry> {
    map(
        preceded(
            keyword("POINT"),
            delimited(open_paren, coord, close_paren),
        ),
        Geometry::point,
    )(input)
}

fn linestring(input: &str) -> IResult<&str, Geometry> {
    map_res(
        preceded(
            keyword("LINESTRING"),
            delimited(open_paren, coord_seq, close_paren),
        ),
        |points| {
            if points.len() < 2 {
                return Err("linestring needs at least 2 points");
            }
            Ok(Geometry::new(GeometryKind::Line, points))
        },
    )(input)
}

fn polygon(input: &str) -> IResult<&str, Geometry> {
    map_res(
        preceded(
            keyword("POLYGON"),
            delimited(
                open_paren,
                separated_list1(
                    delimited(multispace0, char(','), multispace0),
                    delimited(open_paren, coord_seq, close_paren),
                ),
                close_paren,
            ),
        ),
        |rings| {
            if rings.len() > 1 {
                return Err("interior rings are not supported");
            }
            let mut ring = rings.into_iter().next().unwrap();
            if ring.len() >= 2 && ring[0].approx_eq(&ring[ring.len() - 1], RING_EPSILON) {
                ring.pop();
            }
            if ring.len() < 3 {
                return Err("polygon ring needs at least 3 distinct points");
            }
            Ok(Geometry::new(GeometryKind::Polygon, ring))
        },
    )(input)
}

fn open_paren(input: &str) -> IResult<&str, char> {
    delimited(multispace0, char('('), multispace0)(input)
}

fn close_paren(input: &str) -> IResult<&str, char> {
    delimited(multispace0, char(')'), multispace0)(input)
}

fn coord(input: &str) -> IResult<&str, Point3> {
    map(
        tuple((double, preceded(multispace1, double), preceded(multispace1, double))),
        |(x, y, z)| Point3::new(x, y, z),
    )(input)
}

fn coord_seq(input: &str) -> IResult<&str, Vec<Point3>> {
    separated_list1(delimited(multispace0, char(','), multispace0), coord)(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pt(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    #[test]
    fn test_point_wkt() {
        let g = Geometry::point(pt(6_431_205.25, 1_902_334.8125, 101.532));
        assert_eq!(to_wkt(&g), "POINT Z (6431205.25 1902334.8125 101.532)");
    }

    #[test]
    fn test_zero_elevation_is_written() {
        let g = Geometry::point(pt(10.0, 20.0, 0.0));
        assert_eq!(to_wkt(&g), "POINT Z (10 20 0)");
    }

    #[test]
    fn test_linestring_wkt() {
        let g = Geometry::new(
            GeometryKind::Line,
            vec![pt(0.0, 0.0, 0.0), pt(10.0, 0.0, 1.5)],
        );
        assert_eq!(to_wkt(&g), "LINESTRING Z (0 0 0, 10 0 1.5)");
    }

    #[test]
    fn test_polygon_recloses_ring() {
        let g = Geometry::new(
            GeometryKind::Polygon,
            vec![pt(0.0, 0.0, 0.0), pt(5.0, 0.0, 0.0), pt(5.0, 5.0, 0.0)],
        );
        assert_eq!(to_wkt(&g), "POLYGON Z ((0 0 0, 5 0 0, 5 5 0, 0 0 0))");
    }

    #[test]
    fn test_ewkt_carries_srid() {
        let g = Geometry::point(pt(1.0, 2.0, 3.0));
        assert_eq!(to_ewkt(&g, Srid(2230)), "SRID=2230;POINT Z (1 2 3)");
    }

    #[test]
    fn test_parse_point() {
        let g = parse_wkt("POINT Z (1.5 2.5 0)").unwrap();
        assert_eq!(g.kind, GeometryKind::Point);
        assert_eq!(g.points[0], pt(1.5, 2.5, 0.0));
    }

    #[test]
    fn test_parse_without_z_tag() {
        let g = parse_wkt("LINESTRING(0 0 0, 1 1 1)").unwrap();
        assert_eq!(g.kind, GeometryKind::Line);
        assert_eq!(g.vertex_count(), 2);
    }

    #[test]
    fn test_parse_ewkt_srid() {
        let (srid, g) = parse_ewkt("SRID=4326;POINT Z (-117.1 32.7 0)").unwrap();
        assert_eq!(srid, Some(Srid::WGS84));
        assert_eq!(g.points[0].z, 0.0);
    }

    #[test]
    fn test_parse_polygon_strips_closing_vertex() {
        let g = parse_wkt("POLYGON Z ((0 0 0, 5 0 0, 5 5 0, 0 0 0))").unwrap();
        assert_eq!(g.kind, GeometryKind::Polygon);
        assert_eq!(g.vertex_count(), 3);
    }

    #[test]
    fn test_writer_parser_roundtrip_preserves_exact_values() {
        let g = Geometry::new(
            GeometryKind::Line,
            vec![
                pt(6_431_205.250001, 1_902_334.812501, 0.0004),
                pt(6_431_305.75, 1_902_434.0, 0.0),
            ],
        );
        let back = parse_wkt(&to_wkt(&g)).unwrap();
        assert_eq!(back, g);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_wkt("CIRCLE (0 0 0)").is_err());
        assert!(parse_wkt("LINESTRING Z (0 0 0)").is_err());
        assert!(parse_wkt("POLYGON Z ((0 0 0, 1 1 1, 0 0 0))").is_err());
    }
}
