//! Closed token vocabularies for structured layer names
//!
//! A structured layer name is a hyphen-delimited token sequence
//! `DISCIPLINE-CATEGORY-TYPE-[ATTRIBUTES…]-PHASE-GEOMETRY`. Every
//! positional token validates against one of the closed sets below; a name
//! with any out-of-vocabulary token is not a structured name at all and
//! falls through to the lower classifier tiers.
//!
//! The same vocabularies drive the layer name builder in reverse, so the
//! two stay inverse by construction.

use ahash::AHashSet;
use once_cell::sync::Lazy;

use crate::types::{GeometryKind, ObjectType, PropertyValue, UtilitySystem};

/// Discipline designators (first token)
pub static DISCIPLINES: Lazy<AHashSet<&'static str>> =
    Lazy::new(|| ["CIV", "SUR", "LND", "UTL", "TRN"].into_iter().collect());

/// Phase designators (second-to-last token)
pub static PHASES: Lazy<AHashSet<&'static str>> = Lazy::new(|| {
    ["EXST", "DEMO", "NEW", "PROP", "FUT", "TEMP", "RELO"]
        .into_iter()
        .collect()
});

/// Category token → its closed TYPE vocabulary
pub static CATEGORIES: &[(&str, &[&str])] = &[
    ("UTIL", &["STORM", "SAN", "WATER", "RECL", "GAS", "ELEC", "COMM"]),
    ("SERV", &["STORM", "SAN", "WATER", "RECL", "GAS", "ELEC", "COMM"]),
    ("BMP", &["POND", "SWALE", "BASIN", "RAIN", "FILT"]),
    ("SURF", &["EG", "FG", "OG"]),
    ("ALGN", &["CL", "OFF"]),
    ("SURV", &["CTRL", "TOPO", "BNDY"]),
    ("TREE", &["SITE", "STRT", "DECID", "EVGRN"]),
    ("PRCL", &["LOT", "ROW", "ESMT"]),
    ("GRAD", &["SWALE", "BERM", "SLOPE"]),
    ("SITE", &["FENCE", "WALL", "CURB", "WALK", "MISC"]),
    ("TOPO", &["MAJR", "MINR", "SPOT"]),
    ("LITE", &["ST", "PED"]),
    ("PVMT", &["AC", "PCC", "GRVL"]),
];

/// Geometry designators (last token)
///
/// `AN` (annotation) is a valid token but carries no geometry class.
pub static GEOMETRY_TOKENS: &[(&str, Option<GeometryKind>)] = &[
    ("LN", Some(GeometryKind::Line)),
    ("PT", Some(GeometryKind::Point)),
    ("PG", Some(GeometryKind::Polygon)),
    ("AN", None),
];

/// Check a discipline token
pub fn is_discipline(token: &str) -> bool {
    DISCIPLINES.contains(token)
}

/// Check a phase token
pub fn is_phase(token: &str) -> bool {
    PHASES.contains(token)
}

/// The TYPE vocabulary for a category, if the category is known
pub fn type_vocabulary(category: &str) -> Option<&'static [&'static str]> {
    CATEGORIES
        .iter()
        .find(|(cat, _)| *cat == category)
        .map(|(_, types)| *types)
}

/// The geometry class named by a geometry token, if the token is known
///
/// Returns `Some(None)` for valid annotation tokens.
pub fn geometry_class(token: &str) -> Option<Option<GeometryKind>> {
    GEOMETRY_TOKENS
        .iter()
        .find(|(t, _)| *t == token)
        .map(|(_, kind)| *kind)
}

/// The geometry token for a geometry class (builder direction)
pub fn geometry_token(kind: GeometryKind) -> &'static str {
    match kind {
        GeometryKind::Line => "LN",
        GeometryKind::Point => "PT",
        GeometryKind::Polygon => "PG",
    }
}

/// Resolve the object type named by a validated (category, type, geometry)
/// combination
///
/// Some combinations validate token-by-token but name nothing (a `UTIL`
/// polygon, a `TREE` line); those return `None` and the structured tier
/// reports no match rather than guessing.
pub fn resolve_object_type(
    category: &str,
    type_token: &str,
    geometry: GeometryKind,
) -> Option<ObjectType> {
    match (category, geometry) {
        ("UTIL", GeometryKind::Line) => Some(ObjectType::UtilityLine),
        ("UTIL", GeometryKind::Point) => Some(ObjectType::UtilityStructure),
        ("SERV", GeometryKind::Line) => Some(ObjectType::ServiceConnection),
        ("BMP", GeometryKind::Polygon) => Some(ObjectType::Bmp),
        ("SURF", GeometryKind::Polygon) => Some(ObjectType::SurfaceModel),
        ("ALGN", GeometryKind::Line) => Some(ObjectType::Alignment),
        ("SURV", GeometryKind::Point) => Some(ObjectType::SurveyPoint),
        ("TREE", GeometryKind::Point) => Some(ObjectType::SiteTree),
        ("PRCL", GeometryKind::Polygon) => Some(ObjectType::Parcel),
        ("GRAD", GeometryKind::Line) => Some(ObjectType::GradingFeature),
        ("SITE", GeometryKind::Line) | ("SITE", GeometryKind::Polygon) => {
            Some(ObjectType::SurfaceFeature)
        }
        ("TOPO", GeometryKind::Line) if type_token != "SPOT" => Some(ObjectType::Contour),
        ("TOPO", GeometryKind::Point) if type_token == "SPOT" => Some(ObjectType::SpotElevation),
        ("LITE", GeometryKind::Point) => Some(ObjectType::StreetLight),
        ("PVMT", GeometryKind::Polygon) => Some(ObjectType::PavementZone),
        _ => None,
    }
}

/// Parse one typed attribute token (`12IN`, `500CF`, `2PCT`, `8FT`)
///
/// Returns the well-known property key and its typed value, or `None` when
/// the token is not a recognized attribute form.
pub fn parse_attribute(token: &str) -> Option<(&'static str, PropertyValue)> {
    use crate::types::keys;

    let split_at = token.find(|c: char| !c.is_ascii_digit() && c != '.')?;
    let (number, unit) = token.split_at(split_at);
    if number.is_empty() {
        return None;
    }

    match unit {
        "IN" => number
            .parse::<i64>()
            .ok()
            .map(|v| (keys::DIAMETER_IN, PropertyValue::Integer(v))),
        "CF" => number
            .parse::<i64>()
            .ok()
            .map(|v| (keys::VOLUME_CF, PropertyValue::Integer(v))),
        "PCT" => number
            .parse::<f64>()
            .ok()
            .map(|v| (keys::SLOPE_PCT, PropertyValue::Number(v))),
        "FT" => number
            .parse::<i64>()
            .ok()
            .map(|v| (keys::WIDTH_FT, PropertyValue::Integer(v))),
        _ => None,
    }
}

/// Normalize a legacy phase spelling to its vocabulary token
pub fn normalize_phase(raw: &str) -> Option<&'static str> {
    match raw.to_ascii_uppercase().as_str() {
        "EX" | "EXIST" | "EXISTING" | "EXST" => Some("EXST"),
        "NEW" => Some("NEW"),
        "PROP" | "PROPOSED" => Some("PROP"),
        "DEMO" | "REMOVE" | "REM" => Some("DEMO"),
        "FUT" | "FUTURE" => Some("FUT"),
        "TEMP" | "TEMPORARY" => Some("TEMP"),
        "RELO" | "RELOCATE" => Some("RELO"),
        _ => None,
    }
}

/// The TYPE token a canonical utility system uses in structured names
pub fn utility_type_token(system: UtilitySystem) -> &'static str {
    system.token()
}
