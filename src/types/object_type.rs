//! Closed enums for classified object types, target tables and utility systems

use std::fmt;

use serde::{Deserialize, Serialize};

/// Geometry classes produced by the codec
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GeometryKind {
    /// A single coordinate
    Point,
    /// An open ordered sequence of coordinates
    Line,
    /// A closed ring (first vertex equals last within tolerance)
    Polygon,
}

impl fmt::Display for GeometryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeometryKind::Point => write!(f, "Point"),
            GeometryKind::Line => write!(f, "Line"),
            GeometryKind::Polygon => write!(f, "Polygon"),
        }
    }
}

/// The closed set of civil-engineering object types a layer name can
/// classify into
///
/// `Unclassified` is a valid classification result, not an error: it routes
/// the entity to the review table so nothing is silently lost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectType {
    UtilityLine,
    UtilityStructure,
    Bmp,
    SurfaceModel,
    Alignment,
    SurveyPoint,
    SiteTree,
    Parcel,
    GradingFeature,
    SurfaceFeature,
    Contour,
    SpotElevation,
    StreetLight,
    PavementZone,
    ServiceConnection,
    Unclassified,
}

impl ObjectType {
    /// Stable string form used in mapping tables and diagnostics
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectType::UtilityLine => "utility_line",
            ObjectType::UtilityStructure => "utility_structure",
            ObjectType::Bmp => "bmp",
            ObjectType::SurfaceModel => "surface_model",
            ObjectType::Alignment => "alignment",
            ObjectType::SurveyPoint => "survey_point",
            ObjectType::SiteTree => "site_tree",
            ObjectType::Parcel => "parcel",
            ObjectType::GradingFeature => "grading_feature",
            ObjectType::SurfaceFeature => "surface_feature",
            ObjectType::Contour => "contour",
            ObjectType::SpotElevation => "spot_elevation",
            ObjectType::StreetLight => "street_light",
            ObjectType::PavementZone => "pavement_zone",
            ObjectType::ServiceConnection => "service_connection",
            ObjectType::Unclassified => "unclassified",
        }
    }

    /// Parse the stable string form
    pub fn parse(s: &str) -> Option<ObjectType> {
        match s.to_ascii_lowercase().as_str() {
            "utility_line" => Some(ObjectType::UtilityLine),
            "utility_structure" => Some(ObjectType::UtilityStructure),
            "bmp" => Some(ObjectType::Bmp),
            "surface_model" => Some(ObjectType::SurfaceModel),
            "alignment" => Some(ObjectType::Alignment),
            "survey_point" => Some(ObjectType::SurveyPoint),
            "site_tree" => Some(ObjectType::SiteTree),
            "parcel" => Some(ObjectType::Parcel),
            "grading_feature" => Some(ObjectType::GradingFeature),
            "surface_feature" => Some(ObjectType::SurfaceFeature),
            "contour" => Some(ObjectType::Contour),
            "spot_elevation" => Some(ObjectType::SpotElevation),
            "street_light" => Some(ObjectType::StreetLight),
            "pavement_zone" => Some(ObjectType::PavementZone),
            "service_connection" => Some(ObjectType::ServiceConnection),
            "unclassified" => Some(ObjectType::Unclassified),
            _ => None,
        }
    }

    /// The domain table rows of this type are created in
    pub fn table(&self) -> DomainTable {
        match self {
            ObjectType::UtilityLine => DomainTable::Pipes,
            ObjectType::UtilityStructure => DomainTable::Structures,
            ObjectType::Bmp => DomainTable::Bmps,
            ObjectType::SurfaceModel => DomainTable::Surfaces,
            ObjectType::Alignment => DomainTable::Alignments,
            ObjectType::SurveyPoint => DomainTable::SurveyPoints,
            ObjectType::SiteTree => DomainTable::Trees,
            ObjectType::Parcel => DomainTable::Parcels,
            ObjectType::GradingFeature => DomainTable::GradingFeatures,
            ObjectType::SurfaceFeature => DomainTable::SurfaceFeatures,
            ObjectType::Contour => DomainTable::Contours,
            ObjectType::SpotElevation => DomainTable::SpotElevations,
            ObjectType::StreetLight => DomainTable::StreetLights,
            ObjectType::PavementZone => DomainTable::PavementZones,
            ObjectType::ServiceConnection => DomainTable::ServiceConnections,
            ObjectType::Unclassified => DomainTable::ReviewObjects,
        }
    }

    /// Geometry class the target table expects, if it is constrained
    ///
    /// `None` means the table accepts any geometry (review objects, surface
    /// features).
    pub fn required_geometry(&self) -> Option<GeometryKind> {
        match self {
            ObjectType::UtilityLine => Some(GeometryKind::Line),
            ObjectType::UtilityStructure => Some(GeometryKind::Point),
            ObjectType::Bmp => Some(GeometryKind::Polygon),
            ObjectType::SurfaceModel => Some(GeometryKind::Polygon),
            ObjectType::Alignment => Some(GeometryKind::Line),
            ObjectType::SurveyPoint => Some(GeometryKind::Point),
            ObjectType::SiteTree => Some(GeometryKind::Point),
            ObjectType::Parcel => Some(GeometryKind::Polygon),
            ObjectType::GradingFeature => Some(GeometryKind::Line),
            ObjectType::SurfaceFeature => None,
            ObjectType::Contour => Some(GeometryKind::Line),
            ObjectType::SpotElevation => Some(GeometryKind::Point),
            ObjectType::StreetLight => Some(GeometryKind::Point),
            ObjectType::PavementZone => Some(GeometryKind::Polygon),
            ObjectType::ServiceConnection => Some(GeometryKind::Line),
            ObjectType::Unclassified => None,
        }
    }

    /// Whether objects of this type participate in logical utility networks
    pub fn is_network_bearing(&self) -> bool {
        matches!(
            self,
            ObjectType::UtilityLine
                | ObjectType::UtilityStructure
                | ObjectType::ServiceConnection
        )
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The closed set of target tables in the spatial datastore
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DomainTable {
    Pipes,
    Structures,
    Bmps,
    Surfaces,
    Alignments,
    SurveyPoints,
    Trees,
    Parcels,
    GradingFeatures,
    SurfaceFeatures,
    Contours,
    SpotElevations,
    StreetLights,
    PavementZones,
    ServiceConnections,
    /// Generic needs-review table for low-confidence or shape-mismatched
    /// entities
    ReviewObjects,
}

impl DomainTable {
    /// SQL-side table name
    pub fn as_str(&self) -> &'static str {
        match self {
            DomainTable::Pipes => "pipes",
            DomainTable::Structures => "structures",
            DomainTable::Bmps => "bmps",
            DomainTable::Surfaces => "surfaces",
            DomainTable::Alignments => "alignments",
            DomainTable::SurveyPoints => "survey_points",
            DomainTable::Trees => "trees",
            DomainTable::Parcels => "parcels",
            DomainTable::GradingFeatures => "grading_features",
            DomainTable::SurfaceFeatures => "surface_features",
            DomainTable::Contours => "contours",
            DomainTable::SpotElevations => "spot_elevations",
            DomainTable::StreetLights => "street_lights",
            DomainTable::PavementZones => "pavement_zones",
            DomainTable::ServiceConnections => "service_connections",
            DomainTable::ReviewObjects => "review_objects",
        }
    }
}

impl fmt::Display for DomainTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Canonical utility systems
///
/// Free spellings from layer names (`SD`, `STM`, `STORM`, …) all
/// canonicalize through [`UtilitySystem::parse`] so network grouping is
/// stable regardless of input spelling or casing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UtilitySystem {
    Storm,
    Sanitary,
    Water,
    ReclaimedWater,
    Gas,
    Electric,
    Communications,
}

impl UtilitySystem {
    /// Canonicalize a free-form utility spelling
    pub fn parse(s: &str) -> Option<UtilitySystem> {
        match s.trim().to_ascii_uppercase().as_str() {
            "SD" | "ST" | "STM" | "STORM" | "STORMWATER" | "STORMDRAIN" => {
                Some(UtilitySystem::Storm)
            }
            "SS" | "SAN" | "SANITARY" | "SEWER" | "SWR" => Some(UtilitySystem::Sanitary),
            "W" | "WTR" | "WATER" | "DW" | "DOM" => Some(UtilitySystem::Water),
            "RW" | "RECL" | "RECLAIMED" | "REUSE" => Some(UtilitySystem::ReclaimedWater),
            "G" | "GAS" | "NG" => Some(UtilitySystem::Gas),
            "E" | "ELEC" | "ELECTRIC" | "POWER" | "PWR" => Some(UtilitySystem::Electric),
            "T" | "TEL" | "COMM" | "FIBER" | "CATV" => Some(UtilitySystem::Communications),
            _ => None,
        }
    }

    /// Canonical short token used in structured layer names
    pub fn token(&self) -> &'static str {
        match self {
            UtilitySystem::Storm => "STORM",
            UtilitySystem::Sanitary => "SAN",
            UtilitySystem::Water => "WATER",
            UtilitySystem::ReclaimedWater => "RECL",
            UtilitySystem::Gas => "GAS",
            UtilitySystem::Electric => "ELEC",
            UtilitySystem::Communications => "COMM",
        }
    }

    /// Default flow mode when a layer name does not make it explicit
    ///
    /// Storm and sanitary collection systems are gravity networks; the
    /// rest operate under pressure.
    pub fn default_mode(&self) -> NetworkMode {
        match self {
            UtilitySystem::Storm | UtilitySystem::Sanitary => NetworkMode::Gravity,
            _ => NetworkMode::Pressure,
        }
    }
}

impl fmt::Display for UtilitySystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.token())
    }
}

/// Flow mode of a logical utility network
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NetworkMode {
    Gravity,
    Pressure,
}

impl NetworkMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            NetworkMode::Gravity => "gravity",
            NetworkMode::Pressure => "pressure",
        }
    }

    /// Parse a mode spelled out in a property bag
    pub fn parse(s: &str) -> Option<NetworkMode> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gravity" => Some(NetworkMode::Gravity),
            "pressure" => Some(NetworkMode::Pressure),
            _ => None,
        }
    }
}

impl fmt::Display for NetworkMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_type_roundtrip() {
        for ty in [
            ObjectType::UtilityLine,
            ObjectType::Bmp,
            ObjectType::SpotElevation,
            ObjectType::Unclassified,
        ] {
            assert_eq!(ObjectType::parse(ty.as_str()), Some(ty));
        }
        assert_eq!(ObjectType::parse("not_a_type"), None);
    }

    #[test]
    fn test_utility_canonicalization() {
        assert_eq!(UtilitySystem::parse("SD"), Some(UtilitySystem::Storm));
        assert_eq!(UtilitySystem::parse("storm"), Some(UtilitySystem::Storm));
        assert_eq!(UtilitySystem::parse("Sewer"), Some(UtilitySystem::Sanitary));
        assert_eq!(UtilitySystem::parse("wtr"), Some(UtilitySystem::Water));
        assert_eq!(UtilitySystem::parse("XYZ"), None);
    }

    #[test]
    fn test_default_modes() {
        assert_eq!(UtilitySystem::Storm.default_mode(), NetworkMode::Gravity);
        assert_eq!(UtilitySystem::Sanitary.default_mode(), NetworkMode::Gravity);
        assert_eq!(UtilitySystem::Water.default_mode(), NetworkMode::Pressure);
        assert_eq!(UtilitySystem::Gas.default_mode(), NetworkMode::Pressure);
        assert_eq!(UtilitySystem::Electric.default_mode(), NetworkMode::Pressure);
    }

    #[test]
    fn test_network_bearing() {
        assert!(ObjectType::UtilityLine.is_network_bearing());
        assert!(ObjectType::UtilityStructure.is_network_bearing());
        assert!(ObjectType::ServiceConnection.is_network_bearing());
        assert!(!ObjectType::Parcel.is_network_bearing());
    }

    #[test]
    fn test_review_table_routing() {
        assert_eq!(ObjectType::Unclassified.table(), DomainTable::ReviewObjects);
        assert_eq!(ObjectType::UtilityLine.table(), DomainTable::Pipes);
    }
}
