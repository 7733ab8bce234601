//! Open property bags attached to classifications and domain objects
//!
//! Attribute sets still evolve per object type, so properties are a
//! validated dynamic map rather than per-type structs. The well-known keys
//! each object type uses are documented in the [`keys`] module.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A single typed property value
///
/// Untagged for serialization; variant order matters so whole JSON numbers
/// deserialize as `Integer` and fractions as `Number`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Flag(bool),
    Integer(i64),
    Number(f64),
    Text(String),
}

impl PropertyValue {
    /// The value as text, if it is text
    pub fn as_text(&self) -> Option<&str> {
        match self {
            PropertyValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// The value as a float; integers widen
    pub fn as_number(&self) -> Option<f64> {
        match self {
            PropertyValue::Number(n) => Some(*n),
            PropertyValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// The value as an integer
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            PropertyValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// The value as a flag
    pub fn as_flag(&self) -> Option<bool> {
        match self {
            PropertyValue::Flag(b) => Some(*b),
            _ => None,
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(s: &str) -> Self {
        PropertyValue::Text(s.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(s: String) -> Self {
        PropertyValue::Text(s)
    }
}

impl From<f64> for PropertyValue {
    fn from(n: f64) -> Self {
        PropertyValue::Number(n)
    }
}

impl From<i64> for PropertyValue {
    fn from(i: i64) -> Self {
        PropertyValue::Integer(i)
    }
}

impl From<bool> for PropertyValue {
    fn from(b: bool) -> Self {
        PropertyValue::Flag(b)
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::Text(s) => write!(f, "{}", s),
            PropertyValue::Number(n) => write!(f, "{}", n),
            PropertyValue::Integer(i) => write!(f, "{}", i),
            PropertyValue::Flag(b) => write!(f, "{}", b),
        }
    }
}

/// An ordered key/value bag of object properties
///
/// Insertion order is preserved so serialized bags are deterministic.
pub type PropertyBag = IndexMap<String, PropertyValue>;

/// Well-known property keys
///
/// Per-type schema (all keys optional unless noted):
///
/// | object type        | keys                                                    |
/// |--------------------|---------------------------------------------------------|
/// | utility_line       | `utility_system` (required), `diameter_in`, `phase`, `slope_pct`, `network_mode` |
/// | utility_structure  | `utility_system` (required), `structure_kind`, `phase`  |
/// | bmp                | `bmp_kind`, `volume_cf`, `phase`                        |
/// | surface_model      | `surface_kind`                                          |
/// | contour            | `contour_class` (`major`/`minor`), `elevation_ft`       |
/// | spot_elevation     | `elevation_ft`                                          |
/// | site_tree          | `species`, `caliper_in`                                 |
/// | service_connection | `utility_system` (required), `diameter_in`, `phase`     |
/// | pavement_zone      | `pavement_kind`, `width_ft`                             |
/// | (all)              | `discipline`, `category`, `phase`                       |
pub mod keys {
    /// Canonical utility system token, see `UtilitySystem`
    pub const UTILITY_SYSTEM: &str = "utility_system";
    /// Explicit network flow mode (`gravity`/`pressure`)
    pub const NETWORK_MODE: &str = "network_mode";
    /// Pipe or service diameter in inches
    pub const DIAMETER_IN: &str = "diameter_in";
    /// Storage volume in cubic feet
    pub const VOLUME_CF: &str = "volume_cf";
    /// Slope in percent
    pub const SLOPE_PCT: &str = "slope_pct";
    /// Width in feet
    pub const WIDTH_FT: &str = "width_ft";
    /// Construction phase token (`EXST`, `NEW`, …)
    pub const PHASE: &str = "phase";
    /// Discipline token from a structured layer name
    pub const DISCIPLINE: &str = "discipline";
    /// Category token from a structured layer name
    pub const CATEGORY: &str = "category";
    /// Contour class (`major`/`minor`)
    pub const CONTOUR_CLASS: &str = "contour_class";
    /// Elevation in feet
    pub const ELEVATION_FT: &str = "elevation_ft";
    /// Structure kind (`manhole`, `catch_basin`, `inlet`, …)
    pub const STRUCTURE_KIND: &str = "structure_kind";
    /// BMP facility kind (`pond`, `swale`, `basin`, …)
    pub const BMP_KIND: &str = "bmp_kind";
    /// Surface model kind (`eg` existing grade, `fg` finished grade)
    pub const SURFACE_KIND: &str = "surface_kind";
}

/// Build a property bag from key/value pairs
pub fn bag<const N: usize>(entries: [(&str, PropertyValue); N]) -> PropertyBag {
    entries
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_accessors() {
        assert_eq!(PropertyValue::from(12i64).as_integer(), Some(12));
        assert_eq!(PropertyValue::from(12i64).as_number(), Some(12.0));
        assert_eq!(PropertyValue::from(2.5).as_number(), Some(2.5));
        assert_eq!(PropertyValue::from("storm").as_text(), Some("storm"));
        assert_eq!(PropertyValue::from(true).as_flag(), Some(true));
        assert_eq!(PropertyValue::from("x").as_number(), None);
    }

    #[test]
    fn test_bag_preserves_order() {
        let b = bag([
            ("utility_system", "storm".into()),
            ("diameter_in", 12i64.into()),
            ("phase", "NEW".into()),
        ]);
        let keys: Vec<&str> = b.keys().map(|k| k.as_str()).collect();
        assert_eq!(keys, vec!["utility_system", "diameter_in", "phase"]);
    }

    #[test]
    fn test_bag_serializes() {
        let b = bag([("diameter_in", 12i64.into())]);
        let json = serde_json::to_string(&b).unwrap();
        assert_eq!(json, r#"{"diameter_in":12}"#);
    }
}
