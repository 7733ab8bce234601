//! Layer name building — the export direction
//!
//! [`build`] is the syntactic inverse of the tier-1 structured grammar:
//! every positional token is validated against its closed vocabulary before
//! concatenation, and any invalid token is a typed error — never a
//! best-effort partial name.
//!
//! [`generate_layer_name`] is the export entry point. It maps free-form
//! object properties onto the fixed vocabulary and falls back to the
//! documented legacy name `X-<OBJECT-TYPE>` whenever standards generation
//! is not possible, because export must never hard-fail on naming alone.

use tracing::debug;

use crate::classify::vocabulary as vocab;
use crate::error::{BridgeError, Result};
use crate::types::{keys, GeometryKind, ObjectType, PropertyBag, UtilitySystem};

/// Default phase token when an object carries no phase property
const DEFAULT_PHASE: &str = "EXST";

/// Default discipline designator for generated names
const DEFAULT_DISCIPLINE: &str = "CIV";

/// Build a structured layer name from validated tokens
///
/// Token order matches the grammar:
/// `DISCIPLINE-CATEGORY-TYPE-[ATTRIBUTES…]-PHASE-GEOMETRY`.
pub fn build(
    discipline: &str,
    category: &str,
    type_token: &str,
    attributes: &[&str],
    phase: &str,
    geometry: &str,
) -> Result<String> {
    let discipline = discipline.to_ascii_uppercase();
    let category = category.to_ascii_uppercase();
    let type_token = type_token.to_ascii_uppercase();
    let phase = phase.to_ascii_uppercase();
    let geometry = geometry.to_ascii_uppercase();

    if !vocab::is_discipline(&discipline) {
        return Err(invalid("discipline", &discipline));
    }
    let type_vocab =
        vocab::type_vocabulary(&category).ok_or_else(|| invalid("category", &category))?;
    if !type_vocab.contains(&type_token.as_str()) {
        return Err(invalid("type", &type_token));
    }
    if !vocab::is_phase(&phase) {
        return Err(invalid("phase", &phase));
    }
    if vocab::geometry_class(&geometry).is_none() {
        return Err(invalid("geometry", &geometry));
    }

    let mut tokens = vec![discipline, category, type_token];
    for attribute in attributes {
        let attribute = attribute.to_ascii_uppercase();
        if vocab::parse_attribute(&attribute).is_none() {
            return Err(invalid("attribute", &attribute));
        }
        tokens.push(attribute);
    }
    tokens.push(phase);
    tokens.push(geometry);

    Ok(tokens.join("-"))
}

fn invalid(position: &'static str, token: &str) -> BridgeError {
    BridgeError::InvalidLayerToken {
        position,
        token: token.to_string(),
    }
}

/// The documented legacy fallback name for an object type
pub fn legacy_fallback_name(object_type: ObjectType) -> String {
    format!(
        "X-{}",
        object_type.as_str().to_ascii_uppercase().replace('_', "-")
    )
}

/// Generate the canonical export layer name for a domain object
///
/// Never fails: when the object's properties cannot be mapped onto the
/// closed vocabulary the documented legacy fallback is returned instead.
pub fn generate_layer_name(
    object_type: ObjectType,
    properties: &PropertyBag,
    geometry: GeometryKind,
) -> String {
    match try_generate(object_type, properties, geometry) {
        Some(name) => name,
        None => {
            let fallback = legacy_fallback_name(object_type);
            debug!(object_type = %object_type, name = %fallback, "legacy fallback layer name");
            fallback
        }
    }
}

fn try_generate(
    object_type: ObjectType,
    properties: &PropertyBag,
    geometry: GeometryKind,
) -> Option<String> {
    let (category, type_token) = category_and_type(object_type, properties)?;

    let phase = properties
        .get(keys::PHASE)
        .and_then(|v| v.as_text())
        .and_then(vocab::normalize_phase)
        .unwrap_or(DEFAULT_PHASE);

    let mut attributes: Vec<String> = Vec::new();
    if let Some(diameter) = properties.get(keys::DIAMETER_IN).and_then(|v| v.as_integer()) {
        attributes.push(format!("{}IN", diameter));
    }
    if let Some(volume) = properties.get(keys::VOLUME_CF).and_then(|v| v.as_integer()) {
        attributes.push(format!("{}CF", volume));
    }
    if let Some(width) = properties.get(keys::WIDTH_FT).and_then(|v| v.as_integer()) {
        attributes.push(format!("{}FT", width));
    }

    let attribute_refs: Vec<&str> = attributes.iter().map(|a| a.as_str()).collect();
    build(
        DEFAULT_DISCIPLINE,
        category,
        &type_token,
        &attribute_refs,
        phase,
        vocab::geometry_token(geometry),
    )
    .ok()
}

fn category_and_type(
    object_type: ObjectType,
    properties: &PropertyBag,
) -> Option<(&'static str, String)> {
    let utility_token = || {
        properties
            .get(keys::UTILITY_SYSTEM)
            .and_then(|v| v.as_text())
            .and_then(UtilitySystem::parse)
            .map(|s| s.token().to_string())
    };

    match object_type {
        ObjectType::UtilityLine | ObjectType::UtilityStructure => {
            Some(("UTIL", utility_token()?))
        }
        ObjectType::ServiceConnection => Some(("SERV", utility_token()?)),
        ObjectType::Bmp => {
            let kind = properties
                .get(keys::BMP_KIND)
                .and_then(|v| v.as_text())
                .map(|k| k.to_ascii_uppercase())
                .unwrap_or_else(|| "BASIN".to_string());
            Some(("BMP", kind))
        }
        ObjectType::SurfaceModel => {
            let kind = properties
                .get(keys::SURFACE_KIND)
                .and_then(|v| v.as_text())
                .map(|k| k.to_ascii_uppercase())
                .unwrap_or_else(|| "FG".to_string());
            Some(("SURF", kind))
        }
        ObjectType::Alignment => Some(("ALGN", "CL".to_string())),
        ObjectType::SurveyPoint => Some(("SURV", "CTRL".to_string())),
        ObjectType::SiteTree => Some(("TREE", "SITE".to_string())),
        ObjectType::Parcel => Some(("PRCL", "LOT".to_string())),
        ObjectType::GradingFeature => Some(("GRAD", "SLOPE".to_string())),
        ObjectType::SurfaceFeature => Some(("SITE", "MISC".to_string())),
        ObjectType::Contour => {
            let class = properties
                .get(keys::CONTOUR_CLASS)
                .and_then(|v| v.as_text())
                .unwrap_or("minor");
            let token = if class.eq_ignore_ascii_case("major") {
                "MAJR"
            } else {
                "MINR"
            };
            Some(("TOPO", token.to_string()))
        }
        ObjectType::SpotElevation => Some(("TOPO", "SPOT".to_string())),
        ObjectType::StreetLight => Some(("LITE", "ST".to_string())),
        ObjectType::PavementZone => Some(("PVMT", "AC".to_string())),
        ObjectType::Unclassified => None,
    }
}
