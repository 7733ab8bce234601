//! Tier 1: structured layer-name grammar
//!
//! Parses the fixed hyphen-delimited sequence
//! `DISCIPLINE-CATEGORY-TYPE-[ATTRIBUTES…]-PHASE-GEOMETRY` against the
//! closed vocabularies in [`super::vocabulary`]. A full match is the
//! strongest evidence the system has and scores confidence 0.95; any
//! out-of-vocabulary token means this is not a structured name and the
//! tier reports no match.

use tracing::debug;

use super::vocabulary as vocab;
use super::{Classification, ClassifierTier, ClassifyStrategy};
use crate::types::{keys, ObjectType, PropertyBag, PropertyValue, UtilitySystem};

/// Confidence assigned to a full structured-grammar match
pub const GRAMMAR_CONFIDENCE: f64 = 0.95;

/// The structured-grammar classification strategy
#[derive(Debug, Default)]
pub struct GrammarStrategy;

impl GrammarStrategy {
    pub fn new() -> Self {
        GrammarStrategy
    }
}

impl ClassifyStrategy for GrammarStrategy {
    fn name(&self) -> &'static str {
        "grammar"
    }

    fn classify(&self, layer_name: &str, _block_name: Option<&str>) -> Option<Classification> {
        let canonical = layer_name.trim().to_ascii_uppercase();
        let tokens: Vec<&str> = canonical.split('-').collect();

        // DISC-CAT-TYPE-PHASE-GEOM is the shortest legal sequence.
        if tokens.len() < 5 {
            return None;
        }

        let discipline = tokens[0];
        let category = tokens[1];
        let type_token = tokens[2];
        let geometry_token = tokens[tokens.len() - 1];
        let phase = tokens[tokens.len() - 2];
        let attribute_tokens = &tokens[3..tokens.len() - 2];

        if !vocab::is_discipline(discipline) || !vocab::is_phase(phase) {
            return None;
        }
        let type_vocab = vocab::type_vocabulary(category)?;
        if !type_vocab.contains(&type_token) {
            return None;
        }
        let geometry_class = vocab::geometry_class(geometry_token)?;

        let mut properties = PropertyBag::new();
        properties.insert(
            keys::DISCIPLINE.to_string(),
            PropertyValue::Text(discipline.to_string()),
        );
        properties.insert(
            keys::CATEGORY.to_string(),
            PropertyValue::Text(category.to_string()),
        );

        for token in attribute_tokens {
            let (key, value) = vocab::parse_attribute(token)?;
            properties.insert(key.to_string(), value);
        }

        properties.insert(
            keys::PHASE.to_string(),
            PropertyValue::Text(phase.to_string()),
        );

        // Annotation geometry validates but names no object.
        let geometry_class = geometry_class?;
        let object_type = vocab::resolve_object_type(category, type_token, geometry_class)?;

        match object_type {
            ObjectType::UtilityLine
            | ObjectType::UtilityStructure
            | ObjectType::ServiceConnection => {
                let system = UtilitySystem::parse(type_token)?;
                properties.insert(
                    keys::UTILITY_SYSTEM.to_string(),
                    PropertyValue::Text(system.token().to_string()),
                );
            }
            ObjectType::Contour => {
                let class = if type_token == "MAJR" { "major" } else { "minor" };
                properties.insert(
                    keys::CONTOUR_CLASS.to_string(),
                    PropertyValue::Text(class.to_string()),
                );
            }
            ObjectType::SurfaceModel => {
                properties.insert(
                    keys::SURFACE_KIND.to_string(),
                    PropertyValue::Text(type_token.to_ascii_lowercase()),
                );
            }
            ObjectType::Bmp => {
                properties.insert(
                    keys::BMP_KIND.to_string(),
                    PropertyValue::Text(type_token.to_ascii_lowercase()),
                );
            }
            _ => {}
        }

        debug!(layer = %canonical, object_type = %object_type, "structured grammar match");

        Some(Classification {
            object_type,
            confidence: GRAMMAR_CONFIDENCE,
            properties,
            canonical_layer_name: Some(canonical),
            tier: Some(ClassifierTier::Grammar),
        })
    }
}
