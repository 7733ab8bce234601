//! Tier 3: legacy layer-name heuristics
//!
//! Drawings made without a layer standard still follow recognizable idioms:
//! `SD-12-NEW`, `MH-STORM`, `12IN-STORM`, `EX-TREES`. This tier is a fixed
//! library of anchored regex rules for those idioms with fixed confidences
//! between 0.75 and 0.90 — strong enough to route to a specialized table,
//! weaker than a structured or mapped name. Rules are tried in order and
//! the first one whose captures survive validation wins, so the tier is
//! deterministic.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use tracing::debug;

use super::vocabulary::normalize_phase;
use super::{Classification, ClassifierTier, ClassifyStrategy};
use crate::types::{keys, ObjectType, PropertyBag, PropertyValue, UtilitySystem};

/// Lowest confidence a heuristic rule may carry
pub const HEURISTIC_MIN_CONFIDENCE: f64 = 0.75;
/// Highest confidence a heuristic rule may carry
pub const HEURISTIC_MAX_CONFIDENCE: f64 = 0.90;

struct HeuristicRule {
    name: &'static str,
    confidence: f64,
    pattern: Regex,
    build: fn(&Captures, Option<&str>) -> Option<(ObjectType, PropertyBag)>,
}

fn rule(
    name: &'static str,
    confidence: f64,
    pattern: &str,
    build: fn(&Captures, Option<&str>) -> Option<(ObjectType, PropertyBag)>,
) -> HeuristicRule {
    debug_assert!((HEURISTIC_MIN_CONFIDENCE..=HEURISTIC_MAX_CONFIDENCE).contains(&confidence));
    HeuristicRule {
        name,
        confidence,
        pattern: Regex::new(pattern).expect("heuristic pattern must compile"),
        build,
    }
}

static RULES: Lazy<Vec<HeuristicRule>> = Lazy::new(|| {
    vec![
        // 12IN-STORM, 8IN-SS-NEW
        rule(
            "diameter-system",
            0.88,
            r"^(?i)(?P<dia>\d{1,3})IN[-_ ](?P<sys>[A-Z]+)(?:[-_ ](?P<phase>[A-Z]+))?$",
            build_diameter_system,
        ),
        // SD-12-NEW, W-8, SS-8-EX
        rule(
            "system-diameter",
            0.85,
            r"^(?i)(?P<sys>SD|SS|STM|SAN|SWR|W|WTR|RW|G|GAS|E|ELEC)[-_](?P<dia>\d{1,3})(?:[-_](?P<phase>[A-Z]+))?$",
            build_diameter_system,
        ),
        // MH-STORM
        rule(
            "manhole-system",
            0.90,
            r"^(?i)MH[-_ ](?P<sys>[A-Z]+)$",
            build_manhole,
        ),
        // STORM-MH, SS-MH
        rule(
            "system-manhole",
            0.88,
            r"^(?i)(?P<sys>[A-Z]+)[-_ ]MH$",
            build_manhole,
        ),
        // CB, CATCH-BASIN, INLET-A: storm collection structures
        rule(
            "storm-structure",
            0.78,
            r"^(?i)(?P<kind>CB|CATCH[-_ ]?BASIN|INLET|JB|JUNCTION[-_ ]?BOX)([-_ ].*)?$",
            build_storm_structure,
        ),
        // WATER-SVC, SAN-LATERAL
        rule(
            "service-lateral",
            0.82,
            r"^(?i)(?P<sys>[A-Z]+)[-_ ](SVC|SERVICE|LAT|LATERAL)S?$",
            build_service,
        ),
        // Any layer naming a utility system + a structure-shaped block
        // reference (MH48, CB-TYPE-A, …). Tried before the bare-word rule
        // so a block insert on a "STORM" layer lands in structures.
        rule(
            "block-structure",
            0.80,
            r"(?i)(?P<sys>STORM|SAN|SANITARY|SEWER|WATER|SD|SS)",
            build_block_structure,
        ),
        // STORM, SEWER-MAIN, WATER-LINE
        rule(
            "utility-word",
            0.80,
            r"^(?i)(?P<sys>STORM|SAN|SANITARY|SEWER|WATER|GAS|ELEC|ELECTRIC)([-_ ](MAIN|LINE|PIPE))?$",
            build_utility_word,
        ),
        // TREES, EX-TREE
        rule(
            "trees",
            0.80,
            r"^(?i)(?P<ex>EX[-_ ])?TREES?([-_ ].*)?$",
            build_tree,
        ),
        // CONTOURS, CTR-MAJOR
        rule(
            "contours",
            0.76,
            r"^(?i)(C|CONT|CTR|CONTOURS?)([-_ ](?P<class>MAJ|MAJOR|MIN|MINOR))?$",
            build_contour,
        ),
        // PROPERTY-LINE, PARCELS, LOT-LINES
        rule(
            "parcel",
            0.78,
            r"^(?i)(PROP(ERTY)?[-_ ]?(LINE|LN)S?|PARCELS?|LOT[-_ ]?(LINE|LN)?S?)$",
            build_parcel,
        ),
        // SPOT-ELEV, SPOTS
        rule(
            "spot-elevation",
            0.76,
            r"^(?i)SPOT[-_ ]?(ELEV(ATION)?|EL|GRADE)?S?$",
            build_spot,
        ),
        // ST-LIGHTS, LIGHT-POLE
        rule(
            "street-light",
            0.77,
            r"^(?i)(ST(REET)?[-_ ]?LIGHTS?|LIGHT[-_ ]?POLES?)$",
            build_light,
        ),
        // SURVEY-PTS, CTRL-PT
        rule(
            "survey-point",
            0.80,
            r"^(?i)(SURV(EY)?[-_ ]?(PT|PTS|POINT|POINTS|CTRL)|CTRL[-_ ]?(PT|PTS))$",
            build_survey,
        ),
        // BMP, BIORETENTION, DETENTION-POND
        rule(
            "bmp",
            0.77,
            r"^(?i)(BMP|BIO[-_ ]?RETENTION|BIOSWALE|RAIN[-_ ]?GARDEN|DET(ENTION)?[-_ ]?(POND|BASIN))([-_ ].*)?$",
            build_bmp,
        ),
    ]
});

/// The legacy-heuristics classification strategy
#[derive(Debug, Default)]
pub struct HeuristicStrategy;

impl HeuristicStrategy {
    pub fn new() -> Self {
        HeuristicStrategy
    }
}

impl ClassifyStrategy for HeuristicStrategy {
    fn name(&self) -> &'static str {
        "heuristics"
    }

    fn classify(&self, layer_name: &str, block_name: Option<&str>) -> Option<Classification> {
        let trimmed = layer_name.trim();
        for rule in RULES.iter() {
            let Some(caps) = rule.pattern.captures(trimmed) else {
                continue;
            };
            let Some((object_type, properties)) = (rule.build)(&caps, block_name) else {
                continue;
            };
            debug!(
                layer = trimmed,
                rule = rule.name,
                object_type = %object_type,
                "heuristic match"
            );
            return Some(Classification {
                object_type,
                confidence: rule.confidence,
                properties,
                canonical_layer_name: None,
                tier: Some(ClassifierTier::Heuristic),
            });
        }
        None
    }
}

fn system_property(bag: &mut PropertyBag, system: UtilitySystem) {
    bag.insert(
        keys::UTILITY_SYSTEM.to_string(),
        PropertyValue::Text(system.token().to_string()),
    );
}

fn phase_property(bag: &mut PropertyBag, raw: Option<&str>) {
    if let Some(phase) = raw.and_then(normalize_phase) {
        bag.insert(keys::PHASE.to_string(), PropertyValue::Text(phase.to_string()));
    }
}

fn build_diameter_system(caps: &Captures, _block: Option<&str>) -> Option<(ObjectType, PropertyBag)> {
    let system = UtilitySystem::parse(caps.name("sys")?.as_str())?;
    let diameter: i64 = caps.name("dia")?.as_str().parse().ok()?;

    let mut bag = PropertyBag::new();
    system_property(&mut bag, system);
    bag.insert(
        keys::DIAMETER_IN.to_string(),
        PropertyValue::Integer(diameter),
    );
    phase_property(&mut bag, caps.name("phase").map(|m| m.as_str()));
    Some((ObjectType::UtilityLine, bag))
}

fn build_manhole(caps: &Captures, _block: Option<&str>) -> Option<(ObjectType, PropertyBag)> {
    let system = UtilitySystem::parse(caps.name("sys")?.as_str())?;
    let mut bag = PropertyBag::new();
    system_property(&mut bag, system);
    bag.insert(
        keys::STRUCTURE_KIND.to_string(),
        PropertyValue::Text("manhole".to_string()),
    );
    Some((ObjectType::UtilityStructure, bag))
}

fn build_storm_structure(caps: &Captures, _block: Option<&str>) -> Option<(ObjectType, PropertyBag)> {
    let kind = match caps
        .name("kind")?
        .as_str()
        .to_ascii_uppercase()
        .replace([' ', '_'], "-")
        .as_str()
    {
        "CB" | "CATCH-BASIN" | "CATCHBASIN" => "catch_basin",
        "INLET" => "inlet",
        _ => "junction_box",
    };
    let mut bag = PropertyBag::new();
    // catch basins and inlets are storm collection by definition
    system_property(&mut bag, UtilitySystem::Storm);
    bag.insert(
        keys::STRUCTURE_KIND.to_string(),
        PropertyValue::Text(kind.to_string()),
    );
    Some((ObjectType::UtilityStructure, bag))
}

fn build_service(caps: &Captures, _block: Option<&str>) -> Option<(ObjectType, PropertyBag)> {
    let system = UtilitySystem::parse(caps.name("sys")?.as_str())?;
    let mut bag = PropertyBag::new();
    system_property(&mut bag, system);
    Some((ObjectType::ServiceConnection, bag))
}

fn build_utility_word(caps: &Captures, _block: Option<&str>) -> Option<(ObjectType, PropertyBag)> {
    let system = UtilitySystem::parse(caps.name("sys")?.as_str())?;
    let mut bag = PropertyBag::new();
    system_property(&mut bag, system);
    Some((ObjectType::UtilityLine, bag))
}

fn build_tree(caps: &Captures, _block: Option<&str>) -> Option<(ObjectType, PropertyBag)> {
    let mut bag = PropertyBag::new();
    if caps.name("ex").is_some() {
        bag.insert(
            keys::PHASE.to_string(),
            PropertyValue::Text("EXST".to_string()),
        );
    }
    Some((ObjectType::SiteTree, bag))
}

fn build_contour(caps: &Captures, _block: Option<&str>) -> Option<(ObjectType, PropertyBag)> {
    let mut bag = PropertyBag::new();
    if let Some(class) = caps.name("class") {
        let class = if class.as_str().to_ascii_uppercase().starts_with("MAJ") {
            "major"
        } else {
            "minor"
        };
        bag.insert(
            keys::CONTOUR_CLASS.to_string(),
            PropertyValue::Text(class.to_string()),
        );
    }
    Some((ObjectType::Contour, bag))
}

fn build_parcel(_caps: &Captures, _block: Option<&str>) -> Option<(ObjectType, PropertyBag)> {
    Some((ObjectType::Parcel, PropertyBag::new()))
}

fn build_spot(_caps: &Captures, _block: Option<&str>) -> Option<(ObjectType, PropertyBag)> {
    Some((ObjectType::SpotElevation, PropertyBag::new()))
}

fn build_light(_caps: &Captures, _block: Option<&str>) -> Option<(ObjectType, PropertyBag)> {
    Some((ObjectType::StreetLight, PropertyBag::new()))
}

fn build_survey(_caps: &Captures, _block: Option<&str>) -> Option<(ObjectType, PropertyBag)> {
    Some((ObjectType::SurveyPoint, PropertyBag::new()))
}

fn build_bmp(_caps: &Captures, _block: Option<&str>) -> Option<(ObjectType, PropertyBag)> {
    Some((ObjectType::Bmp, PropertyBag::new()))
}

fn build_block_structure(caps: &Captures, block: Option<&str>) -> Option<(ObjectType, PropertyBag)> {
    let block = block?.to_ascii_uppercase();
    let kind = if block.starts_with("MH") {
        "manhole"
    } else if block.starts_with("CB") {
        "catch_basin"
    } else if block.starts_with("INLET") {
        "inlet"
    } else if block.starts_with("JB") || block.starts_with("VAULT") {
        "junction_box"
    } else {
        return None;
    };

    let system = UtilitySystem::parse(caps.name("sys")?.as_str())?;
    let mut bag = PropertyBag::new();
    system_property(&mut bag, system);
    bag.insert(
        keys::STRUCTURE_KIND.to_string(),
        PropertyValue::Text(kind.to_string()),
    );
    Some((ObjectType::UtilityStructure, bag))
}
