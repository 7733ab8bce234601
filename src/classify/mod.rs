//! Layer classification
//!
//! Turns a free-text layer name (plus an optional block name) into a typed
//! civil-engineering classification with a confidence score. Three
//! escalating strategies share one [`ClassifyStrategy`] capability and are
//! tried in order; the first success wins:
//!
//! 1. [`GrammarStrategy`] — the structured layer-name grammar (0.95)
//! 2. [`MappingTable`] — client/legacy mappings (record-supplied confidence)
//! 3. [`HeuristicStrategy`] — legacy idiom regexes (0.75–0.90)
//!
//! No match is a valid outcome: the result is
//! [`Classification::unclassified`], which routes the entity to review
//! downstream. Classification is pure and stateless — the same inputs
//! always produce the same result — which is what makes the parallel batch
//! helper sound.

pub mod grammar;
pub mod heuristics;
pub mod mapping;
pub mod vocabulary;

pub use grammar::{GrammarStrategy, GRAMMAR_CONFIDENCE};
pub use heuristics::{HeuristicStrategy, HEURISTIC_MAX_CONFIDENCE, HEURISTIC_MIN_CONFIDENCE};
pub use mapping::{MappingRecord, MappingTable};

use rayon::prelude::*;
use tracing::trace;

use crate::types::{ObjectType, PropertyBag};

/// Which tier produced a classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassifierTier {
    Grammar,
    Mapping,
    Heuristic,
}

/// The outcome of classifying one layer name
///
/// Ephemeral: consumed by the dispatcher and reconciler, never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub object_type: ObjectType,
    /// Classifier certainty in [0, 1]
    pub confidence: f64,
    pub properties: PropertyBag,
    /// Standards-conforming name for export, when one is known
    pub canonical_layer_name: Option<String>,
    /// Tier that produced the result; `None` for unclassified
    pub tier: Option<ClassifierTier>,
}

impl Classification {
    /// The neutral no-match result
    pub fn unclassified() -> Self {
        Classification {
            object_type: ObjectType::Unclassified,
            confidence: 0.0,
            properties: PropertyBag::new(),
            canonical_layer_name: None,
            tier: None,
        }
    }

    pub fn is_unclassified(&self) -> bool {
        self.object_type == ObjectType::Unclassified
    }
}

/// One classification strategy in the fallback chain
pub trait ClassifyStrategy: Send + Sync {
    /// Strategy name for diagnostics
    fn name(&self) -> &'static str;

    /// Attempt to classify; `None` hands off to the next strategy
    fn classify(&self, layer_name: &str, block_name: Option<&str>) -> Option<Classification>;
}

/// The three-tier layer classifier
pub struct LayerClassifier {
    strategies: Vec<Box<dyn ClassifyStrategy>>,
}

impl LayerClassifier {
    /// A classifier with no client mapping table
    pub fn new() -> Self {
        Self::with_mapping_table(MappingTable::empty())
    }

    /// A classifier using the given tier-2 mapping table
    pub fn with_mapping_table(table: MappingTable) -> Self {
        LayerClassifier {
            strategies: vec![
                Box::new(GrammarStrategy::new()),
                Box::new(table),
                Box::new(HeuristicStrategy::new()),
            ],
        }
    }

    /// Classify one layer name
    ///
    /// Never fails; a name no tier recognizes comes back unclassified.
    pub fn classify(&self, layer_name: &str, block_name: Option<&str>) -> Classification {
        for strategy in &self.strategies {
            if let Some(result) = strategy.classify(layer_name, block_name) {
                trace!(
                    layer = layer_name,
                    strategy = strategy.name(),
                    confidence = result.confidence,
                    "classified"
                );
                return result;
            }
        }
        trace!(layer = layer_name, "unclassified");
        Classification::unclassified()
    }

    /// Classify a batch of (layer, block) pairs in input order
    pub fn classify_batch(
        &self,
        names: &[(String, Option<String>)],
    ) -> Vec<Classification> {
        names
            .iter()
            .map(|(layer, block)| self.classify(layer, block.as_deref()))
            .collect()
    }

    /// [`Self::classify_batch`] across worker threads
    ///
    /// Output order matches input order. Sound because classification is
    /// pure and the strategies hold no mutable state.
    pub fn classify_batch_par(
        &self,
        names: &[(String, Option<String>)],
    ) -> Vec<Classification> {
        names
            .par_iter()
            .map(|(layer, block)| self.classify(layer, block.as_deref()))
            .collect()
    }
}

impl Default for LayerClassifier {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::keys;

    #[test]
    fn test_tier_order() {
        let mut table = MappingTable::empty();
        table.add(MappingRecord {
            // shadows a grammar-valid name; grammar must still win
            pattern: "CIV-UTIL-STORM-NEW-LN".to_string(),
            object_type: ObjectType::Parcel,
            confidence: 0.99,
            properties: PropertyBag::new(),
            canonical_layer_name: None,
        });
        let classifier = LayerClassifier::with_mapping_table(table);

        let c = classifier.classify("CIV-UTIL-STORM-NEW-LN", None);
        assert_eq!(c.tier, Some(ClassifierTier::Grammar));
        assert_eq!(c.object_type, ObjectType::UtilityLine);
    }

    #[test]
    fn test_mapping_beats_heuristics() {
        let mut table = MappingTable::empty();
        table.add(MappingRecord {
            pattern: "12IN-STORM".to_string(),
            object_type: ObjectType::ServiceConnection,
            confidence: 0.8,
            properties: PropertyBag::new(),
            canonical_layer_name: None,
        });
        let classifier = LayerClassifier::with_mapping_table(table);

        let c = classifier.classify("12IN-STORM", None);
        assert_eq!(c.tier, Some(ClassifierTier::Mapping));
        assert_eq!(c.object_type, ObjectType::ServiceConnection);
    }

    #[test]
    fn test_heuristic_fallback() {
        let classifier = LayerClassifier::new();
        let c = classifier.classify("12IN-STORM", None);
        assert_eq!(c.tier, Some(ClassifierTier::Heuristic));
        assert_eq!(c.object_type, ObjectType::UtilityLine);
        assert_eq!(c.properties[keys::DIAMETER_IN].as_integer(), Some(12));
    }

    #[test]
    fn test_unclassified_is_valid_result() {
        let classifier = LayerClassifier::new();
        let c = classifier.classify("DEFPOINTS", None);
        assert!(c.is_unclassified());
        assert_eq!(c.confidence, 0.0);
        assert_eq!(c.tier, None);
    }

    #[test]
    fn test_classify_is_pure() {
        let classifier = LayerClassifier::new();
        let a = classifier.classify("SD-12-NEW", None);
        let b = classifier.classify("SD-12-NEW", None);
        assert_eq!(a, b);
    }

    #[test]
    fn test_batch_orders_match() {
        let classifier = LayerClassifier::new();
        let names: Vec<(String, Option<String>)> = vec![
            ("CIV-UTIL-STORM-12IN-NEW-LN".to_string(), None),
            ("MH-STORM".to_string(), None),
            ("DEFPOINTS".to_string(), None),
        ];
        let seq = classifier.classify_batch(&names);
        let par = classifier.classify_batch_par(&names);
        assert_eq!(seq, par);
        assert_eq!(seq[0].object_type, ObjectType::UtilityLine);
        assert_eq!(seq[1].object_type, ObjectType::UtilityStructure);
        assert!(seq[2].is_unclassified());
    }
}
