//! Tier 2: configurable layer-name mapping table
//!
//! Clients bring their own layer standards (or none at all). A mapping
//! table is a data-driven list of records translating client or legacy
//! layer names to standard classifications, loaded from JSON at run setup.
//! Confidence comes from the record, not from code, so a client can grade
//! how trustworthy each of their conventions is.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{Classification, ClassifierTier, ClassifyStrategy};
use crate::error::{BridgeError, Result};
use crate::types::{ObjectType, PropertyBag};

/// One client/legacy layer-name mapping
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MappingRecord {
    /// Layer name to match, case-insensitive. A trailing `*` matches any
    /// suffix (`XSTRM*` matches `XSTRM-OLD`).
    pub pattern: String,
    /// Standard object type the layer maps to
    pub object_type: ObjectType,
    /// Classifier confidence this record supplies
    pub confidence: f64,
    /// Properties attached to every match
    #[serde(default)]
    pub properties: PropertyBag,
    /// Canonical layer name for export, when the client standard has one
    #[serde(default)]
    pub canonical_layer_name: Option<String>,
}

impl MappingRecord {
    fn matches(&self, layer_name: &str) -> bool {
        let pattern = self.pattern.to_ascii_uppercase();
        let name = layer_name.trim().to_ascii_uppercase();
        match pattern.strip_suffix('*') {
            Some(prefix) => name.starts_with(prefix),
            None => name == pattern,
        }
    }
}

/// An ordered set of mapping records; earlier records win
#[derive(Debug, Clone, Default)]
pub struct MappingTable {
    records: Vec<MappingRecord>,
}

impl MappingTable {
    /// An empty table (tier 2 never matches)
    pub fn empty() -> Self {
        MappingTable::default()
    }

    pub fn new(records: Vec<MappingRecord>) -> Self {
        MappingTable { records }
    }

    /// Load records from a JSON array
    pub fn from_json(json: &str) -> Result<Self> {
        let records: Vec<MappingRecord> = serde_json::from_str(json)
            .map_err(|e| BridgeError::MappingTable(e.to_string()))?;
        for record in &records {
            if !(0.0..=1.0).contains(&record.confidence) {
                return Err(BridgeError::MappingTable(format!(
                    "confidence {} out of range for pattern {:?}",
                    record.confidence, record.pattern
                )));
            }
        }
        Ok(MappingTable::new(records))
    }

    pub fn add(&mut self, record: MappingRecord) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// First record matching the layer name, in table order
    pub fn lookup(&self, layer_name: &str) -> Option<&MappingRecord> {
        self.records.iter().find(|r| r.matches(layer_name))
    }
}

impl ClassifyStrategy for MappingTable {
    fn name(&self) -> &'static str {
        "mapping"
    }

    fn classify(&self, layer_name: &str, _block_name: Option<&str>) -> Option<Classification> {
        let record = self.lookup(layer_name)?;
        debug!(
            layer = layer_name,
            pattern = %record.pattern,
            object_type = %record.object_type,
            "mapping table match"
        );
        Some(Classification {
            object_type: record.object_type,
            confidence: record.confidence,
            properties: record.properties.clone(),
            canonical_layer_name: record.canonical_layer_name.clone(),
            tier: Some(ClassifierTier::Mapping),
        })
    }
}
