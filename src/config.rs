//! Bridge configuration
//!
//! One `BridgeConfig` is shared by a whole import/reconciliation run. The
//! defaults encode the crate's documented contracts; override them only
//! when a project genuinely uses different tolerances.

/// Tunable parameters for classification, hashing and geometry comparison
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BridgeConfig {
    /// Linear tolerance for geometric comparisons (ring closure detection,
    /// round-trip assertions). Default 0.001 linear units.
    pub linear_tolerance: f64,
    /// Quantization step for the geometry content hash. Coordinates are
    /// snapped to this lattice before hashing so the hash changes iff the
    /// sequence moves beyond tolerance, independent of formatting.
    /// Default 0.0001 linear units.
    pub hash_quantum: f64,
    /// Classification confidence below which an entity is routed to the
    /// review table instead of a specialized one. Default 0.7.
    pub confidence_floor: f64,
}

impl BridgeConfig {
    pub fn new() -> Self {
        BridgeConfig {
            linear_tolerance: 1e-3,
            hash_quantum: 1e-4,
            confidence_floor: 0.7,
        }
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self::new()
    }
}
