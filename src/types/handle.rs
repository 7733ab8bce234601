//! Stable handle type for CAD entities
//!
//! A stable handle is the opaque per-drawing identifier that names one CAD
//! entity across repeated decodes of the same drawing revision. It is the
//! natural key the entity link registry is built on.

use std::fmt;

use serde::{Deserialize, Serialize};

/// An opaque identifier for one CAD entity within a drawing
///
/// Handles are 64-bit unsigned integers assigned by the upstream CAD
/// decoder. Handle 0 is reserved and invalid. A handle is unique within a
/// single decode of a drawing and stable across decodes of the same
/// drawing revision.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct StableHandle(u64);

impl StableHandle {
    /// The null/invalid handle (0)
    pub const NULL: StableHandle = StableHandle(0);

    /// Create a new handle from a u64 value
    #[inline]
    pub const fn new(value: u64) -> Self {
        StableHandle(value)
    }

    /// Get the raw u64 value
    #[inline]
    pub const fn value(&self) -> u64 {
        self.0
    }

    /// Check if this is a null/invalid handle
    #[inline]
    pub const fn is_null(&self) -> bool {
        self.0 == 0
    }

    /// Check if this is a valid handle
    #[inline]
    pub const fn is_valid(&self) -> bool {
        self.0 != 0
    }
}

impl Default for StableHandle {
    fn default() -> Self {
        StableHandle::NULL
    }
}

impl From<u64> for StableHandle {
    fn from(value: u64) -> Self {
        StableHandle(value)
    }
}

impl From<StableHandle> for u64 {
    fn from(handle: StableHandle) -> Self {
        handle.0
    }
}

impl fmt::Display for StableHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#X}", self.0)
    }
}
