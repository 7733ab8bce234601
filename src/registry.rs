//! Entity link registry types
//!
//! An [`EntityLink`] is the durable record tying a CAD entity's stable
//! handle to the domain object it produced. It is the sole record of
//! whether an entity is currently represented, conflicted, or removed —
//! domain rows themselves are never physically deleted. Links live in the
//! datastore (see [`crate::store::SpatialStore`]) and are read and written
//! inside the same transaction as the mutations they describe.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::{DomainTable, DrawingId, ObjectId, ObjectType, ProjectId, StableHandle};

/// Synchronization state of one entity link
///
/// ```text
/// active ──geometry/layer change──▶ synced
/// active ──failed reclassification──▶ conflict   (terminal)
/// active/synced ──absent from re-import──▶ deleted (terminal)
/// ```
///
/// `Conflict` and `Deleted` are terminal for automatic processing; the
/// reconciler never resolves either on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncState {
    /// Created or confirmed; matches the current drawing geometry
    Active,
    /// Updated to match a detected change
    Synced,
    /// A layer rename could not be reconciled confidently
    Conflict,
    /// Absent from the latest re-import
    Deleted,
}

impl SyncState {
    /// Whether automatic processing must leave this link alone
    pub fn is_terminal(&self) -> bool {
        matches!(self, SyncState::Conflict | SyncState::Deleted)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SyncState::Active => "active",
            SyncState::Synced => "synced",
            SyncState::Conflict => "conflict",
            SyncState::Deleted => "deleted",
        }
    }
}

impl fmt::Display for SyncState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Natural key of an entity link
///
/// `drawing` is `None` for project-level imports; uniqueness is then
/// scoped to "drawing is null" (a partial-uniqueness constraint on the
/// datastore side).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LinkKey {
    pub project: ProjectId,
    pub drawing: Option<DrawingId>,
    pub handle: StableHandle,
}

impl LinkKey {
    pub fn new(project: ProjectId, drawing: Option<DrawingId>, handle: StableHandle) -> Self {
        LinkKey {
            project,
            drawing,
            handle,
        }
    }
}

/// Durable link from a CAD entity to the domain object it produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityLink {
    pub key: LinkKey,
    /// Type of the linked domain object (`Unclassified` for review rows)
    pub object_type: ObjectType,
    pub object_id: ObjectId,
    /// Quantized content hash of the geometry as last written
    pub geometry_hash: u64,
    /// Source layer name as last seen
    pub layer_name: String,
    pub sync_state: SyncState,
}

impl EntityLink {
    /// A fresh link in the initial `Active` state
    pub fn new(
        key: LinkKey,
        object_type: ObjectType,
        object_id: ObjectId,
        geometry_hash: u64,
        layer_name: impl Into<String>,
    ) -> Self {
        EntityLink {
            key,
            object_type,
            object_id,
            geometry_hash,
            layer_name: layer_name.into(),
            sync_state: SyncState::Active,
        }
    }

    /// The table the linked object lives in
    pub fn table(&self) -> DomainTable {
        self.object_type.table()
    }
}
