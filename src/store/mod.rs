//! Downstream datastore collaborator
//!
//! The real spatial datastore (transactions, WKT/CRS geometry functions,
//! the table catalog) is outside this crate. [`SpatialStore`] is the
//! interface the core writes through; [`MemoryStore`] is a complete
//! in-memory implementation used by tests and diagnostics.

pub mod memory;

pub use memory::MemoryStore;

use crate::error::Result;
use crate::registry::EntityLink;
use crate::types::{
    DomainTable, DrawingId, LayerId, NetworkId, NetworkMode, ObjectId, ObjectType, ProjectId,
    PropertyBag, Srid, UtilitySystem,
};

/// Scope of one import/reconciliation run
///
/// `drawing` is `None` for a project-level import. The SRID applies to
/// every geometry written during the run; there is no datastore default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportScope {
    pub project: ProjectId,
    pub drawing: Option<DrawingId>,
    pub srid: Srid,
}

impl ImportScope {
    pub fn new(project: ProjectId, drawing: Option<DrawingId>, srid: Srid) -> Self {
        ImportScope {
            project,
            drawing,
            srid,
        }
    }
}

/// Key of a logical utility network
///
/// Networks are created lazily on first sighting of a member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NetworkKey {
    pub project: ProjectId,
    pub system: UtilitySystem,
    pub mode: NetworkMode,
}

impl NetworkKey {
    pub fn new(project: ProjectId, system: UtilitySystem, mode: NetworkMode) -> Self {
        NetworkKey {
            project,
            system,
            mode,
        }
    }
}

/// A domain object row to be created
#[derive(Debug, Clone, PartialEq)]
pub struct NewDomainObject {
    pub project: ProjectId,
    pub object_type: ObjectType,
    /// Human-readable label; unique per (project, table) for derived-name
    /// types like surfaces
    pub name: String,
    /// EWKT geometry with explicit Z and SRID
    pub ewkt: String,
    pub srid: Srid,
    pub layer: Option<LayerId>,
    pub properties: PropertyBag,
    pub needs_review: bool,
    /// Layer name the source entity carried
    pub source_layer: String,
}

/// A stored domain object row
///
/// Rows are never physically deleted; removal is recorded on the entity
/// link instead.
#[derive(Debug, Clone, PartialEq)]
pub struct DomainObject {
    pub id: ObjectId,
    pub table: DomainTable,
    pub project: ProjectId,
    pub object_type: ObjectType,
    pub name: String,
    pub ewkt: String,
    pub srid: Srid,
    pub layer: Option<LayerId>,
    pub properties: PropertyBag,
    pub needs_review: bool,
    pub source_layer: String,
}

/// Interface to the spatial datastore
///
/// One reconciliation run executes inside one transaction; callers
/// serialize runs per (project, drawing) scope. Entity links must be read
/// and written within the same transaction to prevent double-creation
/// races.
pub trait SpatialStore {
    /// Open a transaction; fails if one is already open
    fn begin(&mut self) -> Result<()>;
    /// Commit the open transaction
    fn commit(&mut self) -> Result<()>;
    /// Roll back the open transaction
    fn rollback(&mut self) -> Result<()>;

    /// Insert a row, returning its id
    fn insert_object(&mut self, table: DomainTable, object: NewDomainObject) -> Result<ObjectId>;

    /// Replace a row's geometry (EWKT with explicit Z and SRID)
    fn update_geometry(&mut self, table: DomainTable, id: ObjectId, ewkt: &str) -> Result<()>;

    /// Replace a row's type-specific properties and source layer
    fn update_properties(
        &mut self,
        table: DomainTable,
        id: ObjectId,
        properties: &PropertyBag,
        source_layer: &str,
    ) -> Result<()>;

    /// Find a row by its derived name (idempotent-creation lookup)
    fn find_by_name(
        &self,
        table: DomainTable,
        project: ProjectId,
        name: &str,
    ) -> Result<Option<ObjectId>>;

    /// Get or create the per-project layer record with this canonical name
    fn ensure_layer(&mut self, project: ProjectId, name: &str) -> Result<LayerId>;

    /// Get or create the logical network for this key
    fn ensure_network(&mut self, key: &NetworkKey) -> Result<NetworkId>;

    /// Record network membership for an object
    fn attach_to_network(
        &mut self,
        network: NetworkId,
        table: DomainTable,
        object: ObjectId,
    ) -> Result<()>;

    /// Load every entity link in the scope
    ///
    /// A `None` drawing loads only project-level links (the partial
    /// uniqueness scope "drawing is null").
    fn load_links(&self, project: ProjectId, drawing: Option<DrawingId>)
        -> Result<Vec<EntityLink>>;

    /// Insert or replace the link with the same natural key
    fn upsert_link(&mut self, link: &EntityLink) -> Result<()>;
}
