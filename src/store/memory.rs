//! In-memory datastore
//!
//! A complete [`SpatialStore`] implementation backed by ordered maps.
//! Used by the test suite and the diagnostic binaries; also documents the
//! semantics a real datastore adapter must provide (notably the partial
//! uniqueness of link keys when `drawing` is null, which falls out of
//! [`LinkKey`] equality here).

use indexmap::IndexMap;

use super::{DomainObject, NetworkKey, NewDomainObject, SpatialStore};
use crate::error::{BridgeError, Result};
use crate::registry::{EntityLink, LinkKey};
use crate::types::{DomainTable, DrawingId, LayerId, NetworkId, ObjectId, ProjectId, PropertyBag};

#[derive(Debug, Clone, Default)]
struct StoreData {
    objects: IndexMap<(DomainTable, ObjectId), DomainObject>,
    layers: IndexMap<(ProjectId, String), LayerId>,
    networks: IndexMap<NetworkKey, NetworkId>,
    network_members: Vec<(NetworkId, DomainTable, ObjectId)>,
    links: IndexMap<LinkKey, EntityLink>,
    next_object_id: u64,
    next_layer_id: u64,
    next_network_id: u64,
}

/// In-memory spatial datastore with snapshot transactions
#[derive(Debug, Default)]
pub struct MemoryStore {
    data: StoreData,
    snapshot: Option<Box<StoreData>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }

    // ---- inspection helpers (not part of the store contract) ----

    /// Look up a stored row
    pub fn object(&self, table: DomainTable, id: ObjectId) -> Option<&DomainObject> {
        self.data.objects.get(&(table, id))
    }

    /// All rows in a table, in insertion order
    pub fn objects_in(&self, table: DomainTable) -> impl Iterator<Item = &DomainObject> {
        self.data
            .objects
            .iter()
            .filter(move |((t, _), _)| *t == table)
            .map(|(_, object)| object)
    }

    /// Row count for a table
    pub fn object_count(&self, table: DomainTable) -> usize {
        self.objects_in(table).count()
    }

    /// Total row count across all tables
    pub fn total_objects(&self) -> usize {
        self.data.objects.len()
    }

    /// Look up a link by natural key
    pub fn link(&self, key: &LinkKey) -> Option<&EntityLink> {
        self.data.links.get(key)
    }

    /// Number of stored links
    pub fn link_count(&self) -> usize {
        self.data.links.len()
    }

    /// Number of distinct networks
    pub fn network_count(&self) -> usize {
        self.data.networks.len()
    }

    /// Members attached to a network
    pub fn network_members(&self, network: NetworkId) -> Vec<(DomainTable, ObjectId)> {
        self.data
            .network_members
            .iter()
            .filter(|(n, _, _)| *n == network)
            .map(|(_, table, id)| (*table, *id))
            .collect()
    }

    /// Look up a network id by key
    pub fn network(&self, key: &NetworkKey) -> Option<NetworkId> {
        self.data.networks.get(key).copied()
    }

    /// Look up a layer id by project and canonical name
    pub fn layer(&self, project: ProjectId, name: &str) -> Option<LayerId> {
        self.data.layers.get(&(project, name.to_string())).copied()
    }
}

impl SpatialStore for MemoryStore {
    fn begin(&mut self) -> Result<()> {
        if self.snapshot.is_some() {
            return Err(BridgeError::Transaction(
                "transaction already open".to_string(),
            ));
        }
        self.snapshot = Some(Box::new(self.data.clone()));
        Ok(())
    }

    fn commit(&mut self) -> Result<()> {
        self.snapshot
            .take()
            .map(|_| ())
            .ok_or_else(|| BridgeError::Transaction("no open transaction".to_string()))
    }

    fn rollback(&mut self) -> Result<()> {
        match self.snapshot.take() {
            Some(snapshot) => {
                self.data = *snapshot;
                Ok(())
            }
            None => Err(BridgeError::Transaction(
                "no open transaction".to_string(),
            )),
        }
    }

    fn insert_object(&mut self, table: DomainTable, object: NewDomainObject) -> Result<ObjectId> {
        self.data.next_object_id += 1;
        let id = ObjectId(self.data.next_object_id);
        let row = DomainObject {
            id,
            table,
            project: object.project,
            object_type: object.object_type,
            name: object.name,
            ewkt: object.ewkt,
            srid: object.srid,
            layer: object.layer,
            properties: object.properties,
            needs_review: object.needs_review,
            source_layer: object.source_layer,
        };
        self.data.objects.insert((table, id), row);
        Ok(id)
    }

    fn update_geometry(&mut self, table: DomainTable, id: ObjectId, ewkt: &str) -> Result<()> {
        let row = self
            .data
            .objects
            .get_mut(&(table, id))
            .ok_or(BridgeError::ObjectNotFound { table, id })?;
        row.ewkt = ewkt.to_string();
        Ok(())
    }

    fn update_properties(
        &mut self,
        table: DomainTable,
        id: ObjectId,
        properties: &PropertyBag,
        source_layer: &str,
    ) -> Result<()> {
        let row = self
            .data
            .objects
            .get_mut(&(table, id))
            .ok_or(BridgeError::ObjectNotFound { table, id })?;
        row.properties = properties.clone();
        row.source_layer = source_layer.to_string();
        Ok(())
    }

    fn find_by_name(
        &self,
        table: DomainTable,
        project: ProjectId,
        name: &str,
    ) -> Result<Option<ObjectId>> {
        Ok(self
            .objects_in(table)
            .find(|o| o.project == project && o.name == name)
            .map(|o| o.id))
    }

    fn ensure_layer(&mut self, project: ProjectId, name: &str) -> Result<LayerId> {
        let key = (project, name.to_string());
        if let Some(id) = self.data.layers.get(&key) {
            return Ok(*id);
        }
        self.data.next_layer_id += 1;
        let id = LayerId(self.data.next_layer_id);
        self.data.layers.insert(key, id);
        Ok(id)
    }

    fn ensure_network(&mut self, key: &NetworkKey) -> Result<NetworkId> {
        if let Some(id) = self.data.networks.get(key) {
            return Ok(*id);
        }
        self.data.next_network_id += 1;
        let id = NetworkId(self.data.next_network_id);
        self.data.networks.insert(*key, id);
        Ok(id)
    }

    fn attach_to_network(
        &mut self,
        network: NetworkId,
        table: DomainTable,
        object: ObjectId,
    ) -> Result<()> {
        if !self
            .data
            .network_members
            .contains(&(network, table, object))
        {
            self.data.network_members.push((network, table, object));
        }
        Ok(())
    }

    fn load_links(
        &self,
        project: ProjectId,
        drawing: Option<DrawingId>,
    ) -> Result<Vec<EntityLink>> {
        Ok(self
            .data
            .links
            .values()
            .filter(|l| l.key.project == project && l.key.drawing == drawing)
            .cloned()
            .collect())
    }

    fn upsert_link(&mut self, link: &EntityLink) -> Result<()> {
        self.data.links.insert(link.key, link.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::SyncState;
    use crate::types::{NetworkMode, ObjectType, Srid, StableHandle, UtilitySystem};

    fn new_object(project: ProjectId, name: &str) -> NewDomainObject {
        NewDomainObject {
            project,
            object_type: ObjectType::UtilityLine,
            name: name.to_string(),
            ewkt: "SRID=2230;LINESTRING Z (0 0 0, 10 0 0)".to_string(),
            srid: Srid(2230),
            layer: None,
            properties: PropertyBag::new(),
            needs_review: false,
            source_layer: "12IN-STORM".to_string(),
        }
    }

    #[test]
    fn test_insert_and_lookup() {
        let mut store = MemoryStore::new();
        let id = store
            .insert_object(DomainTable::Pipes, new_object(ProjectId(1), "P-1"))
            .unwrap();
        let row = store.object(DomainTable::Pipes, id).unwrap();
        assert_eq!(row.name, "P-1");
        assert_eq!(
            store.find_by_name(DomainTable::Pipes, ProjectId(1), "P-1").unwrap(),
            Some(id)
        );
        assert_eq!(
            store.find_by_name(DomainTable::Pipes, ProjectId(2), "P-1").unwrap(),
            None
        );
    }

    #[test]
    fn test_ensure_layer_is_idempotent() {
        let mut store = MemoryStore::new();
        let a = store.ensure_layer(ProjectId(1), "CIV-UTIL-STORM-NEW-LN").unwrap();
        let b = store.ensure_layer(ProjectId(1), "CIV-UTIL-STORM-NEW-LN").unwrap();
        let c = store.ensure_layer(ProjectId(2), "CIV-UTIL-STORM-NEW-LN").unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_ensure_network_is_lazy_and_idempotent() {
        let mut store = MemoryStore::new();
        assert_eq!(store.network_count(), 0);
        let key = NetworkKey::new(ProjectId(1), UtilitySystem::Storm, NetworkMode::Gravity);
        let a = store.ensure_network(&key).unwrap();
        let b = store.ensure_network(&key).unwrap();
        assert_eq!(a, b);
        assert_eq!(store.network_count(), 1);
    }

    #[test]
    fn test_rollback_restores_state() {
        let mut store = MemoryStore::new();
        store
            .insert_object(DomainTable::Pipes, new_object(ProjectId(1), "KEEP"))
            .unwrap();

        store.begin().unwrap();
        store
            .insert_object(DomainTable::Pipes, new_object(ProjectId(1), "DISCARD"))
            .unwrap();
        store.rollback().unwrap();

        assert_eq!(store.object_count(DomainTable::Pipes), 1);
        assert!(store
            .find_by_name(DomainTable::Pipes, ProjectId(1), "DISCARD")
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_nested_transaction_is_error() {
        let mut store = MemoryStore::new();
        store.begin().unwrap();
        assert!(matches!(store.begin(), Err(BridgeError::Transaction(_))));
        store.commit().unwrap();
        assert!(matches!(store.commit(), Err(BridgeError::Transaction(_))));
    }

    #[test]
    fn test_link_scoping_by_drawing() {
        let mut store = MemoryStore::new();
        let drawing_link = EntityLink::new(
            LinkKey::new(ProjectId(1), Some(DrawingId(7)), StableHandle::new(1)),
            ObjectType::UtilityLine,
            ObjectId(1),
            1,
            "A",
        );
        let project_link = EntityLink::new(
            LinkKey::new(ProjectId(1), None, StableHandle::new(1)),
            ObjectType::Parcel,
            ObjectId(2),
            2,
            "B",
        );
        store.upsert_link(&drawing_link).unwrap();
        store.upsert_link(&project_link).unwrap();

        let in_drawing = store.load_links(ProjectId(1), Some(DrawingId(7))).unwrap();
        assert_eq!(in_drawing.len(), 1);
        assert_eq!(in_drawing[0].object_type, ObjectType::UtilityLine);

        let project_level = store.load_links(ProjectId(1), None).unwrap();
        assert_eq!(project_level.len(), 1);
        assert_eq!(project_level[0].object_type, ObjectType::Parcel);
    }

    #[test]
    fn test_upsert_replaces_by_key() {
        let mut store = MemoryStore::new();
        let key = LinkKey::new(ProjectId(1), Some(DrawingId(1)), StableHandle::new(9));
        let mut link = EntityLink::new(key, ObjectType::UtilityLine, ObjectId(1), 1, "L");
        store.upsert_link(&link).unwrap();

        link.sync_state = SyncState::Synced;
        link.geometry_hash = 99;
        store.upsert_link(&link).unwrap();

        assert_eq!(store.link_count(), 1);
        let stored = store.link(&key).unwrap();
        assert_eq!(stored.sync_state, SyncState::Synced);
        assert_eq!(stored.geometry_hash, 99);
    }
}
