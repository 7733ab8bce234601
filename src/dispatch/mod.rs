//! Intelligent object dispatcher
//!
//! Routes one classified CAD entity into the right domain table and wires
//! up the side records a creation implies: the canonical per-project layer
//! and, for utility types, membership in a logical network.
//!
//! Two rules keep the routing safe:
//!
//! - classification confidence below the configured floor (or no
//!   classification at all) goes unconditionally to the review table —
//!   no entity is ever silently lost;
//! - every specialized branch first checks that the geometry class is
//!   compatible with the target table; a mismatch is not an error, it is
//!   a quiet fallback to the review table.
//!
//! A dispatcher instance is run-scoped: its layer and network caches are
//! built during one import and reset before the next.

use ahash::AHashMap;
use tracing::{debug, warn};

use crate::classify::Classification;
use crate::config::BridgeConfig;
use crate::entities::DecodedCadEntity;
use crate::error::Result;
use crate::geometry::{to_ewkt, Geometry};
use crate::layer_name::generate_layer_name;
use crate::store::{ImportScope, NetworkKey, NewDomainObject, SpatialStore};
use crate::types::{
    keys, DomainTable, LayerId, NetworkId, NetworkMode, ObjectId, ObjectType, ProjectId,
    PropertyValue, UtilitySystem,
};

/// Outcome of a successful dispatch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Created {
    pub object_type: ObjectType,
    pub table: DomainTable,
    pub id: ObjectId,
    /// True when the entity landed in the review table
    pub needs_review: bool,
}

/// Routes classified entities into domain tables
pub struct ObjectDispatcher {
    config: BridgeConfig,
    layer_cache: AHashMap<(ProjectId, String), LayerId>,
    network_cache: AHashMap<NetworkKey, NetworkId>,
}

impl ObjectDispatcher {
    pub fn new(config: BridgeConfig) -> Self {
        ObjectDispatcher {
            config,
            layer_cache: AHashMap::new(),
            network_cache: AHashMap::new(),
        }
    }

    /// Drop all run-scoped caches
    ///
    /// Must be called between runs; cached layer and network ids are only
    /// valid within the transaction that created them.
    pub fn reset(&mut self) {
        self.layer_cache.clear();
        self.network_cache.clear();
    }

    /// Create the domain object for one classified entity
    ///
    /// Always creates something: either a specialized row or a review row.
    pub fn dispatch(
        &mut self,
        store: &mut dyn SpatialStore,
        entity: &DecodedCadEntity,
        geometry: &Geometry,
        classification: &Classification,
        scope: &ImportScope,
    ) -> Result<Created> {
        if classification.is_unclassified()
            || classification.confidence < self.config.confidence_floor
        {
            debug!(
                layer = %entity.layer_name,
                confidence = classification.confidence,
                "below confidence floor, routing to review"
            );
            return self.create_review(store, entity, geometry, classification, scope);
        }

        match self.create_specialized(store, entity, geometry, classification, scope)? {
            Some(created) => Ok(created),
            None => {
                warn!(
                    layer = %entity.layer_name,
                    object_type = %classification.object_type,
                    geometry_kind = %geometry.kind,
                    "geometry incompatible with classified type, routing to review"
                );
                self.create_review(store, entity, geometry, classification, scope)
            }
        }
    }

    /// Try the specialized table for the classified type
    ///
    /// Returns `Ok(None)` on a geometry-kind mismatch so the caller can
    /// fall back.
    fn create_specialized(
        &mut self,
        store: &mut dyn SpatialStore,
        entity: &DecodedCadEntity,
        geometry: &Geometry,
        classification: &Classification,
        scope: &ImportScope,
    ) -> Result<Option<Created>> {
        let object_type = classification.object_type;

        if let Some(required) = object_type.required_geometry() {
            if geometry.kind != required {
                return Ok(None);
            }
        }

        let table = object_type.table();
        let name = self.derive_name(entity, classification);

        // Derived-name singletons (surfaces) are created idempotently.
        if object_type == ObjectType::SurfaceModel {
            if let Some(existing) = store.find_by_name(table, scope.project, &name)? {
                debug!(name = %name, "reusing existing surface");
                return Ok(Some(Created {
                    object_type,
                    table,
                    id: existing,
                    needs_review: false,
                }));
            }
        }

        let canonical = self.canonical_layer_name(geometry, classification);
        let layer = self.ensure_layer(store, scope.project, &canonical)?;

        let id = store.insert_object(
            table,
            NewDomainObject {
                project: scope.project,
                object_type,
                name,
                ewkt: to_ewkt(geometry, scope.srid),
                srid: scope.srid,
                layer: Some(layer),
                properties: classification.properties.clone(),
                needs_review: false,
                source_layer: entity.layer_name.clone(),
            },
        )?;

        if object_type.is_network_bearing() {
            self.attach_network(store, table, id, classification, scope)?;
        }

        debug!(table = %table, id = %id, object_type = %object_type, "created domain object");
        Ok(Some(Created {
            object_type,
            table,
            id,
            needs_review: false,
        }))
    }

    /// Create the generic needs-review object
    ///
    /// Carries the original layer name, the raw geometry, and whatever
    /// classification was attempted, so nothing about the entity is lost.
    fn create_review(
        &mut self,
        store: &mut dyn SpatialStore,
        entity: &DecodedCadEntity,
        geometry: &Geometry,
        classification: &Classification,
        scope: &ImportScope,
    ) -> Result<Created> {
        let mut properties = classification.properties.clone();
        if !classification.is_unclassified() {
            properties.insert(
                "attempted_type".to_string(),
                PropertyValue::Text(classification.object_type.as_str().to_string()),
            );
            properties.insert(
                "attempted_confidence".to_string(),
                PropertyValue::Number(classification.confidence),
            );
        }

        let layer = self.ensure_layer(store, scope.project, &entity.layer_name)?;

        let id = store.insert_object(
            DomainTable::ReviewObjects,
            NewDomainObject {
                project: scope.project,
                object_type: ObjectType::Unclassified,
                name: format!("{}-{}", entity.layer_name, entity.handle),
                ewkt: to_ewkt(geometry, scope.srid),
                srid: scope.srid,
                layer: Some(layer),
                properties,
                needs_review: true,
                source_layer: entity.layer_name.clone(),
            },
        )?;

        Ok(Created {
            object_type: ObjectType::Unclassified,
            table: DomainTable::ReviewObjects,
            id,
            needs_review: true,
        })
    }

    fn derive_name(&self, entity: &DecodedCadEntity, classification: &Classification) -> String {
        if classification.object_type == ObjectType::SurfaceModel {
            // Surfaces are shared per project and named by their kind.
            let kind = classification
                .properties
                .get(keys::SURFACE_KIND)
                .and_then(|v| v.as_text())
                .unwrap_or("fg");
            return kind.to_ascii_uppercase();
        }
        format!("{}-{}", entity.layer_name, entity.handle)
    }

    fn canonical_layer_name(
        &self,
        geometry: &Geometry,
        classification: &Classification,
    ) -> String {
        classification
            .canonical_layer_name
            .clone()
            .unwrap_or_else(|| {
                generate_layer_name(
                    classification.object_type,
                    &classification.properties,
                    geometry.kind,
                )
            })
    }

    fn ensure_layer(
        &mut self,
        store: &mut dyn SpatialStore,
        project: ProjectId,
        name: &str,
    ) -> Result<LayerId> {
        let key = (project, name.to_string());
        if let Some(id) = self.layer_cache.get(&key) {
            return Ok(*id);
        }
        let id = store.ensure_layer(project, name)?;
        self.layer_cache.insert(key, id);
        Ok(id)
    }

    fn attach_network(
        &mut self,
        store: &mut dyn SpatialStore,
        table: DomainTable,
        id: ObjectId,
        classification: &Classification,
        scope: &ImportScope,
    ) -> Result<()> {
        let Some(system) = classification
            .properties
            .get(keys::UTILITY_SYSTEM)
            .and_then(|v| v.as_text())
            .and_then(UtilitySystem::parse)
        else {
            debug!(table = %table, id = %id, "no utility system, skipping network attach");
            return Ok(());
        };

        let mode = classification
            .properties
            .get(keys::NETWORK_MODE)
            .and_then(|v| v.as_text())
            .and_then(NetworkMode::parse)
            .unwrap_or_else(|| system.default_mode());

        let key = NetworkKey::new(scope.project, system, mode);
        let network = match self.network_cache.get(&key) {
            Some(id) => *id,
            None => {
                let id = store.ensure_network(&key)?;
                self.network_cache.insert(key, id);
                id
            }
        };

        store.attach_to_network(network, table, id)?;
        debug!(network = %network, system = %system, mode = %mode, "attached to network");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::LayerClassifier;
    use crate::entities::NativeShape;
    use crate::geometry::decode;
    use crate::store::MemoryStore;
    use crate::types::{DrawingId, Point3, Srid, StableHandle};

    fn scope() -> ImportScope {
        ImportScope::new(ProjectId(1), Some(DrawingId(1)), Srid(2230))
    }

    fn line_entity(handle: u64, layer: &str) -> DecodedCadEntity {
        DecodedCadEntity::new(
            StableHandle::new(handle),
            layer,
            NativeShape::Line {
                start: Point3::new(0.0, 0.0, 0.0),
                end: Point3::new(50.0, 0.0, -0.5),
            },
        )
    }

    fn point_entity(handle: u64, layer: &str) -> DecodedCadEntity {
        DecodedCadEntity::new(
            StableHandle::new(handle),
            layer,
            NativeShape::Point {
                location: Point3::new(5.0, 5.0, 101.0),
            },
        )
    }

    fn dispatch(
        store: &mut MemoryStore,
        dispatcher: &mut ObjectDispatcher,
        entity: &DecodedCadEntity,
    ) -> Created {
        let classifier = LayerClassifier::new();
        let classification = classifier.classify(&entity.layer_name, entity.block_name.as_deref());
        let geometry = decode(&entity.shape).unwrap();
        dispatcher
            .dispatch(store, entity, &geometry, &classification, &scope())
            .unwrap()
    }

    #[test]
    fn test_pipe_creation_with_network() {
        let mut store = MemoryStore::new();
        let mut dispatcher = ObjectDispatcher::new(BridgeConfig::default());

        let created = dispatch(&mut store, &mut dispatcher, &line_entity(1, "12IN-STORM"));
        assert_eq!(created.object_type, ObjectType::UtilityLine);
        assert_eq!(created.table, DomainTable::Pipes);
        assert!(!created.needs_review);

        let row = store.object(DomainTable::Pipes, created.id).unwrap();
        assert!(row.ewkt.starts_with("SRID=2230;LINESTRING Z"));
        assert_eq!(row.properties[keys::DIAMETER_IN].as_integer(), Some(12));

        // storm defaults to a gravity network, created lazily
        let key = NetworkKey::new(ProjectId(1), UtilitySystem::Storm, NetworkMode::Gravity);
        let network = store.network(&key).unwrap();
        assert_eq!(
            store.network_members(network),
            vec![(DomainTable::Pipes, created.id)]
        );
    }

    #[test]
    fn test_structure_creation() {
        let mut store = MemoryStore::new();
        let mut dispatcher = ObjectDispatcher::new(BridgeConfig::default());

        let created = dispatch(&mut store, &mut dispatcher, &point_entity(2, "MH-STORM"));
        assert_eq!(created.object_type, ObjectType::UtilityStructure);
        assert_eq!(created.table, DomainTable::Structures);
        let row = store.object(DomainTable::Structures, created.id).unwrap();
        // elevation survives into the stored geometry
        assert!(row.ewkt.contains("101"));
    }

    #[test]
    fn test_water_defaults_to_pressure_network() {
        let mut store = MemoryStore::new();
        let mut dispatcher = ObjectDispatcher::new(BridgeConfig::default());

        dispatch(&mut store, &mut dispatcher, &line_entity(3, "8IN-WATER"));
        let key = NetworkKey::new(ProjectId(1), UtilitySystem::Water, NetworkMode::Pressure);
        assert!(store.network(&key).is_some());
    }

    #[test]
    fn test_shape_mismatch_routes_to_review() {
        let mut store = MemoryStore::new();
        let mut dispatcher = ObjectDispatcher::new(BridgeConfig::default());

        // a pipe-classified layer on a point entity
        let created = dispatch(&mut store, &mut dispatcher, &point_entity(4, "12IN-STORM"));
        assert_eq!(created.table, DomainTable::ReviewObjects);
        assert!(created.needs_review);

        let row = store.object(DomainTable::ReviewObjects, created.id).unwrap();
        assert_eq!(row.source_layer, "12IN-STORM");
        assert_eq!(
            row.properties["attempted_type"].as_text(),
            Some("utility_line")
        );
        assert_eq!(store.object_count(DomainTable::Pipes), 0);
    }

    #[test]
    fn test_unclassified_routes_to_review() {
        let mut store = MemoryStore::new();
        let mut dispatcher = ObjectDispatcher::new(BridgeConfig::default());

        let created = dispatch(&mut store, &mut dispatcher, &line_entity(5, "DEFPOINTS"));
        assert_eq!(created.table, DomainTable::ReviewObjects);
        let row = store.object(DomainTable::ReviewObjects, created.id).unwrap();
        assert!(row.needs_review);
        assert!(!row.properties.contains_key("attempted_type"));
    }

    #[test]
    fn test_low_confidence_never_reaches_specialized_table() {
        use crate::classify::{MappingRecord, MappingTable};
        use crate::types::PropertyBag;

        let mut table = MappingTable::empty();
        table.add(MappingRecord {
            pattern: "SHAKY".to_string(),
            object_type: ObjectType::UtilityLine,
            confidence: 0.5,
            properties: PropertyBag::new(),
            canonical_layer_name: None,
        });
        let classifier = LayerClassifier::with_mapping_table(table);

        let mut store = MemoryStore::new();
        let mut dispatcher = ObjectDispatcher::new(BridgeConfig::default());
        let entity = line_entity(6, "SHAKY");
        let classification = classifier.classify(&entity.layer_name, None);
        let geometry = decode(&entity.shape).unwrap();
        let created = dispatcher
            .dispatch(&mut store, &entity, &geometry, &classification, &scope())
            .unwrap();

        assert_eq!(created.table, DomainTable::ReviewObjects);
        assert_eq!(store.object_count(DomainTable::Pipes), 0);
    }

    #[test]
    fn test_canonical_layer_is_created_and_linked() {
        let mut store = MemoryStore::new();
        let mut dispatcher = ObjectDispatcher::new(BridgeConfig::default());

        let created = dispatch(
            &mut store,
            &mut dispatcher,
            &line_entity(7, "CIV-UTIL-STORM-12IN-NEW-LN"),
        );
        let row = store.object(DomainTable::Pipes, created.id).unwrap();
        let layer = store.layer(ProjectId(1), "CIV-UTIL-STORM-12IN-NEW-LN").unwrap();
        assert_eq!(row.layer, Some(layer));
    }

    #[test]
    fn test_surface_creation_is_idempotent() {
        use crate::classify::{MappingRecord, MappingTable};
        use crate::types::bag;

        let mut table = MappingTable::empty();
        table.add(MappingRecord {
            pattern: "EG-BOUNDARY".to_string(),
            object_type: ObjectType::SurfaceModel,
            confidence: 0.9,
            properties: bag([(keys::SURFACE_KIND, "eg".into())]),
            canonical_layer_name: None,
        });
        let classifier = LayerClassifier::with_mapping_table(table);

        let mut store = MemoryStore::new();
        let mut dispatcher = ObjectDispatcher::new(BridgeConfig::default());

        let ring = NativeShape::Polyline {
            vertices: vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(100.0, 0.0, 0.0),
                Point3::new(100.0, 100.0, 0.0),
            ],
            is_closed: true,
        };
        let a = DecodedCadEntity::new(StableHandle::new(8), "EG-BOUNDARY", ring.clone());
        let b = DecodedCadEntity::new(StableHandle::new(9), "EG-BOUNDARY", ring);

        let geometry = decode(&a.shape).unwrap();
        let classification = classifier.classify("EG-BOUNDARY", None);
        let first = dispatcher
            .dispatch(&mut store, &a, &geometry, &classification, &scope())
            .unwrap();
        let second = dispatcher
            .dispatch(&mut store, &b, &geometry, &classification, &scope())
            .unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(store.object_count(DomainTable::Surfaces), 1);
    }

    #[test]
    fn test_reset_clears_caches() {
        let mut store = MemoryStore::new();
        let mut dispatcher = ObjectDispatcher::new(BridgeConfig::default());
        dispatch(&mut store, &mut dispatcher, &line_entity(10, "12IN-STORM"));
        assert!(!dispatcher.layer_cache.is_empty());
        assert!(!dispatcher.network_cache.is_empty());
        dispatcher.reset();
        assert!(dispatcher.layer_cache.is_empty());
        assert!(dispatcher.network_cache.is_empty());
    }
}
