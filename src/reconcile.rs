//! Change reconciliation across re-imports
//!
//! The reconciler diffs a freshly decoded entity stream against the entity
//! link registry and applies the minimal corresponding mutation per entity.
//! A first import is just the degenerate case with an empty registry.
//!
//! Non-fatal problems are collected as [`EntityIssue`] values rather than
//! raised: one entity's failure is recorded and that entity skipped without
//! aborting the rest of the run or rolling back prior updates in the same
//! run. Partial success is explicit and expected — the run always returns
//! a [`RunSummary`], and an `Err` only escapes at the transaction boundary
//! itself.

use std::fmt;

use ahash::AHashSet;
use indexmap::IndexMap;
use tracing::{info, warn};

use crate::classify::LayerClassifier;
use crate::config::BridgeConfig;
use crate::dispatch::ObjectDispatcher;
use crate::entities::DecodedCadEntity;
use crate::error::Result;
use crate::geometry::{decode_with_tolerance, geometry_hash, to_ewkt, Geometry};
use crate::registry::{EntityLink, LinkKey, SyncState};
use crate::store::{ImportScope, SpatialStore};
use crate::types::StableHandle;

/// Severity of a per-entity issue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueSeverity {
    /// The entity was processed but something is off
    Warning,
    /// The entity was skipped
    Error,
}

impl fmt::Display for IssueSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IssueSeverity::Warning => write!(f, "warning"),
            IssueSeverity::Error => write!(f, "error"),
        }
    }
}

/// One non-fatal problem encountered during a run
#[derive(Debug, Clone)]
pub struct EntityIssue {
    pub severity: IssueSeverity,
    pub handle: StableHandle,
    pub layer_name: String,
    pub message: String,
}

impl EntityIssue {
    fn error(entity: &DecodedCadEntity, message: impl Into<String>) -> Self {
        EntityIssue {
            severity: IssueSeverity::Error,
            handle: entity.handle,
            layer_name: entity.layer_name.clone(),
            message: message.into(),
        }
    }
}

impl fmt::Display for EntityIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} ({}): {}",
            self.severity, self.handle, self.layer_name, self.message
        )
    }
}

/// Structured result of one reconciliation run
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    /// New entities dispatched into domain tables (review rows included)
    pub created: usize,
    /// Existing objects whose geometry or properties were updated
    pub updated: usize,
    /// Entities matching their stored link exactly
    pub unchanged: usize,
    /// Links marked deleted because their handle vanished
    pub deleted: usize,
    /// Links moved to the conflict state
    pub conflicted: usize,
    /// Entities skipped because of a per-entity error
    pub failed: usize,
    /// Per-entity messages, in processing order
    pub issues: Vec<EntityIssue>,
}

impl RunSummary {
    /// Total entities accounted for (deleted links excluded)
    pub fn total_processed(&self) -> usize {
        self.created + self.updated + self.unchanged + self.conflicted + self.failed
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "created {}, updated {}, unchanged {}, deleted {}, conflicted {}, failed {}",
            self.created, self.updated, self.unchanged, self.deleted, self.conflicted, self.failed
        )
    }
}

enum Outcome {
    Created,
    Updated,
    Unchanged,
    Conflicted,
}

/// Reconciles decoded entity streams against the entity link registry
pub struct Reconciler {
    config: BridgeConfig,
    classifier: LayerClassifier,
    dispatcher: ObjectDispatcher,
}

impl Reconciler {
    pub fn new(classifier: LayerClassifier, config: BridgeConfig) -> Self {
        Reconciler {
            dispatcher: ObjectDispatcher::new(config),
            classifier,
            config,
        }
    }

    /// A reconciler with the default classifier and configuration
    pub fn with_defaults() -> Self {
        Self::new(LayerClassifier::new(), BridgeConfig::default())
    }

    /// Run one import/reconciliation pass inside one store transaction
    ///
    /// Re-running against an unchanged drawing creates zero new objects and
    /// leaves every sync state untouched. An `Err` is returned only when
    /// the transaction itself cannot be opened or committed.
    pub fn run(
        &mut self,
        store: &mut dyn SpatialStore,
        entities: &[DecodedCadEntity],
        scope: &ImportScope,
    ) -> Result<RunSummary> {
        store.begin()?;
        self.dispatcher.reset();

        let mut links: IndexMap<StableHandle, EntityLink> = store
            .load_links(scope.project, scope.drawing)?
            .into_iter()
            .map(|link| (link.key.handle, link))
            .collect();

        let mut summary = RunSummary::default();
        let mut seen: AHashSet<StableHandle> = AHashSet::with_capacity(entities.len());

        for entity in entities {
            if !seen.insert(entity.handle) {
                summary.failed += 1;
                summary.issues.push(EntityIssue::error(
                    entity,
                    "duplicate stable handle in decode",
                ));
                continue;
            }

            match self.process_entity(store, entity, &mut links, scope) {
                Ok(Outcome::Created) => summary.created += 1,
                Ok(Outcome::Updated) => summary.updated += 1,
                Ok(Outcome::Unchanged) => summary.unchanged += 1,
                Ok(Outcome::Conflicted) => summary.conflicted += 1,
                Err(e) => {
                    summary.failed += 1;
                    summary.issues.push(EntityIssue::error(entity, e.to_string()));
                }
            }
        }

        // Stored handles absent from this decode: the object row survives,
        // only the link state records the removal. Terminal links stay put.
        for link in links.values_mut() {
            if seen.contains(&link.key.handle) || link.sync_state.is_terminal() {
                continue;
            }
            link.sync_state = SyncState::Deleted;
            store.upsert_link(link)?;
            summary.deleted += 1;
        }

        store.commit()?;
        info!(
            project = %scope.project,
            drawing = ?scope.drawing,
            %summary,
            "reconciliation run complete"
        );
        Ok(summary)
    }

    fn process_entity(
        &mut self,
        store: &mut dyn SpatialStore,
        entity: &DecodedCadEntity,
        links: &mut IndexMap<StableHandle, EntityLink>,
        scope: &ImportScope,
    ) -> Result<Outcome> {
        let geometry = decode_with_tolerance(&entity.shape, self.config.linear_tolerance)?;
        let hash = geometry_hash(&geometry, self.config.hash_quantum);

        if let Some(link) = links.get_mut(&entity.handle) {
            return self.process_existing(store, entity, link, &geometry, hash, scope);
        }

        let classification = self
            .classifier
            .classify(&entity.layer_name, entity.block_name.as_deref());
        let created = self
            .dispatcher
            .dispatch(store, entity, &geometry, &classification, scope)?;

        let link = EntityLink::new(
            LinkKey::new(scope.project, scope.drawing, entity.handle),
            created.object_type,
            created.id,
            hash,
            &entity.layer_name,
        );
        store.upsert_link(&link)?;
        links.insert(entity.handle, link);
        Ok(Outcome::Created)
    }

    fn process_existing(
        &mut self,
        store: &mut dyn SpatialStore,
        entity: &DecodedCadEntity,
        link: &mut EntityLink,
        geometry: &Geometry,
        hash: u64,
        scope: &ImportScope,
    ) -> Result<Outcome> {
        if link.sync_state.is_terminal() {
            warn!(
                handle = %entity.handle,
                state = %link.sync_state,
                "entity re-sighted in terminal state, leaving untouched"
            );
            return Ok(Outcome::Unchanged);
        }

        if hash != link.geometry_hash {
            store.update_geometry(link.table(), link.object_id, &to_ewkt(geometry, scope.srid))?;
            link.geometry_hash = hash;
            link.sync_state = SyncState::Synced;
            store.upsert_link(link)?;
            return Ok(Outcome::Updated);
        }

        if entity.layer_name != link.layer_name {
            return self.process_rename(store, entity, link, hash);
        }

        Ok(Outcome::Unchanged)
    }

    /// Geometry is unchanged but the layer was renamed: reclassify under
    /// the new name. A confident same-type result updates the object's
    /// type-specific properties; anything else — a different type, low
    /// confidence, or no classification — is a conflict and mutates
    /// nothing on the object.
    fn process_rename(
        &mut self,
        store: &mut dyn SpatialStore,
        entity: &DecodedCadEntity,
        link: &mut EntityLink,
        hash: u64,
    ) -> Result<Outcome> {
        let reclassified = self
            .classifier
            .classify(&entity.layer_name, entity.block_name.as_deref());

        let confident = !reclassified.is_unclassified()
            && reclassified.confidence >= self.config.confidence_floor;

        if confident && reclassified.object_type == link.object_type {
            store.update_properties(
                link.table(),
                link.object_id,
                &reclassified.properties,
                &entity.layer_name,
            )?;
            link.layer_name = entity.layer_name.clone();
            link.geometry_hash = hash;
            link.sync_state = SyncState::Synced;
            store.upsert_link(link)?;
            return Ok(Outcome::Updated);
        }

        warn!(
            handle = %entity.handle,
            old_layer = %link.layer_name,
            new_layer = %entity.layer_name,
            old_type = %link.object_type,
            new_type = %reclassified.object_type,
            "rename could not be reconciled, marking conflict"
        );
        link.sync_state = SyncState::Conflict;
        store.upsert_link(link)?;
        Ok(Outcome::Conflicted)
    }
}
