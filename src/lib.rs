//! # cadlink
//!
//! Bridges CAD drawings and a spatial relational database for
//! civil-engineering infrastructure projects.
//!
//! cadlink ingests vector CAD entities tagged with free-text layer names,
//! classifies each into a typed civil-engineering object (pipe, manhole,
//! stormwater facility, survey point, tree, parcel, …), preserves exact 3D
//! coordinates — including sub-millimeter elevations and exact Z=0 — and
//! supports safe re-import when the source drawing changes, without
//! duplicating or corrupting prior results.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use cadlink::{ImportScope, MemoryStore, Reconciler};
//! use cadlink::types::{DrawingId, ProjectId, Srid};
//!
//! let mut store = MemoryStore::new();
//! let mut reconciler = Reconciler::with_defaults();
//! let scope = ImportScope::new(ProjectId(1), Some(DrawingId(1)), Srid(2230));
//!
//! // entities come from the upstream CAD decoder
//! let summary = reconciler.run(&mut store, &entities, &scope)?;
//! println!("{}", summary);
//! # Ok::<(), cadlink::BridgeError>(())
//! ```
//!
//! ## Architecture
//!
//! The pipeline is a chain of small components with trait seams:
//!
//! - `geometry` — codec between decoded CAD shapes and ordered 3D point
//!   sequences, WKT/EWKT serialization, content hashing
//! - `classify` — three-tier layer-name classifier (structured grammar,
//!   client mapping table, legacy heuristics) behind one
//!   `ClassifyStrategy` capability
//! - `dispatch` — routes classified entities into domain tables, wiring
//!   per-project layers and logical utility networks
//! - `registry` + `reconcile` — durable entity links with a sync-state
//!   machine, and the re-import diff that drives minimal mutations
//! - `layer_name` — the inverse path: canonical layer names for export
//! - `store` — the datastore collaborator trait plus an in-memory
//!   implementation
//!
//! Flow: decode → geometry codec → classifier → dispatcher → domain
//! tables + entity links. Re-import: decode → reconciler (consults the
//! registry) → targeted mutation. Export: domain tables → layer name
//! builder → encode.

#![allow(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod classify;
pub mod config;
pub mod dispatch;
pub mod entities;
pub mod error;
pub mod export;
pub mod geometry;
pub mod layer_name;
pub mod reconcile;
pub mod registry;
pub mod store;
pub mod types;

// Re-export commonly used types
pub use classify::{Classification, ClassifierTier, ClassifyStrategy, LayerClassifier, MappingTable};
pub use config::BridgeConfig;
pub use dispatch::{Created, ObjectDispatcher};
pub use entities::{DecodedCadEntity, EntityKind, NativeShape};
pub use error::{BridgeError, Result};
pub use export::{export_object, export_objects, ExportedEntity};
pub use geometry::{decode, encode, geometry_hash, parse_wkt, to_ewkt, to_wkt, Geometry};
pub use reconcile::{EntityIssue, IssueSeverity, Reconciler, RunSummary};
pub use registry::{EntityLink, LinkKey, SyncState};
pub use store::{DomainObject, ImportScope, MemoryStore, NetworkKey, SpatialStore};
pub use types::{
    DomainTable, GeometryKind, NetworkMode, ObjectType, Point3, StableHandle, UtilitySystem,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
