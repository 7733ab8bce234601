//! Core value types shared across the crate

pub mod handle;
pub mod ids;
pub mod object_type;
pub mod point;
pub mod properties;

pub use handle::StableHandle;
pub use ids::{DrawingId, LayerId, NetworkId, ObjectId, ProjectId, Srid};
pub use object_type::{DomainTable, GeometryKind, NetworkMode, ObjectType, UtilitySystem};
pub use point::Point3;
pub use properties::{bag, keys, PropertyBag, PropertyValue};
