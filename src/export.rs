//! Export: domain objects back toward the CAD encoder
//!
//! The CAD-encode collaborator consumes, per object, a shape kind, ordered
//! 3-coordinate points and a resolved layer name. Geometry goes back out
//! through the codec, so constant-Z (flat) objects still leave through the
//! 3D primitives, and names go through the layer name builder, which never
//! hard-fails — a missing vocabulary mapping yields the documented legacy
//! fallback name instead.

use tracing::debug;

use crate::entities::{EntityKind, NativeShape};
use crate::error::Result;
use crate::geometry::{encode, parse_wkt};
use crate::layer_name::generate_layer_name;
use crate::store::DomainObject;
use crate::types::GeometryKind;

/// One entity ready for the CAD encoder
#[derive(Debug, Clone, PartialEq)]
pub struct ExportedEntity {
    pub kind: EntityKind,
    pub shape: NativeShape,
    pub layer_name: String,
}

/// Prepare one domain object for export
pub fn export_object(object: &DomainObject) -> Result<ExportedEntity> {
    let geometry = parse_wkt(&object.ewkt)?;

    let kind = match geometry.kind {
        GeometryKind::Point => EntityKind::Point,
        GeometryKind::Line => {
            if geometry.vertex_count() == 2 {
                EntityKind::Line
            } else {
                EntityKind::Polyline
            }
        }
        GeometryKind::Polygon => EntityKind::Polyline,
    };

    let shape = encode(&geometry, kind)?;
    let layer_name = generate_layer_name(object.object_type, &object.properties, geometry.kind);

    debug!(
        table = %object.table,
        id = %object.id,
        layer = %layer_name,
        "prepared object for export"
    );

    Ok(ExportedEntity {
        kind,
        shape,
        layer_name,
    })
}

/// Prepare a batch of objects, skipping none
///
/// Per-object failures (unparseable stored geometry) surface as errors in
/// the result slots rather than aborting the batch.
pub fn export_objects(objects: &[DomainObject]) -> Vec<Result<ExportedEntity>> {
    objects.iter().map(export_object).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{
        bag, keys, DomainTable, ObjectId, ObjectType, ProjectId, PropertyBag, Srid,
    };

    fn pipe_object(ewkt: &str) -> DomainObject {
        DomainObject {
            id: ObjectId(1),
            table: DomainTable::Pipes,
            project: ProjectId(1),
            object_type: ObjectType::UtilityLine,
            name: "P-1".to_string(),
            ewkt: ewkt.to_string(),
            srid: Srid(2230),
            layer: None,
            properties: bag([
                (keys::UTILITY_SYSTEM, "STORM".into()),
                (keys::DIAMETER_IN, 12i64.into()),
                (keys::PHASE, "NEW".into()),
            ]),
            needs_review: false,
            source_layer: "12IN-STORM".to_string(),
        }
    }

    #[test]
    fn test_export_resolves_layer_name() {
        let object = pipe_object("SRID=2230;LINESTRING Z (0 0 0, 50 0 0)");
        let exported = export_object(&object).unwrap();
        assert_eq!(exported.kind, EntityKind::Line);
        assert_eq!(exported.layer_name, "CIV-UTIL-STORM-12IN-NEW-LN");
    }

    #[test]
    fn test_flat_geometry_exports_as_3d() {
        let object = pipe_object("SRID=2230;LINESTRING Z (0 0 0, 10 0 0, 20 5 0)");
        let exported = export_object(&object).unwrap();
        match exported.shape {
            NativeShape::Polyline { ref vertices, is_closed } => {
                assert!(!is_closed);
                assert!(vertices.iter().all(|v| v.z == 0.0));
            }
            ref other => panic!("expected polyline, got {:?}", other),
        }
    }

    #[test]
    fn test_export_falls_back_on_missing_properties() {
        let mut object = pipe_object("SRID=2230;LINESTRING Z (0 0 0, 50 0 0)");
        object.properties = PropertyBag::new();
        let exported = export_object(&object).unwrap();
        assert_eq!(exported.layer_name, "X-UTILITY-LINE");
    }

    #[test]
    fn test_export_bad_geometry_is_error() {
        let object = pipe_object("not wkt at all");
        assert!(export_object(&object).is_err());
    }
}
