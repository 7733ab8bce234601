/// Import/re-import diagnostic: build a synthetic drawing, import it into
/// an in-memory store, mutate a few entities, re-import, and print both
/// run summaries plus the resulting link states.

use cadlink::types::{DrawingId, Point3, ProjectId, Srid, StableHandle};
use cadlink::{
    DecodedCadEntity, DomainTable, ImportScope, MemoryStore, NativeShape, Reconciler, SpatialStore,
};

fn main() {
    tracing_subscriber::fmt().init();

    let scope = ImportScope::new(ProjectId(1), Some(DrawingId(1)), Srid(2230));
    let mut store = MemoryStore::new();
    let mut reconciler = Reconciler::with_defaults();

    // 1. First import
    let entities = sample_drawing();
    println!("1. Importing {} entities", entities.len());
    let summary = reconciler.run(&mut store, &entities, &scope).unwrap();
    println!("   {}", summary);
    for table in [
        DomainTable::Pipes,
        DomainTable::Structures,
        DomainTable::Trees,
        DomainTable::ReviewObjects,
    ] {
        println!("   {}: {} rows", table, store.object_count(table));
    }
    println!("   networks: {}", store.network_count());

    // 2. Re-import unchanged
    println!("\n2. Re-importing unchanged drawing");
    let summary = reconciler.run(&mut store, &entities, &scope).unwrap();
    println!("   {} (total objects still {})", summary, store.total_objects());

    // 3. Mutate: move one pipe, upsize another, drop the tree
    let mut changed = sample_drawing();
    changed[0].shape = NativeShape::Line {
        start: Point3::new(0.0, 0.0, 100.0),
        end: Point3::new(80.0, 10.0, 99.2),
    };
    changed[1].layer_name = "16IN-STORM".to_string();
    changed.retain(|e| e.layer_name != "EX-TREES");

    println!("\n3. Re-importing with one move, one rename, one removal");
    let summary = reconciler.run(&mut store, &changed, &scope).unwrap();
    println!("   {}", summary);
    for issue in &summary.issues {
        println!("   issue: {}", issue);
    }

    println!("\n4. Link states:");
    for link in store.load_links(scope.project, scope.drawing).unwrap() {
        println!(
            "   {} {:<22} {:<10} hash={:016x}",
            link.key.handle, link.layer_name, link.sync_state, link.geometry_hash
        );
    }
}

fn sample_drawing() -> Vec<DecodedCadEntity> {
    vec![
        DecodedCadEntity::new(
            StableHandle::new(0x10),
            "12IN-STORM",
            NativeShape::Line {
                start: Point3::new(0.0, 0.0, 100.0),
                end: Point3::new(75.0, 0.0, 99.25),
            },
        ),
        DecodedCadEntity::new(
            StableHandle::new(0x11),
            "12IN-STORM",
            NativeShape::Line {
                start: Point3::new(75.0, 0.0, 99.25),
                end: Point3::new(150.0, 0.0, 98.5),
            },
        ),
        DecodedCadEntity::new(
            StableHandle::new(0x12),
            "MH-STORM",
            NativeShape::BlockInsert {
                insertion: Point3::new(75.0, 0.0, 101.4),
            },
        )
        .with_block("MH48"),
        DecodedCadEntity::new(
            StableHandle::new(0x13),
            "EX-TREES",
            NativeShape::Point {
                location: Point3::new(30.0, 12.0, 0.0),
            },
        ),
        DecodedCadEntity::new(
            StableHandle::new(0x14),
            "PROPERTY-LINE",
            NativeShape::Polyline {
                vertices: vec![
                    Point3::new(-10.0, -10.0, 0.0),
                    Point3::new(200.0, -10.0, 0.0),
                    Point3::new(200.0, 60.0, 0.0),
                    Point3::new(-10.0, 60.0, 0.0),
                ],
                is_closed: true,
            },
        ),
        DecodedCadEntity::new(
            StableHandle::new(0x15),
            "SOME-RANDOM-LAYER",
            NativeShape::Text {
                insertion: Point3::new(5.0, 5.0, 0.0),
                content: "NOTE 1".to_string(),
            },
        ),
    ]
}
