//! S4 — orphan reclamation (`spec.md` §8).

use coldstore_conformance_tests::temp_engine;
use serde_json::json;

#[test]
fn unreferenced_bundle_is_reclaimed_by_gc() {
    let (_dir, engine) = temp_engine();

    let b1 = engine.put_bundle(json!({"sequence": 1, "operations": []}), None).unwrap();
    let b2 = engine.put_bundle(json!({"sequence": 2, "operations": []}), None).unwrap();
    let snapshot = engine.put_snapshot(&[b1], None, None).unwrap();
    engine.create_snapshot_ref("main", &snapshot).unwrap();

    let report = engine.garbage_collect(false).unwrap();

    assert_eq!(report.deleted, vec![b2.clone()]);
    assert!(!engine.has_object(&b2));
}
