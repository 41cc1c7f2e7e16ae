//! S3 — shared-bundle GC (`spec.md` §8).

use coldstore_conformance_tests::temp_engine;
use serde_json::json;

#[test]
fn bundle_shared_by_two_snapshots_survives_gc() {
    let (_dir, engine) = temp_engine();

    let bundle = engine.put_bundle(json!({"sequence": 1, "operations": []}), None).unwrap();
    let s1 = engine.put_snapshot(&[bundle.clone()], None, None).unwrap();
    let s2 = engine.put_snapshot(&[bundle.clone()], None, None).unwrap();
    engine.create_snapshot_ref("r1", &s1).unwrap();
    engine.create_snapshot_ref("r2", &s2).unwrap();

    let report = engine.garbage_collect(false).unwrap();

    assert!(report.deleted.is_empty());
    assert_eq!(report.reachable, [bundle, s1, s2].into_iter().collect());
}
