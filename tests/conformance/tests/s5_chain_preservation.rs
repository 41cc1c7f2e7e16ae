//! S5 — chain preservation (`spec.md` §8).

use coldstore_conformance_tests::temp_engine;
use coldstore_kernel::Digest;
use serde_json::json;

#[test]
fn full_linear_chain_survives_gc_from_tip_ref() {
    let (_dir, engine) = temp_engine();

    let mut parent: Option<Digest> = None;
    let mut tip = None;
    for i in 0..10 {
        let bundle = engine.put_bundle(json!({"sequence": i, "operations": []}), None).unwrap();
        let snapshot = engine.put_snapshot(&[bundle], parent.as_ref(), None).unwrap();
        parent = Some(snapshot.clone());
        tip = Some(snapshot);
    }
    let tip = tip.unwrap();
    engine.create_snapshot_ref("tip", &tip).unwrap();

    assert_eq!(engine.list_all_objects().unwrap().len(), 20);

    let report = engine.garbage_collect(false).unwrap();

    assert!(report.deleted.is_empty());
    assert_eq!(report.reachable.len(), 20);
}
