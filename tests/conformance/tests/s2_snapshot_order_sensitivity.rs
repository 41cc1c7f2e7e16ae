//! S2 — snapshot order sensitivity (`spec.md` §8).

use coldstore_conformance_tests::{s2_bundles, temp_engine};

#[test]
fn bundle_order_changes_snapshot_digest() {
    let (_dir, engine) = temp_engine();
    let (b1, b2) = s2_bundles();

    let d1 = engine.put_bundle(b1, None).unwrap();
    let d2 = engine.put_bundle(b2, None).unwrap();

    let forward = engine.put_snapshot(&[d1.clone(), d2.clone()], None, None).unwrap();
    let reversed = engine.put_snapshot(&[d2, d1], None, None).unwrap();

    assert_ne!(forward, reversed);
}
