//! Universal properties 1-8 and 10 from `spec.md` §8. Property 9
//! (atomicity) lives in `atomicity.rs` since it needs filesystem
//! interposition rather than value-level generation.

use std::collections::HashSet;

use coldstore_conformance_tests::{bare_store, temp_engine};
use coldstore_kernel::canon::canonical_json_bytes;
use coldstore_kernel::hash::{HashBackend, Hasher};
use coldstore_kernel::model::blob::Blob;
use coldstore_kernel::model::bundle::Bundle;
use proptest::collection::{hash_map, vec as pvec};
use proptest::prelude::*;
use serde_json::{Map, Value};

/// A strategy for small, hashable JSON values — enough shape variety to
/// exercise the canonical encoder's sort and escaping paths without
/// generating pathological recursion depth.
fn json_value() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(|n| Value::Number(n.into())),
        ".*".prop_map(Value::String),
    ];
    leaf.prop_recursive(3, 32, 8, |inner| {
        prop_oneof![
            pvec(inner.clone(), 0..8).prop_map(|v| Value::Array(v)),
            hash_map("[a-z]{1,8}", inner, 0..8).prop_map(|m| {
                Value::Object(m.into_iter().collect::<Map<_, _>>())
            }),
        ]
    })
}

proptest! {
    /// Property 1 — determinism: `hash_object(v) == hash_object(v)`.
    #[test]
    fn hashing_is_deterministic(value in json_value()) {
        let hasher = Hasher::new(HashBackend::Blake3);
        if let Ok(first) = hasher.hash_object(&value) {
            for _ in 0..5 {
                prop_assert_eq!(hasher.hash_object(&value).unwrap(), first.clone());
            }
        }
    }

    /// Property 3 — round-trip: decoding an encoded blob recovers the
    /// original structurally, for arbitrary byte content.
    #[test]
    fn blob_round_trips_through_record(data in pvec(any::<u8>(), 0..256)) {
        let blob = Blob::new(data);
        let record = blob.to_record();
        let decoded = Blob::from_record(&record).unwrap();
        prop_assert_eq!(decoded, blob);
    }

    /// Property 3 — round-trip for bundle payloads.
    #[test]
    fn bundle_round_trips_through_record(payload in json_value()) {
        prop_assume!(payload.is_object());
        let bundle = Bundle::new(payload.clone());
        let record = bundle.to_record();
        let decoded = Bundle::from_record(&record).unwrap();
        prop_assert_eq!(decoded.payload(), &payload);
    }

    /// Property 4 — put-idempotence: putting the same blob twice yields the
    /// same digest and a single object file.
    #[test]
    fn put_is_idempotent(data in pvec(any::<u8>(), 0..128)) {
        let dir = tempfile::tempdir().unwrap();
        let store = bare_store(dir.path());
        let record = Blob::new(data).to_record();

        let first = store.put_object(&record).unwrap();
        let second = store.put_object(&record).unwrap();
        prop_assert_eq!(first.clone(), second);

        let count = store.list_all_objects().unwrap().iter().filter(|d| **d == first).count();
        prop_assert_eq!(count, 1);
    }

    /// Property 5 — read-verify: every record returned by a verified read
    /// hashes back to the digest it was fetched by.
    #[test]
    fn verified_reads_satisfy_their_own_digest(data in pvec(any::<u8>(), 0..128)) {
        let dir = tempfile::tempdir().unwrap();
        let store = bare_store(dir.path());
        let record = Blob::new(data).to_record();
        let digest = store.put_object(&record).unwrap();

        let value = store.get_object(&digest, true).unwrap();
        prop_assert_eq!(store.hasher().hash_object(&value).unwrap(), digest);
    }

    /// Property 10 — tamper detection: mutating one byte of a stored file
    /// causes verification to fail, for arbitrary non-empty blob content.
    #[test]
    fn tampering_a_byte_fails_verification(data in pvec(any::<u8>(), 1..128), flip_index in 0usize..128) {
        let dir = tempfile::tempdir().unwrap();
        let store = bare_store(dir.path());
        let record = Blob::new(data.clone()).to_record();
        let digest = store.put_object(&record).unwrap();

        let path = store.layout().object_path(&digest);
        let mut bytes = std::fs::read(&path).unwrap();
        let index = flip_index % bytes.len();
        bytes[index] ^= 0b0000_0001;
        std::fs::write(&path, &bytes).unwrap();

        prop_assert!(store.get_object(&digest, true).is_err());
    }
}

/// Property 2 — injectivity (practical): distinct random records hash to
/// distinct digests. Not property-test-shrinkable in the usual sense (it's
/// a single global assertion over a batch), so it's a plain test.
#[test]
fn distinct_records_hash_to_distinct_digests() {
    let hasher = Hasher::new(HashBackend::Blake3);
    let mut seen = HashSet::new();
    for i in 0..10_000u32 {
        let value = Value::String(format!("record-{i}"));
        let digest = hasher.hash_object(&value).unwrap();
        assert!(seen.insert(digest), "collision at index {i}");
    }
    assert_eq!(seen.len(), 10_000);
}

/// Property 6 — GC soundness: after a sweep, every digest transitively
/// reachable from the roots is still present in the store.
#[test]
fn gc_preserves_everything_reachable_from_roots() {
    let (_dir, engine) = temp_engine();

    let b1 = engine.put_bundle(serde_json::json!({"sequence": 1}), None).unwrap();
    let b2 = engine.put_bundle(serde_json::json!({"sequence": 2}), None).unwrap();
    let s1 = engine.put_snapshot(&[b1.clone()], None, None).unwrap();
    let s2 = engine.put_snapshot(&[b2.clone()], Some(&s1), None).unwrap();
    engine.create_snapshot_ref("main", &s2).unwrap();

    let report = engine.garbage_collect(false).unwrap();
    for digest in [b1, b2, s1, s2] {
        assert!(engine.has_object(&digest), "{digest} should remain reachable");
        assert!(report.reachable.contains(&digest));
    }
}

/// Property 7 — GC idempotence: a second GC run's `deleted` list is empty.
#[test]
fn second_gc_run_deletes_nothing() {
    let (_dir, engine) = temp_engine();

    let orphan = engine.put_bundle(serde_json::json!({"sequence": 1}), None).unwrap();
    let kept = engine.put_bundle(serde_json::json!({"sequence": 2}), None).unwrap();
    let snapshot = engine.put_snapshot(&[kept], None, None).unwrap();
    engine.create_snapshot_ref("main", &snapshot).unwrap();

    let first = engine.garbage_collect(false).unwrap();
    assert_eq!(first.deleted, vec![orphan]);

    let second = engine.garbage_collect(false).unwrap();
    assert!(second.deleted.is_empty());
}

/// Property 8 — cycle-safety: walking a parent-cycle chain raises an error
/// in finite steps rather than looping forever.
#[test]
fn snapshot_chain_cycle_is_rejected_in_finite_steps() {
    use coldstore_kernel::model::snapshot::Snapshot;

    let dir = tempfile::tempdir().unwrap();
    let store = bare_store(dir.path());

    let b = store
        .put_object(&Bundle::new(serde_json::json!({"sequence": 1})).to_record())
        .unwrap();
    let snapshot = Snapshot::new(vec![b.as_str().to_string()]);
    let digest = store.put_object(&snapshot.to_record()).unwrap();

    // Rewrite the stored record in place so its own `parent` field points
    // back at itself, forming a one-node cycle.
    let looped = Snapshot::with_parent_and_metadata(
        vec![b.as_str().to_string()],
        Some(digest.as_str().to_string()),
        Default::default(),
    );
    let bytes = canonical_json_bytes(&looped.to_record().to_value()).unwrap();
    store.layout().ensure_object_dir(&digest).unwrap();
    std::fs::write(store.layout().object_path(&digest), &bytes).unwrap();

    let adapter = coldstore_sync::SyncAdapter::new(&store);
    let result = adapter.get_snapshot_chain(&digest);
    assert!(result.is_err());
}
