//! Shared fixture helpers for the coldstore benchmark suites.

use coldstore_kernel::hash::{HashBackend, Hasher};
use coldstore_kernel::model::{ObjectKind, Record};
use coldstore_kernel::storage::{ObjectStore, StorageLayout};
use coldstore_kernel::Digest;
use serde_json::{json, Value};

/// Build a fresh object store rooted at `dir`.
///
/// # Panics
///
/// Panics if the store's directories cannot be created. Benchmark setup
/// failures are fatal.
#[must_use]
pub fn fresh_store(dir: &std::path::Path) -> ObjectStore {
    let layout = StorageLayout::new(dir);
    layout.initialize().expect("layout initializes");
    ObjectStore::new(layout, Hasher::new(HashBackend::Blake3))
}

/// Populate `store` with a linear snapshot chain of `depth` snapshots, each
/// with one bundle, and return the tip digest.
///
/// # Panics
///
/// Panics on any store write failure.
#[must_use]
pub fn populate_chain(store: &ObjectStore, depth: usize) -> Digest {
    let mut parent: Option<Digest> = None;
    let mut tip = None;
    for i in 0..depth {
        let bundle = store
            .put_object(&Record {
                kind: ObjectKind::Bundle,
                content: json!({ "sequence": i }),
                metadata: None,
            })
            .expect("bundle write succeeds");

        let mut content = json!({ "bundles": [bundle.to_string()] });
        if let Some(p) = &parent {
            content
                .as_object_mut()
                .expect("content built as object literal")
                .insert("parent".to_string(), Value::String(p.to_string()));
        }
        let snapshot = store
            .put_object(&Record {
                kind: ObjectKind::Snapshot,
                content,
                metadata: None,
            })
            .expect("snapshot write succeeds");
        parent = Some(snapshot.clone());
        tip = Some(snapshot);
    }
    tip.expect("depth > 0")
}

/// A representative payload for canonical-encoding/hashing benchmarks: a
/// nested object with mixed key ordering, forcing the encoder's sort path.
#[must_use]
pub fn sample_payload() -> Value {
    json!({
        "zeta": 1,
        "alpha": {"nested": true, "items": [1, 2, 3, "four"]},
        "mid": [null, 1.5, "text", {"k": "v"}],
        "beta": "payload",
    })
}
