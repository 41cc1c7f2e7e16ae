//! Shared fixtures for the conformance test suite
//! (`SPEC_FULL.md` §8: universal properties and concrete scenarios S1–S6).

use coldstore_engine::{Engine, EngineConfig};
use coldstore_kernel::model::{ObjectKind, Record};
use coldstore_kernel::storage::ObjectStore;
use serde_json::{json, Value};
use tempfile::TempDir;

/// A fresh, unlocked engine rooted at a throwaway temp directory. The
/// `TempDir` must be kept alive for as long as the engine is in use.
///
/// # Panics
///
/// Panics if the store cannot be initialized. Test fixture failures are
/// fatal.
#[must_use]
pub fn temp_engine() -> (TempDir, Engine) {
    let dir = tempfile::tempdir().expect("tempdir");
    let engine = Engine::initialize(EngineConfig::new(dir.path())).expect("engine initializes");
    (dir, engine)
}

/// The two order-sensitive bundle payloads from scenario S2.
#[must_use]
pub fn s2_bundles() -> (Value, Value) {
    (json!({"sequence": 1, "operations": []}), json!({"sequence": 2, "operations": []}))
}

/// Build a bare blob record directly, bypassing the engine, for tests that
/// need to reach into storage internals.
#[must_use]
pub fn blob_record(content: &str) -> Record {
    Record {
        kind: ObjectKind::Blob,
        content: Value::String(content.to_string()),
        metadata: None,
    }
}

/// Construct a bare kernel object store rooted at `dir`, for tests
/// exercising storage internals beneath the engine façade.
#[must_use]
pub fn bare_store(dir: &std::path::Path) -> ObjectStore {
    use coldstore_kernel::hash::{HashBackend, Hasher};
    use coldstore_kernel::storage::StorageLayout;

    let layout = StorageLayout::new(dir);
    layout.initialize().expect("layout initializes");
    ObjectStore::new(layout, Hasher::new(HashBackend::Blake3))
}
