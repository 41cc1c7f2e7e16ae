//! Aggregate reporting shapes returned by the engine façade.

use std::collections::HashSet;

use coldstore_kernel::Digest;

/// Whole-store statistics (`SPEC_FULL.md` §4.4, §6.3, grounded on
/// `sync_adapter.py::get_statistics`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineStatistics {
    pub total_objects: u64,
    pub total_size_bytes: u64,
    pub snapshot_refs: u64,
    pub bundle_count: u64,
    pub snapshot_count: u64,
}

/// The result of [`crate::Engine::detect_missing_objects`]: every stored
/// snapshot found to reference at least one missing object, plus the union
/// of missing digests across all of them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MissingObjectsReport {
    pub broken_snapshots: Vec<Digest>,
    pub missing_objects: HashSet<Digest>,
}

impl MissingObjectsReport {
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.broken_snapshots.is_empty()
    }
}
