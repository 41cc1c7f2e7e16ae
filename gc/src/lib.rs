//! Mark-and-sweep garbage collection over a content-addressed object store
//! (`SPEC_FULL.md` §4.7, grounded on `storage/gc.py`).
//!
//! GC's only safety contract is "never delete a reachable object"
//! (`spec.md` §3.3 invariant 5); completeness — that every unreachable
//! object is eventually deleted — is best-effort. A failed load during mark
//! is treated as "still reachable" rather than "safe to delete".

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

use std::collections::{HashSet, VecDeque};

use serde_json::Value;

use coldstore_kernel::model::Record;
use coldstore_kernel::storage::ObjectStore;
use coldstore_kernel::{Digest, StoreError};

/// The four operations a garbage collector needs from an object source.
///
/// Bundling them in one trait keeps closures out of the public API
/// (`SPEC_FULL.md` §9, "Callback-based GC": "a capability-style
/// trait/interface that bundles these four operations is the natural shape
/// in any target language").
pub trait GcSource {
    /// Every digest currently stored.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if enumeration fails.
    fn list_all(&self) -> Result<Vec<Digest>, StoreError>;

    /// Load an object's decoded value, without strict integrity enforcement
    /// (`SPEC_FULL.md` §4.7.1: a present-but-corrupt object is still
    /// traversed conservatively).
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the object cannot be read.
    fn load(&self, digest: &Digest) -> Result<Value, StoreError>;

    /// Whether an object exists at `digest`.
    fn exists(&self, digest: &Digest) -> bool;

    /// Delete the object at `digest`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the file exists but cannot be removed.
    fn delete(&self, digest: &Digest) -> Result<bool, StoreError>;
}

impl GcSource for ObjectStore {
    fn list_all(&self) -> Result<Vec<Digest>, StoreError> {
        self.list_all_objects()
    }

    fn load(&self, digest: &Digest) -> Result<Value, StoreError> {
        self.get_object(digest, false)
    }

    fn exists(&self, digest: &Digest) -> bool {
        self.has_object(digest)
    }

    fn delete(&self, digest: &Digest) -> Result<bool, StoreError> {
        self.delete_object(digest)
    }
}

/// The outcome of a [`GarbageCollector::collect`] run
/// (`SPEC_FULL.md` §4.7.2).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GcReport {
    pub reachable: HashSet<Digest>,
    pub unreachable: HashSet<Digest>,
    pub deleted: Vec<Digest>,
    pub errors: Vec<String>,
}

/// Mark-and-sweep collector over any [`GcSource`].
pub struct GarbageCollector<'a, S: GcSource> {
    source: &'a S,
}

impl<'a, S: GcSource> GarbageCollector<'a, S> {
    /// Construct a collector over `source`.
    #[must_use]
    pub fn new(source: &'a S) -> Self {
        Self { source }
    }

    /// Run garbage collection from `roots`.
    ///
    /// When `dry_run` is true, `reachable`/`unreachable` are computed and
    /// returned without deleting anything or otherwise touching the
    /// filesystem beyond reads (`SPEC_FULL.md` §4.7.3).
    #[must_use]
    pub fn collect(&self, roots: &HashSet<Digest>, dry_run: bool) -> GcReport {
        let mut report = GcReport::default();

        tracing::debug!(roots = roots.len(), "gc: mark phase starting");
        let reachable = self.mark_reachable(roots);
        report.reachable = reachable.clone();
        tracing::debug!(reachable = reachable.len(), "gc: mark phase complete");

        let all = match self.source.list_all() {
            Ok(all) => all,
            Err(e) => {
                report.errors.push(format!("failed to list objects: {e}"));
                return report;
            }
        };
        let unreachable: HashSet<Digest> = all.into_iter().filter(|d| !reachable.contains(d)).collect();
        report.unreachable = unreachable;

        if dry_run {
            tracing::debug!(unreachable = report.unreachable.len(), "gc: dry run, skipping sweep");
            return report;
        }

        tracing::debug!(unreachable = report.unreachable.len(), "gc: sweep phase starting");
        let mut deleted = Vec::new();
        for digest in &report.unreachable {
            // Trivial but explicit safety re-check (`SPEC_FULL.md` §4.7.2):
            // the set difference above already guarantees this, but sweep
            // re-asserts it at the point of deletion rather than trusting
            // the earlier computation transitively.
            if reachable.contains(digest) {
                report
                    .errors
                    .push(format!("safety violation: attempted to delete reachable object {digest}"));
                continue;
            }
            match self.source.delete(digest) {
                Ok(true) => deleted.push(digest.clone()),
                Ok(false) => {}
                Err(e) => {
                    tracing::warn!(digest = %digest, error = %e, "gc: failed to delete unreachable object");
                    report.errors.push(format!("failed to delete {digest}: {e}"));
                }
            }
        }
        tracing::debug!(deleted = deleted.len(), errors = report.errors.len(), "gc: sweep phase complete");
        report.deleted = deleted;
        report
    }

    fn mark_reachable(&self, roots: &HashSet<Digest>) -> HashSet<Digest> {
        let mut reachable = HashSet::new();
        let mut queue: VecDeque<Digest> = roots.iter().cloned().collect();

        while let Some(digest) = queue.pop_front() {
            if reachable.contains(&digest) {
                continue;
            }
            if !self.source.exists(&digest) {
                continue;
            }
            reachable.insert(digest.clone());

            // A failed load does not imply a safe deletion: the object
            // stays marked reachable, just not traversed further.
            let Ok(value) = self.source.load(&digest) else {
                continue;
            };
            let Ok(record) = Record::from_value(&value) else {
                continue;
            };
            for reference in record.references() {
                if let Some(ref_digest) = Digest::parse(&reference) {
                    if !reachable.contains(&ref_digest) {
                        queue.push_back(ref_digest);
                    }
                }
            }
        }

        reachable
    }

    /// Report roots that are missing or unloadable, without touching
    /// anything (`SPEC_FULL.md` §4.7.4). Callers may gate a real GC on an
    /// empty report.
    #[must_use]
    pub fn verify_gc_safety(&self, roots: &HashSet<Digest>) -> Vec<String> {
        let mut issues = Vec::new();
        for root in roots {
            if !self.source.exists(root) {
                issues.push(format!("root does not exist: {root}"));
                continue;
            }
            match self.source.load(root) {
                Ok(value) => {
                    if Record::from_value(&value).is_err() {
                        issues.push(format!("root is not a valid object: {root}"));
                    }
                }
                Err(e) => issues.push(format!("failed to load root {root}: {e}")),
            }
        }
        issues
    }
}
