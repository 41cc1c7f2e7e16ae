//! Whole-store scans: structural and integrity verification across every
//! object in the store, independent of any particular snapshot's reference
//! graph (`SPEC_FULL.md` §4.6.4, grounded on `detect_tampering` in
//! `integrity/verification.py`).

use coldstore_kernel::model::Record;
use coldstore_kernel::storage::ObjectStore;
use coldstore_kernel::Digest;

/// The outcome of a whole-store scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanReport {
    pub objects_scanned: u64,
    pub tampered: Vec<Digest>,
    pub invalid: Vec<(Digest, String)>,
}

impl ScanReport {
    /// Whether the scan found no tampering and no structurally invalid
    /// objects.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.tampered.is_empty() && self.invalid.is_empty()
    }
}

/// Scan every object in `store`, checking structure and re-hashing content
/// against its storage-path digest.
///
/// Unlike [`crate::Verifier::verify_object`], a scan never stops at the
/// first failure: it is meant to characterize the full extent of damage to
/// a store, not just confirm one digest is good.
///
/// # Errors
///
/// Returns [`coldstore_kernel::StoreError`] only if the store's object list
/// itself cannot be read; per-object failures are collected into the
/// returned [`ScanReport`] instead of aborting the scan.
pub fn scan_all(store: &ObjectStore) -> Result<ScanReport, coldstore_kernel::StoreError> {
    let mut report = ScanReport::default();
    for digest in store.list_all_objects()? {
        report.objects_scanned += 1;
        match store.get_object(&digest, true) {
            Ok(value) => {
                if let Err(e) = Record::from_value(&value) {
                    report.invalid.push((digest, e.to_string()));
                }
            }
            Err(coldstore_kernel::StoreError::Corrupted { .. }) => {
                tracing::warn!(digest = %digest, "scan_all: tampering detected");
                report.tampered.push(digest);
            }
            Err(e) => report.invalid.push((digest, e.to_string())),
        }
    }
    Ok(report)
}
