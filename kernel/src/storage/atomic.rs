//! Atomic file writes: write to a temp file in the target directory, then
//! rename over the destination. Rename is atomic on the same filesystem on
//! every platform this crate targets, so a crash mid-write never leaves a
//! partially-written object visible at its final path
//! (`SPEC_FULL.md` §4.5.4).

use std::fs::{self, File};
use std::io::Write as _;
use std::path::Path;

use crate::error::StoreError;

/// Write `content` to `path` atomically.
///
/// The temp file is created alongside `path` (same directory, so the
/// eventual rename stays on one filesystem) and removed if any step before
/// the rename fails.
///
/// # Errors
///
/// Returns [`StoreError::StorageFailure`] if the temp file cannot be
/// created, written, or renamed into place.
pub fn write_atomic(path: &Path, content: &[u8]) -> Result<(), StoreError> {
    let dir = path.parent().ok_or_else(|| {
        StoreError::storage(
            "write_atomic",
            path,
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "path has no parent directory"),
        )
    })?;

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let temp_path = dir.join(format!(".tmp_{file_name}_{}", std::process::id()));

    let write_result = (|| -> std::io::Result<()> {
        let mut file = File::create(&temp_path)?;
        file.write_all(content)?;
        file.sync_all()?;
        Ok(())
    })();

    if let Err(e) = write_result {
        let _ = fs::remove_file(&temp_path);
        return Err(StoreError::storage("write_atomic", path, e));
    }

    if let Err(e) = fs::rename(&temp_path, path) {
        let _ = fs::remove_file(&temp_path);
        return Err(StoreError::storage("write_atomic", path, e));
    }

    Ok(())
}
