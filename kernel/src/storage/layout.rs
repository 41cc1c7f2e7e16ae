//! Filesystem layout for content-addressed objects and named references
//! (`SPEC_FULL.md` §4.4, grounded on `storage/layout.py`).
//!
//! ```text
//! store_root/
//!     objects/
//!         <2-char prefix>/
//!             <digest>       object file, canonical JSON bytes
//!     snapshots/
//!         <name>             named snapshot reference
//!     refs/
//!         <name>             named reference (tags, etc)
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::StoreError;
use crate::hash::Digest;

/// Aggregate storage statistics (`SPEC_FULL.md` §4.4, §6.3).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StorageStats {
    pub total_objects: u64,
    pub total_size_bytes: u64,
    pub snapshot_refs: u64,
}

/// Owns the on-disk path scheme: where an object, a snapshot reference, or a
/// plain reference lives given the store root.
#[derive(Debug, Clone)]
pub struct StorageLayout {
    store_root: PathBuf,
    objects_dir: PathBuf,
    snapshots_dir: PathBuf,
    refs_dir: PathBuf,
}

impl StorageLayout {
    /// Derive a layout rooted at `store_root`. Does not touch the
    /// filesystem; call [`Self::initialize`] to create the directories.
    #[must_use]
    pub fn new(store_root: impl Into<PathBuf>) -> Self {
        let store_root = store_root.into();
        Self {
            objects_dir: store_root.join("objects"),
            snapshots_dir: store_root.join("snapshots"),
            refs_dir: store_root.join("refs"),
            store_root,
        }
    }

    /// The store's root directory.
    #[must_use]
    pub fn store_root(&self) -> &Path {
        &self.store_root
    }

    /// Create the store's directory structure. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::StorageFailure`] if any directory cannot be
    /// created.
    pub fn initialize(&self) -> Result<(), StoreError> {
        for dir in [&self.store_root, &self.objects_dir, &self.snapshots_dir, &self.refs_dir] {
            fs::create_dir_all(dir).map_err(|e| StoreError::storage("initialize", dir, e))?;
        }
        Ok(())
    }

    /// The path an object's bytes live at, sharded by its two-character
    /// digest prefix.
    #[must_use]
    pub fn object_path(&self, digest: &Digest) -> PathBuf {
        self.objects_dir.join(digest.shard_prefix()).join(digest.as_str())
    }

    /// Ensure the shard directory for `digest` exists.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::StorageFailure`] if the directory cannot be
    /// created.
    pub fn ensure_object_dir(&self, digest: &Digest) -> Result<(), StoreError> {
        let dir = self.objects_dir.join(digest.shard_prefix());
        fs::create_dir_all(&dir).map_err(|e| StoreError::storage("mkdir", &dir, e))
    }

    /// The path a named snapshot reference lives at.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidReference`] if `name` sanitizes to
    /// empty.
    pub fn snapshot_ref_path(&self, name: &str) -> Result<PathBuf, StoreError> {
        Ok(self.snapshots_dir.join(sanitize_name(name)?))
    }

    /// The path a named reference lives at.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidReference`] if `name` sanitizes to
    /// empty.
    pub fn ref_path(&self, name: &str) -> Result<PathBuf, StoreError> {
        Ok(self.refs_dir.join(sanitize_name(name)?))
    }

    /// Whether an object exists at its content-addressed path.
    #[must_use]
    pub fn object_exists(&self, digest: &Digest) -> bool {
        self.object_path(digest).is_file()
    }

    /// Whether a named snapshot reference exists.
    pub fn snapshot_ref_exists(&self, name: &str) -> Result<bool, StoreError> {
        Ok(self.snapshot_ref_path(name)?.is_file())
    }

    /// List every object digest present in the store.
    ///
    /// Digests that fail to parse (foreign files dropped into `objects/`)
    /// are skipped rather than failing the whole scan.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::StorageFailure`] if a directory cannot be read.
    pub fn list_all_objects(&self) -> Result<Vec<Digest>, StoreError> {
        if !self.objects_dir.is_dir() {
            return Ok(Vec::new());
        }
        let mut out = Vec::new();
        for prefix_entry in fs::read_dir(&self.objects_dir)
            .map_err(|e| StoreError::storage("list_objects", &self.objects_dir, e))?
        {
            let prefix_entry = prefix_entry.map_err(|e| StoreError::storage("list_objects", &self.objects_dir, e))?;
            if !prefix_entry.file_type().map(|t| t.is_dir()).unwrap_or(false) {
                continue;
            }
            let prefix_dir = prefix_entry.path();
            for obj_entry in fs::read_dir(&prefix_dir)
                .map_err(|e| StoreError::storage("list_objects", &prefix_dir, e))?
            {
                let obj_entry = obj_entry.map_err(|e| StoreError::storage("list_objects", &prefix_dir, e))?;
                if !obj_entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
                    continue;
                }
                if let Some(name) = obj_entry.file_name().to_str() {
                    if let Some(digest) = Digest::parse(name) {
                        out.push(digest);
                    }
                }
            }
        }
        Ok(out)
    }

    /// List all named snapshot reference names.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::StorageFailure`] if the directory cannot be
    /// read.
    pub fn list_snapshot_refs(&self) -> Result<Vec<String>, StoreError> {
        list_file_names(&self.snapshots_dir)
    }

    /// List all named reference names.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::StorageFailure`] if the directory cannot be
    /// read.
    pub fn list_refs(&self) -> Result<Vec<String>, StoreError> {
        list_file_names(&self.refs_dir)
    }

    /// Aggregate storage statistics: object count, total bytes, and named
    /// snapshot count (`SPEC_FULL.md` §4.4).
    ///
    /// Best-effort: a file that disappears between listing and `stat`-ing it
    /// is simply not counted, matching the original's tolerant accounting.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::StorageFailure`] if the top-level directories
    /// cannot be listed at all.
    pub fn stats(&self) -> Result<StorageStats, StoreError> {
        let mut stats = StorageStats::default();
        for digest in self.list_all_objects()? {
            if let Ok(meta) = fs::metadata(self.object_path(&digest)) {
                stats.total_objects += 1;
                stats.total_size_bytes += meta.len();
            }
        }
        stats.snapshot_refs = self.list_snapshot_refs()?.len() as u64;
        Ok(stats)
    }
}

/// Sanitize a reference name for safe filesystem use: strip path
/// separators, strip leading dots, reject empty results
/// (`SPEC_FULL.md` §4.4, grounded on `StorageLayout._sanitize_name`).
///
/// # Errors
///
/// Returns [`StoreError::InvalidReference`] if the name is empty after
/// sanitization.
pub fn sanitize_name(name: &str) -> Result<String, StoreError> {
    let replaced: String = name.chars().map(|c| if c == '/' || c == '\\' { '_' } else { c }).collect();
    let trimmed = replaced.trim_start_matches('.');
    if trimmed.is_empty() {
        return Err(StoreError::InvalidReference(format!(
            "name '{name}' is empty after sanitization"
        )));
    }
    Ok(trimmed.to_string())
}

fn list_file_names(dir: &Path) -> Result<Vec<String>, StoreError> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let mut out = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| StoreError::storage("list", dir, e))? {
        let entry = entry.map_err(|e| StoreError::storage("list", dir, e))?;
        if entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
            if let Some(name) = entry.file_name().to_str() {
                out.push(name.to_string());
            }
        }
    }
    Ok(out)
}
