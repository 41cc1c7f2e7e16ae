//! Content-addressed object storage: immutable put/get/delete over the
//! filesystem layout, plus named snapshot and tag references
//! (`SPEC_FULL.md` §4.5, grounded on `storage/object_store.py`).

use serde_json::Value;

use crate::error::StoreError;
use crate::hash::{Digest, Hasher};
use crate::model::Record;

use super::atomic::write_atomic;
use super::layout::{StorageLayout, StorageStats};

/// A content-addressed, immutable object store.
///
/// Once written, an object at a given digest never changes — `put_object`
/// is idempotent, and a write that finds an existing-but-corrupted object
/// at the target path self-heals by overwriting it (`SPEC_FULL.md` §4.5.2).
#[derive(Debug)]
pub struct ObjectStore {
    layout: StorageLayout,
    hasher: Hasher,
}

impl ObjectStore {
    /// Construct an object store over `layout` using `hasher` for digest
    /// computation. The caller is responsible for using the same `hasher`
    /// backend for the lifetime of one store.
    #[must_use]
    pub fn new(layout: StorageLayout, hasher: Hasher) -> Self {
        Self { layout, hasher }
    }

    /// The underlying filesystem layout.
    #[must_use]
    pub fn layout(&self) -> &StorageLayout {
        &self.layout
    }

    /// The hasher this store computes digests with.
    #[must_use]
    pub fn hasher(&self) -> &Hasher {
        &self.hasher
    }

    /// Store a record and return its digest.
    ///
    /// Structurally validates the record, computes its digest from the
    /// canonical encoding, and writes it atomically. If an object already
    /// exists at the computed digest's path, this call is a no-op unless
    /// the existing file is corrupted or unparseable, in which case it is
    /// overwritten (`SPEC_FULL.md` §4.5.2).
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the record is structurally invalid or the
    /// write fails.
    pub fn put_object(&self, record: &Record) -> Result<Digest, StoreError> {
        let value = record.to_value();
        // Round-trip through Record::from_value to catch shapes that would
        // otherwise only be rejected on a later `get_object`.
        Record::from_value(&value)?;

        let digest = self.hasher.hash_object(&value)?;
        let path = self.layout.object_path(&digest);

        if path.is_file() {
            if self.existing_object_is_valid(&path, &digest) {
                tracing::debug!(digest = %digest, "put_object: already present, skipping write");
                return Ok(digest);
            }
            tracing::warn!(digest = %digest, "put_object: existing object corrupted, overwriting");
        }

        self.layout.ensure_object_dir(&digest)?;
        let bytes = crate::canon::canonical_json_bytes(&value)?;
        write_atomic(&path, &bytes)?;
        tracing::debug!(digest = %digest, "put_object: wrote object");
        Ok(digest)
    }

    fn existing_object_is_valid(&self, path: &std::path::Path, digest: &Digest) -> bool {
        let Ok(bytes) = std::fs::read(path) else {
            return false;
        };
        let Ok(value) = serde_json::from_slice::<Value>(&bytes) else {
            return false;
        };
        if Record::from_value(&value).is_err() {
            return false;
        }
        self.hasher.hash_object(&value).map(|d| &d == digest).unwrap_or(false)
    }

    /// Retrieve an object by its digest.
    ///
    /// When `verify` is true (the normal case), the decoded record is
    /// re-hashed and compared against `digest` before being returned.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if no object exists at `digest`,
    /// [`StoreError::Corrupted`] if `verify` is true and the stored bytes
    /// don't hash back to `digest`, or [`StoreError::Invalid`] if the
    /// stored bytes aren't valid JSON or a valid record shape.
    pub fn get_object(&self, digest: &Digest, verify: bool) -> Result<Value, StoreError> {
        let path = self.layout.object_path(digest);
        if !path.is_file() {
            return Err(StoreError::NotFound(digest.to_string()));
        }

        let bytes = std::fs::read(&path).map_err(|e| StoreError::storage("read_object", &path, e))?;
        let value: Value = serde_json::from_slice(&bytes)
            .map_err(|e| StoreError::Invalid(format!("object {digest} is not valid JSON: {e}")))?;

        if verify {
            Record::from_value(&value)?;
            let actual = self.hasher.hash_object(&value)?;
            if &actual != digest {
                return Err(StoreError::Corrupted {
                    digest: digest.to_string(),
                    expected: digest.to_string(),
                    actual: actual.to_string(),
                });
            }
        }

        Ok(value)
    }

    /// Whether an object exists at `digest`.
    #[must_use]
    pub fn has_object(&self, digest: &Digest) -> bool {
        self.layout.object_exists(digest)
    }

    /// Delete an object. Used exclusively by garbage collection sweep
    /// phases — callers must have already established `digest` is
    /// unreachable (`SPEC_FULL.md` §4.7).
    ///
    /// Returns `true` if an object was deleted, `false` if none existed.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::StorageFailure`] if the file exists but cannot
    /// be removed.
    pub fn delete_object(&self, digest: &Digest) -> Result<bool, StoreError> {
        let path = self.layout.object_path(digest);
        if !path.is_file() {
            return Ok(false);
        }
        std::fs::remove_file(&path).map_err(|e| StoreError::storage("delete_object", &path, e))?;
        tracing::debug!(digest = %digest, "delete_object: removed");
        Ok(true)
    }

    /// List every object digest present in the store.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::StorageFailure`] if the objects directory
    /// cannot be read.
    pub fn list_all_objects(&self) -> Result<Vec<Digest>, StoreError> {
        self.layout.list_all_objects()
    }

    /// Create or overwrite a named snapshot reference — a garbage
    /// collection root.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if `snapshot_digest` is not present
    /// in the store, or [`StoreError::InvalidReference`]/
    /// [`StoreError::StorageFailure`] on a bad name or write failure.
    pub fn put_snapshot_ref(&self, name: &str, snapshot_digest: &Digest) -> Result<(), StoreError> {
        if !self.has_object(snapshot_digest) {
            return Err(StoreError::NotFound(snapshot_digest.to_string()));
        }
        let path = self.layout.snapshot_ref_path(name)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| StoreError::storage("write_snapshot_ref", parent, e))?;
        }
        write_atomic(&path, snapshot_digest.as_str().as_bytes())?;
        tracing::debug!(name, digest = %snapshot_digest, "put_snapshot_ref");
        Ok(())
    }

    /// Resolve a named snapshot reference to its digest, if it exists.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on a bad name, an unreadable ref file, or a
    /// stored value that isn't a well-formed digest.
    pub fn get_snapshot_ref(&self, name: &str) -> Result<Option<Digest>, StoreError> {
        self.read_ref(self.layout.snapshot_ref_path(name)?)
    }

    /// Delete a named snapshot reference.
    ///
    /// Returns `true` if a reference was deleted, `false` if none existed.
    /// This is a plain unlink with no tombstone: a deleted reference leaves
    /// no trace it ever existed (`SPEC_FULL.md` §9).
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on a bad name or removal failure.
    pub fn delete_snapshot_ref(&self, name: &str) -> Result<bool, StoreError> {
        self.delete_ref_file(self.layout.snapshot_ref_path(name)?)
    }

    /// List all named snapshot reference names.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::StorageFailure`] if the snapshots directory
    /// cannot be read.
    pub fn list_snapshot_refs(&self) -> Result<Vec<String>, StoreError> {
        self.layout.list_snapshot_refs()
    }

    /// Create or overwrite a plain named reference (a tag, not a GC root
    /// unless the caller treats it as one).
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if `digest` is not present in the
    /// store, or a name/write failure.
    pub fn put_ref(&self, name: &str, digest: &Digest) -> Result<(), StoreError> {
        if !self.has_object(digest) {
            return Err(StoreError::NotFound(digest.to_string()));
        }
        let path = self.layout.ref_path(name)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| StoreError::storage("write_ref", parent, e))?;
        }
        write_atomic(&path, digest.as_str().as_bytes())?;
        Ok(())
    }

    /// Resolve a plain named reference to its digest, if it exists.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on a bad name, an unreadable ref file, or a
    /// stored value that isn't a well-formed digest.
    pub fn get_ref(&self, name: &str) -> Result<Option<Digest>, StoreError> {
        self.read_ref(self.layout.ref_path(name)?)
    }

    /// Delete a plain named reference.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on a bad name or removal failure.
    pub fn delete_ref(&self, name: &str) -> Result<bool, StoreError> {
        self.delete_ref_file(self.layout.ref_path(name)?)
    }

    /// List all plain named reference names.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::StorageFailure`] if the refs directory cannot
    /// be read.
    pub fn list_refs(&self) -> Result<Vec<String>, StoreError> {
        self.layout.list_refs()
    }

    /// Aggregate storage statistics (`SPEC_FULL.md` §6.3).
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::StorageFailure`] if the store's top-level
    /// directories cannot be listed.
    pub fn stats(&self) -> Result<StorageStats, StoreError> {
        self.layout.stats()
    }

    fn read_ref(&self, path: std::path::PathBuf) -> Result<Option<Digest>, StoreError> {
        if !path.is_file() {
            return Ok(None);
        }
        let text = std::fs::read_to_string(&path).map_err(|e| StoreError::storage("read_ref", &path, e))?;
        let trimmed = text.trim();
        Digest::parse(trimmed)
            .map(Some)
            .ok_or_else(|| StoreError::Invalid(format!("ref at {} is not a valid digest", path.display())))
    }

    fn delete_ref_file(&self, path: std::path::PathBuf) -> Result<bool, StoreError> {
        if !path.is_file() {
            return Ok(false);
        }
        std::fs::remove_file(&path).map_err(|e| StoreError::storage("delete_ref", &path, e))?;
        Ok(true)
    }
}
