//! An advisory lockfile enforcing single-writer access
//! (`spec.md` §5: "Implementers may (and should) enforce this with an
//! advisory lockfile at the store root").

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

use coldstore_kernel::StoreError;

/// Holds an exclusively-created lockfile for as long as it lives. The file
/// is removed on drop.
///
/// This is advisory only: nothing stops another process from ignoring the
/// lockfile and writing anyway. It exists to catch the common case of two
/// [`crate::Engine`] instances opened against the same root in the same
/// process tree, not to defend against an adversarial writer.
#[derive(Debug)]
pub struct AdvisoryLock {
    path: PathBuf,
}

impl AdvisoryLock {
    /// Exclusively create the lockfile at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::StorageFailure`] if the file already exists or
    /// cannot be created.
    pub fn acquire(path: PathBuf) -> Result<Self, StoreError> {
        OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .map_err(|e| StoreError::storage("acquire_lock", &path, e))?;
        tracing::debug!(path = %path.display(), "acquired advisory lock");
        Ok(Self { path })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for AdvisoryLock {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            tracing::warn!(path = %self.path.display(), error = %e, "failed to release advisory lock");
        }
    }
}
