//! Engine configuration: the ambient layer the distilled spec omits
//! (`SPEC_FULL.md` §10).

use std::path::PathBuf;

use coldstore_kernel::HashBackend;

/// Construction-time configuration for an [`crate::Engine`].
///
/// Affects only which hash algorithm produces this store's digests and
/// whether an advisory lockfile is taken — never the wire format or on-disk
/// layout beyond that.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub root: PathBuf,
    pub hash_backend: HashBackend,
    pub lock: bool,
}

impl EngineConfig {
    /// Default configuration for a store rooted at `root`: BLAKE3 hashing,
    /// advisory lock taken on [`crate::Engine::initialize`].
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            hash_backend: HashBackend::default(),
            lock: true,
        }
    }

    #[must_use]
    pub fn with_hash_backend(mut self, backend: HashBackend) -> Self {
        self.hash_backend = backend;
        self
    }

    #[must_use]
    pub fn with_lock(mut self, lock: bool) -> Self {
        self.lock = lock;
        self
    }
}
