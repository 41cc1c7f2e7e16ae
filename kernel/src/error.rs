//! The error taxonomy shared across the workspace (`SPEC_FULL.md` §7).
//!
//! `verify`, `gc`, `sync`, and `engine` each define narrower error enums for
//! their own operations and convert into [`StoreError`] at the boundary —
//! this is the one taxonomy every crate eventually speaks.

use std::io;
use std::path::PathBuf;

use crate::canon::CanonError;

/// The full error taxonomy for store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A digest or named reference is absent.
    #[error("not found: {0}")]
    NotFound(String),

    /// Hash mismatch or unparseable record bytes.
    #[error("object {digest} is corrupted: expected {expected}, recomputed {actual}")]
    Corrupted {
        digest: String,
        expected: String,
        actual: String,
    },

    /// Structural validation failure (missing fields, wrong type tag, non-list
    /// where a list is required).
    #[error("invalid object: {0}")]
    Invalid(String),

    /// Recursive snapshot verification produced one or more errors.
    #[error("verification failed with {} error(s)", .0.len())]
    VerificationFailed(Vec<String>),

    /// A referenced digest is not present in the store.
    #[error("{referencing} references missing object {missing}")]
    ReferenceMissing { referencing: String, missing: String },

    /// A whole-store scan found tampering across one or more objects.
    #[error("tampering detected: {0}")]
    TamperDetected(String),

    /// A sweep-time failure for one specific object; collected, not raised,
    /// by the garbage collector itself (`SPEC_FULL.md` §7).
    #[error("garbage collection error: {0}")]
    GCError(String),

    /// A registered invariant check returned false or raised.
    #[error("invariant violation ({invariant}): {detail}")]
    InvariantViolation { invariant: String, detail: String },

    /// An underlying I/O failure.
    #[error("storage failure during {operation} on {path}: {cause}")]
    StorageFailure {
        operation: String,
        path: PathBuf,
        #[source]
        cause: io::Error,
    },

    /// A cycle or malformed digest was encountered walking a reference chain.
    #[error("invalid reference: {0}")]
    InvalidReference(String),
}

impl From<CanonError> for StoreError {
    fn from(e: CanonError) -> Self {
        Self::Invalid(e.to_string())
    }
}

impl StoreError {
    /// Construct a [`StoreError::StorageFailure`] from an I/O error at a path.
    pub fn storage(operation: impl Into<String>, path: impl Into<PathBuf>, cause: io::Error) -> Self {
        Self::StorageFailure {
            operation: operation.into(),
            path: path.into(),
            cause,
        }
    }
}
