//! Bundle objects: opaque external payloads (sync bundles produced by the
//! upstream sync engine). Leaf objects — they reference nothing
//! (`SPEC_FULL.md` §3.1, grounded on `model/bundle.py`).

use serde_json::Value;

use crate::error::StoreError;
use crate::hash::{Digest, Hasher};

use super::{Metadata, ObjectKind, Payload, Record};

/// An immutable bundle wrapping an opaque external payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Bundle {
    payload: Payload,
    metadata: Metadata,
}

impl Bundle {
    /// Create a bundle from a payload, with no metadata.
    #[must_use]
    pub fn new(payload: Payload) -> Self {
        Self {
            payload,
            metadata: Metadata::new(),
        }
    }

    /// Create a bundle from a payload with metadata attached.
    #[must_use]
    pub fn with_metadata(payload: Payload, metadata: Metadata) -> Self {
        Self { payload, metadata }
    }

    /// The bundle's opaque payload.
    #[must_use]
    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    /// The bundle's metadata (empty if none was attached).
    #[must_use]
    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// The `operations` array from the payload, if present; empty otherwise.
    #[must_use]
    pub fn operations(&self) -> &[Value] {
        self.payload
            .get("operations")
            .and_then(Value::as_array)
            .map_or(&[], Vec::as_slice)
    }

    /// The `sequence` field from the payload, if present and integral.
    #[must_use]
    pub fn sequence_number(&self) -> Option<i64> {
        self.payload.get("sequence").and_then(Value::as_i64)
    }

    /// Build the shared [`Record`] representation.
    #[must_use]
    pub fn to_record(&self) -> Record {
        Record {
            kind: ObjectKind::Bundle,
            content: self.payload.clone(),
            metadata: if self.metadata.is_empty() {
                None
            } else {
                Some(self.metadata.clone())
            },
        }
    }

    /// Reconstruct a bundle from a decoded [`Record`].
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Invalid`] if the record is not a bundle.
    pub fn from_record(record: &Record) -> Result<Self, StoreError> {
        if record.kind != ObjectKind::Bundle {
            return Err(StoreError::Invalid(format!(
                "expected bundle record, got {}",
                record.kind
            )));
        }
        Ok(Self {
            payload: record.content.clone(),
            metadata: record.metadata.clone().unwrap_or_default(),
        })
    }

    /// Compute this bundle's content digest.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the bundle cannot be canonically encoded.
    pub fn compute_hash(&self, hasher: &Hasher) -> Result<Digest, StoreError> {
        self.to_record().digest(hasher)
    }
}
