//! Blob objects: raw binary data, content-addressed. Leaf objects — they
//! reference nothing (`SPEC_FULL.md` §3.1, grounded on `model/blob.py`).

use base64::Engine as _;
use serde_json::Value;

use crate::error::StoreError;
use crate::hash::{Digest, Hasher};

use super::{Metadata, ObjectKind, Record};

/// An immutable blob of raw bytes.
#[derive(Debug, Clone, PartialEq)]
pub struct Blob {
    data: Vec<u8>,
    metadata: Metadata,
}

impl Blob {
    /// Create a blob from raw bytes, with no metadata.
    #[must_use]
    pub fn new(data: Vec<u8>) -> Self {
        Self {
            data,
            metadata: Metadata::new(),
        }
    }

    /// Create a blob from raw bytes with metadata attached.
    #[must_use]
    pub fn with_metadata(data: Vec<u8>, metadata: Metadata) -> Self {
        Self { data, metadata }
    }

    /// The blob's raw data.
    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// The blob's metadata (empty if none was attached).
    #[must_use]
    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// The size of the blob's data, in bytes.
    #[must_use]
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Build the shared [`Record`] representation.
    #[must_use]
    pub fn to_record(&self) -> Record {
        let encoded = base64::engine::general_purpose::STANDARD.encode(&self.data);
        Record {
            kind: ObjectKind::Blob,
            content: Value::String(encoded),
            metadata: if self.metadata.is_empty() {
                None
            } else {
                Some(self.metadata.clone())
            },
        }
    }

    /// Reconstruct a blob from a decoded [`Record`].
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Invalid`] if the record is not a blob, or its
    /// content is not a valid base64 string.
    pub fn from_record(record: &Record) -> Result<Self, StoreError> {
        if record.kind != ObjectKind::Blob {
            return Err(StoreError::Invalid(format!(
                "expected blob record, got {}",
                record.kind
            )));
        }
        let encoded = record
            .content
            .as_str()
            .ok_or_else(|| StoreError::Invalid("blob content must be a string".into()))?;
        let data = base64::engine::general_purpose::STANDARD
            .decode(encoded)
            .map_err(|e| StoreError::Invalid(format!("failed to decode blob content: {e}")))?;
        Ok(Self {
            data,
            metadata: record.metadata.clone().unwrap_or_default(),
        })
    }

    /// Compute this blob's content digest.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the blob cannot be canonically encoded.
    pub fn compute_hash(&self, hasher: &Hasher) -> Result<Digest, StoreError> {
        self.to_record().digest(hasher)
    }
}
