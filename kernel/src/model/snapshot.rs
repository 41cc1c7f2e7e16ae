//! Snapshot objects: deterministic state references chaining into a DAG via
//! `parent` (`SPEC_FULL.md` §3.1, grounded on `model/snapshot.py`).

use serde_json::{json, Value};

use crate::error::StoreError;
use crate::hash::{Digest, Hasher};

use super::{Metadata, ObjectKind, Record};

/// An immutable snapshot: an ordered list of bundle digests plus an optional
/// parent snapshot digest.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    bundles: Vec<String>,
    parent: Option<String>,
    metadata: Metadata,
}

impl Snapshot {
    /// Create a snapshot with no parent and no metadata.
    #[must_use]
    pub fn new(bundles: Vec<String>) -> Self {
        Self {
            bundles,
            parent: None,
            metadata: Metadata::new(),
        }
    }

    /// Create a snapshot with an explicit parent, additional bundles, and
    /// metadata.
    #[must_use]
    pub fn with_parent_and_metadata(
        bundles: Vec<String>,
        parent: Option<String>,
        metadata: Metadata,
    ) -> Self {
        Self {
            bundles,
            parent,
            metadata,
        }
    }

    /// The ordered bundle digests this snapshot references.
    #[must_use]
    pub fn bundles(&self) -> &[String] {
        &self.bundles
    }

    /// The parent snapshot digest, if any.
    #[must_use]
    pub fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    /// This snapshot's metadata (empty if none was attached).
    #[must_use]
    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// The number of bundles referenced by this snapshot.
    #[must_use]
    pub fn bundle_count(&self) -> usize {
        self.bundles.len()
    }

    /// Whether this snapshot has a parent.
    #[must_use]
    pub fn has_parent(&self) -> bool {
        self.parent.is_some()
    }

    /// All digests this snapshot references: its bundles, then its parent
    /// if present.
    #[must_use]
    pub fn all_references(&self) -> Vec<String> {
        let mut refs = self.bundles.clone();
        if let Some(p) = &self.parent {
            refs.push(p.clone());
        }
        refs
    }

    /// Derive a new snapshot sharing this one's bundles and metadata, with
    /// a parent attached.
    #[must_use]
    pub fn with_parent(&self, parent_digest: String) -> Self {
        Self {
            bundles: self.bundles.clone(),
            parent: Some(parent_digest),
            metadata: self.metadata.clone(),
        }
    }

    /// Derive a new snapshot with additional bundles appended, sharing this
    /// one's parent and metadata.
    #[must_use]
    pub fn with_additional_bundles(&self, new_bundles: &[String]) -> Self {
        let mut bundles = self.bundles.clone();
        bundles.extend_from_slice(new_bundles);
        Self {
            bundles,
            parent: self.parent.clone(),
            metadata: self.metadata.clone(),
        }
    }

    /// Build the shared [`Record`] representation.
    #[must_use]
    pub fn to_record(&self) -> Record {
        let mut content = json!({ "bundles": self.bundles });
        if let Some(parent) = &self.parent {
            content
                .as_object_mut()
                .expect("content built as object literal")
                .insert("parent".to_string(), Value::String(parent.clone()));
        }
        Record {
            kind: ObjectKind::Snapshot,
            content,
            metadata: if self.metadata.is_empty() {
                None
            } else {
                Some(self.metadata.clone())
            },
        }
    }

    /// Reconstruct a snapshot from a decoded [`Record`].
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Invalid`] if the record is not a snapshot, its
    /// content is missing `bundles`, or `bundles` is not a list of strings.
    pub fn from_record(record: &Record) -> Result<Self, StoreError> {
        if record.kind != ObjectKind::Snapshot {
            return Err(StoreError::Invalid(format!(
                "expected snapshot record, got {}",
                record.kind
            )));
        }
        let content = record
            .content
            .as_object()
            .ok_or_else(|| StoreError::Invalid("snapshot content must be an object".into()))?;

        let bundles_value = content
            .get("bundles")
            .ok_or_else(|| StoreError::Invalid("snapshot content missing bundles field".into()))?;
        let bundles = bundles_value
            .as_array()
            .ok_or_else(|| StoreError::Invalid("snapshot bundles must be a list".into()))?
            .iter()
            .map(|v| {
                v.as_str()
                    .map(str::to_string)
                    .ok_or_else(|| StoreError::Invalid("snapshot bundle entry must be a string".into()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let parent = match content.get("parent") {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(s.clone()),
            Some(_) => return Err(StoreError::Invalid("snapshot parent must be a string".into())),
        };

        Ok(Self {
            bundles,
            parent,
            metadata: record.metadata.clone().unwrap_or_default(),
        })
    }

    /// Compute this snapshot's content digest.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the snapshot cannot be canonically encoded.
    pub fn compute_hash(&self, hasher: &Hasher) -> Result<Digest, StoreError> {
        self.to_record().digest(hasher)
    }
}
