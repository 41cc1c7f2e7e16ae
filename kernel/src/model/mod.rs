//! The object model: four kinds, one shared record shape.
//!
//! Every stored object is a tagged record with `type`, `content`, and an
//! optional `metadata` mapping (`SPEC_FULL.md` §3.1). This module owns the
//! shared [`Record`] shape and its structural validation; [`blob`],
//! [`bundle`], [`snapshot`], and [`tree`] layer typed views on top.

pub mod blob;
pub mod bundle;
pub mod snapshot;
pub mod tree;

use std::fmt;

use serde_json::{Map, Value};

use crate::error::StoreError;
use crate::hash::{Digest, Hasher};

/// An open, schemaless value: the representation used for bundle payloads
/// and object metadata (`SPEC_FULL.md` §9, "Dynamic-typed payloads").
pub type Payload = Value;

/// A string-keyed mapping of open values, used for object metadata.
pub type Metadata = Map<String, Value>;

/// The four admitted object kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    Blob,
    Bundle,
    Snapshot,
    Tree,
}

impl ObjectKind {
    /// The wire-format tag for this kind.
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Blob => "blob",
            Self::Bundle => "bundle",
            Self::Snapshot => "snapshot",
            Self::Tree => "tree",
        }
    }

    /// Parse a kind from its wire-format tag.
    #[must_use]
    pub fn parse(tag: &str) -> Option<Self> {
        match tag {
            "blob" => Some(Self::Blob),
            "bundle" => Some(Self::Bundle),
            "snapshot" => Some(Self::Snapshot),
            "tree" => Some(Self::Tree),
            _ => None,
        }
    }

    /// Whether this kind is a leaf (holds no references to other objects).
    #[must_use]
    pub const fn is_leaf(self) -> bool {
        matches!(self, Self::Blob | Self::Bundle)
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// The shared on-disk shape every object kind encodes to and decodes from.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub kind: ObjectKind,
    pub content: Value,
    pub metadata: Option<Metadata>,
}

impl Record {
    /// Build the wire-format [`Value`] for this record.
    ///
    /// Metadata is omitted entirely when absent, matching the original
    /// prototype's `if self.metadata: obj['metadata'] = self.metadata`
    /// behavior (`SPEC_FULL.md` §3.5) — an object given no metadata and the
    /// same object given an explicit empty metadata map are NOT guaranteed
    /// to share a digest; only the former omits the field.
    #[must_use]
    pub fn to_value(&self) -> Value {
        let mut obj = Map::new();
        obj.insert("type".to_string(), Value::String(self.kind.tag().to_string()));
        obj.insert("content".to_string(), self.content.clone());
        if let Some(meta) = &self.metadata {
            if !meta.is_empty() {
                obj.insert("metadata".to_string(), Value::Object(meta.clone()));
            }
        }
        Value::Object(obj)
    }

    /// Parse and structurally validate a record from its wire-format
    /// [`Value`] (`SPEC_FULL.md` §4.6.1).
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Invalid`] if the value is not an object, is
    /// missing `type`/`content`, carries an unrecognized `type`, or has a
    /// non-object `metadata`.
    pub fn from_value(value: &Value) -> Result<Self, StoreError> {
        let obj = value
            .as_object()
            .ok_or_else(|| StoreError::Invalid("record must be a JSON object".into()))?;

        let tag = obj
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| StoreError::Invalid("record missing 'type' field".into()))?;
        let kind = ObjectKind::parse(tag)
            .ok_or_else(|| StoreError::Invalid(format!("invalid object type: {tag}")))?;

        let content = obj
            .get("content")
            .cloned()
            .ok_or_else(|| StoreError::Invalid("record missing 'content' field".into()))?;

        let metadata = match obj.get("metadata") {
            None => None,
            Some(Value::Object(m)) => Some(m.clone()),
            Some(_) => return Err(StoreError::Invalid("metadata must be a JSON object".into())),
        };

        Ok(Self {
            kind,
            content,
            metadata,
        })
    }

    /// Compute this record's content digest.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the record cannot be canonically encoded.
    pub fn digest(&self, hasher: &Hasher) -> Result<Digest, StoreError> {
        Ok(hasher.hash_object(&self.to_value())?)
    }

    /// Extract the set of digests this record references
    /// (`SPEC_FULL.md` §4.6.3).
    ///
    /// - blob, bundle → empty
    /// - snapshot → `bundles` plus `parent` if present
    /// - tree → `children`
    #[must_use]
    pub fn references(&self) -> Vec<String> {
        match self.kind {
            ObjectKind::Blob | ObjectKind::Bundle => Vec::new(),
            ObjectKind::Snapshot => {
                let mut refs: Vec<String> = self
                    .content
                    .get("bundles")
                    .and_then(Value::as_array)
                    .map(|arr| {
                        arr.iter()
                            .filter_map(Value::as_str)
                            .map(str::to_string)
                            .collect()
                    })
                    .unwrap_or_default();
                if let Some(parent) = self.content.get("parent").and_then(Value::as_str) {
                    refs.push(parent.to_string());
                }
                refs
            }
            ObjectKind::Tree => self
                .content
                .get("children")
                .and_then(Value::as_array)
                .map(|arr| {
                    arr.iter()
                        .filter_map(Value::as_str)
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default(),
        }
    }
}
