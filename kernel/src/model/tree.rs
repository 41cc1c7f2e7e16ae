//! Tree objects: hierarchical grouping of other objects
//! (`SPEC_FULL.md` §3.1, grounded on `model/tree.py`).

use std::collections::BTreeMap;

use serde_json::{json, Value};

use crate::error::StoreError;
use crate::hash::{Digest, Hasher};

use super::{Metadata, ObjectKind, Record};

/// An immutable tree: an ordered list of child object digests.
#[derive(Debug, Clone, PartialEq)]
pub struct Tree {
    children: Vec<String>,
    metadata: Metadata,
}

impl Tree {
    /// Create a tree with no metadata.
    #[must_use]
    pub fn new(children: Vec<String>) -> Self {
        Self {
            children,
            metadata: Metadata::new(),
        }
    }

    /// Create a tree with metadata attached.
    #[must_use]
    pub fn with_metadata(children: Vec<String>, metadata: Metadata) -> Self {
        Self { children, metadata }
    }

    /// The ordered child digests.
    #[must_use]
    pub fn children(&self) -> &[String] {
        &self.children
    }

    /// This tree's metadata (empty if none was attached).
    #[must_use]
    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// The number of children in this tree.
    #[must_use]
    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    /// Whether this tree has any children.
    #[must_use]
    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// A mapping of child digest to display name, read from the
    /// `metadata.names` map. Children without an entry map to an empty
    /// string, matching the original's `names.get(child, '')` behavior.
    #[must_use]
    pub fn child_names(&self) -> BTreeMap<String, String> {
        let names = self
            .metadata
            .get("names")
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default();
        self.children
            .iter()
            .map(|c| {
                let name = names
                    .get(c)
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string();
                (c.clone(), name)
            })
            .collect()
    }

    /// Derive a new tree with an additional child appended, optionally
    /// naming it in `metadata.names`.
    #[must_use]
    pub fn with_child(&self, child_digest: String, name: Option<&str>) -> Self {
        let mut children = self.children.clone();
        let mut metadata = self.metadata.clone();
        if let Some(name) = name {
            let names = metadata
                .entry("names".to_string())
                .or_insert_with(|| Value::Object(serde_json::Map::new()));
            if let Value::Object(map) = names {
                map.insert(child_digest.clone(), Value::String(name.to_string()));
            }
        }
        children.push(child_digest);
        Self { children, metadata }
    }

    /// Derive a new tree without the given child, also dropping any name
    /// entry for it.
    #[must_use]
    pub fn without_child(&self, child_digest: &str) -> Self {
        let children: Vec<String> = self
            .children
            .iter()
            .filter(|c| c.as_str() != child_digest)
            .cloned()
            .collect();
        let mut metadata = self.metadata.clone();
        if let Some(Value::Object(names)) = metadata.get_mut("names") {
            names.remove(child_digest);
        }
        Self { children, metadata }
    }

    /// Build the shared [`Record`] representation.
    #[must_use]
    pub fn to_record(&self) -> Record {
        Record {
            kind: ObjectKind::Tree,
            content: json!({ "children": self.children }),
            metadata: if self.metadata.is_empty() {
                None
            } else {
                Some(self.metadata.clone())
            },
        }
    }

    /// Reconstruct a tree from a decoded [`Record`].
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Invalid`] if the record is not a tree, its
    /// content is missing `children`, or `children` is not a list of
    /// strings.
    pub fn from_record(record: &Record) -> Result<Self, StoreError> {
        if record.kind != ObjectKind::Tree {
            return Err(StoreError::Invalid(format!(
                "expected tree record, got {}",
                record.kind
            )));
        }
        let content = record
            .content
            .as_object()
            .ok_or_else(|| StoreError::Invalid("tree content must be an object".into()))?;

        let children_value = content
            .get("children")
            .ok_or_else(|| StoreError::Invalid("tree content missing children field".into()))?;
        let children = children_value
            .as_array()
            .ok_or_else(|| StoreError::Invalid("tree children must be a list".into()))?
            .iter()
            .map(|v| {
                v.as_str()
                    .map(str::to_string)
                    .ok_or_else(|| StoreError::Invalid("tree child entry must be a string".into()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            children,
            metadata: record.metadata.clone().unwrap_or_default(),
        })
    }

    /// Compute this tree's content digest.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the tree cannot be canonically encoded.
    pub fn compute_hash(&self, hasher: &Hasher) -> Result<Digest, StoreError> {
        self.to_record().digest(hasher)
    }
}
