//! The invariant registry: named `(name, description, predicate)` triples
//! runnable on demand (`SPEC_FULL.md` §4.9, §12, grounded on
//! `invariants.py`).
//!
//! This is a diagnostic surface, not an enforcement mechanism — the
//! invariants themselves are enforced inline by the kernel, verify, and gc
//! crates. `coldstore-engine` wires concrete predicates that re-derive their
//! answer from current store state (`SPEC_FULL.md` §12) rather than
//! hardcoding `true`, unlike the original prototype's stub checks.

use coldstore_kernel::StoreError;

/// One named, checkable system guarantee.
pub struct Invariant<'a> {
    name: String,
    description: String,
    predicate: Box<dyn Fn() -> Result<bool, StoreError> + 'a>,
}

impl<'a> Invariant<'a> {
    /// Run this invariant's predicate.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvariantViolation`] if the predicate returns
    /// `false` or itself raises.
    pub fn verify(&self) -> Result<(), StoreError> {
        match (self.predicate)() {
            Ok(true) => Ok(()),
            Ok(false) => Err(StoreError::InvariantViolation {
                invariant: self.name.clone(),
                detail: format!("check function returned false: {}", self.description),
            }),
            Err(e) => Err(StoreError::InvariantViolation {
                invariant: self.name.clone(),
                detail: format!("check function raised: {e}"),
            }),
        }
    }
}

/// Outcome of [`InvariantRegistry::verify_all`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvariantReport {
    pub passed: Vec<String>,
    pub failed: Vec<(String, String)>,
}

impl InvariantReport {
    /// Whether every registered invariant passed.
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.failed.is_empty()
    }
}

/// A registry of named invariant checks, built fresh per call over a
/// borrowed store (`SPEC_FULL.md` §12).
///
/// The registry borrows whatever state its predicates close over (typically
/// an [`coldstore_kernel::storage::ObjectStore`]), so it is built and
/// consumed within one call rather than stored long-lived inside the owner
/// of that state.
#[derive(Default)]
pub struct InvariantRegistry<'a> {
    invariants: Vec<Invariant<'a>>,
}

impl<'a> InvariantRegistry<'a> {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self { invariants: Vec::new() }
    }

    /// Register a new invariant.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        description: impl Into<String>,
        predicate: impl Fn() -> Result<bool, StoreError> + 'a,
    ) {
        self.invariants.push(Invariant {
            name: name.into(),
            description: description.into(),
            predicate: Box::new(predicate),
        });
    }

    /// Run every registered invariant, collecting pass/fail rather than
    /// stopping at the first failure.
    #[must_use]
    pub fn verify_all(&self) -> InvariantReport {
        let mut report = InvariantReport::default();
        for invariant in &self.invariants {
            match invariant.verify() {
                Ok(()) => report.passed.push(invariant.name.clone()),
                Err(e) => report.failed.push((invariant.name.clone(), e.to_string())),
            }
        }
        report
    }

    /// Run a single named invariant.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvariantViolation`] if the check fails, or
    /// [`StoreError::Invalid`] if no invariant is registered under `name`.
    pub fn verify_one(&self, name: &str) -> Result<(), StoreError> {
        self.invariants
            .iter()
            .find(|i| i.name == name)
            .ok_or_else(|| StoreError::Invalid(format!("unknown invariant: {name}")))?
            .verify()
    }

    /// List every registered invariant's name and description.
    #[must_use]
    pub fn list_invariants(&self) -> Vec<(String, String)> {
        self.invariants
            .iter()
            .map(|i| (i.name.clone(), i.description.clone()))
            .collect()
    }
}
