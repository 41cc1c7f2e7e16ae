//! Integrity verification over a [`coldstore_kernel::storage::ObjectStore`]:
//! structural validation, single-object integrity checks, recursive
//! snapshot verification with cycle detection, and whole-store scans
//! (`SPEC_FULL.md` §4.6, grounded on `integrity/verification.py`).
//!
//! This crate also owns the invariant registry (`SPEC_FULL.md` §4.9,
//! grounded on `invariants.py`); `coldstore-engine` wires concrete
//! predicates into it.

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

pub mod invariants;
pub mod recursive;
pub mod scan;

pub use invariants::{Invariant, InvariantRegistry, InvariantReport};
pub use recursive::{VerificationReport, Verifier};
pub use scan::{scan_all, ScanReport};
