//! Coldstore Kernel: the pure data-model and storage core of the content-addressed
//! snapshot store.
//!
//! # Module dependency direction
//!
//! `canon` ← `hash` ← `model` ← `storage`
//!
//! One-way only. Nothing in this crate depends on `coldstore-verify`,
//! `coldstore-gc`, `coldstore-sync`, or `coldstore-engine` — those crates
//! depend on this one.
//!
//! # API surface
//!
//! - [`canon::canonical_json_bytes`] — the single canonical-encoding implementation
//! - [`hash::Hasher`] — digest computation over bytes and over encoded records
//! - [`model`] — the four object kinds (blob, bundle, snapshot, tree)
//! - [`storage::layout::StorageLayout`] — on-disk path scheme and sharding
//! - [`storage::object_store::ObjectStore`] — durable atomic put/get/delete

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

pub mod canon;
pub mod error;
pub mod hash;
pub mod model;
pub mod storage;

pub use error::StoreError;
pub use hash::{Digest, HashBackend, Hasher};
