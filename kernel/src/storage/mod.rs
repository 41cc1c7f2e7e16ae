//! Durable, content-addressed storage on disk.
//!
//! [`layout`] owns the path scheme and name sanitization; [`atomic`] owns
//! the temp-file-then-rename write protocol; [`object_store`] composes both
//! into the public put/get/delete/ref API (`SPEC_FULL.md` §4.4–§4.5).

pub mod atomic;
pub mod layout;
pub mod object_store;

pub use layout::{StorageLayout, StorageStats};
pub use object_store::ObjectStore;
