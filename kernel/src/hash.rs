//! Digest computation: the single canonical hashing implementation.
//!
//! A [`Digest`] is always a 64-character lowercase-hex string, regardless of
//! which backend produced it — both BLAKE3 and SHA-256 output 256 bits. The
//! backend is a construction-time choice of [`Hasher`], never encoded in the
//! digest itself, and must not be mixed within one store (§9 of
//! `SPEC_FULL.md`).

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::canon::canonical_json_bytes;

/// A 64-character lowercase-hex 256-bit content digest.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Digest(String);

impl Digest {
    /// The expected string length of a digest.
    pub const LEN: usize = 64;

    /// Parse a digest from a string, validating the `^[0-9a-f]{64}$` shape.
    ///
    /// Returns `None` if the string is not exactly 64 lowercase hex
    /// characters.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        if s.len() != Self::LEN {
            return None;
        }
        if !s.bytes().all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b)) {
            return None;
        }
        Some(Self(s.to_string()))
    }

    /// The digest's hex string representation.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The two-character shard prefix used for directory sharding.
    ///
    /// # Panics
    ///
    /// Never panics: every `Digest` is guaranteed to be at least two
    /// characters long by [`Self::parse`] and [`Hasher::hash_bytes`].
    #[must_use]
    pub fn shard_prefix(&self) -> &str {
        &self.0[..2]
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Digest {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// The digest algorithm backing a [`Hasher`].
///
/// BLAKE3 is preferred per `SPEC_FULL.md` §10; SHA-256 remains available as
/// a fallback for environments without a BLAKE3 binding. Both produce
/// 64-hex-char digests, so callers never need to branch on which backend
/// produced a given [`Digest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HashBackend {
    /// BLAKE3 (default).
    #[default]
    Blake3,
    /// SHA-256 (fallback).
    Sha256,
}

/// Computes digests for a single, fixed backend.
///
/// Construct one `Hasher` per store and use it for every `hash_bytes` /
/// `hash_object` call for that store's lifetime — mixing backends within
/// one store would make otherwise-identical content hash to different
/// digests depending on which `Hasher` touched it last.
#[derive(Debug, Clone, Copy)]
pub struct Hasher {
    backend: HashBackend,
}

impl Hasher {
    /// Construct a hasher for the given backend.
    #[must_use]
    pub const fn new(backend: HashBackend) -> Self {
        Self { backend }
    }

    /// The backend this hasher was constructed with.
    #[must_use]
    pub const fn backend(&self) -> HashBackend {
        self.backend
    }

    /// Compute the digest of a raw byte slice.
    #[must_use]
    pub fn hash_bytes(&self, data: &[u8]) -> Digest {
        let hex = match self.backend {
            HashBackend::Blake3 => blake3::hash(data).to_hex().to_string(),
            HashBackend::Sha256 => {
                use sha2::{Digest as _, Sha256};
                let mut hasher = Sha256::new();
                hasher.update(data);
                hex::encode(hasher.finalize())
            }
        };
        Digest(hex)
    }

    /// Compute the digest of a structured value via canonical encoding.
    ///
    /// `hash_object(v) = hash_bytes(canonical_encode(v))`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::canon::CanonError`] if `v` cannot be canonically
    /// encoded (non-finite number).
    pub fn hash_object(
        &self,
        value: &serde_json::Value,
    ) -> Result<Digest, crate::canon::CanonError> {
        let bytes = canonical_json_bytes(value)?;
        Ok(self.hash_bytes(&bytes))
    }

    /// Recompute the digest of `bytes` and compare it against `expected`.
    #[must_use]
    pub fn verify(&self, bytes: &[u8], expected: &Digest) -> bool {
        &self.hash_bytes(bytes) == expected
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn digest_parse_rejects_wrong_length() {
        assert!(Digest::parse("abc").is_none());
        assert!(Digest::parse(&"a".repeat(63)).is_none());
        assert!(Digest::parse(&"a".repeat(65)).is_none());
    }

    #[test]
    fn digest_parse_rejects_non_hex() {
        assert!(Digest::parse(&"g".repeat(64)).is_none());
        assert!(Digest::parse(&"A".repeat(64)).is_none());
    }

    #[test]
    fn digest_parse_accepts_valid() {
        let s = "a".repeat(64);
        let d = Digest::parse(&s).unwrap();
        assert_eq!(d.as_str(), s);
        assert_eq!(d.shard_prefix(), "aa");
    }

    #[test]
    fn blake3_digest_is_64_hex_chars() {
        let h = Hasher::new(HashBackend::Blake3);
        let d = h.hash_bytes(b"hello");
        assert_eq!(d.as_str().len(), 64);
        assert!(Digest::parse(d.as_str()).is_some());
    }

    #[test]
    fn sha256_digest_is_64_hex_chars() {
        let h = Hasher::new(HashBackend::Sha256);
        let d = h.hash_bytes(b"hello");
        assert_eq!(d.as_str().len(), 64);
        assert!(Digest::parse(d.as_str()).is_some());
    }

    #[test]
    fn backends_disagree_on_same_input() {
        let b3 = Hasher::new(HashBackend::Blake3).hash_bytes(b"same input");
        let sha = Hasher::new(HashBackend::Sha256).hash_bytes(b"same input");
        assert_ne!(b3, sha);
    }

    #[test]
    fn hash_object_deterministic() {
        let h = Hasher::new(HashBackend::Blake3);
        let v = json!({"b": 2, "a": 1});
        let first = h.hash_object(&v).unwrap();
        for _ in 0..10 {
            assert_eq!(h.hash_object(&v).unwrap(), first);
        }
    }

    #[test]
    fn hash_object_order_independent() {
        let h = Hasher::new(HashBackend::Blake3);
        let v1 = json!({"a": 1, "b": 2});
        let v2 = json!({"b": 2, "a": 1});
        assert_eq!(h.hash_object(&v1).unwrap(), h.hash_object(&v2).unwrap());
    }

    #[test]
    fn verify_detects_mismatch() {
        let h = Hasher::new(HashBackend::Blake3);
        let d = h.hash_bytes(b"original");
        assert!(h.verify(b"original", &d));
        assert!(!h.verify(b"tampered", &d));
    }

    #[test]
    fn hash_object_rejects_non_finite() {
        // Construct a Number that round-trips through serde_json's own
        // parser as a float, then confirm the happy path first — NaN and
        // infinities cannot be constructed via `serde_json::Value` at all,
        // so this just documents the (unreachable in practice) error path
        // exists for defense in depth.
        let h = Hasher::new(HashBackend::Blake3);
        let v = json!({"a": 1.5});
        assert!(h.hash_object(&v).is_ok());
    }
}
