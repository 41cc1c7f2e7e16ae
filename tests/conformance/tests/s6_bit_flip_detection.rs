//! S6 — bit-flip detection (`spec.md` §8).

use coldstore_conformance_tests::temp_engine;
use serde_json::json;
use std::fs;

#[test]
fn flipping_a_bit_in_the_stored_file_fails_verification() {
    let (dir, engine) = temp_engine();

    let digest = engine.put_bundle(json!({"sequence": 1, "operations": []}), None).unwrap();
    let shard = &digest.as_str()[..2];
    let path = dir.path().join("objects").join(shard).join(digest.as_str());

    let mut bytes = fs::read(&path).unwrap();
    let mid = bytes.len() / 2;
    bytes[mid] ^= 0b0000_0001;
    fs::write(&path, &bytes).unwrap();

    assert!(engine.verify_object(&digest).is_err());
}
