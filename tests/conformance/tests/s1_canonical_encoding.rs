//! S1 — canonical encoding ordering (`spec.md` §8).

use coldstore_kernel::canon::canonical_json_bytes;
use serde_json::json;

#[test]
fn key_order_does_not_affect_encoded_bytes() {
    let a = canonical_json_bytes(&json!({"b": 2, "a": 1, "c": 3})).unwrap();
    let b = canonical_json_bytes(&json!({"a": 1, "c": 3, "b": 2})).unwrap();
    assert_eq!(a, b);
    assert_eq!(a, br#"{"a":1,"b":2,"c":3}"#.to_vec());
}
