use pipeline_core::hashing::{hash_str, hash_value, to_canonical_json};
use serde_json::json;

#[test]
fn run_parameters_hash_ignores_key_order() {
    let a = json!({"RunId": "ab12cd34", "RunDate": "2024-05-17", "Environment": "test", "Project": "regression"});
    let b = json!({"Project": "regression", "Environment": "test", "RunDate": "2024-05-17", "RunId": "ab12cd34"});
    let h = hash_value(&a);
    assert_eq!(h.len(), 64);
    assert_eq!(h, hash_value(&b));
    assert_eq!(h, hash_str(&to_canonical_json(&b)));
    assert_ne!(h, hash_value(&json!({"RunId": "ab12cd35"})));
}
