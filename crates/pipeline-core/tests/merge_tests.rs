//! Merge de params de tarea con el payload inyectado.

use pipeline_core::injection::merge_json;
use serde_json::json;

#[test]
fn injected_input_replaces_whole_keys() {
    let base = json!({"min_improvement": 0.5, "Input": {"RunParameters": {"RunId": "stale"}, "extra": 1}});
    let injected = json!({"Input": {"RunParameters": {"RunId": "ab12cd34"}}});

    let merged = merge_json(&base, &injected);

    assert_eq!(merged["min_improvement"], json!(0.5));
    assert_eq!(merged["Input"], json!({"RunParameters": {"RunId": "ab12cd34"}}));
}

#[test]
fn non_object_base_is_overridden() {
    assert_eq!(merge_json(&json!(null), &json!({"a": 1})), json!({"a": 1}));
    assert_eq!(merge_json(&json!({"a": 1}), &json!("x")), json!("x"));
}
