use claim_portal_core::canonical::{stable_json_bytes, stable_json_pretty};
use proptest::prelude::*;
use serde_json::json;

#[test]
fn stable_json_sorts_nested_keys() {
    let value = json!({"b": 1, "a": {"z": true, "c": [ {"y": 1, "x": 2} ]}});
    let bytes = stable_json_bytes(&value).expect("stable json");
    assert_eq!(
        String::from_utf8(bytes).expect("utf8"),
        r#"{"a":{"c":[{"x":2,"y":1}],"z":true},"b":1}"#
    );
}

#[test]
fn pretty_output_ends_with_newline() {
    let bytes = stable_json_pretty(&json!({"k": "v"})).expect("pretty");
    assert_eq!(bytes.last(), Some(&b'\n'));
}

proptest! {
    #[test]
    fn stable_json_is_independent_of_insertion_order(
        keys in proptest::collection::btree_set("[a-z]{1,8}", 1..8)
    ) {
        let forward: serde_json::Map<String, serde_json::Value> =
            keys.iter().map(|k| (k.clone(), json!(k.len()))).collect();
        let reverse: serde_json::Map<String, serde_json::Value> =
            keys.iter().rev().map(|k| (k.clone(), json!(k.len()))).collect();
        prop_assert_eq!(
            stable_json_bytes(&forward).expect("forward"),
            stable_json_bytes(&reverse).expect("reverse")
        );
    }
}
