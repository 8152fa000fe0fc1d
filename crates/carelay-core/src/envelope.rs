// SPDX-FileCopyrightText: 2026 Carelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Listing-response normalization.
//!
//! The backend is inconsistent about listing shapes: some endpoints return a
//! bare JSON array, others wrap it as `{"results": [...]}`. Everything else
//! (null, scalars, objects without `results`) normalizes to an empty list
//! rather than an error, so a malformed reply can never poison a collection.

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::warn;

/// Decodes a listing response into a vector of `T`.
///
/// Accepts a bare array or a `{"results": [...]}` envelope. Entries that fail
/// to decode individually are skipped with a warning; the survivors are kept.
/// `what` names the collection for log context.
pub fn decode_listing<T: DeserializeOwned>(value: Value, what: &str) -> Vec<T> {
    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("results") {
            Some(Value::Array(items)) => items,
            _ => {
                warn!(collection = what, "listing object without results array, treating as empty");
                return Vec::new();
            }
        },
        Value::Null => return Vec::new(),
        other => {
            warn!(
                collection = what,
                shape = other_shape(&other),
                "unexpected listing shape, treating as empty"
            );
            return Vec::new();
        }
    };

    items
        .into_iter()
        .filter_map(|item| match serde_json::from_value::<T>(item) {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!(collection = what, error = %e, "skipping malformed listing entry");
                None
            }
        })
        .collect()
}

fn other_shape(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Template;
    use proptest::prelude::*;
    use serde_json::json;

    fn template_json(id: &str) -> Value {
        json!({"id": id, "name": "n", "content": "c"})
    }

    #[test]
    fn decodes_bare_array() {
        let value = json!([template_json("t1"), template_json("t2")]);
        let templates: Vec<Template> = decode_listing(value, "templates");
        assert_eq!(templates.len(), 2);
        assert_eq!(templates[0].id.0, "t1");
    }

    #[test]
    fn decodes_results_envelope() {
        let value = json!({"results": [template_json("t1")]});
        let templates: Vec<Template> = decode_listing(value, "templates");
        assert_eq!(templates.len(), 1);
    }

    #[test]
    fn object_without_results_is_empty() {
        let value = json!({"items": [template_json("t1")], "count": 1});
        let templates: Vec<Template> = decode_listing(value, "templates");
        assert!(templates.is_empty());
    }

    #[test]
    fn null_and_scalars_are_empty() {
        assert!(decode_listing::<Template>(Value::Null, "templates").is_empty());
        assert!(decode_listing::<Template>(json!(42), "templates").is_empty());
        assert!(decode_listing::<Template>(json!("nope"), "templates").is_empty());
    }

    #[test]
    fn malformed_entries_are_skipped_not_fatal() {
        let value = json!([
            template_json("t1"),
            {"name": "missing id"},
            template_json("t3"),
        ]);
        let templates: Vec<Template> = decode_listing(value, "templates");
        assert_eq!(templates.len(), 2);
        assert_eq!(templates[1].id.0, "t3");
    }

    fn arb_json() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i64>().prop_map(|n| json!(n)),
            "[a-z]{0,8}".prop_map(Value::String),
        ];
        leaf.prop_recursive(3, 24, 4, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
                prop::collection::btree_map("[a-z]{1,6}", inner, 0..4)
                    .prop_map(|m| Value::Object(m.into_iter().collect())),
            ]
        })
    }

    proptest! {
        // Feeding the decoder's own output back in yields the same output.
        #[test]
        fn normalization_is_idempotent(value in arb_json()) {
            let once: Vec<Value> = decode_listing(value, "prop");
            let again: Vec<Value> = decode_listing(Value::Array(once.clone()), "prop");
            prop_assert_eq!(once, again);
        }

        // The two accepted shapes decode identically.
        #[test]
        fn bare_and_enveloped_agree(items in prop::collection::vec(arb_json(), 0..6)) {
            let bare: Vec<Value> = decode_listing(Value::Array(items.clone()), "prop");
            let wrapped: Vec<Value> =
                decode_listing(json!({"results": items}), "prop");
            prop_assert_eq!(bare, wrapped);
        }
    }
}
