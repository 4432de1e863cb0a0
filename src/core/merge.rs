//! Document merge engine
//!
//! Deep-merges a freshly built resource fragment onto the previously fetched
//! remote document of the same kind. The merge never drops sibling fields the
//! new fragment doesn't mention; it only adds or overwrites what the fragment
//! carries.
//!
//! Rules, applied per key of the incoming fragment:
//!
//! - key absent in the existing document: added
//! - both values are arrays: existing order kept, incoming elements appended
//!   unless already present by value equality
//! - both values are objects: recurse
//! - anything else (scalars, or mismatched structures): incoming overwrites
//!
//! The merge is a pure, total function: any pair of JSON values is accepted
//! and it cannot fail. Re-merging the same fragment is idempotent because
//! the array merge de-duplicates and object/scalar overwrites are stable.

use serde_json::Value;

/// Merge an incoming fragment onto prior remote state.
///
/// With no prior state the fragment passes through unchanged.
pub fn merge(existing: Option<Value>, incoming: Value) -> Value {
    match existing {
        None => incoming,
        Some(mut base) => {
            merge_value(&mut base, incoming);
            base
        }
    }
}

/// Recursive merge worker; `incoming` wins wherever structures disagree.
pub fn merge_value(existing: &mut Value, incoming: Value) {
    match (existing, incoming) {
        (Value::Array(have), Value::Array(new)) => {
            for item in new {
                if !have.contains(&item) {
                    have.push(item);
                }
            }
        }
        (Value::Object(have), Value::Object(new)) => {
            for (key, value) in new {
                match have.get_mut(&key) {
                    Some(slot) => merge_value(slot, value),
                    None => {
                        have.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => *slot = value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_merge_absent_returns_incoming() {
        let incoming = json!({"resourceType": "Patient", "identifier": []});
        assert_eq!(merge(None, incoming.clone()), incoming);
    }

    #[test]
    fn test_merge_preserves_unmentioned_keys() {
        let existing = json!({
            "resourceType": "Patient",
            "birthDate": "1988-02-11",
            "name": [{"use": "official", "text": "Old Name"}]
        });
        let incoming = json!({
            "resourceType": "Patient",
            "name": [{"use": "official", "text": "New Name"}]
        });

        let merged = merge(Some(existing), incoming);
        assert_eq!(merged["birthDate"], "1988-02-11");
        assert_eq!(merged["name"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_merge_lists_deduplicates_by_value() {
        let merged = merge(Some(json!({"a": [1, 2]})), json!({"a": [2, 3]}));
        assert_eq!(merged["a"], json!([1, 2, 3]));
    }

    #[test]
    fn test_merge_nested_objects_recurse() {
        let existing = json!({"period": {"start": "2024-01-01", "end": "2024-01-02"}});
        let incoming = json!({"period": {"start": "2024-06-01"}});

        let merged = merge(Some(existing), incoming);
        assert_eq!(merged["period"]["start"], "2024-06-01");
        assert_eq!(merged["period"]["end"], "2024-01-02");
    }

    #[test]
    fn test_merge_scalar_overwrites() {
        let merged = merge(Some(json!({"status": "draft"})), json!({"status": "final"}));
        assert_eq!(merged["status"], "final");
    }

    #[test]
    fn test_merge_type_mismatch_overwrites() {
        // Existing scalar vs incoming object: incoming wins wholesale
        let merged = merge(
            Some(json!({"note": "plain"})),
            json!({"note": {"text": "structured"}}),
        );
        assert_eq!(merged["note"], json!({"text": "structured"}));

        // Existing array vs incoming scalar
        let merged = merge(Some(json!({"x": [1]})), json!({"x": 2}));
        assert_eq!(merged["x"], 2);
    }

    #[test]
    fn test_merge_adds_new_keys() {
        let merged = merge(
            Some(json!({"resourceType": "Location"})),
            json!({"name": "Poli Umum"}),
        );
        assert_eq!(merged["resourceType"], "Location");
        assert_eq!(merged["name"], "Poli Umum");
    }

    #[test]
    fn test_remerge_is_idempotent() {
        let existing = json!({
            "identifier": [{"system": "a", "value": "1"}],
            "nested": {"list": ["x"]}
        });
        let incoming = json!({
            "identifier": [{"system": "b", "value": "2"}],
            "nested": {"list": ["y"], "flag": true},
            "status": "active"
        });

        let once = merge(Some(existing), incoming.clone());
        let twice = merge(Some(once.clone()), incoming);
        assert_eq!(once, twice);
    }
}
