//! Deep merge of JSON configuration documents.
//!
//! Objects merge key by key and recursively; every other value (scalars,
//! arrays, null) replaces what was there. Keys absent from the update are
//! left untouched. The merge is total: it never fails and unknown keys pass
//! through.

use serde_json::Value;

/// Legacy spellings accepted on input, mapped to their canonical key.
const LEGACY_KEYS: [(&str, &str); 3] = [
    ("paralel", "parallel"),
    ("index_pct", "indexPct"),
    ("localAdresses", "localAddresses"),
];

/// Merge `update` into `base` in place.
pub fn deep_merge(base: &mut Value, update: Value) {
    match (base, update) {
        (Value::Object(base_map), Value::Object(update_map)) => {
            for (key, value) in update_map {
                match base_map.get_mut(&key) {
                    Some(existing) if existing.is_object() && value.is_object() => {
                        deep_merge(existing, value);
                    }
                    _ => {
                        base_map.insert(key, value);
                    }
                }
            }
        }
        (base, update) => *base = update,
    }
}

/// Rewrite legacy top-level keys to their canonical names.
///
/// A canonical key present in the same document wins over its legacy alias.
pub fn normalize_legacy_keys(doc: &mut Value) {
    let Value::Object(map) = doc else {
        return;
    };

    for (legacy, canonical) in LEGACY_KEYS {
        if let Some(value) = map.remove(legacy) {
            if !map.contains_key(canonical) {
                map.insert(canonical.to_string(), value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_absent_keys_untouched() {
        let mut base = json!({ "parallel": 10, "otherUris": ["/foo", "/bar"] });
        deep_merge(&mut base, json!({ "parallel": 20 }));
        assert_eq!(base, json!({ "parallel": 20, "otherUris": ["/foo", "/bar"] }));
    }

    #[test]
    fn test_nested_objects_merge_keywise() {
        let mut base = json!({ "headers": { "x-a": "1", "x-b": "2" } });
        deep_merge(&mut base, json!({ "headers": { "x-b": "3", "x-c": "4" } }));
        assert_eq!(base, json!({ "headers": { "x-a": "1", "x-b": "3", "x-c": "4" } }));
    }

    #[test]
    fn test_arrays_replace() {
        let mut base = json!({ "otherUris": ["/foo", "/bar", "/baz"] });
        deep_merge(&mut base, json!({ "otherUris": ["/qux"] }));
        assert_eq!(base["otherUris"], json!(["/qux"]));
    }

    #[test]
    fn test_object_replaces_scalar() {
        let mut base = json!({ "clientAuth": "Basic abc" });
        deep_merge(&mut base, json!({ "clientAuth": { "username": "u", "password": "p" } }));
        assert_eq!(base["clientAuth"], json!({ "username": "u", "password": "p" }));
    }

    #[test]
    fn test_unknown_keys_pass_through() {
        let mut base = json!({ "parallel": 1 });
        deep_merge(&mut base, json!({ "somethingNew": [1, 2] }));
        assert_eq!(base["somethingNew"], json!([1, 2]));
        assert_eq!(base["parallel"], 1);
    }

    #[test]
    fn test_legacy_keys_normalized() {
        let mut doc = json!({ "paralel": 3, "index_pct": 50, "localAdresses": ["127.0.0.2"] });
        normalize_legacy_keys(&mut doc);
        assert_eq!(
            doc,
            json!({ "parallel": 3, "indexPct": 50, "localAddresses": ["127.0.0.2"] })
        );
    }

    #[test]
    fn test_canonical_key_wins() {
        let mut doc = json!({ "paralel": 3, "parallel": 7 });
        normalize_legacy_keys(&mut doc);
        assert_eq!(doc, json!({ "parallel": 7 }));
    }
}
