//! Result projection: dot-path access and post-retrieval stripping.
//!
//! Blacklisted fields are removed from every returned document, and the
//! spec's excluded-values paths strip specific nested values that
//! denormalized join-style fields carry but must not leak. Intermediate
//! arrays are descended element by element, so `genres.name` reaches the
//! `name` of every element of `genres`.

use serde_json::Value;

use crate::spec::EntityFieldSpec;

/// Collect every value addressed by a dot-notation path.
#[must_use]
pub fn collect<'a>(doc: &'a Value, path: &str) -> Vec<&'a Value> {
    let mut current = vec![doc];
    for segment in path.split('.') {
        let mut next = Vec::new();
        for value in current {
            match value {
                Value::Object(map) => {
                    if let Some(child) = map.get(segment) {
                        next.push(child);
                    }
                }
                Value::Array(items) => {
                    for item in items {
                        if let Some(child) = item.get(segment) {
                            next.push(child);
                        }
                    }
                }
                _ => {}
            }
        }
        current = next;
    }
    current
}

/// Remove the value addressed by a dot-notation path, descending arrays.
pub fn strip(doc: &mut Value, path: &str) {
    let Some((head, rest)) = path.split_once('.') else {
        strip_key(doc, path);
        return;
    };
    match doc {
        Value::Object(map) => {
            if let Some(child) = map.get_mut(head) {
                strip(child, rest);
            }
        }
        Value::Array(items) => {
            // The leading segment applies inside each element.
            for item in items {
                strip(item, path);
            }
        }
        _ => {}
    }
}

fn strip_key(doc: &mut Value, key: &str) {
    match doc {
        Value::Object(map) => {
            map.remove(key);
        }
        Value::Array(items) => {
            for item in items {
                strip_key(item, key);
            }
        }
        _ => {}
    }
}

/// Apply the spec's projection rules to a retrieved result set.
pub fn apply(spec: &EntityFieldSpec, docs: &mut [Value]) {
    for doc in docs {
        for path in spec.blacklist_fields() {
            strip(doc, path);
        }
        for path in spec.excluded_values_fields() {
            strip(doc, path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn collect_descends_arrays() {
        let doc = json!({
            "genres": [{"name": "drama"}, {"name": "crime"}],
            "rating": {"kp": 8.9}
        });
        let names: Vec<_> = collect(&doc, "genres.name");
        assert_eq!(names, [&json!("drama"), &json!("crime")]);
        assert_eq!(collect(&doc, "rating.kp"), [&json!(8.9)]);
        assert!(collect(&doc, "rating.imdb").is_empty());
    }

    #[test]
    fn strip_removes_nested_values_inside_arrays() {
        let mut doc = json!({
            "genres": [{"name": "drama", "slug": "drama"}],
            "countries": [{"name": "USA"}]
        });
        strip(&mut doc, "genres.name");
        strip(&mut doc, "countries.name");
        assert_eq!(
            doc,
            json!({"genres": [{"slug": "drama"}], "countries": [{}]})
        );
    }

    #[test]
    fn apply_strips_blacklist_uniformly() {
        let spec = EntityFieldSpec::builder("person")
            .id_keys(&["id"])
            .blacklist_fields(&["_id", "movies._id"])
            .build()
            .unwrap();
        let mut docs = vec![
            json!({"_id": "aaa", "id": 1, "movies": [{"_id": "bbb", "id": 2}]}),
            json!({"_id": "ccc", "id": 3}),
        ];
        apply(&spec, &mut docs);
        assert_eq!(
            docs[0],
            json!({"id": 1, "movies": [{"id": 2}]})
        );
        assert_eq!(docs[1], json!({"id": 3}));
    }

    #[test]
    fn strip_of_missing_path_is_a_no_op() {
        let mut doc = json!({"id": 1});
        strip(&mut doc, "genres.name");
        assert_eq!(doc, json!({"id": 1}));
    }
}
