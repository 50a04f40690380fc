use anvil::path::{self, all_paths, JsonPath};
use proptest::prelude::*;
use serde_json::{Map, Value};

fn key() -> impl Strategy<Value = String> {
    "[a-z]{1,4}"
}

fn json_value() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i32>().prop_map(Value::from),
        "[a-z ]{0,6}".prop_map(Value::String),
    ];
    leaf.prop_recursive(4, 32, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::vec((key(), inner), 0..4)
                .prop_map(|pairs| Value::Object(pairs.into_iter().collect::<Map<String, Value>>())),
        ]
    })
}

fn object_path() -> impl Strategy<Value = JsonPath> {
    prop::collection::vec(key(), 1..4).prop_map(|segments| JsonPath::parse(&segments.join(".")))
}

proptest! {
    #[test]
    fn parent_of_every_path_resolves(value in json_value()) {
        for p in all_paths(&value) {
            match path::parent(&p) {
                Some(parent) => prop_assert!(path::has_path(&value, &JsonPath::parse(parent))),
                None => prop_assert!(!p.contains('.')),
            }
        }
    }

    #[test]
    fn every_enumerated_path_resolves(value in json_value()) {
        for p in all_paths(&value) {
            prop_assert!(path::get(&value, &JsonPath::parse(&p)).is_some());
        }
    }

    #[test]
    fn set_then_get_round_trips(value in json_value(), at in object_path(), new in json_value()) {
        let updated = path::set(value, &at, new.clone());
        prop_assert_eq!(path::get(&updated, &at), Some(&new));
    }

    #[test]
    fn delete_after_set_leaves_siblings(
        siblings in prop::collection::vec((key(), json_value()), 0..5),
        leaf in key(),
        new in json_value(),
    ) {
        let holder: Map<String, Value> = siblings.into_iter().collect();
        let mut root = Map::new();
        root.insert("holder".to_string(), Value::Object(holder.clone()));
        root.insert("other".to_string(), Value::from(1));

        let at = JsonPath::parse("holder").child(leaf.clone());
        let removed = path::delete(path::set(Value::Object(root), &at, new), &at);

        prop_assert!(!path::has_path(&removed, &at));
        for (k, v) in holder.iter().filter(|(k, _)| **k != leaf) {
            let sibling = JsonPath::parse("holder").child(k.clone());
            prop_assert_eq!(path::get(&removed, &sibling), Some(v));
        }
        prop_assert_eq!(removed.get("other"), Some(&Value::from(1)));
    }
}
