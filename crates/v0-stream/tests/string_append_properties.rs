use proptest::prelude::*;
use serde_json::{json, Value};
use v0_stream::delta;
use v0_stream::Doc;
use v0_stream_value::PathStep;

fn snapshot() -> Doc {
    Doc::from(json!([
        [0, ["Hel", ["p", {"id": "x"}, "world"], 5]],
        [1, {"meta": "m"}],
        "tail"
    ]))
}

fn arb_step() -> impl Strategy<Value = Value> {
    prop_oneof![
        4 => (0u64..4).prop_map(|i| json!(i)),
        1 => Just(json!("id")),
        1 => Just(json!("meta")),
        1 => Just(json!(u64::MAX)),
        1 => Just(json!(-1)),
    ]
}

proptest! {
    #[test]
    fn string_append_never_mutates_input(
        path in prop::collection::vec(arb_step(), 0..5),
        suffix in "[a-z]{0,3}",
    ) {
        let original = snapshot();
        let before = original.to_value();
        let mut target = path.clone();
        target.push(json!(suffix));
        let result = delta::apply(&original, &json!([target, 9, 9]));
        prop_assert_eq!(original.to_value(), before);

        let Some(steps) = PathStep::parse_path(&path) else {
            prop_assert!(result.ptr_eq(&original));
            return Ok(());
        };
        let Some(leaf) = original.get_path(&steps).and_then(Doc::as_str).filter(|_| !steps.is_empty()) else {
            return Ok(());
        };

        let appended = result.get_path(&steps).and_then(Doc::as_str);
        let expected = format!("{leaf}{suffix}");
        prop_assert_eq!(appended, Some(expected.as_str()));
        let top = steps[0].as_index();
        for (index, node) in original.as_array().unwrap_or_default().iter().enumerate() {
            if Some(index) != top {
                prop_assert!(result.get_index(index).is_some_and(|n| n.ptr_eq(node)));
            }
        }
    }
}
