//! Delta application.

use serde_json::{Map, Value};
use v0_stream_value::Doc;

use crate::text;
use crate::types::{DeltaKind, PatchError};

// ── Public API ────────────────────────────────────────────────────────────

/// Apply `delta` to `doc`, returning the patched document.
///
/// `doc` is left untouched. Containers the delta does not reach are shared
/// between `doc` and the result.
pub fn patch(doc: &Doc, delta: &Value) -> Result<Doc, PatchError> {
    let mut working = doc.clone();
    patch_in_place(&mut working, delta)?;
    Ok(working)
}

/// Apply `delta` to `doc` in place.
///
/// On error `doc` may be partially patched; callers that need atomicity
/// should patch a clone, as [`patch`] does.
pub fn patch_in_place(doc: &mut Doc, delta: &Value) -> Result<(), PatchError> {
    if DeltaKind::classify(delta)? == DeltaKind::Deleted {
        return Err(PatchError::RootDeleted);
    }
    let mut slot = Some(doc.take());
    let result = patch_slot(&mut slot, delta);
    if let Some(value) = slot {
        *doc = value;
    }
    result
}

// ── Core recursive patcher ────────────────────────────────────────────────

/// Patch a value that may be absent (`None`): missing object members and
/// deleted values are both represented as `None`.
fn patch_slot(slot: &mut Option<Doc>, delta: &Value) -> Result<(), PatchError> {
    match DeltaKind::classify(delta)? {
        DeltaKind::Unchanged => Ok(()),
        DeltaKind::Added(value) | DeltaKind::Modified { new: value, .. } => {
            *slot = Some(Doc::from(value));
            Ok(())
        }
        DeltaKind::Deleted => {
            *slot = None;
            Ok(())
        }
        DeltaKind::TextDiff(unidiff) => {
            let target = slot
                .as_ref()
                .and_then(Doc::as_str)
                .ok_or(PatchError::TypeMismatch { delta: "text", target: target_kind(slot) })?;
            let patched = text::apply_patch(target, unidiff)?;
            *slot = Some(Doc::from(patched));
            Ok(())
        }
        DeltaKind::Moved { .. } => Err(PatchError::MoveOutsideArray),
        DeltaKind::Object(members) => patch_object(slot, members),
        DeltaKind::Array(members) => patch_array(slot, members),
    }
}

fn target_kind(slot: &Option<Doc>) -> &'static str {
    slot.as_ref().map(Doc::kind_name).unwrap_or("undefined")
}

fn patch_object(slot: &mut Option<Doc>, members: &Map<String, Value>) -> Result<(), PatchError> {
    let kind = target_kind(slot);
    let Some(map) = slot.as_mut().and_then(Doc::make_object_mut) else {
        return Err(PatchError::TypeMismatch { delta: "object", target: kind });
    };
    for (key, delta) in members {
        // Take the child out so its own containers stay uniquely owned and
        // copy-on-write does not clone them again.
        let mut child = map.get_mut(key).map(Doc::take);
        patch_slot(&mut child, delta)?;
        match child {
            Some(value) => {
                map.insert(key.clone(), value);
            }
            None => {
                map.shift_remove(key);
            }
        }
    }
    Ok(())
}

fn parse_index(key: &str, digits: &str) -> Result<usize, PatchError> {
    digits.parse().map_err(|_| PatchError::InvalidArrayKey(key.to_string()))
}

fn patch_array(slot: &mut Option<Doc>, members: &Map<String, Value>) -> Result<(), PatchError> {
    let kind = target_kind(slot);
    let Some(items) = slot.as_mut().and_then(Doc::make_array_mut) else {
        return Err(PatchError::TypeMismatch { delta: "array", target: kind });
    };

    let mut removals: Vec<(usize, Option<usize>)> = Vec::new();
    let mut insertions: Vec<(usize, Doc)> = Vec::new();
    let mut modifications: Vec<(usize, &Value)> = Vec::new();

    for (key, delta) in members {
        if key == "_t" {
            continue;
        }
        if let Some(digits) = key.strip_prefix('_') {
            // `_N` keys address the original array, before any insertion.
            let index = parse_index(key, digits)?;
            match DeltaKind::classify(delta)? {
                DeltaKind::Deleted => removals.push((index, None)),
                DeltaKind::Moved { dest } => removals.push((index, Some(dest))),
                _ => {
                    return Err(PatchError::InvalidDelta(format!(
                        "only removal or move can be applied at original array index `{key}`"
                    )))
                }
            }
        } else {
            let index = parse_index(key, key)?;
            match DeltaKind::classify(delta)? {
                DeltaKind::Added(value) => insertions.push((index, Doc::from(value))),
                _ => modifications.push((index, delta)),
            }
        }
    }

    // Highest index first so earlier removals do not shift later ones.
    removals.sort_by_key(|(index, _)| *index);
    for (index, dest) in removals.into_iter().rev() {
        if index >= items.len() {
            return Err(PatchError::IndexOutOfRange { index, len: items.len() });
        }
        let removed = items.remove(index);
        if let Some(dest) = dest {
            insertions.push((dest, removed));
        }
    }

    insertions.sort_by_key(|(index, _)| *index);
    for (index, value) in insertions {
        if index > items.len() {
            return Err(PatchError::IndexOutOfRange { index, len: items.len() });
        }
        items.insert(index, value);
    }

    for (index, delta) in modifications {
        let len = items.len();
        let item = items.get_mut(index).ok_or(PatchError::IndexOutOfRange { index, len })?;
        let mut child = Some(item.take());
        patch_slot(&mut child, delta)?;
        *item = child.ok_or_else(|| {
            PatchError::InvalidDelta(format!("array item {index} must be removed with key `_{index}`"))
        })?;
    }
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> Doc {
        Doc::from(value)
    }

    #[test]
    fn add_object_member() {
        let result = patch(&doc(json!({"a": 1})), &json!({"b": [2]})).unwrap();
        assert_eq!(result, doc(json!({"a": 1, "b": 2})));
    }

    #[test]
    fn modify_keeps_member_order() {
        let result = patch(&doc(json!({"a": 1, "b": 2})), &json!({"a": [1, 10]})).unwrap();
        let keys: Vec<_> = result.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert_eq!(result.get_key("a"), Some(&Doc::from(10)));
    }

    #[test]
    fn delete_object_member() {
        let result = patch(&doc(json!({"a": 1, "b": 2})), &json!({"a": [1, 0, 0]})).unwrap();
        assert_eq!(result, doc(json!({"b": 2})));
    }

    #[test]
    fn nested_object_delta() {
        let result = patch(&doc(json!({"a": {"b": {"c": 1}}})), &json!({"a": {"b": {"c": [1, 2], "d": [3]}}})).unwrap();
        assert_eq!(result, doc(json!({"a": {"b": {"c": 2, "d": 3}}})));
    }

    #[test]
    fn array_insert_and_append() {
        let result = patch(&doc(json!([1, 3])), &json!({"_t": "a", "1": [2], "3": [4]})).unwrap();
        assert_eq!(result, doc(json!([1, 2, 3, 4])));
    }

    #[test]
    fn array_remove_uses_original_indices() {
        let result = patch(&doc(json!(["a", "b", "c", "d"])), &json!({"_t": "a", "_0": ["a", 0, 0], "_2": ["c", 0, 0]})).unwrap();
        assert_eq!(result, doc(json!(["b", "d"])));
    }

    #[test]
    fn array_remove_then_insert() {
        let delta = json!({"_t": "a", "_1": ["b", 0, 0], "1": ["x"]});
        let result = patch(&doc(json!(["a", "b", "c"])), &delta).unwrap();
        assert_eq!(result, doc(json!(["a", "x", "c"])));
    }

    #[test]
    fn array_move() {
        let result = patch(&doc(json!(["a", "b", "c"])), &json!({"_t": "a", "_0": ["", 2, 3]})).unwrap();
        assert_eq!(result, doc(json!(["b", "c", "a"])));
    }

    #[test]
    fn array_modify_nested_item() {
        let delta = json!({"_t": "a", "1": {"_t": "a", "0": ["x", "y"]}});
        let result = patch(&doc(json!([0, ["x"]])), &delta).unwrap();
        assert_eq!(result, doc(json!([0, ["y"]])));
    }

    #[test]
    fn root_replace() {
        assert_eq!(patch(&doc(json!([])), &json!([[], [[0, []]]])).unwrap(), doc(json!([[0, []]])));
        assert_eq!(patch(&doc(json!([])), &json!([[1]])).unwrap(), doc(json!([1])));
    }

    #[test]
    fn root_delete_is_rejected() {
        assert_eq!(patch(&doc(json!([1])), &json!([[1], 0, 0])), Err(PatchError::RootDeleted));
    }

    #[test]
    fn null_delta_is_noop() {
        let original = doc(json!([1, 2]));
        let result = patch(&original, &json!(null)).unwrap();
        assert!(result.ptr_eq(&original));
    }

    #[test]
    fn type_mismatch_errors() {
        assert_eq!(
            patch(&doc(json!([1])), &json!({"a": [1]})),
            Err(PatchError::TypeMismatch { delta: "object", target: "array" })
        );
        assert_eq!(
            patch(&doc(json!({"a": 1})), &json!({"_t": "a", "0": [1]})),
            Err(PatchError::TypeMismatch { delta: "array", target: "object" })
        );
        assert_eq!(
            patch(&doc(json!({})), &json!({"a": {"b": [1]}})),
            Err(PatchError::TypeMismatch { delta: "object", target: "undefined" })
        );
    }

    #[test]
    fn out_of_range_errors() {
        assert_eq!(
            patch(&doc(json!([1])), &json!({"_t": "a", "_5": [1, 0, 0]})),
            Err(PatchError::IndexOutOfRange { index: 5, len: 1 })
        );
        assert_eq!(
            patch(&doc(json!([1])), &json!({"_t": "a", "4": [1]})),
            Err(PatchError::IndexOutOfRange { index: 4, len: 1 })
        );
        assert_eq!(
            patch(&doc(json!([1])), &json!({"_t": "a", "2": [1, 2]})),
            Err(PatchError::IndexOutOfRange { index: 2, len: 1 })
        );
    }

    #[test]
    fn bad_array_keys_error() {
        assert_eq!(
            patch(&doc(json!([1])), &json!({"_t": "a", "x": [1]})),
            Err(PatchError::InvalidArrayKey("x".to_string()))
        );
        assert!(matches!(
            patch(&doc(json!([1])), &json!({"_t": "a", "_0": [1, 2]})),
            Err(PatchError::InvalidDelta(_))
        ));
        assert!(matches!(
            patch(&doc(json!([1])), &json!({"_t": "a", "0": [1, 0, 0]})),
            Err(PatchError::InvalidDelta(_))
        ));
    }

    #[test]
    fn move_outside_array_errors() {
        assert_eq!(patch(&doc(json!({"a": 1})), &json!({"a": ["", 1, 3]})), Err(PatchError::MoveOutsideArray));
    }

    #[test]
    fn untouched_subtrees_are_shared() {
        let original = doc(json!([[0, ["a"]], [0, ["b"]]]));
        let delta = json!({"_t": "a", "1": {"_t": "a", "1": {"_t": "a", "1": ["c"]}}});
        let result = patch(&original, &delta).unwrap();
        assert!(result.get_index(0).unwrap().ptr_eq(original.get_index(0).unwrap()));
        assert_eq!(result.get_index(1), Some(&doc(json!([0, ["b", "c"]]))));
        assert_eq!(original, doc(json!([[0, ["a"]], [0, ["b"]]])));
    }

    #[test]
    fn failed_patch_leaves_input_unchanged() {
        let original = doc(json!({"a": [1, 2], "b": "x"}));
        let delta = json!({"a": {"_t": "a", "2": [3]}, "b": {"c": [1]}});
        assert!(patch(&original, &delta).is_err());
        assert_eq!(original, doc(json!({"a": [1, 2], "b": "x"})));
    }

    #[test]
    fn in_place_root_delete_keeps_document() {
        let mut value = doc(json!([1]));
        assert_eq!(patch_in_place(&mut value, &json!([[1], 0, 0])), Err(PatchError::RootDeleted));
        assert_eq!(value, doc(json!([1])));
    }
}
