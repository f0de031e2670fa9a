//! Applying stream deltas to a content snapshot.
//!
//! Two delta shapes travel on the wire:
//!
//! | Shape                              | Meaning                                   |
//! |------------------------------------|-------------------------------------------|
//! | `[[p0, p1, ..., pn, suffix], 9, 9]` | append `suffix` to the string at the path |
//! | anything else                      | structural diff (see `v0_stream_diffpatch`) |
//!
//! Application never fails. A delta that does not fit the snapshot leaves it
//! unchanged, and the unchanged result is identity-equal to the input.

use serde_json::Value;
use tracing::{error, trace};
use v0_stream_value::{Doc, PathStep};

/// Marker carried in the second and third slots of a string-append delta.
pub const STRING_APPEND_MARKER: f64 = 9.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Delta<'a> {
    /// Path steps followed by the suffix to append.
    StringAppend(&'a [Value]),
    Structural(&'a Value),
}

impl<'a> Delta<'a> {
    pub fn classify(delta: &'a Value) -> Delta<'a> {
        if let Some([Value::Array(target), second, third]) = delta.as_array().map(Vec::as_slice) {
            if !target.is_empty() && is_marker(second) && is_marker(third) {
                return Delta::StringAppend(target);
            }
        }
        Delta::Structural(delta)
    }
}

fn is_marker(value: &Value) -> bool {
    value.as_f64() == Some(STRING_APPEND_MARKER)
}

/// Applies one delta, returning the new snapshot.
pub fn apply(snapshot: &Doc, delta: &Value) -> Doc {
    match Delta::classify(delta) {
        Delta::StringAppend(target) => apply_string_append(snapshot, target),
        Delta::Structural(delta) => apply_structural(snapshot, delta),
    }
}

// ── String append ─────────────────────────────────────────────────────────

/// `target` is `[p0, ..., pn, suffix]`.
///
/// Containers along the path are copied; siblings stay shared. An absent
/// intermediate slot is filled with an empty array and the walk continues;
/// an array only grows at its end, so a step past the end is a no-op. An
/// absent or non-string final slot is left alone.
pub fn apply_string_append(snapshot: &Doc, target: &[Value]) -> Doc {
    let Some((suffix, path)) = target.split_last() else {
        return snapshot.clone();
    };
    let Some(suffix) = suffix.as_str() else {
        trace!(suffix = %suffix, "string append with non-string suffix");
        return snapshot.clone();
    };
    let Some(steps) = PathStep::parse_path(path) else {
        trace!(?path, "string append with unusable path");
        return snapshot.clone();
    };
    if steps.is_empty() {
        return snapshot.clone();
    }
    append_along(snapshot, &steps, suffix).unwrap_or_else(|| snapshot.clone())
}

/// `None` when nothing under `node` changed.
fn append_along(node: &Doc, steps: &[PathStep], suffix: &str) -> Option<Doc> {
    let (step, rest) = steps.split_first()?;
    match node {
        Doc::Array(items) => match step.as_index() {
            Some(index) if index <= items.len() => {}
            _ => {
                trace!(?step, len = items.len(), "string append step outside array");
                return None;
            }
        },
        Doc::Object(_) => {}
        _ => return None,
    }
    let child = node.get_step(step).filter(|child| !child.is_null());
    let replacement = if rest.is_empty() {
        let current = child?.as_str()?;
        Doc::from(format!("{current}{suffix}"))
    } else {
        match child {
            Some(child) => append_along(child, rest, suffix)?,
            None => {
                let filler = Doc::empty_array();
                append_along(&filler, rest, suffix).unwrap_or(filler)
            }
        }
    };
    let mut updated = node.clone();
    set_step(&mut updated, step, replacement);
    Some(updated)
}

fn set_step(node: &mut Doc, step: &PathStep, value: Doc) {
    if node.is_array() {
        if let (Some(items), Some(index)) = (node.make_array_mut(), step.as_index()) {
            if index == items.len() {
                items.push(value);
            } else if let Some(slot) = items.get_mut(index) {
                *slot = value;
            }
        }
    } else if let Some(map) = node.make_object_mut() {
        map.insert(step.to_key(), value);
    }
}

// ── Structural diff ───────────────────────────────────────────────────────

/// Applies a structural diff; a diff that does not fit is logged and the
/// snapshot is returned unchanged.
pub fn apply_structural(snapshot: &Doc, delta: &Value) -> Doc {
    match v0_stream_diffpatch::patch(snapshot, delta) {
        Ok(patched) => patched,
        Err(err) => {
            error!(error = %err, "failed to apply structural delta");
            snapshot.clone()
        }
    }
}
