//! Delta shapes and the patch error type.

use serde_json::{Map, Value};
use thiserror::Error;

/// Third element of a deletion delta `[old, 0, 0]`.
pub const DELETED: u64 = 0;
/// Third element of a text diff delta `[unidiff, 0, 2]`.
pub const TEXT_DIFF: u64 = 2;
/// Third element of an array move delta `["", dest, 3]`.
pub const ARRAY_MOVE: u64 = 3;
/// Value of the `_t` member that marks an array delta.
pub const ARRAY_MARKER: &str = "a";

// ── Error ─────────────────────────────────────────────────────────────────

#[derive(Debug, Error, PartialEq)]
pub enum PatchError {
    #[error("invalid delta: {0}")]
    InvalidDelta(String),
    #[error("cannot apply {delta} delta to {target}")]
    TypeMismatch { delta: &'static str, target: &'static str },
    #[error("invalid array delta key `{0}`")]
    InvalidArrayKey(String),
    #[error("array index {index} out of range for length {len}")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("array move outside of an array delta")]
    MoveOutsideArray,
    #[error("malformed text patch: {0}")]
    TextPatchParse(String),
    #[error("text patch hunk {hunk} does not match the target string")]
    TextPatchFailed { hunk: usize },
    #[error("delta deletes the document root")]
    RootDeleted,
}

// ── Delta classification ──────────────────────────────────────────────────

/// A delta node, classified by shape.
#[derive(Debug, Clone, PartialEq)]
pub enum DeltaKind<'a> {
    /// `null`: nothing to do.
    Unchanged,
    Added(&'a Value),
    Modified { old: &'a Value, new: &'a Value },
    Deleted,
    TextDiff(&'a str),
    Moved { dest: usize },
    Object(&'a Map<String, Value>),
    Array(&'a Map<String, Value>),
}

impl<'a> DeltaKind<'a> {
    pub fn classify(delta: &'a Value) -> Result<Self, PatchError> {
        match delta {
            Value::Null => Ok(DeltaKind::Unchanged),
            Value::Array(items) => classify_array(items),
            Value::Object(map) => match map.get("_t") {
                None => Ok(DeltaKind::Object(map)),
                Some(Value::String(t)) if t == ARRAY_MARKER => Ok(DeltaKind::Array(map)),
                Some(other) => Err(PatchError::InvalidDelta(format!("unknown `_t` marker {other}"))),
            },
            other => Err(PatchError::InvalidDelta(format!("unexpected delta {other}"))),
        }
    }
}

fn classify_array(items: &[Value]) -> Result<DeltaKind<'_>, PatchError> {
    match items {
        [new] => Ok(DeltaKind::Added(new)),
        [old, new] => Ok(DeltaKind::Modified { old, new }),
        [first, second, magic] => match magic.as_u64() {
            Some(DELETED) if second.as_u64() == Some(0) => Ok(DeltaKind::Deleted),
            Some(TEXT_DIFF) if second.as_u64() == Some(0) => first
                .as_str()
                .map(DeltaKind::TextDiff)
                .ok_or_else(|| PatchError::InvalidDelta("text diff must be a string".to_string())),
            Some(ARRAY_MOVE) => second
                .as_u64()
                .and_then(|d| usize::try_from(d).ok())
                .map(|dest| DeltaKind::Moved { dest })
                .ok_or_else(|| PatchError::InvalidDelta(format!("invalid move destination {second}"))),
            _ => Err(PatchError::InvalidDelta(format!("unknown delta type {magic}"))),
        },
        _ => Err(PatchError::InvalidDelta(format!("array delta of length {}", items.len()))),
    }
}
