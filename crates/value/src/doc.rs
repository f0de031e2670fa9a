//! The [`Doc`] value type and its accessors.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::Number;

/// Insertion-ordered object map.
pub type Map = IndexMap<String, Doc>;

// ── Type ───────────────────────────────────────────────────────────────────

/// A JSON-like value with reference-counted containers.
///
/// Equality (`==`) is deep structural equality. Use [`Doc::ptr_eq`] for the
/// cheap "is this the very same value" check.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Doc {
    #[default]
    Null,
    Bool(bool),
    Number(Number),
    String(Arc<str>),
    Array(Arc<Vec<Doc>>),
    Object(Arc<Map>),
}

impl Doc {
    pub fn array(items: Vec<Doc>) -> Self {
        Doc::Array(Arc::new(items))
    }

    pub fn empty_array() -> Self {
        Doc::Array(Arc::new(Vec::new()))
    }

    pub fn object(map: Map) -> Self {
        Doc::Object(Arc::new(map))
    }

    pub fn string(s: &str) -> Self {
        Doc::String(Arc::from(s))
    }

    // ── Inspection ────────────────────────────────────────────────────────

    /// Name of the value's JSON type, for diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Doc::Null => "null",
            Doc::Bool(_) => "boolean",
            Doc::Number(_) => "number",
            Doc::String(_) => "string",
            Doc::Array(_) => "array",
            Doc::Object(_) => "object",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Doc::Null)
    }

    pub fn is_array(&self) -> bool {
        matches!(self, Doc::Array(_))
    }

    pub fn is_object(&self) -> bool {
        matches!(self, Doc::Object(_))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Doc::String(s) => Some(s.as_ref()),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Doc::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Doc::Number(n) => n.as_f64(),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Doc::Number(n) => n.as_u64(),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Doc]> {
        match self {
            Doc::Array(items) => Some(items.as_slice()),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Map> {
        match self {
            Doc::Object(map) => Some(map),
            _ => None,
        }
    }

    pub fn get_index(&self, index: usize) -> Option<&Doc> {
        self.as_array().and_then(|items| items.get(index))
    }

    pub fn get_key(&self, key: &str) -> Option<&Doc> {
        self.as_object().and_then(|map| map.get(key))
    }

    /// JavaScript-style truthiness: `null`, `false`, `0`, `NaN` and `""` are
    /// falsy, everything else (including empty containers) is truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Doc::Null => false,
            Doc::Bool(b) => *b,
            Doc::Number(n) => n.as_f64().map(|f| f != 0.0 && !f.is_nan()).unwrap_or(true),
            Doc::String(s) => !s.is_empty(),
            Doc::Array(_) | Doc::Object(_) => true,
        }
    }

    /// Identity comparison.
    ///
    /// Strings, arrays and objects compare by allocation; scalars compare by
    /// value since they carry no allocation to share.
    pub fn ptr_eq(&self, other: &Doc) -> bool {
        match (self, other) {
            (Doc::String(a), Doc::String(b)) => Arc::ptr_eq(a, b),
            (Doc::Array(a), Doc::Array(b)) => Arc::ptr_eq(a, b),
            (Doc::Object(a), Doc::Object(b)) => Arc::ptr_eq(a, b),
            (Doc::Null, Doc::Null) => true,
            (Doc::Bool(a), Doc::Bool(b)) => a == b,
            (Doc::Number(a), Doc::Number(b)) => a == b,
            _ => false,
        }
    }

    // ── Copy-on-write access ──────────────────────────────────────────────

    /// Mutable access to the array items, cloning the item vector first if it
    /// is shared. The items themselves are cloned shallowly.
    pub fn make_array_mut(&mut self) -> Option<&mut Vec<Doc>> {
        match self {
            Doc::Array(items) => Some(Arc::make_mut(items)),
            _ => None,
        }
    }

    /// Mutable access to the object map, cloning it first if it is shared.
    pub fn make_object_mut(&mut self) -> Option<&mut Map> {
        match self {
            Doc::Object(map) => Some(Arc::make_mut(map)),
            _ => None,
        }
    }

    /// Moves the value out, leaving `Null` behind.
    pub fn take(&mut self) -> Doc {
        std::mem::take(self)
    }
}

impl fmt::Display for Doc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match serde_json::to_string(self) {
            Ok(s) => f.write_str(&s),
            Err(_) => Err(fmt::Error),
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────
