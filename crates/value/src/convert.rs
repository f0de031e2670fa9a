//! Conversions between [`Doc`] and `serde_json::Value`, plus serde support.
//!
//! `Doc` serializes exactly like the equivalent `serde_json::Value`.

use std::sync::Arc;

use serde::de::{Deserialize, Deserializer};
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use serde_json::{Number, Value};

use crate::doc::{Doc, Map};

// ── serde_json::Value → Doc ────────────────────────────────────────────────

impl From<Value> for Doc {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Doc::Null,
            Value::Bool(b) => Doc::Bool(b),
            Value::Number(n) => Doc::Number(n),
            Value::String(s) => Doc::String(Arc::from(s)),
            Value::Array(items) => Doc::array(items.into_iter().map(Doc::from).collect()),
            Value::Object(obj) => Doc::object(obj.into_iter().map(|(k, v)| (k, Doc::from(v))).collect()),
        }
    }
}

impl From<&Value> for Doc {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => Doc::Null,
            Value::Bool(b) => Doc::Bool(*b),
            Value::Number(n) => Doc::Number(n.clone()),
            Value::String(s) => Doc::string(s),
            Value::Array(items) => Doc::array(items.iter().map(Doc::from).collect()),
            Value::Object(obj) => {
                Doc::object(obj.iter().map(|(k, v)| (k.clone(), Doc::from(v))).collect())
            }
        }
    }
}

// ── Doc → serde_json::Value ────────────────────────────────────────────────

impl From<&Doc> for Value {
    fn from(doc: &Doc) -> Self {
        match doc {
            Doc::Null => Value::Null,
            Doc::Bool(b) => Value::Bool(*b),
            Doc::Number(n) => Value::Number(n.clone()),
            Doc::String(s) => Value::String(s.to_string()),
            Doc::Array(items) => Value::Array(items.iter().map(Value::from).collect()),
            Doc::Object(map) => Value::Object(
                map.iter().map(|(k, v)| (k.clone(), Value::from(v))).collect(),
            ),
        }
    }
}

impl From<Doc> for Value {
    fn from(doc: Doc) -> Self {
        Value::from(&doc)
    }
}

impl Doc {
    pub fn to_value(&self) -> Value {
        Value::from(self)
    }
}

// ── Scalars ────────────────────────────────────────────────────────────────

impl From<&str> for Doc {
    fn from(s: &str) -> Self {
        Doc::string(s)
    }
}

impl From<String> for Doc {
    fn from(s: String) -> Self {
        Doc::String(Arc::from(s))
    }
}

impl From<bool> for Doc {
    fn from(b: bool) -> Self {
        Doc::Bool(b)
    }
}

macro_rules! from_integer {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Doc {
                fn from(n: $ty) -> Self {
                    Doc::Number(Number::from(n))
                }
            }
        )*
    };
}

from_integer!(i32, i64, u32, u64, usize);

impl From<f64> for Doc {
    /// Non-finite floats have no JSON representation and become `null`.
    fn from(f: f64) -> Self {
        Number::from_f64(f).map(Doc::Number).unwrap_or(Doc::Null)
    }
}

impl From<Vec<Doc>> for Doc {
    fn from(items: Vec<Doc>) -> Self {
        Doc::array(items)
    }
}

impl From<Map> for Doc {
    fn from(map: Map) -> Self {
        Doc::object(map)
    }
}

impl FromIterator<Doc> for Doc {
    fn from_iter<I: IntoIterator<Item = Doc>>(iter: I) -> Self {
        Doc::array(iter.into_iter().collect())
    }
}

// ── serde ──────────────────────────────────────────────────────────────────

impl Serialize for Doc {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Doc::Null => serializer.serialize_unit(),
            Doc::Bool(b) => serializer.serialize_bool(*b),
            Doc::Number(n) => n.serialize(serializer),
            Doc::String(s) => serializer.serialize_str(s),
            Doc::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items.iter() {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Doc::Object(map) => {
                let mut out = serializer.serialize_map(Some(map.len()))?;
                for (k, v) in map.iter() {
                    out.serialize_entry(k, v)?;
                }
                out.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for Doc {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(Doc::from)
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────
