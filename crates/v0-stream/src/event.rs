//! Stream records and the events they carry.
//!
//! Each line of the stream is one record, optionally prefixed with
//! `data: `. A record is either blank, the end-of-stream marker, a JSON
//! event, or something that could not be decoded.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::config::StreamConfig;

/// The `type` tag of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EventType {
    Connected,
    Delta,
    Done,
    ChatData,
    #[default]
    #[serde(other)]
    Unrecognized,
}

/// A decoded stream event.
///
/// Only `type`, `delta`, `object` and `id` drive the parser; `data` and any
/// other members are kept as opaque JSON. A `type` that is not a known
/// string reads as [`EventType::Unrecognized`], and a non-string `object`
/// or `id` reads as absent.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StreamEvent {
    #[serde(rename = "type", default, deserialize_with = "lenient_kind")]
    pub kind: EventType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delta: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub object: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl StreamEvent {
    /// The chat identifier this event establishes, if any.
    pub fn chat_id(&self) -> Option<&str> {
        if self.object.as_deref() != Some("chat") {
            return None;
        }
        self.id.as_deref().filter(|id| !id.is_empty())
    }

    /// Connection and chat metadata events never carry content changes.
    pub fn is_chat_metadata(&self) -> bool {
        self.kind == EventType::Connected
            || self.object.as_deref().is_some_and(|object| object.starts_with("chat"))
    }

    /// The delta to apply, ignoring empty placeholders (`null`, `false`,
    /// `0`, `""`).
    pub fn delta(&self) -> Option<&Value> {
        self.delta.as_ref().filter(|delta| is_truthy(delta))
    }
}

fn lenient_kind<'de, D: Deserializer<'de>>(deserializer: D) -> Result<EventType, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(EventType::deserialize(value).unwrap_or_default())
}

fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        _ => None,
    })
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

// ── Records ───────────────────────────────────────────────────────────────

/// One decoded line of the stream.
#[derive(Debug)]
pub enum Record {
    Blank,
    /// End-of-stream marker: the sentinel payload or a `done` event.
    Done,
    Event(StreamEvent),
    /// Valid JSON that is not an event object.
    Ignored(Value),
    Malformed { data: String, error: serde_json::Error },
}

impl Record {
    pub fn decode(line: &str, config: &StreamConfig) -> Record {
        if line.trim().is_empty() {
            return Record::Blank;
        }
        let data = line.strip_prefix(config.data_prefix.as_str()).unwrap_or(line);
        if data.trim() == config.done_sentinel {
            return Record::Done;
        }
        let value: Value = match serde_json::from_str(data) {
            Ok(value) => value,
            Err(error) => return Record::Malformed { data: data.to_string(), error },
        };
        if value.as_str() == Some(config.done_sentinel.as_str()) {
            return Record::Done;
        }
        if !value.is_object() {
            return Record::Ignored(value);
        }
        match serde_json::from_value::<StreamEvent>(value) {
            Ok(event) if event.kind == EventType::Done => Record::Done,
            Ok(event) => Record::Event(event),
            Err(error) => Record::Malformed { data: data.to_string(), error },
        }
    }
}
