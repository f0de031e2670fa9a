//! Typed view of content-part payloads.
//!
//! The projector passes `part` through untouched; this module classifies it
//! by its `type` member for consumers that want to render thinking blocks.

use v0_stream_value::{Doc, Map};

pub const TASK_THINKING: &str = "task-thinking-v1";
pub const THINKING_START: &str = "thinking-start";
pub const THINKING_END: &str = "thinking-end";

#[derive(Debug, Clone, PartialEq)]
pub enum ContentPart {
    TaskThinking { parts: Vec<ThinkingPart> },
    Other { kind: String, fields: Map },
}

#[derive(Debug, Clone, PartialEq)]
pub enum ThinkingPart {
    Start,
    End { thought: String, duration: Option<f64> },
    Other { kind: String },
}

impl ContentPart {
    /// `None` if `part` is not an object with a string `type`.
    pub fn from_doc(part: &Doc) -> Option<ContentPart> {
        let fields = part.as_object()?;
        let kind = fields.get("type")?.as_str()?;
        if kind != TASK_THINKING {
            let mut fields = fields.clone();
            fields.shift_remove("type");
            return Some(ContentPart::Other { kind: kind.to_string(), fields });
        }
        let parts = fields
            .get("parts")
            .and_then(Doc::as_array)
            .map(|parts| parts.iter().filter_map(ThinkingPart::from_doc).collect())
            .unwrap_or_default();
        Some(ContentPart::TaskThinking { parts })
    }

    pub fn kind(&self) -> &str {
        match self {
            ContentPart::TaskThinking { .. } => TASK_THINKING,
            ContentPart::Other { kind, .. } => kind,
        }
    }

    /// The most recent finished thought.
    pub fn thought(&self) -> Option<&str> {
        let ContentPart::TaskThinking { parts } = self else { return None };
        parts.iter().rev().find_map(|part| match part {
            ThinkingPart::End { thought, .. } => Some(thought.as_str()),
            _ => None,
        })
    }

    /// True while a thinking block has started but not ended.
    pub fn is_thinking(&self) -> bool {
        let ContentPart::TaskThinking { parts } = self else { return false };
        let mut open = false;
        for part in parts {
            match part {
                ThinkingPart::Start => open = true,
                ThinkingPart::End { .. } => open = false,
                ThinkingPart::Other { .. } => {}
            }
        }
        open
    }
}

impl ThinkingPart {
    fn from_doc(part: &Doc) -> Option<ThinkingPart> {
        let kind = part.get_key("type")?.as_str()?;
        Some(match kind {
            THINKING_START => ThinkingPart::Start,
            THINKING_END => ThinkingPart::End {
                thought: part.get_key("thought").and_then(Doc::as_str).unwrap_or_default().to_string(),
                duration: part.get_key("duration").and_then(Doc::as_f64),
            },
            other => ThinkingPart::Other { kind: other.to_string() },
        })
    }
}
