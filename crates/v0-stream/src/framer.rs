//! Line framing and snapshot folding.
//!
//! [`StreamParser`] is the synchronous core of the stream: bytes go in, and
//! after each chunk it reports whether the content snapshot changed.
//! Multi-byte characters and lines may be split anywhere across chunks.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};
use v0_stream_value::Doc;

use crate::config::StreamConfig;
use crate::delta;
use crate::event::{Record, StreamEvent};

/// Reconstructed state of a chat stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamState {
    pub content: Doc,
    pub chat_id: Option<String>,
}

impl Default for StreamState {
    fn default() -> Self {
        Self { content: Doc::empty_array(), chat_id: None }
    }
}

impl StreamState {
    /// Folds one event into the state.
    pub fn apply_event(&mut self, event: &StreamEvent) {
        if let Some(id) = event.chat_id() {
            self.chat_id = Some(id.to_string());
        }
        if event.is_chat_metadata() {
            return;
        }
        if let Some(delta) = event.delta() {
            self.content = delta::apply(&self.content, delta);
        }
    }
}

// ── UTF-8 decoding ────────────────────────────────────────────────────────

/// Incremental UTF-8 decoder.
///
/// An incomplete sequence at the end of a chunk is held until the next one.
/// Invalid bytes decode to U+FFFD.
#[derive(Debug, Default)]
pub struct Utf8Decoder {
    pending: Vec<u8>,
}

impl Utf8Decoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn decode(&mut self, chunk: &[u8]) -> String {
        self.pending.extend_from_slice(chunk);
        let mut out = String::with_capacity(self.pending.len());
        let mut start = 0;
        loop {
            match std::str::from_utf8(&self.pending[start..]) {
                Ok(valid) => {
                    out.push_str(valid);
                    start = self.pending.len();
                    break;
                }
                Err(err) => {
                    let valid_end = start + err.valid_up_to();
                    out.push_str(&String::from_utf8_lossy(&self.pending[start..valid_end]));
                    match err.error_len() {
                        Some(len) => {
                            out.push(char::REPLACEMENT_CHARACTER);
                            start = valid_end + len;
                        }
                        None => {
                            start = valid_end;
                            break;
                        }
                    }
                }
            }
        }
        self.pending.drain(..start);
        out
    }

    /// Flushes a dangling partial sequence as U+FFFD.
    pub fn finish(&mut self) -> String {
        if self.pending.is_empty() {
            return String::new();
        }
        self.pending.clear();
        char::REPLACEMENT_CHARACTER.to_string()
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }
}

// ── Parser ────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct StreamParser {
    config: StreamConfig,
    decoder: Utf8Decoder,
    buffer: String,
    state: StreamState,
}

impl StreamParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: StreamConfig) -> Self {
        Self { config, ..Self::default() }
    }

    pub fn config(&self) -> &StreamConfig {
        &self.config
    }

    pub fn state(&self) -> &StreamState {
        &self.state
    }

    /// Text received after the last newline.
    pub fn pending_line(&self) -> &str {
        &self.buffer
    }

    /// Feeds one chunk. Returns the new state if the content snapshot is a
    /// different value than before the chunk.
    pub fn push(&mut self, chunk: &[u8]) -> Option<StreamState> {
        let text = self.decoder.decode(chunk);
        self.buffer.push_str(&text);
        let last_newline = self.buffer.rfind('\n')?;

        let rest = self.buffer.split_off(last_newline + 1);
        let complete = std::mem::replace(&mut self.buffer, rest);
        let before = self.state.content.clone();
        for line in complete.split('\n') {
            self.process_line(line);
        }
        self.changed_since(&before)
    }

    /// Ends the input and returns the final state.
    ///
    /// The unterminated tail is processed when `flush_trailing_line` is set
    /// and dropped otherwise. The parser is reset to accept a fresh stream
    /// afterwards, keeping its configuration.
    pub fn finish(&mut self) -> StreamState {
        let tail = self.decoder.finish();
        self.buffer.push_str(&tail);
        let line = std::mem::take(&mut self.buffer);
        if !line.trim().is_empty() {
            if self.config.flush_trailing_line {
                self.process_line(&line);
            } else {
                debug!(len = line.len(), "dropping unterminated trailing line");
            }
        }
        std::mem::take(&mut self.state)
    }

    fn process_line(&mut self, line: &str) {
        let line = line.strip_suffix('\r').unwrap_or(line);
        match Record::decode(line, &self.config) {
            Record::Blank => {}
            Record::Done => trace!("end-of-stream marker"),
            Record::Event(event) => self.state.apply_event(&event),
            Record::Ignored(value) => debug!(%value, "ignoring non-event record"),
            Record::Malformed { data, error } => {
                warn!(%error, data = %data, "error parsing stream event");
            }
        }
    }

    fn changed_since(&self, before: &Doc) -> Option<StreamState> {
        if self.state.content.ptr_eq(before) {
            None
        } else {
            Some(self.state.clone())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decoder_holds_split_sequences() {
        let bytes = "é€".as_bytes();
        let mut decoder = Utf8Decoder::new();
        assert_eq!(decoder.decode(&bytes[..1]), "");
        assert!(decoder.has_pending());
        assert_eq!(decoder.decode(&bytes[1..3]), "é");
        assert_eq!(decoder.decode(&bytes[3..]), "€");
        assert_eq!(decoder.finish(), "");
    }

    #[test]
    fn decoder_replaces_invalid_bytes() {
        let mut decoder = Utf8Decoder::new();
        assert_eq!(decoder.decode(b"a\xffb"), "a\u{FFFD}b");
        assert_eq!(decoder.decode(b"\xe2\x82"), "");
        assert_eq!(decoder.finish(), "\u{FFFD}");
    }

    #[test]
    fn yields_only_on_content_change() {
        let mut parser = StreamParser::new();
        assert_eq!(parser.push(b"data: {\"object\":\"chat\",\"id\":\"c1\"}\n"), None);
        assert_eq!(parser.state().chat_id.as_deref(), Some("c1"));

        let state = parser.push(b"data: {\"type\":\"delta\",\"delta\":{\"_t\":\"a\",\"0\":[\"Hi\"]}}\n").unwrap();
        assert_eq!(state.content.to_value(), json!(["Hi"]));
        assert_eq!(state.chat_id.as_deref(), Some("c1"));
    }

    #[test]
    fn partial_lines_wait_for_newline() {
        let mut parser = StreamParser::new();
        assert_eq!(parser.push(b"data: {\"type\":\"delta\",\"delta\":[[0,\"x\"],9"), None);
        assert!(parser.pending_line().starts_with("data: "));
        assert_eq!(parser.push(b",9]}\n"), None);
    }

    #[test]
    fn several_lines_in_one_chunk_yield_once() {
        let mut parser = StreamParser::new();
        let chunk = b"data: {\"delta\":{\"_t\":\"a\",\"0\":[\"a\"]}}\r\n\r\ndata: {\"delta\":[[0,\"b\"],9,9]}\n";
        let state = parser.push(chunk).unwrap();
        assert_eq!(state.content.to_value(), json!(["ab"]));
    }

    #[test]
    fn malformed_lines_are_skipped() {
        let mut parser = StreamParser::new();
        let chunk = b"data: {oops\ndata: {\"delta\":{\"_t\":\"a\",\"0\":[1]}}\n";
        assert_eq!(parser.push(chunk).unwrap().content.to_value(), json!([1]));
    }

    #[test]
    fn metadata_events_do_not_touch_content() {
        let mut parser = StreamParser::new();
        let chunk = b"{\"type\":\"connected\",\"delta\":{\"_t\":\"a\",\"0\":[1]}}\n";
        assert_eq!(parser.push(chunk), None);
        assert_eq!(parser.state().content.to_value(), json!([]));
    }

    #[test]
    fn oddly_typed_metadata_still_applies_delta() {
        let mut parser = StreamParser::new();
        let chunk = b"data: {\"type\":null,\"id\":7,\"delta\":{\"_t\":\"a\",\"0\":[\"x\"]}}\n";
        let state = parser.push(chunk).expect("content changed");
        assert_eq!(state.content.to_value(), json!(["x"]));
        assert_eq!(state.chat_id, None);
    }

    #[test]
    fn finish_flushes_trailing_line() {
        let mut parser = StreamParser::new();
        assert_eq!(parser.push(b"data: {\"delta\":{\"_t\":\"a\",\"0\":[\"end\"]}}"), None);
        assert_eq!(parser.finish().content.to_value(), json!(["end"]));
    }

    #[test]
    fn finish_can_drop_trailing_line() {
        let config = StreamConfig::default().with_flush_trailing_line(false);
        let mut parser = StreamParser::with_config(config);
        parser.push(b"data: {\"delta\":{\"_t\":\"a\",\"0\":[\"end\"]}}");
        assert_eq!(parser.finish().content.to_value(), json!([]));
    }

    #[test]
    fn custom_prefix_and_sentinel() {
        let config = StreamConfig::from_json_str(r#"{"dataPrefix": "event: ", "doneSentinel": "<eof>"}"#).unwrap();
        let mut parser = StreamParser::with_config(config);
        let state = parser.push(b"event: {\"delta\":{\"_t\":\"a\",\"0\":[2]}}\nevent: <eof>\n").unwrap();
        assert_eq!(state.content.to_value(), json!([2]));
    }

    #[test]
    fn state_serializes_camel_case() {
        let state = StreamState { content: Doc::from(json!(["x"])), chat_id: Some("c".into()) };
        assert_eq!(serde_json::to_value(&state).unwrap(), json!({"content": ["x"], "chatId": "c"}));
    }
}
