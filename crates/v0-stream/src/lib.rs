//! Incremental reconstruction of streamed v0 chat responses.
//!
//! | Module           | Purpose                                                   |
//! |------------------|-----------------------------------------------------------|
//! | `delta`          | Apply string-append and structural deltas to a snapshot   |
//! | `event`          | Decode stream records into typed events                   |
//! | `framer`         | Byte chunks → lines → folded [`StreamState`]              |
//! | `stream`         | Async reader adapter yielding [`StreamStep`]s             |
//! | `message`        | Project a snapshot into keyed [`MessageElement`]s         |
//! | `content_part`   | Typed view of content-part payloads                       |
//! | `status`         | Connecting / streaming / complete progress reports        |
//! | `config`         | [`StreamConfig`] and its JSON loader                      |
//!
//! ```
//! use v0_stream::{parse_message, StreamParser};
//!
//! let mut parser = StreamParser::new();
//! parser.push(b"data: {\"type\":\"delta\",\"delta\":{\"_t\":\"a\",\"0\":[[0,[\"Hel\"]]]}}\n");
//! parser.push(b"data: {\"type\":\"delta\",\"delta\":[[0,1,0,\"lo\"],9,9]}\n");
//! let state = parser.finish();
//!
//! let message = parse_message(&state.content, "m");
//! assert_eq!(message.elements[0].key(), "m-0");
//! assert_eq!(message.elements[0].children()[0].key(), "m-0-0");
//! ```

pub mod config;
pub mod content_part;
pub mod delta;
pub mod error;
pub mod event;
pub mod framer;
pub mod message;
pub mod status;
pub mod stream;

pub use config::StreamConfig;
pub use content_part::{ContentPart, ThinkingPart};
pub use error::{ConfigError, StreamError};
pub use event::{EventType, Record, StreamEvent};
pub use framer::{StreamParser, StreamState, Utf8Decoder};
pub use message::{parse_message, MessageElement, ParsedMessage};
pub use status::{track_chat, ChatProgress, ChatStatus};
pub use stream::{StreamStep, V0Stream};
pub use v0_stream_value::Doc;
