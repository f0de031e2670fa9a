//! Stream parser configuration.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const DEFAULT_READ_CHUNK_SIZE: usize = 8192;
pub const DEFAULT_DATA_PREFIX: &str = "data: ";
pub const DEFAULT_DONE_SENTINEL: &str = "[DONE]";

/// Options for [`StreamParser`](crate::framer::StreamParser) and
/// [`V0Stream`](crate::stream::V0Stream).
///
/// Deserializes from camelCase JSON; missing keys take their defaults and
/// unknown keys are rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct StreamConfig {
    /// Size of the buffer each async read fills.
    pub read_chunk_size: usize,
    /// Process an unterminated last line when the source ends.
    pub flush_trailing_line: bool,
    /// Record prefix stripped before decoding.
    pub data_prefix: String,
    /// Payload that marks the end of the stream.
    pub done_sentinel: String,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            read_chunk_size: DEFAULT_READ_CHUNK_SIZE,
            flush_trailing_line: true,
            data_prefix: DEFAULT_DATA_PREFIX.to_string(),
            done_sentinel: DEFAULT_DONE_SENTINEL.to_string(),
        }
    }
}

impl StreamConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    pub fn with_read_chunk_size(mut self, size: usize) -> Self {
        self.read_chunk_size = size;
        self
    }

    pub fn with_flush_trailing_line(mut self, flush: bool) -> Self {
        self.flush_trailing_line = flush;
        self
    }

    /// The read buffer size actually used; never zero.
    pub fn effective_chunk_size(&self) -> usize {
        self.read_chunk_size.max(1)
    }
}
