//! Error types.
//!
//! Only source-level failures are errors here. Malformed lines, rejected
//! deltas and odd node shapes are logged and skipped where they occur.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Fatal failure of the byte source; the stream ends after it is reported.
#[derive(Debug, Error)]
pub enum StreamError {
    #[error("stream read failed: {0}")]
    Io(#[from] io::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}
