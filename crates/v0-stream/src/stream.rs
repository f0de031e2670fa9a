//! Async adapter over a byte source.

use std::io;

use bytes::Buf;
use futures::Stream;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio_util::io::StreamReader;
use tracing::debug;

use crate::config::StreamConfig;
use crate::error::StreamError;
use crate::framer::{StreamParser, StreamState};

/// One observation of the stream.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamStep {
    /// The content snapshot changed during the last read.
    Update(StreamState),
    /// The source ended; this state is authoritative. Always the last step.
    Complete(StreamState),
}

impl StreamStep {
    pub fn state(&self) -> &StreamState {
        match self {
            StreamStep::Update(state) | StreamStep::Complete(state) => state,
        }
    }

    pub fn into_state(self) -> StreamState {
        match self {
            StreamStep::Update(state) | StreamStep::Complete(state) => state,
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, StreamStep::Complete(_))
    }
}

/// Pulls bytes from `R` and reports snapshot changes.
///
/// The reader is dropped as soon as the source ends or fails. Dropping the
/// `V0Stream` early drops it too.
pub struct V0Stream<R> {
    reader: Option<R>,
    parser: StreamParser,
    buf: Vec<u8>,
}

impl<R> V0Stream<R>
where
    R: AsyncRead + Unpin,
{
    pub fn new(reader: R) -> Self {
        Self::with_config(reader, StreamConfig::default())
    }

    pub fn with_config(reader: R, config: StreamConfig) -> Self {
        let buf = vec![0; config.effective_chunk_size()];
        Self { reader: Some(reader), parser: StreamParser::with_config(config), buf }
    }

    /// State folded so far.
    pub fn state(&self) -> &StreamState {
        self.parser.state()
    }

    /// Whether the reader has been dropped.
    pub fn is_released(&self) -> bool {
        self.reader.is_none()
    }

    /// Reads until the snapshot changes or the source ends.
    ///
    /// Returns `None` once [`StreamStep::Complete`] or an error has been
    /// returned.
    pub async fn next_step(&mut self) -> Option<Result<StreamStep, StreamError>> {
        loop {
            let reader = self.reader.as_mut()?;
            match reader.read(&mut self.buf).await {
                Ok(0) => {
                    self.reader = None;
                    let state = self.parser.finish();
                    debug!(chat_id = ?state.chat_id, "stream complete");
                    return Some(Ok(StreamStep::Complete(state)));
                }
                Ok(n) => {
                    if let Some(state) = self.parser.push(&self.buf[..n]) {
                        return Some(Ok(StreamStep::Update(state)));
                    }
                }
                Err(err) if err.kind() == io::ErrorKind::Interrupted => {}
                Err(err) => {
                    self.reader = None;
                    return Some(Err(StreamError::Io(err)));
                }
            }
        }
    }

    pub fn into_stream(self) -> impl Stream<Item = Result<StreamStep, StreamError>> {
        futures::stream::unfold(self, |mut stream| async move {
            let step = stream.next_step().await?;
            Some((step, stream))
        })
    }

    /// Drains the source and returns the final state.
    pub async fn collect_final(mut self) -> Result<StreamState, StreamError> {
        while let Some(step) = self.next_step().await {
            if let StreamStep::Complete(state) = step? {
                return Ok(state);
            }
        }
        Ok(self.parser.state().clone())
    }
}

impl<S, B, E> V0Stream<StreamReader<S, B>>
where
    S: Stream<Item = Result<B, E>> + Unpin,
    B: Buf,
    E: Into<io::Error>,
{
    /// Wraps a stream of byte chunks, such as an HTTP response body.
    pub fn from_byte_stream(chunks: S) -> Self {
        Self::new(StreamReader::new(chunks))
    }

    pub fn from_byte_stream_with_config(chunks: S, config: StreamConfig) -> Self {
        Self::with_config(StreamReader::new(chunks), config)
    }
}
