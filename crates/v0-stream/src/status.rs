//! Progress reporting for a single chat response.

use futures::stream::{self, Stream};
use serde::{Deserialize, Serialize};
use tokio::io::AsyncRead;
use v0_stream_value::Doc;

use crate::error::StreamError;
use crate::framer::StreamState;
use crate::stream::{StreamStep, V0Stream};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatStatus {
    Connecting,
    Streaming,
    Complete,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatProgress {
    pub status: ChatStatus,
    pub chat_id: Option<String>,
    pub message: String,
    #[serde(default)]
    pub content: Option<Doc>,
}

impl ChatProgress {
    pub fn connecting() -> Self {
        Self { status: ChatStatus::Connecting, chat_id: None, message: "Connecting to v0...".into(), content: None }
    }

    pub fn streaming(state: StreamState) -> Self {
        Self {
            status: ChatStatus::Streaming,
            chat_id: state.chat_id,
            message: "Streaming response...".into(),
            content: Some(state.content),
        }
    }

    pub fn complete(chat_id: Option<String>) -> Self {
        Self { status: ChatStatus::Complete, chat_id, message: "Response complete".into(), content: None }
    }

    pub fn error(err: &StreamError) -> Self {
        Self { status: ChatStatus::Error, chat_id: None, message: err.to_string(), content: None }
    }
}

enum Phase<R> {
    Start(V0Stream<R>),
    Running(V0Stream<R>),
    Finished,
}

/// Reports `connecting`, then `streaming` per update, then exactly one of
/// `complete` or `error`.
pub fn track_chat<R>(chat: V0Stream<R>) -> impl Stream<Item = ChatProgress>
where
    R: AsyncRead + Unpin,
{
    stream::unfold(Phase::Start(chat), |phase| async move {
        match phase {
            Phase::Start(chat) => Some((ChatProgress::connecting(), Phase::Running(chat))),
            Phase::Running(mut chat) => match chat.next_step().await? {
                Ok(StreamStep::Update(state)) => Some((ChatProgress::streaming(state), Phase::Running(chat))),
                Ok(StreamStep::Complete(state)) => Some((ChatProgress::complete(state.chat_id), Phase::Finished)),
                Err(err) => Some((ChatProgress::error(&err), Phase::Finished)),
            },
            Phase::Finished => None,
        }
    })
}
