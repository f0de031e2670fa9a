#![allow(dead_code)]

use std::io;

use bytes::Bytes;
use futures::stream::{self, Iter};
use serde_json::{json, Value};
use tokio::io::AsyncRead;
use v0_stream::{StreamStep, V0Stream};

/// Frames each event as a `data: ` line.
pub fn sse(events: &[Value]) -> String {
    events.iter().map(|event| format!("data: {event}\n")).collect()
}

/// A captured response: metadata, text appends, a thinking block, a code
/// block, and the end sentinel.
pub fn recorded_chat() -> String {
    let mut body = sse(&[
        json!({"type": "connected"}),
        json!({"object": "chat", "id": "chat_123"}),
        json!({"type": "delta", "delta": {"_t": "a", "0": [[0, [
            "Here is ",
            ["AssistantMessageContentPart", {"part": {"type": "task-thinking-v1", "parts": [{"type": "thinking-start"}]}}]
        ]]]}}),
        json!({"type": "delta", "delta": [[0, 1, 0, "the page."], 9, 9]}),
        json!({"type": "delta", "delta": {"_t": "a", "0": {"_t": "a", "1": {"_t": "a", "1": {"_t": "a", "1": {
            "part": {"parts": {"_t": "a", "1": [{"type": "thinking-end", "thought": "Layout first", "duration": 2}]}}
        }}}}}}),
        json!({"type": "delta", "delta": {"_t": "a", "0": {"_t": "a", "1": {"_t": "a", "2": [
            ["Codeblock", {"lang": "tsx"}, "export default function Page() {"]
        ]}}}}),
        json!({"type": "delta", "delta": [[0, 1, 2, 2, "}"], 9, 9]}),
        json!({"type": "delta", "delta": [[0, 1, 0, " Voilà ✓"], 9, 9]}),
    ]);
    body.push_str("data: [DONE]\n");
    body
}

pub fn recorded_chat_content() -> Value {
    json!([[0, [
        "Here is the page. Voilà ✓",
        ["AssistantMessageContentPart", {"part": {"type": "task-thinking-v1", "parts": [
            {"type": "thinking-start"},
            {"type": "thinking-end", "thought": "Layout first", "duration": 2}
        ]}}],
        ["Codeblock", {"lang": "tsx"}, "export default function Page() {}"]
    ]]])
}

pub type ChunkStream = Iter<std::vec::IntoIter<io::Result<Bytes>>>;

/// Splits `bytes` into fixed-size chunks.
pub fn chunked(bytes: &[u8], size: usize) -> ChunkStream {
    let chunks: Vec<io::Result<Bytes>> = bytes.chunks(size).map(|c| Ok(Bytes::copy_from_slice(c))).collect();
    stream::iter(chunks)
}

/// Chunks split at the given offsets.
pub fn split_at(bytes: &[u8], mut offsets: Vec<usize>) -> Vec<Vec<u8>> {
    offsets.retain(|&offset| offset > 0 && offset < bytes.len());
    offsets.sort_unstable();
    offsets.dedup();
    let mut chunks = Vec::new();
    let mut start = 0;
    for offset in offsets {
        chunks.push(bytes[start..offset].to_vec());
        start = offset;
    }
    chunks.push(bytes[start..].to_vec());
    chunks
}

/// Runs the stream to the end, failing the test on a read error.
pub async fn drain<R: AsyncRead + Unpin>(mut chat: V0Stream<R>) -> Vec<StreamStep> {
    let mut steps = Vec::new();
    while let Some(step) = chat.next_step().await {
        steps.push(step.expect("stream read must succeed"));
    }
    steps
}
