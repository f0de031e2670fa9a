//! `v0-stream`: replay a captured chat stream and print what it builds.
//!
//! Usage:
//!   v0-stream [--input <file>] [--config <json>] [--chunk-size <n>]
//!             [--message-id <id>] [--format snapshot|elements|updates|status]
//!
//! The stream is read from `--input`, or stdin when absent. Diagnostics go
//! to stderr and are filtered by `RUST_LOG` (default `warn`).

use std::path::PathBuf;
use std::pin::pin;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use futures::StreamExt;
use serde::Serialize;
use tokio::io::{AsyncRead, AsyncWriteExt, Stdout};
use tracing_subscriber::EnvFilter;
use v0_stream::message::DEFAULT_MESSAGE_ID;
use v0_stream::{parse_message, track_chat, StreamConfig, StreamStep, V0Stream};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    /// Final `{content, chatId}` state.
    Snapshot,
    /// Projected elements of the final content.
    Elements,
    /// One state per content change, as NDJSON.
    Updates,
    /// One progress report per step, as NDJSON.
    Status,
}

#[derive(Debug, Parser)]
#[command(name = "v0-stream", version, about = "Replay a captured chat stream")]
struct Args {
    /// Captured stream; stdin when absent.
    #[arg(long)]
    input: Option<PathBuf>,
    /// JSON stream config.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Read buffer size, overriding the config.
    #[arg(long)]
    chunk_size: Option<usize>,
    /// Key prefix for projected elements.
    #[arg(long, default_value = DEFAULT_MESSAGE_ID)]
    message_id: String,
    #[arg(long, value_enum, default_value_t = Format::Elements)]
    format: Format,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let mut config = match &args.config {
        Some(path) => StreamConfig::load(path)?,
        None => StreamConfig::default(),
    };
    if let Some(size) = args.chunk_size {
        config = config.with_read_chunk_size(size);
    }

    let reader: Box<dyn AsyncRead + Unpin> = match &args.input {
        Some(path) => Box::new(
            tokio::fs::File::open(path)
                .await
                .with_context(|| format!("failed to open {}", path.display()))?,
        ),
        None => Box::new(tokio::io::stdin()),
    };
    let chat = V0Stream::with_config(reader, config);
    let mut out = tokio::io::stdout();

    match args.format {
        Format::Snapshot => {
            let state = chat.collect_final().await?;
            write_json(&mut out, &state).await?;
        }
        Format::Elements => {
            let state = chat.collect_final().await?;
            write_json(&mut out, &parse_message(&state.content, &args.message_id)).await?;
        }
        Format::Updates => {
            let mut steps = pin!(chat.into_stream());
            while let Some(step) = steps.next().await {
                if let StreamStep::Update(state) = step? {
                    write_json(&mut out, &state).await?;
                }
            }
        }
        Format::Status => {
            let mut progress = pin!(track_chat(chat));
            while let Some(report) = progress.next().await {
                write_json(&mut out, &report).await?;
            }
        }
    }
    out.flush().await?;
    Ok(())
}

async fn write_json<T: Serialize>(out: &mut Stdout, value: &T) -> Result<()> {
    let mut line = serde_json::to_vec(value)?;
    line.push(b'\n');
    out.write_all(&line).await?;
    Ok(())
}
