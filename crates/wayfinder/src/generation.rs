//! Streaming client for an Ollama-style `/api/generate` endpoint.
//!
//! The service answers a single POST with newline-delimited JSON objects.
//! Each object may carry a `response` fragment; the client decodes the body
//! lazily into [`GenerationChunk`]s and folds them into one string.
//!
//! Lines that are not valid JSON, or that have no string `response` field,
//! contribute nothing. They are counted on the returned [`Generation`] but
//! never raised as errors.

use std::pin::Pin;
use std::time::Duration;

use async_trait::async_trait;
use futures::{Stream, StreamExt, TryStreamExt};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{Result, WayfinderError};

pub const DEFAULT_ENDPOINT: &str = "http://localhost:11434/api/generate";
pub const DEFAULT_MODEL: &str = "llama3.2";

const MAX_BACKOFF_MS: u64 = 4_000;

/// Configuration for the generation HTTP client
#[derive(Debug, Clone)]
pub struct ClientConfig {
  /// Full URL of the generate endpoint
  pub endpoint: String,
  /// Model identifier sent with every request
  pub model: String,
  /// Limit for the response headers and for each gap between body reads
  pub timeout_secs: u64,
  pub connect_timeout_secs: u64,
  /// Extra attempts after a transient failure before the stream starts
  pub retries: u32,
  /// First retry delay, doubled per attempt
  pub backoff_ms: u64,
}

impl Default for ClientConfig {
  fn default() -> Self {
    Self {
      endpoint: DEFAULT_ENDPOINT.to_string(),
      model: DEFAULT_MODEL.to_string(),
      timeout_secs: 30,
      connect_timeout_secs: 5,
      retries: 2,
      backoff_ms: 250,
    }
  }
}

/// One decoded line of the response body
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GenerationChunk {
  /// Text to append, if the line carried any
  pub fragment: Option<String>,
  /// The service marked this line as its last
  pub done: bool,
}

/// The folded result of a generation stream
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Generation {
  pub text: String,
  /// Non-empty lines that failed to decode or lacked a fragment
  pub skipped_lines: usize,
}

impl Generation {
  fn absorb(&mut self, chunk: GenerationChunk) {
    if chunk.done {
      debug!("service marked the stream finished");
    }
    match chunk.fragment {
      Some(fragment) => self.text.push_str(&fragment),
      None => self.skipped_lines += 1,
    }
  }
}

pub type ChunkStream = Pin<Box<dyn Stream<Item = Result<GenerationChunk>> + Send>>;

/// Anything that can turn a prompt into generated text
#[async_trait]
pub trait Generator: Send + Sync {
  async fn generate(&self, prompt: &str) -> Result<Generation>;
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
  model: &'a str,
  prompt: &'a str,
}

#[derive(Deserialize)]
struct StreamLine {
  response: Option<String>,
  #[serde(default, deserialize_with = "lenient_flag")]
  done: bool,
}

// Only `response` decides whether a line counts; an odd `done` reads as false
fn lenient_flag<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
  D: serde::Deserializer<'de>,
{
  Ok(serde_json::Value::deserialize(deserializer)?.as_bool().unwrap_or(false))
}

/// HTTP client for the generation service
pub struct GenerationClient {
  client: Client,
  config: ClientConfig,
}

impl GenerationClient {
  pub fn new(config: ClientConfig) -> Result<Self> {
    let client = Client::builder()
      .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
      .build()
      .map_err(|e| WayfinderError::config(format!("Failed to create HTTP client: {e}")))?;

    Ok(Self { client, config })
  }

  /// Send the prompt and return the response body as a lazy chunk stream.
  ///
  /// Transient failures before the body starts are retried with backoff.
  /// Once a stream is returned, any failure surfaces as an item and ends it.
  pub async fn stream(&self, prompt: &str) -> Result<ChunkStream> {
    let response = self.send_with_retry(prompt).await?;
    let body = Box::pin(response.bytes_stream());

    Ok(decode_stream(body, &self.config.endpoint, Some(self.timeout())))
  }

  fn timeout(&self) -> Duration {
    Duration::from_secs(self.config.timeout_secs)
  }

  async fn send_with_retry(&self, prompt: &str) -> Result<reqwest::Response> {
    let mut attempt = 0;

    loop {
      match self.send(prompt).await {
        Ok(response) => return Ok(response),
        Err(e) if e.is_transient() && attempt < self.config.retries => {
          let delay = backoff_delay(self.config.backoff_ms, attempt);
          attempt += 1;
          warn!(
            attempt,
            delay_ms = delay.as_millis() as u64,
            error = %e,
            "retrying generation request"
          );
          tokio::time::sleep(delay).await;
        }
        Err(e) => return Err(e),
      }
    }
  }

  async fn send(&self, prompt: &str) -> Result<reqwest::Response> {
    let endpoint = &self.config.endpoint;
    let request = GenerateRequest { model: &self.config.model, prompt };

    debug!(
      endpoint = %endpoint,
      model = %self.config.model,
      prompt_len = prompt.len(),
      "sending generate request"
    );

    let response =
      tokio::time::timeout(self.timeout(), self.client.post(endpoint).json(&request).send())
        .await
        .map_err(|_| WayfinderError::timeout(endpoint, self.config.timeout_secs))?
        .map_err(|e| request_failure(endpoint, &e, self.config.connect_timeout_secs))?;

    let status = response.status();
    if !status.is_success() {
      let body = match tokio::time::timeout(self.timeout(), response.text()).await {
        Ok(text) => text.unwrap_or_default(),
        Err(_) => {
          debug!(status = status.as_u16(), "error body stalled; reporting status without it");
          String::new()
        }
      };
      return Err(WayfinderError::status(endpoint, status.as_u16(), body.trim()));
    }

    Ok(response)
  }
}

#[async_trait]
impl Generator for GenerationClient {
  async fn generate(&self, prompt: &str) -> Result<Generation> {
    let generation = collect(self.stream(prompt).await?).await?;

    if generation.skipped_lines > 0 {
      debug!(skipped = generation.skipped_lines, "ignored undecodable stream lines");
    }
    info!(chars = generation.text.len(), "generation complete");

    Ok(generation)
  }
}

/// Fold a chunk stream into its concatenated text
pub async fn collect<S>(chunks: S) -> Result<Generation>
where
  S: Stream<Item = Result<GenerationChunk>>,
{
  chunks
    .try_fold(Generation::default(), |mut generation, chunk| async move {
      generation.absorb(chunk);
      Ok(generation)
    })
    .await
}

/// Split a byte stream into lines and decode each non-empty one.
///
/// A final line without a trailing newline is decoded when the body ends.
/// A body error, or `idle_timeout` passing with no data, yields one error
/// item and ends the stream.
pub fn decode_stream<S, B, E>(
  body: S,
  endpoint: &str,
  idle_timeout: Option<Duration>,
) -> ChunkStream
where
  S: Stream<Item = std::result::Result<B, E>> + Unpin + Send + 'static,
  B: AsRef<[u8]> + Send + 'static,
  E: std::error::Error + Send + 'static,
{
  let reader = LineReader {
    body,
    buffer: Vec::new(),
    finished: false,
    endpoint: endpoint.to_string(),
    idle_timeout,
  };

  Box::pin(futures::stream::unfold(reader, |mut reader| async move {
    reader.next_chunk().await.map(|item| (item, reader))
  }))
}

struct LineReader<S> {
  body: S,
  buffer: Vec<u8>,
  finished: bool,
  endpoint: String,
  idle_timeout: Option<Duration>,
}

impl<S, B, E> LineReader<S>
where
  S: Stream<Item = std::result::Result<B, E>> + Unpin,
  B: AsRef<[u8]>,
  E: std::error::Error,
{
  async fn next_chunk(&mut self) -> Option<Result<GenerationChunk>> {
    loop {
      if let Some(line) = self.take_line() {
        if is_blank(&line) {
          continue;
        }
        return Some(Ok(decode_line(&line)));
      }

      if self.finished {
        let rest = std::mem::take(&mut self.buffer);
        if is_blank(&rest) {
          return None;
        }
        return Some(Ok(decode_line(&rest)));
      }

      if let Err(e) = self.read_more().await {
        self.finished = true;
        self.buffer.clear();
        return Some(Err(e));
      }
    }
  }

  async fn read_more(&mut self) -> Result<()> {
    let next = match self.idle_timeout {
      Some(limit) => tokio::time::timeout(limit, self.body.next())
        .await
        .map_err(|_| WayfinderError::timeout(&self.endpoint, limit.as_secs()))?,
      None => self.body.next().await,
    };

    match next {
      Some(Ok(bytes)) => self.buffer.extend_from_slice(bytes.as_ref()),
      Some(Err(e)) => return Err(WayfinderError::network_failure(&self.endpoint, describe(&e))),
      None => self.finished = true,
    }
    Ok(())
  }

  fn take_line(&mut self) -> Option<Vec<u8>> {
    let end = self.buffer.iter().position(|&b| b == b'\n')?;
    let mut line: Vec<u8> = self.buffer.drain(..=end).collect();
    line.pop();
    if line.last() == Some(&b'\r') {
      line.pop();
    }
    Some(line)
  }
}

fn is_blank(line: &[u8]) -> bool {
  line.iter().all(|b| b.is_ascii_whitespace())
}

/// Decode one line; anything unusable becomes a chunk with no fragment
pub fn decode_line(line: &[u8]) -> GenerationChunk {
  match serde_json::from_slice::<StreamLine>(line) {
    Ok(parsed) => GenerationChunk { fragment: parsed.response, done: parsed.done },
    Err(e) => {
      debug!(error = %e, "skipping undecodable stream line");
      GenerationChunk::default()
    }
  }
}

fn backoff_delay(base_ms: u64, attempt: u32) -> Duration {
  let factor = 1u64 << attempt.min(16);
  Duration::from_millis(base_ms.saturating_mul(factor).min(MAX_BACKOFF_MS))
}

fn request_failure(endpoint: &str, err: &reqwest::Error, connect_secs: u64) -> WayfinderError {
  if err.is_timeout() {
    WayfinderError::timeout(endpoint, connect_secs)
  } else {
    WayfinderError::network_failure(endpoint, describe(err))
  }
}

// reqwest hides the root cause (e.g. "Connection refused") in the source chain
fn describe(err: &dyn std::error::Error) -> String {
  let mut message = err.to_string();
  let mut source = err.source();
  while let Some(cause) = source {
    message.push_str(": ");
    message.push_str(&cause.to_string());
    source = cause.source();
  }
  message
}
