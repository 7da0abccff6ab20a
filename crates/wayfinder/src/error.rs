use thiserror::Error;

pub type Result<T> = std::result::Result<T, WayfinderError>;

#[derive(Error, Debug)]
pub enum WayfinderError {
  #[error("Corpus is empty: {source_name} contains no documents")]
  EmptyCorpus { source_name: String },

  #[error("Network failure talking to {endpoint}: {message}")]
  NetworkFailure { endpoint: String, message: String },

  #[error("Generation service at {endpoint} timed out after {secs}s")]
  Timeout { endpoint: String, secs: u64 },

  #[error("Generation service at {endpoint} returned {status}: {body}")]
  Status { endpoint: String, status: u16, body: String },

  #[error("Invalid configuration: {message}")]
  Config { message: String },

  #[error("I/O error: {0}")]
  Io(#[from] std::io::Error),
}

impl WayfinderError {
  pub fn empty_corpus(source_name: impl Into<String>) -> Self {
    Self::EmptyCorpus { source_name: source_name.into() }
  }

  pub fn network_failure(endpoint: impl Into<String>, message: impl Into<String>) -> Self {
    Self::NetworkFailure { endpoint: endpoint.into(), message: message.into() }
  }

  pub fn timeout(endpoint: impl Into<String>, secs: u64) -> Self {
    Self::Timeout { endpoint: endpoint.into(), secs }
  }

  pub fn status(endpoint: impl Into<String>, status: u16, body: impl Into<String>) -> Self {
    Self::Status { endpoint: endpoint.into(), status, body: body.into() }
  }

  pub fn config(message: impl Into<String>) -> Self {
    Self::Config { message: message.into() }
  }

  /// Failures worth retrying when they happen before any stream data arrives
  pub fn is_transient(&self) -> bool {
    match self {
      Self::NetworkFailure { .. } | Self::Timeout { .. } => true,
      Self::Status { status, .. } => *status >= 500,
      _ => false,
    }
  }
}
