//! Configuration management for Wayfinder
//!
//! Settings come from, in increasing priority: built-in defaults, a YAML
//! config file, environment variables, and command line flags. The last two
//! are resolved by the CLI and arrive here as [`Overrides`].

use serde::Deserialize;
use std::path::{Path, PathBuf};
use url::Url;

use crate::corpus::Corpus;
use crate::error::{Result, WayfinderError};
use crate::generation::{ClientConfig, DEFAULT_ENDPOINT, DEFAULT_MODEL};

pub const DEFAULT_QUERY: &str = "I don't like to hike";

const LOCAL_CONFIG_FILE: &str = "wayfinder.yaml";

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Config {
  /// URL of the generate endpoint
  #[serde(default = "default_endpoint")]
  pub endpoint: String,
  /// Model identifier passed to the service
  #[serde(default = "default_model")]
  pub model: String,
  /// Query used when none is given on the command line
  #[serde(default = "default_query")]
  pub query: String,
  #[serde(default = "default_timeout_secs")]
  pub timeout_secs: u64,
  #[serde(default = "default_connect_timeout_secs")]
  pub connect_timeout_secs: u64,
  #[serde(default = "default_retries")]
  pub retries: u32,
  #[serde(default = "default_backoff_ms")]
  pub backoff_ms: u64,
  /// Inline corpus documents
  #[serde(default)]
  pub corpus: Option<Vec<String>>,
  /// Corpus file; relative paths resolve against the config file's directory
  #[serde(default)]
  pub corpus_file: Option<PathBuf>,
}

// Default value functions
fn default_endpoint() -> String {
  DEFAULT_ENDPOINT.to_string()
}
fn default_model() -> String {
  DEFAULT_MODEL.to_string()
}
fn default_query() -> String {
  DEFAULT_QUERY.to_string()
}
fn default_timeout_secs() -> u64 {
  30
}
fn default_connect_timeout_secs() -> u64 {
  5
}
fn default_retries() -> u32 {
  2
}
fn default_backoff_ms() -> u64 {
  250
}

impl Default for Config {
  fn default() -> Self {
    Self {
      endpoint: default_endpoint(),
      model: default_model(),
      query: default_query(),
      timeout_secs: default_timeout_secs(),
      connect_timeout_secs: default_connect_timeout_secs(),
      retries: default_retries(),
      backoff_ms: default_backoff_ms(),
      corpus: None,
      corpus_file: None,
    }
  }
}

/// Values that take precedence over the config file
#[derive(Debug, Clone, Default)]
pub struct Overrides {
  pub endpoint: Option<String>,
  pub model: Option<String>,
  pub timeout_secs: Option<u64>,
  pub retries: Option<u32>,
  pub corpus_file: Option<PathBuf>,
}

impl Config {
  /// Load configuration from a YAML file
  pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| {
      WayfinderError::config(format!("Failed to read config file {}: {e}", path.display()))
    })?;

    let mut config: Config = if content.trim().is_empty() {
      Config::default()
    } else {
      serde_yaml::from_str(&content).map_err(|e| {
        WayfinderError::config(format!("Failed to parse config file {}: {e}", path.display()))
      })?
    };

    let base = path.parent().unwrap_or(Path::new(""));
    config.corpus_file = config.corpus_file.take().map(|file| base.join(file));

    Ok(config)
  }

  /// Load the first config file found, or defaults when there is none
  pub fn load(explicit: Option<&Path>) -> Result<Self> {
    let cwd = std::env::current_dir()?;
    let user_dir = dirs::config_dir().map(|dir| dir.join("wayfinder"));

    match locate(explicit, &cwd, user_dir.as_deref())? {
      Some(path) => Self::load_from_file(path),
      None => Ok(Config::default()),
    }
  }

  pub fn apply(mut self, overrides: Overrides) -> Self {
    if let Some(endpoint) = overrides.endpoint {
      self.endpoint = endpoint;
    }
    if let Some(model) = overrides.model {
      self.model = model;
    }
    if let Some(timeout_secs) = overrides.timeout_secs {
      self.timeout_secs = timeout_secs;
    }
    if let Some(retries) = overrides.retries {
      self.retries = retries;
    }
    if let Some(corpus_file) = overrides.corpus_file {
      self.corpus_file = Some(corpus_file);
      self.corpus = None;
    }
    self
  }

  pub fn validate(&self) -> Result<()> {
    let url = Url::parse(&self.endpoint).map_err(|e| {
      WayfinderError::config(format!("Invalid endpoint URL '{}': {e}", self.endpoint))
    })?;
    if !matches!(url.scheme(), "http" | "https") {
      return Err(WayfinderError::config(format!(
        "Endpoint must use http or https, got '{}'",
        url.scheme()
      )));
    }

    if self.model.trim().is_empty() {
      return Err(WayfinderError::config("Model name must not be empty"));
    }
    if self.timeout_secs == 0 {
      return Err(WayfinderError::config("timeout_secs must be at least 1"));
    }
    if self.corpus.is_some() && self.corpus_file.is_some() {
      return Err(WayfinderError::config("Set either corpus or corpus_file, not both"));
    }

    Ok(())
  }

  /// The configured corpus, or the built-in one
  pub fn corpus(&self) -> Result<Corpus> {
    match (&self.corpus, &self.corpus_file) {
      (_, Some(path)) => Corpus::load(path),
      (Some(documents), None) => Corpus::new(documents.clone(), "config corpus"),
      (None, None) => Ok(Corpus::default()),
    }
  }

  pub fn client_config(&self) -> ClientConfig {
    ClientConfig {
      endpoint: self.endpoint.clone(),
      model: self.model.clone(),
      timeout_secs: self.timeout_secs,
      connect_timeout_secs: self.connect_timeout_secs,
      retries: self.retries,
      backoff_ms: self.backoff_ms,
    }
  }
}

/// Find the config file to use.
///
/// An explicit path must exist. Otherwise `wayfinder.yaml` in `cwd` is tried,
/// then `config.yaml` in `user_dir`.
pub fn locate(
  explicit: Option<&Path>,
  cwd: &Path,
  user_dir: Option<&Path>,
) -> Result<Option<PathBuf>> {
  if let Some(path) = explicit {
    if !path.is_file() {
      return Err(WayfinderError::config(format!(
        "Config file does not exist: {}",
        path.display()
      )));
    }
    return Ok(Some(path.to_path_buf()));
  }

  let mut candidates =
    std::iter::once(cwd.join(LOCAL_CONFIG_FILE)).chain(user_dir.map(|dir| dir.join("config.yaml")));

  Ok(candidates.find(|path| path.is_file()))
}
