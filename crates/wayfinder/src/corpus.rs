//! Candidate documents for retrieval.
//!
//! A corpus is an ordered list of short activity descriptions. Order only
//! matters for tie-breaking during retrieval. The built-in corpus is used
//! unless the configuration supplies an inline list or a file.

use std::fs;
use std::path::Path;

use crate::error::{Result, WayfinderError};

// violet ignore chunk
const DEFAULT_DOCUMENTS: &[&str] = &[
  "Take a leisurely walk in the park and enjoy the fresh air.",
  "Visit a local museum and discover something new.",
  "Attend a live music concert and feel the rhythm.",
  "Go for a hike and admire the natural scenery.",
  "Have a picnic with friends and share some laughs.",
  "Explore a new cuisine by dining at an ethnic restaurant.",
  "Take a yoga class and stretch your body and mind.",
  "Join a local sports league and enjoy some friendly competition.",
  "Attend a workshop or lecture on a topic you're interested in.",
  "Visit an amusement park and ride the roller coasters.",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Corpus {
  documents: Vec<String>,
}

impl Default for Corpus {
  fn default() -> Self {
    Self { documents: DEFAULT_DOCUMENTS.iter().map(|d| d.to_string()).collect() }
  }
}

impl Corpus {
  /// Build a corpus from documents in the given order.
  ///
  /// `source_name` only labels the error when `documents` is empty.
  pub fn new(documents: Vec<String>, source_name: &str) -> Result<Self> {
    let corpus = Self { documents };
    if corpus.is_empty() {
      return Err(WayfinderError::empty_corpus(source_name));
    }
    Ok(corpus)
  }

  /// Load a corpus file.
  ///
  /// `.yaml`, `.yml` and `.json` files hold a sequence of strings. Anything
  /// else is read as one document per line, skipping blank lines and lines
  /// starting with `#`.
  pub fn load(path: &Path) -> Result<Self> {
    let content = fs::read_to_string(path).map_err(|e| {
      WayfinderError::config(format!("Failed to read corpus file {}: {e}", path.display()))
    })?;

    let documents = if is_structured(path) {
      parse_structured(&content, path)?
    } else {
      parse_lines(&content)
    };

    Self::new(documents, &path.display().to_string())
  }

  pub fn documents(&self) -> &[String] {
    &self.documents
  }

  pub fn len(&self) -> usize {
    self.documents.len()
  }

  pub fn is_empty(&self) -> bool {
    self.documents.is_empty()
  }
}

fn is_structured(path: &Path) -> bool {
  matches!(
    path.extension().and_then(|ext| ext.to_str()).map(|ext| ext.to_ascii_lowercase()).as_deref(),
    Some("yaml" | "yml" | "json")
  )
}

// YAML is a superset of JSON, so one parser covers both
fn parse_structured(content: &str, path: &Path) -> Result<Vec<String>> {
  if content.trim().is_empty() {
    return Ok(Vec::new());
  }

  serde_yaml::from_str::<Vec<String>>(content).map_err(|e| {
    WayfinderError::config(format!(
      "Corpus file {} must be a list of strings: {e}",
      path.display()
    ))
  })
}

fn parse_lines(content: &str) -> Vec<String> {
  content
    .lines()
    .map(str::trim)
    .filter(|line| !line.is_empty() && !line.starts_with('#'))
    .map(str::to_string)
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::io::Write;
  use tempfile::Builder;

  fn corpus_file(suffix: &str, content: &str) -> tempfile::NamedTempFile {
    let mut file = Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
  }

  #[test]
  fn test_default_corpus_has_ten_activities_in_order() {
    let corpus = Corpus::default();
    assert_eq!(corpus.len(), 10);
    assert_eq!(
      corpus.documents()[0],
      "Take a leisurely walk in the park and enjoy the fresh air."
    );
    assert_eq!(corpus.documents()[9], "Visit an amusement park and ride the roller coasters.");
  }

  #[test]
  fn test_new_rejects_empty() {
    let result = Corpus::new(Vec::new(), "inline");
    assert!(matches!(result, Err(WayfinderError::EmptyCorpus { .. })));
  }

  #[test]
  fn test_load_text_skips_blank_and_comment_lines() {
    let file = corpus_file(".txt", "# activities\ngo hiking\n\n  go swimming  \n");
    let corpus = Corpus::load(file.path()).unwrap();
    assert_eq!(corpus.documents(), ["go hiking", "go swimming"]);
  }

  #[test]
  fn test_load_yaml_sequence() {
    let file = corpus_file(".yaml", "- go hiking\n- \"go swimming\"\n");
    let corpus = Corpus::load(file.path()).unwrap();
    assert_eq!(corpus.documents(), ["go hiking", "go swimming"]);
  }

  #[test]
  fn test_load_json_array() {
    let file = corpus_file(".json", r#"["read a book", "bake bread"]"#);
    let corpus = Corpus::load(file.path()).unwrap();
    assert_eq!(corpus.documents(), ["read a book", "bake bread"]);
  }

  #[test]
  fn test_load_yaml_wrong_shape_is_config_error() {
    let file = corpus_file(".yml", "documents: nope\n");
    let result = Corpus::load(file.path());
    assert!(matches!(result, Err(WayfinderError::Config { .. })));
  }

  #[test]
  fn test_load_only_comments_is_empty_corpus() {
    let file = corpus_file(".txt", "# nothing here\n\n");
    let result = Corpus::load(file.path());
    assert!(matches!(result, Err(WayfinderError::EmptyCorpus { .. })));
  }

  #[test]
  fn test_load_missing_file() {
    let result = Corpus::load(Path::new("/definitely/not/here.txt"));
    let err = result.unwrap_err();
    assert!(err.to_string().contains("Failed to read corpus file"));
  }
}
