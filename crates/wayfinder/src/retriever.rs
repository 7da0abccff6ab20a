use std::collections::HashSet;

use crate::corpus::Corpus;
use crate::error::{Result, WayfinderError};

/// Jaccard score of one document against the query
#[derive(Debug, Clone, PartialEq)]
pub struct Score {
  pub value: f32,
  /// Both token sets were empty, so the ratio was undefined and `value` is 0
  pub degenerate: bool,
}

/// The document picked for a query
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
  pub index: usize,
  pub document: String,
  pub score: Score,
}

/// Lower-case and split on whitespace. Punctuation stays attached to its word.
pub fn tokenize(text: &str) -> HashSet<String> {
  text.to_lowercase().split_whitespace().map(str::to_string).collect()
}

/// Intersection over union of the two token sets
pub fn jaccard(query: &HashSet<String>, document: &HashSet<String>) -> Score {
  let union = query.union(document).count();
  if union == 0 {
    return Score { value: 0.0, degenerate: true };
  }

  let intersection = query.intersection(document).count();
  Score { value: intersection as f32 / union as f32, degenerate: false }
}

pub fn similarity(query: &str, document: &str) -> Score {
  jaccard(&tokenize(query), &tokenize(document))
}

/// Score every document in corpus order
pub fn rank(query: &str, corpus: &Corpus) -> Vec<Score> {
  let query_tokens = tokenize(query);
  corpus.documents().iter().map(|doc| jaccard(&query_tokens, &tokenize(doc))).collect()
}

/// Pick the highest-scoring document. The earliest one wins a tie.
pub fn select(query: &str, corpus: &Corpus) -> Result<Selection> {
  let mut best: Option<(usize, Score)> = None;

  for (index, score) in rank(query, corpus).into_iter().enumerate() {
    let better = match &best {
      Some((_, current)) => score.value > current.value,
      None => true,
    };
    if better {
      best = Some((index, score));
    }
  }

  let (index, score) = best.ok_or_else(|| WayfinderError::empty_corpus("corpus"))?;
  Ok(Selection { index, document: corpus.documents()[index].clone(), score })
}

#[cfg(test)]
mod tests {
  use super::*;

  fn corpus(documents: &[&str]) -> Corpus {
    Corpus::new(documents.iter().map(|d| d.to_string()).collect(), "test").unwrap()
  }

  #[test]
  fn test_tokenize_lowercases_and_collapses_duplicates() {
    let tokens = tokenize("Go go  GO hiking\tnow");
    assert_eq!(tokens.len(), 3);
    assert!(tokens.contains("go"));
    assert!(tokens.contains("hiking"));
    assert!(tokens.contains("now"));
  }

  #[test]
  fn test_tokenize_keeps_punctuation() {
    let tokens = tokenize("Enjoy the park.");
    assert!(tokens.contains("park."));
    assert!(!tokens.contains("park"));
  }

  #[test]
  fn test_similarity_values() {
    assert_eq!(similarity("go hiking", "go hiking").value, 1.0);
    assert_eq!(similarity("go hiking", "go swimming").value, 1.0 / 3.0);
    assert_eq!(similarity("read", "write").value, 0.0);
  }

  #[test]
  fn test_shared_token_scores_above_zero() {
    let pairs = [
      ("hike", "go for a hike today"),
      ("A", "a"),
      ("museum visit please", "Visit a local museum and discover something new."),
    ];
    for (query, document) in pairs {
      assert!(similarity(query, document).value > 0.0, "{query} vs {document}");
    }
  }

  #[test]
  fn test_both_empty_is_degenerate_zero() {
    let score = similarity("   ", "");
    assert_eq!(score.value, 0.0);
    assert!(score.degenerate);
  }

  #[test]
  fn test_one_side_empty_is_plain_zero() {
    let score = similarity("", "go hiking");
    assert_eq!(score.value, 0.0);
    assert!(!score.degenerate);
  }

  #[test]
  fn test_select_hike_without_stemming_falls_back_to_first() {
    let corpus = corpus(&["go hiking", "go swimming"]);
    let selection = select("I want to hike", &corpus).unwrap();

    assert_eq!(selection.index, 0);
    assert_eq!(selection.document, "go hiking");
    assert_eq!(selection.score.value, 0.0);
  }

  #[test]
  fn test_select_prefers_overlap() {
    let corpus = corpus(&["go swimming", "go hiking"]);
    let selection = select("I want to go hiking", &corpus).unwrap();
    assert_eq!(selection.document, "go hiking");
    assert_eq!(selection.index, 1);
  }

  #[test]
  fn test_select_no_overlap_returns_first() {
    let corpus = corpus(&["bake bread", "paint a mural"]);
    let selection = select("quantum chromodynamics", &corpus).unwrap();
    assert_eq!(selection.document, "bake bread");
    assert!(!selection.score.degenerate);
  }

  #[test]
  fn test_select_tie_returns_first_maximum() {
    let corpus = corpus(&["read", "go hiking", "go swimming"]);
    let selection = select("go", &corpus).unwrap();
    assert_eq!(selection.document, "go hiking");
  }

  #[test]
  fn test_select_degenerate_everywhere() {
    let corpus = corpus(&["", " "]);
    let selection = select("", &corpus).unwrap();
    assert_eq!(selection.index, 0);
    assert!(selection.score.degenerate);
  }

  #[test]
  fn test_select_is_member_and_idempotent() {
    let corpus = Corpus::default();
    let query = "I don't like to hike";

    let first = select(query, &corpus).unwrap();
    let second = select(query, &corpus).unwrap();

    assert_eq!(first, second);
    assert!(corpus.documents().contains(&first.document));
  }

  #[test]
  fn test_select_default_corpus_demo_query() {
    // "hike" is the only token the query shares with any built-in document
    let selection = select("I don't like to hike", &Corpus::default()).unwrap();
    assert_eq!(selection.document, "Go for a hike and admire the natural scenery.");
    assert_eq!(selection.index, 3);
    assert_eq!(selection.score.value, 1.0 / 13.0);
  }

  #[test]
  fn test_rank_keeps_corpus_order() {
    let corpus = corpus(&["go hiking", "go", "swim"]);
    let scores: Vec<f32> = rank("go", &corpus).into_iter().map(|s| s.value).collect();
    assert_eq!(scores, vec![0.5, 1.0, 0.0]);
  }
}
