//! Retrieve, augment, generate.

use tracing::debug;

use crate::corpus::Corpus;
use crate::error::Result;
use crate::generation::{Generation, Generator};
use crate::prompt;
use crate::retriever::{self, Selection};

/// Everything one run produced
#[derive(Debug, Clone, PartialEq)]
pub struct Recommendation {
  pub selection: Selection,
  pub prompt: String,
  pub generation: Generation,
}

/// Select a document and build the prompt for it, without generating
pub fn prepare(query: &str, corpus: &Corpus) -> Result<(Selection, String)> {
  let selection = retriever::select(query, corpus)?;
  debug!(
    index = selection.index,
    score = selection.score.value,
    degenerate = selection.score.degenerate,
    "selected document"
  );

  let prompt = prompt::build(&selection.document, query);
  Ok((selection, prompt))
}

/// Run the whole pipeline for one query
pub async fn recommend(
  query: &str,
  corpus: &Corpus,
  generator: &dyn Generator,
) -> Result<Recommendation> {
  let (selection, prompt) = prepare(query, corpus)?;
  let generation = generator.generate(&prompt).await?;

  Ok(Recommendation { selection, prompt, generation })
}
