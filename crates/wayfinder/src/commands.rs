use anyhow::Result;
use async_trait::async_trait;
use colored::*;
use tracing::info;

use crate::config::Config;
use crate::corpus::Corpus;
use crate::generation::{Generation, GenerationClient, Generator};
use crate::pipeline;
use crate::retriever::{self, Selection};

/// Shows the prompt on stderr before handing it to the wrapped generator
struct ShowPrompt<'a> {
  inner: &'a dyn Generator,
}

#[async_trait]
impl Generator for ShowPrompt<'_> {
  async fn generate(&self, prompt: &str) -> crate::Result<Generation> {
    bentley::banner("prompt", prompt.trim_matches('\n'));
    self.inner.generate(prompt).await
  }
}

/// Retrieve, build the prompt, generate, and print the answer
pub async fn recommend(config: &Config, query: &str, show_prompt: bool) -> Result<()> {
  let corpus = config.corpus()?;
  let client = GenerationClient::new(config.client_config())?;

  let recommendation = if show_prompt {
    pipeline::recommend(query, &corpus, &ShowPrompt { inner: &client }).await?
  } else {
    pipeline::recommend(query, &corpus, &client).await?
  };
  report_selection(&recommendation.selection, corpus.len());

  println!("{}", recommendation.generation.text);
  Ok(())
}

/// Print the document that would be used for `query`
pub fn retrieve(config: &Config, query: &str, all: bool) -> Result<()> {
  let corpus = config.corpus()?;
  let selection = retriever::select(query, &corpus)?;
  report_selection(&selection, corpus.len());

  if all {
    display_ranking(query, &corpus, selection.index);
  } else {
    bentley::info!(
      "Similarity {:.3} (document {} of {})",
      selection.score.value,
      selection.index + 1,
      corpus.len()
    );
    println!("{}", selection.document);
  }
  Ok(())
}

/// Print the prompt that would be sent for `query`
pub fn prompt(config: &Config, query: &str) -> Result<()> {
  let corpus = config.corpus()?;
  let (selection, prompt) = pipeline::prepare(query, &corpus)?;
  report_selection(&selection, corpus.len());

  print!("{prompt}");
  Ok(())
}

fn report_selection(selection: &Selection, corpus_len: usize) {
  if selection.score.degenerate {
    bentley::warn!("Query and document are both empty; similarity is undefined and was scored 0");
  } else if selection.score.value == 0.0 {
    bentley::warn!("No document shares a word with the query; falling back to the first one");
  }

  info!(
    "Selected document {} of {} (similarity {:.3})",
    selection.index + 1,
    corpus_len,
    selection.score.value
  );
}

fn display_ranking(query: &str, corpus: &Corpus, selected: usize) {
  let scores = retriever::rank(query, corpus);

  for (index, (document, score)) in corpus.documents().iter().zip(scores).enumerate() {
    let line = format!("{:.3}  {}", score.value, document);
    if index == selected {
      println!("{} {}", "*".green().bold(), line.bold());
    } else {
      println!("  {line}");
    }
  }
}
