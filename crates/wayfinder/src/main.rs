use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use wayfinder::commands;
use wayfinder::config::{Config, Overrides};

#[derive(Parser)]
#[command(name = "wayfinder")]
#[command(
  about = "Wayfinder - Activity Recommendations\nPicks the closest activity from a corpus and asks a local model to recommend it"
)]
#[command(version = concat!(env!("CARGO_PKG_VERSION"), ", courtesy of Kernelle Software"))]
struct Cli {
  #[command(flatten)]
  global: GlobalArgs,

  #[command(subcommand)]
  command: Command,
}

#[derive(Args)]
struct GlobalArgs {
  /// Config file path
  #[arg(short, long, global = true, env = "WAYFINDER_CONFIG")]
  config: Option<PathBuf>,
  /// Corpus file: one activity per line, or a YAML/JSON list
  #[arg(long, global = true, env = "WAYFINDER_CORPUS")]
  corpus: Option<PathBuf>,
  /// Enable verbose logging
  #[arg(short, long, global = true)]
  verbose: bool,
}

/// The user's query
#[derive(Args)]
struct QueryArgs {
  /// Query words (defaults to the configured query)
  query: Vec<String>,
}

/// Generation service settings
#[derive(Args)]
struct ServiceArgs {
  /// URL of the generate endpoint
  #[arg(long, env = "WAYFINDER_ENDPOINT")]
  endpoint: Option<String>,
  /// Model identifier
  #[arg(short, long, env = "WAYFINDER_MODEL")]
  model: Option<String>,
  /// Seconds to wait for the response to start and between streamed lines
  #[arg(long)]
  timeout: Option<u64>,
  /// Retries for transient failures before the response starts
  #[arg(long)]
  retries: Option<u32>,
}

// violet ignore chunk
#[derive(Subcommand)]
enum Command {
  /// Recommend an activity using the local model
  Recommend {
    #[command(flatten)]
    query: QueryArgs,
    #[command(flatten)]
    service: ServiceArgs,
    /// Print the prompt to stderr before generating
    #[arg(long)]
    show_prompt: bool,
  },
  /// Show the corpus document closest to the query
  Retrieve {
    #[command(flatten)]
    query: QueryArgs,
    /// List every document with its similarity
    #[arg(short, long)]
    all: bool,
  },
  /// Print the prompt that would be sent to the model
  Prompt {
    #[command(flatten)]
    query: QueryArgs,
  },
}

fn resolve_query(args: &QueryArgs, config: &Config) -> String {
  if args.query.is_empty() {
    config.query.clone()
  } else {
    args.query.join(" ")
  }
}

fn load_config(global: &GlobalArgs, service: Option<&ServiceArgs>) -> Result<Config> {
  let mut overrides = Overrides { corpus_file: global.corpus.clone(), ..Overrides::default() };
  if let Some(service) = service {
    overrides.endpoint = service.endpoint.clone();
    overrides.model = service.model.clone();
    overrides.timeout_secs = service.timeout;
    overrides.retries = service.retries;
  }

  let config = Config::load(global.config.as_deref())?.apply(overrides);
  config.validate()?;
  Ok(config)
}

async fn handle(cli: Cli) -> Result<()> {
  match cli.command {
    Command::Recommend { query, service, show_prompt } => {
      let config = load_config(&cli.global, Some(&service))?;
      commands::recommend(&config, &resolve_query(&query, &config), show_prompt).await
    }
    Command::Retrieve { query, all } => {
      let config = load_config(&cli.global, None)?;
      commands::retrieve(&config, &resolve_query(&query, &config), all)
    }
    Command::Prompt { query } => {
      let config = load_config(&cli.global, None)?;
      commands::prompt(&config, &resolve_query(&query, &config))
    }
  }
}

#[tokio::main]
async fn main() {
  let cli = Cli::parse();
  bentley::init_tracing(cli.global.verbose, "wayfinder=debug", "wayfinder=warn");

  if let Err(e) = handle(cli).await {
    bentley::error!("{e:#}");
    std::process::exit(1);
  }
}
