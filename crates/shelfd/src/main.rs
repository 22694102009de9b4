//! Command line interface for the shelf research-paper manager.
//!
//! This crate provides the `shelf` binary on top of the [`shelf`] library. It supports:
//! - Creating, listing and deleting libraries
//! - Adding papers from GitHub repositories, arXiv links and titles
//! - Uploading local PDFs
//! - Searching the paper feed
//! - Asking questions about stored papers and browsing past sessions
//!
//! # Usage
//!
//! ```bash
//! # Write a configuration
//! shelf init
//!
//! # Create a library and fill it
//! shelf library create talking-heads
//! shelf add talking-heads https://github.com/Zejun-Yang/AniPortrait "Attention Is All You Need"
//! shelf add talking-heads --file papers.txt
//!
//! # Ask every paper in the library a question
//! shelf ask talking-heads "What problem does this paper try to solve?"
//! shelf history
//! ```
//!
//! Destructive operations ask for confirmation unless `--accept-defaults` is given.
//! Logging goes to stderr; use `-v` repeatedly for more detail.

#![warn(missing_docs, clippy::missing_docs_in_private_items)]

use std::path::PathBuf;

use clap::{builder::ArgAction, Args, Parser, Subcommand};
use console::style;
use shelf::{
  config::Config,
  descriptor::load_descriptors,
  history::History,
  library::{list_libraries, Library},
  llm::GeminiReader,
  resolver::Resolver,
  search::SearchClient,
};
use tracing::{debug, trace};
use tracing_subscriber::EnvFilter;

pub mod commands;
pub mod error;
pub mod interaction;

use crate::{commands::*, error::*, interaction::*};

/// Command line interface configuration and argument parsing
#[derive(Parser)]
#[command(author, version, about = "Keep a shelf of research papers and ask them questions")]
pub struct Cli {
  /// Verbose mode (-v, -vv, -vvv) for different levels of logging detail
  #[arg(
        short,
        long,
        action = ArgAction::Count,
        global = true,
        help = "Increase logging verbosity"
    )]
  verbose: u8,

  /// Path to the configuration file. If not specified, uses the default
  /// platform-specific config directory.
  #[arg(long, short, global = true)]
  config: Option<PathBuf>,

  /// The subcommand to execute
  #[command(subcommand)]
  command: Commands,

  /// Skip all prompts and accept defaults (mostly for testing)
  #[arg(long, hide = true, global = true)]
  accept_defaults: bool,
}

impl Cli {
  /// The configuration file in use.
  fn config_path(&self) -> PathBuf { self.config.clone().unwrap_or_else(Config::default_path) }

  /// Loads the configuration, falling back to the defaults when there is no file.
  fn load_config(&self) -> Result<Config> {
    let path = self.config_path();
    trace!("Using configuration at: {}", path.display());
    Ok(Config::load_or_default(&path)?)
  }
}

/// Configures the logging system based on the verbosity level
///
/// # Arguments
///
/// * `verbosity` - Number of times the verbose flag was used
///
/// The verbosity levels are:
/// - 0: error (default)
/// - 1: warn
/// - 2: info
/// - 3: debug
/// - 4+: trace
fn setup_logging(verbosity: u8) {
  let filter = match verbosity {
    0 => "error",
    1 => "warn",
    2 => "info",
    3 => "debug",
    _ => "trace",
  };

  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .with_file(true)
    .with_line_number(true)
    .with_target(true)
    .init();
}

/// Dispatches the parsed command.
async fn run<I: UserInteraction>(cli: &Cli, interaction: &I) -> Result<()> {
  if let Commands::Init(init_args) = &cli.command {
    return init(interaction, cli.config_path(), init_args.clone()).await;
  }

  let config = cli.load_config()?;
  match cli.command.clone() {
    Commands::Init(_) => Ok(()),
    Commands::Library { cmd } => library(interaction, &config, cmd).await,
    Commands::Add(add_args) => add(interaction, &config, add_args).await,
    Commands::Upload(upload_args) => upload(interaction, &config, upload_args).await,
    Commands::Papers(papers_args) => papers(interaction, &config, papers_args).await,
    Commands::Remove(remove_args) => remove(interaction, &config, remove_args).await,
    Commands::Search(search_args) => search(interaction, &config, search_args).await,
    Commands::Ask(ask_args) => ask(interaction, &config, ask_args).await,
    Commands::History(history_args) => history(interaction, &config, history_args).await,
  }
}

/// Entry point for the shelf CLI application
///
/// Parses arguments, sets up logging and runs the requested command. Failures are
/// reported on stderr and end the process with a non-zero exit code.
#[tokio::main]
async fn main() {
  let cli = Cli::parse();
  setup_logging(cli.verbose);

  let interaction = Terminal::new(cli.accept_defaults);
  if let Err(e) = run(&cli, &interaction).await {
    debug!("Command failed: {e:?}");
    if interaction.reply(ResponseContent::Error(e)).is_err() {
      eprintln!("{} Failed to report the error", style(ERROR_PREFIX).red());
    }
    std::process::exit(1);
  }
}
