//! Module for the "papers" command: list the papers of a library.

use super::*;

/// Arguments for [`Commands::Papers`]
#[derive(Args, Clone)]
pub struct PapersArgs {
  /// Library to list
  pub library: String,

  /// Print the papers as JSON
  #[arg(long)]
  pub json: bool,
}

/// Function for the [`Commands::Papers`] in the CLI.
pub async fn papers<I: UserInteraction>(
  interaction: &I,
  config: &Config,
  papers_args: PapersArgs,
) -> Result<()> {
  let PapersArgs { library, json } = papers_args;
  let papers = Library::open(&config.library_root, &library)?.papers()?;

  if json {
    interaction.reply(ResponseContent::Json(&serde_json::to_string_pretty(&papers)?))
  } else {
    interaction.reply(ResponseContent::Papers(&papers))
  }
}
