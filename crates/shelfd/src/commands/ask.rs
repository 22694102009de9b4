//! Module for the "ask" command: question papers through the LLM.

use super::*;

/// Arguments for [`Commands::Ask`]
#[derive(Args, Clone)]
pub struct AskArgs {
  /// Library holding the papers
  pub library: String,

  /// The question to ask every paper
  pub question: String,

  /// Entry names of the papers to ask; every paper when left out
  #[arg(long = "paper", short)]
  pub papers: Vec<String>,
}

/// Function for the [`Commands::Ask`] in the CLI.
pub async fn ask<I: UserInteraction>(
  interaction: &I,
  config: &Config,
  ask_args: AskArgs,
) -> Result<()> {
  let AskArgs { library, question, papers } = ask_args;
  if question.trim().is_empty() {
    return Err(ShelfdError::Usage("The question is empty".to_string()));
  }

  let library = Library::open(&config.library_root, &library)?;
  let reader = GeminiReader::from_config(config)?;
  let history = History::new(&config.history_root);

  let target = if papers.is_empty() { "every paper".to_string() } else { papers.join(", ") };
  interaction.reply(ResponseContent::Working(&format!(
    "Asking {target} in {} with {}",
    library.name(),
    reader.model()
  )))?;

  let session = history.ask(&library, &reader, &question, &papers).await?;
  interaction.reply(ResponseContent::Session(&session))?;
  interaction.reply(ResponseContent::Info(&format!("Saved as {}", session.metadata.id)))
}
