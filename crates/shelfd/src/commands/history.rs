//! Module for the "history" command: browse question sessions.

use super::*;

/// Arguments for [`Commands::History`]
#[derive(Args, Clone)]
pub struct HistoryArgs {
  /// Session to show in full; lists all sessions when left out
  pub session: Option<String>,

  /// Print as JSON
  #[arg(long)]
  pub json: bool,
}

/// Function for the [`Commands::History`] in the CLI.
pub async fn history<I: UserInteraction>(
  interaction: &I,
  config: &Config,
  history_args: HistoryArgs,
) -> Result<()> {
  let HistoryArgs { session, json } = history_args;
  let history = History::new(&config.history_root);

  match (session, json) {
    (Some(id), false) => interaction.reply(ResponseContent::Session(&history.get(&id)?)),
    (Some(id), true) =>
      interaction.reply(ResponseContent::Json(&serde_json::to_string_pretty(&history.get(&id)?)?)),
    (None, false) => interaction.reply(ResponseContent::Sessions(&history.list()?)),
    (None, true) =>
      interaction.reply(ResponseContent::Json(&serde_json::to_string_pretty(&history.list()?)?)),
  }
}
