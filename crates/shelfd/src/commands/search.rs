//! Module for the "search" command against the paper feed.

use super::*;

/// Arguments for [`Commands::Search`]
#[derive(Args, Clone)]
pub struct SearchArgs {
  /// Keyword or title to look for
  pub keyword: String,

  /// Only show the first results
  #[arg(long, short)]
  pub limit: Option<usize>,
}

/// Function for the [`Commands::Search`] in the CLI.
pub async fn search<I: UserInteraction>(
  interaction: &I,
  config: &Config,
  search_args: SearchArgs,
) -> Result<()> {
  let SearchArgs { keyword, limit } = search_args;

  interaction.reply(ResponseContent::Info(&format!("Searching for: {keyword}")))?;
  let mut results =
    SearchClient::new().with_endpoint(&config.search_endpoint).search(&keyword).await?;
  if let Some(limit) = limit {
    results.truncate(limit);
  }
  interaction.reply(ResponseContent::SearchResults(&results))
}
