//! Module for the "remove" command: delete a paper folder.

use super::*;

/// Arguments for [`Commands::Remove`]
#[derive(Args, Clone)]
pub struct RemoveArgs {
  /// Library holding the paper
  pub library: String,

  /// Entry name of the paper, as shown by `shelf papers`
  pub entry: String,
}

/// Function for the [`Commands::Remove`] in the CLI.
pub async fn remove<I: UserInteraction>(
  interaction: &I,
  config: &Config,
  remove_args: RemoveArgs,
) -> Result<()> {
  let RemoveArgs { library, entry } = remove_args;
  let library = Library::open(&config.library_root, &library)?;

  if !interaction.confirm(&format!("Remove {entry} from {}?", library.name()))? {
    return interaction.reply(ResponseContent::Info("Operation cancelled"));
  }
  library.remove_paper(&entry)?;
  interaction.reply(ResponseContent::Success(&format!("Removed {entry}")))
}
