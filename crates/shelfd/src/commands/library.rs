//! Library management commands.

use super::*;

/// Subcommands of [`Commands::Library`]
#[derive(Subcommand, Clone)]
pub enum LibraryCommands {
  /// Create an empty library
  Create {
    /// Library name, reduced to filesystem-safe characters
    name: String,
  },

  /// Delete a library and every paper in it
  Delete {
    /// Library name
    name: String,
  },

  /// List all libraries
  List,
}

/// Function for the [`Commands::Library`] in the CLI.
pub async fn library<I: UserInteraction>(
  interaction: &I,
  config: &Config,
  cmd: LibraryCommands,
) -> Result<()> {
  match cmd {
    LibraryCommands::Create { name } => {
      let library = Library::create(&config.library_root, &name)?;
      interaction.reply(ResponseContent::Success(&format!(
        "Created library {} at {}",
        library.name(),
        library.path().display()
      )))
    },
    LibraryCommands::Delete { name } => {
      let library = Library::open(&config.library_root, &name)?;
      let count = library.papers()?.len();
      if !interaction
        .confirm(&format!("Delete library {} and its {count} papers?", library.name()))?
      {
        return interaction.reply(ResponseContent::Info("Operation cancelled"));
      }
      Library::delete(&config.library_root, library.name())?;
      interaction.reply(ResponseContent::Success(&format!("Deleted library {}", library.name())))
    },
    LibraryCommands::List => {
      let libraries = list_libraries(&config.library_root)?;
      interaction.reply(ResponseContent::Libraries(&libraries))
    },
  }
}
