//! Module for setting up a [`shelf`] configuration

use shelf::config::API_KEY_VAR;

use super::*;

/// Arguments for [`Commands::Init`]
#[derive(Args, Clone)]
pub struct InitArgs {
  /// Directory holding the libraries
  #[arg(long)]
  pub library_root: Option<PathBuf>,

  /// Directory holding past question sessions
  #[arg(long)]
  pub history_root: Option<PathBuf>,

  /// Gemini API key; leave out to read it from the environment
  #[arg(long)]
  pub api_key: Option<String>,
}

/// Function for the [`Commands::Init`] in the CLI.
pub async fn init<I: UserInteraction>(
  interaction: &I,
  config_path: PathBuf,
  init_args: InitArgs,
) -> Result<()> {
  let InitArgs { library_root, history_root, api_key } = init_args;

  if config_path.exists()
    && !interaction.confirm(&format!(
      "A configuration already exists at {}, do you want to overwrite it?",
      config_path.display()
    ))?
  {
    interaction.reply(ResponseContent::Info("Keeping the existing configuration"))?;
    return Ok(());
  }

  let mut config = Config::default();
  if let Some(library_root) = library_root {
    config = config.with_library_root(&library_root);
  }
  if let Some(history_root) = history_root {
    config = config.with_history_root(&history_root);
  }

  let api_key = match api_key {
    Some(api_key) => Some(api_key),
    None if std::env::var(API_KEY_VAR).is_ok() => None,
    None => {
      let entered = interaction.prompt(&format!(
        "Gemini API key (leave empty to read {API_KEY_VAR} at runtime)"
      ))?;
      Some(entered.trim().to_string()).filter(|key| !key.is_empty())
    },
  };
  if let Some(api_key) = api_key {
    config = config.with_api_key(&api_key);
  }

  config.save(&config_path)?;
  config.ensure_directories()?;
  interaction.reply(ResponseContent::Success(&format!(
    "Created shelf configuration at {}\nLibraries: {}\nHistory: {}",
    config_path.display(),
    config.library_root.display(),
    config.history_root.display(),
  )))?;
  Ok(())
}
