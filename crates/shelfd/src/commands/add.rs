//! Module for the "add" command: resolve descriptors and download the papers.

use super::*;

/// Arguments that can be used for the [`Commands::Add`]
#[derive(Args, Clone)]
pub struct AddArgs {
  /// Library to add the papers to
  pub library: String,

  /// GitHub repositories, arXiv links or paper titles
  pub descriptors: Vec<String>,

  /// File with one descriptor per line; `#` starts a comment
  #[arg(long, short)]
  pub file: Option<PathBuf>,
}

/// Function for the [`Commands::Add`] in the CLI.
pub async fn add<I: UserInteraction>(
  interaction: &I,
  config: &Config,
  add_args: AddArgs,
) -> Result<()> {
  let AddArgs { library, mut descriptors, file } = add_args;

  let library = Library::open(&config.library_root, &library)?;
  if let Some(file) = file {
    descriptors.extend(load_descriptors(&file)?);
  }
  if descriptors.is_empty() {
    return Err(ShelfdError::Usage(
      "No paper descriptors given, pass them as arguments or with --file".to_string(),
    ));
  }

  interaction
    .reply(ResponseContent::Working(&format!("Resolving {} descriptors", descriptors.len())))?;
  let resolver = Resolver::from_config(config)?;
  let papers = resolver.resolve(&descriptors).await?;
  if papers.is_empty() {
    interaction.reply(ResponseContent::Warning("None of the descriptors could be resolved"))?;
    return Ok(());
  }

  interaction.reply(ResponseContent::Working(&format!(
    "Downloading {} papers into {}",
    papers.len(),
    library.name()
  )))?;
  let added = library.persist(&papers, resolver.client()).await?;
  interaction.reply(ResponseContent::Added(&added))
}
