//! Module for the "upload" command: copy local PDFs into a library.

use super::*;

/// Arguments for [`Commands::Upload`]
#[derive(Args, Clone)]
pub struct UploadArgs {
  /// Library to upload into
  pub library: String,

  /// PDF files or glob patterns such as `papers/*.pdf`
  #[arg(required = true)]
  pub pdfs: Vec<String>,
}

/// Function for the [`Commands::Upload`] in the CLI.
pub async fn upload<I: UserInteraction>(
  interaction: &I,
  config: &Config,
  upload_args: UploadArgs,
) -> Result<()> {
  let UploadArgs { library, pdfs } = upload_args;
  let library = Library::open(&config.library_root, &library)?;

  let mut files = Vec::new();
  for pattern in &pdfs {
    let matches: Vec<PathBuf> = glob::glob(pattern)?.flatten().collect();
    if matches.is_empty() {
      interaction.reply(ResponseContent::Warning(&format!("No file matches {pattern}")))?;
    }
    files.extend(matches);
  }

  let mut uploaded = Vec::new();
  for file in files {
    if !file.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("pdf")) {
      interaction
        .reply(ResponseContent::Warning(&format!("Skipping {}, not a PDF", file.display())))?;
      continue;
    }
    uploaded.push(library.import_pdf(&file)?);
  }
  interaction.reply(ResponseContent::Added(&uploaded))
}
