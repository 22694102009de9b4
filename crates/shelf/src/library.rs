//! Libraries of papers on disk.
//!
//! A library is a directory under the library root. Each paper lives in a folder of
//! its own, named after the paper's entry name:
//!
//! ```text
//! <library root>/
//! └── talking-heads/
//!     └── AniPortrait_Audio-Driven_Synthesis_of_Photorealist/
//!         ├── AniPortrait_Audio-Driven_Synthesis_of_Photorealist.pdf
//!         └── info.json
//! ```
//!
//! `info.json` is written last and marks the folder as complete. Folders without it
//! are leftovers of an interrupted download; they are ignored when listing papers and
//! overwritten by the next [`Library::persist`].

use serde_json::ser::PrettyFormatter;
use tokio::io::AsyncWriteExt;

use crate::{
  arxiv::ArxivLinks,
  format::{entry_name, format_title},
  resolver::ResolvedPaper,
};

use super::*;

/// Name of the per-paper metadata file.
pub const INFO_FILE: &str = "info.json";

/// Metadata stored in a paper folder's `info.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaperInfo {
  /// Paper title
  pub title:       String,
  /// arXiv abstract page, absent for uploaded PDFs
  pub arxiv_url:   Option<String>,
  /// Source repository, if any
  pub github_repo: Option<String>,
  /// Where the PDF was downloaded from, absent for uploaded PDFs
  pub pdf_url:     Option<String>,
  /// Folder name and PDF base name
  pub entry_name:  String,
}

/// Titles with nothing filesystem-safe in them fall back to the arXiv identifier.
impl From<&ResolvedPaper> for PaperInfo {
  fn from(paper: &ResolvedPaper) -> Self {
    let mut name = entry_name(&paper.title);
    if name.is_empty() {
      if let Ok(links) = ArxivLinks::parse(&paper.arxiv_url) {
        name = entry_name(links.id());
      }
    }

    Self {
      title:       paper.title.clone(),
      arxiv_url:   Some(paper.arxiv_url.clone()),
      github_repo: paper.github_repo.clone(),
      pdf_url:     Some(paper.pdf_url.clone()),
      entry_name:  name,
    }
  }
}

/// A completed paper folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredPaper {
  /// Contents of `info.json`
  #[serde(flatten)]
  pub info: PaperInfo,
  /// Absolute path of the PDF
  pub path: PathBuf,
  /// PDF size in bytes
  pub size: u64,
}

/// A library as reported by [`list_libraries`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibrarySummary {
  /// Library name
  pub name:    String,
  /// Number of paper folders, finished or not
  pub count:   usize,
  /// When the library directory was created
  pub created: DateTime<Local>,
}

/// A library directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Library {
  name: String,
  path: PathBuf,
}

impl Library {
  /// Creates a new, empty library under `root`.
  ///
  /// The name is reduced to filesystem-safe characters first.
  ///
  /// # Errors
  ///
  /// - [`ShelfError::InvalidName`] if nothing of the name survives sanitizing
  /// - [`ShelfError::LibraryExists`] if the library is already there
  pub fn create(root: impl AsRef<Path>, name: &str) -> Result<Self> {
    let name = library_name(name)?;
    let path = root.as_ref().join(&name);
    if path.exists() {
      return Err(ShelfError::LibraryExists(name));
    }

    std::fs::create_dir_all(&path)?;
    info!("Created library {name} at {}", path.display());
    Ok(Self { name, path })
  }

  /// Opens an existing library under `root`.
  pub fn open(root: impl AsRef<Path>, name: &str) -> Result<Self> {
    let name = library_name(name)?;
    let path = root.as_ref().join(&name);
    if !path.is_dir() {
      return Err(ShelfError::LibraryNotFound(name));
    }
    Ok(Self { name, path })
  }

  /// Deletes a library and everything in it.
  pub fn delete(root: impl AsRef<Path>, name: &str) -> Result<()> {
    let library = Self::open(root, name)?;
    std::fs::remove_dir_all(&library.path)?;
    info!("Deleted library {}", library.name);
    Ok(())
  }

  /// The sanitized library name.
  pub fn name(&self) -> &str { &self.name }

  /// The library directory.
  pub fn path(&self) -> &Path { &self.path }

  /// The folder a paper with this entry name lives in.
  pub fn paper_folder(&self, entry_name: &str) -> PathBuf { self.path.join(entry_name) }

  /// Every completed paper, ordered by entry name.
  ///
  /// Folders whose metadata cannot be read are logged and skipped.
  pub fn papers(&self) -> Result<Vec<StoredPaper>> {
    let mut folders = Vec::new();
    for entry in std::fs::read_dir(&self.path)? {
      let folder = entry?.path();
      if folder.is_dir() && folder.join(INFO_FILE).exists() {
        folders.push(folder);
      }
    }
    folders.sort();

    Ok(
      folders
        .into_iter()
        .filter_map(|folder| match read_paper(&folder) {
          Ok(paper) => Some(paper),
          Err(e) => {
            warn!("Error processing {}: {e}", folder.display());
            None
          },
        })
        .collect(),
    )
  }

  /// A single completed paper.
  pub fn paper(&self, entry_name: &str) -> Result<StoredPaper> {
    let folder = self.paper_folder(&format_title(entry_name, None));
    if !folder.join(INFO_FILE).exists() {
      return Err(ShelfError::PaperNotFound(entry_name.to_string()));
    }
    read_paper(&folder)
  }

  /// Deletes a paper folder, finished or not.
  pub fn remove_paper(&self, entry_name: &str) -> Result<()> {
    let safe_name = format_title(entry_name, None);
    let folder = self.paper_folder(&safe_name);
    if safe_name.is_empty() || !folder.is_dir() {
      return Err(ShelfError::PaperNotFound(entry_name.to_string()));
    }
    std::fs::remove_dir_all(&folder)?;
    info!("Removed {safe_name} from {}", self.name);
    Ok(())
  }

  /// Copies a local PDF into the library.
  ///
  /// The folder is named after the sanitized file stem, which also serves as title.
  /// An existing folder of that name is overwritten.
  pub fn import_pdf(&self, pdf: impl AsRef<Path>) -> Result<PaperInfo> {
    let pdf = pdf.as_ref();
    let stem = pdf.file_stem().map(|stem| stem.to_string_lossy()).unwrap_or_default();
    let name = format_title(&stem, None);
    if name.is_empty() {
      return Err(ShelfError::InvalidName(pdf.display().to_string()));
    }

    let folder = self.paper_folder(&name);
    std::fs::create_dir_all(&folder)?;
    std::fs::copy(pdf, folder.join(format!("{name}.pdf")))?;

    let info = PaperInfo {
      title:       name.clone(),
      arxiv_url:   None,
      github_repo: None,
      pdf_url:     None,
      entry_name:  name,
    };
    write_info(&folder, &info)?;
    info!("Imported {} into {}", pdf.display(), self.name);
    Ok(info)
  }

  /// Downloads resolved papers into the library.
  ///
  /// Papers whose folder already holds an `info.json` are skipped. A paper whose
  /// download fails is logged and left out. Returns the papers that were newly
  /// stored.
  ///
  /// # Errors
  ///
  /// Only file system failures abort the batch.
  #[instrument(skip_all, fields(library = %self.name))]
  pub async fn persist(&self, papers: &[ResolvedPaper], client: &Client) -> Result<Vec<PaperInfo>> {
    let mut added = Vec::new();
    for paper in papers {
      let info = PaperInfo::from(paper);
      if info.entry_name.is_empty() {
        warn!("Skipping {}: {}", info.title, ShelfError::InvalidName(info.title.clone()));
        continue;
      }
      let folder = self.paper_folder(&info.entry_name);
      if folder.join(INFO_FILE).exists() {
        info!("Paper {} already exists", info.entry_name);
        continue;
      }

      match self.download(client, &paper.pdf_url, &folder, &info.entry_name).await {
        Ok(()) => {
          write_info(&folder, &info)?;
          info!("Paper info saved to {}", folder.join(INFO_FILE).display());
          added.push(info);
        },
        Err(e) if e.is_item_scoped() => warn!("Skipping {}: {e}", info.title),
        Err(e) => return Err(e),
      }
    }
    Ok(added)
  }

  async fn download(
    &self,
    client: &Client,
    pdf_url: &str,
    folder: &Path,
    entry_name: &str,
  ) -> Result<()> {
    debug!("Downloading PDF from: {pdf_url}");
    let mut response = client.get(pdf_url).send().await?;
    if !response.status().is_success() {
      trace!("PDF response: {response:?}");
      return Err(ShelfError::DownloadFailed {
        url:    pdf_url.to_string(),
        status: response.status().as_u16(),
      });
    }

    tokio::fs::create_dir_all(folder).await?;
    let path = folder.join(format!("{entry_name}.pdf"));
    let mut file = tokio::fs::File::create(&path).await?;

    let total = response.content_length();
    let mut written: u64 = 0;
    let mut reported = 0;
    while let Some(chunk) = response.chunk().await? {
      file.write_all(&chunk).await?;
      written += chunk.len() as u64;
      if let Some(total) = total.filter(|total| *total > 0) {
        let percent = written * 100 / total;
        if percent >= reported + 10 || written == total {
          debug!("{entry_name}: {percent}% ({written}/{total} bytes)");
          reported = percent;
        }
      }
    }
    file.flush().await?;

    info!("Downloaded {entry_name} ({written} bytes)");
    Ok(())
  }
}

/// Every library under `root`, ordered by name. A missing root has no libraries.
pub fn list_libraries(root: impl AsRef<Path>) -> Result<Vec<LibrarySummary>> {
  let root = root.as_ref();
  if !root.is_dir() {
    return Ok(Vec::new());
  }

  let mut libraries = Vec::new();
  for entry in std::fs::read_dir(root)? {
    let entry = entry?;
    let metadata = entry.metadata()?;
    if !metadata.is_dir() {
      continue;
    }

    let mut count = 0;
    for folder in std::fs::read_dir(entry.path())? {
      if folder?.file_type()?.is_dir() {
        count += 1;
      }
    }

    let created = metadata.created().or_else(|_| metadata.modified())?;
    libraries.push(LibrarySummary {
      name: entry.file_name().to_string_lossy().into_owned(),
      count,
      created: DateTime::<Local>::from(created),
    });
  }
  libraries.sort_by(|a, b| a.name.cmp(&b.name));
  Ok(libraries)
}

fn library_name(name: &str) -> Result<String> {
  let safe_name = format_title(name, None);
  if safe_name.is_empty() {
    return Err(ShelfError::InvalidName(name.to_string()));
  }
  Ok(safe_name)
}

fn read_paper(folder: &Path) -> Result<StoredPaper> {
  let content = std::fs::read_to_string(folder.join(INFO_FILE))?;
  let info: PaperInfo = serde_json::from_str(&content)?;
  let path = std::path::absolute(folder.join(format!("{}.pdf", info.entry_name)))?;
  let size = std::fs::metadata(&path)?.len();
  Ok(StoredPaper { info, path, size })
}

/// Writes `info.json` indented by four spaces with non-ASCII text left as is.
fn write_info(folder: &Path, info: &PaperInfo) -> Result<()> {
  let mut buffer = Vec::new();
  let mut serializer =
    serde_json::Serializer::with_formatter(&mut buffer, PrettyFormatter::with_indent(b"    "));
  info.serialize(&mut serializer)?;
  std::fs::write(folder.join(INFO_FILE), buffer)?;
  Ok(())
}

#[cfg(test)]
mod tests {
  use mockito::Server;

  use super::*;

  const PDF: &[u8] = b"%PDF-1.4\n1 0 obj\n<< /Type /Catalog >>\nendobj\n%%EOF\n";

  fn resolved(title: &str, pdf_url: &str) -> ResolvedPaper {
    ResolvedPaper {
      title:       title.to_string(),
      arxiv_url:   pdf_url.replace("/pdf/", "/abs/"),
      pdf_url:     pdf_url.to_string(),
      github_repo: None,
    }
  }

  #[test]
  fn test_create_open_delete() {
    let root = tempdir().unwrap();

    let library = Library::create(root.path(), "talking heads").unwrap();
    assert_eq!(library.name(), "talking_heads");
    assert!(library.path().is_dir());

    assert!(matches!(
      Library::create(root.path(), "talking heads"),
      Err(ShelfError::LibraryExists(name)) if name == "talking_heads"
    ));
    assert_eq!(Library::open(root.path(), "talking_heads").unwrap(), library);

    Library::delete(root.path(), "talking_heads").unwrap();
    assert!(!library.path().exists());
    assert!(matches!(
      Library::delete(root.path(), "talking_heads"),
      Err(ShelfError::LibraryNotFound(_))
    ));
    assert!(matches!(Library::open(root.path(), "missing"), Err(ShelfError::LibraryNotFound(_))));
  }

  #[test]
  fn test_invalid_library_name() {
    let root = tempdir().unwrap();
    assert!(matches!(Library::create(root.path(), "../.."), Err(ShelfError::InvalidName(_))));
    assert!(matches!(Library::create(root.path(), "论文"), Err(ShelfError::InvalidName(_))));
  }

  #[test]
  fn test_list_libraries() {
    let root = tempdir().unwrap();
    assert!(list_libraries(root.path().join("absent")).unwrap().is_empty());

    let first = Library::create(root.path(), "b-library").unwrap();
    std::fs::create_dir(first.paper_folder("one")).unwrap();
    std::fs::create_dir(first.paper_folder("two")).unwrap();
    std::fs::write(first.path().join("notes.txt"), "not a paper").unwrap();
    Library::create(root.path(), "a-library").unwrap();
    std::fs::write(root.path().join("stray.txt"), "").unwrap();

    let libraries = list_libraries(root.path()).unwrap();
    let names: Vec<_> = libraries.iter().map(|l| l.name.as_str()).collect();
    assert_eq!(names, vec!["a-library", "b-library"]);
    assert_eq!(libraries[0].count, 0);
    assert_eq!(libraries[1].count, 2);
  }

  #[test]
  fn test_import_pdf() {
    let root = tempdir().unwrap();
    let library = Library::create(root.path(), "uploads").unwrap();
    let source = root.path().join("My Paper (draft).pdf");
    std::fs::write(&source, PDF).unwrap();

    let info = library.import_pdf(&source).unwrap();
    assert_eq!(info.entry_name, "My_Paper_draft");
    assert_eq!(info.title, "My_Paper_draft");

    let raw = std::fs::read_to_string(library.paper_folder("My_Paper_draft").join(INFO_FILE))
      .unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert!(value["arxiv_url"].is_null());
    assert!(value["github_repo"].is_null());
    assert!(value["pdf_url"].is_null());
    assert!(raw.contains("\n    \"title\""));

    let stored = library.paper("My_Paper_draft").unwrap();
    assert_eq!(stored.size, PDF.len() as u64);
    assert!(stored.path.is_absolute());
  }

  #[test]
  fn test_papers_skip_unfinished_and_broken() {
    let root = tempdir().unwrap();
    let library = Library::create(root.path(), "mixed").unwrap();

    let source = root.path().join("good.pdf");
    std::fs::write(&source, PDF).unwrap();
    library.import_pdf(&source).unwrap();

    std::fs::create_dir(library.paper_folder("unfinished")).unwrap();
    std::fs::write(library.paper_folder("unfinished").join("unfinished.pdf"), PDF).unwrap();

    std::fs::create_dir(library.paper_folder("broken")).unwrap();
    std::fs::write(library.paper_folder("broken").join(INFO_FILE), "{ not json").unwrap();

    let papers = library.papers().unwrap();
    assert_eq!(papers.len(), 1);
    assert_eq!(papers[0].info.entry_name, "good");
    assert!(matches!(library.paper("unfinished"), Err(ShelfError::PaperNotFound(_))));
  }

  #[test]
  fn test_remove_paper() {
    let root = tempdir().unwrap();
    let library = Library::create(root.path(), "removals").unwrap();
    let source = root.path().join("gone.pdf");
    std::fs::write(&source, PDF).unwrap();
    library.import_pdf(&source).unwrap();

    library.remove_paper("gone").unwrap();
    assert!(!library.paper_folder("gone").exists());
    assert!(matches!(library.remove_paper("gone"), Err(ShelfError::PaperNotFound(_))));
    assert!(matches!(library.remove_paper(".."), Err(ShelfError::PaperNotFound(_))));
    assert!(root.path().join("removals").is_dir());
  }

  #[traced_test]
  #[tokio::test]
  async fn test_persist_is_idempotent() {
    let mut server = Server::new_async().await;
    let mock = server
      .mock("GET", "/pdf/2403.17694")
      .with_status(200)
      .with_header("content-type", "application/pdf")
      .with_body(PDF)
      .expect(1)
      .create_async()
      .await;

    let root = tempdir().unwrap();
    let library = Library::create(root.path(), "talking-heads").unwrap();
    let papers = vec![resolved(
      "AniPortrait: Audio-Driven Synthesis of Photorealistic Portrait Animation",
      &format!("{}/pdf/2403.17694", server.url()),
    )];
    let client = Client::new();

    let added = library.persist(&papers, &client).await.unwrap();
    assert_eq!(added.len(), 1);
    let entry = "AniPortrait_Audio-Driven_Synthesis_of_Photorealist";
    assert_eq!(added[0].entry_name, entry);
    assert_eq!(std::fs::read(library.paper_folder(entry).join(format!("{entry}.pdf"))).unwrap(), PDF);

    let again = library.persist(&papers, &client).await.unwrap();
    assert!(again.is_empty());
    assert!(logs_contain("already exists"));
    mock.assert_async().await;

    let stored = library.papers().unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].info, added[0]);
  }

  #[traced_test]
  #[tokio::test]
  async fn test_persist_skips_failed_downloads() {
    let mut server = Server::new_async().await;
    let _missing = server.mock("GET", "/pdf/2401.00000").with_status(404).create_async().await;
    let _present = server
      .mock("GET", "/pdf/1706.03762")
      .with_status(200)
      .with_body(PDF)
      .create_async()
      .await;

    let root = tempdir().unwrap();
    let library = Library::create(root.path(), "partial").unwrap();
    let papers = vec![
      resolved("Missing Paper", &format!("{}/pdf/2401.00000", server.url())),
      resolved("Attention Is All You Need", &format!("{}/pdf/1706.03762", server.url())),
    ];

    let added = library.persist(&papers, &Client::new()).await.unwrap();
    assert_eq!(added.len(), 1);
    assert_eq!(added[0].entry_name, "Attention_Is_All_You_Need");
    assert!(!library.paper_folder("Missing_Paper").join(INFO_FILE).exists());
    assert!(logs_contain("status 404"));
  }

  #[traced_test]
  #[tokio::test]
  async fn test_persist_unsafe_titles() {
    let mut server = Server::new_async().await;
    let _first =
      server.mock("GET", "/pdf/2401.00001").with_status(200).with_body(PDF).create_async().await;
    let _second =
      server.mock("GET", "/pdf/2401.00002").with_status(200).with_body(PDF).create_async().await;

    let root = tempdir().unwrap();
    let library = Library::create(root.path(), "lib").unwrap();
    let mut nameless = resolved("???", "https://arxiv.org/pdf/2401.00003");
    nameless.arxiv_url = "not a link".to_string();
    let papers = vec![
      resolved("论文标题", &format!("{}/pdf/2401.00001", server.url())),
      resolved("深度学习", &format!("{}/pdf/2401.00002", server.url())),
      nameless,
    ];

    let added = library.persist(&papers, &Client::new()).await.unwrap();
    let names: Vec<_> = added.iter().map(|info| info.entry_name.as_str()).collect();
    assert_eq!(names, vec!["2401.00001", "2401.00002"]);
    assert_eq!(added[0].title, "论文标题");
    assert!(!library.path().join(INFO_FILE).exists());
    assert!(!library.path().join(".pdf").exists());
    assert!(logs_contain("is not a usable name"));

    let stored = library.papers().unwrap();
    assert_eq!(stored.len(), 2);
    assert_eq!(stored[0].info.entry_name, "2401.00001");
  }
}
