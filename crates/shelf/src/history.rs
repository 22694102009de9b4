//! Question sessions and their stored answers.
//!
//! Every call to [`History::ask`] opens a session folder under the history root:
//!
//! ```text
//! <history root>/
//! └── talking-heads_20241011_083412/
//!     ├── question.txt
//!     ├── AniPortrait_Audio-Driven_Synthesis_of_Photorealist_response.md
//!     └── metadata.json
//! ```
//!
//! `metadata.json` is written once all papers have been asked and records which of
//! them produced an answer.

use chrono::NaiveDateTime;

use crate::{format::format_title, library::Library, llm::DocumentReader};

use super::*;

/// Name of the file holding the question.
pub const QUESTION_FILE: &str = "question.txt";

/// Name of the session metadata file.
pub const METADATA_FILE: &str = "metadata.json";

/// Error recorded for papers that are not in the library.
pub const MISSING_FOLDER: &str = "Paper folder not found";

/// What is stored about a session in `metadata.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionMetadata {
  /// `<library>_<YYYYmmdd_HHMMSS>`
  pub id:        String,
  /// The question asked
  pub question:  String,
  /// The library the papers belong to
  pub library:   String,
  /// Paper folder names, in the order they were asked
  pub papers:    Vec<String>,
  /// When the session finished, local time
  pub timestamp: NaiveDateTime,
  /// Whether each paper produced an answer, parallel to `papers`
  pub responses: Vec<bool>,
}

/// The outcome for one paper of a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaperResponse {
  /// Paper title on success, folder name otherwise
  pub paper:   String,
  /// The answer, if there was one
  #[serde(skip_serializing_if = "Option::is_none")]
  pub answer:  Option<String>,
  /// Why there is no answer
  #[serde(skip_serializing_if = "Option::is_none")]
  pub error:   Option<String>,
  /// Whether an answer came back
  pub success: bool,
}

/// A session with its answers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
  /// Contents of `metadata.json`
  pub metadata:  SessionMetadata,
  /// Per-paper outcomes
  pub responses: Vec<PaperResponse>,
}

/// The history root directory.
#[derive(Debug, Clone)]
pub struct History {
  root: PathBuf,
}

impl History {
  /// History stored under `root`.
  pub fn new(root: impl AsRef<Path>) -> Self { Self { root: root.as_ref().to_path_buf() } }

  /// Directory holding the session folders.
  pub fn root(&self) -> &Path { &self.root }

  /// Asks `question` about papers of `library` and records the session.
  ///
  /// `papers` holds paper folder names; an empty list means every paper in the
  /// library. Papers that are missing or go unanswered are recorded as failures,
  /// they do not abort the session.
  #[instrument(skip(self, library, reader, question), fields(library = %library.name()))]
  pub async fn ask(
    &self,
    library: &Library,
    reader: &dyn DocumentReader,
    question: &str,
    papers: &[String],
  ) -> Result<Session> {
    let papers = if papers.is_empty() {
      library.papers()?.into_iter().map(|paper| paper.info.entry_name).collect()
    } else {
      papers.to_vec()
    };

    let id = format!("{}_{}", library.name(), Local::now().format("%Y%m%d_%H%M%S"));
    let folder = self.root.join(&id);
    std::fs::create_dir_all(&folder)?;
    std::fs::write(folder.join(QUESTION_FILE), question)?;

    let mut responses = Vec::with_capacity(papers.len());
    for name in &papers {
      let response = self.ask_paper(library, reader, question, name, &folder).await?;
      responses.push(response);
    }

    let metadata = SessionMetadata {
      id,
      question: question.to_string(),
      library: library.name().to_string(),
      papers,
      timestamp: Local::now().naive_local(),
      responses: responses.iter().map(|response| response.success).collect(),
    };
    std::fs::write(folder.join(METADATA_FILE), serde_json::to_string_pretty(&metadata)?)?;
    info!("Session {} saved to {}", metadata.id, folder.display());

    Ok(Session { metadata, responses })
  }

  async fn ask_paper(
    &self,
    library: &Library,
    reader: &dyn DocumentReader,
    question: &str,
    name: &str,
    folder: &Path,
  ) -> Result<PaperResponse> {
    let failure = |error: String| PaperResponse {
      paper:   name.to_string(),
      answer:  None,
      error:   Some(error),
      success: false,
    };

    if !library.paper_folder(&format_title(name, None)).is_dir() {
      warn!("Paper folder not found: {name}");
      return Ok(failure(MISSING_FOLDER.to_string()));
    }
    let paper = match library.paper(name) {
      Ok(paper) => paper,
      Err(e) => return Ok(failure(e.to_string())),
    };

    debug!("Asking about {}", paper.info.title);
    let answer = reader.ask(question, &paper.path).await;
    let response_file = folder.join(format!("{}_response.md", paper.info.entry_name));
    std::fs::write(response_file, answer.as_deref().unwrap_or_default())?;

    Ok(match answer {
      Some(answer) => PaperResponse {
        paper:   paper.info.title,
        answer:  Some(answer),
        error:   None,
        success: true,
      },
      None => failure("No answer".to_string()),
    })
  }

  /// All sessions, newest first. Sessions without readable metadata are skipped.
  pub fn list(&self) -> Result<Vec<SessionMetadata>> {
    if !self.root.is_dir() {
      return Ok(Vec::new());
    }

    let mut sessions = Vec::new();
    for entry in std::fs::read_dir(&self.root)? {
      let path = entry?.path().join(METADATA_FILE);
      if !path.exists() {
        continue;
      }
      match read_metadata(&path) {
        Ok(metadata) => sessions.push(metadata),
        Err(e) => debug!("Skipping {}: {e}", path.display()),
      }
    }
    sessions.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    Ok(sessions)
  }

  /// A session with every answer that was stored for it.
  pub fn get(&self, id: &str) -> Result<Session> {
    let folder = self.root.join(format_title(id, None));
    if !folder.join(METADATA_FILE).exists() {
      return Err(ShelfError::SessionNotFound(id.to_string()));
    }
    let metadata = read_metadata(&folder.join(METADATA_FILE))?;

    let mut responses = Vec::new();
    for (index, paper) in metadata.papers.iter().enumerate() {
      let answer_file = folder.join(format!("{paper}_response.md"));
      if let Ok(answer) = std::fs::read_to_string(&answer_file) {
        responses.push(PaperResponse {
          paper:   paper.clone(),
          answer:  Some(answer),
          error:   None,
          success: metadata.responses.get(index).copied().unwrap_or(true),
        });
      }
    }
    Ok(Session { metadata, responses })
  }
}

fn read_metadata(path: &Path) -> Result<SessionMetadata> {
  Ok(serde_json::from_str(&std::fs::read_to_string(path)?)?)
}
