//! Error types for the shelf library.
//!
//! Failures fall into two groups. Structural failures (an unsupported descriptor
//! kind, a missing library, a name collision) abort the whole operation. Item
//! failures (one search that came back empty, one PDF that would not download)
//! are logged by the pipeline and the item is skipped; see
//! [`ShelfError::is_item_scoped`].
//!
//! # Examples
//!
//! ```no_run
//! use shelf::{error::ShelfError, library::Library};
//!
//! match Library::create("libraries", "reading-group") {
//!   Err(ShelfError::LibraryExists(name)) => println!("{name} is already there"),
//!   Err(e) => println!("Other error: {e}"),
//!   Ok(library) => println!("Created {}", library.name()),
//! }
//! ```

use thiserror::Error;

/// Error type alias used for the [`shelf`](crate) crate.
pub type Result<T> = core::result::Result<T, ShelfError>;

/// Errors that can occur while resolving, storing or questioning papers.
#[derive(Error, Debug)]
pub enum ShelfError {
  /// Descriptors pointing straight at PDF files were supplied.
  ///
  /// Direct PDF links cannot be mapped to an arXiv record yet, so a batch that
  /// contains any of them is rejected as a whole. The offending descriptors are
  /// carried along for reporting.
  #[error("PDF URLs are not supported yet: {0:?}")]
  UnsupportedDescriptor(Vec<String>),

  /// A network request failed before a response was received.
  #[error(transparent)]
  Network(#[from] reqwest::Error),

  /// The paper search feed answered with a non-success status.
  #[error("Search failed with status {0}")]
  SearchFailed(u16),

  /// A PDF download answered with a non-success status.
  #[error("Failed to download PDF from {url}: status {status}")]
  DownloadFailed {
    /// The PDF link that was requested
    url:    String,
    /// The status code that came back
    status: u16,
  },

  /// Neither default branch README of a repository mentioned an arXiv paper.
  #[error("No arXiv link found in the README of {0}")]
  NoArxivLinks(String),

  /// A keyword search produced no result with an arXiv link.
  #[error("No arXiv paper found for \"{0}\"")]
  NoSearchMatch(String),

  /// An arXiv link was neither in `/abs/` nor in `/pdf/` form.
  #[error("Invalid arXiv URL: {0}")]
  InvalidArxivUrl(String),

  /// An arXiv abstract page carried no `og:title` meta tag.
  #[error("No title found on {0}")]
  MissingTitle(String),

  /// The search feed could not be parsed.
  #[error(transparent)]
  Xml(#[from] quick_xml::DeError),

  /// A feed timestamp was not valid ISO-8601.
  #[error(transparent)]
  Timestamp(#[from] chrono::ParseError),

  /// A library with this name already exists.
  #[error("Library \"{0}\" already exists")]
  LibraryExists(String),

  /// No library with this name exists.
  #[error("Library \"{0}\" not found")]
  LibraryNotFound(String),

  /// No finished paper folder with this name exists in the library.
  #[error("Paper folder \"{0}\" not found")]
  PaperNotFound(String),

  /// No question session with this id exists.
  #[error("Session \"{0}\" not found")]
  SessionNotFound(String),

  /// A name was empty once reduced to filesystem-safe characters.
  #[error("\"{0}\" is not a usable name")]
  InvalidName(String),

  /// A file system operation failed.
  #[error(transparent)]
  Path(#[from] std::io::Error),

  /// Metadata could not be (de)serialized.
  #[error(transparent)]
  Json(#[from] serde_json::Error),

  /// The configuration file could not be parsed.
  #[error(transparent)]
  TomlDe(#[from] toml::de::Error),

  /// The configuration could not be written.
  #[error(transparent)]
  TomlSer(#[from] toml::ser::Error),

  /// The LLM service answered but with something other than an answer.
  #[error("LLM error: {0}")]
  Llm(String),

  /// The configuration is incomplete, e.g. no API key is set.
  #[error("{0}")]
  Config(String),
}

impl ShelfError {
  /// Whether this failure only concerns the item that produced it.
  ///
  /// The resolver and the paper store log item-scoped failures and carry on with
  /// the rest of the batch. Everything else stops the operation.
  pub fn is_item_scoped(&self) -> bool {
    matches!(
      self,
      Self::Network(_)
        | Self::SearchFailed(_)
        | Self::DownloadFailed { .. }
        | Self::NoArxivLinks(_)
        | Self::NoSearchMatch(_)
        | Self::InvalidArxivUrl(_)
        | Self::MissingTitle(_)
        | Self::Xml(_)
        | Self::Timestamp(_)
    )
  }
}
