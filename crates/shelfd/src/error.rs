//! Errors surfaced by the `shelf` command line.

use shelf::error::ShelfError;
use thiserror::Error;

/// Error type alias used throughout the binary.
pub type Result<T> = core::result::Result<T, ShelfdError>;

/// Errors that can end a command.
#[derive(Error, Debug)]
pub enum ShelfdError {
  /// Anything the library reports
  #[error(transparent)]
  Shelf(#[from] ShelfError),

  /// Reading from or writing to the terminal failed
  #[error(transparent)]
  Dialoguer(#[from] dialoguer::Error),

  /// A file system operation failed
  #[error(transparent)]
  Io(#[from] std::io::Error),

  /// An upload pattern was not a valid glob
  #[error(transparent)]
  Glob(#[from] glob::PatternError),

  /// Output could not be serialized
  #[error(transparent)]
  Json(#[from] serde_json::Error),

  /// The command line was well-formed but unusable
  #[error("{0}")]
  Usage(String),
}
