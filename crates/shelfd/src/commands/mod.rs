//! Subcommands of the `shelf` binary, one module each.

use super::*;

pub mod add;
pub mod ask;
pub mod history;
pub mod init;
pub mod library;
pub mod papers;
pub mod remove;
pub mod search;
pub mod upload;

pub use add::{add, AddArgs};
pub use ask::{ask, AskArgs};
pub use history::{history, HistoryArgs};
pub use init::{init, InitArgs};
pub use library::{library, LibraryCommands};
pub use papers::{papers, PapersArgs};
pub use remove::{remove, RemoveArgs};
pub use search::{search, SearchArgs};
pub use upload::{upload, UploadArgs};

/// Available commands for the CLI
#[derive(Subcommand, Clone)]
pub enum Commands {
  /// Write a configuration file and create the data directories
  Init(InitArgs),

  /// Create, list and delete libraries
  Library {
    /// What to do with libraries
    #[command(subcommand)]
    cmd: LibraryCommands,
  },

  /// Resolve paper descriptors and download the papers into a library
  Add(AddArgs),

  /// Copy local PDFs into a library
  Upload(UploadArgs),

  /// List the papers in a library
  Papers(PapersArgs),

  /// Remove a paper from a library
  Remove(RemoveArgs),

  /// Search the paper feed by keyword
  Search(SearchArgs),

  /// Ask a question about papers in a library
  Ask(AskArgs),

  /// Show past questions, or one session in full
  History(HistoryArgs),
}
