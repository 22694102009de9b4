//! Terminal interaction: confirmations, prompts and formatted replies.

use console::Emoji;
use dialoguer::{Confirm, Input};
use shelf::{
  history::{Session, SessionMetadata},
  library::{LibrarySummary, PaperInfo, StoredPaper},
  search::SearchResult,
};

use super::*;

/// Prefix for information messages
pub static INFO_PREFIX: &str = "ℹ ";
/// Prefix for long running steps
pub static WORKING_PREFIX: &str = "» ";
/// Prefix for success messages
pub static SUCCESS_PREFIX: &str = "✓ ";
/// Prefix for error messages
pub static ERROR_PREFIX: &str = "✗ ";
/// Prefix for warning messages
pub static WARNING_PREFIX: &str = "! ";
/// Prefix for user prompts
pub static PROMPT_PREFIX: &str = "❯ ";
/// Prefix for list items
pub static ITEM_PREFIX: &str = "├─";
/// Prefix for the last list item
pub static LAST_ITEM_PREFIX: &str = "└─";
/// Continuation line below a list item
pub static CONTINUE_PREFIX: &str = "│  ";
/// Indentation below the last list item
pub static LAST_CONTINUE_PREFIX: &str = "   ";

/// Shown next to paper listings
static BOOKS: Emoji<'_, '_> = Emoji("📚 ", "");

/// Everything a command may want to show the user.
#[derive(Debug)]
pub enum ResponseContent<'a> {
  /// Libraries under the library root
  Libraries(&'a [LibrarySummary]),
  /// Papers stored in a library
  Papers(&'a [StoredPaper]),
  /// Papers that were just stored
  Added(&'a [PaperInfo]),
  /// Search feed results
  SearchResults(&'a [SearchResult]),
  /// A question session with its answers
  Session(&'a Session),
  /// Past sessions
  Sessions(&'a [SessionMetadata]),
  /// Machine readable output, printed as is
  Json(&'a str),
  /// Progress on a long running step
  Working(&'a str),
  /// Something went as planned
  Success(&'a str),
  /// Worth knowing, nothing went wrong
  Info(&'a str),
  /// Something was skipped
  Warning(&'a str),
  /// The command failed
  Error(ShelfdError),
}

/// How commands talk to the user.
pub trait UserInteraction {
  /// Asks a yes/no question.
  fn confirm(&self, message: &str) -> Result<bool>;
  /// Asks for a line of text.
  fn prompt(&self, message: &str) -> Result<String>;
  /// Shows a reply.
  fn reply(&self, content: ResponseContent) -> Result<()>;
}

/// Interaction on the attached terminal.
#[derive(Debug, Clone, Copy, Default)]
pub struct Terminal {
  /// Answer every confirmation with yes and every prompt with nothing
  accept_defaults: bool,
}

impl Terminal {
  /// Creates a terminal interaction, optionally skipping every prompt.
  pub fn new(accept_defaults: bool) -> Self { Self { accept_defaults } }
}

impl UserInteraction for Terminal {
  fn confirm(&self, message: &str) -> Result<bool> {
    if self.accept_defaults {
      return Ok(true);
    }
    Ok(
      Confirm::new()
        .with_prompt(format!("{}{message}", style(PROMPT_PREFIX).cyan()))
        .default(false)
        .wait_for_newline(true)
        .interact()?,
    )
  }

  fn prompt(&self, message: &str) -> Result<String> {
    if self.accept_defaults {
      return Ok(String::new());
    }
    Ok(
      Input::<String>::new()
        .with_prompt(format!("{}{message}", style(PROMPT_PREFIX).cyan()))
        .allow_empty(true)
        .interact_text()?,
    )
  }

  fn reply(&self, content: ResponseContent) -> Result<()> {
    match content {
      ResponseContent::Libraries(libraries) => print_libraries(libraries),
      ResponseContent::Papers(papers) => print_papers(papers),
      ResponseContent::Added(papers) => print_added(papers),
      ResponseContent::SearchResults(results) => print_search_results(results),
      ResponseContent::Session(session) => print_session(session),
      ResponseContent::Sessions(sessions) => print_sessions(sessions),
      ResponseContent::Json(json) => println!("{json}"),
      ResponseContent::Working(message) =>
        println!("{} {}", style(WORKING_PREFIX).cyan(), style(message).white()),
      ResponseContent::Success(message) =>
        println!("{} {}", style(SUCCESS_PREFIX).green(), style(message).white()),
      ResponseContent::Info(message) =>
        println!("{} {}", style(INFO_PREFIX).blue(), style(message).white()),
      ResponseContent::Warning(message) =>
        println!("{} {}", style(WARNING_PREFIX).yellow(), style(message).yellow()),
      ResponseContent::Error(error) =>
        eprintln!("{} {}", style(ERROR_PREFIX).red(), style(error).red()),
    }
    Ok(())
  }
}

/// Tree prefixes for the item at `index` out of `len`.
fn tree_prefixes(index: usize, len: usize) -> (&'static str, &'static str) {
  if index + 1 == len {
    (LAST_ITEM_PREFIX, LAST_CONTINUE_PREFIX)
  } else {
    (ITEM_PREFIX, CONTINUE_PREFIX)
  }
}

fn print_libraries(libraries: &[LibrarySummary]) {
  if libraries.is_empty() {
    println!("{} No libraries yet", style(INFO_PREFIX).blue());
    return;
  }

  println!("{}{}", BOOKS, style(format!("{} libraries", libraries.len())).green().bold());
  for (index, library) in libraries.iter().enumerate() {
    let (item, _) = tree_prefixes(index, libraries.len());
    println!(
      "{} {}  {}  {}",
      style(item).dim(),
      style(&library.name).white().bold(),
      style(format!("{} papers", library.count)).cyan(),
      style(library.created.format("%Y-%m-%d %H:%M")).dim()
    );
  }
}

fn print_papers(papers: &[StoredPaper]) {
  if papers.is_empty() {
    println!("{} No papers in this library", style(INFO_PREFIX).blue());
    return;
  }

  println!("{}{}", BOOKS, style(format!("{} papers", papers.len())).green().bold());
  for (index, paper) in papers.iter().enumerate() {
    let (item, continued) = tree_prefixes(index, papers.len());
    println!("{} {}", style(item).dim(), style(&paper.info.title).white().bold());
    println!("{} {} {}", style(continued).dim(), style("Entry:").dim(), &paper.info.entry_name);
    if let Some(url) = &paper.info.arxiv_url {
      println!("{} {} {}", style(continued).dim(), style("arXiv:").dim(), style(url).blue());
    }
    println!(
      "{} {} {:.1} KiB",
      style(continued).dim(),
      style("Size:").dim(),
      paper.size as f64 / 1024.0
    );
  }
}

fn print_added(papers: &[PaperInfo]) {
  if papers.is_empty() {
    println!("{} No new papers were added", style(INFO_PREFIX).blue());
    return;
  }

  println!("{} Added {} papers", style(SUCCESS_PREFIX).green(), papers.len());
  for (index, paper) in papers.iter().enumerate() {
    let (item, _) = tree_prefixes(index, papers.len());
    println!(
      "{} {} {}",
      style(item).dim(),
      style(&paper.title).white().bold(),
      style(format!("({})", paper.entry_name)).dim()
    );
  }
}

fn print_search_results(results: &[SearchResult]) {
  if results.is_empty() {
    println!("{} No papers found", style(INFO_PREFIX).blue());
    return;
  }

  println!("{} Found {} papers", style(SUCCESS_PREFIX).green(), results.len());
  for (index, result) in results.iter().enumerate() {
    let (item, continued) = tree_prefixes(index, results.len());
    println!("{} {}", style(item).dim(), style(&result.title).white().bold());
    let authors = result.authors.iter().map(|a| a.name.as_str()).collect::<Vec<_>>().join(", ");
    if !authors.is_empty() {
      println!("{} {} {}", style(continued).dim(), style("Authors:").dim(), authors);
    }
    println!(
      "{} {} {}",
      style(continued).dim(),
      style("Link:").dim(),
      style(result.arxiv_link.as_ref().unwrap_or(&result.link)).blue()
    );
  }
}

fn print_session(session: &Session) {
  let metadata = &session.metadata;
  println!(
    "{} {} {}",
    style(INFO_PREFIX).blue(),
    style(&metadata.id).white().bold(),
    style(metadata.timestamp.format("%Y-%m-%d %H:%M:%S")).dim()
  );
  println!("{} {}", style("Question:").green().bold(), metadata.question);

  for response in &session.responses {
    match (&response.answer, &response.error) {
      (Some(answer), _) if response.success => {
        println!("\n{} {}", style(SUCCESS_PREFIX).green(), style(&response.paper).white().bold());
        println!("{answer}");
      },
      (_, error) => println!(
        "\n{} {}: {}",
        style(ERROR_PREFIX).red(),
        style(&response.paper).white().bold(),
        style(error.as_deref().unwrap_or("No answer")).red()
      ),
    }
  }
}

fn print_sessions(sessions: &[SessionMetadata]) {
  if sessions.is_empty() {
    println!("{} No sessions yet", style(INFO_PREFIX).blue());
    return;
  }

  for (index, session) in sessions.iter().enumerate() {
    let (item, continued) = tree_prefixes(index, sessions.len());
    let answered = session.responses.iter().filter(|success| **success).count();
    println!(
      "{} {}  {}",
      style(item).dim(),
      style(&session.id).white().bold(),
      style(format!("{answered}/{} answered", session.responses.len())).cyan()
    );
    println!("{} {}", style(continued).dim(), session.question.trim());
  }
}
