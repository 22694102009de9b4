//! Filesystem-safe names for paper folders and libraries.
//!
//! Paper folders (and the PDF inside them) are named after the paper title, libraries
//! after whatever the user typed. Both go through [`format_title`] so that neither can
//! escape the directory they are created in.

use super::*;

/// Maximum length of a paper's entry name.
pub const ENTRY_NAME_LENGTH: usize = 50;

lazy_static! {
  static ref UNSAFE_CHARACTERS: Regex = Regex::new(r"[^A-Za-z0-9_.-]").unwrap();
}

/// Reduces a title to a filesystem-safe name.
///
/// Path separators become spaces, runs of whitespace become a single `_`, anything
/// outside of `[A-Za-z0-9_.-]` is removed and leading or trailing `.`/`_` are
/// stripped. The result is cut to `max_length` characters when one is given.
///
/// Distinct titles may well map to the same name, especially after truncation.
///
/// # Examples
///
/// ```
/// use shelf::format::format_title;
///
/// assert_eq!(format_title("Attention Is All You Need", Some(50)), "Attention_Is_All_You_Need");
/// assert_eq!(format_title("../etc/passwd", None), "etc_passwd");
/// ```
pub fn format_title(title: &str, max_length: Option<usize>) -> String {
  let spaced = title.replace(['/', '\\'], " ");
  let joined = spaced.split_whitespace().collect::<Vec<_>>().join("_");
  let cleaned = UNSAFE_CHARACTERS.replace_all(&joined, "");
  let trimmed = cleaned.trim_matches(|c| c == '.' || c == '_');

  match max_length {
    Some(max_length) => trimmed.chars().take(max_length).collect(),
    None => trimmed.to_string(),
  }
}

/// The folder and file base name a paper titled `title` is stored under.
pub fn entry_name(title: &str) -> String { format_title(title, Some(ENTRY_NAME_LENGTH)) }
