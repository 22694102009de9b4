//! Raw paper descriptors and their classification.
//!
//! A descriptor is whatever the user wrote down to point at a paper: a GitHub
//! repository, an arXiv link, a direct PDF link or just a title. Classification is a
//! cheap substring test, checked in that order.
//!
//! Descriptor files hold one descriptor per line. Lines starting with `#` are comments
//! and blank lines are skipped:
//!
//! ```text
//! # talking heads
//! https://github.com/Zejun-Yang/AniPortrait
//! https://arxiv.org/abs/2410.07718
//! Attention Is All You Need
//! ```

use super::*;

/// The kind of a raw descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DescriptorKind {
  /// Mentions `github.com`
  GithubRepo,
  /// Mentions `arxiv.org`
  ArxivUrl,
  /// Ends in `.pdf`
  PdfUrl,
  /// Anything else, searched for as a title
  Title,
}

impl DescriptorKind {
  /// Classifies a single descriptor.
  ///
  /// ```
  /// use shelf::descriptor::DescriptorKind;
  ///
  /// assert_eq!(
  ///   DescriptorKind::classify("https://github.com/Zejun-Yang/AniPortrait"),
  ///   DescriptorKind::GithubRepo
  /// );
  /// assert_eq!(DescriptorKind::classify("Attention Is All You Need"), DescriptorKind::Title);
  /// ```
  pub fn classify(descriptor: &str) -> Self {
    if descriptor.contains("github.com") {
      Self::GithubRepo
    } else if descriptor.contains("arxiv.org") {
      Self::ArxivUrl
    } else if descriptor.ends_with(".pdf") {
      Self::PdfUrl
    } else {
      Self::Title
    }
  }
}

impl Display for DescriptorKind {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::GithubRepo => write!(f, "GitHub repo"),
      Self::ArxivUrl => write!(f, "arXiv URL"),
      Self::PdfUrl => write!(f, "PDF URL"),
      Self::Title => write!(f, "paper title"),
    }
  }
}

/// Descriptors sorted into one bucket per [`DescriptorKind`], each in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Buckets {
  /// [`DescriptorKind::GithubRepo`] descriptors
  pub github_repos: Vec<String>,
  /// [`DescriptorKind::ArxivUrl`] descriptors
  pub arxiv_urls:   Vec<String>,
  /// [`DescriptorKind::PdfUrl`] descriptors
  pub pdf_urls:     Vec<String>,
  /// [`DescriptorKind::Title`] descriptors
  pub titles:       Vec<String>,
}

impl Buckets {
  /// Sorts every descriptor into exactly one bucket.
  pub fn classify<I, S>(descriptors: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: AsRef<str>, {
    let mut buckets = Self::default();
    for descriptor in descriptors {
      let descriptor = descriptor.as_ref().to_string();
      match DescriptorKind::classify(&descriptor) {
        DescriptorKind::GithubRepo => buckets.github_repos.push(descriptor),
        DescriptorKind::ArxivUrl => buckets.arxiv_urls.push(descriptor),
        DescriptorKind::PdfUrl => buckets.pdf_urls.push(descriptor),
        DescriptorKind::Title => buckets.titles.push(descriptor),
      }
    }
    buckets
  }

  /// Total number of descriptors.
  pub fn len(&self) -> usize {
    self.github_repos.len() + self.arxiv_urls.len() + self.pdf_urls.len() + self.titles.len()
  }

  /// Whether there are no descriptors at all.
  pub fn is_empty(&self) -> bool { self.len() == 0 }
}

/// Splits descriptor file contents into descriptors.
pub fn parse_descriptors(content: &str) -> Vec<String> {
  content
    .lines()
    .map(str::trim)
    .filter(|line| !line.is_empty() && !line.starts_with('#'))
    .map(String::from)
    .collect()
}

/// Reads a descriptor file.
pub fn load_descriptors(path: impl AsRef<Path>) -> Result<Vec<String>> {
  let content = std::fs::read_to_string(path.as_ref())?;
  Ok(parse_descriptors(&content))
}
