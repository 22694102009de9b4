//! arXiv link discovery from GitHub READMEs.
//!
//! Research code usually links its paper from the README. Given an `owner/repo`
//! identifier, [`GithubClient`] reads `README.md` from the `main` branch, then from
//! `master`, and returns every arXiv link the first fruitful README mentions.

use super::*;

/// Default host serving raw repository contents.
pub const DEFAULT_RAW_HOST: &str = "https://raw.githubusercontent.com";

/// Default branches tried, in order.
pub const DEFAULT_BRANCHES: [&str; 2] = ["main", "master"];

lazy_static! {
  static ref ARXIV_LINK: Regex = Regex::new(r"https://arxiv\.org/(?:abs|pdf)/\d+\.\d+").unwrap();
}

/// Reduces a GitHub URL to `owner/repo`.
///
/// The host has to be exactly `github.com` and the path has to have at least two
/// segments; anything past the repository name is discarded. Everything else yields
/// `None`.
///
/// ```
/// use shelf::github::normalize_github_repo_url;
///
/// assert_eq!(
///   normalize_github_repo_url("https://github.com/foo/bar/tree/main").as_deref(),
///   Some("foo/bar")
/// );
/// assert_eq!(normalize_github_repo_url("https://gitlab.com/foo/bar"), None);
/// ```
pub fn normalize_github_repo_url(url: &str) -> Option<String> {
  let url = Url::parse(url.trim()).ok()?;
  if url.host_str() != Some("github.com") {
    return None;
  }

  let mut segments = url.path_segments()?.filter(|segment| !segment.is_empty());
  let owner = segments.next()?;
  let repo = segments.next()?;
  Some(format!("{owner}/{repo}"))
}

/// All arXiv abstract or PDF links in `text`, in order of appearance.
pub fn extract_arxiv_links(text: &str) -> Vec<String> {
  ARXIV_LINK.find_iter(text).map(|m| m.as_str().to_string()).collect()
}

/// Client reading READMEs from raw GitHub content.
#[derive(Debug, Clone)]
pub struct GithubClient {
  /// HTTP client shared with the other components
  client:   Client,
  /// Scheme and host serving raw files
  raw_host: String,
  /// Applied to every README request
  timeout:  Duration,
}

impl GithubClient {
  /// A client for raw.githubusercontent.com with a ten second timeout.
  pub fn new() -> Self {
    Self {
      client:   Client::new(),
      raw_host: DEFAULT_RAW_HOST.to_string(),
      timeout:  Duration::from_secs(10),
    }
  }

  /// Uses an existing HTTP client.
  pub fn with_client(mut self, client: Client) -> Self {
    self.client = client;
    self
  }

  /// Sets the host serving raw files.
  pub fn with_raw_host(mut self, raw_host: &str) -> Self {
    self.raw_host = raw_host.trim_end_matches('/').to_string();
    self
  }

  /// Sets the per-request README timeout.
  pub fn with_timeout(mut self, timeout: Duration) -> Self {
    self.timeout = timeout;
    self
  }

  /// Where the README of `repo` on `branch` lives.
  pub fn readme_url(&self, repo: &str, branch: &str) -> String {
    format!("{}/{repo}/refs/heads/{branch}/README.md", self.raw_host)
  }

  /// Finds the arXiv links in the README of `repo` (`owner/repo`).
  ///
  /// A branch whose README cannot be fetched counts as a branch without links.
  ///
  /// # Errors
  ///
  /// [`ShelfError::NoArxivLinks`] if no default branch README mentions arXiv. Callers
  /// should fall back to other means of resolution.
  #[instrument(skip(self))]
  pub async fn resolve_arxiv_links(&self, repo: &str) -> Result<Vec<String>> {
    for branch in DEFAULT_BRANCHES {
      let readme_url = self.readme_url(repo, branch);
      match self.fetch_readme(&readme_url).await {
        Ok(readme) => {
          let links = extract_arxiv_links(&readme);
          if !links.is_empty() {
            return Ok(links);
          }
          debug!("No arXiv link in {readme_url}");
        },
        Err(e) => error!("Error fetching README from {readme_url}: {e}"),
      }
    }
    Err(ShelfError::NoArxivLinks(repo.to_string()))
  }

  async fn fetch_readme(&self, readme_url: &str) -> Result<String> {
    let response = self.client.get(readme_url).timeout(self.timeout).send().await?;
    Ok(response.error_for_status()?.text().await?)
  }
}

impl Default for GithubClient {
  fn default() -> Self { Self::new() }
}
