//! Canonical arXiv links and abstract-page titles.
//!
//! Every resolved paper carries both the `/abs/` and the `/pdf/` form of its arXiv
//! link. [`ArxivLinks`] derives one from the other, and [`ArxivClient`] reads the
//! paper's title from the `og:title` meta tag of the abstract page.

use scraper::{Html, Selector};

use super::*;

/// Default host for abstract pages.
pub const DEFAULT_ARXIV_HOST: &str = "https://arxiv.org";

/// The `/abs/` and `/pdf/` links of one arXiv paper.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArxivLinks {
  /// Abstract page, e.g. `https://arxiv.org/abs/2410.07718`
  pub abs_url: String,
  /// PDF, e.g. `https://arxiv.org/pdf/2410.07718`
  pub pdf_url: String,
}

impl ArxivLinks {
  /// Derives both links from either of them.
  ///
  /// Links containing `/abs/` get their `/pdf/` twin by substring replacement and vice
  /// versa. Anything else is rejected.
  ///
  /// ```
  /// use shelf::arxiv::ArxivLinks;
  ///
  /// let links = ArxivLinks::parse("https://arxiv.org/pdf/2410.07718").unwrap();
  /// assert_eq!(links.abs_url, "https://arxiv.org/abs/2410.07718");
  /// assert!(ArxivLinks::parse("https://arxiv.org/list/cs.CV/recent").is_err());
  /// ```
  pub fn parse(url: &str) -> Result<Self> {
    let url = url.trim();
    if url.contains("/abs/") {
      Ok(Self { abs_url: url.to_string(), pdf_url: url.replace("/abs/", "/pdf/") })
    } else if url.contains("/pdf/") {
      Ok(Self { abs_url: url.replace("/pdf/", "/abs/"), pdf_url: url.to_string() })
    } else {
      Err(ShelfError::InvalidArxivUrl(url.to_string()))
    }
  }

  /// The arXiv identifier, version suffix included.
  pub fn id(&self) -> &str {
    self.abs_url.split_once("/abs/").map(|(_, id)| id.trim_end_matches('/')).unwrap_or_default()
  }
}

impl Display for ArxivLinks {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.abs_url)
  }
}

/// Client reading metadata off arXiv abstract pages.
#[derive(Debug, Clone)]
pub struct ArxivClient {
  /// HTTP client shared with the other components
  client: Client,
  /// Scheme and host the abstract pages are fetched from
  host:   String,
}

impl ArxivClient {
  /// A client for arxiv.org.
  pub fn new() -> Self { Self { client: Client::new(), host: DEFAULT_ARXIV_HOST.to_string() } }

  /// Uses an existing HTTP client.
  pub fn with_client(mut self, client: Client) -> Self {
    self.client = client;
    self
  }

  /// Fetches abstract pages from `host` instead of arxiv.org.
  pub fn with_host(mut self, host: &str) -> Self {
    self.host = host.trim_end_matches('/').to_string();
    self
  }

  /// The abstract page that is actually requested for `links`.
  pub fn abstract_page(&self, links: &ArxivLinks) -> String {
    format!("{}/abs/{}", self.host, links.id())
  }

  /// Reads the paper title from the `og:title` meta tag of its abstract page.
  ///
  /// # Errors
  ///
  /// - [`ShelfError::Network`] if the page cannot be fetched or answers with an error
  ///   status
  /// - [`ShelfError::MissingTitle`] if the page has no `og:title`
  #[instrument(skip(self, links), fields(paper = %links))]
  pub async fn fetch_title(&self, links: &ArxivLinks) -> Result<String> {
    let page = self.abstract_page(links);
    debug!("Fetching title from: {page}");

    let html = self.client.get(&page).send().await?.error_for_status()?.text().await?;
    extract_og_title(&html).ok_or(ShelfError::MissingTitle(page))
  }
}

impl Default for ArxivClient {
  fn default() -> Self { Self::new() }
}

/// Pulls the `content` of the `og:title` meta tag out of an HTML document.
pub fn extract_og_title(html: &str) -> Option<String> {
  lazy_static! {
    static ref OG_TITLE: Selector = Selector::parse(r#"meta[property="og:title"]"#).unwrap();
  }

  Html::parse_document(html)
    .select(&OG_TITLE)
    .find_map(|meta| meta.value().attr("content"))
    .map(|title| title.trim().to_string())
    .filter(|title| !title.is_empty())
}
