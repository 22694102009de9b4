//! Keyword search against an arXiv-mirroring Atom feed.
//!
//! The feed (by default `https://papers.cool/arxiv/search/feed`) takes a single
//! `query` parameter and answers with a standard Atom document. Each `entry` becomes a
//! [`SearchResult`]; when the entry's link points at something arXiv-shaped, an
//! `https://arxiv.org/abs/<id>` link is derived from its last path segment.
//!
//! ```no_run
//! use shelf::search::SearchClient;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let results = SearchClient::new().search("Attention Is All You Need").await?;
//! if let Some(link) = results.first().and_then(|r| r.arxiv_link.as_ref()) {
//!   println!("Found: {link}");
//! }
//! # Ok(())
//! # }
//! ```

use quick_xml::de::from_str;
use reqwest::StatusCode;

use super::*;

/// Default search feed endpoint.
pub const DEFAULT_SEARCH_ENDPOINT: &str = "https://papers.cool/arxiv/search/feed";

/// One entry of the search feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
  /// Feed entry id, opaque
  pub id:         String,
  /// Paper title as the feed spells it
  pub title:      String,
  /// Last update of the entry
  pub updated:    DateTime<Utc>,
  /// Author names in feed order
  pub authors:    Vec<Author>,
  /// The entry's primary link
  pub link:       String,
  /// Abstract or summary text
  pub summary:    String,
  /// `https://arxiv.org/abs/<id>` when [`link`](Self::link) mentions arXiv
  pub arxiv_link: Option<String>,
}

/// A paper author, identified by display name only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
  /// Author's name
  pub name: String,
}

/// Atom document as returned by the feed.
#[derive(Debug, Deserialize)]
struct Feed {
  /// Zero or more entries
  #[serde(rename = "entry", default)]
  entries: Vec<Entry>,
}

/// A single Atom entry. Every child except `author` is required.
#[derive(Debug, Deserialize)]
struct Entry {
  id:      String,
  title:   Text,
  updated: String,
  #[serde(rename = "author", default)]
  authors: Vec<EntryAuthor>,
  #[serde(rename = "link")]
  links:   Vec<Link>,
  summary: Text,
}

#[derive(Debug, Deserialize)]
struct EntryAuthor {
  name: String,
}

#[derive(Debug, Deserialize)]
struct Link {
  #[serde(rename = "@href")]
  href: String,
}

/// Text content of an element that may also carry attributes (`type="html"`).
#[derive(Debug, Deserialize)]
struct Text {
  #[serde(rename = "$text", default)]
  value: String,
}

/// Client for the paper search feed.
#[derive(Debug, Clone)]
pub struct SearchClient {
  /// HTTP client shared with the other components
  client:   Client,
  /// Feed endpoint without query string
  endpoint: String,
}

impl SearchClient {
  /// Creates a client for the default endpoint.
  pub fn new() -> Self {
    Self { client: Client::new(), endpoint: DEFAULT_SEARCH_ENDPOINT.to_string() }
  }

  /// Uses `client` for all requests.
  pub fn with_client(mut self, client: Client) -> Self {
    self.client = client;
    self
  }

  /// Queries `endpoint` instead of the default feed.
  pub fn with_endpoint(mut self, endpoint: &str) -> Self {
    self.endpoint = endpoint.to_string();
    self
  }

  /// Builds the request URL for `keyword`.
  pub fn search_url(&self, keyword: &str) -> Result<Url> {
    Url::parse_with_params(&self.endpoint, &[("query", keyword)]).map_err(|e| {
      ShelfError::Config(format!("Invalid search endpoint {}: {e}", self.endpoint))
    })
  }

  /// Searches the feed for `keyword`.
  ///
  /// # Errors
  ///
  /// - [`ShelfError::SearchFailed`] if the feed answers with anything but 200
  /// - [`ShelfError::Xml`] or [`ShelfError::Timestamp`] if any entry is malformed; no
  ///   partial results are returned
  #[instrument(skip(self))]
  pub async fn search(&self, keyword: &str) -> Result<Vec<SearchResult>> {
    let url = self.search_url(keyword)?;
    debug!("Searching via: {url}");

    let response = self.client.get(url).send().await?;
    if response.status() != StatusCode::OK {
      return Err(ShelfError::SearchFailed(response.status().as_u16()));
    }

    let body = response.text().await?;
    trace!("Search response: {body}");
    parse_feed(&body)
  }
}

impl Default for SearchClient {
  fn default() -> Self { Self::new() }
}

/// Parses an Atom search feed.
pub fn parse_feed(xml: &str) -> Result<Vec<SearchResult>> {
  let feed: Feed = from_str(xml)?;
  feed.entries.into_iter().map(SearchResult::try_from).collect()
}

/// Derives an arXiv abstract link from a feed link mentioning arXiv.
///
/// Only the substring `arxiv` is checked; the last path segment is taken as the id
/// verbatim, version suffix included.
pub fn arxiv_link(link: &str) -> Option<String> {
  if !link.contains("arxiv") {
    return None;
  }
  let id = link.rsplit('/').next().unwrap_or_default();
  Some(format!("https://arxiv.org/abs/{id}"))
}

/// Parses an ISO-8601 timestamp, reading a trailing `Z` as UTC. Timestamps without
/// any offset are taken to be UTC as well.
fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
  let value = value.trim();
  match DateTime::parse_from_rfc3339(value) {
    Ok(timestamp) => Ok(timestamp.with_timezone(&Utc)),
    Err(e) => chrono::NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
      .map(|naive| naive.and_utc())
      .map_err(|_| ShelfError::Timestamp(e)),
  }
}

impl TryFrom<Entry> for SearchResult {
  type Error = ShelfError;

  fn try_from(entry: Entry) -> Result<Self> {
    let link = entry
      .links
      .into_iter()
      .next()
      .map(|link| link.href)
      .ok_or_else(|| ShelfError::Xml(quick_xml::DeError::Custom("entry without link".into())))?;

    Ok(Self {
      id: entry.id,
      title: entry.title.value.trim().to_string(),
      updated: parse_timestamp(&entry.updated)?,
      authors: entry.authors.into_iter().map(|a| Author { name: a.name }).collect(),
      arxiv_link: arxiv_link(&link),
      link,
      summary: entry.summary.value.trim().to_string(),
    })
  }
}

#[cfg(test)]
mod tests {
  use mockito::{Matcher, Server};

  use super::*;

  const FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>Cool Papers - Search</title>
  <id>https://papers.cool/arxiv/search</id>
  <updated>2024-10-11T08:00:00Z</updated>
  <entry>
    <id>https://papers.cool/arxiv/2410.07718</id>
    <title>Hallo2: Long-Duration and High-Resolution Audio-Driven Portrait Image Animation</title>
    <updated>2024-10-10T08:34:12Z</updated>
    <author><name>Jiahao Cui</name></author>
    <author><name>Hui Li</name></author>
    <link href="https://arxiv.org/abs/2410.07718v1"/>
    <summary type="html">Recent advances in latent diffusion-based generative models.</summary>
  </entry>
  <entry>
    <id>https://papers.cool/venue/42</id>
    <title>Some Workshop Paper</title>
    <updated>2024-09-01T10:00:00+02:00</updated>
    <author><name>Someone</name></author>
    <link href="https://openreview.net/forum/42"/>
    <summary>Not on arXiv.</summary>
  </entry>
</feed>"#;

  #[test]
  fn test_parse_feed() {
    let results = parse_feed(FEED).unwrap();
    assert_eq!(results.len(), 2);

    let first = &results[0];
    assert_eq!(first.id, "https://papers.cool/arxiv/2410.07718");
    assert_eq!(
      first.title,
      "Hallo2: Long-Duration and High-Resolution Audio-Driven Portrait Image Animation"
    );
    assert_eq!(first.authors, vec![Author { name: "Jiahao Cui".into() }, Author {
      name: "Hui Li".into(),
    }]);
    assert_eq!(first.updated.to_rfc3339(), "2024-10-10T08:34:12+00:00");
    assert_eq!(first.summary, "Recent advances in latent diffusion-based generative models.");
    assert_eq!(first.arxiv_link.as_deref(), Some("https://arxiv.org/abs/2410.07718v1"));

    let second = &results[1];
    assert_eq!(second.updated.to_rfc3339(), "2024-09-01T08:00:00+00:00");
    assert_eq!(second.arxiv_link, None);
  }

  #[test]
  fn test_arxiv_link_keeps_last_segment() {
    assert_eq!(
      arxiv_link("https://papers.cool/arxiv/2410.07718").as_deref(),
      Some("https://arxiv.org/abs/2410.07718")
    );
    assert_eq!(
      arxiv_link("https://arxiv.org/abs/2410.07718v1").as_deref(),
      Some("https://arxiv.org/abs/2410.07718v1")
    );
    assert_eq!(arxiv_link("https://openreview.net/forum?id=42"), None);
  }

  #[test]
  fn test_empty_feed() {
    let feed = r#"<feed xmlns="http://www.w3.org/2005/Atom"><title>Nothing</title></feed>"#;
    assert!(parse_feed(feed).unwrap().is_empty());
  }

  #[test]
  fn test_malformed_entry_fails_whole_feed() {
    let feed = r#"<feed xmlns="http://www.w3.org/2005/Atom">
      <entry>
        <id>a</id><title>Fine</title><updated>2024-10-10T08:34:12Z</updated>
        <link href="https://arxiv.org/abs/2410.07718"/><summary>ok</summary>
      </entry>
      <entry>
        <id>b</id><title>No link</title><updated>2024-10-10T08:34:12Z</updated>
        <summary>broken</summary>
      </entry>
    </feed>"#;
    assert!(parse_feed(feed).is_err());
  }

  #[test]
  fn test_bad_timestamp_fails() {
    let feed = r#"<feed xmlns="http://www.w3.org/2005/Atom">
      <entry>
        <id>a</id><title>Fine</title><updated>yesterday</updated>
        <link href="https://arxiv.org/abs/2410.07718"/><summary>ok</summary>
      </entry>
    </feed>"#;
    assert!(matches!(parse_feed(feed), Err(ShelfError::Timestamp(_))));
  }

  #[test]
  fn test_search_url_encodes_keyword() {
    let client = SearchClient::new();
    let url = client.search_url("Hallo2: long duration & more").unwrap();
    assert_eq!(
      url.as_str(),
      "https://papers.cool/arxiv/search/feed?query=Hallo2%3A+long+duration+%26+more"
    );
  }

  #[traced_test]
  #[tokio::test]
  async fn test_search_against_feed() {
    let mut server = Server::new_async().await;
    let mock = server
      .mock("GET", "/arxiv/search/feed")
      .match_query(Matcher::UrlEncoded("query".into(), "Hallo2".into()))
      .with_status(200)
      .with_header("content-type", "application/atom+xml")
      .with_body(FEED)
      .expect(1)
      .create_async()
      .await;

    let client =
      SearchClient::new().with_endpoint(&format!("{}/arxiv/search/feed", server.url()));
    let results = client.search("Hallo2").await.unwrap();

    mock.assert_async().await;
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].arxiv_link.as_deref(), Some("https://arxiv.org/abs/2410.07718v1"));
  }

  #[tokio::test]
  async fn test_search_non_ok_status() {
    let mut server = Server::new_async().await;
    let _mock = server
      .mock("GET", "/feed")
      .match_query(Matcher::Any)
      .with_status(503)
      .create_async()
      .await;

    let client = SearchClient::new().with_endpoint(&format!("{}/feed", server.url()));
    let result = client.search("anything").await;
    assert!(matches!(result, Err(ShelfError::SearchFailed(503))));
  }
}
