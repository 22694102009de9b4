//! The descriptor resolution pipeline.
//!
//! [`Resolver::resolve`] turns a batch of raw descriptors into canonical arXiv records:
//!
//! 1. Descriptors are classified into buckets. Direct PDF links are not supported and
//!    reject the batch.
//! 2. GitHub repositories are normalized to `owner/repo`, deduplicated, and their
//!    READMEs scanned for arXiv links. A repository without one falls back to its name
//!    as a title.
//! 3. Titles are looked up in the search feed; the first result's arXiv link is used.
//! 4. Every arXiv link is expanded into its `/abs/` and `/pdf/` forms and the title is
//!    read from the abstract page.
//! 5. Records are deduplicated by abstract link, the last one winning, and records
//!    without a title are dropped.
//!
//! Every step past classification is best effort: a descriptor that cannot be
//! resolved is logged and skipped, it never fails the batch. The output order is not
//! the input order.

use std::hash::Hash;

use crate::{
  arxiv::{ArxivClient, ArxivLinks},
  descriptor::Buckets,
  github::{normalize_github_repo_url, GithubClient},
  search::SearchClient,
};

use super::*;

/// A paper resolved to its canonical arXiv links.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedPaper {
  /// Title as published on the abstract page
  pub title:       String,
  /// `https://arxiv.org/abs/<id>`
  pub arxiv_url:   String,
  /// `https://arxiv.org/pdf/<id>`
  pub pdf_url:     String,
  /// Repository the paper came from; resolution leaves this empty
  pub github_repo: Option<String>,
}

/// A materialized arXiv record whose title lookup may have failed.
#[derive(Debug, Clone)]
struct Candidate {
  links: ArxivLinks,
  title: Option<String>,
}

/// Runs descriptors through the resolution pipeline.
#[derive(Debug, Clone, Default)]
pub struct Resolver {
  /// HTTP client shared by all stages
  client: Client,
  search: SearchClient,
  github: GithubClient,
  arxiv:  ArxivClient,
}

impl Resolver {
  /// A resolver talking to the public endpoints.
  pub fn new() -> Self { Self::default() }

  /// A resolver using the endpoints and timeouts of `config`.
  pub fn from_config(config: &Config) -> Result<Self> {
    let client =
      Client::builder().user_agent(concat!("shelf/", env!("CARGO_PKG_VERSION"))).build()?;

    Ok(Self {
      search: SearchClient::new()
        .with_client(client.clone())
        .with_endpoint(&config.search_endpoint),
      github: GithubClient::new()
        .with_client(client.clone())
        .with_raw_host(&config.github_raw_host)
        .with_timeout(config.readme_timeout()),
      arxiv: ArxivClient::new().with_client(client.clone()).with_host(&config.arxiv_host),
      client,
    })
  }

  /// Replaces the search client.
  pub fn with_search(mut self, search: SearchClient) -> Self {
    self.search = search;
    self
  }

  /// Replaces the GitHub client.
  pub fn with_github(mut self, github: GithubClient) -> Self {
    self.github = github;
    self
  }

  /// Replaces the arXiv client.
  pub fn with_arxiv(mut self, arxiv: ArxivClient) -> Self {
    self.arxiv = arxiv;
    self
  }

  /// The HTTP client shared by the pipeline, handy for downloading the results.
  pub fn client(&self) -> &Client { &self.client }

  /// Resolves a batch of descriptors.
  ///
  /// # Errors
  ///
  /// [`ShelfError::UnsupportedDescriptor`] if any descriptor is a direct PDF link. No
  /// network request is made in that case. Failures of individual descriptors are
  /// logged and leave them out of the result.
  ///
  /// # Examples
  ///
  /// ```no_run
  /// # use shelf::resolver::Resolver;
  /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
  /// let papers = Resolver::new()
  ///   .resolve(["https://github.com/Zejun-Yang/AniPortrait", "Attention Is All You Need"])
  ///   .await?;
  /// for paper in papers {
  ///   println!("{} ({})", paper.title, paper.arxiv_url);
  /// }
  /// # Ok(())
  /// # }
  /// ```
  pub async fn resolve<I, S>(&self, descriptors: I) -> Result<Vec<ResolvedPaper>>
  where
    I: IntoIterator<Item = S>,
    S: AsRef<str>, {
    let Buckets { github_repos, mut arxiv_urls, pdf_urls, mut titles } =
      Buckets::classify(descriptors);

    info!(
      "Found {} GitHub repos, {} arXiv URLs, {} PDF URLs, {} paper titles",
      github_repos.len(),
      arxiv_urls.len(),
      pdf_urls.len(),
      titles.len()
    );

    if !pdf_urls.is_empty() {
      return Err(ShelfError::UnsupportedDescriptor(pdf_urls));
    }

    let (github_urls, fallback_titles) = self.github_to_arxiv(&github_repos).await;
    arxiv_urls.extend(github_urls);
    titles.extend(fallback_titles);

    arxiv_urls.extend(self.titles_to_arxiv(&titles).await);

    let candidates = self.materialize(&arxiv_urls).await;
    let papers: Vec<ResolvedPaper> =
      dedup_last_wins(candidates, |candidate| candidate.links.abs_url.clone())
        .into_iter()
        .filter_map(|Candidate { links, title }| {
          title.map(|title| ResolvedPaper {
            title,
            arxiv_url: links.abs_url,
            pdf_url: links.pdf_url,
            github_repo: None,
          })
        })
        .collect();

    info!("Number of unique papers: {}", papers.len());
    Ok(papers)
  }

  /// Resolves GitHub descriptors to arXiv links, returning the links and the names of
  /// the repositories that had none.
  async fn github_to_arxiv(&self, descriptors: &[String]) -> (Vec<String>, Vec<String>) {
    let repos: BTreeSet<String> = descriptors
      .iter()
      .filter_map(|descriptor| {
        let repo = normalize_github_repo_url(descriptor);
        if repo.is_none() {
          warn!("Not a GitHub repository URL: {descriptor}");
        }
        repo
      })
      .collect();
    debug!("GitHub repos: {repos:?}");

    let mut arxiv_urls = Vec::new();
    let mut titles = Vec::new();
    for repo in repos {
      match self.github.resolve_arxiv_links(&repo).await {
        Ok(links) => {
          info!("Found arXiv paper in {repo}: {}", links[0]);
          arxiv_urls.push(links[0].clone());
        },
        Err(e) => {
          info!("{e}, searching by repository name instead");
          let name = repo.rsplit('/').next().unwrap_or(&repo);
          titles.push(name.to_string());
        },
      }
    }
    (arxiv_urls, titles)
  }

  async fn titles_to_arxiv(&self, titles: &[String]) -> Vec<String> {
    let mut arxiv_urls = Vec::new();
    for title in titles {
      match self.title_to_arxiv(title).await {
        Ok(url) => {
          info!("Found arXiv URL for {title}: {url}");
          arxiv_urls.push(url);
        },
        Err(e) if e.is_item_scoped() => info!("Failed to find arXiv URL for {title}: {e}"),
        Err(e) => error!("Searching for {title} failed: {e}"),
      }
    }
    arxiv_urls
  }

  /// The arXiv link of the first search result for `title`.
  async fn title_to_arxiv(&self, title: &str) -> Result<String> {
    self
      .search
      .search(title)
      .await?
      .into_iter()
      .next()
      .and_then(|result| result.arxiv_link)
      .ok_or_else(|| ShelfError::NoSearchMatch(title.to_string()))
  }

  async fn materialize(&self, arxiv_urls: &[String]) -> Vec<Candidate> {
    let mut candidates = Vec::with_capacity(arxiv_urls.len());
    for url in arxiv_urls {
      let links = match ArxivLinks::parse(url) {
        Ok(links) => links,
        Err(e) => {
          info!("{e}");
          continue;
        },
      };

      let title = match self.arxiv.fetch_title(&links).await {
        Ok(title) => Some(title),
        Err(e) => {
          error!("Could not read the title of {links}: {e}");
          None
        },
      };
      candidates.push(Candidate { links, title });
    }
    candidates
  }
}

/// Collapses items sharing a key, keeping the last item for each key.
///
/// Each surviving item takes the position where its key first appeared.
///
/// ```
/// use shelf::resolver::dedup_last_wins;
///
/// let deduped = dedup_last_wins(vec![("a", 1), ("b", 2), ("a", 3)], |(key, _)| *key);
/// assert_eq!(deduped, vec![("a", 3), ("b", 2)]);
/// ```
pub fn dedup_last_wins<T, K, F>(items: Vec<T>, key: F) -> Vec<T>
where
  K: Hash + Eq,
  F: Fn(&T) -> K, {
  let mut positions: HashMap<K, usize> = HashMap::new();
  let mut deduped: Vec<T> = Vec::with_capacity(items.len());
  for item in items {
    match positions.get(&key(&item)) {
      Some(&position) => deduped[position] = item,
      None => {
        positions.insert(key(&item), deduped.len());
        deduped.push(item);
      },
    }
  }
  deduped
}
