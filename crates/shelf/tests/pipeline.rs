//! End to end: descriptors in, papers on disk, questions answered.
//!
//! Every remote service is played by a local mock server.

use std::path::Path;

use async_trait::async_trait;
use mockito::{Matcher, Server};
use shelf::{
  config::Config,
  descriptor::parse_descriptors,
  history::History,
  library::{Library, INFO_FILE},
  prelude::*,
  resolver::Resolver,
};
use tempfile::tempdir;

const PDF: &[u8] = b"%PDF-1.4\n%%EOF\n";

struct EchoReader;

#[async_trait]
impl DocumentReader for EchoReader {
  async fn ask(&self, question: &str, document: &Path) -> Option<String> {
    let size = std::fs::metadata(document).ok()?.len();
    Some(format!("{question} ({size} bytes)"))
  }
}

fn abstract_page(title: &str) -> String {
  format!(r#"<html><head><meta property="og:title" content="{title}" /></head></html>"#)
}

#[tokio::test]
async fn test_descriptor_file_to_answers() -> anyhow::Result<()> {
  let mut server = Server::new_async().await;

  let _readme = server
    .mock("GET", "/Zejun-Yang/AniPortrait/refs/heads/main/README.md")
    .with_status(200)
    .with_body("Paper: https://arxiv.org/abs/2403.17694")
    .create_async()
    .await;
  let _search = server
    .mock("GET", "/feed")
    .match_query(Matcher::UrlEncoded("query".into(), "Attention Is All You Need".into()))
    .with_status(200)
    .with_body(
      r#"<feed xmlns="http://www.w3.org/2005/Atom">
        <entry>
          <id>https://papers.cool/arxiv/1706.03762</id>
          <title>Attention Is All You Need</title>
          <updated>2017-06-12T17:57:34Z</updated>
          <author><name>Ashish Vaswani</name></author>
          <link href="https://papers.cool/arxiv/1706.03762"/>
          <summary>The dominant sequence transduction models...</summary>
        </entry>
      </feed>"#,
    )
    .create_async()
    .await;
  let _ani_page = server
    .mock("GET", "/abs/2403.17694")
    .with_status(200)
    .with_body(abstract_page(
      "AniPortrait: Audio-Driven Synthesis of Photorealistic Portrait Animation",
    ))
    .create_async()
    .await;
  let _attention_page = server
    .mock("GET", "/abs/1706.03762")
    .with_status(200)
    .with_body(abstract_page("Attention Is All You Need"))
    .create_async()
    .await;

  let dir = tempdir()?;
  let config = Config::default()
    .with_library_root(&dir.path().join("libraries"))
    .with_history_root(&dir.path().join("history"))
    .with_search_endpoint(&format!("{}/feed", server.url()))
    .with_github_raw_host(&server.url())
    .with_arxiv_host(&server.url());
  config.ensure_directories()?;

  let descriptors = parse_descriptors(
    "# talking heads\nhttps://github.com/Zejun-Yang/AniPortrait\n\nAttention Is All You Need\n",
  );
  let papers = Resolver::from_config(&config)?.resolve(&descriptors).await?;
  assert_eq!(papers.len(), 2);

  // The resolved PDF links point at arxiv.org, serve them locally instead
  let local: Vec<_> = papers
    .into_iter()
    .map(|mut paper| {
      paper.pdf_url = paper.pdf_url.replace("https://arxiv.org", &server.url());
      paper
    })
    .collect();
  let _ani_pdf =
    server.mock("GET", "/pdf/2403.17694").with_status(200).with_body(PDF).create_async().await;
  let _attention_pdf =
    server.mock("GET", "/pdf/1706.03762").with_status(200).with_body(PDF).create_async().await;

  let library = Library::create(&config.library_root, "talking-heads")?;
  let added = library.persist(&local, &reqwest::Client::new()).await?;
  assert_eq!(added.len(), 2);
  for info in &added {
    assert!(library.paper_folder(&info.entry_name).join(INFO_FILE).exists());
  }

  let history = History::new(&config.history_root);
  let session = history.ask(&library, &EchoReader, "What is new?", &[]).await?;
  assert_eq!(session.metadata.responses, vec![true, true]);
  assert!(session.responses.iter().all(|r| r.answer.as_deref() == Some("What is new? (15 bytes)")));

  let listed = history.list()?;
  assert_eq!(listed.len(), 1);
  assert_eq!(listed[0].library, "talking-heads");
  Ok(())
}
