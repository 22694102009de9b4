//! Research-paper shelving: resolve loose paper descriptors, download the PDFs into
//! folder-per-paper libraries, and ask questions about them.
//!
//! `shelf` is the library half of the `shelf` command line tool. It provides:
//!
//! - Classification of raw descriptors (GitHub repos, arXiv links, PDF links, titles)
//! - arXiv link discovery from GitHub READMEs and from a paper search feed
//! - Canonical arXiv records with titles scraped from abstract pages
//! - Libraries on disk with idempotent, folder-per-paper storage
//! - Question answering over stored PDFs through an LLM, with a session history
//!
//! # Getting Started
//!
//! ```no_run
//! use shelf::{config::Config, library::Library, prelude::*, resolver::Resolver};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!   let config = Config::default();
//!   let library = Library::create(&config.library_root, "talking-heads")?;
//!
//!   let resolver = Resolver::from_config(&config)?;
//!   let papers = resolver.resolve(["https://github.com/Zejun-Yang/AniPortrait"]).await?;
//!
//!   let added = library.persist(&papers, resolver.client()).await?;
//!   println!("{} added", added.len());
//!   Ok(())
//! }
//! ```
//!
//! # Module Organization
//!
//! - [`descriptor`]: Classification of raw inputs and descriptor files
//! - [`search`]: Keyword search against an arXiv-mirroring Atom feed
//! - [`github`]: arXiv link discovery from GitHub READMEs
//! - [`arxiv`]: Canonical arXiv links and abstract-page titles
//! - [`resolver`]: The descriptor resolution pipeline
//! - [`library`]: Libraries, paper folders and PDF downloads
//! - [`llm`]: Question answering over a PDF
//! - [`history`]: Question sessions and their stored answers
//! - [`config`]: On-disk configuration
//! - [`format`]: Filesystem-safe names

#![warn(missing_docs)]

use std::{
  collections::{BTreeSet, HashMap},
  fmt::Display,
  path::{Path, PathBuf},
  time::Duration,
};

use async_trait::async_trait;
use chrono::{DateTime, Local, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, trace, warn};
#[cfg(test)]
use {tempfile::tempdir, tracing_test::traced_test};

pub mod arxiv;
pub mod config;
pub mod descriptor;
pub mod error;
pub mod format;
pub mod github;
pub mod history;
pub mod library;
pub mod llm;
pub mod resolver;
pub mod search;

use crate::{config::Config, error::*};

/// Common traits and types for ergonomic imports.
///
/// ```no_run
/// use shelf::{library::Library, prelude::*};
///
/// fn example() -> Result<(), ShelfError> {
///   let library = Library::open("libraries", "talking-heads")?;
///   println!("{} papers", library.papers()?.len());
///   Ok(())
/// }
/// ```
pub mod prelude {
  pub use crate::{error::ShelfError, llm::DocumentReader};
}
