//! On-disk configuration for shelf.
//!
//! The configuration lives in a TOML file, by default at
//! `<config dir>/shelf/config.toml`. Every field has a default, so a missing file or a
//! partial file are both fine.
//!
//! ```toml
//! library_root = "/home/me/.local/share/shelf/libraries"
//! history_root = "/home/me/.local/share/shelf/history"
//! search_endpoint = "https://papers.cool/arxiv/search/feed"
//! readme_timeout_secs = 10
//!
//! [llm]
//! model = "gemini-2.0-flash-exp"
//! ```

use super::*;

/// Environment variable consulted when no API key is configured.
pub const API_KEY_VAR: &str = "GEMINI_API_KEY";

/// Locations and remote endpoints used by the library.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
  /// Directory holding one sub-directory per library
  pub library_root:        PathBuf,
  /// Directory holding one sub-directory per question session
  pub history_root:        PathBuf,
  /// Atom search feed queried with `?query=<keyword>`
  pub search_endpoint:     String,
  /// Host serving raw GitHub file contents
  pub github_raw_host:     String,
  /// Host serving arXiv abstract pages
  pub arxiv_host:          String,
  /// Timeout applied to each README fetch
  pub readme_timeout_secs: u64,
  /// Question answering settings
  pub llm:                 LlmConfig,
}

/// Settings for the question answering model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
  /// Base URL of the Gemini API
  pub host:    String,
  /// Model name
  pub model:   String,
  /// API key, falls back to [`API_KEY_VAR`] when absent
  pub api_key: Option<String>,
}

impl Default for Config {
  fn default() -> Self {
    let data_dir = Self::default_data_dir();
    Self {
      library_root:        data_dir.join("libraries"),
      history_root:        data_dir.join("history"),
      search_endpoint:     "https://papers.cool/arxiv/search/feed".to_string(),
      github_raw_host:     "https://raw.githubusercontent.com".to_string(),
      arxiv_host:          "https://arxiv.org".to_string(),
      readme_timeout_secs: 10,
      llm:                 LlmConfig::default(),
    }
  }
}

impl Default for LlmConfig {
  fn default() -> Self {
    Self {
      host:    "https://generativelanguage.googleapis.com".to_string(),
      model:   "gemini-2.0-flash-exp".to_string(),
      api_key: None,
    }
  }
}

impl Config {
  /// Default location of the configuration file.
  ///
  /// - On Unix: `~/.config/shelf/config.toml`
  /// - On macOS: `~/Library/Application Support/shelf/config.toml`
  /// - On Windows: `%APPDATA%\shelf\config.toml`
  /// - Fallback: `./shelf/config.toml`
  pub fn default_path() -> PathBuf {
    dirs::config_dir().unwrap_or_else(|| PathBuf::from(".")).join("shelf").join("config.toml")
  }

  /// Default parent directory of the library and history roots.
  pub fn default_data_dir() -> PathBuf {
    dirs::data_dir().unwrap_or_else(|| PathBuf::from(".")).join("shelf")
  }

  /// Reads a configuration file.
  pub fn load(path: impl AsRef<Path>) -> Result<Self> {
    let content = std::fs::read_to_string(path.as_ref())?;
    Ok(toml::from_str(&content)?)
  }

  /// Reads a configuration file, or returns the defaults if there is none.
  pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref();
    if path.exists() {
      Self::load(path)
    } else {
      debug!("No configuration at {}, using defaults", path.display());
      Ok(Self::default())
    }
  }

  /// Writes this configuration, creating parent directories as needed.
  pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, toml::to_string_pretty(self)?)?;
    Ok(())
  }

  /// Creates the library and history roots if they are missing.
  pub fn ensure_directories(&self) -> Result<()> {
    std::fs::create_dir_all(&self.library_root)?;
    std::fs::create_dir_all(&self.history_root)?;
    Ok(())
  }

  /// Sets the directory holding the libraries.
  pub fn with_library_root(mut self, path: &Path) -> Self {
    self.library_root = path.to_path_buf();
    self
  }

  /// Sets the directory holding question sessions.
  pub fn with_history_root(mut self, path: &Path) -> Self {
    self.history_root = path.to_path_buf();
    self
  }

  /// Sets the keyword search feed.
  pub fn with_search_endpoint(mut self, endpoint: &str) -> Self {
    self.search_endpoint = endpoint.to_string();
    self
  }

  /// Sets the host serving raw README files.
  pub fn with_github_raw_host(mut self, host: &str) -> Self {
    self.github_raw_host = host.trim_end_matches('/').to_string();
    self
  }

  /// Sets the host serving arXiv abstract pages.
  pub fn with_arxiv_host(mut self, host: &str) -> Self {
    self.arxiv_host = host.trim_end_matches('/').to_string();
    self
  }

  /// Sets the Gemini API key.
  pub fn with_api_key(mut self, api_key: &str) -> Self {
    self.llm.api_key = Some(api_key.to_string());
    self
  }

  /// Timeout for a single README fetch.
  pub fn readme_timeout(&self) -> Duration { Duration::from_secs(self.readme_timeout_secs) }

  /// The configured API key, or the one in the environment.
  pub fn api_key(&self) -> Option<String> {
    self.llm.api_key.clone().or_else(|| std::env::var(API_KEY_VAR).ok())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_default_path() {
    let path = Config::default_path();
    assert!(path.ends_with("shelf/config.toml") || path.ends_with("shelf\\config.toml"));
  }

  #[test]
  fn test_save_and_load() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("config.toml");
    let config = Config::default()
      .with_library_root(&dir.path().join("libraries"))
      .with_search_endpoint("http://localhost:1234/feed")
      .with_api_key("secret");

    config.save(&path).unwrap();
    let loaded = Config::load(&path).unwrap();
    assert_eq!(loaded, config);
    assert_eq!(loaded.api_key().as_deref(), Some("secret"));
  }

  #[test]
  fn test_partial_file_uses_defaults() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "readme_timeout_secs = 3\n").unwrap();

    let config = Config::load(&path).unwrap();
    assert_eq!(config.readme_timeout(), Duration::from_secs(3));
    assert_eq!(config.search_endpoint, Config::default().search_endpoint);
    assert_eq!(config.llm.model, "gemini-2.0-flash-exp");
  }

  #[test]
  fn test_missing_file_is_default() {
    let dir = tempdir().unwrap();
    let config = Config::load_or_default(dir.path().join("absent.toml")).unwrap();
    assert_eq!(config, Config::default());
  }
}
