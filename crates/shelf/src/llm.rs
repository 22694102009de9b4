//! Question answering over a PDF with Gemini.
//!
//! [`DocumentReader`] is the seam the question history talks to: a question and a
//! document go in, an answer comes out, or nothing if anything went wrong along the
//! way. [`GeminiReader`] implements it on top of the Gemini `generateContent` REST
//! endpoint, sending the PDF inline next to the question.
//!
//! The lower level [`GeminiRequest`] builder can be used directly:
//!
//! ```no_run
//! use shelf::llm::GeminiRequest;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let pdf = std::fs::read("paper.pdf")?;
//! let response = GeminiRequest::new()
//!   .with_host("https://generativelanguage.googleapis.com")
//!   .with_model("gemini-2.0-flash-exp")
//!   .with_api_key("...")
//!   .with_question("What problem does this paper try to solve?")
//!   .with_document(&pdf)
//!   .send(&reqwest::Client::new())
//!   .await?;
//! println!("{}", response.text().unwrap_or_default());
//! # Ok(())
//! # }
//! ```

use base64::{engine::general_purpose::STANDARD as BASE64_STANDARD, Engine};

use super::*;

/// Default Gemini API host.
pub const DEFAULT_GEMINI_HOST: &str = "https://generativelanguage.googleapis.com";

/// Default Gemini model.
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash-exp";

/// Something that can answer questions about a document on disk.
#[async_trait]
pub trait DocumentReader: Send + Sync {
  /// Asks `question` about the document at `document`.
  ///
  /// Returns `None` on any failure; implementations log the reason.
  async fn ask(&self, question: &str, document: &Path) -> Option<String>;
}

/// Request builder for the Gemini `generateContent` endpoint.
#[derive(Debug, Serialize, Default)]
pub struct GeminiRequest {
  /// Conversation turns, only ever a single user turn here
  pub contents: Vec<Content>,

  #[serde(skip)]
  host:    Option<String>,
  #[serde(skip)]
  model:   Option<String>,
  #[serde(skip)]
  api_key: Option<String>,
}

/// One turn of a Gemini conversation.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Content {
  /// Who is speaking
  pub role:  String,
  /// Text and inline data, in order
  pub parts: Vec<Part>,
}

/// A piece of a [`Content`] turn.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Part {
  /// Plain text
  Text {
    /// The text
    text: String,
  },
  /// A base64 encoded document
  InlineData {
    /// The document
    inline_data: Blob,
  },
}

/// Inline binary data.
#[derive(Debug, Clone, Serialize)]
pub struct Blob {
  /// MIME type of the decoded data
  pub mime_type: String,
  /// Base64 encoded bytes
  pub data:      String,
}

/// Response of the `generateContent` endpoint, reduced to what is read from it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GeminiResponse {
  /// Generated candidates, best first
  #[serde(default)]
  pub candidates: Vec<Candidate>,
}

/// One generated answer.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Candidate {
  /// Missing when the candidate was blocked
  #[serde(default)]
  pub content: Option<CandidateContent>,
}

/// The generated turn of a [`Candidate`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CandidateContent {
  /// Generated parts, in order
  #[serde(default)]
  pub parts: Vec<CandidatePart>,
}

/// A generated part; only text parts are read.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CandidatePart {
  /// Generated text
  #[serde(default)]
  pub text: Option<String>,
}

impl GeminiResponse {
  /// The concatenated text of the first candidate, if it has any.
  pub fn text(&self) -> Option<String> {
    let content = self.candidates.first()?.content.as_ref()?;
    let text: String = content.parts.iter().filter_map(|part| part.text.as_deref()).collect();
    (!text.is_empty()).then_some(text)
  }
}

impl GeminiRequest {
  /// An empty request without host, model or key.
  pub fn new() -> Self { Self::default() }

  /// Sets the API host.
  pub fn with_host(mut self, host: &str) -> Self {
    self.host = Some(host.trim_end_matches('/').to_string());
    self
  }

  /// Sets the model name.
  pub fn with_model(mut self, model: &str) -> Self {
    self.model = Some(model.to_string());
    self
  }

  /// Sets the key sent as the `key` query parameter.
  pub fn with_api_key(mut self, api_key: &str) -> Self {
    self.api_key = Some(api_key.to_string());
    self
  }

  /// Adds the question as a text part.
  pub fn with_question(mut self, question: &str) -> Self {
    self.user_turn().parts.push(Part::Text { text: question.to_string() });
    self
  }

  /// Adds a PDF as an inline data part.
  pub fn with_document(mut self, pdf: &[u8]) -> Self {
    self.user_turn().parts.push(Part::InlineData {
      inline_data: Blob {
        mime_type: "application/pdf".to_string(),
        data:      BASE64_STANDARD.encode(pdf),
      },
    });
    self
  }

  fn user_turn(&mut self) -> &mut Content {
    if self.contents.is_empty() {
      self.contents.push(Content { role: "user".to_string(), parts: Vec::new() });
    }
    let last = self.contents.len() - 1;
    &mut self.contents[last]
  }

  /// The endpoint URL, API key included.
  pub fn url(&self) -> Result<Url> {
    let host = self.host.as_deref().unwrap_or_else(|| {
      warn!("No host set, using {DEFAULT_GEMINI_HOST}");
      DEFAULT_GEMINI_HOST
    });
    let model = self.model.as_deref().unwrap_or_else(|| {
      warn!("No model set, using {DEFAULT_GEMINI_MODEL}");
      DEFAULT_GEMINI_MODEL
    });
    let Some(api_key) = &self.api_key else {
      return Err(ShelfError::Config("No Gemini API key set".into()));
    };

    let mut url = Url::parse(&format!("{host}/v1beta/models/{model}:generateContent"))
      .map_err(|e| ShelfError::Config(format!("Invalid Gemini host {host}: {e}")))?;
    url.query_pairs_mut().append_pair("key", api_key);
    Ok(url)
  }

  /// Sends the request.
  ///
  /// # Errors
  ///
  /// - [`ShelfError::Config`] without an API key
  /// - [`ShelfError::Llm`] if the request is empty or the service answers with an
  ///   error status
  /// - [`ShelfError::Network`] if the service cannot be reached
  pub async fn send(&self, client: &Client) -> Result<GeminiResponse> {
    let url = self.url()?;
    if self.contents.iter().all(|content| content.parts.is_empty()) {
      return Err(ShelfError::Llm("Nothing to ask".into()));
    }

    let response = client.post(url).json(&self).send().await?;
    let status = response.status();
    if !status.is_success() {
      let body = response.text().await.unwrap_or_default();
      return Err(ShelfError::Llm(format!("Gemini answered with status {status}: {body}")));
    }
    Ok(response.json().await?)
  }
}

/// [`DocumentReader`] backed by Gemini.
#[derive(Debug, Clone)]
pub struct GeminiReader {
  client:  Client,
  host:    String,
  model:   String,
  api_key: String,
}

impl GeminiReader {
  /// A reader using the default host and model.
  pub fn new(api_key: &str) -> Self {
    Self {
      client:  Client::new(),
      host:    DEFAULT_GEMINI_HOST.to_string(),
      model:   DEFAULT_GEMINI_MODEL.to_string(),
      api_key: api_key.to_string(),
    }
  }

  /// A reader set up from `config`, the API key taken from the environment if the
  /// configuration has none.
  pub fn from_config(config: &Config) -> Result<Self> {
    let api_key = config.api_key().ok_or_else(|| {
      ShelfError::Config(format!(
        "No Gemini API key configured, set {} or add one to the configuration",
        config::API_KEY_VAR
      ))
    })?;
    Ok(Self::new(&api_key).with_host(&config.llm.host).with_model(&config.llm.model))
  }

  /// Uses an existing HTTP client.
  pub fn with_client(mut self, client: Client) -> Self {
    self.client = client;
    self
  }

  /// Sets the API host.
  pub fn with_host(mut self, host: &str) -> Self {
    self.host = host.trim_end_matches('/').to_string();
    self
  }

  /// Sets the model name.
  pub fn with_model(mut self, model: &str) -> Self {
    self.model = model.to_string();
    self
  }

  /// The model answering questions.
  pub fn model(&self) -> &str { &self.model }

  async fn try_ask(&self, question: &str, document: &Path) -> Result<Option<String>> {
    let pdf = tokio::fs::read(document).await?;
    let response = GeminiRequest::new()
      .with_host(&self.host)
      .with_model(&self.model)
      .with_api_key(&self.api_key)
      .with_question(question)
      .with_document(&pdf)
      .send(&self.client)
      .await?;
    Ok(response.text())
  }
}

#[async_trait]
impl DocumentReader for GeminiReader {
  #[instrument(skip(self, question), fields(model = %self.model))]
  async fn ask(&self, question: &str, document: &Path) -> Option<String> {
    match self.try_ask(question, document).await {
      Ok(Some(answer)) => Some(answer),
      Ok(None) => {
        warn!("Gemini returned no text for {}", document.display());
        None
      },
      Err(e) => {
        error!("An error occurred: {e}");
        None
      },
    }
  }
}

#[cfg(test)]
mod tests {
  use mockito::{Matcher, Server};

  use super::*;

  const PDF: &[u8] = b"%PDF-1.4\n%%EOF\n";

  const ANSWER: &str = r#"{
    "candidates": [{
      "content": {
        "parts": [{"text": "The paper animates portraits "}, {"text": "from audio."}],
        "role": "model"
      },
      "finishReason": "STOP"
    }],
    "modelVersion": "gemini-2.0-flash-exp"
  }"#;

  fn write_pdf() -> (tempfile::TempDir, PathBuf) {
    let dir = tempdir().unwrap();
    let path = dir.path().join("paper.pdf");
    std::fs::write(&path, PDF).unwrap();
    (dir, path)
  }

  #[test]
  fn test_request_body() {
    let request = GeminiRequest::new().with_question("What?").with_document(PDF);
    let body = serde_json::to_value(&request).unwrap();
    assert_eq!(body["contents"][0]["role"], "user");
    assert_eq!(body["contents"][0]["parts"][0]["text"], "What?");
    assert_eq!(body["contents"][0]["parts"][1]["inline_data"]["mime_type"], "application/pdf");
    assert_eq!(body["contents"][0]["parts"][1]["inline_data"]["data"], BASE64_STANDARD.encode(PDF));
    assert!(body.get("host").is_none());
  }

  #[traced_test]
  #[test]
  fn test_url_warnings() {
    let url = GeminiRequest::new().with_api_key("secret").url().unwrap();
    assert_eq!(
      url.as_str(),
      "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash-exp:generateContent?key=secret"
    );
    assert!(logs_contain("No host set"));
    assert!(logs_contain("No model set"));

    assert!(matches!(GeminiRequest::new().url(), Err(ShelfError::Config(_))));
  }

  #[test]
  fn test_response_text() {
    let response: GeminiResponse = serde_json::from_str(ANSWER).unwrap();
    assert_eq!(response.text().as_deref(), Some("The paper animates portraits from audio."));

    let blocked: GeminiResponse =
      serde_json::from_str(r#"{"candidates": [{"finishReason": "SAFETY"}]}"#).unwrap();
    assert_eq!(blocked.text(), None);
    assert_eq!(GeminiResponse::default().text(), None);
  }

  #[tokio::test]
  async fn test_reader_answers() {
    let mut server = Server::new_async().await;
    let encoded = BASE64_STANDARD.encode(PDF);
    let mock = server
      .mock("POST", "/v1beta/models/test-model:generateContent")
      .match_query(Matcher::UrlEncoded("key".into(), "test-key".into()))
      .match_body(Matcher::AllOf(vec![
        Matcher::Regex("application/pdf".into()),
        Matcher::Regex(regex::escape(&encoded)),
        Matcher::Regex("What does it do\\?".into()),
      ]))
      .with_status(200)
      .with_header("content-type", "application/json")
      .with_body(ANSWER)
      .expect(1)
      .create_async()
      .await;

    let (_dir, pdf) = write_pdf();
    let reader = GeminiReader::new("test-key").with_host(&server.url()).with_model("test-model");
    let answer = reader.ask("What does it do?", &pdf).await;

    mock.assert_async().await;
    assert_eq!(answer.as_deref(), Some("The paper animates portraits from audio."));
  }

  #[traced_test]
  #[tokio::test]
  async fn test_reader_failure_is_none() {
    let mut server = Server::new_async().await;
    let _mock = server
      .mock("POST", "/v1beta/models/gemini-2.0-flash-exp:generateContent")
      .match_query(Matcher::Any)
      .with_status(400)
      .with_body(r#"{"error": {"code": 400, "message": "API key not valid."}}"#)
      .create_async()
      .await;

    let (_dir, pdf) = write_pdf();
    let reader = GeminiReader::new("bad-key").with_host(&server.url());
    assert_eq!(reader.ask("Anything?", &pdf).await, None);
    assert!(logs_contain("API key not valid"));

    assert_eq!(reader.ask("Anything?", Path::new("/nonexistent/paper.pdf")).await, None);
  }

  #[test]
  fn test_from_config() {
    let config = Config::default().with_api_key("configured");
    let reader = GeminiReader::from_config(&config).unwrap();
    assert_eq!(reader.model(), "gemini-2.0-flash-exp");
    assert_eq!(reader.api_key, "configured");

    if std::env::var(config::API_KEY_VAR).is_err() {
      assert!(matches!(GeminiReader::from_config(&Config::default()), Err(ShelfError::Config(_))));
    }
  }
}
