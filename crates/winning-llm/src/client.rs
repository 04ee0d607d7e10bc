//! Async HTTP client for the OpenAI embeddings and chat-completions APIs.

use std::time::Duration;

use reqwest::Client;
use serde::{Serialize, de::DeserializeOwned};
use winning_rag::{Embedder, TextGenerator};

use crate::{
  Error, Result,
  wire::{ChatMessage, ChatRequest, ChatResponse, EmbeddingRequest, EmbeddingResponse},
};

/// Connection settings for an OpenAI-compatible provider.
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
  /// API root including the version segment, e.g. `https://api.openai.com/v1`.
  pub base_url:         String,
  /// Sent as a bearer token; omitted when empty.
  pub api_key:          String,
  pub embedding_model:  String,
  pub generation_model: String,
  pub timeout:          Duration,
}

impl Default for OpenAiConfig {
  fn default() -> Self {
    Self {
      base_url:         "https://api.openai.com/v1".into(),
      api_key:          String::new(),
      embedding_model:  "text-embedding-3-small".into(),
      generation_model: "gpt-4o".into(),
      timeout:          Duration::from_secs(60),
    }
  }
}

/// Embeddings and chat completions over one HTTP connection pool.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct OpenAiClient {
  client: Client,
  config: OpenAiConfig,
}

impl OpenAiClient {
  pub fn new(config: OpenAiConfig) -> Result<Self> {
    let client = Client::builder().timeout(config.timeout).build()?;
    Ok(Self { client, config })
  }

  fn url(&self, path: &str) -> String {
    format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
  }

  async fn post<T, R>(&self, endpoint: &'static str, body: &T) -> Result<R>
  where
    T: Serialize + Sync + ?Sized,
    R: DeserializeOwned,
  {
    let mut req = self.client.post(self.url(endpoint)).json(body);
    if !self.config.api_key.is_empty() {
      req = req.bearer_auth(&self.config.api_key);
    }
    let resp = req.send().await?;

    let status = resp.status();
    if !status.is_success() {
      let body = resp.text().await.unwrap_or_default();
      tracing::warn!(endpoint, status = status.as_u16(), "provider request failed");
      return Err(Error::Status { endpoint, status: status.as_u16(), body });
    }
    Ok(resp.json().await?)
  }

  /// `POST /embeddings`
  pub async fn embed_text(&self, text: &str) -> Result<Vec<f32>> {
    let resp: EmbeddingResponse = self
      .post("/embeddings", &EmbeddingRequest {
        model: &self.config.embedding_model,
        input: text,
      })
      .await?;
    resp
      .data
      .into_iter()
      .next()
      .map(|d| d.embedding)
      .filter(|e| !e.is_empty())
      .ok_or(Error::EmptyResponse("/embeddings"))
  }

  /// `POST /chat/completions` with temperature 0.
  pub async fn chat(&self, system: &str, user: &str) -> Result<String> {
    let resp: ChatResponse = self
      .post("/chat/completions", &ChatRequest {
        model:       &self.config.generation_model,
        temperature: 0.0,
        messages:    [
          ChatMessage { role: "system", content: system },
          ChatMessage { role: "user", content: user },
        ],
      })
      .await?;
    let reply = resp
      .choices
      .into_iter()
      .next()
      .and_then(|c| c.message.content)
      .ok_or(Error::EmptyResponse("/chat/completions"))?;
    tracing::debug!(chars = reply.len(), "completion received");
    Ok(reply)
  }
}

impl Embedder for OpenAiClient {
  type Error = Error;

  async fn embed(&self, text: &str) -> Result<Vec<f32>> { self.embed_text(text).await }
}

impl TextGenerator for OpenAiClient {
  type Error = Error;

  async fn generate(&self, system: &str, user: &str) -> Result<String> {
    self.chat(system, user).await
  }
}
