//! Request and response bodies of the OpenAI REST API, reduced to the
//! fields this client reads or writes.

use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct EmbeddingRequest<'a> {
  pub model: &'a str,
  pub input: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct EmbeddingResponse {
  pub data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
pub struct EmbeddingData {
  pub embedding: Vec<f32>,
}

#[derive(Debug, Serialize)]
pub struct ChatMessage<'a> {
  pub role:    &'a str,
  pub content: &'a str,
}

#[derive(Debug, Serialize)]
pub struct ChatRequest<'a> {
  pub model:       &'a str,
  pub temperature: f32,
  pub messages:    [ChatMessage<'a>; 2],
}

#[derive(Debug, Deserialize)]
pub struct ChatResponse {
  pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
pub struct ChatChoice {
  pub message: ChatReply,
}

#[derive(Debug, Deserialize)]
pub struct ChatReply {
  #[serde(default)]
  pub content: Option<String>,
}
