//! OpenAI-compatible HTTP client for embeddings and chat completions.
//!
//! [`OpenAiClient`] implements both [`winning_rag::Embedder`] and
//! [`winning_rag::TextGenerator`]. Requests are not retried: a failed call
//! surfaces immediately.

mod client;
mod wire;

pub mod error;

pub use client::{OpenAiClient, OpenAiConfig};
pub use error::{Error, Result};
