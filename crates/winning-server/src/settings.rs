//! Runtime configuration: an optional TOML file layered under `WINNING_*`
//! environment variables.

use std::{
  path::{Path, PathBuf},
  time::Duration,
};

use anyhow::Context as _;
use serde::Deserialize;
use winning_llm::OpenAiConfig;
use winning_rag::RagConfig;
use winning_source::SourceConfig;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
  pub host:              String,
  pub port:              u16,
  /// SQLite file holding datasets and indexed chunks. A leading `~/` is
  /// expanded.
  pub store_path:        PathBuf,
  pub openai_base_url:   String,
  pub openai_api_key:    String,
  pub embedding_model:   String,
  pub generation_model:  String,
  /// Root of the market-value history API.
  pub source_base_url:   String,
  /// Milliseconds to wait between players during a valuation refresh.
  pub source_pacing_ms:  u64,
  pub top_k:             usize,
  pub upsert_batch_size: usize,
  pub cors_origins:      Vec<String>,
}

impl Default for AppConfig {
  fn default() -> Self {
    let openai = OpenAiConfig::default();
    let source = SourceConfig::default();
    let rag = RagConfig::default();
    Self {
      host:              "127.0.0.1".into(),
      port:              8000,
      store_path:        PathBuf::from("winning.db"),
      openai_base_url:   openai.base_url,
      openai_api_key:    openai.api_key,
      embedding_model:   openai.embedding_model,
      generation_model:  openai.generation_model,
      source_base_url:   source.base_url,
      source_pacing_ms:  u64::try_from(source.pacing.as_millis()).unwrap_or(300),
      top_k:             rag.top_k,
      upsert_batch_size: rag.upsert_batch_size,
      cors_origins:      winning_api::DEFAULT_ORIGINS.iter().map(|o| o.to_string()).collect(),
    }
  }
}

impl AppConfig {
  /// Read `path` (if it exists) and then the environment.
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    Self::from_sources(
      config::Config::builder()
        .add_source(config::File::from(path).required(false))
        .add_source(config::Environment::with_prefix("WINNING")),
    )
  }

  fn from_sources(
    builder: config::ConfigBuilder<config::builder::DefaultState>,
  ) -> anyhow::Result<Self> {
    builder
      .build()
      .context("failed to read configuration")?
      .try_deserialize()
      .context("failed to deserialise AppConfig")
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }

  pub fn store_path(&self) -> PathBuf { expand_tilde(&self.store_path) }

  pub fn openai(&self) -> OpenAiConfig {
    OpenAiConfig {
      base_url: self.openai_base_url.clone(),
      api_key: self.openai_api_key.clone(),
      embedding_model: self.embedding_model.clone(),
      generation_model: self.generation_model.clone(),
      ..OpenAiConfig::default()
    }
  }

  pub fn source(&self) -> SourceConfig {
    SourceConfig {
      base_url: self.source_base_url.clone(),
      pacing: Duration::from_millis(self.source_pacing_ms),
      ..SourceConfig::default()
    }
  }

  pub fn rag(&self) -> RagConfig {
    RagConfig {
      top_k: self.top_k,
      upsert_batch_size: self.upsert_batch_size,
      ..RagConfig::default()
    }
  }
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

#[cfg(test)]
mod tests {
  use config::{File, FileFormat};

  use super::*;

  fn from_toml(toml: &str) -> AppConfig {
    AppConfig::from_sources(
      config::Config::builder().add_source(File::from_str(toml, FileFormat::Toml)),
    )
    .unwrap()
  }

  #[test]
  fn defaults_fill_missing_keys() {
    let cfg = from_toml("");
    assert_eq!(cfg.address(), "127.0.0.1:8000");
    assert_eq!(cfg.embedding_model, "text-embedding-3-small");
    assert_eq!(cfg.rag(), RagConfig::default());
    assert_eq!(cfg.source().pacing, Duration::from_millis(300));
    assert_eq!(cfg.cors_origins.len(), 2);
  }

  #[test]
  fn file_overrides_defaults() {
    let cfg = from_toml(
      r#"
        port = 9000
        top_k = 20
        openai_api_key = "sk-test"
        cors_origins = ["https://example.org"]
      "#,
    );
    assert_eq!(cfg.port, 9000);
    assert_eq!(cfg.rag().top_k, 20);
    assert_eq!(cfg.rag().upsert_batch_size, 100);
    assert_eq!(cfg.openai().api_key, "sk-test");
    assert_eq!(cfg.cors_origins, ["https://example.org"]);
  }

  #[test]
  fn absolute_store_path_is_kept() {
    let cfg = from_toml(r#"store_path = "/var/lib/winning.db""#);
    assert_eq!(cfg.store_path(), PathBuf::from("/var/lib/winning.db"));
  }
}
