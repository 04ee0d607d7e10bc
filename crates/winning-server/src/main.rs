//! `winning`: the transfer-market server and its maintenance commands.
//!
//! Reads `winning.toml` (or the path given with `--config`) plus any
//! `WINNING_*` environment variables, opens the SQLite store and either
//! serves the JSON API or runs one operation and exits.
//!
//! # Usage
//!
//! ```text
//! winning serve
//! winning import --club "Club A" --season 2024 --kind players --file squad.csv
//! winning ingest --club "Club A" --season 2024
//! winning transfer --player "Juan Pérez" --season 2024 --from "Club A" --to "Club B" --amount 5000000
//! winning summary --club "Club A" --season 2024
//! ```

mod settings;

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use settings::AppConfig;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use winning_api::AppState;
use winning_core::{
  Error as CoreError, TableKey, TableKind,
  acquire::refresh_valuations,
  finance,
  store::DatasetStore,
  transfer::{TransferRequest, execute_transfer},
};
use winning_llm::OpenAiClient;
use winning_rag::Rag;
use winning_source::MarketValueClient;
use winning_store_sqlite::SqliteStore;

type Pipeline = Rag<SqliteStore, OpenAiClient, OpenAiClient>;

// ─── CLI args ────────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "winning", author, version, about = "Football transfer-market server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "winning.toml")]
  config: PathBuf,

  #[command(subcommand)]
  command: Option<Command>,
}

#[derive(clap::Args)]
struct ClubSeason {
  #[arg(long)]
  club:   String,
  #[arg(long)]
  season: String,
}

#[derive(Subcommand)]
enum Command {
  /// Serve the JSON API (the default).
  Serve,
  /// Load a CSV file into the store as one dataset table.
  Import {
    #[command(flatten)]
    target: ClubSeason,
    /// players, altas, bajas, valuations or salaries.
    #[arg(long)]
    kind:   TableKind,
    #[arg(long)]
    file:   PathBuf,
  },
  /// List stored dataset paths.
  Datasets {
    /// Only paths under this club.
    #[arg(long)]
    club: Option<String>,
  },
  /// Embed and index every table of a club and season.
  Ingest {
    #[command(flatten)]
    target: ClubSeason,
  },
  /// Move a player between clubs.
  Transfer {
    #[arg(long)]
    player: String,
    #[arg(long)]
    season: String,
    #[arg(long)]
    from:   String,
    #[arg(long)]
    to:     String,
    #[arg(long)]
    amount: u64,
  },
  /// Transfer balance against a budget.
  Revenue {
    #[command(flatten)]
    target: ClubSeason,
    #[arg(long, default_value_t = 0.0)]
    budget: f64,
  },
  /// Generate the season financial summary, or the squad analysis with
  /// `--squad`.
  Summary {
    #[command(flatten)]
    target: ClubSeason,
    #[arg(long)]
    squad:  bool,
  },
  /// Ask a free-form question against the indexed data.
  Ask { question: String },
  /// Re-fetch market-value histories for every player in a squad.
  RefreshValuations {
    #[command(flatten)]
    target: ClubSeason,
  },
}

// ─── Entry point ─────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();
  let cfg = AppConfig::load(&cli.config)?;

  let store_path = cfg.store_path();
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  match cli.command.unwrap_or(Command::Serve) {
    Command::Serve => serve(&cfg, store).await,
    Command::Import { target, kind, file } => import(&store, &target, kind, &file).await,
    Command::Datasets { club } => {
      let prefix = match club {
        Some(club) => format!("datasets/{}/", club.trim().to_lowercase()),
        None => "datasets/".to_string(),
      };
      for path in store.list_paths(&prefix).await? {
        println!("{path}");
      }
      Ok(())
    }
    Command::Ingest { target } => {
      let report = pipeline(&cfg, &store)?
        .ingest(&store, &target.club, &target.season)
        .await?;
      print_json(&report)
    }
    Command::Transfer { player, season, from, to, amount } => {
      let request = TransferRequest {
        player_name: player,
        season,
        from_club: from,
        to_club: to,
        amount,
      };
      match execute_transfer(&store, &request).await {
        Ok(receipt) => print_json(&receipt),
        Err(e) => {
          if let CoreError::Persistence { written, .. } = &e {
            for key in written {
              tracing::warn!(table = %key, "written before failure");
            }
          }
          Err(e.into())
        }
      }
    }
    Command::Revenue { target, budget } => {
      print_json(&finance::revenue(&store, &target.club, &target.season, budget).await?)
    }
    Command::Summary { target, squad } => {
      let rag = pipeline(&cfg, &store)?;
      let text = if squad {
        rag.squad_analysis(&target.club, &target.season).await?
      } else {
        rag.season_summary(&target.club, &target.season).await?
      };
      println!("{text}");
      Ok(())
    }
    Command::Ask { question } => {
      println!("{}", pipeline(&cfg, &store)?.answer_question(&question).await?);
      Ok(())
    }
    Command::RefreshValuations { target } => {
      let source = MarketValueClient::new(cfg.source()).context("failed to build HTTP client")?;
      let report = refresh_valuations(&store, &source, &target.club, &target.season).await?;
      print_json(&report)
    }
  }
}

// ─── Commands ────────────────────────────────────────────────────────────────

fn pipeline(cfg: &AppConfig, store: &SqliteStore) -> anyhow::Result<Pipeline> {
  let client = OpenAiClient::new(cfg.openai()).context("failed to build provider client")?;
  Ok(Rag::new(store.clone(), client.clone(), client, cfg.rag()))
}

async fn serve(cfg: &AppConfig, store: SqliteStore) -> anyhow::Result<()> {
  if cfg.openai_api_key.is_empty() {
    tracing::warn!("no provider API key configured; generation routes will fail");
  }
  let rag = pipeline(cfg, &store)?;
  let state = AppState::new(Arc::new(store), Arc::new(rag));
  let app = axum::Router::new().nest("/api", winning_api::api_router(state, &cfg.cors_origins));

  let address = cfg.address();
  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;
  Ok(())
}

async fn import(
  store: &SqliteStore,
  target: &ClubSeason,
  kind: TableKind,
  file: &Path,
) -> anyhow::Result<()> {
  let text = std::fs::read_to_string(file)
    .with_context(|| format!("reading {}", file.display()))?;
  let table = winning_csv::parse(&text).with_context(|| format!("parsing {}", file.display()))?;
  let key = TableKey::new(&target.club, &target.season, kind)?;
  store.put(&key, &table).await?;
  tracing::info!(table = %key, rows = table.len(), "imported");
  Ok(())
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
  println!("{}", serde_json::to_string_pretty(value)?);
  Ok(())
}
