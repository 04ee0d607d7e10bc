//! Integration tests for `SqliteStore` against an in-memory database.

use winning_core::{
  Table, TableKey, TableKind,
  store::DatasetStore,
  transfer::{TransferRequest, execute_transfer},
};
use winning_rag::{
  IndexPoint, Metadata, MetadataFilter, Rag, RagConfig, VectorIndex,
  memory::{CannedGenerator, HashEmbedder},
};

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn key(club: &str, kind: TableKind) -> TableKey {
  TableKey::new(club, "2024", kind).unwrap()
}

fn squad(rows: &[(&str, &str)]) -> Table {
  Table::from_rows(
    vec!["player_id".into(), "nombre y apellido".into()],
    rows
      .iter()
      .map(|(id, name)| vec![id.to_string(), name.to_string()])
      .collect(),
  )
}

fn point(id: &str, embedding: Vec<f32>, tipo: &str) -> IndexPoint {
  IndexPoint {
    id: id.into(),
    embedding,
    text: format!("[tipo={tipo}] {id}"),
    metadata: Metadata::from([
      ("tipo".to_string(), tipo.to_string()),
      ("club".to_string(), "club a".to_string()),
    ]),
  }
}

// ─── Blobs ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn get_missing_table_returns_none() {
  let s = store().await;
  assert!(s.get(&key("Club A", TableKind::Players)).await.unwrap().is_none());
}

#[tokio::test]
async fn put_and_get_table() {
  let s = store().await;
  let table = squad(&[("1", "Juan Pérez"), ("2", "O'Neil, Tito")]);

  s.put(&key("Club A", TableKind::Players), &table).await.unwrap();
  let fetched = s.get(&key("club a", TableKind::Players)).await.unwrap().unwrap();
  assert_eq!(fetched, table);
}

#[tokio::test]
async fn put_replaces_whole_table() {
  let s = store().await;
  let k = key("Club A", TableKind::Players);
  s.put(&k, &squad(&[("1", "Juan"), ("2", "Pedro")])).await.unwrap();
  s.put(&k, &squad(&[("3", "Luis")])).await.unwrap();

  let fetched = s.get(&k).await.unwrap().unwrap();
  assert_eq!(fetched.len(), 1);
  assert_eq!(fetched.cell(0, 1), "Luis");
}

#[tokio::test]
async fn reopening_a_file_keeps_blobs_and_chunks() {
  let path = std::env::temp_dir().join(format!("winning-reopen-{}.db", std::process::id()));
  let remove = || {
    for suffix in ["", "-wal", "-shm"] {
      let _ = std::fs::remove_file(format!("{}{suffix}", path.display()));
    }
  };
  remove();
  let k = key("Club A", TableKind::Players);
  {
    let s = SqliteStore::open(&path).await.unwrap();
    s.put(&k, &squad(&[("1", "Juan")])).await.unwrap();
    s.upsert(&[point("a", vec![1.0, 0.0], "jugador")]).await.unwrap();
  }

  let s = SqliteStore::open(&path).await.unwrap();
  assert_eq!(s.get(&k).await.unwrap().unwrap().len(), 1);
  assert_eq!(s.chunk_count().await.unwrap(), 1);
  drop(s);
  remove();
}

#[tokio::test]
async fn list_paths_by_prefix() {
  let s = store().await;
  s.put(&key("Club A", TableKind::Players), &squad(&[])).await.unwrap();
  s.put(&key("Club A", TableKind::Altas), &squad(&[])).await.unwrap();
  s.put(&key("Club B", TableKind::Players), &squad(&[])).await.unwrap();

  let paths = s.list_paths("datasets/club a/").await.unwrap();
  assert_eq!(paths, [
    "datasets/club a/2024/club a_2024_altas.csv",
    "datasets/club a/2024/club a_2024_players.csv",
  ]);
}

#[tokio::test]
async fn transfer_runs_against_sqlite() {
  let s = store().await;
  s.put(&key("Club A", TableKind::Players), &squad(&[("1", "Juan Pérez")]))
    .await
    .unwrap();
  s.put(&key("Club B", TableKind::Players), &squad(&[])).await.unwrap();

  let receipt = execute_transfer(&s, &TransferRequest {
    player_name: "juan perez".into(),
    season:      "2024".into(),
    from_club:   "Club A".into(),
    to_club:     "Club B".into(),
    amount:      5_000_000,
  })
  .await
  .unwrap();
  assert_eq!(receipt.tables_written.len(), 4);

  assert!(s.get(&key("Club A", TableKind::Players)).await.unwrap().unwrap().is_empty());
  let altas = s.get(&key("Club B", TableKind::Altas)).await.unwrap().unwrap();
  assert_eq!(altas.cell(0, 4), "5000000");
}

// ─── Chunks ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn query_ranks_by_cosine_and_filters() {
  let s = store().await;
  s.upsert(&[
    point("a", vec![1.0, 0.0], "altas"),
    point("b", vec![0.8, 0.2], "altas"),
    point("c", vec![1.0, 0.0], "bajas"),
    point("d", vec![0.0, 1.0], "altas"),
  ])
  .await
  .unwrap();

  let filter = MetadataFilter::new().eq("tipo", "altas");
  let hits = s.query(&[1.0, 0.0], 2, &filter).await.unwrap();
  let ids: Vec<&str> = hits.iter().map(|h| h.id.as_str()).collect();
  assert_eq!(ids, ["a", "b"]);
  assert!((hits[0].score - 1.0).abs() < 1e-6);
  assert_eq!(hits[0].metadata["club"], "club a");

  let all = s.query(&[1.0, 0.0], 10, &MetadataFilter::new()).await.unwrap();
  assert_eq!(all.len(), 4);
}

#[tokio::test]
async fn upsert_replaces_by_id() {
  let s = store().await;
  s.upsert(&[point("a", vec![1.0], "altas")]).await.unwrap();
  let mut replacement = point("a", vec![1.0], "bajas");
  replacement.text = "new".into();
  s.upsert(&[replacement]).await.unwrap();

  assert_eq!(s.chunk_count().await.unwrap(), 1);
  let hits = s.query(&[1.0], 1, &MetadataFilter::new()).await.unwrap();
  assert_eq!(hits[0].text, "new");
  assert_eq!(hits[0].metadata["tipo"], "bajas");
}

#[tokio::test]
async fn list_and_delete_ids() {
  let s = store().await;
  s.upsert(&[
    point("club a_2024_players_0", vec![1.0], "players"),
    point("club a_2024_players_1", vec![1.0], "players"),
    point("club a_2024_altas_0", vec![1.0], "altas"),
  ])
  .await
  .unwrap();

  let mut ids = s.list_ids("club a_2024_players_").await.unwrap();
  ids.sort();
  assert_eq!(ids, ["club a_2024_players_0", "club a_2024_players_1"]);

  s.delete(&["club a_2024_players_1".to_string(), "missing".to_string()])
    .await
    .unwrap();
  assert_eq!(s.chunk_count().await.unwrap(), 2);
}

#[tokio::test]
async fn ingest_and_retrieve_through_sqlite() {
  let s = store().await;
  s.put(&key("Club A", TableKind::Players), &squad(&[("1", "Juan Pérez"), ("2", "Pedro")]))
    .await
    .unwrap();

  let rag = Rag::new(
    s.clone(),
    HashEmbedder::default(),
    CannedGenerator::new("ok"),
    RagConfig::default(),
  );
  let report = rag.ingest(&s, "Club A", "2024").await.unwrap();
  assert_eq!(report.total(), 2);
  assert_eq!(s.chunk_count().await.unwrap(), 2);

  let context = rag.get_context("Club A", "2024", &[TableKind::Players]).await.unwrap();
  assert!(context.contains("nombre y apellido: Juan Pérez"));
  assert!(context.contains("nombre y apellido: Pedro"));
}
