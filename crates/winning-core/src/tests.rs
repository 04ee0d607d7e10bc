//! Transfer and valuation-refresh scenarios against `MemoryStore`.

use std::{collections::HashMap, convert::Infallible, fmt};

use chrono::NaiveDate;

use crate::{
  Error, Table, TableKey, TableKind,
  acquire::{ValuationSource, refresh_valuations},
  finance::revenue,
  memory::MemoryStore,
  record::ValuationRecord,
  transfer::{TransferRequest, execute_transfer, execute_transfer_on},
};

fn key(club: &str, kind: TableKind) -> TableKey {
  TableKey::new(club, "2024", kind).unwrap()
}

fn table(headers: &[&str], rows: &[&[&str]]) -> Table {
  Table::from_rows(
    headers.iter().map(|h| h.to_string()).collect(),
    rows
      .iter()
      .map(|r| r.iter().map(|c| c.to_string()).collect())
      .collect(),
  )
}

const SQUAD_HEADERS: &[&str] = &["player_id", "número", "nombre y apellido", "posicion", "edad"];

/// Club A: Juan Pérez (1) and Pedro Gómez (2). Club B: Luis Díaz (3).
/// Valuations for all three, and one existing ledger row per ledger.
fn seeded() -> MemoryStore {
  let store = MemoryStore::new();
  store.insert(
    key("Club A", TableKind::Players),
    table(SQUAD_HEADERS, &[
      &["1", "9", "Juan Pérez", "Delantero", "24"],
      &["2", "5", "Pedro Gómez", "Mediocampista", "29"],
    ]),
  );
  store.insert(
    key("Club B", TableKind::Players),
    table(SQUAD_HEADERS, &[&["3", "1", "Luis Díaz", "Arquero", "31"]]),
  );
  store.insert(
    key("Club A", TableKind::Valuations),
    table(&ValuationRecord::HEADERS, &[
      &["1", "Juan Pérez", "1000000", "2023-01-01", "23", "10", "Club A"],
      &["2", "Pedro Gómez", "800000", "2023-01-01", "28", "10", "Club A"],
      &["1", "Juan Pérez", "2000000", "2024-01-01", "24", "10", "Club A"],
    ]),
  );
  store.insert(
    key("Club B", TableKind::Valuations),
    table(&ValuationRecord::HEADERS, &[&[
      "3", "Luis Díaz", "500000", "2024-01-01", "31", "20", "Club B",
    ]]),
  );
  store.insert(
    key("Club A", TableKind::Bajas),
    table(&["player_id", "player name", "to_club", "amount"], &[&[
      "7", "Otro", "River", "Libre / Cesión",
    ]]),
  );
  store.insert(
    key("Club B", TableKind::Altas),
    table(&["player_id", "player_name", "from_club", "amount"], &[&[
      "8", "Alguien", "Racing", "300000",
    ]]),
  );
  store
}

fn request(player: &str, from: &str, to: &str) -> TransferRequest {
  TransferRequest {
    player_name: player.into(),
    season:      "2024".into(),
    from_club:   from.into(),
    to_club:     to.into(),
    amount:      5_000_000,
  }
}

fn names(table: &Table) -> Vec<String> {
  let col = table.column(&["nombre y apellido"]).unwrap();
  (0..table.len()).map(|r| table.cell(r, col).to_string()).collect()
}

// ─── Transfers ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn transfer_moves_player_and_records_ledgers() {
  let store = seeded();

  let receipt = execute_transfer(&store, &request("Juan Perez", "Club A", "Club B"))
    .await
    .unwrap();

  let from = store.table(&key("Club A", TableKind::Players)).unwrap();
  let to = store.table(&key("Club B", TableKind::Players)).unwrap();
  assert_eq!(names(&from), ["Pedro Gómez"]);
  assert_eq!(names(&to), ["Luis Díaz", "Juan Pérez"]);

  // The squad had no club column; one is added and set on the moved row.
  let club = to.column(&["club"]).unwrap();
  assert_eq!(to.cell(1, club), "Club B");
  assert_eq!(to.cell(0, club), "");

  let bajas = store.table(&key("Club A", TableKind::Bajas)).unwrap();
  let altas = store.table(&key("Club B", TableKind::Altas)).unwrap();
  assert_eq!(bajas.len(), 2);
  assert_eq!(altas.len(), 2);
  let amount = bajas.column(&["amount"]).unwrap();
  assert_eq!(bajas.cell(1, amount), "5000000");
  let amount = altas.column(&["amount"]).unwrap();
  assert_eq!(altas.cell(1, amount), "5000000");

  assert_eq!(receipt.ledger.player_name, "Juan Pérez");
  assert_eq!(receipt.ledger.player_id.as_deref(), Some("1"));
  assert_eq!(receipt.ledger.to_club, "Club B");
  assert_eq!(receipt.valuations_moved, 2);
  assert_eq!(receipt.tables_written.len(), 6);
  assert_eq!(store.write_count(), 6);
}

#[tokio::test]
async fn valuations_follow_player_id_only() {
  let store = seeded();
  execute_transfer(&store, &request("JUAN PÉREZ", "Club A", "Club B"))
    .await
    .unwrap();

  let origin = store.table(&key("Club A", TableKind::Valuations)).unwrap();
  assert_eq!(origin.len(), 1);
  assert_eq!(origin.cell(0, 0), "2");
  assert_eq!(origin.cell(0, 6), "Club A");

  let dest = store.table(&key("Club B", TableKind::Valuations)).unwrap();
  assert_eq!(dest.len(), 3);
  // Moved rows keep their original order and take the new club name.
  assert_eq!(dest.cell(1, 3), "2023-01-01");
  assert_eq!(dest.cell(2, 3), "2024-01-01");
  assert_eq!(dest.cell(1, 6), "Club B");
  assert_eq!(dest.cell(2, 6), "Club B");
  // Untouched fields survive.
  assert_eq!(dest.cell(2, 2), "2000000");
}

#[tokio::test]
async fn moved_valuations_use_the_destination_club_header() {
  let store = seeded();
  let headers = ["player_id", "nombre_jugador", "valuation_amount", "valuation_date", "club_name"];
  store.insert(
    key("Club B", TableKind::Valuations),
    table(&headers, &[&["3", "Luis Díaz", "500000", "2024-01-01", "Club B"]]),
  );

  execute_transfer(&store, &request("Juan Pérez", "Club A", "Club B"))
    .await
    .unwrap();

  let dest = store.table(&key("Club B", TableKind::Valuations)).unwrap();
  assert!(dest.column(&["club_nombre"]).is_none());
  let club = dest.column(&["club_name"]).unwrap();
  assert_eq!(dest.len(), 3);
  for row in 0..dest.len() {
    assert_eq!(dest.cell(row, club), "Club B");
  }
}

#[tokio::test]
async fn moved_player_uses_the_destination_club_header() {
  let store = seeded();
  store.insert(
    key("Club A", TableKind::Players),
    table(&["player_id", "nombre y apellido", "club"], &[&["1", "Juan Pérez", "Club A"]]),
  );
  store.insert(
    key("Club B", TableKind::Players),
    table(&["player_id", "nombre y apellido", "current_club"], &[&[
      "3", "Luis Díaz", "Club B",
    ]]),
  );

  execute_transfer(&store, &request("Juan Pérez", "Club A", "Club B"))
    .await
    .unwrap();

  let to = store.table(&key("Club B", TableKind::Players)).unwrap();
  assert_eq!(to.headers(), ["player_id", "nombre y apellido", "current_club"]);
  assert_eq!(to.cell(1, 2), "Club B");
}

#[tokio::test]
async fn missing_player_writes_nothing() {
  let store = seeded();
  let err = execute_transfer(&store, &request("Nadie", "Club A", "Club B"))
    .await
    .unwrap_err();

  assert!(matches!(err, Error::PlayerNotFound { .. }));
  assert!(err.is_not_found());
  assert_eq!(store.write_count(), 0);
}

#[tokio::test]
async fn missing_squad_is_rejected() {
  let store = seeded();
  let err = execute_transfer(&store, &request("Juan Perez", "Club A", "Club Z"))
    .await
    .unwrap_err();

  match err {
    Error::SquadNotFound(k) => assert_eq!(k, key("Club Z", TableKind::Players)),
    other => panic!("expected SquadNotFound, got {other:?}"),
  }
  assert_eq!(store.write_count(), 0);
}

#[tokio::test]
async fn squad_without_name_column_is_a_schema_error() {
  let store = seeded();
  store.insert(
    key("Club C", TableKind::Players),
    table(&["player_id", "posicion"], &[&["1", "Delantero"]]),
  );
  let err = execute_transfer(&store, &request("Juan Perez", "Club C", "Club B"))
    .await
    .unwrap_err();

  assert!(matches!(err, Error::SchemaError { expected: "player name", .. }));
  assert_eq!(store.write_count(), 0);
}

#[tokio::test]
async fn duplicate_names_are_ambiguous() {
  let store = seeded();
  store.insert(
    key("Club A", TableKind::Players),
    table(SQUAD_HEADERS, &[
      &["1", "9", "Juan Pérez", "Delantero", "24"],
      &["4", "19", "Juan Perez", "Defensor", "19"],
    ]),
  );
  let err = execute_transfer(&store, &request("juan perez", "Club A", "Club B"))
    .await
    .unwrap_err();

  assert!(matches!(err, Error::AmbiguousMatch { candidates: 2, .. }));
  assert_eq!(store.write_count(), 0);
}

#[tokio::test]
async fn identical_calls_append_two_ledger_entries() {
  let store = seeded();
  let same = request("Pedro Gómez", "Club A", "club a");

  execute_transfer(&store, &same).await.unwrap();
  execute_transfer(&store, &same).await.unwrap();

  let squad = store.table(&key("Club A", TableKind::Players)).unwrap();
  assert_eq!(squad.len(), 2);
  assert_eq!(names(&squad)[1], "Pedro Gómez");

  let bajas = store.table(&key("Club A", TableKind::Bajas)).unwrap();
  let altas = store.table(&key("Club A", TableKind::Altas)).unwrap();
  assert_eq!(bajas.len(), 3);
  assert_eq!(altas.len(), 2);
}

#[tokio::test]
async fn same_club_transfer_stages_each_table_once() {
  let store = seeded();
  let receipt = execute_transfer(&store, &request("Juan Perez", "Club A", "Club A"))
    .await
    .unwrap();

  // Squad, bajas, altas (created), valuations.
  assert_eq!(receipt.tables_written.len(), 4);
  assert_eq!(receipt.valuations_moved, 2);
  let vals = store.table(&key("Club A", TableKind::Valuations)).unwrap();
  assert_eq!(vals.len(), 3);
  assert_eq!(vals.cell(0, 0), "2");
}

#[tokio::test]
async fn missing_ledger_is_created() {
  let store = seeded();
  execute_transfer(&store, &request("Luis Díaz", "Club B", "Club A"))
    .await
    .unwrap();

  let bajas = store.table(&key("Club B", TableKind::Bajas)).unwrap();
  assert_eq!(bajas.headers(), [
    "player_id",
    "player_name",
    "from_club",
    "to_club",
    "amount",
    "transfer_date"
  ]);
  assert_eq!(bajas.cell(0, 1), "Luis Díaz");
  assert_eq!(bajas.cell(0, 3), "Club A");
}

#[tokio::test]
async fn player_without_id_keeps_valuations_in_place() {
  let store = seeded();
  store.insert(
    key("Club A", TableKind::Players),
    table(SQUAD_HEADERS, &[&["N/A", "9", "Juan Pérez", "Delantero", "24"]]),
  );
  let receipt = execute_transfer(&store, &request("Juan Perez", "Club A", "Club B"))
    .await
    .unwrap();

  assert_eq!(receipt.valuations_moved, 0);
  assert_eq!(receipt.ledger.player_id, None);
  assert_eq!(store.table(&key("Club A", TableKind::Valuations)).unwrap().len(), 3);
  assert_eq!(store.table(&key("Club B", TableKind::Valuations)).unwrap().len(), 1);
  // Neither valuation table is written.
  assert_eq!(receipt.tables_written.len(), 4);
}

#[tokio::test]
async fn failed_write_reports_partial_persistence() {
  let store = seeded();
  store.fail_writes_to(key("Club A", TableKind::Bajas));

  let err = execute_transfer(&store, &request("Juan Perez", "Club A", "Club B"))
    .await
    .unwrap_err();

  match err {
    Error::Persistence { written, failed, .. } => {
      assert_eq!(written, [
        key("Club A", TableKind::Players),
        key("Club B", TableKind::Players),
      ]);
      assert_eq!(failed, key("Club A", TableKind::Bajas));
    }
    other => panic!("expected Persistence, got {other:?}"),
  }
  // The squads were written; nothing after the failure was.
  assert_eq!(store.write_count(), 2);
  assert_eq!(store.table(&key("Club B", TableKind::Altas)).unwrap().len(), 1);
}

#[tokio::test]
async fn ledger_date_is_recorded() {
  let store = seeded();
  let date = NaiveDate::from_ymd_opt(2024, 8, 15).unwrap();
  execute_transfer_on(&store, &request("Juan Perez", "Club A", "Club B"), date)
    .await
    .unwrap();

  let altas = store.table(&key("Club B", TableKind::Altas)).unwrap();
  let col = altas.column(&["transfer_date"]).unwrap();
  assert_eq!(altas.cell(1, col), "2024-08-15");
  assert_eq!(altas.cell(0, col), "");
}

// ─── Revenue ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn revenue_sums_ledgers() {
  let store = seeded();
  store.insert(
    key("Club A", TableKind::Altas),
    table(&["player_id", "player_name", "from_club", "amount"], &[
      &["10", "X", "Y", "1000000"],
      &["11", "Z", "W", "2000000"],
    ]),
  );
  store.insert(
    key("Club A", TableKind::Bajas),
    table(&["player_id", "player name", "to_club", "amount"], &[
      &["12", "Q", "R", "500000"],
      &["13", "S", "T", "Libre / Cesión"],
    ]),
  );

  let r = revenue(&store, "Club A", "2024", 10_000_000.0).await.unwrap();
  assert_eq!(r.total_spent, 3_000_000.0);
  assert_eq!(r.total_income, 500_000.0);
  assert_eq!(r.net_benefit, -2_500_000.0);
  assert_eq!(r.budget_remaining, 7_500_000.0);
}

#[tokio::test]
async fn revenue_needs_both_ledgers() {
  let store = seeded();
  let err = revenue(&store, "Club A", "2024", 0.0).await.unwrap_err();
  assert!(matches!(err, Error::DatasetNotFound(k) if k.kind() == TableKind::Altas));
}

// ─── Valuation refresh ───────────────────────────────────────────────────────

#[derive(Debug)]
struct Unreachable;

impl fmt::Display for Unreachable {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str("unreachable") }
}

impl std::error::Error for Unreachable {}

/// Canned histories by player id; ids not in the map fail.
struct FakeSource(HashMap<&'static str, Vec<(&'static str, u64)>>);

impl ValuationSource for FakeSource {
  type Error = Unreachable;

  async fn valuation_history(
    &self,
    player_id: &str,
    player_name: &str,
  ) -> Result<Vec<ValuationRecord>, Unreachable> {
    let points = self.0.get(player_id).ok_or(Unreachable)?;
    Ok(
      points
        .iter()
        .map(|(date, value)| ValuationRecord {
          player_id:        player_id.to_string(),
          player_name:      player_name.to_string(),
          valuation_amount: *value,
          valuation_date:   date.to_string(),
          age_at_valuation: None,
          club_id:          None,
          club_name:        "Sin Club / Desconocido".into(),
        })
        .collect(),
    )
  }
}

struct EmptySource;

impl ValuationSource for EmptySource {
  type Error = Infallible;

  async fn valuation_history(
    &self,
    _player_id: &str,
    _player_name: &str,
  ) -> Result<Vec<ValuationRecord>, Infallible> {
    Ok(Vec::new())
  }
}

#[tokio::test]
async fn refresh_replaces_valuations_and_counts_failures() {
  let store = seeded();
  let source = FakeSource(HashMap::from([(
    "1",
    vec![("2023-01-01", 100), ("2024-01-01", 200)],
  )]));

  let report = refresh_valuations(&store, &source, "Club A", "2024").await.unwrap();
  assert_eq!(report.players, 2);
  assert_eq!(report.failed, 1);
  assert_eq!(report.records, 2);

  let vals = store.table(&key("Club A", TableKind::Valuations)).unwrap();
  assert_eq!(vals.len(), 2);
  assert_eq!(vals.cell(0, 1), "Juan Pérez");
  assert_eq!(vals.cell(1, 2), "200");
  // Missing numbers are written as zero.
  assert_eq!(vals.cell(0, 4), "0");
  assert_eq!(vals.cell(0, 5), "0");
}

#[tokio::test]
async fn refresh_with_nothing_fetched_leaves_table() {
  let store = seeded();
  let report = refresh_valuations(&store, &EmptySource, "Club A", "2024")
    .await
    .unwrap();

  assert_eq!(report.records, 0);
  assert_eq!(store.write_count(), 0);
  assert_eq!(store.table(&key("Club A", TableKind::Valuations)).unwrap().len(), 3);
}

#[tokio::test]
async fn refresh_skips_rows_without_id() {
  let store = seeded();
  store.insert(
    key("Club B", TableKind::Players),
    table(SQUAD_HEADERS, &[&["", "1", "Luis Díaz", "Arquero", "31"]]),
  );
  let report = refresh_valuations(&store, &EmptySource, "Club B", "2024")
    .await
    .unwrap();
  assert_eq!(report.skipped, 1);
  assert_eq!(report.players, 0);
}
