//! The transfer executor.
//!
//! A transfer touches six tables: both squads, the origin `bajas` and
//! destination `altas` ledgers, and both valuation histories. All of them are
//! loaded and mutated in memory first; only then is anything written. The
//! store has no cross-table transaction, so a write failure part-way through
//! leaves the earlier tables persisted and is reported as
//! [`Error::Persistence`] with the list of what was written.

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  Error, Result,
  key::{TableKey, TableKind},
  normalize::{is_present, normalize, title_case},
  record::{CLUB_COLUMNS, ID_COLUMNS, LedgerEntry, NAME_COLUMNS, VALUATION_CLUB_COLUMNS},
  store::DatasetStore,
  table::{Table, header_matches},
};

// ─── Request / receipt ───────────────────────────────────────────────────────

/// Input to [`execute_transfer`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferRequest {
  /// Free-text player name, matched accent- and case-insensitively.
  pub player_name: String,
  pub season:      String,
  pub from_club:   String,
  pub to_club:     String,
  /// Stored as given; no currency handling happens here.
  pub amount:      u64,
}

/// What a committed transfer did.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferReceipt {
  pub transfer_id:      Uuid,
  pub ledger:           LedgerEntry,
  /// Valuation rows moved from the origin to the destination history.
  pub valuations_moved: usize,
  /// Tables written, in commit order.
  pub tables_written:   Vec<TableKey>,
}

// ─── Staging ─────────────────────────────────────────────────────────────────

/// Tables loaded for one transfer, one slot per distinct key. When origin and
/// destination are the same club both roles share a slot, so the player's
/// row is removed and re-appended to the same table.
#[derive(Default)]
struct Staging {
  slots: Vec<Slot>,
}

struct Slot {
  key:   TableKey,
  table: Table,
  /// `false` for an absent optional table; it stays absent unless mutated.
  found: bool,
  dirty: bool,
}

impl Staging {
  /// Load `key` (once) and return its slot index. `None` from the store is
  /// an empty table for optional kinds and `SquadNotFound` for squads.
  async fn load<S>(&mut self, store: &S, key: TableKey) -> Result<usize>
  where
    S: DatasetStore,
  {
    if let Some(idx) = self.slots.iter().position(|s| s.key == key) {
      return Ok(idx);
    }
    let loaded = store.get(&key).await.map_err(Error::upstream)?;
    let found = loaded.is_some();
    if !found && key.kind() == TableKind::Players {
      return Err(Error::SquadNotFound(key));
    }
    tracing::debug!(table = %key, found, "staged table");
    self.slots.push(Slot {
      key,
      table: loaded.unwrap_or_default(),
      found,
      dirty: false,
    });
    Ok(self.slots.len() - 1)
  }

  fn table(&self, idx: usize) -> &Table { &self.slots[idx].table }

  fn table_mut(&mut self, idx: usize) -> &mut Table {
    let slot = &mut self.slots[idx];
    slot.dirty = true;
    &mut slot.table
  }

  /// Write every mutated table, in load order. Stops at the first failure.
  async fn commit<S>(self, store: &S) -> Result<Vec<TableKey>>
  where
    S: DatasetStore,
  {
    let mut written = Vec::new();
    for slot in self.slots.into_iter().filter(|s| s.dirty) {
      if let Err(e) = store.put(&slot.key, &slot.table).await {
        tracing::warn!(
          failed = %slot.key,
          written = written.len(),
          error = %e,
          "transfer left partially persisted"
        );
        return Err(Error::Persistence {
          written,
          failed: slot.key,
          source: Box::new(e),
        });
      }
      tracing::debug!(table = %slot.key, created = !slot.found, "table written");
      written.push(slot.key);
    }
    Ok(written)
  }
}

/// Overwrite the first field whose header matches `aliases`, or append one
/// under the canonical (first) alias.
/// Replace the club field of a moved row, keyed by whichever club header
/// `destination` already uses so no second club column appears.
fn set_club(
  fields: &mut Vec<(String, String)>,
  destination: &Table,
  aliases: &[&str],
  value: &str,
) {
  fields.retain(|(h, _)| !header_matches(h, aliases));
  let header = destination
    .column(aliases)
    .map(|col| destination.headers()[col].clone())
    .unwrap_or_else(|| aliases[0].to_string());
  fields.push((header, value.to_string()));
}

// ─── Executor ────────────────────────────────────────────────────────────────

/// Move a player from `from_club` to `to_club` for one season.
///
/// The request is rejected before anything is written when a squad is
/// missing ([`Error::SquadNotFound`]), the squad has no name column
/// ([`Error::SchemaError`]), or the player matches zero
/// ([`Error::PlayerNotFound`]) or several ([`Error::AmbiguousMatch`]) rows.
///
/// Calling this twice with the same request appends two ledger entries.
pub async fn execute_transfer<S>(
  store: &S,
  request: &TransferRequest,
) -> Result<TransferReceipt>
where
  S: DatasetStore,
{
  execute_transfer_on(store, request, Utc::now().date_naive()).await
}

/// [`execute_transfer`] with an explicit ledger date.
pub async fn execute_transfer_on<S>(
  store: &S,
  request: &TransferRequest,
  transfer_date: NaiveDate,
) -> Result<TransferReceipt>
where
  S: DatasetStore,
{
  let season = request.season.as_str();
  let from_squad_key = TableKey::new(&request.from_club, season, TableKind::Players)?;
  let to_squad_key = TableKey::new(&request.to_club, season, TableKind::Players)?;

  let mut staging = Staging::default();
  let from_squad = staging.load(store, from_squad_key.clone()).await?;
  let to_squad = staging.load(store, to_squad_key.clone()).await?;
  let bajas = staging.load(store, from_squad_key.with_kind(TableKind::Bajas)).await?;
  let altas = staging.load(store, to_squad_key.with_kind(TableKind::Altas)).await?;
  let from_vals = staging
    .load(store, from_squad_key.with_kind(TableKind::Valuations))
    .await?;
  let to_vals = staging
    .load(store, to_squad_key.with_kind(TableKind::Valuations))
    .await?;

  // ── Locate the player ───────────────────────────────────────────────────
  let squad = staging.table(from_squad);
  let name_col = squad.column(NAME_COLUMNS).ok_or_else(|| Error::SchemaError {
    key:      from_squad_key.clone(),
    expected: "player name",
    headers:  squad.headers().to_vec(),
  })?;

  let query = normalize(&request.player_name);
  let matches = squad.positions(name_col, |name| normalize(name) == query);
  let row = match matches.as_slice() {
    [] => {
      return Err(Error::PlayerNotFound {
        player: request.player_name.clone(),
        club:   request.from_club.clone(),
        season: season.to_string(),
      });
    }
    [row] => *row,
    many => {
      return Err(Error::AmbiguousMatch {
        player:     request.player_name.clone(),
        club:       request.from_club.clone(),
        season:     season.to_string(),
        candidates: many.len(),
      });
    }
  };

  let player_id = squad
    .column(ID_COLUMNS)
    .map(|col| squad.cell(row, col).trim().to_string())
    .filter(|id| is_present(id));
  let player_name = title_case(squad.cell(row, name_col));
  let from_display = title_case(&request.from_club);
  let to_display = title_case(&request.to_club);

  // ── Squads ──────────────────────────────────────────────────────────────
  let mut fields = staging.table_mut(from_squad).remove_row(row);
  set_club(&mut fields, staging.table(to_squad), CLUB_COLUMNS, &to_display);
  staging.table_mut(to_squad).push_fields(fields);

  // ── Valuations ──────────────────────────────────────────────────────────
  let mut valuations_moved = 0;
  if let Some(id) = &player_id {
    let origin = staging.table(from_vals);
    let positions = origin
      .column(ID_COLUMNS)
      .map(|col| origin.positions(col, |cell| cell.trim() == id))
      .unwrap_or_default();

    if !positions.is_empty() {
      let origin = staging.table_mut(from_vals);
      let mut moved: Vec<Vec<(String, String)>> =
        positions.iter().rev().map(|&r| origin.remove_row(r)).collect();
      moved.reverse();
      valuations_moved = moved.len();

      for mut fields in moved {
        set_club(&mut fields, staging.table(to_vals), VALUATION_CLUB_COLUMNS, &to_display);
        staging.table_mut(to_vals).push_fields(fields);
      }
    }
  } else {
    tracing::debug!(player = %player_name, "no player id; valuations left in place");
  }

  // ── Ledgers ─────────────────────────────────────────────────────────────
  let ledger = LedgerEntry {
    player_id: player_id.clone(),
    player_name,
    from_club: from_display,
    to_club: to_display,
    amount: request.amount,
    transfer_date,
  };
  ledger.append_to(staging.table_mut(bajas));
  ledger.append_to(staging.table_mut(altas));

  // ── Commit ──────────────────────────────────────────────────────────────
  let tables_written = staging.commit(store).await?;

  tracing::info!(
    player = %ledger.player_name,
    from = %ledger.from_club,
    to = %ledger.to_club,
    amount = ledger.amount,
    valuations_moved,
    "transfer committed"
  );

  Ok(TransferReceipt {
    transfer_id: Uuid::new_v4(),
    ledger,
    valuations_moved,
    tables_written,
  })
}
