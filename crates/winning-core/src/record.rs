//! Typed records and the header aliases used to find them in scraped tables.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::table::Table;

// ─── Header aliases ──────────────────────────────────────────────────────────

/// Accepted headers for a player's display name.
pub const NAME_COLUMNS: &[&str] = &[
  "nombre y apellido",
  "name",
  "player_name",
  "player name",
  "nombre",
  "nombre_jugador",
  "jugador",
];

/// Accepted headers for a player identifier.
pub const ID_COLUMNS: &[&str] = &["player_id", "id"];

/// Accepted headers for a squad row's current club.
pub const CLUB_COLUMNS: &[&str] = &["club", "club actual", "club_actual", "current_club"];

/// Accepted headers for the club named on a valuation row.
pub const VALUATION_CLUB_COLUMNS: &[&str] = &["club_nombre", "club_name"];

pub const VALUATION_DATE_COLUMNS: &[&str] = &["valuation_date", "fecha"];

pub const VALUATION_AMOUNT_COLUMNS: &[&str] = &["valuation_amount", "valor"];

/// Accepted headers for a ledger amount.
pub const AMOUNT_COLUMNS: &[&str] = &["amount", "monto"];

// ─── Ledger ──────────────────────────────────────────────────────────────────

/// One executed transfer. The same entry is appended to the origin club's
/// `bajas` and the destination club's `altas`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
  pub player_id:     Option<String>,
  pub player_name:   String,
  pub from_club:     String,
  pub to_club:       String,
  pub amount:        u64,
  pub transfer_date: NaiveDate,
}

impl LedgerEntry {
  /// `(aliases, value)` per field; the first alias is the header used when
  /// the target table has no matching column yet.
  fn fields(&self) -> [(&'static [&'static str], String); 6] {
    [
      (ID_COLUMNS, self.player_id.clone().unwrap_or_default()),
      (&["player_name", "player name", "nombre_jugador"][..], self.player_name.clone()),
      (&["from_club"][..], self.from_club.clone()),
      (&["to_club"][..], self.to_club.clone()),
      (AMOUNT_COLUMNS, self.amount.to_string()),
      (&["transfer_date", "fecha"][..], self.transfer_date.format("%Y-%m-%d").to_string()),
    ]
  }

  /// Append this entry to a ledger table, filling existing columns by alias
  /// and adding any canonical column the table lacks.
  pub fn append_to(&self, ledger: &mut Table) {
    let mut placed = Vec::new();
    for (aliases, value) in self.fields() {
      let col = match ledger.column(aliases) {
        Some(col) => col,
        None => ledger.ensure_column(aliases[0]),
      };
      placed.push((col, value));
    }
    let mut row = vec![String::new(); ledger.headers().len()];
    for (col, value) in placed {
      row[col] = value;
    }
    ledger.push_row(row);
  }
}

// ─── Valuations ──────────────────────────────────────────────────────────────

/// One point of a player's market-value history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuationRecord {
  pub player_id:        String,
  pub player_name:      String,
  pub valuation_amount: u64,
  /// Zero-padded `YYYY-MM-DD`, so string order is chronological order.
  pub valuation_date:   String,
  pub age_at_valuation: Option<u32>,
  pub club_id:          Option<String>,
  pub club_name:        String,
}

impl ValuationRecord {
  /// Header row of a `valuations` table. The order is positional: retrieval
  /// falls back to splitting rendered rows on commas.
  pub const HEADERS: [&'static str; 7] = [
    "player_id",
    "nombre_jugador",
    "valuation_amount",
    "valuation_date",
    "age_at_valuation",
    "club_id",
    "club_nombre",
  ];

  /// Cells in [`Self::HEADERS`] order. Missing numbers are written as `0`.
  pub fn to_row(&self) -> Vec<String> {
    vec![
      self.player_id.clone(),
      self.player_name.clone(),
      self.valuation_amount.to_string(),
      self.valuation_date.clone(),
      self.age_at_valuation.unwrap_or(0).to_string(),
      self.club_id.clone().unwrap_or_else(|| "0".to_string()),
      self.club_name.clone(),
    ]
  }

  /// Build a `valuations` table from records.
  pub fn table(records: &[ValuationRecord]) -> Table {
    Table::from_rows(
      Self::HEADERS.iter().map(|h| h.to_string()).collect(),
      records.iter().map(Self::to_row).collect(),
    )
  }
}
