//! Transfer balance for one club and season.

use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  key::{TableKey, TableKind},
  record::AMOUNT_COLUMNS,
  store::DatasetStore,
  table::Table,
};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Revenue {
  /// Sum of `altas` amounts.
  pub total_spent:      f64,
  /// Sum of `bajas` amounts.
  pub total_income:     f64,
  pub net_benefit:      f64,
  pub budget_remaining: f64,
}

/// A ledger amount. Free transfers and loans are recorded as text
/// (`Libre / Cesión`) and count as zero.
pub fn parse_amount(cell: &str) -> f64 {
  cell
    .trim()
    .parse::<f64>()
    .ok()
    .filter(|v| v.is_finite())
    .unwrap_or(0.0)
}

/// Sum of the amount column; a ledger without one sums to zero.
pub fn ledger_total(ledger: &Table) -> f64 {
  let Some(col) = ledger.column(AMOUNT_COLUMNS) else {
    return 0.0;
  };
  (0..ledger.len()).map(|row| parse_amount(ledger.cell(row, col))).sum()
}

/// Compute the transfer balance of `club` in `season` against a budget.
/// Both ledgers must exist.
pub async fn revenue<S>(
  store: &S,
  club: &str,
  season: &str,
  transfer_budget: f64,
) -> Result<Revenue>
where
  S: DatasetStore,
{
  let altas_key = TableKey::new(club, season, TableKind::Altas)?;
  let bajas_key = altas_key.with_kind(TableKind::Bajas);

  let altas = store
    .get(&altas_key)
    .await
    .map_err(Error::upstream)?
    .ok_or_else(|| Error::DatasetNotFound(altas_key.clone()))?;
  let bajas = store
    .get(&bajas_key)
    .await
    .map_err(Error::upstream)?
    .ok_or_else(|| Error::DatasetNotFound(bajas_key.clone()))?;

  let total_spent = ledger_total(&altas);
  let total_income = ledger_total(&bajas);
  Ok(Revenue {
    total_spent,
    total_income,
    net_benefit: total_income - total_spent,
    budget_remaining: transfer_budget - total_spent + total_income,
  })
}
