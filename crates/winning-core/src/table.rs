//! [`Table`]: a header-addressed, CSV-shaped dataset held in memory.
//!
//! Scraped datasets do not share column names (`player_name` in one ledger,
//! `player name` in the other, Spanish headers in the squad), so every lookup
//! goes through [`Table::column`] with a list of accepted aliases.

use serde::{Deserialize, Serialize};

use crate::normalize::normalize;

/// A header row plus data rows. Every row has exactly `headers.len()` cells.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
  headers: Vec<String>,
  rows:    Vec<Vec<String>>,
}

/// Header comparison form: BOM dropped, accents and case folded.
fn header_key(header: &str) -> String {
  normalize(header.trim_start_matches('\u{feff}'))
}

/// `true` when `header` is one of `aliases` under [`Table::column`] rules.
pub fn header_matches(header: &str, aliases: &[&str]) -> bool {
  let key = header_key(header);
  aliases.iter().any(|alias| header_key(alias) == key)
}

impl Table {
  pub fn new(headers: Vec<String>) -> Self {
    Self { headers, rows: Vec::new() }
  }

  /// Build a table, padding short rows with empty cells and dropping cells
  /// beyond the header width.
  pub fn from_rows(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
    let width = headers.len();
    let rows = rows
      .into_iter()
      .map(|mut row| {
        row.resize(width, String::new());
        row
      })
      .collect();
    Self { headers, rows }
  }

  pub fn headers(&self) -> &[String] { &self.headers }

  pub fn rows(&self) -> &[Vec<String>] { &self.rows }

  pub fn len(&self) -> usize { self.rows.len() }

  pub fn is_empty(&self) -> bool { self.rows.is_empty() }

  /// Index of the first alias (in alias order) that names a column.
  pub fn column(&self, aliases: &[&str]) -> Option<usize> {
    let keys: Vec<String> = self.headers.iter().map(|h| header_key(h)).collect();
    aliases.iter().find_map(|alias| {
      let alias = header_key(alias);
      keys.iter().position(|k| *k == alias)
    })
  }

  /// The cell at (`row`, `col`); empty when out of range.
  pub fn cell(&self, row: usize, col: usize) -> &str {
    self
      .rows
      .get(row)
      .and_then(|r| r.get(col))
      .map(String::as_str)
      .unwrap_or("")
  }

  pub fn set_cell(&mut self, row: usize, col: usize, value: impl Into<String>) {
    if let Some(cell) = self.rows.get_mut(row).and_then(|r| r.get_mut(col)) {
      *cell = value.into();
    }
  }

  /// Index of the column called `name`, appending it (with an empty cell in
  /// every existing row) when absent.
  pub fn ensure_column(&mut self, name: &str) -> usize {
    if let Some(idx) = self.column(&[name]) {
      return idx;
    }
    self.headers.push(name.to_string());
    for row in &mut self.rows {
      row.push(String::new());
    }
    self.headers.len() - 1
  }

  /// `(header, value)` pairs for one row, in column order.
  pub fn record(&self, row: usize) -> Vec<(&str, &str)> {
    self
      .headers
      .iter()
      .enumerate()
      .map(|(col, h)| (h.as_str(), self.cell(row, col)))
      .collect()
  }

  /// Remove a row and return it as owned `(header, value)` pairs.
  pub fn remove_row(&mut self, row: usize) -> Vec<(String, String)> {
    let cells = self.rows.remove(row);
    self.headers.iter().cloned().zip(cells).collect()
  }

  /// Append a row given positionally; short rows are padded.
  pub fn push_row(&mut self, mut row: Vec<String>) {
    row.resize(self.headers.len(), String::new());
    self.rows.push(row);
  }

  /// Append a row given as `(header, value)` pairs. Headers are matched
  /// case-insensitively; unknown headers become new columns.
  pub fn push_fields<H, V>(&mut self, fields: impl IntoIterator<Item = (H, V)>)
  where
    H: AsRef<str>,
    V: Into<String>,
  {
    let mut placed: Vec<(usize, String)> = Vec::new();
    for (header, value) in fields {
      let col = self.ensure_column(header.as_ref());
      placed.push((col, value.into()));
    }
    let mut row = vec![String::new(); self.headers.len()];
    for (col, value) in placed {
      row[col] = value;
    }
    self.rows.push(row);
  }

  /// Indices of the rows whose cell in `col` satisfies `pred`.
  pub fn positions<F>(&self, col: usize, mut pred: F) -> Vec<usize>
  where
    F: FnMut(&str) -> bool,
  {
    (0..self.rows.len())
      .filter(|&row| pred(self.cell(row, col)))
      .collect()
  }
}
