//! Tables as JSON record arrays.

use serde_json::{Map, Number, Value};
use winning_core::Table;

/// A cell as JSON: blank is `null`, integers and finite decimals are numbers,
/// everything else is a string.
pub fn cell_value(cell: &str) -> Value {
  let trimmed = cell.trim();
  if trimmed.is_empty() {
    return Value::Null;
  }
  if let Ok(n) = trimmed.parse::<i64>() {
    return Value::from(n);
  }
  trimmed
    .parse::<f64>()
    .ok()
    .and_then(Number::from_f64)
    .map_or_else(|| Value::String(cell.to_string()), Value::Number)
}

/// One object per row keyed by header.
pub fn row_record(table: &Table, row: usize) -> Map<String, Value> {
  table
    .record(row)
    .into_iter()
    .map(|(header, cell)| (header.to_string(), cell_value(cell)))
    .collect()
}

pub fn records(table: &Table) -> Vec<Map<String, Value>> {
  (0..table.len()).map(|row| row_record(table, row)).collect()
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  #[test]
  fn cells_are_typed() {
    assert_eq!(cell_value(""), Value::Null);
    assert_eq!(cell_value("5000000"), json!(5000000));
    assert_eq!(cell_value("1.5"), json!(1.5));
    assert_eq!(cell_value("Libre / Cesión"), json!("Libre / Cesión"));
    assert_eq!(cell_value("NaN"), json!("NaN"));
  }

  #[test]
  fn rows_become_objects() {
    let table = Table::from_rows(
      vec!["nombre".into(), "edad".into()],
      vec![vec!["Juan".into(), "23".into()], vec!["Pedro".into(), String::new()]],
    );
    assert_eq!(
      serde_json::to_value(records(&table)).unwrap(),
      json!([{ "nombre": "Juan", "edad": 23 }, { "nombre": "Pedro", "edad": null }])
    );
  }
}
