//! Table identity: which club, which season, which dataset.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// The dataset a table holds. The lowercase name is part of the blob path and
/// of the `tipo` metadata on indexed chunks.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum TableKind {
  /// The squad roster.
  Players,
  /// Incoming transfers.
  Altas,
  /// Outgoing transfers.
  Bajas,
  /// Market-value history for every player in the squad.
  Valuations,
  /// Gross yearly salaries.
  Salaries,
}

impl TableKind {
  pub const ALL: [TableKind; 5] = [
    TableKind::Altas,
    TableKind::Bajas,
    TableKind::Players,
    TableKind::Valuations,
    TableKind::Salaries,
  ];

  pub fn as_str(self) -> &'static str {
    match self {
      Self::Players => "players",
      Self::Altas => "altas",
      Self::Bajas => "bajas",
      Self::Valuations => "valuations",
      Self::Salaries => "salaries",
    }
  }
}

impl fmt::Display for TableKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for TableKind {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    match s.trim().to_ascii_lowercase().as_str() {
      "players" => Ok(Self::Players),
      "altas" => Ok(Self::Altas),
      "bajas" => Ok(Self::Bajas),
      "valuations" => Ok(Self::Valuations),
      "salaries" => Ok(Self::Salaries),
      other => Err(Error::InvalidKey(format!("unknown table kind: {other:?}"))),
    }
  }
}

/// Identifies one dataset table. `club` is stored lower-cased and trimmed so
/// that `"Boca Juniors"` and `"boca juniors "` address the same blob.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TableKey {
  club:   String,
  season: String,
  kind:   TableKind,
}

impl TableKey {
  pub fn new(club: &str, season: &str, kind: TableKind) -> Result<Self> {
    let club = club.trim().to_lowercase();
    let season = season.trim().to_string();
    for (what, value) in [("club", &club), ("season", &season)] {
      if value.is_empty() {
        return Err(Error::InvalidKey(format!("empty {what}")));
      }
      if value.contains(['/', '\\']) || value == ".." {
        return Err(Error::InvalidKey(format!("{what} {value:?} is not a path segment")));
      }
    }
    Ok(Self { club, season, kind })
  }

  pub fn club(&self) -> &str { &self.club }

  pub fn season(&self) -> &str { &self.season }

  pub fn kind(&self) -> TableKind { self.kind }

  /// The same club and season, another dataset.
  pub fn with_kind(&self, kind: TableKind) -> Self {
    Self { kind, ..self.clone() }
  }

  /// Object path of the CSV blob:
  /// `datasets/{club}/{season}/{club}_{season}_{kind}.csv`.
  pub fn path(&self) -> String {
    format!(
      "datasets/{club}/{season}/{club}_{season}_{kind}.csv",
      club = self.club,
      season = self.season,
      kind = self.kind,
    )
  }
}

impl fmt::Display for TableKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.path())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn path_layout() {
    let key = TableKey::new("Boca Juniors ", "2024", TableKind::Valuations).unwrap();
    assert_eq!(
      key.path(),
      "datasets/boca juniors/2024/boca juniors_2024_valuations.csv"
    );
  }

  #[test]
  fn club_is_case_insensitive() {
    let a = TableKey::new("Club A", "2024", TableKind::Players).unwrap();
    let b = TableKey::new("club a", "2024", TableKind::Players).unwrap();
    assert_eq!(a, b);
  }

  #[test]
  fn rejects_path_traversal() {
    assert!(TableKey::new("../etc", "2024", TableKind::Players).is_err());
    assert!(TableKey::new("club", "", TableKind::Players).is_err());
  }

  #[test]
  fn kind_from_str() {
    assert_eq!("Altas".parse::<TableKind>().unwrap(), TableKind::Altas);
    assert!("transfers".parse::<TableKind>().is_err());
  }
}
