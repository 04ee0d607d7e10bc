//! Name canonicalisation for matching and display.

use unicode_normalization::{UnicodeNormalization, char::is_combining_mark};

/// Canonical matching form: NFD-decomposed with combining marks removed,
/// lower-cased and trimmed. `"  Juan Pérez"` and `"juan perez"` normalise to
/// the same string.
pub fn normalize(text: &str) -> String {
  text
    .nfd()
    .filter(|c| !is_combining_mark(*c))
    .collect::<String>()
    .to_lowercase()
    .trim()
    .to_string()
}

/// Title-case every word: a letter is upper-cased when it follows a
/// non-letter, lower-cased otherwise (`"club b"` → `"Club B"`,
/// `"o'higgins"` → `"O'Higgins"`). Surrounding whitespace is trimmed.
pub fn title_case(text: &str) -> String {
  let mut out = String::with_capacity(text.len());
  let mut prev_is_letter = false;
  for c in text.trim().chars() {
    if c.is_alphabetic() {
      if prev_is_letter {
        out.extend(c.to_lowercase());
      } else {
        out.extend(c.to_uppercase());
      }
      prev_is_letter = true;
    } else {
      out.push(c);
      prev_is_letter = false;
    }
  }
  out
}

/// `true` when a cell holds a usable identifier (not blank, not a scraper
/// placeholder).
pub fn is_present(cell: &str) -> bool {
  let cell = cell.trim();
  !(cell.is_empty()
    || cell.eq_ignore_ascii_case("n/a")
    || cell.eq_ignore_ascii_case("nan")
    || cell.eq_ignore_ascii_case("none"))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn strips_accents_and_case() {
    assert_eq!(normalize("  Juan PÉREZ "), "juan perez");
    assert_eq!(normalize("Núñez"), "nunez");
    assert_eq!(normalize("Juan Perez"), normalize("juan pérez"));
  }

  #[test]
  fn title_case_words() {
    assert_eq!(title_case("club b"), "Club B");
    assert_eq!(title_case("BOCA JUNIORS"), "Boca Juniors");
    assert_eq!(title_case("o'higgins"), "O'Higgins");
    assert_eq!(title_case(" juan pérez "), "Juan Pérez");
  }

  #[test]
  fn placeholder_cells() {
    assert!(is_present("1234"));
    assert!(!is_present(" "));
    assert!(!is_present("N/A"));
    assert!(!is_present("nan"));
  }
}
