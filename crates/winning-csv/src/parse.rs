//! RFC 4180 record reader.
//!
//! Pipeline:
//!   raw &str
//!     └─ strip BOM
//!          └─ read_records()  → Vec<Record>   (quotes, embedded newlines)
//!               └─ parse_table() → Table       (header + width check)

use winning_core::Table;

use crate::error::{Error, Result};

/// One physical record and the line it started on (1-based).
struct Record {
  line:   usize,
  fields: Vec<String>,
}

impl Record {
  /// A line with nothing on it, not even `""`.
  fn is_blank(&self, quoted: bool) -> bool {
    !quoted && self.fields.len() == 1 && self.fields[0].is_empty()
  }
}

fn read_records(input: &str) -> Result<Vec<Record>> {
  let mut records = Vec::new();
  let mut chars = input.chars().peekable();

  let mut line = 1usize;
  let mut start = 1usize;
  let mut field = String::new();
  let mut fields: Vec<String> = Vec::new();
  let mut in_quotes = false;
  let mut quoted = false;

  while let Some(c) = chars.next() {
    if in_quotes {
      match c {
        '"' if chars.peek() == Some(&'"') => {
          chars.next();
          field.push('"');
        }
        '"' => in_quotes = false,
        '\n' => {
          line += 1;
          field.push('\n');
        }
        _ => field.push(c),
      }
      continue;
    }

    match c {
      '"' if field.is_empty() => {
        in_quotes = true;
        quoted = true;
      }
      ',' => fields.push(std::mem::take(&mut field)),
      '\r' if chars.peek() == Some(&'\n') => {}
      '\n' => {
        fields.push(std::mem::take(&mut field));
        let record = Record { line: start, fields: std::mem::take(&mut fields) };
        if !record.is_blank(quoted) {
          records.push(record);
        }
        quoted = false;
        line += 1;
        start = line;
      }
      // A stray quote inside an unquoted field is kept literally.
      _ => field.push(c),
    }
  }

  if in_quotes {
    return Err(Error::UnterminatedQuote { line: start });
  }
  if !field.is_empty() || !fields.is_empty() || quoted {
    fields.push(field);
    records.push(Record { line: start, fields });
  }
  Ok(records)
}

pub(crate) fn parse_table(input: &str) -> Result<Table> {
  let input = input.strip_prefix('\u{feff}').unwrap_or(input);
  let mut records = read_records(input)?.into_iter();

  let Some(header) = records.next() else {
    return Ok(Table::default());
  };
  let headers: Vec<String> = header.fields.into_iter().map(|h| h.trim().to_string()).collect();

  let mut rows = Vec::new();
  for record in records {
    if record.fields.len() > headers.len() {
      return Err(Error::RaggedRow {
        line:     record.line,
        expected: headers.len(),
        found:    record.fields.len(),
      });
    }
    rows.push(record.fields);
  }
  Ok(Table::from_rows(headers, rows))
}
