//! CSV writer: BOM, `\n` line endings, minimal quoting.

use winning_core::Table;

const BOM: char = '\u{feff}';

fn needs_quotes(field: &str) -> bool {
  field.contains([',', '"', '\n', '\r'])
}

fn push_field(out: &mut String, field: &str) {
  if needs_quotes(field) {
    out.push('"');
    out.push_str(&field.replace('"', "\"\""));
    out.push('"');
  } else {
    out.push_str(field);
  }
}

fn push_record<S: AsRef<str>>(out: &mut String, fields: &[S]) {
  // A bare empty line reads back as no record at all.
  if fields.len() == 1 && fields[0].as_ref().is_empty() {
    out.push_str("\"\"\n");
    return;
  }
  for (i, field) in fields.iter().enumerate() {
    if i > 0 {
      out.push(',');
    }
    push_field(out, field.as_ref());
  }
  out.push('\n');
}

pub(crate) fn serialize_table(table: &Table) -> String {
  let mut out = String::new();
  out.push(BOM);
  if table.headers().is_empty() {
    return out;
  }
  push_record(&mut out, table.headers());
  for row in table.rows() {
    push_record(&mut out, row.as_slice());
  }
  out
}
