//! Header-driven CSV text parser for studio exports.
//!
//! Exports look like:
//!   "Purchase ID","First Name","Customer Email","Bought Date/Time (GMT)"
//!   "50000001","Emma","emma.smith@example.com","2025-09-14T18:22:05.000Z"
//!
//! The tokenizer is deliberately lenient. A double quote toggles quoting and is
//! never part of a value; a comma only splits fields outside quotes. An
//! unbalanced quote keeps the rest of the line in one field rather than
//! failing the row.

use crate::types::CsvRow;

const BOM: char = '\u{feff}';

/// Split one line into trimmed fields.
pub fn tokenize_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for ch in line.chars() {
        match ch {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                fields.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(ch),
        }
    }

    fields.push(current.trim().to_string());
    fields
}

/// Parse export text into rows, one per non-blank line after the header.
///
/// Missing trailing fields become empty strings; extra fields are ignored.
pub fn parse_csv(text: &str) -> Vec<CsvRow> {
    let mut lines = text.split('\n');
    let headers = match lines.next() {
        Some(first) => tokenize_line(first.trim_start_matches(BOM)),
        None => return Vec::new(),
    };

    lines
        .filter(|line| !line.trim().is_empty())
        .map(|line| {
            let mut values = tokenize_line(line).into_iter();
            let fields = headers
                .iter()
                .map(|header| (header.clone(), values.next().unwrap_or_default()))
                .collect();
            CsvRow::new(fields)
        })
        .collect()
}
