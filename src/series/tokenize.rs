// src/series/tokenize.rs

use std::mem;
use tracing::warn;

/// Fields of one CSV line, in order.
pub type Row = Vec<String>;

/// Tokenized CSV. Row 0, when present, is the header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub rows: Vec<Row>,
    /// Set when the input exceeded a [`TokenizeLimits`] ceiling and was cut short.
    pub truncated: bool,
}

impl Table {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Upper bounds on how much input the tokenizer will consume.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenizeLimits {
    pub max_bytes: usize,
    pub max_rows: usize,
}

impl Default for TokenizeLimits {
    fn default() -> Self {
        Self {
            max_bytes: 32 * 1024 * 1024,
            max_rows: 1_000_000,
        }
    }
}

/// Tokenize `text` with the default ceilings.
pub fn parse_csv(text: &str) -> Table {
    parse_csv_with_limits(text, &TokenizeLimits::default())
}

/// Split `text` into rows and fields.
///
/// A `"` toggles quoted mode and is itself dropped; inside quotes `,` and
/// `\n` are ordinary content. Doubled quotes are not unescaped, so `"a""b"`
/// yields `ab`. `\r` is kept as field content.
///
/// Input past `limits.max_bytes` is ignored and no row past
/// `limits.max_rows` is emitted; either sets [`Table::truncated`].
pub fn parse_csv_with_limits(text: &str, limits: &TokenizeLimits) -> Table {
    let mut truncated = false;
    let input = if text.len() > limits.max_bytes {
        truncated = true;
        let mut end = limits.max_bytes;
        while !text.is_char_boundary(end) {
            end -= 1;
        }
        &text[..end]
    } else {
        text
    };

    let mut rows: Vec<Row> = Vec::new();
    let mut row: Row = Vec::new();
    let mut field = String::new();
    let mut quoted = false;

    for ch in input.chars() {
        if rows.len() >= limits.max_rows {
            truncated = true;
            break;
        }
        match ch {
            '"' => quoted = !quoted,
            '\n' if !quoted => {
                row.push(mem::take(&mut field));
                rows.push(mem::take(&mut row));
            }
            ',' if !quoted => row.push(mem::take(&mut field)),
            _ => field.push(ch),
        }
    }

    // flush a trailing row with no terminating newline
    if !field.is_empty() || !row.is_empty() {
        if rows.len() < limits.max_rows {
            row.push(field);
            rows.push(row);
        } else {
            truncated = true;
        }
    }

    if truncated {
        warn!(
            input_bytes = text.len(),
            max_bytes = limits.max_bytes,
            max_rows = limits.max_rows,
            rows = rows.len(),
            "CSV input exceeded tokenizer ceiling; truncated"
        );
    }

    Table { rows, truncated }
}
