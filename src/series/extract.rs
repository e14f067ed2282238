// src/series/extract.rs

use serde::Serialize;
use tracing::{debug, warn};

use super::tokenize::{parse_csv, Table};
use super::{Series, SeriesPoint};

/// What to do when no header matches [`ColumnMapping::value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueFallback {
    /// Read values from the right-most column.
    LastColumn,
    /// Leave the value unresolved; every row yields an invalid point.
    None,
}

/// Header labels used to locate the entity, date and value columns.
///
/// Labels are matched case-insensitively against trimmed header cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMapping {
    pub entity: String,
    pub year: String,
    pub value: String,
    pub value_fallback: ValueFallback,
}

impl Default for ColumnMapping {
    fn default() -> Self {
        Self {
            entity: "Entity".to_string(),
            year: "Year".to_string(),
            value: "Value".to_string(),
            value_fallback: ValueFallback::LastColumn,
        }
    }
}

/// Header cell without surrounding whitespace or a byte-order mark.
fn clean_header(raw: &str) -> &str {
    raw.trim_matches(|c: char| c.is_whitespace() || c == '\u{feff}')
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Columns {
    entity: Option<usize>,
    year: Option<usize>,
    value: Option<usize>,
}

impl ColumnMapping {
    fn resolve(&self, headers: &[String]) -> Columns {
        let find = |label: &str| {
            headers
                .iter()
                .position(|h| clean_header(h).to_lowercase() == label.to_lowercase())
        };
        let value = find(&self.value).or(match self.value_fallback {
            ValueFallback::LastColumn => headers.len().checked_sub(1),
            ValueFallback::None => None,
        });
        Columns {
            entity: find(&self.entity),
            year: find(&self.year),
            value,
        }
    }
}

/// A normalized series plus counts of everything that was left out of it.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Extraction {
    pub series: Series,
    /// Data rows whose field count differs from the header's.
    pub malformed_rows: usize,
    /// Rows rejected by the entity filter.
    pub filtered_rows: usize,
    /// Rows with an empty date or a non-finite value.
    pub invalid_points: usize,
    /// The tokenizer stopped at a size ceiling.
    pub truncated: bool,
}

/// Turn a tokenized table into a date-sorted series.
///
/// Never fails: empty tables, short rows and unparsable values are all
/// excluded and counted in the returned [`Extraction`].
pub fn extract_series(table: &Table, entity: Option<&str>, mapping: &ColumnMapping) -> Extraction {
    let mut out = Extraction {
        truncated: table.truncated,
        ..Extraction::default()
    };

    let mut rows = table.rows.iter().filter(|r| !r.is_empty());
    let Some(header) = rows.next() else {
        return out;
    };
    let cols = mapping.resolve(header);
    let entity = entity.filter(|e| !e.is_empty());
    if let (Some(wanted), None) = (entity, cols.entity) {
        warn!(entity = wanted, label = %mapping.entity, "no entity column; filter not applied");
    }

    for row in rows {
        if row.len() != header.len() {
            out.malformed_rows += 1;
            continue;
        }
        if let (Some(wanted), Some(i)) = (entity, cols.entity) {
            if row[i] != wanted {
                out.filtered_rows += 1;
                continue;
            }
        }

        let date = &row[cols.year.unwrap_or(0)];
        let value = cols
            .value
            .and_then(|i| parse_number(&row[i]))
            .unwrap_or(f64::NAN);
        let point = SeriesPoint::new(date.as_str(), value);
        if point.is_valid() {
            out.series.push(point);
        } else {
            out.invalid_points += 1;
        }
    }

    out.series.sort_by(|a, b| a.date.cmp(&b.date));

    debug!(
        points = out.series.len(),
        malformed_rows = out.malformed_rows,
        filtered_rows = out.filtered_rows,
        invalid_points = out.invalid_points,
        truncated = out.truncated,
        "extracted series"
    );
    out
}

/// Tokenize and extract in one step.
pub fn normalize_csv(text: &str, entity: Option<&str>, mapping: &ColumnMapping) -> Extraction {
    extract_series(&parse_csv(text), entity, mapping)
}

/// Tokenize and extract with the default [`ColumnMapping`], keeping only the series.
pub fn csv_to_series(text: &str, entity: Option<&str>) -> Series {
    normalize_csv(text, entity, &ColumnMapping::default()).series
}

/// Decimal or exponent notation, surrounding whitespace ignored.
///
/// Blank is not a number, so a row with an empty value field is dropped.
/// JavaScript's `Number("")` is `0`; rows a `Number`-based reader would keep
/// as zero are excluded here.
fn parse_number(raw: &str) -> Option<f64> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    s.parse::<f64>().ok()
}
