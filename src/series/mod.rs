// src/series/mod.rs

use serde::{Deserialize, Serialize};

pub mod extract;
pub mod shape;
pub mod tokenize;

pub use extract::{
    csv_to_series, extract_series, normalize_csv, ColumnMapping, Extraction, ValueFallback,
};
pub use tokenize::{parse_csv, parse_csv_with_limits, Row, Table, TokenizeLimits};

/// One observation of a normalized time series.
///
/// `date` is `YYYY`, `YYYY-MM` or `YYYY-MM-DD`, so plain string ordering is
/// chronological ordering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub date: String,
    pub value: f64,
}

impl SeriesPoint {
    pub fn new(date: impl Into<String>, value: f64) -> Self {
        Self {
            date: date.into(),
            value,
        }
    }

    /// Non-empty date and a finite value.
    pub fn is_valid(&self) -> bool {
        !self.date.is_empty() && self.value.is_finite()
    }
}

/// Points sorted ascending by `date`.
pub type Series = Vec<SeriesPoint>;
