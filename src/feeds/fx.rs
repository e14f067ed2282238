// src/feeds/fx.rs

use anyhow::{Context, Result};
use chrono::{Duration, NaiveDate, Utc};
use serde_json::Value;
use url::Url;

use super::{json_number, FeedPayload};
use crate::fetch::Fetcher;
use crate::series::{shape, Series, SeriesPoint};

pub const TIMESERIES_URL: &str = "https://api.exchangerate.host/timeseries";
pub const DEFAULT_BASE: &str = "USD";
pub const DEFAULT_SYM: &str = "EGP";
const WINDOW_DAYS: i64 = 365;

pub fn timeseries_url(base: &str, sym: &str, end: NaiveDate) -> Result<Url> {
    let start = end - Duration::days(WINDOW_DAYS);
    let mut url = Url::parse(TIMESERIES_URL).context("parsing FX base URL")?;
    url.query_pairs_mut()
        .append_pair("start_date", &start.format("%Y-%m-%d").to_string())
        .append_pair("end_date", &end.format("%Y-%m-%d").to_string())
        .append_pair("base", base)
        .append_pair("symbols", sym);
    Ok(url)
}

pub async fn fetch(fetcher: &Fetcher, base: &str, sym: &str) -> Result<FeedPayload> {
    let url = timeseries_url(base, sym, Utc::now().date_naive())?;
    let body: Value = fetcher.json(&url).await?;
    Ok(FeedPayload {
        label: Some(format!("{}/{}", base, sym)),
        source: url.to_string(),
        points: decode(&body, sym),
    })
}

/// `{"rates": {"2024-01-02": {"EGP": 30.9}, ...}}` → one point per day.
pub fn decode(body: &Value, sym: &str) -> Series {
    let Some(rates) = body.get("rates").and_then(Value::as_object) else {
        return Series::new();
    };
    let points = rates
        .iter()
        .filter_map(|(date, day)| {
            let value = day.get(sym).and_then(json_number)?;
            Some(SeriesPoint::new(date.as_str(), value))
        })
        .collect();
    shape::sort_by_date(shape::retain_valid(points))
}
