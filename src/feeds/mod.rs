// src/feeds/mod.rs

use anyhow::{ensure, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::{fmt, time::Duration};
use tracing::{info, instrument};

use crate::fetch::Fetcher;
use crate::series::Series;

pub mod ffpi;
pub mod fx;
pub mod imf;
pub mod owid;
pub mod unhcr;

const HOUR: u64 = 3600;

/// A normalized series as served to callers, with where it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub source: String,
    pub points: Series,
}

/// One upstream time series and the parameters that select it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Feed {
    /// World wheat price, monthly, last 36 months.
    Wheat,
    /// FAO Food Price Index, monthly.
    Ffpi,
    /// IMF consumer price index for one country and series code.
    ImfCpi {
        country: String,
        series: String,
        start: String,
    },
    /// Refugees hosted in Egypt, yearly.
    Refugees,
    /// Cost of a healthy diet in Egypt, yearly.
    DietCost,
    /// Daily exchange rate over the last year.
    Fx { base: String, sym: String },
}

impl Feed {
    /// Country and series codes are ASCII letters, digits and `_`; the start
    /// period is digits and `-`. Anything else is rejected.
    pub fn imf_cpi(country: &str, series: &str, start: &str) -> Result<Self> {
        Ok(Feed::ImfCpi {
            country: code("country", country, is_code_char)?.to_uppercase(),
            series: code("series", series, is_code_char)?,
            start: code("start period", start, |c| c.is_ascii_digit() || c == '-')?,
        })
    }

    /// Currency codes are ASCII letters, digits and `_`.
    pub fn fx(base: &str, sym: &str) -> Result<Self> {
        Ok(Feed::Fx {
            base: code("base currency", base, is_code_char)?.to_uppercase(),
            sym: code("quote currency", sym, is_code_char)?.to_uppercase(),
        })
    }

    pub fn name(&self) -> &'static str {
        match self {
            Feed::Wheat => "wheat",
            Feed::Ffpi => "ffpi",
            Feed::ImfCpi { .. } => "imf-cpi",
            Feed::Refugees => "unhcr-egy",
            Feed::DietCost => "diet-cost",
            Feed::Fx { .. } => "fx",
        }
    }

    /// How long a fetched payload stays fresh.
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(match self {
            Feed::Wheat | Feed::Ffpi | Feed::ImfCpi { .. } => 24 * HOUR,
            Feed::Refugees | Feed::DietCost => 7 * 24 * HOUR,
            Feed::Fx { .. } => 6 * HOUR,
        })
    }

    /// Key identifying this feed and its parameters. Distinct parameters give
    /// distinct keys; it is filename-safe for feeds built by [`Feed::imf_cpi`]
    /// and [`Feed::fx`].
    pub fn cache_key(&self) -> String {
        match self {
            Feed::ImfCpi {
                country,
                series,
                start,
            } => format!("{}.{}.{}.{}", self.name(), country, series, start),
            Feed::Fx { base, sym } => format!("{}.{}.{}", self.name(), base, sym),
            _ => self.name().to_string(),
        }
    }

    /// Fetch and normalize this feed from its upstream source.
    #[instrument(level = "info", skip(self, fetcher), fields(feed = %self))]
    pub async fn fetch(&self, fetcher: &Fetcher) -> Result<FeedPayload> {
        let payload = match self {
            Feed::Wheat => owid::fetch_wheat(fetcher).await?,
            Feed::Ffpi => ffpi::fetch(fetcher).await?,
            Feed::ImfCpi {
                country,
                series,
                start,
            } => imf::fetch(fetcher, country, series, start).await?,
            Feed::Refugees => unhcr::fetch(fetcher).await?,
            Feed::DietCost => owid::fetch_diet_cost(fetcher).await?,
            Feed::Fx { base, sym } => fx::fetch(fetcher, base, sym).await?,
        };
        info!(points = payload.points.len(), source = %payload.source, "fetched");
        Ok(payload)
    }
}

impl fmt::Display for Feed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.cache_key())
    }
}

fn is_code_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Trimmed `raw`, or an error naming `what` when it is empty or has a char
/// outside `allowed`.
fn code(what: &str, raw: &str, allowed: impl Fn(char) -> bool) -> Result<String> {
    let s = raw.trim();
    ensure!(
        !s.is_empty() && s.chars().all(allowed),
        "invalid {} {:?}",
        what,
        raw
    );
    Ok(s.to_string())
}

/// Read a JSON number or numeric string. Anything else is `None`.
pub(crate) fn json_number(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                None
            } else {
                s.parse().ok()
            }
        }
        _ => None,
    }
}

/// First key of `keys` present on `obj` with a non-null value.
pub(crate) fn first_present<'a>(obj: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|k| obj.get(k))
        .find(|v| !v.is_null())
}
