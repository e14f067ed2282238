// src/feeds/imf.rs

use anyhow::{Context, Result};
use serde_json::Value;
use url::Url;

use super::{json_number, FeedPayload};
use crate::fetch::Fetcher;
use crate::series::{shape, Series, SeriesPoint};

pub const BASE_URL: &str = "https://dataservices.imf.org/REST/SDMX_JSON.svc";
pub const DEFAULT_COUNTRY: &str = "EG";
/// Food CPI index.
pub const DEFAULT_SERIES: &str = "PCPIF_IX";
pub const DEFAULT_START: &str = "2019-01";

pub fn compact_data_url(country: &str, series: &str, start: &str) -> Result<Url> {
    let mut url = Url::parse(&format!("{}/CompactData/CPI/M.{}.{}", BASE_URL, country, series))
        .with_context(|| format!("building IMF URL for {}.{}", country, series))?;
    url.query_pairs_mut().append_pair("startPeriod", start);
    Ok(url)
}

pub async fn fetch(
    fetcher: &Fetcher,
    country: &str,
    series: &str,
    start: &str,
) -> Result<FeedPayload> {
    let url = compact_data_url(country, series, start)?;
    let body: Value = fetcher.json(&url).await?;
    Ok(FeedPayload {
        label: Some(series.to_string()),
        source: url.to_string(),
        points: decode(&body),
    })
}

/// Pull `@TIME_PERIOD`/`@OBS_VALUE` observations out of an SDMX CompactData document.
///
/// `DataSet.Series` may be an object or an array (first element used);
/// `Obs` may be an array or, for a single observation, an object.
pub fn decode(body: &Value) -> Series {
    let series = match body.pointer("/CompactData/DataSet/Series") {
        Some(Value::Array(items)) => items.first(),
        other => other,
    };
    let obs: Vec<&Value> = match series.and_then(|s| s.get("Obs")) {
        Some(Value::Array(items)) => items.iter().collect(),
        Some(one @ Value::Object(_)) => vec![one],
        _ => Vec::new(),
    };

    let points = obs
        .into_iter()
        .filter_map(|o| {
            let date = o.get("@TIME_PERIOD")?.as_str()?;
            let value = o.get("@OBS_VALUE").and_then(json_number)?;
            Some(SeriesPoint::new(date, value))
        })
        .collect();
    shape::sort_by_date(shape::retain_valid(shape::to_monthly(points)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn url_has_series_key_and_start() -> Result<()> {
        let url = compact_data_url("EG", "PCPIF_IX", "2019-01")?;
        assert_eq!(
            url.as_str(),
            concat!(
                "https://dataservices.imf.org/REST/SDMX_JSON.svc/CompactData/CPI/",
                "M.EG.PCPIF_IX?startPeriod=2019-01"
            )
        );
        Ok(())
    }

    #[test]
    fn decodes_series_object_with_obs_array() {
        let body = json!({"CompactData": {"DataSet": {"Series": {
            "@FREQ": "M",
            "Obs": [
                {"@TIME_PERIOD": "2019-02", "@OBS_VALUE": "250.4"},
                {"@TIME_PERIOD": "2019-01", "@OBS_VALUE": "248.1"},
                {"@TIME_PERIOD": "2019-03", "@OBS_VALUE": "NaN"}
            ]
        }}}});
        assert_eq!(
            decode(&body),
            vec![SeriesPoint::new("2019-01", 248.1), SeriesPoint::new("2019-02", 250.4)]
        );
    }

    #[test]
    fn decodes_series_array_and_single_obs() {
        let body = json!({"CompactData": {"DataSet": {"Series": [
            {"Obs": {"@TIME_PERIOD": "2020-05", "@OBS_VALUE": 301}},
            {"Obs": [{"@TIME_PERIOD": "1999-01", "@OBS_VALUE": "1"}]}
        ]}}});
        assert_eq!(decode(&body), vec![SeriesPoint::new("2020-05", 301.0)]);
    }

    #[test]
    fn missing_dataset_is_empty() {
        assert!(decode(&json!({"CompactData": {"DataSet": {}}})).is_empty());
        assert!(decode(&json!({})).is_empty());
    }
}
