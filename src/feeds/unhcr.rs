// src/feeds/unhcr.rs

use anyhow::{anyhow, Result};
use serde_json::Value;
use tracing::warn;
use url::Url;

use super::owid::{EGYPT, REFUGEES_URL};
use super::{first_present, json_number, FeedPayload};
use crate::fetch::{Fetcher, ACCEPT_CSV};
use crate::series::{csv_to_series, shape, Series, SeriesPoint};

pub const SUMMARY_URL: &str =
    "https://api.unhcr.org/population/v1/summary?dataset=pop&year=all&coa=EGY";

/// UNHCR population API first; the OWID mirror when that fails.
pub async fn fetch(fetcher: &Fetcher) -> Result<FeedPayload> {
    let primary = Url::parse(SUMMARY_URL)?;
    let unhcr_err = match fetcher.json::<Value>(&primary).await {
        Ok(body) => {
            return Ok(FeedPayload {
                label: None,
                source: primary.to_string(),
                points: decode(&body),
            })
        }
        Err(e) => e,
    };
    warn!(error = %unhcr_err, "UNHCR API failed; trying OWID mirror");

    let mirror = Url::parse(REFUGEES_URL)?;
    match fetcher.text(&mirror, ACCEPT_CSV).await {
        Ok(text) => Ok(FeedPayload {
            label: None,
            source: mirror.to_string(),
            points: csv_to_series(&text, Some(EGYPT)),
        }),
        Err(owid_err) => Err(anyhow!("UNHCR: {:#}; OWID: {:#}", unhcr_err, owid_err)),
    }
}

/// Rows live under `data` (or `results`); each has a year and a head count
/// under one of several spellings.
pub fn decode(body: &Value) -> Series {
    let rows = first_present(body, &["data", "results"])
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();

    let points = rows
        .iter()
        .filter_map(|row| {
            let year = first_present(row, &["year", "Year"]).and_then(json_number)?;
            let count =
                first_present(row, &["value", "Value", "population"]).and_then(json_number)?;
            if year == 0.0 || !year.is_finite() {
                return None;
            }
            Some(SeriesPoint::new(year.to_string(), count))
        })
        .collect();
    shape::sort_by_date(shape::retain_valid(points))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_data_rows_by_year() {
        let body = json!({"page": 1, "data": [
            {"year": 2022, "value": 295000},
            {"year": 2020, "population": "259000"},
            {"Year": "2021", "Value": 281000}
        ]});
        assert_eq!(
            decode(&body),
            vec![
                SeriesPoint::new("2020", 259000.0),
                SeriesPoint::new("2021", 281000.0),
                SeriesPoint::new("2022", 295000.0)
            ]
        );
    }

    #[test]
    fn reads_results_key_and_drops_bad_rows() {
        let body = json!({"results": [
            {"year": 0, "value": 1},
            {"year": 2019, "value": "n/a"},
            {"value": 5},
            {"year": 2018, "value": 245000}
        ]});
        assert_eq!(decode(&body), vec![SeriesPoint::new("2018", 245000.0)]);
    }

    #[test]
    fn no_rows_is_empty() {
        assert!(decode(&json!({"items": []})).is_empty());
    }

    #[test]
    fn owid_mirror_filters_egypt_with_last_column() {
        let text = "Entity,Code,Year,Refugees by country of asylum\n\
                    Egypt,EGY,2021,281000\n\
                    Jordan,JOR,2021,712000\n\
                    Egypt,EGY,2020,259000\n";
        assert_eq!(
            csv_to_series(text, Some(EGYPT)),
            vec![SeriesPoint::new("2020", 259000.0), SeriesPoint::new("2021", 281000.0)]
        );
    }

    #[tokio::test]
    async fn both_sources_failing_names_each() -> anyhow::Result<()> {
        let fetcher = crate::fetch::unreachable_fetcher()?;
        let msg = format!("{:#}", fetch(&fetcher).await.unwrap_err());
        assert!(msg.starts_with("UNHCR: "), "{}", msg);
        assert!(msg.contains("api.unhcr.org"), "{}", msg);
        assert!(msg.contains("; OWID: "), "{}", msg);
        assert!(msg.contains("ourworldindata.org"), "{}", msg);
        Ok(())
    }
}
