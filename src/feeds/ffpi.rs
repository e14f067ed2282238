// src/feeds/ffpi.rs

use anyhow::{anyhow, Result};
use tracing::debug;
use url::Url;

use super::FeedPayload;
use crate::fetch::{find_csv_link, Fetcher, ACCEPT_CSV, ACCEPT_HTML};
use crate::series::{csv_to_series, shape, Series};

pub const PAGE_URL: &str = "https://www.fao.org/worldfoodsituation/foodpricesindex/en/";

/// Scrape the FAO index page for its CSV link, then normalize that CSV.
pub async fn fetch(fetcher: &Fetcher) -> Result<FeedPayload> {
    let page = Url::parse(PAGE_URL)?;
    let html = fetcher.text(&page, ACCEPT_HTML).await?;
    let csv_url =
        find_csv_link(&html, &page).ok_or_else(|| anyhow!("FFPI CSV link not found on FAO page"))?;
    debug!(%csv_url, "resolved FFPI CSV");

    let text = fetcher.text(&csv_url, ACCEPT_CSV).await?;
    Ok(FeedPayload {
        label: None,
        source: csv_url.to_string(),
        points: decode(&text),
    })
}

pub fn decode(text: &str) -> Series {
    shape::to_monthly(csv_to_series(text, None))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_column_is_last_and_dates_are_months() {
        let text = "Date,Food Price Index,Meat,Dairy\n\
                    2024-02-01,117.3,112.0,118.7\n\
                    2024-01-01,118.0,110.1,119.1\n";
        let series = decode(text);
        let dates: Vec<&str> = series.iter().map(|p| p.date.as_str()).collect();
        assert_eq!(dates, vec!["2024-01", "2024-02"]);
        // no Value header: last column is used
        assert_eq!(series[0].value, 119.1);
    }
}
