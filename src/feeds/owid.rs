// src/feeds/owid.rs
//
// Our World in Data grapher CSV exports: `Entity,Code,Year,<value>`.

use anyhow::Result;
use url::Url;

use super::FeedPayload;
use crate::fetch::{Fetcher, ACCEPT_CSV};
use crate::series::{csv_to_series, shape, Series};

pub const WHEAT_URL: &str = "https://ourworldindata.org/grapher/wheat-prices.csv";
pub const DIET_COST_URL: &str = "https://ourworldindata.org/grapher/cost-healthy-diet.csv";
pub const REFUGEES_URL: &str =
    "https://ourworldindata.org/grapher/refugee-population-by-country-or-territory-of-asylum.csv";

const WHEAT_ENTITY: &str = "World";
const WHEAT_MONTHS: usize = 36;
pub const EGYPT: &str = "Egypt";

pub async fn fetch_wheat(fetcher: &Fetcher) -> Result<FeedPayload> {
    let url = Url::parse(WHEAT_URL)?;
    let text = fetcher.text(&url, ACCEPT_CSV).await?;
    Ok(FeedPayload {
        label: None,
        source: url.to_string(),
        points: decode_wheat(&text),
    })
}

pub async fn fetch_diet_cost(fetcher: &Fetcher) -> Result<FeedPayload> {
    let url = Url::parse(DIET_COST_URL)?;
    let text = fetcher.text(&url, ACCEPT_CSV).await?;
    Ok(FeedPayload {
        label: None,
        source: url.to_string(),
        points: csv_to_series(&text, Some(EGYPT)),
    })
}

/// World series, dates cut to months, most recent three years.
pub fn decode_wheat(text: &str) -> Series {
    let monthly = shape::to_monthly(csv_to_series(text, Some(WHEAT_ENTITY)));
    shape::take_last(shape::retain_valid(monthly), WHEAT_MONTHS)
}
