// src/fetch/mod.rs

use anyhow::{Context, Result};
use reqwest::{header::ACCEPT, Client, Proxy};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error, warn};
use url::Url;

use crate::config::Settings;

pub mod links;

pub use links::find_csv_link;

pub const ACCEPT_CSV: &str = "text/csv";
pub const ACCEPT_JSON: &str = "application/json";
pub const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

/// Retry policy: up to `max_retries` extra attempts, doubling the delay each time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Retry {
    pub max_retries: u32,
    pub backoff_ms: u64,
}

impl Retry {
    /// Delay before retry number `attempt` (1-based).
    pub fn delay(&self, attempt: u32) -> Duration {
        let factor = 2u64.saturating_pow(attempt.saturating_sub(1));
        Duration::from_millis(self.backoff_ms.saturating_mul(factor))
    }
}

/// Shared HTTP client plus the retry policy every feed uses.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    retry: Retry,
}

impl Fetcher {
    pub fn new(settings: &Settings) -> Result<Self> {
        let mut builder = Client::builder()
            .user_agent(settings.user_agent.as_str())
            .timeout(settings.timeout)
            .gzip(true);
        if let Some(proxy) = &settings.proxy {
            let proxy = Proxy::all(proxy.as_str())
                .with_context(|| format!("invalid proxy URL {:?}", proxy))?;
            builder = builder.proxy(proxy);
        }
        let client = builder.build().context("building HTTP client")?;
        Ok(Self {
            client,
            retry: Retry {
                max_retries: settings.max_retries,
                backoff_ms: settings.backoff_ms,
            },
        })
    }

    /// GET `url` as text, retrying failures with backoff.
    pub async fn text(&self, url: &Url, accept: &str) -> Result<String> {
        let mut attempts = 0;
        loop {
            match get_text_core(&self.client, url, accept).await {
                Ok(t) => return Ok(t),
                Err(e) if attempts < self.retry.max_retries => {
                    attempts += 1;
                    let delay = self.retry.delay(attempts);
                    warn!(
                        %url,
                        attempt = attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Retrying"
                    );
                    sleep(delay).await;
                }
                Err(e) => {
                    error!(%url, error = %e, "Exhausted retries");
                    return Err(e);
                }
            }
        }
    }

    /// GET `url` and decode the body as JSON.
    pub async fn json<T: DeserializeOwned>(&self, url: &Url) -> Result<T> {
        let body = self.text(url, ACCEPT_JSON).await?;
        serde_json::from_str(&body).with_context(|| format!("decoding JSON from {}", url))
    }
}

/// Fetcher whose every request goes to a closed loopback port, without retries.
#[cfg(test)]
pub(crate) fn unreachable_fetcher() -> Result<Fetcher> {
    Fetcher::new(&Settings {
        max_retries: 0,
        timeout: Duration::from_secs(2),
        // port 9 (discard) on loopback; nothing listens there in a test sandbox
        proxy: Some("http://127.0.0.1:9".to_string()),
        ..Settings::default()
    })
}

async fn get_text_core(client: &Client, url: &Url, accept: &str) -> Result<String> {
    debug!("Fetching text from {}", url);
    client
        .get(url.clone())
        .header(ACCEPT, accept)
        .send()
        .await
        .with_context(|| format!("GET {} failed", url))?
        .error_for_status()
        .with_context(|| format!("Non-success status {}", url))?
        .text()
        .await
        .with_context(|| format!("Reading text from {}", url))
}
