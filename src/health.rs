// src/health.rs

use anyhow::Result;
use futures::future::join_all;
use serde::Serialize;
use tracing::{info, warn};

use crate::feeds::{imf, Feed, FeedPayload};
use crate::fetch::Fetcher;

const MAX_ERROR_CHARS: usize = 300;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProbeResult {
    pub feed: String,
    pub ok: bool,
    pub points: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthReport {
    pub ok: bool,
    pub results: Vec<ProbeResult>,
}

/// Feeds probed by a health check.
pub fn default_probes() -> Vec<Feed> {
    vec![
        Feed::Ffpi,
        Feed::ImfCpi {
            country: imf::DEFAULT_COUNTRY.to_string(),
            series: imf::DEFAULT_SERIES.to_string(),
            start: imf::DEFAULT_START.to_string(),
        },
        Feed::Refugees,
    ]
}

/// Fetch every feed concurrently, bypassing the cache.
pub async fn check(fetcher: &Fetcher, feeds: &[Feed]) -> HealthReport {
    let outcomes = join_all(feeds.iter().map(|f| f.fetch(fetcher))).await;
    let results: Vec<ProbeResult> = feeds
        .iter()
        .zip(outcomes)
        .map(|(feed, outcome)| summarize(feed, outcome))
        .collect();
    let report = HealthReport {
        ok: results.iter().all(|r| r.ok),
        results,
    };
    info!(ok = report.ok, probes = report.results.len(), "health check done");
    report
}

fn summarize(feed: &Feed, outcome: Result<FeedPayload>) -> ProbeResult {
    match outcome {
        Ok(payload) => ProbeResult {
            feed: feed.to_string(),
            ok: true,
            points: payload.points.len(),
            error: None,
        },
        Err(e) => {
            warn!(%feed, error = %e, "probe failed");
            ProbeResult {
                feed: feed.to_string(),
                ok: false,
                points: 0,
                error: Some(trim_message(&format!("{:#}", e))),
            }
        }
    }
}

/// Cap at 300 characters, marking the cut with `…`.
fn trim_message(s: &str) -> String {
    match s.char_indices().nth(MAX_ERROR_CHARS) {
        Some((idx, _)) => format!("{}…", &s[..idx]),
        None => s.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::SeriesPoint;
    use anyhow::anyhow;

    #[test]
    fn short_messages_are_untouched() {
        assert_eq!(trim_message("timeout"), "timeout");
        let exact = "x".repeat(300);
        assert_eq!(trim_message(&exact), exact);
    }

    #[test]
    fn long_messages_are_cut_on_chars() {
        let long = "é".repeat(301);
        let trimmed = trim_message(&long);
        assert_eq!(trimmed.chars().count(), 301);
        assert!(trimmed.ends_with('…'));
    }

    #[test]
    fn summarize_success_and_failure() {
        let ok = summarize(
            &Feed::Ffpi,
            Ok(FeedPayload {
                label: None,
                source: "https://example.org/ffpi.csv".into(),
                points: vec![SeriesPoint::new("2024-01", 118.0)],
            }),
        );
        assert_eq!(
            ok,
            ProbeResult {
                feed: "ffpi".into(),
                ok: true,
                points: 1,
                error: None
            }
        );

        let failed = summarize(
            &Feed::Refugees,
            Err(anyhow!("connection refused").context("GET https://api.unhcr.org failed")),
        );
        assert!(!failed.ok);
        assert_eq!(failed.feed, "unhcr-egy");
        assert_eq!(
            failed.error.as_deref(),
            Some("GET https://api.unhcr.org failed: connection refused")
        );
    }

    #[test]
    fn default_probes_cover_three_feeds() {
        let names: Vec<&str> = default_probes().iter().map(Feed::name).collect();
        assert_eq!(names, vec!["ffpi", "imf-cpi", "unhcr-egy"]);
    }

    #[tokio::test]
    async fn empty_feed_set_is_healthy() -> Result<()> {
        let fetcher = Fetcher::new(&crate::config::Settings::default())?;
        let report = check(&fetcher, &[]).await;
        assert!(report.ok);
        assert!(report.results.is_empty());
        Ok(())
    }
}
