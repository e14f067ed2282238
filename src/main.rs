// src/main.rs

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use humsignals::{
    cache::SeriesCache,
    config::Settings,
    feeds::{fx, imf, Feed},
    fetch::Fetcher,
    health,
    series::{normalize_csv, ColumnMapping},
};
use serde::Serialize;
use std::{fs, path::PathBuf};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

/// Fetch and normalize humanitarian and economic time series.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch one feed and print its payload as JSON
    Fetch {
        #[arg(value_enum)]
        feed: FeedKind,
        /// IMF country code
        #[arg(long, default_value = imf::DEFAULT_COUNTRY)]
        country: String,
        /// IMF series code
        #[arg(long, default_value = imf::DEFAULT_SERIES)]
        series: String,
        /// IMF start period (YYYY-MM)
        #[arg(long, default_value = imf::DEFAULT_START)]
        start: String,
        /// FX base currency
        #[arg(long, default_value = fx::DEFAULT_BASE)]
        base: String,
        /// FX quote currency
        #[arg(long, default_value = fx::DEFAULT_SYM)]
        sym: String,
        /// Skip the cache and always hit upstream
        #[arg(long)]
        no_cache: bool,
    },
    /// Normalize a local CSV file and print the series with drop counts
    Parse {
        file: PathBuf,
        /// Keep only rows whose Entity column equals this
        #[arg(long)]
        entity: Option<String>,
    },
    /// Probe the upstream sources and print a status report
    Health,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum FeedKind {
    Wheat,
    Ffpi,
    ImfCpi,
    UnhcrEgy,
    DietCost,
    Fx,
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::from_env()?;

    // ─── logging to stderr; stdout carries JSON ───
    let env = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{},humsignals=info", settings.log_level)));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    match args.command {
        Command::Fetch {
            feed,
            country,
            series,
            start,
            base,
            sym,
            no_cache,
        } => {
            let feed = match feed {
                FeedKind::Wheat => Feed::Wheat,
                FeedKind::Ffpi => Feed::Ffpi,
                FeedKind::ImfCpi => Feed::imf_cpi(&country, &series, &start)?,
                FeedKind::UnhcrEgy => Feed::Refugees,
                FeedKind::DietCost => Feed::DietCost,
                FeedKind::Fx => Feed::fx(&base, &sym)?,
            };
            let fetcher = Fetcher::new(&settings)?;
            let payload = if no_cache {
                feed.fetch(&fetcher).await?
            } else {
                let cache = SeriesCache::new(settings.cache_dir.clone())?;
                cache.get_or_fetch(&feed, &fetcher).await?
            };
            print_json(&payload)
        }
        Command::Parse { file, entity } => {
            let text = fs::read_to_string(&file)
                .with_context(|| format!("reading {}", file.display()))?;
            let extraction = normalize_csv(&text, entity.as_deref(), &ColumnMapping::default());
            info!(
                file = %file.display(),
                points = extraction.series.len(),
                malformed_rows = extraction.malformed_rows,
                "parsed"
            );
            print_json(&extraction)
        }
        Command::Health => {
            let fetcher = Fetcher::new(&settings)?;
            let report = health::check(&fetcher, &health::default_probes()).await;
            print_json(&report)?;
            if !report.ok {
                bail!("one or more feeds failed");
            }
            Ok(())
        }
    }
}
