// src/config.rs

use anyhow::{Context, Result};
use std::{env, path::PathBuf, str::FromStr, time::Duration};

pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) humsignals/0.1";

/// Runtime settings, read from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub user_agent: String,
    pub timeout: Duration,
    pub max_retries: u32,
    pub backoff_ms: u64,
    /// Directory for JSON snapshots of cached payloads. Memory only when unset.
    pub cache_dir: Option<PathBuf>,
    /// Route every request through this proxy URL.
    pub proxy: Option<String>,
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: Duration::from_secs(30),
            max_retries: 3,
            backoff_ms: 500,
            cache_dir: None,
            proxy: None,
            log_level: "info".to_string(),
        }
    }
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; unset or blank keys keep their default.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut s = Self::default();

        if let Some(ua) = get("HUMSIGNALS_USER_AGENT") {
            s.user_agent = ua;
        }
        if let Some(secs) = get("HUMSIGNALS_TIMEOUT_SECS") {
            s.timeout = Duration::from_secs(parse_var("HUMSIGNALS_TIMEOUT_SECS", &secs)?);
        }
        if let Some(n) = get("HUMSIGNALS_MAX_RETRIES") {
            s.max_retries = parse_var("HUMSIGNALS_MAX_RETRIES", &n)?;
        }
        if let Some(ms) = get("HUMSIGNALS_BACKOFF_MS") {
            s.backoff_ms = parse_var("HUMSIGNALS_BACKOFF_MS", &ms)?;
        }
        s.cache_dir = get("HUMSIGNALS_CACHE_DIR").map(PathBuf::from);
        s.proxy = get("HUMSIGNALS_PROXY");
        if let Some(level) = get("LOG_LEVEL") {
            s.log_level = level;
        }
        Ok(s)
    }
}

fn parse_var<T>(key: &str, raw: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    raw.trim()
        .parse()
        .with_context(|| format!("invalid value {:?} for {}", raw, key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn defaults_when_nothing_set() -> Result<()> {
        let s = Settings::from_lookup(lookup(&[]))?;
        assert_eq!(s, Settings::default());
        Ok(())
    }

    #[test]
    fn reads_overrides() -> Result<()> {
        let s = Settings::from_lookup(lookup(&[
            ("HUMSIGNALS_TIMEOUT_SECS", "5"),
            ("HUMSIGNALS_MAX_RETRIES", " 0 "),
            ("HUMSIGNALS_BACKOFF_MS", "100"),
            ("HUMSIGNALS_CACHE_DIR", "/tmp/hs"),
            ("HUMSIGNALS_USER_AGENT", "humsignals-test/1.0"),
            ("HUMSIGNALS_PROXY", "http://127.0.0.1:3128"),
            ("LOG_LEVEL", "debug"),
        ]))?;
        assert_eq!(s.timeout, Duration::from_secs(5));
        assert_eq!(s.max_retries, 0);
        assert_eq!(s.backoff_ms, 100);
        assert_eq!(s.cache_dir, Some(PathBuf::from("/tmp/hs")));
        assert_eq!(s.user_agent, "humsignals-test/1.0");
        assert_eq!(s.proxy.as_deref(), Some("http://127.0.0.1:3128"));
        assert_eq!(s.log_level, "debug");
        Ok(())
    }

    #[test]
    fn blank_values_keep_defaults() -> Result<()> {
        let s = Settings::from_lookup(lookup(&[("HUMSIGNALS_CACHE_DIR", "  ")]))?;
        assert_eq!(s.cache_dir, None);
        Ok(())
    }

    #[test]
    fn bad_number_names_the_variable() {
        let err = Settings::from_lookup(lookup(&[("HUMSIGNALS_MAX_RETRIES", "many")]))
            .unwrap_err();
        assert!(err.to_string().contains("HUMSIGNALS_MAX_RETRIES"));
    }
}
