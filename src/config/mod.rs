use std::str::FromStr;
use std::time::Duration;

use crate::errors::{AggregatorError, AggregatorResult};

pub const DEFAULT_INTERVAL_SECS: u64 = 60;
pub const DEFAULT_CONCURRENCY: usize = 10;

#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: String,
    /// Time between the starts of two scheduler ticks.
    pub interval: Duration,
    /// Feeds fetched per tick, which is also the cap on concurrent fetches.
    pub concurrency: usize,
    pub log_level: String,
}

impl Config {
    /// Get the directory where the executable is located
    fn exe_dir() -> Option<std::path::PathBuf> {
        std::env::current_exe()
            .ok()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
    }

    pub fn from_env() -> AggregatorResult<Self> {
        let exe_dir = Self::exe_dir();

        // Try to load .env from executable's directory first
        if let Some(ref dir) = exe_dir {
            let env_path = dir.join(".env");
            if env_path.exists() {
                dotenvy::from_path(&env_path).ok();
            }
        }
        // Fall back to current directory
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| std::env::var(key).ok(), exe_dir)
    }

    fn from_lookup<L>(lookup: L, exe_dir: Option<std::path::PathBuf>) -> AggregatorResult<Self>
    where
        L: Fn(&str) -> Option<String>,
    {
        // Default db_path is relative to executable directory
        let db_path = lookup("AGGREGATOR_DB_PATH").unwrap_or_else(|| {
            exe_dir
                .map(|d| d.join("aggregator.db").to_string_lossy().into_owned())
                .unwrap_or_else(|| "./aggregator.db".to_string())
        });

        let interval_secs: u64 =
            parse_positive(&lookup, "SCRAPE_INTERVAL_SECS", DEFAULT_INTERVAL_SECS)?;
        let concurrency: usize = parse_positive(&lookup, "SCRAPE_CONCURRENCY", DEFAULT_CONCURRENCY)?;

        let log_level = lookup("LOG_LEVEL").unwrap_or_else(|| "info".to_string());

        Ok(Self {
            db_path,
            interval: Duration::from_secs(interval_secs),
            concurrency,
            log_level,
        })
    }
}

fn parse_positive<L, T>(lookup: &L, key: &str, default: T) -> AggregatorResult<T>
where
    L: Fn(&str) -> Option<String>,
    T: FromStr + PartialOrd + Default,
{
    let Some(raw) = lookup(key) else {
        return Ok(default);
    };

    match raw.trim().parse::<T>() {
        Ok(value) if value > T::default() => Ok(value),
        _ => Err(AggregatorError::Config(format!(
            "{} must be a positive integer, got {:?}",
            key, raw
        ))),
    }
}
