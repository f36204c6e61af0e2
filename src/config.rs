// config.rs
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::domain::ward::PREFECTURE_CODE_SAITAMA;
use crate::domain::Prefecture;
use crate::errors::ConfigError;

/// Run configuration, loaded from the environment (and `.env` if present).
#[derive(Debug, Clone)]
pub struct Config {
    pub google_api_key: String,
    pub prefecture: Prefecture,
    pub data_dir: PathBuf,
    /// Per-ward cap on listing-index pages.
    pub max_pages: usize,
    pub max_in_flight: usize,
    pub request_delay: Duration,
    pub ward_workers: usize,
    /// Whole-run deadline.
    pub deadline: Option<Duration>,
    pub geocode_region: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let google_api_key = lookup("GOOGLE_MAPS_API_KEY")
            .filter(|key| !key.is_empty())
            .ok_or(ConfigError::Missing("GOOGLE_MAPS_API_KEY"))?;

        let prefecture_code =
            lookup("SUUMO_PREFECTURE").unwrap_or_else(|| PREFECTURE_CODE_SAITAMA.to_string());

        Ok(Self {
            google_api_key,
            prefecture: Prefecture::from_code(&prefecture_code)?,
            data_dir: lookup("DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("data")),
            max_pages: parse_or(&lookup, "SCRAPE_MAX_PAGES", 500)?,
            max_in_flight: parse_or(&lookup, "SCRAPE_MAX_IN_FLIGHT", 5)?,
            request_delay: Duration::from_millis(parse_or(&lookup, "SCRAPE_DELAY_MS", 50)?),
            ward_workers: parse_or(&lookup, "SCRAPE_WARD_WORKERS", 4)?,
            deadline: parse_opt::<u64, _>(&lookup, "SCRAPE_DEADLINE_SECS")?
                .map(Duration::from_secs),
            geocode_region: lookup("GEOCODE_REGION").unwrap_or_else(|| "jp".to_string()),
        })
    }

    pub fn listings_dir(&self) -> PathBuf {
        self.data_dir.join("listings")
    }

    pub fn geocode_dir(&self) -> PathBuf {
        self.data_dir.join("geocode")
    }
}

fn parse_opt<T, F>(lookup: &F, name: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        None => Ok(None),
        Some(value) => match value.trim().parse() {
            Ok(parsed) => Ok(Some(parsed)),
            Err(_) => Err(ConfigError::Invalid { name, value }),
        },
    }
}

fn parse_or<T, F>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    Ok(parse_opt(lookup, name)?.unwrap_or(default))
}
