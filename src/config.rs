use crate::error::AppError;
use chrono::Duration;
use std::env;

const DEFAULT_MATCH_LIMIT: usize = 40;
const MAX_MATCH_LIMIT: usize = 100;
const DEFAULT_LOOKBACK_DAYS: i64 = 180;
const DEFAULT_FRESHNESS_DAYS: i64 = 30;

/// Knobs for the analysis tables.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoutSettings {
    /// Games older than this are not counted.
    pub lookback: Duration,
    /// Champions not played within this window lose their highlight.
    pub freshness: Duration,
    pub top_champions: usize,
    pub ban_rows: usize,
}

impl Default for ScoutSettings {
    fn default() -> Self {
        ScoutSettings {
            lookback: Duration::days(DEFAULT_LOOKBACK_DAYS),
            freshness: Duration::days(DEFAULT_FRESHNESS_DAYS),
            top_champions: 10,
            ban_rows: 15,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: String,
    pub region: String,
    /// Match details fetched per player.
    pub match_limit: usize,
    pub settings: ScoutSettings,
}

fn env_number<T: std::str::FromStr>(name: &str, default: T) -> Result<T, AppError> {
    match env::var(name) {
        Ok(raw) => raw.trim().parse().map_err(|_| {
            AppError::ConfigError(format!("{} must be a number, got '{}'", name, raw))
        }),
        Err(_) => Ok(default),
    }
}

/// A positive number of days that `chrono` can represent.
fn days_setting(name: &str, days: i64) -> Result<Duration, AppError> {
    if days <= 0 {
        return Err(AppError::ConfigError(format!(
            "{} must be a positive number of days, got {}",
            name, days
        )));
    }
    Duration::try_days(days)
        .ok_or_else(|| AppError::ConfigError(format!("{} is too large: {} days", name, days)))
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let api_key = env::var("RIOT_API_KEY").map_err(|_| {
            AppError::ConfigError("RIOT_API_KEY not found in .env file".to_string())
        })?;

        let region = env::var("RIOT_REGION").unwrap_or_else(|_| "na1".to_string());

        let match_limit =
            env_number("SCOUT_MATCH_LIMIT", DEFAULT_MATCH_LIMIT)?.min(MAX_MATCH_LIMIT);
        let lookback = days_setting(
            "SCOUT_LOOKBACK_DAYS",
            env_number("SCOUT_LOOKBACK_DAYS", DEFAULT_LOOKBACK_DAYS)?,
        )?;
        let freshness = days_setting(
            "SCOUT_FRESHNESS_DAYS",
            env_number("SCOUT_FRESHNESS_DAYS", DEFAULT_FRESHNESS_DAYS)?,
        )?;

        Ok(Config {
            api_key,
            region,
            match_limit,
            settings: ScoutSettings {
                lookback,
                freshness,
                ..ScoutSettings::default()
            },
        })
    }
}
