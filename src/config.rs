use serde::{Deserialize, Serialize};
use std::fmt;
use zeroize::Zeroizing;

use crate::errors::{Result, ScoutError};

pub const GRID_API_URL: &str = "https://api-op.grid.gg/central-data/graphql";
pub const GROQ_API_URL: &str = "https://api.groq.com/openai/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "openai/gpt-oss-120b";

/// How far back the series query reaches
pub const LOOKBACK_MONTHS: u32 = 6;
pub const SERIES_PAGE_SIZE: u32 = 50;
pub const PLAYER_PAGE_SIZE: u32 = 50;
pub const TEAM_PAGE_SIZE: u32 = 50;
pub const ROSTER_LIMIT: usize = 5;
pub const RECENT_MATCH_LIMIT: usize = 10;
pub const MATCH_LIMIT_DEFAULT: u32 = 10;

/// Stands in for the roster when GRID has no players for the team
pub const ROSTER_SENTINEL: &str = "Player data not available";

/// Aggression reported when no snapshot exists
pub const NEUTRAL_AGGRESSION: u8 = 50;
pub const AGGRESSION_CAP: f64 = 99.0;

/// Fixed confidence for the sample sizes the UI offers, largest first
pub const CONFIDENCE_TABLE: [(u32, u8); 3] = [(10, 96), (5, 82), (3, 65)];
/// Confidence per ten matches for sample sizes below the table
pub const CONFIDENCE_PER_TEN_MATCHES: f64 = 90.0;
pub const CONFIDENCE_CAP: f64 = 98.0;

/// Keys shorter than this are treated as unset
const MIN_KEY_LEN: usize = 10;

/// Cutoffs and coefficients for the deterministic scores
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub win_rate_critical: f64,
    pub win_rate_elevated: f64,
    pub win_rate_moderate: f64,
    pub aggression_base: f64,
    pub aggression_multiplier: f64,
}

impl Thresholds {
    pub const REFERENCE: Thresholds = Thresholds {
        win_rate_critical: 0.75,
        win_rate_elevated: 0.60,
        win_rate_moderate: 0.40,
        aggression_base: 30.0,
        aggression_multiplier: 65.0,
    };
}

impl Default for Thresholds {
    fn default() -> Self {
        Self::REFERENCE
    }
}

#[derive(Clone)]
pub struct ScoutConfig {
    pub grid_api_key: Zeroizing<String>,
    pub groq_api_key: Zeroizing<String>,
    pub grid_url: String,
    pub groq_url: String,
    pub model: String,
    pub lookback_months: u32,
    pub series_page_size: u32,
    pub player_page_size: u32,
    pub team_page_size: u32,
    pub thresholds: Thresholds,
}

impl fmt::Debug for ScoutConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScoutConfig")
            .field("grid_api_key", &"<redacted>")
            .field("groq_api_key", &"<redacted>")
            .field("grid_url", &self.grid_url)
            .field("groq_url", &self.groq_url)
            .field("model", &self.model)
            .field("lookback_months", &self.lookback_months)
            .field("thresholds", &self.thresholds)
            .finish()
    }
}

impl ScoutConfig {
    /// Build a config with the reference constants and the given keys
    pub fn new(grid_api_key: impl Into<String>, groq_api_key: impl Into<String>) -> Self {
        Self {
            grid_api_key: Zeroizing::new(grid_api_key.into()),
            groq_api_key: Zeroizing::new(groq_api_key.into()),
            grid_url: GRID_API_URL.to_string(),
            groq_url: GROQ_API_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            lookback_months: LOOKBACK_MONTHS,
            series_page_size: SERIES_PAGE_SIZE,
            player_page_size: PLAYER_PAGE_SIZE,
            team_page_size: TEAM_PAGE_SIZE,
            thresholds: Thresholds::REFERENCE,
        }
    }

    /// Load from `.env` (if present) and the process environment
    pub fn from_env() -> Result<Self> {
        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                tracing::warn!(error = %e, "ignoring unreadable .env file");
            }
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let grid_api_key = required_key(&lookup, &["GRID_API_KEY", "VITE_GRID_API_KEY"])?;
        let groq_api_key = required_key(&lookup, &["GROQ_API_KEY", "VITE_GROQ_API_KEY"])?;

        let mut config = Self::new(grid_api_key, groq_api_key);

        if let Some(url) = non_empty(&lookup, "GRID_API_URL") {
            config.grid_url = url;
        }
        if let Some(url) = non_empty(&lookup, "GROQ_API_URL") {
            config.groq_url = url;
        }
        if let Some(model) = non_empty(&lookup, "GROQ_MODEL") {
            config.model = model;
        }
        if let Some(raw) = non_empty(&lookup, "SCOUT_LOOKBACK_MONTHS") {
            config.lookback_months = raw.parse().map_err(|_| {
                ScoutError::Configuration(format!(
                    "SCOUT_LOOKBACK_MONTHS must be a whole number of months, got '{}'",
                    raw
                ))
            })?;
        }

        Ok(config)
    }
}

fn non_empty<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn required_key<F>(lookup: &F, names: &[&str]) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    let value = names.iter().find_map(|name| non_empty(lookup, name));
    match value {
        Some(v) if v.len() >= MIN_KEY_LEN => Ok(v),
        Some(_) => Err(ScoutError::Configuration(format!(
            "{} is malformed (too short)",
            names[0]
        ))),
        None => Err(ScoutError::Configuration(format!(
            "{} is missing. Please configure it in your environment.",
            names[0]
        ))),
    }
}
