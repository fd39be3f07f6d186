use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};

use crate::errors::{Result, ScoutError};
use crate::flex::{deserialize_flex_f64, deserialize_flex_u32, FlexValue};
use crate::game::Game;
use crate::scoring::ThreatLevel;

/// Templated or empty player names the model sometimes emits
static PLACEHOLDER_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(player|sample|team)_\w*|^\s*(tbd|unknown|n/?a)?\s*$")
        .expect("placeholder pattern is valid")
});

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlayerProfile {
    pub name: String,
    pub role: String,
    #[serde(default)]
    pub most_played: Vec<String>,
    /// Performance ratio (KDA)
    #[serde(default, deserialize_with = "deserialize_flex_f64")]
    pub kda: f64,
    #[serde(default)]
    pub tendency: String,
    /// Percentage
    #[serde(default, deserialize_with = "deserialize_flex_u32")]
    pub win_rate: u32,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Composition {
    pub agents: Vec<String>,
    pub play_style: String,
    #[serde(default, deserialize_with = "deserialize_flex_u32")]
    pub win_rate: u32,
    #[serde(default, deserialize_with = "deserialize_flex_u32")]
    pub occurrence: u32,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OverallStrategy {
    pub macro_patterns: String,
    pub objective_priority: String,
    /// Always replaced by `scoring::aggression`
    #[serde(default, deserialize_with = "deserialize_overwritten_score")]
    pub early_game_aggression: u8,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TacticalInsights {
    #[serde(default)]
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub how_to_win: String,
    #[serde(default)]
    pub counter_picks: Vec<String>,
    #[serde(default)]
    pub win_condition: Option<String>,
    /// Always replaced by `scoring::confidence`
    #[serde(default, deserialize_with = "deserialize_overwritten_score")]
    pub confidence_score: u8,
    /// Always replaced by `scoring::threat_level`
    #[serde(default, deserialize_with = "deserialize_overwritten_threat")]
    pub threat_level: ThreatLevel,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Source {
    pub uri: String,
    pub title: String,
}

/// Structured analysis of one team, as returned by the model and then
/// corrected by the deterministic scores.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScoutingReport {
    pub team_name: String,
    pub game: Game,
    #[serde(default, deserialize_with = "deserialize_flex_u32")]
    pub last_matches: u32,
    pub overall_strategy: OverallStrategy,
    #[serde(default)]
    pub player_profiles: Vec<PlayerProfile>,
    #[serde(default)]
    pub top_compositions: Vec<Composition>,
    pub tactical_insights: TacticalInsights,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<Source>,
}

// The model's own guesses for the overwritten fields are discarded, so any
// JSON value is accepted there; only strings and numbers are read.
fn overwritten_value<'de, D>(deserializer: D) -> Result<FlexValue, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Number(n) => n.as_f64().map(FlexValue::Number).unwrap_or_default(),
        serde_json::Value::String(s) => FlexValue::Text(s),
        _ => FlexValue::Null,
    })
}

fn deserialize_overwritten_score<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let flex = overwritten_value(deserializer)?;
    Ok(flex.as_f64().map(|v| v.clamp(0.0, 100.0).round() as u8).unwrap_or(0))
}

fn deserialize_overwritten_threat<'de, D>(deserializer: D) -> Result<ThreatLevel, D::Error>
where
    D: Deserializer<'de>,
{
    let flex = overwritten_value(deserializer)?;
    let level = match flex.to_string_value().map(|s| s.trim().to_uppercase()) {
        Some(s) if s == "CRITICAL" => ThreatLevel::Critical,
        Some(s) if s == "ELEVATED" => ThreatLevel::Elevated,
        Some(s) if s == "LOW" => ThreatLevel::Low,
        _ => ThreatLevel::Moderate,
    };
    Ok(level)
}

pub fn is_placeholder_name(name: &str) -> bool {
    PLACEHOLDER_NAME.is_match(name)
}

impl ScoutingReport {
    /// Parse and validate a completion body. Nothing partial is returned.
    pub fn from_completion(content: &str) -> Result<Self> {
        let report: ScoutingReport = serde_json::from_str(content.trim())
            .map_err(|e| ScoutError::Parse(format!("report JSON did not match the expected shape: {}", e)))?;
        report.validate()?;
        Ok(report)
    }

    pub fn validate(&self) -> Result<()> {
        let weaknesses: Vec<&String> = self
            .tactical_insights
            .weaknesses
            .iter()
            .filter(|w| !w.trim().is_empty())
            .collect();
        if weaknesses.is_empty() {
            return Err(ScoutError::Parse("report lists no weaknesses".into()));
        }
        if weaknesses
            .iter()
            .any(|w| w.to_lowercase().contains("no weakness"))
        {
            return Err(ScoutError::Parse(
                "report claims no weakness was identified".into(),
            ));
        }

        if let Some(p) = self
            .player_profiles
            .iter()
            .find(|p| is_placeholder_name(&p.name))
        {
            return Err(ScoutError::Parse(format!(
                "report contains placeholder player name '{}'",
                p.name
            )));
        }
        Ok(())
    }

    /// First player whose role is one of the game's carry roles
    pub fn primary_player(&self) -> Option<&PlayerProfile> {
        self.player_profiles
            .iter()
            .find(|p| self.game.is_carry_role(&p.role))
    }
}
