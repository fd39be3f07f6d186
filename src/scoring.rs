//! Deterministic scores. These replace whatever the model guessed for
//! aggression, confidence and threat level, so they must stay pure.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::aggregator::StatSnapshot;
use crate::config::{
    Thresholds, AGGRESSION_CAP, CONFIDENCE_CAP, CONFIDENCE_PER_TEN_MATCHES, CONFIDENCE_TABLE,
    NEUTRAL_AGGRESSION,
};
use crate::report::ScoutingReport;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum ThreatLevel {
    Critical,
    Elevated,
    #[default]
    Moderate,
    Low,
}

impl ThreatLevel {
    pub fn label(&self) -> &'static str {
        match self {
            ThreatLevel::Critical => "CRITICAL",
            ThreatLevel::Elevated => "ELEVATED",
            ThreatLevel::Moderate => "MODERATE",
            ThreatLevel::Low => "LOW",
        }
    }

    /// Contribution to the head-to-head comparison score
    pub fn comparison_adjustment(&self) -> f64 {
        match self {
            ThreatLevel::Critical => 5.0,
            ThreatLevel::Elevated => 2.0,
            ThreatLevel::Moderate => -2.0,
            ThreatLevel::Low => -5.0,
        }
    }
}

impl fmt::Display for ThreatLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Tempo score in [0, 99]. Win rate stands in for pace since GRID's series
/// data has no round timing; 50 when there is no snapshot.
pub fn aggression(snapshot: Option<&StatSnapshot>, thresholds: &Thresholds) -> u8 {
    let Some(snapshot) = snapshot else {
        return NEUTRAL_AGGRESSION;
    };
    let raw = thresholds.aggression_base + snapshot.win_rate * thresholds.aggression_multiplier;
    raw.round().clamp(0.0, AGGRESSION_CAP) as u8
}

pub fn threat_level(snapshot: Option<&StatSnapshot>, thresholds: &Thresholds) -> ThreatLevel {
    let Some(snapshot) = snapshot else {
        return ThreatLevel::Moderate;
    };
    threat_for_win_rate(snapshot.win_rate, thresholds)
}

pub fn threat_for_win_rate(win_rate: f64, thresholds: &Thresholds) -> ThreatLevel {
    if win_rate >= thresholds.win_rate_critical {
        ThreatLevel::Critical
    } else if win_rate >= thresholds.win_rate_elevated {
        ThreatLevel::Elevated
    } else if win_rate >= thresholds.win_rate_moderate {
        ThreatLevel::Moderate
    } else {
        ThreatLevel::Low
    }
}

/// Confidence in [0, 98] from the number of matches analyzed.
/// The three sample sizes offered in the UI map to fixed values.
pub fn confidence(sample_size: u32) -> u8 {
    CONFIDENCE_TABLE
        .iter()
        .find(|(min, _)| sample_size >= *min)
        .map(|(_, value)| *value)
        .unwrap_or_else(|| {
            ((sample_size as f64 / 10.0) * CONFIDENCE_PER_TEN_MATCHES)
                .round()
                .min(CONFIDENCE_CAP) as u8
        })
}

/// Scalar used only to rank two sides of the same comparison
pub fn comparison_score(report: &ScoutingReport, snapshot: Option<&StatSnapshot>) -> f64 {
    let win_rate = snapshot.map(|s| s.win_rate).unwrap_or(0.5);
    let aggression = report.overall_strategy.early_game_aggression as f64;
    let insights = &report.tactical_insights;

    50.0 + win_rate * 25.0
        + (insights.confidence_score as f64 / 100.0) * 15.0
        + (50.0 - (aggression - 50.0).abs()) / 5.0
        + insights.threat_level.comparison_adjustment()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::Game;
    use std::collections::BTreeMap;

    fn snapshot(win_rate: f64) -> StatSnapshot {
        StatSnapshot {
            team_name: "Sentinels".into(),
            team_id: Some("97".into()),
            game: Game::Valorant,
            matches_analyzed: 10,
            win_rate,
            map_win_rates: BTreeMap::new(),
            roster: vec!["TenZ".into()],
            recent_matches: vec![],
        }
    }

    #[test]
    fn test_aggression_bounds() {
        let t = Thresholds::REFERENCE;
        assert_eq!(aggression(None, &t), 50);
        assert_eq!(aggression(Some(&snapshot(0.0)), &t), 30);
        assert_eq!(aggression(Some(&snapshot(0.6)), &t), 69);
        assert_eq!(aggression(Some(&snapshot(1.0)), &t), 95);

        for i in 0..=100 {
            let a = aggression(Some(&snapshot(i as f64 / 100.0)), &t);
            assert!((30..=99).contains(&a));
        }
    }

    #[test]
    fn test_aggression_clamps_at_99() {
        let t = Thresholds {
            aggression_multiplier: 100.0,
            ..Thresholds::REFERENCE
        };
        assert_eq!(aggression(Some(&snapshot(1.0)), &t), 99);
    }

    #[test]
    fn test_threat_boundaries() {
        let t = Thresholds::REFERENCE;
        assert_eq!(threat_for_win_rate(0.75, &t), ThreatLevel::Critical);
        assert_eq!(threat_for_win_rate(0.7499, &t), ThreatLevel::Elevated);
        assert_eq!(threat_for_win_rate(0.60, &t), ThreatLevel::Elevated);
        assert_eq!(threat_for_win_rate(0.5999, &t), ThreatLevel::Moderate);
        assert_eq!(threat_for_win_rate(0.40, &t), ThreatLevel::Moderate);
        assert_eq!(threat_for_win_rate(0.3999, &t), ThreatLevel::Low);
        assert_eq!(threat_level(None, &t), ThreatLevel::Moderate);
    }

    #[test]
    fn test_confidence_table() {
        assert_eq!(confidence(10), 96);
        assert_eq!(confidence(25), 96);
        assert_eq!(confidence(5), 82);
        assert_eq!(confidence(3), 65);
        assert_eq!(confidence(7), 82);
        assert_eq!(confidence(7), confidence(7));
        assert_eq!(confidence(2), 18);
        assert_eq!(confidence(1), 9);
        assert_eq!(confidence(0), 0);
    }

    #[test]
    fn test_scores_follow_named_constants() {
        assert_eq!(aggression(None, &Thresholds::REFERENCE), NEUTRAL_AGGRESSION);
        for (min, value) in CONFIDENCE_TABLE {
            assert_eq!(confidence(min), value);
        }
        let below_table = CONFIDENCE_TABLE[CONFIDENCE_TABLE.len() - 1].0 - 1;
        for size in 0..=below_table {
            assert!(confidence(size) as f64 <= CONFIDENCE_CAP);
        }
    }

    #[test]
    fn test_threat_serde_labels() {
        let json = serde_json::to_string(&ThreatLevel::Elevated).unwrap();
        assert_eq!(json, r#""ELEVATED""#);
    }
}
