//! Comparison Engine: two independent scouting runs joined into a
//! head-to-head verdict.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::aggregator::StatSnapshot;
use crate::api::GridSource;
use crate::completion::CompletionSource;
use crate::config::{Thresholds, LOOKBACK_MONTHS};
use crate::errors::Result;
use crate::game::Game;
use crate::reference::ReferenceData;
use crate::report::ScoutingReport;
use crate::resolver::EntityResolver;
use crate::scoring::comparison_score;
use crate::synthesizer::ReportSynthesizer;

const TEMPO_MARGIN: i16 = 10;
const FORM_MARGIN: f64 = 0.10;
const FULL_ROSTER: usize = 5;
const CONFIDENCE_CAP: f64 = 95.0;
const DEFAULT_ADVANTAGE: &str = "Adaptability";
const GENERIC_WEAKNESS: &str = "inconsistent mid-round adaptation";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TeamSide {
    pub name: String,
    pub report: ScoutingReport,
    pub snapshot: Option<StatSnapshot>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HeadToHead {
    pub predicted_winner: String,
    /// Percentage in [50, 95]
    pub confidence: u8,
    pub key_matchups: Vec<String>,
    pub advantages_a: Vec<String>,
    pub advantages_b: Vec<String>,
    pub verdict: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonReport {
    pub team_a: TeamSide,
    pub team_b: TeamSide,
    pub head_to_head: HeadToHead,
}

fn win_rate_or_zero(side: &TeamSide) -> f64 {
    side.snapshot.as_ref().map(|s| s.win_rate).unwrap_or(0.0)
}

fn aggression(side: &TeamSide) -> i16 {
    side.report.overall_strategy.early_game_aggression as i16
}

fn join_two(items: &[String]) -> String {
    items
        .iter()
        .take(2)
        .map(|s| s.to_lowercase())
        .collect::<Vec<_>>()
        .join(" and ")
}

/// Winner confidence from the two comparison scores, capped at 95
pub fn verdict_confidence(score_a: f64, score_b: f64) -> u8 {
    let total = score_a + score_b;
    let share_a = if total > 0.0 {
        score_a / total * 100.0
    } else {
        50.0
    };
    ((share_a - 50.0).abs() * 2.0 + 50.0)
        .min(CONFIDENCE_CAP)
        .round() as u8
}

pub fn analyze_head_to_head(a: &TeamSide, b: &TeamSide) -> HeadToHead {
    let score_a = comparison_score(&a.report, a.snapshot.as_ref());
    let score_b = comparison_score(&b.report, b.snapshot.as_ref());
    let a_wins = score_a > score_b;
    let (winner, loser) = if a_wins { (a, b) } else { (b, a) };

    let mut adv_a: Vec<String> = Vec::new();
    let mut adv_b: Vec<String> = Vec::new();

    if aggression(a) > aggression(b) + TEMPO_MARGIN {
        adv_a.push("Early game tempo".into());
    } else if aggression(b) > aggression(a) + TEMPO_MARGIN {
        adv_b.push("Early game tempo".into());
    }

    let (wr_a, wr_b) = (win_rate_or_zero(a), win_rate_or_zero(b));
    if wr_a > wr_b + FORM_MARGIN {
        adv_a.push("Recent form".into());
    } else if wr_b > wr_a + FORM_MARGIN {
        adv_b.push("Recent form".into());
    }

    // Ties go to side B
    if a.report.tactical_insights.confidence_score > b.report.tactical_insights.confidence_score {
        adv_a.push("Strategic consistency".into());
    } else {
        adv_b.push("Strategic consistency".into());
    }

    if a.report.player_profiles.len() >= FULL_ROSTER {
        adv_a.push("Full roster depth".into());
    }
    if b.report.player_profiles.len() >= FULL_ROSTER {
        adv_b.push("Full roster depth".into());
    }

    let mut key_matchups = Vec::new();
    if let (Some(p1), Some(p2)) = (a.report.primary_player(), b.report.primary_player()) {
        key_matchups.push(format!("{} vs {} - Star player duel", p1.name, p2.name));
    }
    key_matchups.push(format!(
        "{} {} obj priority vs {} {}",
        a.name,
        a.report.overall_strategy.objective_priority,
        b.name,
        b.report.overall_strategy.objective_priority
    ));

    let winner_adv = if a_wins { &adv_a } else { &adv_b };
    let edge = if winner_adv.is_empty() {
        "superior adaptability".to_string()
    } else {
        format!("advantages in {}", join_two(winner_adv))
    };
    let weakness = loser
        .report
        .tactical_insights
        .weaknesses
        .iter()
        .find(|w| !w.trim().is_empty())
        .map(|w| w.as_str())
        .unwrap_or(GENERIC_WEAKNESS);
    let verdict = format!(
        "{} has the edge with {}. Key to victory: exploit {}'s {}.",
        winner.name,
        edge,
        loser.name,
        weakness.trim_end_matches('.')
    );

    let or_default = |adv: Vec<String>| {
        if adv.is_empty() {
            vec![DEFAULT_ADVANTAGE.to_string()]
        } else {
            adv
        }
    };

    HeadToHead {
        predicted_winner: winner.name.clone(),
        confidence: verdict_confidence(score_a, score_b),
        key_matchups,
        advantages_a: or_default(adv_a),
        advantages_b: or_default(adv_b),
        verdict,
    }
}

pub struct ComparisonEngine<'a> {
    source: &'a dyn GridSource,
    completion: &'a dyn CompletionSource,
    reference: &'a ReferenceData,
    thresholds: Thresholds,
    lookback_months: u32,
}

impl<'a> ComparisonEngine<'a> {
    pub fn new(
        source: &'a dyn GridSource,
        completion: &'a dyn CompletionSource,
        reference: &'a ReferenceData,
    ) -> Self {
        Self {
            source,
            completion,
            reference,
            thresholds: Thresholds::REFERENCE,
            lookback_months: LOOKBACK_MONTHS,
        }
    }

    pub fn with_thresholds(mut self, thresholds: Thresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    pub fn with_lookback(mut self, months: u32) -> Self {
        self.lookback_months = months;
        self
    }

    /// A side whose data lookup fails for any reason is compared on defaults
    async fn side_snapshot(&self, term: &str, game: Game) -> Option<StatSnapshot> {
        let resolver =
            EntityResolver::new(self.source, self.reference).with_lookback(self.lookback_months);
        match resolver.resolve(term, game).await {
            Ok(resolution) => Some(resolution.snapshot),
            Err(e) => {
                warn!(team = term, error = %e, "no data for comparison side, using defaults");
                None
            }
        }
    }

    pub async fn compare(
        &self,
        team_a: &str,
        team_b: &str,
        game: Game,
        sample_size: u32,
    ) -> Result<ComparisonReport> {
        let (snap_a, snap_b) = tokio::join!(
            self.side_snapshot(team_a, game),
            self.side_snapshot(team_b, game)
        );

        let synthesizer =
            ReportSynthesizer::new(self.completion, self.reference).with_thresholds(self.thresholds);
        let (report_a, report_b) = tokio::join!(
            synthesizer.synthesize(team_a, game, sample_size, snap_a.as_ref()),
            synthesizer.synthesize(team_b, game, sample_size, snap_b.as_ref())
        );

        let side_a = TeamSide {
            name: team_a.to_string(),
            report: report_a?,
            snapshot: snap_a,
        };
        let side_b = TeamSide {
            name: team_b.to_string(),
            report: report_b?,
            snapshot: snap_b,
        };

        let head_to_head = analyze_head_to_head(&side_a, &side_b);
        info!(
            a = team_a,
            b = team_b,
            winner = %head_to_head.predicted_winner,
            confidence = head_to_head.confidence,
            "comparison complete"
        );

        Ok(ComparisonReport {
            team_a: side_a,
            team_b: side_b,
            head_to_head,
        })
    }
}
