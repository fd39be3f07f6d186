//! Plain-text rendering for the terminal. Every narrative and numeric field
//! is printed as-is; nothing here recomputes a score.

use std::fmt::Write;

use crate::aggregator::StatSnapshot;
use crate::comparison::{ComparisonReport, TeamSide};
use crate::reference::ReferenceData;
use crate::report::ScoutingReport;

const RULE: &str = "------------------------------------------------------------";

fn percent(ratio: f64) -> String {
    format!("{:.0}%", ratio * 100.0)
}

fn bullets(out: &mut String, items: &[String]) {
    for item in items {
        let _ = writeln!(out, "  - {}", item);
    }
}

/// Pick names annotated with their tier on the current patch, e.g. `Jett [S]`
fn tagged_picks(picks: &[String], report: &ScoutingReport, reference: &ReferenceData) -> String {
    picks
        .iter()
        .map(|p| format!("{} [{}]", p, reference.meta_tier(report.game, p)))
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn render_snapshot(snapshot: &StatSnapshot) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "GRID DATA: {} ({})", snapshot.team_name, snapshot.game);
    if let Some(id) = &snapshot.team_id {
        let _ = writeln!(out, "  Team id: {}", id);
    }
    let _ = writeln!(
        out,
        "  Matches analyzed: {}   Win rate: {}",
        snapshot.matches_analyzed,
        percent(snapshot.win_rate)
    );

    if !snapshot.map_win_rates.is_empty() {
        let _ = writeln!(out, "  Maps:");
        for (map, rate) in &snapshot.map_win_rates {
            let _ = writeln!(out, "    {:<10} {}", map, percent(*rate));
        }
    }

    let _ = writeln!(out, "  Roster: {}", snapshot.roster.join(", "));

    if !snapshot.recent_matches.is_empty() {
        let _ = writeln!(out, "  Recent:");
        for m in &snapshot.recent_matches {
            let _ = writeln!(out, "    {:<12} {}", m.label, m.score_line());
        }
    }
    out
}

pub fn render_report(report: &ScoutingReport, reference: &ReferenceData) -> String {
    let mut out = String::new();
    let insights = &report.tactical_insights;
    let strategy = &report.overall_strategy;

    let _ = writeln!(out, "{}", RULE);
    let _ = writeln!(
        out,
        "SCOUTING REPORT: {} | {} | last {} matches",
        report.team_name, report.game, report.last_matches
    );
    let _ = writeln!(
        out,
        "THREAT: {}   CONFIDENCE: {}%   EARLY AGGRESSION: {}/99",
        insights.threat_level, insights.confidence_score, strategy.early_game_aggression
    );
    let _ = writeln!(out, "{}", RULE);

    let _ = writeln!(out, "STRATEGY ({} objective priority)", strategy.objective_priority);
    let _ = writeln!(out, "  {}", strategy.macro_patterns);

    if !report.player_profiles.is_empty() {
        let _ = writeln!(out, "\nPLAYERS");
        for p in &report.player_profiles {
            let _ = writeln!(
                out,
                "  {:<12} {:<11} KDA {:.2}  WR {}%",
                p.name, p.role, p.kda, p.win_rate
            );
            if !p.most_played.is_empty() {
                let _ = writeln!(out, "    plays: {}", tagged_picks(&p.most_played, report, reference));
            }
            if !p.tendency.is_empty() {
                let _ = writeln!(out, "    tendency: {}", p.tendency);
            }
        }
    }

    if !report.top_compositions.is_empty() {
        let _ = writeln!(out, "\nCOMPOSITIONS");
        for c in &report.top_compositions {
            let _ = writeln!(
                out,
                "  {} ({}% WR, {}% of games)",
                c.play_style, c.win_rate, c.occurrence
            );
            let _ = writeln!(out, "    {}", tagged_picks(&c.agents, report, reference));
        }
    }

    let _ = writeln!(out, "\nSTRENGTHS");
    bullets(&mut out, &insights.strengths);
    let _ = writeln!(out, "WEAKNESSES");
    bullets(&mut out, &insights.weaknesses);
    let _ = writeln!(out, "HOW TO WIN\n  {}", insights.how_to_win);
    if let Some(condition) = &insights.win_condition {
        let _ = writeln!(out, "WIN CONDITION\n  {}", condition);
    }
    if !insights.counter_picks.is_empty() {
        let _ = writeln!(out, "COUNTER PICKS");
        bullets(&mut out, &insights.counter_picks);
    }

    if !report.sources.is_empty() {
        let _ = writeln!(out, "\nSOURCES");
        for s in &report.sources {
            let _ = writeln!(out, "  {} <{}>", s.title, s.uri);
        }
    }
    out
}

fn side_summary(out: &mut String, side: &TeamSide, advantages: &[String]) {
    let wr = side
        .snapshot
        .as_ref()
        .map(|s| percent(s.win_rate))
        .unwrap_or_else(|| "n/a".to_string());
    let _ = writeln!(
        out,
        "{}: threat {}, win rate {}, aggression {}",
        side.name,
        side.report.tactical_insights.threat_level,
        wr,
        side.report.overall_strategy.early_game_aggression
    );
    let _ = writeln!(out, "  advantages: {}", advantages.join(", "));
}

pub fn render_comparison(comparison: &ComparisonReport) -> String {
    let mut out = String::new();
    let h2h = &comparison.head_to_head;

    let _ = writeln!(out, "{}", RULE);
    let _ = writeln!(
        out,
        "{} vs {}",
        comparison.team_a.name, comparison.team_b.name
    );
    let _ = writeln!(
        out,
        "PREDICTED WINNER: {} ({}% confidence)",
        h2h.predicted_winner, h2h.confidence
    );
    let _ = writeln!(out, "{}", RULE);

    side_summary(&mut out, &comparison.team_a, &h2h.advantages_a);
    side_summary(&mut out, &comparison.team_b, &h2h.advantages_b);

    let _ = writeln!(out, "\nKEY MATCHUPS");
    bullets(&mut out, &h2h.key_matchups);
    let _ = writeln!(out, "\nVERDICT\n  {}", h2h.verdict);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::Game;
    use crate::report::tests::SAMPLE;
    use std::collections::BTreeMap;

    #[test]
    fn test_report_prints_fields_verbatim() {
        let reference = ReferenceData::builtin();
        let report = ScoutingReport::from_completion(SAMPLE).unwrap();
        let text = render_report(&report, &reference);

        assert!(text.contains("SCOUTING REPORT: Sentinels | VALORANT | last 10 matches"));
        assert!(text.contains("Slow B retakes after 1:05"));
        assert!(text.contains("Raze [A], Jett [S]"));
        assert!(text.contains("VLR.gg Match History <https://vlr.gg>"));
        assert!(text.contains("EARLY AGGRESSION: 88/99"));
    }

    #[test]
    fn test_snapshot_lists_maps_and_roster() {
        let snapshot = StatSnapshot {
            team_name: "Sentinels".into(),
            team_id: Some("97".into()),
            game: Game::Valorant,
            matches_analyzed: 9,
            win_rate: 2.0 / 3.0,
            map_win_rates: BTreeMap::from([("Ascent".to_string(), 0.5)]),
            roster: vec!["zekken".into(), "johnqt".into()],
            recent_matches: vec![],
        };
        let text = render_snapshot(&snapshot);
        assert!(text.contains("Win rate: 67%"));
        assert!(text.contains("Ascent"));
        assert!(text.contains("Roster: zekken, johnqt"));
    }
}
