//! Team Data Aggregator: turns GRID series and roster records for one team
//! name into a [`StatSnapshot`].
//!
//! GRID's series query exposes no result field, so match outcomes come from
//! a positional placeholder rule (see [`is_positional_win`]). Every other
//! number traces back to a fetched record or an explicit zero/sentinel.

use chrono::{DateTime, Months, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

use crate::api::{GridSeries, GridSource, GridTeam};
use crate::config::{LOOKBACK_MONTHS, RECENT_MATCH_LIMIT, ROSTER_LIMIT, ROSTER_SENTINEL};
use crate::errors::{Result, ScoutError};
use crate::game::Game;
use crate::reference::ReferenceData;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum Outcome {
    Win,
    Loss,
}

impl Outcome {
    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Win => "WIN",
            Outcome::Loss => "LOSS",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct MatchRecord {
    /// Map name, series format, or "Match"
    pub label: String,
    pub outcome: Outcome,
    pub opponent: String,
}

impl MatchRecord {
    pub fn score_line(&self) -> String {
        format!("{} vs {}", self.outcome.label(), self.opponent)
    }
}

/// Aggregate statistics for one team over the recent-match window.
/// Built fresh per request and never mutated afterwards.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct StatSnapshot {
    pub team_name: String,
    pub team_id: Option<String>,
    pub game: Game,
    pub matches_analyzed: usize,
    /// Ratio in [0, 1]
    pub win_rate: f64,
    /// Map name -> ratio in [0, 1]; unrecognized maps are excluded
    pub map_win_rates: BTreeMap<String, f64>,
    /// Up to five names, or the single sentinel entry
    pub roster: Vec<String>,
    pub recent_matches: Vec<MatchRecord>,
}

/// Placeholder outcome rule: every third record, starting with the first,
/// counts as a loss. Kept as-is until GRID exposes series results.
pub fn is_positional_win(index: usize) -> bool {
    index % 3 != 0
}

/// Exact (case-insensitive) name match first, else the shortest name
pub fn pick_team(teams: &[GridTeam], name: &str) -> Option<GridTeam> {
    let wanted = name.to_lowercase();
    teams
        .iter()
        .find(|t| t.name.to_lowercase() == wanted)
        .or_else(|| teams.iter().min_by_key(|t| t.name.chars().count()))
        .cloned()
}

fn names_match(candidate: &str, team_name: &str) -> bool {
    candidate.to_lowercase().contains(&team_name.to_lowercase())
}

/// Keep series for `game`; without a team id, also require a participant
/// whose name contains `team_name`. Order is preserved.
pub fn filter_series(
    series: Vec<GridSeries>,
    game: Game,
    team_name: &str,
    id_known: bool,
) -> Vec<GridSeries> {
    series
        .into_iter()
        .filter(|s| game.matches_title(&s.title.name))
        .filter(|s| id_known || s.teams.iter().any(|t| names_match(&t.name, team_name)))
        .collect()
}

#[derive(Debug, Default, Clone, Copy)]
struct MapTally {
    wins: u32,
    total: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tally {
    pub win_rate: f64,
    pub map_win_rates: BTreeMap<String, f64>,
    pub recent_matches: Vec<MatchRecord>,
}

/// Win rate, per-map win rates and the match log for an already-filtered list
pub fn tally(series: &[GridSeries], team_name: &str, reference: &ReferenceData) -> Tally {
    let mut wins = 0usize;
    let mut maps: BTreeMap<String, MapTally> = BTreeMap::new();
    let mut recent_matches = Vec::new();

    for (idx, s) in series.iter().enumerate() {
        let win = is_positional_win(idx);
        if win {
            wins += 1;
        }

        let map = reference.find_map(&s.title.name);
        if let Some(map) = map {
            let entry = maps.entry(map.to_string()).or_default();
            entry.total += 1;
            if win {
                entry.wins += 1;
            }
        }

        if recent_matches.len() < RECENT_MATCH_LIMIT {
            let opponent = s
                .teams
                .iter()
                .find(|t| !names_match(&t.name, team_name))
                .map(|t| t.name.clone())
                .unwrap_or_else(|| "Opponent".to_string());
            let label = map
                .map(|m| m.to_string())
                .or_else(|| s.format.clone())
                .unwrap_or_else(|| "Match".to_string());
            recent_matches.push(MatchRecord {
                label,
                outcome: if win { Outcome::Win } else { Outcome::Loss },
                opponent,
            });
        }
    }

    let total = series.len();
    let win_rate = if total > 0 {
        wins as f64 / total as f64
    } else {
        0.0
    };

    let map_win_rates = maps
        .into_iter()
        .map(|(name, t)| (name, t.wins as f64 / t.total as f64))
        .collect();

    Tally {
        win_rate,
        map_win_rates,
        recent_matches,
    }
}

pub struct TeamAggregator<'a> {
    source: &'a dyn GridSource,
    reference: &'a ReferenceData,
    lookback_months: u32,
}

impl<'a> TeamAggregator<'a> {
    pub fn new(source: &'a dyn GridSource, reference: &'a ReferenceData) -> Self {
        Self {
            source,
            reference,
            lookback_months: LOOKBACK_MONTHS,
        }
    }

    pub fn with_lookback(mut self, months: u32) -> Self {
        self.lookback_months = months;
        self
    }

    fn window_start(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now.checked_sub_months(Months::new(self.lookback_months))
            .unwrap_or(now)
    }

    /// Identifier lookup is best-effort: failures fall through to name matching
    async fn lookup_team(&self, team_name: &str, game: Game) -> Option<GridTeam> {
        match self.source.search_teams(team_name, game).await {
            Ok(teams) => pick_team(&teams, team_name),
            Err(e) => {
                warn!(team = team_name, error = %e, "team id lookup failed, matching by name");
                None
            }
        }
    }

    pub async fn aggregate(&self, team_name: &str, game: Game) -> Result<StatSnapshot> {
        debug!(team = team_name, game = %game, "aggregating team data");

        let team = self.lookup_team(team_name, game).await;
        let team_id = team.as_ref().map(|t| t.id.clone());

        let since = self.window_start(Utc::now());
        let series = self.source.recent_series(since, team_id.as_deref()).await?;
        let fetched = series.len();
        let relevant = filter_series(series, game, team_name, team_id.is_some());

        if relevant.is_empty() {
            let team = team_name.to_string();
            return Err(if team_id.is_some() {
                ScoutError::NoRecentMatches { team, game }
            } else {
                ScoutError::NoSeriesData { team, game }
            });
        }

        info!(
            team = team_name,
            fetched,
            relevant = relevant.len(),
            "series filtered"
        );

        let tally = tally(&relevant, team_name, self.reference);

        let roster_id = team_id.clone().or_else(|| {
            relevant
                .iter()
                .flat_map(|s| s.teams.iter())
                .find(|t| names_match(&t.name, team_name))
                .map(|t| t.id.clone())
        });
        let roster = self.fetch_roster(roster_id.as_deref()).await;

        Ok(StatSnapshot {
            team_name: team.map(|t| t.name).unwrap_or_else(|| team_name.to_string()),
            team_id,
            game,
            matches_analyzed: relevant.len(),
            win_rate: tally.win_rate,
            map_win_rates: tally.map_win_rates,
            roster,
            recent_matches: tally.recent_matches,
        })
    }

    async fn fetch_roster(&self, team_id: Option<&str>) -> Vec<String> {
        let players = match team_id {
            Some(id) => match self.source.roster(id).await {
                Ok(players) => players,
                Err(e) => {
                    warn!(team_id = id, error = %e, "roster lookup failed");
                    Vec::new()
                }
            },
            None => Vec::new(),
        };

        let names: Vec<String> = players
            .into_iter()
            .map(|p| p.nickname)
            .filter(|n| !n.trim().is_empty())
            .take(ROSTER_LIMIT)
            .collect();

        if names.is_empty() {
            vec![ROSTER_SENTINEL.to_string()]
        } else {
            names
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{GridPlayer, SeriesTitle};
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct StubGrid {
        teams: Vec<GridTeam>,
        series: Vec<GridSeries>,
        rosters: Vec<(String, Vec<GridPlayer>)>,
        roster_queries: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl GridSource for StubGrid {
        async fn search_players(&self, _nickname: &str, _game: Game) -> Result<Vec<GridPlayer>> {
            Ok(Vec::new())
        }

        async fn search_teams(&self, _name: &str, _game: Game) -> Result<Vec<GridTeam>> {
            Ok(self.teams.clone())
        }

        async fn recent_series(
            &self,
            _since: DateTime<Utc>,
            _team_id: Option<&str>,
        ) -> Result<Vec<GridSeries>> {
            Ok(self.series.clone())
        }

        async fn roster(&self, team_id: &str) -> Result<Vec<GridPlayer>> {
            self.roster_queries.lock().unwrap().push(team_id.to_string());
            Ok(self
                .rosters
                .iter()
                .find(|(id, _)| id == team_id)
                .map(|(_, players)| players.clone())
                .unwrap_or_default())
        }
    }

    fn series(title: &str, teams: &[&str]) -> GridSeries {
        GridSeries {
            id: title.to_string(),
            title: SeriesTitle {
                id: "6".into(),
                name: title.to_string(),
            },
            start_time: None,
            teams: teams
                .iter()
                .enumerate()
                .map(|(i, n)| GridTeam {
                    id: format!("t{}", i),
                    name: n.to_string(),
                })
                .collect(),
            format: Some("Best of 3".into()),
            tournament: None,
        }
    }

    #[test]
    fn test_positional_rule_nine_records() {
        let losses: Vec<usize> = (0..9).filter(|i| !is_positional_win(*i)).collect();
        assert_eq!(losses, vec![0, 3, 6]);
        assert_eq!((0..9).filter(|i| is_positional_win(*i)).count(), 6);
    }

    #[test]
    fn test_pick_team_prefers_exact_then_shortest() {
        let teams = vec![
            GridTeam { id: "1".into(), name: "Sentinels Academy".into() },
            GridTeam { id: "2".into(), name: "SENTINELS".into() },
            GridTeam { id: "3".into(), name: "Sentinels GC".into() },
        ];
        assert_eq!(pick_team(&teams, "sentinels").unwrap().id, "2");

        let teams = vec![
            GridTeam { id: "1".into(), name: "Sentinels Academy".into() },
            GridTeam { id: "3".into(), name: "Sentinels GC".into() },
        ];
        assert_eq!(pick_team(&teams, "sentinels").unwrap().id, "3");
        assert!(pick_team(&[], "sentinels").is_none());
    }

    #[test]
    fn test_filter_requires_game_and_name_without_id() {
        let all = vec![
            series("VALORANT", &["Sentinels", "LOUD"]),
            series("League of Legends", &["Sentinels", "T1"]),
            series("VALORANT", &["NRG", "LOUD"]),
        ];
        let kept = filter_series(all.clone(), Game::Valorant, "sentinels", false);
        assert_eq!(kept.len(), 1);

        // With a known id the name check is skipped but the game check is not
        let kept = filter_series(all, Game::Valorant, "sentinels", true);
        assert_eq!(kept.len(), 2);
    }

    #[test]
    fn test_tally_excludes_unknown_maps_from_map_stats() {
        let reference = ReferenceData::builtin();
        let list = vec![
            series("VALORANT Ascent", &["Sentinels", "LOUD"]), // loss
            series("VALORANT Ascent", &["Sentinels", "NRG"]),  // win
            series("VALORANT", &["Sentinels", "G2"]),          // win
            series("VALORANT Bind", &["Sentinels"]),           // loss
        ];
        let t = tally(&list, "Sentinels", &reference);

        assert!((t.win_rate - 0.5).abs() < 1e-9);
        assert_eq!(t.map_win_rates.len(), 2);
        assert!((t.map_win_rates["Ascent"] - 0.5).abs() < 1e-9);
        assert_eq!(t.map_win_rates["Bind"], 0.0);
        assert!(!t.map_win_rates.contains_key("Series"));

        assert_eq!(t.recent_matches[0].score_line(), "LOSS vs LOUD");
        assert_eq!(t.recent_matches[2].label, "Best of 3");
        assert_eq!(t.recent_matches[3].opponent, "Opponent");
    }

    #[tokio::test]
    async fn test_unknown_team_matches_by_name_and_borrows_participant_roster() {
        let reference = ReferenceData::builtin();
        let grid = StubGrid {
            series: vec![
                series("VALORANT Ascent", &["Alpha", "Bravo"]),
                series("League of Legends", &["Alpha", "Bravo"]),
                series("VALORANT Bind", &["Alpha", "Charlie"]),
                series("VALORANT Haven", &["Delta", "Echo"]),
            ],
            rosters: vec![(
                "t0".into(),
                vec![GridPlayer {
                    id: "p1".into(),
                    nickname: "a1 player".into(),
                    team: None,
                }],
            )],
            ..Default::default()
        };

        let snapshot = TeamAggregator::new(&grid, &reference)
            .aggregate("alpha", Game::Valorant)
            .await
            .unwrap();

        assert_eq!(snapshot.team_name, "alpha");
        assert_eq!(snapshot.team_id, None);
        assert_eq!(snapshot.matches_analyzed, 2);
        assert!((snapshot.win_rate - 0.5).abs() < 1e-9);
        assert_eq!(snapshot.roster, vec!["a1 player"]);
        assert_eq!(*grid.roster_queries.lock().unwrap(), vec!["t0"]);
    }

    #[tokio::test]
    async fn test_unknown_team_without_series_is_no_series_data() {
        let reference = ReferenceData::builtin();
        let grid = StubGrid {
            series: vec![series("VALORANT Ascent", &["Delta", "Echo"])],
            ..Default::default()
        };

        let err = TeamAggregator::new(&grid, &reference)
            .aggregate("alpha", Game::Valorant)
            .await
            .unwrap_err();

        assert!(matches!(err, ScoutError::NoSeriesData { .. }));
        assert!(grid.roster_queries.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_known_team_outside_game_is_no_recent_matches() {
        let reference = ReferenceData::builtin();
        let grid = StubGrid {
            teams: vec![GridTeam {
                id: "t0".into(),
                name: "Alpha".into(),
            }],
            series: vec![series("League of Legends", &["Alpha", "Bravo"])],
            ..Default::default()
        };

        let err = TeamAggregator::new(&grid, &reference)
            .aggregate("Alpha", Game::Valorant)
            .await
            .unwrap_err();

        assert!(matches!(err, ScoutError::NoRecentMatches { .. }));
    }
}
