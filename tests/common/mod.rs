#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use scout_intel_lib::api::{GridPlayer, GridSeries, GridSource, GridTeam, SeriesTitle};
use scout_intel_lib::completion::{CompletionRequest, CompletionSource};
use scout_intel_lib::reference::ReferenceData;
use scout_intel_lib::{Game, Result, ScoutError, ScoutService};

pub const REPORT_JSON: &str = r#"{
    "teamName": "Sentinels",
    "game": "VALORANT",
    "lastMatches": 10,
    "overallStrategy": {
        "macroPatterns": "Fast A executes off a mid default",
        "objectivePriority": "High",
        "earlyGameAggression": 12
    },
    "playerProfiles": [
        { "name": "zekken", "role": "Duelist", "mostPlayed": ["Raze"], "kda": 1.3,
          "tendency": "Dry peeks A main on pistol", "winRate": 61 }
    ],
    "topCompositions": [],
    "tacticalInsights": {
        "strengths": ["Pistol conversions"],
        "weaknesses": ["Slow B retakes after 1:05"],
        "howToWin": "Stack B late",
        "counterPicks": [],
        "confidenceScore": 3,
        "threatLevel": "LOW"
    }
}"#;

pub fn team(id: &str, name: &str) -> GridTeam {
    GridTeam {
        id: id.to_string(),
        name: name.to_string(),
    }
}

pub fn player(nick: &str, team_id: &str, team_name: &str) -> GridPlayer {
    GridPlayer {
        id: format!("p-{}", nick),
        nickname: nick.to_string(),
        team: Some(team(team_id, team_name)),
    }
}

pub fn series(n: usize, title: &str, teams: &[GridTeam]) -> Vec<GridSeries> {
    (0..n)
        .map(|i| GridSeries {
            id: format!("{}-{}", title, i),
            title: SeriesTitle {
                id: "6".into(),
                name: title.to_string(),
            },
            start_time: None,
            teams: teams.to_vec(),
            format: Some("Best of 3".into()),
            tournament: None,
        })
        .collect()
}

#[derive(Default)]
pub struct FakeGrid {
    pub players: Vec<GridPlayer>,
    pub teams: Vec<GridTeam>,
    pub series: Vec<GridSeries>,
    pub rosters: Vec<GridPlayer>,
    pub fail_players: bool,
    pub fail_series: bool,
    /// Every call answers as if GRID rejected the key
    pub reject_key: bool,
    pub player_calls: AtomicUsize,
    pub series_calls: AtomicUsize,
    pub team_queries: Mutex<Vec<String>>,
}

impl FakeGrid {
    fn check_key(&self) -> Result<()> {
        if self.reject_key {
            return Err(ScoutError::Configuration(
                "GRID rejected the data API key (401)".into(),
            ));
        }
        Ok(())
    }

    pub fn team_queries(&self) -> Vec<String> {
        self.team_queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl GridSource for FakeGrid {
    async fn search_players(&self, nickname: &str, _game: Game) -> Result<Vec<GridPlayer>> {
        self.player_calls.fetch_add(1, Ordering::SeqCst);
        self.check_key()?;
        if self.fail_players {
            return Err(ScoutError::GraphQl("player index unavailable".into()));
        }
        let wanted = nickname.to_lowercase();
        Ok(self
            .players
            .iter()
            .filter(|p| p.nickname.to_lowercase().contains(&wanted))
            .cloned()
            .collect())
    }

    async fn search_teams(&self, name: &str, _game: Game) -> Result<Vec<GridTeam>> {
        self.team_queries.lock().unwrap().push(name.to_string());
        self.check_key()?;
        let wanted = name.to_lowercase();
        Ok(self
            .teams
            .iter()
            .filter(|t| t.name.to_lowercase().contains(&wanted))
            .cloned()
            .collect())
    }

    async fn recent_series(
        &self,
        _since: DateTime<Utc>,
        team_id: Option<&str>,
    ) -> Result<Vec<GridSeries>> {
        self.series_calls.fetch_add(1, Ordering::SeqCst);
        self.check_key()?;
        if self.fail_series {
            return Err(ScoutError::Upstream {
                service: "GRID",
                status: Some(502),
                message: "bad gateway".into(),
            });
        }
        Ok(self
            .series
            .iter()
            .filter(|s| team_id.map_or(true, |id| s.teams.iter().any(|t| t.id == id)))
            .cloned()
            .collect())
    }

    async fn roster(&self, team_id: &str) -> Result<Vec<GridPlayer>> {
        self.check_key()?;
        Ok(self
            .rosters
            .iter()
            .filter(|p| p.team.as_ref().map_or(false, |t| t.id == team_id))
            .cloned()
            .collect())
    }
}

pub struct FakeCompletion {
    pub reply: Result<String>,
    pub calls: AtomicUsize,
    pub requests: Mutex<Vec<CompletionRequest>>,
}

impl FakeCompletion {
    pub fn ok() -> Self {
        Self::replying(Ok(REPORT_JSON.to_string()))
    }

    pub fn replying(reply: Result<String>) -> Self {
        Self {
            reply,
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl CompletionSource for FakeCompletion {
    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());
        self.reply.clone()
    }
}

pub fn service(grid: Arc<FakeGrid>, completion: Arc<FakeCompletion>) -> ScoutService {
    ScoutService::new(grid, completion, ReferenceData::builtin())
}

/// Sentinels with ten VALORANT series (six positional wins) and a full roster
pub fn sentinels_grid() -> FakeGrid {
    let sen = team("97", "Sentinels");
    let loud = team("12", "LOUD");
    FakeGrid {
        teams: vec![team("98", "Sentinels Academy"), sen.clone()],
        series: series(10, "VALORANT Champions Tour", &[sen, loud]),
        rosters: ["zekken", "johnqt", "Sacy", "TenZ", "Zellsis", "bang"]
            .iter()
            .map(|n| player(n, "97", "Sentinels"))
            .collect(),
        ..Default::default()
    }
}
