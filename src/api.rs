use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;
use zeroize::Zeroizing;

use crate::config::ScoutConfig;
use crate::errors::{Result, ScoutError};
use crate::flex::deserialize_flex_id;
use crate::game::Game;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct GridTeam {
    #[serde(deserialize_with = "deserialize_flex_id")]
    pub id: String,
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct GridPlayer {
    #[serde(deserialize_with = "deserialize_flex_id")]
    pub id: String,
    pub nickname: String,
    #[serde(default)]
    pub team: Option<GridTeam>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SeriesTitle {
    #[serde(deserialize_with = "deserialize_flex_id")]
    pub id: String,
    pub name: String,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct GridSeries {
    pub id: String,
    pub title: SeriesTitle,
    pub start_time: Option<String>,
    pub teams: Vec<GridTeam>,
    /// e.g. "Best of 3"
    pub format: Option<String>,
    pub tournament: Option<String>,
}

// Wire shapes. GRID nests team identity under `baseInfo` and wraps
// every list in a relay connection.

#[derive(Deserialize)]
struct Connection<T> {
    #[serde(default = "Vec::new")]
    edges: Vec<Edge<T>>,
}

#[derive(Deserialize)]
struct Edge<T> {
    node: T,
}

impl<T> Connection<T> {
    fn into_nodes(self) -> Vec<T> {
        self.edges.into_iter().map(|e| e.node).collect()
    }
}

#[derive(Deserialize)]
struct Named {
    name: String,
}

#[derive(Deserialize)]
struct SeriesParticipant {
    #[serde(rename = "baseInfo")]
    base_info: Option<GridTeam>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SeriesNode {
    #[serde(deserialize_with = "deserialize_flex_id")]
    id: String,
    title: Option<SeriesTitle>,
    start_time_scheduled: Option<String>,
    #[serde(default)]
    teams: Vec<SeriesParticipant>,
    format: Option<Named>,
    tournament: Option<Named>,
}

impl From<SeriesNode> for GridSeries {
    fn from(node: SeriesNode) -> Self {
        Self {
            id: node.id,
            title: node.title.unwrap_or(SeriesTitle {
                id: String::new(),
                name: String::new(),
            }),
            start_time: node.start_time_scheduled,
            teams: node.teams.into_iter().filter_map(|t| t.base_info).collect(),
            format: node.format.map(|f| f.name),
            tournament: node.tournament.map(|t| t.name),
        }
    }
}

#[derive(Deserialize)]
struct GraphQlEnvelope<T> {
    data: Option<T>,
    errors: Option<Vec<serde_json::Value>>,
}

#[derive(Deserialize)]
struct PlayersData {
    players: Connection<GridPlayer>,
}

#[derive(Deserialize)]
struct TeamsData {
    teams: Connection<GridTeam>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SeriesData {
    all_series: Connection<SeriesNode>,
}

const PLAYER_SEARCH_QUERY: &str = r#"
query SearchPlayers($first: Int, $filter: PlayerFilter) {
  players(first: $first, filter: $filter) {
    edges { node { id nickname team { id name } } }
  }
}"#;

const TEAM_SEARCH_QUERY: &str = r#"
query SearchTeams($first: Int, $filter: TeamFilter) {
  teams(first: $first, filter: $filter) {
    edges { node { id name } }
  }
}"#;

const RECENT_SERIES_QUERY: &str = r#"
query RecentSeries($first: Int, $filter: SeriesFilter) {
  allSeries(first: $first, filter: $filter, orderBy: StartTimeScheduled, orderDirection: DESC) {
    edges {
      node {
        id
        title { id name }
        startTimeScheduled
        teams { baseInfo { id name } }
        format { name }
        tournament { name }
      }
    }
  }
}"#;

const ROSTER_QUERY: &str = r#"
query TeamRoster($first: Int, $filter: PlayerFilter) {
  players(first: $first, filter: $filter) {
    edges { node { id nickname team { id name } } }
  }
}"#;

/// Read access to the esports data source.
///
/// Every method is one network round-trip with no caching; calling it twice
/// issues two requests.
#[async_trait]
pub trait GridSource: Send + Sync {
    /// Players whose nickname contains `nickname`, scoped to `game`
    async fn search_players(&self, nickname: &str, game: Game) -> Result<Vec<GridPlayer>>;

    /// Teams whose name contains `name`, scoped to `game`
    async fn search_teams(&self, name: &str, game: Game) -> Result<Vec<GridTeam>>;

    /// Series scheduled at or after `since`, optionally restricted to one team
    async fn recent_series(
        &self,
        since: DateTime<Utc>,
        team_id: Option<&str>,
    ) -> Result<Vec<GridSeries>>;

    /// Current players of a team
    async fn roster(&self, team_id: &str) -> Result<Vec<GridPlayer>>;
}

#[derive(Clone)]
pub struct GridClient {
    pub url: String,
    api_key: Zeroizing<String>,
    player_page_size: u32,
    team_page_size: u32,
    series_page_size: u32,
    client: reqwest::Client,
}

impl std::fmt::Debug for GridClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GridClient").field("url", &self.url).finish()
    }
}

impl GridClient {
    pub fn new(config: &ScoutConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("scout-intel/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            url: config.grid_url.clone(),
            api_key: config.grid_api_key.clone(),
            player_page_size: config.player_page_size,
            team_page_size: config.team_page_size,
            series_page_size: config.series_page_size,
            client,
        })
    }

    async fn query<T: DeserializeOwned>(
        &self,
        operation: &str,
        query: &str,
        variables: serde_json::Value,
    ) -> Result<T> {
        debug!(operation, url = %self.url, "GRID request");

        let resp = self
            .client
            .post(&self.url)
            .header("x-api-key", self.api_key.as_str())
            .json(&json!({ "query": query, "variables": variables }))
            .send()
            .await?;

        let status = resp.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(ScoutError::Configuration(format!(
                "GRID rejected the data API key ({})",
                status.as_u16()
            )));
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ScoutError::upstream("GRID", Some(status.as_u16()), body));
        }

        let envelope: GraphQlEnvelope<T> = resp.json().await?;
        unwrap_envelope(envelope)
    }

    fn player_search_variables(&self, nickname: &str, game: Game) -> serde_json::Value {
        json!({
            "first": self.player_page_size,
            "filter": {
                "nickname": { "contains": nickname },
                "titleId": game.title_id(),
            }
        })
    }

    fn team_search_variables(&self, name: &str, game: Game) -> serde_json::Value {
        json!({
            "first": self.team_page_size,
            "filter": {
                "name": { "contains": name },
                "titleId": game.title_id(),
            }
        })
    }
}

fn unwrap_envelope<T>(envelope: GraphQlEnvelope<T>) -> Result<T> {
    if let Some(errors) = envelope.errors.filter(|e| !e.is_empty()) {
        return Err(ScoutError::GraphQl(
            serde_json::to_string(&errors).unwrap_or_else(|_| format!("{} error(s)", errors.len())),
        ));
    }
    envelope
        .data
        .ok_or_else(|| ScoutError::Parse("GRID response carried neither data nor errors".into()))
}

#[async_trait]
impl GridSource for GridClient {
    async fn search_players(&self, nickname: &str, game: Game) -> Result<Vec<GridPlayer>> {
        let variables = self.player_search_variables(nickname, game);
        let data: PlayersData = self
            .query("SearchPlayers", PLAYER_SEARCH_QUERY, variables)
            .await?;
        Ok(data.players.into_nodes())
    }

    async fn search_teams(&self, name: &str, game: Game) -> Result<Vec<GridTeam>> {
        let variables = self.team_search_variables(name, game);
        let data: TeamsData = self.query("SearchTeams", TEAM_SEARCH_QUERY, variables).await?;
        Ok(data.teams.into_nodes())
    }

    async fn recent_series(
        &self,
        since: DateTime<Utc>,
        team_id: Option<&str>,
    ) -> Result<Vec<GridSeries>> {
        let mut filter = json!({
            "startTimeScheduled": { "gte": since.to_rfc3339_opts(SecondsFormat::Millis, true) }
        });
        if let Some(id) = team_id {
            filter["teamId"] = json!(id);
        }
        let variables = json!({ "first": self.series_page_size, "filter": filter });

        let data: SeriesData = self
            .query("RecentSeries", RECENT_SERIES_QUERY, variables)
            .await?;
        Ok(data
            .all_series
            .into_nodes()
            .into_iter()
            .map(GridSeries::from)
            .collect())
    }

    async fn roster(&self, team_id: &str) -> Result<Vec<GridPlayer>> {
        let variables = json!({
            "first": self.player_page_size,
            "filter": { "teamIdFilter": { "id": team_id } }
        });
        let data: PlayersData = self.query("TeamRoster", ROSTER_QUERY, variables).await?;
        Ok(data.players.into_nodes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_series_wire_shape() {
        let raw = r#"{
            "data": { "allSeries": { "edges": [
                { "node": {
                    "id": 2801,
                    "title": { "id": "6", "name": "VALORANT" },
                    "startTimeScheduled": "2026-05-02T18:00:00Z",
                    "teams": [
                        { "baseInfo": { "id": "97", "name": "Sentinels" } },
                        { "baseInfo": null },
                        { "baseInfo": { "id": "1079", "name": "LOUD" } }
                    ],
                    "format": { "name": "Best of 3" },
                    "tournament": null
                } }
            ] } }
        }"#;
        let envelope: GraphQlEnvelope<SeriesData> = serde_json::from_str(raw).unwrap();
        let data = unwrap_envelope(envelope).unwrap();
        let series: Vec<GridSeries> = data
            .all_series
            .into_nodes()
            .into_iter()
            .map(GridSeries::from)
            .collect();

        assert_eq!(series.len(), 1);
        assert_eq!(series[0].id, "2801");
        assert_eq!(series[0].title.name, "VALORANT");
        assert_eq!(series[0].teams.len(), 2);
        assert_eq!(series[0].teams[1].name, "LOUD");
        assert_eq!(series[0].format.as_deref(), Some("Best of 3"));
    }

    #[test]
    fn test_errors_envelope_is_failure() {
        let raw = r#"{ "data": null, "errors": [ { "message": "Field 'x' not found" } ] }"#;
        let envelope: GraphQlEnvelope<PlayersData> = serde_json::from_str(raw).unwrap();
        let err = unwrap_envelope(envelope).err().unwrap();
        assert!(matches!(err, ScoutError::GraphQl(ref m) if m.contains("Field 'x' not found")));
    }

    #[test]
    fn test_player_without_team() {
        let raw = r#"{ "data": { "players": { "edges": [
            { "node": { "id": "5", "nickname": "TenZ", "team": null } }
        ] } } }"#;
        let envelope: GraphQlEnvelope<PlayersData> = serde_json::from_str(raw).unwrap();
        let players = unwrap_envelope(envelope).unwrap().players.into_nodes();
        assert_eq!(players[0].nickname, "TenZ");
        assert!(players[0].team.is_none());
    }

    #[test]
    fn test_searches_use_their_own_page_sizes() {
        let mut config = ScoutConfig::new("grid-0123456789", "gsk_0123456789abcdef");
        config.player_page_size = 20;
        config.team_page_size = 7;
        let client = GridClient::new(&config).unwrap();

        let teams = client.team_search_variables("Sentinels", Game::Valorant);
        assert_eq!(teams["first"], 7);
        assert_eq!(teams["filter"]["name"]["contains"], "Sentinels");
        assert_eq!(teams["filter"]["titleId"], "6");

        let players = client.player_search_variables("TenZ", Game::Valorant);
        assert_eq!(players["first"], 20);
    }
}
