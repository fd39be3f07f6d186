use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The two titles a report can be generated for
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Game {
    #[default]
    #[serde(rename = "VALORANT", alias = "Valorant", alias = "valorant")]
    Valorant,
    #[serde(
        rename = "League of Legends",
        alias = "LoL",
        alias = "LOL",
        alias = "league of legends"
    )]
    LeagueOfLegends,
}

impl Game {
    pub fn display_name(&self) -> &'static str {
        match self {
            Game::Valorant => "VALORANT",
            Game::LeagueOfLegends => "League of Legends",
        }
    }

    /// GRID title identifier used to scope player and team searches
    pub fn title_id(&self) -> &'static str {
        match self {
            Game::Valorant => "6",
            Game::LeagueOfLegends => "3",
        }
    }

    /// Lowercase keyword a series title must contain to belong to this game
    pub fn title_keyword(&self) -> &'static str {
        match self {
            Game::Valorant => "valorant",
            Game::LeagueOfLegends => "league",
        }
    }

    pub fn roles(&self) -> &'static [&'static str] {
        match self {
            Game::Valorant => &["Duelist", "Initiator", "Controller", "Sentinel"],
            Game::LeagueOfLegends => &["Top", "Jungle", "Mid", "ADC", "Support"],
        }
    }

    /// Roles whose player is treated as the team's primary threat
    pub fn carry_roles(&self) -> &'static [&'static str] {
        match self {
            Game::Valorant => &["Duelist"],
            Game::LeagueOfLegends => &["Mid"],
        }
    }

    pub fn is_carry_role(&self, role: &str) -> bool {
        self.carry_roles()
            .iter()
            .any(|r| r.eq_ignore_ascii_case(role.trim()))
    }

    /// What a single pick is called in this game
    pub fn pick_noun(&self) -> &'static str {
        match self {
            Game::Valorant => "Agent",
            Game::LeagueOfLegends => "Champion",
        }
    }

    /// Does a series title belong to this game
    pub fn matches_title(&self, title: &str) -> bool {
        title.to_lowercase().contains(self.title_keyword())
    }
}

impl fmt::Display for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl FromStr for Game {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "valorant" | "val" => Ok(Game::Valorant),
            "league of legends" | "league" | "lol" => Ok(Game::LeagueOfLegends),
            other => Err(format!(
                "unknown game '{}' (expected 'valorant' or 'lol')",
                other
            )),
        }
    }
}
