use thiserror::Error;

use crate::game::Game;

/// Coarse classification used by callers to pick a user-facing message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing or malformed credentials
    Configuration,
    /// Completion service rejected the bearer token
    Authentication,
    /// No data exists for the requested entity
    NotFound,
    /// Non-2xx status, transport failure or GraphQL error envelope
    Upstream,
    /// Response body did not match the expected shape
    Parse,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl ErrorKind {
    /// Get a user-friendly name for the kind
    pub fn display_name(&self) -> &'static str {
        match self {
            ErrorKind::Configuration => "Configuration",
            ErrorKind::Authentication => "Authentication",
            ErrorKind::NotFound => "Not Found",
            ErrorKind::Upstream => "Upstream Service",
            ErrorKind::Parse => "Response Parsing",
        }
    }

    /// Get actionable suggestion for fixing the issue
    pub fn suggestion(&self) -> &'static str {
        match self {
            ErrorKind::Configuration => {
                "Set GRID_API_KEY and GROQ_API_KEY in the environment or a .env file."
            }
            ErrorKind::Authentication => {
                "The completion API key was rejected. Generate a new Groq key and update GROQ_API_KEY."
            }
            ErrorKind::NotFound => {
                "Check the spelling of the team or player, or try the organization's full name."
            }
            ErrorKind::Upstream => "A remote service failed to answer. Try again later.",
            ErrorKind::Parse => {
                "The analysis response was malformed. Run the request again."
            }
        }
    }
}

/// Error type for every scouting operation
#[derive(Debug, Error, Clone)]
pub enum ScoutError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid completion API key (401 Unauthorized): {0}")]
    Authentication(String),

    #[error("Data not available for \"{term}\" in {game}. This entity was not found in the GRID esports database.")]
    EntityNotFound { term: String, game: Game },

    #[error("Team \"{team}\" exists but has no recent {game} matches")]
    NoRecentMatches { team: String, game: Game },

    #[error("No series data found for \"{team}\" in {game}")]
    NoSeriesData { team: String, game: Game },

    #[error("{service} returned {}: {message}", status_label(.status))]
    Upstream {
        service: &'static str,
        status: Option<u16>,
        message: String,
    },

    #[error("GRID GraphQL errors: {0}")]
    GraphQl(String),

    #[error("Failed to parse response: {0}")]
    Parse(String),
}

impl ScoutError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ScoutError::Configuration(_) => ErrorKind::Configuration,
            ScoutError::Authentication(_) => ErrorKind::Authentication,
            ScoutError::EntityNotFound { .. }
            | ScoutError::NoRecentMatches { .. }
            | ScoutError::NoSeriesData { .. } => ErrorKind::NotFound,
            ScoutError::Upstream { .. } | ScoutError::GraphQl(_) => ErrorKind::Upstream,
            ScoutError::Parse(_) => ErrorKind::Parse,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }

    /// Errors that would fail identically for any other team name.
    /// Fallback loops stop on these instead of trying the next name.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::Configuration | ErrorKind::Authentication
        )
    }

    /// The single consolidated message shown for a failed action
    pub fn user_message(&self) -> String {
        match self.kind() {
            ErrorKind::Authentication => "AUTH_ERROR: Invalid API key credentials.".to_string(),
            ErrorKind::Configuration => format!("CONFIG_ERROR: {}", self),
            ErrorKind::NotFound => format!("NO_DATA: {}", self),
            ErrorKind::Upstream | ErrorKind::Parse => format!("SYSTEM_ERROR: {}", self),
        }
    }

    /// Get detailed diagnostic information about the error
    pub fn diagnostics(&self) -> String {
        let kind = self.kind();
        format!(
            "{} Error\nError: {}\nSuggestion: {}",
            kind.display_name(),
            self,
            kind.suggestion()
        )
    }

    pub(crate) fn upstream(service: &'static str, status: Option<u16>, message: impl Into<String>) -> Self {
        ScoutError::Upstream {
            service,
            status,
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for ScoutError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            return ScoutError::Parse(err.to_string());
        }
        ScoutError::upstream("HTTP", err.status().map(|s| s.as_u16()), err.to_string())
    }
}

impl From<serde_json::Error> for ScoutError {
    fn from(err: serde_json::Error) -> Self {
        ScoutError::Parse(err.to_string())
    }
}

fn status_label(status: &Option<u16>) -> String {
    status
        .map(|s| s.to_string())
        .unwrap_or_else(|| "no response".to_string())
}

pub type Result<T, E = ScoutError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_variants_share_kind() {
        let a = ScoutError::NoRecentMatches {
            team: "Sentinels".into(),
            game: Game::Valorant,
        };
        let b = ScoutError::NoSeriesData {
            team: "Sentinels".into(),
            game: Game::Valorant,
        };
        assert_eq!(a.kind(), ErrorKind::NotFound);
        assert_eq!(b.kind(), ErrorKind::NotFound);
        // The two messages must stay distinguishable
        assert_ne!(a.to_string(), b.to_string());
        assert!(a.to_string().contains("no recent"));
    }

    #[test]
    fn test_auth_message_is_distinct() {
        let err = ScoutError::Authentication("bad key".into());
        assert_eq!(err.user_message(), "AUTH_ERROR: Invalid API key credentials.");
        assert!(err.is_terminal());
    }

    #[test]
    fn test_upstream_display() {
        let err = ScoutError::upstream("GRID", Some(503), "unavailable");
        assert_eq!(err.to_string(), "GRID returned 503: unavailable");
        assert!(err.user_message().starts_with("SYSTEM_ERROR"));
        assert!(!err.is_terminal());
    }
}
