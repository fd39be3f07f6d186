//! Entity Resolver: maps a free-text search term to a team whose recent
//! series can be aggregated.
//!
//! The term is first treated as a player nickname; every matching player's
//! team yields a list of name variations. The variations are flattened into
//! one ordered [`Attempt`] plan that ends with the raw term itself, and the
//! plan is walked sequentially until the aggregator produces a snapshot.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, info, warn};

use crate::aggregator::{StatSnapshot, TeamAggregator};
use crate::api::{GridPlayer, GridSource};
use crate::config::LOOKBACK_MONTHS;
use crate::errors::{Result, ScoutError};
use crate::game::Game;
use crate::reference::ReferenceData;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ResolvedIdentity {
    /// Always equal to `variations[0]`
    pub canonical_name: String,
    pub variations: Vec<String>,
    pub team_id: Option<String>,
    /// The variation the aggregator actually matched
    pub matched_name: String,
}

/// A team reached through a player whose nickname matched the search term
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub team_name: String,
    pub is_exact: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptSource {
    /// Index into the sorted candidate list
    Candidate(usize),
    RawTerm,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attempt {
    pub name: String,
    pub source: AttemptSource,
}

/// Resolved identity plus the snapshot the winning attempt produced
#[derive(Debug, Clone)]
pub struct Resolution {
    pub identity: ResolvedIdentity,
    pub snapshot: StatSnapshot,
}

/// Players whose nickname contains the term or is contained by it,
/// exact matches first, then shorter team names.
pub fn collect_candidates(players: &[GridPlayer], term: &str) -> Vec<Candidate> {
    let wanted = term.trim().to_lowercase();
    let mut candidates: Vec<Candidate> = players
        .iter()
        .filter_map(|p| {
            let team = p.team.as_ref()?;
            let nick = p.nickname.to_lowercase();
            if nick.is_empty() || team.name.trim().is_empty() {
                return None;
            }
            if !(nick.contains(&wanted) || wanted.contains(&nick)) {
                return None;
            }
            Some(Candidate {
                team_name: team.name.clone(),
                is_exact: nick == wanted,
            })
        })
        .collect();

    candidates.sort_by_key(|c| (!c.is_exact, c.team_name.chars().count()));
    candidates
}

fn push_unique(list: &mut Vec<String>, name: &str) {
    let name = name.trim();
    if name.is_empty() {
        return;
    }
    if !list.iter().any(|n| n.eq_ignore_ascii_case(name)) {
        list.push(name.to_string());
    }
}

/// Full name, then the first word of a multi-word name, then every known
/// organization name the team name contains. A first word with no letters
/// ("100") is never used on its own.
pub fn name_variations(team_name: &str, org_names: &[String]) -> Vec<String> {
    let mut variations = Vec::new();
    push_unique(&mut variations, team_name);

    let mut words = team_name.split_whitespace();
    if let (Some(first), Some(_)) = (words.next(), words.next()) {
        if first.chars().any(char::is_alphabetic) {
            push_unique(&mut variations, first);
        }
    }

    let lowered = team_name.to_lowercase();
    for org in org_names {
        if lowered.contains(&org.to_lowercase()) {
            push_unique(&mut variations, org);
        }
    }
    variations
}

/// Every name to try, in order, each at most once. The raw term comes last.
pub fn attempt_plan(candidates: &[Candidate], term: &str, org_names: &[String]) -> Vec<Attempt> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut plan = Vec::new();

    for (idx, candidate) in candidates.iter().enumerate() {
        for name in name_variations(&candidate.team_name, org_names) {
            if seen.insert(name.to_lowercase()) {
                plan.push(Attempt {
                    name,
                    source: AttemptSource::Candidate(idx),
                });
            }
        }
    }

    let raw = term.trim();
    if !raw.is_empty() && seen.insert(raw.to_lowercase()) {
        plan.push(Attempt {
            name: raw.to_string(),
            source: AttemptSource::RawTerm,
        });
    }
    plan
}

pub struct EntityResolver<'a> {
    source: &'a dyn GridSource,
    reference: &'a ReferenceData,
    lookback_months: u32,
}

impl<'a> EntityResolver<'a> {
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

    /// Player search never blocks the team-name fallback
    async fn player_candidates(&self, term: &str, game: Game) -> Vec<Candidate> {
        match self.source.search_players(term, game).await {
            Ok(players) => {
                let candidates = collect_candidates(&players, term);
                debug!(
                    term,
                    players = players.len(),
                    candidates = candidates.len(),
                    "player search finished"
                );
                candidates
            }
            Err(e) => {
                warn!(term, error = %e, "player search failed, trying team name directly");
                Vec::new()
            }
        }
    }

    pub async fn resolve(&self, term: &str, game: Game) -> Result<Resolution> {
        let not_found = || ScoutError::EntityNotFound {
            term: term.trim().to_string(),
            game,
        };
        if term.trim().is_empty() {
            return Err(not_found());
        }

        let candidates = self.player_candidates(term, game).await;
        let plan = attempt_plan(&candidates, term, &self.reference.org_names);
        let aggregator =
            TeamAggregator::new(self.source, self.reference).with_lookback(self.lookback_months);

        for attempt in &plan {
            debug!(name = %attempt.name, source = ?attempt.source, "aggregation attempt");
            match aggregator.aggregate(&attempt.name, game).await {
                Ok(snapshot) => {
                    let variations = match attempt.source {
                        AttemptSource::Candidate(idx) => {
                            name_variations(&candidates[idx].team_name, &self.reference.org_names)
                        }
                        AttemptSource::RawTerm => vec![attempt.name.clone()],
                    };
                    info!(
                        term,
                        matched = %attempt.name,
                        team = %snapshot.team_name,
                        matches = snapshot.matches_analyzed,
                        "entity resolved"
                    );
                    let identity = ResolvedIdentity {
                        canonical_name: variations[0].clone(),
                        variations,
                        team_id: snapshot.team_id.clone(),
                        matched_name: attempt.name.clone(),
                    };
                    return Ok(Resolution { identity, snapshot });
                }
                Err(e) if e.is_terminal() => return Err(e),
                // The raw term is the last fallback, so its transport failure surfaces
                Err(e) if attempt.source == AttemptSource::RawTerm && !e.is_not_found() => {
                    return Err(e)
                }
                Err(e) => {
                    warn!(name = %attempt.name, error = %e, "aggregation attempt failed");
                }
            }
        }

        Err(not_found())
    }
}
