//! Prompt templates for the scouting analyst.
//!
//! The system prompt carries the rules, the data context and the patch
//! notes; the user prompt names the target. Numbers the model must not
//! invent (aggression, confidence, threat) are overwritten afterwards, so
//! the prompt only asks for plausible placeholders there.

use crate::aggregator::StatSnapshot;
use crate::completion::CompletionRequest;
use crate::game::Game;
use crate::reference::ReferenceData;

const NO_DATA_NOTICE: &str =
    "No GRID data available - generate report based on the team/player name provided";

/// Everything the prompt needs about one request
#[derive(Debug, Clone, Copy)]
pub struct PromptInput<'a> {
    pub team_name: &'a str,
    pub game: Game,
    pub sample_size: u32,
    pub snapshot: Option<&'a StatSnapshot>,
}

pub fn build_request(input: &PromptInput<'_>, reference: &ReferenceData) -> CompletionRequest {
    CompletionRequest {
        system: system_prompt(input, reference),
        user: user_prompt(input),
    }
}

fn data_context(snapshot: Option<&StatSnapshot>) -> String {
    snapshot
        .and_then(|s| serde_json::to_string_pretty(s).ok())
        .unwrap_or_else(|| NO_DATA_NOTICE.to_string())
}

fn json_shape(input: &PromptInput<'_>) -> String {
    let game = input.game;
    let roles = game.roles().join("|");
    let pick = game.pick_noun();
    let example_comp = match game {
        Game::Valorant => r#"["Jett", "Sova", "Omen", "Killjoy", "Sage"]"#,
        Game::LeagueOfLegends => r#"["K'Sante", "Lee Sin", "Ahri", "Kai'Sa", "Thresh"]"#,
    };

    format!(
        r#"{{
  "teamName": "{team}",
  "game": "{game}",
  "lastMatches": {matches},
  "overallStrategy": {{
    "macroPatterns": "Detailed description of their macro strategy",
    "objectivePriority": "High" | "Medium" | "Low",
    "earlyGameAggression": 0-100
  }},
  "playerProfiles": [
    {{
      "name": "REAL_IGN_HERE",
      "role": "{roles}",
      "mostPlayed": ["{pick}1", "{pick}2"],
      "kda": 1.42,
      "tendency": "SPECIFIC exploitable habit",
      "winRate": 65
    }}
  ],
  "topCompositions": [
    {{
      "agents": {example_comp},
      "playStyle": "Specific style (e.g. 'Split-push heavy', 'Rush B default')",
      "winRate": 72,
      "occurrence": 68
    }}
  ],
  "tacticalInsights": {{
    "strengths": ["Strength 1", "Strength 2"],
    "weaknesses": [
      "MANDATORY: Specific weakness 1 with tactical details",
      "MANDATORY: Specific weakness 2 with map/timing info"
    ],
    "howToWin": "Concrete counter-strategy",
    "counterPicks": ["{pick} 1 (Reason)", "{pick} 2 (Reason)"],
    "winCondition": "The specific condition required to win",
    "confidenceScore": 85,
    "threatLevel": "CRITICAL" | "ELEVATED" | "MODERATE" | "LOW"
  }},
  "sources": [{{"uri": "https://...", "title": "Source title"}}]
}}"#,
        team = input.team_name,
        game = game.display_name(),
        matches = input.sample_size,
    )
}

pub fn system_prompt(input: &PromptInput<'_>, reference: &ReferenceData) -> String {
    let team = input.team_name;
    let game = input.game.display_name();
    let mut prompt = String::with_capacity(4096);

    prompt.push_str(
        "You are an elite esports tactical analyst. Your job is to identify EXPLOITABLE \
         WEAKNESSES in opponent teams or players.\n\n",
    );

    prompt.push_str("CRITICAL REQUIREMENTS:\n");
    prompt.push_str(&format!(
        "1. Target identification: if \"{team}\" is a PLAYER, focus the report on that \
         individual while giving team context; if it is a TEAM, analyze the whole roster. \
         Use REAL player IGNs from the {game} pro scene.\n"
    ));
    prompt.push_str(
        "2. ALWAYS identify 2-3 SPECIFIC weaknesses. NEVER say \"No weakness identified\".\n",
    );
    prompt.push_str(
        "3. Use concrete tactical details: map locations, timing windows and \
         agent/champion specific counters.\n",
    );
    prompt.push_str(&format!(
        "4. Base the analysis on the GRID data below when present; otherwise use your \
         knowledge of {team}'s playstyle in {game}.\n\n"
    ));

    prompt.push_str("DATA CONTEXT:\n");
    prompt.push_str(&data_context(input.snapshot));
    prompt.push_str("\n\n");

    prompt.push_str(&reference.patch_context(input.game));
    prompt.push('\n');

    prompt.push_str("REQUIRED JSON STRUCTURE:\n");
    prompt.push_str(&json_shape(input));
    prompt.push_str("\n\n");

    prompt.push_str(
        "VALIDATION RULES:\n\
         - REJECT if player names contain \"Player_\" or \"Sample_\" or are templated\n\
         - REJECT if the weaknesses array is empty or says \"No weakness\"\n\
         - ACCEPT only if weaknesses are specific and exploitable\n\
         - INCLUDE counter-picks that work against their tendencies\n\
         - Respond with a single valid JSON object and nothing else",
    );

    prompt
}

pub fn user_prompt(input: &PromptInput<'_>) -> String {
    let team = input.team_name;
    let game = input.game.display_name();
    format!(
        "Generate a tactical scouting report for **{team}** in {game}.\n\n\
         REQUIREMENTS:\n\
         - Use REAL player names from {team}'s roster\n\
         - Identify AT LEAST 2 specific tactical weaknesses\n\
         - Include concrete counter-strategies with map/timing details\n\
         - Base analysis on the provided GRID match data\n\n\
         Analyze {matches} matches worth of data and provide actionable intelligence.",
        matches = input.sample_size,
    )
}
