use tracing::{debug, info};

use crate::aggregator::StatSnapshot;
use crate::completion::CompletionSource;
use crate::config::Thresholds;
use crate::errors::Result;
use crate::game::Game;
use crate::prompt::{build_request, PromptInput};
use crate::reference::ReferenceData;
use crate::report::ScoutingReport;
use crate::scoring;

/// Turns a snapshot into a report: one completion call, boundary validation,
/// then the deterministic scores replace the model's own numbers.
pub struct ReportSynthesizer<'a> {
    completion: &'a dyn CompletionSource,
    reference: &'a ReferenceData,
    thresholds: Thresholds,
}

impl<'a> ReportSynthesizer<'a> {
    pub fn new(completion: &'a dyn CompletionSource, reference: &'a ReferenceData) -> Self {
        Self {
            completion,
            reference,
            thresholds: Thresholds::REFERENCE,
        }
    }

    pub fn with_thresholds(mut self, thresholds: Thresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    pub async fn synthesize(
        &self,
        team_name: &str,
        game: Game,
        sample_size: u32,
        snapshot: Option<&StatSnapshot>,
    ) -> Result<ScoutingReport> {
        let input = PromptInput {
            team_name,
            game,
            sample_size,
            snapshot,
        };
        let request = build_request(&input, self.reference);

        debug!(
            team = team_name,
            game = %game,
            has_snapshot = snapshot.is_some(),
            "requesting analysis"
        );
        let content = self.completion.complete(&request).await?;

        let mut report = ScoutingReport::from_completion(&content)?;
        apply_scores(&mut report, sample_size, snapshot, &self.thresholds);

        info!(
            team = %report.team_name,
            threat = %report.tactical_insights.threat_level,
            confidence = report.tactical_insights.confidence_score,
            "report synthesized"
        );
        Ok(report)
    }
}

/// Overwrite the three numbers the model is never trusted with
pub fn apply_scores(
    report: &mut ScoutingReport,
    sample_size: u32,
    snapshot: Option<&StatSnapshot>,
    thresholds: &Thresholds,
) {
    report.overall_strategy.early_game_aggression = scoring::aggression(snapshot, thresholds);
    report.tactical_insights.confidence_score = scoring::confidence(sample_size);
    report.tactical_insights.threat_level = scoring::threat_level(snapshot, thresholds);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::completion::CompletionRequest;
    use crate::errors::ScoutError;
    use crate::report::tests::SAMPLE;
    use crate::scoring::ThreatLevel;
    use async_trait::async_trait;
    use std::collections::BTreeMap;
    use std::sync::Mutex;

    struct Canned {
        reply: Result<String>,
        seen: Mutex<Vec<CompletionRequest>>,
    }

    #[async_trait]
    impl CompletionSource for Canned {
        async fn complete(&self, request: &CompletionRequest) -> Result<String> {
            self.seen.lock().unwrap().push(request.clone());
            self.reply.clone()
        }
    }

    fn canned(reply: Result<String>) -> Canned {
        Canned {
            reply,
            seen: Mutex::new(Vec::new()),
        }
    }

    fn snapshot(win_rate: f64) -> StatSnapshot {
        StatSnapshot {
            team_name: "Sentinels".into(),
            team_id: Some("97".into()),
            game: Game::Valorant,
            matches_analyzed: 10,
            win_rate,
            map_win_rates: BTreeMap::new(),
            roster: vec!["zekken".into()],
            recent_matches: vec![],
        }
    }

    #[tokio::test]
    async fn test_scores_are_overwritten() {
        let source = canned(Ok(SAMPLE.to_string()));
        let reference = ReferenceData::builtin();
        let synth = ReportSynthesizer::new(&source, &reference);

        let snap = snapshot(0.6);
        let report = synth
            .synthesize("Sentinels", Game::Valorant, 10, Some(&snap))
            .await
            .unwrap();

        assert_eq!(report.overall_strategy.early_game_aggression, 69);
        assert_eq!(report.tactical_insights.confidence_score, 96);
        assert_eq!(report.tactical_insights.threat_level, ThreatLevel::Elevated);
        // Narrative is left alone
        assert_eq!(report.tactical_insights.weaknesses.len(), 2);

        let seen = source.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert!(seen[0].system.contains("\"win_rate\": 0.6"));
    }

    #[tokio::test]
    async fn test_defaults_without_snapshot() {
        let source = canned(Ok(SAMPLE.to_string()));
        let reference = ReferenceData::builtin();
        let synth = ReportSynthesizer::new(&source, &reference);

        let report = synth
            .synthesize("Sentinels", Game::Valorant, 3, None)
            .await
            .unwrap();
        assert_eq!(report.overall_strategy.early_game_aggression, 50);
        assert_eq!(report.tactical_insights.confidence_score, 65);
        assert_eq!(report.tactical_insights.threat_level, ThreatLevel::Moderate);
    }

    #[tokio::test]
    async fn test_auth_error_passes_through() {
        let source = canned(Err(ScoutError::Authentication("401".into())));
        let reference = ReferenceData::builtin();
        let synth = ReportSynthesizer::new(&source, &reference);

        let err = synth
            .synthesize("Sentinels", Game::Valorant, 10, None)
            .await
            .unwrap_err();
        assert!(matches!(err, ScoutError::Authentication(_)));
    }

    #[tokio::test]
    async fn test_malformed_completion_is_fatal() {
        let source = canned(Ok("{\"teamName\": \"Sentinels\"}".to_string()));
        let reference = ReferenceData::builtin();
        let synth = ReportSynthesizer::new(&source, &reference);

        let err = synth
            .synthesize("Sentinels", Game::Valorant, 10, None)
            .await
            .unwrap_err();
        assert!(matches!(err, ScoutError::Parse(_)));
    }
}
