use std::sync::Arc;
use tracing::info;

use crate::aggregator::StatSnapshot;
use crate::api::{GridClient, GridSource};
use crate::comparison::{ComparisonEngine, ComparisonReport};
use crate::completion::{CompletionSource, GroqClient};
use crate::config::{ScoutConfig, Thresholds, LOOKBACK_MONTHS};
use crate::errors::Result;
use crate::game::Game;
use crate::reference::ReferenceData;
use crate::report::ScoutingReport;
use crate::resolver::{EntityResolver, ResolvedIdentity};
use crate::synthesizer::ReportSynthesizer;

/// Everything one single-team scouting run produced
#[derive(Debug, Clone)]
pub struct ScoutOutcome {
    pub identity: ResolvedIdentity,
    pub snapshot: StatSnapshot,
    pub report: ScoutingReport,
}

/// Entry point for both modes. Holds no per-request state, so every call
/// reaches the remote services again.
#[derive(Clone)]
pub struct ScoutService {
    grid: Arc<dyn GridSource>,
    completion: Arc<dyn CompletionSource>,
    reference: Arc<ReferenceData>,
    thresholds: Thresholds,
    lookback_months: u32,
}

impl ScoutService {
    pub fn new(
        grid: Arc<dyn GridSource>,
        completion: Arc<dyn CompletionSource>,
        reference: Arc<ReferenceData>,
    ) -> Self {
        Self {
            grid,
            completion,
            reference,
            thresholds: Thresholds::REFERENCE,
            lookback_months: LOOKBACK_MONTHS,
        }
    }

    /// Real GRID and Groq clients with the builtin reference tables
    pub fn from_config(config: &ScoutConfig) -> Result<Self> {
        let grid = GridClient::new(config)?;
        let completion = GroqClient::new(config)?;
        Ok(Self::new(
            Arc::new(grid),
            Arc::new(completion),
            ReferenceData::builtin(),
        )
        .with_thresholds(config.thresholds)
        .with_lookback(config.lookback_months))
    }

    pub fn with_thresholds(mut self, thresholds: Thresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    pub fn with_lookback(mut self, months: u32) -> Self {
        self.lookback_months = months;
        self
    }

    pub fn reference(&self) -> &ReferenceData {
        &self.reference
    }

    /// Resolve, aggregate and synthesize. Absence of GRID data is an error
    /// here; the report is never generated from the name alone.
    pub async fn scout(&self, term: &str, game: Game, sample_size: u32) -> Result<ScoutOutcome> {
        let resolver = EntityResolver::new(self.grid.as_ref(), &self.reference)
            .with_lookback(self.lookback_months);
        let resolution = resolver.resolve(term, game).await?;

        let synthesizer = ReportSynthesizer::new(self.completion.as_ref(), &self.reference)
            .with_thresholds(self.thresholds);
        let report = synthesizer
            .synthesize(term.trim(), game, sample_size, Some(&resolution.snapshot))
            .await?;

        info!(
            term,
            team = %resolution.identity.canonical_name,
            threat = %report.tactical_insights.threat_level,
            "scouting complete"
        );

        Ok(ScoutOutcome {
            identity: resolution.identity,
            snapshot: resolution.snapshot,
            report,
        })
    }

    pub async fn compare(
        &self,
        team_a: &str,
        team_b: &str,
        game: Game,
        sample_size: u32,
    ) -> Result<ComparisonReport> {
        ComparisonEngine::new(self.grid.as_ref(), self.completion.as_ref(), &self.reference)
            .with_thresholds(self.thresholds)
            .with_lookback(self.lookback_months)
            .compare(team_a.trim(), team_b.trim(), game, sample_size)
            .await
    }
}

impl std::fmt::Debug for ScoutService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScoutService")
            .field("thresholds", &self.thresholds)
            .field("lookback_months", &self.lookback_months)
            .finish()
    }
}
