use crate::aggregator::StatSnapshot;
use crate::comparison::ComparisonReport;
use crate::errors::{ErrorKind, ScoutError};
use crate::report::ScoutingReport;
use crate::resolver::ResolvedIdentity;
use crate::service::ScoutOutcome;

/// What the front-end shows for the current search.
/// At most one of report or comparison is populated, and never alongside an error.
#[derive(Debug, Default, Clone)]
pub struct ScoutSession {
    /// A generate action is in flight
    pub is_generating: bool,
    pub identity: Option<ResolvedIdentity>,
    pub report: Option<ScoutingReport>,
    /// Raw aggregation data for the optional raw-data view
    pub snapshot: Option<StatSnapshot>,
    pub comparison: Option<ComparisonReport>,
    /// Consolidated user-facing message
    pub error: Option<String>,
    pub error_kind: Option<ErrorKind>,
}

impl ScoutSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every result and error
    pub fn clear(&mut self) {
        self.is_generating = false;
        self.identity = None;
        self.report = None;
        self.snapshot = None;
        self.comparison = None;
        self.error = None;
        self.error_kind = None;
    }

    /// Start a new search; anything from the previous one is discarded
    pub fn begin(&mut self) {
        self.clear();
        self.is_generating = true;
    }

    pub fn finish_report(&mut self, outcome: ScoutOutcome) {
        self.clear();
        self.identity = Some(outcome.identity);
        self.snapshot = Some(outcome.snapshot);
        self.report = Some(outcome.report);
    }

    pub fn finish_comparison(&mut self, comparison: ComparisonReport) {
        self.clear();
        self.comparison = Some(comparison);
    }

    pub fn fail(&mut self, err: &ScoutError) {
        self.clear();
        self.error = Some(err.user_message());
        self.error_kind = Some(err.kind());
    }

    pub fn has_result(&self) -> bool {
        self.report.is_some() || self.comparison.is_some()
    }
}
