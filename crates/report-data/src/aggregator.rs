//! Per-scenario aggregation: read every log of a scenario, merge them into
//! play sessions and derive the trend summaries and graph series.

use chrono::TimeDelta;
use report_core::curve::{TrendCurve, DEFAULT_AVERAGE_THRESHOLD};
use report_core::error::{ReportError, Result};
use report_core::models::{RawSessionRecord, ScenarioDataBundle};
use report_core::trends::TrendCalculator;
use tracing::debug;

use crate::merger::{SessionMerger, DEFAULT_TIME_THRESHOLD_HOURS};
use crate::reader::{read_session, StatsIndex};

/// Number of most recent sessions in the "recent" summary.
pub const DEFAULT_RECENT_WINDOW: usize = 20;

// ── AggregatorConfig ──────────────────────────────────────────────────────────

/// Tuning knobs of [`ScenarioAggregator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AggregatorConfig {
    /// Maximum distance from a session's first attempt.
    pub time_threshold: TimeDelta,
    /// Size of the recent-sessions window; must be non-zero.
    pub recent_window: usize,
    /// Trailing window of the moving average.
    pub average_threshold: usize,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            time_threshold: TimeDelta::hours(DEFAULT_TIME_THRESHOLD_HOURS),
            recent_window: DEFAULT_RECENT_WINDOW,
            average_threshold: DEFAULT_AVERAGE_THRESHOLD,
        }
    }
}

// ── ScenarioAggregator ────────────────────────────────────────────────────────

/// Builds [`ScenarioDataBundle`]s from a shared [`StatsIndex`].
pub struct ScenarioAggregator<'a> {
    index: &'a StatsIndex,
    config: AggregatorConfig,
    merger: SessionMerger,
}

impl<'a> ScenarioAggregator<'a> {
    pub fn new(index: &'a StatsIndex, config: AggregatorConfig) -> Self {
        Self {
            index,
            config,
            merger: SessionMerger::new(config.time_threshold),
        }
    }

    pub fn config(&self) -> &AggregatorConfig {
        &self.config
    }

    /// Aggregate every log of `scenario`.
    ///
    /// Fails with [`ReportError::NoDataFound`] when no log matches and with
    /// the parse error of the first malformed log otherwise.
    pub fn aggregate(&self, scenario: &str) -> Result<ScenarioDataBundle> {
        let files = self.index.files_for(scenario);
        if files.is_empty() {
            return Err(ReportError::NoDataFound(scenario.to_string()));
        }

        let mut raw: Vec<RawSessionRecord> = files
            .iter()
            .map(|path| read_session(path))
            .collect::<Result<_>>()?;
        raw.sort_by_key(|r| r.timestamp);

        let all = self.merger.merge(raw);
        let last20 = TrendCalculator::window(&all, Some(self.config.recent_window))?.to_vec();
        let total_trends = TrendCalculator::calculate(&all, None)?;
        let last20_trends = TrendCalculator::calculate(&last20, None)?;
        let curve = TrendCurve::generate(&all, self.config.average_threshold);

        debug!(
            "Aggregated {}: {} files, {} sessions",
            scenario,
            files.len(),
            all.len()
        );

        Ok(ScenarioDataBundle {
            scenario: scenario.to_string(),
            all,
            last20,
            total_trends,
            last20_trends,
            curve,
        })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
