//! Rank report assembly.
//!
//! Walks a rank's playlist discipline by discipline, aggregates every
//! scenario and packages the result as a [`RankReport`] ready for the page
//! and graph renderer.

use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use report_core::curve::AxisTicks;
use report_core::error::{ReportError, Result};
use report_core::formatting::format_stat;
use report_core::models::{MergedSessionRecord, ScenarioDataBundle, TrendSummary};
use report_core::playlists::{ChartStyle, Discipline, Rank, RankPlaylist};
use serde::Serialize;
use tracing::{error, info};

use crate::aggregator::{AggregatorConfig, ScenarioAggregator};
use crate::reader::StatsIndex;

// ── OutputLayout ──────────────────────────────────────────────────────────────

/// Where report artifacts go, rooted at `<output_dir>/report_files`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLayout {
    pub report_files: PathBuf,
    pub imgs: PathBuf,
    pub pages: PathBuf,
}

impl OutputLayout {
    pub fn new(output_dir: &Path) -> Self {
        let report_files = output_dir.join("report_files");
        Self {
            imgs: report_files.join("imgs"),
            pages: report_files.join("pages"),
            report_files,
        }
    }

    /// Target of a scenario's graph image.
    pub fn image_path(&self, scenario: &str) -> PathBuf {
        self.imgs.join(format!("{scenario}.png"))
    }

    /// Target of a rank's report page.
    pub fn page_path(&self, rank: Rank) -> PathBuf {
        self.pages.join(page_file_name(rank))
    }

    /// Target of the navigation index.
    pub fn index_path(&self) -> PathBuf {
        self.report_files.join("index.json")
    }
}

fn page_file_name(rank: Rank) -> String {
    format!("report_{}.json", rank.as_str())
}

// ── Report types ──────────────────────────────────────────────────────────────

/// One cell of a score table: the raw value and its display text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatCell {
    pub value: f64,
    pub display: String,
}

impl From<f64> for StatCell {
    fn from(value: f64) -> Self {
        Self {
            value,
            display: format_stat(value),
        }
    }
}

/// Max, min, average and standard deviation of the score over a window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreTable {
    pub max: StatCell,
    pub min: StatCell,
    pub average: StatCell,
    pub stdev: StatCell,
}

impl ScoreTable {
    /// Build a table from the sessions of a window and their trend summary.
    /// Returns `None` for an empty window.
    pub fn from_window(records: &[MergedSessionRecord], trends: &TrendSummary) -> Option<Self> {
        let scores = records.iter().map(|r| r.stats.score);
        let max = scores.clone().max_by(f64::total_cmp)?;
        let min = scores.min_by(f64::total_cmp)?;
        Some(Self {
            max: max.into(),
            min: min.into(),
            average: trends.average.score.into(),
            stdev: trends.stdev.score.into(),
        })
    }
}

/// Instructions for drawing one scenario's trend graph.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphRequest {
    pub image_path: PathBuf,
    pub style: ChartStyle,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ScenarioOutcome {
    Data {
        bundle: Box<ScenarioDataBundle>,
        axes: Option<AxisTicks>,
        all_time: ScoreTable,
        recent: ScoreTable,
        graph: GraphRequest,
    },
    /// No log file carries this scenario's name.
    NoData,
    /// At least one of the scenario's logs could not be parsed.
    Failed { reason: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct ScenarioReport {
    pub name: String,
    pub outcome: ScenarioOutcome,
}

#[derive(Debug, Clone, Serialize)]
pub struct DisciplineSection {
    pub discipline: Discipline,
    pub title: &'static str,
    pub style: ChartStyle,
    pub scenarios: Vec<ScenarioReport>,
}

/// Everything shown on one rank's page.
#[derive(Debug, Clone, Serialize)]
pub struct RankReport {
    pub rank: Rank,
    pub title: &'static str,
    pub generated_at: NaiveDateTime,
    pub sections: Vec<DisciplineSection>,
}

impl RankReport {
    /// Scenarios with data, across all sections.
    pub fn scenarios_with_data(&self) -> usize {
        self.sections
            .iter()
            .flat_map(|s| &s.scenarios)
            .filter(|s| matches!(s.outcome, ScenarioOutcome::Data { .. }))
            .count()
    }
}

/// Navigation entry for one rank page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexEntry {
    pub rank: Rank,
    pub title: &'static str,
    /// Page location relative to `report_files/`.
    pub page: PathBuf,
    pub scenarios_with_data: usize,
}

/// Links to every rank page written in a run, lowest tier first.
#[derive(Debug, Clone, Serialize)]
pub struct ReportIndex {
    pub generated_at: NaiveDateTime,
    pub pages: Vec<IndexEntry>,
}

impl ReportIndex {
    pub fn new(generated_at: NaiveDateTime) -> Self {
        Self {
            generated_at,
            pages: Vec::new(),
        }
    }

    pub fn add(&mut self, report: &RankReport) {
        self.pages.push(IndexEntry {
            rank: report.rank,
            title: report.title,
            page: Path::new("pages").join(page_file_name(report.rank)),
            scenarios_with_data: report.scenarios_with_data(),
        });
        self.pages.sort_by_key(|entry| entry.rank);
    }
}

// ── Builder ───────────────────────────────────────────────────────────────────

/// Build the report of one rank tier.
///
/// Missing scenarios become [`ScenarioOutcome::NoData`] and malformed ones
/// [`ScenarioOutcome::Failed`]; the remaining scenarios are still built.
/// Any other error aborts the rank.
pub fn build_rank_report(
    rank: Rank,
    playlist: &RankPlaylist,
    index: &StatsIndex,
    config: &AggregatorConfig,
    layout: &OutputLayout,
    now: NaiveDateTime,
) -> Result<RankReport> {
    let aggregator = ScenarioAggregator::new(index, *config);

    let sections = Discipline::ALL
        .into_iter()
        .map(|discipline| {
            let style = discipline.style();
            let scenarios = playlist
                .scenarios(discipline)
                .iter()
                .map(|name| {
                    let outcome = scenario_outcome(&aggregator, name, style, layout, now)?;
                    Ok(ScenarioReport {
                        name: name.clone(),
                        outcome,
                    })
                })
                .collect::<Result<Vec<_>>>()?;
            Ok(DisciplineSection {
                discipline,
                title: discipline.title(),
                style,
                scenarios,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let report = RankReport {
        rank,
        title: rank.title(),
        generated_at: now,
        sections,
    };
    info!(
        "Built {} report: {} of {} scenarios with data",
        rank,
        report.scenarios_with_data(),
        playlist.len()
    );
    Ok(report)
}

fn scenario_outcome(
    aggregator: &ScenarioAggregator<'_>,
    name: &str,
    style: ChartStyle,
    layout: &OutputLayout,
    now: NaiveDateTime,
) -> Result<ScenarioOutcome> {
    let bundle = match aggregator.aggregate(name) {
        Ok(bundle) => bundle,
        Err(ReportError::NoDataFound(_)) => {
            info!("{}: Data not found.", name);
            return Ok(ScenarioOutcome::NoData);
        }
        Err(e @ ReportError::Parse { .. }) => {
            error!("{}: {}", name, e);
            return Ok(ScenarioOutcome::Failed {
                reason: e.to_string(),
            });
        }
        Err(e) => return Err(e),
    };

    let (Some(all_time), Some(recent)) = (
        ScoreTable::from_window(&bundle.all, &bundle.total_trends),
        ScoreTable::from_window(&bundle.last20, &bundle.last20_trends),
    ) else {
        return Ok(ScenarioOutcome::NoData);
    };

    Ok(ScenarioOutcome::Data {
        axes: AxisTicks::compute(&bundle.curve, now),
        all_time,
        recent,
        graph: GraphRequest {
            image_path: layout.image_path(name),
            style,
        },
        bundle: Box::new(bundle),
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
