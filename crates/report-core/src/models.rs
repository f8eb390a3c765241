use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::curve::TrendCurve;

/// Number of numeric fields carried by a [`SessionStats`].
pub const STAT_FIELD_COUNT: usize = 8;

/// Field names in the order used by [`SessionStats::to_array`].
pub const STAT_FIELD_NAMES: [&str; STAT_FIELD_COUNT] = [
    "shots",
    "hits",
    "accuracy",
    "damage_done",
    "damage_possible",
    "kills",
    "avg_time_to_kill",
    "score",
];

/// The numeric part of a session: either one attempt's values, a per-field
/// mean, or a per-field standard deviation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionStats {
    pub shots: f64,
    pub hits: f64,
    /// Fraction of shots that hit, in `[0, 1]`.
    pub accuracy: f64,
    pub damage_done: f64,
    pub damage_possible: f64,
    pub kills: f64,
    /// Average time to kill, in seconds.
    pub avg_time_to_kill: f64,
    pub score: f64,
}

impl SessionStats {
    /// Fields in [`STAT_FIELD_NAMES`] order.
    pub fn to_array(&self) -> [f64; STAT_FIELD_COUNT] {
        [
            self.shots,
            self.hits,
            self.accuracy,
            self.damage_done,
            self.damage_possible,
            self.kills,
            self.avg_time_to_kill,
            self.score,
        ]
    }

    /// Inverse of [`SessionStats::to_array`].
    pub fn from_array(values: [f64; STAT_FIELD_COUNT]) -> Self {
        let [shots, hits, accuracy, damage_done, damage_possible, kills, avg_time_to_kill, score] =
            values;
        Self {
            shots,
            hits,
            accuracy,
            damage_done,
            damage_possible,
            kills,
            avg_time_to_kill,
            score,
        }
    }
}

/// Interface shared by raw and merged records so that trend and merge logic
/// can run over either.
pub trait StatRecord {
    /// When the session was played.
    fn timestamp(&self) -> NaiveDateTime;
    /// The numeric fields of the session.
    fn stats(&self) -> SessionStats;
    /// How many raw sessions this record stands for.
    fn sessions(&self) -> usize {
        1
    }
}

/// One parsed session log file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawSessionRecord {
    /// Local date and time taken from the file name.
    pub timestamp: NaiveDateTime,
    pub shots: u32,
    pub hits: u32,
    /// `hits / shots`, or `1.0` when no shot was fired.
    pub accuracy: f64,
    pub damage_done: f64,
    pub damage_possible: f64,
    pub kills: u32,
    pub avg_time_to_kill: f64,
    pub score: f64,
}

/// Accuracy as the log format defines it: a session without shots counts as
/// fully accurate.
pub fn accuracy(shots: u32, hits: u32) -> f64 {
    if shots > 0 {
        f64::from(hits) / f64::from(shots)
    } else {
        1.0
    }
}

impl StatRecord for RawSessionRecord {
    fn timestamp(&self) -> NaiveDateTime {
        self.timestamp
    }

    fn stats(&self) -> SessionStats {
        SessionStats {
            shots: f64::from(self.shots),
            hits: f64::from(self.hits),
            accuracy: self.accuracy,
            damage_done: self.damage_done,
            damage_possible: self.damage_possible,
            kills: f64::from(self.kills),
            avg_time_to_kill: self.avg_time_to_kill,
            score: self.score,
        }
    }
}

/// One detected play session: the mean of every raw session played within
/// the merge threshold of its anchor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergedSessionRecord {
    /// Mean timestamp of the constituent sessions.
    pub timestamp: NaiveDateTime,
    /// Per-field mean of the constituent sessions.
    pub stats: SessionStats,
    /// Number of raw sessions folded into this record.
    pub sessions: usize,
}

impl StatRecord for MergedSessionRecord {
    fn timestamp(&self) -> NaiveDateTime {
        self.timestamp
    }

    fn stats(&self) -> SessionStats {
        self.stats
    }

    fn sessions(&self) -> usize {
        self.sessions
    }
}

/// Mean and sample standard deviation over a window of records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TrendSummary {
    pub average: SessionStats,
    pub stdev: SessionStats,
}

/// Everything the renderer needs for one scenario.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioDataBundle {
    /// Scenario name as it appears in the log file names.
    pub scenario: String,
    /// All merged sessions, oldest first.
    pub all: Vec<MergedSessionRecord>,
    /// The most recent (at most 20) merged sessions.
    pub last20: Vec<MergedSessionRecord>,
    /// Trends over `all`.
    pub total_trends: TrendSummary,
    /// Trends over `last20`.
    pub last20_trends: TrendSummary,
    /// Plot-ready series derived from `all`.
    pub curve: TrendCurve,
}
