//! Play-session detection.
//!
//! Attempts of a scenario played close together are folded into one
//! [`MergedSessionRecord`] so that the trend line follows sittings rather
//! than individual runs.

use chrono::{NaiveDateTime, TimeDelta};
use report_core::models::{MergedSessionRecord, StatRecord};
use report_core::trends::TrendCalculator;
use tracing::debug;

/// Attempts within this many hours of a session's first attempt belong to it.
pub const DEFAULT_TIME_THRESHOLD_HOURS: i64 = 2;

// ── SessionMerger ─────────────────────────────────────────────────────────────

/// Greedy anchor-based clustering of records by timestamp.
pub struct SessionMerger {
    time_threshold: TimeDelta,
}

impl Default for SessionMerger {
    fn default() -> Self {
        Self::new(TimeDelta::hours(DEFAULT_TIME_THRESHOLD_HOURS))
    }
}

impl SessionMerger {
    pub fn new(time_threshold: TimeDelta) -> Self {
        Self { time_threshold }
    }

    pub fn time_threshold(&self) -> TimeDelta {
        self.time_threshold
    }

    /// Merge `records` into play sessions.
    ///
    /// The first remaining record becomes the anchor; every other remaining
    /// record within the threshold of the anchor (inclusive, either
    /// direction) joins its cluster. Distance is measured to the anchor only,
    /// so a chain of attempts each 1h apart is split after the second hour.
    /// Output follows anchor order, which is chronological for sorted input.
    pub fn merge<R: StatRecord>(&self, records: Vec<R>) -> Vec<MergedSessionRecord> {
        let input_len = records.len();
        let mut pool = records;
        let mut merged = Vec::new();

        while !pool.is_empty() {
            let anchor = pool.remove(0);
            let anchor_ts = anchor.timestamp();

            let (joined, rest): (Vec<R>, Vec<R>) = pool
                .into_iter()
                .partition(|r| (r.timestamp() - anchor_ts).abs() <= self.time_threshold);
            pool = rest;

            let mut cluster = Vec::with_capacity(joined.len() + 1);
            cluster.push(anchor);
            cluster.extend(joined);
            merged.push(Self::reduce(&cluster));
        }

        debug!(
            "SessionMerger: merged {} records into {} sessions",
            input_len,
            merged.len()
        );
        merged
    }

    /// Collapse a non-empty cluster (anchor first) into one record.
    fn reduce<R: StatRecord>(cluster: &[R]) -> MergedSessionRecord {
        let stats = TrendCalculator::calculate(cluster, None)
            .map(|summary| summary.average)
            .unwrap_or_else(|_| cluster[0].stats());

        MergedSessionRecord {
            timestamp: mean_timestamp(cluster),
            stats,
            sessions: cluster.iter().map(StatRecord::sessions).sum(),
        }
    }
}

/// Mean of the cluster's timestamps, computed as the first timestamp plus
/// the mean millisecond offset of every member.
fn mean_timestamp<R: StatRecord>(cluster: &[R]) -> NaiveDateTime {
    let base = cluster[0].timestamp();
    let total_ms: i64 = cluster
        .iter()
        .map(|r| (r.timestamp() - base).num_milliseconds())
        .sum();
    let mean_ms = total_ms / cluster.len() as i64;
    base + TimeDelta::milliseconds(mean_ms)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
