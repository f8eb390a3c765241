use crate::error::{ReportError, Result};
use crate::models::{SessionStats, StatRecord, TrendSummary, STAT_FIELD_COUNT};

// ── Statistics helpers ────────────────────────────────────────────────────────

/// Arithmetic mean of `values`. Returns `0.0` for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (N−1 denominator).
///
/// Returns `0.0` when fewer than two values are given.
pub fn sample_stdev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let sum_sq: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    (sum_sq / (values.len() - 1) as f64).sqrt()
}

// ── TrendCalculator ───────────────────────────────────────────────────────────

/// Stateless mean / standard-deviation summaries over record windows.
pub struct TrendCalculator;

impl TrendCalculator {
    /// Select the window of `records` that a trend is computed over.
    ///
    /// * `None` selects every record.
    /// * `Some(0)` is rejected with [`ReportError::InvalidWindow`].
    /// * `Some(n)` selects the last `min(len, n)` records.
    pub fn window<R>(records: &[R], last_n: Option<usize>) -> Result<&[R]> {
        match last_n {
            None => Ok(records),
            Some(0) => Err(ReportError::InvalidWindow(0)),
            Some(n) => {
                let start = records.len().saturating_sub(n);
                Ok(&records[start..])
            }
        }
    }

    /// Compute the per-field average and sample standard deviation over the
    /// selected window. Timestamps are not part of the summary.
    ///
    /// A window of one record yields that record's stats as the average and
    /// zero for every standard deviation.
    pub fn calculate<R: StatRecord>(records: &[R], last_n: Option<usize>) -> Result<TrendSummary> {
        let window = Self::window(records, last_n)?;

        match window {
            [] => Err(ReportError::EmptyWindow),
            [only] => Ok(TrendSummary {
                average: only.stats(),
                stdev: SessionStats::default(),
            }),
            _ => {
                let rows: Vec<[f64; STAT_FIELD_COUNT]> =
                    window.iter().map(|r| r.stats().to_array()).collect();

                let mut averages = [0.0; STAT_FIELD_COUNT];
                let mut stdevs = [0.0; STAT_FIELD_COUNT];
                for field in 0..STAT_FIELD_COUNT {
                    let column: Vec<f64> = rows.iter().map(|row| row[field]).collect();
                    averages[field] = mean(&column);
                    stdevs[field] = sample_stdev(&column);
                }

                Ok(TrendSummary {
                    average: SessionStats::from_array(averages),
                    stdev: SessionStats::from_array(stdevs),
                })
            }
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MergedSessionRecord;
    use chrono::{NaiveDate, NaiveDateTime};

    fn at(hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn record(hour: u32, score: f64, kills: f64) -> MergedSessionRecord {
        MergedSessionRecord {
            timestamp: at(hour),
            stats: SessionStats {
                shots: 100.0,
                hits: 50.0,
                accuracy: 0.5,
                damage_done: 500.0,
                damage_possible: 1000.0,
                kills,
                avg_time_to_kill: 1.2,
                score,
            },
            sessions: 1,
        }
    }

    // ── helpers ──────────────────────────────────────────────────────────────

    #[test]
    fn test_mean_basic() {
        assert!((mean(&[1.0, 2.0, 3.0, 4.0]) - 2.5).abs() < 1e-12);
        assert_eq!(mean(&[]), 0.0);
    }

    #[test]
    fn test_sample_stdev_uses_n_minus_one() {
        // Values 2,4,4,4,5,5,7,9: population sd = 2, sample sd = sqrt(32/7).
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let expected = (32.0_f64 / 7.0).sqrt();
        assert!((sample_stdev(&values) - expected).abs() < 1e-12);
    }

    #[test]
    fn test_sample_stdev_single_value_is_zero() {
        assert_eq!(sample_stdev(&[42.0]), 0.0);
    }

    // ── window ───────────────────────────────────────────────────────────────

    #[test]
    fn test_window_none_is_full_list() {
        let records = vec![record(1, 1.0, 1.0), record(2, 2.0, 1.0)];
        assert_eq!(TrendCalculator::window(&records, None).unwrap().len(), 2);
    }

    #[test]
    fn test_window_zero_is_invalid() {
        let records = vec![record(1, 1.0, 1.0)];
        let err = TrendCalculator::window(&records, Some(0)).unwrap_err();
        assert!(matches!(err, ReportError::InvalidWindow(0)));
    }

    #[test]
    fn test_window_takes_suffix() {
        let records: Vec<_> = (0..5).map(|h| record(h, h as f64, 1.0)).collect();
        let window = TrendCalculator::window(&records, Some(2)).unwrap();
        assert_eq!(window.len(), 2);
        assert_eq!(window[0].stats.score, 3.0);
        assert_eq!(window[1].stats.score, 4.0);
    }

    // ── calculate ────────────────────────────────────────────────────────────

    #[test]
    fn test_single_record_has_zero_stdev() {
        let records = vec![record(9, 77.0, 5.0)];
        let summary = TrendCalculator::calculate(&records, None).unwrap();
        assert_eq!(summary.average, records[0].stats);
        assert_eq!(summary.stdev, SessionStats::default());
    }

    #[test]
    fn test_mean_and_stdev_per_field() {
        let records = vec![record(1, 80.0, 10.0), record(2, 90.0, 20.0), record(3, 100.0, 30.0)];
        let summary = TrendCalculator::calculate(&records, None).unwrap();
        assert!((summary.average.score - 90.0).abs() < 1e-12);
        assert!((summary.average.kills - 20.0).abs() < 1e-12);
        assert!((summary.stdev.score - 10.0).abs() < 1e-12);
        assert!((summary.stdev.kills - 10.0).abs() < 1e-12);
        // Identical columns have no spread.
        assert_eq!(summary.stdev.shots, 0.0);
        assert_eq!(summary.average.accuracy, 0.5);
    }

    #[test]
    fn test_window_larger_than_list_matches_no_window() {
        let records = vec![record(1, 80.0, 10.0), record(2, 95.0, 14.0)];
        let full = TrendCalculator::calculate(&records, None).unwrap();
        let windowed = TrendCalculator::calculate(&records, Some(20)).unwrap();
        assert_eq!(full, windowed);
    }

    #[test]
    fn test_last_n_one_behaves_as_single_record() {
        let records = vec![record(1, 80.0, 10.0), record(2, 95.0, 14.0)];
        let summary = TrendCalculator::calculate(&records, Some(1)).unwrap();
        assert_eq!(summary.average.score, 95.0);
        assert_eq!(summary.stdev.score, 0.0);
    }

    #[test]
    fn test_zero_window_rejected() {
        let records = vec![record(1, 80.0, 10.0)];
        assert!(matches!(
            TrendCalculator::calculate(&records, Some(0)),
            Err(ReportError::InvalidWindow(0))
        ));
    }

    #[test]
    fn test_empty_records_rejected() {
        let records: Vec<MergedSessionRecord> = Vec::new();
        assert!(matches!(
            TrendCalculator::calculate(&records, None),
            Err(ReportError::EmptyWindow)
        ));
    }
}
