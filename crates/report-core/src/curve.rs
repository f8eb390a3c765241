//! Plot-ready score series: raw points, trailing moving average, and a dense
//! spline resampling of both for a smooth trend line.

use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::models::StatRecord;
use crate::spline::QuadraticSpline;
use crate::trends::mean;

/// Trailing window used for the moving-average line.
pub const DEFAULT_AVERAGE_THRESHOLD: usize = 20;

/// Number of samples in each resampled series.
pub const RESAMPLE_POINTS: usize = 500;

/// Fewer records than this are drawn as a plain line.
pub const MIN_SMOOTH_POINTS: usize = 3;

const MILLIS_PER_DAY: f64 = 86_400_000.0;

// ── Time axis ─────────────────────────────────────────────────────────────────

/// Convert a timestamp to fractional days since the Unix epoch, the x axis
/// the spline is fitted over.
pub fn plot_days(ts: NaiveDateTime) -> f64 {
    ts.and_utc().timestamp_millis() as f64 / MILLIS_PER_DAY
}

/// Inverse of [`plot_days`], rounded to the millisecond.
pub fn from_plot_days(days: f64) -> Option<NaiveDateTime> {
    DateTime::from_timestamp_millis((days * MILLIS_PER_DAY).round() as i64).map(|d| d.naive_utc())
}

/// `count` evenly spaced values from `start` to `end` inclusive.
pub fn linspace(start: f64, end: f64, count: usize) -> Vec<f64> {
    match count {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (count - 1) as f64;
            (0..count).map(|i| start + step * i as f64).collect()
        }
    }
}

// ── Series types ──────────────────────────────────────────────────────────────

/// A single `(timestamp, value)` sample of a plotted series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurvePoint {
    pub timestamp: NaiveDateTime,
    pub value: f64,
}

/// Dense resampling of the score and moving-average series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SmoothCurve {
    pub scores: Vec<CurvePoint>,
    pub averages: Vec<CurvePoint>,
}

/// Everything needed to draw one scenario's trend graph.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrendCurve {
    /// One point per record: the dots of the graph.
    pub points: Vec<CurvePoint>,
    /// Trailing mean of the scores, aligned with `points`.
    pub moving_average: Vec<CurvePoint>,
    /// Spline resampling; absent when there are too few records to fit one.
    pub smooth: Option<SmoothCurve>,
}

/// Mean of the inclusive trailing window `[max(0, i - threshold), i]` for
/// every index `i`.
pub fn moving_average(scores: &[f64], threshold: usize) -> Vec<f64> {
    (0..scores.len())
        .map(|i| mean(&scores[i.saturating_sub(threshold)..=i]))
        .collect()
}

impl TrendCurve {
    /// Derive the plotted series from records ordered oldest first.
    pub fn generate<R: StatRecord>(records: &[R], average_threshold: usize) -> Self {
        let timestamps: Vec<NaiveDateTime> = records.iter().map(|r| r.timestamp()).collect();
        let scores: Vec<f64> = records.iter().map(|r| r.stats().score).collect();
        let averages = moving_average(&scores, average_threshold);

        let points = zip_points(&timestamps, &scores);
        let moving_average = zip_points(&timestamps, &averages);

        let smooth = if records.len() >= MIN_SMOOTH_POINTS {
            let xs: Vec<f64> = timestamps.iter().map(|t| plot_days(*t)).collect();
            match resample(&xs, &scores, &averages) {
                Ok(smooth) => Some(smooth),
                Err(e) => {
                    warn!("Falling back to a plain trend line: {}", e);
                    None
                }
            }
        } else {
            None
        };

        Self {
            points,
            moving_average,
            smooth,
        }
    }

    /// Score values in record order.
    pub fn scores(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.iter().map(|p| p.value)
    }
}

fn zip_points(timestamps: &[NaiveDateTime], values: &[f64]) -> Vec<CurvePoint> {
    timestamps
        .iter()
        .zip(values)
        .map(|(&timestamp, &value)| CurvePoint { timestamp, value })
        .collect()
}

fn resample(xs: &[f64], scores: &[f64], averages: &[f64]) -> crate::error::Result<SmoothCurve> {
    let score_spline = QuadraticSpline::interpolate(xs, scores)?;
    let average_spline = QuadraticSpline::interpolate(xs, averages)?;

    let grid = linspace(xs[0], xs[xs.len() - 1], RESAMPLE_POINTS);
    let sample = |spline: &QuadraticSpline| -> Vec<CurvePoint> {
        grid.iter()
            .filter_map(|&x| {
                from_plot_days(x).map(|timestamp| CurvePoint {
                    timestamp,
                    value: spline.evaluate(x),
                })
            })
            .collect()
    };

    Ok(SmoothCurve {
        scores: sample(&score_spline),
        averages: sample(&average_spline),
    })
}

// ── Axis ticks ────────────────────────────────────────────────────────────────

/// One x-axis tick, labelled with how many days before `now` it lies.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeTick {
    pub timestamp: NaiveDateTime,
    /// Whole days from `now` (negative for the past), rounded down.
    pub days_from_now: i64,
}

/// Tick positions for the trend graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisTicks {
    /// Five scores evenly spaced from the lowest to the highest.
    pub y: Vec<f64>,
    /// First point, the midpoint, two successive halvings toward the last
    /// point, and the last point.
    pub x: Vec<TimeTick>,
}

impl AxisTicks {
    /// Compute ticks for `curve`. Returns `None` when the curve has no points.
    pub fn compute(curve: &TrendCurve, now: NaiveDateTime) -> Option<Self> {
        let min_score = curve.scores().min_by(f64::total_cmp)?;
        let max_score = curve.scores().max_by(f64::total_cmp)?;
        let y = (0..=4)
            .map(|i| (max_score - min_score) / 4.0 * f64::from(i) + min_score)
            .collect();

        let xs: Vec<f64> = curve.points.iter().map(|p| plot_days(p.timestamp)).collect();
        let x_min = xs.iter().copied().min_by(f64::total_cmp)?;
        let x_max = xs.iter().copied().max_by(f64::total_cmp)?;
        let tick1 = 0.5 * (x_max - x_min) + x_min;
        let tick2 = 0.5 * (x_max - tick1) + tick1;
        let tick3 = 0.5 * (x_max - tick2) + tick2;

        let now_days = plot_days(now);
        let x = [x_min, tick1, tick2, tick3, x_max]
            .into_iter()
            .filter_map(|days| {
                from_plot_days(days).map(|timestamp| TimeTick {
                    timestamp,
                    days_from_now: (days - now_days).floor() as i64,
                })
            })
            .collect();

        Some(Self { y, x })
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
