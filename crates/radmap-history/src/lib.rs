//! # Radmap History
//!
//! Turns a raw bucketed history response into a display-ready chart
//! series: null coercion, time labels with axis thinning, and a seeded
//! synthetic fallback when the backend has too little real history to
//! draw a meaningful chart.

use chrono::{DateTime, Datelike, Timelike, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use radmap_core::AlertTier;

/// Real history shorter than this renders as a near-empty chart, so the
/// transform switches to the synthetic fallback instead.
pub const MIN_REAL_POINTS: usize = 6;

/// Chart lookback selection, with its bucketing and labelling policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timeframe {
    OneHour,
    Day,
    Week,
}

impl Timeframe {
    /// Bucket width passed to the history query.
    pub fn interval(self) -> &'static str {
        match self {
            Timeframe::OneHour => "1 minute",
            Timeframe::Day => "30 minute",
            Timeframe::Week => "2 hour",
        }
    }

    /// Lookback window passed to the history query.
    pub fn hours_behind(self) -> u32 {
        match self {
            Timeframe::OneHour => 1,
            Timeframe::Day => 24,
            Timeframe::Week => 168,
        }
    }

    /// Number of points the fallback generator synthesizes.
    pub fn fallback_points(self) -> usize {
        match self {
            Timeframe::OneHour => 15,
            Timeframe::Day => 24,
            Timeframe::Week => 14,
        }
    }

    /// Axis label for a real bucket time: zero-padded `HH:MM` for the
    /// short frames, `D/M` (no padding, no year) for the week view.
    fn bucket_label(self, at: DateTime<Utc>) -> String {
        match self {
            Timeframe::OneHour | Timeframe::Day => {
                format!("{:02}:{:02}", at.hour(), at.minute())
            }
            Timeframe::Week => format!("{}/{}", at.day(), at.month()),
        }
    }

    /// Placeholder axis label for a synthetic point.
    fn placeholder_label(self, index: usize) -> String {
        match self {
            Timeframe::OneHour => format!(":{}", index * 4),
            Timeframe::Day | Timeframe::Week => format!("{}:00", index),
        }
    }
}

/// One pre-aggregated interval from the history query. A null average
/// means the backend had no readings in that bucket.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RawBucket {
    pub bucket_time: DateTime<Utc>,
    pub avg_msv: Option<f64>,
}

/// One chart-ready point. `label` is empty where axis thinning suppressed
/// the tick.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct HistoryPoint {
    pub value: f64,
    pub label: String,
    pub display_text: String,
}

/// A full chart series. `synthetic` is true when the points were
/// fabricated by the fallback generator rather than measured, so callers
/// never mistake placeholder data for telemetry.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct HistorySeries {
    pub points: Vec<HistoryPoint>,
    pub synthetic: bool,
}

/// A label is kept at the first point, the last point, and every
/// `ceil(n/4)`-th point in between, capping visible ticks at ~5.
fn label_shown(index: usize, len: usize) -> bool {
    let step = len.div_ceil(4);
    index == 0 || index == len - 1 || index % step == 0
}

/// Transform a raw history response into a chart series.
///
/// With more than [`MIN_REAL_POINTS`] minus one buckets the series is the
/// real data, in input order (assumed chronological ascending); otherwise
/// the seeded fallback generator takes over. `alert_tier` only shapes the
/// fallback's baseline and excursion.
pub fn transform<R: Rng>(
    raw: &[RawBucket],
    timeframe: Timeframe,
    alert_tier: AlertTier,
    rng: &mut R,
) -> HistorySeries {
    if raw.len() < MIN_REAL_POINTS {
        return synthesize(timeframe, alert_tier, rng);
    }

    let n = raw.len();
    let points = raw
        .iter()
        .enumerate()
        .map(|(i, bucket)| {
            let value = bucket.avg_msv.unwrap_or(0.0);
            // Null-check, not truthiness: a measured 0.0 renders "0.00",
            // only a missing bucket renders "0".
            let display_text = match bucket.avg_msv {
                Some(v) => format!("{:.2}", v),
                None => "0".to_string(),
            };
            let label = if label_shown(i, n) {
                timeframe.bucket_label(bucket.bucket_time)
            } else {
                String::new()
            };
            HistoryPoint {
                value,
                label,
                display_text,
            }
        })
        .collect();

    HistorySeries {
        points,
        synthetic: false,
    }
}

/// Fabricate a plausible series for a device with no usable history.
///
/// A random walk around a tier-dependent baseline, with a one-time
/// mid-window excursion so the chart does not read as flat-lined. Values
/// are clamped non-negative on emission; the walking baseline itself is
/// not clamped.
pub fn synthesize<R: Rng>(
    timeframe: Timeframe,
    alert_tier: AlertTier,
    rng: &mut R,
) -> HistorySeries {
    let n = timeframe.fallback_points();
    let danger = alert_tier == AlertTier::Danger;
    let mut baseline: f64 = if danger { 0.8 } else { 0.15 };

    let mut points = Vec::with_capacity(n);
    for i in 0..n {
        baseline += rng.gen_range(-0.03..0.03);
        if i == n / 2 {
            baseline += if danger { 0.5 } else { 0.2 };
        }
        let value = baseline.max(0.0);
        let label = if label_shown(i, n) {
            timeframe.placeholder_label(i)
        } else {
            String::new()
        };
        points.push(HistoryPoint {
            value,
            label,
            display_text: format!("{:.2}", value),
        });
    }

    HistorySeries {
        points,
        synthetic: true,
    }
}
