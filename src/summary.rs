//! Activity summary statistics over classified intervals.
//!
//! The reducer collapses a classified track into one immutable
//! [`ActivitySummary`]: elapsed versus moving duration, distance, speeds,
//! elevation gain, and per-metric averages. With the moving filter enabled
//! only moving intervals contribute; with it disabled the summary is the
//! raw pass-through view. Toggling the filter means computing a fresh
//! summary from the same classified base, never mutating an old one.

use serde::{Deserialize, Serialize};

use crate::segments::{Classification, Interval};
use crate::{GeoSample, MotionConfig};

/// Aggregate statistics for one activity under one filter mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivitySummary {
    /// First-to-last timestamp span in seconds
    pub elapsed_time: f64,
    /// Time spent in contributing intervals in seconds.
    /// Equals `elapsed_time` when the filter is disabled.
    pub moving_time: f64,
    /// Elapsed time minus moving time in seconds
    pub stopped_time: f64,
    /// Distance over contributing intervals in meters
    pub total_distance: f64,
    /// Total distance / moving time in m/s, zero when moving time is zero
    pub avg_speed: f64,
    /// Fastest contributing interval speed in m/s
    pub max_speed: f64,
    /// Average heart rate in bpm, absent when no sample carries one
    pub avg_heart_rate: Option<f64>,
    /// Average cadence in rpm, absent when no sample carries one
    pub avg_cadence: Option<f64>,
    /// Average power in watts, absent when no sample carries one
    pub avg_power: Option<f64>,
    /// Sum of positive elevation deltas over contributing intervals in meters
    pub elevation_gain: f64,
    /// The filter mode this summary was produced under
    pub filter_enabled: bool,
}

impl ActivitySummary {
    fn empty(filter_enabled: bool) -> Self {
        Self {
            elapsed_time: 0.0,
            moving_time: 0.0,
            stopped_time: 0.0,
            total_distance: 0.0,
            avg_speed: 0.0,
            max_speed: 0.0,
            avg_heart_rate: None,
            avg_cadence: None,
            avg_power: None,
            elevation_gain: 0.0,
            filter_enabled,
        }
    }
}

/// Reduce a classified track to an [`ActivitySummary`].
///
/// When `config.filter_enabled` is false every interval contributes and
/// `moving_time` equals `elapsed_time` exactly. When true, only moving
/// intervals contribute to times, distance, speeds and aggregates; an
/// entirely stationary activity then reports zero moving time and an
/// average speed of zero rather than dividing by zero.
///
/// Metric averages are unweighted means over the samples closing
/// contributing intervals (filtered) or over all samples (raw); a metric
/// absent from every considered sample averages to `None`, which is
/// distinct from a sensor that read zero throughout. Elevation gain sums
/// the positive deltas within contributing intervals, skipping intervals
/// where either endpoint lacks elevation.
///
/// Degenerate input (fewer than two samples, no intervals) produces an
/// all-zero summary; the public pipeline rejects such tracks during
/// normalization.
pub fn summarize_activity(
    samples: &[GeoSample],
    intervals: &[Interval],
    config: &MotionConfig,
) -> ActivitySummary {
    if samples.len() < 2 || intervals.is_empty() {
        return ActivitySummary::empty(config.filter_enabled);
    }

    let elapsed_time = samples[samples.len() - 1].timestamp - samples[0].timestamp;

    let contributes = |interval: &Interval| {
        !config.filter_enabled || interval.classification == Classification::Moving
    };

    let moving_time: f64 = if config.filter_enabled {
        intervals
            .iter()
            .filter(|iv| iv.classification == Classification::Moving)
            .map(|iv| iv.duration)
            .sum()
    } else {
        elapsed_time
    };

    let total_distance: f64 = intervals
        .iter()
        .filter(|iv| contributes(iv))
        .map(|iv| iv.distance)
        .sum();

    let avg_speed = if moving_time > 0.0 {
        total_distance / moving_time
    } else {
        0.0
    };

    let max_speed = intervals
        .iter()
        .filter(|iv| contributes(iv))
        .map(|iv| iv.speed)
        .fold(0.0, f64::max);

    let elevation_gain: f64 = intervals
        .iter()
        .filter(|iv| contributes(iv))
        .filter_map(|iv| {
            match (
                samples[iv.start_index].elevation,
                samples[iv.end_index].elevation,
            ) {
                (Some(start), Some(end)) if end > start => Some(end - start),
                _ => None,
            }
        })
        .sum();

    ActivitySummary {
        elapsed_time,
        moving_time,
        stopped_time: (elapsed_time - moving_time).max(0.0),
        total_distance,
        avg_speed,
        max_speed,
        avg_heart_rate: metric_average(samples, intervals, config, |s| s.heart_rate),
        avg_cadence: metric_average(samples, intervals, config, |s| s.cadence),
        avg_power: metric_average(samples, intervals, config, |s| s.power),
        elevation_gain,
        filter_enabled: config.filter_enabled,
    }
}

/// Unweighted mean of one optional metric over the considered samples.
fn metric_average(
    samples: &[GeoSample],
    intervals: &[Interval],
    config: &MotionConfig,
    metric: fn(&GeoSample) -> Option<f64>,
) -> Option<f64> {
    let values: Vec<f64> = if config.filter_enabled {
        intervals
            .iter()
            .filter(|iv| iv.classification == Classification::Moving)
            .filter_map(|iv| metric(&samples[iv.end_index]))
            .collect()
    } else {
        samples.iter().filter_map(metric).collect()
    };

    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}
