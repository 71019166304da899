//! Chart-ready metric series over classified intervals.
//!
//! Each series pairs one metric (speed, heart rate, cadence, power,
//! elevation) with one x-axis domain (time or distance). The x coordinate
//! accumulates only over contributing intervals, so with the moving filter
//! enabled a stopped interval advances x by zero and the curve shows no
//! flat-lined gap. Points are emitted in classification order, which keeps
//! x monotonically non-decreasing without any post-sort.

use serde::{Deserialize, Serialize};

use crate::segments::{Classification, Interval};
use crate::{GeoSample, MotionConfig};

/// A sample metric that can be charted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    Speed,
    HeartRate,
    Cadence,
    Power,
    Elevation,
}

impl Metric {
    /// The metric's value on one sample, absent when the sensor was not
    /// recording. Speed is derived per interval, not stored on samples.
    pub fn sample_value(&self, sample: &GeoSample) -> Option<f64> {
        match self {
            Metric::Speed => None,
            Metric::HeartRate => sample.heart_rate,
            Metric::Cadence => sample.cadence,
            Metric::Power => sample.power,
            Metric::Elevation => sample.elevation,
        }
    }
}

/// The domain a series is plotted against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum XAxis {
    /// Accumulated seconds over contributing intervals
    Time,
    /// Accumulated meters over contributing intervals
    Distance,
}

/// One requested metric/axis pairing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricSelection {
    pub metric: Metric,
    pub x_axis: XAxis,
}

impl MetricSelection {
    /// The default chart set: speed, heart rate and elevation over time.
    pub fn standard() -> Vec<MetricSelection> {
        vec![
            MetricSelection { metric: Metric::Speed, x_axis: XAxis::Time },
            MetricSelection { metric: Metric::HeartRate, x_axis: XAxis::Time },
            MetricSelection { metric: Metric::Elevation, x_axis: XAxis::Time },
        ]
    }
}

/// One chart point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub x: f64,
    pub y: f64,
}

/// A metric plotted against an accumulated axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricSeries {
    pub metric: Metric,
    pub x_axis: XAxis,
    /// The filter mode the x coordinates were accumulated under
    pub filter_enabled: bool,
    pub points: Vec<SeriesPoint>,
}

impl MetricSeries {
    /// True when the metric was absent from the whole track.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Span of the x axis, zero for empty or single-point series.
    pub fn x_span(&self) -> f64 {
        match (self.points.first(), self.points.last()) {
            (Some(first), Some(last)) => last.x - first.x,
            _ => 0.0,
        }
    }
}

/// Build one series for a classified track.
///
/// A stopped interval under the filter contributes no x-advance and no
/// point; with the filter disabled every interval contributes. Samples
/// where the metric is absent are skipped without disturbing the
/// accumulated x, and a metric absent everywhere yields an empty series,
/// which callers must treat as "no data" rather than "all zero".
pub fn build_metric_series(
    samples: &[GeoSample],
    intervals: &[Interval],
    selection: MetricSelection,
    config: &MotionConfig,
) -> MetricSeries {
    let mut points = Vec::with_capacity(intervals.len() + 1);

    if let Some(first) = samples.first() {
        if let Some(y) = selection.metric.sample_value(first) {
            points.push(SeriesPoint { x: 0.0, y });
        }
    }

    let mut x = 0.0;
    for interval in intervals {
        if config.filter_enabled && interval.classification == Classification::Stopped {
            continue;
        }
        x += match selection.x_axis {
            XAxis::Time => interval.duration,
            XAxis::Distance => interval.distance,
        };
        let y = match selection.metric {
            Metric::Speed => Some(interval.speed),
            _ => selection.metric.sample_value(&samples[interval.end_index]),
        };
        if let Some(y) = y {
            points.push(SeriesPoint { x, y });
        }
    }

    if points.len() > config.max_series_points {
        points = downsample_points(&points, config.max_series_points);
    }

    MetricSeries {
        metric: selection.metric,
        x_axis: selection.x_axis,
        filter_enabled: config.filter_enabled,
        points,
    }
}

/// Build every requested series for a classified track.
pub fn build_all_series(
    samples: &[GeoSample],
    intervals: &[Interval],
    config: &MotionConfig,
) -> Vec<MetricSeries> {
    config
        .selections
        .iter()
        .map(|&selection| build_metric_series(samples, intervals, selection, config))
        .collect()
}

/// Uniform-stride downsampling to at most `max_points` points.
///
/// Always includes the last point so the x span survives downsampling.
fn downsample_points(points: &[SeriesPoint], max_points: usize) -> Vec<SeriesPoint> {
    if points.len() <= max_points || max_points == 0 {
        return points.to_vec();
    }

    let step = points.len() as f64 / max_points as f64;
    let mut sampled: Vec<SeriesPoint> = (0..max_points)
        .map(|i| points[(i as f64 * step) as usize])
        .collect();

    // Always include the last point
    if let (Some(tail), Some(&last)) = (sampled.last_mut(), points.last()) {
        *tail = last;
    }
    sampled
}
