//! Interval classification: labeling inter-sample spans as moving or stopped.
//!
//! This module provides the stop-detection half of the engine:
//! - Per-interval speed from great-circle distance and elapsed time
//! - Threshold classification with the tie going to moving
//! - Hysteresis that folds short stopped runs back into moving context
//!
//! ## Example
//! ```rust
//! use motion_metrics::{classify_intervals, Classification, GeoSample, MotionConfig};
//!
//! let samples = vec![
//!     GeoSample::new(0.0, 51.5074, -0.1278),
//!     GeoSample::new(10.0, 51.5080, -0.1290),
//! ];
//! let intervals = classify_intervals(&samples, &MotionConfig::default());
//! assert_eq!(intervals.len(), 1);
//! assert_eq!(intervals[0].classification, Classification::Moving);
//! ```

use serde::{Deserialize, Serialize};

use crate::geo_utils::haversine_distance;
use crate::{GeoSample, MotionConfig};

/// Label for an inter-sample interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Classification {
    Moving,
    Stopped,
}

/// The span between two consecutive normalized samples.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Interval {
    /// Index of the opening sample in the normalized sequence
    pub start_index: usize,
    /// Index of the closing sample in the normalized sequence
    pub end_index: usize,
    /// Elapsed time in seconds
    pub duration: f64,
    /// Great-circle distance in meters
    pub distance: f64,
    /// Instantaneous speed in m/s (zero when duration is zero)
    pub speed: f64,
    pub classification: Classification,
}

/// Classify every inter-sample interval of a normalized track.
///
/// Pass one walks consecutive sample pairs, derives duration, distance and
/// speed, and labels the interval [`Classification::Stopped`] when its speed
/// is strictly below `config.speed_threshold` (at exactly the threshold the
/// interval is moving). Pass two merges hysteresis noise: any contiguous
/// stopped run whose total duration is shorter than
/// `config.min_stop_duration` is relabeled moving, so momentary GPS jitter
/// or a brief halt at a junction does not register as a stop.
///
/// Every interval receives exactly one label and identical input plus
/// configuration always yields identical labels. Tracks with fewer than two
/// samples produce no intervals.
pub fn classify_intervals(samples: &[GeoSample], config: &MotionConfig) -> Vec<Interval> {
    let mut intervals: Vec<Interval> = samples
        .windows(2)
        .enumerate()
        .map(|(i, pair)| {
            let duration = pair[1].timestamp - pair[0].timestamp;
            let distance = haversine_distance(&pair[0], &pair[1]);
            let speed = if duration > 0.0 { distance / duration } else { 0.0 };
            let classification = if speed >= config.speed_threshold {
                Classification::Moving
            } else {
                Classification::Stopped
            };

            Interval {
                start_index: i,
                end_index: i + 1,
                duration,
                distance,
                speed,
                classification,
            }
        })
        .collect();

    merge_short_stops(&mut intervals, config.min_stop_duration);

    intervals
}

/// Forward scan relabeling stopped runs shorter than `min_stop_duration`.
///
/// Runs whose duration exactly equals the minimum stay stopped. The rule is
/// applied to every run, including ones touching the track ends.
fn merge_short_stops(intervals: &mut [Interval], min_stop_duration: f64) {
    let mut i = 0;
    while i < intervals.len() {
        if intervals[i].classification != Classification::Stopped {
            i += 1;
            continue;
        }

        let run_start = i;
        let mut run_duration = 0.0;
        while i < intervals.len() && intervals[i].classification == Classification::Stopped {
            run_duration += intervals[i].duration;
            i += 1;
        }

        if run_duration < min_stop_duration {
            for interval in &mut intervals[run_start..i] {
                interval.classification = Classification::Moving;
            }
        }
    }
}
