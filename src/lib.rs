//! # Motion Metrics
//!
//! Stop detection and moving-time recomputation for GPS activity tracks.
//!
//! This library provides:
//! - Track normalization (ordering, duplicate timestamps, invalid samples)
//! - Speed-based movement classification with short-stop hysteresis
//! - Summary statistics that honor the moving filter
//! - Chart-ready metric series over time or distance
//!
//! ## Features
//!
//! - **`parallel`** - Enable parallel batch analysis with rayon
//! - **`http`** - Enable HTTP client for activity stream fetching
//! - **`full`** - Enable all features
//!
//! ## Quick Start
//!
//! ```rust
//! use motion_metrics::{compute_activity, GeoSample, MotionConfig};
//!
//! // Ten seconds of riding, a long stop, ten more seconds of riding
//! let samples = vec![
//!     GeoSample::new(0.0, 51.5074, -0.1278),
//!     GeoSample::new(10.0, 51.5076, -0.1278),
//!     GeoSample::new(240.0, 51.5076, -0.1278),
//!     GeoSample::new(250.0, 51.5078, -0.1278),
//! ];
//!
//! let analysis = compute_activity(&samples, &MotionConfig::default()).unwrap();
//! println!(
//!     "moving {:.0}s of {:.0}s elapsed",
//!     analysis.summary.moving_time, analysis.summary.elapsed_time
//! );
//! ```

use log::debug;
use serde::{Deserialize, Serialize};

// Unified error handling
pub mod error;
pub use error::{MotionError, OptionExt, Result};

// Track normalization (sort, dedup, validity filtering)
pub mod normalize;
pub use normalize::{normalize_samples, MIN_TRACK_SAMPLES};

// Movement classification over consecutive sample pairs
pub mod segments;
pub use segments::{classify_intervals, Classification, Interval};

// Summary statistics under a filter mode
pub mod summary;
pub use summary::{summarize_activity, ActivitySummary};

// Chart series construction
pub mod series;
pub use series::{
    build_all_series, build_metric_series, Metric, MetricSelection, MetricSeries, SeriesPoint,
    XAxis,
};

// Geographic utilities (haversine distance, unit constants)
pub mod geo_utils;

// GPX track import
pub mod import;
pub use import::{parse_gpx, track_name};

// HTTP module for activity stream fetching
#[cfg(feature = "http")]
pub mod http;

#[cfg(feature = "http")]
pub use http::{samples_from_streams, RemoteActivity, StreamBatchResult, StreamFetcher, StreamSet};

// ============================================================================
// Core Types
// ============================================================================

/// One GPS sample with optional sensor readings.
///
/// Timestamps are seconds on an arbitrary but shared epoch; only the
/// differences between samples matter downstream. Sensor fields stay
/// `None` when the device never recorded them, which the pipeline keeps
/// distinct from a sensor reading zero.
///
/// # Example
/// ```
/// use motion_metrics::GeoSample;
/// let sample = GeoSample::new(0.0, 51.5074, -0.1278).with_heart_rate(128.0);
/// assert!(sample.is_valid());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeoSample {
    /// Seconds on an arbitrary but shared epoch
    pub timestamp: f64,
    pub latitude: f64,
    pub longitude: f64,
    /// Elevation in meters
    pub elevation: Option<f64>,
    /// Heart rate in bpm
    pub heart_rate: Option<f64>,
    /// Cadence in rpm
    pub cadence: Option<f64>,
    /// Power in watts
    pub power: Option<f64>,
}

impl GeoSample {
    /// Create a sample with no sensor readings.
    pub fn new(timestamp: f64, latitude: f64, longitude: f64) -> Self {
        Self {
            timestamp,
            latitude,
            longitude,
            elevation: None,
            heart_rate: None,
            cadence: None,
            power: None,
        }
    }

    pub fn with_elevation(mut self, elevation: f64) -> Self {
        self.elevation = Some(elevation);
        self
    }

    pub fn with_heart_rate(mut self, heart_rate: f64) -> Self {
        self.heart_rate = Some(heart_rate);
        self
    }

    pub fn with_cadence(mut self, cadence: f64) -> Self {
        self.cadence = Some(cadence);
        self
    }

    pub fn with_power(mut self, power: f64) -> Self {
        self.power = Some(power);
        self
    }

    /// Check that the sample has a usable timestamp and coordinates.
    pub fn is_valid(&self) -> bool {
        self.timestamp.is_finite()
            && self.latitude.is_finite()
            && self.longitude.is_finite()
            && self.latitude >= -90.0
            && self.latitude <= 90.0
            && self.longitude >= -180.0
            && self.longitude <= 180.0
    }
}

/// Configuration for activity analysis.
///
/// Deserializes from partial JSON; missing fields take their defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MotionConfig {
    /// Speed below which an interval counts as stopped, in m/s.
    /// Speeds at or exactly on the threshold count as moving.
    /// Default: 0.5 m/s (GPS jitter while standing still stays below this)
    pub speed_threshold: f64,

    /// Minimum duration a stopped run must last to register as a stop,
    /// in seconds. Shorter runs fold back into moving time.
    /// Default: 10.0 seconds
    pub min_stop_duration: f64,

    /// Whether stopped intervals are excluded from summaries and series.
    /// Default: true
    pub filter_enabled: bool,

    /// Maximum points per metric series before uniform downsampling.
    /// Default: 2000
    pub max_series_points: usize,

    /// Metric series to build.
    /// Default: speed, heart rate and elevation over time
    pub selections: Vec<MetricSelection>,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            speed_threshold: 0.5,
            min_stop_duration: 10.0,
            filter_enabled: true,
            max_series_points: 2000,
            selections: MetricSelection::standard(),
        }
    }
}

impl MotionConfig {
    /// Check the config for values the pipeline cannot work with.
    pub fn validate(&self) -> Result<()> {
        if !self.speed_threshold.is_finite() || self.speed_threshold < 0.0 {
            return Err(MotionError::ConfigError {
                message: format!(
                    "speed_threshold must be a non-negative number, got {}",
                    self.speed_threshold
                ),
            });
        }
        if !self.min_stop_duration.is_finite() || self.min_stop_duration < 0.0 {
            return Err(MotionError::ConfigError {
                message: format!(
                    "min_stop_duration must be a non-negative number, got {}",
                    self.min_stop_duration
                ),
            });
        }
        if self.max_series_points < 2 {
            return Err(MotionError::ConfigError {
                message: format!(
                    "max_series_points must be at least 2, got {}",
                    self.max_series_points
                ),
            });
        }
        Ok(())
    }
}

/// Complete output of one activity computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityAnalysis {
    pub summary: ActivitySummary,
    pub series: Vec<MetricSeries>,
}

// ============================================================================
// Core Functions
// ============================================================================

/// Analyze one activity track.
///
/// Normalizes the raw samples, classifies movement against consecutive
/// sample pairs, and produces the summary plus the requested metric
/// series. The input slice is left untouched; rerunning with a different
/// config allocates a fresh result rather than mutating an old one.
///
/// Returns [`MotionError::ConfigError`] for an unusable config and
/// [`MotionError::TrackTooShort`] when fewer than two valid samples
/// remain after normalization.
pub fn compute_activity(samples: &[GeoSample], config: &MotionConfig) -> Result<ActivityAnalysis> {
    config.validate()?;

    let track = normalize_samples(samples)?;
    let intervals = classify_intervals(&track, config);
    let summary = summarize_activity(&track, &intervals, config);
    let series = build_all_series(&track, &intervals, config);

    debug!(
        "[Motion] {} samples -> {} intervals, moving {:.0}s of {:.0}s",
        track.len(),
        intervals.len(),
        summary.moving_time,
        summary.elapsed_time
    );

    Ok(ActivityAnalysis { summary, series })
}

/// Analyze many tracks in parallel.
///
/// Results keep the input order; each track fails or succeeds on its own.
#[cfg(feature = "parallel")]
pub fn compute_activities_parallel(
    tracks: &[Vec<GeoSample>],
    config: &MotionConfig,
) -> Vec<Result<ActivityAnalysis>> {
    use rayon::prelude::*;

    tracks
        .par_iter()
        .map(|samples| compute_activity(samples, config))
        .collect()
}

// ============================================================================
// Tests
// ============================================================================
