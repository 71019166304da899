//! Unified error handling for the motion-metrics library.
//!
//! This module provides a consistent error type for all analysis and
//! collaborator operations. Only fatal, caller-visible failures live here;
//! conditions the pipeline recovers from (zero moving time, a metric absent
//! from every sample) surface as zero/`None`/empty values instead.

use std::fmt;

/// Unified error type for motion-metrics operations.
#[derive(Debug, Clone, PartialEq)]
pub enum MotionError {
    /// Track has too few valid samples for analysis
    TrackTooShort {
        sample_count: usize,
        minimum_required: usize,
    },
    /// Configuration has invalid thresholds or durations
    ConfigError { message: String },
    /// Track-log file could not be parsed
    ParseError { message: String },
    /// Remote activity fetch failed
    FetchError {
        message: String,
        status_code: Option<u16>,
    },
}

impl fmt::Display for MotionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MotionError::TrackTooShort {
                sample_count,
                minimum_required,
            } => {
                write!(
                    f,
                    "Track has {} valid samples, minimum {} required",
                    sample_count, minimum_required
                )
            }
            MotionError::ConfigError { message } => {
                write!(f, "Configuration error: {}", message)
            }
            MotionError::ParseError { message } => {
                write!(f, "Parse error: {}", message)
            }
            MotionError::FetchError {
                message,
                status_code,
            } => {
                if let Some(code) = status_code {
                    write!(f, "Fetch error ({}): {}", code, message)
                } else {
                    write!(f, "Fetch error: {}", message)
                }
            }
        }
    }
}

impl std::error::Error for MotionError {}

/// Result type alias for motion-metrics operations.
pub type Result<T> = std::result::Result<T, MotionError>;

/// Extension trait for converting Option to MotionError.
pub trait OptionExt<T> {
    /// Convert Option to Result with a fetch error (no status code).
    fn ok_or_fetch(self, message: &str) -> Result<T>;

    /// Convert Option to Result with a parse error.
    fn ok_or_parse(self, message: &str) -> Result<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_fetch(self, message: &str) -> Result<T> {
        self.ok_or_else(|| MotionError::FetchError {
            message: message.to_string(),
            status_code: None,
        })
    }

    fn ok_or_parse(self, message: &str) -> Result<T> {
        self.ok_or_else(|| MotionError::ParseError {
            message: message.to_string(),
        })
    }
}
