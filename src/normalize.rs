//! Track normalization: validity filtering, time ordering, deduplication.
//!
//! Raw tracks arrive near-ordered at best: GPS fixes can be duplicated,
//! out of order, or carry non-finite values. This module canonicalizes a
//! raw track into the strictly time-ordered sequence the classifier
//! requires, without inventing values for absent metrics.

use crate::error::{MotionError, Result};
use crate::GeoSample;

/// Minimum number of valid samples a track must contain.
pub const MIN_TRACK_SAMPLES: usize = 2;

/// Normalize a raw track into a strictly time-ordered sample sequence.
///
/// Invalid samples (non-finite timestamps, out-of-range coordinates) are
/// dropped. The remainder is stably sorted by timestamp and samples sharing
/// a timestamp are collapsed to the one appearing last in input order.
/// Optional metrics pass through untouched, absent stays absent.
///
/// Returns [`MotionError::TrackTooShort`] when fewer than 2 valid samples
/// remain, so callers never see a partial result for an unusable track.
///
/// # Example
/// ```
/// use motion_metrics::normalize_samples;
/// use motion_metrics::GeoSample;
///
/// let raw = vec![
///     GeoSample::new(10.0, 51.5080, -0.1290),
///     GeoSample::new(0.0, 51.5074, -0.1278), // out of order
/// ];
/// let track = normalize_samples(&raw).unwrap();
/// assert_eq!(track[0].timestamp, 0.0);
/// ```
pub fn normalize_samples(samples: &[GeoSample]) -> Result<Vec<GeoSample>> {
    let mut valid: Vec<GeoSample> = samples.iter().copied().filter(GeoSample::is_valid).collect();

    // Stable sort keeps input order within equal timestamps, so the
    // last-wins dedup below sees duplicates in arrival order.
    valid.sort_by(|a, b| a.timestamp.total_cmp(&b.timestamp));

    let mut track: Vec<GeoSample> = Vec::with_capacity(valid.len());
    for sample in valid {
        if let Some(last) = track.last_mut() {
            if last.timestamp == sample.timestamp {
                *last = sample;
                continue;
            }
        }
        track.push(sample);
    }

    if track.len() < MIN_TRACK_SAMPLES {
        return Err(MotionError::TrackTooShort {
            sample_count: track.len(),
            minimum_required: MIN_TRACK_SAMPLES,
        });
    }

    Ok(track)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sorts_out_of_order_samples() {
        let raw = vec![
            GeoSample::new(20.0, 51.5090, -0.1300),
            GeoSample::new(0.0, 51.5074, -0.1278),
            GeoSample::new(10.0, 51.5080, -0.1290),
        ];

        let track = normalize_samples(&raw).unwrap();
        assert_eq!(track.len(), 3);
        assert_eq!(track[0].timestamp, 0.0);
        assert_eq!(track[1].timestamp, 10.0);
        assert_eq!(track[2].timestamp, 20.0);
    }

    #[test]
    fn test_duplicate_timestamp_keeps_last() {
        let raw = vec![
            GeoSample::new(0.0, 51.5074, -0.1278),
            GeoSample::new(10.0, 51.5080, -0.1290),
            GeoSample::new(10.0, 51.5999, -0.1999), // duplicate fix, later wins
            GeoSample::new(20.0, 51.5090, -0.1300),
        ];

        let track = normalize_samples(&raw).unwrap();
        assert_eq!(track.len(), 3);
        assert_eq!(track[1].latitude, 51.5999);
        assert_eq!(track[1].longitude, -0.1999);
    }

    #[test]
    fn test_drops_invalid_samples() {
        let raw = vec![
            GeoSample::new(0.0, 51.5074, -0.1278),
            GeoSample::new(5.0, 91.0, 0.0),       // latitude out of range
            GeoSample::new(f64::NAN, 51.5, -0.1), // corrupt timestamp
            GeoSample::new(10.0, 51.5080, -0.1290),
        ];

        let track = normalize_samples(&raw).unwrap();
        assert_eq!(track.len(), 2);
        assert_eq!(track[0].timestamp, 0.0);
        assert_eq!(track[1].timestamp, 10.0);
    }

    #[test]
    fn test_rejects_short_tracks() {
        let raw = vec![GeoSample::new(0.0, 51.5074, -0.1278)];
        let result = normalize_samples(&raw);
        assert!(matches!(
            result,
            Err(MotionError::TrackTooShort {
                sample_count: 1,
                minimum_required: 2,
            })
        ));

        assert!(normalize_samples(&[]).is_err());
    }

    #[test]
    fn test_rejects_track_with_too_few_valid_samples() {
        // Three samples but only one survives validation
        let raw = vec![
            GeoSample::new(0.0, 51.5074, -0.1278),
            GeoSample::new(5.0, f64::NAN, -0.1280),
            GeoSample::new(10.0, 51.5, 181.0),
        ];
        assert!(matches!(
            normalize_samples(&raw),
            Err(MotionError::TrackTooShort { sample_count: 1, .. })
        ));
    }

    #[test]
    fn test_absent_metrics_stay_absent() {
        let raw = vec![
            GeoSample::new(0.0, 51.5074, -0.1278).with_heart_rate(120.0),
            GeoSample::new(10.0, 51.5080, -0.1290),
        ];

        let track = normalize_samples(&raw).unwrap();
        assert_eq!(track[0].heart_rate, Some(120.0));
        assert_eq!(track[1].heart_rate, None);
        assert_eq!(track[1].elevation, None);
        assert_eq!(track[1].power, None);
    }

    #[test]
    fn test_multi_day_span_accepted() {
        // Timestamps are opaque instants, a two-day gap is fine
        let raw = vec![
            GeoSample::new(1_700_000_000.0, 51.5074, -0.1278),
            GeoSample::new(1_700_172_800.0, 51.5080, -0.1290),
        ];
        assert_eq!(normalize_samples(&raw).unwrap().len(), 2);
    }
}
