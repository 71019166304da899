//! GPX track import.
//!
//! Parses GPX 1.0/1.1 documents into [`GeoSample`] tracks. Only `<trk>`
//! content is read; waypoints and routes carry no timestamps and cannot
//! feed the classifier. Points without a `<time>` element are skipped for
//! the same reason. Timestamps are converted to epoch seconds so the rest
//! of the pipeline never touches calendar types.

use chrono::DateTime;
use gpx::Gpx;

use crate::error::{MotionError, OptionExt, Result};
use crate::GeoSample;

/// Parse GPX bytes into a normalizer-ready sample track.
///
/// Samples come back in document order; the normalizer owns sorting and
/// dedup. Returns [`MotionError::ParseError`] for malformed XML or when
/// fewer than two timestamped track points survive.
///
/// # Example
///
/// ```no_run
/// use motion_metrics::parse_gpx;
///
/// let bytes = std::fs::read("ride.gpx").unwrap();
/// let samples = parse_gpx(&bytes).unwrap();
/// println!("{} samples", samples.len());
/// ```
pub fn parse_gpx(content: &[u8]) -> Result<Vec<GeoSample>> {
    let gpx = read_gpx(content)?;

    let mut samples = Vec::new();
    for track in gpx.tracks {
        for segment in track.segments {
            for point in segment.points {
                let timestamp = match point.time.and_then(gpx_time_to_epoch) {
                    Some(t) => t,
                    None => continue,
                };
                let location = point.point();
                let mut sample = GeoSample::new(timestamp, location.y(), location.x());
                sample.elevation = point.elevation;
                samples.push(sample);
            }
        }
    }

    if samples.len() < 2 {
        return Err(MotionError::ParseError {
            message: format!(
                "GPX document contains {} timestamped track points, need at least 2",
                samples.len()
            ),
        });
    }

    log::debug!(
        "[Import] Parsed {} samples ({:.0} m) from GPX",
        samples.len(),
        crate::geo_utils::track_distance(&samples)
    );
    Ok(samples)
}

/// The track name, falling back to the document metadata name.
pub fn track_name(content: &[u8]) -> Option<String> {
    let gpx = read_gpx(content).ok()?;
    gpx.tracks
        .iter()
        .find_map(|track| track.name.clone())
        .or_else(|| gpx.metadata.and_then(|metadata| metadata.name))
}

fn read_gpx(content: &[u8]) -> Result<Gpx> {
    let text = std::str::from_utf8(content)
        .ok()
        .ok_or_parse("GPX document is not valid UTF-8")?;
    gpx::read(text.as_bytes()).map_err(|e| MotionError::ParseError {
        message: format!("invalid GPX document: {}", e),
    })
}

/// GPX time to epoch seconds, via its RFC 3339 rendering.
fn gpx_time_to_epoch(time: gpx::Time) -> Option<f64> {
    let formatted = time.format().ok()?;
    let parsed = DateTime::parse_from_rfc3339(&formatted).ok()?;
    Some(parsed.timestamp_millis() as f64 / 1000.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_GPX: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<gpx version="1.1" creator="test" xmlns="http://www.topografix.com/GPX/1/1">
  <metadata><name>Morning Loop</name></metadata>
  <trk>
    <name>Lakeside ride</name>
    <trkseg>
      <trkpt lat="47.3769" lon="8.5417">
        <ele>408.0</ele>
        <time>2024-05-01T06:00:00Z</time>
      </trkpt>
      <trkpt lat="47.3771" lon="8.5419">
        <ele>409.5</ele>
        <time>2024-05-01T06:00:10Z</time>
      </trkpt>
      <trkpt lat="47.3773" lon="8.5421">
        <time>2024-05-01T06:00:20Z</time>
      </trkpt>
    </trkseg>
  </trk>
</gpx>"#;

    #[test]
    fn test_parse_sample_gpx() {
        let samples = parse_gpx(SAMPLE_GPX.as_bytes()).unwrap();
        assert_eq!(samples.len(), 3);

        assert!((samples[0].latitude - 47.3769).abs() < 1e-9);
        assert!((samples[0].longitude - 8.5417).abs() < 1e-9);
        assert_eq!(samples[0].elevation, Some(408.0));
        // 2024-05-01T06:00:00Z
        assert!((samples[0].timestamp - 1_714_543_200.0).abs() < 1e-6);
        assert!((samples[1].timestamp - samples[0].timestamp - 10.0).abs() < 1e-6);
    }

    #[test]
    fn test_point_without_elevation_stays_absent() {
        let samples = parse_gpx(SAMPLE_GPX.as_bytes()).unwrap();
        assert_eq!(samples[2].elevation, None);
        assert_eq!(samples[2].heart_rate, None);
    }

    #[test]
    fn test_untimed_points_are_skipped() {
        let gpx = r#"<?xml version="1.0"?>
<gpx version="1.1" creator="test" xmlns="http://www.topografix.com/GPX/1/1">
  <trk><trkseg>
    <trkpt lat="47.0" lon="8.0"><time>2024-05-01T06:00:00Z</time></trkpt>
    <trkpt lat="47.1" lon="8.1"></trkpt>
    <trkpt lat="47.2" lon="8.2"><time>2024-05-01T06:01:00Z</time></trkpt>
  </trkseg></trk>
</gpx>"#;
        let samples = parse_gpx(gpx.as_bytes()).unwrap();
        assert_eq!(samples.len(), 2);
        assert!((samples[1].latitude - 47.2).abs() < 1e-9);
    }

    #[test]
    fn test_too_few_timestamped_points_is_parse_error() {
        let gpx = r#"<?xml version="1.0"?>
<gpx version="1.1" creator="test" xmlns="http://www.topografix.com/GPX/1/1">
  <trk><trkseg>
    <trkpt lat="47.0" lon="8.0"><time>2024-05-01T06:00:00Z</time></trkpt>
    <trkpt lat="47.1" lon="8.1"></trkpt>
  </trkseg></trk>
</gpx>"#;
        let err = parse_gpx(gpx.as_bytes()).unwrap_err();
        assert!(matches!(err, MotionError::ParseError { .. }));
    }

    #[test]
    fn test_malformed_xml_is_parse_error() {
        let err = parse_gpx(b"<gpx><trk>not closed").unwrap_err();
        assert!(matches!(err, MotionError::ParseError { .. }));
    }

    #[test]
    fn test_non_utf8_bytes_are_parse_error() {
        let err = parse_gpx(&[0xff, 0xfe, 0x00]).unwrap_err();
        assert!(matches!(err, MotionError::ParseError { .. }));
    }

    #[test]
    fn test_track_name_prefers_track_over_metadata() {
        assert_eq!(
            track_name(SAMPLE_GPX.as_bytes()),
            Some("Lakeside ride".to_string())
        );
    }

    #[test]
    fn test_track_name_falls_back_to_metadata() {
        let gpx = r#"<?xml version="1.0"?>
<gpx version="1.1" creator="test" xmlns="http://www.topografix.com/GPX/1/1">
  <metadata><name>Metadata Only</name></metadata>
  <trk><trkseg>
    <trkpt lat="47.0" lon="8.0"><time>2024-05-01T06:00:00Z</time></trkpt>
    <trkpt lat="47.1" lon="8.1"><time>2024-05-01T06:01:00Z</time></trkpt>
  </trkseg></trk>
</gpx>"#;
        assert_eq!(track_name(gpx.as_bytes()), Some("Metadata Only".to_string()));
    }

    #[test]
    fn test_parsed_track_feeds_the_pipeline() {
        let samples = parse_gpx(SAMPLE_GPX.as_bytes()).unwrap();
        let analysis = crate::compute_activity(&samples, &crate::MotionConfig::default()).unwrap();
        assert!((analysis.summary.elapsed_time - 20.0).abs() < 1e-6);
        assert!(analysis.summary.total_distance > 0.0);
    }
}
