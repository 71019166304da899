//! HTTP client for the Strava v3 API.
//!
//! This module fetches raw activity streams and converts them into
//! [`GeoSample`] tracks for the analysis pipeline:
//! - Connection pooling across batch fetches
//! - Parallel stream fetching with bounded concurrency
//! - OAuth bearer token authentication

use log::{debug, info};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

use crate::error::{MotionError, OptionExt, Result};
use crate::GeoSample;

const DEFAULT_BASE_URL: &str = "https://www.strava.com/api/v3";
const REQUEST_TIMEOUT_SECS: u64 = 30;
const MAX_CONCURRENCY: usize = 10; // Parallel stream requests per batch

/// Helper to calculate elapsed milliseconds from an Instant
#[inline]
fn elapsed_ms(start: Instant) -> u64 {
    start.elapsed().as_millis() as u64
}

/// One numeric stream, e.g. the time axis.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NumericStream {
    pub data: Vec<f64>,
}

/// The position stream, `[latitude, longitude]` pairs.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LatLngStream {
    pub data: Vec<[f64; 2]>,
}

/// A sensor stream; entries are null where the sensor dropped out.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SensorStream {
    pub data: Vec<Option<f64>>,
}

/// Decoded payload of the activity streams endpoint (`key_by_type=true`).
///
/// Streams the activity never recorded are simply absent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StreamSet {
    pub time: Option<NumericStream>,
    pub latlng: Option<LatLngStream>,
    pub altitude: Option<SensorStream>,
    pub heartrate: Option<SensorStream>,
    pub cadence: Option<SensorStream>,
    pub watts: Option<SensorStream>,
}

/// Activity metadata from the athlete activity listing.
///
/// Field names follow the wire format; unknown fields are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteActivity {
    pub id: u64,
    pub name: String,
    pub sport_type: String,
    pub distance: f64,
    pub moving_time: f64,
    pub elapsed_time: f64,
    pub start_date: String,
}

/// Outcome of one activity in a batch stream fetch.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamBatchResult {
    pub activity_id: u64,
    pub samples: Option<Vec<GeoSample>>,
    pub success: bool,
    pub error: Option<String>,
}

/// Authenticated stream fetcher.
pub struct StreamFetcher {
    client: Client,
    auth_header: String,
    base_url: String,
}

impl StreamFetcher {
    /// Create a fetcher authenticated with an OAuth access token.
    pub fn new(access_token: &str) -> Result<Self> {
        Self::with_base_url(access_token, DEFAULT_BASE_URL)
    }

    /// Create a fetcher against a non-default API host.
    pub fn with_base_url(access_token: &str, base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .pool_max_idle_per_host(MAX_CONCURRENCY)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| MotionError::FetchError {
                message: format!("failed to create HTTP client: {}", e),
                status_code: None,
            })?;

        Ok(Self {
            client,
            auth_header: format!("Bearer {}", access_token),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Fetch one activity's streams and convert them to a sample track.
    ///
    /// The track comes back in wire order with timestamps in seconds since
    /// activity start; run it through [`crate::compute_activity`] as-is.
    pub async fn fetch_activity_samples(&self, activity_id: u64) -> Result<Vec<GeoSample>> {
        let url = format!(
            "{}/activities/{}/streams?keys=time,latlng,altitude,heartrate,cadence,watts&key_by_type=true",
            self.base_url, activity_id
        );
        let start = Instant::now();

        let response = self.get(&url).await?;
        let status = response.status();

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(MotionError::FetchError {
                message: "access token rejected".to_string(),
                status_code: Some(401),
            });
        }
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(MotionError::FetchError {
                message: format!("no activity with id {}", activity_id),
                status_code: Some(404),
            });
        }
        if !status.is_success() {
            let body = response.bytes().await.unwrap_or_default();
            return Err(MotionError::FetchError {
                message: error_message_from_body(&body, status),
                status_code: Some(status.as_u16()),
            });
        }

        let streams: StreamSet = response.json().await.map_err(|e| MotionError::FetchError {
            message: format!("malformed stream response: {}", e),
            status_code: None,
        })?;

        let samples = samples_from_streams(&streams)?;
        debug!(
            "[StreamFetcher] Activity {}: {} samples ({} ms)",
            activity_id,
            samples.len(),
            elapsed_ms(start)
        );
        Ok(samples)
    }

    /// Fetch one page of the athlete's activity listing.
    pub async fn fetch_athlete_activities(
        &self,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<RemoteActivity>> {
        let url = format!(
            "{}/athlete/activities?page={}&per_page={}",
            self.base_url, page, per_page
        );

        let response = self.get(&url).await?;
        let status = response.status();

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(MotionError::FetchError {
                message: "access token rejected".to_string(),
                status_code: Some(401),
            });
        }
        if !status.is_success() {
            let body = response.bytes().await.unwrap_or_default();
            return Err(MotionError::FetchError {
                message: error_message_from_body(&body, status),
                status_code: Some(status.as_u16()),
            });
        }

        response.json().await.map_err(|e| MotionError::FetchError {
            message: format!("malformed activity listing: {}", e),
            status_code: None,
        })
    }

    /// Fetch streams for many activities in parallel.
    ///
    /// Per-activity failures land in the result instead of aborting the
    /// batch; results come back in completion order.
    pub async fn fetch_activity_batch(&self, activity_ids: Vec<u64>) -> Vec<StreamBatchResult> {
        use futures::stream::{self, StreamExt};

        let total = activity_ids.len();
        let start = Instant::now();
        info!(
            "[StreamFetcher] Fetching {} activities with {} concurrent requests",
            total, MAX_CONCURRENCY
        );

        let results: Vec<StreamBatchResult> = stream::iter(activity_ids)
            .map(|activity_id| async move {
                match self.fetch_activity_samples(activity_id).await {
                    Ok(samples) => StreamBatchResult {
                        activity_id,
                        samples: Some(samples),
                        success: true,
                        error: None,
                    },
                    Err(e) => StreamBatchResult {
                        activity_id,
                        samples: None,
                        success: false,
                        error: Some(e.to_string()),
                    },
                }
            })
            .buffer_unordered(MAX_CONCURRENCY)
            .collect()
            .await;

        let success_count = results.iter().filter(|r| r.success).count();
        info!(
            "[StreamFetcher] Batch complete: {}/{} successful ({} ms)",
            success_count,
            total,
            elapsed_ms(start)
        );

        results
    }

    async fn get(&self, url: &str) -> Result<reqwest::Response> {
        self.client
            .get(url)
            .header("Authorization", &self.auth_header)
            .send()
            .await
            .map_err(|e| MotionError::FetchError {
                message: format!("request failed: {}", e),
                status_code: None,
            })
    }
}

/// Zip a stream set into a sample track.
///
/// The time and latlng streams are required; the shorter of the two caps
/// the track length. Sensor streams fill in where present and null out
/// where the sensor dropped.
pub fn samples_from_streams(streams: &StreamSet) -> Result<Vec<GeoSample>> {
    let time = streams
        .time
        .as_ref()
        .ok_or_fetch("response is missing the time stream")?;
    let latlng = streams
        .latlng
        .as_ref()
        .ok_or_fetch("response is missing the latlng stream")?;

    let n = time.data.len().min(latlng.data.len());
    let mut samples = Vec::with_capacity(n);
    for i in 0..n {
        let [latitude, longitude] = latlng.data[i];
        let mut sample = GeoSample::new(time.data[i], latitude, longitude);
        sample.elevation = sensor_value(&streams.altitude, i);
        sample.heart_rate = sensor_value(&streams.heartrate, i);
        sample.cadence = sensor_value(&streams.cadence, i);
        sample.power = sensor_value(&streams.watts, i);
        samples.push(sample);
    }
    Ok(samples)
}

fn sensor_value(stream: &Option<SensorStream>, index: usize) -> Option<f64> {
    stream
        .as_ref()
        .and_then(|s| s.data.get(index).copied().flatten())
}

/// Pull the API's error message out of a failure body, if it has one.
fn error_message_from_body(body: &[u8], status: reqwest::StatusCode) -> String {
    serde_json::from_slice::<serde_json::Value>(body)
        .ok()
        .and_then(|value| value.get("message")?.as_str().map(str::to_string))
        .unwrap_or_else(|| format!("HTTP {}", status))
}

#[cfg(test)]
mod tests {
    use super::*;

    const STREAM_JSON: &str = r#"{
        "time": {"data": [0.0, 10.0, 20.0]},
        "latlng": {"data": [[47.0, 8.0], [47.0002, 8.0], [47.0004, 8.0]]},
        "altitude": {"data": [400.0, null, 402.0]},
        "heartrate": {"data": [120, 125, 130]}
    }"#;

    #[test]
    fn test_stream_set_deserializes_wire_payload() {
        let streams: StreamSet = serde_json::from_str(STREAM_JSON).unwrap();
        assert_eq!(streams.time.as_ref().unwrap().data.len(), 3);
        assert_eq!(streams.latlng.as_ref().unwrap().data[0], [47.0, 8.0]);
        assert!(streams.watts.is_none());
    }

    #[test]
    fn test_samples_from_streams_zips_sensors() {
        let streams: StreamSet = serde_json::from_str(STREAM_JSON).unwrap();
        let samples = samples_from_streams(&streams).unwrap();

        assert_eq!(samples.len(), 3);
        assert_eq!(samples[0].timestamp, 0.0);
        assert!((samples[1].latitude - 47.0002).abs() < 1e-9);
        assert_eq!(samples[0].elevation, Some(400.0));
        assert_eq!(samples[1].elevation, None);
        assert_eq!(samples[2].heart_rate, Some(130.0));
        assert_eq!(samples[0].power, None);
    }

    #[test]
    fn test_missing_required_stream_is_fetch_error() {
        let streams: StreamSet =
            serde_json::from_str(r#"{"time": {"data": [0.0, 1.0]}}"#).unwrap();
        let err = samples_from_streams(&streams).unwrap_err();
        assert!(matches!(err, MotionError::FetchError { .. }));
    }

    #[test]
    fn test_stream_length_mismatch_truncates_to_shorter() {
        let streams: StreamSet = serde_json::from_str(
            r#"{
                "time": {"data": [0.0, 10.0, 20.0]},
                "latlng": {"data": [[47.0, 8.0], [47.0002, 8.0]]}
            }"#,
        )
        .unwrap();
        let samples = samples_from_streams(&streams).unwrap();
        assert_eq!(samples.len(), 2);
    }

    #[test]
    fn test_remote_activity_ignores_unknown_fields() {
        let json = r#"{
            "id": 987654,
            "name": "Morning Ride",
            "sport_type": "Ride",
            "distance": 24321.5,
            "moving_time": 4104,
            "elapsed_time": 4587,
            "start_date": "2024-05-01T06:00:00Z",
            "total_elevation_gain": 312.0,
            "kudos_count": 4
        }"#;
        let activity: RemoteActivity = serde_json::from_str(json).unwrap();
        assert_eq!(activity.id, 987654);
        assert_eq!(activity.sport_type, "Ride");
        assert_eq!(activity.moving_time, 4104.0);
    }

    #[test]
    fn test_error_message_prefers_api_body() {
        let body = br#"{"message": "Rate Limit Exceeded", "errors": []}"#;
        let message = error_message_from_body(body, reqwest::StatusCode::FORBIDDEN);
        assert_eq!(message, "Rate Limit Exceeded");

        let message = error_message_from_body(b"not json", reqwest::StatusCode::FORBIDDEN);
        assert_eq!(message, "HTTP 403 Forbidden");
    }

    #[test]
    fn test_batch_result_serializes_camel_case() {
        let result = StreamBatchResult {
            activity_id: 42,
            samples: None,
            success: false,
            error: Some("no activity with id 42".to_string()),
        };
        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains("\"activityId\":42"));
        assert!(json.contains("\"success\":false"));
    }

    #[tokio::test]
    async fn test_unreachable_host_is_fetch_error() {
        let fetcher = StreamFetcher::with_base_url("token", "http://127.0.0.1:1").unwrap();
        let err = fetcher.fetch_activity_samples(42).await.unwrap_err();
        assert!(matches!(err, MotionError::FetchError { status_code: None, .. }));
    }

    #[tokio::test]
    async fn test_batch_reports_per_activity_failures() {
        let fetcher = StreamFetcher::with_base_url("token", "http://127.0.0.1:1").unwrap();
        let results = fetcher.fetch_activity_batch(vec![1, 2]).await;
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| !r.success && r.error.is_some()));
    }
}
