//! Remote point-elevation fallback.
//!
//! When no local tile covers a coordinate, elevation may be fetched from an
//! OpenTopoData-compatible HTTP service. Lookups are best effort: every
//! failure (network, timeout, bad status, unparseable body, null value)
//! degrades to [`ElevationResult::no_data`] and is only logged.
//!
//! # API Format
//!
//! ```text
//! GET {url}?locations={lat},{lon}
//!
//! {"results": [{"elevation": 812.0, ...}], "status": "OK"}
//! ```

use std::time::Duration;

use reqwest::blocking::Client;
use serde::Deserialize;

use crate::coord::Coordinate;
use crate::error::{Result, TerrainError};
use crate::sampler::{ElevationResult, Provenance};

/// Default remote endpoint (SRTM 90m dataset).
pub const DEFAULT_REMOTE_URL: &str = "https://api.opentopodata.org/v1/srtm90m";

/// Default timeout for remote requests in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// A source of point elevations used when no local tile is available.
pub trait ElevationProvider: Send + Sync {
    /// Fetch the elevation at `coordinate`.
    ///
    /// Never fails: unavailability is reported as a no-data result.
    fn fetch_elevation(&self, coordinate: Coordinate) -> ElevationResult;
}

/// Configuration for the HTTP elevation provider.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteConfig {
    /// Dataset endpoint; the query string is appended to it.
    pub url: String,
    /// Request timeout.
    pub timeout: Duration,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_REMOTE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl RemoteConfig {
    /// Use a different endpoint.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Elevation provider backed by an OpenTopoData-style HTTP API.
///
/// Makes one blocking request per lookup, without retries.
#[derive(Debug)]
pub struct HttpElevationProvider {
    client: Client,
    config: RemoteConfig,
}

#[derive(Deserialize)]
struct ApiResponse {
    #[serde(default)]
    results: Vec<ApiResult>,
}

#[derive(Deserialize)]
struct ApiResult {
    elevation: Option<f64>,
}

impl HttpElevationProvider {
    /// Create a provider with the given configuration.
    pub fn new(config: RemoteConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| TerrainError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    /// Get the provider configuration.
    pub fn config(&self) -> &RemoteConfig {
        &self.config
    }

    /// `GET {url}` with `locations={lat},{lon}` appended to any existing query.
    fn request(&self, coordinate: Coordinate) -> reqwest::Result<reqwest::blocking::Request> {
        let locations = format!("{},{}", coordinate.latitude, coordinate.longitude);
        self.client
            .get(&self.config.url)
            .query(&[("locations", locations)])
            .build()
    }

    fn try_fetch(&self, coordinate: Coordinate) -> Result<f64> {
        let unavailable = |reason: String| TerrainError::RemoteUnavailable { reason };

        let request = self
            .request(coordinate)
            .map_err(|e| unavailable(e.to_string()))?;
        let response = self
            .client
            .execute(request)
            .map_err(|e| unavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(unavailable(format!("HTTP {}", response.status())));
        }

        let body = response.text().map_err(|e| unavailable(e.to_string()))?;
        parse_response(&body)
    }
}

impl ElevationProvider for HttpElevationProvider {
    fn fetch_elevation(&self, coordinate: Coordinate) -> ElevationResult {
        match self.try_fetch(coordinate) {
            Ok(meters) => {
                tracing::debug!(
                    lat = coordinate.latitude,
                    lon = coordinate.longitude,
                    meters,
                    "Remote elevation"
                );
                ElevationResult::value(meters, Provenance::Remote)
            }
            Err(e) => {
                tracing::warn!(
                    lat = coordinate.latitude,
                    lon = coordinate.longitude,
                    error = %e,
                    "Remote elevation lookup failed"
                );
                ElevationResult::no_data(Provenance::Remote)
            }
        }
    }
}

/// Extract the first elevation from a response body.
fn parse_response(body: &str) -> Result<f64> {
    let response: ApiResponse =
        serde_json::from_str(body).map_err(|e| TerrainError::RemoteUnavailable {
            reason: format!("invalid response: {}", e),
        })?;

    response
        .results
        .first()
        .and_then(|result| result.elevation)
        .ok_or_else(|| TerrainError::RemoteUnavailable {
            reason: "no elevation in response".to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread;

    /// Serve a single canned HTTP response on a local port.
    fn serve_once(status: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        thread::spawn(move || {
            if let Ok((mut stream, _)) = listener.accept() {
                read_request(&mut stream);
                let response = format!(
                    "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    body.len(),
                    body
                );
                let _ = stream.write_all(response.as_bytes());
            }
        });

        format!("http://{}/v1/srtm90m", addr)
    }

    fn read_request(stream: &mut std::net::TcpStream) {
        let mut buf = [0u8; 1024];
        let mut request = Vec::new();
        while let Ok(n) = stream.read(&mut buf) {
            if n == 0 {
                break;
            }
            request.extend_from_slice(&buf[..n]);
            if request.windows(4).any(|w| w == b"\r\n\r\n") {
                break;
            }
        }
    }

    fn provider(url: String, timeout: Duration) -> HttpElevationProvider {
        HttpElevationProvider::new(RemoteConfig::default().with_url(url).with_timeout(timeout))
            .unwrap()
    }

    #[test]
    fn test_default_config() {
        let config = RemoteConfig::default();
        assert_eq!(config.url, DEFAULT_REMOTE_URL);
        assert_eq!(config.timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_request_url() {
        let provider = provider("http://localhost/v1/srtm90m".into(), Duration::from_secs(1));
        let request = provider.request(Coordinate::new(22.5, -78.25)).unwrap();
        let url = request.url();

        assert_eq!(url.path(), "/v1/srtm90m");
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(pairs, vec![("locations".to_string(), "22.5,-78.25".to_string())]);
    }

    #[test]
    fn test_request_url_keeps_existing_query() {
        let provider = provider(
            "http://localhost/v1/srtm90m?interpolation=cubic".into(),
            Duration::from_secs(1),
        );
        let request = provider.request(Coordinate::new(1.5, 2.5)).unwrap();
        let url = request.url();

        assert_eq!(url.as_str().matches('?').count(), 1);
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(
            pairs,
            vec![
                ("interpolation".to_string(), "cubic".to_string()),
                ("locations".to_string(), "1.5,2.5".to_string()),
            ]
        );
    }

    #[test]
    fn test_parse_response() {
        let body = r#"{"results": [{"dataset": "srtm90m", "elevation": 812.5,
            "location": {"lat": 22.5, "lng": 78.5}}], "status": "OK"}"#;
        assert_eq!(parse_response(body).unwrap(), 812.5);

        assert!(parse_response(r#"{"results": []}"#).is_err());
        assert!(parse_response(r#"{"results": [{"elevation": null}]}"#).is_err());
        assert!(parse_response("<html>").is_err());
    }

    #[test]
    fn test_fetch_success() {
        let url = serve_once("200 OK", r#"{"results": [{"elevation": 512.3}], "status": "OK"}"#);
        let result = provider(url, Duration::from_secs(5)).fetch_elevation(Coordinate::new(1.5, 2.5));

        assert_eq!(result.meters(), Some(512.3));
        assert_eq!(result.provenance(), Provenance::Remote);
    }

    #[test]
    fn test_fetch_server_error_is_no_data() {
        let url = serve_once("500 Internal Server Error", r#"{"error": "boom"}"#);
        let result = provider(url, Duration::from_secs(5)).fetch_elevation(Coordinate::new(1.5, 2.5));

        assert!(result.is_no_data());
        assert_eq!(result.provenance(), Provenance::Remote);
    }

    #[test]
    fn test_fetch_null_elevation_is_no_data() {
        let url = serve_once("200 OK", r#"{"results": [{"elevation": null}], "status": "OK"}"#);
        let result = provider(url, Duration::from_secs(5)).fetch_elevation(Coordinate::new(1.5, 2.5));
        assert!(result.is_no_data());
    }

    #[test]
    fn test_fetch_empty_results_is_no_data() {
        let url = serve_once("200 OK", r#"{"results": [], "status": "OK"}"#);
        let result = provider(url, Duration::from_secs(5)).fetch_elevation(Coordinate::new(1.5, 2.5));
        assert!(result.is_no_data());
    }

    #[test]
    fn test_fetch_timeout_is_no_data() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        thread::spawn(move || {
            // Accept but never answer
            if let Ok((stream, _)) = listener.accept() {
                thread::sleep(Duration::from_secs(3));
                drop(stream);
            }
        });

        let provider = provider(format!("http://{}/v1/srtm90m", addr), Duration::from_millis(200));
        let result = provider.fetch_elevation(Coordinate::new(1.5, 2.5));
        assert!(result.is_no_data());
    }

    #[test]
    fn test_fetch_unreachable_is_no_data() {
        let addr = TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap();

        let provider = provider(format!("http://{}/v1/srtm90m", addr), Duration::from_secs(2));
        let result = provider.fetch_elevation(Coordinate::new(1.5, 2.5));
        assert!(result.is_no_data());
    }
}
