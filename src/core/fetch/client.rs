use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::wire::{BreathResponse, ForecastResponse, WeatherResponse, WildfireResponse};
use super::{SignalRequest, SignalSource};
use crate::core::model::{BreathScore, ForecastSignal, WeatherSignal, WildfireSignal};

const USER_AGENT: &str = concat!("sky-watcher/", env!("CARGO_PKG_VERSION"));

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Network error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected status {0}")]
    Status(u16),

    #[error("Endpoint not served: {0}")]
    NotFound(String),

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    #[error("No usable {0} data")]
    Unusable(&'static str),
}

/// Route of each signal, relative to the base URL.
///
/// `forecast` and `weather` are served by the stock backend. Wildfire and
/// breath score routes are only present on deployments that expose those
/// services; elsewhere the signals come back absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    pub forecast: String,
    pub wildfires: String,
    pub weather: String,
    pub breath_score: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            forecast: "forecast".to_string(),
            wildfires: "wildfires".to_string(),
            weather: "weather".to_string(),
            breath_score: "breath-score".to_string(),
        }
    }
}

/// HTTP client for the air-quality backend.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    endpoints: Endpoints,
}

impl ApiClient {
    pub fn new(
        base_url: impl Into<String>,
        timeout: Duration,
        endpoints: Endpoints,
    ) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            endpoints,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn coordinate_query(request: &SignalRequest) -> Vec<(&'static str, String)> {
        vec![
            ("lat", request.coordinates.latitude.to_string()),
            ("lon", request.coordinates.longitude.to_string()),
        ]
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&'static str, String)],
    ) -> Result<T, FetchError> {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        debug!("GET {} {:?}", url, query);

        let response = self.http.get(&url).query(query).send().await?;
        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(FetchError::NotFound(url));
        }
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| FetchError::Decode(e.to_string()))
    }
}

#[async_trait]
impl SignalSource for ApiClient {
    async fn fetch_forecast(&self, request: &SignalRequest) -> Result<ForecastSignal, FetchError> {
        let mut query = Self::coordinate_query(request);
        if let Some(city) = &request.city {
            query.push(("city", city.clone()));
        }
        let response: ForecastResponse = self.get_json(&self.endpoints.forecast, &query).await?;
        Ok(response.into_signal(request.city.as_deref()))
    }

    async fn fetch_wildfire(&self, request: &SignalRequest) -> Result<WildfireSignal, FetchError> {
        let mut query = Self::coordinate_query(request);
        query.push(("radius", request.wildfire_radius_km.to_string()));
        let response: WildfireResponse = self.get_json(&self.endpoints.wildfires, &query).await?;
        response
            .into_signal(&request.coordinates, request.wildfire_radius_km)
            .ok_or(FetchError::Unusable("wildfire"))
    }

    async fn fetch_weather(&self, request: &SignalRequest) -> Result<WeatherSignal, FetchError> {
        let query = Self::coordinate_query(request);
        let response: WeatherResponse = self.get_json(&self.endpoints.weather, &query).await?;
        response.into_signal().ok_or(FetchError::Unusable("weather"))
    }

    async fn fetch_breath_score(&self, request: &SignalRequest) -> Result<BreathScore, FetchError> {
        let query = Self::coordinate_query(request);
        let response: BreathResponse = self.get_json(&self.endpoints.breath_score, &query).await?;
        response.into_signal().ok_or(FetchError::Unusable("breath score"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::Coordinates;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    /// Answers one request with `status` and `body`; yields the request line.
    async fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut received = Vec::new();
            let mut buf = [0u8; 1024];
            while !received.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                received.extend_from_slice(&buf[..n]);
            }
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();

            let text = String::from_utf8_lossy(&received).to_string();
            text.lines().next().unwrap_or_default().to_string()
        });

        (base_url, handle)
    }

    fn client(base_url: &str) -> ApiClient {
        ApiClient::new(base_url, Duration::from_secs(5), Endpoints::default()).unwrap()
    }

    fn request() -> SignalRequest {
        SignalRequest::new(Coordinates::new(40.7128, -74.006).unwrap())
            .with_city(Some("New York".to_string()))
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        assert_eq!(client("http://localhost:5001/").base_url(), "http://localhost:5001");
    }

    #[test]
    fn test_default_endpoints_are_backend_routes() {
        let endpoints = Endpoints::default();
        assert_eq!(endpoints.forecast, "forecast");
        assert_eq!(endpoints.weather, "weather");
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(FetchError::Status(503).to_string(), "Unexpected status 503");
        assert_eq!(
            FetchError::Unusable("weather").to_string(),
            "No usable weather data"
        );
    }

    #[tokio::test]
    async fn test_forecast_hits_forecast_route() {
        let (base_url, server) = serve_once(
            "200 OK",
            r#"{"location":{"city":"New York"},"prediction":{"aqi":87,"category":"Moderate"}}"#,
        )
        .await;

        let forecast = client(&base_url).fetch_forecast(&request()).await.unwrap();
        assert_eq!(forecast.aqi, Some(87.0));

        let request_line = server.await.unwrap();
        assert!(request_line.starts_with("GET /forecast?"), "{}", request_line);
        assert!(request_line.contains("lat=40.7128"));
        assert!(request_line.contains("lon=-74.006"));
        assert!(request_line.contains("city=New"));
    }

    #[tokio::test]
    async fn test_weather_hits_weather_route() {
        let (base_url, server) = serve_once(
            "200 OK",
            r#"{"location":{"lat":40.7128,"lon":-74.006},"weather":{"temperature":95,"temperature_unit":"F","conditions":"Sunny"}}"#,
        )
        .await;

        let weather = client(&base_url).fetch_weather(&request()).await.unwrap();
        assert_eq!(weather.temperature_celsius, Some(35.0));
        assert!(!weather.umbrella_needed);

        let request_line = server.await.unwrap();
        assert!(request_line.starts_with("GET /weather?"), "{}", request_line);
    }

    #[tokio::test]
    async fn test_missing_route_is_not_found() {
        let (base_url, server) = serve_once("404 NOT FOUND", r#"{"error":"not found"}"#).await;

        let result = client(&base_url).fetch_wildfire(&request()).await;
        assert!(matches!(result, Err(FetchError::NotFound(_))));

        let request_line = server.await.unwrap();
        assert!(request_line.starts_with("GET /wildfires?"), "{}", request_line);
        assert!(request_line.contains("radius=100"));
    }
}
