// Signal fetching.
//
// - client.rs: HTTP `SignalSource` backed by the air-quality API
// - wire.rs: Response shapes and normalization
// - cache.rs: Per-location TTL cache
//
// Each signal is fetched independently. A failure or timeout degrades that
// one signal to `None`; it never aborts the others.

pub mod cache;
pub mod client;
pub mod wire;

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;

pub use cache::{CacheKey, CacheStats, LocationCache};
pub use client::{ApiClient, Endpoints, FetchError};

use super::model::{BreathScore, Coordinates, ForecastSignal, WeatherSignal, WildfireSignal};
use super::snapshot::FetchedSignals;

/// What to fetch and where.
#[derive(Debug, Clone, PartialEq)]
pub struct SignalRequest {
    pub coordinates: Coordinates,
    pub city: Option<String>,
    pub wildfire_radius_km: f64,
}

impl SignalRequest {
    pub fn new(coordinates: Coordinates) -> Self {
        Self {
            coordinates,
            city: None,
            wildfire_radius_km: 100.0,
        }
    }

    pub fn with_city(mut self, city: Option<String>) -> Self {
        self.city = city.filter(|c| !c.trim().is_empty());
        self
    }

    pub fn with_radius(mut self, radius_km: f64) -> Self {
        self.wildfire_radius_km = radius_km;
        self
    }
}

/// Source of the four independent signals.
#[async_trait]
pub trait SignalSource: Send + Sync {
    async fn fetch_forecast(&self, request: &SignalRequest) -> Result<ForecastSignal, FetchError>;
    async fn fetch_wildfire(&self, request: &SignalRequest) -> Result<WildfireSignal, FetchError>;
    async fn fetch_weather(&self, request: &SignalRequest) -> Result<WeatherSignal, FetchError>;
    async fn fetch_breath_score(&self, request: &SignalRequest) -> Result<BreathScore, FetchError>;
}

/// Fetch every signal concurrently, each bounded by `limit`.
pub async fn collect_signals<S>(source: &S, request: &SignalRequest, limit: Duration) -> FetchedSignals
where
    S: SignalSource + ?Sized,
{
    let (forecast, wildfire, weather, breath_score) = tokio::join!(
        guarded("forecast", limit, source.fetch_forecast(request)),
        guarded("wildfire", limit, source.fetch_wildfire(request)),
        guarded("weather", limit, source.fetch_weather(request)),
        guarded("breath score", limit, source.fetch_breath_score(request)),
    );

    FetchedSignals {
        forecast,
        wildfire,
        weather,
        breath_score,
    }
}

async fn guarded<T, F>(signal: &str, limit: Duration, fetch: F) -> Option<T>
where
    F: Future<Output = Result<T, FetchError>>,
{
    let error = match tokio::time::timeout(limit, fetch).await {
        Ok(Ok(value)) => return Some(value),
        Ok(Err(e)) => e,
        Err(_) => FetchError::Timeout(limit),
    };
    log::warn!("{} unavailable: {}", signal, error);
    None
}


#[cfg(test)]
mod tests {
    use super::fake::FakeSource;
    use super::*;

    fn request() -> SignalRequest {
        SignalRequest::new(Coordinates::new(34.05, -118.24).unwrap())
    }

    #[tokio::test]
    async fn test_failed_signal_degrades_to_none() {
        let source = FakeSource {
            forecast: Some(ForecastSignal {
                aqi: Some(130.0),
                ..Default::default()
            }),
            wildfire: None,
            weather: Some(WeatherSignal::default()),
            ..Default::default()
        };

        let fetched = collect_signals(&source, &request(), Duration::from_secs(1)).await;
        assert_eq!(fetched.forecast.unwrap().aqi, Some(130.0));
        assert!(fetched.wildfire.is_none());
        assert!(fetched.weather.is_some());
        assert!(fetched.breath_score.is_none());
        assert_eq!(source.calls(), 4);
    }

    #[tokio::test]
    async fn test_slow_signal_times_out_alone() {
        let source = FakeSource {
            forecast: Some(ForecastSignal::default()),
            weather: Some(WeatherSignal::default()),
            slow_weather: Some(Duration::from_secs(5)),
            ..Default::default()
        };

        let fetched = collect_signals(&source, &request(), Duration::from_millis(50)).await;
        assert!(fetched.forecast.is_some());
        assert!(fetched.weather.is_none());
    }

    #[test]
    fn test_request_builder_drops_blank_city() {
        let req = request().with_city(Some("  ".to_string())).with_radius(50.0);
        assert_eq!(req.city, None);
        assert_eq!(req.wildfire_radius_km, 50.0);
    }
}
