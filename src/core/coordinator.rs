use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};

use super::alerts::{derive_alerts, Alert};
use super::fetch::{collect_signals, CacheKey, CacheStats, LocationCache, SignalRequest, SignalSource};
use super::model::SignalSnapshot;
use super::snapshot::FetchedSignals;

pub struct RefreshOutput {
    pub generation: u64,
    pub snapshot: SignalSnapshot,
    pub alerts: Vec<Alert>,
    pub from_cache: bool,
    pub logs: Vec<String>,
}

pub enum RefreshOutcome {
    Fresh(RefreshOutput),
    /// A newer refresh or an invalidation started while this one was in flight
    Stale { generation: u64 },
}

/// Fetches signals, builds a snapshot and derives its alerts.
pub struct Coordinator<S> {
    source: S,
    fetch_timeout: Duration,
    cache: LocationCache<FetchedSignals>,
    generation: AtomicU64,
}

impl<S: SignalSource> Coordinator<S> {
    pub fn new(source: S, fetch_timeout: Duration, cache: LocationCache<FetchedSignals>) -> Self {
        Self {
            source,
            fetch_timeout,
            cache,
            generation: AtomicU64::new(0),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Marks every in-flight refresh stale, e.g. after the location changed.
    pub fn invalidate(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub async fn refresh(&self, request: &SignalRequest, captured_at: DateTime<Utc>) -> RefreshOutcome {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let mut logs = Vec::new();
        let key = CacheKey::new(request);

        let cached = self.cache.get(&key);
        let from_cache = cached.is_some();
        let fetched = match cached {
            Some(fetched) => {
                logs.push(format!(
                    "Using cached signals for {:.3}, {:.3}",
                    request.coordinates.latitude, request.coordinates.longitude
                ));
                fetched
            }
            None => {
                let fetched = collect_signals(&self.source, request, self.fetch_timeout).await;
                if self.generation() != generation {
                    log::debug!("Discarding refresh {}: superseded", generation);
                    return RefreshOutcome::Stale { generation };
                }
                if fetched.is_empty() {
                    logs.push("No signals available; nothing cached".to_string());
                } else {
                    self.cache.insert(key, fetched.clone());
                }
                fetched
            }
        };

        for (name, missing) in [
            ("Forecast", fetched.forecast.is_none()),
            ("Wildfire", fetched.wildfire.is_none()),
            ("Weather", fetched.weather.is_none()),
            ("Breath score", fetched.breath_score.is_none()),
        ] {
            if missing {
                logs.push(format!("{} unavailable", name));
            }
        }

        let snapshot = SignalSnapshot::from_fetched(fetched, captured_at);
        let alerts = derive_alerts(&snapshot);
        log::info!(
            "Refresh {}: {} alert(s){}",
            generation,
            alerts.len(),
            if from_cache { " (cached)" } else { "" }
        );

        RefreshOutcome::Fresh(RefreshOutput {
            generation,
            snapshot,
            alerts,
            from_cache,
            logs,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::alerts::AlertKind;
    use crate::core::fetch::fake::FakeSource;
    use crate::core::model::{Coordinates, ForecastSignal, WildfireSignal};
    use chrono::TimeZone;

    fn request() -> SignalRequest {
        SignalRequest::new(Coordinates::new(37.7749, -122.4194).unwrap())
    }

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 9, 1, 16, 0, 0).unwrap()
    }

    fn smoky() -> FakeSource {
        FakeSource {
            forecast: Some(ForecastSignal {
                aqi: Some(165.0),
                ..Default::default()
            }),
            wildfire: Some(WildfireSignal {
                detected: true,
                count: 1,
                closest_distance_km: Some(40.0),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    fn fresh(outcome: RefreshOutcome) -> RefreshOutput {
        match outcome {
            RefreshOutcome::Fresh(output) => output,
            RefreshOutcome::Stale { generation } => panic!("refresh {} went stale", generation),
        }
    }

    #[tokio::test]
    async fn test_refresh_derives_alerts() {
        let coordinator = Coordinator::new(smoky(), Duration::from_secs(1), LocationCache::default());
        let output = fresh(coordinator.refresh(&request(), at()).await);

        assert!(!output.from_cache);
        assert_eq!(output.snapshot.captured_at, at());
        let kinds: Vec<_> = output.alerts.iter().map(|a| a.kind).collect();
        assert_eq!(
            kinds,
            vec![
                AlertKind::AiHealthGuidance,
                AlertKind::AqiThreshold,
                AlertKind::Wildfire,
                AlertKind::TrendMonitoring,
            ]
        );
        assert!(output.logs.iter().any(|l| l == "Weather unavailable"));
    }

    #[tokio::test]
    async fn test_second_refresh_served_from_cache() {
        let coordinator = Coordinator::new(smoky(), Duration::from_secs(1), LocationCache::default());
        fresh(coordinator.refresh(&request(), at()).await);
        let calls = coordinator.source.calls();

        let output = fresh(coordinator.refresh(&request(), at()).await);
        assert!(output.from_cache);
        assert_eq!(coordinator.source.calls(), calls);
        assert_eq!(coordinator.cache_stats().size, 1);

        coordinator.clear_cache();
        let output = fresh(coordinator.refresh(&request(), at()).await);
        assert!(!output.from_cache);
    }

    #[tokio::test]
    async fn test_empty_fetch_is_not_cached() {
        let coordinator =
            Coordinator::new(FakeSource::default(), Duration::from_secs(1), LocationCache::default());
        let output = fresh(coordinator.refresh(&request(), at()).await);
        assert!(output.alerts.is_empty());
        assert_eq!(coordinator.cache_stats().size, 0);
    }

    #[tokio::test]
    async fn test_radius_change_refetches_wildfire() {
        let source = FakeSource {
            wildfire: Some(WildfireSignal {
                detected: true,
                count: 1,
                closest_distance_km: Some(80.0),
                ..Default::default()
            }),
            ..Default::default()
        };
        let coordinator = Coordinator::new(source, Duration::from_secs(1), LocationCache::default());

        let wide = request().with_radius(100.0);
        let narrow = request().with_radius(25.0);
        fresh(coordinator.refresh(&wide, at()).await);
        let calls = coordinator.source().calls();

        let output = fresh(coordinator.refresh(&narrow, at()).await);
        assert!(!output.from_cache);
        assert!(coordinator.source().calls() > calls);
        assert_eq!(coordinator.cache_stats().size, 2);

        let output = fresh(coordinator.refresh(&wide, at()).await);
        assert!(output.from_cache);
    }

    #[tokio::test]
    async fn test_invalidate_marks_in_flight_refresh_stale() {
        let source = FakeSource {
            delay: Some(Duration::from_millis(100)),
            ..smoky()
        };
        let coordinator = Coordinator::new(source, Duration::from_secs(1), LocationCache::default());

        let req = request();
        let (outcome, _) = tokio::join!(coordinator.refresh(&req, at()), async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            coordinator.invalidate();
        });

        assert!(matches!(outcome, RefreshOutcome::Stale { generation: 1 }));
        assert_eq!(coordinator.cache_stats().size, 0);
    }
}
