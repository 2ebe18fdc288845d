//! Joins independently fetched signals into one immutable snapshot.

use chrono::{DateTime, Utc};

use super::model::{BreathScore, ForecastSignal, SignalSnapshot, WeatherSignal, WildfireSignal};

/// Outcome of one fan-out fetch. A `None` field is a signal that failed,
/// timed out or came back empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FetchedSignals {
    pub forecast: Option<ForecastSignal>,
    pub wildfire: Option<WildfireSignal>,
    pub weather: Option<WeatherSignal>,
    pub breath_score: Option<BreathScore>,
}

impl FetchedSignals {
    pub fn present_count(&self) -> usize {
        [
            self.forecast.is_some(),
            self.wildfire.is_some(),
            self.weather.is_some(),
            self.breath_score.is_some(),
        ]
        .iter()
        .filter(|present| **present)
        .count()
    }

    pub fn is_empty(&self) -> bool {
        self.present_count() == 0
    }
}

/// Builder for `SignalSnapshot`. Never fails; unset signals stay `None`.
#[derive(Debug, Clone)]
pub struct SnapshotBuilder {
    snapshot: SignalSnapshot,
}

impl SnapshotBuilder {
    pub fn new(captured_at: DateTime<Utc>) -> Self {
        Self {
            snapshot: SignalSnapshot::empty(captured_at),
        }
    }

    pub fn forecast(mut self, forecast: Option<ForecastSignal>) -> Self {
        self.snapshot.forecast = forecast;
        self
    }

    pub fn wildfire(mut self, wildfire: Option<WildfireSignal>) -> Self {
        self.snapshot.wildfire = wildfire;
        self
    }

    pub fn weather(mut self, weather: Option<WeatherSignal>) -> Self {
        self.snapshot.weather = weather;
        self
    }

    pub fn breath_score(mut self, breath_score: Option<BreathScore>) -> Self {
        self.snapshot.breath_score = breath_score;
        self
    }

    pub fn build(self) -> SignalSnapshot {
        self.snapshot
    }
}

impl SignalSnapshot {
    pub fn from_fetched(fetched: FetchedSignals, captured_at: DateTime<Utc>) -> Self {
        SnapshotBuilder::new(captured_at)
            .forecast(fetched.forecast)
            .wildfire(fetched.wildfire)
            .weather(fetched.weather)
            .breath_score(fetched.breath_score)
            .build()
    }
}
