//! Local breath score calculation.
//!
//! 0-100 breathability score shown next to the alerts. Used when the backend
//! did not return one; the alert rules never read it.

use super::alerts::severity::celsius_to_fahrenheit;
use super::model::{BreathScore, SignalSnapshot};

/// Inputs for a local breath score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BreathInputs {
    pub aqi: f64,
    pub wildfire_distance_km: Option<f64>,
    pub humidity_percent: f64,
    pub temperature_fahrenheit: f64,
}

impl BreathInputs {
    /// Neutral humidity and temperature, as the backend assumes when unknown.
    pub fn from_aqi(aqi: f64) -> Self {
        Self {
            aqi,
            wildfire_distance_km: None,
            humidity_percent: 50.0,
            temperature_fahrenheit: 70.0,
        }
    }
}

pub fn calculate(inputs: &BreathInputs) -> BreathScore {
    let score = aqi_to_base_score(inputs.aqi)
        - wildfire_penalty(inputs.wildfire_distance_km)
        + weather_modifier(inputs.humidity_percent, inputs.temperature_fahrenheit);
    let score = (score.clamp(0.0, 100.0) * 10.0).round() / 10.0;

    BreathScore {
        score,
        rating: rating(score).to_string(),
    }
}

/// The backend score when present, else a local one from the snapshot's AQI.
pub fn for_snapshot(snapshot: &SignalSnapshot) -> Option<BreathScore> {
    if let Some(score) = &snapshot.breath_score {
        return Some(score.clone());
    }
    let aqi = snapshot
        .forecast
        .as_ref()
        .and_then(|f| f.aqi)
        .filter(|aqi| aqi.is_finite())?;

    let mut inputs = BreathInputs::from_aqi(aqi);
    inputs.wildfire_distance_km = snapshot
        .wildfire
        .as_ref()
        .filter(|w| w.detected)
        .and_then(|w| w.closest_distance_km);
    if let Some(celsius) = snapshot
        .weather
        .as_ref()
        .and_then(|w| w.temperature_celsius)
        .filter(|t| t.is_finite())
    {
        inputs.temperature_fahrenheit = celsius_to_fahrenheit(celsius);
    }
    Some(calculate(&inputs))
}

/// Piecewise-linear inversion of the AQI scale.
fn aqi_to_base_score(aqi: f64) -> f64 {
    if aqi <= 50.0 {
        100.0 - (aqi / 50.0) * 15.0
    } else if aqi <= 100.0 {
        85.0 - ((aqi - 50.0) / 50.0) * 15.0
    } else if aqi <= 150.0 {
        70.0 - ((aqi - 100.0) / 50.0) * 20.0
    } else if aqi <= 200.0 {
        50.0 - ((aqi - 150.0) / 50.0) * 20.0
    } else if aqi <= 300.0 {
        30.0 - ((aqi - 200.0) / 100.0) * 20.0
    } else {
        (10.0 - ((aqi - 300.0) / 200.0) * 10.0).max(0.0)
    }
}

fn wildfire_penalty(distance_km: Option<f64>) -> f64 {
    match distance_km {
        Some(d) if d < 10.0 => 30.0,
        Some(d) if d < 25.0 => 20.0,
        Some(d) if d < 50.0 => 12.0,
        Some(d) if d < 100.0 => 5.0,
        _ => 0.0,
    }
}

fn weather_modifier(humidity_percent: f64, temperature_fahrenheit: f64) -> f64 {
    let mut modifier = 0.0;

    // 30-60% humidity is easiest on the airways
    if (30.0..=60.0).contains(&humidity_percent) {
        modifier += 2.0;
    } else if !(20.0..=80.0).contains(&humidity_percent) {
        modifier -= 3.0;
    }

    if !(32.0..=95.0).contains(&temperature_fahrenheit) {
        modifier -= 2.0;
    }

    modifier
}

/// Mask-recommendation rating for a score.
pub fn rating(score: f64) -> &'static str {
    if score >= 90.0 {
        "Excellent"
    } else if score >= 75.0 {
        "Good"
    } else if score >= 60.0 {
        "Moderate"
    } else if score >= 45.0 {
        "Unhealthy for Sensitive Groups"
    } else if score >= 30.0 {
        "Unhealthy"
    } else if score >= 15.0 {
        "Very Unhealthy"
    } else {
        "Hazardous"
    }
}
