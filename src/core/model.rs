// Signal types shared by the fetch layer, the snapshot builder and the alert engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Geographic bounds of the satellite forecast coverage (North America).
pub const TEMPO_MIN_LATITUDE: f64 = 17.0;
pub const TEMPO_MAX_LATITUDE: f64 = 64.0;
pub const TEMPO_MIN_LONGITUDE: f64 = -140.0;
pub const TEMPO_MAX_LONGITUDE: f64 = -50.0;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LocationError {
    #[error("Latitude must be between -90° and 90° (got {0})")]
    Latitude(f64),

    #[error("Longitude must be between -180° and 180° (got {0})")]
    Longitude(f64),
}

/// A validated point on the globe.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, LocationError> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(LocationError::Latitude(latitude));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(LocationError::Longitude(longitude));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// True when the point lies inside the satellite forecast coverage box.
    /// Points outside still get wildfire and weather signals.
    pub fn within_tempo_coverage(&self) -> bool {
        (TEMPO_MIN_LATITUDE..=TEMPO_MAX_LATITUDE).contains(&self.latitude)
            && (TEMPO_MIN_LONGITUDE..=TEMPO_MAX_LONGITUDE).contains(&self.longitude)
    }
}

/// Air quality forecast for one location.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastSignal {
    pub aqi: Option<f64>,
    pub category: Option<String>,
    pub location_name: Option<String>,
}

impl ForecastSignal {
    /// The category reported upstream, or the EPA name for the AQI.
    pub fn category_or_derived(&self) -> Option<String> {
        self.category
            .clone()
            .or_else(|| self.aqi.filter(|v| v.is_finite()).map(|v| aqi_category(v).to_string()))
    }
}

/// EPA category name for an AQI value.
pub fn aqi_category(aqi: f64) -> &'static str {
    if aqi <= 50.0 {
        "Good"
    } else if aqi <= 100.0 {
        "Moderate"
    } else if aqi <= 150.0 {
        "Unhealthy for Sensitive Groups"
    } else if aqi <= 200.0 {
        "Unhealthy"
    } else if aqi <= 300.0 {
        "Very Unhealthy"
    } else {
        "Hazardous"
    }
}

/// Satellite fire-intensity class for the closest detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FireIntensity {
    Low,
    Moderate,
    High,
    Extreme,
}

impl FireIntensity {
    /// FIRMS classification from brightness temperature (K) and confidence (%).
    pub fn classify(brightness_k: f64, confidence_percent: f64) -> Self {
        if brightness_k >= 380.0 && confidence_percent >= 80.0 {
            Self::Extreme
        } else if brightness_k >= 360.0 || confidence_percent >= 70.0 {
            Self::High
        } else if brightness_k >= 340.0 || confidence_percent >= 50.0 {
            Self::Moderate
        } else {
            Self::Low
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Moderate => "moderate",
            Self::High => "high",
            Self::Extreme => "extreme",
        }
    }
}

/// Active wildfire detections around a location.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WildfireSignal {
    pub detected: bool,
    pub count: u32,
    pub closest_distance_km: Option<f64>,
    pub brightness_k: Option<f64>,
    pub confidence_percent: Option<f64>,
    pub fire_location_name: Option<String>,
}

impl WildfireSignal {
    /// Intensity of the closest fire. Display only; alerts never use it.
    pub fn intensity(&self) -> Option<FireIntensity> {
        let brightness = self.brightness_k.filter(|v| v.is_finite())?;
        let confidence = self.confidence_percent.filter(|v| v.is_finite())?;
        Some(FireIntensity::classify(brightness, confidence))
    }
}

/// Current weather conditions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherSignal {
    pub temperature_celsius: Option<f64>,
    pub umbrella_needed: bool,
    pub rain_message: Option<String>,
    pub precipitation_chance_percent: Option<f64>,
}

/// Supplementary 0-100 breathability score, shown next to the alerts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreathScore {
    pub score: f64,
    pub rating: String,
}

/// Latest signals for one (location, refresh tick) pair.
///
/// Every signal is optional: `None` means the fetch failed or returned
/// nothing usable, which is different from a zero-valued reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignalSnapshot {
    pub forecast: Option<ForecastSignal>,
    pub wildfire: Option<WildfireSignal>,
    pub weather: Option<WeatherSignal>,
    pub breath_score: Option<BreathScore>,
    pub captured_at: DateTime<Utc>,
}

impl SignalSnapshot {
    /// A snapshot with no signals at all.
    pub fn empty(captured_at: DateTime<Utc>) -> Self {
        Self {
            forecast: None,
            wildfire: None,
            weather: None,
            breath_score: None,
            captured_at,
        }
    }

    pub fn has_any_signal(&self) -> bool {
        self.forecast.is_some()
            || self.wildfire.is_some()
            || self.weather.is_some()
            || self.breath_score.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinates_validation() {
        assert!(Coordinates::new(40.7128, -74.0060).is_ok());
        assert_eq!(Coordinates::new(91.0, 0.0), Err(LocationError::Latitude(91.0)));
        assert_eq!(Coordinates::new(0.0, -180.5), Err(LocationError::Longitude(-180.5)));
        assert!(Coordinates::new(f64::NAN, 0.0).is_err());
    }

    #[test]
    fn test_tempo_coverage() {
        let nyc = Coordinates::new(40.7128, -74.0060).unwrap();
        let paris = Coordinates::new(48.8566, 2.3522).unwrap();
        assert!(nyc.within_tempo_coverage());
        assert!(!paris.within_tempo_coverage());
    }

    #[test]
    fn test_aqi_categories() {
        assert_eq!(aqi_category(50.0), "Good");
        assert_eq!(aqi_category(100.0), "Moderate");
        assert_eq!(aqi_category(150.0), "Unhealthy for Sensitive Groups");
        assert_eq!(aqi_category(200.0), "Unhealthy");
        assert_eq!(aqi_category(300.0), "Very Unhealthy");
        assert_eq!(aqi_category(301.0), "Hazardous");
    }

    #[test]
    fn test_category_prefers_upstream_value() {
        let forecast = ForecastSignal {
            aqi: Some(120.0),
            category: Some("Custom".to_string()),
            location_name: None,
        };
        assert_eq!(forecast.category_or_derived().as_deref(), Some("Custom"));

        let derived = ForecastSignal {
            category: None,
            ..forecast
        };
        assert_eq!(
            derived.category_or_derived().as_deref(),
            Some("Unhealthy for Sensitive Groups")
        );
    }

    #[test]
    fn test_fire_intensity() {
        assert_eq!(FireIntensity::classify(385.0, 85.0), FireIntensity::Extreme);
        assert_eq!(FireIntensity::classify(365.2, 85.0), FireIntensity::High);
        assert_eq!(FireIntensity::classify(342.8, 65.0), FireIntensity::Moderate);
        assert_eq!(FireIntensity::classify(320.0, 30.0), FireIntensity::Low);

        let partial = WildfireSignal {
            brightness_k: Some(365.0),
            ..Default::default()
        };
        assert_eq!(partial.intensity(), None);
    }
}
