//! Backend response shapes and their normalization into signals.
//!
//! Every field is optional on the wire. Normalization decides what counts as
//! a usable signal; `None` from an `into_signal` means "treat as absent".

use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;

use crate::core::alerts::severity::fahrenheit_to_celsius;
use crate::core::breath;
use crate::core::model::{BreathScore, Coordinates, ForecastSignal, WeatherSignal, WildfireSignal};

const EARTH_RADIUS_KM: f64 = 6371.0;

/// `data_source` value the backend uses when it invented the weather.
const FALLBACK_WEATHER_SOURCE: &str = "Fallback data";

lazy_static! {
    // "Heavy rain likely around 03:00 PM (80%)" / "Rain chance: 35%"
    static ref RAIN_PERCENT: Regex =
        Regex::new(r"(\d{1,3}(?:\.\d+)?)\s*%").expect("Invalid rain percent regex");
    // Short forecasts such as "Chance Rain Showers" or "Slight Chance Thunderstorms"
    static ref WET_CONDITIONS: Regex =
        Regex::new(r"(?i)\b(rain|showers?|thunderstorms?|drizzle)\b").expect("Invalid conditions regex");
}

/// Great-circle distance in kilometres (Haversine).
pub fn haversine_km(from: &Coordinates, latitude: f64, longitude: f64) -> f64 {
    let lat1 = from.latitude.to_radians();
    let lat2 = latitude.to_radians();
    let delta_lat = (latitude - from.latitude).to_radians();
    let delta_lon = (longitude - from.longitude).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_KM * c
}

/// Numbers sometimes arrive as strings ("85") from CSV-backed sources.
fn as_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    number.filter(|v: &f64| v.is_finite())
}

// ---------------------------------------------------------------------------
// Forecast
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ForecastResponse {
    #[serde(default)]
    pub location: Option<ForecastLocation>,
    #[serde(default)]
    pub prediction: Option<Prediction>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ForecastLocation {
    #[serde(default)]
    pub city: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Prediction {
    #[serde(default)]
    pub aqi: Option<Value>,
    #[serde(default)]
    pub category: Option<String>,
}

impl ForecastResponse {
    /// A response without a prediction is still a forecast, just one with no AQI.
    pub fn into_signal(self, requested_city: Option<&str>) -> ForecastSignal {
        let (aqi, category) = match self.prediction {
            Some(p) => (p.aqi.as_ref().and_then(as_number), p.category),
            None => (None, None),
        };
        let location_name = self
            .location
            .and_then(|l| l.city)
            .filter(|c| !c.trim().is_empty())
            .or_else(|| requested_city.map(str::to_string));

        ForecastSignal {
            aqi,
            category,
            location_name,
        }
    }
}

// ---------------------------------------------------------------------------
// Wildfire
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FireDetection {
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub brightness: Option<Value>,
    #[serde(default)]
    pub confidence: Option<Value>,
    #[serde(default)]
    pub distance_km: Option<f64>,
    #[serde(default)]
    pub location_name: Option<String>,
}

impl FireDetection {
    fn distance_from(&self, origin: &Coordinates) -> Option<f64> {
        self.distance_km.filter(|d| d.is_finite()).or_else(|| {
            let lat = self.latitude?;
            let lon = self.longitude?;
            Some(haversine_km(origin, lat, lon)).filter(|d| d.is_finite())
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WildfireResponse {
    #[serde(default)]
    pub count: Option<u32>,
    #[serde(default)]
    pub fires: Option<Vec<FireDetection>>,
    #[serde(default)]
    pub closest_fire: Option<FireDetection>,
    /// Set by the backend when it served demo data
    #[serde(default)]
    pub note: Option<String>,
}

impl WildfireResponse {
    pub fn is_mock(&self) -> bool {
        self.note
            .as_deref()
            .map(|n| n.to_lowercase().contains("mock"))
            .unwrap_or(false)
    }

    /// Returns None for demo data; an empty fire list is a real "no fires" signal.
    pub fn into_signal(self, origin: &Coordinates, radius_km: f64) -> Option<WildfireSignal> {
        if self.is_mock() {
            return None;
        }

        let had_list = self.fires.is_some();
        let detections = match self.fires {
            Some(fires) => fires,
            None => self.closest_fire.into_iter().collect(),
        };

        let mut located: Vec<(f64, FireDetection)> = detections
            .into_iter()
            .filter_map(|fire| {
                let distance = fire.distance_from(origin)?;
                (distance <= radius_km).then_some((distance, fire))
            })
            .collect();
        located.sort_by(|a, b| a.0.total_cmp(&b.0));

        let count = if had_list {
            located.len() as u32
        } else {
            self.count.unwrap_or(0).max(located.len() as u32)
        };

        let closest = located.into_iter().next();
        Some(match closest {
            Some((distance, fire)) => WildfireSignal {
                detected: true,
                count,
                closest_distance_km: Some(distance),
                brightness_k: fire.brightness.as_ref().and_then(as_number),
                confidence_percent: fire.confidence.as_ref().and_then(as_number),
                fire_location_name: fire.location_name.filter(|n| !n.trim().is_empty()),
            },
            None => WildfireSignal {
                detected: false,
                count: 0,
                ..Default::default()
            },
        })
    }
}

// ---------------------------------------------------------------------------
// Weather
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WeatherResponse {
    #[serde(default)]
    pub current: Option<CurrentConditions>,
    #[serde(default)]
    pub forecast: Option<WeatherForecast>,
    #[serde(default)]
    pub recommendations: Option<Recommendations>,
    #[serde(default)]
    pub data_source: Option<String>,
    /// Station conditions as served by the `/weather` route
    #[serde(default)]
    pub weather: Option<StationConditions>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StationConditions {
    #[serde(default)]
    pub temperature: Option<f64>,
    #[serde(default)]
    pub temperature_unit: Option<String>,
    #[serde(default)]
    pub conditions: Option<String>,
}

impl StationConditions {
    pub fn temperature_celsius(&self) -> Option<f64> {
        let reading = self.temperature.filter(|t| t.is_finite())?;
        match self.temperature_unit.as_deref().map(str::trim) {
            Some(unit) if unit.eq_ignore_ascii_case("C") => Some(reading),
            _ => Some(fahrenheit_to_celsius(reading)),
        }
    }

    fn conditions(&self) -> Option<&str> {
        self.conditions.as_deref().filter(|c| !c.trim().is_empty())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CurrentConditions {
    #[serde(default)]
    pub temperature: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WeatherForecast {
    #[serde(default)]
    pub rain: Option<RainForecast>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RainForecast {
    #[serde(default)]
    pub will_rain: Option<bool>,
    #[serde(default)]
    pub max_probability: Option<f64>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Recommendations {
    #[serde(default)]
    pub umbrella: Option<UmbrellaAdvice>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UmbrellaAdvice {
    #[serde(default)]
    pub needed: Option<bool>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Percentage mentioned in a rain message, if any.
pub fn rain_percent_from_message(message: &str) -> Option<f64> {
    RAIN_PERCENT
        .captures(message)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Umbrella advice derived from the rain outlook when the backend sent none.
pub fn umbrella_recommendation(will_rain: bool, probability: f64) -> (bool, String) {
    let percent = probability as i64;
    if will_rain && probability >= 70.0 {
        (
            true,
            format!("Definitely bring an umbrella! {}% chance of rain.", percent),
        )
    } else if will_rain && probability >= 50.0 {
        (
            true,
            format!("Pack an umbrella just in case. {}% chance of rain.", percent),
        )
    } else if probability >= 30.0 {
        (
            false,
            format!("Umbrella optional. Only {}% chance of rain.", percent),
        )
    } else {
        (
            false,
            "Leave the umbrella at home! Clear skies ahead.".to_string(),
        )
    }
}

/// Umbrella advice from a station's short forecast text.
fn wet_conditions_advice(conditions: Option<&str>) -> (bool, Option<String>) {
    match conditions {
        Some(text) if WET_CONDITIONS.is_match(text) => (
            true,
            Some(format!("{} in the forecast. Bring an umbrella.", text.trim())),
        ),
        _ => (false, None),
    }
}

impl WeatherResponse {
    pub fn is_fallback(&self) -> bool {
        self.data_source.as_deref() == Some(FALLBACK_WEATHER_SOURCE)
    }

    /// Returns None for placeholder weather or an empty station reading.
    pub fn into_signal(self) -> Option<WeatherSignal> {
        if self.is_fallback() {
            return None;
        }

        let station = self.weather.unwrap_or_default();
        let detailed =
            self.current.is_some() || self.forecast.is_some() || self.recommendations.is_some();
        if !detailed && station.temperature_celsius().is_none() && station.conditions().is_none() {
            return None;
        }

        let rain_block = self.forecast.and_then(|f| f.rain);
        let has_rain_block = rain_block.is_some();
        let rain = rain_block.unwrap_or_default();
        let probability = rain
            .max_probability
            .filter(|p| p.is_finite())
            .or_else(|| rain.message.as_deref().and_then(rain_percent_from_message));
        let will_rain = rain
            .will_rain
            .unwrap_or_else(|| probability.map(|p| p >= 40.0).unwrap_or(false));

        let (umbrella_needed, rain_message) =
            match self.recommendations.and_then(|r| r.umbrella) {
                Some(UmbrellaAdvice {
                    needed: Some(needed),
                    message,
                }) => (needed, message.or(rain.message)),
                _ => match probability {
                    Some(p) => {
                        let (needed, message) = umbrella_recommendation(will_rain, p);
                        (needed, Some(message))
                    }
                    None if !has_rain_block => wet_conditions_advice(station.conditions()),
                    None => (false, rain.message),
                },
            };

        Some(WeatherSignal {
            temperature_celsius: self
                .current
                .and_then(|c| c.temperature)
                .filter(|t| t.is_finite())
                .or_else(|| station.temperature_celsius()),
            umbrella_needed,
            rain_message,
            precipitation_chance_percent: probability,
        })
    }
}

// ---------------------------------------------------------------------------
// Breath score
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BreathResponse {
    #[serde(default)]
    pub breath_score: Option<Value>,
    #[serde(default)]
    pub rating: Option<String>,
}

impl BreathResponse {
    pub fn into_signal(self) -> Option<BreathScore> {
        let score = self.breath_score.as_ref().and_then(as_number)?;
        let rating = self
            .rating
            .filter(|r| !r.trim().is_empty())
            .unwrap_or_else(|| breath::rating(score).to_string());
        Some(BreathScore { score, rating })
    }
}
