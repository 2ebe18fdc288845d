// Severity banding for each triggering signal, plus the unit helpers the
// message templates need.
//
// All thresholds are strict: a value sitting exactly on a boundary belongs to
// the milder band.

use super::model::Severity;

/// AQI above which health guidance is issued.
pub const GUIDANCE_AQI: f64 = 50.0;
/// AQI above which the threshold and trend alerts fire.
pub const ALERT_AQI: f64 = 100.0;
pub const UNHEALTHY_AQI: f64 = 150.0;
pub const HAZARDOUS_AQI: f64 = 200.0;

pub const WILDFIRE_CRITICAL_KM: f64 = 25.0;
pub const WILDFIRE_HIGH_KM: f64 = 50.0;

pub const EXTREME_HEAT_CELSIUS: f64 = 35.0;
pub const EXTREME_COLD_CELSIUS: f64 = -7.0;

/// Which of the four guidance templates applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GuidanceBand {
    /// 50 < aqi <= 100
    Elevated,
    /// 100 < aqi <= 150
    Sensitive,
    /// 150 < aqi <= 200
    Unhealthy,
    /// aqi > 200
    Hazardous,
}

impl GuidanceBand {
    pub fn all() -> &'static [GuidanceBand] {
        &[Self::Elevated, Self::Sensitive, Self::Unhealthy, Self::Hazardous]
    }

    /// Band for an AQI reading, `None` when no guidance is due.
    pub fn for_aqi(aqi: f64) -> Option<Self> {
        if aqi > HAZARDOUS_AQI {
            Some(Self::Hazardous)
        } else if aqi > UNHEALTHY_AQI {
            Some(Self::Unhealthy)
        } else if aqi > ALERT_AQI {
            Some(Self::Sensitive)
        } else if aqi > GUIDANCE_AQI {
            Some(Self::Elevated)
        } else {
            None
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            Self::Elevated => Severity::Low,
            Self::Sensitive => Severity::Moderate,
            Self::Unhealthy => Severity::High,
            Self::Hazardous => Severity::Critical,
        }
    }
}

/// Severity of the AQI threshold alert; `None` at or below 100.
pub fn aqi_threshold_severity(aqi: f64) -> Option<Severity> {
    if aqi > HAZARDOUS_AQI {
        Some(Severity::Critical)
    } else if aqi > UNHEALTHY_AQI {
        Some(Severity::High)
    } else if aqi > ALERT_AQI {
        Some(Severity::Moderate)
    } else {
        None
    }
}

/// Severity of a wildfire by distance to the closest detection.
pub fn wildfire_severity(closest_distance_km: f64) -> Severity {
    if closest_distance_km < WILDFIRE_CRITICAL_KM {
        Severity::Critical
    } else if closest_distance_km < WILDFIRE_HIGH_KM {
        Severity::High
    } else {
        Severity::Moderate
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemperatureExtreme {
    Heat,
    Cold,
}

impl TemperatureExtreme {
    /// Heat and cold are mutually exclusive; heat is checked first.
    pub fn for_celsius(celsius: f64) -> Option<Self> {
        if celsius > EXTREME_HEAT_CELSIUS {
            Some(Self::Heat)
        } else if celsius < EXTREME_COLD_CELSIUS {
            Some(Self::Cold)
        } else {
            None
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            Self::Heat => Severity::High,
            Self::Cold => Severity::Moderate,
        }
    }
}

pub fn celsius_to_fahrenheit(celsius: f64) -> f64 {
    celsius * 9.0 / 5.0 + 32.0
}

pub fn fahrenheit_to_celsius(fahrenheit: f64) -> f64 {
    (fahrenheit - 32.0) * 5.0 / 9.0
}

pub fn celsius_to_kelvin(celsius: f64) -> f64 {
    celsius + 273.15
}

/// Round half away from zero to one decimal place.
pub fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// AQI as shown to people: nearest whole number.
pub fn display_aqi(aqi: f64) -> i64 {
    aqi.round() as i64
}
