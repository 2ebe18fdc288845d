// Rule evaluation for each alert kind.
//
// Each rule reads the snapshot and returns at most one alert. Rules never look
// at each other's output, so two rules sharing a guard (threshold and trend)
// still produce two independent alerts.

use super::guidance::{self, to_owned_list};
use super::model::{Alert, AlertKind, Severity};
use super::severity::{
    self, aqi_threshold_severity, celsius_to_fahrenheit, celsius_to_kelvin, display_aqi,
    round_one_decimal, wildfire_severity, GuidanceBand, TemperatureExtreme, ALERT_AQI,
};
use crate::core::model::SignalSnapshot;

const DEFAULT_LOCATION: &str = "your location";

/// Evaluate a single rule against the snapshot.
/// Returns Some(alert) if the rule fired, None otherwise.
pub fn evaluate_rule(kind: AlertKind, snapshot: &SignalSnapshot) -> Option<Alert> {
    match kind {
        AlertKind::AiHealthGuidance => evaluate_health_guidance(snapshot),
        AlertKind::AqiThreshold => evaluate_aqi_threshold(snapshot),
        AlertKind::Wildfire => evaluate_wildfire(snapshot),
        AlertKind::WeatherUmbrella => evaluate_umbrella(snapshot),
        AlertKind::WeatherExtremeHeat => evaluate_temperature(snapshot, TemperatureExtreme::Heat),
        AlertKind::WeatherExtremeCold => evaluate_temperature(snapshot, TemperatureExtreme::Cold),
        AlertKind::TrendMonitoring => evaluate_trend(snapshot),
    }
}

/// Present, finite AQI reading.
fn current_aqi(snapshot: &SignalSnapshot) -> Option<f64> {
    snapshot
        .forecast
        .as_ref()
        .and_then(|f| f.aqi)
        .filter(|aqi| aqi.is_finite())
}

fn location_name(snapshot: &SignalSnapshot) -> &str {
    snapshot
        .forecast
        .as_ref()
        .and_then(|f| f.location_name.as_deref())
        .filter(|name| !name.trim().is_empty())
        .unwrap_or(DEFAULT_LOCATION)
}

/// Banded guidance for any AQI above 50
fn evaluate_health_guidance(snapshot: &SignalSnapshot) -> Option<Alert> {
    let aqi = current_aqi(snapshot)?;
    let band = GuidanceBand::for_aqi(aqi)?;
    let template = band.template();
    let location = location_name(snapshot);
    let shown = display_aqi(aqi);

    let mut alert = Alert::new(
        AlertKind::AiHealthGuidance,
        band.severity(),
        template.title.to_string(),
        guidance::render(template.summary, location, shown),
        snapshot.captured_at,
    );
    alert.health_recommendations = Some(guidance::render_all(
        template.health_recommendations,
        location,
        shown,
    ));
    alert.contextual_insights = Some(guidance::render_all(
        template.contextual_insights,
        location,
        shown,
    ));
    alert.actionable_tips = Some(guidance::render_all(template.actionable_tips, location, shown));
    Some(alert)
}

/// Threshold alert once the AQI passes 100
fn evaluate_aqi_threshold(snapshot: &SignalSnapshot) -> Option<Alert> {
    let aqi = current_aqi(snapshot)?;
    let severity = aqi_threshold_severity(aqi)?;
    let category = snapshot
        .forecast
        .as_ref()
        .and_then(|f| f.category_or_derived())
        .unwrap_or_else(|| crate::core::model::aqi_category(aqi).to_string());
    let location = location_name(snapshot);

    let mut actions = Vec::new();
    if aqi > severity::HAZARDOUS_AQI {
        actions.extend(to_owned_list(guidance::AQI_EMERGENCY_ACTIONS));
    }
    if aqi > severity::UNHEALTHY_AQI {
        actions.extend(to_owned_list(guidance::AQI_UNHEALTHY_ACTIONS));
    }
    actions.extend(to_owned_list(guidance::AQI_BASELINE_ACTIONS));

    let groups = if aqi > severity::UNHEALTHY_AQI {
        guidance::AQI_GROUPS_EVERYONE
    } else {
        guidance::AQI_GROUPS_SENSITIVE
    };

    let mut alert = Alert::new(
        AlertKind::AqiThreshold,
        severity,
        format!("Air Quality Alert: {}", category),
        format!(
            "The AQI in {} is {}, above the safe threshold of {}. Air quality is {}.",
            location,
            display_aqi(aqi),
            ALERT_AQI as i64,
            category.to_lowercase()
        ),
        snapshot.captured_at,
    );
    alert.actions = actions;
    alert.affected_groups = Some(to_owned_list(groups));
    Some(alert)
}

/// Active fire with a known distance to the closest detection
fn evaluate_wildfire(snapshot: &SignalSnapshot) -> Option<Alert> {
    let wildfire = snapshot.wildfire.as_ref().filter(|w| w.detected)?;
    let distance = wildfire.closest_distance_km.filter(|d| d.is_finite())?;
    let severity = wildfire_severity(distance);

    let fires = if wildfire.count == 1 {
        "1 active wildfire".to_string()
    } else {
        format!("{} active wildfires", wildfire.count)
    };
    let near = wildfire
        .fire_location_name
        .as_deref()
        .filter(|name| !name.trim().is_empty())
        .map(|name| format!(" near {}", name))
        .unwrap_or_default();

    let mut actions = to_owned_list(guidance::WILDFIRE_CORE_ACTIONS);
    if distance < severity::WILDFIRE_HIGH_KM {
        actions.extend(to_owned_list(guidance::WILDFIRE_NEARBY_ACTIONS));
    }

    let mut alert = Alert::new(
        AlertKind::Wildfire,
        severity,
        if severity == Severity::Critical {
            "Wildfire Nearby".to_string()
        } else {
            "Wildfire Detected".to_string()
        },
        format!(
            "{} detected in your area. The closest fire is {:.1} km away{}. Smoke may affect air quality.",
            fires,
            round_one_decimal(distance),
            near
        ),
        snapshot.captured_at,
    );
    alert.actions = actions;
    alert.affected_groups = Some(to_owned_list(guidance::WILDFIRE_GROUPS));
    Some(alert)
}

/// Rain expected
fn evaluate_umbrella(snapshot: &SignalSnapshot) -> Option<Alert> {
    let weather = snapshot.weather.as_ref().filter(|w| w.umbrella_needed)?;
    let message = weather
        .rain_message
        .as_deref()
        .filter(|m| !m.trim().is_empty())
        .unwrap_or(guidance::UMBRELLA_FALLBACK_MESSAGE)
        .to_string();

    let mut alert = Alert::new(
        AlertKind::WeatherUmbrella,
        Severity::Low,
        "Bring an Umbrella".to_string(),
        message,
        snapshot.captured_at,
    );
    alert.actions = to_owned_list(guidance::UMBRELLA_ACTIONS);
    Some(alert)
}

/// Heat above 35 °C or cold below -7 °C; `wanted` selects which kind this call may emit.
fn evaluate_temperature(snapshot: &SignalSnapshot, wanted: TemperatureExtreme) -> Option<Alert> {
    let celsius = snapshot
        .weather
        .as_ref()
        .and_then(|w| w.temperature_celsius)
        .filter(|t| t.is_finite())?;
    let extreme = TemperatureExtreme::for_celsius(celsius).filter(|e| *e == wanted)?;

    let readings = format!(
        "{:.1}°C / {:.1}°F / {:.1} K",
        round_one_decimal(celsius),
        round_one_decimal(celsius_to_fahrenheit(celsius)),
        round_one_decimal(celsius_to_kelvin(celsius))
    );

    let (kind, title, message, actions) = match extreme {
        TemperatureExtreme::Heat => (
            AlertKind::WeatherExtremeHeat,
            "Extreme Heat Warning",
            format!(
                "Dangerously high temperature of {}. Heat stress and heat stroke are possible, and heat can worsen air pollution effects.",
                readings
            ),
            guidance::HEAT_ACTIONS,
        ),
        TemperatureExtreme::Cold => (
            AlertKind::WeatherExtremeCold,
            "Extreme Cold Warning",
            format!(
                "Dangerously low temperature of {}. Frostbite and hypothermia are possible, and cold air can trigger asthma.",
                readings
            ),
            guidance::COLD_ACTIONS,
        ),
    };

    let mut alert = Alert::new(
        kind,
        extreme.severity(),
        title.to_string(),
        message,
        snapshot.captured_at,
    );
    alert.actions = to_owned_list(actions);
    alert.affected_groups = Some(to_owned_list(guidance::TEMPERATURE_GROUPS));
    Some(alert)
}

/// Same guard as the threshold rule, emitted separately
fn evaluate_trend(snapshot: &SignalSnapshot) -> Option<Alert> {
    let aqi = current_aqi(snapshot).filter(|aqi| *aqi > ALERT_AQI)?;

    let mut alert = Alert::new(
        AlertKind::TrendMonitoring,
        Severity::Moderate,
        "Air Quality Trend Monitoring".to_string(),
        "Air quality is elevated. Keep an eye on how conditions develop over the next few hours."
            .to_string(),
        snapshot.captured_at,
    );
    alert.actions = to_owned_list(guidance::TREND_ACTIONS);
    alert.current_aqi = Some(aqi);
    Some(alert)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::{ForecastSignal, WeatherSignal, WildfireSignal};
    use chrono::{TimeZone, Utc};

    fn snapshot() -> SignalSnapshot {
        SignalSnapshot::empty(Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap())
    }

    fn with_aqi(aqi: f64) -> SignalSnapshot {
        SignalSnapshot {
            forecast: Some(ForecastSignal {
                aqi: Some(aqi),
                category: None,
                location_name: Some("Fresno".to_string()),
            }),
            ..snapshot()
        }
    }

    fn with_fire(distance: f64) -> SignalSnapshot {
        SignalSnapshot {
            wildfire: Some(WildfireSignal {
                detected: true,
                count: 3,
                closest_distance_km: Some(distance),
                brightness_k: Some(365.0),
                confidence_percent: Some(85.0),
                fire_location_name: Some("Sierra National Forest".to_string()),
            }),
            ..snapshot()
        }
    }

    fn with_temperature(celsius: f64) -> SignalSnapshot {
        SignalSnapshot {
            weather: Some(WeatherSignal {
                temperature_celsius: Some(celsius),
                ..Default::default()
            }),
            ..snapshot()
        }
    }

    #[test]
    fn test_health_guidance_substitutes_location_and_aqi() {
        let alert = evaluate_rule(AlertKind::AiHealthGuidance, &with_aqi(120.4)).unwrap();
        assert_eq!(alert.severity, Severity::Moderate);
        assert!(alert.message.contains("Fresno"));
        assert!(alert.message.contains("120"));
        let insights = alert.contextual_insights.unwrap();
        assert!(insights.iter().any(|line| line.contains("120")));
        assert!(alert.health_recommendations.is_some());
        assert!(alert.actionable_tips.is_some());
    }

    #[test]
    fn test_health_guidance_defaults_location() {
        let mut snap = with_aqi(75.0);
        snap.forecast.as_mut().unwrap().location_name = None;
        let alert = evaluate_rule(AlertKind::AiHealthGuidance, &snap).unwrap();
        assert_eq!(alert.severity, Severity::Low);
        assert!(alert.message.contains("your location"));
    }

    #[test]
    fn test_health_guidance_quiet_at_fifty() {
        assert!(evaluate_rule(AlertKind::AiHealthGuidance, &with_aqi(50.0)).is_none());
    }

    #[test]
    fn test_threshold_actions_for_sensitive_band() {
        let alert = evaluate_rule(AlertKind::AqiThreshold, &with_aqi(130.0)).unwrap();
        assert_eq!(alert.severity, Severity::Moderate);
        assert_eq!(alert.actions, to_owned_list(guidance::AQI_BASELINE_ACTIONS));
        assert_eq!(
            alert.affected_groups.unwrap(),
            vec!["Sensitive Groups", "Children", "Elderly"]
        );
        assert_eq!(alert.title, "Air Quality Alert: Unhealthy for Sensitive Groups");
    }

    #[test]
    fn test_threshold_actions_for_hazardous_band() {
        let alert = evaluate_rule(AlertKind::AqiThreshold, &with_aqi(250.0)).unwrap();
        assert_eq!(alert.severity, Severity::Critical);

        let mut expected = to_owned_list(guidance::AQI_EMERGENCY_ACTIONS);
        expected.extend(to_owned_list(guidance::AQI_UNHEALTHY_ACTIONS));
        expected.extend(to_owned_list(guidance::AQI_BASELINE_ACTIONS));
        assert_eq!(alert.actions, expected);
        assert_eq!(alert.affected_groups.unwrap(), vec!["Everyone"]);
    }

    #[test]
    fn test_threshold_unhealthy_band_skips_emergency_items() {
        let alert = evaluate_rule(AlertKind::AqiThreshold, &with_aqi(175.0)).unwrap();
        assert_eq!(alert.severity, Severity::High);
        assert_eq!(alert.actions.len(), 7);
        assert_eq!(alert.actions[0], guidance::AQI_UNHEALTHY_ACTIONS[0]);
    }

    #[test]
    fn test_wildfire_message_and_actions() {
        let alert = evaluate_rule(AlertKind::Wildfire, &with_fire(12.44)).unwrap();
        assert_eq!(alert.severity, Severity::Critical);
        assert!(alert.message.contains("3 active wildfires"));
        assert!(alert.message.contains("12.4 km"));
        assert!(alert.message.contains("near Sierra National Forest"));
        assert_eq!(alert.actions.len(), 8);

        let far = evaluate_rule(AlertKind::Wildfire, &with_fire(72.0)).unwrap();
        assert_eq!(far.severity, Severity::Moderate);
        assert_eq!(far.actions.len(), 6);
    }

    #[test]
    fn test_wildfire_requires_detection_and_distance() {
        let mut snap = with_fire(10.0);
        snap.wildfire.as_mut().unwrap().detected = false;
        assert!(evaluate_rule(AlertKind::Wildfire, &snap).is_none());

        let mut snap = with_fire(10.0);
        snap.wildfire.as_mut().unwrap().closest_distance_km = None;
        assert!(evaluate_rule(AlertKind::Wildfire, &snap).is_none());
    }

    #[test]
    fn test_wildfire_negative_distance_passes_through() {
        let alert = evaluate_rule(AlertKind::Wildfire, &with_fire(-5.0)).unwrap();
        assert_eq!(alert.severity, Severity::Critical);
    }

    #[test]
    fn test_umbrella_message_and_fallback() {
        let mut snap = snapshot();
        snap.weather = Some(WeatherSignal {
            umbrella_needed: true,
            rain_message: Some("Heavy rain likely around 03:00 PM (80%)".to_string()),
            ..Default::default()
        });
        let alert = evaluate_rule(AlertKind::WeatherUmbrella, &snap).unwrap();
        assert_eq!(alert.severity, Severity::Low);
        assert_eq!(alert.message, "Heavy rain likely around 03:00 PM (80%)");

        snap.weather.as_mut().unwrap().rain_message = None;
        let alert = evaluate_rule(AlertKind::WeatherUmbrella, &snap).unwrap();
        assert_eq!(alert.message, guidance::UMBRELLA_FALLBACK_MESSAGE);
    }

    #[test]
    fn test_heat_reports_three_units() {
        let alert = evaluate_rule(AlertKind::WeatherExtremeHeat, &with_temperature(40.0)).unwrap();
        assert_eq!(alert.severity, Severity::High);
        assert!(alert.message.contains("40.0°C"));
        assert!(alert.message.contains("104.0°F"));
        assert!(alert.message.contains("313.1 K") || alert.message.contains("313.2 K"));
        assert_eq!(alert.actions.len(), 7);
        assert!(evaluate_rule(AlertKind::WeatherExtremeCold, &with_temperature(40.0)).is_none());
    }

    #[test]
    fn test_cold_reports_three_units() {
        let alert = evaluate_rule(AlertKind::WeatherExtremeCold, &with_temperature(-10.0)).unwrap();
        assert_eq!(alert.severity, Severity::Moderate);
        assert!(alert.message.contains("-10.0°C"));
        assert!(alert.message.contains("14.0°F"));
        assert_eq!(alert.actions.len(), 6);
        assert!(evaluate_rule(AlertKind::WeatherExtremeHeat, &with_temperature(-10.0)).is_none());
    }

    #[test]
    fn test_zero_celsius_is_a_reading_not_absence() {
        let snap = with_temperature(0.0);
        assert!(evaluate_rule(AlertKind::WeatherExtremeHeat, &snap).is_none());
        assert!(evaluate_rule(AlertKind::WeatherExtremeCold, &snap).is_none());
    }

    #[test]
    fn test_trend_carries_current_aqi() {
        let alert = evaluate_rule(AlertKind::TrendMonitoring, &with_aqi(101.0)).unwrap();
        assert_eq!(alert.severity, Severity::Moderate);
        assert_eq!(alert.current_aqi, Some(101.0));
        assert_eq!(alert.actions.len(), 5);
        assert!(evaluate_rule(AlertKind::TrendMonitoring, &with_aqi(100.0)).is_none());
    }

    #[test]
    fn test_non_finite_readings_are_absent() {
        for kind in AlertKind::all() {
            assert!(evaluate_rule(*kind, &with_aqi(f64::NAN)).is_none());
            assert!(evaluate_rule(*kind, &with_fire(f64::INFINITY)).is_none());
            assert!(evaluate_rule(*kind, &with_temperature(f64::NAN)).is_none());
        }
    }
}
