// Alert model types produced by the derivation engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identity of each alert rule. Declaration order is rule order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AlertKind {
    /// Banded health guidance for any AQI above "Good"
    AiHealthGuidance,
    /// AQI crossed the unhealthy-for-sensitive-groups line
    AqiThreshold,
    /// Active fire detected with a known distance
    Wildfire,
    /// Rain expected
    WeatherUmbrella,
    /// Temperature above 35 °C
    WeatherExtremeHeat,
    /// Temperature below -7 °C
    WeatherExtremeCold,
    /// Elevated AQI worth watching across refreshes
    TrendMonitoring,
}

impl AlertKind {
    /// Stable identifier, also used as `Alert::id`.
    pub fn id(&self) -> &'static str {
        match self {
            Self::AiHealthGuidance => "ai-health-guidance",
            Self::AqiThreshold => "aqi-threshold",
            Self::Wildfire => "wildfire",
            Self::WeatherUmbrella => "weather-umbrella",
            Self::WeatherExtremeHeat => "weather-extreme-heat",
            Self::WeatherExtremeCold => "weather-extreme-cold",
            Self::TrendMonitoring => "trend-monitoring",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::AiHealthGuidance => "Health Guidance",
            Self::AqiThreshold => "Air Quality Alert",
            Self::Wildfire => "Wildfire",
            Self::WeatherUmbrella => "Umbrella",
            Self::WeatherExtremeHeat => "Extreme Heat",
            Self::WeatherExtremeCold => "Extreme Cold",
            Self::TrendMonitoring => "Trend Monitoring",
        }
    }

    /// All kinds, in rule evaluation order.
    pub fn all() -> &'static [AlertKind] {
        &[
            Self::AiHealthGuidance,
            Self::AqiThreshold,
            Self::Wildfire,
            Self::WeatherUmbrella,
            Self::WeatherExtremeHeat,
            Self::WeatherExtremeCold,
            Self::TrendMonitoring,
        ]
    }
}

/// Severity tier. Ordered: `Low < Moderate < High < Critical`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    Low,
    Moderate,
    High,
    Critical,
}

impl Severity {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Moderate => "moderate",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

/// A fully rendered health alert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    pub id: String,
    pub kind: AlertKind,
    pub severity: Severity,
    pub title: String,
    pub message: String,
    pub actions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub health_recommendations: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contextual_insights: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actionable_tips: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub affected_groups: Option<Vec<String>>,
    /// Only set by `TrendMonitoring`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_aqi: Option<f64>,
    pub timestamp: DateTime<Utc>,
}

impl Alert {
    /// Alert with the common fields filled and every optional list empty.
    pub fn new(
        kind: AlertKind,
        severity: Severity,
        title: String,
        message: String,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: kind.id().to_string(),
            kind,
            severity,
            title,
            message,
            actions: Vec::new(),
            health_recommendations: None,
            contextual_insights: None,
            actionable_tips: None,
            affected_groups: None,
            current_aqi: None,
            timestamp,
        }
    }
}
