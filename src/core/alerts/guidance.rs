// Fixed guidance text, keyed by band or alert kind.
//
// `{location}` and `{aqi}` placeholders are filled by `render`; nothing else in
// these tables is dynamic.

use super::severity::GuidanceBand;

pub struct GuidanceTemplate {
    pub title: &'static str,
    pub summary: &'static str,
    pub health_recommendations: &'static [&'static str],
    pub contextual_insights: &'static [&'static str],
    pub actionable_tips: &'static [&'static str],
}

const ELEVATED: GuidanceTemplate = GuidanceTemplate {
    title: "Air Quality Guidance: Moderate",
    summary: "Air quality in {location} is acceptable with an AQI of {aqi}, though unusually sensitive people may notice minor effects.",
    health_recommendations: &[
        "Unusually sensitive people should consider reducing prolonged outdoor exertion",
        "The general public can continue normal outdoor activities",
        "Watch for coughing or shortness of breath if you have asthma",
        "Keep quick-relief medication with you during outdoor exercise",
    ],
    contextual_insights: &[
        "An AQI of {aqi} sits in the moderate range",
        "Pollution in {location} typically peaks during rush hours",
        "Warm afternoons can raise ground-level ozone",
        "Conditions can change quickly as winds shift",
    ],
    actionable_tips: &[
        "Plan strenuous exercise for the early morning",
        "Monitor symptoms if you are sensitive to air pollution",
        "Consider indoor activities if you have respiratory conditions",
        "Check the AQI again later today",
    ],
};

const SENSITIVE: GuidanceTemplate = GuidanceTemplate {
    title: "Air Quality Guidance: Unhealthy for Sensitive Groups",
    summary: "Air quality in {location} is unhealthy for sensitive groups with an AQI of {aqi}. Members of sensitive groups may experience health effects, while the general public is less likely to be affected.",
    health_recommendations: &[
        "Children, elderly, and people with respiratory conditions should limit prolonged outdoor exertion",
        "The general public should reduce prolonged or heavy outdoor activities",
        "Consider wearing a mask if you are in a sensitive group",
        "People with heart disease should watch for palpitations or fatigue",
        "Keep rescue inhalers and medication within reach",
    ],
    contextual_insights: &[
        "An AQI of {aqi} affects sensitive groups first",
        "Traffic emissions in {location} add to fine particle levels",
        "Still air lets pollutants accumulate near the ground",
        "Air quality is often better in the early morning",
    ],
    actionable_tips: &[
        "Close windows to prevent outdoor air from entering",
        "Use air purifiers indoors if available",
        "Reschedule outdoor activities to times with better air quality",
        "Check the AQI before heading out",
    ],
};

const UNHEALTHY: GuidanceTemplate = GuidanceTemplate {
    title: "Air Quality Guidance: Unhealthy",
    summary: "Air quality in {location} is unhealthy with an AQI of {aqi}. Everyone may begin to experience health effects; members of sensitive groups may experience more serious effects.",
    health_recommendations: &[
        "Everyone should avoid prolonged outdoor exertion",
        "Sensitive groups should avoid all outdoor activities",
        "Wear an N95 mask when going outside",
        "Stay indoors as much as possible",
        "Seek medical advice if you experience chest tightness or wheezing",
    ],
    contextual_insights: &[
        "An AQI of {aqi} is unhealthy for the whole population",
        "Pollution levels in {location} are well above daily norms",
        "Poor air can persist overnight when winds are calm",
        "Indoor air stays cleaner when the building is sealed",
    ],
    actionable_tips: &[
        "Keep windows and doors closed",
        "Run air purifiers on high settings",
        "Limit outdoor exposure to essential activities only",
        "Check the AQI regularly for improvements",
    ],
};

const HAZARDOUS: GuidanceTemplate = GuidanceTemplate {
    title: "Air Quality Guidance: Health Emergency",
    summary: "Health alert for {location}: the AQI has reached {aqi}. Everyone may experience serious health effects. This is an emergency condition.",
    health_recommendations: &[
        "Everyone should avoid all outdoor activities",
        "Stay indoors with windows closed",
        "Use air purifiers and N95 masks",
        "Seek medical attention if experiencing symptoms",
        "Check on elderly neighbours and relatives",
        "Keep children and pets indoors",
    ],
    contextual_insights: &[
        "An AQI of {aqi} is in the hazardous range",
        "Air in {location} is dangerous for everyone, not only sensitive groups",
        "Smoke or heavy pollution can linger for days",
        "Short exposures add up over a day",
    ],
    actionable_tips: &[
        "Remain indoors with air filtration systems running",
        "Seal windows and doors to prevent outdoor air entry",
        "Wear an N95 mask if you must go outside",
        "Monitor health closely and contact healthcare providers if needed",
    ],
};

impl GuidanceBand {
    pub fn template(&self) -> &'static GuidanceTemplate {
        match self {
            Self::Elevated => &ELEVATED,
            Self::Sensitive => &SENSITIVE,
            Self::Unhealthy => &UNHEALTHY,
            Self::Hazardous => &HAZARDOUS,
        }
    }
}

/// Appended first when the AQI is above 200.
pub const AQI_EMERGENCY_ACTIONS: &[&str] = &[
    "Stay indoors as much as possible",
    "Seek medical attention if experiencing symptoms",
];

/// Appended when the AQI is above 150.
pub const AQI_UNHEALTHY_ACTIONS: &[&str] = &[
    "Wear an N95 mask outdoors",
    "Avoid outdoor exercise",
    "Use air purifiers indoors",
];

/// Always present on the AQI threshold alert.
pub const AQI_BASELINE_ACTIONS: &[&str] = &[
    "Check AQI before going outside",
    "Keep windows closed during peak pollution hours",
    "Limit prolonged outdoor exertion",
    "Keep rescue medication accessible",
];

pub const AQI_GROUPS_EVERYONE: &[&str] = &["Everyone"];
pub const AQI_GROUPS_SENSITIVE: &[&str] = &["Sensitive Groups", "Children", "Elderly"];

pub const WILDFIRE_CORE_ACTIONS: &[&str] = &[
    "Monitor local emergency alerts and evacuation orders",
    "Keep windows and doors closed to keep smoke out",
    "Run air purifiers with HEPA filters",
    "Avoid outdoor activities while smoke is present",
    "Wear an N95 mask if you must go outside",
    "Prepare an emergency kit with medications and documents",
];

/// Appended when the closest fire is under 50 km away.
pub const WILDFIRE_NEARBY_ACTIONS: &[&str] = &[
    "Plan an evacuation route and know your nearest shelter",
    "Keep your vehicle fueled and ready to leave",
];

pub const WILDFIRE_GROUPS: &[&str] = &[
    "Everyone",
    "People with respiratory conditions",
    "Children",
    "Elderly",
];

pub const UMBRELLA_FALLBACK_MESSAGE: &str = "Rain is expected today. Bring an umbrella.";

pub const UMBRELLA_ACTIONS: &[&str] = &[
    "Bring an umbrella or rain jacket",
    "Allow extra travel time on wet roads",
];

pub const HEAT_ACTIONS: &[&str] = &[
    "Drink water regularly, even if you are not thirsty",
    "Stay in air-conditioned spaces during the hottest hours",
    "Avoid strenuous outdoor activity between 11am and 4pm",
    "Wear light, loose-fitting clothing and a hat",
    "Never leave children or pets in parked vehicles",
    "Check on elderly neighbours and relatives",
    "Learn the signs of heat exhaustion and heat stroke",
];

pub const COLD_ACTIONS: &[&str] = &[
    "Dress in warm layers and cover exposed skin",
    "Limit time outdoors to prevent frostbite",
    "Keep a blanket and supplies in your vehicle",
    "Check on elderly neighbours and relatives",
    "Bring pets indoors",
    "Use space heaters safely and never indoors with fuel-burning generators",
];

pub const TEMPERATURE_GROUPS: &[&str] = &["Elderly", "Children", "Outdoor workers"];

pub const TREND_ACTIONS: &[&str] = &[
    "Check air quality updates throughout the day",
    "Note when conditions tend to improve",
    "Plan outdoor activities around cleaner periods",
    "Keep indoor air filtration ready",
    "Enable notifications for air quality changes",
];

/// Fill `{location}` and `{aqi}` placeholders.
pub fn render(template: &str, location: &str, aqi: i64) -> String {
    template
        .replace("{location}", location)
        .replace("{aqi}", &aqi.to_string())
}

pub fn render_all(lines: &[&str], location: &str, aqi: i64) -> Vec<String> {
    lines.iter().map(|line| render(line, location, aqi)).collect()
}

pub fn to_owned_list(lines: &[&str]) -> Vec<String> {
    lines.iter().map(|line| line.to_string()).collect()
}
