use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::fetch::{Endpoints, SignalRequest};
use super::model::{Coordinates, LocationError};

/// Location watched when none is given on the command line.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct LocationSettings {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub city: Option<String>,
}

impl Default for LocationSettings {
    fn default() -> Self {
        // New York City
        Self {
            latitude: 40.7128,
            longitude: -74.0060,
            city: None,
        }
    }
}

/// Application settings, persisted as `settings.json`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub api_base_url: String,
    pub location: LocationSettings,
    pub wildfire_radius_km: f64,
    pub fetch_timeout_seconds: u64,
    pub refresh_interval_seconds: u64,
    pub cache_ttl_seconds: u64,
    pub cache_max_entries: u64,
    pub endpoints: Endpoints,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:5001".to_string(),
            location: LocationSettings::default(),
            wildfire_radius_km: 100.0,
            fetch_timeout_seconds: 10,
            refresh_interval_seconds: 300,
            cache_ttl_seconds: 1800,
            cache_max_entries: 1000,
            endpoints: Endpoints::default(),
        }
    }
}

impl Settings {
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_seconds.max(1))
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_seconds.max(1))
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_seconds)
    }

    /// Request for the configured location.
    pub fn signal_request(&self) -> Result<SignalRequest, LocationError> {
        let coordinates = Coordinates::new(self.location.latitude, self.location.longitude)?;
        Ok(SignalRequest::new(coordinates)
            .with_city(self.location.city.clone())
            .with_radius(self.wildfire_radius_km))
    }
}

/// Default config directory: `$HOME/.config/sky-watcher`.
pub fn default_config_dir() -> PathBuf {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(".config").join("sky-watcher")
}

pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    pub fn new(app_config_dir: PathBuf) -> Self {
        Self {
            config_path: app_config_dir.join("settings.json"),
        }
    }

    pub fn path(&self) -> &Path {
        &self.config_path
    }

    /// Missing or unreadable settings fall back to defaults.
    pub fn load(&self) -> Settings {
        if self.config_path.exists() {
            match fs::read_to_string(&self.config_path) {
                Ok(content) => match serde_json::from_str(&content) {
                    Ok(settings) => return settings,
                    Err(e) => log::warn!(
                        "Ignoring invalid settings at {}: {}",
                        self.config_path.display(),
                        e
                    ),
                },
                Err(e) => log::warn!("Failed to read {}: {}", self.config_path.display(), e),
            }
        }
        Settings::default()
    }

    pub fn save(&self, settings: &Settings) -> io::Result<()> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(settings)?;
        fs::write(&self.config_path, content)
    }
}
