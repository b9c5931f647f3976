use serde::{Deserialize, Deserializer};
use std::time::Duration;
use thiserror::Error;

use crate::catalog::{Catalog, SatelliteEntry};
use crate::predict::{ObserverLocation, DEFAULT_OBSERVER_HEIGHT_KM};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid observer: {0}")]
    Observer(String),
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub web: WebConfig,
    #[serde(default)]
    pub elements: ElementsConfig,
    #[serde(default)]
    pub observer: Option<ObserverConfig>,
    #[serde(default)]
    pub prediction: PredictionConfig,
    #[serde(default)]
    pub satellites: Option<Vec<SatelliteEntry>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "0.0.0.0:8080".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct ElementsConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout", deserialize_with = "deserialize_duration")]
    pub timeout: Duration,
}

impl Default for ElementsConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout: default_timeout(),
        }
    }
}

fn default_base_url() -> String {
    "https://tle.ivanstanojevic.me/api/tle/".to_string()
}

fn default_timeout() -> Duration {
    Duration::from_secs(30)
}

#[derive(Debug, Clone, Deserialize)]
pub struct ObserverConfig {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default = "default_height_km")]
    pub height_km: f64,
}

fn default_height_km() -> f64 {
    DEFAULT_OBSERVER_HEIGHT_KM
}

#[derive(Debug, Clone, Deserialize)]
pub struct PredictionConfig {
    #[serde(default = "default_days")]
    pub default_days: u32,
    #[serde(default = "default_altitude_km")]
    pub satellite_altitude_km: f64,
    #[serde(
        default = "default_track_interval",
        deserialize_with = "deserialize_duration"
    )]
    pub track_interval: Duration,
}

impl Default for PredictionConfig {
    fn default() -> Self {
        Self {
            default_days: default_days(),
            satellite_altitude_km: default_altitude_km(),
            track_interval: default_track_interval(),
        }
    }
}

fn default_days() -> u32 {
    3
}

fn default_altitude_km() -> f64 {
    crate::predict::elevation::LEO_ALTITUDE_KM
}

fn default_track_interval() -> Duration {
    crate::tracker::DEFAULT_TRACK_INTERVAL
}

fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    humantime::parse_duration(s.trim()).map_err(serde::de::Error::custom)
}

impl Config {
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(content)?;
        config.observer_location()?;
        Ok(config)
    }

    pub fn observer_location(&self) -> Result<Option<ObserverLocation>, ConfigError> {
        self.observer
            .as_ref()
            .map(|o| {
                ObserverLocation::new(o.latitude, o.longitude, o.height_km)
                    .map_err(|e| ConfigError::Observer(e.to_string()))
            })
            .transpose()
    }

    pub fn catalog(&self) -> Catalog {
        match &self.satellites {
            Some(entries) if !entries.is_empty() => Catalog::new(entries.clone()),
            _ => Catalog::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let config = Config::from_yaml("{}").unwrap();
        assert_eq!(config.web.bind, "0.0.0.0:8080");
        assert_eq!(config.elements.timeout, Duration::from_secs(30));
        assert_eq!(config.prediction.default_days, 3);
        assert_eq!(config.prediction.track_interval, Duration::from_secs(1));
        assert!(config.observer_location().unwrap().is_none());
        assert_eq!(config.catalog().entries().len(), 20);
    }

    #[test]
    fn parses_full_document() {
        let yaml = r#"
web:
  bind: 127.0.0.1:9000
elements:
  base_url: http://localhost:8000/tle
  timeout: 5s
observer:
  latitude: 47.3769
  longitude: 8.5417
prediction:
  default_days: 7
  satellite_altitude_km: 550
  track_interval: 500ms
satellites:
  - norad_id: "25544"
    name: ISS (ZARYA)
    category: space_station
    scale: 2000000
"#;
        let config = Config::from_yaml(yaml).unwrap();
        assert_eq!(config.elements.timeout, Duration::from_secs(5));
        assert_eq!(config.prediction.track_interval, Duration::from_millis(500));
        let observer = config.observer_location().unwrap().unwrap();
        assert_eq!(observer.height_km, DEFAULT_OBSERVER_HEIGHT_KM);
        assert_eq!(config.catalog().entries().len(), 1);
    }

    #[test]
    fn rejects_out_of_range_observer() {
        let yaml = "observer:\n  latitude: 91\n  longitude: 0\n";
        assert!(matches!(
            Config::from_yaml(yaml),
            Err(ConfigError::Observer(_))
        ));
    }
}
