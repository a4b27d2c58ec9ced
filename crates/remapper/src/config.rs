use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use retempo_audio::ClickSettings;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error, PartialEq)]
pub enum PolicyError {
    #[error("{what} {value} is outside the allowed range {min}..={max}")]
    OutOfRange {
        what: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
}

/// Inclusive range enforced at the calling boundary.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct Bounds {
    pub min: f64,
    pub max: f64,
}

impl Bounds {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: f64) -> bool {
        (self.min..=self.max).contains(&value)
    }

    pub fn check(&self, what: &'static str, value: f64) -> Result<f64, PolicyError> {
        if self.contains(value) {
            Ok(value)
        } else {
            Err(PolicyError::OutOfRange {
                what,
                value,
                min: self.min,
                max: self.max,
            })
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RetempoConfig {
    pub default_target_bpm: f64,
    pub target_bounds: Bounds,
    /// Playback rates outside this range sound noticeably degraded.
    pub speed_bounds: Bounds,
    pub enforce_speed_bounds: bool,
    pub click: ClickSettings,
    pub click_duration_secs: f64,
    pub click_sample_rate: u32,
    pub click_channels: u16,
}

impl Default for RetempoConfig {
    fn default() -> Self {
        Self {
            default_target_bpm: 120.0,
            target_bounds: Bounds::new(40.0, 240.0),
            speed_bounds: Bounds::new(0.5, 2.0),
            enforce_speed_bounds: true,
            click: ClickSettings::default(),
            click_duration_secs: 30.0,
            click_sample_rate: 44_100,
            click_channels: 2,
        }
    }
}

impl RetempoConfig {
    /// `<config dir>/retempo/config.json`
    pub fn default_path() -> Option<PathBuf> {
        Some(dirs::config_dir()?.join("retempo").join("config.json"))
    }

    /// Reads JSON, or YAML when the extension is `yaml`/`yml`.
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("read config {:?}", path))?;
        let is_yaml = matches!(
            path.extension().and_then(|ext| ext.to_str()),
            Some("yaml") | Some("yml")
        );
        let config = if is_yaml {
            serde_yaml::from_str(&data).with_context(|| format!("parse yaml config {:?}", path))?
        } else {
            serde_json::from_str(&data).with_context(|| format!("parse json config {:?}", path))?
        };
        info!("loaded config {:?}", path);
        Ok(config)
    }

    /// Loads `explicit` if given, else the default path if it exists, else defaults.
    pub fn load_or_default(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        match Self::default_path() {
            Some(path) if path.is_file() => Self::load(&path),
            _ => {
                debug!("no config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir).with_context(|| format!("create {:?}", dir))?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).with_context(|| format!("write config {:?}", path))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_are_inclusive() {
        let bounds = Bounds::new(0.5, 2.0);
        assert_eq!(bounds.check("speed factor", 0.5), Ok(0.5));
        assert_eq!(bounds.check("speed factor", 2.0), Ok(2.0));
        assert!(matches!(
            bounds.check("speed factor", 2.01),
            Err(PolicyError::OutOfRange { what: "speed factor", .. })
        ));
        assert!(!bounds.contains(f64::NAN));
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "click_duration_secs": 12.5, "click": { "headroom_db": 3.0 } }"#)
            .unwrap();
        let config = RetempoConfig::load(&path).unwrap();
        assert_eq!(config.click_duration_secs, 12.5);
        assert_eq!(config.click.headroom_db, 3.0);
        assert_eq!(config.click.frequency_hz, 1_000.0);
        assert_eq!(config.speed_bounds, Bounds::new(0.5, 2.0));
    }

    #[test]
    fn loads_yaml_and_round_trips_json() {
        let dir = tempfile::tempdir().unwrap();
        let yaml = dir.path().join("config.yaml");
        std::fs::write(&yaml, "enforce_speed_bounds: false\nclick_channels: 1\n").unwrap();
        let config = RetempoConfig::load(&yaml).unwrap();
        assert!(!config.enforce_speed_bounds);
        assert_eq!(config.click_channels, 1);

        let json = dir.path().join("nested").join("config.json");
        config.save(&json).unwrap();
        assert_eq!(RetempoConfig::load_or_default(Some(&json)).unwrap(), config);
    }

    #[test]
    fn missing_explicit_config_is_an_error() {
        assert!(RetempoConfig::load_or_default(Some(Path::new("missing.json"))).is_err());
    }
}
