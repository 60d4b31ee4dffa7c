//! Configuration structs with sensible defaults and RON persistence.

use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, Utc};
use orrery_mechanics::time::start_of_day;
use orrery_mechanics::{calendar_date_to_simulation_time, julian_date};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Top-level orrery configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Clock and catalog settings.
    pub simulation: SimulationConfig,
    /// Day/night classification settings.
    pub illumination: IlluminationConfig,
    /// What the report prints.
    pub report: ReportConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// Simulation clock and body catalog.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SimulationConfig {
    /// Start instant, RFC 3339 or `YYYY-MM-DD` (UTC midnight). `None` is the
    /// J2000.0 epoch.
    pub start_date: Option<String>,
    /// Body catalog file (`.ron` or `.json`). `None` uses the built-in solar
    /// system.
    pub catalog: Option<PathBuf>,
}

/// Illumination settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct IlluminationConfig {
    /// Terminator band width in degrees for bodies without their own.
    pub default_terminator_width_deg: f64,
}

/// Report settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ReportConfig {
    /// Longitude of the surface sample point in degrees.
    pub longitude_deg: f64,
    /// Latitude of the surface sample point in degrees.
    pub latitude_deg: f64,
    /// Body ids to report; empty reports every body.
    pub bodies: Vec<String>,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
}

impl Default for IlluminationConfig {
    fn default() -> Self {
        Self {
            default_terminator_width_deg: 10.0,
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

impl SimulationConfig {
    /// Simulation time (days since J2000.0) of the configured start date.
    pub fn start_time(&self) -> Result<f64, ConfigError> {
        match self.start_date.as_deref() {
            None => Ok(0.0),
            Some(text) => {
                let t = calendar_date_to_simulation_time(parse_date(text)?);
                log::debug!("Start date {text} is t = {t} (JD {})", julian_date(t));
                Ok(t)
            }
        }
    }
}

/// Parse an RFC 3339 timestamp or a plain `YYYY-MM-DD` date (UTC midnight).
pub fn parse_date(text: &str) -> Result<DateTime<Utc>, ConfigError> {
    let text = text.trim();
    if let Ok(date) = DateTime::parse_from_rfc3339(text) {
        return Ok(date.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .map(start_of_day)
        .map_err(|_| ConfigError::InvalidDate(text.to_string()))
}

/// Platform config directory for orrery, e.g. `~/.config/orrery`.
pub fn default_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("orrery"))
}

// --- Load / Save / Reload ---

impl Config {
    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join("config.ron");

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
            let config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;
            log::info!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Save config to the given directory as `config.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(ConfigError::WriteError)?;

        let config_path = config_dir.join("config.ron");
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .separate_tuple_members(true)
            .enumerate_arrays(false);

        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;

        std::fs::write(&config_path, serialized).map_err(ConfigError::WriteError)?;
        Ok(())
    }

    /// Hot-reload: returns `Some(new_config)` if the file changed, `None` otherwise.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let config_path = config_dir.join("config.ron");
        let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
        let new_config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;

        if &new_config != self {
            log::info!("Config reloaded with changes");
            Ok(Some(new_config))
        } else {
            Ok(None)
        }
    }
}
