//! Body catalogs: lists of body descriptors in RON or JSON.
//!
//! Descriptors validate themselves while deserializing, so a catalog that
//! parses contains only well-formed bodies. Parent links are checked when the
//! catalog is assembled into a [`BodySystem`].

use std::path::Path;

use orrery_mechanics::{BodyDescriptor, BodySystem};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// The solar system shipped with the crate.
const BUILTIN_CATALOG: &str = include_str!("../assets/solar_system.ron");

/// On-disk catalog layout.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Catalog {
    pub bodies: Vec<BodyDescriptor>,
}

/// Serialization format, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogFormat {
    Ron,
    Json,
}

impl CatalogFormat {
    /// `.ron` or `.json` (case-insensitive).
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("ron") => Ok(Self::Ron),
            Some("json") => Ok(Self::Json),
            _ => Err(ConfigError::UnsupportedFormat(path.to_path_buf())),
        }
    }
}

impl Catalog {
    /// The built-in solar system: Sun, planets, Pluto and major moons.
    pub fn builtin() -> Result<Self, ConfigError> {
        Self::parse(BUILTIN_CATALOG, CatalogFormat::Ron)
    }

    /// Parse catalog text.
    pub fn parse(contents: &str, format: CatalogFormat) -> Result<Self, ConfigError> {
        match format {
            CatalogFormat::Ron => ron::from_str(contents).map_err(ConfigError::ParseError),
            CatalogFormat::Json => serde_json::from_str(contents).map_err(ConfigError::JsonError),
        }
    }

    /// Load a catalog file; the format follows the extension.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let format = CatalogFormat::from_path(path)?;
        let contents = std::fs::read_to_string(path).map_err(ConfigError::ReadError)?;
        let catalog = Self::parse(&contents, format)?;
        log::info!(
            "Loaded {} bodies from {}",
            catalog.bodies.len(),
            path.display()
        );
        Ok(catalog)
    }

    /// Write the catalog; the format follows the extension.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let serialized = match CatalogFormat::from_path(path)? {
            CatalogFormat::Ron => {
                let pretty = ron::ser::PrettyConfig::new()
                    .depth_limit(4)
                    .separate_tuple_members(true)
                    .enumerate_arrays(false);
                ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?
            }
            CatalogFormat::Json => {
                serde_json::to_string_pretty(self).map_err(ConfigError::JsonError)?
            }
        };
        if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir).map_err(ConfigError::WriteError)?;
        }
        std::fs::write(path, serialized).map_err(ConfigError::WriteError)
    }

    /// Load `path`, or the built-in catalog when `None`.
    pub fn load_or_builtin(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => {
                log::debug!("Using built-in solar system catalog");
                Self::builtin()
            }
        }
    }

    /// Assemble the bodies into a validated system.
    pub fn into_system(self) -> Result<BodySystem, ConfigError> {
        Ok(BodySystem::new(self.bodies)?)
    }
}
