//! Engine configuration, read from a `shapekit.toml` file:
//!
//! ```toml
//! [shapes]
//! default-locale = "en"
//! available-locales = ["en", "fi"]
//! first-sort-priority = 0
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Settings that shape defaults and display, not validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShapeConfig {
    /// Locale used when a name has no translation for the requested one.
    pub default_locale: String,
    pub available_locales: Vec<String>,
    /// Priority given to the first shape of a community.
    pub first_sort_priority: i64,
}

fn default_locale() -> String {
    "en".to_string()
}

impl Default for ShapeConfig {
    fn default() -> Self {
        Self {
            default_locale: default_locale(),
            available_locales: vec![default_locale()],
            first_sort_priority: 0,
        }
    }
}

impl ShapeConfig {
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile = toml::from_str(contents)?;
        Ok(file.into_config())
    }

    /// Loads configuration from `path`.
    /// Falls back to defaults with a warning when the file can not be used.
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            info!("No shape config found at {:?}, using defaults", path);
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(contents) => match Self::from_toml_str(&contents) {
                Ok(config) => {
                    info!("Loaded shape config from {:?}", path);
                    config
                }
                Err(e) => {
                    warn!("Failed to parse shape config {:?}: {}. Using defaults.", path, e);
                    Self::default()
                }
            },
            Err(e) => {
                warn!("Failed to read shape config {:?}: {}", path, e);
                Self::default()
            }
        }
    }

    /// `requested` when the community offers it, else the default locale.
    pub fn display_locale<'a>(&'a self, requested: Option<&'a str>) -> &'a str {
        match requested {
            Some(locale) if self.available_locales.iter().any(|l| l == locale) => locale,
            _ => &self.default_locale,
        }
    }
}

/// Raw TOML structure of `shapekit.toml`.
#[derive(Deserialize, Default)]
struct ConfigFile {
    #[serde(default)]
    shapes: ShapesSection,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
struct ShapesSection {
    default_locale: Option<String>,
    #[serde(default)]
    available_locales: Vec<String>,
    #[serde(default)]
    first_sort_priority: i64,
}

impl ConfigFile {
    fn into_config(self) -> ShapeConfig {
        let default_locale = self.shapes.default_locale.unwrap_or_else(default_locale);
        let mut available_locales = self.shapes.available_locales;
        if !available_locales.contains(&default_locale) {
            available_locales.insert(0, default_locale.clone());
        }

        ShapeConfig {
            default_locale,
            available_locales,
            first_sort_priority: self.shapes.first_sort_priority,
        }
    }
}
