//! Configuration for imview-core
//!
//! Viewer-wide settings: UI appearance, screenshot output and pyramid
//! construction. Read from TOML or JSON.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use imview_io::MultiscaleOptions;

use crate::screenshot::{ScreenshotFormat, ScreenshotRequest};

/// Largest screenshot edge accepted, in pixels
pub const MAX_SCREENSHOT_EDGE: u32 = 16384;

/// Viewer configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Prefix for every control id
    pub viewer_id: String,
    /// UI settings
    pub ui: UiConfig,
    /// Screenshot settings
    pub screenshot: ScreenshotConfig,
    /// Pyramid settings
    pub multiscale: MultiscaleConfig,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            viewer_id: "imview".to_string(),
            ui: UiConfig::default(),
            screenshot: ScreenshotConfig::default(),
            multiscale: MultiscaleConfig::default(),
        }
    }
}

/// UI configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Visibility of newly loaded layers
    pub layers_visible_by_default: bool,
    /// Background colour, RGB in [0, 1]
    pub background_color: [f32; 3],
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            layers_visible_by_default: true,
            background_color: [0.1, 0.1, 0.1],
        }
    }
}

/// Screenshot configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreenshotConfig {
    pub format: ScreenshotFormat,
    pub width: u32,
    pub height: u32,
    /// Directory screenshots are written to. Kept in memory only when unset.
    pub output_dir: Option<PathBuf>,
}

impl Default for ScreenshotConfig {
    fn default() -> Self {
        Self {
            format: ScreenshotFormat::Json,
            width: 1200,
            height: 900,
            output_dir: None,
        }
    }
}

impl ScreenshotConfig {
    pub fn request(&self) -> ScreenshotRequest {
        ScreenshotRequest {
            format: self.format,
            width: self.width,
            height: self.height,
        }
    }
}

/// Pyramid configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MultiscaleConfig {
    pub chunk_size: usize,
    pub max_levels: usize,
}

impl Default for MultiscaleConfig {
    fn default() -> Self {
        Self {
            chunk_size: 64,
            max_levels: 8,
        }
    }
}

impl ViewerConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml_str).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Serialize configuration to TOML
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Load configuration from a JSON string
    pub fn from_json(json_str: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json_str).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Serialize configuration to JSON
    pub fn to_json(&self) -> Result<String, ConfigError> {
        serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Load and validate a configuration file
    ///
    /// `.json` files are parsed as JSON, everything else as TOML.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Parse(format!("{}: {}", path.display(), e)))?;

        let config = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json(&contents)?,
            _ => Self::from_toml(&contents)?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self
            .ui
            .background_color
            .iter()
            .any(|c| !(0.0..=1.0).contains(c))
        {
            return Err(ConfigError::OutOfRange(
                "background_color channels must be between 0.0 and 1.0".to_string(),
            ));
        }

        for (field, value) in [
            ("width", self.screenshot.width),
            ("height", self.screenshot.height),
        ] {
            if value == 0 || value > MAX_SCREENSHOT_EDGE {
                return Err(ConfigError::OutOfRange(format!(
                    "screenshot {} must be between 1 and {}",
                    field, MAX_SCREENSHOT_EDGE
                )));
            }
        }

        if self.multiscale.chunk_size < 2 {
            return Err(ConfigError::OutOfRange(
                "chunk_size must be at least 2".to_string(),
            ));
        }

        if self.multiscale.max_levels == 0 {
            return Err(ConfigError::OutOfRange(
                "max_levels must be positive".to_string(),
            ));
        }

        Ok(())
    }

    /// Pyramid options for the image loader
    pub fn multiscale_options(&self) -> MultiscaleOptions {
        MultiscaleOptions {
            chunk_size: self.multiscale.chunk_size,
            max_levels: self.multiscale.max_levels,
            is_label: None,
        }
    }
}

/// Configuration error
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigError {
    /// Value is out of valid range
    #[error("Value out of range: {0}")]
    OutOfRange(String),

    /// File could not be read or parsed
    #[error("Parse error: {0}")]
    Parse(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = ViewerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.viewer_id, "imview");
        assert_eq!(config.screenshot.format, ScreenshotFormat::Json);
    }

    #[test]
    fn test_partial_toml() {
        let config = ViewerConfig::from_toml(
            r#"
            viewer_id = "left"

            [screenshot]
            format = "png"
            width = 640
            "#,
        )
        .unwrap();

        assert_eq!(config.viewer_id, "left");
        assert_eq!(config.screenshot.format, ScreenshotFormat::Png);
        assert_eq!(config.screenshot.width, 640);
        assert_eq!(config.screenshot.height, 900);
        assert_eq!(config.multiscale.chunk_size, 64);
    }

    #[test]
    fn test_json_serialization() {
        let config = ViewerConfig::default();
        let json = config.to_json().unwrap();
        assert_eq!(ViewerConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn test_out_of_range() {
        let mut config = ViewerConfig::default();
        config.ui.background_color = [1.5, 0.0, 0.0];
        assert!(matches!(config.validate(), Err(ConfigError::OutOfRange(_))));

        let mut config = ViewerConfig::default();
        config.screenshot.width = 0;
        assert!(config.validate().is_err());

        let mut config = ViewerConfig::default();
        config.multiscale.chunk_size = 1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_rejects_invalid_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[multiscale]\nmax_levels = 0").unwrap();

        assert!(matches!(
            ViewerConfig::load(file.path()),
            Err(ConfigError::OutOfRange(_))
        ));
    }

    #[test]
    fn test_load_missing_file() {
        assert!(matches!(
            ViewerConfig::load("/nonexistent/imview.toml"),
            Err(ConfigError::Parse(_))
        ));
    }
}
