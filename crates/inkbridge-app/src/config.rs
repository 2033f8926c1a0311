//! JSON configuration for the facade and the demo binary.

use std::io;
use std::path::Path;

use inkbridge_core::{CanvasOptions, GridOptions};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Everything needed to set up an [`InkBridge`](crate::InkBridge).
///
/// Missing fields take their defaults, so `{}` is a valid config.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    pub canvas: CanvasOptions,
    pub grid: GridOptions,
    /// Show the grid right after construction.
    pub show_grid: bool,
}

impl BridgeConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let config = Self::from_json(&std::fs::read_to_string(path)?)?;
        log::debug!("Loaded config from {:?}", path);
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_empty_json_is_default() {
        let config = BridgeConfig::from_json("{}").unwrap();
        assert_eq!(config, BridgeConfig::default());
        assert_eq!(config.canvas.width, 800.0);
        assert_eq!(config.grid.tile_size, 1.0);
        assert_eq!(config.grid.stroke_color, "green");
        assert!(!config.show_grid);
    }

    #[test]
    fn test_partial_config() {
        let config = BridgeConfig::from_json(
            r##"{ "canvas": { "width": 320 }, "grid": { "tile_size": 16, "stroke_color": "#ccc", "stroke": 2 }, "show_grid": true }"##,
        )
        .unwrap();
        assert_eq!(config.canvas.width, 320.0);
        assert_eq!(config.canvas.height, 600.0);
        assert_eq!(config.grid.tile_size, 16.0);
        assert_eq!(config.grid.stroke_color, "#ccc");
        assert_eq!(config.grid.stroke_width, 2.0);
        assert!(config.show_grid);
    }

    #[test]
    fn test_round_trip_through_json() {
        let mut config = BridgeConfig::default();
        config.canvas.name = "board".to_string();
        config.show_grid = true;
        let back = BridgeConfig::from_json(&config.to_json().unwrap()).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(br#"{ "canvas": { "background": "black" } }"#).unwrap();
        let config = BridgeConfig::from_file(file.path()).unwrap();
        assert_eq!(config.canvas.background, "black");
    }

    #[test]
    fn test_errors() {
        assert!(matches!(BridgeConfig::from_json("{"), Err(ConfigError::Parse(_))));
        assert!(matches!(
            BridgeConfig::from_file("/definitely/not/here.json"),
            Err(ConfigError::Io(_))
        ));
    }
}
