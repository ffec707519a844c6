//! Configuration persistence for markshot settings

use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Serializable color representation for pen and shape strokes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShapeColor {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Default for ShapeColor {
    fn default() -> Self {
        // Default red pen
        Self {
            r: 0.9,
            g: 0.1,
            b: 0.1,
        }
    }
}

impl ShapeColor {
    /// Convert to image crate RGBA format (0-255)
    pub fn to_rgba_u8(self) -> [u8; 4] {
        [
            (self.r * 255.0).round() as u8,
            (self.g * 255.0).round() as u8,
            (self.b * 255.0).round() as u8,
            255,
        ]
    }
}

/// Save location for screenshots (Pictures or Documents)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SaveLocation {
    #[default]
    Pictures,
    Documents,
}

/// Font selection for the text tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FontSpec {
    /// Family name, matched against installed font file names
    pub family: String,
    /// Size in logical pixels
    pub size: f32,
}

impl Default for FontSpec {
    fn default() -> Self {
        Self {
            family: "DejaVuSans".to_string(),
            size: 16.0,
        }
    }
}

/// Application configuration persisted between sessions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Stroke color used when a new annotation is started
    pub pen_color: ShapeColor,
    /// Stroke width in logical pixels
    pub pen_width: u32,
    /// Font used by the text tool
    pub font: FontSpec,
    /// Where to save screenshots (Pictures or Documents folder)
    pub save_location: SaveLocation,
    /// Whether to show the magnifier while selecting a region
    pub magnifier_enabled: bool,
    /// Whether to also copy to clipboard when saving to file
    #[serde(default)]
    pub copy_to_clipboard_on_save: bool,
}

impl Config {
    /// Load configuration from disk, or return defaults if unavailable
    pub fn load() -> Self {
        let Some(path) = Self::path() else {
            log::warn!("No config directory available, using defaults");
            return Self::default();
        };
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(config) => config,
                Err(err) => {
                    log::warn!("Error parsing config, using defaults: {err:?}");
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        }
    }

    /// Save configuration to disk
    pub fn save(&self) {
        let Some(path) = Self::path() else {
            log::error!("No config directory available, not saving config");
            return;
        };
        if let Some(parent) = path.parent()
            && let Err(err) = fs::create_dir_all(parent)
        {
            log::error!("Could not create config directory: {err:?}");
            return;
        }
        match serde_json::to_string_pretty(self) {
            Ok(contents) => {
                if let Err(err) = fs::write(&path, contents) {
                    log::error!("Failed to save config: {err:?}");
                }
            }
            Err(err) => log::error!("Failed to serialize config: {err:?}"),
        }
    }

    fn path() -> Option<PathBuf> {
        Some(dirs::config_dir()?.join("markshot").join("config.json"))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            // Default red pen, 3 px wide
            pen_color: ShapeColor::default(),
            pen_width: 3,
            font: FontSpec::default(),
            // Default to Pictures folder
            save_location: SaveLocation::Pictures,
            // Magnifier enabled by default for precise selection
            magnifier_enabled: true,
            // Don't copy to clipboard by default when saving
            copy_to_clipboard_on_save: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_color_to_rgba() {
        let c = ShapeColor {
            r: 0.0,
            g: 1.0,
            b: 0.5,
        };
        assert_eq!(c.to_rgba_u8(), [0, 255, 128, 255]);
    }

    #[test]
    fn test_config_roundtrip() {
        let config = Config {
            pen_width: 5,
            copy_to_clipboard_on_save: true,
            ..Config::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        let back: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_config_missing_fields_use_defaults() {
        // copy_to_clipboard_on_save was added after 0.1 and must default when absent
        let json = r#"{
            "pen_color": {"r": 0.9, "g": 0.1, "b": 0.1},
            "pen_width": 3,
            "font": {"family": "DejaVuSans", "size": 16.0},
            "save_location": "Pictures",
            "magnifier_enabled": true
        }"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert!(!config.copy_to_clipboard_on_save);
    }
}
