use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{
    Error,
    overlay::{DEFAULT_EDGE_MARGIN, ScreenBounds},
    store::default_store_path,
};

pub const SETTINGS_FILE_NAME: &str = "settings.json";

/// Application settings, persisted to `settings.json` in the platform config
/// directory. Every field has a default so partial files load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppSettings {
    /// Period of the visibility sweep.
    #[serde(default = "default_sweep_interval_ms")]
    pub sweep_interval_ms: u64,
    /// Width of the resize band along each overlay edge.
    #[serde(default = "default_edge_margin")]
    pub edge_margin: i32,
    /// Overrides the default `overlays.json` location.
    #[serde(default)]
    pub store_path: Option<PathBuf>,
    #[serde(default = "default_edit_mode_shortcut")]
    pub edit_mode_shortcut: String,
    #[serde(default)]
    pub debug_logging: bool,
    #[serde(default = "default_screen_width")]
    pub screen_width: i32,
    #[serde(default = "default_screen_height")]
    pub screen_height: i32,
}

fn default_sweep_interval_ms() -> u64 {
    1000
}

fn default_edge_margin() -> i32 {
    DEFAULT_EDGE_MARGIN
}

fn default_edit_mode_shortcut() -> String {
    "ctrl+alt+e".to_string()
}

fn default_screen_width() -> i32 {
    ScreenBounds::default().width
}

fn default_screen_height() -> i32 {
    ScreenBounds::default().height
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            sweep_interval_ms: default_sweep_interval_ms(),
            edge_margin: default_edge_margin(),
            store_path: None,
            edit_mode_shortcut: default_edit_mode_shortcut(),
            debug_logging: false,
            screen_width: default_screen_width(),
            screen_height: default_screen_height(),
        }
    }
}

impl AppSettings {
    /// Load from the platform config directory, falling back to defaults.
    pub fn load() -> Self {
        match settings_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    /// Load from `path`. A missing file is silent; an unreadable one is
    /// logged. Either way the defaults are used.
    pub fn load_from(path: &Path) -> Self {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(_) => return Self::default(),
        };
        match serde_json::from_str(&content) {
            Ok(settings) => settings,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "invalid settings file, using defaults");
                Self::default()
            }
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<(), Error> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn screen(&self) -> ScreenBounds {
        ScreenBounds {
            width: self.screen_width,
            height: self.screen_height,
        }
    }

    /// Where `overlays.json` lives: the configured override, else the
    /// platform data directory, else the working directory.
    pub fn resolved_store_path(&self) -> PathBuf {
        self.store_path
            .clone()
            .or_else(default_store_path)
            .unwrap_or_else(|| PathBuf::from(crate::store::STORE_FILE_NAME))
    }
}

pub fn settings_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("overlayxpert").join(SETTINGS_FILE_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let settings = AppSettings::default();
        assert_eq!(settings.sweep_interval_ms, 1000);
        assert_eq!(settings.edge_margin, 10);
        assert_eq!(settings.screen(), ScreenBounds::default());
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SETTINGS_FILE_NAME);
        fs::write(&path, r#"{"sweep_interval_ms": 250, "store_path": "o.json"}"#).unwrap();

        let settings = AppSettings::load_from(&path);
        assert_eq!(settings.sweep_interval_ms, 250);
        assert_eq!(settings.edge_margin, 10);
        assert_eq!(settings.resolved_store_path(), PathBuf::from("o.json"));
    }

    #[test]
    fn invalid_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SETTINGS_FILE_NAME);
        fs::write(&path, "{ nope").unwrap();
        assert_eq!(AppSettings::load_from(&path), AppSettings::default());
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cfg").join(SETTINGS_FILE_NAME);
        let settings = AppSettings {
            edge_margin: 6,
            debug_logging: true,
            ..AppSettings::default()
        };
        settings.save_to(&path).unwrap();
        assert_eq!(AppSettings::load_from(&path), settings);
    }
}
