//! Persisted settings snapshot.
//!
//! A flat JSON object of primitive values, with no version field:
//!
//! ```json
//! {
//!   "exportScale": 2,
//!   "exportQuality": 1,
//!   "width": 800,
//!   "padding": 32,
//!   "radius": 12,
//!   "shadow": 60,
//!   "deviceThickness": 20
//! }
//! ```
//!
//! Restoring is best-effort. Missing keys take their default silently;
//! unknown keys are ignored; a value of the wrong type (or one that does
//! not fit) takes its default with a warning in the log.

use serde_json::{Map, Value, json};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Export and geometry defaults remembered between sessions.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub export_scale: f32,
    pub export_quality: f32,
    /// Mockup width in pixels.
    pub width: u32,
    pub padding: u32,
    pub radius: u32,
    /// Shadow intensity, 0–100.
    pub shadow: u32,
    pub device_thickness: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            export_scale: 2.0,
            export_quality: 1.0,
            width: 800,
            padding: 32,
            radius: 12,
            shadow: 60,
            device_thickness: 20,
        }
    }
}

fn read_f32(map: &Map<String, Value>, key: &str, default: f32) -> f32 {
    match map.get(key) {
        None => default,
        Some(value) => match value.as_f64() {
            Some(v) if v.is_finite() => v as f32,
            _ => {
                log::warn!("Ignoring saved {key}={value}: expected a number");
                default
            }
        },
    }
}

fn read_u32(map: &Map<String, Value>, key: &str, default: u32) -> u32 {
    match map.get(key) {
        None => default,
        Some(value) => match value.as_u64().and_then(|v| u32::try_from(v).ok()) {
            Some(v) => v,
            None => {
                log::warn!("Ignoring saved {key}={value}: expected a non-negative integer");
                default
            }
        },
    }
}

impl Settings {
    /// Rebuild settings from a snapshot, falling back per key.
    pub fn restore(snapshot: &Value) -> Self {
        let defaults = Self::default();
        let Some(map) = snapshot.as_object() else {
            log::warn!("Ignoring saved settings: expected a JSON object");
            return defaults;
        };

        Self {
            export_scale: read_f32(map, "exportScale", defaults.export_scale),
            export_quality: read_f32(map, "exportQuality", defaults.export_quality),
            width: read_u32(map, "width", defaults.width),
            padding: read_u32(map, "padding", defaults.padding),
            radius: read_u32(map, "radius", defaults.radius),
            shadow: read_u32(map, "shadow", defaults.shadow),
            device_thickness: read_u32(map, "deviceThickness", defaults.device_thickness),
        }
    }

    pub fn snapshot(&self) -> Value {
        json!({
            "exportScale": self.export_scale,
            "exportQuality": self.export_quality,
            "width": self.width,
            "padding": self.padding,
            "radius": self.radius,
            "shadow": self.shadow,
            "deviceThickness": self.device_thickness,
        })
    }
}

/// Settings kept as a JSON file.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load saved settings; anything unreadable yields defaults.
    pub fn load(&self) -> Settings {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Settings::default(),
            Err(e) => {
                log::warn!("Could not read {}: {e}", self.path.display());
                return Settings::default();
            }
        };

        match serde_json::from_str::<Value>(&content) {
            Ok(snapshot) => Settings::restore(&snapshot),
            Err(e) => {
                log::warn!("Could not parse {}: {e}", self.path.display());
                Settings::default()
            }
        }
    }

    pub fn save(&self, settings: &Settings) -> Result<(), SettingsError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(&settings.snapshot())?;
        fs::write(&self.path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn restore_full_snapshot() {
        let snapshot = json!({
            "exportScale": 3,
            "exportQuality": 0.7,
            "width": 1024,
            "padding": 0,
            "radius": 4,
            "shadow": 10,
            "deviceThickness": 12,
        });
        let settings = Settings::restore(&snapshot);

        assert_eq!(settings.export_scale, 3.0);
        assert_eq!(settings.export_quality, 0.7);
        assert_eq!(settings.width, 1024);
        assert_eq!(settings.padding, 0);
        assert_eq!(settings.device_thickness, 12);
    }

    #[test]
    fn restore_falls_back_per_key() {
        let snapshot = json!({
            "exportScale": "big",
            "width": -5,
            "radius": 20,
            "theme": "dark",
        });
        let settings = Settings::restore(&snapshot);

        assert_eq!(settings.export_scale, 2.0);
        assert_eq!(settings.width, 800);
        assert_eq!(settings.radius, 20);
        assert_eq!(settings.shadow, 60);
    }

    #[test]
    fn restore_non_object_is_default() {
        assert_eq!(Settings::restore(&json!([1, 2, 3])), Settings::default());
        assert_eq!(Settings::restore(&Value::Null), Settings::default());
    }

    #[test]
    fn snapshot_round_trips() {
        let settings = Settings {
            export_scale: 4.0,
            width: 640,
            ..Settings::default()
        };
        assert_eq!(Settings::restore(&settings.snapshot()), settings);
    }

    // =========================================================================
    // SettingsStore
    // =========================================================================

    #[test]
    fn store_missing_file_is_default() {
        let tmp = TempDir::new().unwrap();
        let store = SettingsStore::new(tmp.path().join("settings.json"));
        assert_eq!(store.load(), Settings::default());
    }

    #[test]
    fn store_save_then_load() {
        let tmp = TempDir::new().unwrap();
        let store = SettingsStore::new(tmp.path().join("nested/settings.json"));
        let settings = Settings {
            padding: 48,
            ..Settings::default()
        };

        store.save(&settings).unwrap();
        assert_eq!(store.load(), settings);
    }

    #[test]
    fn store_corrupt_file_is_default() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("settings.json");
        fs::write(&path, "{not json").unwrap();
        assert_eq!(SettingsStore::new(path).load(), Settings::default());
    }
}
