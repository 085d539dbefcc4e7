//! Mockup configuration module.
//!
//! Handles loading, validating, and merging `mockcraft.toml`. Stock defaults
//! are overridden by the values in the user file; everything else keeps its
//! default.
//!
//! ## Configuration Options
//!
//! ```toml
//! # Every key is optional; the values below are the defaults
//!
//! [upload]
//! max_bytes = 10485760      # Largest accepted upload (10 MB)
//! max_pixels = 50000000     # Largest canvas decoded or produced (0 = no limit)
//! max_dimension = 16384     # Largest canvas edge (0 = no limit)
//!
//! [downscale]
//! threshold = 2000          # Either edge above this triggers a downscale
//! max_width = 1920          # Downscale bounds
//! max_height = 1080
//! quality = 0.85            # JPEG quality of the downscaled image
//!
//! [auto_fit]
//! max_width = 1200          # Mockup width cap
//! max_height = 800          # Mockup height cap
//! min_width = 300           # Mockup width floor (wins over the height cap)
//!
//! [thumbnail]
//! size = 200                # Longer side in pixels
//! quality = 0.8
//!
//! [fit]
//! background = "#ffffff"    # Shown behind transparent pixels
//!
//! [export]
//! scale = 2.0               # Capture magnification, clamped to 1-4
//! quality = 1.0             # Lossy export quality, clamped to 0.1-1.0
//! ```
//!
//! ## Partial Configuration
//!
//! Config files are sparse: override just the values you want:
//!
//! ```toml
//! [fit]
//! background = "#000000"
//! ```
//!
//! A misspelt key is an error rather than a silently ignored setting.

use crate::export::ExportPolicy;
use crate::imaging::{
    DownscaleConfig, ImagingConfig, PixelLimits, Quality, SizeConstraints, ThumbnailConfig,
    parse_hex_color,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// File name looked up in the config directory.
pub const CONFIG_FILE: &str = "mockcraft.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    TomlSer(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Configuration loaded from `mockcraft.toml`.
///
/// Every section is optional and falls back to the stock values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MockupConfig {
    pub upload: UploadConfig,
    pub downscale: DownscaleSection,
    pub auto_fit: AutoFitConfig,
    pub thumbnail: ThumbnailSection,
    pub fit: FitConfig,
    pub export: ExportConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UploadConfig {
    pub max_bytes: u64,
    /// Largest decoded or produced canvas, `width * height`. `0` disables.
    pub max_pixels: u64,
    /// Largest canvas edge. `0` disables.
    pub max_dimension: u32,
}

impl Default for UploadConfig {
    fn default() -> Self {
        let limits = PixelLimits::default();
        Self {
            max_bytes: 10 * 1024 * 1024,
            max_pixels: limits.max_pixels,
            max_dimension: limits.max_dimension,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DownscaleSection {
    pub threshold: u32,
    pub max_width: u32,
    pub max_height: u32,
    pub quality: f32,
}

impl Default for DownscaleSection {
    fn default() -> Self {
        Self {
            threshold: 2000,
            max_width: 1920,
            max_height: 1080,
            quality: 0.85,
        }
    }
}

/// Bounds for the mockup size suggested after an upload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AutoFitConfig {
    pub max_width: u32,
    pub max_height: u32,
    pub min_width: u32,
}

impl Default for AutoFitConfig {
    fn default() -> Self {
        Self {
            max_width: 1200,
            max_height: 800,
            min_width: 300,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ThumbnailSection {
    pub size: u32,
    pub quality: f32,
}

impl Default for ThumbnailSection {
    fn default() -> Self {
        Self {
            size: 200,
            quality: 0.8,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FitConfig {
    /// Hex colour, `#rgb`, `#rgba`, `#rrggbb` or `#rrggbbaa`.
    pub background: String,
}

impl Default for FitConfig {
    fn default() -> Self {
        Self {
            background: "#ffffff".to_string(),
        }
    }
}

/// Default export policy. Values are clamped, never rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExportConfig {
    pub scale: f32,
    pub quality: f32,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            scale: 2.0,
            quality: 1.0,
        }
    }
}

impl MockupConfig {
    /// Reject limits the geometry engine cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.upload.max_bytes == 0 {
            return Err(ConfigError::Validation(
                "upload.max_bytes must be non-zero".into(),
            ));
        }
        if self.downscale.max_width == 0 || self.downscale.max_height == 0 {
            return Err(ConfigError::Validation(
                "downscale.max_width and downscale.max_height must be non-zero".into(),
            ));
        }
        for (key, q) in [
            ("downscale.quality", self.downscale.quality),
            ("thumbnail.quality", self.thumbnail.quality),
        ] {
            if !(Quality::MIN..=Quality::MAX).contains(&q) {
                return Err(ConfigError::Validation(format!("{key} must be 0.1-1.0")));
            }
        }
        if self.auto_fit.max_width == 0 || self.auto_fit.max_height == 0 {
            return Err(ConfigError::Validation(
                "auto_fit.max_width and auto_fit.max_height must be non-zero".into(),
            ));
        }
        if self.thumbnail.size == 0 {
            return Err(ConfigError::Validation(
                "thumbnail.size must be non-zero".into(),
            ));
        }
        if parse_hex_color(&self.fit.background).is_none() {
            return Err(ConfigError::Validation(format!(
                "fit.background '{}' is not a hex colour",
                self.fit.background
            )));
        }
        Ok(())
    }

    pub fn size_constraints(&self) -> SizeConstraints {
        SizeConstraints {
            max_upload_bytes: self.upload.max_bytes,
            max_auto_fit_width: self.auto_fit.max_width,
            max_auto_fit_height: self.auto_fit.max_height,
            min_auto_fit_width: self.auto_fit.min_width,
        }
    }

    pub fn pixel_limits(&self) -> PixelLimits {
        PixelLimits {
            max_pixels: self.upload.max_pixels,
            max_dimension: self.upload.max_dimension,
        }
    }

    /// Geometry engine settings. Assumes [`validate`](Self::validate) passed.
    pub fn imaging(&self) -> ImagingConfig {
        let defaults = ImagingConfig::default();
        ImagingConfig {
            constraints: self.size_constraints(),
            downscale: DownscaleConfig {
                threshold: self.downscale.threshold,
                max_width: self.downscale.max_width,
                max_height: self.downscale.max_height,
                quality: Quality::new(self.downscale.quality),
            },
            thumbnail: ThumbnailConfig {
                max_size: self.thumbnail.size,
                quality: Quality::new(self.thumbnail.quality),
            },
            background: parse_hex_color(&self.fit.background).unwrap_or(defaults.background),
        }
    }

    pub fn export_policy(&self) -> ExportPolicy {
        ExportPolicy::new(self.export.scale, self.export.quality)
    }
}

// =============================================================================
// Loading
// =============================================================================

/// Stock defaults as a TOML table; the layer user files are merged onto.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(MockupConfig::default())?)
}

/// Deep-merge `overlay` into `base`.
///
/// Nested tables merge per key. Any other overlay value replaces the base
/// value outright, and base keys missing from the overlay survive.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `mockcraft.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if no config file exists in the directory.
pub fn load_raw_config(dir: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = dir.join(CONFIG_FILE);
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Apply an optional user layer to `base`, then parse and check the result.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<MockupConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: MockupConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `mockcraft.toml` in the given directory.
///
/// A missing file yields the stock configuration.
pub fn load_config(dir: &Path) -> Result<MockupConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let overlay = load_raw_config(dir)?;
    resolve_config(base, overlay)
}

/// Commented stock `mockcraft.toml`, printed by `mockcraft gen-config`.
pub fn stock_config_toml() -> &'static str {
    r##"# Mockcraft Configuration
# =======================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Uploads
# ---------------------------------------------------------------------------
[upload]
# Largest accepted upload in bytes (10 MB).
max_bytes = 10485760

# Largest canvas, in pixels, that an upload may declare or an operation may
# produce. A small file can declare a huge canvas (an SVG with
# width="40000"), so this is checked before decoding. 0 disables the check.
max_pixels = 50000000
max_dimension = 16384

# ---------------------------------------------------------------------------
# Automatic downscale of large uploads
# ---------------------------------------------------------------------------
[downscale]
# Uploads with either edge above this many pixels are downscaled.
threshold = 2000

# Bounds the downscaled image must fit in (aspect ratio preserved).
max_width = 1920
max_height = 1080

# JPEG quality of the downscaled image (0.1 = worst, 1.0 = best).
quality = 0.85

# ---------------------------------------------------------------------------
# Mockup auto-fit after an upload
# ---------------------------------------------------------------------------
[auto_fit]
# The width is capped first, then the height, then the width floor applies.
max_width = 1200
max_height = 800
min_width = 300

# ---------------------------------------------------------------------------
# Thumbnails
# ---------------------------------------------------------------------------
[thumbnail]
# Length of the longer side in pixels.
size = 200
quality = 0.8

# ---------------------------------------------------------------------------
# Fit mode
# ---------------------------------------------------------------------------
[fit]
# Colour shown behind transparent pixels.
background = "#ffffff"

# ---------------------------------------------------------------------------
# Export
# ---------------------------------------------------------------------------
[export]
# Capture magnification (clamped to 1-4).
scale = 2.0

# Lossy export quality (clamped to 0.1-1.0). PNG ignores it.
quality = 1.0
"##
}
