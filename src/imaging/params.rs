//! Parameter types for image operations.
//!
//! These structs describe *what* to do, not *how* to do it. They are the
//! interface between the high-level [`operations`](super::operations) module
//! (which decides what images to create) and the [`backend`](super::backend)
//! (which does the actual pixel work). This separation allows swapping backends
//! (e.g. for testing with a mock) without changing operation logic.
//!
//! ## Types
//!
//! - [`Quality`]: Lossy encoding quality as a fraction (0.1–1.0). Clamped on construction.
//! - [`Encoding`]: Output codec for a produced raster (PNG or JPEG at a quality).
//! - [`EffectSpec`]: Sparse filter settings, expanded per call into a [`Filter`] chain.
//! - [`GeometryRequest`]: A single UI-triggered transform (fit, crop or thumbnail).
//! - [`ResizeParams`], [`FitParams`], [`CropParams`], [`EffectParams`]: backend inputs.

use super::calculations::{CropRect, Placement};
use image::Rgba;

/// Quality setting for lossy image encoding, as a fraction in `0.1..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quality(f32);

impl Quality {
    pub const MIN: f32 = 0.1;
    pub const MAX: f32 = 1.0;

    /// Clamp `value` into the valid range. NaN maps to the maximum.
    pub fn new(value: f32) -> Self {
        if value.is_nan() {
            return Self(Self::MAX);
        }
        Self(value.clamp(Self::MIN, Self::MAX))
    }

    pub fn value(self) -> f32 {
        self.0
    }

    /// Quality as the 1–100 integer scale JPEG encoders expect.
    pub fn percent(self) -> u8 {
        (self.0 * 100.0).round().clamp(1.0, 100.0) as u8
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(Self::MAX)
    }
}

/// Codec used when a transform re-encodes its result.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Encoding {
    /// Lossless; quality does not apply.
    Png,
    /// Lossy; alpha is flattened onto white.
    Jpeg(Quality),
}

/// Parse a CSS hex colour (`#rgb`, `#rgba`, `#rrggbb`, `#rrggbbaa`; `#` optional).
pub fn parse_hex_color(s: &str) -> Option<Rgba<u8>> {
    let hex = s.trim();
    let hex = hex.strip_prefix('#').unwrap_or(hex);
    if hex.is_empty() || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }

    let nibble = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).ok().map(|n| n << 4 | n);
    let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();

    match hex.len() {
        3 => Some(Rgba([nibble(0)?, nibble(1)?, nibble(2)?, 255])),
        4 => Some(Rgba([nibble(0)?, nibble(1)?, nibble(2)?, nibble(3)?])),
        6 => Some(Rgba([byte(0)?, byte(2)?, byte(4)?, 255])),
        8 => Some(Rgba([byte(0)?, byte(2)?, byte(4)?, byte(6)?])),
        _ => None,
    }
}

/// Flat colour composited over the whole frame after the filters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Overlay {
    pub color: Rgba<u8>,
    /// 0.0–1.0; values outside are clamped when applied.
    pub opacity: f32,
}

impl Overlay {
    pub const DEFAULT_OPACITY: f32 = 0.5;

    /// Build an overlay from optional UI values, filling in black at 50%.
    pub fn from_parts(color: Option<Rgba<u8>>, opacity: Option<f32>) -> Self {
        Self {
            color: color.unwrap_or(Rgba([0, 0, 0, 255])),
            opacity: opacity.unwrap_or(Self::DEFAULT_OPACITY),
        }
    }
}

impl Default for Overlay {
    fn default() -> Self {
        Self::from_parts(None, None)
    }
}

/// Sparse effect settings. Unset fields are skipped entirely.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EffectSpec {
    pub brightness_pct: Option<f32>,
    pub contrast_pct: Option<f32>,
    pub saturation_pct: Option<f32>,
    pub blur_px: Option<f32>,
    pub overlay: Option<Overlay>,
}

/// One step of the effect pipeline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Filter {
    Brightness(f32),
    Contrast(f32),
    Saturate(f32),
    Blur(f32),
    Overlay(Overlay),
}

impl EffectSpec {
    /// Build the filter chain for this spec.
    ///
    /// The chain is rebuilt from scratch on every call, in the fixed order
    /// brightness → contrast → saturation → blur → overlay.
    pub fn filter_chain(&self) -> Vec<Filter> {
        let mut chain = Vec::with_capacity(5);
        if let Some(pct) = self.brightness_pct {
            chain.push(Filter::Brightness(pct));
        }
        if let Some(pct) = self.contrast_pct {
            chain.push(Filter::Contrast(pct));
        }
        if let Some(pct) = self.saturation_pct {
            chain.push(Filter::Saturate(pct));
        }
        if let Some(px) = self.blur_px {
            chain.push(Filter::Blur(px));
        }
        if let Some(overlay) = self.overlay {
            chain.push(Filter::Overlay(overlay));
        }
        chain
    }

    pub fn is_empty(&self) -> bool {
        self.filter_chain().is_empty()
    }
}

/// Strategy of a [`GeometryRequest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeometryMode {
    Fit,
    Crop,
    Thumbnail,
}

/// A single transform request, consumed once.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeometryRequest {
    pub target_width: u32,
    pub target_height: u32,
    pub mode: GeometryMode,
    /// Crop mode only; defaults to `target_width / target_height`.
    pub aspect_ratio_override: Option<f64>,
}

/// Scale the whole image to exact dimensions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResizeParams {
    pub width: u32,
    pub height: u32,
    pub encoding: Encoding,
}

/// Draw the image at `placement` on a `width`×`height` canvas filled with `background`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitParams {
    pub width: u32,
    pub height: u32,
    pub placement: Placement,
    pub background: Rgba<u8>,
    pub encoding: Encoding,
}

/// Cut `rect` out of the image without scaling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CropParams {
    pub rect: CropRect,
    pub encoding: Encoding,
}

/// Run a filter chain over the image.
#[derive(Debug, Clone, PartialEq)]
pub struct EffectParams {
    pub filters: Vec<Filter>,
    pub encoding: Encoding,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quality_clamps_to_valid_range() {
        assert_eq!(Quality::new(-1.0).value(), 0.1);
        assert_eq!(Quality::new(0.5).value(), 0.5);
        assert_eq!(Quality::new(5.0).value(), 1.0);
        assert_eq!(Quality::new(f32::NAN).value(), 1.0);
    }

    #[test]
    fn quality_percent_scale() {
        assert_eq!(Quality::new(0.85).percent(), 85);
        assert_eq!(Quality::new(0.8).percent(), 80);
        assert_eq!(Quality::default().percent(), 100);
    }

    #[test]
    fn parse_hex_color_forms() {
        assert_eq!(parse_hex_color("#ffffff"), Some(Rgba([255, 255, 255, 255])));
        assert_eq!(parse_hex_color("000"), Some(Rgba([0, 0, 0, 255])));
        assert_eq!(parse_hex_color("#6366f1"), Some(Rgba([0x63, 0x66, 0xf1, 255])));
        assert_eq!(parse_hex_color("#f008"), Some(Rgba([255, 0, 0, 0x88])));
        assert_eq!(parse_hex_color("#11223344"), Some(Rgba([0x11, 0x22, 0x33, 0x44])));
    }

    #[test]
    fn parse_hex_color_rejects_garbage() {
        assert_eq!(parse_hex_color(""), None);
        assert_eq!(parse_hex_color("#12"), None);
        assert_eq!(parse_hex_color("#zzzzzz"), None);
        assert_eq!(parse_hex_color("red"), None);
    }

    #[test]
    fn overlay_defaults_to_half_black() {
        let overlay = Overlay::default();
        assert_eq!(overlay.color, Rgba([0, 0, 0, 255]));
        assert_eq!(overlay.opacity, 0.5);
    }

    #[test]
    fn filter_chain_has_fixed_order() {
        let spec = EffectSpec {
            overlay: Some(Overlay::default()),
            blur_px: Some(2.0),
            saturation_pct: Some(150.0),
            contrast_pct: Some(90.0),
            brightness_pct: Some(110.0),
        };
        assert_eq!(
            spec.filter_chain(),
            vec![
                Filter::Brightness(110.0),
                Filter::Contrast(90.0),
                Filter::Saturate(150.0),
                Filter::Blur(2.0),
                Filter::Overlay(Overlay::default()),
            ]
        );
    }

    #[test]
    fn filter_chain_does_not_accumulate_between_calls() {
        let spec = EffectSpec {
            contrast_pct: Some(120.0),
            ..EffectSpec::default()
        };
        let first = spec.filter_chain();
        let second = spec.filter_chain();
        assert_eq!(first, vec![Filter::Contrast(120.0)]);
        assert_eq!(first, second);
    }

    #[test]
    fn empty_spec_has_no_filters() {
        assert!(EffectSpec::default().is_empty());
    }
}
