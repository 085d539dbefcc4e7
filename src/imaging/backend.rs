//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines the pixel work every backend must
//! support: decode, resize, fit, crop and apply_effects. Operations decide
//! *what* to produce and hand the backend fully computed parameters.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend) on the `image` crate.

use super::params::{CropParams, EffectParams, FitParams, ResizeParams};
use super::raster::{RasterImage, SourceFormat};
use thiserror::Error;

/// An upload or request rejected before any pixel work.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("File size too large: {size} bytes exceeds the {max} byte limit")]
    TooLarge { size: u64, max: u64 },
    #[error("Unsupported file format '{0}'. Please use JPEG, PNG, GIF, WebP, or SVG")]
    UnsupportedType(String),
    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ImagingError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Failed to decode image: {0}")]
    Decode(String),
    #[error("Failed to encode image: {0}")]
    Encode(String),
}

/// Result of an identify operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Largest image the engine will decode or allocate.
///
/// Checked before any pixel buffer exists, so a small file that declares a
/// huge canvas fails with an error instead of exhausting memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelLimits {
    /// Maximum `width * height`. `0` disables the limit.
    pub max_pixels: u64,
    /// Maximum width or height. `0` disables the limit.
    pub max_dimension: u32,
}

impl Default for PixelLimits {
    fn default() -> Self {
        Self {
            max_pixels: 50_000_000,
            max_dimension: 16_384,
        }
    }
}

impl PixelLimits {
    /// Describe why a `width`×`height` buffer is over the limits, if it is.
    pub fn check(&self, width: u32, height: u32) -> Result<(), String> {
        if self.max_dimension > 0 && (width > self.max_dimension || height > self.max_dimension) {
            return Err(format!(
                "{width}x{height} exceeds the maximum edge of {}px",
                self.max_dimension
            ));
        }
        let pixels = u64::from(width) * u64::from(height);
        if self.max_pixels > 0 && pixels > self.max_pixels {
            return Err(format!(
                "{width}x{height} exceeds the budget of {} pixels",
                self.max_pixels
            ));
        }
        Ok(())
    }
}

/// Trait for image processing backends.
///
/// Each method consumes an immutable [`RasterImage`] and returns a new one;
/// sources are never modified.
pub trait ImageBackend: Sync {
    /// Decode upload bytes into a raster, failing on corrupt data.
    fn decode(&self, bytes: &[u8], format: SourceFormat) -> Result<RasterImage, ImagingError>;

    /// Scale the whole image to exact dimensions.
    fn resize(&self, source: &RasterImage, params: &ResizeParams)
    -> Result<RasterImage, ImagingError>;

    /// Draw the image at a placement on a background-filled canvas.
    fn fit(&self, source: &RasterImage, params: &FitParams) -> Result<RasterImage, ImagingError>;

    /// Keep a rectangle of the image, unscaled.
    fn crop(&self, source: &RasterImage, params: &CropParams) -> Result<RasterImage, ImagingError>;

    /// Run a filter chain over the image.
    fn apply_effects(
        &self,
        source: &RasterImage,
        params: &EffectParams,
    ) -> Result<RasterImage, ImagingError>;
}
