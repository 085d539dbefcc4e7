//! The capture primitive: something with a logical size that can be
//! rasterised at a scale factor.

use crate::imaging::backend::{Dimensions, ImagingError, PixelLimits};
use crate::imaging::calculations::calculate_letterbox_placement;
use crate::imaging::codec::decode_raster;
use crate::imaging::raster::RasterImage;
use crate::imaging::rust_backend::draw_fitted;
use image::{DynamicImage, Rgba, RgbaImage};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CaptureError {
    #[error("Surface unavailable: {0}")]
    Unavailable(String),
    #[error("Surface capture failed: {0}")]
    Failed(String),
}

/// One rasterisation of a surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CaptureRequest {
    /// Magnification applied to the logical size.
    pub scale: f32,
    /// Logical width to render at.
    pub width: u32,
    /// Logical height to render at.
    pub height: u32,
    /// `None` keeps the background transparent.
    pub background: Option<Rgba<u8>>,
}

impl CaptureRequest {
    /// Output pixel size: logical size times scale, rounded.
    ///
    /// Sizes outside the default [`PixelLimits`] fail before anything is
    /// allocated.
    pub fn pixel_size(&self) -> Result<(u32, u32), CaptureError> {
        let scaled = |v: u32| (v as f64 * self.scale as f64).round();
        let (w, h) = (scaled(self.width), scaled(self.height));
        if !(w >= 1.0 && h >= 1.0 && w <= u32::MAX as f64 && h <= u32::MAX as f64) {
            return Err(CaptureError::Failed(format!(
                "cannot render {}x{} at scale {}",
                self.width, self.height, self.scale
            )));
        }
        let (w, h) = (w as u32, h as u32);
        PixelLimits::default().check(w, h).map_err(|e| {
            CaptureError::Failed(format!("capture at scale {}: {e}", self.scale))
        })?;
        Ok((w, h))
    }
}

/// A visual region that can be captured.
///
/// Implementations must honour the width/height and background overrides of
/// the [`CaptureRequest`]; how they draw is their own business.
pub trait Surface: Send + Sync {
    /// Current logical size in pixels.
    fn size(&self) -> Dimensions;

    /// Change the logical size.
    fn set_size(&mut self, size: Dimensions);

    /// Render the region into an RGBA buffer.
    fn rasterize(&self, request: &CaptureRequest) -> Result<RgbaImage, CaptureError>;
}

/// A surface showing one image letterboxed into its logical size.
///
/// Unlike fit mode, the whole image stays visible.
#[derive(Debug, Clone)]
pub struct ImageSurface {
    image: DynamicImage,
    size: Dimensions,
}

impl ImageSurface {
    /// A surface the size of `image`.
    pub fn new(image: DynamicImage) -> Self {
        let size = Dimensions::new(image.width(), image.height());
        Self { image, size }
    }

    pub fn from_raster(raster: &RasterImage) -> Result<Self, ImagingError> {
        Ok(Self::new(decode_raster(raster)?))
    }

    pub fn with_size(mut self, size: Dimensions) -> Self {
        self.size = size;
        self
    }
}

impl Surface for ImageSurface {
    fn size(&self) -> Dimensions {
        self.size
    }

    fn set_size(&mut self, size: Dimensions) {
        self.size = size;
    }

    fn rasterize(&self, request: &CaptureRequest) -> Result<RgbaImage, CaptureError> {
        let (width, height) = request.pixel_size()?;
        let placement = calculate_letterbox_placement(
            (self.image.width(), self.image.height()),
            (width, height),
        );
        let background = request.background.unwrap_or(Rgba([0, 0, 0, 0]));
        Ok(draw_fitted(&self.image, width, height, placement, background))
    }
}
