//! Pure Rust image processing backend.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, GIF, WebP) | `image` crate (pure Rust decoders) |
//! | Decode (SVG) | `resvg` rasterisation at intrinsic size |
//! | Resize | `image::imageops::resize` with `Lanczos3` filter |
//! | Fit | resize of the visible part + `image::imageops::overlay` onto a filled canvas |
//! | Crop | `image::DynamicImage::crop_imm` |
//! | Brightness / contrast / saturate | per-pixel CSS filter math |
//! | Blur | `image::imageops::blur` (sigma = blur radius in px) |
//! | Overlay | source-over composite of a flat colour |

use super::backend::{ImageBackend, ImagingError, PixelLimits, ValidationError};
use super::calculations::Placement;
use super::codec::{decode_limited, decode_raster, encode_raster};
use super::params::{CropParams, EffectParams, FitParams, Filter, Overlay, ResizeParams};
use super::raster::{RasterImage, SourceFormat};
use image::imageops::{self, FilterType};
use image::{DynamicImage, Rgba, RgbaImage};

/// Pure Rust backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping. Decoded
/// uploads and produced canvases are held to the backend's [`PixelLimits`].
pub struct RustBackend {
    limits: PixelLimits,
}

impl RustBackend {
    pub fn new() -> Self {
        Self::with_limits(PixelLimits::default())
    }

    pub fn with_limits(limits: PixelLimits) -> Self {
        Self { limits }
    }

    fn check_output(&self, width: u32, height: u32) -> Result<(), ImagingError> {
        self.limits
            .check(width, height)
            .map_err(|e| ValidationError::InvalidGeometry(format!("output {e}")).into())
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn map_channels(img: &mut RgbaImage, f: impl Fn([f32; 3]) -> [f32; 3]) {
    for px in img.pixels_mut() {
        let rgb = [
            px[0] as f32 / 255.0,
            px[1] as f32 / 255.0,
            px[2] as f32 / 255.0,
        ];
        let out = f(rgb);
        for (c, v) in out.into_iter().enumerate() {
            px[c] = (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        }
    }
}

/// CSS `brightness(pct%)`: linear multiply.
fn brightness(img: &mut RgbaImage, pct: f32) {
    let k = pct.max(0.0) / 100.0;
    map_channels(img, |c| c.map(|v| v * k));
}

/// CSS `contrast(pct%)`: scale around mid-grey.
fn contrast(img: &mut RgbaImage, pct: f32) {
    let k = pct.max(0.0) / 100.0;
    map_channels(img, |c| c.map(|v| (v - 0.5) * k + 0.5));
}

/// CSS `saturate(pct%)`: the filter-effects saturate matrix.
fn saturate(img: &mut RgbaImage, pct: f32) {
    let s = pct.max(0.0) / 100.0;
    map_channels(img, |[r, g, b]| {
        [
            (0.213 + 0.787 * s) * r + (0.715 - 0.715 * s) * g + (0.072 - 0.072 * s) * b,
            (0.213 - 0.213 * s) * r + (0.715 + 0.285 * s) * g + (0.072 - 0.072 * s) * b,
            (0.213 - 0.213 * s) * r + (0.715 - 0.715 * s) * g + (0.072 + 0.928 * s) * b,
        ]
    });
}

/// Source-over composite of a flat colour across the whole frame.
fn composite_overlay(img: &mut RgbaImage, overlay: Overlay) {
    let a = overlay.opacity.clamp(0.0, 1.0) * (overlay.color[3] as f32 / 255.0);
    if a == 0.0 {
        return;
    }
    for px in img.pixels_mut() {
        let da = px[3] as f32 / 255.0;
        let out_a = a + da * (1.0 - a);
        for c in 0..3 {
            let blended = (overlay.color[c] as f32 * a + px[c] as f32 * da * (1.0 - a)) / out_a;
            px[c] = blended.round().clamp(0.0, 255.0) as u8;
        }
        px[3] = (out_a * 255.0).round() as u8;
    }
}

/// Run the filter chain over an RGBA buffer, in chain order.
pub(crate) fn run_filters(mut img: RgbaImage, filters: &[Filter]) -> RgbaImage {
    for filter in filters {
        match *filter {
            Filter::Brightness(pct) => brightness(&mut img, pct),
            Filter::Contrast(pct) => contrast(&mut img, pct),
            Filter::Saturate(pct) => saturate(&mut img, pct),
            Filter::Blur(px) if px > 0.0 => img = imageops::blur(&img, px),
            Filter::Blur(_) => {}
            Filter::Overlay(overlay) => composite_overlay(&mut img, overlay),
        }
    }
    img
}

/// Scale `source` onto `placement` of a filled canvas.
///
/// The placement may overflow the canvas. Only the visible part of the source
/// is resampled, so the work is bounded by the canvas size.
pub(crate) fn draw_fitted(
    source: &DynamicImage,
    width: u32,
    height: u32,
    placement: Placement,
    background: Rgba<u8>,
) -> RgbaImage {
    let mut canvas = RgbaImage::from_pixel(width, height, background);

    // Visible span in placement coordinates.
    let left = (-placement.x).max(0);
    let top = (-placement.y).max(0);
    let right = (width as i64 - placement.x).min(placement.width as i64);
    let bottom = (height as i64 - placement.y).min(placement.height as i64);
    if right <= left || bottom <= top {
        return canvas;
    }

    let scale_x = source.width() as f64 / placement.width as f64;
    let scale_y = source.height() as f64 / placement.height as f64;
    let src_x = ((left as f64 * scale_x).floor() as u32).min(source.width() - 1);
    let src_y = ((top as f64 * scale_y).floor() as u32).min(source.height() - 1);
    let src_right = ((right as f64 * scale_x).ceil() as u32).clamp(src_x + 1, source.width());
    let src_bottom = ((bottom as f64 * scale_y).ceil() as u32).clamp(src_y + 1, source.height());

    let visible = source
        .crop_imm(src_x, src_y, src_right - src_x, src_bottom - src_y)
        .to_rgba8();
    let scaled = imageops::resize(
        &visible,
        (right - left) as u32,
        (bottom - top) as u32,
        FilterType::Lanczos3,
    );
    imageops::overlay(&mut canvas, &scaled, placement.x.max(0), placement.y.max(0));
    canvas
}

impl ImageBackend for RustBackend {
    fn decode(&self, bytes: &[u8], format: SourceFormat) -> Result<RasterImage, ImagingError> {
        let img = decode_limited(bytes, format, &self.limits)?;
        Ok(RasterImage::new(img.width(), img.height(), format, bytes.to_vec()))
    }

    fn resize(
        &self,
        source: &RasterImage,
        params: &ResizeParams,
    ) -> Result<RasterImage, ImagingError> {
        self.check_output(params.width, params.height)?;
        let img = decode_raster(source)?;
        let resized = img.resize_exact(params.width, params.height, FilterType::Lanczos3);
        encode_raster(&resized, params.encoding)
    }

    fn fit(&self, source: &RasterImage, params: &FitParams) -> Result<RasterImage, ImagingError> {
        self.check_output(params.width, params.height)?;
        let img = decode_raster(source)?;
        let canvas = draw_fitted(
            &img,
            params.width,
            params.height,
            params.placement,
            params.background,
        );
        encode_raster(&DynamicImage::ImageRgba8(canvas), params.encoding)
    }

    fn crop(&self, source: &RasterImage, params: &CropParams) -> Result<RasterImage, ImagingError> {
        let img = decode_raster(source)?;
        let rect = params.rect;
        let cropped = img.crop_imm(rect.x, rect.y, rect.width, rect.height);
        encode_raster(&cropped, params.encoding)
    }

    fn apply_effects(
        &self,
        source: &RasterImage,
        params: &EffectParams,
    ) -> Result<RasterImage, ImagingError> {
        let img = decode_raster(source)?;
        let filtered = run_filters(img.to_rgba8(), &params.filters);
        encode_raster(&DynamicImage::ImageRgba8(filtered), params.encoding)
    }
}
