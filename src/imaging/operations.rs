//! High-level image operations.
//!
//! These functions combine calculations with backend execution.
//! They take configuration, compute parameters, and call the backend.
//! Every operation fails fast with a typed [`ImagingError`]; nothing is
//! retried and no partial result is returned.

use super::backend::{Dimensions, ImageBackend, ImagingError, ValidationError};
use super::calculations::{
    MockupSize, calculate_auto_fit_size, calculate_crop_rect, calculate_downscale_dimensions,
    calculate_fit_placement, calculate_thumbnail_size,
};
use super::params::{
    CropParams, EffectParams, EffectSpec, Encoding, FitParams, GeometryMode, GeometryRequest,
    Quality, ResizeParams,
};
use super::raster::{RasterImage, SourceFormat};
use image::Rgba;

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, ImagingError>;

/// Upload and auto-fit limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeConstraints {
    pub max_upload_bytes: u64,
    pub max_auto_fit_width: u32,
    pub max_auto_fit_height: u32,
    pub min_auto_fit_width: u32,
}

impl Default for SizeConstraints {
    fn default() -> Self {
        Self {
            max_upload_bytes: 10 * 1024 * 1024,
            max_auto_fit_width: 1200,
            max_auto_fit_height: 800,
            min_auto_fit_width: 300,
        }
    }
}

/// When and how oversized uploads are shrunk.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DownscaleConfig {
    /// Either edge above this triggers a downscale.
    pub threshold: u32,
    pub max_width: u32,
    pub max_height: u32,
    pub quality: Quality,
}

impl Default for DownscaleConfig {
    fn default() -> Self {
        Self {
            threshold: 2000,
            max_width: 1920,
            max_height: 1080,
            quality: Quality::new(0.85),
        }
    }
}

/// Configuration for thumbnail generation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThumbnailConfig {
    /// Length of the longer side.
    pub max_size: u32,
    pub quality: Quality,
}

impl Default for ThumbnailConfig {
    fn default() -> Self {
        Self {
            max_size: 200,
            quality: Quality::new(0.8),
        }
    }
}

/// Everything the geometry engine consults besides the request itself.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImagingConfig {
    pub constraints: SizeConstraints,
    pub downscale: DownscaleConfig,
    pub thumbnail: ThumbnailConfig,
    /// Fit mode canvas colour, visible behind transparent pixels.
    pub background: Rgba<u8>,
}

impl Default for ImagingConfig {
    fn default() -> Self {
        Self {
            constraints: SizeConstraints::default(),
            downscale: DownscaleConfig::default(),
            thumbnail: ThumbnailConfig::default(),
            background: Rgba([255, 255, 255, 255]),
        }
    }
}

fn invalid(msg: impl Into<String>) -> ImagingError {
    ValidationError::InvalidGeometry(msg.into()).into()
}

/// Get image dimensions using the backend.
pub fn get_dimensions(
    backend: &impl ImageBackend,
    bytes: &[u8],
    format: SourceFormat,
) -> Result<Dimensions> {
    let img = backend.decode(bytes, format)?;
    Ok(Dimensions::new(img.width(), img.height()))
}

/// Check an upload against the size limit and supported types, then decode it.
///
/// Size and type are checked before any decoding is attempted.
pub fn validate_upload(
    backend: &impl ImageBackend,
    bytes: &[u8],
    declared_mime: &str,
    size_bytes: u64,
    constraints: &SizeConstraints,
) -> Result<RasterImage> {
    if size_bytes > constraints.max_upload_bytes {
        return Err(ValidationError::TooLarge {
            size: size_bytes,
            max: constraints.max_upload_bytes,
        }
        .into());
    }

    let format = SourceFormat::from_mime(declared_mime)
        .ok_or_else(|| ValidationError::UnsupportedType(declared_mime.to_string()))?;

    let img = backend.decode(bytes, format)?;
    log::debug!(
        "Accepted {} upload: {}x{} ({} bytes)",
        format,
        img.width(),
        img.height(),
        size_bytes
    );
    Ok(img)
}

/// Shrink uploads with an edge above the threshold into the configured bounds.
///
/// Oversized images are re-encoded as JPEG at the configured quality; all
/// others are returned unchanged.
pub fn auto_downscale(
    backend: &impl ImageBackend,
    image: &RasterImage,
    config: &DownscaleConfig,
) -> Result<RasterImage> {
    let Some((width, height)) = calculate_downscale_dimensions(
        image.dimensions(),
        config.threshold,
        (config.max_width, config.max_height),
    ) else {
        return Ok(image.clone());
    };

    log::debug!(
        "Downscaling {}x{} → {}x{}",
        image.width(),
        image.height(),
        width,
        height
    );
    backend.resize(
        image,
        &ResizeParams {
            width,
            height,
            encoding: Encoding::Jpeg(config.quality),
        },
    )
}

/// Validate, decode and downscale an upload in one step.
pub fn process_upload(
    backend: &impl ImageBackend,
    bytes: &[u8],
    declared_mime: &str,
    size_bytes: u64,
    config: &ImagingConfig,
) -> Result<RasterImage> {
    let img = validate_upload(backend, bytes, declared_mime, size_bytes, &config.constraints)?;
    auto_downscale(backend, &img, &config.downscale)
}

/// Draw the image onto an exact `target_width`×`target_height` PNG.
///
/// The image keeps its aspect ratio and fills the canvas: a wider source
/// matches the target height, a taller one the target width, and the
/// overflow is cut equally from both sides. Transparent pixels show
/// `background`.
pub fn resize_to_fit(
    backend: &impl ImageBackend,
    image: &RasterImage,
    target_width: u32,
    target_height: u32,
    background: Rgba<u8>,
) -> Result<RasterImage> {
    if target_width == 0 || target_height == 0 {
        return Err(invalid(format!(
            "fit target {target_width}x{target_height} has a zero edge"
        )));
    }

    let placement = calculate_fit_placement(image.dimensions(), (target_width, target_height));
    backend.fit(
        image,
        &FitParams {
            width: target_width,
            height: target_height,
            placement,
            background,
            encoding: Encoding::Png,
        },
    )
}

/// Center-crop the image to `aspect_ratio` (width / height), as PNG.
pub fn crop_to_aspect_ratio(
    backend: &impl ImageBackend,
    image: &RasterImage,
    aspect_ratio: f64,
) -> Result<RasterImage> {
    if !aspect_ratio.is_finite() || aspect_ratio <= 0.0 {
        return Err(invalid(format!("aspect ratio {aspect_ratio} must be positive")));
    }

    let rect = calculate_crop_rect(image.dimensions(), aspect_ratio);
    backend.crop(
        image,
        &CropParams {
            rect,
            encoding: Encoding::Png,
        },
    )
}

/// Scale the image so its longer side is `config.max_size`, as JPEG.
pub fn generate_thumbnail(
    backend: &impl ImageBackend,
    image: &RasterImage,
    config: &ThumbnailConfig,
) -> Result<RasterImage> {
    if config.max_size == 0 {
        return Err(invalid("thumbnail size must be non-zero"));
    }

    let (width, height) = calculate_thumbnail_size(image.dimensions(), config.max_size);
    backend.resize(
        image,
        &ResizeParams {
            width,
            height,
            encoding: Encoding::Jpeg(config.quality),
        },
    )
}

/// Apply the effect chain described by `effects`, as PNG.
pub fn apply_effects(
    backend: &impl ImageBackend,
    image: &RasterImage,
    effects: &EffectSpec,
) -> Result<RasterImage> {
    backend.apply_effects(
        image,
        &EffectParams {
            filters: effects.filter_chain(),
            encoding: Encoding::Png,
        },
    )
}

/// Mockup size an uploaded image should resize the stage to.
pub fn auto_fit_mockup_size(image: &RasterImage, constraints: &SizeConstraints) -> MockupSize {
    calculate_auto_fit_size(
        image.dimensions(),
        constraints.max_auto_fit_width,
        constraints.max_auto_fit_height,
        constraints.min_auto_fit_width,
    )
}

/// Dispatch a [`GeometryRequest`] to the matching operation.
///
/// - `Fit` draws into the exact target size (see [`resize_to_fit`]).
/// - `Crop` uses `aspect_ratio_override`, or the target's own ratio.
/// - `Thumbnail` constrains the longer side to the larger target edge.
pub fn transform(
    backend: &impl ImageBackend,
    image: &RasterImage,
    request: &GeometryRequest,
    config: &ImagingConfig,
) -> Result<RasterImage> {
    let (w, h) = (request.target_width, request.target_height);
    match request.mode {
        GeometryMode::Fit => resize_to_fit(backend, image, w, h, config.background),
        GeometryMode::Crop => {
            let ratio = match request.aspect_ratio_override {
                Some(ratio) => ratio,
                None if h == 0 => return Err(invalid("crop target height is zero")),
                None => w as f64 / h as f64,
            };
            crop_to_aspect_ratio(backend, image, ratio)
        }
        GeometryMode::Thumbnail => generate_thumbnail(
            backend,
            image,
            &ThumbnailConfig {
                max_size: w.max(h),
                ..config.thumbnail
            },
        ),
    }
}
