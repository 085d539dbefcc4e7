//! Image geometry engine.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Validate** | size limit + MIME allow-list, then decode |
//! | **Decode** | `image` (JPEG, PNG, GIF, WebP), `resvg` (SVG) |
//! | **Fit / downscale / thumbnail** | Lanczos3 resize |
//! | **Crop** | `crop_imm` on a centered rect |
//! | **Effects** | CSS filter math + `imageops::blur` |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension math (unit testable)
//! - **Parameters**: Data structures describing image operations
//! - **Raster / codec**: The [`RasterImage`] value and encode/decode
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: High-level functions combining calculations + backend

pub mod backend;
pub mod calculations;
pub(crate) mod codec;
pub mod operations;
pub mod params;
pub mod raster;
pub mod rust_backend;

pub use backend::{Dimensions, ImageBackend, ImagingError, PixelLimits, ValidationError};
pub use calculations::{CropRect, MockupSize, Placement};
pub use operations::{
    DownscaleConfig, ImagingConfig, SizeConstraints, ThumbnailConfig, apply_effects,
    auto_downscale, auto_fit_mockup_size, crop_to_aspect_ratio, generate_thumbnail,
    get_dimensions, process_upload, resize_to_fit, transform, validate_upload,
};
pub use params::{
    EffectSpec, Encoding, Filter, GeometryMode, GeometryRequest, Overlay, Quality,
    parse_hex_color,
};
pub use raster::{RasterImage, SourceFormat};
pub use rust_backend::RustBackend;
